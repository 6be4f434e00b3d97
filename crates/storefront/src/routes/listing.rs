//! View helpers shared by the shop and stock listings.

use std::str::FromStr;

use nexus_core::Page;
use nexus_core::query::ALL;
use url::form_urlencoded;

/// One `<option>` of a facet dropdown.
pub struct OptionView {
    pub value: String,
    pub selected: bool,
}

/// A facet dropdown with its distinct values.
pub struct FacetSelect {
    pub name: &'static str,
    pub label: &'static str,
    pub all: &'static str,
    pub options: Vec<OptionView>,
}

impl FacetSelect {
    #[must_use]
    pub fn new(
        name: &'static str,
        label: &'static str,
        values: &[String],
        selected: Option<&str>,
    ) -> Self {
        Self {
            name,
            label,
            all: ALL,
            options: values
                .iter()
                .map(|value| OptionView {
                    selected: selected == Some(value.as_str()),
                    value: value.clone(),
                })
                .collect(),
        }
    }
}

pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub current: bool,
}

/// Pagination controls for a result list.
pub struct Pager {
    pub prev: Option<String>,
    pub next: Option<String>,
    pub links: Vec<PageLink>,
    pub first_index: usize,
    pub last_index: usize,
    pub total_items: usize,
}

impl Pager {
    /// Build the controls, asking `href` for each page's URL.
    pub fn new(page: &Page, href: impl Fn(usize) -> String) -> Self {
        Self {
            prev: page.has_prev().then(|| href(page.number - 1)),
            next: page.has_next().then(|| href(page.number + 1)),
            links: page
                .window()
                .into_iter()
                .map(|number| PageLink {
                    number,
                    href: href(number),
                    current: number == page.number,
                })
                .collect(),
            first_index: page.first_index(),
            last_index: page.last_index(),
            total_items: page.total_items,
        }
    }

    #[must_use]
    pub const fn is_paged(&self) -> bool {
        self.prev.is_some() || self.next.is_some()
    }
}

/// `path?key=value&...`, leaving out empty values.
#[must_use]
pub fn link(path: &str, pairs: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        if !value.is_empty() {
            serializer.append_pair(key, value);
        }
    }
    let query = serializer.finish();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Parse an optional form value, treating blanks and garbage as absent.
#[must_use]
pub fn lenient<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse().ok())
}
