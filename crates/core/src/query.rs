//! Catalog search, facet filtering, sorting and pagination.
//!
//! Both the shop and the stock lookup page run a [`CatalogQuery`] over the
//! loaded catalog. They differ in which fields the free-text search looks
//! at ([`SearchScope`]) and in what an untouched filter form shows
//! ([`EmptyFilterPolicy`]).

use core::cmp::Ordering;
use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::types::Money;

/// Page sizes offered by the stock lookup page.
pub const STOCK_PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

/// Stock page size used when none (or an unsupported one) is requested.
pub const DEFAULT_STOCK_PAGE_SIZE: usize = 25;

/// Items per page in the shop.
pub const SHOP_PAGE_SIZE: usize = 12;

/// Number of page links shown around the current page.
const PAGE_WINDOW: usize = 5;

/// Facet value meaning "no constraint".
pub const ALL: &str = "All";

/// Accept a requested stock page size, falling back to the default.
#[must_use]
pub fn normalize_page_size(requested: Option<usize>) -> usize {
    requested
        .filter(|size| STOCK_PAGE_SIZES.contains(size))
        .unwrap_or(DEFAULT_STOCK_PAGE_SIZE)
}

/// A categorical column that can be narrowed to one exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    ToolType,
    Brand,
    Material,
    Coating,
    Workpiece,
}

impl Facet {
    /// The item's value for this facet.
    #[must_use]
    pub fn value_of(self, item: &CatalogItem) -> &str {
        match self {
            Self::ToolType => &item.tool_type,
            Self::Brand => &item.brand,
            Self::Material => &item.material,
            Self::Coating => &item.coating,
            Self::Workpiece => &item.workpiece_material,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ToolType => "Tool Type",
            Self::Brand => "Brand",
            Self::Material => "Material",
            Self::Coating => "Coating",
            Self::Workpiece => "Workpiece Material",
        }
    }
}

/// Turn a raw facet form value into a selection.
///
/// Empty input and `All` both mean the facet is unconstrained.
#[must_use]
pub fn facet_selection(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty() && *value != ALL)
        .map(str::to_owned)
}

/// Which fields the free-text search looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Name, brand, id and application notes.
    #[default]
    Listing,
    /// Every column of the item.
    AnyField,
}

/// What an untouched filter form returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyFilterPolicy {
    /// The whole catalog.
    #[default]
    ShowAll,
    /// Nothing until a search term or facet is set.
    ShowNothing,
}

/// Sortable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    Name,
    Brand,
    ToolType,
    Material,
    Quantity,
    Price,
}

impl SortField {
    /// Every field, in column order.
    pub const ALL: [Self; 7] = [
        Self::Id,
        Self::Name,
        Self::Brand,
        Self::ToolType,
        Self::Material,
        Self::Quantity,
        Self::Price,
    ];

    /// Parse a column key as used in stock page links.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Brand => "brand",
            Self::ToolType => "type",
            Self::Material => "material",
            Self::Quantity => "quantity",
            Self::Price => "price",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "Tool ID",
            Self::Name => "Tool Name",
            Self::Brand => "Brand",
            Self::ToolType => "Tool Type",
            Self::Material => "Material",
            Self::Quantity => "Quantity",
            Self::Price => "Unit Price (₹)",
        }
    }

    fn compare(self, a: &CatalogItem, b: &CatalogItem) -> Ordering {
        let text = |x: &str, y: &str| x.to_lowercase().cmp(&y.to_lowercase());
        match self {
            Self::Id => text(a.id.as_str(), b.id.as_str()),
            Self::Name => text(&a.name, &b.name),
            Self::Brand => text(&a.brand, &b.brand),
            Self::ToolType => text(&a.tool_type, &b.tool_type),
            Self::Material => text(&a.material, &b.material),
            Self::Quantity => a.quantity.cmp(&b.quantity),
            Self::Price => a.price.cmp(&b.price),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub fn parse(key: &str) -> Self {
        if key.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// A single-key sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

/// Shop sort presets as `(key, label, sort)`.
const PRESETS: [(&str, &str, Sort); 6] = [
    ("name", "Name", Sort::new(SortField::Name, Direction::Asc)),
    ("price_low", "Price: Low to High", Sort::new(SortField::Price, Direction::Asc)),
    ("price_high", "Price: High to Low", Sort::new(SortField::Price, Direction::Desc)),
    ("stock", "Stock Quantity", Sort::new(SortField::Quantity, Direction::Desc)),
    ("brand", "Brand", Sort::new(SortField::Brand, Direction::Asc)),
    ("id", "Tool ID", Sort::new(SortField::Id, Direction::Asc)),
];

impl Sort {
    #[must_use]
    pub const fn new(field: SortField, direction: Direction) -> Self {
        Self { field, direction }
    }

    /// Shop preset by key; unknown keys sort by name.
    #[must_use]
    pub fn parse_preset(key: &str) -> Self {
        PRESETS
            .iter()
            .find(|(preset, _, _)| *preset == key)
            .map_or(PRESETS[0].2, |(_, _, sort)| *sort)
    }

    /// The shop preset key for this sort, if it is one.
    #[must_use]
    pub fn preset_key(&self) -> Option<&'static str> {
        PRESETS
            .iter()
            .find(|(_, _, sort)| sort == self)
            .map(|(key, _, _)| *key)
    }

    /// `(key, label)` pairs for the shop's sort dropdown.
    pub fn presets() -> impl Iterator<Item = (&'static str, &'static str)> {
        PRESETS.iter().map(|(key, label, _)| (*key, *label))
    }

    /// Sort after clicking a column header.
    ///
    /// Clicking the current column flips its direction; clicking another
    /// column sorts it ascending.
    #[must_use]
    pub fn toggled(current: Option<Self>, field: SortField) -> Self {
        match current {
            Some(sort) if sort.field == field => Self::new(field, sort.direction.flipped()),
            _ => Self::new(field, Direction::Asc),
        }
    }

    #[must_use]
    pub fn compare(&self, a: &CatalogItem, b: &CatalogItem) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// Search, facet, price and sort settings for one catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: String,
    pub scope: SearchScope,
    pub tool_type: Option<String>,
    pub brand: Option<String>,
    pub material: Option<String>,
    pub coating: Option<String>,
    pub workpiece: Option<String>,
    pub in_stock_only: bool,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    /// `None` keeps source order.
    pub sort: Option<Sort>,
    pub empty_filter: EmptyFilterPolicy,
}

impl CatalogQuery {
    fn selections(&self) -> [(Facet, Option<&str>); 5] {
        [
            (Facet::ToolType, self.tool_type.as_deref()),
            (Facet::Brand, self.brand.as_deref()),
            (Facet::Material, self.material.as_deref()),
            (Facet::Coating, self.coating.as_deref()),
            (Facet::Workpiece, self.workpiece.as_deref()),
        ]
    }

    /// Whether any search term, facet or bound is set.
    #[must_use]
    pub fn filters_active(&self) -> bool {
        !self.search.trim().is_empty()
            || self.selections().iter().any(|(_, value)| value.is_some())
            || self.in_stock_only
            || self.min_price.is_some()
            || self.max_price.is_some()
    }

    /// Whether one item passes every active filter.
    #[must_use]
    pub fn matches(&self, item: &CatalogItem) -> bool {
        let needle = self.search.trim().to_lowercase();
        let text_ok = needle.is_empty()
            || match self.scope {
                SearchScope::Listing => item.matches_listing_text(&needle),
                SearchScope::AnyField => item.matches_any_field(&needle),
            };

        text_ok
            && self
                .selections()
                .iter()
                .all(|(facet, wanted)| wanted.is_none_or(|value| facet.value_of(item) == value))
            && (!self.in_stock_only || item.is_in_stock())
            && self.min_price.is_none_or(|min| item.price >= min)
            && self.max_price.is_none_or(|max| item.price <= max)
    }

    /// Filter and sort a catalog.
    ///
    /// Sorting is stable so equal keys keep source order.
    #[must_use]
    pub fn run<'a>(&self, items: &'a [CatalogItem]) -> Vec<&'a CatalogItem> {
        if self.empty_filter == EmptyFilterPolicy::ShowNothing && !self.filters_active() {
            return Vec::new();
        }

        let mut matched: Vec<&CatalogItem> =
            items.iter().filter(|item| self.matches(item)).collect();
        if let Some(sort) = self.sort {
            matched.sort_by(|a, b| sort.compare(a, b));
        }
        matched
    }
}

/// Position of one page within a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Current page, 1-based.
    pub number: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl Page {
    /// Locate a requested page, clamping it into `1..=total_pages`.
    #[must_use]
    pub fn new(total_items: usize, requested: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_items.div_ceil(per_page);
        Self {
            number: requested.clamp(1, total_pages.max(1)),
            per_page,
            total_items,
            total_pages,
        }
    }

    /// Index range of this page's items.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        let start = ((self.number - 1) * self.per_page).min(self.total_items);
        let end = (start + self.per_page).min(self.total_items);
        start..end
    }

    /// This page's slice of `items`.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        items.get(range).unwrap_or_default()
    }

    /// 1-based index of the first item shown, 0 when empty.
    #[must_use]
    pub fn first_index(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            self.range().start + 1
        }
    }

    /// 1-based index of the last item shown, 0 when empty.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.range().end
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// Page numbers to link, up to five, centered on the current page
    /// where possible.
    #[must_use]
    pub fn window(&self) -> Vec<usize> {
        let count = PAGE_WINDOW.min(self.total_pages);
        if count == 0 {
            return Vec::new();
        }
        let start = self
            .total_pages
            .saturating_sub(PAGE_WINDOW - 1)
            .min(self.number.saturating_sub(2))
            .max(1);
        (start..start + count).collect()
    }
}
