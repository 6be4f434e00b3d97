//! Stock lookup page.
//!
//! Searches every column of the stock listing. Nothing is listed until a
//! search term or facet is set.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use nexus_core::catalog::total_units;
use nexus_core::query::{STOCK_PAGE_SIZES, facet_selection, normalize_page_size};
use nexus_core::{
    CatalogQuery, Direction, EmptyFilterPolicy, Facet, FacetOptions, Page, SearchScope, Sort,
    SortField,
};
use serde::Deserialize;
use tracing::instrument;

use super::listing::{FacetSelect, Pager, lenient, link};
use crate::config::StockSource;
use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// Raw query parameters of the stock page.
#[derive(Debug, Default, Deserialize)]
pub struct StockParams {
    pub search: Option<String>,
    pub tool_type: Option<String>,
    pub brand: Option<String>,
    pub material: Option<String>,
    pub workpiece: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Stock page state after normalizing the parameters.
#[derive(Debug)]
struct StockState {
    search: String,
    tool_type: Option<String>,
    brand: Option<String>,
    material: Option<String>,
    workpiece: Option<String>,
    sort: Option<Sort>,
    page: usize,
    per_page: usize,
}

impl StockState {
    fn from_params(params: &StockParams) -> Self {
        let sort = params
            .sort
            .as_deref()
            .and_then(SortField::parse)
            .map(|field| Sort::new(field, Direction::parse(params.dir.as_deref().unwrap_or(""))));

        Self {
            search: params.search.as_deref().unwrap_or("").trim().to_string(),
            tool_type: facet_selection(params.tool_type.as_deref()),
            brand: facet_selection(params.brand.as_deref()),
            material: facet_selection(params.material.as_deref()),
            workpiece: facet_selection(params.workpiece.as_deref()),
            sort,
            page: lenient(params.page.as_deref()).unwrap_or(1),
            per_page: normalize_page_size(lenient(params.per_page.as_deref())),
        }
    }

    fn query(&self) -> CatalogQuery {
        CatalogQuery {
            search: self.search.clone(),
            scope: SearchScope::AnyField,
            tool_type: self.tool_type.clone(),
            brand: self.brand.clone(),
            material: self.material.clone(),
            workpiece: self.workpiece.clone(),
            sort: self.sort,
            empty_filter: EmptyFilterPolicy::ShowNothing,
            ..CatalogQuery::default()
        }
    }

    fn href(&self, sort: Option<Sort>, page: usize) -> String {
        let page = page.to_string();
        let per_page = self.per_page.to_string();
        link(
            "/stock",
            &[
                ("search", &self.search),
                ("tool_type", self.tool_type.as_deref().unwrap_or("")),
                ("brand", self.brand.as_deref().unwrap_or("")),
                ("material", self.material.as_deref().unwrap_or("")),
                ("workpiece", self.workpiece.as_deref().unwrap_or("")),
                ("sort", sort.map_or("", |s| s.field.key())),
                ("dir", sort.map_or("", |s| s.direction.as_str())),
                ("page", &page),
                ("per_page", &per_page),
            ],
        )
    }
}

/// One row of the stock table.
pub struct StockRow {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub tool_type: String,
    pub material: String,
    pub coating: String,
    pub dimensions: String,
    pub workpiece: String,
    pub quantity: u32,
    pub price: String,
    pub availability: &'static str,
    pub availability_class: &'static str,
    pub notes: String,
}

/// Sortable column header.
pub struct ColumnHeader {
    pub label: &'static str,
    pub href: String,
    /// Arrow shown next to the active sort column.
    pub indicator: &'static str,
}

pub struct PageSizeOption {
    pub size: usize,
    pub selected: bool,
}

/// Stock lookup template.
#[derive(Template, WebTemplate)]
#[template(path = "stock.html")]
pub struct StockTemplate {
    pub search: String,
    pub facets: Vec<FacetSelect>,
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<StockRow>,
    pub pager: Pager,
    pub page_sizes: Vec<PageSizeOption>,
    pub sort_key: String,
    pub sort_dir: String,
    pub filters_active: bool,
    pub catalog_items: usize,
    pub catalog_units: u64,
    pub matched_units: u64,
    pub source_label: &'static str,
    pub nonce: String,
}

/// Display the stock lookup page.
#[instrument(skip(state, params, nonce))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<StockParams>,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let listing = state.catalog().stock_listing().await?;
    let view = StockState::from_params(&params);
    let query = view.query();
    let options = FacetOptions::collect(&listing.items);

    let matched = query.run(&listing.items);
    let page = Page::new(matched.len(), view.page, view.per_page);
    let matched_units = total_units(matched.iter().copied());

    let rows = page
        .slice(&matched)
        .iter()
        .map(|item| {
            let availability = listing.availability(item);
            StockRow {
                id: item.id.to_string(),
                name: item.name.clone(),
                brand: item.brand.clone(),
                tool_type: item.tool_type.clone(),
                material: item.material.clone(),
                coating: item.coating.clone(),
                dimensions: item.dimensions(),
                workpiece: item.workpiece_material.clone(),
                quantity: item.quantity,
                price: item.price.to_string(),
                availability: availability.label(),
                availability_class: availability.css_class(),
                notes: item.application_notes.clone(),
            }
        })
        .collect();

    let columns = SortField::ALL
        .into_iter()
        .map(|field| {
            let indicator = match view.sort {
                Some(sort) if sort.field == field => match sort.direction {
                    Direction::Asc => "▲",
                    Direction::Desc => "▼",
                },
                _ => "",
            };
            ColumnHeader {
                label: field.label(),
                href: view.href(Some(Sort::toggled(view.sort, field)), 1),
                indicator,
            }
        })
        .collect();

    let facets = vec![
        FacetSelect::new(
            "tool_type",
            Facet::ToolType.label(),
            &options.tool_types,
            view.tool_type.as_deref(),
        ),
        FacetSelect::new(
            "brand",
            Facet::Brand.label(),
            &options.brands,
            view.brand.as_deref(),
        ),
        FacetSelect::new(
            "material",
            Facet::Material.label(),
            &options.materials,
            view.material.as_deref(),
        ),
        FacetSelect::new(
            "workpiece",
            Facet::Workpiece.label(),
            &options.workpieces,
            view.workpiece.as_deref(),
        ),
    ];

    tracing::debug!(
        matched = matched.len(),
        page = page.number,
        "Stock lookup"
    );

    Ok(StockTemplate {
        search: view.search.clone(),
        facets,
        columns,
        rows,
        pager: Pager::new(&page, |number| view.href(view.sort, number)),
        page_sizes: STOCK_PAGE_SIZES
            .into_iter()
            .map(|size| PageSizeOption {
                size,
                selected: size == view.per_page,
            })
            .collect(),
        sort_key: view.sort.map_or_else(String::new, |s| s.field.key().to_string()),
        sort_dir: view
            .sort
            .map_or_else(String::new, |s| s.direction.as_str().to_string()),
        filters_active: query.filters_active(),
        catalog_items: listing.items.len(),
        catalog_units: total_units(&listing.items),
        matched_units,
        source_label: match listing.source {
            StockSource::Spreadsheet => "catalog spreadsheet",
            StockSource::Airtable => "live stock table",
        },
        nonce,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> StockParams {
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let uri: axum::http::Uri = format!("/stock?{query}").parse().unwrap();
        Query::<StockParams>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_blank_params_use_defaults() {
        let view = StockState::from_params(&params(&[("page", ""), ("per_page", "")]));
        assert_eq!(view.page, 1);
        assert_eq!(view.per_page, 25);
        assert!(view.sort.is_none());
        assert!(!view.query().filters_active());
    }

    #[test]
    fn test_unsupported_page_size_falls_back() {
        let view = StockState::from_params(&params(&[("per_page", "7")]));
        assert_eq!(view.per_page, 25);
        let view = StockState::from_params(&params(&[("per_page", "50")]));
        assert_eq!(view.per_page, 50);
    }

    #[test]
    fn test_all_facet_is_unconstrained() {
        let view = StockState::from_params(&params(&[("brand", "All"), ("workpiece", "Aluminum")]));
        assert!(view.brand.is_none());
        assert_eq!(view.workpiece.as_deref(), Some("Aluminum"));
        assert!(view.query().filters_active());
        assert_eq!(view.query().scope, SearchScope::AnyField);
    }

    #[test]
    fn test_sort_parsing() {
        let view = StockState::from_params(&params(&[("sort", "price"), ("dir", "desc")]));
        assert_eq!(
            view.sort,
            Some(Sort::new(SortField::Price, Direction::Desc))
        );
        let view = StockState::from_params(&params(&[("sort", "colour")]));
        assert!(view.sort.is_none());
    }

    #[test]
    fn test_href_keeps_filters() {
        let view = StockState::from_params(&params(&[("search", "drill"), ("brand", "ISCAR")]));
        assert_eq!(
            view.href(None, 2),
            "/stock?search=drill&brand=ISCAR&page=2&per_page=25"
        );
    }
}
