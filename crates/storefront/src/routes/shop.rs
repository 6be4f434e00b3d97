//! Shop route handlers.
//!
//! The shop lists the catalog spreadsheet with search, facet dropdowns,
//! an in-stock toggle, price bounds and sort presets.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use nexus_core::query::{SHOP_PAGE_SIZE, facet_selection};
use nexus_core::{
    CatalogItem, CatalogQuery, EmptyFilterPolicy, Facet, FacetOptions, Money, Page, SearchScope,
    Sort, ToolId,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use super::listing::{FacetSelect, Pager, lenient, link};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::VisitorSession;
use crate::state::AppState;

const RELATED_LIMIT: usize = 4;

/// Raw query parameters of the shop page.
#[derive(Debug, Default, Deserialize)]
pub struct ShopParams {
    pub search: Option<String>,
    pub tool_type: Option<String>,
    pub brand: Option<String>,
    pub material: Option<String>,
    pub coating: Option<String>,
    pub workpiece: Option<String>,
    pub in_stock: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

impl ShopParams {
    fn query(&self) -> CatalogQuery {
        let price = |raw: Option<&str>| lenient::<Decimal>(raw).map(Money::new);
        CatalogQuery {
            search: self.search.as_deref().unwrap_or("").trim().to_string(),
            scope: SearchScope::Listing,
            tool_type: facet_selection(self.tool_type.as_deref()),
            brand: facet_selection(self.brand.as_deref()),
            material: facet_selection(self.material.as_deref()),
            coating: facet_selection(self.coating.as_deref()),
            workpiece: facet_selection(self.workpiece.as_deref()),
            in_stock_only: self
                .in_stock
                .as_deref()
                .is_some_and(|v| matches!(v, "on" | "true" | "1")),
            min_price: price(self.min_price.as_deref()),
            max_price: price(self.max_price.as_deref()),
            sort: Some(Sort::parse_preset(self.sort.as_deref().unwrap_or(""))),
            empty_filter: EmptyFilterPolicy::ShowAll,
        }
    }
}

fn shop_href(query: &CatalogQuery, page: usize) -> String {
    let min = query.min_price.map(|m| m.amount().to_string()).unwrap_or_default();
    let max = query.max_price.map(|m| m.amount().to_string()).unwrap_or_default();
    let page = page.to_string();
    link(
        "/shop",
        &[
            ("search", &query.search),
            ("tool_type", query.tool_type.as_deref().unwrap_or("")),
            ("brand", query.brand.as_deref().unwrap_or("")),
            ("material", query.material.as_deref().unwrap_or("")),
            ("coating", query.coating.as_deref().unwrap_or("")),
            ("workpiece", query.workpiece.as_deref().unwrap_or("")),
            ("in_stock", if query.in_stock_only { "on" } else { "" }),
            ("min_price", &min),
            ("max_price", &max),
            ("sort", query.sort.and_then(|s| s.preset_key()).unwrap_or("")),
            ("page", &page),
        ],
    )
}

/// Catalog item card data for templates.
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub tool_type: String,
    pub material: String,
    pub coating: String,
    pub dimensions: String,
    pub price: String,
    pub quantity: u32,
    pub min_order: u32,
    pub in_stock: bool,
    pub availability: &'static str,
    pub availability_class: &'static str,
}

impl From<&CatalogItem> for ProductCard {
    fn from(item: &CatalogItem) -> Self {
        let availability = item.availability();
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            brand: item.brand.clone(),
            tool_type: item.tool_type.clone(),
            material: item.material.clone(),
            coating: item.coating.clone(),
            dimensions: item.dimensions(),
            price: item.price.to_string(),
            quantity: item.quantity,
            min_order: item.min_order(),
            in_stock: item.is_in_stock(),
            availability: availability.label(),
            availability_class: availability.css_class(),
        }
    }
}

pub struct SortOption {
    pub key: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Shop listing template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopIndexTemplate {
    pub search: String,
    pub facets: Vec<FacetSelect>,
    pub in_stock_only: bool,
    pub min_price: String,
    pub max_price: String,
    pub price_hint: String,
    pub sort_options: Vec<SortOption>,
    pub products: Vec<ProductCard>,
    pub pager: Pager,
    pub filters_active: bool,
    pub nonce: String,
}

/// Catalog item detail template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/show.html")]
pub struct ShopShowTemplate {
    pub product: ProductCard,
    pub cutting_dia: String,
    pub shank_dia: String,
    pub overall_length: String,
    pub insert_size: String,
    pub workpiece: String,
    pub application_notes: String,
    pub in_cart: u32,
    pub related: Vec<ProductCard>,
    pub nonce: String,
}

/// Display the shop listing.
#[instrument(skip(state, params, nonce))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ShopParams>,
    CspNonce(nonce): CspNonce,
) -> impl IntoResponse {
    let items = state.catalog().shop_items().await;
    let query = params.query();
    let options = FacetOptions::collect(&items);

    let matched = query.run(&items);
    let requested = lenient(params.page.as_deref()).unwrap_or(1);
    let page = Page::new(matched.len(), requested, SHOP_PAGE_SIZE);

    let facets = vec![
        FacetSelect::new("tool_type", Facet::ToolType.label(), &options.tool_types, query.tool_type.as_deref()),
        FacetSelect::new("brand", Facet::Brand.label(), &options.brands, query.brand.as_deref()),
        FacetSelect::new("material", Facet::Material.label(), &options.materials, query.material.as_deref()),
        FacetSelect::new("coating", Facet::Coating.label(), &options.coatings, query.coating.as_deref()),
        FacetSelect::new("workpiece", Facet::Workpiece.label(), &options.workpieces, query.workpiece.as_deref()),
    ];

    let current_sort = query.sort.and_then(|s| s.preset_key());
    let sort_options = Sort::presets()
        .map(|(key, label)| SortOption {
            key,
            label,
            selected: current_sort == Some(key),
        })
        .collect();

    ShopIndexTemplate {
        search: query.search.clone(),
        facets,
        in_stock_only: query.in_stock_only,
        min_price: query.min_price.map(|m| m.amount().to_string()).unwrap_or_default(),
        max_price: query.max_price.map(|m| m.amount().to_string()).unwrap_or_default(),
        price_hint: options
            .price_range
            .map(|(lo, hi)| format!("{lo} to {hi}"))
            .unwrap_or_default(),
        sort_options,
        products: page
            .slice(&matched)
            .iter()
            .map(|item| ProductCard::from(*item))
            .collect(),
        pager: Pager::new(&page, |number| shop_href(&query, number)),
        filters_active: query.filters_active(),
        nonce,
    }
}

/// Display one catalog item.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: VisitorSession,
    Path(id): Path<String>,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let tool_id = ToolId::new(&id);
    let items = state.catalog().shop_items().await;
    let item = items
        .iter()
        .find(|item| item.id == tool_id)
        .ok_or_else(|| AppError::NotFound(format!("Tool {id}")))?;

    let related = items
        .iter()
        .filter(|other| other.id != item.id && other.tool_type == item.tool_type)
        .take(RELATED_LIMIT)
        .map(ProductCard::from)
        .collect();

    let in_cart = session.cart().await?.quantity_of(&item.id);

    Ok(ShopShowTemplate {
        product: ProductCard::from(item),
        cutting_dia: item.cutting_dia.clone(),
        shank_dia: item.shank_dia.clone(),
        overall_length: item.overall_length.clone(),
        insert_size: item.insert_size.clone(),
        workpiece: item.workpiece_material.clone(),
        application_notes: item.application_notes.clone(),
        in_cart,
        related,
        nonce,
    })
}
