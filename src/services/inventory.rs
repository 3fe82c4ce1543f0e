use std::collections::BTreeSet;

use serde::Deserialize;

use crate::domain::product::{LOW_STOCK_THRESHOLD, Product, ProductListQuery};
use crate::domain::stats::InventoryStats;
use crate::forms::inventory::{AddProductForm, UpdateStockForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::errors::RepositoryError;
use crate::repository::{ProductReader, ProductWriter};
use crate::services::{Mutation, ServiceError, ServiceResult};

/// Query parameters accepted by the inventory page.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    /// Page requested by the UI (1-based).
    pub page: Option<usize>,
}

/// Data required to render the inventory template.
pub struct InventoryPageData {
    pub products: Paginated<Product>,
    pub stats: InventoryStats,
    /// Distinct categories for the filter select, sorted.
    pub categories: Vec<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub low_stock_threshold: i32,
}

/// Loads the inventory overview: one page of products plus the summary cards.
pub fn load_inventory_page<R>(repo: &R, query: ProductsQuery) -> ServiceResult<InventoryPageData>
where
    R: ProductReader + ?Sized,
{
    let ProductsQuery {
        search,
        category,
        page,
    } = query;

    let search = search.filter(|term| !term.trim().is_empty());
    let category = category.filter(|value| !value.trim().is_empty());
    let page = page.unwrap_or(1);

    let mut list_query = ProductListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = search.as_ref() {
        list_query = list_query.search(term);
    }
    if let Some(value) = category.as_ref() {
        list_query = list_query.category(value);
    }

    let (total, items) = repo.list_products(list_query)?;
    let (_, all_products) = repo.list_products(ProductListQuery::new())?;

    let categories: BTreeSet<String> = all_products
        .iter()
        .map(|product| product.category.clone())
        .collect();

    Ok(InventoryPageData {
        products: Paginated::from_total(items, page, total, DEFAULT_ITEMS_PER_PAGE),
        stats: InventoryStats::from_products(&all_products),
        categories: categories.into_iter().collect(),
        search,
        category,
        low_stock_threshold: LOW_STOCK_THRESHOLD,
    })
}

/// All products ordered by name.
pub fn list_products<R>(repo: &R) -> ServiceResult<Vec<Product>>
where
    R: ProductReader + ?Sized,
{
    let (_, products) = repo.list_products(ProductListQuery::new())?;
    Ok(products)
}

pub fn get_product<R>(repo: &R, product_id: i32) -> ServiceResult<Product>
where
    R: ProductReader + ?Sized,
{
    repo.get_product_by_id(product_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn inventory_stats<R>(repo: &R) -> ServiceResult<InventoryStats>
where
    R: ProductReader + ?Sized,
{
    let (_, products) = repo.list_products(ProductListQuery::new())?;
    Ok(InventoryStats::from_products(&products))
}

/// Creates a product. A reused SKU is reported as a conflict.
pub fn create_product<R>(repo: &R, form: AddProductForm) -> ServiceResult<Mutation<Product>>
where
    R: ProductWriter + ?Sized,
{
    let new_product = form.into_new_product()?;

    match repo.create_product(&new_product) {
        Ok(product) => Ok(Mutation::new(product, ["/inventory", "/"])),
        Err(RepositoryError::Duplicate(_)) => Err(
            ServiceError::Conflict(format!("SKU {} is already in use", new_product.sku)),
        ),
        Err(err) => {
            log::error!("Failed to create product {}: {err}", new_product.sku);
            Err(err.into())
        }
    }
}

/// Replaces the stock level of a product. Last write wins.
pub fn update_product_stock<R>(
    repo: &R,
    product_id: i32,
    form: UpdateStockForm,
) -> ServiceResult<Mutation<Product>>
where
    R: ProductWriter + ?Sized,
{
    let current_stock = form.into_stock_level()?;

    match repo.update_product_stock(product_id, current_stock) {
        Ok(product) => Ok(Mutation::new(
            product,
            [
                "/inventory".to_string(),
                format!("/inventory/{product_id}"),
                "/".to_string(),
            ],
        )),
        Err(err) => {
            log::error!("Failed to update stock for product {product_id}: {err}");
            Err(err.into())
        }
    }
}
