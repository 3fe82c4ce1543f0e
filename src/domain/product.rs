use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

/// Products below this stock level are highlighted in the inventory views.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Domain representation of a finished textile product kept in stock.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier of the product.
    pub id: i32,
    /// Human-readable name of the product.
    pub name: String,
    /// Stock keeping unit identifier, unique across products.
    pub sku: String,
    /// Free-form category such as `Bedding` or `Apparel`.
    pub category: String,
    /// List price represented in cents.
    pub base_price_cents: i64,
    /// Units currently on hand.
    pub current_stock: i32,
    /// Optional longer description shown to users.
    pub description: Option<String>,
    /// Optional picture of the product.
    pub image_url: Option<String>,
    /// Timestamp for when the product record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the product record.
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Display-only low stock marker.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock < LOW_STOCK_THRESHOLD
    }

    /// Value of the units on hand at list price, in cents.
    pub fn stock_value_cents(&self) -> i64 {
        i64::from(self.current_stock).saturating_mul(self.base_price_cents)
    }
}

/// Payload required to insert a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub base_price_cents: i64,
    pub current_stock: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Timestamp captured when the product payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewProduct {
    /// Build a new product payload with no stock and the current timestamp.
    pub fn new(
        name: impl Into<String>,
        sku: impl Into<String>,
        category: impl Into<String>,
        base_price_cents: i64,
    ) -> Self {
        let now = chrono::Local::now().naive_utc();
        Self {
            name: name.into(),
            sku: sku.into(),
            category: category.into(),
            base_price_cents,
            current_stock: 0,
            description: None,
            image_url: None,
            updated_at: now,
        }
    }

    /// Set the opening stock level.
    pub fn with_stock(mut self, current_stock: i32) -> Self {
        self.current_stock = current_stock;
        self
    }

    /// Attach a descriptive text to the product payload.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach an image location to the product payload.
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// Query definition used to list products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Optional name, SKU or category search term.
    pub search: Option<String>,
    /// Optional exact category filter.
    pub category: Option<String>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    /// Construct a query that targets all products.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter the results by a search term applied to the name, SKU or category.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Filter the results by an exact category match.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
