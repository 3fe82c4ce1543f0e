use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::supplier::Supplier;
use crate::pagination::Pagination;

/// Raw material (yarn, fabric, dye, ...) bought from a supplier.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Material {
    pub id: i32,
    pub name: String,
    /// Material family, for example `Yarn` or `Dye`.
    pub material_type: String,
    /// Unit of measure such as `kg` or `m`.
    pub unit: String,
    pub current_stock: f64,
    /// Stock level at or below which the material should be reordered.
    pub reorder_level: f64,
    /// Price per unit in cents.
    pub price_cents: i64,
    pub supplier_id: i32,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub supplier: Option<Supplier>,
}

impl Material {
    pub fn needs_reorder(&self) -> bool {
        self.current_stock <= self.reorder_level
    }

    /// Value of the stock on hand, rounded to cents and clamped to the `i64` range.
    pub fn stock_value_cents(&self) -> i64 {
        (self.current_stock * self.price_cents as f64).round() as i64
    }
}

/// Full set of writable material attributes.
///
/// Used both to create a material and to replace an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDraft {
    pub name: String,
    pub material_type: String,
    pub unit: String,
    pub current_stock: f64,
    pub reorder_level: f64,
    pub price_cents: i64,
    pub supplier_id: i32,
    pub description: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl MaterialDraft {
    pub fn new(
        name: impl Into<String>,
        material_type: impl Into<String>,
        unit: impl Into<String>,
        price_cents: i64,
        supplier_id: i32,
    ) -> Self {
        Self {
            name: name.into(),
            material_type: material_type.into(),
            unit: unit.into(),
            current_stock: 0.0,
            reorder_level: 0.0,
            price_cents,
            supplier_id,
            description: None,
            updated_at: chrono::Local::now().naive_utc(),
        }
    }

    pub fn with_stock(mut self, current_stock: f64, reorder_level: f64) -> Self {
        self.current_stock = current_stock;
        self.reorder_level = reorder_level;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Query definition used to list materials.
#[derive(Debug, Clone, Default)]
pub struct MaterialListQuery {
    pub search: Option<String>,
    pub supplier_id: Option<i32>,
    /// Only materials at or below their reorder level.
    pub low_stock_only: bool,
    pub pagination: Option<Pagination>,
}

impl MaterialListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn supplier_id(mut self, supplier_id: i32) -> Self {
        self.supplier_id = Some(supplier_id);
        self
    }

    pub fn low_stock_only(mut self) -> Self {
        self.low_stock_only = true;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
