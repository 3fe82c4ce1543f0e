use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::material::{Material as DomainMaterial, MaterialDraft};
use crate::domain::supplier::Supplier as DomainSupplier;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(
    table_name = crate::schema::materials,
    belongs_to(super::supplier::Supplier, foreign_key = supplier_id)
)]
pub struct Material {
    pub id: i32,
    pub name: String,
    pub material_type: String,
    pub unit: String,
    pub current_stock: f64,
    pub reorder_level: f64,
    pub price_cents: i64,
    pub supplier_id: i32,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insert and full-replace payload; both write every column.
#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::materials)]
#[diesel(treat_none_as_null = true)]
pub struct MaterialChanges<'a> {
    pub name: &'a str,
    pub material_type: &'a str,
    pub unit: &'a str,
    pub current_stock: f64,
    pub reorder_level: f64,
    pub price_cents: i64,
    pub supplier_id: i32,
    pub description: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl Material {
    pub fn into_domain(self, supplier: Option<DomainSupplier>) -> DomainMaterial {
        DomainMaterial {
            id: self.id,
            name: self.name,
            material_type: self.material_type,
            unit: self.unit,
            current_stock: self.current_stock,
            reorder_level: self.reorder_level,
            price_cents: self.price_cents,
            supplier_id: self.supplier_id,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
            supplier,
        }
    }
}

impl From<Material> for DomainMaterial {
    fn from(value: Material) -> Self {
        value.into_domain(None)
    }
}

impl<'a> From<&'a MaterialDraft> for MaterialChanges<'a> {
    fn from(value: &'a MaterialDraft) -> Self {
        Self {
            name: value.name.as_str(),
            material_type: value.material_type.as_str(),
            unit: value.unit.as_str(),
            current_stock: value.current_stock,
            reorder_level: value.reorder_level,
            price_cents: value.price_cents,
            supplier_id: value.supplier_id,
            description: value.description.as_deref(),
            updated_at: value.updated_at,
        }
    }
}
