use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{NewProduct as DomainNewProduct, Product as DomainProduct};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub base_price_cents: i64,
    pub current_stock: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub sku: &'a str,
    pub category: &'a str,
    pub base_price_cents: i64,
    pub current_stock: i32,
    pub description: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl From<Product> for DomainProduct {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sku: value.sku,
            category: value.category,
            base_price_cents: value.base_price_cents,
            current_stock: value.current_stock,
            description: value.description,
            image_url: value.image_url,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewProduct> for NewProduct<'a> {
    fn from(value: &'a DomainNewProduct) -> Self {
        Self {
            name: value.name.as_str(),
            sku: value.sku.as_str(),
            category: value.category.as_str(),
            base_price_cents: value.base_price_cents,
            current_stock: value.current_stock,
            description: value.description.as_deref(),
            image_url: value.image_url.as_deref(),
            updated_at: value.updated_at,
        }
    }
}
