use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::order::{
    NewOrder as DomainNewOrder, NewOrderItem as DomainNewOrderItem, Order as DomainOrder,
    OrderItem as DomainOrderItem, OrderStatus,
};
use crate::domain::status::StatusMachine;
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub id: i32,
    pub order_number: String,
    pub customer_id: i32,
    pub order_date: NaiveDateTime,
    pub delivery_date: Option<NaiveDate>,
    pub status: String,
    pub total_amount_cents: i64,
    pub created_by_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(belongs_to(Order, foreign_key = order_id))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder<'a> {
    pub order_number: &'a str,
    pub customer_id: i32,
    pub order_date: NaiveDateTime,
    pub delivery_date: Option<NaiveDate>,
    pub status: &'a str,
    pub total_amount_cents: i64,
    pub created_by_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
}

pub(crate) fn parse_order_status(value: &str) -> Result<OrderStatus, RepositoryError> {
    value
        .parse()
        .map_err(|_| RepositoryError::InvalidData(format!("order status `{value}`")))
}

impl TryFrom<Order> for DomainOrder {
    type Error = RepositoryError;

    fn try_from(value: Order) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            order_number: value.order_number,
            customer_id: value.customer_id,
            order_date: value.order_date,
            delivery_date: value.delivery_date,
            status: parse_order_status(&value.status)?,
            total_amount_cents: value.total_amount_cents,
            created_by_id: value.created_by_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
            customer: None,
            created_by: None,
            items: Vec::new(),
            work_orders: Vec::new(),
        })
    }
}

impl From<OrderItem> for DomainOrderItem {
    fn from(value: OrderItem) -> Self {
        Self {
            id: value.id,
            order_id: value.order_id,
            product_id: value.product_id,
            quantity: value.quantity,
            unit_price_cents: value.unit_price_cents,
            total_price_cents: value.total_price_cents,
            product: None,
        }
    }
}

impl<'a> From<&'a DomainNewOrder> for NewOrder<'a> {
    fn from(value: &'a DomainNewOrder) -> Self {
        Self {
            order_number: value.order_number.as_str(),
            customer_id: value.customer_id,
            order_date: value.order_date,
            delivery_date: value.delivery_date,
            status: value.status.as_str(),
            total_amount_cents: value.total_amount_cents,
            created_by_id: value.created_by_id,
        }
    }
}

impl NewOrderItem {
    pub fn from_domain(order_id: i32, value: &DomainNewOrderItem) -> Self {
        Self {
            order_id,
            product_id: value.product_id,
            quantity: value.quantity,
            unit_price_cents: value.unit_price_cents,
            total_price_cents: value.total_price_cents,
        }
    }
}
