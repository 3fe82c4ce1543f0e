//! Summary cards shown above the inventory, production and sales tables.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::money::saturating_total;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::product::Product;
use crate::domain::work_order::{WorkOrder, WorkOrderStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    pub total_products: usize,
    pub categories: usize,
    pub low_stock_products: usize,
    pub total_stock_value_cents: i64,
}

impl InventoryStats {
    pub fn from_products(products: &[Product]) -> Self {
        let categories: HashSet<&str> = products.iter().map(|p| p.category.as_str()).collect();

        Self {
            total_products: products.len(),
            categories: categories.len(),
            low_stock_products: products.iter().filter(|p| p.is_low_stock()).count(),
            total_stock_value_cents: saturating_total(
                products.iter().map(Product::stock_value_cents),
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductionStats {
    pub planned: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Planned or in-progress work orders past their due date.
    pub overdue: usize,
}

impl ProductionStats {
    pub fn from_work_orders(work_orders: &[WorkOrder], today: NaiveDate) -> Self {
        let count = |status: WorkOrderStatus| {
            work_orders
                .iter()
                .filter(|work_order| work_order.status == status)
                .count()
        };

        Self {
            planned: count(WorkOrderStatus::Planned),
            in_progress: count(WorkOrderStatus::InProgress),
            completed: count(WorkOrderStatus::Completed),
            overdue: work_orders
                .iter()
                .filter(|work_order| work_order.is_overdue(today))
                .count(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesStats {
    pub pending: usize,
    pub in_production: usize,
    pub ready_for_delivery: usize,
    /// Total of confirmed, in-production, ready and delivered orders.
    pub total_sales_cents: i64,
}

impl SalesStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();

        Self {
            pending: count(OrderStatus::Pending),
            in_production: count(OrderStatus::InProduction),
            ready_for_delivery: count(OrderStatus::ReadyForDelivery),
            total_sales_cents: saturating_total(
                orders
                    .iter()
                    .filter(|order| OrderStatus::BOOKED.contains(&order.status))
                    .map(|order| order.total_amount_cents),
            ),
        }
    }
}
