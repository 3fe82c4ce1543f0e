use serde::Serialize;

use crate::domain::material::Material;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::quality_check::QualityCheck;
use crate::domain::work_order::WorkOrder;

/// Number of rows shown in each "recent activity" list.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Orders still waiting to enter production.
pub const OPEN_ORDER_STATUSES: [OrderStatus; 2] = [OrderStatus::Pending, OrderStatus::Confirmed];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub materials: usize,
    pub products: usize,
    /// Planned or in-progress work orders.
    pub active_work_orders: usize,
    /// Pending or confirmed orders.
    pub pending_orders: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryValue {
    pub materials_cents: i64,
    pub products_cents: i64,
    pub total_cents: i64,
}

impl InventoryValue {
    pub fn new(materials_cents: i64, products_cents: i64) -> Self {
        Self {
            materials_cents,
            products_cents,
            total_cents: materials_cents.saturating_add(products_cents),
        }
    }
}

/// Everything the dashboard page shows, read in one go.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub counts: DashboardCounts,
    /// Materials at or below their reorder level, with supplier.
    pub low_stock_materials: Vec<Material>,
    /// Most recent orders by order date, with customer.
    pub recent_orders: Vec<Order>,
    /// Most recently created work orders, with creator.
    pub recent_work_orders: Vec<WorkOrder>,
    /// Most recent quality checks, with work order number.
    pub recent_quality_checks: Vec<QualityCheck>,
    pub inventory_value: InventoryValue,
}
