use serde::Serialize;

use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::stats::{InventoryStats, ProductionStats, SalesStats};
use crate::repository::{DashboardReader, OrderReader, ProductReader, WorkOrderReader};
use crate::services::{ServiceResult, inventory, production, sales};

/// Summary cards of the inventory, production and sales pages in one payload.
#[derive(Debug, Serialize)]
pub struct StatsOverview {
    pub inventory: InventoryStats,
    pub production: ProductionStats,
    pub sales: SalesStats,
}

/// Everything the landing page shows.
pub fn load_dashboard<R>(repo: &R) -> ServiceResult<DashboardSnapshot>
where
    R: DashboardReader + ?Sized,
{
    repo.dashboard_snapshot().map_err(|err| {
        log::error!("Failed to load dashboard: {err}");
        err.into()
    })
}

pub fn load_stats<R>(repo: &R) -> ServiceResult<StatsOverview>
where
    R: ProductReader + WorkOrderReader + OrderReader + ?Sized,
{
    Ok(StatsOverview {
        inventory: inventory::inventory_stats(repo)?,
        production: production::production_stats(repo)?,
        sales: sales::sales_stats(repo)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::{DashboardCounts, InventoryValue};
    use crate::domain::order::OrderStatus;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::{ServiceError, fixtures};

    #[test]
    fn snapshot_is_passed_through() {
        let mut repo = MockRepository::new();
        repo.expect_dashboard_snapshot().returning(|| {
            Ok(DashboardSnapshot {
                counts: DashboardCounts {
                    materials: 3,
                    products: 2,
                    active_work_orders: 1,
                    pending_orders: 4,
                },
                low_stock_materials: vec![fixtures::material(1, "Cotton", 5.0, 10.0)],
                recent_orders: vec![fixtures::order(1, OrderStatus::Pending, 100)],
                recent_work_orders: Vec::new(),
                recent_quality_checks: Vec::new(),
                inventory_value: InventoryValue::new(2250, 1000),
            })
        });

        let snapshot = load_dashboard(&repo).unwrap();

        assert_eq!(snapshot.counts.pending_orders, 4);
        assert_eq!(snapshot.inventory_value.total_cents, 3250);
        assert_eq!(snapshot.low_stock_materials.len(), 1);
    }

    #[test]
    fn storage_failure_is_internal() {
        let mut repo = MockRepository::new();
        repo.expect_dashboard_snapshot()
            .returning(|| Err(RepositoryError::InvalidData("order status".to_string())));

        assert!(matches!(
            load_dashboard(&repo),
            Err(ServiceError::Internal(_))
        ));
    }
}
