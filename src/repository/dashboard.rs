use diesel::prelude::*;

use crate::{
    domain::dashboard::{
        DashboardCounts, DashboardSnapshot, InventoryValue, OPEN_ORDER_STATUSES,
        RECENT_ACTIVITY_LIMIT,
    },
    domain::material::MaterialListQuery,
    domain::money::saturating_total,
    domain::order::OrderListQuery,
    domain::quality_check::QualityCheckListQuery,
    domain::status::StatusMachine,
    domain::work_order::{WorkOrderListQuery, WorkOrderStatus},
    repository::errors::RepositoryResult,
    repository::{
        DashboardReader, DieselRepository, MaterialReader, OrderReader, QualityCheckReader,
        WorkOrderReader,
    },
};

impl DieselRepository {
    fn dashboard_counts(&self) -> RepositoryResult<DashboardCounts> {
        use crate::schema::{materials, orders, products, work_orders};

        let mut conn = self.conn()?;

        let active: Vec<&str> = WorkOrderStatus::ACTIVE.iter().map(|s| s.as_str()).collect();
        let open: Vec<&str> = OPEN_ORDER_STATUSES.iter().map(|s| s.as_str()).collect();

        let materials = materials::table.count().get_result::<i64>(&mut conn)?;
        let products = products::table.count().get_result::<i64>(&mut conn)?;
        let active_work_orders = work_orders::table
            .filter(work_orders::status.eq_any(active))
            .count()
            .get_result::<i64>(&mut conn)?;
        let pending_orders = orders::table
            .filter(orders::status.eq_any(open))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(DashboardCounts {
            materials: materials as usize,
            products: products as usize,
            active_work_orders: active_work_orders as usize,
            pending_orders: pending_orders as usize,
        })
    }

    fn inventory_value(&self) -> RepositoryResult<InventoryValue> {
        use crate::schema::{materials, products};

        let mut conn = self.conn()?;

        let materials_cents = saturating_total(
            materials::table
                .select((materials::current_stock, materials::price_cents))
                .load::<(f64, i64)>(&mut conn)?
                .into_iter()
                .map(|(stock, price)| (stock * price as f64).round() as i64),
        );

        let products_cents = saturating_total(
            products::table
                .select((products::current_stock, products::base_price_cents))
                .load::<(i32, i64)>(&mut conn)?
                .into_iter()
                .map(|(stock, price)| i64::from(stock).saturating_mul(price)),
        );

        Ok(InventoryValue::new(materials_cents, products_cents))
    }
}

impl DashboardReader for DieselRepository {
    fn dashboard_snapshot(&self) -> RepositoryResult<DashboardSnapshot> {
        let counts = self.dashboard_counts()?;

        let (_, low_stock_materials) =
            self.list_materials(MaterialListQuery::new().low_stock_only())?;
        let (_, recent_orders) =
            self.list_orders(OrderListQuery::new().paginate(1, RECENT_ACTIVITY_LIMIT))?;
        let (_, recent_work_orders) =
            self.list_work_orders(WorkOrderListQuery::new().paginate(1, RECENT_ACTIVITY_LIMIT))?;
        let (_, recent_quality_checks) = self
            .list_quality_checks(QualityCheckListQuery::new().paginate(1, RECENT_ACTIVITY_LIMIT))?;

        Ok(DashboardSnapshot {
            counts,
            low_stock_materials,
            recent_orders,
            recent_work_orders,
            recent_quality_checks,
            inventory_value: self.inventory_value()?,
        })
    }
}
