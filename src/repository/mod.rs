use crate::db::{DbConnection, DbPool};
use crate::domain::customer::{Customer, NewCustomer};
use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::material::{Material, MaterialDraft, MaterialListQuery};
use crate::domain::order::{NewOrder, Order, OrderListQuery, OrderStatus};
use crate::domain::process::{NewProcess, Process};
use crate::domain::product::{NewProduct, Product, ProductListQuery};
use crate::domain::quality_check::{NewQualityCheck, QualityCheck, QualityCheckListQuery};
use crate::domain::supplier::{NewSupplier, Supplier};
use crate::domain::user::{NewUser, User};
use crate::domain::work_order::{
    NewWorkOrder, WorkOrder, WorkOrderListQuery, WorkOrderMaterial, WorkOrderProduct,
    WorkOrderStatus,
};
use crate::repository::errors::RepositoryResult;

pub mod customer;
pub mod dashboard;
pub mod errors;
pub mod material;
pub mod order;
pub mod product;
pub mod quality_check;
pub mod supplier;
pub mod user;
pub mod work_order;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over finished products.
pub trait ProductReader {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
}

/// Write operations over finished products.
pub trait ProductWriter {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    /// Overwrite the stock level. Fails with `NotFound` for unknown ids.
    fn update_product_stock(&self, product_id: i32, current_stock: i32) -> RepositoryResult<Product>;
}

/// Read-only operations over raw materials. Results carry their supplier.
pub trait MaterialReader {
    fn get_material_by_id(&self, id: i32) -> RepositoryResult<Option<Material>>;
    fn list_materials(&self, query: MaterialListQuery) -> RepositoryResult<(usize, Vec<Material>)>;
}

/// Write operations over raw materials.
pub trait MaterialWriter {
    fn create_material(&self, draft: &MaterialDraft) -> RepositoryResult<Material>;
    /// Insert all drafts or none of them.
    fn create_materials(&self, drafts: &[MaterialDraft]) -> RepositoryResult<usize>;
    fn update_material(&self, material_id: i32, draft: &MaterialDraft) -> RepositoryResult<Material>;
    fn delete_material(&self, material_id: i32) -> RepositoryResult<()>;
}

pub trait SupplierReader {
    fn get_supplier_by_id(&self, id: i32) -> RepositoryResult<Option<Supplier>>;
    fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>>;
}

pub trait SupplierWriter {
    fn create_supplier(&self, new_supplier: &NewSupplier) -> RepositoryResult<Supplier>;
}

pub trait CustomerReader {
    fn list_customers(&self) -> RepositoryResult<Vec<Customer>>;
}

pub trait CustomerWriter {
    fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
}

pub trait UserReader {
    fn list_users(&self) -> RepositoryResult<Vec<User>>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
}

/// Read-only operations over customer orders.
pub trait OrderReader {
    /// Load an order with customer, creator, items with products and work orders.
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>>;
    /// List orders with customer and items, newest order date first.
    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
}

/// Write operations over customer orders.
pub trait OrderWriter {
    /// Insert the order and its items in one transaction.
    fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
    /// Move the order from `from` to `to`.
    ///
    /// Returns `None` when the order no longer exists or its status is no
    /// longer `from`.
    fn update_order_status(
        &self,
        order_id: i32,
        from: OrderStatus,
        to: OrderStatus,
    ) -> RepositoryResult<Option<Order>>;
}

/// Read-only operations over work orders.
pub trait WorkOrderReader {
    /// Load a work order with every relation populated.
    fn get_work_order_by_id(&self, id: i32) -> RepositoryResult<Option<WorkOrder>>;
    /// List work orders with creator and assignee, newest first.
    fn list_work_orders(
        &self,
        query: WorkOrderListQuery,
    ) -> RepositoryResult<(usize, Vec<WorkOrder>)>;
}

/// Write operations over work orders and their child records.
pub trait WorkOrderWriter {
    /// Insert the work order with its material and product lines in one transaction.
    fn create_work_order(&self, new_work_order: &NewWorkOrder) -> RepositoryResult<WorkOrder>;
    /// Same contract as [`OrderWriter::update_order_status`].
    fn update_work_order_status(
        &self,
        work_order_id: i32,
        from: WorkOrderStatus,
        to: WorkOrderStatus,
    ) -> RepositoryResult<Option<WorkOrder>>;
    fn create_process(&self, new_process: &NewProcess) -> RepositoryResult<Process>;
    /// Add `amount` to the consumed quantity of a material line.
    ///
    /// The write only applies while the work order is `IN_PROGRESS`; `Ok(None)`
    /// means it was not. A line outside the work order is `NotFound`.
    fn record_material_consumption(
        &self,
        work_order_id: i32,
        line_id: i32,
        amount: f64,
    ) -> RepositoryResult<Option<WorkOrderMaterial>>;
    /// Add `quantity` to the produced quantity of a product line.
    ///
    /// Same contract as [`WorkOrderWriter::record_material_consumption`].
    fn record_production_output(
        &self,
        work_order_id: i32,
        line_id: i32,
        quantity: i32,
    ) -> RepositoryResult<Option<WorkOrderProduct>>;
}

pub trait QualityCheckReader {
    fn list_quality_checks(
        &self,
        query: QualityCheckListQuery,
    ) -> RepositoryResult<(usize, Vec<QualityCheck>)>;
}

pub trait QualityCheckWriter {
    fn create_quality_check(
        &self,
        new_check: &NewQualityCheck,
    ) -> RepositoryResult<QualityCheck>;
}

pub trait DashboardReader {
    fn dashboard_snapshot(&self) -> RepositoryResult<DashboardSnapshot>;
}
