use mockall::mock;

use super::{
    CustomerReader, CustomerWriter, DashboardReader, MaterialReader, MaterialWriter, OrderReader,
    OrderWriter, ProductReader, ProductWriter, QualityCheckReader, QualityCheckWriter,
    SupplierReader, SupplierWriter, UserReader, UserWriter, WorkOrderReader, WorkOrderWriter,
};
use crate::domain::{
    customer::{Customer, NewCustomer},
    dashboard::DashboardSnapshot,
    material::{Material, MaterialDraft, MaterialListQuery},
    order::{NewOrder, Order, OrderListQuery, OrderStatus},
    process::{NewProcess, Process},
    product::{NewProduct, Product, ProductListQuery},
    quality_check::{NewQualityCheck, QualityCheck, QualityCheckListQuery},
    supplier::{NewSupplier, Supplier},
    user::{NewUser, User},
    work_order::{
        NewWorkOrder, WorkOrder, WorkOrderListQuery, WorkOrderMaterial, WorkOrderProduct,
        WorkOrderStatus,
    },
};
use crate::repository::errors::RepositoryResult;

mock! {
    pub Repository {}

    impl ProductReader for Repository {
        fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
        fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    }

    impl ProductWriter for Repository {
        fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
        fn update_product_stock(&self, product_id: i32, current_stock: i32) -> RepositoryResult<Product>;
    }

    impl MaterialReader for Repository {
        fn get_material_by_id(&self, id: i32) -> RepositoryResult<Option<Material>>;
        fn list_materials(&self, query: MaterialListQuery) -> RepositoryResult<(usize, Vec<Material>)>;
    }

    impl MaterialWriter for Repository {
        fn create_material(&self, draft: &MaterialDraft) -> RepositoryResult<Material>;
        fn create_materials(&self, drafts: &[MaterialDraft]) -> RepositoryResult<usize>;
        fn update_material(&self, material_id: i32, draft: &MaterialDraft) -> RepositoryResult<Material>;
        fn delete_material(&self, material_id: i32) -> RepositoryResult<()>;
    }

    impl SupplierReader for Repository {
        fn get_supplier_by_id(&self, id: i32) -> RepositoryResult<Option<Supplier>>;
        fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>>;
    }

    impl SupplierWriter for Repository {
        fn create_supplier(&self, new_supplier: &NewSupplier) -> RepositoryResult<Supplier>;
    }

    impl CustomerReader for Repository {
        fn list_customers(&self) -> RepositoryResult<Vec<Customer>>;
    }

    impl CustomerWriter for Repository {
        fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
    }

    impl UserReader for Repository {
        fn list_users(&self) -> RepositoryResult<Vec<User>>;
    }

    impl UserWriter for Repository {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    }

    impl OrderReader for Repository {
        fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>>;
        fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
    }

    impl OrderWriter for Repository {
        fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
        fn update_order_status(&self, order_id: i32, from: OrderStatus, to: OrderStatus) -> RepositoryResult<Option<Order>>;
    }

    impl WorkOrderReader for Repository {
        fn get_work_order_by_id(&self, id: i32) -> RepositoryResult<Option<WorkOrder>>;
        fn list_work_orders(&self, query: WorkOrderListQuery) -> RepositoryResult<(usize, Vec<WorkOrder>)>;
    }

    impl WorkOrderWriter for Repository {
        fn create_work_order(&self, new_work_order: &NewWorkOrder) -> RepositoryResult<WorkOrder>;
        fn update_work_order_status(&self, work_order_id: i32, from: WorkOrderStatus, to: WorkOrderStatus) -> RepositoryResult<Option<WorkOrder>>;
        fn create_process(&self, new_process: &NewProcess) -> RepositoryResult<Process>;
        fn record_material_consumption(&self, work_order_id: i32, line_id: i32, amount: f64) -> RepositoryResult<Option<WorkOrderMaterial>>;
        fn record_production_output(&self, work_order_id: i32, line_id: i32, quantity: i32) -> RepositoryResult<Option<WorkOrderProduct>>;
    }

    impl QualityCheckReader for Repository {
        fn list_quality_checks(&self, query: QualityCheckListQuery) -> RepositoryResult<(usize, Vec<QualityCheck>)>;
    }

    impl QualityCheckWriter for Repository {
        fn create_quality_check(&self, new_check: &NewQualityCheck) -> RepositoryResult<QualityCheck>;
    }

    impl DashboardReader for Repository {
        fn dashboard_snapshot(&self) -> RepositoryResult<DashboardSnapshot>;
    }
}
