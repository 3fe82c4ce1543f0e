//! Sample records shared by the service unit tests.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::customer::Customer;
use crate::domain::material::Material;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::product::Product;
use crate::domain::quality_check::QualityCheck;
use crate::domain::supplier::Supplier;
use crate::domain::user::User;
use crate::domain::work_order::{WorkOrder, WorkOrderMaterial, WorkOrderProduct, WorkOrderStatus};

pub fn datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap_or_default()
}

pub fn product(id: i32, name: &str, current_stock: i32, base_price_cents: i64) -> Product {
    Product {
        id,
        name: name.to_string(),
        sku: format!("SKU-{id}"),
        category: "Bedding".to_string(),
        base_price_cents,
        current_stock,
        description: None,
        image_url: None,
        created_at: datetime(),
        updated_at: datetime(),
    }
}

pub fn supplier(id: i32, name: &str) -> Supplier {
    Supplier {
        id,
        name: name.to_string(),
        contact_name: None,
        email: None,
        phone: None,
    }
}

pub fn material(id: i32, name: &str, current_stock: f64, reorder_level: f64) -> Material {
    Material {
        id,
        name: name.to_string(),
        material_type: "Yarn".to_string(),
        unit: "kg".to_string(),
        current_stock,
        reorder_level,
        price_cents: 450,
        supplier_id: 1,
        description: None,
        created_at: datetime(),
        updated_at: datetime(),
        supplier: Some(supplier(1, "Northern Mills")),
    }
}

pub fn customer(id: i32, name: &str) -> Customer {
    Customer {
        id,
        name: name.to_string(),
        contact_name: None,
        email: None,
        phone: None,
        address: None,
    }
}

pub fn user(id: i32, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

pub fn order(id: i32, status: OrderStatus, total_amount_cents: i64) -> Order {
    Order {
        id,
        order_number: format!("ORD-2024-{id:03}"),
        customer_id: 1,
        order_date: datetime(),
        delivery_date: None,
        status,
        total_amount_cents,
        created_by_id: 1,
        created_at: datetime(),
        updated_at: datetime(),
        customer: Some(customer(1, "Linen House")),
        created_by: None,
        items: Vec::new(),
        work_orders: Vec::new(),
    }
}

pub fn work_order(id: i32, status: WorkOrderStatus) -> WorkOrder {
    WorkOrder {
        id,
        work_order_number: format!("WO-2024-{id:03}"),
        description: None,
        start_date: date(3, 1),
        due_date: date(3, 20),
        status,
        order_id: None,
        created_by_id: 1,
        assigned_to_id: None,
        created_at: datetime(),
        updated_at: datetime(),
        order: None,
        created_by: Some(user(1, "Alice")),
        assigned_to: None,
        materials: Vec::new(),
        products: Vec::new(),
        processes: Vec::new(),
        quality_checks: Vec::new(),
    }
}

pub fn material_line(id: i32, work_order_id: i32, quantity: f64, consumed: f64) -> WorkOrderMaterial {
    WorkOrderMaterial {
        id,
        work_order_id,
        material_id: 1,
        quantity,
        consumed,
        material: None,
    }
}

pub fn product_line(
    id: i32,
    work_order_id: i32,
    planned_quantity: i32,
    produced_quantity: i32,
) -> WorkOrderProduct {
    WorkOrderProduct {
        id,
        work_order_id,
        product_id: 1,
        planned_quantity,
        produced_quantity,
        product: None,
    }
}

pub fn quality_check(id: i32, work_order_id: i32, checkpoint: &str, passed: bool) -> QualityCheck {
    QualityCheck {
        id,
        work_order_id,
        checkpoint: checkpoint.to_string(),
        passed,
        notes: None,
        image_url: None,
        created_at: datetime(),
        work_order_number: Some(format!("WO-2024-{work_order_id:03}")),
    }
}
