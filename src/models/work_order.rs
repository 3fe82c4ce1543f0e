use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::status::StatusMachine;
use crate::domain::work_order::{
    NewWorkOrder as DomainNewWorkOrder, WorkOrder as DomainWorkOrder,
    WorkOrderMaterial as DomainWorkOrderMaterial, WorkOrderProduct as DomainWorkOrderProduct,
    WorkOrderStatus,
};
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::work_orders)]
pub struct WorkOrder {
    pub id: i32,
    pub work_order_number: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
    pub order_id: Option<i32>,
    pub created_by_id: i32,
    pub assigned_to_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::work_order_materials)]
#[diesel(belongs_to(WorkOrder, foreign_key = work_order_id))]
pub struct WorkOrderMaterial {
    pub id: i32,
    pub work_order_id: i32,
    pub material_id: i32,
    pub quantity: f64,
    pub consumed: f64,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::work_order_products)]
#[diesel(belongs_to(WorkOrder, foreign_key = work_order_id))]
pub struct WorkOrderProduct {
    pub id: i32,
    pub work_order_id: i32,
    pub product_id: i32,
    pub planned_quantity: i32,
    pub produced_quantity: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::work_orders)]
pub struct NewWorkOrder<'a> {
    pub work_order_number: &'a str,
    pub description: Option<&'a str>,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: &'a str,
    pub order_id: Option<i32>,
    pub created_by_id: i32,
    pub assigned_to_id: Option<i32>,
}

/// Consumed quantity is left to the column default.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::work_order_materials)]
pub struct NewWorkOrderMaterial {
    pub work_order_id: i32,
    pub material_id: i32,
    pub quantity: f64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::work_order_products)]
pub struct NewWorkOrderProduct {
    pub work_order_id: i32,
    pub product_id: i32,
    pub planned_quantity: i32,
}

pub(crate) fn parse_work_order_status(value: &str) -> Result<WorkOrderStatus, RepositoryError> {
    value
        .parse()
        .map_err(|_| RepositoryError::InvalidData(format!("work order status `{value}`")))
}

impl TryFrom<WorkOrder> for DomainWorkOrder {
    type Error = RepositoryError;

    fn try_from(value: WorkOrder) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            work_order_number: value.work_order_number,
            description: value.description,
            start_date: value.start_date,
            due_date: value.due_date,
            status: parse_work_order_status(&value.status)?,
            order_id: value.order_id,
            created_by_id: value.created_by_id,
            assigned_to_id: value.assigned_to_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
            order: None,
            created_by: None,
            assigned_to: None,
            materials: Vec::new(),
            products: Vec::new(),
            processes: Vec::new(),
            quality_checks: Vec::new(),
        })
    }
}

impl From<WorkOrderMaterial> for DomainWorkOrderMaterial {
    fn from(value: WorkOrderMaterial) -> Self {
        Self {
            id: value.id,
            work_order_id: value.work_order_id,
            material_id: value.material_id,
            quantity: value.quantity,
            consumed: value.consumed,
            material: None,
        }
    }
}

impl From<WorkOrderProduct> for DomainWorkOrderProduct {
    fn from(value: WorkOrderProduct) -> Self {
        Self {
            id: value.id,
            work_order_id: value.work_order_id,
            product_id: value.product_id,
            planned_quantity: value.planned_quantity,
            produced_quantity: value.produced_quantity,
            product: None,
        }
    }
}

impl<'a> From<&'a DomainNewWorkOrder> for NewWorkOrder<'a> {
    fn from(value: &'a DomainNewWorkOrder) -> Self {
        Self {
            work_order_number: value.work_order_number.as_str(),
            description: value.description.as_deref(),
            start_date: value.start_date,
            due_date: value.due_date,
            status: value.status.as_str(),
            order_id: value.order_id,
            created_by_id: value.created_by_id,
            assigned_to_id: value.assigned_to_id,
        }
    }
}
