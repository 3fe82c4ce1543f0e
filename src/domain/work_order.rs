use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::material::Material;
use crate::domain::order::Order;
use crate::domain::process::Process;
use crate::domain::product::Product;
use crate::domain::quality_check::QualityCheck;
use crate::domain::status::{StatusMachine, StatusTransition, UnknownStatus};
use crate::domain::user::User;
use crate::pagination::Pagination;

/// Lifecycle states of a production work order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOrderStatus {
    #[default]
    Planned,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub const ALL: [WorkOrderStatus; 5] = [
        WorkOrderStatus::Planned,
        WorkOrderStatus::InProgress,
        WorkOrderStatus::OnHold,
        WorkOrderStatus::Completed,
        WorkOrderStatus::Cancelled,
    ];

    /// Work orders counted as active on the dashboard and for overdue checks.
    pub const ACTIVE: [WorkOrderStatus; 2] = [WorkOrderStatus::Planned, WorkOrderStatus::InProgress];

    /// A new work order may only start in one of these statuses.
    pub fn is_initial(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkOrderStatus::Planned => "Planned",
            WorkOrderStatus::InProgress => "In Progress",
            WorkOrderStatus::OnHold => "On Hold",
            WorkOrderStatus::Completed => "Completed",
            WorkOrderStatus::Cancelled => "Cancelled",
        }
    }
}

const PLANNED_TRANSITIONS: &[StatusTransition<WorkOrderStatus>] = &[
    StatusTransition {
        to: WorkOrderStatus::InProgress,
        label: "Start Production",
    },
    StatusTransition {
        to: WorkOrderStatus::Cancelled,
        label: "Cancel Work Order",
    },
];

const IN_PROGRESS_TRANSITIONS: &[StatusTransition<WorkOrderStatus>] = &[
    StatusTransition {
        to: WorkOrderStatus::OnHold,
        label: "Put On Hold",
    },
    StatusTransition {
        to: WorkOrderStatus::Completed,
        label: "Mark as Completed",
    },
];

const ON_HOLD_TRANSITIONS: &[StatusTransition<WorkOrderStatus>] = &[
    StatusTransition {
        to: WorkOrderStatus::InProgress,
        label: "Resume Production",
    },
    StatusTransition {
        to: WorkOrderStatus::Cancelled,
        label: "Cancel Work Order",
    },
];

const CANCELLED_TRANSITIONS: &[StatusTransition<WorkOrderStatus>] = &[StatusTransition {
    to: WorkOrderStatus::Planned,
    label: "Reactivate Work Order",
}];

impl StatusMachine for WorkOrderStatus {
    fn transitions(self) -> &'static [StatusTransition<Self>] {
        match self {
            WorkOrderStatus::Planned => PLANNED_TRANSITIONS,
            WorkOrderStatus::InProgress => IN_PROGRESS_TRANSITIONS,
            WorkOrderStatus::OnHold => ON_HOLD_TRANSITIONS,
            WorkOrderStatus::Completed => &[],
            WorkOrderStatus::Cancelled => CANCELLED_TRANSITIONS,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            WorkOrderStatus::Planned => "PLANNED",
            WorkOrderStatus::InProgress => "IN_PROGRESS",
            WorkOrderStatus::OnHold => "ON_HOLD",
            WorkOrderStatus::Completed => "COMPLETED",
            WorkOrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for WorkOrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        WorkOrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain representation of a production run.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkOrder {
    pub id: i32,
    /// Human-friendly number such as `WO-2025-007`.
    pub work_order_number: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: WorkOrderStatus,
    pub order_id: Option<i32>,
    pub created_by_id: i32,
    pub assigned_to_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub order: Option<Box<Order>>,
    pub created_by: Option<User>,
    pub assigned_to: Option<User>,
    pub materials: Vec<WorkOrderMaterial>,
    pub products: Vec<WorkOrderProduct>,
    pub processes: Vec<Process>,
    pub quality_checks: Vec<QualityCheck>,
}

impl WorkOrder {
    /// Still active after its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status.is_initial() && self.due_date < today
    }
}

/// Planned consumption of a material by a work order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorkOrderMaterial {
    pub id: i32,
    pub work_order_id: i32,
    pub material_id: i32,
    pub quantity: f64,
    /// Amount used so far; starts at zero and only grows.
    pub consumed: f64,
    pub material: Option<Material>,
}

/// Planned output of a product by a work order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorkOrderProduct {
    pub id: i32,
    pub work_order_id: i32,
    pub product_id: i32,
    pub planned_quantity: i32,
    /// Units finished so far; starts at zero and only grows.
    pub produced_quantity: i32,
    pub product: Option<Product>,
}

/// Material line of a new work order. Consumption always starts at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkOrderMaterial {
    pub material_id: i32,
    pub quantity: f64,
}

/// Product line of a new work order. Output always starts at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkOrderProduct {
    pub product_id: i32,
    pub planned_quantity: i32,
}

/// Payload required to insert a work order together with its lines.
#[derive(Debug, Clone)]
pub struct NewWorkOrder {
    pub work_order_number: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: WorkOrderStatus,
    pub order_id: Option<i32>,
    pub created_by_id: i32,
    pub assigned_to_id: Option<i32>,
    pub materials: Vec<NewWorkOrderMaterial>,
    pub products: Vec<NewWorkOrderProduct>,
}

impl NewWorkOrder {
    pub fn new(
        work_order_number: impl Into<String>,
        start_date: NaiveDate,
        due_date: NaiveDate,
        created_by_id: i32,
    ) -> Self {
        Self {
            work_order_number: work_order_number.into(),
            description: None,
            start_date,
            due_date,
            status: WorkOrderStatus::default(),
            order_id: None,
            created_by_id,
            assigned_to_id: None,
            materials: Vec::new(),
            products: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: WorkOrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_order_id(mut self, order_id: i32) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_assigned_to_id(mut self, assigned_to_id: i32) -> Self {
        self.assigned_to_id = Some(assigned_to_id);
        self
    }

    pub fn with_material(mut self, material_id: i32, quantity: f64) -> Self {
        self.materials.push(NewWorkOrderMaterial {
            material_id,
            quantity,
        });
        self
    }

    pub fn with_product(mut self, product_id: i32, planned_quantity: i32) -> Self {
        self.products.push(NewWorkOrderProduct {
            product_id,
            planned_quantity,
        });
        self
    }
}

/// Query definition used to list work orders.
#[derive(Debug, Clone, Default)]
pub struct WorkOrderListQuery {
    /// Only work orders in one of these statuses; empty means all.
    pub statuses: Vec<WorkOrderStatus>,
    pub order_id: Option<i32>,
    /// Matches the work order number or the description.
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl WorkOrderListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = WorkOrderStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn order_id(mut self, order_id: i32) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
