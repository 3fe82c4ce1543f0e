use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::customer::Customer;
use crate::domain::money::saturating_total;
use crate::domain::product::Product;
use crate::domain::status::{StatusMachine, StatusTransition, UnknownStatus};
use crate::domain::user::User;
use crate::domain::work_order::WorkOrder;
use crate::pagination::Pagination;

/// Lifecycle states of a customer order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order has been entered but not yet confirmed with the customer.
    #[default]
    Pending,
    /// Order has been confirmed and awaits production.
    Confirmed,
    /// Goods for the order are being manufactured.
    InProduction,
    /// Goods are finished and waiting for shipment.
    ReadyForDelivery,
    /// Order has been handed over to the customer.
    Delivered,
    /// Order has been cancelled; it may be reactivated.
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::ReadyForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Statuses whose totals count towards realised sales.
    pub const BOOKED: [OrderStatus; 4] = [
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::ReadyForDelivery,
        OrderStatus::Delivered,
    ];

    /// Human readable name used in badges.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::InProduction => "In Production",
            OrderStatus::ReadyForDelivery => "Ready for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

const PENDING_TRANSITIONS: &[StatusTransition<OrderStatus>] = &[
    StatusTransition {
        to: OrderStatus::Confirmed,
        label: "Confirm Order",
    },
    StatusTransition {
        to: OrderStatus::Cancelled,
        label: "Cancel Order",
    },
];

const CONFIRMED_TRANSITIONS: &[StatusTransition<OrderStatus>] = &[
    StatusTransition {
        to: OrderStatus::InProduction,
        label: "Mark as In Production",
    },
    StatusTransition {
        to: OrderStatus::Cancelled,
        label: "Cancel Order",
    },
];

const IN_PRODUCTION_TRANSITIONS: &[StatusTransition<OrderStatus>] = &[StatusTransition {
    to: OrderStatus::ReadyForDelivery,
    label: "Mark as Ready for Delivery",
}];

const READY_FOR_DELIVERY_TRANSITIONS: &[StatusTransition<OrderStatus>] = &[StatusTransition {
    to: OrderStatus::Delivered,
    label: "Mark as Delivered",
}];

const CANCELLED_TRANSITIONS: &[StatusTransition<OrderStatus>] = &[StatusTransition {
    to: OrderStatus::Pending,
    label: "Reactivate Order",
}];

impl StatusMachine for OrderStatus {
    fn transitions(self) -> &'static [StatusTransition<Self>] {
        match self {
            OrderStatus::Pending => PENDING_TRANSITIONS,
            OrderStatus::Confirmed => CONFIRMED_TRANSITIONS,
            OrderStatus::InProduction => IN_PRODUCTION_TRANSITIONS,
            OrderStatus::ReadyForDelivery => READY_FOR_DELIVERY_TRANSITIONS,
            OrderStatus::Delivered => &[],
            OrderStatus::Cancelled => CANCELLED_TRANSITIONS,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::InProduction => "IN_PRODUCTION",
            OrderStatus::ReadyForDelivery => "READY_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain representation of a customer order.
///
/// Relation fields are populated by detail reads and left empty by writes.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    pub id: i32,
    /// Human-friendly number such as `ORD-2025-042`.
    pub order_number: String,
    pub customer_id: i32,
    pub order_date: NaiveDateTime,
    pub delivery_date: Option<NaiveDate>,
    pub status: OrderStatus,
    /// Sum of item totals in cents, fixed when the order is created.
    pub total_amount_cents: i64,
    pub created_by_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub customer: Option<Customer>,
    pub created_by: Option<User>,
    pub items: Vec<OrderItem>,
    pub work_orders: Vec<WorkOrder>,
}

/// A single order line.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price_cents: i64,
    /// `quantity × unit_price_cents`, computed at creation.
    pub total_price_cents: i64,
    pub product: Option<Product>,
}

/// Line payload used when creating an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
}

impl NewOrderItem {
    /// Build a line and compute its total.
    ///
    /// The total saturates; forms reject lines whose total does not fit.
    pub fn new(product_id: i32, quantity: i32, unit_price_cents: i64) -> Self {
        Self {
            product_id,
            quantity,
            unit_price_cents,
            total_price_cents: i64::from(quantity).saturating_mul(unit_price_cents),
        }
    }
}

/// Payload required to insert a new order together with its lines.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub customer_id: i32,
    pub order_date: NaiveDateTime,
    pub delivery_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub total_amount_cents: i64,
    pub created_by_id: i32,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Build an order payload; the total is the sum of the line totals.
    pub fn new(
        order_number: impl Into<String>,
        customer_id: i32,
        created_by_id: i32,
        items: Vec<NewOrderItem>,
    ) -> Self {
        let total_amount_cents = saturating_total(items.iter().map(|item| item.total_price_cents));
        Self {
            order_number: order_number.into(),
            customer_id,
            order_date: chrono::Local::now().naive_utc(),
            delivery_date: None,
            status: OrderStatus::default(),
            total_amount_cents,
            created_by_id,
            items,
        }
    }

    pub fn with_delivery_date(mut self, delivery_date: NaiveDate) -> Self {
        self.delivery_date = Some(delivery_date);
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }
}

/// Query definition used to list orders.
#[derive(Debug, Clone, Default)]
pub struct OrderListQuery {
    /// Only orders in one of these statuses; empty means all.
    pub statuses: Vec<OrderStatus>,
    /// Matches the order number or the customer name.
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl OrderListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = OrderStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
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
