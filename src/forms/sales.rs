use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::customer::NewCustomer;
use crate::domain::money::{
    MAX_AMOUNT, MAX_QUANTITY, cents_from_amount, checked_total, line_total_cents,
};
use crate::domain::order::{NewOrder, NewOrderItem, OrderStatus};
use crate::forms::{
    FormError, FormResult, empty_string_as_none, finite_number, optional_multiline, optional_text,
    required_text,
};

const NAME_MAX_LEN: u64 = 128;
const ORDER_NUMBER_MAX_LEN: usize = 32;

/// One line of the "New order" form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemForm {
    #[validate(range(min = 1, message = "product is required"))]
    pub product_id: i32,
    #[validate(range(min = 1, max = MAX_QUANTITY, message = "quantity is out of range"))]
    pub quantity: i32,
    /// Unit price as a decimal amount.
    #[validate(range(min = 0.0, max = MAX_AMOUNT, message = "unit price is out of range"))]
    pub unit_price: f64,
}

/// Form payload emitted when submitting the "New order" form.
///
/// HTML submits items as `items[0][product_id]=..`, decoded with `serde_qs`.
#[derive(Debug, Deserialize, Validate)]
pub struct OrderForm {
    #[validate(range(min = 1, message = "customer is required"))]
    pub customer_id: i32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub delivery_date: Option<NaiveDate>,
    /// Initial status; defaults to `PENDING`.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<OrderStatus>,
    #[validate(range(min = 1, message = "creator is required"))]
    pub created_by_id: i32,
    /// Explicit order number; generated when absent.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub order_number: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<OrderItemForm>,
}

impl OrderForm {
    /// Sanitized order number supplied by the caller, if any.
    pub fn supplied_order_number(&self) -> Option<String> {
        optional_text(self.order_number.as_deref())
    }

    /// Validates the payload and builds the order with `order_number`.
    pub fn into_new_order(self, order_number: String) -> FormResult<NewOrder> {
        self.validate()?;

        if order_number.len() > ORDER_NUMBER_MAX_LEN {
            return Err(FormError::Invalid {
                field: "order_number",
                message: format!("must be at most {ORDER_NUMBER_MAX_LEN} characters"),
            });
        }

        let mut items = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let unit_price_cents = cents_from_amount(finite_number(item.unit_price, "unit_price")?);
            if line_total_cents(item.quantity, unit_price_cents).is_none() {
                return Err(too_large("items"));
            }
            items.push(NewOrderItem::new(item.product_id, item.quantity, unit_price_cents));
        }
        if checked_total(items.iter().map(|item: &NewOrderItem| item.total_price_cents)).is_none() {
            return Err(too_large("items"));
        }

        let mut order = NewOrder::new(order_number, self.customer_id, self.created_by_id, items)
            .with_status(self.status.unwrap_or_default());

        if let Some(delivery_date) = self.delivery_date {
            order = order.with_delivery_date(delivery_date);
        }

        Ok(order)
    }
}

fn too_large(field: &'static str) -> FormError {
    FormError::Invalid {
        field,
        message: "order total is too large".to_string(),
    }
}

/// Target status picked from the order's status menu.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusForm {
    pub status: OrderStatus,
}

/// Form payload for adding a customer.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCustomerForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub contact_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub address: Option<String>,
}

impl AddCustomerForm {
    pub fn into_new_customer(self) -> FormResult<NewCustomer> {
        self.validate()?;

        let mut customer = NewCustomer::new(required_text(&self.name, "name")?);

        if let Some(contact_name) = optional_text(self.contact_name.as_deref()) {
            customer = customer.with_contact_name(contact_name);
        }
        if let Some(email) = optional_text(self.email.as_deref()) {
            customer = customer.with_email(email);
        }
        if let Some(phone) = optional_text(self.phone.as_deref()) {
            customer = customer.with_phone(phone);
        }
        if let Some(address) = optional_multiline(self.address.as_deref()) {
            customer = customer.with_address(address);
        }

        Ok(customer)
    }
}
