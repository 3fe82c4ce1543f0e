use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::money::MAX_QUANTITY;
use crate::domain::process::{NewProcess, ProcessStatus};
use crate::domain::work_order::{NewWorkOrder, WorkOrderStatus};
use crate::forms::{
    FormError, FormResult, empty_string_as_none, finite_number, optional_multiline, optional_text,
    parse_datetime_local, required_text,
};

const MAX_MATERIAL_AMOUNT: f64 = MAX_QUANTITY as f64;

const WORK_ORDER_NUMBER_MAX_LEN: usize = 32;
const LABEL_MAX_LEN: u64 = 64;

/// Planned material usage line of the "New work order" form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorkOrderMaterialForm {
    #[validate(range(min = 1, message = "material is required"))]
    pub material_id: i32,
    #[validate(range(
        exclusive_min = 0.0,
        max = MAX_MATERIAL_AMOUNT,
        message = "quantity is out of range"
    ))]
    pub quantity: f64,
}

/// Planned output line of the "New work order" form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorkOrderProductForm {
    #[validate(range(min = 1, message = "product is required"))]
    pub product_id: i32,
    #[validate(range(min = 1, max = MAX_QUANTITY, message = "planned quantity is out of range"))]
    pub planned_quantity: i32,
}

/// Form payload emitted when submitting the "New work order" form.
#[derive(Debug, Deserialize, Validate)]
pub struct WorkOrderForm {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Initial status; only `PLANNED` and `IN_PROGRESS` are accepted.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<WorkOrderStatus>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub order_id: Option<i32>,
    #[validate(range(min = 1, message = "creator is required"))]
    pub created_by_id: i32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub assigned_to_id: Option<i32>,
    /// Explicit work order number; generated when absent.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub work_order_number: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "at least one material is required"), nested)]
    pub materials: Vec<WorkOrderMaterialForm>,
    #[serde(default)]
    #[validate(length(min = 1, message = "at least one product is required"), nested)]
    pub products: Vec<WorkOrderProductForm>,
}

impl WorkOrderForm {
    /// Sanitized work order number supplied by the caller, if any.
    pub fn supplied_work_order_number(&self) -> Option<String> {
        optional_text(self.work_order_number.as_deref())
    }

    /// Validates the payload and builds the work order with `work_order_number`.
    ///
    /// Consumption and output of every line start at zero regardless of input.
    pub fn into_new_work_order(self, work_order_number: String) -> FormResult<NewWorkOrder> {
        self.validate()?;

        if work_order_number.len() > WORK_ORDER_NUMBER_MAX_LEN {
            return Err(FormError::Invalid {
                field: "work_order_number",
                message: format!("must be at most {WORK_ORDER_NUMBER_MAX_LEN} characters"),
            });
        }

        let status = self.status.unwrap_or_default();
        if !status.is_initial() {
            return Err(FormError::Invalid {
                field: "status",
                message: format!("a new work order cannot start as {status}"),
            });
        }

        let mut work_order = NewWorkOrder::new(
            work_order_number,
            self.start_date,
            self.due_date,
            self.created_by_id,
        )
        .with_status(status);

        if let Some(description) = optional_multiline(self.description.as_deref()) {
            work_order = work_order.with_description(description);
        }
        if let Some(order_id) = self.order_id {
            work_order = work_order.with_order_id(order_id);
        }
        if let Some(assigned_to_id) = self.assigned_to_id {
            work_order = work_order.with_assigned_to_id(assigned_to_id);
        }
        for line in &self.materials {
            work_order = work_order
                .with_material(line.material_id, finite_number(line.quantity, "quantity")?);
        }
        for line in &self.products {
            work_order = work_order.with_product(line.product_id, line.planned_quantity);
        }

        Ok(work_order)
    }
}

/// Target status picked from the work order's status menu.
#[derive(Debug, Deserialize)]
pub struct UpdateWorkOrderStatusForm {
    pub status: WorkOrderStatus,
}

/// Form payload for recording a manufacturing step.
#[derive(Debug, Deserialize, Validate)]
pub struct ProcessForm {
    #[validate(length(min = 1, max = LABEL_MAX_LEN, message = "process type is required"))]
    pub process_type: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub machine: Option<String>,
    /// `datetime-local` value.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<ProcessStatus>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub notes: Option<String>,
}

impl ProcessForm {
    pub fn into_new_process(self, work_order_id: i32) -> FormResult<NewProcess> {
        self.validate()?;

        let process_type = required_text(&self.process_type, "process_type")?;
        let start_time = parse_time(self.start_time.as_deref(), "start_time")?;
        let end_time = parse_time(self.end_time.as_deref(), "end_time")?;

        if let (Some(start), Some(end)) = (start_time, end_time)
            && end < start
        {
            return Err(FormError::Invalid {
                field: "end_time",
                message: "end time cannot be before start time".to_string(),
            });
        }

        let mut process = NewProcess::new(work_order_id, process_type)
            .with_times(start_time, end_time)
            .with_status(self.status.unwrap_or_default());

        if let Some(machine) = optional_text(self.machine.as_deref()) {
            process = process.with_machine(machine);
        }
        if let Some(notes) = optional_multiline(self.notes.as_deref()) {
            process = process.with_notes(notes);
        }

        Ok(process)
    }
}

fn parse_time(
    value: Option<&str>,
    field: &'static str,
) -> FormResult<Option<chrono::NaiveDateTime>> {
    match value {
        None => Ok(None),
        Some(raw) => parse_datetime_local(raw)
            .map(Some)
            .ok_or_else(|| FormError::Invalid {
                field,
                message: format!("`{raw}` is not a valid date and time"),
            }),
    }
}

/// Amount of material taken from stock for a work order line.
#[derive(Debug, Deserialize, Validate)]
pub struct ConsumptionForm {
    #[validate(range(
        exclusive_min = 0.0,
        max = MAX_MATERIAL_AMOUNT,
        message = "amount is out of range"
    ))]
    pub amount: f64,
}

impl ConsumptionForm {
    pub fn into_amount(self) -> FormResult<f64> {
        self.validate()?;
        finite_number(self.amount, "amount")
    }
}

/// Units finished for a work order line.
#[derive(Debug, Deserialize, Validate)]
pub struct OutputForm {
    #[validate(range(min = 1, max = MAX_QUANTITY, message = "quantity is out of range"))]
    pub quantity: i32,
}

impl OutputForm {
    pub fn into_quantity(self) -> FormResult<i32> {
        self.validate()?;
        Ok(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, day).unwrap_or_default()
    }

    fn form() -> WorkOrderForm {
        WorkOrderForm {
            description: Some("Bath towels for spring".to_string()),
            start_date: date(1),
            due_date: date(20),
            status: None,
            order_id: Some(7),
            created_by_id: 1,
            assigned_to_id: None,
            work_order_number: None,
            materials: vec![WorkOrderMaterialForm {
                material_id: 3,
                quantity: 12.5,
            }],
            products: vec![WorkOrderProductForm {
                product_id: 4,
                planned_quantity: 100,
            }],
        }
    }

    #[test]
    fn work_order_form_builds_lines() {
        let work_order = match form().into_new_work_order("WO-2025-010".to_string()) {
            Ok(work_order) => work_order,
            Err(err) => panic!("expected work order, got {err}"),
        };

        assert_eq!(work_order.status, WorkOrderStatus::Planned);
        assert_eq!(work_order.order_id, Some(7));
        assert_eq!(work_order.materials.len(), 1);
        assert_eq!(work_order.materials[0].quantity, 12.5);
        assert_eq!(work_order.products[0].planned_quantity, 100);
    }

    #[test]
    fn work_order_cannot_start_on_hold() {
        let mut payload = form();
        payload.status = Some(WorkOrderStatus::OnHold);

        assert!(matches!(
            payload.into_new_work_order("WO-2025-010".to_string()),
            Err(FormError::Invalid { field: "status", .. })
        ));
    }

    #[test]
    fn lines_must_be_present_and_positive() {
        let mut payload = form();
        payload.products.clear();
        assert!(matches!(
            payload.into_new_work_order("WO-2025-010".to_string()),
            Err(FormError::Validation(_))
        ));

        let mut payload = form();
        payload.materials[0].quantity = 0.0;
        assert!(matches!(
            payload.into_new_work_order("WO-2025-010".to_string()),
            Err(FormError::Validation(_))
        ));
    }

    #[test]
    fn nested_lines_decode_from_query_string() {
        let qs = "start_date=2025-04-01&due_date=2025-04-20&created_by_id=1&order_id=&assigned_to_id=2\
                  &materials[0][material_id]=3&materials[0][quantity]=1.5\
                  &products[0][product_id]=4&products[0][planned_quantity]=10";
        let form: WorkOrderForm = match serde_qs::Config::new(5, false).deserialize_str(qs) {
            Ok(form) => form,
            Err(err) => panic!("failed to parse: {err}"),
        };

        assert_eq!(form.order_id, None);
        assert_eq!(form.assigned_to_id, Some(2));
        assert_eq!(form.materials[0].quantity, 1.5);
    }

    #[test]
    fn process_end_must_not_precede_start() {
        let form = ProcessForm {
            process_type: "Dyeing".to_string(),
            machine: Some("Jet 2".to_string()),
            start_time: Some("2025-04-02T10:00".to_string()),
            end_time: Some("2025-04-02T09:00".to_string()),
            status: None,
            notes: None,
        };

        assert!(matches!(
            form.into_new_process(1),
            Err(FormError::Invalid { field: "end_time", .. })
        ));
    }

    #[test]
    fn process_defaults_to_pending() {
        let form = ProcessForm {
            process_type: "Weaving".to_string(),
            machine: None,
            start_time: Some("2025-04-02T08:00".to_string()),
            end_time: None,
            status: None,
            notes: None,
        };

        let process = match form.into_new_process(5) {
            Ok(process) => process,
            Err(err) => panic!("expected process, got {err}"),
        };
        assert_eq!(process.status, ProcessStatus::Pending);
        assert_eq!(process.work_order_id, 5);
        assert!(process.start_time.is_some());
    }

    #[test]
    fn consumption_must_be_positive() {
        assert!(ConsumptionForm { amount: 0.0 }.into_amount().is_err());
        assert!(matches!(ConsumptionForm { amount: 2.5 }.into_amount(), Ok(v) if v == 2.5));
        assert!(OutputForm { quantity: 0 }.into_quantity().is_err());
    }
}
