use chrono::NaiveDate;
use rand::Rng;
use serde::Deserialize;

use crate::domain::material::{Material, MaterialListQuery};
use crate::domain::numbering::{WORK_ORDER_PREFIX, generate_document_number};
use crate::domain::order::{Order, OrderListQuery};
use crate::domain::process::Process;
use crate::domain::product::{Product, ProductListQuery};
use crate::domain::stats::ProductionStats;
use crate::domain::status::{StatusMachine, StatusTransition};
use crate::domain::user::User;
use crate::domain::work_order::{
    WorkOrder, WorkOrderListQuery, WorkOrderMaterial, WorkOrderProduct, WorkOrderStatus,
};
use crate::forms::empty_string_as_none;
use crate::forms::production::{
    ConsumptionForm, OutputForm, ProcessForm, UpdateWorkOrderStatusForm, WorkOrderForm,
};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::errors::RepositoryError;
use crate::repository::{
    MaterialReader, OrderReader, ProductReader, UserReader, WorkOrderReader, WorkOrderWriter,
};
use crate::services::{
    Mutation, ServiceError, ServiceResult, check_transition, insert_with_document_number,
};

/// Query parameters accepted by the production page and the work orders API.
#[derive(Debug, Default, Deserialize)]
pub struct WorkOrdersQuery {
    #[serde(default)]
    pub status: Vec<WorkOrderStatus>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub order_id: Option<i32>,
    pub search: Option<String>,
    pub page: Option<usize>,
}

impl WorkOrdersQuery {
    fn list_query(&self) -> WorkOrderListQuery {
        let mut query = WorkOrderListQuery::new().statuses(self.status.iter().copied());
        if let Some(order_id) = self.order_id {
            query = query.order_id(order_id);
        }
        if let Some(term) = self.search.as_ref().filter(|term| !term.trim().is_empty()) {
            query = query.search(term.as_str());
        }
        query
    }
}

pub struct ProductionPageData {
    pub work_orders: Paginated<WorkOrder>,
    pub stats: ProductionStats,
    pub selected_statuses: Vec<WorkOrderStatus>,
    pub search: Option<String>,
    /// Rows on this page that are past their due date.
    pub overdue_ids: Vec<i32>,
}

/// Work order detail with the actions its page may offer.
pub struct WorkOrderPageData {
    pub work_order: WorkOrder,
    pub transitions: &'static [StatusTransition<WorkOrderStatus>],
    /// Consumption and output can be recorded.
    pub can_record_progress: bool,
}

/// Choices for the "New work order" form.
pub struct NewWorkOrderPageData {
    pub orders: Vec<Order>,
    pub materials: Vec<Material>,
    pub products: Vec<Product>,
    pub users: Vec<User>,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn work_order_paths(work_order_id: i32) -> Vec<String> {
    vec![
        "/production".to_string(),
        format!("/production/{work_order_id}"),
        "/".to_string(),
    ]
}

pub fn load_production_page<R>(repo: &R, query: WorkOrdersQuery) -> ServiceResult<ProductionPageData>
where
    R: WorkOrderReader + ?Sized,
{
    let page = query.page.unwrap_or(1);
    let list_query = query.list_query().paginate(page, DEFAULT_ITEMS_PER_PAGE);

    let (total, items) = repo.list_work_orders(list_query)?;
    let today = today();
    let stats = production_stats_on(repo, today)?;
    let overdue_ids = items
        .iter()
        .filter(|work_order| work_order.is_overdue(today))
        .map(|work_order| work_order.id)
        .collect();

    Ok(ProductionPageData {
        work_orders: Paginated::from_total(items, page, total, DEFAULT_ITEMS_PER_PAGE),
        stats,
        selected_statuses: query.status,
        search: query.search.filter(|term| !term.trim().is_empty()),
        overdue_ids,
    })
}

/// Work orders matching the filters, newest first.
pub fn list_work_orders<R>(repo: &R, query: WorkOrdersQuery) -> ServiceResult<Vec<WorkOrder>>
where
    R: WorkOrderReader + ?Sized,
{
    let (_, work_orders) = repo.list_work_orders(query.list_query())?;
    Ok(work_orders)
}

pub fn production_stats<R>(repo: &R) -> ServiceResult<ProductionStats>
where
    R: WorkOrderReader + ?Sized,
{
    production_stats_on(repo, today())
}

fn production_stats_on<R>(repo: &R, today: NaiveDate) -> ServiceResult<ProductionStats>
where
    R: WorkOrderReader + ?Sized,
{
    let (_, work_orders) = repo.list_work_orders(WorkOrderListQuery::new())?;
    Ok(ProductionStats::from_work_orders(&work_orders, today))
}

pub fn get_work_order<R>(repo: &R, work_order_id: i32) -> ServiceResult<WorkOrder>
where
    R: WorkOrderReader + ?Sized,
{
    repo.get_work_order_by_id(work_order_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn load_work_order_page<R>(repo: &R, work_order_id: i32) -> ServiceResult<WorkOrderPageData>
where
    R: WorkOrderReader + ?Sized,
{
    let work_order = get_work_order(repo, work_order_id)?;

    Ok(WorkOrderPageData {
        transitions: work_order.status.transitions(),
        can_record_progress: work_order.status == WorkOrderStatus::InProgress,
        work_order,
    })
}

pub fn load_new_work_order_page<R>(repo: &R) -> ServiceResult<NewWorkOrderPageData>
where
    R: OrderReader + MaterialReader + ProductReader + UserReader + ?Sized,
{
    let (_, orders) = repo.list_orders(OrderListQuery::new())?;
    let (_, materials) = repo.list_materials(MaterialListQuery::new())?;
    let (_, products) = repo.list_products(ProductListQuery::new())?;

    Ok(NewWorkOrderPageData {
        orders,
        materials,
        products,
        users: repo.list_users()?,
    })
}

/// Creates a work order with its material and product lines.
///
/// Consumed and produced quantities start at zero. Numbers follow
/// `WO-<year>-<nnn>` and are regenerated on collision.
pub fn create_work_order<R, G>(
    repo: &R,
    form: WorkOrderForm,
    rng: &mut G,
) -> ServiceResult<Mutation<WorkOrder>>
where
    R: WorkOrderWriter + ?Sized,
    G: Rng + ?Sized,
{
    let supplied = form.supplied_work_order_number();
    let generated = supplied.is_none();
    let number = supplied.unwrap_or_else(|| generate_document_number(WORK_ORDER_PREFIX, rng));

    let mut new_work_order = form.into_new_work_order(number.clone())?;
    let order_id = new_work_order.order_id;

    let result = insert_with_document_number(WORK_ORDER_PREFIX, number, generated, rng, |number| {
        new_work_order.work_order_number = number.to_string();
        repo.create_work_order(&new_work_order)
    });

    match result {
        Ok(work_order) => {
            log::info!("Created work order {}", work_order.work_order_number);
            let mut paths = vec!["/production".to_string(), "/".to_string()];
            if let Some(order_id) = order_id {
                paths.push(format!("/sales/{order_id}"));
            }
            Ok(Mutation::new(work_order, paths))
        }
        Err(err) => {
            if matches!(err, ServiceError::Internal(_)) {
                log::error!(
                    "Failed to create work order {}: {err}",
                    new_work_order.work_order_number
                );
            }
            Err(err)
        }
    }
}

/// Moves a work order along its status table, conditionally on the status read.
pub fn update_work_order_status<R>(
    repo: &R,
    work_order_id: i32,
    form: UpdateWorkOrderStatusForm,
) -> ServiceResult<Mutation<WorkOrder>>
where
    R: WorkOrderReader + WorkOrderWriter + ?Sized,
{
    let work_order = get_work_order(repo, work_order_id)?;
    check_transition(work_order.status, form.status)?;

    match repo.update_work_order_status(work_order_id, work_order.status, form.status) {
        Ok(Some(updated)) => Ok(Mutation::new(updated, work_order_paths(work_order_id))),
        Ok(None) => Err(ServiceError::Conflict(format!(
            "work order {} was changed by someone else, reload and try again",
            work_order.work_order_number
        ))),
        Err(err) => {
            log::error!("Failed to update status of work order {work_order_id}: {err}");
            Err(err.into())
        }
    }
}

/// Records a manufacturing step against a work order.
pub fn record_process<R>(
    repo: &R,
    work_order_id: i32,
    form: ProcessForm,
) -> ServiceResult<Mutation<Process>>
where
    R: WorkOrderReader + WorkOrderWriter + ?Sized,
{
    let new_process = form.into_new_process(work_order_id)?;
    get_work_order(repo, work_order_id)?;

    match repo.create_process(&new_process) {
        Ok(process) => Ok(Mutation::new(
            process,
            [format!("/production/{work_order_id}")],
        )),
        Err(err) => {
            log::error!("Failed to record process for work order {work_order_id}: {err}");
            Err(err.into())
        }
    }
}

fn in_progress_work_order<R>(repo: &R, work_order_id: i32) -> ServiceResult<WorkOrder>
where
    R: WorkOrderReader + ?Sized,
{
    let work_order = get_work_order(repo, work_order_id)?;
    if work_order.status != WorkOrderStatus::InProgress {
        return Err(not_in_progress(&work_order));
    }
    Ok(work_order)
}

fn not_in_progress(work_order: &WorkOrder) -> ServiceError {
    ServiceError::Conflict(format!(
        "progress can only be recorded while work order {} is in progress",
        work_order.work_order_number
    ))
}

/// Adds consumed material to a line of an in-progress work order.
pub fn record_material_consumption<R>(
    repo: &R,
    work_order_id: i32,
    line_id: i32,
    form: ConsumptionForm,
) -> ServiceResult<Mutation<WorkOrderMaterial>>
where
    R: WorkOrderReader + WorkOrderWriter + ?Sized,
{
    let amount = form.into_amount()?;
    let work_order = in_progress_work_order(repo, work_order_id)?;
    if !work_order.materials.iter().any(|line| line.id == line_id) {
        return Err(ServiceError::NotFound);
    }

    match repo.record_material_consumption(work_order_id, line_id, amount) {
        Ok(Some(line)) => Ok(Mutation::new(line, [format!("/production/{work_order_id}")])),
        Ok(None) => Err(not_in_progress(&work_order)),
        Err(RepositoryError::NotFound) => Err(ServiceError::NotFound),
        Err(err) => {
            log::error!(
                "Failed to record consumption on line {line_id} of work order {work_order_id}: {err}"
            );
            Err(err.into())
        }
    }
}

/// Adds finished units to a line of an in-progress work order.
pub fn record_production_output<R>(
    repo: &R,
    work_order_id: i32,
    line_id: i32,
    form: OutputForm,
) -> ServiceResult<Mutation<WorkOrderProduct>>
where
    R: WorkOrderReader + WorkOrderWriter + ?Sized,
{
    let quantity = form.into_quantity()?;
    let work_order = in_progress_work_order(repo, work_order_id)?;
    if !work_order.products.iter().any(|line| line.id == line_id) {
        return Err(ServiceError::NotFound);
    }

    match repo.record_production_output(work_order_id, line_id, quantity) {
        Ok(Some(line)) => Ok(Mutation::new(line, [format!("/production/{work_order_id}")])),
        Ok(None) => Err(not_in_progress(&work_order)),
        Err(RepositoryError::NotFound) => Err(ServiceError::NotFound),
        Err(err) => {
            log::error!(
                "Failed to record output on line {line_id} of work order {work_order_id}: {err}"
            );
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::domain::work_order::NewWorkOrder;
    use crate::forms::production::{WorkOrderMaterialForm, WorkOrderProductForm};
    use crate::repository::mock::MockRepository;
    use crate::services::fixtures;

    fn work_order_form(status: Option<WorkOrderStatus>) -> WorkOrderForm {
        WorkOrderForm {
            description: Some("Spring towels".to_string()),
            start_date: fixtures::date(3, 1),
            due_date: fixtures::date(3, 20),
            status,
            order_id: Some(5),
            created_by_id: 1,
            assigned_to_id: None,
            work_order_number: None,
            materials: vec![WorkOrderMaterialForm {
                material_id: 1,
                quantity: 12.5,
            }],
            products: vec![WorkOrderProductForm {
                product_id: 2,
                planned_quantity: 100,
            }],
        }
    }

    fn persisted(new_work_order: &NewWorkOrder) -> WorkOrder {
        let mut work_order = fixtures::work_order(1, new_work_order.status);
        work_order.work_order_number = new_work_order.work_order_number.clone();
        work_order.materials = new_work_order
            .materials
            .iter()
            .map(|line| fixtures::material_line(1, 1, line.quantity, 0.0))
            .collect();
        work_order.products = new_work_order
            .products
            .iter()
            .map(|line| fixtures::product_line(1, 1, line.planned_quantity, 0))
            .collect();
        work_order
    }

    fn in_progress_with_lines() -> WorkOrder {
        let mut work_order = fixtures::work_order(1, WorkOrderStatus::InProgress);
        work_order.materials = vec![fixtures::material_line(11, 1, 10.0, 2.0)];
        work_order.products = vec![fixtures::product_line(21, 1, 50, 5)];
        work_order
    }

    #[test]
    fn created_lines_start_at_zero() {
        let mut repo = MockRepository::new();
        repo.expect_create_work_order()
            .withf(|new_work_order| {
                new_work_order.work_order_number.starts_with("WO-")
                    && new_work_order.status == WorkOrderStatus::Planned
            })
            .times(1)
            .returning(|new_work_order| Ok(persisted(new_work_order)));
        let mut rng = StdRng::seed_from_u64(9);

        let mutation = create_work_order(&repo, work_order_form(None), &mut rng).unwrap();

        assert!(mutation.value.materials.iter().all(|line| line.consumed == 0.0));
        assert!(mutation.value.products.iter().all(|line| line.produced_quantity == 0));
        assert!(mutation.revalidate.contains(&"/sales/5".to_string()));
    }

    #[test]
    fn work_order_cannot_start_completed() {
        let repo = MockRepository::new();
        let mut rng = StdRng::seed_from_u64(9);

        let result = create_work_order(
            &repo,
            work_order_form(Some(WorkOrderStatus::Completed)),
            &mut rng,
        );

        match result {
            Err(ServiceError::Validation(errors)) => assert_eq!(errors[0].field, "status"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn on_hold_cannot_be_completed() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id()
            .returning(|id| Ok(Some(fixtures::work_order(id, WorkOrderStatus::OnHold))));
        repo.expect_update_work_order_status().never();

        let result = update_work_order_status(
            &repo,
            1,
            UpdateWorkOrderStatusForm {
                status: WorkOrderStatus::Completed,
            },
        );

        match result {
            Err(ServiceError::InvalidTransition { from, to }) => {
                assert_eq!(from, "ON_HOLD");
                assert_eq!(to, "COMPLETED");
            }
            other => panic!("expected invalid transition, got {other:?}"),
        }
    }

    #[test]
    fn on_hold_can_resume() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id()
            .returning(|id| Ok(Some(fixtures::work_order(id, WorkOrderStatus::OnHold))));
        repo.expect_update_work_order_status()
            .withf(|_, from, to| {
                *from == WorkOrderStatus::OnHold && *to == WorkOrderStatus::InProgress
            })
            .returning(|id, _, to| Ok(Some(fixtures::work_order(id, to))));

        let mutation = update_work_order_status(
            &repo,
            1,
            UpdateWorkOrderStatusForm {
                status: WorkOrderStatus::InProgress,
            },
        )
        .unwrap();

        assert_eq!(mutation.value.status, WorkOrderStatus::InProgress);
    }

    #[test]
    fn lost_status_race_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id()
            .returning(|id| Ok(Some(fixtures::work_order(id, WorkOrderStatus::Planned))));
        repo.expect_update_work_order_status()
            .returning(|_, _, _| Ok(None));

        let result = update_work_order_status(
            &repo,
            1,
            UpdateWorkOrderStatusForm {
                status: WorkOrderStatus::InProgress,
            },
        );

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn consumption_requires_in_progress() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id()
            .returning(|id| Ok(Some(fixtures::work_order(id, WorkOrderStatus::Planned))));
        repo.expect_record_material_consumption().never();

        let result = record_material_consumption(&repo, 1, 11, ConsumptionForm { amount: 1.5 });

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn consumption_accumulates_on_the_line() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id()
            .returning(|_| Ok(Some(in_progress_with_lines())));
        repo.expect_record_material_consumption()
            .withf(|work_order_id, line_id, amount| {
                *work_order_id == 1 && *line_id == 11 && *amount == 1.5
            })
            .returning(|work_order_id, line_id, amount| {
                Ok(Some(fixtures::material_line(line_id, work_order_id, 10.0, 2.0 + amount)))
            });

        let mutation =
            record_material_consumption(&repo, 1, 11, ConsumptionForm { amount: 1.5 }).unwrap();

        assert_eq!(mutation.value.consumed, 3.5);
        assert_eq!(mutation.revalidate, vec!["/production/1"]);
    }

    #[test]
    fn consumption_after_a_concurrent_hold_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id()
            .returning(|_| Ok(Some(in_progress_with_lines())));
        repo.expect_record_material_consumption()
            .times(1)
            .returning(|_, _, _| Ok(None));

        let result = record_material_consumption(&repo, 1, 11, ConsumptionForm { amount: 1.5 });

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn output_for_foreign_line_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id()
            .returning(|_| Ok(Some(in_progress_with_lines())));
        repo.expect_record_production_output().never();

        let result = record_production_output(&repo, 1, 99, OutputForm { quantity: 3 });

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn output_must_be_positive() {
        let repo = MockRepository::new();

        let result = record_production_output(&repo, 1, 21, OutputForm { quantity: 0 });

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn process_for_missing_work_order_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id().returning(|_| Ok(None));
        repo.expect_create_process().never();

        let form = ProcessForm {
            process_type: "Weaving".to_string(),
            machine: None,
            start_time: None,
            end_time: None,
            status: None,
            notes: None,
        };

        assert!(matches!(
            record_process(&repo, 3, form),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn storage_failure_is_internal() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id()
            .returning(|_| Ok(Some(in_progress_with_lines())));
        repo.expect_record_production_output()
            .returning(|_, _, _| Err(RepositoryError::InvalidData("status".to_string())));

        let result = record_production_output(&repo, 1, 21, OutputForm { quantity: 3 });

        assert!(matches!(result, Err(ServiceError::Internal(_))));
    }
}
