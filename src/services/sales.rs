use rand::Rng;
use serde::Deserialize;

use crate::domain::customer::Customer;
use crate::domain::numbering::{ORDER_PREFIX, generate_document_number};
use crate::domain::order::{Order, OrderListQuery, OrderStatus};
use crate::domain::product::{Product, ProductListQuery};
use crate::domain::stats::SalesStats;
use crate::domain::status::{StatusMachine, StatusTransition};
use crate::domain::user::User;
use crate::forms::sales::{AddCustomerForm, OrderForm, UpdateOrderStatusForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    CustomerReader, CustomerWriter, OrderReader, OrderWriter, ProductReader, UserReader,
};
use crate::services::{
    Mutation, ServiceError, ServiceResult, check_transition, insert_with_document_number,
};

/// Query parameters accepted by the sales page and the orders API.
///
/// `status` may repeat (`status=PENDING&status=CONFIRMED`).
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    #[serde(default)]
    pub status: Vec<OrderStatus>,
    pub search: Option<String>,
    pub page: Option<usize>,
}

impl OrdersQuery {
    fn list_query(&self) -> OrderListQuery {
        let mut query = OrderListQuery::new().statuses(self.status.iter().copied());
        if let Some(term) = self.search.as_ref().filter(|term| !term.trim().is_empty()) {
            query = query.search(term.as_str());
        }
        query
    }
}

/// Data required to render the sales template.
pub struct SalesPageData {
    pub orders: Paginated<Order>,
    pub stats: SalesStats,
    /// Statuses currently filtered on.
    pub selected_statuses: Vec<OrderStatus>,
    pub search: Option<String>,
}

/// Order detail plus the status moves its menu may offer.
pub struct OrderPageData {
    pub order: Order,
    pub transitions: &'static [StatusTransition<OrderStatus>],
}

/// Choices for the "New order" form.
pub struct NewOrderPageData {
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub users: Vec<User>,
}

pub fn load_sales_page<R>(repo: &R, query: OrdersQuery) -> ServiceResult<SalesPageData>
where
    R: OrderReader + ?Sized,
{
    let page = query.page.unwrap_or(1);
    let list_query = query.list_query().paginate(page, DEFAULT_ITEMS_PER_PAGE);

    let (total, items) = repo.list_orders(list_query)?;
    let stats = sales_stats(repo)?;

    Ok(SalesPageData {
        orders: Paginated::from_total(items, page, total, DEFAULT_ITEMS_PER_PAGE),
        stats,
        selected_statuses: query.status,
        search: query.search.filter(|term| !term.trim().is_empty()),
    })
}

/// Orders matching the filters, newest order date first.
pub fn list_orders<R>(repo: &R, query: OrdersQuery) -> ServiceResult<Vec<Order>>
where
    R: OrderReader + ?Sized,
{
    let (_, orders) = repo.list_orders(query.list_query())?;
    Ok(orders)
}

pub fn sales_stats<R>(repo: &R) -> ServiceResult<SalesStats>
where
    R: OrderReader + ?Sized,
{
    let (_, orders) = repo.list_orders(OrderListQuery::new())?;
    Ok(SalesStats::from_orders(&orders))
}

pub fn get_order<R>(repo: &R, order_id: i32) -> ServiceResult<Order>
where
    R: OrderReader + ?Sized,
{
    repo.get_order_by_id(order_id)?.ok_or(ServiceError::NotFound)
}

pub fn load_order_page<R>(repo: &R, order_id: i32) -> ServiceResult<OrderPageData>
where
    R: OrderReader + ?Sized,
{
    let order = get_order(repo, order_id)?;
    let transitions = order.status.transitions();
    Ok(OrderPageData { order, transitions })
}

pub fn load_new_order_page<R>(repo: &R) -> ServiceResult<NewOrderPageData>
where
    R: CustomerReader + ProductReader + UserReader + ?Sized,
{
    let (_, products) = repo.list_products(ProductListQuery::new())?;

    Ok(NewOrderPageData {
        customers: repo.list_customers()?,
        products,
        users: repo.list_users()?,
    })
}

/// Creates an order with its items in one transaction.
///
/// Without a supplied order number one is generated as `ORD-<year>-<nnn>`
/// and regenerated when it collides.
pub fn create_order<R, G>(repo: &R, form: OrderForm, rng: &mut G) -> ServiceResult<Mutation<Order>>
where
    R: OrderWriter + ?Sized,
    G: Rng + ?Sized,
{
    let supplied = form.supplied_order_number();
    let generated = supplied.is_none();
    let number = supplied.unwrap_or_else(|| generate_document_number(ORDER_PREFIX, rng));

    let mut new_order = form.into_new_order(number.clone())?;

    let result = insert_with_document_number(ORDER_PREFIX, number, generated, rng, |number| {
        new_order.order_number = number.to_string();
        repo.create_order(&new_order)
    });

    match result {
        Ok(order) => {
            log::info!("Created order {} ({} items)", order.order_number, new_order.items.len());
            Ok(Mutation::new(order, ["/sales", "/"]))
        }
        Err(err) => {
            if matches!(err, ServiceError::Internal(_)) {
                log::error!("Failed to create order {}: {err}", new_order.order_number);
            }
            Err(err)
        }
    }
}

/// Moves an order along its status table.
///
/// The write only succeeds if the status is still the one that was read.
pub fn update_order_status<R>(
    repo: &R,
    order_id: i32,
    form: UpdateOrderStatusForm,
) -> ServiceResult<Mutation<Order>>
where
    R: OrderReader + OrderWriter + ?Sized,
{
    let order = get_order(repo, order_id)?;
    check_transition(order.status, form.status)?;

    match repo.update_order_status(order_id, order.status, form.status) {
        Ok(Some(updated)) => Ok(Mutation::new(
            updated,
            [
                "/sales".to_string(),
                format!("/sales/{order_id}"),
                "/".to_string(),
            ],
        )),
        Ok(None) => Err(ServiceError::Conflict(format!(
            "order {} was changed by someone else, reload and try again",
            order.order_number
        ))),
        Err(err) => {
            log::error!("Failed to update status of order {order_id}: {err}");
            Err(err.into())
        }
    }
}

pub fn list_customers<R>(repo: &R) -> ServiceResult<Vec<Customer>>
where
    R: CustomerReader + ?Sized,
{
    Ok(repo.list_customers()?)
}

pub fn create_customer<R>(repo: &R, form: AddCustomerForm) -> ServiceResult<Mutation<Customer>>
where
    R: CustomerWriter + ?Sized,
{
    let new_customer = form.into_new_customer()?;

    match repo.create_customer(&new_customer) {
        Ok(customer) => Ok(Mutation::new(customer, ["/customers", "/sales/new"])),
        Err(err) => {
            log::error!("Failed to create customer {}: {err}", new_customer.name);
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::domain::order::OrderItem;
    use crate::forms::sales::OrderItemForm;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::fixtures;

    fn order_form(order_number: Option<&str>) -> OrderForm {
        OrderForm {
            customer_id: 1,
            delivery_date: None,
            status: None,
            created_by_id: 1,
            order_number: order_number.map(str::to_string),
            items: vec![
                OrderItemForm {
                    product_id: 1,
                    quantity: 3,
                    unit_price: 10.0,
                },
                OrderItemForm {
                    product_id: 2,
                    quantity: 1,
                    unit_price: 25.0,
                },
            ],
        }
    }

    fn persisted(new_order: &crate::domain::order::NewOrder) -> Order {
        let mut order = fixtures::order(1, new_order.status, new_order.total_amount_cents);
        order.order_number = new_order.order_number.clone();
        order.items = new_order
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| OrderItem {
                id: index as i32 + 1,
                order_id: 1,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                total_price_cents: item.total_price_cents,
                product: None,
            })
            .collect();
        order
    }

    fn is_order_number(value: &str) -> bool {
        let parts: Vec<&str> = value.split('-').collect();
        parts.len() == 3
            && parts[0] == "ORD"
            && parts[1].len() == 4
            && parts[2].len() == 3
            && parts[1..].iter().all(|part| part.chars().all(|c| c.is_ascii_digit()))
    }

    #[test]
    fn order_totals_are_computed_from_items() {
        let mut repo = MockRepository::new();
        repo.expect_create_order()
            .times(1)
            .returning(|new_order| Ok(persisted(new_order)));
        let mut rng = StdRng::seed_from_u64(1);

        let mutation = create_order(&repo, order_form(None), &mut rng).unwrap();
        let order = mutation.value;

        assert_eq!(order.items[0].total_price_cents, 3000);
        assert_eq!(order.items[1].total_price_cents, 2500);
        assert_eq!(order.total_amount_cents, 5500);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(is_order_number(&order.order_number), "{}", order.order_number);
        assert_eq!(mutation.revalidate, vec!["/sales", "/"]);
    }

    #[test]
    fn colliding_generated_number_is_regenerated() {
        let mut repo = MockRepository::new();
        let mut seen = Vec::new();
        repo.expect_create_order().times(2).returning(move |new_order| {
            seen.push(new_order.order_number.clone());
            if seen.len() == 1 {
                Err(RepositoryError::Duplicate("orders.order_number".to_string()))
            } else {
                Ok(persisted(new_order))
            }
        });
        let mut rng = StdRng::seed_from_u64(3);

        let order = create_order(&repo, order_form(None), &mut rng).unwrap().value;

        assert!(is_order_number(&order.order_number));
    }

    #[test]
    fn supplied_number_collision_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_create_order()
            .withf(|new_order| new_order.order_number == "ORD-2024-777")
            .times(1)
            .returning(|_| Err(RepositoryError::Duplicate("orders.order_number".to_string())));
        let mut rng = StdRng::seed_from_u64(3);

        let result = create_order(&repo, order_form(Some("ORD-2024-777")), &mut rng);

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn order_without_items_fails_validation() {
        let repo = MockRepository::new();
        let mut form = order_form(None);
        form.items.clear();
        let mut rng = StdRng::seed_from_u64(3);

        match create_order(&repo, form, &mut rng) {
            Err(ServiceError::Validation(errors)) => assert_eq!(errors[0].field, "items"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn allowed_transition_is_written_conditionally() {
        let mut repo = MockRepository::new();
        repo.expect_get_order_by_id()
            .returning(|id| Ok(Some(fixtures::order(id, OrderStatus::Pending, 100))));
        repo.expect_update_order_status()
            .withf(|id, from, to| {
                *id == 4 && *from == OrderStatus::Pending && *to == OrderStatus::Confirmed
            })
            .times(1)
            .returning(|id, _, to| Ok(Some(fixtures::order(id, to, 100))));

        let mutation = update_order_status(
            &repo,
            4,
            UpdateOrderStatusForm {
                status: OrderStatus::Confirmed,
            },
        )
        .unwrap();

        assert_eq!(mutation.value.status, OrderStatus::Confirmed);
        assert!(mutation.revalidate.contains(&"/sales/4".to_string()));
    }

    #[test]
    fn transition_outside_the_table_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_order_by_id()
            .returning(|id| Ok(Some(fixtures::order(id, OrderStatus::Delivered, 100))));
        repo.expect_update_order_status().never();

        let result = update_order_status(
            &repo,
            4,
            UpdateOrderStatusForm {
                status: OrderStatus::Pending,
            },
        );

        match result {
            Err(ServiceError::InvalidTransition { from, to }) => {
                assert_eq!(from, "DELIVERED");
                assert_eq!(to, "PENDING");
            }
            other => panic!("expected invalid transition, got {other:?}"),
        }
    }

    #[test]
    fn concurrent_status_change_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_order_by_id()
            .returning(|id| Ok(Some(fixtures::order(id, OrderStatus::Confirmed, 100))));
        repo.expect_update_order_status()
            .returning(|_, _, _| Ok(None));

        let result = update_order_status(
            &repo,
            4,
            UpdateOrderStatusForm {
                status: OrderStatus::InProduction,
            },
        );

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn status_update_of_missing_order_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_order_by_id().returning(|_| Ok(None));

        let result = update_order_status(
            &repo,
            4,
            UpdateOrderStatusForm {
                status: OrderStatus::Confirmed,
            },
        );

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn sales_page_applies_status_filter() {
        let mut repo = MockRepository::new();
        repo.expect_list_orders()
            .withf(|query| query.pagination.is_some())
            .returning(|query| {
                assert_eq!(query.statuses, vec![OrderStatus::Pending]);
                Ok((1, vec![fixtures::order(1, OrderStatus::Pending, 100)]))
            });
        repo.expect_list_orders()
            .withf(|query| query.pagination.is_none())
            .returning(|_| {
                Ok((
                    2,
                    vec![
                        fixtures::order(1, OrderStatus::Pending, 100),
                        fixtures::order(2, OrderStatus::Delivered, 400),
                    ],
                ))
            });

        let data = load_sales_page(
            &repo,
            OrdersQuery {
                status: vec![OrderStatus::Pending],
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(data.orders.items.len(), 1);
        assert_eq!(data.stats.pending, 1);
        assert_eq!(data.stats.total_sales_cents, 400);
        assert_eq!(data.selected_statuses, vec![OrderStatus::Pending]);
    }

    #[test]
    fn order_page_offers_table_transitions() {
        let mut repo = MockRepository::new();
        repo.expect_get_order_by_id()
            .returning(|id| Ok(Some(fixtures::order(id, OrderStatus::Cancelled, 100))));

        let data = load_order_page(&repo, 1).unwrap();

        assert_eq!(data.transitions.len(), 1);
        assert_eq!(data.transitions[0].to, OrderStatus::Pending);
    }
}
