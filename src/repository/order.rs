use std::collections::HashMap;

use diesel::prelude::*;

use crate::{
    domain::order::{
        NewOrder as DomainNewOrder, Order as DomainOrder, OrderItem as DomainOrderItem,
        OrderListQuery, OrderStatus,
    },
    domain::status::StatusMachine,
    domain::work_order::WorkOrder as DomainWorkOrder,
    models::customer::Customer as DbCustomer,
    models::order::{
        NewOrder as DbNewOrder, NewOrderItem as DbNewOrderItem, Order as DbOrder,
        OrderItem as DbOrderItem,
    },
    models::product::Product as DbProduct,
    models::user::User as DbUser,
    models::work_order::WorkOrder as DbWorkOrder,
    repository::errors::{RepositoryError, RepositoryResult},
    repository::{DieselRepository, OrderReader, OrderWriter},
};

/// Attach customers and item lines to a batch of orders.
pub(crate) fn hydrate_orders(
    conn: &mut SqliteConnection,
    db_orders: Vec<DbOrder>,
) -> RepositoryResult<Vec<DomainOrder>> {
    use crate::schema::{customers, order_items};

    if db_orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i32> = db_orders.iter().map(|order| order.id).collect();
    let customer_ids: Vec<i32> = db_orders.iter().map(|order| order.customer_id).collect();

    let customers: HashMap<i32, DbCustomer> = customers::table
        .filter(customers::id.eq_any(&customer_ids))
        .load::<DbCustomer>(conn)?
        .into_iter()
        .map(|customer| (customer.id, customer))
        .collect();

    let mut items_by_order: HashMap<i32, Vec<DbOrderItem>> = HashMap::new();
    let rows = order_items::table
        .filter(order_items::order_id.eq_any(&order_ids))
        .order(order_items::id.asc())
        .load::<DbOrderItem>(conn)?;
    for item in rows {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    db_orders
        .into_iter()
        .map(|order| {
            let order_id = order.id;
            let customer = customers.get(&order.customer_id).cloned();
            let mut domain = DomainOrder::try_from(order)?;
            domain.customer = customer.map(Into::into);
            domain.items = items_by_order
                .remove(&order_id)
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect();
            Ok(domain)
        })
        .collect()
}

impl OrderReader for DieselRepository {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<DomainOrder>> {
        use crate::schema::{order_items, orders, products, users, work_orders};

        let mut conn = self.conn()?;
        let order = orders::table
            .filter(orders::id.eq(id))
            .first::<DbOrder>(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let created_by = users::table
            .filter(users::id.eq(order.created_by_id))
            .first::<DbUser>(&mut conn)
            .optional()?;

        let mut hydrated = hydrate_orders(&mut conn, vec![order])?;
        let Some(mut order) = hydrated.pop() else {
            return Ok(None);
        };

        let lines = order_items::table
            .inner_join(products::table)
            .filter(order_items::order_id.eq(order.id))
            .order(order_items::id.asc())
            .select((DbOrderItem::as_select(), DbProduct::as_select()))
            .load::<(DbOrderItem, DbProduct)>(&mut conn)?;

        order.items = lines
            .into_iter()
            .map(|(item, product)| {
                let mut item = DomainOrderItem::from(item);
                item.product = Some(product.into());
                item
            })
            .collect();

        order.created_by = created_by.map(Into::into);
        order.work_orders = work_orders::table
            .filter(work_orders::order_id.eq(order.id))
            .order(work_orders::created_at.desc())
            .load::<DbWorkOrder>(&mut conn)?
            .into_iter()
            .map(DomainWorkOrder::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(Some(order))
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<DomainOrder>)> {
        use crate::schema::{customers, orders};

        let mut conn = self.conn()?;

        let OrderListQuery {
            statuses,
            search,
            pagination,
        } = query;

        let status_filter: Vec<&'static str> =
            statuses.iter().map(|status| status.as_str()).collect();
        let search_pattern = search.as_ref().map(|term| format!("%{term}%"));

        let mut count_query = orders::table
            .inner_join(customers::table)
            .into_boxed::<diesel::sqlite::Sqlite>();

        if !status_filter.is_empty() {
            count_query = count_query.filter(orders::status.eq_any(status_filter.clone()));
        }

        if let Some(ref pattern) = search_pattern {
            count_query = count_query.filter(
                orders::order_number
                    .like(pattern.clone())
                    .or(customers::name.like(pattern.clone())),
            );
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = orders::table
            .inner_join(customers::table)
            .select(DbOrder::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();

        if !status_filter.is_empty() {
            items = items.filter(orders::status.eq_any(status_filter));
        }

        if let Some(ref pattern) = search_pattern {
            items = items.filter(
                orders::order_number
                    .like(pattern.clone())
                    .or(customers::name.like(pattern.clone())),
            );
        }

        items = items.order((orders::order_date.desc(), orders::id.desc()));

        if let Some(pagination) = pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let db_orders = items.load::<DbOrder>(&mut conn)?;
        let orders = hydrate_orders(&mut conn, db_orders)?;

        Ok((total, orders))
    }
}

impl OrderWriter for DieselRepository {
    fn create_order(&self, new_order: &DomainNewOrder) -> RepositoryResult<DomainOrder> {
        use crate::schema::{order_items, orders};

        let mut conn = self.conn()?;

        conn.transaction::<DomainOrder, RepositoryError, _>(|conn| {
            let created = diesel::insert_into(orders::table)
                .values(&DbNewOrder::from(new_order))
                .get_result::<DbOrder>(conn)?;

            let order_id = created.id;

            let payload: Vec<DbNewOrderItem> = new_order
                .items
                .iter()
                .map(|item| DbNewOrderItem::from_domain(order_id, item))
                .collect();

            diesel::insert_into(order_items::table)
                .values(&payload)
                .execute(conn)?;

            let mut hydrated = hydrate_orders(conn, vec![created])?;
            hydrated.pop().ok_or(RepositoryError::NotFound)
        })
    }

    fn update_order_status(
        &self,
        order_id: i32,
        from: OrderStatus,
        to: OrderStatus,
    ) -> RepositoryResult<Option<DomainOrder>> {
        use crate::schema::orders;

        let mut conn = self.conn()?;

        let target = orders::table
            .filter(orders::id.eq(order_id))
            .filter(orders::status.eq(from.as_str()));

        let updated = diesel::update(target)
            .set((
                orders::status.eq(to.as_str()),
                orders::updated_at.eq(chrono::Local::now().naive_utc()),
            ))
            .get_result::<DbOrder>(&mut conn)
            .optional()?;

        updated.map(DomainOrder::try_from).transpose()
    }
}
