use std::collections::HashMap;

use diesel::prelude::*;

use crate::{
    domain::order::Order as DomainOrder,
    domain::process::{NewProcess as DomainNewProcess, Process as DomainProcess},
    domain::quality_check::QualityCheck as DomainQualityCheck,
    domain::status::StatusMachine,
    domain::work_order::{
        NewWorkOrder as DomainNewWorkOrder, WorkOrder as DomainWorkOrder, WorkOrderListQuery,
        WorkOrderMaterial as DomainWorkOrderMaterial, WorkOrderProduct as DomainWorkOrderProduct,
        WorkOrderStatus,
    },
    models::material::Material as DbMaterial,
    models::order::Order as DbOrder,
    models::process::{NewProcess as DbNewProcess, Process as DbProcess},
    models::product::Product as DbProduct,
    models::quality_check::QualityCheck as DbQualityCheck,
    models::user::User as DbUser,
    models::work_order::{
        NewWorkOrder as DbNewWorkOrder, NewWorkOrderMaterial as DbNewWorkOrderMaterial,
        NewWorkOrderProduct as DbNewWorkOrderProduct, WorkOrder as DbWorkOrder,
        WorkOrderMaterial as DbWorkOrderMaterial, WorkOrderProduct as DbWorkOrderProduct,
    },
    repository::errors::{RepositoryError, RepositoryResult},
    repository::{DieselRepository, WorkOrderReader, WorkOrderWriter},
};

/// Attach creator, assignee and product lines to a batch of work orders.
pub(crate) fn hydrate_work_orders(
    conn: &mut SqliteConnection,
    db_work_orders: Vec<DbWorkOrder>,
) -> RepositoryResult<Vec<DomainWorkOrder>> {
    use crate::schema::{products, users, work_order_products};

    if db_work_orders.is_empty() {
        return Ok(Vec::new());
    }

    let work_order_ids: Vec<i32> = db_work_orders.iter().map(|wo| wo.id).collect();
    let user_ids: Vec<i32> = db_work_orders
        .iter()
        .flat_map(|wo| std::iter::once(wo.created_by_id).chain(wo.assigned_to_id))
        .collect();

    let users: HashMap<i32, DbUser> = users::table
        .filter(users::id.eq_any(&user_ids))
        .load::<DbUser>(conn)?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    let mut products_by_work_order: HashMap<i32, Vec<DomainWorkOrderProduct>> = HashMap::new();
    let rows = work_order_products::table
        .inner_join(products::table)
        .filter(work_order_products::work_order_id.eq_any(&work_order_ids))
        .order(work_order_products::id.asc())
        .select((DbWorkOrderProduct::as_select(), DbProduct::as_select()))
        .load::<(DbWorkOrderProduct, DbProduct)>(conn)?;
    for (line, product) in rows {
        let mut line = DomainWorkOrderProduct::from(line);
        line.product = Some(product.into());
        products_by_work_order
            .entry(line.work_order_id)
            .or_default()
            .push(line);
    }

    db_work_orders
        .into_iter()
        .map(|work_order| {
            let created_by = users.get(&work_order.created_by_id).cloned();
            let assigned_to = work_order
                .assigned_to_id
                .and_then(|id| users.get(&id).cloned());
            let mut domain = DomainWorkOrder::try_from(work_order)?;
            domain.created_by = created_by.map(Into::into);
            domain.assigned_to = assigned_to.map(Into::into);
            domain.products = products_by_work_order
                .remove(&domain.id)
                .unwrap_or_default();
            Ok(domain)
        })
        .collect()
}

impl WorkOrderReader for DieselRepository {
    fn get_work_order_by_id(&self, id: i32) -> RepositoryResult<Option<DomainWorkOrder>> {
        use crate::schema::{
            materials, orders, processes, quality_checks, work_order_materials, work_orders,
        };

        let mut conn = self.conn()?;
        let work_order = work_orders::table
            .filter(work_orders::id.eq(id))
            .first::<DbWorkOrder>(&mut conn)
            .optional()?;

        let Some(work_order) = work_order else {
            return Ok(None);
        };
        let order_id = work_order.order_id;

        let mut hydrated = hydrate_work_orders(&mut conn, vec![work_order])?;
        let Some(mut work_order) = hydrated.pop() else {
            return Ok(None);
        };

        if let Some(order_id) = order_id {
            let order = orders::table
                .filter(orders::id.eq(order_id))
                .first::<DbOrder>(&mut conn)
                .optional()?;
            work_order.order = order
                .map(DomainOrder::try_from)
                .transpose()?
                .map(Box::new);
        }

        work_order.materials = work_order_materials::table
            .inner_join(materials::table)
            .filter(work_order_materials::work_order_id.eq(id))
            .order(work_order_materials::id.asc())
            .select((DbWorkOrderMaterial::as_select(), DbMaterial::as_select()))
            .load::<(DbWorkOrderMaterial, DbMaterial)>(&mut conn)?
            .into_iter()
            .map(|(line, material)| {
                let mut line = DomainWorkOrderMaterial::from(line);
                line.material = Some(material.into());
                line
            })
            .collect();

        work_order.processes = processes::table
            .filter(processes::work_order_id.eq(id))
            .order((processes::created_at.asc(), processes::id.asc()))
            .load::<DbProcess>(&mut conn)?
            .into_iter()
            .map(DomainProcess::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;

        let work_order_number = work_order.work_order_number.clone();
        work_order.quality_checks = quality_checks::table
            .filter(quality_checks::work_order_id.eq(id))
            .order((quality_checks::created_at.desc(), quality_checks::id.desc()))
            .load::<DbQualityCheck>(&mut conn)?
            .into_iter()
            .map(|check| check.into_domain(Some(work_order_number.clone())))
            .collect::<Vec<DomainQualityCheck>>();

        Ok(Some(work_order))
    }

    fn list_work_orders(
        &self,
        query: WorkOrderListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainWorkOrder>)> {
        use crate::schema::work_orders;

        let mut conn = self.conn()?;

        let WorkOrderListQuery {
            statuses,
            order_id,
            search,
            pagination,
        } = query;

        let status_filter: Vec<&'static str> =
            statuses.iter().map(|status| status.as_str()).collect();
        let search_pattern = search.as_ref().map(|term| format!("%{term}%"));

        let mut count_query = work_orders::table.into_boxed::<diesel::sqlite::Sqlite>();

        if !status_filter.is_empty() {
            count_query = count_query.filter(work_orders::status.eq_any(status_filter.clone()));
        }

        if let Some(order_id) = order_id {
            count_query = count_query.filter(work_orders::order_id.eq(order_id));
        }

        if let Some(ref pattern) = search_pattern {
            count_query = count_query.filter(
                work_orders::work_order_number
                    .like(pattern.clone())
                    .or(work_orders::description.like(pattern.clone())),
            );
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = work_orders::table.into_boxed::<diesel::sqlite::Sqlite>();

        if !status_filter.is_empty() {
            items = items.filter(work_orders::status.eq_any(status_filter));
        }

        if let Some(order_id) = order_id {
            items = items.filter(work_orders::order_id.eq(order_id));
        }

        if let Some(ref pattern) = search_pattern {
            items = items.filter(
                work_orders::work_order_number
                    .like(pattern.clone())
                    .or(work_orders::description.like(pattern.clone())),
            );
        }

        items = items.order((work_orders::created_at.desc(), work_orders::id.desc()));

        if let Some(pagination) = pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let db_work_orders = items.load::<DbWorkOrder>(&mut conn)?;
        let work_orders = hydrate_work_orders(&mut conn, db_work_orders)?;

        Ok((total, work_orders))
    }
}

impl WorkOrderWriter for DieselRepository {
    fn create_work_order(
        &self,
        new_work_order: &DomainNewWorkOrder,
    ) -> RepositoryResult<DomainWorkOrder> {
        use crate::schema::{work_order_materials, work_order_products, work_orders};

        let mut conn = self.conn()?;

        conn.transaction::<DomainWorkOrder, RepositoryError, _>(|conn| {
            let created = diesel::insert_into(work_orders::table)
                .values(&DbNewWorkOrder::from(new_work_order))
                .get_result::<DbWorkOrder>(conn)?;

            let work_order_id = created.id;

            let materials: Vec<DbNewWorkOrderMaterial> = new_work_order
                .materials
                .iter()
                .map(|line| DbNewWorkOrderMaterial {
                    work_order_id,
                    material_id: line.material_id,
                    quantity: line.quantity,
                })
                .collect();

            diesel::insert_into(work_order_materials::table)
                .values(&materials)
                .execute(conn)?;

            let products: Vec<DbNewWorkOrderProduct> = new_work_order
                .products
                .iter()
                .map(|line| DbNewWorkOrderProduct {
                    work_order_id,
                    product_id: line.product_id,
                    planned_quantity: line.planned_quantity,
                })
                .collect();

            diesel::insert_into(work_order_products::table)
                .values(&products)
                .execute(conn)?;

            let mut domain = DomainWorkOrder::try_from(created)?;

            domain.materials = work_order_materials::table
                .filter(work_order_materials::work_order_id.eq(work_order_id))
                .order(work_order_materials::id.asc())
                .load::<DbWorkOrderMaterial>(conn)?
                .into_iter()
                .map(Into::into)
                .collect();

            domain.products = work_order_products::table
                .filter(work_order_products::work_order_id.eq(work_order_id))
                .order(work_order_products::id.asc())
                .load::<DbWorkOrderProduct>(conn)?
                .into_iter()
                .map(Into::into)
                .collect();

            Ok(domain)
        })
    }

    fn update_work_order_status(
        &self,
        work_order_id: i32,
        from: WorkOrderStatus,
        to: WorkOrderStatus,
    ) -> RepositoryResult<Option<DomainWorkOrder>> {
        use crate::schema::work_orders;

        let mut conn = self.conn()?;

        let target = work_orders::table
            .filter(work_orders::id.eq(work_order_id))
            .filter(work_orders::status.eq(from.as_str()));

        let updated = diesel::update(target)
            .set((
                work_orders::status.eq(to.as_str()),
                work_orders::updated_at.eq(chrono::Local::now().naive_utc()),
            ))
            .get_result::<DbWorkOrder>(&mut conn)
            .optional()?;

        updated.map(DomainWorkOrder::try_from).transpose()
    }

    fn create_process(&self, new_process: &DomainNewProcess) -> RepositoryResult<DomainProcess> {
        use crate::schema::processes;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(processes::table)
            .values(&DbNewProcess::from(new_process))
            .get_result::<DbProcess>(&mut conn)?;

        DomainProcess::try_from(created)
    }

    fn record_material_consumption(
        &self,
        work_order_id: i32,
        line_id: i32,
        amount: f64,
    ) -> RepositoryResult<Option<DomainWorkOrderMaterial>> {
        use crate::schema::{work_order_materials, work_orders};

        let mut conn = self.conn()?;

        let in_progress = work_orders::table
            .filter(work_orders::id.eq(work_order_id))
            .filter(work_orders::status.eq(WorkOrderStatus::InProgress.as_str()))
            .select(work_orders::id);

        let target = work_order_materials::table
            .filter(work_order_materials::id.eq(line_id))
            .filter(work_order_materials::work_order_id.eq_any(in_progress));

        let updated = diesel::update(target)
            .set(work_order_materials::consumed.eq(work_order_materials::consumed + amount))
            .get_result::<DbWorkOrderMaterial>(&mut conn)
            .optional()?;

        if let Some(line) = updated {
            return Ok(Some(line.into()));
        }

        let line_exists = diesel::select(diesel::dsl::exists(
            work_order_materials::table
                .filter(work_order_materials::id.eq(line_id))
                .filter(work_order_materials::work_order_id.eq(work_order_id)),
        ))
        .get_result::<bool>(&mut conn)?;

        if line_exists {
            Ok(None)
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn record_production_output(
        &self,
        work_order_id: i32,
        line_id: i32,
        quantity: i32,
    ) -> RepositoryResult<Option<DomainWorkOrderProduct>> {
        use crate::schema::{work_order_products, work_orders};

        let mut conn = self.conn()?;

        let in_progress = work_orders::table
            .filter(work_orders::id.eq(work_order_id))
            .filter(work_orders::status.eq(WorkOrderStatus::InProgress.as_str()))
            .select(work_orders::id);

        let target = work_order_products::table
            .filter(work_order_products::id.eq(line_id))
            .filter(work_order_products::work_order_id.eq_any(in_progress));

        let updated = diesel::update(target)
            .set(
                work_order_products::produced_quantity
                    .eq(work_order_products::produced_quantity + quantity),
            )
            .get_result::<DbWorkOrderProduct>(&mut conn)
            .optional()?;

        if let Some(line) = updated {
            return Ok(Some(line.into()));
        }

        let line_exists = diesel::select(diesel::dsl::exists(
            work_order_products::table
                .filter(work_order_products::id.eq(line_id))
                .filter(work_order_products::work_order_id.eq(work_order_id)),
        ))
        .get_result::<bool>(&mut conn)?;

        if line_exists {
            Ok(None)
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}
