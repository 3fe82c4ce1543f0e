use diesel::prelude::*;

use crate::{
    domain::quality_check::{
        NewQualityCheck as DomainNewQualityCheck, QualityCheck as DomainQualityCheck,
        QualityCheckListQuery,
    },
    models::quality_check::{NewQualityCheck as DbNewQualityCheck, QualityCheck as DbQualityCheck},
    repository::errors::{RepositoryError, RepositoryResult},
    repository::{DieselRepository, QualityCheckReader, QualityCheckWriter},
};

impl QualityCheckReader for DieselRepository {
    fn list_quality_checks(
        &self,
        query: QualityCheckListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainQualityCheck>)> {
        use crate::schema::{quality_checks, work_orders};

        let mut conn = self.conn()?;

        let QualityCheckListQuery {
            work_order_id,
            passed,
            pagination,
        } = query;

        let mut count_query = quality_checks::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(work_order_id) = work_order_id {
            count_query = count_query.filter(quality_checks::work_order_id.eq(work_order_id));
        }
        if let Some(passed) = passed {
            count_query = count_query.filter(quality_checks::passed.eq(passed));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = quality_checks::table
            .inner_join(work_orders::table)
            .select((DbQualityCheck::as_select(), work_orders::work_order_number))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(work_order_id) = work_order_id {
            items = items.filter(quality_checks::work_order_id.eq(work_order_id));
        }
        if let Some(passed) = passed {
            items = items.filter(quality_checks::passed.eq(passed));
        }

        items = items.order((quality_checks::created_at.desc(), quality_checks::id.desc()));

        if let Some(pagination) = pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let checks = items
            .load::<(DbQualityCheck, String)>(&mut conn)?
            .into_iter()
            .map(|(check, number)| check.into_domain(Some(number)))
            .collect();

        Ok((total, checks))
    }
}

impl QualityCheckWriter for DieselRepository {
    fn create_quality_check(
        &self,
        new_check: &DomainNewQualityCheck,
    ) -> RepositoryResult<DomainQualityCheck> {
        use crate::schema::{quality_checks, work_orders};

        let mut conn = self.conn()?;

        conn.transaction::<DomainQualityCheck, RepositoryError, _>(|conn| {
            let work_order_number = work_orders::table
                .filter(work_orders::id.eq(new_check.work_order_id))
                .select(work_orders::work_order_number)
                .first::<String>(conn)?;

            let created = diesel::insert_into(quality_checks::table)
                .values(&DbNewQualityCheck::from(new_check))
                .get_result::<DbQualityCheck>(conn)?;

            Ok(created.into_domain(Some(work_order_number)))
        })
    }
}
