use serde::Deserialize;

use crate::domain::quality_check::{QualityCheck, QualityCheckListQuery};
use crate::domain::work_order::{WorkOrder, WorkOrderListQuery};
use crate::forms::empty_string_as_none;
use crate::forms::quality::QualityCheckForm;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::errors::RepositoryError;
use crate::repository::{QualityCheckReader, QualityCheckWriter, WorkOrderReader};
use crate::services::{Mutation, ServiceError, ServiceResult};

/// Query parameters accepted by the quality page and the checks API.
#[derive(Debug, Default, Deserialize)]
pub struct QualityChecksQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub work_order_id: Option<i32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub passed: Option<bool>,
    pub page: Option<usize>,
}

impl QualityChecksQuery {
    fn list_query(&self) -> QualityCheckListQuery {
        let mut query = QualityCheckListQuery::new();
        if let Some(work_order_id) = self.work_order_id {
            query = query.work_order_id(work_order_id);
        }
        if let Some(passed) = self.passed {
            query = query.passed(passed);
        }
        query
    }
}

pub struct QualityPageData {
    pub checks: Paginated<QualityCheck>,
    /// Work orders offered by the "Record check" form.
    pub work_orders: Vec<WorkOrder>,
    pub work_order_id: Option<i32>,
    pub passed: Option<bool>,
}

pub fn load_quality_page<R>(repo: &R, query: QualityChecksQuery) -> ServiceResult<QualityPageData>
where
    R: QualityCheckReader + WorkOrderReader + ?Sized,
{
    let page = query.page.unwrap_or(1);
    let list_query = query.list_query().paginate(page, DEFAULT_ITEMS_PER_PAGE);

    let (total, items) = repo.list_quality_checks(list_query)?;
    let (_, work_orders) = repo.list_work_orders(WorkOrderListQuery::new())?;

    Ok(QualityPageData {
        checks: Paginated::from_total(items, page, total, DEFAULT_ITEMS_PER_PAGE),
        work_orders,
        work_order_id: query.work_order_id,
        passed: query.passed,
    })
}

/// Checks with their work order number, newest first.
pub fn list_quality_checks<R>(repo: &R, query: QualityChecksQuery) -> ServiceResult<Vec<QualityCheck>>
where
    R: QualityCheckReader + ?Sized,
{
    let (_, checks) = repo.list_quality_checks(query.list_query())?;
    Ok(checks)
}

/// Records a pass/fail result. Any checkpoint name is accepted, repeatedly.
pub fn create_quality_check<R>(
    repo: &R,
    form: QualityCheckForm,
) -> ServiceResult<Mutation<QualityCheck>>
where
    R: QualityCheckWriter + ?Sized,
{
    let new_check = form.into_new_quality_check()?;
    let work_order_id = new_check.work_order_id;

    match repo.create_quality_check(&new_check) {
        Ok(check) => Ok(Mutation::new(
            check,
            [
                "/quality".to_string(),
                format!("/production/{work_order_id}"),
                "/".to_string(),
            ],
        )),
        Err(RepositoryError::NotFound) => Err(ServiceError::NotFound),
        Err(err) => {
            log::error!("Failed to record quality check for work order {work_order_id}: {err}");
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;
    use crate::services::fixtures;

    fn form(checkpoint: &str) -> QualityCheckForm {
        QualityCheckForm {
            work_order_id: 2,
            checkpoint: checkpoint.to_string(),
            passed: true,
            notes: None,
            image_url: None,
        }
    }

    #[test]
    fn same_checkpoint_can_be_recorded_twice() {
        let mut repo = MockRepository::new();
        repo.expect_create_quality_check()
            .withf(|check| check.checkpoint == "Seam strength")
            .times(2)
            .returning(|check| {
                Ok(fixtures::quality_check(
                    1,
                    check.work_order_id,
                    &check.checkpoint,
                    check.passed,
                ))
            });

        let first = create_quality_check(&repo, form("Seam strength")).unwrap();
        let second = create_quality_check(&repo, form("  Seam   strength ")).unwrap();

        assert_eq!(first.value.checkpoint, second.value.checkpoint);
        assert!(first.revalidate.contains(&"/production/2".to_string()));
    }

    #[test]
    fn blank_checkpoint_is_recorded() {
        let mut repo = MockRepository::new();
        repo.expect_create_quality_check()
            .withf(|check| check.checkpoint.is_empty())
            .times(1)
            .returning(|check| {
                Ok(fixtures::quality_check(
                    1,
                    check.work_order_id,
                    &check.checkpoint,
                    check.passed,
                ))
            });

        let created = create_quality_check(&repo, form("   ")).unwrap();

        assert_eq!(created.value.checkpoint, "");
    }

    #[test]
    fn unknown_work_order_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_create_quality_check()
            .returning(|_| Err(RepositoryError::NotFound));

        assert!(matches!(
            create_quality_check(&repo, form("Color fastness")),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn filters_are_forwarded() {
        let mut repo = MockRepository::new();
        repo.expect_list_quality_checks()
            .withf(|query| query.work_order_id == Some(2) && query.passed == Some(false))
            .returning(|_| Ok((1, vec![fixtures::quality_check(1, 2, "Shrinkage", false)])));

        let checks = list_quality_checks(
            &repo,
            QualityChecksQuery {
                work_order_id: Some(2),
                passed: Some(false),
                page: None,
            },
        )
        .unwrap();

        assert_eq!(checks.len(), 1);
        assert!(!checks[0].passed);
    }
}
