use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::quality_check::{
    NewQualityCheck as DomainNewQualityCheck, QualityCheck as DomainQualityCheck,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::quality_checks)]
pub struct QualityCheck {
    pub id: i32,
    pub work_order_id: i32,
    pub checkpoint: String,
    pub passed: bool,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::quality_checks)]
pub struct NewQualityCheck<'a> {
    pub work_order_id: i32,
    pub checkpoint: &'a str,
    pub passed: bool,
    pub notes: Option<&'a str>,
    pub image_url: Option<&'a str>,
}

impl QualityCheck {
    pub fn into_domain(self, work_order_number: Option<String>) -> DomainQualityCheck {
        DomainQualityCheck {
            id: self.id,
            work_order_id: self.work_order_id,
            checkpoint: self.checkpoint,
            passed: self.passed,
            notes: self.notes,
            image_url: self.image_url,
            created_at: self.created_at,
            work_order_number,
        }
    }
}

impl From<QualityCheck> for DomainQualityCheck {
    fn from(value: QualityCheck) -> Self {
        value.into_domain(None)
    }
}

impl<'a> From<&'a DomainNewQualityCheck> for NewQualityCheck<'a> {
    fn from(value: &'a DomainNewQualityCheck) -> Self {
        Self {
            work_order_id: value.work_order_id,
            checkpoint: value.checkpoint.as_str(),
            passed: value.passed,
            notes: value.notes.as_deref(),
            image_url: value.image_url.as_deref(),
        }
    }
}
