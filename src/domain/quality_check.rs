use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

/// Pass/fail record against a named checkpoint of a work order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QualityCheck {
    pub id: i32,
    pub work_order_id: i32,
    /// Free-form checkpoint name; any value and any number of repeats are allowed.
    pub checkpoint: String,
    pub passed: bool,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
    /// Number of the checked work order, filled in by listing reads.
    pub work_order_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQualityCheck {
    pub work_order_id: i32,
    pub checkpoint: String,
    pub passed: bool,
    pub notes: Option<String>,
    pub image_url: Option<String>,
}

impl NewQualityCheck {
    pub fn new(work_order_id: i32, checkpoint: impl Into<String>, passed: bool) -> Self {
        Self {
            work_order_id,
            checkpoint: checkpoint.into(),
            passed,
            notes: None,
            image_url: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// Query definition used to list quality checks, newest first.
#[derive(Debug, Clone, Default)]
pub struct QualityCheckListQuery {
    pub work_order_id: Option<i32>,
    pub passed: Option<bool>,
    pub pagination: Option<Pagination>,
}

impl QualityCheckListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn work_order_id(mut self, work_order_id: i32) -> Self {
        self.work_order_id = Some(work_order_id);
        self
    }

    pub fn passed(mut self, passed: bool) -> Self {
        self.passed = Some(passed);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
