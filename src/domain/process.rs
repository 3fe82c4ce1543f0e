use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::status::UnknownStatus;

/// Progress of a single manufacturing step.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ProcessStatus {
    pub const ALL: [ProcessStatus; 4] = [
        ProcessStatus::Pending,
        ProcessStatus::InProgress,
        ProcessStatus::Completed,
        ProcessStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessStatus::Pending => "PENDING",
            ProcessStatus::InProgress => "IN_PROGRESS",
            ProcessStatus::Completed => "COMPLETED",
            ProcessStatus::Failed => "FAILED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProcessStatus::Pending => "Pending",
            ProcessStatus::InProgress => "In Progress",
            ProcessStatus::Completed => "Completed",
            ProcessStatus::Failed => "Failed",
        }
    }
}

impl FromStr for ProcessStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ProcessStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manufacturing step (weaving, dyeing, cutting, ...) run for a work order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Process {
    pub id: i32,
    pub work_order_id: i32,
    pub process_type: String,
    pub machine: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub status: ProcessStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProcess {
    pub work_order_id: i32,
    pub process_type: String,
    pub machine: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub status: ProcessStatus,
    pub notes: Option<String>,
}

impl NewProcess {
    pub fn new(work_order_id: i32, process_type: impl Into<String>) -> Self {
        Self {
            work_order_id,
            process_type: process_type.into(),
            machine: None,
            start_time: None,
            end_time: None,
            status: ProcessStatus::default(),
            notes: None,
        }
    }

    pub fn with_machine(mut self, machine: impl Into<String>) -> Self {
        self.machine = Some(machine.into());
        self
    }

    pub fn with_times(
        mut self,
        start_time: Option<NaiveDateTime>,
        end_time: Option<NaiveDateTime>,
    ) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn with_status(mut self, status: ProcessStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
