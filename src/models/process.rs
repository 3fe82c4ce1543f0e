use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::process::{NewProcess as DomainNewProcess, Process as DomainProcess};
use crate::repository::errors::RepositoryError;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::processes)]
pub struct Process {
    pub id: i32,
    pub work_order_id: i32,
    pub process_type: String,
    pub machine: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::processes)]
pub struct NewProcess<'a> {
    pub work_order_id: i32,
    pub process_type: &'a str,
    pub machine: Option<&'a str>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub status: &'a str,
    pub notes: Option<&'a str>,
}

impl TryFrom<Process> for DomainProcess {
    type Error = RepositoryError;

    fn try_from(value: Process) -> Result<Self, Self::Error> {
        let status = value
            .status
            .parse()
            .map_err(|_| RepositoryError::InvalidData(format!("process status `{}`", value.status)))?;

        Ok(Self {
            id: value.id,
            work_order_id: value.work_order_id,
            process_type: value.process_type,
            machine: value.machine,
            start_time: value.start_time,
            end_time: value.end_time,
            status,
            notes: value.notes,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewProcess> for NewProcess<'a> {
    fn from(value: &'a DomainNewProcess) -> Self {
        Self {
            work_order_id: value.work_order_id,
            process_type: value.process_type.as_str(),
            machine: value.machine.as_deref(),
            start_time: value.start_time,
            end_time: value.end_time,
            status: value.status.as_str(),
            notes: value.notes.as_deref(),
        }
    }
}
