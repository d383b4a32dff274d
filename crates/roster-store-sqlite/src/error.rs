//! Error type for `roster-store-sqlite`.

use roster_core::model::{DepartmentId, EmployeeId, OccupationId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] roster_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("decimal parse error: {0}")]
  DecimalParse(String),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("department not found: {0}")]
  DepartmentNotFound(DepartmentId),

  #[error("occupation not found: {0}")]
  OccupationNotFound(OccupationId),

  #[error("employee not found: {0}")]
  EmployeeNotFound(EmployeeId),

  #[error("department [{0}] already exists")]
  DuplicateDepartment(String),

  #[error("occupation [{title}] already exists in department {department_id}")]
  DuplicateOccupation {
    title:         String,
    department_id: DepartmentId,
  },

  #[error("employee [{first_name} {last_name}] already exists")]
  DuplicateEmployee {
    first_name: String,
    last_name:  String,
  },

  #[error("employee {0} cannot be their own manager")]
  SelfManagement(EmployeeId),

  /// Raised by an occupation removal under `OrphanedReports::Refuse`.
  #[error(
    "{reports} employee(s) outside occupation {occupation_id} report to its holders; reassign them first"
  )]
  HasDirectReports {
    occupation_id: OccupationId,
    reports:       usize,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
