//! Domain records (departments, occupations, employees and the archive of
//! former employees) plus the validated inputs used to create them.
//!
//! All ids are opaque surrogate keys assigned by the store.

use std::str::FromStr as _;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub type DepartmentId = i64;
pub type OccupationId = i64;
pub type EmployeeId = i64;

// ─── Live records ────────────────────────────────────────────────────────────

/// A department. Owns zero or more occupations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
  pub id:   DepartmentId,
  pub name: String,
}

/// A job title with a fixed salary, payrolled in exactly one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupation {
  pub id:            OccupationId,
  pub title:         String,
  pub salary:        Decimal,
  pub department_id: DepartmentId,
}

/// A currently active member of staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
  pub id:            EmployeeId,
  pub first_name:    String,
  pub last_name:     String,
  pub occupation_id: Option<OccupationId>,
  /// `None` means the employee has no manager.
  pub manager_id:    Option<EmployeeId>,
}

impl Employee {
  pub fn full_name(&self) -> String { format!("{} {}", self.first_name, self.last_name) }
}

// ─── Archive ─────────────────────────────────────────────────────────────────

/// Append-only record of a removed employee.
///
/// `prior_occupation` is the occupation's title text, not a key: the
/// occupation itself may be deleted in the same operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormerEmployee {
  pub id:               i64,
  pub first_name:       String,
  pub last_name:        String,
  pub prior_occupation: Option<String>,
  pub laid_off_date:    NaiveDate,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// An occupation joined with its department's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupationListing {
  pub id:         OccupationId,
  pub title:      String,
  pub department: String,
  pub salary:     Decimal,
}

/// An employee joined with occupation, department and manager details.
///
/// Every joined column is optional; an employee without an occupation or a
/// manager is still listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeListing {
  pub id:         EmployeeId,
  pub first_name: String,
  pub last_name:  String,
  pub occupation: Option<String>,
  pub department: Option<String>,
  pub salary:     Option<Decimal>,
  pub manager:    Option<String>,
}

/// Total utilised budget of one department: the sum of the salaries of the
/// occupations held by its active employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentBudget {
  pub department_id: DepartmentId,
  pub department:    String,
  pub headcount:     u32,
  pub total_budget:  Decimal,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Trim `value` and reject it if nothing is left.
pub fn required(field: &'static str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::EmptyField(field));
  }
  Ok(trimmed.to_owned())
}

/// Parse a user-supplied salary. Salaries are exact decimals and never
/// negative.
pub fn parse_salary(input: &str) -> Result<Decimal> {
  let salary = Decimal::from_str(input.trim()).map_err(|source| Error::InvalidSalary {
    input: input.to_owned(),
    source,
  })?;
  if salary.is_sign_negative() && !salary.is_zero() {
    return Err(Error::NegativeSalary(salary));
  }
  Ok(salary)
}

/// Validated input for a new occupation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOccupation {
  pub title:         String,
  pub salary:        Decimal,
  pub department_id: DepartmentId,
}

impl NewOccupation {
  /// Build from raw prompt answers.
  pub fn parse(title: &str, salary: &str, department_id: DepartmentId) -> Result<Self> {
    Ok(Self {
      title: required("title", title)?,
      salary: parse_salary(salary)?,
      department_id,
    })
  }
}

/// Validated input for a new employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
  pub first_name:    String,
  pub last_name:     String,
  pub occupation_id: Option<OccupationId>,
  pub manager_id:    Option<EmployeeId>,
}

impl NewEmployee {
  pub fn new(
    first_name:    &str,
    last_name:     &str,
    occupation_id: Option<OccupationId>,
    manager_id:    Option<EmployeeId>,
  ) -> Result<Self> {
    Ok(Self {
      first_name: required("first name", first_name)?,
      last_name: required("last name", last_name)?,
      occupation_id,
      manager_id,
    })
  }
}
