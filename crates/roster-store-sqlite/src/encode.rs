//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Salaries are stored as canonical decimal strings so no float rounding ever
//! touches them. Dates are stored as `YYYY-MM-DD`.

use std::str::FromStr as _;

use chrono::NaiveDate;
use roster_core::model::{EmployeeListing, FormerEmployee, Occupation, OccupationListing};
use rust_decimal::Decimal;

use crate::{Error, Result};

// ─── Decimal ─────────────────────────────────────────────────────────────────

pub fn encode_decimal(d: Decimal) -> String { d.to_string() }

pub fn decode_decimal(s: &str) -> Result<Decimal> {
  Decimal::from_str(s).map_err(|e| Error::DecimalParse(format!("{s:?}: {e}")))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `occupation` row.
pub struct RawOccupation {
  pub id:            i64,
  pub title:         String,
  pub salary:        String,
  pub department_id: i64,
}

impl RawOccupation {
  pub fn into_occupation(self) -> Result<Occupation> {
    Ok(Occupation {
      id:            self.id,
      title:         self.title,
      salary:        decode_decimal(&self.salary)?,
      department_id: self.department_id,
    })
  }
}

/// Raw values of an `occupation` row joined with its department.
pub struct RawOccupationListing {
  pub id:         i64,
  pub title:      String,
  pub department: String,
  pub salary:     String,
}

impl RawOccupationListing {
  pub fn into_listing(self) -> Result<OccupationListing> {
    Ok(OccupationListing {
      id:         self.id,
      title:      self.title,
      department: self.department,
      salary:     decode_decimal(&self.salary)?,
    })
  }
}

/// Column list shared by every employee listing query. Append a `WHERE`
/// clause and an `ORDER BY`.
pub const EMPLOYEE_LISTING_SELECT: &str = "
  SELECT e.id, e.first_name, e.last_name,
         o.title, d.name, o.salary,
         m.first_name || ' ' || m.last_name
  FROM employee e
  LEFT JOIN occupation o ON o.id = e.occupation_id
  LEFT JOIN department d ON d.id = o.department_id
  LEFT JOIN employee   m ON m.id = e.manager_id";

/// Raw values produced by [`EMPLOYEE_LISTING_SELECT`].
pub struct RawEmployeeListing {
  pub id:         i64,
  pub first_name: String,
  pub last_name:  String,
  pub occupation: Option<String>,
  pub department: Option<String>,
  pub salary:     Option<String>,
  pub manager:    Option<String>,
}

impl RawEmployeeListing {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      first_name: row.get(1)?,
      last_name:  row.get(2)?,
      occupation: row.get(3)?,
      department: row.get(4)?,
      salary:     row.get(5)?,
      manager:    row.get(6)?,
    })
  }

  pub fn into_listing(self) -> Result<EmployeeListing> {
    Ok(EmployeeListing {
      id:         self.id,
      first_name: self.first_name,
      last_name:  self.last_name,
      occupation: self.occupation,
      department: self.department,
      salary:     self.salary.as_deref().map(decode_decimal).transpose()?,
      manager:    self.manager,
    })
  }
}

/// Raw values read directly from a `former_employees` row.
pub struct RawFormerEmployee {
  pub id:               i64,
  pub first_name:       String,
  pub last_name:        String,
  pub prior_occupation: Option<String>,
  pub laid_off_date:    String,
}

impl RawFormerEmployee {
  pub fn into_former(self) -> Result<FormerEmployee> {
    Ok(FormerEmployee {
      id:               self.id,
      first_name:       self.first_name,
      last_name:        self.last_name,
      prior_occupation: self.prior_occupation,
      laid_off_date:    decode_date(&self.laid_off_date)?,
    })
  }
}

/// One `(department, salary)` pair per active employee, feeding the budget
/// report.
pub struct RawSalaryLine {
  pub department_id: i64,
  pub department:    String,
  pub salary:        String,
}

#[cfg(test)]
mod tests {
  use rust_decimal_macros::dec;

  use super::*;

  #[test]
  fn decimal_text_keeps_scale() {
    assert_eq!(encode_decimal(dec!(90000.50)), "90000.50");
    assert_eq!(decode_decimal("90000.50").unwrap(), dec!(90000.50));
  }

  #[test]
  fn decimal_rejects_non_numeric_column() {
    assert!(matches!(decode_decimal("ninety"), Err(Error::DecimalParse(_))));
  }

  #[test]
  fn date_is_iso_calendar_date() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    assert_eq!(encode_date(date), "2024-02-29");
    assert_eq!(decode_date("2024-02-29").unwrap(), date);
    assert!(matches!(decode_date("29/02/2024"), Err(Error::DateParse(_))));
  }
}
