//! Selection choices: `{label, id}` pairs read from the reference tables and
//! offered to the user in a selection prompt.

use serde::{Deserialize, Serialize};

/// Which reference table to draw choices from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceKind {
  /// Labelled by `name`.
  Department,
  /// Labelled by `title`.
  Occupation,
  /// Labelled by `"first_name last_name"`.
  Employee,
  /// Employees with at least one direct report, labelled like employees.
  Manager,
}

impl ChoiceKind {
  /// Plural noun for user-facing messages.
  pub fn plural(self) -> &'static str {
    match self {
      ChoiceKind::Department => "departments",
      ChoiceKind::Occupation => "occupations",
      ChoiceKind::Employee => "employees",
      ChoiceKind::Manager => "managers",
    }
  }
}

/// One selectable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
  pub id:    i64,
  pub label: String,
}
