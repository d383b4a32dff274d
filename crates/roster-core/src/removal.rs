//! Outcome and policy types for cascading removals.

use serde::{Deserialize, Serialize};

use crate::model::FormerEmployee;

/// What to do with the direct reports of employees displaced by an
/// occupation removal.
///
/// Department and employee removals always unlink; only the occupation
/// cascade consults this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanedReports {
  /// Set `manager_id` to null for every report of a removed employee.
  #[default]
  Unlink,
  /// Reject the removal while anyone outside the occupation still reports
  /// to one of its holders.
  Refuse,
}

/// Everything a cascading removal changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalReport {
  /// Archive rows written, in insertion order.
  pub archived:            Vec<FormerEmployee>,
  /// Employees whose `manager_id` was set to null.
  pub reports_unlinked:    usize,
  pub occupations_removed: usize,
}

impl RemovalReport {
  pub fn dismissed(&self) -> usize { self.archived.len() }
}
