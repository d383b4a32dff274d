//! The main menu.
//!
//! Dispatch is keyed on [`Action`]; the label shown to the user is a separate
//! property and can change without affecting behaviour.

use strum::{EnumIter, IntoEnumIterator as _, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
  ViewDepartments,
  ViewOccupations,
  ViewEmployees,
  ViewEmployeesByDepartment,
  ViewEmployeesByManager,
  ViewBudgetReport,
  AddDepartment,
  AddOccupation,
  AddEmployee,
  ReassignOccupation,
  ReassignManager,
  RemoveDepartment,
  RemoveOccupation,
  RemoveEmployee,
  Exit,
}

impl Action {
  /// Every action, in menu order.
  pub fn all() -> Vec<Action> { Action::iter().collect() }

  /// Stable kebab-case identifier, used in logs.
  pub fn id(self) -> &'static str { self.into() }

  pub fn label(self) -> &'static str {
    match self {
      Action::ViewDepartments => "View ALL Departments",
      Action::ViewOccupations => "View ALL Occupations",
      Action::ViewEmployees => "View ALL Employees",
      Action::ViewEmployeesByDepartment => "View Employees by Department",
      Action::ViewEmployeesByManager => "View Employees by Manager",
      Action::ViewBudgetReport => "View Departmental Budget Report",
      Action::AddDepartment => "Add New Department",
      Action::AddOccupation => "Add New Occupation",
      Action::AddEmployee => "Add New Employee",
      Action::ReassignOccupation => "Update Employee Occupation",
      Action::ReassignManager => "Update Employee Manager",
      Action::RemoveDepartment => "Remove Department",
      Action::RemoveOccupation => "Remove Occupation",
      Action::RemoveEmployee => "Remove Employee",
      Action::Exit => "Exit",
    }
  }

  /// Prefix for the message shown when the action fails.
  pub fn failure(self) -> &'static str {
    match self {
      Action::ViewDepartments => "Failed to fetch departments",
      Action::ViewOccupations => "Failed to fetch occupations",
      Action::ViewEmployees => "Failed to fetch employee data",
      Action::ViewEmployeesByDepartment => "Failed to fetch employees by department",
      Action::ViewEmployeesByManager => "Failed to fetch the direct reports of the selected manager",
      Action::ViewBudgetReport => "Failed to generate the departmental budget report",
      Action::AddDepartment => "Failed to add department",
      Action::AddOccupation => "Failed to add occupation",
      Action::AddEmployee => "Failed to add employee",
      Action::ReassignOccupation => "Failed to update the employee's occupation",
      Action::ReassignManager => "Failed to update the employee's manager",
      Action::RemoveDepartment => "Failed to remove the selected department",
      Action::RemoveOccupation => "Failed to remove the selected occupation",
      Action::RemoveEmployee => "Failed to remove the selected staff member",
      Action::Exit => "Failed to exit",
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn menu_has_fifteen_entries_ending_in_exit() {
    let all = Action::all();
    assert_eq!(all.len(), 15);
    assert_eq!(all.last(), Some(&Action::Exit));
  }

  #[test]
  fn ids_and_labels_are_unique() {
    let all = Action::all();
    let ids: HashSet<_> = all.iter().map(|a| a.id()).collect();
    let labels: HashSet<_> = all.iter().map(|a| a.label()).collect();
    assert_eq!(ids.len(), all.len());
    assert_eq!(labels.len(), all.len());
  }

  #[test]
  fn ids_are_kebab_case() {
    assert_eq!(Action::ViewEmployeesByManager.id(), "view-employees-by-manager");
    assert_eq!(Action::Exit.id(), "exit");
  }
}
