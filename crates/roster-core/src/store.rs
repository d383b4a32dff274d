//! The `Directory` trait: storage abstraction for the roster.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! The CLI depends on this abstraction, not on any concrete backend, so every
//! handler can be exercised against an isolated store.

use std::future::Future;

use crate::{
  choice::{Choice, ChoiceKind},
  model::{
    Department, DepartmentBudget, DepartmentId, Employee, EmployeeId, EmployeeListing,
    FormerEmployee, NewEmployee, NewOccupation, Occupation, OccupationId, OccupationListing,
  },
  removal::RemovalReport,
};

/// Abstraction over a roster backend.
///
/// Every multi-statement operation is atomic: it either completes in full or
/// leaves the store untouched.
pub trait Directory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn list_departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  /// All occupations with their department's name.
  fn list_occupations(
    &self,
  ) -> impl Future<Output = Result<Vec<OccupationListing>, Self::Error>> + Send + '_;

  /// All active employees with occupation, department and manager details.
  fn list_employees(
    &self,
  ) -> impl Future<Output = Result<Vec<EmployeeListing>, Self::Error>> + Send + '_;

  /// Employees holding one of the department's occupations.
  fn employees_by_department(
    &self,
    department_id: DepartmentId,
  ) -> impl Future<Output = Result<Vec<EmployeeListing>, Self::Error>> + Send + '_;

  /// Direct reports of `manager_id`.
  fn employees_by_manager(
    &self,
    manager_id: EmployeeId,
  ) -> impl Future<Output = Result<Vec<EmployeeListing>, Self::Error>> + Send + '_;

  /// Utilised budget per department with at least one active employee.
  fn budget_report(
    &self,
  ) -> impl Future<Output = Result<Vec<DepartmentBudget>, Self::Error>> + Send + '_;

  /// The archive, in insertion order.
  fn list_former_employees(
    &self,
  ) -> impl Future<Output = Result<Vec<FormerEmployee>, Self::Error>> + Send + '_;

  /// `{label, id}` pairs for a selection prompt, ordered by id.
  fn choices(
    &self,
    kind: ChoiceKind,
  ) -> impl Future<Output = Result<Vec<Choice>, Self::Error>> + Send + '_;

  // ── Adds ──────────────────────────────────────────────────────────────

  /// Rejects a name already used by another department.
  fn add_department(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  /// Rejects an unknown department or a title already used within it.
  fn add_occupation(
    &self,
    input: NewOccupation,
  ) -> impl Future<Output = Result<Occupation, Self::Error>> + Send + '_;

  /// Rejects an unknown occupation or manager, or a name already on payroll.
  fn add_employee(
    &self,
    input: NewEmployee,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  // ── Reassignments ─────────────────────────────────────────────────────

  fn reassign_occupation(
    &self,
    employee_id: EmployeeId,
    occupation_id: OccupationId,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  /// `manager_id = None` removes the employee's manager.
  fn reassign_manager(
    &self,
    employee_id: EmployeeId,
    manager_id: Option<EmployeeId>,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  // ── Cascading removals ────────────────────────────────────────────────

  /// Archive every employee of the department's occupations, unlink anyone
  /// they managed, then delete the occupations and the department.
  fn remove_department(
    &self,
    department_id: DepartmentId,
  ) -> impl Future<Output = Result<RemovalReport, Self::Error>> + Send + '_;

  /// Archive the occupation's holders, then delete them and the occupation.
  /// Their direct reports are handled per the store's
  /// [`OrphanedReports`](crate::removal::OrphanedReports) policy.
  fn remove_occupation(
    &self,
    occupation_id: OccupationId,
  ) -> impl Future<Output = Result<RemovalReport, Self::Error>> + Send + '_;

  /// Unlink the employee's direct reports, archive the employee, delete it.
  fn remove_employee(
    &self,
    employee_id: EmployeeId,
  ) -> impl Future<Output = Result<RemovalReport, Self::Error>> + Send + '_;
}
