//! [`SqliteStore`], the SQLite implementation of [`Directory`].

use std::path::Path;

use chrono::Local;
use rusqlite::OptionalExtension as _;

use roster_core::{
  choice::{Choice, ChoiceKind},
  model::{
    Department, DepartmentBudget, DepartmentId, Employee, EmployeeId, EmployeeListing,
    FormerEmployee, NewEmployee, NewOccupation, Occupation, OccupationId, OccupationListing,
    required,
  },
  removal::{OrphanedReports, RemovalReport},
  store::Directory,
};

use crate::{
  cascade::{self, Outcome},
  encode::{
    EMPLOYEE_LISTING_SELECT, RawEmployeeListing, RawFormerEmployee, RawOccupation,
    RawOccupationListing, RawSalaryLine, decode_decimal, encode_decimal,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster backed by a single SQLite file.
///
/// Clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn:             tokio_rusqlite::Connection,
  orphaned_reports: OrphanedReports,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, orphaned_reports: OrphanedReports::default() })
  }

  /// Choose how occupation removals treat the reports of displaced managers.
  pub fn with_orphaned_reports(mut self, policy: OrphanedReports) -> Self {
    self.orphaned_reports = policy;
    self
  }

  pub fn orphaned_reports(&self) -> OrphanedReports { self.orphaned_reports }

  /// Close the underlying connection. Outstanding clones become unusable.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  /// Run raw SQL against the connection. Tests use it to inject failures.
  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Employee listing rows matching `filter` (a `WHERE` clause or empty).
  async fn employee_listings(
    &self,
    filter: &'static str,
    params: Vec<i64>,
  ) -> Result<Vec<EmployeeListing>> {
    let raws: Vec<RawEmployeeListing> = self
      .conn
      .call(move |conn| {
        let sql = format!("{EMPLOYEE_LISTING_SELECT} {filter} ORDER BY e.id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawEmployeeListing::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEmployeeListing::into_listing).collect()
  }

  /// Run one cascade in a transaction. It is committed only if the cascade
  /// succeeds; a rejection or any failing statement rolls everything back.
  async fn cascade<F>(&self, run: F) -> Result<RemovalReport>
  where
    F: FnOnce(&rusqlite::Transaction<'_>) -> rusqlite::Result<Outcome> + Send + 'static,
  {
    let outcome: Outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = run(&tx)?;
        if outcome.is_ok() {
          tx.commit()?;
        }
        Ok(outcome)
      })
      .await?;
    outcome
  }
}

/// Whether `sql` yields at least one row.
pub(crate) fn exists<P: rusqlite::Params>(
  conn:   &rusqlite::Connection,
  sql:    &str,
  params: P,
) -> rusqlite::Result<bool> {
  Ok(conn.query_row(sql, params, |_| Ok(())).optional()?.is_some())
}

fn fetch_employee(
  conn: &rusqlite::Connection,
  id:   EmployeeId,
) -> rusqlite::Result<Option<Employee>> {
  conn
    .query_row(
      "SELECT id, first_name, last_name, occupation_id, manager_id FROM employee WHERE id = ?1",
      [id],
      |row| {
        Ok(Employee {
          id:            row.get(0)?,
          first_name:    row.get(1)?,
          last_name:     row.get(2)?,
          occupation_id: row.get(3)?,
          manager_id:    row.get(4)?,
        })
      },
    )
    .optional()
}

// ─── Directory impl ──────────────────────────────────────────────────────────

impl Directory for SqliteStore {
  type Error = Error;

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_departments(&self) -> Result<Vec<Department>> {
    let departments = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM department ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| Ok(Department { id: row.get(0)?, name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(departments)
  }

  async fn list_occupations(&self) -> Result<Vec<OccupationListing>> {
    let raws: Vec<RawOccupationListing> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT o.id, o.title, d.name, o.salary
           FROM occupation o
           JOIN department d ON d.id = o.department_id
           ORDER BY o.id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawOccupationListing {
              id:         row.get(0)?,
              title:      row.get(1)?,
              department: row.get(2)?,
              salary:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOccupationListing::into_listing).collect()
  }

  async fn list_employees(&self) -> Result<Vec<EmployeeListing>> {
    self.employee_listings("", Vec::new()).await
  }

  async fn employees_by_department(
    &self,
    department_id: DepartmentId,
  ) -> Result<Vec<EmployeeListing>> {
    let known = self
      .conn
      .call(move |conn| {
        Ok(exists(conn, "SELECT 1 FROM department WHERE id = ?1", [department_id])?)
      })
      .await?;
    if !known {
      return Err(Error::DepartmentNotFound(department_id));
    }
    self.employee_listings("WHERE o.department_id = ?1", vec![department_id]).await
  }

  async fn employees_by_manager(&self, manager_id: EmployeeId) -> Result<Vec<EmployeeListing>> {
    let known = self
      .conn
      .call(move |conn| Ok(exists(conn, "SELECT 1 FROM employee WHERE id = ?1", [manager_id])?))
      .await?;
    if !known {
      return Err(Error::EmployeeNotFound(manager_id));
    }
    self.employee_listings("WHERE e.manager_id = ?1", vec![manager_id]).await
  }

  async fn budget_report(&self) -> Result<Vec<DepartmentBudget>> {
    let lines: Vec<RawSalaryLine> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT d.id, d.name, o.salary
           FROM employee e
           JOIN occupation o ON o.id = e.occupation_id
           JOIN department d ON d.id = o.department_id
           ORDER BY d.id, e.id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSalaryLine {
              department_id: row.get(0)?,
              department:    row.get(1)?,
              salary:        row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // Summed here rather than with SQL SUM(), which would go through REAL.
    let mut budgets: Vec<DepartmentBudget> = Vec::new();
    for line in lines {
      let salary = decode_decimal(&line.salary)?;
      match budgets.last_mut() {
        Some(b) if b.department_id == line.department_id => {
          b.headcount += 1;
          b.total_budget += salary;
        }
        _ => budgets.push(DepartmentBudget {
          department_id: line.department_id,
          department:    line.department,
          headcount:     1,
          total_budget:  salary,
        }),
      }
    }
    Ok(budgets)
  }

  async fn list_former_employees(&self) -> Result<Vec<FormerEmployee>> {
    let raws: Vec<RawFormerEmployee> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, first_name, last_name, prior_occupation, laid_off_date
           FROM former_employees
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawFormerEmployee {
              id:               row.get(0)?,
              first_name:       row.get(1)?,
              last_name:        row.get(2)?,
              prior_occupation: row.get(3)?,
              laid_off_date:    row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFormerEmployee::into_former).collect()
  }

  async fn choices(&self, kind: ChoiceKind) -> Result<Vec<Choice>> {
    let sql = match kind {
      ChoiceKind::Department => "SELECT id, name FROM department ORDER BY id",
      ChoiceKind::Occupation => "SELECT id, title FROM occupation ORDER BY id",
      ChoiceKind::Employee => {
        "SELECT id, first_name || ' ' || last_name FROM employee ORDER BY id"
      }
      ChoiceKind::Manager => {
        "SELECT m.id, m.first_name || ' ' || m.last_name
         FROM employee m
         WHERE EXISTS (SELECT 1 FROM employee e WHERE e.manager_id = m.id)
         ORDER BY m.id"
      }
    };

    let choices = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map([], |row| Ok(Choice { id: row.get(0)?, label: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(choices)
  }

  // ── Adds ──────────────────────────────────────────────────────────────────

  async fn add_department(&self, name: String) -> Result<Department> {
    let name = required("department name", &name)?;

    let created: Result<Department> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if exists(&tx, "SELECT 1 FROM department WHERE name = ?1 COLLATE NOCASE", [&name])? {
          return Ok(Err(Error::DuplicateDepartment(name)));
        }
        tx.execute("INSERT INTO department (name) VALUES (?1)", [&name])?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(Department { id, name }))
      })
      .await?;

    let department = created?;
    tracing::info!(id = department.id, name = %department.name, "department added");
    Ok(department)
  }

  async fn add_occupation(&self, input: NewOccupation) -> Result<Occupation> {
    let salary_str = encode_decimal(input.salary);

    let created: Result<RawOccupation> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, "SELECT 1 FROM department WHERE id = ?1", [input.department_id])? {
          return Ok(Err(Error::DepartmentNotFound(input.department_id)));
        }
        if exists(
          &tx,
          "SELECT 1 FROM occupation WHERE title = ?1 COLLATE NOCASE AND department_id = ?2",
          rusqlite::params![input.title, input.department_id],
        )? {
          return Ok(Err(Error::DuplicateOccupation {
            title:         input.title,
            department_id: input.department_id,
          }));
        }
        tx.execute(
          "INSERT INTO occupation (title, salary, department_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![input.title, salary_str, input.department_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(RawOccupation {
          id,
          title: input.title,
          salary: salary_str,
          department_id: input.department_id,
        }))
      })
      .await?;

    let occupation = created?.into_occupation()?;
    tracing::info!(
      id = occupation.id,
      title = %occupation.title,
      department_id = occupation.department_id,
      "occupation added"
    );
    Ok(occupation)
  }

  async fn add_employee(&self, input: NewEmployee) -> Result<Employee> {
    let created: Result<Employee> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(occupation_id) = input.occupation_id
          && !exists(&tx, "SELECT 1 FROM occupation WHERE id = ?1", [occupation_id])?
        {
          return Ok(Err(Error::OccupationNotFound(occupation_id)));
        }
        if let Some(manager_id) = input.manager_id
          && !exists(&tx, "SELECT 1 FROM employee WHERE id = ?1", [manager_id])?
        {
          return Ok(Err(Error::EmployeeNotFound(manager_id)));
        }
        if exists(
          &tx,
          "SELECT 1 FROM employee
           WHERE first_name = ?1 COLLATE NOCASE AND last_name = ?2 COLLATE NOCASE",
          rusqlite::params![input.first_name, input.last_name],
        )? {
          return Ok(Err(Error::DuplicateEmployee {
            first_name: input.first_name,
            last_name:  input.last_name,
          }));
        }
        tx.execute(
          "INSERT INTO employee (first_name, last_name, occupation_id, manager_id)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            input.first_name,
            input.last_name,
            input.occupation_id,
            input.manager_id,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(Employee {
          id,
          first_name: input.first_name,
          last_name: input.last_name,
          occupation_id: input.occupation_id,
          manager_id: input.manager_id,
        }))
      })
      .await?;

    let employee = created?;
    tracing::info!(id = employee.id, name = %employee.full_name(), "employee added");
    Ok(employee)
  }

  // ── Reassignments ─────────────────────────────────────────────────────────

  async fn reassign_occupation(
    &self,
    employee_id: EmployeeId,
    occupation_id: OccupationId,
  ) -> Result<Employee> {
    let updated: Result<Employee> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if fetch_employee(&tx, employee_id)?.is_none() {
          return Ok(Err(Error::EmployeeNotFound(employee_id)));
        }
        if !exists(&tx, "SELECT 1 FROM occupation WHERE id = ?1", [occupation_id])? {
          return Ok(Err(Error::OccupationNotFound(occupation_id)));
        }
        tx.execute(
          "UPDATE employee SET occupation_id = ?1 WHERE id = ?2",
          [occupation_id, employee_id],
        )?;
        let employee = fetch_employee(&tx, employee_id)?;
        tx.commit()?;
        Ok(employee.ok_or(Error::EmployeeNotFound(employee_id)))
      })
      .await?;

    let employee = updated?;
    tracing::info!(employee_id, occupation_id, "occupation reassigned");
    Ok(employee)
  }

  async fn reassign_manager(
    &self,
    employee_id: EmployeeId,
    manager_id: Option<EmployeeId>,
  ) -> Result<Employee> {
    if manager_id == Some(employee_id) {
      return Err(Error::SelfManagement(employee_id));
    }

    let updated: Result<Employee> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if fetch_employee(&tx, employee_id)?.is_none() {
          return Ok(Err(Error::EmployeeNotFound(employee_id)));
        }
        if let Some(manager_id) = manager_id
          && !exists(&tx, "SELECT 1 FROM employee WHERE id = ?1", [manager_id])?
        {
          return Ok(Err(Error::EmployeeNotFound(manager_id)));
        }
        tx.execute(
          "UPDATE employee SET manager_id = ?1 WHERE id = ?2",
          rusqlite::params![manager_id, employee_id],
        )?;
        let employee = fetch_employee(&tx, employee_id)?;
        tx.commit()?;
        Ok(employee.ok_or(Error::EmployeeNotFound(employee_id)))
      })
      .await?;

    let employee = updated?;
    tracing::info!(employee_id, manager_id = ?manager_id, "manager reassigned");
    Ok(employee)
  }

  // ── Cascading removals ────────────────────────────────────────────────────

  async fn remove_department(&self, department_id: DepartmentId) -> Result<RemovalReport> {
    let today = Local::now().date_naive();
    let report = self
      .cascade(move |tx| cascade::remove_department(tx, department_id, today))
      .await?;

    tracing::info!(
      department_id,
      occupations = report.occupations_removed,
      archived = report.dismissed(),
      unlinked = report.reports_unlinked,
      "department removed"
    );
    Ok(report)
  }

  async fn remove_occupation(&self, occupation_id: OccupationId) -> Result<RemovalReport> {
    let today = Local::now().date_naive();
    let policy = self.orphaned_reports;
    let report = self
      .cascade(move |tx| cascade::remove_occupation(tx, occupation_id, policy, today))
      .await?;

    tracing::info!(
      occupation_id,
      archived = report.dismissed(),
      unlinked = report.reports_unlinked,
      "occupation removed"
    );
    Ok(report)
  }

  async fn remove_employee(&self, employee_id: EmployeeId) -> Result<RemovalReport> {
    let today = Local::now().date_naive();
    let report = self
      .cascade(move |tx| cascade::remove_employee(tx, employee_id, today))
      .await?;

    tracing::info!(employee_id, unlinked = report.reports_unlinked, "employee removed");
    Ok(report)
  }
}
