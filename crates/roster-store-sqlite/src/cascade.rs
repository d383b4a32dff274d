//! The cascading deletion engine.
//!
//! Every function here runs inside a transaction owned by the caller and
//! never commits it. Order matters throughout: manager references are nulled
//! before the manager rows disappear (afterwards nothing joins against them),
//! employees are archived before they are deleted, and employees go before
//! the occupations they reference, which go before their department.

use chrono::NaiveDate;
use roster_core::{
  model::{DepartmentId, EmployeeId, FormerEmployee, OccupationId},
  removal::{OrphanedReports, RemovalReport},
};
use rusqlite::{OptionalExtension as _, Transaction};

use crate::{Error, Result, encode::encode_date, store::exists};

/// A cascade either removes something (and should be committed) or is
/// rejected before writing anything.
pub type Outcome = Result<RemovalReport>;

// ─── Entry points ────────────────────────────────────────────────────────────

pub fn remove_department(
  tx:            &Transaction<'_>,
  department_id: DepartmentId,
  today:         NaiveDate,
) -> rusqlite::Result<Outcome> {
  if !exists(tx, "SELECT 1 FROM department WHERE id = ?1", [department_id])? {
    return Ok(Err(Error::DepartmentNotFound(department_id)));
  }

  let occupation_ids: Vec<OccupationId> = {
    let mut stmt = tx.prepare("SELECT id FROM occupation WHERE department_id = ?1 ORDER BY id")?;
    stmt
      .query_map([department_id], |row| row.get(0))?
      .collect::<rusqlite::Result<_>>()?
  };

  let mut report = RemovalReport::default();

  // Unlink across the whole department before anyone is archived.
  for &occupation_id in &occupation_ids {
    report.reports_unlinked += unlink_reports_of_holders(tx, occupation_id)?;
  }
  for &occupation_id in &occupation_ids {
    report.archived.extend(archive_holders(tx, occupation_id, today)?);
  }

  report.occupations_removed =
    tx.execute("DELETE FROM occupation WHERE department_id = ?1", [department_id])?;
  tx.execute("DELETE FROM department WHERE id = ?1", [department_id])?;

  Ok(Ok(report))
}

pub fn remove_occupation(
  tx:            &Transaction<'_>,
  occupation_id: OccupationId,
  policy:        OrphanedReports,
  today:         NaiveDate,
) -> rusqlite::Result<Outcome> {
  if !exists(tx, "SELECT 1 FROM occupation WHERE id = ?1", [occupation_id])? {
    return Ok(Err(Error::OccupationNotFound(occupation_id)));
  }

  if policy == OrphanedReports::Refuse {
    let outside: i64 = tx.query_row(
      "SELECT COUNT(*) FROM employee
       WHERE manager_id IN (SELECT id FROM employee WHERE occupation_id = ?1)
         AND occupation_id IS NOT ?1",
      [occupation_id],
      |row| row.get(0),
    )?;
    if outside > 0 {
      return Ok(Err(Error::HasDirectReports { occupation_id, reports: outside as usize }));
    }
  }

  // Under `Refuse` only reports inside the occupation are left to unlink.
  let mut report = RemovalReport {
    reports_unlinked: unlink_reports_of_holders(tx, occupation_id)?,
    ..RemovalReport::default()
  };
  report.archived = archive_holders(tx, occupation_id, today)?;
  report.occupations_removed = tx.execute("DELETE FROM occupation WHERE id = ?1", [occupation_id])?;

  Ok(Ok(report))
}

pub fn remove_employee(
  tx:          &Transaction<'_>,
  employee_id: EmployeeId,
  today:       NaiveDate,
) -> rusqlite::Result<Outcome> {
  let found: Option<(String, String, Option<String>)> = tx
    .query_row(
      "SELECT e.first_name, e.last_name, o.title
       FROM employee e
       LEFT JOIN occupation o ON o.id = e.occupation_id
       WHERE e.id = ?1",
      [employee_id],
      |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
    .optional()?;

  let Some((first_name, last_name, prior_occupation)) = found else {
    return Ok(Err(Error::EmployeeNotFound(employee_id)));
  };

  let reports_unlinked =
    tx.execute("UPDATE employee SET manager_id = NULL WHERE manager_id = ?1", [employee_id])?;
  let former = archive(tx, first_name, last_name, prior_occupation, today)?;
  tx.execute("DELETE FROM employee WHERE id = ?1", [employee_id])?;

  Ok(Ok(RemovalReport {
    archived: vec![former],
    reports_unlinked,
    occupations_removed: 0,
  }))
}

// ─── Steps ───────────────────────────────────────────────────────────────────

/// Null the `manager_id` of everyone managed by a holder of `occupation_id`.
fn unlink_reports_of_holders(
  tx:            &Transaction<'_>,
  occupation_id: OccupationId,
) -> rusqlite::Result<usize> {
  tx.execute(
    "UPDATE employee SET manager_id = NULL
     WHERE manager_id IN (SELECT id FROM employee WHERE occupation_id = ?1)",
    [occupation_id],
  )
}

/// Archive every holder of `occupation_id`, then delete them.
fn archive_holders(
  tx:            &Transaction<'_>,
  occupation_id: OccupationId,
  today:         NaiveDate,
) -> rusqlite::Result<Vec<FormerEmployee>> {
  let holders: Vec<(String, String, String)> = {
    let mut stmt = tx.prepare(
      "SELECT e.first_name, e.last_name, o.title
       FROM employee e
       JOIN occupation o ON o.id = e.occupation_id
       WHERE e.occupation_id = ?1
       ORDER BY e.id",
    )?;
    stmt
      .query_map([occupation_id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
      .collect::<rusqlite::Result<_>>()?
  };

  let archived = holders
    .into_iter()
    .map(|(first_name, last_name, title)| archive(tx, first_name, last_name, Some(title), today))
    .collect::<rusqlite::Result<Vec<_>>>()?;

  tx.execute("DELETE FROM employee WHERE occupation_id = ?1", [occupation_id])?;
  Ok(archived)
}

fn archive(
  tx:               &Transaction<'_>,
  first_name:       String,
  last_name:        String,
  prior_occupation: Option<String>,
  today:            NaiveDate,
) -> rusqlite::Result<FormerEmployee> {
  tx.execute(
    "INSERT INTO former_employees (first_name, last_name, prior_occupation, laid_off_date)
     VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![first_name, last_name, prior_occupation, encode_date(today)],
  )?;

  Ok(FormerEmployee {
    id: tx.last_insert_rowid(),
    first_name,
    last_name,
    prior_occupation,
    laid_off_date: today,
  })
}
