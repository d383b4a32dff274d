//! Listing output as aligned text columns or JSON.

use roster_core::model::{Department, DepartmentBudget, EmployeeListing, OccupationListing};
use serde::Serialize;

use crate::settings::OutputFormat;

/// A record that can be printed as one table row.
pub trait Tabular {
  const HEADERS: &'static [&'static str];

  fn cells(&self) -> Vec<String>;
}

fn or_blank(value: Option<impl ToString>) -> String {
  value.map(|v| v.to_string()).unwrap_or_default()
}

impl Tabular for Department {
  const HEADERS: &'static [&'static str] = &["id", "department"];

  fn cells(&self) -> Vec<String> { vec![self.id.to_string(), self.name.clone()] }
}

impl Tabular for OccupationListing {
  const HEADERS: &'static [&'static str] = &["id", "title", "department", "salary"];

  fn cells(&self) -> Vec<String> {
    vec![
      self.id.to_string(),
      self.title.clone(),
      self.department.clone(),
      self.salary.to_string(),
    ]
  }
}

impl Tabular for EmployeeListing {
  const HEADERS: &'static [&'static str] = &[
    "id",
    "first_name",
    "last_name",
    "title",
    "department",
    "salary",
    "manager",
  ];

  fn cells(&self) -> Vec<String> {
    vec![
      self.id.to_string(),
      self.first_name.clone(),
      self.last_name.clone(),
      or_blank(self.occupation.as_deref()),
      or_blank(self.department.as_deref()),
      or_blank(self.salary),
      or_blank(self.manager.as_deref()),
    ]
  }
}

impl Tabular for DepartmentBudget {
  const HEADERS: &'static [&'static str] = &["department", "employees", "total_budget"];

  fn cells(&self) -> Vec<String> {
    vec![
      self.department.clone(),
      self.headcount.to_string(),
      self.total_budget.to_string(),
    ]
  }
}

/// Render `rows` under a header row, columns padded to their widest cell.
pub fn table<T: Tabular>(rows: &[T]) -> String {
  let body: Vec<Vec<String>> = rows.iter().map(T::cells).collect();

  let mut widths: Vec<usize> = T::HEADERS.iter().map(|h| h.chars().count()).collect();
  for row in &body {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.chars().count());
    }
  }

  let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();

  let mut out = Vec::with_capacity(body.len() + 2);
  out.push(pad(T::HEADERS, &widths));
  out.push(pad(&rule, &widths));
  out.extend(body.iter().map(|row| pad(row, &widths)));
  out.join("\n")
}

fn pad<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
  let padded: Vec<String> = cells
    .iter()
    .zip(widths)
    .map(|(cell, &width)| format!("{:<width$}", cell.as_ref()))
    .collect();
  padded.join("  ").trim_end().to_owned()
}

pub fn render<T: Tabular + Serialize>(format: OutputFormat, rows: &[T]) -> anyhow::Result<String> {
  match format {
    OutputFormat::Table => Ok(table(rows)),
    OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
  }
}
