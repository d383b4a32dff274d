//! Menu loop and action handlers.
//!
//! [`App`] owns a [`Directory`] handle and a [`Console`]; each menu action
//! is one async handler. A failing handler is reported and the loop goes on.

use anyhow::Result;
use roster_core::{
  choice::{Choice, ChoiceKind},
  model::{self, EmployeeId, NewEmployee, NewOccupation},
  removal::RemovalReport,
  store::Directory,
};
use serde::Serialize;

use crate::{
  console::Console,
  menu::Action,
  render::{self, Tabular},
  settings::OutputFormat,
};

/// Label of the sentinel entry offered ahead of the employees in a manager
/// prompt.
pub const NO_MANAGER: &str = "No Manager";

const MAIN_PROMPT: &str = "Select an action from the options below:";

/// Whether the menu loop keeps going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  Continue,
  Exit,
}

pub struct App<S, C> {
  store:   S,
  console: C,
  output:  OutputFormat,
}

impl<S: Directory, C: Console> App<S, C> {
  pub fn new(store: S, console: C, output: OutputFormat) -> Self {
    Self {
      store,
      console,
      output,
    }
  }

  pub fn into_parts(self) -> (S, C) { (self.store, self.console) }

  /// Show the main menu until the user exits or input ends.
  pub async fn run(&mut self) -> Result<()> {
    let actions = Action::all();
    let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

    loop {
      let Some(picked) = self.console.select(MAIN_PROMPT, &labels)? else {
        tracing::debug!("main menu closed");
        return Ok(());
      };
      let Some(&action) = actions.get(picked) else {
        continue;
      };

      match self.dispatch(action).await {
        Ok(Flow::Continue) => {}
        Ok(Flow::Exit) => return Ok(()),
        Err(e) => {
          tracing::error!(action = action.id(), error = %e, "action failed");
          self.console.show(&format!("{}: {e:#}", action.failure()));
        }
      }
    }
  }

  pub async fn dispatch(&mut self, action: Action) -> Result<Flow> {
    tracing::debug!(action = action.id(), "dispatching");
    match action {
      Action::ViewDepartments => {
        let rows = self.store.list_departments().await?;
        self.present("Catalog of Departments:", &rows)?;
      }
      Action::ViewOccupations => {
        let rows = self.store.list_occupations().await?;
        self.present("Catalog of Occupations:", &rows)?;
      }
      Action::ViewEmployees => {
        let rows = self.store.list_employees().await?;
        self.present("Employee Details:", &rows)?;
      }
      Action::ViewEmployeesByDepartment => self.view_by_department().await?,
      Action::ViewEmployeesByManager => self.view_by_manager().await?,
      Action::ViewBudgetReport => self.budget_report().await?,
      Action::AddDepartment => self.add_department().await?,
      Action::AddOccupation => self.add_occupation().await?,
      Action::AddEmployee => self.add_employee().await?,
      Action::ReassignOccupation => self.reassign_occupation().await?,
      Action::ReassignManager => self.reassign_manager().await?,
      Action::RemoveDepartment => self.remove_department().await?,
      Action::RemoveOccupation => self.remove_occupation().await?,
      Action::RemoveEmployee => self.remove_employee().await?,
      Action::Exit => {
        self.console.show("Exiting application.");
        return Ok(Flow::Exit);
      }
    }
    Ok(Flow::Continue)
  }

  // ── Views ─────────────────────────────────────────────────────────────

  async fn view_by_department(&mut self) -> Result<()> {
    let Some(department) = self
      .pick(ChoiceKind::Department, "Select a department to view its employees:")
      .await?
    else {
      return Ok(());
    };
    let rows = self.store.employees_by_department(department.id).await?;
    self.present(&format!("Employees in the [{}] department:", department.label), &rows)
  }

  async fn view_by_manager(&mut self) -> Result<()> {
    let Some(manager) = self
      .pick(ChoiceKind::Manager, "Select a manager to view their direct reports:")
      .await?
    else {
      return Ok(());
    };
    let rows = self.store.employees_by_manager(manager.id).await?;
    self.present(&format!("Direct reports of [{}]:", manager.label), &rows)
  }

  async fn budget_report(&mut self) -> Result<()> {
    let rows = self.store.budget_report().await?;
    if rows.is_empty() {
      self.console.show("No budget data available.");
      return Ok(());
    }
    self.present("Total utilized budget by department:", &rows)
  }

  // ── Adds ──────────────────────────────────────────────────────────────

  async fn add_department(&mut self) -> Result<()> {
    let name = self.console.input("Enter the name of the new department:")?;
    let department = self.store.add_department(model::required("name", &name)?).await?;
    self
      .console
      .show(&format!("The [{}] department has been added.", department.name));
    Ok(())
  }

  async fn add_occupation(&mut self) -> Result<()> {
    let title = model::required("title", &self.console.input("Enter the occupation title:")?)?;
    let salary = model::parse_salary(&self.console.input("Enter the salary for this occupation:")?)?;
    let Some(department) = self
      .pick(ChoiceKind::Department, "Select the department for this occupation:")
      .await?
    else {
      return Ok(());
    };

    let occupation = self
      .store
      .add_occupation(NewOccupation {
        title,
        salary,
        department_id: department.id,
      })
      .await?;
    self.console.show(&format!(
      "The [{}] occupation has been added to the [{}] department.",
      occupation.title, department.label
    ));
    Ok(())
  }

  async fn add_employee(&mut self) -> Result<()> {
    let first_name =
      model::required("first name", &self.console.input("Enter the employee's first name:")?)?;
    let last_name =
      model::required("last name", &self.console.input("Enter the employee's last name:")?)?;
    let Some(occupation) = self
      .pick(ChoiceKind::Occupation, "Select the employee's occupation:")
      .await?
    else {
      return Ok(());
    };
    let Some(manager) = self
      .pick_manager("Select the employee's manager:", None)
      .await?
    else {
      return Ok(());
    };

    let input = NewEmployee::new(
      &first_name,
      &last_name,
      Some(occupation.id),
      manager.map(|m| m.id),
    )?;
    let employee = self.store.add_employee(input).await?;
    self.console.show(&format!(
      "[{}] has been added as [{}].",
      employee.full_name(),
      occupation.label
    ));
    Ok(())
  }

  // ── Reassignments ─────────────────────────────────────────────────────

  async fn reassign_occupation(&mut self) -> Result<()> {
    let Some(employee) = self
      .pick(ChoiceKind::Employee, "Select the employee whose occupation is changing:")
      .await?
    else {
      return Ok(());
    };
    let Some(occupation) = self
      .pick(ChoiceKind::Occupation, "Select the new occupation:")
      .await?
    else {
      return Ok(());
    };

    self.store.reassign_occupation(employee.id, occupation.id).await?;
    self.console.show(&format!(
      "[{}] now holds the [{}] occupation.",
      employee.label, occupation.label
    ));
    Ok(())
  }

  async fn reassign_manager(&mut self) -> Result<()> {
    let Some(employee) = self
      .pick(ChoiceKind::Employee, "Select the employee whose manager is changing:")
      .await?
    else {
      return Ok(());
    };
    let Some(manager) = self
      .pick_manager("Select the new manager:", Some(employee.id))
      .await?
    else {
      return Ok(());
    };

    self
      .store
      .reassign_manager(employee.id, manager.as_ref().map(|m| m.id))
      .await?;
    let message = match manager {
      Some(manager) => format!("[{}] now reports to [{}].", employee.label, manager.label),
      None => format!("[{}] no longer has a manager.", employee.label),
    };
    self.console.show(&message);
    Ok(())
  }

  // ── Removals ──────────────────────────────────────────────────────────

  async fn remove_department(&mut self) -> Result<()> {
    let Some(department) = self
      .pick(ChoiceKind::Department, "Select the department to remove:")
      .await?
    else {
      return Ok(());
    };
    let report = self.store.remove_department(department.id).await?;
    self.announce_removal(&format!("The [{}] department", department.label), &report);
    Ok(())
  }

  async fn remove_occupation(&mut self) -> Result<()> {
    let Some(occupation) = self
      .pick(ChoiceKind::Occupation, "Select the occupation to remove:")
      .await?
    else {
      return Ok(());
    };
    let report = self.store.remove_occupation(occupation.id).await?;
    self.announce_removal(&format!("The [{}] occupation", occupation.label), &report);
    Ok(())
  }

  async fn remove_employee(&mut self) -> Result<()> {
    let Some(employee) = self
      .pick(ChoiceKind::Employee, "Select the staff member to remove:")
      .await?
    else {
      return Ok(());
    };
    let report = self.store.remove_employee(employee.id).await?;
    self.announce_removal(&format!("[{}]", employee.label), &report);
    Ok(())
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  /// Prompt for one row of `kind`. Prints a notice and returns `None` when
  /// there is nothing to choose from.
  async fn pick(&mut self, kind: ChoiceKind, message: &str) -> Result<Option<Choice>> {
    let choices = self.store.choices(kind).await?;
    if choices.is_empty() {
      self
        .console
        .show(&format!("There are no {} on record.", kind.plural()));
      return Ok(None);
    }

    let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
    let picked = self.console.select(message, &labels)?;
    Ok(picked.and_then(|i| choices.get(i).cloned()))
  }

  /// Prompt for a manager, offering [`NO_MANAGER`] first.
  ///
  /// The outer `Option` is `None` when the prompt was cancelled; the inner
  /// one is `None` when "No Manager" was chosen.
  async fn pick_manager(
    &mut self,
    message: &str,
    exclude: Option<EmployeeId>,
  ) -> Result<Option<Option<Choice>>> {
    let choices: Vec<Choice> = self
      .store
      .choices(ChoiceKind::Employee)
      .await?
      .into_iter()
      .filter(|c| Some(c.id) != exclude)
      .collect();

    let mut labels = vec![NO_MANAGER];
    labels.extend(choices.iter().map(|c| c.label.as_str()));

    Ok(match self.console.select(message, &labels)? {
      None => None,
      Some(0) => Some(None),
      Some(i) => choices.get(i - 1).cloned().map(Some),
    })
  }

  fn present<T: Tabular + Serialize>(&mut self, caption: &str, rows: &[T]) -> Result<()> {
    let body = render::render(self.output, rows)?;
    match self.output {
      OutputFormat::Json => self.console.show(&body),
      OutputFormat::Table if rows.is_empty() => {
        self.console.show(&format!("{caption}\n(nothing to show)"));
      }
      OutputFormat::Table => self.console.show(&format!("{caption}\n\n{body}\n")),
    }
    Ok(())
  }

  fn announce_removal(&mut self, subject: &str, report: &RemovalReport) {
    self.console.show(&format!(
      "{subject} has been removed. {} employee(s) dismissed, {} report(s) unlinked.",
      report.dismissed(),
      report.reports_unlinked
    ));
  }
}

#[cfg(test)]
mod tests {
  use std::collections::VecDeque;

  use anyhow::{anyhow, bail};
  use roster_core::removal::OrphanedReports;
  use roster_store_sqlite::SqliteStore;

  use super::*;

  enum Answer {
    Pick(&'static str),
    Text(&'static str),
    Cancel,
  }
  use Answer::{Cancel, Pick, Text};

  /// Replays canned answers and records everything shown.
  #[derive(Default)]
  struct ScriptedConsole {
    answers: VecDeque<Answer>,
    shown:   Vec<String>,
  }

  impl ScriptedConsole {
    fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
      Self {
        answers: answers.into_iter().collect(),
        shown:   Vec::new(),
      }
    }

    fn saw(&self, needle: &str) -> bool { self.shown.iter().any(|s| s.contains(needle)) }
  }

  impl Console for ScriptedConsole {
    fn select(&mut self, _message: &str, options: &[&str]) -> Result<Option<usize>> {
      match self.answers.pop_front() {
        Some(Pick(label)) => options
          .iter()
          .position(|o| *o == label)
          .map(Some)
          .ok_or_else(|| anyhow!("no option {label:?} in {options:?}")),
        Some(Text(text)) => bail!("expected a selection, script has {text:?}"),
        Some(Cancel) | None => Ok(None),
      }
    }

    fn input(&mut self, message: &str) -> Result<String> {
      match self.answers.pop_front() {
        Some(Text(text)) => Ok(text.to_owned()),
        _ => bail!("expected text for {message:?}"),
      }
    }

    fn show(&mut self, text: &str) { self.shown.push(text.to_owned()); }
  }

  async fn seeded() -> SqliteStore {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut app = App::new(
      store.clone(),
      ScriptedConsole::new([
        Text("Engineering"),
        Text("Engineer"),
        Text("120000"),
        Pick("Engineering"),
        Text("Grace"),
        Text("Hopper"),
        Pick("Engineer"),
        Pick(NO_MANAGER),
        Text("Ada"),
        Text("Lovelace"),
        Pick("Engineer"),
        Pick("Grace Hopper"),
      ]),
      OutputFormat::Table,
    );
    for action in [Action::AddDepartment, Action::AddOccupation, Action::AddEmployee, Action::AddEmployee] {
      assert_eq!(app.dispatch(action).await.unwrap(), Flow::Continue);
    }
    store
  }

  fn app(store: &SqliteStore, answers: impl IntoIterator<Item = Answer>) -> App<SqliteStore, ScriptedConsole> {
    App::new(store.clone(), ScriptedConsole::new(answers), OutputFormat::Table)
  }

  #[tokio::test]
  async fn adds_build_a_reporting_line() {
    let store = seeded().await;
    let employees = store.list_employees().await.unwrap();
    assert_eq!(employees.len(), 2);
    assert_eq!(employees[0].manager, None);
    assert_eq!(employees[1].manager.as_deref(), Some("Grace Hopper"));
    assert_eq!(employees[1].department.as_deref(), Some("Engineering"));
  }

  #[tokio::test]
  async fn run_reports_errors_and_keeps_going() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut app = app(&store, [
      Pick("Add New Department"),
      Text("Engineering"),
      Pick("Add New Department"),
      Text("Engineering"),
      Pick("Exit"),
    ]);
    app.run().await.unwrap();

    let (_, console) = app.into_parts();
    assert!(console.saw("Failed to add department: department [Engineering] already exists"));
    assert!(console.saw("Exiting application."));
    assert_eq!(store.list_departments().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn end_of_input_leaves_the_menu() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut app = app(&store, []);
    app.run().await.unwrap();
    assert!(app.into_parts().1.shown.is_empty());
  }

  #[tokio::test]
  async fn empty_choice_list_aborts_the_handler() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut app = app(&store, []);
    assert_eq!(app.dispatch(Action::RemoveDepartment).await.unwrap(), Flow::Continue);
    assert!(app.into_parts().1.saw("There are no departments on record."));
  }

  #[tokio::test]
  async fn blank_name_is_rejected_before_the_store() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut app = app(&store, [Text("   ")]);
    assert!(app.dispatch(Action::AddDepartment).await.is_err());
    assert!(store.list_departments().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn bad_salary_is_rejected_before_choosing_a_department() {
    let store = seeded().await;
    let mut app = app(&store, [Text("Analyst"), Text("plenty")]);
    assert!(app.dispatch(Action::AddOccupation).await.is_err());
    assert_eq!(store.list_occupations().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn removing_a_department_reports_the_cascade() {
    let store = seeded().await;
    let mut app = app(&store, [Pick("Engineering")]);
    app.dispatch(Action::RemoveDepartment).await.unwrap();

    let console = app.into_parts().1;
    assert!(console.saw("The [Engineering] department has been removed. 2 employee(s) dismissed"));
    assert_eq!(store.list_former_employees().await.unwrap().len(), 2);
    assert!(store.list_employees().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn removing_a_manager_unlinks_reports() {
    let store = seeded().await;
    let mut app = app(&store, [Pick("Grace Hopper")]);
    app.dispatch(Action::RemoveEmployee).await.unwrap();

    assert!(app.into_parts().1.saw("1 employee(s) dismissed, 1 report(s) unlinked"));
    let remaining = store.list_employees().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].manager, None);
  }

  #[tokio::test]
  async fn refused_occupation_removal_is_reported() {
    let store = seeded().await.with_orphaned_reports(OrphanedReports::Refuse);
    let mut app = app(&store, [
      Text("Tester"),
      Text("80000"),
      Pick("Engineering"),
      Pick("Ada Lovelace"),
      Pick("Tester"),
    ]);
    app.dispatch(Action::AddOccupation).await.unwrap();
    app.dispatch(Action::ReassignOccupation).await.unwrap();

    // Ada is now a Tester who still reports to Grace, the only Engineer.
    let mut app = App::new(
      store.clone(),
      ScriptedConsole::new([Pick("Remove Occupation"), Pick("Engineer"), Cancel]),
      OutputFormat::Table,
    );
    app.run().await.unwrap();
    assert!(app.into_parts().1.saw("Failed to remove the selected occupation"));
    assert_eq!(store.list_employees().await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn manager_prompt_offers_no_manager_and_excludes_self() {
    let store = seeded().await;
    let mut app = app(&store, [Pick("Ada Lovelace"), Pick("Ada Lovelace")]);
    let err = app.dispatch(Action::ReassignManager).await.unwrap_err();
    assert!(err.to_string().contains("no option \"Ada Lovelace\""));

    let mut app = self::app(&store, [Pick("Ada Lovelace"), Pick(NO_MANAGER)]);
    app.dispatch(Action::ReassignManager).await.unwrap();
    assert!(app.into_parts().1.saw("[Ada Lovelace] no longer has a manager."));
    assert!(store.list_employees().await.unwrap().iter().all(|e| e.manager.is_none()));
  }

  #[tokio::test]
  async fn empty_listing_says_so() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut app = app(&store, []);
    app.dispatch(Action::ViewDepartments).await.unwrap();
    assert_eq!(app.into_parts().1.shown, ["Catalog of Departments:\n(nothing to show)"]);
  }

  #[tokio::test]
  async fn empty_budget_report_has_a_notice() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut app = app(&store, []);
    app.dispatch(Action::ViewBudgetReport).await.unwrap();
    assert!(app.into_parts().1.saw("No budget data available."));
  }

  #[tokio::test]
  async fn json_output_is_parseable() {
    let store = seeded().await;
    let mut app = App::new(store.clone(), ScriptedConsole::default(), OutputFormat::Json);
    app.dispatch(Action::ViewBudgetReport).await.unwrap();

    let console = app.into_parts().1;
    let value: serde_json::Value = serde_json::from_str(&console.shown[0]).unwrap();
    assert_eq!(value[0]["department"], "Engineering");
    assert_eq!(value[0]["headcount"], 2);
    assert_eq!(value[0]["total_budget"], "240000");
  }
}
