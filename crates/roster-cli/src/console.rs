//! User interaction: selection lists, free-text prompts and output.
//!
//! [`TerminalConsole`] draws an inline, filterable list when attached to a
//! terminal and falls back to numbered line prompts otherwise.

use std::io::{self, BufRead as _, IsTerminal as _, Write};

use anyhow::{Context as _, Result, bail};
use crossterm::{
  event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
  terminal::{disable_raw_mode, enable_raw_mode},
};
use fuzzy_matcher::{FuzzyMatcher as _, skim::SkimMatcherV2};
use ratatui::{
  Frame, Terminal, TerminalOptions, Viewport,
  backend::CrosstermBackend,
  layout::{Constraint, Layout},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{List, ListItem, ListState},
};

/// Rows of a selection list shown at once.
const PAGE: usize = 10;

pub trait Console {
  /// Ask the user to pick one of `options`.
  ///
  /// Returns the index of the chosen option, or `None` when the prompt was
  /// cancelled or input ended.
  fn select(&mut self, message: &str, options: &[&str]) -> Result<Option<usize>>;

  /// Ask for a line of free text. The trailing newline is removed.
  fn input(&mut self, message: &str) -> Result<String>;

  fn show(&mut self, text: &str);
}

/// Resolve a line-mode answer: a 1-based option number or an exact label.
pub fn parse_selection(answer: &str, options: &[&str]) -> Option<usize> {
  let answer = answer.trim();
  if let Ok(n) = answer.parse::<usize>() {
    return (1..=options.len()).contains(&n).then(|| n - 1);
  }
  options.iter().position(|o| *o == answer)
}

// ─── Terminal ────────────────────────────────────────────────────────────────

pub struct TerminalConsole {
  interactive: bool,
}

impl TerminalConsole {
  pub fn new() -> Self {
    Self {
      interactive: io::stdin().is_terminal() && io::stdout().is_terminal(),
    }
  }
}

impl Console for TerminalConsole {
  fn select(&mut self, message: &str, options: &[&str]) -> Result<Option<usize>> {
    if self.interactive {
      tokio::task::block_in_place(|| select_list(message, options))
    } else {
      tokio::task::block_in_place(|| select_lines(message, options))
    }
  }

  fn input(&mut self, message: &str) -> Result<String> {
    tokio::task::block_in_place(|| -> Result<String> {
      let mut out = io::stdout();
      write!(out, "? {message} ")?;
      out.flush()?;

      let mut line = String::new();
      if io::stdin().lock().read_line(&mut line).context("reading input")? == 0 {
        bail!("input closed");
      }
      Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    })
  }

  fn show(&mut self, text: &str) { println!("{text}"); }
}

/// Numbered prompt for non-terminal input. Re-prompts until the answer
/// matches an option.
fn select_lines(message: &str, options: &[&str]) -> Result<Option<usize>> {
  let stdin = io::stdin();
  let mut out = io::stdout();
  loop {
    writeln!(out, "? {message}")?;
    for (i, option) in options.iter().enumerate() {
      writeln!(out, "  {}) {option}", i + 1)?;
    }
    write!(out, "> ")?;
    out.flush()?;

    let mut line = String::new();
    if stdin.lock().read_line(&mut line).context("reading selection")? == 0 {
      return Ok(None);
    }
    match parse_selection(&line, options) {
      Some(index) => return Ok(Some(index)),
      None => {
        tracing::warn!(input = line.trim(), "unrecognised selection");
        writeln!(out, "Selection not recognized. Please try again.")?;
      }
    }
  }
}

/// Leaves raw mode when dropped, including on early return.
struct RawMode;

impl RawMode {
  fn enable() -> io::Result<Self> {
    enable_raw_mode()?;
    Ok(Self)
  }
}

impl Drop for RawMode {
  fn drop(&mut self) { disable_raw_mode().ok(); }
}

/// Indices of `options` matching `filter`, in their original order.
fn matching(matcher: &SkimMatcherV2, options: &[&str], filter: &str) -> Vec<usize> {
  if filter.is_empty() {
    return (0..options.len()).collect();
  }
  (0..options.len())
    .filter(|&i| matcher.fuzzy_match(options[i], filter).is_some())
    .collect()
}

/// Inline list. Arrows or Ctrl-j/Ctrl-k move, typing filters, Enter picks
/// and Esc cancels.
fn select_list(message: &str, options: &[&str]) -> Result<Option<usize>> {
  let matcher = SkimMatcherV2::default();
  let mut filter = String::new();
  let mut state = ListState::default().with_selected(Some(0));

  let raw = RawMode::enable().context("enabling raw mode")?;
  let height = (options.len().min(PAGE) as u16 + 1).max(2);
  let mut terminal = Terminal::with_options(
    CrosstermBackend::new(io::stdout()),
    TerminalOptions {
      viewport: Viewport::Inline(height),
    },
  )
  .context("creating inline viewport")?;

  let picked = loop {
    let visible = matching(&matcher, options, &filter);
    let selected = state.selected().unwrap_or(0).min(visible.len().saturating_sub(1));
    state.select((!visible.is_empty()).then_some(selected));

    terminal
      .draw(|frame| draw(frame, message, &filter, options, &visible, &mut state))
      .context("drawing selection list")?;

    let Event::Key(key) = event::read().context("reading terminal event")? else {
      continue;
    };
    if key.kind != KeyEventKind::Press {
      continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Char('c') if ctrl => break None,
      KeyCode::Esc => break None,
      KeyCode::Enter => {
        if let Some(&index) = state.selected().and_then(|i| visible.get(i)) {
          break Some(index);
        }
      }
      KeyCode::Char('k') if ctrl => state.select_previous(),
      KeyCode::Char('j') if ctrl => state.select_next(),
      KeyCode::Up => state.select_previous(),
      KeyCode::Down => state.select_next(),
      KeyCode::Backspace => {
        filter.pop();
        state.select(Some(0));
      }
      KeyCode::Char(c) => {
        filter.push(c);
        state.select(Some(0));
      }
      _ => {}
    }
  };

  terminal.clear().context("clearing selection list")?;
  drop(terminal);
  drop(raw);

  let answer = picked.map_or("(cancelled)", |i| options[i]);
  println!("? {message} {answer}");
  Ok(picked)
}

/// Prompt line on top, the filtered options below it.
fn draw(
  frame: &mut Frame,
  message: &str,
  filter: &str,
  options: &[&str],
  visible: &[usize],
  state: &mut ListState,
) {
  let [prompt, body] =
    Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(frame.area());

  frame.render_widget(
    Line::from(vec![
      Span::styled("? ", Style::default().fg(Color::Green)),
      Span::raw(format!("{message} ")),
      Span::styled(filter.to_owned(), Style::default().fg(Color::Cyan)),
    ]),
    prompt,
  );

  if visible.is_empty() {
    frame.render_widget(
      Line::styled("  (no matches)", Style::default().fg(Color::DarkGray)),
      body,
    );
    return;
  }

  let items: Vec<ListItem> = visible.iter().map(|&i| ListItem::new(options[i])).collect();
  let list = List::new(items)
    .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .highlight_symbol("❯ ");
  frame.render_stateful_widget(list, body, state);
}
