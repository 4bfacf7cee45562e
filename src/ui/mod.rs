pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use renderfns::{draw_footer, draw_header, draw_input_overlay};

/// Keep a list selection inside `0..len`, selecting the first row when
/// nothing is selected yet.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
    None => state.select(Some(0)),
  }
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let shortcuts = app.current_view().map(|v| v.shortcuts()).unwrap_or_default();
  draw_header(frame, chunks[0], app.title(), app.total(), &shortcuts);

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  draw_footer(frame, chunks[2], &app.breadcrumb(), app.notice());

  // Overlays on top of the content area
  if let Some(prompt) = app.scan_prompt() {
    draw_input_overlay(frame, chunks[1], " Scan or type a code ", "▌ ", prompt, &[], 0);
  }
  app.command().render_overlay(frame, chunks[1]);
  app.confirm().render_overlay(frame, chunks[1]);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_selection_starts_at_first_row() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));
  }

  #[test]
  fn test_selection_clamped_when_list_shrinks() {
    let mut state = ListState::default();
    state.select(Some(5));
    ensure_valid_selection(&mut state, 2);
    assert_eq!(state.selected(), Some(1));
  }

  #[test]
  fn test_selection_cleared_for_empty_list() {
    let mut state = ListState::default();
    state.select(Some(0));
    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}
