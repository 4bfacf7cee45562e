use crate::commands::Command;
use crate::ui::components::TextInput;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

/// Draw a one-line input box at the top-left of `area`, with optional
/// command suggestions underneath
pub fn draw_input_overlay(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  prefix: &str,
  input: &TextInput,
  suggestions: &[&Command],
  selected_suggestion: usize,
) {
  // Calculate overlay dimensions
  let width = (area.width * 60 / 100).clamp(30u16.min(area.width), 60u16.min(area.width));
  let suggestion_count = suggestions.len().min(8);
  let height = if suggestions.is_empty() {
    3 // Just input line with borders
  } else {
    3 + suggestion_count as u16 // Input + suggestions
  };
  let height = height.min(area.height);

  // Position at top-left of content area with small margin
  let x = area.x + 1u16.min(area.width);
  let y = area.y + 1u16.min(area.height);

  let overlay_area = Rect::new(x, y, width.min(area.width.saturating_sub(1)), height);

  // Clear the area behind the overlay
  frame.render_widget(Clear, overlay_area);

  // Draw the border/block
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow))
    .title(title);

  let inner = block.inner(overlay_area);
  frame.render_widget(block, overlay_area);

  if inner.height == 0 {
    return;
  }

  // Split inner area: input line + suggestions
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Input line
      Constraint::Min(0),    // Suggestions
    ])
    .split(inner);

  // Draw input line with a block cursor at the edit position
  let value = input.value();
  let split = value
    .char_indices()
    .nth(input.cursor_position())
    .map(|(i, _)| i)
    .unwrap_or(value.len());
  let (before, after) = value.split_at(split);
  let mut after_chars = after.chars();
  let under_cursor = after_chars
    .next()
    .map(|c| c.to_string())
    .unwrap_or_else(|| " ".to_string());

  let input_line = Line::from(vec![
    Span::styled(prefix, Style::default().fg(Color::Yellow)),
    Span::raw(before),
    Span::styled(under_cursor, Style::default().bg(Color::Yellow).fg(Color::Black)),
    Span::raw(after_chars.as_str()),
  ]);
  frame.render_widget(Paragraph::new(input_line), chunks[0]);

  // Draw suggestions if any
  if !suggestions.is_empty() && chunks[1].height > 0 {
    let items: Vec<ListItem> = suggestions
      .iter()
      .take(8)
      .map(|cmd| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<12}", cmd.name),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(selected_suggestion));

    frame.render_stateful_widget(list, chunks[1], &mut state);
  }
}
