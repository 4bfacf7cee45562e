use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Events emitted by the confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmEvent<T> {
  /// User accepted; carries the pending action
  Confirmed(T),
  /// User declined
  Cancelled,
}

/// Yes/no dialog guarding a destructive action of type `T`
#[derive(Debug, Clone)]
pub struct ConfirmDialog<T> {
  pending: Option<T>,
  message: String,
}

impl<T> Default for ConfirmDialog<T> {
  fn default() -> Self {
    Self {
      pending: None,
      message: String::new(),
    }
  }
}

impl<T> ConfirmDialog<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.pending.is_some()
  }

  /// Ask the user to confirm `action`
  pub fn ask(&mut self, message: impl Into<String>, action: T) {
    self.message = message.into();
    self.pending = Some(action);
  }

  /// Handle a key event. While open, every key is consumed.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent<T>> {
    if self.pending.is_none() {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('s') | KeyCode::Char('S') => {
        match self.pending.take() {
          Some(action) => KeyResult::Event(ConfirmEvent::Confirmed(action)),
          None => KeyResult::Handled,
        }
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
        self.pending = None;
        KeyResult::Event(ConfirmEvent::Cancelled)
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the dialog centered in `area` if open
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if self.pending.is_none() {
      return;
    }

    let width = (area.width * 60 / 100).clamp(30u16.min(area.width), 70u16.min(area.width));
    let height = 6u16.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .title(" Confirm ");

    let text = vec![
      Line::from(self.message.as_str()),
      Line::from(""),
      Line::from(vec![
        Span::styled("<y>", Style::default().fg(Color::Cyan)),
        Span::styled(" yes   ", Style::default().fg(Color::DarkGray)),
        Span::styled("<n>", Style::default().fg(Color::Cyan)),
        Span::styled(" no", Style::default().fg(Color::DarkGray)),
      ]),
    ];

    let paragraph = Paragraph::new(text)
      .block(block)
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, overlay_area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_inactive_passes_through() {
    let mut dialog: ConfirmDialog<u8> = ConfirmDialog::new();
    assert_eq!(dialog.handle_key(key(KeyCode::Char('y'))), KeyResult::NotHandled);
  }

  #[test]
  fn test_confirm_returns_action_once() {
    let mut dialog = ConfirmDialog::new();
    dialog.ask("Delete everything?", 7u8);
    assert!(dialog.is_active());
    assert_eq!(dialog.handle_key(key(KeyCode::Char('x'))), KeyResult::Handled);
    assert_eq!(
      dialog.handle_key(key(KeyCode::Char('y'))),
      KeyResult::Event(ConfirmEvent::Confirmed(7))
    );
    assert!(!dialog.is_active());
  }

  #[test]
  fn test_cancel() {
    let mut dialog = ConfirmDialog::new();
    dialog.ask("Delete everything?", ());
    assert_eq!(
      dialog.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(ConfirmEvent::Cancelled)
    );
    assert!(!dialog.is_active());
  }
}
