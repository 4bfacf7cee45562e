use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Severity of a status line message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
  Info,
  Error,
}

/// A message for the status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub level: NoticeLevel,
  pub text: String,
}

impl Notice {
  pub fn info(text: impl Into<String>) -> Self {
    Self {
      level: NoticeLevel::Info,
      text: text.into(),
    }
  }

  pub fn error(text: impl Into<String>) -> Self {
    Self {
      level: NoticeLevel::Error,
      text: text.into(),
    }
  }
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
  /// Pop current view and report the outcome
  Done(Notice),
  /// Show a message without changing views
  Notify(Notice),
  /// Start reading a barcode
  Scan,
  /// Leave the application
  Quit,
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, forms, etc.) and return
/// actions for the App to execute. This creates a clean delegation chain:
/// App → View → Components
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Whether the view is capturing text, so global keys like `:` must pass through
  fn is_capturing_input(&self) -> bool {
    false
  }

  /// Reload anything read from the store
  fn refresh(&mut self) {}

  /// Replace the current search query, e.g. with a scanned code
  fn search_for(&mut self, _query: &str) {}

  /// Get keyboard shortcuts to display in the header
  /// Override this to provide view-specific shortcuts
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
