use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::inventory::{Inventory, InventoryError};
use crate::scanner::{normalize_code, Scanner, ScannerEvent};
use crate::ui;
use crate::ui::components::{
  CommandEvent, CommandInput, ConfirmDialog, ConfirmEvent, InputResult, KeyResult, TextInput,
};
use crate::ui::view::{Notice, View, ViewAction};
use crate::ui::views::{InventoryView, ProductFormView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Destructive work waiting on a yes/no answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
  Import(PathBuf),
  Clear,
}

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Command input (after pressing :)
  command: CommandInput,

  /// Confirmation for import and clear
  confirm: ConfirmDialog<PendingAction>,

  /// Open while a scan is in progress; also accepts typed codes
  scan_prompt: Option<TextInput>,

  scanner: Scanner,

  /// Latest status message
  notice: Option<Notice>,

  /// Number of stored products, shown in the header
  total: Option<usize>,

  inventory: Inventory,

  /// Application configuration
  config: Config,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, inventory: Inventory) -> Self {
    let (tx, _rx) = mpsc::unbounded_channel();
    let scanner = Scanner::new(config.scanner.command.clone());

    let mut app = Self {
      view_stack: vec![Box::new(InventoryView::new(inventory.clone()))],
      command: CommandInput::new(),
      confirm: ConfirmDialog::new(),
      scan_prompt: None,
      scanner,
      notice: None,
      total: None,
      inventory,
      config,
      event_tx: tx,
      should_quit: false,
    };
    app.refresh_total();
    app
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    let result = self.main_loop(&mut terminal, &mut events).await;
    self.scanner.stop();

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn main_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      if let Some(event) = events.next().await {
        self.handle_event(event)?;
      }
    }
    Ok(())
  }

  // Accessors for rendering

  pub fn title(&self) -> &str {
    self.config.title()
  }

  pub fn total(&self) -> Option<usize> {
    self.total
  }

  pub fn notice(&self) -> Option<&Notice> {
    self.notice.as_ref()
  }

  pub fn command(&self) -> &CommandInput {
    &self.command
  }

  pub fn confirm(&self) -> &ConfirmDialog<PendingAction> {
    &self.confirm
  }

  pub fn scan_prompt(&self) -> Option<&TextInput> {
    self.scan_prompt.as_ref()
  }

  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut (dyn View + 'static)> {
    match self.view_stack.last_mut() {
      Some(view) => Some(view.as_mut()),
      None => None,
    }
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }

  pub fn handle_event(&mut self, event: Event) -> Result<()> {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {} // UI refresh happens automatically
      Event::FileLoaded { path, result } => match result {
        Ok(text) => self.apply_import(&path, &text),
        Err(msg) => {
          warn!(path = %path.display(), error = %msg, "failed to read import file");
          self.notice = Some(Notice::error(format!(
            "Could not read {}: {}",
            path.display(),
            msg
          )));
        }
      },
      Event::Scanner(scanner_event) => self.handle_scanner_event(scanner_event),
    }
    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // An open dialog takes every key
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(action)) => {
        self.run_pending(action);
        return;
      }
      KeyResult::Event(ConfirmEvent::Cancelled) => {
        self.notice = Some(Notice::info("Cancelled"));
        return;
      }
      KeyResult::Handled => return,
      KeyResult::NotHandled => {}
    }

    if self.scan_prompt.is_some() {
      self.handle_scan_prompt_key(key);
      return;
    }

    let capturing = self
      .current_view()
      .map(|v| v.is_capturing_input())
      .unwrap_or(false);
    if self.command.is_active() || !capturing {
      match self.command.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted { name, args }) => {
          self.execute_command(&name, &args);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = match self.current_view_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    self.handle_view_action(action);
  }

  fn handle_view_action(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Done(notice) => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        }
        self.notice = Some(notice);
        self.after_data_change();
      }
      ViewAction::Notify(notice) => {
        self.notice = Some(notice);
        self.refresh_total();
      }
      ViewAction::Scan => self.start_scan(),
      ViewAction::Quit => self.should_quit = true,
    }
  }

  fn execute_command(&mut self, name: &str, args: &str) {
    debug!(command = name, args, "executing command");
    match name {
      "search" => {
        self.view_stack.truncate(1);
        if !args.is_empty() {
          if let Some(root) = self.view_stack.first_mut() {
            root.search_for(args);
          }
        }
      }
      "add" => {
        let form = ProductFormView::new(self.inventory.clone()).with_code(args);
        self.view_stack.push(Box::new(form));
      }
      "scan" => self.start_scan(),
      "import" => {
        if args.is_empty() {
          self.notice = Some(Notice::error("Usage: import <file>"));
        } else {
          let path = PathBuf::from(args);
          self.confirm.ask(
            format!(
              "Replace the whole inventory with {}? Current products are deleted.",
              path.display()
            ),
            PendingAction::Import(path),
          );
        }
      }
      "export" => {
        let path = if args.is_empty() {
          self.config.export_path()
        } else {
          PathBuf::from(args)
        };
        self.export_to(&path);
      }
      "clear" => {
        self.confirm.ask(
          "Delete every product? This cannot be undone.",
          PendingAction::Clear,
        );
      }
      "quit" => {
        self.should_quit = true;
      }
      "" => {}
      other => {
        self.notice = Some(Notice::error(format!("Unknown command: {}", other)));
      }
    }
  }

  fn run_pending(&mut self, action: PendingAction) {
    match action {
      PendingAction::Import(path) => {
        self.notice = Some(Notice::info(format!("Reading {}...", path.display())));
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
          let result = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string());
          let _ = tx.send(Event::FileLoaded { path, result });
        });
      }
      PendingAction::Clear => {
        self.notice = Some(match self.inventory.clear_all() {
          Ok(removed) => Notice::info(format!("Removed {} products", removed)),
          Err(e) => {
            error!(error = %e, "clear failed");
            Notice::error(format!("Clear failed: {}", e))
          }
        });
        self.after_data_change();
      }
    }
  }

  fn apply_import(&mut self, path: &Path, text: &str) {
    self.notice = Some(match self.inventory.import_replacing_all(text) {
      Ok(summary) => {
        for rejected in &summary.rejected {
          warn!(
            path = %path.display(),
            line = rejected.line,
            reason = %rejected.reason,
            "skipped row"
          );
        }
        Notice::info(format!(
          "Import: {} OK, {} errors",
          summary.imported, summary.errors
        ))
      }
      Err(e) => {
        error!(path = %path.display(), error = %e, "import failed");
        Notice::error(format!("Import failed: {}", e))
      }
    });
    self.after_data_change();
  }

  fn export_to(&mut self, path: &Path) {
    let written = self
      .inventory
      .export_all()
      .and_then(|text| Ok(std::fs::write(path, text)?));

    self.notice = Some(match written {
      Ok(()) => {
        info!(path = %path.display(), "export written");
        Notice::info(format!("Exported to {}", path.display()))
      }
      Err(InventoryError::EmptyInventory) => Notice::error("Nothing to export: inventory is empty"),
      Err(e) => {
        error!(path = %path.display(), error = %e, "export failed");
        Notice::error(format!("Export failed: {}", e))
      }
    });
  }

  fn start_scan(&mut self) {
    self.view_stack.truncate(1);
    self.scan_prompt = Some(TextInput::new());

    if !self.scanner.is_external() {
      self.notice = Some(Notice::info("Scan a barcode or type the code, Enter to search"));
      return;
    }
    match self.scanner.start(self.event_tx.clone()) {
      Ok(()) => {
        self.notice = Some(Notice::info("Scanning... Esc to cancel"));
      }
      Err(e) => {
        warn!(error = %e, "scanner unavailable");
        self.notice = Some(Notice::error(format!("{}; type the code instead", e)));
      }
    }
  }

  fn handle_scan_prompt_key(&mut self, key: KeyEvent) {
    let Some(prompt) = self.scan_prompt.as_mut() else {
      return;
    };
    match prompt.handle_key(key) {
      InputResult::Submitted(value) => {
        let code = normalize_code(&value);
        if !code.is_empty() {
          self.finish_scan();
          self.show_code(&code);
        }
      }
      InputResult::Cancelled => {
        self.finish_scan();
        self.notice = Some(Notice::info("Scan cancelled"));
      }
      InputResult::Consumed | InputResult::NotHandled => {}
    }
  }

  fn handle_scanner_event(&mut self, event: ScannerEvent) {
    if !self.scanner.is_current(&event) {
      debug!(?event, "ignoring event from a finished scan");
      return;
    }
    self.finish_scan();
    match event {
      ScannerEvent::Detected { code, .. } => self.show_code(&code),
      ScannerEvent::Failed { message, .. } => {
        self.notice = Some(Notice::error(format!("Scan failed: {}", message)));
      }
    }
  }

  fn finish_scan(&mut self) {
    self.scanner.stop();
    self.scan_prompt = None;
  }

  /// Search the root view for a scanned code
  fn show_code(&mut self, code: &str) {
    info!(code, "code scanned");
    self.view_stack.truncate(1);
    if let Some(root) = self.view_stack.first_mut() {
      root.search_for(code);
    }
    self.notice = Some(Notice::info(format!("Scanned {}", code)));
  }

  /// Reload every view and the header total after the store changed
  fn after_data_change(&mut self) {
    for view in &mut self.view_stack {
      view.refresh();
    }
    self.refresh_total();
  }

  fn refresh_total(&mut self) {
    self.total = match self.inventory.count() {
      Ok(n) => Some(n),
      Err(e) => {
        warn!(error = %e, "failed to count products");
        None
      }
    };
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::inventory::ProductForm;
  use crate::store::MemoryStore;
  use std::sync::Arc;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
  }

  fn run_command(app: &mut App, line: &str) {
    app.handle_key(key(KeyCode::Char(':')));
    type_text(app, line);
    app.handle_key(key(KeyCode::Enter));
  }

  fn app_with(products: &[(&str, &str, &str)]) -> (App, Inventory) {
    let inventory = Inventory::new(Arc::new(MemoryStore::new()));
    for (code, name, price) in products {
      inventory
        .register(&ProductForm::new(*code, *name, *price))
        .unwrap();
    }
    (App::new(Config::default(), inventory.clone()), inventory)
  }

  fn notice_text(app: &App) -> String {
    app.notice().map(|n| n.text.clone()).unwrap_or_default()
  }

  #[test]
  fn test_total_counts_products() {
    let (app, _) = app_with(&[("A", "Uno", "1"), ("B", "Dos", "2")]);
    assert_eq!(app.total(), Some(2));
    assert_eq!(app.breadcrumb(), vec!["Inventory".to_string()]);
  }

  #[test]
  fn test_clear_requires_confirmation() {
    let (mut app, inventory) = app_with(&[("A", "Uno", "1")]);
    run_command(&mut app, "clear");
    assert!(app.confirm().is_active());
    app.handle_key(key(KeyCode::Char('n')));
    assert_eq!(inventory.count().unwrap(), 1);

    run_command(&mut app, "clear");
    app.handle_key(key(KeyCode::Char('y')));
    assert_eq!(inventory.count().unwrap(), 0);
    assert_eq!(app.total(), Some(0));
    assert_eq!(notice_text(&app), "Removed 1 products");
  }

  #[test]
  fn test_file_loaded_replaces_inventory() {
    let (mut app, inventory) = app_with(&[("OLD", "Viejo", "1")]);
    app
      .handle_event(Event::FileLoaded {
        path: PathBuf::from("stock.csv"),
        result: Ok("codigo,nombre,precio\nA1,Tornillo,0.5\n,Sin codigo,3\n".to_string()),
      })
      .unwrap();
    assert_eq!(notice_text(&app), "Import: 1 OK, 1 errors");
    assert!(inventory.get("OLD").unwrap().is_none());
    assert_eq!(app.total(), Some(1));
  }

  #[test]
  fn test_bad_header_keeps_inventory() {
    let (mut app, inventory) = app_with(&[("OLD", "Viejo", "1")]);
    app
      .handle_event(Event::FileLoaded {
        path: PathBuf::from("stock.csv"),
        result: Ok("a,b,c\n1,2,3\n".to_string()),
      })
      .unwrap();
    assert!(notice_text(&app).starts_with("Import failed"));
    assert_eq!(inventory.count().unwrap(), 1);
  }

  #[test]
  fn test_export_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let (mut app, _) = app_with(&[("A", "Uno", "1.5")]);
    run_command(&mut app, &format!("export {}", path.display()));

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("codigo,nombre,precio\n"));
    assert!(written.contains("\"A\",\"Uno\",1.5"));
  }

  #[test]
  fn test_export_empty_inventory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let (mut app, _) = app_with(&[]);
    run_command(&mut app, &format!("export {}", path.display()));
    assert!(!path.exists());
    assert_eq!(notice_text(&app), "Nothing to export: inventory is empty");
  }

  #[tokio::test]
  async fn test_typed_scan_searches_root() {
    let (mut app, _) = app_with(&[("7501", "Leche", "20")]);
    run_command(&mut app, "add");
    assert_eq!(app.breadcrumb().len(), 2);

    app.handle_view_action(ViewAction::Scan);
    assert_eq!(app.breadcrumb().len(), 1);
    assert!(app.scan_prompt().is_some());
    type_text(&mut app, "7501");
    app.handle_key(key(KeyCode::Enter));

    assert!(app.scan_prompt().is_none());
    assert_eq!(app.breadcrumb(), vec!["Inventory [7501]".to_string()]);
  }

  #[test]
  fn test_stale_scanner_event_ignored() {
    let (mut app, _) = app_with(&[]);
    app
      .handle_event(Event::Scanner(ScannerEvent::Detected {
        session: 42,
        code: "X".to_string(),
      }))
      .unwrap();
    assert!(app.notice().is_none());
    assert_eq!(app.breadcrumb(), vec!["Inventory".to_string()]);
  }

  #[test]
  fn test_unknown_command() {
    let (mut app, _) = app_with(&[]);
    run_command(&mut app, "frobnicate");
    assert_eq!(notice_text(&app), "Unknown command: frobnicate");
  }

  #[test]
  fn test_quit_from_root() {
    let (mut app, _) = app_with(&[]);
    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
  }
}
