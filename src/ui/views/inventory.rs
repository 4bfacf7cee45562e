use crate::inventory::{Inventory, Product};
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_price, truncate};
use crate::ui::view::{Notice, ShortcutInfo, View, ViewAction};
use crate::ui::views::ProductFormView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

/// Root view: search box and matching products
pub struct InventoryView {
  inventory: Inventory,
  search: SearchInput,
  results: Vec<Product>,
  error: Option<String>,
  list_state: ListState,
}

impl InventoryView {
  pub fn new(inventory: Inventory) -> Self {
    Self {
      inventory,
      search: SearchInput::new(),
      results: Vec::new(),
      error: None,
      list_state: ListState::default(),
    }
  }

  fn query(&self) -> &str {
    self.search.query()
  }

  fn run_search(&mut self) {
    match self.inventory.search(self.search.query()) {
      Ok(results) => {
        self.results = results;
        self.error = None;
      }
      Err(e) => {
        tracing::error!(error = %e, "search failed");
        self.results.clear();
        self.error = Some(e.to_string());
      }
    }
    ensure_valid_selection(&mut self.list_state, self.results.len());
  }

  fn selected(&self) -> Option<&Product> {
    self.list_state.selected().and_then(|i| self.results.get(i))
  }

  fn delete_selected(&mut self) -> ViewAction {
    let Some(code) = self.selected().map(|p| p.code.clone()) else {
      return ViewAction::None;
    };
    let action = match self.inventory.delete(&code) {
      Ok(()) => ViewAction::Notify(Notice::info(format!("Deleted {}", code))),
      Err(e) => ViewAction::Notify(Notice::error(format!("Delete failed: {}", e))),
    };
    self.run_search();
    action
  }

  fn render_search_box(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Search ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let content = if self.query().is_empty() {
      Line::from(Span::styled(
        "Press / to search by code or name, s to scan",
        Style::default().fg(Color::DarkGray),
      ))
    } else {
      Line::from(vec![
        Span::styled("/", Style::default().fg(Color::Yellow)),
        Span::raw(self.query()),
      ])
    };
    frame.render_widget(Paragraph::new(content).block(block), area);
  }

  fn render_results(&mut self, frame: &mut Frame, area: Rect) {
    let title = if self.query().trim().is_empty() {
      " Products ".to_string()
    } else {
      format!(" Products ({}) ", self.results.len())
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if let Some(error) = &self.error {
      let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error))
        .block(block)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });
      frame.render_widget(paragraph, area);
      return;
    }

    if self.query().trim().is_empty() {
      let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
          "Find a product",
          Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
          "Type a name or code to look it up in your inventory.",
          Style::default().fg(Color::DarkGray),
        )),
      ])
      .block(block)
      .alignment(Alignment::Center);
      frame.render_widget(paragraph, area);
      return;
    }

    if self.results.is_empty() {
      let paragraph = Paragraph::new("No products found. Press 'a' to register one.")
        .block(block)
        .style(Style::default().fg(Color::Red));
      frame.render_widget(paragraph, area);
      return;
    }

    ensure_valid_selection(&mut self.list_state, self.results.len());
    let name_width = (area.width as usize).saturating_sub(34).max(10);

    let items: Vec<ListItem> = self
      .results
      .iter()
      .map(|p| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<16}", truncate(&p.code, 16)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::raw(format!(
            "{:<width$}",
            truncate(&p.name, name_width),
            width = name_width
          )),
          Span::raw(" "),
          Span::styled(
            format!("{:>10}", format_price(p.price)),
            Style::default().fg(Color::Green).bold(),
          ),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for InventoryView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Let search component try to handle first
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(_)) => {
        self.run_search();
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    // Normal mode key handling
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('r') => self.run_search(),
      KeyCode::Char('a') => {
        // Searching for an unknown code is the usual way to start registering it
        let form = if self.results.is_empty() {
          ProductFormView::new(self.inventory.clone()).with_code(self.query().trim())
        } else {
          ProductFormView::new(self.inventory.clone())
        };
        return ViewAction::Push(Box::new(form));
      }
      KeyCode::Enter | KeyCode::Char('e') => {
        if let Some(product) = self.selected() {
          return ViewAction::Push(Box::new(ProductFormView::editing(
            self.inventory.clone(),
            product,
          )));
        }
      }
      KeyCode::Char('d') | KeyCode::Delete => return self.delete_selected(),
      KeyCode::Char('s') => return ViewAction::Scan,
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(3), // Search box
        Constraint::Min(1),    // Results
      ])
      .split(area);

    self.render_search_box(frame, chunks[0]);
    self.render_results(frame, chunks[1]);
    // Let search component render its overlay
    self.search.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    if self.query().trim().is_empty() {
      "Inventory".to_string()
    } else {
      format!("Inventory [{}]", self.query().trim())
    }
  }

  fn is_capturing_input(&self) -> bool {
    self.search.is_active()
  }

  fn refresh(&mut self) {
    self.run_search();
  }

  fn search_for(&mut self, query: &str) {
    self.search.set_query(query);
    self.run_search();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("s", "scan").with_priority(30),
      ShortcutInfo::new("a", "add").with_priority(40),
      ShortcutInfo::new("e", "edit").with_priority(50),
      ShortcutInfo::new("d", "delete").with_priority(60),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::inventory::ProductForm;
  use crate::store::MemoryStore;
  use crossterm::event::KeyModifiers;
  use ratatui::backend::TestBackend;
  use ratatui::Terminal;
  use std::sync::Arc;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn seeded() -> Inventory {
    let inventory = Inventory::new(Arc::new(MemoryStore::new()));
    inventory
      .register(&ProductForm::new("X1", "Gadget", "5"))
      .unwrap();
    inventory
      .register(&ProductForm::new("T-9", "Tornillo", "0.35"))
      .unwrap();
    inventory
  }

  fn type_query(view: &mut InventoryView, text: &str) {
    view.handle_key(key(KeyCode::Char('/')));
    for c in text.chars() {
      view.handle_key(key(KeyCode::Char(c)));
    }
    view.handle_key(key(KeyCode::Enter));
  }

  fn screen(view: &mut InventoryView) -> String {
    let mut terminal = Terminal::new(TestBackend::new(70, 12)).unwrap();
    terminal.draw(|frame| view.render(frame, frame.area())).unwrap();
    terminal
      .backend()
      .buffer()
      .content()
      .iter()
      .map(|cell| cell.symbol())
      .collect()
  }

  #[test]
  fn test_live_search() {
    let mut view = InventoryView::new(seeded());
    type_query(&mut view, "x1");
    assert_eq!(view.results.len(), 1);
    assert_eq!(view.results[0].code, "X1");
    assert!(!view.is_capturing_input());
  }

  #[test]
  fn test_blank_query_shows_nothing() {
    let mut view = InventoryView::new(seeded());
    type_query(&mut view, "   ");
    assert!(view.results.is_empty());
    assert!(screen(&mut view).contains("Find a product"));
  }

  #[test]
  fn test_no_matches_message() {
    let mut view = InventoryView::new(seeded());
    type_query(&mut view, "zzz");
    assert!(screen(&mut view).contains("No products found"));
  }

  #[test]
  fn test_render_lists_price() {
    let mut view = InventoryView::new(seeded());
    view.search_for("torn");
    let text = screen(&mut view);
    assert!(text.contains("T-9"));
    assert!(text.contains("0.35"));
  }

  #[test]
  fn test_delete_selected_refreshes() {
    let inventory = seeded();
    let mut view = InventoryView::new(inventory.clone());
    view.search_for("X1");
    assert!(matches!(
      view.handle_key(key(KeyCode::Char('d'))),
      ViewAction::Notify(_)
    ));
    assert!(view.results.is_empty());
    assert!(inventory.get("X1").unwrap().is_none());
  }

  #[test]
  fn test_keys_map_to_actions() {
    let mut view = InventoryView::new(seeded());
    assert!(matches!(
      view.handle_key(key(KeyCode::Char('s'))),
      ViewAction::Scan
    ));
    assert!(matches!(
      view.handle_key(key(KeyCode::Char('a'))),
      ViewAction::Push(_)
    ));
    assert!(matches!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::Pop));
  }

  #[test]
  fn test_refresh_picks_up_store_changes() {
    let inventory = seeded();
    let mut view = InventoryView::new(inventory.clone());
    view.search_for("nuevo");
    assert!(view.results.is_empty());
    inventory
      .register(&ProductForm::new("N1", "Nuevo", "1"))
      .unwrap();
    view.refresh();
    assert_eq!(view.results.len(), 1);
  }
}
