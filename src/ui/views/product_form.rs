use crate::inventory::{Inventory, Product, ProductForm};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::renderfns::format_price;
use crate::ui::view::{Notice, ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

const FIELDS: [&str; 3] = ["Code", "Name", "Price"];

/// Form for registering a product, or overwriting one with the same code
pub struct ProductFormView {
  inventory: Inventory,
  inputs: [TextInput; 3],
  focus: usize,
  editing: bool,
  error: Option<String>,
}

impl ProductFormView {
  pub fn new(inventory: Inventory) -> Self {
    Self {
      inventory,
      inputs: [TextInput::new(), TextInput::new(), TextInput::new()],
      focus: 0,
      editing: false,
      error: None,
    }
  }

  /// Pre-fill the code field, moving focus to the name when it is set
  pub fn with_code(mut self, code: &str) -> Self {
    self.inputs[0] = TextInput::with_value(code);
    if !code.is_empty() {
      self.focus = 1;
    }
    self
  }

  /// Form pre-filled with an existing product
  pub fn editing(inventory: Inventory, product: &Product) -> Self {
    Self {
      inventory,
      inputs: [
        TextInput::with_value(&product.code),
        TextInput::with_value(&product.name),
        TextInput::with_value(&product.price.to_string()),
      ],
      focus: 1,
      editing: true,
      error: None,
    }
  }

  fn form(&self) -> ProductForm {
    ProductForm::new(
      self.inputs[0].value(),
      self.inputs[1].value(),
      self.inputs[2].value(),
    )
  }

  fn submit(&mut self) -> ViewAction {
    match self.inventory.register(&self.form()) {
      Ok(product) => ViewAction::Done(Notice::info(format!(
        "Saved {} ({})",
        product.code,
        format_price(product.price)
      ))),
      Err(e) => {
        self.error = Some(e.to_string());
        ViewAction::None
      }
    }
  }

  fn focus_next(&mut self) {
    self.focus = (self.focus + 1) % FIELDS.len();
  }

  fn focus_prev(&mut self) {
    self.focus = (self.focus + FIELDS.len() - 1) % FIELDS.len();
  }
}

impl View for ProductFormView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.focus_next();
        return ViewAction::None;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus_prev();
        return ViewAction::None;
      }
      _ => {}
    }

    match self.inputs[self.focus].handle_key(key) {
      InputResult::Submitted(_) => {
        if self.focus + 1 < FIELDS.len() {
          self.focus_next();
          ViewAction::None
        } else {
          self.submit()
        }
      }
      InputResult::Cancelled => ViewAction::Pop,
      InputResult::Consumed => {
        self.error = None;
        ViewAction::None
      }
      InputResult::NotHandled => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = if self.editing {
      " Edit product "
    } else {
      " New product "
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from("")];
    for (i, (label, input)) in FIELDS.iter().zip(&self.inputs).enumerate() {
      let focused = i == self.focus;
      let label_style = if focused {
        Style::default().fg(Color::Yellow).bold()
      } else {
        Style::default().fg(Color::DarkGray)
      };
      let mut spans = vec![Span::styled(format!(" {:<7}", label), label_style)];
      if focused {
        let value = input.value();
        let split = value
          .char_indices()
          .nth(input.cursor_position())
          .map(|(i, _)| i)
          .unwrap_or(value.len());
        let (before, after) = value.split_at(split);
        let mut rest = after.chars();
        let under_cursor = rest
          .next()
          .map(|c| c.to_string())
          .unwrap_or_else(|| " ".to_string());
        spans.push(Span::raw(before.to_string()));
        spans.push(Span::styled(
          under_cursor,
          Style::default().bg(Color::Yellow).fg(Color::Black),
        ));
        spans.push(Span::raw(rest.as_str().to_string()));
      } else {
        spans.push(Span::raw(input.value().to_string()));
      }
      lines.push(Line::from(spans));
      lines.push(Line::from(""));
    }

    if let Some(error) = &self.error {
      lines.push(Line::from(Span::styled(
        format!(" {}", error),
        Style::default().fg(Color::Red),
      )));
    } else if self.editing {
      lines.push(Line::from(Span::styled(
        " Saving with the same code replaces the stored product.",
        Style::default().fg(Color::DarkGray),
      )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
  }

  fn breadcrumb_label(&self) -> String {
    if self.editing {
      format!("Edit {}", self.inputs[0].value())
    } else {
      "New product".to_string()
    }
  }

  fn is_capturing_input(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Tab", "next field").with_priority(10),
      ShortcutInfo::new("Enter", "save").with_priority(20),
      ShortcutInfo::new("Esc", "cancel").with_priority(90),
    ]
  }
}
