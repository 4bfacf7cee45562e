use serde::{Deserialize, Serialize};

/// A product record, stored under its code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub code: String,
  pub name: String,
  pub price: f64,
}

impl Product {
  pub fn new(code: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
    Self {
      code: code.into(),
      name: name.into(),
      price,
    }
  }

  /// Whether the code or name contains `needle`, which must already be lowercase.
  pub fn matches(&self, needle: &str) -> bool {
    self.code.to_lowercase().contains(needle) || self.name.to_lowercase().contains(needle)
  }
}

/// Raw text entered for a new product, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
  pub code: String,
  pub name: String,
  pub price: String,
}

impl ProductForm {
  pub fn new(
    code: impl Into<String>,
    name: impl Into<String>,
    price: impl Into<String>,
  ) -> Self {
    Self {
      code: code.into(),
      name: name.into(),
      price: price.into(),
    }
  }
}

/// Parse a price cell from an imported file.
///
/// Everything except digits, `.` and `-` is dropped (currency symbols,
/// thousands separators, spaces), then the longest `-?digits[.digits]`
/// prefix is read. Returns `None` when no finite number remains.
pub fn parse_price_lenient(raw: &str) -> Option<f64> {
  let cleaned: String = raw
    .chars()
    .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
    .collect();

  let bytes = cleaned.as_bytes();
  let mut end = 0;
  if bytes.first() == Some(&b'-') {
    end = 1;
  }
  let int_start = end;
  while end < bytes.len() && bytes[end].is_ascii_digit() {
    end += 1;
  }
  let mut digits = end - int_start;
  if end < bytes.len() && bytes[end] == b'.' {
    let frac_start = end + 1;
    let mut frac_end = frac_start;
    while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
      frac_end += 1;
    }
    digits += frac_end - frac_start;
    end = frac_end;
  }
  if digits == 0 {
    return None;
  }

  cleaned[..end]
    .trim_end_matches('.')
    .parse::<f64>()
    .ok()
    .filter(|p| p.is_finite())
}

/// Parse a price typed by a user. The whole trimmed text must be a number.
pub fn parse_price_strict(raw: &str) -> Option<f64> {
  raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}
