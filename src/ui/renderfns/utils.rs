/// Truncate a string to a maximum number of chars, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Price as shown in lists, always two decimals
pub fn format_price(price: f64) -> String {
  format!("{:.2}", price)
}
