//! Reading and writing inventory files.
//!
//! Import accepts comma, semicolon or tab separated text with a header row
//! naming the code, name and price columns in Spanish or English. Export
//! always writes `codigo,nombre,precio` with comma separators.
//!
//! Fields follow RFC 4180 quoting in both directions: the exporter wraps
//! code and name in double quotes and doubles embedded quotes, and the
//! importer undoes exactly that. Quoting never spans lines; a line with an
//! unbalanced quote is split plainly on the delimiter.

use super::error::{CsvError, InventoryError};
use super::product::{parse_price_lenient, Product};
use thiserror::Error;

/// Header written on export.
pub const EXPORT_HEADER: &str = "codigo,nombre,precio";

const DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

const CODE_KEYWORDS: &[&str] = &["codigo", "code"];
const NAME_KEYWORDS: &[&str] = &["nombre", "name"];
const PRICE_KEYWORDS: &[&str] = &["precio", "price"];

/// Why a data row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
  #[error("empty code")]
  EmptyCode,
  #[error("empty name")]
  EmptyName,
  #[error("row has no {0} column")]
  MissingColumn(&'static str),
  #[error("invalid price {0:?}")]
  InvalidPrice(String),
  #[error("unreadable row: {0}")]
  Malformed(String),
  #[error("could not be stored: {0}")]
  Storage(String),
}

/// A skipped row and the 1-based line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
  pub line: u64,
  pub reason: RejectReason,
}

/// Result of decoding a file: accepted products in file order plus the
/// rows that were skipped.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
  pub products: Vec<(u64, Product)>,
  pub rejected: Vec<RowRejection>,
}

impl Decoded {
  pub fn imported_count(&self) -> usize {
    self.products.len()
  }

  pub fn error_count(&self) -> usize {
    self.rejected.len()
  }
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
  code: usize,
  name: usize,
  price: usize,
}

/// Decode the text of an inventory file.
///
/// Each physical line is parsed on its own, so a stray quote can only
/// damage the row it appears in. Fails only when there is no header or
/// the header lacks a required column. Bad data rows are collected in
/// `Decoded::rejected`.
pub fn decode(text: &str) -> Result<Decoded, CsvError> {
  let text = text.strip_prefix('\u{feff}').unwrap_or(text);

  let mut lines = text
    .split('\n')
    .enumerate()
    .map(|(i, l)| (i as u64 + 1, l.strip_suffix('\r').unwrap_or(l)))
    .filter(|(_, l)| !l.trim().is_empty());

  let (_, header_line) = lines.next().ok_or(CsvError::Empty)?;
  let delimiter = detect_delimiter(header_line);

  let header = split_line(header_line, delimiter).map_err(|e| {
    tracing::debug!(error = %e, "header row could not be read");
    CsvError::Empty
  })?;
  let tokens: Vec<String> = header.iter().map(|c| c.clean().to_lowercase()).collect();
  let columns = resolve_columns(&tokens)?;

  let mut decoded = Decoded::default();
  for (line, raw) in lines {
    let result = split_line(raw, delimiter)
      .map_err(RejectReason::Malformed)
      .and_then(|cells| parse_row(&cells, columns));
    match result {
      Ok(product) => decoded.products.push((line, product)),
      Err(reason) => decoded.rejected.push(RowRejection { line, reason }),
    }
  }

  tracing::debug!(
    delimiter = %(delimiter as char).escape_default(),
    accepted = decoded.imported_count(),
    rejected = decoded.error_count(),
    "decoded inventory file"
  );
  Ok(decoded)
}

/// Encode products as an export file.
pub fn encode(products: &[Product]) -> Result<String, InventoryError> {
  if products.is_empty() {
    return Err(InventoryError::EmptyInventory);
  }

  let mut out = String::with_capacity(EXPORT_HEADER.len() + 1 + products.len() * 32);
  out.push_str(EXPORT_HEADER);
  out.push('\n');
  for p in products {
    out.push_str(&quote(&p.code));
    out.push(',');
    out.push_str(&quote(&p.name));
    out.push(',');
    out.push_str(&p.price.to_string());
    out.push('\n');
  }
  Ok(out)
}

/// Pick the separator the header uses most; ties go to the earlier of
/// comma, semicolon, tab.
fn detect_delimiter(header: &str) -> u8 {
  let mut best = DELIMITERS[0];
  let mut best_count = 0;
  for d in DELIMITERS {
    let count = header.bytes().filter(|b| *b == d).count();
    if count > best_count {
      best = d;
      best_count = count;
    }
  }
  best
}

fn resolve_columns(tokens: &[String]) -> Result<Columns, CsvError> {
  let find = |keywords: &[&str]| {
    tokens
      .iter()
      .position(|t| keywords.iter().any(|k| t.contains(k)))
  };

  let code = find(CODE_KEYWORDS);
  let name = find(NAME_KEYWORDS);
  let price = find(PRICE_KEYWORDS);

  match (code, name, price) {
    (Some(code), Some(name), Some(price)) => Ok(Columns { code, name, price }),
    _ => {
      let missing = [(code, "codigo"), (name, "nombre"), (price, "precio")]
        .into_iter()
        .filter(|(idx, _)| idx.is_none())
        .map(|(_, label)| label)
        .collect();
      Err(CsvError::Schema { missing })
    }
  }
}

/// A cell as read from a line, remembering whether it was wrapped in
/// RFC 4180 double quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Cell {
  text: String,
  quoted: bool,
}

impl Cell {
  /// Trimmed value. Quoted cells are kept as the parser unescaped them;
  /// bare cells lose one leading and one trailing `"` or `'`, which files
  /// that quote inconsistently leave behind.
  fn clean(&self) -> &str {
    let trimmed = self.text.trim();
    if self.quoted {
      return trimmed;
    }
    let trimmed = trimmed.strip_prefix(['"', '\'']).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(['"', '\'']).unwrap_or(trimmed);
    trimmed.trim()
  }
}

/// Split one physical line into cells.
fn split_line(line: &str, delimiter: u8) -> Result<Vec<Cell>, String> {
  let delim = delimiter as char;

  // An unbalanced quote would run to the end of the line; fall back to a
  // plain split and let `Cell::clean` drop the stray quote.
  if line.matches('"').count() % 2 == 1 {
    return Ok(
      line
        .split(delim)
        .map(|text| Cell {
          text: text.to_string(),
          quoted: false,
        })
        .collect(),
    );
  }

  let mut reader = csv::ReaderBuilder::new()
    .delimiter(delimiter)
    .has_headers(false)
    .flexible(true)
    .from_reader(line.as_bytes());
  let record = match reader.records().next() {
    Some(Ok(record)) => record,
    Some(Err(e)) => return Err(e.to_string()),
    None => return Ok(Vec::new()),
  };

  let quoted = quoted_cells(line, delim);
  Ok(
    record
      .iter()
      .enumerate()
      .map(|(i, text)| Cell {
        text: text.to_string(),
        quoted: quoted.get(i).copied().unwrap_or(false),
      })
      .collect(),
  )
}

/// For each cell of a line with balanced quotes, whether it opens with `"`.
fn quoted_cells(line: &str, delim: char) -> Vec<bool> {
  let mut flags: Vec<bool> = Vec::new();
  let mut at_start = true;
  let mut in_quotes = false;
  for c in line.chars() {
    if at_start {
      at_start = c == delim;
      flags.push(c == '"');
      in_quotes = c == '"';
      continue;
    }
    if c == '"' && flags.last() == Some(&true) {
      in_quotes = !in_quotes;
    } else if c == delim && !in_quotes {
      at_start = true;
    }
  }
  if at_start {
    flags.push(false);
  }
  flags
}

fn parse_row(cells: &[Cell], columns: Columns) -> Result<Product, RejectReason> {
  let cell = |idx: usize, label: &'static str| {
    cells
      .get(idx)
      .map(Cell::clean)
      .ok_or(RejectReason::MissingColumn(label))
  };

  let code = cell(columns.code, "codigo")?;
  if code.is_empty() {
    return Err(RejectReason::EmptyCode);
  }
  let name = cell(columns.name, "nombre")?;
  if name.is_empty() {
    return Err(RejectReason::EmptyName);
  }
  let raw_price = cell(columns.price, "precio")?;
  let price =
    parse_price_lenient(raw_price).ok_or_else(|| RejectReason::InvalidPrice(raw_price.to_string()))?;

  Ok(Product::new(code, name, price))
}

fn quote(field: &str) -> String {
  format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn products(decoded: &Decoded) -> Vec<Product> {
    decoded.products.iter().map(|(_, p)| p.clone()).collect()
  }

  #[test]
  fn test_decode_basic_with_bad_row() {
    let decoded = decode("codigo,nombre,precio\nA1,Widget,9.99\n,Bad,abc\n").unwrap();
    assert_eq!(decoded.imported_count(), 1);
    assert_eq!(decoded.error_count(), 1);
    assert_eq!(products(&decoded), vec![Product::new("A1", "Widget", 9.99)]);
    assert_eq!(decoded.rejected[0].line, 3);
    assert_eq!(decoded.rejected[0].reason, RejectReason::EmptyCode);
  }

  #[test]
  fn test_decode_semicolon_and_english_headers() {
    let decoded = decode("Price;Product Name;SKU Code\r\n1,50;Tuerca;T-1\r\n\r\n2.5;Perno;P-2\r\n").unwrap();
    let got = products(&decoded);
    assert_eq!(got.len(), 2);
    // "1,50" keeps only digits and dots, as spreadsheets in comma-decimal locales export it.
    assert_eq!(got[0], Product::new("T-1", "Tuerca", 150.0));
    assert_eq!(got[1], Product::new("P-2", "Perno", 2.5));
  }

  #[test]
  fn test_decode_tab_delimited() {
    let decoded = decode("code\tname\tprice\nX\tThing, large\t3\n").unwrap();
    assert_eq!(products(&decoded), vec![Product::new("X", "Thing, large", 3.0)]);
  }

  #[test]
  fn test_decode_header_case_insensitive() {
    let decoded = decode("CÓDIGO,NOMBRE,PRECIO\n1,a,1\n");
    // The accented header does not contain "codigo" or "code".
    assert_eq!(
      decoded.unwrap_err(),
      CsvError::Schema {
        missing: vec!["codigo"]
      }
    );

    let decoded = decode("\"Codigo\",\"Nombre\",\"Precio\"\n1,a,1\n").unwrap();
    assert_eq!(decoded.imported_count(), 1);
  }

  #[test]
  fn test_decode_schema_error_lists_missing() {
    let err = decode("sku,descripcion,valor\nA,b,1\n").unwrap_err();
    assert_eq!(
      err,
      CsvError::Schema {
        missing: vec!["codigo", "nombre", "precio"]
      }
    );
    let err = decode("code,name\nA,b\n").unwrap_err();
    assert_eq!(
      err,
      CsvError::Schema {
        missing: vec!["precio"]
      }
    );
  }

  #[test]
  fn test_decode_empty_input() {
    assert_eq!(decode("").unwrap_err(), CsvError::Empty);
    assert_eq!(decode("\n\r\n\n").unwrap_err(), CsvError::Empty);
  }

  #[test]
  fn test_decode_header_only() {
    let decoded = decode("codigo,nombre,precio\n").unwrap();
    assert_eq!(decoded.imported_count(), 0);
    assert_eq!(decoded.error_count(), 0);
  }

  #[test]
  fn test_decode_row_rejections() {
    let text = "codigo,nombre,precio\n\
                A,,1\n\
                B,Bee,n/a\n\
                C,Cee\n\
                D,Dee,4\n";
    let decoded = decode(text).unwrap();
    assert_eq!(decoded.imported_count(), 1);
    let reasons: Vec<RejectReason> = decoded.rejected.iter().map(|r| r.reason.clone()).collect();
    assert_eq!(
      reasons,
      vec![
        RejectReason::EmptyName,
        RejectReason::InvalidPrice("n/a".to_string()),
        RejectReason::MissingColumn("precio"),
      ]
    );
  }

  #[test]
  fn test_decode_strips_single_quotes_and_whitespace() {
    let decoded = decode("codigo,nombre,precio\n 'Q1' , 'Quill' ,' 2.00 '\n").unwrap();
    assert_eq!(products(&decoded), vec![Product::new("Q1", "Quill", 2.0)]);
  }

  #[test]
  fn test_decode_stray_quote_only_affects_its_row() {
    let decoded = decode("codigo,nombre,precio\n\"A1,Widget,9.99\nB2,Gadget,5\nC3,Cog,1\n").unwrap();
    assert_eq!(decoded.error_count(), 0);
    assert_eq!(
      products(&decoded),
      vec![
        Product::new("A1", "Widget", 9.99),
        Product::new("B2", "Gadget", 5.0),
        Product::new("C3", "Cog", 1.0),
      ]
    );
  }

  #[test]
  fn test_decode_strips_lone_quotes() {
    let decoded = decode("codigo,nombre,precio\nA1\",'Widget,9.99\nB2,Gadget',\"5\n").unwrap();
    assert_eq!(
      products(&decoded),
      vec![
        Product::new("A1", "Widget", 9.99),
        Product::new("B2", "Gadget", 5.0),
      ]
    );
  }

  #[test]
  fn test_decode_quoted_cells_keep_edge_quotes() {
    let decoded = decode("codigo,nombre,precio\n\"P1\",\"Pipe 12\"\"\",3\nP2,'Bare',4\n").unwrap();
    assert_eq!(
      products(&decoded),
      vec![
        Product::new("P1", "Pipe 12\"", 3.0),
        Product::new("P2", "Bare", 4.0),
      ]
    );
  }

  #[test]
  fn test_decode_line_numbers_count_blank_lines() {
    let decoded = decode("\ncodigo,nombre,precio\r\n\r\nA,,1\r\n").unwrap();
    assert_eq!(
      decoded.rejected,
      vec![RowRejection {
        line: 4,
        reason: RejectReason::EmptyName
      }]
    );
  }

  #[test]
  fn test_quoted_cells() {
    assert_eq!(quoted_cells("\"a\"\"b\",c", ','), vec![true, false]);
    assert_eq!(quoted_cells(",x,", ','), vec![false, false, false]);
    assert_eq!(quoted_cells("a;\"b;c\";d", ';'), vec![false, true, false]);
  }

  #[test]
  fn test_decode_keeps_duplicates_in_order() {
    let decoded = decode("codigo,nombre,precio\nA,First,1\nA,Second,2\n").unwrap();
    let got = products(&decoded);
    assert_eq!(got.len(), 2);
    assert_eq!(got[1].name, "Second");
  }

  #[test]
  fn test_decode_extra_columns() {
    let decoded = decode("id,codigo,stock,nombre,precio\n1,A,5,Alpha,3.5\n").unwrap();
    assert_eq!(products(&decoded), vec![Product::new("A", "Alpha", 3.5)]);
  }

  #[test]
  fn test_encode_empty_fails() {
    assert!(matches!(encode(&[]), Err(InventoryError::EmptyInventory)));
  }

  #[test]
  fn test_encode_format() {
    let out = encode(&[
      Product::new("A1", "Widget", 9.99),
      Product::new("B2", "Say \"hi\"", 5.0),
    ])
    .unwrap();
    assert_eq!(
      out,
      "codigo,nombre,precio\n\"A1\",\"Widget\",9.99\n\"B2\",\"Say \"\"hi\"\"\",5\n"
    );
  }

  #[test]
  fn test_round_trip_awkward_names() {
    let original = vec![
      Product::new("A1", "Widget", 9.99),
      Product::new("B;2", "Comma, semicolon; and \"quotes\"", -0.5),
      Product::new("C3", "Pipe 12\"", 1234567.125),
      Product::new("D4", "tab\there", 0.0),
    ];
    let decoded = decode(&encode(&original).unwrap()).unwrap();
    let got = products(&decoded);
    assert_eq!(decoded.error_count(), 0);
    assert_eq!(got.len(), original.len());
    for (a, b) in got.iter().zip(&original) {
      assert_eq!(a.code, b.code);
      assert_eq!(a.name, b.name);
      assert!((a.price - b.price).abs() < 1e-9);
    }
  }

  #[test]
  fn test_detect_delimiter() {
    assert_eq!(detect_delimiter("a,b,c"), b',');
    assert_eq!(detect_delimiter("a;b;c"), b';');
    assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
    assert_eq!(detect_delimiter("abc"), b',');
    assert_eq!(detect_delimiter("a;b,c;d"), b';');
  }
}
