//! Serde helpers for reading spreadsheet-backed rows
//!
//! Sheet cells arrive as JSON numbers, numeric strings, empty strings or
//! null depending on how the column was typed upstream. These helpers read
//! them leniently so one odd cell never fails a whole batch; a value that
//! cannot be read becomes `None` and the row is judged later.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum CellValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

fn number_from_f64(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

fn cell_to_u64(cell: Option<CellValue>) -> Option<u64> {
    match cell? {
        CellValue::Number(n) => number_from_f64(n),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().and_then(number_from_f64)
        }
        CellValue::Flag(_) => None,
    }
}

/// Read an index cell (number, numeric string, blank or null)
pub fn cell_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<CellValue>::deserialize(deserializer)?;
    Ok(cell_to_u64(cell).map(|n| n as usize))
}

/// Read a small unsigned cell such as a size or spacing
pub fn cell_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<CellValue>::deserialize(deserializer)?;
    Ok(cell_to_u64(cell).map(|n| n as u32))
}

/// Read a text cell; numbers are rendered back to their decimal form
pub fn cell_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<CellValue>::deserialize(deserializer)?;
    Ok(cell_to_text(cell))
}

fn cell_to_text(cell: Option<CellValue>) -> String {
    match cell {
        None => String::new(),
        Some(CellValue::Text(s)) => s,
        Some(CellValue::Number(n)) => match number_from_f64(n) {
            Some(whole) => whole.to_string(),
            None => n.to_string(),
        },
        Some(CellValue::Flag(b)) => b.to_string(),
    }
}

/// A positional sheet row with every cell read as text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow(pub Vec<String>);

impl<'de> Deserialize<'de> for SheetRow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let cells = Vec::<Option<CellValue>>::deserialize(deserializer)?;
        Ok(SheetRow(cells.into_iter().map(cell_to_text).collect()))
    }
}
