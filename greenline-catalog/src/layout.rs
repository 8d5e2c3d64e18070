use greenline_core::{ReservationError, ReservationResult};
use serde::{Deserialize, Serialize};

/// Physical seat grid of a bus: lettered rows ("A", "B", ...) by numbered
/// columns (1-based). Aisle positions are presentation metadata for
/// renderers and do not consume seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatLayout {
    pub rows: u8,
    pub columns: u8,
    /// Column numbers after which an aisle gap sits, e.g. `[2]` for a 2+2
    /// coach arrangement.
    #[serde(default)]
    pub aisles_after: Vec<u8>,
}

impl SeatLayout {
    pub fn new(rows: u8, columns: u8, aisles_after: Vec<u8>) -> Self {
        Self { rows, columns, aisles_after }
    }

    /// Rows are letters, so more than 26 cannot be labelled.
    pub fn validate(&self) -> ReservationResult<()> {
        if self.rows == 0 || self.columns == 0 {
            return Err(ReservationError::Validation(
                "seat layout must have at least one row and one column".to_string(),
            ));
        }
        if self.rows > 26 {
            return Err(ReservationError::Validation(format!(
                "seat layout supports at most 26 rows, got {}",
                self.rows
            )));
        }
        if let Some(bad) = self.aisles_after.iter().find(|c| **c == 0 || **c >= self.columns) {
            return Err(ReservationError::Validation(format!(
                "aisle position {} is outside columns 1..{}",
                bad, self.columns
            )));
        }
        Ok(())
    }

    pub fn capacity(&self) -> u16 {
        self.rows as u16 * self.columns as u16
    }

    /// All seat labels in row-major order: "A1", "A2", ..., "B1", ...
    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::with_capacity(self.capacity() as usize);
        for row in 0..self.rows {
            let letter = (b'A' + row) as char;
            for col in 1..=self.columns {
                labels.push(format!("{}{}", letter, col));
            }
        }
        labels
    }

    /// Whether `label` names a seat on this layout. Only canonical labels
    /// match: uppercase row letter, no leading zeros in the column.
    pub fn contains(&self, label: &str) -> bool {
        let mut chars = label.chars();
        let row = match chars.next() {
            Some(c) if c.is_ascii_uppercase() => c as u8 - b'A',
            _ => return false,
        };
        if row >= self.rows {
            return false;
        }
        let rest = chars.as_str();
        match rest.parse::<u8>() {
            Ok(col) if col >= 1 && col <= self.columns && col.to_string() == rest => true,
            _ => false,
        }
    }
}
