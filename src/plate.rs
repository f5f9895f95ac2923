//! Well-plate geometry: plate formats and well addresses.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::TileError;

/// Grid geometry of a well plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlateFormat {
    pub rows: usize,
    pub cols: usize,
}

impl PlateFormat {
    pub const WELLS_96: PlateFormat = PlateFormat { rows: 8, cols: 12 };
    pub const WELLS_384: PlateFormat = PlateFormat { rows: 16, cols: 24 };

    pub fn new(rows: usize, cols: usize) -> Result<Self, TileError> {
        if rows == 0 || cols == 0 {
            return Err(TileError::InvalidFormat(format!("{cols}x{rows}")));
        }
        Ok(Self { rows, cols })
    }

    pub fn well_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Address of the well at a 0-based row-major position.
    pub fn address_at(&self, position: usize) -> Option<WellAddress> {
        if position >= self.well_count() {
            return None;
        }
        Some(WellAddress {
            row: position / self.cols + 1,
            col: position % self.cols + 1,
        })
    }
}

impl Default for PlateFormat {
    fn default() -> Self {
        Self::WELLS_96
    }
}

impl fmt::Display for PlateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

fn parse_dimension(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parses `"{cols}x{rows}"`, or the named plates `96` and `384`.
impl FromStr for PlateFormat {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "96" => return Ok(Self::WELLS_96),
            "384" => return Ok(Self::WELLS_384),
            _ => {}
        }

        let invalid = || TileError::InvalidFormat(s.to_string());
        let (cols, rows) = trimmed.split_once('x').ok_or_else(invalid)?;
        let (Some(cols), Some(rows)) = (parse_dimension(cols), parse_dimension(rows)) else {
            return Err(invalid());
        };
        if rows == 0 || cols == 0 {
            return Err(invalid());
        }
        Ok(Self { rows, cols })
    }
}

/// 1-based row/column address of a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WellAddress {
    pub row: usize,
    pub col: usize,
}

impl WellAddress {
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{:02}_C{:02}", self.row, self.col)
    }
}
