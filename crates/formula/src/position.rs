//! Cell addressing: [`Position`] (A1-style references) and [`Size`] (bounding
//! rectangles).

use std::fmt;
use std::hash::{Hash, Hasher};

use regex::Regex;
use std::sync::OnceLock;

use crate::error::InvalidPosition;

/// Maximum row/column index (exclusive), matching a spreadsheet's `XFD` /
/// `16384` column/row ceiling.
pub const MAX_ROWS: usize = 16384;
pub const MAX_COLS: usize = 16384;

/// A zero-indexed cell address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    /// In-range check. A `Position` can be constructed out of range (e.g. via
    /// `new`); only `is_valid` positions may be used in `Sheet` operations.
    pub fn is_valid(&self) -> bool {
        self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Parse an A1-style reference: uppercase column letters (no leading
    /// zero, base-26, `A`..`Z`/`AA`..) followed by a 1-indexed decimal row
    /// with no leading zero. Rejects any other form or an out-of-range
    /// result.
    pub fn parse(s: &str) -> Result<Position, InvalidPosition> {
        let caps = position_re()
            .captures(s)
            .ok_or_else(|| InvalidPosition(s.to_string()))?;
        let letters = &caps[1];
        let digits = &caps[2];

        let mut col_acc: usize = 0;
        for c in letters.bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc
                .checked_mul(26)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| InvalidPosition(s.to_string()))?;
        }
        let col = col_acc - 1;

        let row_decimal: usize = digits
            .parse()
            .map_err(|_| InvalidPosition(s.to_string()))?;
        let row = row_decimal - 1;

        let pos = Position::new(row, col);
        if pos.is_valid() {
            Ok(pos)
        } else {
            Err(InvalidPosition(s.to_string()))
        }
    }

    fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }

    /// Inverse of [`Position::parse`] for valid positions.
    pub fn format(&self) -> String {
        format!("{}{}", Self::col_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

// Pack (row, col) into a single integer rather than hashing field-by-field.
impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let packed = ((self.row as u64) << 32) | (self.col as u64 & 0xFFFF_FFFF);
        packed.hash(state);
    }
}

fn position_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Z]+)([1-9][0-9]*)$").expect("position regex must compile")
    })
}

/// Bounding rectangle of non-empty cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub rows: usize,
    pub cols: usize,
}

impl Size {
    pub fn new(rows: usize, cols: usize) -> Size {
        Size { rows, cols }
    }
}
