//! Projection of braille cells onto a chained dot-matrix panel.
//!
//! The panel is a row of 8x8 LED modules. Each cell uses two columns
//! (dots 1-3 on the left, 4-6 on the right) and three rows. Which physical
//! columns belong to which cell depends on how the modules are chained, so
//! the mapping is a lookup table ([`CellLayout`]) rather than a formula.
//!
//! # Example
//!
//! ```rust
//! use rs_braille::braille::encode;
//! use rs_braille::layout::{project, CellLayout};
//!
//! let layout = CellLayout::fc16_chain();
//! let cells = encode("ab", layout.len());
//! let writes = project(&cells, cells.len(), &layout);
//!
//! // Two cells plus one trailing blank cell, six dots each.
//! assert_eq!(writes.len(), 18);
//! assert!(writes.iter().any(|w| w.on && w.column == 57 && w.row == 1));
//! ```

use heapless::Vec;

use crate::braille::{Cell, MAX_CELLS};

/// Maximum dot writes a single projection can produce.
pub const MAX_WRITES: usize = MAX_CELLS * 6;

/// Matrix rows used for dot rows 1, 2 and 3 on the stock panel.
pub const DEFAULT_DOT_ROWS: [u8; 3] = [1, 3, 5];

/// Physical columns of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellColumns {
    /// Column holding dots 1-3.
    pub left: u8,
    /// Column holding dots 4-6.
    pub right: u8,
}

impl CellColumns {
    /// Creates a column pair.
    pub const fn new(left: u8, right: u8) -> Self {
        Self { left, right }
    }
}

/// One point written to the matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DotWrite {
    /// Matrix row.
    pub row: u8,
    /// Matrix column.
    pub column: u8,
    /// Whether the LED/pin is raised.
    pub on: bool,
}

/// Cell index to physical coordinate table.
///
/// Supplied as configuration so the projector can be tested without a panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellLayout {
    columns: Vec<CellColumns, MAX_CELLS>,
    rows: [u8; 3],
}

/// Column table for eight FC-16 modules carrying 13 cells.
const FC16_COLUMNS: [(u8, u8); 13] = [
    (57, 59),
    (62, 48),
    (51, 53),
    (40, 42),
    (45, 47),
    (34, 36),
    (39, 25),
    (28, 30),
    (17, 19),
    (22, 8),
    (11, 13),
    (0, 2),
    (5, 7),
];

impl CellLayout {
    /// Builds a layout from `(left, right)` column pairs, one per cell.
    ///
    /// Pairs beyond [`MAX_CELLS`] are ignored.
    pub fn new(pairs: &[(u8, u8)], rows: [u8; 3]) -> Self {
        let mut columns = Vec::new();
        for &(left, right) in pairs.iter().take(MAX_CELLS) {
            let _ = columns.push(CellColumns::new(left, right));
        }
        Self { columns, rows }
    }

    /// The wiring of the stock panel: eight chained FC-16 modules, 13 cells.
    pub fn fc16_chain() -> Self {
        Self::new(&FC16_COLUMNS, DEFAULT_DOT_ROWS)
    }

    /// Number of cells the panel can show.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the layout has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns of the cell at `index`.
    pub fn columns(&self, index: usize) -> Option<CellColumns> {
        self.columns.get(index).copied()
    }

    /// Matrix rows for dot rows 1-3.
    #[inline]
    pub fn rows(&self) -> [u8; 3] {
        self.rows
    }

    /// Highest column referenced, useful for sizing a framebuffer.
    pub fn max_column(&self) -> Option<u8> {
        self.columns.iter().map(|c| c.left.max(c.right)).max()
    }
}

impl Default for CellLayout {
    fn default() -> Self {
        Self::fc16_chain()
    }
}

/// Projects `cells` onto matrix coordinates.
///
/// Cells are written in layout order. Projection stops once more than
/// `source_len` cells have been consumed, so exactly `source_len + 1` cells are
/// written (bounded by the layout); positions past the end of `cells` are
/// written blank, which clears the cell right after a shorter label.
/// Re-projecting the same input yields the same writes.
pub fn project(
    cells: &[Cell],
    source_len: usize,
    layout: &CellLayout,
) -> Vec<DotWrite, MAX_WRITES> {
    let mut writes = Vec::new();
    let rows = layout.rows();

    for (consumed, cols) in layout.columns.iter().enumerate() {
        if consumed > source_len {
            break;
        }
        let cell = cells.get(consumed).copied().unwrap_or(Cell::BLANK);

        for (i, &row) in rows.iter().enumerate() {
            let dot = i as u8 + 1;
            let _ = writes.push(DotWrite {
                row,
                column: cols.left,
                on: cell.dot(dot),
            });
        }
        for (i, &row) in rows.iter().enumerate() {
            let dot = i as u8 + 4;
            let _ = writes.push(DotWrite {
                row,
                column: cols.right,
                on: cell.dot(dot),
            });
        }
    }

    writes
}
