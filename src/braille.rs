//! Six-dot braille encoding for menu labels.
//!
//! Each supported character maps to exactly one [`Cell`]; anything outside the
//! alphabet becomes [`Cell::BLANK`]. Encoding is lossy by design of the panel:
//! whitespace is dropped, the room/device separator ends the label, and output
//! is capped at the number of physical cells.
//!
//! # Example
//!
//! ```rust
//! use rs_braille::braille::{encode, Cell};
//!
//! let cells = encode("kitchen-light1", 13);
//! assert_eq!(cells.len(), 7); // "kitchen"
//! assert!(cells[0].dot(1) && cells[0].dot(3)); // k = dots 1,3
//! assert_eq!(encode("a b", 13).len(), 2);
//! assert_eq!(encode("?", 13)[0], Cell::BLANK);
//! ```

use heapless::Vec;

/// Upper bound on cells any supported panel can show.
pub const MAX_CELLS: usize = 16;

/// Character that separates a room label from its device list.
///
/// Encoding stops here so only the room part is shown.
pub const ROOM_DEVICE_SEPARATOR: char = '-';

/// Encoded label, at most [`MAX_CELLS`] long.
pub type Cells = Vec<Cell, MAX_CELLS>;

/// One tactile glyph: dots 1..=6 stored in bits 0..=5.
///
/// Dots 1-3 run down the left column and 4-6 down the right, matching
/// standard braille numbering and the Unicode braille block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell(u8);

impl Cell {
    /// All dots lowered.
    pub const BLANK: Cell = Cell(0);

    /// Builds a cell from raw bits, ignoring anything above dot 6.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Cell(bits & 0b0011_1111)
    }

    /// Raw dot bits (bit 0 = dot 1).
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns whether dot `n` (1..=6) is raised. Out-of-range dots are never raised.
    #[inline]
    pub const fn dot(self, n: u8) -> bool {
        if n == 0 || n > 6 {
            return false;
        }
        self.0 & (1 << (n - 1)) != 0
    }

    /// True when no dot is raised.
    #[inline]
    pub const fn is_blank(self) -> bool {
        self.0 == 0
    }

    /// Unicode braille pattern for terminal rendering.
    pub fn to_unicode(self) -> char {
        char::from_u32(0x2800 + self.0 as u32).unwrap_or(' ')
    }
}

/// Parses a dot-order string like `b"100110"` (dot 1 first) at compile time.
const fn pattern(dots: &[u8; 6]) -> Cell {
    let mut bits = 0u8;
    let mut i = 0;
    while i < 6 {
        if dots[i] == b'1' {
            bits |= 1 << i;
        }
        i += 1;
    }
    Cell(bits)
}

const LETTERS: [Cell; 26] = [
    pattern(b"100000"), // a
    pattern(b"110000"), // b
    pattern(b"100100"), // c
    pattern(b"100110"), // d
    pattern(b"100010"), // e
    pattern(b"110100"), // f
    pattern(b"110110"), // g
    pattern(b"110010"), // h
    pattern(b"010100"), // i
    pattern(b"010110"), // j
    pattern(b"101000"), // k
    pattern(b"111000"), // l
    pattern(b"101100"), // m
    pattern(b"101110"), // n
    pattern(b"101010"), // o
    pattern(b"111100"), // p
    pattern(b"111110"), // q
    pattern(b"111010"), // r
    pattern(b"011100"), // s
    pattern(b"011110"), // t
    pattern(b"101001"), // u
    pattern(b"111001"), // v
    pattern(b"010111"), // w
    pattern(b"101101"), // x
    pattern(b"111101"), // y
    pattern(b"101011"), // z
];

// Digits reuse the a-j patterns (0 = j).
const DIGITS: [Cell; 10] = [
    LETTERS[9],
    LETTERS[0],
    LETTERS[1],
    LETTERS[2],
    LETTERS[3],
    LETTERS[4],
    LETTERS[5],
    LETTERS[6],
    LETTERS[7],
    LETTERS[8],
];

const NUMBER_SIGN: Cell = pattern(b"001111");

/// Looks up a single character, case-insensitively.
///
/// Returns `None` for characters outside the supported alphabet
/// (`a-z`, `0-9`, `#`).
pub fn lookup(c: char) -> Option<Cell> {
    match c.to_ascii_lowercase() {
        l @ 'a'..='z' => Some(LETTERS[(l as u8 - b'a') as usize]),
        d @ '0'..='9' => Some(DIGITS[(d as u8 - b'0') as usize]),
        '#' => Some(NUMBER_SIGN),
        _ => None,
    }
}

/// Encodes `text` into at most `max_cells` cells (clamped to [`MAX_CELLS`]).
///
/// Whitespace is skipped without using a cell, [`ROOM_DEVICE_SEPARATOR`]
/// ends the label, and unsupported characters become [`Cell::BLANK`].
/// Oversized input is truncated silently.
pub fn encode(text: &str, max_cells: usize) -> Cells {
    let limit = max_cells.min(MAX_CELLS);
    let mut cells = Cells::new();

    for c in text.chars() {
        if c == ROOM_DEVICE_SEPARATOR {
            break;
        }
        if c.is_whitespace() {
            continue;
        }
        if cells.len() >= limit {
            break;
        }
        // Capacity checked above.
        let _ = cells.push(lookup(c).unwrap_or(Cell::BLANK));
    }

    cells
}
