//! Deterministic visual code for ticket payloads.
//!
//! [`encode`] turns a payload into a square grid of dark/light cells. Three
//! corners carry a fixed finder pattern so a scanner can orient the code; all
//! other cells are filled from a per-cell hash of the payload.
//!
//! This is a decorative placeholder, not a standard 2D barcode: there is no
//! error correction and no symbol format. The same payload and size always
//! produce the same grid.

use crate::error::{Result, TicketError};
use serde::Serialize;

/// Smallest accepted grid size
pub const MIN_GRID_SIZE: usize = 21;

/// Side length of each finder pattern
pub const FINDER_SIZE: usize = 7;

/// Square boolean grid produced by [`encode`]
///
/// `true` is a dark (filled) cell. Cells are stored row-major.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CodeMatrix {
    size: usize,
    cells: Vec<bool>,
}

impl CodeMatrix {
    /// Number of rows (and columns)
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Cell at `(row, col)`, `None` when out of bounds
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        if row < self.size && col < self.size {
            self.cells.get(row * self.size + col).copied()
        } else {
            None
        }
    }

    /// Iterates over the rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(self.size)
    }

    /// Number of dark cells
    #[must_use]
    pub fn dark_count(&self) -> usize {
        self.cells.iter().filter(|&&dark| dark).count()
    }

    /// Checks if `(row, col)` lies inside one of the three finder regions
    #[must_use]
    pub const fn is_reserved(&self, row: usize, col: usize) -> bool {
        finder_offset(self.size, row, col).is_some()
    }

    /// Renders the grid as text, one line per row
    #[must_use]
    pub fn render_text(&self, dark: char, light: char) -> String {
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for row in self.rows() {
            out.extend(row.iter().map(|&cell| if cell { dark } else { light }));
            out.push('\n');
        }
        out
    }
}

/// Encodes `payload` into a `grid_size × grid_size` matrix
///
/// # Errors
///
/// Returns [`TicketError::EncodingSize`] when `grid_size` is even or below
/// [`MIN_GRID_SIZE`].
pub fn encode(payload: &str, grid_size: usize) -> Result<CodeMatrix> {
    if grid_size < MIN_GRID_SIZE || grid_size % 2 == 0 {
        return Err(TicketError::EncodingSize {
            grid_size,
            min: MIN_GRID_SIZE,
        });
    }

    let codes: Vec<u64> = payload.chars().map(|c| u64::from(u32::from(c))).collect();

    let cells = (0..grid_size * grid_size)
        .map(|index| {
            let (row, col) = (index / grid_size, index % grid_size);
            match finder_offset(grid_size, row, col) {
                Some((r, c)) => finder_cell(r, c),
                None => cell_hash(&codes, index as u64) % 2 != 0,
            }
        })
        .collect();

    tracing::trace!(grid_size, payload_len = codes.len(), "Encoded ticket payload");

    Ok(CodeMatrix {
        size: grid_size,
        cells,
    })
}

/// Position inside a finder region, if `(row, col)` falls in one
const fn finder_offset(size: usize, row: usize, col: usize) -> Option<(usize, usize)> {
    let top = row < FINDER_SIZE;
    let left = col < FINDER_SIZE;
    let right = col + FINDER_SIZE >= size;
    let bottom = row + FINDER_SIZE >= size;

    if top && left {
        Some((row, col))
    } else if top && right {
        Some((row, col + FINDER_SIZE - size))
    } else if bottom && left {
        Some((row + FINDER_SIZE - size, col))
    } else {
        None
    }
}

/// Concentric squares: filled border, empty ring, filled 3×3 centre
const fn finder_cell(row: usize, col: usize) -> bool {
    let center = FINDER_SIZE / 2;
    let dr = row.abs_diff(center);
    let dc = col.abs_diff(center);
    let ring = if dr > dc { dr } else { dc };
    ring != center - 1
}

/// Folds the payload's character codes, weighted by cell position
fn cell_hash(codes: &[u64], index: u64) -> u64 {
    let mut hash = index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    for (i, &code) in codes.iter().enumerate() {
        let weight = index.wrapping_add(i as u64).wrapping_add(1);
        hash = hash
            .rotate_left(5)
            .wrapping_add(code.wrapping_mul(weight))
            .wrapping_mul(31);
    }

    // splitmix64 finalizer so neighbouring cells decorrelate
    hash ^= hash >> 30;
    hash = hash.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    hash ^= hash >> 27;
    hash = hash.wrapping_mul(0x94D0_49BB_1331_11EB);
    hash ^ (hash >> 31)
}
