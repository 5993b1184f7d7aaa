use std::fmt;

/// Tag matrix side length (number of data cells per side).
pub const SIDE: usize = 6;

/// Total number of data cells per tag.
pub const BIT_COUNT: usize = SIDE * SIDE;

const MASK: u64 = (1 << BIT_COUNT) - 1;

/// A 36-bit tag codeword packed row-major in a `u64`.
///
/// Bit `SIDE * row + col` holds the cell at `(row, col)`; a set bit is a
/// black cell. Codewords are created by [`Codec::encode`](crate::Codec) or
/// sampled from an image upstream, and consumed by
/// [`Codec::decode`](crate::Codec); they are never persisted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagBits(u64);

impl TagBits {
    /// Wraps the low 36 bits of `raw`.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw & MASK)
    }

    /// Packed bits, row-major.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Reads bit `index` in `0..36`.
    pub fn bit(self, index: usize) -> bool {
        debug_assert!(index < BIT_COUNT);
        (self.0 >> index) & 1 != 0
    }

    /// Reads the cell at `(row, col)`.
    pub fn cell(self, row: usize, col: usize) -> bool {
        self.bit(SIDE * row + col)
    }

    /// Returns a copy with bit `index` flipped.
    pub fn with_bit_flipped(self, index: usize) -> Self {
        debug_assert!(index < BIT_COUNT);
        Self(self.0 ^ (1 << index))
    }

    /// Packs a 6×6 cell matrix (any non-zero cell is a set bit).
    pub fn from_cells(cells: &[[u8; SIDE]; SIDE]) -> Self {
        let mut raw = 0u64;
        for (row, cols) in cells.iter().enumerate() {
            for (col, &cell) in cols.iter().enumerate() {
                if cell != 0 {
                    raw |= 1 << (SIDE * row + col);
                }
            }
        }
        Self(raw)
    }

    /// Unpacks into a 6×6 cell matrix of 0/1 values.
    pub fn to_cells(self) -> [[u8; SIDE]; SIDE] {
        let mut cells = [[0u8; SIDE]; SIDE];
        for (row, cols) in cells.iter_mut().enumerate() {
            for (col, cell) in cols.iter_mut().enumerate() {
                *cell = self.cell(row, col) as u8;
            }
        }
        cells
    }

    /// Hamming distance to `other`.
    pub fn hamming(self, other: Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Debug for TagBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TagBits(")?;
        for row in 0..SIDE {
            write!(f, "    ")?;
            for col in 0..SIDE {
                write!(f, "{}", self.cell(row, col) as u8)?;
            }
            writeln!(f)?;
        }
        write!(f, ")")
    }
}
