//! A runtime-sized square bit grid.
//!
//! Boards are `n×n` cells packed row-major into a vector of unsigned words
//! `T`. The grid knows nothing about ships; it is the occupancy/hit/miss
//! bookkeeping layer underneath [`Board`](crate::Board) and the random
//! placement generator's blocked map.

use core::fmt;
use core::mem;
use num_traits::{PrimInt, Unsigned, Zero};
use thiserror::Error;

/// Errors returned by bit grid operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitGridError {
    /// Row or column index is out of bounds `[0..n)`.
    #[error("IndexOutOfBounds: row={row}, col={col}")]
    IndexOutOfBounds { row: usize, col: usize },
}

/// An `n×n` bit grid stored in words of type `T`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitGrid<T = u64>
where
    T: PrimInt + Unsigned + Zero,
{
    n: usize,
    words: Vec<T>,
}

/// The grid type used throughout the engine.
pub type Grid = BitGrid<u64>;

impl<T> BitGrid<T>
where
    T: PrimInt + Unsigned + Zero,
{
    const WORD_BITS: usize = mem::size_of::<T>() * 8;

    /// Create an empty `n×n` grid (all bits cleared).
    pub fn new(n: usize) -> Self {
        let cells = n * n;
        let len = cells.div_ceil(Self::WORD_BITS);
        BitGrid {
            n,
            words: vec![T::zero(); len],
        }
    }

    /// Side length of the grid.
    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Gets the bit at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Result<bool, BitGridError> {
        let (word, bit) = self.locate(row, col)?;
        Ok(((self.words[word] >> bit) & T::one()) != T::zero())
    }

    /// Sets the bit at (row, col) to 1.
    pub fn set(&mut self, row: usize, col: usize) -> Result<(), BitGridError> {
        let (word, bit) = self.locate(row, col)?;
        self.words[word] = self.words[word] | (T::one() << bit);
        Ok(())
    }

    /// Clears the bit at (row, col) to 0.
    pub fn clear(&mut self, row: usize, col: usize) -> Result<(), BitGridError> {
        let (word, bit) = self.locate(row, col)?;
        self.words[word] = self.words[word] & !(T::one() << bit);
        Ok(())
    }


    /// Sets the bit at (row, col) and all of its in-bounds 8-neighbours.
    pub fn set_with_neighbors(&mut self, row: usize, col: usize) -> Result<(), BitGridError> {
        self.check_bounds(row, col)?;
        let r0 = row.saturating_sub(1);
        let c0 = col.saturating_sub(1);
        let r1 = (row + 1).min(self.n - 1);
        let c1 = (col + 1).min(self.n - 1);
        for r in r0..=r1 {
            for c in c0..=c1 {
                self.set(r, c)?;
            }
        }
        Ok(())
    }

    /// Iterator over the set bits of the grid, row-major.
    #[inline]
    pub fn iter_set_bits(&self) -> SetBits<'_, T> {
        SetBits { grid: self, idx: 0 }
    }

    #[inline]
    fn check_bounds(&self, row: usize, col: usize) -> Result<(), BitGridError> {
        if row >= self.n || col >= self.n {
            Err(BitGridError::IndexOutOfBounds { row, col })
        } else {
            Ok(())
        }
    }

    #[inline]
    fn locate(&self, row: usize, col: usize) -> Result<(usize, usize), BitGridError> {
        self.check_bounds(row, col)?;
        let idx = row * self.n + col;
        Ok((idx / Self::WORD_BITS, idx % Self::WORD_BITS))
    }

    #[inline]
    fn bit(&self, idx: usize) -> bool {
        let word = self.words[idx / Self::WORD_BITS];
        ((word >> (idx % Self::WORD_BITS)) & T::one()) != T::zero()
    }
}

impl<T> fmt::Debug for BitGrid<T>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitGrid<{}, {}>:", core::any::type_name::<T>(), self.n)?;
        fmt::Display::fmt(self, f)
    }
}

impl<T> fmt::Display for BitGrid<T>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.n {
            for c in 0..self.n {
                let bit = if self.bit(r * self.n + c) { '■' } else { '□' };
                write!(f, "{} ", bit)?;
            }
            if r + 1 < self.n {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Iterator over the set bits of a grid, yielding zero-based `(row, col)`.
#[derive(Clone, Copy)]
pub struct SetBits<'a, T>
where
    T: PrimInt + Unsigned + Zero,
{
    grid: &'a BitGrid<T>,
    idx: usize,
}

impl<'a, T> Iterator for SetBits<'a, T>
where
    T: PrimInt + Unsigned + Zero,
{
    type Item = (usize, usize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let n = self.grid.n;
        while self.idx < n * n {
            let idx = self.idx;
            self.idx += 1;
            if self.grid.bit(idx) {
                return Some((idx / n, idx % n));
            }
        }
        None
    }
}
