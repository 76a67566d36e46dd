use serde::{Deserialize, Serialize};

use crate::engine::Board;

/// Digit base for composite tuple keys. Every cell exponent must stay below
/// this, which supports tiles up to 2^14.
pub const TUPLE_BASE: usize = 15;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NTupleError {
    #[error("digit {0} should be smaller than the base 15")]
    DigitOutOfRange(u8),
}

/// An n-tuple network: a fixed set of tuple patterns, each owning one dense
/// lookup table of running value estimates.
///
/// A pattern is an ordered list of cell indices; the exponents it reads form
/// a base-15 key into the pattern's table. A board's value is the arithmetic
/// mean of the per-pattern lookups: the expected sum of future rewards from
/// that board onward under the current policy.
///
/// ```
/// use td_2048::engine::Board;
/// use td_2048::ntuple::{standard_patterns, NTupleNetwork};
/// let network = NTupleNetwork::new(standard_patterns());
/// assert_eq!(network.value(&Board::EMPTY), Ok(0.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NTupleNetwork {
    patterns: Vec<Vec<usize>>,
    luts: Vec<Vec<f64>>,
}

impl NTupleNetwork {
    /// Build a network with zero-initialized tables, one per pattern, sized
    /// `15^len` for a pattern of `len` cells.
    pub fn new(patterns: Vec<Vec<usize>>) -> Self {
        let luts = patterns
            .iter()
            .map(|pattern| vec![0.0; TUPLE_BASE.pow(pattern.len() as u32)])
            .collect();
        Self { patterns, luts }
    }

    /// The configured tuple patterns, in construction order.
    pub fn patterns(&self) -> &[Vec<usize>] {
        &self.patterns
    }

    /// Estimated value of `board`: the mean of the per-pattern table entries.
    pub fn value(&self, board: &Board) -> Result<f64, NTupleError> {
        let mut total = 0.0;
        for (pattern, lut) in self.patterns.iter().zip(&self.luts) {
            total += lut[tuple_index(pattern, board)?];
        }
        Ok(total / self.patterns.len() as f64)
    }

    /// Add `delta` to every pattern's entry for `board`, returning the
    /// post-update mean. Entries are adjusted independently and
    /// unconditionally; this is the network's sole mutator.
    pub fn update(&mut self, board: &Board, delta: f64) -> Result<f64, NTupleError> {
        let mut total = 0.0;
        for (pattern, lut) in self.patterns.iter().zip(self.luts.iter_mut()) {
            let entry = &mut lut[tuple_index(pattern, board)?];
            *entry += delta;
            total += *entry;
        }
        Ok(total / self.patterns.len() as f64)
    }
}

/// Composite key for one pattern on one board: the exponents at the
/// pattern's cells, most significant digit first in declared order, read as
/// a base-15 number.
fn tuple_index(pattern: &[usize], board: &Board) -> Result<usize, NTupleError> {
    let mut index = 0;
    for &cell in pattern {
        let digit = board.exponent(cell);
        if digit as usize >= TUPLE_BASE {
            return Err(NTupleError::DigitOutOfRange(digit));
        }
        index = index * TUPLE_BASE + digit as usize;
    }
    Ok(index)
}

/// The standard 17-pattern set over the 16 cells: 4 rows, 4 columns, and
/// all 9 2x2 squares.
pub fn standard_patterns() -> Vec<Vec<usize>> {
    vec![
        // horizontal 4-tuples
        vec![0, 1, 2, 3],
        vec![4, 5, 6, 7],
        vec![8, 9, 10, 11],
        vec![12, 13, 14, 15],
        // vertical 4-tuples
        vec![0, 4, 8, 12],
        vec![1, 5, 9, 13],
        vec![2, 6, 10, 14],
        vec![3, 7, 11, 15],
        // all 4-tile squares
        vec![0, 1, 4, 5],
        vec![4, 5, 8, 9],
        vec![8, 9, 12, 13],
        vec![1, 2, 5, 6],
        vec![5, 6, 9, 10],
        vec![9, 10, 13, 14],
        vec![2, 3, 6, 7],
        vec![6, 7, 10, 11],
        vec![10, 11, 14, 15],
    ]
}
