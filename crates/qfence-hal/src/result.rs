//! Sampled measurement results.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// One row per repetition; entry `i` of a row is the bit read into `ro[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotBatch {
    num_clbits: usize,
    rows: Vec<Vec<u8>>,
}

impl ShotBatch {
    /// Build a batch, checking every row has `num_clbits` binary entries.
    pub fn new(num_clbits: usize, rows: Vec<Vec<u8>>) -> HalResult<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != num_clbits {
                return Err(HalError::MalformedResult(format!(
                    "shot {i} has {} bits, expected {num_clbits}",
                    row.len()
                )));
            }
            if let Some(bit) = row.iter().find(|&&b| b > 1) {
                return Err(HalError::MalformedResult(format!(
                    "shot {i} contains non-binary value {bit}"
                )));
            }
        }
        Ok(Self { num_clbits, rows })
    }

    /// The same row repeated `shots` times.
    pub fn repeated(row: Vec<u8>, shots: usize) -> HalResult<Self> {
        let num_clbits = row.len();
        Self::new(num_clbits, vec![row; shots])
    }

    /// Number of repetitions.
    pub fn shots(&self) -> usize {
        self.rows.len()
    }

    /// Width of the output register.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Check if the batch holds no shots.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over shots.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Histogram keyed by bitstring, `ro[0]` first.
    pub fn counts(&self) -> FxHashMap<String, u64> {
        let mut counts = FxHashMap::default();
        for row in &self.rows {
            let key: String = row.iter().map(|b| if *b == 1 { '1' } else { '0' }).collect();
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }

    /// The most frequent bitstring and its count.
    pub fn most_frequent(&self) -> Option<(String, u64)> {
        self.counts()
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
    }
}
