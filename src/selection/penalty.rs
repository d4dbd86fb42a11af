//! selection::penalty — ordered per-coordinate ℓ₁ penalty weights.
//!
//! Purpose
//! -------
//! Hold the LASSO weights `λ_j` as an explicit ordered mapping from
//! coordinate index to weight, built once and never mutated, so the
//! active/inactive partition derived from it is reproducible.
//!
//! Invariants & assumptions
//! ------------------------
//! - Indices are exactly `0..len`, each appearing once; entries are stored
//!   sorted by index regardless of input order.
//! - Weights are finite and `>= 0`. A zero weight leaves its coordinate
//!   unpenalized.
use crate::selection::errors::{SelectionError, SelectionResult};
use ndarray::Array1;

#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyWeights {
    entries: Vec<(usize, f64)>,
}

impl PenaltyWeights {
    /// Build from `(index, weight)` pairs in any order.
    ///
    /// # Errors
    /// - [`SelectionError::InvalidPenaltyWeight`] for a negative or non-finite weight.
    /// - [`SelectionError::DuplicatePenaltyIndex`] when an index repeats.
    /// - [`SelectionError::PenaltyCoverage`] when the indices are not `0..len`.
    pub fn new(mut entries: Vec<(usize, f64)>) -> SelectionResult<Self> {
        for &(index, value) in &entries {
            if !value.is_finite() || value < 0.0 {
                return Err(SelectionError::InvalidPenaltyWeight { index, value });
            }
        }
        entries.sort_by_key(|&(index, _)| index);
        for (position, pair) in entries.windows(2).enumerate() {
            if pair[0].0 == pair[1].0 {
                return Err(SelectionError::DuplicatePenaltyIndex { index: pair[0].0 });
            }
            if pair[1].0 != position + 1 {
                return Err(SelectionError::PenaltyCoverage {
                    expected: entries.len(),
                    found: position + 1,
                });
            }
        }
        if let Some(&(first, _)) = entries.first() {
            if first != 0 {
                return Err(SelectionError::PenaltyCoverage { expected: entries.len(), found: 0 });
            }
        }
        Ok(Self { entries })
    }

    /// Same weight on every one of `p` coordinates.
    ///
    /// # Errors
    /// - [`SelectionError::InvalidPenaltyWeight`] for a bad weight.
    pub fn uniform(p: usize, weight: f64) -> SelectionResult<Self> {
        Self::new((0..p).map(|j| (j, weight)).collect())
    }

    /// Weights given positionally.
    ///
    /// # Errors
    /// - [`SelectionError::InvalidPenaltyWeight`] for a bad weight.
    pub fn from_slice(weights: &[f64]) -> SelectionResult<Self> {
        Self::new(weights.iter().copied().enumerate().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn weight(&self, index: usize) -> Option<f64> {
        self.entries.get(index).map(|&(_, w)| w)
    }

    /// `(index, weight)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Weights of `indices`, in the order given.
    ///
    /// # Errors
    /// - [`SelectionError::InvalidActiveSet`] for an out-of-range index.
    pub fn gather(&self, indices: &[usize]) -> SelectionResult<Array1<f64>> {
        indices
            .iter()
            .map(|&j| {
                self.weight(j).ok_or(SelectionError::InvalidActiveSet { index: j, len: self.len() })
            })
            .collect::<SelectionResult<Vec<f64>>>()
            .map(Array1::from)
    }

    /// # Errors
    /// - [`SelectionError::PenaltyCoverage`] unless there is one weight per
    ///   column of a `p`-column design.
    pub fn check_covers(&self, p: usize) -> SelectionResult<()> {
        if self.len() != p {
            return Err(SelectionError::PenaltyCoverage { expected: p, found: self.len() });
        }
        Ok(())
    }
}
