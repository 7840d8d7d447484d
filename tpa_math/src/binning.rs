//! Feature discretization for histogram-based estimators
//!
//! Each feature is mapped onto at most `max_bins` ordered bins. With few
//! distinct values every value gets its own bin; otherwise bin edges are
//! placed at quantiles of the distinct values. A raw value `v` falls into
//! bin `b` where `b` is the number of edges strictly below `v`, so
//! `bin(v) <= b` holds exactly when `v <= edges[b]`.

use crate::{MathError, Result};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Upper bound on bins per feature (bin indices must fit in a `u8`)
pub const MAX_BINS: usize = 255;

/// Bin edges learned for every feature of a training matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinMapper {
    edges: Vec<Vec<f64>>,
}

impl BinMapper {
    /// Learn bin edges for every column of `x`
    pub fn fit(x: &Array2<f64>, max_bins: usize) -> Result<Self> {
        if !(2..=MAX_BINS).contains(&max_bins) {
            return Err(MathError::InvalidParameter(format!(
                "max_bins must be between 2 and {}, got {}",
                MAX_BINS, max_bins
            )));
        }

        let edges = x
            .columns()
            .into_iter()
            .map(|column| feature_edges(column, max_bins))
            .collect();

        Ok(Self { edges })
    }

    /// Number of features the mapper was fitted on
    pub fn n_features(&self) -> usize {
        self.edges.len()
    }

    /// Number of bins used by `feature`
    pub fn n_bins(&self, feature: usize) -> usize {
        self.edges[feature].len() + 1
    }

    /// Raw threshold separating bins `..=bin` from the rest
    pub fn edge(&self, feature: usize, bin: u8) -> f64 {
        self.edges[feature][bin as usize]
    }

    /// Bin index of a single raw value
    pub fn bin_value(&self, feature: usize, value: f64) -> u8 {
        self.edges[feature].partition_point(|&edge| edge < value) as u8
    }

    /// Discretize `x` into column-major bin indices
    pub fn transform(&self, x: &Array2<f64>) -> Vec<Vec<u8>> {
        x.columns()
            .into_iter()
            .enumerate()
            .map(|(feature, column)| {
                column
                    .iter()
                    .map(|&value| self.bin_value(feature, value))
                    .collect()
            })
            .collect()
    }
}

fn feature_edges(column: ArrayView1<'_, f64>, max_bins: usize) -> Vec<f64> {
    let mut distinct: Vec<f64> = column.iter().copied().collect();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup();

    if distinct.len() <= max_bins {
        return distinct
            .windows(2)
            .map(|pair| (pair[0] + pair[1]) / 2.0)
            .collect();
    }

    // Quantiles over the distinct values
    let m = distinct.len();
    (1..max_bins)
        .map(|i| {
            let k = i * m / max_bins;
            (distinct[k - 1] + distinct[k]) / 2.0
        })
        .collect()
}
