//! Summary statistics and least-squares fitting for batch estimates
//!
//! Batch material balance solves produce one volume estimate per production
//! point, with NaN marking points where the computation was physically
//! degenerate. This module reduces such an array to the summary record owed
//! to reporting collaborators and provides the ordinary least-squares line
//! fit used by the gas-cap calibration search.

use serde::Serialize;
use statrs::statistics::{Data, Median, Statistics};

use crate::error::{MbalError, Result};

/// Aggregate statistics over the valid (finite) entries of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateStatistics {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation over valid points.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Number of points that produced a finite estimate.
    pub valid_count: usize,
    /// std_dev / mean; +∞ when the mean is zero.
    pub coefficient_of_variation: f64,
}

/// Per-point estimates (order preserved, NaN marks failed points) plus their
/// aggregate statistics. Computed fresh on every batch call.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEstimate {
    pub estimates: Vec<f64>,
    pub statistics: EstimateStatistics,
}

/// Reduce a batch estimate array to summary statistics.
///
/// Non-finite entries are excluded. Fails with the aggregate error when no
/// entry at all is valid.
pub fn summarize(estimates: &[f64]) -> Result<EstimateStatistics> {
    let valid: Vec<f64> = estimates.iter().copied().filter(|v| v.is_finite()).collect();

    if valid.is_empty() {
        return Err(MbalError::EmptyBatch {
            attempted: estimates.len(),
        });
    }

    let mean = (&valid).mean();
    let std_dev = (&valid).population_std_dev();
    let min = (&valid).min();
    let max = (&valid).max();
    let median = Data::new(valid.clone()).median();

    let coefficient_of_variation = if mean == 0.0 {
        f64::INFINITY
    } else {
        std_dev / mean
    };

    Ok(EstimateStatistics {
        mean,
        median,
        std_dev,
        min,
        max,
        valid_count: valid.len(),
        coefficient_of_variation,
    })
}

/// Ordinary least-squares line through (x, y) pairs.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, 1 - SSres/SStot.
    pub r_squared: f64,
}

/// Fit y = slope·x + intercept by least squares.
///
/// Returns `None` when fewer than 2 points are given or the x values carry
/// no variance (vertical data, slope undefined). A flat y (zero total sum of
/// squares) yields R² = 0 rather than a division blow-up.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    let mut ss_tot = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        sum_xy += (xi - x_mean) * (yi - y_mean);
        sum_xx += (xi - x_mean) * (xi - x_mean);
        ss_tot += (yi - y_mean) * (yi - y_mean);
    }

    if sum_xx.abs() < 1e-30 {
        return None;
    }

    let slope = sum_xy / sum_xx;
    let intercept = y_mean - slope * x_mean;

    let r_squared = if ss_tot.abs() < 1e-30 {
        0.0
    } else {
        let ss_res: f64 = x
            .iter()
            .zip(y.iter())
            .map(|(&xi, &yi)| {
                let fit = slope * xi + intercept;
                (yi - fit) * (yi - fit)
            })
            .sum();
        1.0 - ss_res / ss_tot
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}
