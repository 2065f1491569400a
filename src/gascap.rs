//! Gas-cap ratio calibration by the Havlena-Odeh straight-line method
//!
//! At the correct gas-cap ratio m, underground withdrawal F is an exact
//! linear function of the combined expansion Eo + m·Eg across all production
//! points. The search therefore evaluates a candidate grid of m values,
//! fits F = slope·(Eo + m·Eg) + intercept by least squares for each, and
//! keeps the candidate with the highest R².
//!
//! Eo, Eg and F depend only on pressure, so they are computed once; the grid
//! evaluation itself is embarrassingly parallel and runs on rayon. Selection
//! then scans the curve in grid order so that ties go to the first (lowest)
//! candidate - supply grids low-to-high.

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::{MbalError, Result};
use crate::oil::{OilReservoir, OilReservoirConfig, ProductionHistory};
use crate::pvt::PvtTable;
use crate::stats;

/// One candidate of the calibration curve.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GasCapCandidate {
    pub m: f64,
    pub r_squared: f64,
}

/// Outcome of a gas-cap ratio search.
#[derive(Debug, Clone, Serialize)]
pub struct GasCapSearchResult {
    /// R²-maximizing candidate (first occurrence on ties).
    pub optimal_m: f64,
    /// R² at the optimal candidate.
    pub r_squared: f64,
    /// The full (m, R²) curve in grid order, for inspection.
    pub curve: Vec<GasCapCandidate>,
}

/// Grid-search the gas-cap ratio m over a candidate grid.
///
/// `config.m` is ignored; the reference model only supplies the
/// pressure-dependent Eo, Eg and F series, which are independent of m. The
/// PVT table must carry gas FVF data, otherwise there is no gas-cap
/// expansion to calibrate against.
///
/// With fewer than 2 production points every candidate scores R² = 0 (the
/// fit has no discriminating power); the first grid candidate is returned.
pub fn gas_cap_search(
    pvt: Arc<PvtTable>,
    config: OilReservoirConfig,
    history: &ProductionHistory,
    m_grid: &[f64],
) -> Result<GasCapSearchResult> {
    if m_grid.is_empty() {
        return Err(MbalError::Configuration(
            "gas-cap search requires a non-empty candidate grid".to_string(),
        ));
    }

    let reference = OilReservoir::new(pvt, OilReservoirConfig { m: 0.0, ..config })?;
    if reference.bgi().is_none() {
        return Err(MbalError::Configuration(
            "gas-cap search requires gas FVF (Bg) data in the PVT table".to_string(),
        ));
    }

    // Per-point Eo, Eg and F, computed once - none of them depends on m.
    let mut eo = Vec::with_capacity(history.len());
    let mut eg = Vec::with_capacity(history.len());
    let mut f = Vec::with_capacity(history.len());
    for i in 0..history.len() {
        let p = history.pressure()[i];
        let terms = reference.expansion_terms(p)?;
        eo.push(terms.eo);
        eg.push(reference.gas_cap_expansion(p).unwrap_or(0.0));
        f.push(reference.withdrawal(
            history.np()[i],
            history.gp()[i],
            history.wp()[i],
            p,
            0.0,
        )?);
    }

    let curve: Vec<GasCapCandidate> = m_grid
        .par_iter()
        .map(|&m| {
            let e_total: Vec<f64> = eo.iter().zip(eg.iter()).map(|(&o, &g)| o + m * g).collect();
            let r_squared = stats::linear_fit(&e_total, &f)
                .map_or(0.0, |fit| fit.r_squared);
            GasCapCandidate { m, r_squared }
        })
        .collect();

    // In-order scan with strict improvement keeps the first of tied maxima.
    let mut best = curve[0];
    for candidate in &curve[1..] {
        if candidate.r_squared > best.r_squared {
            best = *candidate;
        }
    }

    debug!(
        optimal_m = best.m,
        r_squared = best.r_squared,
        candidates = curve.len(),
        "gas-cap ratio search finished"
    );

    Ok(GasCapSearchResult {
        optimal_m: best.m,
        r_squared: best.r_squared,
        curve,
    })
}
