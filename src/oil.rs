//! Oil reservoir material balance engine
//!
//! Implements the generalized material balance equation
//!
//!   N = F / (Eo + m·Eg + Efw)
//!
//! where F is underground withdrawal and Eo/Eg/Efw are the oil, gas-cap and
//! water/formation expansion terms. Model state (PVT table, initial pressure,
//! gas-cap ratio m, cached initial properties) is fixed at construction; a
//! different m means a different model instance, never in-place mutation.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::{MbalError, Result};
use crate::pvt::{PvtProperty, PvtTable};
use crate::stats::{self, BatchEstimate};
use crate::units::{self, UnitSystem};

/// Fallback water/formation compressibility when the PVT table carries no
/// cw/cf columns (1/(kgf/cm²)). Applying it is logged as a configuration
/// warning; supply measured columns to silence it.
pub const DEFAULT_COMPRESSIBILITY: f64 = 43e-6;

/// Initial (connate) water saturation used in the Efw term.
pub const INITIAL_WATER_SATURATION: f64 = 0.2;

/// Cumulative oil production history, unit-normalised to metric at
/// construction. All arrays share one length; one entry per survey date.
#[derive(Debug, Clone)]
pub struct ProductionHistory {
    time: Vec<f64>,
    np: Vec<f64>,
    gp: Vec<f64>,
    wp: Vec<f64>,
    pressure: Vec<f64>,
}

impl ProductionHistory {
    /// Build a history from parallel series in the declared unit system.
    ///
    /// Rejects mismatched lengths, negative values, and non-monotonic time or
    /// cumulative production (cumulative series cannot decrease).
    pub fn new(
        time: Vec<f64>,
        np: Vec<f64>,
        gp: Vec<f64>,
        wp: Vec<f64>,
        pressure: Vec<f64>,
        unit_system: UnitSystem,
    ) -> Result<Self> {
        let n = time.len();
        if np.len() != n || gp.len() != n || wp.len() != n || pressure.len() != n {
            return Err(MbalError::Configuration(format!(
                "production history arrays disagree in length: time {n}, Np {}, Gp {}, Wp {}, pressure {}",
                np.len(),
                gp.len(),
                wp.len(),
                pressure.len()
            )));
        }

        validate_series("time", &time, true)?;
        validate_series("Np", &np, true)?;
        validate_series("Gp", &gp, true)?;
        validate_series("Wp", &wp, true)?;
        validate_series("pressure", &pressure, false)?;

        Ok(Self {
            time,
            np: units::oil_volume_slice_to_metric(&np, unit_system),
            gp: units::gas_volume_slice_to_metric(&gp, unit_system),
            wp: units::oil_volume_slice_to_metric(&wp, unit_system),
            pressure: units::pressure_slice_to_metric(&pressure, unit_system),
        })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Cumulative oil produced (m³ std).
    pub fn np(&self) -> &[f64] {
        &self.np
    }

    /// Cumulative gas produced (m³ std).
    pub fn gp(&self) -> &[f64] {
        &self.gp
    }

    /// Cumulative water produced (m³ std).
    pub fn wp(&self) -> &[f64] {
        &self.wp
    }

    /// Average reservoir pressure (kgf/cm²).
    pub fn pressure(&self) -> &[f64] {
        &self.pressure
    }
}

/// Shared validation for history series: non-negative, optionally monotonic
/// non-decreasing (time and cumulative volumes).
pub(crate) fn validate_series(name: &str, values: &[f64], monotonic: bool) -> Result<()> {
    if values.iter().any(|v| *v < 0.0 || !v.is_finite()) {
        return Err(MbalError::Configuration(format!(
            "`{name}` series contains negative or non-finite values"
        )));
    }
    if monotonic && values.windows(2).any(|w| w[1] < w[0]) {
        return Err(MbalError::Configuration(format!(
            "`{name}` series must be monotonically non-decreasing"
        )));
    }
    Ok(())
}

/// Construction parameters for [`OilReservoir`], in the declared unit system.
#[derive(Debug, Clone, Copy)]
pub struct OilReservoirConfig {
    /// Initial reservoir pressure (kgf/cm² metric, psia field).
    pub initial_pressure: f64,
    /// Reservoir temperature (°C metric, °F field).
    pub temperature: f64,
    /// Gas-cap ratio m = initial gas-cap reservoir volume / initial oil
    /// reservoir volume. 0 for undersaturated reservoirs.
    pub m: f64,
    /// Whether aquifer influx is considered (We supplied per point).
    pub aquifer_influx: bool,
    pub unit_system: UnitSystem,
}

impl Default for OilReservoirConfig {
    fn default() -> Self {
        Self {
            initial_pressure: 0.0,
            temperature: 0.0,
            m: 0.0,
            aquifer_influx: false,
            unit_system: UnitSystem::Metric,
        }
    }
}

/// Expansion terms of the material balance equation, per unit of original
/// oil in place (m³/m³ std).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExpansionTerms {
    /// Oil plus liberated-gas expansion.
    pub eo: f64,
    /// Gas-cap expansion (zero when the model has no gas cap).
    pub eg: f64,
    /// Connate-water and pore-compaction expansion.
    pub efw: f64,
}

impl ExpansionTerms {
    /// Total expansion Et = Eo + m·Eg + Efw for a given gas-cap ratio.
    pub fn total(&self, m: f64) -> f64 {
        self.eo + m * self.eg + self.efw
    }
}

/// Per-point material balance breakdown for reporting collaborators
/// (the F-vs-Et straight-line data).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MaterialBalancePoint {
    /// Reservoir pressure at the point (kgf/cm²).
    pub pressure: f64,
    pub eo: f64,
    pub eg: f64,
    pub efw: f64,
    /// Total expansion Et = Eo + m·Eg + Efw.
    pub et: f64,
    /// Underground withdrawal F (m³).
    pub f: f64,
}

/// Oil material balance calculator.
///
/// Initial properties (Boi, Rsi, and Bgi when gas FVF data exists) are
/// interpolated at the initial pressure once, at construction, and cached
/// for the model's lifetime.
#[derive(Debug, Clone)]
pub struct OilReservoir {
    pvt: Arc<PvtTable>,
    initial_pressure: f64,
    temperature_k: f64,
    m: f64,
    aquifer_influx: bool,
    boi: f64,
    rsi: f64,
    bgi: Option<f64>,
}

impl OilReservoir {
    /// Build a model over a shared PVT table.
    ///
    /// Fails when Bo or Rs is missing from the table (both are required to
    /// cache the initial oil properties) or when m is negative.
    pub fn new(pvt: Arc<PvtTable>, config: OilReservoirConfig) -> Result<Self> {
        if config.m < 0.0 {
            return Err(MbalError::Configuration(format!(
                "gas-cap ratio m must be non-negative, got {}",
                config.m
            )));
        }

        let pi = units::pressure_to_metric(config.initial_pressure, config.unit_system);
        let temperature_k = units::temperature_to_kelvin(config.temperature, config.unit_system);

        let boi = pvt.interpolate(PvtProperty::OilFvf, pi)?;
        let rsi = pvt.interpolate(PvtProperty::SolutionGor, pi)?;
        let bgi = if pvt.has(PvtProperty::GasFvf) {
            Some(pvt.interpolate(PvtProperty::GasFvf, pi)?)
        } else {
            None
        };

        Ok(Self {
            pvt,
            initial_pressure: pi,
            temperature_k,
            m: config.m,
            aquifer_influx: config.aquifer_influx,
            boi,
            rsi,
            bgi,
        })
    }

    /// Initial reservoir pressure (kgf/cm²).
    pub fn initial_pressure(&self) -> f64 {
        self.initial_pressure
    }

    /// Reservoir temperature (K).
    pub fn temperature_k(&self) -> f64 {
        self.temperature_k
    }

    /// Gas-cap ratio the model was built with.
    pub fn m(&self) -> f64 {
        self.m
    }

    pub fn aquifer_influx(&self) -> bool {
        self.aquifer_influx
    }

    /// Cached initial oil FVF.
    pub fn boi(&self) -> f64 {
        self.boi
    }

    /// Cached initial solution GOR.
    pub fn rsi(&self) -> f64 {
        self.rsi
    }

    /// Cached initial gas FVF, when the table carries Bg.
    pub fn bgi(&self) -> Option<f64> {
        self.bgi
    }

    /// Raw gas-cap expansion Boi·(Bg/Bgi − 1) at a pressure, independent of m.
    ///
    /// `None` when the table has no gas FVF data. The calibration search uses
    /// this directly; [`Self::expansion_terms`] gates it on m > 0.
    pub fn gas_cap_expansion(&self, pressure: f64) -> Option<f64> {
        let bgi = self.bgi?;
        let bg = self.pvt.interpolate(PvtProperty::GasFvf, pressure).ok()?;
        Some(self.boi * (bg / bgi - 1.0))
    }

    /// Expansion terms (Eo, Eg, Efw) at a reservoir pressure (kgf/cm²).
    ///
    /// Missing cw/cf columns fall back to [`DEFAULT_COMPRESSIBILITY`] with a
    /// logged configuration warning.
    pub fn expansion_terms(&self, pressure: f64) -> Result<ExpansionTerms> {
        let props = self.pvt.properties_at(pressure);
        let bo = props.bo.ok_or(MbalError::MissingProperty { property: "Bo" })?;
        let rs = props.rs.ok_or(MbalError::MissingProperty { property: "Rs" })?;
        let bg = props.bg.unwrap_or(0.0);

        let eo = (bo - self.boi) + (self.rsi - rs) * bg;

        let eg = if self.m > 0.0 {
            self.gas_cap_expansion(pressure).unwrap_or(0.0)
        } else {
            0.0
        };

        let cw = props.cw.unwrap_or_else(|| {
            warn!(
                pressure,
                default = DEFAULT_COMPRESSIBILITY,
                "water compressibility (cw) absent from PVT table, using default"
            );
            DEFAULT_COMPRESSIBILITY
        });
        let cf = props.cf.unwrap_or_else(|| {
            warn!(
                pressure,
                default = DEFAULT_COMPRESSIBILITY,
                "formation compressibility (cf) absent from PVT table, using default"
            );
            DEFAULT_COMPRESSIBILITY
        });

        let delta_p = self.initial_pressure - pressure;
        let efw =
            (1.0 + self.m) * self.boi * (cw * INITIAL_WATER_SATURATION + cf) * delta_p;

        Ok(ExpansionTerms { eo, eg, efw })
    }

    /// Underground withdrawal F = Np·Bo + (Gp − Np·Rs)·Bg + Wp·Bw − We (m³).
    pub fn withdrawal(&self, np: f64, gp: f64, wp: f64, pressure: f64, we: f64) -> Result<f64> {
        let props = self.pvt.properties_at(pressure);
        let bo = props.bo.ok_or(MbalError::MissingProperty { property: "Bo" })?;
        let rs = props.rs.ok_or(MbalError::MissingProperty { property: "Rs" })?;
        let bg = props.bg.unwrap_or(0.0);
        let bw = props.bw.unwrap_or(1.0);

        Ok(np * bo + (gp - np * rs) * bg + wp * bw - we)
    }

    /// Solve for initial oil in place from one production point (all volumes
    /// m³ std, pressure kgf/cm²).
    ///
    /// Fails with a domain error when the total expansion is non-positive -
    /// typically no measurable pressure decline or inconsistent PVT data.
    pub fn stoiip(&self, np: f64, gp: f64, wp: f64, pressure: f64, we: f64) -> Result<f64> {
        let f = self.withdrawal(np, gp, wp, pressure, we)?;
        let terms = self.expansion_terms(pressure)?;
        let et = terms.total(self.m);

        if et <= 0.0 {
            return Err(MbalError::Domain(format!(
                "total expansion is non-positive ({et}) at pressure {pressure}; \
                 check pressure decline and PVT data"
            )));
        }

        Ok(f / et)
    }

    /// Solve for initial oil in place at every point of a production history.
    ///
    /// Per-point domain failures are logged and marked NaN; the batch fails
    /// only when zero points are valid. `we` supplies per-point aquifer
    /// influx (m³) and must match the history length when given.
    pub fn stoiip_batch(
        &self,
        history: &ProductionHistory,
        we: Option<&[f64]>,
    ) -> Result<BatchEstimate> {
        let we = check_we(we, history.len())?;

        let estimates: Vec<f64> = (0..history.len())
            .map(|i| {
                let influx = we.map_or(0.0, |w| w[i]);
                match self.stoiip(
                    history.np[i],
                    history.gp[i],
                    history.wp[i],
                    history.pressure[i],
                    influx,
                ) {
                    Ok(n) => n,
                    Err(e) => {
                        warn!(point = i, pressure = history.pressure[i], error = %e,
                              "skipping invalid STOIIP point");
                        f64::NAN
                    }
                }
            })
            .collect();

        let statistics = stats::summarize(&estimates)?;
        Ok(BatchEstimate {
            estimates,
            statistics,
        })
    }

    /// Per-point (Eo, Eg, Efw, Et, F) breakdown across a production history,
    /// the data behind the classic F-vs-Et straight-line plot.
    pub fn material_balance_points(
        &self,
        history: &ProductionHistory,
        we: Option<&[f64]>,
    ) -> Result<Vec<MaterialBalancePoint>> {
        let we = check_we(we, history.len())?;

        (0..history.len())
            .map(|i| {
                let p = history.pressure[i];
                let influx = we.map_or(0.0, |w| w[i]);
                let terms = self.expansion_terms(p)?;
                let f = self.withdrawal(history.np[i], history.gp[i], history.wp[i], p, influx)?;
                Ok(MaterialBalancePoint {
                    pressure: p,
                    eo: terms.eo,
                    eg: terms.eg,
                    efw: terms.efw,
                    et: terms.total(self.m),
                    f,
                })
            })
            .collect()
    }
}

/// Validate an optional per-point water influx slice against the batch length.
pub(crate) fn check_we(we: Option<&[f64]>, n: usize) -> Result<Option<&[f64]>> {
    if let Some(w) = we {
        if w.len() != n {
            return Err(MbalError::Configuration(format!(
                "water influx array has {} values but the history has {n} points",
                w.len()
            )));
        }
    }
    Ok(we)
}
