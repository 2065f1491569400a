//! Gas reservoir material balance engine
//!
//! Two routes to initial gas in place:
//! - standard MBE: dry-gas form G = Gp / (Bg/Bgi − 1), or the water-influx
//!   form G = (Gp·Bg − We + Wp·Bw) / (Bg − Bgi)
//! - P/Z method: G = Gp / (1 − (p/z)/(Pi/Zi))
//!
//! Both are ill-conditioned until the pressure has moved measurably from
//! initial; denominators below 1e-10 are rejected as domain errors rather
//! than allowed to blow up the estimate.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::{MbalError, Result};
use crate::oil::{check_we, validate_series};
use crate::pvt::{PvtProperty, PvtTable};
use crate::stats::{self, BatchEstimate};
use crate::units::{self, UnitSystem};

/// Denominator magnitude below which the MBE is considered ill-conditioned.
const MIN_DENOMINATOR: f64 = 1e-10;

/// Which material balance formulation a batch solve uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GasMbeMethod {
    /// Volumetric form (dry-gas or water-influx variant as applicable).
    Standard,
    /// P/Z straight-line method.
    PressureOverZ,
}

/// Cumulative gas production history, unit-normalised to metric at
/// construction.
#[derive(Debug, Clone)]
pub struct GasProductionHistory {
    time: Vec<f64>,
    gp: Vec<f64>,
    wp: Vec<f64>,
    pressure: Vec<f64>,
}

impl GasProductionHistory {
    /// Build a history from parallel series in the declared unit system.
    /// Same validation rules as the oil history.
    pub fn new(
        time: Vec<f64>,
        gp: Vec<f64>,
        wp: Vec<f64>,
        pressure: Vec<f64>,
        unit_system: UnitSystem,
    ) -> Result<Self> {
        let n = time.len();
        if gp.len() != n || wp.len() != n || pressure.len() != n {
            return Err(MbalError::Configuration(format!(
                "gas production history arrays disagree in length: time {n}, Gp {}, Wp {}, pressure {}",
                gp.len(),
                wp.len(),
                pressure.len()
            )));
        }

        validate_series("time", &time, true)?;
        validate_series("Gp", &gp, true)?;
        validate_series("Wp", &wp, true)?;
        validate_series("pressure", &pressure, false)?;

        Ok(Self {
            time,
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

/// Construction parameters for [`GasReservoir`], in the declared unit system.
#[derive(Debug, Clone, Copy)]
pub struct GasReservoirConfig {
    /// Initial reservoir pressure (kgf/cm² metric, psia field).
    pub initial_pressure: f64,
    /// Reservoir temperature (°C metric, °F field).
    pub temperature: f64,
    /// Whether aquifer influx is considered.
    pub aquifer_influx: bool,
    pub unit_system: UnitSystem,
}

impl Default for GasReservoirConfig {
    fn default() -> Self {
        Self {
            initial_pressure: 0.0,
            temperature: 0.0,
            aquifer_influx: false,
            unit_system: UnitSystem::Metric,
        }
    }
}

/// One point of the P/Z decline, for reporting collaborators.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PzPoint {
    /// Cumulative gas produced (m³ std).
    pub gp: f64,
    /// Reservoir pressure (kgf/cm²).
    pub pressure: f64,
    /// Pressure over Z-factor (kgf/cm²).
    pub p_over_z: f64,
}

/// Gas material balance calculator.
///
/// Both Bgi and Zi are interpolated at the initial pressure and cached at
/// construction; a table without Bg or z cannot back a gas model.
#[derive(Debug, Clone)]
pub struct GasReservoir {
    pvt: Arc<PvtTable>,
    initial_pressure: f64,
    temperature_k: f64,
    aquifer_influx: bool,
    bgi: f64,
    zi: f64,
}

impl GasReservoir {
    /// Build a model over a shared PVT table.
    pub fn new(pvt: Arc<PvtTable>, config: GasReservoirConfig) -> Result<Self> {
        let pi = units::pressure_to_metric(config.initial_pressure, config.unit_system);
        let temperature_k = units::temperature_to_kelvin(config.temperature, config.unit_system);

        let bgi = pvt.interpolate(PvtProperty::GasFvf, pi)?;
        let zi = pvt.interpolate(PvtProperty::ZFactor, pi)?;

        Ok(Self {
            pvt,
            initial_pressure: pi,
            temperature_k,
            aquifer_influx: config.aquifer_influx,
            bgi,
            zi,
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

    /// Cached initial gas FVF.
    pub fn bgi(&self) -> f64 {
        self.bgi
    }

    /// Cached initial Z-factor.
    pub fn zi(&self) -> f64 {
        self.zi
    }

    /// Initial P/Z (kgf/cm²).
    pub fn initial_p_over_z(&self) -> f64 {
        self.initial_pressure / self.zi
    }

    /// Solve for initial gas in place, standard method.
    ///
    /// Uses the water-influx form when the model considers an aquifer or any
    /// of Wp/We is nonzero, the dry-gas form otherwise. Fails with a domain
    /// error when the denominator is too small to be trustworthy.
    pub fn giip(&self, gp: f64, pressure: f64, wp: f64, we: f64) -> Result<f64> {
        let props = self.pvt.properties_at(pressure);
        let bg = props.bg.ok_or(MbalError::MissingProperty { property: "Bg" })?;
        let bw = props.bw.unwrap_or(1.0);

        let (numerator, denominator) = if self.aquifer_influx || we > 0.0 || wp > 0.0 {
            (gp * bg - we + wp * bw, bg - self.bgi)
        } else {
            (gp, bg / self.bgi - 1.0)
        };

        if denominator.abs() < MIN_DENOMINATOR {
            return Err(MbalError::Domain(format!(
                "GIIP denominator is too small ({denominator:e}) at pressure {pressure}; \
                 pressure has not declined measurably from initial"
            )));
        }

        Ok(numerator / denominator)
    }

    /// Solve for initial gas in place with the P/Z method.
    ///
    /// `z` overrides the table interpolation at `pressure` when supplied.
    pub fn giip_pz(&self, gp: f64, pressure: f64, z: Option<f64>) -> Result<f64> {
        let z = match z {
            Some(z) => z,
            None => self.pvt.interpolate(PvtProperty::ZFactor, pressure)?,
        };

        let pz = pressure / z;
        let pzi = self.initial_p_over_z();

        if (pzi - pz).abs() < MIN_DENOMINATOR {
            return Err(MbalError::Domain(format!(
                "P/Z ({pz}) has not diverged from initial ({pzi}); more pressure decline needed"
            )));
        }

        Ok(gp / (1.0 - pz / pzi))
    }

    /// Solve for initial gas in place at every point of a production history.
    ///
    /// Same partial-failure contract as the oil batch solver: bad points are
    /// warn-logged and NaN-marked; only an all-invalid batch is fatal.
    pub fn giip_batch(
        &self,
        history: &GasProductionHistory,
        we: Option<&[f64]>,
        method: GasMbeMethod,
    ) -> Result<BatchEstimate> {
        let we = check_we(we, history.len())?;

        let estimates: Vec<f64> = (0..history.len())
            .map(|i| {
                let influx = we.map_or(0.0, |w| w[i]);
                let result = match method {
                    GasMbeMethod::Standard => {
                        self.giip(history.gp[i], history.pressure[i], history.wp[i], influx)
                    }
                    GasMbeMethod::PressureOverZ => {
                        self.giip_pz(history.gp[i], history.pressure[i], None)
                    }
                };
                match result {
                    Ok(g) => g,
                    Err(e) => {
                        warn!(point = i, pressure = history.pressure[i], error = %e,
                              "skipping invalid GIIP point");
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

    /// P/Z decline data across a history, for the classic straight-line plot.
    pub fn pz_points(&self, history: &GasProductionHistory) -> Result<Vec<PzPoint>> {
        (0..history.len())
            .map(|i| {
                let p = history.pressure[i];
                let z = self.pvt.interpolate(PvtProperty::ZFactor, p)?;
                Ok(PzPoint {
                    gp: history.gp[i],
                    pressure: p,
                    p_over_z: p / z,
                })
            })
            .collect()
    }
}
