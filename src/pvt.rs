//! Pressure-indexed PVT property table
//!
//! Owns parallel arrays of measured fluid properties keyed by pressure.
//! All inputs are normalised to metric units exactly once at construction;
//! after that the table is immutable and safe to share (engines hold it
//! behind an `Arc`). Lookups are linear interpolations over the pressure
//! axis, clamped flat at both ends of the sampled range.

use serde::Serialize;

use crate::error::{MbalError, Result};
use crate::units::{self, UnitSystem};

/// The fluid/rock properties a table can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PvtProperty {
    /// Bo - oil formation volume factor (m³/m³ std)
    OilFvf,
    /// Rs - solution gas-oil ratio (m³/m³ std)
    SolutionGor,
    /// co - oil compressibility (1/(kgf/cm²))
    OilCompressibility,
    /// Bg - gas formation volume factor (m³/m³ std)
    GasFvf,
    /// z - gas compressibility factor (dimensionless)
    ZFactor,
    /// cg - gas compressibility (1/(kgf/cm²))
    GasCompressibility,
    /// Bw - water formation volume factor (m³/m³ std)
    WaterFvf,
    /// cw - water compressibility (1/(kgf/cm²))
    WaterCompressibility,
    /// cf - formation (pore) compressibility (1/(kgf/cm²))
    FormationCompressibility,
}

impl PvtProperty {
    /// Conventional short name, used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::OilFvf => "Bo",
            Self::SolutionGor => "Rs",
            Self::OilCompressibility => "co",
            Self::GasFvf => "Bg",
            Self::ZFactor => "z",
            Self::GasCompressibility => "cg",
            Self::WaterFvf => "Bw",
            Self::WaterCompressibility => "cw",
            Self::FormationCompressibility => "cf",
        }
    }
}

/// Raw table input, in the declared unit system.
///
/// Pressure is required; every property series is optional but must match the
/// pressure array length. Pressure may be supplied ascending or descending.
#[derive(Debug, Clone, Default)]
pub struct PvtInput {
    pub pressure: Vec<f64>,
    pub unit_system: UnitSystem,
    pub bo: Option<Vec<f64>>,
    pub rs: Option<Vec<f64>>,
    pub co: Option<Vec<f64>>,
    pub bg: Option<Vec<f64>>,
    pub z: Option<Vec<f64>>,
    pub cg: Option<Vec<f64>>,
    pub bw: Option<Vec<f64>>,
    pub cw: Option<Vec<f64>>,
    pub cf: Option<Vec<f64>>,
}

/// Every supplied property interpolated at one pressure.
#[derive(Debug, Clone, Serialize)]
pub struct PvtSnapshot {
    /// Pressure the snapshot was taken at (kgf/cm²)
    pub pressure: f64,
    pub bo: Option<f64>,
    pub rs: Option<f64>,
    pub co: Option<f64>,
    pub bg: Option<f64>,
    pub z: Option<f64>,
    pub cg: Option<f64>,
    pub bw: Option<f64>,
    pub cw: Option<f64>,
    pub cf: Option<f64>,
}

/// Immutable, metric-normalised PVT table.
///
/// Internally the pressure axis is always ascending; descending input is
/// reversed (together with every property series) once at construction.
#[derive(Debug, Clone)]
pub struct PvtTable {
    pressure: Vec<f64>,
    bo: Option<Vec<f64>>,
    rs: Option<Vec<f64>>,
    co: Option<Vec<f64>>,
    bg: Option<Vec<f64>>,
    z: Option<Vec<f64>>,
    cg: Option<Vec<f64>>,
    bw: Option<Vec<f64>>,
    cw: Option<Vec<f64>>,
    cf: Option<Vec<f64>>,
}

impl PvtTable {
    /// Build a table from raw input, converting everything to metric once.
    ///
    /// Fails with a configuration error when the pressure array is empty or
    /// any property series disagrees with it in length.
    pub fn new(input: PvtInput) -> Result<Self> {
        if input.pressure.is_empty() {
            return Err(MbalError::Configuration(
                "PVT table requires a non-empty pressure array".to_string(),
            ));
        }

        let n = input.pressure.len();
        let check_len = |series: &Option<Vec<f64>>, name: &str| -> Result<()> {
            match series {
                Some(s) if s.len() != n => Err(MbalError::Configuration(format!(
                    "PVT property `{name}` has {} values but the pressure array has {n}",
                    s.len()
                ))),
                _ => Ok(()),
            }
        };
        check_len(&input.bo, "Bo")?;
        check_len(&input.rs, "Rs")?;
        check_len(&input.co, "co")?;
        check_len(&input.bg, "Bg")?;
        check_len(&input.z, "z")?;
        check_len(&input.cg, "cg")?;
        check_len(&input.bw, "Bw")?;
        check_len(&input.cw, "cw")?;
        check_len(&input.cf, "cf")?;

        let from = input.unit_system;
        let convert =
            |series: Option<Vec<f64>>, f: fn(f64, UnitSystem) -> f64| -> Option<Vec<f64>> {
                series.map(|s| s.iter().map(|&v| f(v, from)).collect())
            };

        let mut table = Self {
            pressure: units::pressure_slice_to_metric(&input.pressure, from),
            bo: convert(input.bo, units::oil_fvf_to_metric),
            rs: convert(input.rs, units::gor_to_metric),
            co: convert(input.co, units::compressibility_to_metric),
            bg: convert(input.bg, units::gas_fvf_to_metric),
            z: input.z, // dimensionless, no conversion
            cg: convert(input.cg, units::compressibility_to_metric),
            bw: convert(input.bw, units::water_fvf_to_metric),
            cw: convert(input.cw, units::compressibility_to_metric),
            cf: convert(input.cf, units::compressibility_to_metric),
        };

        // Interpolation wants an ascending pressure axis.
        if n > 1 && table.pressure[0] > table.pressure[n - 1] {
            table.pressure.reverse();
            for series in [
                &mut table.bo,
                &mut table.rs,
                &mut table.co,
                &mut table.bg,
                &mut table.z,
                &mut table.cg,
                &mut table.bw,
                &mut table.cw,
                &mut table.cf,
            ] {
                if let Some(s) = series {
                    s.reverse();
                }
            }
        }

        Ok(table)
    }

    fn series(&self, property: PvtProperty) -> Option<&[f64]> {
        match property {
            PvtProperty::OilFvf => self.bo.as_deref(),
            PvtProperty::SolutionGor => self.rs.as_deref(),
            PvtProperty::OilCompressibility => self.co.as_deref(),
            PvtProperty::GasFvf => self.bg.as_deref(),
            PvtProperty::ZFactor => self.z.as_deref(),
            PvtProperty::GasCompressibility => self.cg.as_deref(),
            PvtProperty::WaterFvf => self.bw.as_deref(),
            PvtProperty::WaterCompressibility => self.cw.as_deref(),
            PvtProperty::FormationCompressibility => self.cf.as_deref(),
        }
    }

    /// Whether the table carries the given property.
    pub fn has(&self, property: PvtProperty) -> bool {
        self.series(property).is_some()
    }

    /// Sampled pressure range (min, max), in kgf/cm².
    pub fn pressure_range(&self) -> (f64, f64) {
        // Constructor guarantees a non-empty ascending axis.
        (self.pressure[0], self.pressure[self.pressure.len() - 1])
    }

    /// Linearly interpolate one property at a target pressure (kgf/cm²).
    ///
    /// Outside the sampled range the nearest boundary value is held flat -
    /// no extrapolation. Fails when the property was never supplied.
    pub fn interpolate(&self, property: PvtProperty, pressure: f64) -> Result<f64> {
        let values = self
            .series(property)
            .ok_or(MbalError::MissingProperty { property: property.name() })?;

        Ok(interp_clamped(&self.pressure, values, pressure))
    }

    /// Snapshot of every supplied property interpolated at one pressure.
    pub fn properties_at(&self, pressure: f64) -> PvtSnapshot {
        let at = |series: &Option<Vec<f64>>| {
            series
                .as_deref()
                .map(|v| interp_clamped(&self.pressure, v, pressure))
        };
        PvtSnapshot {
            pressure,
            bo: at(&self.bo),
            rs: at(&self.rs),
            co: at(&self.co),
            bg: at(&self.bg),
            z: at(&self.z),
            cg: at(&self.cg),
            bw: at(&self.bw),
            cw: at(&self.cw),
            cf: at(&self.cf),
        }
    }
}

/// Piecewise-linear interpolation over an ascending axis, clamped at both ends.
fn interp_clamped(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    if x <= xs[0] {
        return ys[0];
    }
    let last = xs.len() - 1;
    if x >= xs[last] {
        return ys[last];
    }

    // First index with xs[i] >= x; the clamp above guarantees 1..=last.
    let hi = xs.partition_point(|&v| v < x);
    let lo = hi - 1;
    if xs[hi] == x {
        return ys[hi];
    }

    let t = (x - xs[lo]) / (xs[hi] - xs[lo]);
    ys[lo] + t * (ys[hi] - ys[lo])
}
