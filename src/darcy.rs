//! Steady-state radial Darcy flow
//!
//! Radial flow equation for a vertical well draining a cylindrical volume:
//!
//!   q = C · k · h · (Pe − Pwf) / (μ · Bo · (ln(re/rw) + S))
//!
//! with C = 0.543439 for metric inputs (m³/day, kgf/cm², m) and
//! C = 0.007082153 for field inputs (STB/day, psia, ft).
//!
//! The calculation is driven by what is known: either the flow rate (solve
//! for the drawdown, optionally anchored to one boundary pressure) or both
//! boundary pressures (solve for the rate). The two cases are a sum type, so
//! an over-specified input cannot be expressed.

use serde::Serialize;

use crate::error::{MbalError, Result};
use crate::units::UnitSystem;

/// Rate constant for metric units (q in m³/day, dP in kgf/cm², h/re/rw in m).
pub const RATE_CONSTANT_METRIC: f64 = 0.543439;
/// Rate constant for field units (q in STB/day, dP in psi, h/re/rw in ft).
pub const RATE_CONSTANT_FIELD: f64 = 0.007082153;

/// What the caller knows about the flow; the complement is solved for.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum FlowSpec {
    /// Flow rate is known; drawdown is computed. An optional anchor pins one
    /// boundary pressure so the other can be reported too.
    KnownRate {
        q: f64,
        anchor: Option<PressureAnchor>,
    },
    /// Both boundary pressures are known; the rate is computed.
    KnownPressures { pe: f64, pwf: f64 },
}

/// One known boundary pressure accompanying a known rate.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum PressureAnchor {
    /// Outer boundary pressure Pe.
    Outer(f64),
    /// Bottomhole flowing pressure Pwf.
    Bottomhole(f64),
}

/// Static well/reservoir parameters of the radial flow problem.
#[derive(Debug, Clone, Copy)]
pub struct DarcyWellParameters {
    /// Permeability (mD).
    pub k: f64,
    /// Net thickness (m metric, ft field).
    pub h: f64,
    /// Oil viscosity (cp).
    pub mu: f64,
    /// Oil formation volume factor.
    pub bo: f64,
    /// Drainage radius (m metric, ft field).
    pub re: f64,
    /// Wellbore radius (same unit as `re`).
    pub rw: f64,
    /// Skin factor (0 = undamaged).
    pub skin: f64,
    pub unit_system: UnitSystem,
}

/// Complete solution of one radial flow problem. Every call returns the full
/// record; nothing is cached between calls.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DarcyFlowResult {
    /// Flow rate (m³/day or STB/day).
    pub q: f64,
    /// Drawdown Pe − Pwf.
    pub drawdown: f64,
    /// Outer boundary pressure, when known or derivable.
    pub pe: Option<f64>,
    /// Bottomhole flowing pressure, when known or derivable.
    pub pwf: Option<f64>,
    /// Productivity index q / drawdown.
    pub productivity_index: f64,
    /// Extra pressure drop attributable to skin.
    pub skin_pressure_drop: f64,
    /// Drawdown an undamaged (S = 0) well would need for the same rate.
    pub ideal_drawdown: f64,
    /// Geometric term ln(re/rw) + S.
    pub geometry_term: f64,
}

/// Radial Darcy flow calculator over validated well parameters.
#[derive(Debug, Clone, Copy)]
pub struct DarcyRadialFlow {
    params: DarcyWellParameters,
    constant: f64,
}

impl DarcyRadialFlow {
    /// Validate parameters and build a calculator.
    ///
    /// Positivity violations are configuration errors; the radius ordering
    /// re > rw is a domain constraint of the radial geometry.
    pub fn new(params: DarcyWellParameters) -> Result<Self> {
        let positive = [
            ("permeability k", params.k),
            ("thickness h", params.h),
            ("viscosity mu", params.mu),
            ("formation volume factor Bo", params.bo),
            ("drainage radius re", params.re),
            ("well radius rw", params.rw),
        ];
        for (name, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(MbalError::Configuration(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if params.re <= params.rw {
            return Err(MbalError::Domain(format!(
                "drainage radius ({}) must exceed well radius ({})",
                params.re, params.rw
            )));
        }

        let constant = match params.unit_system {
            UnitSystem::Metric => RATE_CONSTANT_METRIC,
            UnitSystem::Field => RATE_CONSTANT_FIELD,
        };
        Ok(Self { params, constant })
    }

    /// ln(re/rw) + S.
    fn geometry_term(&self) -> f64 {
        (self.params.re / self.params.rw).ln() + self.params.skin
    }

    /// Transmissibility group C·k·h / (μ·Bo).
    fn conductance(&self) -> f64 {
        self.constant * self.params.k * self.params.h / (self.params.mu * self.params.bo)
    }

    /// Solve the radial flow problem for the given specification.
    pub fn solve(&self, spec: FlowSpec) -> Result<DarcyFlowResult> {
        match spec {
            FlowSpec::KnownPressures { pe, pwf } => self.solve_rate(pe, pwf),
            FlowSpec::KnownRate { q, anchor } => self.solve_drawdown(q, anchor),
        }
    }

    fn solve_rate(&self, pe: f64, pwf: f64) -> Result<DarcyFlowResult> {
        if pe <= 0.0 || pwf <= 0.0 {
            return Err(MbalError::Configuration(format!(
                "boundary pressures must be positive, got Pe = {pe}, Pwf = {pwf}"
            )));
        }
        if pe <= pwf {
            return Err(MbalError::Domain(format!(
                "outer boundary pressure ({pe}) must exceed bottomhole pressure ({pwf}) \
                 for inflow"
            )));
        }

        let drawdown = pe - pwf;
        let geometry = self.geometry_term();
        let q = self.conductance() * drawdown / geometry;

        Ok(self.assemble(q, drawdown, Some(pe), Some(pwf), geometry))
    }

    fn solve_drawdown(&self, q: f64, anchor: Option<PressureAnchor>) -> Result<DarcyFlowResult> {
        if q <= 0.0 || !q.is_finite() {
            return Err(MbalError::Configuration(format!(
                "flow rate must be positive and finite, got {q}"
            )));
        }

        let geometry = self.geometry_term();
        let drawdown = q * geometry / self.conductance();

        let (pe, pwf) = match anchor {
            Some(PressureAnchor::Outer(pe)) => {
                let pwf = pe - drawdown;
                if pwf < 0.0 {
                    return Err(MbalError::Domain(format!(
                        "computed bottomhole pressure is negative ({pwf:.2}); \
                         the rate is too high for the given conditions"
                    )));
                }
                (Some(pe), Some(pwf))
            }
            Some(PressureAnchor::Bottomhole(pwf)) => (Some(pwf + drawdown), Some(pwf)),
            None => (None, None),
        };

        Ok(self.assemble(q, drawdown, pe, pwf, geometry))
    }

    fn assemble(
        &self,
        q: f64,
        drawdown: f64,
        pe: Option<f64>,
        pwf: Option<f64>,
        geometry_term: f64,
    ) -> DarcyFlowResult {
        let conductance = self.conductance();
        DarcyFlowResult {
            q,
            drawdown,
            pe,
            pwf,
            productivity_index: if drawdown > 0.0 { q / drawdown } else { 0.0 },
            skin_pressure_drop: q * self.params.skin / conductance,
            ideal_drawdown: q * (self.params.re / self.params.rw).ln() / conductance,
            geometry_term,
        }
    }

    /// Sweep one parameter over a range of values, re-validating each case.
    ///
    /// Failed cases are NaN-marked so the sweep arrays stay parallel to the
    /// input values.
    pub fn sensitivity(
        &self,
        vary: SweepParameter,
        values: &[f64],
        spec: FlowSpec,
    ) -> SweepResult {
        let mut q = Vec::with_capacity(values.len());
        let mut drawdown = Vec::with_capacity(values.len());
        let mut productivity_index = Vec::with_capacity(values.len());

        for &value in values {
            let mut params = self.params;
            match vary {
                SweepParameter::Permeability => params.k = value,
                SweepParameter::Thickness => params.h = value,
                SweepParameter::Skin => params.skin = value,
                SweepParameter::Viscosity => params.mu = value,
            }

            match Self::new(params).and_then(|flow| flow.solve(spec)) {
                Ok(result) => {
                    q.push(result.q);
                    drawdown.push(result.drawdown);
                    productivity_index.push(result.productivity_index);
                }
                Err(_) => {
                    q.push(f64::NAN);
                    drawdown.push(f64::NAN);
                    productivity_index.push(f64::NAN);
                }
            }
        }

        SweepResult {
            values: values.to_vec(),
            q,
            drawdown,
            productivity_index,
        }
    }
}

/// Parameter varied by a sensitivity sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepParameter {
    Permeability,
    Thickness,
    Skin,
    Viscosity,
}

/// Sensitivity sweep output, parallel arrays in input order.
#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub values: Vec<f64>,
    pub q: Vec<f64>,
    pub drawdown: Vec<f64>,
    pub productivity_index: Vec<f64>,
}

/// Drainage radius of a circular drainage area (m² metric, acres field).
pub fn drainage_radius(area: f64, unit_system: UnitSystem) -> f64 {
    match unit_system {
        UnitSystem::Field => {
            // 1 acre = 43560 ft²
            (area * 43560.0 / std::f64::consts::PI).sqrt()
        }
        UnitSystem::Metric => (area / std::f64::consts::PI).sqrt(),
    }
}

/// Skin factor from a measured versus ideal drawdown at a known rate.
pub fn skin_from_drawdown(
    k: f64,
    h: f64,
    q: f64,
    dp_actual: f64,
    dp_ideal: f64,
    mu: f64,
    bo: f64,
    unit_system: UnitSystem,
) -> f64 {
    let constant = match unit_system {
        UnitSystem::Metric => RATE_CONSTANT_METRIC,
        UnitSystem::Field => RATE_CONSTANT_FIELD,
    };
    (dp_actual - dp_ideal) * constant * k * h / (q * mu * bo)
}
