//! PVT correlations for fluids without measured property tables
//!
//! Empirical estimates used when laboratory PVT data is unavailable:
//! - Standing: Bo and Rs for saturated black oils
//! - Vasquez-Beggs: Bo with API-dependent coefficient sets
//! - Hall-Yarborough: gas Z-factor (an alternative to the DAK solver in
//!   [`crate::zfactor`], iterating in reduced density rather than Z)
//! - Real-gas Bg from Z, temperature and pressure
//!
//! All inputs and outputs are metric (kgf/cm², °C or K, m³/m³ std); the
//! correlations themselves were published in field units, so each function
//! converts internally.

use crate::error::{MbalError, Result};
use crate::units::{KGFCM2_TO_PSIA, M3M3_TO_SCFSTB, SCFSTB_TO_M3M3};

/// Hall-Yarborough iteration controls (published tolerances).
const HY_TOLERANCE: f64 = 1e-6;
const HY_MAX_ITERATIONS: usize = 20;

/// Standing correlation for oil formation volume factor.
///
/// Bo = 0.9759 + 0.00012·F^1.2 with F = Rs·(γg/γo)^0.5 + 1.25·T(°F)
///
/// # Arguments
/// * `rs` - solution GOR (m³/m³ std)
/// * `gamma_g` - gas specific gravity (air = 1)
/// * `gamma_o` - oil specific gravity (water = 1)
/// * `temperature` - reservoir temperature (°C)
pub fn standing_bo(rs: f64, gamma_g: f64, gamma_o: f64, temperature: f64) -> f64 {
    let t_f = temperature * 9.0 / 5.0 + 32.0;
    let rs_scf_stb = rs * M3M3_TO_SCFSTB;
    let f = rs_scf_stb * (gamma_g / gamma_o).sqrt() + 1.25 * t_f;
    0.9759 + 0.00012 * f.powf(1.2)
}

/// Standing correlation for solution gas-oil ratio.
///
/// # Arguments
/// * `pressure` - pressure (kgf/cm²)
/// * `gamma_g` - gas specific gravity (air = 1)
/// * `gamma_o` - oil specific gravity (water = 1)
/// * `temperature` - reservoir temperature (°C)
///
/// Returns Rs in m³/m³ std.
pub fn standing_rs(pressure: f64, gamma_g: f64, gamma_o: f64, temperature: f64) -> f64 {
    let p_psia = pressure * KGFCM2_TO_PSIA;
    let t_f = temperature * 9.0 / 5.0 + 32.0;
    let x = 0.0125 * gamma_o / gamma_g
        * (p_psia.powf(0.83) * 10f64.powf(0.00091 * t_f - 0.0125 * gamma_o));
    gamma_g * x.powf(1.2048) * SCFSTB_TO_M3M3
}

/// Vasquez-Beggs correlation for oil formation volume factor.
///
/// Uses separate coefficient sets for API ≤ 30 and API > 30, with the gas
/// gravity corrected to a 100 psi separator reference.
///
/// # Arguments
/// * `rs` - solution GOR (m³/m³ std)
/// * `gamma_g` - gas specific gravity at separator conditions (air = 1)
/// * `api` - oil API gravity
/// * `temperature` - reservoir temperature (°C)
/// * `separator_pressure` - separator pressure (kgf/cm², default ≈ 100 psia)
pub fn vasquez_beggs_bo(
    rs: f64,
    gamma_g: f64,
    api: f64,
    temperature: f64,
    separator_pressure: f64,
) -> f64 {
    let t_f = temperature * 9.0 / 5.0 + 32.0;
    let rs_scf_stb = rs * M3M3_TO_SCFSTB;
    let sep_p_psia = separator_pressure * KGFCM2_TO_PSIA;

    let gamma_gs = gamma_g * (1.0 + 5.912e-5 * api * t_f * (sep_p_psia / 114.7).log10());

    let (c1, c2, c3) = if api <= 30.0 {
        (0.0004677, 1.751e-5, -1.811e-8)
    } else {
        (0.000467, 1.100e-5, 1.337e-9)
    };

    1.0 + c1 * rs_scf_stb + (t_f - 60.0) * (api / gamma_gs) * (c2 + c3 * rs_scf_stb)
}

/// Hall-Yarborough correlation for the gas Z-factor.
///
/// Newton-Raphson in reduced density y with pseudo-critical properties
/// estimated from gas gravity (Sutton-style quadratics). Fails with a
/// convergence error when the 20-iteration budget is exhausted.
///
/// # Arguments
/// * `pressure` - pressure (kgf/cm²)
/// * `temperature` - temperature (K)
/// * `gamma_g` - gas specific gravity (air = 1)
pub fn hall_yarborough_z(pressure: f64, temperature: f64, gamma_g: f64) -> Result<f64> {
    let p_psia = pressure * KGFCM2_TO_PSIA;
    let t_rankine = temperature * 1.8;

    // Pseudo-critical properties from gas gravity.
    let tpc = 168.0 + 325.0 * gamma_g - 12.5 * gamma_g * gamma_g;
    let ppc = 677.0 + 15.0 * gamma_g - 37.5 * gamma_g * gamma_g;

    let tpr = t_rankine / tpc;
    let ppr = p_psia / ppc;
    let t = 1.0 - 1.0 / tpr;

    let a = 0.06125 * ppr * (-1.2 * t * t).exp() / tpr;
    let b = 14.76 * t - 9.76 * t * t + 4.58 * t.powi(3);
    let c = 90.7 * t - 242.2 * t * t + 42.4 * t.powi(3);
    let d = 2.18 + 2.82 * t;

    let mut y: f64 = 0.001;
    for _ in 0..HY_MAX_ITERATIONS {
        let f = -a + (y + y * y + y.powi(3) - y.powi(4)) / (1.0 - y).powi(3) - b * y * y
            + c * y.powf(d);
        let df = (1.0 + 4.0 * y + 4.0 * y * y - 4.0 * y.powi(3) + y.powi(4))
            / (1.0 - y).powi(4)
            - 2.0 * b * y
            + c * d * y.powf(d - 1.0);

        let y_new = y - f / df;
        if (y_new - y).abs() < HY_TOLERANCE {
            return Ok(a / y_new);
        }
        y = y_new;
    }

    Err(MbalError::Convergence {
        max_iterations: HY_MAX_ITERATIONS,
        last_value: a / y,
    })
}

/// Real-gas formation volume factor from the Z-factor.
///
/// Bg = 0.00351·z·T/P for metric inputs (T in K, P in kgf/cm²), the
/// coefficient folding in standard conditions of 1.0332 kgf/cm² and 288.15 K.
pub fn gas_bg(pressure: f64, temperature: f64, z: f64) -> f64 {
    0.00351 * z * temperature / pressure
}
