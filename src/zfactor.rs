//! Real-gas compressibility factor via the Dranchuk-Abou-Kassem correlation
//!
//! Solves the implicit DAK equation
//!
//!   f(Z) = Z - (1 + T1(ρr) + T2(ρr) + T3(ρr) + T4(ρr)) = 0,
//!   ρr   = 0.27·Ppr / (Z·Tpr)
//!
//! with Newton-Raphson from Z₀ = 1.0 using the fully analytic derivative
//! (chain rule through dρr/dZ = -ρr/Z). A forward-difference variant exists
//! for cross-validation of the hand-derived derivative; the two must agree
//! within ~1e-6 on the same inputs.
//!
//! Caller contract: Ppr and Tpr must be physically valid (> 0). The solver
//! does not validate reduced parameters itself.

use crate::error::{MbalError, Result};

// DAK empirical constants.
const A1: f64 = 0.3265;
const A2: f64 = -1.0700;
const A3: f64 = -0.5339;
const A4: f64 = 0.01569;
const A5: f64 = -0.05165;
const A6: f64 = 0.5475;
const A7: f64 = -0.7361;
const A8: f64 = 0.1844;

/// Step for the forward-difference derivative variant.
const NUMERICAL_STEP: f64 = 1e-8;

/// Iteration controls for the Newton-Raphson loop.
#[derive(Debug, Clone, Copy)]
pub struct ZFactorOptions {
    /// Convergence criterion on |Zₙ₊₁ - Zₙ|.
    pub tolerance: f64,
    /// Hard cap guaranteeing termination.
    pub max_iterations: usize,
}

impl Default for ZFactorOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 100,
        }
    }
}

/// DAK residual f(Z) and the reduced density it was evaluated at.
fn dak_residual(z: f64, ppr: f64, tpr: f64) -> (f64, f64) {
    let rho_r = 0.27 * ppr / (z * tpr);

    let t1 = (A1 + A2 / tpr + A3 / tpr.powi(3)) * rho_r;
    let t2 = (A4 + A5 / tpr) * rho_r.powi(2);
    let t3 = A5 * A6 * rho_r.powi(5) / tpr;
    let t4 = (A7 * rho_r.powi(2) * (1.0 + A8 * rho_r.powi(2)) / tpr.powi(3))
        * (-A8 * rho_r.powi(2)).exp();

    (z - (1.0 + t1 + t2 + t3 + t4), rho_r)
}

/// Solve for Z with the analytic-derivative Newton-Raphson (production path).
///
/// Fails with a convergence error carrying the last iterate when the
/// iteration cap is reached without meeting tolerance.
pub fn z_factor_dak(ppr: f64, tpr: f64, options: &ZFactorOptions) -> Result<f64> {
    let mut z = 1.0;

    for _ in 0..options.max_iterations {
        let (f_z, rho_r) = dak_residual(z, ppr, tpr);

        // dρr/dZ = -0.27·Ppr / (Tpr·Z²) = -ρr/Z
        let drho_dz = -rho_r / z;

        // Term-by-term derivatives with respect to ρr.
        let dt1 = A1 + A2 / tpr + A3 / tpr.powi(3);
        let dt2 = 2.0 * (A4 + A5 / tpr) * rho_r;
        let dt3 = 5.0 * A5 * A6 * rho_r.powi(4) / tpr;

        let t4_num = A7 * rho_r.powi(2) * (1.0 + A8 * rho_r.powi(2));
        let t4_den = tpr.powi(3);
        let t4_exp = (-A8 * rho_r.powi(2)).exp();
        let dt4 = (A7 * (2.0 * rho_r + 4.0 * A8 * rho_r.powi(3)) / t4_den) * t4_exp
            - (t4_num / t4_den) * 2.0 * A8 * rho_r * t4_exp;

        // df/dZ = 1 - dF/dρr · dρr/dZ where F = 1 + T1 + T2 + T3 + T4
        let df_dz = 1.0 - (dt1 + dt2 + dt3 + dt4) * drho_dz;

        let z_new = z - f_z / df_dz;
        if (z_new - z).abs() < options.tolerance {
            return Ok(z_new);
        }
        z = z_new;
    }

    Err(MbalError::Convergence {
        max_iterations: options.max_iterations,
        last_value: z,
    })
}

/// Forward-difference variant, kept for cross-validating the analytic
/// derivative. Slower; not the production path.
pub fn z_factor_dak_numerical(ppr: f64, tpr: f64, options: &ZFactorOptions) -> Result<f64> {
    let mut z = 1.0;

    for _ in 0..options.max_iterations {
        let (f_z, _) = dak_residual(z, ppr, tpr);
        let (f_zh, _) = dak_residual(z + NUMERICAL_STEP, ppr, tpr);
        let df_dz = (f_zh - f_z) / NUMERICAL_STEP;

        let z_new = z - f_z / df_dz;
        if (z_new - z).abs() < options.tolerance {
            return Ok(z_new);
        }
        z = z_new;
    }

    Err(MbalError::Convergence {
        max_iterations: options.max_iterations,
        last_value: z,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_conditions() {
        // (Ppr, Tpr, approximate Z from Standing-Katz chart)
        let cases = [
            (1.0, 1.5, 0.920),
            (3.0, 1.1, 0.620),
            (0.5, 2.0, 0.970),
            (2.0, 1.5, 0.860),
        ];
        let opts = ZFactorOptions::default();

        for (ppr, tpr, expected) in cases {
            let z = z_factor_dak(ppr, tpr, &opts).unwrap();
            assert!(
                (z - expected).abs() < 0.02,
                "Ppr={ppr}, Tpr={tpr}: expected Z≈{expected}, got {z}"
            );
        }
    }

    #[test]
    fn test_analytic_matches_numerical() {
        let opts = ZFactorOptions::default();
        for (ppr, tpr) in [(1.0, 1.5), (2.0, 1.5), (0.5, 2.0), (3.0, 1.1)] {
            let analytic = z_factor_dak(ppr, tpr, &opts).unwrap();
            let numerical = z_factor_dak_numerical(ppr, tpr, &opts).unwrap();
            let rel = ((analytic - numerical) / analytic).abs();
            assert!(
                rel < 1e-6,
                "derivative variants disagree at Ppr={ppr}, Tpr={tpr}: {analytic} vs {numerical}"
            );
        }
    }

    #[test]
    fn test_converges_within_default_cap() {
        let opts = ZFactorOptions::default();
        // Chart-range conditions must converge under the default 1e-12 / 100 settings.
        assert!(z_factor_dak(1.0, 1.5, &opts).is_ok());
        assert!(z_factor_dak(2.0, 1.5, &opts).is_ok());
    }

    #[test]
    fn test_convergence_error_reports_last_iterate() {
        // Starve the solver of iterations to force the error path.
        let opts = ZFactorOptions {
            tolerance: 1e-12,
            max_iterations: 1,
        };
        match z_factor_dak(2.0, 1.5, &opts) {
            Err(MbalError::Convergence {
                max_iterations,
                last_value,
            }) => {
                assert_eq!(max_iterations, 1);
                assert!(last_value.is_finite());
            }
            other => panic!("expected convergence error, got {other:?}"),
        }
    }

    #[test]
    fn test_ideal_gas_limit() {
        // At very low reduced pressure Z approaches 1.
        let z = z_factor_dak(0.01, 2.0, &ZFactorOptions::default()).unwrap();
        assert!((z - 1.0).abs() < 0.01, "low-pressure Z should be near 1, got {z}");
    }
}
