//! Unit system conversions for petroleum engineering quantities
//!
//! Internal calculations always use metric units:
//! - Pressure: kgf/cm²
//! - Volume: m³ std
//! - Temperature: K
//! - FVF and GOR: m³/m³ std
//! - Compressibility: 1/(kgf/cm²)
//!
//! Field units are the US petroleum set: psia, STB (oil/water), SCF (gas),
//! °F, rb/STB and rb/SCF, SCF/STB, 1/psi.
//!
//! Every converter is a stateless pure function. Converting with a metric
//! source or destination returns the input unchanged - a literal return, so
//! metric round-trips are bit-exact.

use serde::{Deserialize, Serialize};

/// Supported unit systems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// SI-based metric units (m³, kgf/cm², °C input / K internal)
    #[default]
    Metric,
    /// US petroleum field units (STB, SCF, psia, °F)
    Field,
}

// Conversion factors, field to metric and back.
pub const PSIA_TO_KGFCM2: f64 = 0.0703069;
pub const KGFCM2_TO_PSIA: f64 = 14.2233;

pub const STB_TO_M3: f64 = 0.158987;
pub const M3_TO_STB: f64 = 6.28981;

pub const SCF_TO_M3: f64 = 0.0283168;
pub const M3_TO_SCF: f64 = 35.3147;

pub const RB_TO_M3: f64 = 0.158987;
pub const M3_TO_RB: f64 = 6.28981;

/// SCF/STB to m³/m³, derived from the gas and oil volume factors (≈ 0.178107).
pub const SCFSTB_TO_M3M3: f64 = SCF_TO_M3 / STB_TO_M3;
/// m³/m³ to SCF/STB (≈ 5.61458).
pub const M3M3_TO_SCFSTB: f64 = M3_TO_SCF / M3_TO_STB;

// ============================================================================
// Pressure (psia <-> kgf/cm²)
// ============================================================================

/// Convert pressure to metric (kgf/cm²).
pub fn pressure_to_metric(pressure: f64, from: UnitSystem) -> f64 {
    match from {
        UnitSystem::Field => pressure * PSIA_TO_KGFCM2,
        UnitSystem::Metric => pressure,
    }
}

/// Convert pressure from metric (kgf/cm²) to the target system.
pub fn pressure_from_metric(pressure: f64, to: UnitSystem) -> f64 {
    match to {
        UnitSystem::Field => pressure * KGFCM2_TO_PSIA,
        UnitSystem::Metric => pressure,
    }
}

// ============================================================================
// Volumes (STB / SCF / rb <-> m³)
// ============================================================================

/// Convert oil or water surface volume to metric (m³ std).
pub fn oil_volume_to_metric(volume: f64, from: UnitSystem) -> f64 {
    match from {
        UnitSystem::Field => volume * STB_TO_M3,
        UnitSystem::Metric => volume,
    }
}

/// Convert oil or water surface volume from metric (m³ std).
pub fn oil_volume_from_metric(volume: f64, to: UnitSystem) -> f64 {
    match to {
        UnitSystem::Field => volume * M3_TO_STB,
        UnitSystem::Metric => volume,
    }
}

/// Convert gas surface volume to metric (m³ std).
pub fn gas_volume_to_metric(volume: f64, from: UnitSystem) -> f64 {
    match from {
        UnitSystem::Field => volume * SCF_TO_M3,
        UnitSystem::Metric => volume,
    }
}

/// Convert gas surface volume from metric (m³ std).
pub fn gas_volume_from_metric(volume: f64, to: UnitSystem) -> f64 {
    match to {
        UnitSystem::Field => volume * M3_TO_SCF,
        UnitSystem::Metric => volume,
    }
}

/// Convert reservoir (in-situ) volume to metric (m³).
pub fn reservoir_volume_to_metric(volume: f64, from: UnitSystem) -> f64 {
    match from {
        UnitSystem::Field => volume * RB_TO_M3,
        UnitSystem::Metric => volume,
    }
}

/// Convert reservoir (in-situ) volume from metric (m³).
pub fn reservoir_volume_from_metric(volume: f64, to: UnitSystem) -> f64 {
    match to {
        UnitSystem::Field => volume * M3_TO_RB,
        UnitSystem::Metric => volume,
    }
}

// ============================================================================
// Formation volume factors
// ============================================================================

/// Convert oil FVF to metric (m³/m³ std).
///
/// rb/STB and m³/m³ are both reservoir-to-standard ratios of the same fluid,
/// so the numerical value is identical in either system.
pub fn oil_fvf_to_metric(bo: f64, _from: UnitSystem) -> f64 {
    bo
}

/// Convert oil FVF from metric (m³/m³ std). Identity, see [`oil_fvf_to_metric`].
pub fn oil_fvf_from_metric(bo: f64, _to: UnitSystem) -> f64 {
    bo
}

/// Convert water FVF to metric (m³/m³ std). Identity like the oil FVF.
pub fn water_fvf_to_metric(bw: f64, _from: UnitSystem) -> f64 {
    bw
}

/// Convert water FVF from metric (m³/m³ std).
pub fn water_fvf_from_metric(bw: f64, _to: UnitSystem) -> f64 {
    bw
}

/// Convert gas FVF to metric (m³/m³ std).
///
/// rb/SCF mixes a reservoir barrel with a standard cubic foot, so unlike the
/// oil FVF this one needs the volume-factor ratio: rb/SCF × (m³/rb) / (m³/SCF).
pub fn gas_fvf_to_metric(bg: f64, from: UnitSystem) -> f64 {
    match from {
        UnitSystem::Field => bg * RB_TO_M3 / SCF_TO_M3,
        UnitSystem::Metric => bg,
    }
}

/// Convert gas FVF from metric (m³/m³ std) to the target system.
pub fn gas_fvf_from_metric(bg: f64, to: UnitSystem) -> f64 {
    match to {
        UnitSystem::Field => bg * SCF_TO_M3 / RB_TO_M3,
        UnitSystem::Metric => bg,
    }
}

// ============================================================================
// Solution gas-oil ratio (SCF/STB <-> m³/m³)
// ============================================================================

/// Convert solution GOR to metric (m³/m³ std).
pub fn gor_to_metric(rs: f64, from: UnitSystem) -> f64 {
    match from {
        UnitSystem::Field => rs * SCFSTB_TO_M3M3,
        UnitSystem::Metric => rs,
    }
}

/// Convert solution GOR from metric (m³/m³ std).
pub fn gor_from_metric(rs: f64, to: UnitSystem) -> f64 {
    match to {
        UnitSystem::Field => rs * M3M3_TO_SCFSTB,
        UnitSystem::Metric => rs,
    }
}

// ============================================================================
// Compressibility (1/psi <-> 1/(kgf/cm²))
// ============================================================================

/// Convert compressibility to metric (1/(kgf/cm²)).
///
/// Inverse pressure scales with the reciprocal factor: 1/psi × (psi per
/// kgf/cm²) = 1/(kgf/cm²).
pub fn compressibility_to_metric(c: f64, from: UnitSystem) -> f64 {
    match from {
        UnitSystem::Field => c * KGFCM2_TO_PSIA,
        UnitSystem::Metric => c,
    }
}

/// Convert compressibility from metric (1/(kgf/cm²)).
pub fn compressibility_from_metric(c: f64, to: UnitSystem) -> f64 {
    match to {
        UnitSystem::Field => c * PSIA_TO_KGFCM2,
        UnitSystem::Metric => c,
    }
}

// ============================================================================
// Temperature
// ============================================================================

/// Convert temperature to Kelvin. Field input is °F, metric input is °C.
pub fn temperature_to_kelvin(temp: f64, from: UnitSystem) -> f64 {
    match from {
        UnitSystem::Field => (temp - 32.0) * 5.0 / 9.0 + 273.15,
        UnitSystem::Metric => temp + 273.15,
    }
}

/// Convert temperature from Kelvin back to the target system (°F or °C).
pub fn temperature_from_kelvin(temp_k: f64, to: UnitSystem) -> f64 {
    match to {
        UnitSystem::Field => (temp_k - 273.15) * 9.0 / 5.0 + 32.0,
        UnitSystem::Metric => temp_k - 273.15,
    }
}

// ============================================================================
// Slice helpers
// ============================================================================

/// Convert a whole series of pressures to metric.
pub fn pressure_slice_to_metric(values: &[f64], from: UnitSystem) -> Vec<f64> {
    values.iter().map(|&v| pressure_to_metric(v, from)).collect()
}

/// Convert a whole series of oil/water volumes to metric.
pub fn oil_volume_slice_to_metric(values: &[f64], from: UnitSystem) -> Vec<f64> {
    values.iter().map(|&v| oil_volume_to_metric(v, from)).collect()
}

/// Convert a whole series of gas volumes to metric.
pub fn gas_volume_slice_to_metric(values: &[f64], from: UnitSystem) -> Vec<f64> {
    values.iter().map(|&v| gas_volume_to_metric(v, from)).collect()
}

/// Convert a whole series of solution GOR values to metric.
pub fn gor_slice_to_metric(values: &[f64], from: UnitSystem) -> Vec<f64> {
    values.iter().map(|&v| gor_to_metric(v, from)).collect()
}

/// Convert a whole series of gas FVF values to metric.
pub fn gas_fvf_slice_to_metric(values: &[f64], from: UnitSystem) -> Vec<f64> {
    values.iter().map(|&v| gas_fvf_to_metric(v, from)).collect()
}

/// Convert a whole series of compressibilities to metric.
pub fn compressibility_slice_to_metric(values: &[f64], from: UnitSystem) -> Vec<f64> {
    values
        .iter()
        .map(|&v| compressibility_to_metric(v, from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, rel_tol: f64, what: &str) {
        let err = ((actual - expected) / expected).abs();
        assert!(
            err < rel_tol,
            "{what}: expected {expected}, got {actual} (rel err {err:.2e})"
        );
    }

    #[test]
    fn test_pressure_round_trip() {
        let psia = 3000.0;
        let metric = pressure_to_metric(psia, UnitSystem::Field);
        let back = pressure_from_metric(metric, UnitSystem::Field);
        assert_close(back, psia, 1e-6, "pressure round trip");
        // 3000 psia ≈ 210.92 kgf/cm²
        assert_close(metric, 210.9207, 1e-4, "3000 psia in kgf/cm²");
    }

    #[test]
    fn test_volume_round_trips() {
        let stb = 1_000_000.0;
        let back = oil_volume_from_metric(oil_volume_to_metric(stb, UnitSystem::Field), UnitSystem::Field);
        assert_close(back, stb, 1e-6, "oil volume round trip");

        let scf = 500e6;
        let back = gas_volume_from_metric(gas_volume_to_metric(scf, UnitSystem::Field), UnitSystem::Field);
        assert_close(back, scf, 1e-6, "gas volume round trip");

        let rb = 2.5e6;
        let back = reservoir_volume_from_metric(
            reservoir_volume_to_metric(rb, UnitSystem::Field),
            UnitSystem::Field,
        );
        assert_close(back, rb, 1e-6, "reservoir volume round trip");
    }

    #[test]
    fn test_gor_and_fvf_round_trips() {
        let gor = 500.0; // SCF/STB
        let back = gor_from_metric(gor_to_metric(gor, UnitSystem::Field), UnitSystem::Field);
        assert_close(back, gor, 1e-6, "GOR round trip");

        let bg = 0.0009; // rb/SCF
        let back = gas_fvf_from_metric(gas_fvf_to_metric(bg, UnitSystem::Field), UnitSystem::Field);
        assert_close(back, bg, 1e-6, "gas FVF round trip");

        // Oil FVF is numerically identical in both systems
        assert_eq!(oil_fvf_to_metric(1.25, UnitSystem::Field), 1.25);
    }

    #[test]
    fn test_compressibility_round_trip() {
        let c = 3e-6; // 1/psi
        let back = compressibility_from_metric(
            compressibility_to_metric(c, UnitSystem::Field),
            UnitSystem::Field,
        );
        assert_close(back, c, 1e-6, "compressibility round trip");
    }

    #[test]
    fn test_temperature_conversions() {
        // 180 °F = 82.22 °C = 355.37 K
        let k = temperature_to_kelvin(180.0, UnitSystem::Field);
        assert_close(k, 355.3722, 1e-4, "180 °F in K");
        let back = temperature_from_kelvin(k, UnitSystem::Field);
        assert_close(back, 180.0, 1e-6, "temperature round trip");

        // Metric input is Celsius
        assert_close(
            temperature_to_kelvin(90.0, UnitSystem::Metric),
            363.15,
            1e-9,
            "90 °C in K",
        );
    }

    #[test]
    fn test_metric_identity_is_bit_exact() {
        let values = [0.0, 1.0, 210.0, 1e9, 43e-6, f64::MIN_POSITIVE];
        for &v in &values {
            assert_eq!(pressure_to_metric(v, UnitSystem::Metric).to_bits(), v.to_bits());
            assert_eq!(oil_volume_to_metric(v, UnitSystem::Metric).to_bits(), v.to_bits());
            assert_eq!(gas_volume_to_metric(v, UnitSystem::Metric).to_bits(), v.to_bits());
            assert_eq!(gor_to_metric(v, UnitSystem::Metric).to_bits(), v.to_bits());
            assert_eq!(gas_fvf_to_metric(v, UnitSystem::Metric).to_bits(), v.to_bits());
            assert_eq!(
                compressibility_to_metric(v, UnitSystem::Metric).to_bits(),
                v.to_bits()
            );
        }
    }

    #[test]
    fn test_slice_conversion_preserves_shape() {
        let pressures = [3330.0, 3150.0, 3000.0];
        let metric = pressure_slice_to_metric(&pressures, UnitSystem::Field);
        assert_eq!(metric.len(), pressures.len());
        assert_close(metric[0], 3330.0 * PSIA_TO_KGFCM2, 1e-12, "slice element");
    }
}
