//! Oil Material Balance Integration Tests
//!
//! Exercises the full oil workflow end to end: PVT table construction,
//! expansion-term evaluation, per-point STOIIP, batch estimation with
//! statistics, and the F-vs-Et point breakdown. Production data is
//! synthesized to be exactly consistent with a known oil in place, so the
//! batch estimate must recover it with negligible scatter.

use std::sync::Arc;

use mbal::oil::DEFAULT_COMPRESSIBILITY;
use mbal::{
    MbalError, OilReservoir, OilReservoirConfig, ProductionHistory, PvtInput, PvtTable, UnitSystem,
};

/// Gas-cap oil reservoir PVT data, metric units, declining pressure.
fn oil_pvt() -> Arc<PvtTable> {
    let input = PvtInput {
        pressure: vec![210.0, 196.0, 182.0, 168.0, 154.0, 140.0, 126.0],
        unit_system: UnitSystem::Metric,
        bo: Some(vec![1.25, 1.24, 1.23, 1.22, 1.21, 1.20, 1.19]),
        rs: Some(vec![89.0, 85.5, 82.1, 78.7, 75.2, 71.8, 68.3]),
        bg: Some(vec![
            0.00283, 0.00290, 0.00306, 0.00324, 0.00345, 0.00365, 0.00389,
        ]),
        bw: Some(vec![1.02; 7]),
        cw: Some(vec![43e-6; 7]),
        cf: Some(vec![57e-6; 7]),
        ..PvtInput::default()
    };
    Arc::new(PvtTable::new(input).unwrap())
}

fn oil_config() -> OilReservoirConfig {
    OilReservoirConfig {
        initial_pressure: 210.0,
        temperature: 82.0,
        m: 0.2,
        aquifer_influx: false,
        unit_system: UnitSystem::Metric,
    }
}

/// Production history derived so that F = n_true * Et holds exactly at
/// every point: Gp is back-solved from the withdrawal identity.
fn consistent_history(model: &OilReservoir, n_true: f64) -> ProductionHistory {
    let pressures = [196.0, 182.0, 168.0, 154.0, 140.0, 126.0];
    let np = [0.10e6, 0.25e6, 0.42e6, 0.62e6, 0.88e6, 1.20e6];
    let wp = [0.0, 0.01e6, 0.02e6, 0.04e6, 0.06e6, 0.09e6];

    let pvt = oil_pvt();
    let mut gp = Vec::with_capacity(pressures.len());
    for i in 0..pressures.len() {
        let p = pressures[i];
        let et = model.expansion_terms(p).unwrap().total(model.m());
        let f = n_true * et;

        let props = pvt.properties_at(p);
        let bo = props.bo.unwrap();
        let rs = props.rs.unwrap();
        let bg = props.bg.unwrap();
        let bw = props.bw.unwrap();

        // F = Np*Bo + (Gp - Np*Rs)*Bg + Wp*Bw  =>  solve for Gp
        gp.push(np[i] * rs + (f - np[i] * bo - wp[i] * bw) / bg);
    }

    ProductionHistory::new(
        vec![182.0, 365.0, 547.0, 730.0, 912.0, 1095.0],
        np.to_vec(),
        gp,
        wp.to_vec(),
        pressures.to_vec(),
        UnitSystem::Metric,
    )
    .unwrap()
}

#[test]
fn test_batch_stoiip_recovers_known_oil_in_place() {
    let model = OilReservoir::new(oil_pvt(), oil_config()).unwrap();
    let n_true = 21.5e6;
    let history = consistent_history(&model, n_true);

    let batch = model.stoiip_batch(&history, None).unwrap();

    assert_eq!(batch.statistics.valid_count, history.len());
    for (i, n) in batch.estimates.iter().enumerate() {
        assert!(
            (n - n_true).abs() / n_true < 1e-9,
            "point {i}: N = {n}, expected {n_true}"
        );
    }
    // Consistent data must produce a near-zero coefficient of variation.
    assert!(
        batch.statistics.coefficient_of_variation < 0.05,
        "CV = {}",
        batch.statistics.coefficient_of_variation
    );
    assert!((batch.statistics.mean - n_true).abs() / n_true < 1e-9);
}

#[test]
fn test_material_balance_points_match_withdrawal() {
    let model = OilReservoir::new(oil_pvt(), oil_config()).unwrap();
    let history = consistent_history(&model, 21.5e6);

    let points = model.material_balance_points(&history, None).unwrap();
    assert_eq!(points.len(), history.len());

    for (i, pt) in points.iter().enumerate() {
        // Et recomposes from its parts with the configured gas-cap ratio.
        let et = pt.eo + model.m() * pt.eg + pt.efw;
        assert!((pt.et - et).abs() < 1e-12, "point {i}");
        // F / Et is the per-point oil in place on consistent data.
        assert!((pt.f / pt.et - 21.5e6).abs() / 21.5e6 < 1e-9, "point {i}");
        assert!(pt.eo.is_finite() && pt.eg > 0.0 && pt.efw > 0.0);
    }
}

#[test]
fn test_expansion_terms_grow_with_depletion() {
    let model = OilReservoir::new(oil_pvt(), oil_config()).unwrap();

    let shallow = model.expansion_terms(196.0).unwrap();
    let deep = model.expansion_terms(126.0).unwrap();

    assert!(deep.eg > shallow.eg, "gas-cap expansion grows as pressure falls");
    assert!(deep.efw > shallow.efw, "rock/water expansion grows as pressure falls");
    assert!(deep.total(0.2) > shallow.total(0.2));
}

#[test]
fn test_field_unit_history_matches_metric() {
    let model = OilReservoir::new(oil_pvt(), oil_config()).unwrap();
    let metric = consistent_history(&model, 21.5e6);

    // Re-express the same history in field units; estimates must agree.
    let to_psia = mbal::units::KGFCM2_TO_PSIA;
    let to_stb = mbal::units::M3_TO_STB;
    let to_scf = mbal::units::M3_TO_SCF;
    let field = ProductionHistory::new(
        metric.time().to_vec(),
        metric.np().iter().map(|v| v * to_stb).collect(),
        metric.gp().iter().map(|v| v * to_scf).collect(),
        metric.wp().iter().map(|v| v * to_stb).collect(),
        metric.pressure().iter().map(|v| v * to_psia).collect(),
        UnitSystem::Field,
    )
    .unwrap();

    let metric_batch = model.stoiip_batch(&metric, None).unwrap();
    let field_batch = model.stoiip_batch(&field, None).unwrap();
    // The round trip through field units carries the conversion factors'
    // rounding, so agreement is to ~1e-5, not machine precision.
    for (a, b) in metric_batch.estimates.iter().zip(&field_batch.estimates) {
        assert!((a - b).abs() / a < 1e-4, "{a} vs {b}");
    }
}

#[test]
fn test_default_compressibility_fallback() {
    // Same table without cw/cf; the engine falls back to defaults.
    let input = PvtInput {
        pressure: vec![210.0, 196.0, 182.0, 168.0, 154.0, 140.0, 126.0],
        unit_system: UnitSystem::Metric,
        bo: Some(vec![1.25, 1.24, 1.23, 1.22, 1.21, 1.20, 1.19]),
        rs: Some(vec![89.0, 85.5, 82.1, 78.7, 75.2, 71.8, 68.3]),
        bg: Some(vec![
            0.00283, 0.00290, 0.00306, 0.00324, 0.00345, 0.00365, 0.00389,
        ]),
        ..PvtInput::default()
    };
    let model =
        OilReservoir::new(Arc::new(PvtTable::new(input).unwrap()), oil_config()).unwrap();

    let terms = model.expansion_terms(154.0).unwrap();
    let expected_efw = (1.0 + 0.2)
        * 1.25
        * (DEFAULT_COMPRESSIBILITY * 0.2 + DEFAULT_COMPRESSIBILITY)
        * (210.0 - 154.0);
    assert!((terms.efw - expected_efw).abs() < 1e-12);
}

#[test]
fn test_batch_statistics_serialize_for_reporting() {
    let model = OilReservoir::new(oil_pvt(), oil_config()).unwrap();
    let history = consistent_history(&model, 21.5e6);
    let batch = model.stoiip_batch(&history, None).unwrap();

    let json = serde_json::to_value(&batch.statistics).unwrap();
    assert_eq!(json["valid_count"], history.len());
    assert!(json["mean"].is_f64());
    assert!(json["coefficient_of_variation"].is_f64());
}

#[test]
fn test_water_influx_length_mismatch_rejected() {
    let model = OilReservoir::new(oil_pvt(), oil_config()).unwrap();
    let history = consistent_history(&model, 21.5e6);

    let err = model
        .stoiip_batch(&history, Some(&[1000.0, 2000.0]))
        .unwrap_err();
    assert!(matches!(err, MbalError::Configuration(_)));
}

#[test]
fn test_no_decline_point_is_marked_not_fatal() {
    let model = OilReservoir::new(oil_pvt(), oil_config()).unwrap();
    let consistent = consistent_history(&model, 21.5e6);

    // Prepend a point at initial pressure: Et = 0 there, so that point is
    // NaN-marked while the rest of the batch still resolves.
    let mut pressures = vec![210.0];
    pressures.extend_from_slice(consistent.pressure());
    let mut time = vec![90.0];
    time.extend_from_slice(consistent.time());
    let prepend = |s: &[f64]| {
        let mut v = vec![0.0];
        v.extend_from_slice(s);
        v
    };
    let history = ProductionHistory::new(
        time,
        prepend(consistent.np()),
        prepend(consistent.gp()),
        prepend(consistent.wp()),
        pressures,
        UnitSystem::Metric,
    )
    .unwrap();

    let batch = model.stoiip_batch(&history, None).unwrap();
    assert!(batch.estimates[0].is_nan());
    assert_eq!(batch.statistics.valid_count, history.len() - 1);
    assert!((batch.statistics.mean - 21.5e6).abs() / 21.5e6 < 1e-9);
}
