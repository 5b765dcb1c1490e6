//! End-to-end checks for filter -> density -> normalize, plus property tests.

use geo::{polygon, MultiPolygon};
use proptest::prelude::*;
use state_density_map::config::AppConfig;
use state_density_map::filter::drop_positions;
use state_density_map::normalize::normalize;
use state_density_map::processing::{attach_density, density};
use state_density_map::types::{AttributeValue, Region, RegionTable, LAND_AREA, POPULATION, POPULATION_DENSITY};
use state_density_map::Error;

fn cell(x: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x, y: 0.0),
        (x: x + 1.0, y: 0.0),
        (x: x + 1.0, y: 1.0),
        (x: x, y: 1.0),
    ]])
}

fn table(rows: &[(i64, f64)]) -> RegionTable {
    let regions = rows
        .iter()
        .enumerate()
        .map(|(i, &(population, land_area))| Region {
            geometry: cell(i as f64),
            values: vec![AttributeValue::Integer(population), AttributeValue::Number(land_area)],
        })
        .collect();
    RegionTable::new(vec![POPULATION.into(), LAND_AREA.into()], regions).unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_three_region_scenario() {
    let t = table(&[(100, 2000.0), (200, 1000.0), (50, 5000.0)]);
    let (with_density, densities) = attach_density(&t).unwrap();
    assert_eq!(densities, vec![50.0, 200.0, 10.0]);
    assert_eq!(
        with_density.numeric_column(POPULATION_DENSITY).unwrap(),
        vec![50.0, 200.0, 10.0]
    );

    // (50 - 10) / (200 - 10)
    let normalized = normalize(&densities).unwrap();
    assert!((normalized[0] - 0.210_526_315_789_473_7).abs() < 1e-12);
    assert_eq!(normalized[1], 1.0);
    assert_eq!(normalized[2], 0.0);

    // The input table is untouched.
    assert!(t.column_index(POPULATION_DENSITY).is_none());
}

#[test]
fn test_filter_middle_row() {
    let t = table(&[(1, 10.0), (2, 20.0), (3, 30.0)]);
    let filtered = drop_positions(&t, &[1]).unwrap();
    assert_eq!(filtered.len(), 2);
    assert_eq!(filtered.region(0), t.region(0));
    assert_eq!(filtered.region(1), t.region(2));
}

#[test]
fn test_density_fails_on_zero_land_area_after_filter() {
    let t = table(&[(1, 0.0), (2, 20.0), (3, 0.0)]);
    let filtered = drop_positions(&t, &[0]).unwrap();
    assert!(matches!(attach_density(&filtered), Err(Error::DivisionByZero { row: 1 })));
}

#[test]
fn test_default_filter_uses_semantic_keys() {
    let config = AppConfig::default();
    assert_eq!(config.filter.key_column, "region_key");
    assert_eq!(config.filter.exclude_keys, vec!["02", "15", "72"]);
    assert!(config.filter.exclude_positions.is_empty());
}

// ============================================================================
// Properties
// ============================================================================

fn rows_strategy() -> impl Strategy<Value = Vec<(i64, f64)>> {
    prop::collection::vec((0i64..40_000_000, 1.0f64..1.0e12), 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn density_matches_formula(population in 1.0f64..1.0e9, land_area in 1.0f64..1.0e13) {
        let expected = population / (land_area / 1000.0);
        prop_assert!((density(population, land_area) - expected).abs() <= expected * f64::EPSILON);
    }

    #[test]
    fn filter_removes_exactly_requested_rows(
        rows in rows_strategy(),
        picks in prop::collection::btree_set(0usize..40, 0..10),
    ) {
        let t = table(&rows);
        let positions: Vec<usize> = picks.into_iter().filter(|&p| p < t.len()).collect();
        let filtered = drop_positions(&t, &positions).unwrap();

        prop_assert_eq!(filtered.len(), t.len() - positions.len());
        for &p in &positions {
            let removed = t.region(p).unwrap();
            prop_assert!(!filtered.regions().contains(removed));
        }
    }

    #[test]
    fn filter_with_no_positions_is_identity(rows in rows_strategy()) {
        let t = table(&rows);
        prop_assert_eq!(drop_positions(&t, &[]).unwrap(), t);
    }

    #[test]
    fn normalize_spans_unit_interval(values in prop::collection::vec(-1.0e6f64..1.0e6, 2..50)) {
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assume!(hi > lo);

        let n = normalize(&values).unwrap();
        prop_assert_eq!(n.len(), values.len());
        prop_assert!(n.iter().all(|&v| (0.0..=1.0).contains(&v)));

        let min_at = values.iter().position(|&v| v == lo).unwrap();
        let max_at = values.iter().position(|&v| v == hi).unwrap();
        prop_assert_eq!(n[min_at], 0.0);
        prop_assert_eq!(n[max_at], 1.0);
    }

    #[test]
    fn normalize_rejects_constant_input(value in -1.0e6f64..1.0e6, len in 1usize..20) {
        let is_degenerate = matches!(normalize(&vec![value; len]), Err(Error::DegenerateRange { .. }));
        prop_assert!(is_degenerate);
    }
}
