use crate::error::{Error, Result};
use crate::types::{AttributeValue, RegionTable, LAND_AREA, POPULATION, POPULATION_DENSITY};
use tracing::info;

/// Population per thousand units of land area.
///
/// `land_area` is in square meters, so the result is people per 1000 m². The
/// literal divisor is kept for compatibility with published figures.
pub fn density(population: f64, land_area: f64) -> f64 {
    population / (land_area / 1000.0)
}

/// Density for every row, in table order.
pub fn compute_densities(table: &RegionTable) -> Result<Vec<f64>> {
    let populations = table.numeric_column(POPULATION)?;
    let land_areas = table.numeric_column(LAND_AREA)?;

    populations
        .iter()
        .zip(&land_areas)
        .enumerate()
        .map(|(row, (&population, &land_area))| {
            if land_area == 0.0 {
                return Err(Error::DivisionByZero { row });
            }
            Ok(density(population, land_area))
        })
        .collect()
}

/// Returns the table with a `population_density` column and the densities themselves.
pub fn attach_density(table: &RegionTable) -> Result<(RegionTable, Vec<f64>)> {
    info!("Computing population density for {} regions...", table.len());

    let densities = compute_densities(table)?;
    let column = densities.iter().map(|&d| AttributeValue::Number(d)).collect();
    let table = table.with_column(POPULATION_DENSITY, column)?;

    Ok((table, densities))
}

/// Bounds of a sequence, or `None` when empty.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Legend calibration: the rounded bounds of the full density set.
pub fn legend_range(densities: &[f64]) -> Result<(f64, f64)> {
    let (lo, hi) = min_max(densities).ok_or(Error::EmptySequence("calibrate a legend for"))?;
    Ok((round2(lo), round2(hi)))
}
