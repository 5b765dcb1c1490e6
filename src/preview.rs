use crate::error::{Error, Result};
use crate::types::{RegionTable, POPULATION_DENSITY, REGION_KEY, REGION_NAME};
use std::io::Write;

/// Write the header and the first `rows` rows as CSV, with a short geometry summary column.
pub fn write_head<W: Write>(table: &RegionTable, rows: usize, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header: Vec<&str> = table.columns().iter().map(String::as_str).collect();
    header.push("geometry");
    writer.write_record(&header).map_err(csv_error)?;

    for region in table.regions().iter().take(rows) {
        let mut record: Vec<String> = region.values.iter().map(|v| v.to_string()).collect();
        record.push(format!("MULTIPOLYGON ({} parts)", region.geometry.0.len()));
        writer.write_record(&record).map_err(csv_error)?;
    }

    writer.flush()?;
    Ok(())
}

/// Per-region density report: key, name, density, normalized density and class.
pub fn write_summary<W: Write>(
    table: &RegionTable,
    densities: &[f64],
    normalized: &[f64],
    classes: &[usize],
    out: W,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record([REGION_KEY, REGION_NAME, POPULATION_DENSITY, "normalized", "class"])
        .map_err(csv_error)?;

    for (row, ((density, norm), class)) in densities.iter().zip(normalized).zip(classes).enumerate() {
        let cell = |column: &str| table.value(row, column).map(|v| v.to_string()).unwrap_or_default();
        writer
            .write_record([
                cell(REGION_KEY),
                cell(REGION_NAME),
                format!("{:.4}", density),
                format!("{:.4}", norm),
                class.to_string(),
            ])
            .map_err(csv_error)?;
    }

    writer.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> Error {
    Error::Io(e.into())
}
