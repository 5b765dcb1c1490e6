use crate::config::FilterConfig;
use crate::error::{Error, Result};
use crate::types::RegionTable;
use tracing::{debug, info};

/// Remove the rows at the given positions.
pub fn drop_positions(table: &RegionTable, positions: &[usize]) -> Result<RegionTable> {
    debug!("Dropping rows at positions {:?}", positions);
    table.without_rows(positions)
}

/// Resolve keys in `column` to row positions. Every key must match at least one row.
pub fn resolve_keys(table: &RegionTable, column: &str, keys: &[String]) -> Result<Vec<usize>> {
    let mut positions = Vec::new();

    for key in keys {
        let matched: Vec<usize> = (0..table.len())
            .filter(|&row| {
                table
                    .value(row, column)
                    .map(|v| v.to_string().trim() == key.as_str())
                    .unwrap_or(false)
            })
            .collect();

        if matched.is_empty() {
            return Err(Error::UnknownRegion {
                column: column.to_string(),
                key: key.clone(),
            });
        }
        positions.extend(matched);
    }

    Ok(positions)
}

/// Apply the configured exclusions. Keys and literal positions both refer to the
/// loaded table and are removed in one pass.
pub fn apply(table: &RegionTable, config: &FilterConfig) -> Result<RegionTable> {
    let mut positions = resolve_keys(table, &config.key_column, &config.exclude_keys)?;
    positions.extend_from_slice(&config.exclude_positions);

    let filtered = table.without_rows(&positions)?;
    info!("Filtered {} -> {} regions", table.len(), filtered.len());
    Ok(filtered)
}

/// Remove every row whose `column` value is one of `keys`.
pub fn drop_keys(table: &RegionTable, column: &str, keys: &[String]) -> Result<RegionTable> {
    let positions = resolve_keys(table, column, keys)?;
    debug!("Keys {:?} in '{}' resolved to positions {:?}", keys, column, positions);
    table.without_rows(&positions)
}
