use crate::config::SchemaConfig;
use crate::error::{Error, Result};
use crate::types::{AttributeValue, Region, RegionTable};
use geo::MultiPolygon;
use shapefile::dbase::{self, FieldValue};
use shapefile::{Shape, ShapeReader};
use std::fmt::Display;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Load every polygon feature from a zipped shapefile or a bare `.shp`.
///
/// Columns named in `schema` are renamed to their semantic names; all other
/// attribute columns pass through unchanged.
pub fn load_regions(path: &Path, schema: &SchemaConfig) -> Result<RegionTable> {
    info!("Loading regions from {:?}...", path);

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .ok_or_else(|| load_error(path, "input has no extension"))?;

    let table = match extension.as_str() {
        "zip" => {
            let (shp, dbf) = read_zipped_layer(path)?;
            let shape_reader = ShapeReader::new(Cursor::new(shp)).map_err(|e| load_error(path, e))?;
            let dbase_reader = dbase::Reader::new(Cursor::new(dbf)).map_err(|e| load_error(path, e))?;
            read_layer(path, shape_reader, dbase_reader, schema)?
        }
        "shp" => {
            let shape_reader = ShapeReader::from_path(path).map_err(|e| load_error(path, e))?;
            let dbase_reader =
                dbase::Reader::from_path(path.with_extension("dbf")).map_err(|e| load_error(path, e))?;
            read_layer(path, shape_reader, dbase_reader, schema)?
        }
        _ => return Err(load_error(path, format!("unsupported format: {}", extension))),
    };

    info!("Loaded {} regions with {} columns", table.len(), table.columns().len());
    Ok(table)
}

/// Pull the `.shp` and `.dbf` members of the archive into memory.
fn read_zipped_layer(path: &Path) -> Result<(Vec<u8>, Vec<u8>)> {
    let file = File::open(path).map_err(|e| load_error(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| load_error(path, e))?;

    let mut shp = None;
    let mut dbf = None;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| load_error(path, e))?;
        let name = entry.name().to_lowercase();

        let slot = if name.ends_with(".shp") {
            &mut shp
        } else if name.ends_with(".dbf") {
            &mut dbf
        } else {
            continue;
        };

        if slot.is_some() {
            warn!("Ignoring extra archive member {}", entry.name());
            continue;
        }

        debug!("Reading archive member {} ({} bytes)", entry.name(), entry.size());
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf).map_err(|e| load_error(path, e))?;
        *slot = Some(buf);
    }

    match (shp, dbf) {
        (Some(shp), Some(dbf)) => Ok((shp, dbf)),
        _ => Err(load_error(path, "archive contains no .shp/.dbf layer")),
    }
}

fn read_layer<T: Read + Seek, D: Read + Seek>(
    path: &Path,
    shape_reader: ShapeReader<T>,
    dbase_reader: dbase::Reader<D>,
    schema: &SchemaConfig,
) -> Result<RegionTable> {
    let raw_columns: Vec<String> = dbase_reader.fields().iter().map(|f| f.name().to_string()).collect();
    let columns = semantic_columns(&raw_columns, schema);

    let mut reader = shapefile::Reader::new(shape_reader, dbase_reader);
    let mut regions = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.map_err(|e| load_error(path, e))?;

        let geometry = match shape {
            Shape::Polygon(polygon) => {
                let geo_polygon: MultiPolygon<f64> = polygon.try_into()
                    .map_err(|e| load_error(path, format!("Failed to convert polygon: {:?}", e)))?;
                geo_polygon
            }
            Shape::PolygonM(polygon) => {
                let geo_polygon: MultiPolygon<f64> = polygon.try_into()
                    .map_err(|e| load_error(path, format!("Failed to convert polygonM: {:?}", e)))?;
                geo_polygon
            }
            Shape::PolygonZ(polygon) => {
                let geo_polygon: MultiPolygon<f64> = polygon.try_into()
                    .map_err(|e| load_error(path, format!("Failed to convert polygonZ: {:?}", e)))?;
                geo_polygon
            }
            Shape::NullShape => continue,
            other => {
                return Err(load_error(
                    path,
                    format!("expected polygon features, found {:?}", other.shapetype()),
                ))
            }
        };

        let values = raw_columns
            .iter()
            .map(|name| record.get(name).map(to_attribute).unwrap_or(AttributeValue::Null))
            .collect();

        regions.push(Region { geometry, values });
    }

    if regions.is_empty() {
        return Err(load_error(path, "layer contains no polygon features"));
    }

    RegionTable::new(columns, regions)
}

/// Rename raw dataset columns to the semantic names the pipeline uses.
pub fn semantic_columns(raw_columns: &[String], schema: &SchemaConfig) -> Vec<String> {
    let mappings = schema.mappings();

    for (raw, semantic) in &mappings {
        if !raw_columns.iter().any(|c| c.as_str() == *raw) {
            warn!("Column '{}' (for {}) not present in dataset", raw, semantic);
        }
    }

    raw_columns
        .iter()
        .map(|c| {
            mappings
                .iter()
                .find(|(raw, _)| *raw == c.as_str())
                .map(|(_, semantic)| semantic.to_string())
                .unwrap_or_else(|| c.clone())
        })
        .collect()
}

pub fn to_attribute(value: &FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(s)) => AttributeValue::Text(s.trim().to_string()),
        FieldValue::Numeric(Some(n)) => AttributeValue::Number(*n),
        FieldValue::Float(Some(f)) => AttributeValue::Number(*f as f64),
        FieldValue::Double(d) => AttributeValue::Number(*d),
        FieldValue::Integer(i) => AttributeValue::Integer(*i as i64),
        FieldValue::Logical(Some(b)) => AttributeValue::Bool(*b),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => AttributeValue::Null,
        other => AttributeValue::Text(format!("{:?}", other)),
    }
}

fn load_error(path: &Path, reason: impl Display) -> Error {
    Error::DataLoad {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_columns() {
        let raw: Vec<String> = ["GEOID10", "NAME10", "ALAND10", "AWATER10", "DP0010001"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let columns = semantic_columns(&raw, &SchemaConfig::default());
        assert_eq!(
            columns,
            vec!["region_key", "region_name", "land_area", "AWATER10", "population"]
        );
    }

    #[test]
    fn test_to_attribute() {
        assert_eq!(
            to_attribute(&FieldValue::Character(Some("Texas ".into()))),
            AttributeValue::Text("Texas".into())
        );
        assert_eq!(to_attribute(&FieldValue::Numeric(Some(25_145_561.0))), AttributeValue::Number(25_145_561.0));
        assert_eq!(to_attribute(&FieldValue::Integer(7)), AttributeValue::Integer(7));
        assert_eq!(to_attribute(&FieldValue::Numeric(None)), AttributeValue::Null);
    }

    #[test]
    fn test_missing_archive() {
        let err = load_regions(Path::new("does/not/exist.zip"), &SchemaConfig::default()).unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_regions(Path::new("states.gpkg"), &SchemaConfig::default()).unwrap_err();
        assert!(matches!(err, Error::DataLoad { ref reason, .. } if reason.contains("gpkg")));
    }

    #[test]
    fn test_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"not a zip file").unwrap();
        let err = load_regions(&path, &SchemaConfig::default()).unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }
}
