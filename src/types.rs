use crate::error::{Error, Result};
use geo::MultiPolygon;
use std::fmt;

// Semantic column names. Raw dataset columns are renamed to these by the loader.
pub const LAND_AREA: &str = "land_area";
pub const POPULATION: &str = "population";
pub const REGION_KEY: &str = "region_key";
pub const REGION_NAME: &str = "region_name";
pub const POPULATION_DENSITY: &str = "population_density";

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Number(f64),
    Integer(i64),
    Text(String),
    Bool(bool),
}

impl AttributeValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(v) => Some(*v),
            AttributeValue::Integer(v) => Some(*v as f64),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            AttributeValue::Null | AttributeValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Number(v) => write!(f, "{}", v),
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One geographic unit: a boundary plus values aligned with the owning table's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub geometry: MultiPolygon<f64>,
    pub values: Vec<AttributeValue>,
}

/// Ordered regions sharing one column schema.
///
/// Every transformation returns a new table; the input is left untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegionTable {
    columns: Vec<String>,
    regions: Vec<Region>,
}

impl RegionTable {
    pub fn new(columns: Vec<String>, regions: Vec<Region>) -> Result<Self> {
        if let Some(row) = regions.iter().position(|r| r.values.len() != columns.len()) {
            return Err(Error::ColumnLength {
                column: format!("row {}", row),
                expected: columns.len(),
                got: regions[row].values.len(),
            });
        }
        Ok(Self { columns, regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, row: usize) -> Option<&Region> {
        self.regions.get(row)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&AttributeValue> {
        let idx = self.column_index(column)?;
        self.regions.get(row).map(|r| &r.values[idx])
    }

    /// Numeric view of a column, one entry per row.
    pub fn numeric_column(&self, column: &str) -> Result<Vec<f64>> {
        (0..self.len())
            .map(|row| {
                self.value(row, column)
                    .and_then(AttributeValue::as_f64)
                    .ok_or_else(|| Error::MissingAttribute {
                        row,
                        column: column.to_string(),
                    })
            })
            .collect()
    }

    /// Returns a table with `name` set to `values`, replacing an existing column of that name.
    pub fn with_column(&self, name: &str, values: Vec<AttributeValue>) -> Result<Self> {
        if values.len() != self.len() {
            return Err(Error::ColumnLength {
                column: name.to_string(),
                expected: self.len(),
                got: values.len(),
            });
        }

        let mut table = self.clone();
        match table.column_index(name) {
            Some(idx) => {
                for (region, value) in table.regions.iter_mut().zip(values) {
                    region.values[idx] = value;
                }
            }
            None => {
                table.columns.push(name.to_string());
                for (region, value) in table.regions.iter_mut().zip(values) {
                    region.values.push(value);
                }
            }
        }
        Ok(table)
    }

    /// Returns a table without the rows at `positions`, remaining rows in their original order.
    pub fn without_rows(&self, positions: &[usize]) -> Result<Self> {
        let len = self.len();
        let mut drop = vec![false; len];
        for &position in positions {
            if position >= len {
                return Err(Error::IndexOutOfBounds { position, len });
            }
            drop[position] = true;
        }

        let regions = self
            .regions
            .iter()
            .zip(drop)
            .filter(|(_, dropped)| !dropped)
            .map(|(region, _)| region.clone())
            .collect();

        Ok(Self {
            columns: self.columns.clone(),
            regions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x, y: 0.0),
            (x: x + 1.0, y: 0.0),
            (x: x + 1.0, y: 1.0),
            (x: x, y: 1.0),
        ]])
    }

    fn table(n: usize) -> RegionTable {
        let regions = (0..n)
            .map(|i| Region {
                geometry: square(i as f64),
                values: vec![AttributeValue::Integer(i as i64)],
            })
            .collect();
        RegionTable::new(vec!["id".into()], regions).unwrap()
    }

    #[test]
    fn test_without_rows_preserves_order() {
        let t = table(3).without_rows(&[1]).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.value(0, "id"), Some(&AttributeValue::Integer(0)));
        assert_eq!(t.value(1, "id"), Some(&AttributeValue::Integer(2)));
    }

    #[test]
    fn test_without_rows_out_of_bounds() {
        let err = table(3).without_rows(&[3]).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { position: 3, len: 3 }));
    }

    #[test]
    fn test_without_rows_duplicate_position_removed_once() {
        let t = table(4).without_rows(&[2, 2]).unwrap();
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_with_column_appends_and_replaces() {
        let t = table(2)
            .with_column("x", vec![AttributeValue::Number(1.5), AttributeValue::Null])
            .unwrap();
        assert_eq!(t.columns(), &["id".to_string(), "x".to_string()]);
        assert_eq!(t.value(0, "x"), Some(&AttributeValue::Number(1.5)));

        let t = t
            .with_column("x", vec![AttributeValue::Bool(true), AttributeValue::Bool(false)])
            .unwrap();
        assert_eq!(t.columns().len(), 2);
        assert_eq!(t.value(1, "x"), Some(&AttributeValue::Bool(false)));
    }

    #[test]
    fn test_with_column_length_mismatch() {
        let err = table(2).with_column("x", vec![AttributeValue::Null]).unwrap_err();
        assert!(matches!(err, Error::ColumnLength { expected: 2, got: 1, .. }));
    }

    #[test]
    fn test_as_f64_parses_text() {
        assert_eq!(AttributeValue::Text(" 42.5 ".into()).as_f64(), Some(42.5));
        assert_eq!(AttributeValue::Text("n/a".into()).as_f64(), None);
        assert_eq!(AttributeValue::Null.as_f64(), None);
    }
}
