use crate::classify::Scheme;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CENSUS_URL: &str = "http://www2.census.gov/geo/tiger/TIGER2010DP1/State_2010Census_DP1.zip";
pub const ARCHIVE_NAME: &str = "State_2010Census_DP1.zip";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub schema: SchemaConfig,
    pub filter: FilterConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub archive: PathBuf,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: CENSUS_URL.to_string(),
            archive: PathBuf::from(ARCHIVE_NAME),
            timeout_secs: 300,
        }
    }
}

/// Raw dataset column for each semantic field.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SchemaConfig {
    pub land_area: String,
    pub population: String,
    pub region_key: String,
    pub region_name: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            land_area: "ALAND10".to_string(),
            population: "DP0010001".to_string(),
            region_key: "GEOID10".to_string(),
            region_name: "NAME10".to_string(),
        }
    }
}

impl SchemaConfig {
    /// (raw column, semantic column) pairs.
    pub fn mappings(&self) -> [(&str, &'static str); 4] {
        use crate::types::{LAND_AREA, POPULATION, REGION_KEY, REGION_NAME};
        [
            (self.land_area.as_str(), LAND_AREA),
            (self.population.as_str(), POPULATION),
            (self.region_key.as_str(), REGION_KEY),
            (self.region_name.as_str(), REGION_NAME),
        ]
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FilterConfig {
    /// Semantic column the exclusion keys are matched against
    pub key_column: String,
    pub exclude_keys: Vec<String>,
    /// Literal row positions in the loaded table, applied together with the keys
    pub exclude_positions: Vec<usize>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            key_column: crate::types::REGION_KEY.to_string(),
            // Alaska, Hawaii, Puerto Rico
            exclude_keys: vec!["02".to_string(), "15".to_string(), "72".to_string()],
            exclude_positions: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RenderConfig {
    pub output: PathBuf,
    pub raw_output: PathBuf,
    /// Figure size in inches
    pub figsize: (f32, f32),
    pub dpi: f32,
    pub cmap: String,
    pub scheme: Scheme,
    /// Bin count; defaults to the palette's step count
    pub k: Option<usize>,
    /// Color bar rectangle [left, bottom, width, height] as figure fractions
    pub colorbar_rect: [f32; 4],
    pub grid: bool,
    pub grid_alpha: f32,
    pub edge_color: String,
    pub edge_width: f32,
    pub raw_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("population_density.png"),
            raw_output: PathBuf::from("states.png"),
            figsize: (25.0, 10.0),
            dpi: 100.0,
            cmap: "Wistia".to_string(),
            scheme: Scheme::Quantiles,
            k: None,
            colorbar_rect: [0.8, 0.15, 0.015, 0.3],
            grid: true,
            grid_alpha: 0.3,
            edge_color: "#4d4d4d".to_string(),
            edge_width: 0.0,
            raw_color: "#1f77b4".to_string(),
        }
    }
}

impl RenderConfig {
    /// Canvas size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let (w, h) = self.figsize;
        ((w * self.dpi).round() as u32, (h * self.dpi).round() as u32)
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Load `path` when given, built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }
}
