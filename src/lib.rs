//! Population density choropleth of US states from the 2010 Census shapefile.

pub mod classify;
pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod glyphs;
pub mod legend;
pub mod normalize;
pub mod palette;
pub mod preview;
pub mod processing;
pub mod render;
pub mod ticks;
pub mod types;

pub use error::{Error, Result};
