//! Named sequential colormaps.

use crate::error::{Error, Result};

/// A colormap defined by equally spaced RGB anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub name: String,
    stops: Vec<[u8; 3]>, // Invariant: length >= 2
}

// Wistia anchors are the (0, .25, .5, .75, 1) segment points of the matplotlib map.
const WISTIA: &[&str] = &["#e4ff7a", "#ffe81a", "#ffbd00", "#ffa000", "#fc7f00"];
const YL_OR_RD: &[&str] = &[
    "#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c", "#fc4e2a", "#e31a1c", "#bd0026", "#800026",
];
const BLUES: &[&str] = &[
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c", "#08306b",
];
const GREENS: &[&str] = &[
    "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#006d2c", "#00441b",
];
const GREYS: &[&str] = &[
    "#ffffff", "#f0f0f0", "#d9d9d9", "#bdbdbd", "#969696", "#737373", "#525252", "#252525", "#000000",
];

const NAMED: &[(&str, &[&str])] = &[
    ("Wistia", WISTIA),
    ("YlOrRd", YL_OR_RD),
    ("Blues", BLUES),
    ("Greens", GREENS),
    ("Greys", GREYS),
];

impl Palette {
    /// Look up a palette by name (case-insensitive).
    pub fn named(name: &str) -> Result<Self> {
        let (canonical, hexes) = NAMED
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                let known: Vec<&str> = NAMED.iter().map(|(n, _)| *n).collect();
                Error::Config(format!("Unknown palette '{}' (known: {})", name, known.join(", ")))
            })?;

        let stops = hexes.iter().map(|h| parse_hex(h)).collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: canonical.to_string(),
            stops,
        })
    }

    /// Number of anchor colors.
    pub fn steps(&self) -> usize {
        self.stops.len()
    }

    /// Color at `t`, clamped to [0, 1].
    pub fn sample(&self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (self.stops.len() - 1) as f64;
        let i = (scaled.floor() as usize).min(self.stops.len() - 2);
        let frac = scaled - i as f64;

        let (a, b) = (self.stops[i], self.stops[i + 1]);
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
    }
}

pub fn parse_hex(hex: &str) -> Result<[u8; 3]> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(Error::Config(format!("Invalid hex color '{}'", hex)));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| Error::Config(format!("Invalid hex color '{}'", hex)))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}
