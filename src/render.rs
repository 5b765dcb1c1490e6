use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::glyphs::{draw_text, Anchor};
use crate::legend::{draw_colorbar, ColorScale};
use crate::palette::parse_hex;
use crate::ticks::{format_tick, nice_ticks};
use crate::types::{RegionTable, POPULATION_DENSITY};
use geo::{BoundingRect, LineString, MultiPolygon};
use image::RgbaImage;
use std::path::Path;
use tiny_skia::{
    Color, FillRule, LineCap, Paint, PathBuilder, Pixmap, Rect, Stroke, StrokeDash, Transform,
};
use tracing::{debug, info};

// Default subplot placement [left, bottom, width, height] as figure fractions.
const AXES_RECT: [f32; 4] = [0.125, 0.11, 0.775, 0.77];
// Fraction of the data span added on each side of the map.
const MARGIN: f64 = 0.05;
const GRID_COLOR: [u8; 3] = [0xb0, 0xb0, 0xb0];

/// Axis-aligned rectangle in pixel coordinates, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    /// Convert a [left, bottom, width, height] figure-fraction rectangle.
    pub fn from_fraction(frac: [f32; 4], fig_w: u32, fig_h: u32) -> Self {
        let (w, h) = (fig_w as f32, fig_h as f32);
        let [left, bottom, width, height] = frac;
        Self {
            left: left * w,
            top: h - (bottom + height) * h,
            width: width * w,
            height: height * h,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Largest rectangle with `height / width == ratio` centred inside this one.
    pub fn fit_ratio(&self, ratio: f32) -> Self {
        if self.height / self.width > ratio {
            let height = self.width * ratio;
            Self {
                top: self.top + (self.height - height) / 2.0,
                height,
                ..*self
            }
        } else {
            let width = self.height / ratio;
            Self {
                left: self.left + (self.width - width) / 2.0,
                width,
                ..*self
            }
        }
    }
}

/// Data limits of the map in lon/lat degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Extent {
    /// Union of the bounding boxes of every region, or `None` for an empty table.
    pub fn of_table(table: &RegionTable) -> Option<Self> {
        table
            .regions()
            .iter()
            .filter_map(|r| r.geometry.bounding_rect())
            .map(|rect| Self {
                min_x: rect.min().x,
                max_x: rect.max().x,
                min_y: rect.min().y,
                max_y: rect.max().y,
            })
            .reduce(|a, b| Self {
                min_x: a.min_x.min(b.min_x),
                max_x: a.max_x.max(b.max_x),
                min_y: a.min_y.min(b.min_y),
                max_y: a.max_y.max(b.max_y),
            })
    }

    pub fn with_margin(&self, fraction: f64) -> Self {
        let dx = (self.max_x - self.min_x) * fraction;
        let dy = (self.max_y - self.min_y) * fraction;
        Self {
            min_x: self.min_x - dx,
            max_x: self.max_x + dx,
            min_y: self.min_y - dy,
            max_y: self.max_y + dy,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Vertical stretch that makes a degree of longitude and latitude look
    /// equally long at the middle latitude.
    pub fn geographic_aspect(&self) -> f64 {
        let mid = (self.min_y + self.max_y) / 2.0;
        1.0 / mid.to_radians().cos()
    }
}

/// Maps data coordinates into the pixel box of the map axes.
#[derive(Debug, Clone, Copy)]
pub struct MapAxes {
    pub extent: Extent,
    pub rect: PixelRect,
}

impl MapAxes {
    pub fn layout(table: &RegionTable, fig_w: u32, fig_h: u32) -> Result<Self> {
        let bounds = Extent::of_table(table)
            .ok_or_else(|| Error::Render("no geometry to draw".to_string()))?;
        let extent = bounds.with_margin(MARGIN);
        if !(extent.width() > 0.0 && extent.height() > 0.0) {
            return Err(Error::Render("geometry has zero extent".to_string()));
        }

        let ratio = (extent.height() * bounds.geographic_aspect() / extent.width()) as f32;
        let rect = PixelRect::from_fraction(AXES_RECT, fig_w, fig_h).fit_ratio(ratio);
        debug!("Map axes {:?} for extent {:?}", rect, extent);

        Ok(Self { extent, rect })
    }

    pub fn project(&self, x: f64, y: f64) -> (f32, f32) {
        let e = &self.extent;
        let px = self.rect.left as f64 + (x - e.min_x) / e.width() * self.rect.width as f64;
        let py = self.rect.top as f64 + (e.max_y - y) / e.height() * self.rect.height as f64;
        (px as f32, py as f32)
    }
}

/// Render the density choropleth with its color bar and save it as PNG.
pub fn render_choropleth(table: &RegionTable, config: &RenderConfig, output: &Path) -> Result<ColorScale> {
    let densities = table.numeric_column(POPULATION_DENSITY)?;
    let scale = ColorScale::build(&densities, config)?;
    info!(
        "Rendering {} regions: {} {:?} bins, legend {}..{}",
        table.len(),
        scale.classification.k(),
        config.scheme,
        scale.vmin,
        scale.vmax
    );

    let fills: Vec<[u8; 3]> = (0..table.len()).map(|i| scale.fill_color(i)).collect();
    let (mut pixmap, pt) = draw_map(table, config, &fills)?;

    let (fig_w, fig_h) = config.pixel_size();
    let bar = PixelRect::from_fraction(config.colorbar_rect, fig_w, fig_h);
    draw_colorbar(&mut pixmap, bar, &scale, pt);

    save_png(&pixmap, output)?;
    Ok(scale)
}

/// Render every region in one flat color, without a legend.
pub fn render_raw(table: &RegionTable, config: &RenderConfig, output: &Path) -> Result<()> {
    info!("Rendering raw map of {} regions", table.len());
    let color = parse_hex(&config.raw_color)?;
    let fills = vec![color; table.len()];
    let (pixmap, _) = draw_map(table, config, &fills)?;
    save_png(&pixmap, output)
}

/// Draw background, regions, graticule and axes. Returns the canvas and pixels per point.
fn draw_map(table: &RegionTable, config: &RenderConfig, fills: &[[u8; 3]]) -> Result<(Pixmap, f32)> {
    let (fig_w, fig_h) = config.pixel_size();
    let mut pixmap = Pixmap::new(fig_w, fig_h)
        .ok_or_else(|| Error::Render(format!("cannot allocate {}x{} canvas", fig_w, fig_h)))?;
    pixmap.fill(Color::WHITE);

    let pt = config.dpi / 72.0;
    let axes = MapAxes::layout(table, fig_w, fig_h)?;

    let edge = if config.edge_width > 0.0 {
        Some(parse_hex(&config.edge_color)?)
    } else {
        None
    };

    for (region, &[r, g, b]) in table.regions().iter().zip(fills) {
        let Some(path) = region_path(&region.geometry, &axes) else {
            continue;
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, 255);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), None);

        if let Some([er, eg, eb]) = edge {
            paint.set_color_rgba8(er, eg, eb, 255);
            let stroke = Stroke {
                width: config.edge_width * pt,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    draw_axes(&mut pixmap, &axes, config, pt);
    Ok((pixmap, pt))
}

/// All rings of a multipolygon as one path; holes cut out under the even-odd rule.
fn region_path(geometry: &MultiPolygon<f64>, axes: &MapAxes) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for polygon in geometry {
        push_ring(&mut pb, polygon.exterior(), axes);
        for interior in polygon.interiors() {
            push_ring(&mut pb, interior, axes);
        }
    }
    pb.finish()
}

fn push_ring(pb: &mut PathBuilder, ring: &LineString<f64>, axes: &MapAxes) {
    let mut coords = ring.coords();
    let Some(first) = coords.next() else {
        return;
    };
    let (x, y) = axes.project(first.x, first.y);
    pb.move_to(x, y);
    for c in coords {
        let (x, y) = axes.project(c.x, c.y);
        pb.line_to(x, y);
    }
    pb.close();
}

fn draw_axes(pixmap: &mut Pixmap, axes: &MapAxes, config: &RenderConfig, pt: f32) {
    let e = axes.extent;
    let (x_ticks, x_step) = nice_ticks(e.min_x, e.max_x, 9);
    let (y_ticks, y_step) = nice_ticks(e.min_y, e.max_y, 9);
    let rect = axes.rect;

    if config.grid {
        let mut paint = Paint::default();
        let alpha = (config.grid_alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        paint.set_color_rgba8(GRID_COLOR[0], GRID_COLOR[1], GRID_COLOR[2], alpha);
        paint.anti_alias = true;

        let width = 0.8 * pt;
        let stroke = Stroke {
            width,
            line_cap: LineCap::Butt,
            dash: StrokeDash::new(vec![3.7 * width, 1.6 * width], 0.0),
            ..Stroke::default()
        };

        for &x in &x_ticks {
            let (px, _) = axes.project(x, e.min_y);
            stroke_line(pixmap, (px, rect.top), (px, rect.bottom()), &paint, &stroke);
        }
        for &y in &y_ticks {
            let (_, py) = axes.project(e.min_x, y);
            stroke_line(pixmap, (rect.left, py), (rect.right(), py), &paint, &stroke);
        }
    }

    let mut black = Paint::default();
    black.set_color_rgba8(0, 0, 0, 255);
    black.anti_alias = true;
    let stroke = Stroke {
        width: 0.8 * pt,
        ..Stroke::default()
    };

    if let Some(frame) = Rect::from_ltrb(rect.left, rect.top, rect.right(), rect.bottom()) {
        pixmap.stroke_path(&PathBuilder::from_rect(frame), &black, &stroke, Transform::identity(), None);
    }

    let tick_len = 3.5 * pt;
    let font = 7.0 * pt;
    let pad = 3.5 * pt;

    for &x in &x_ticks {
        let (px, _) = axes.project(x, e.min_y);
        let y = rect.bottom();
        stroke_line(pixmap, (px, y), (px, y + tick_len), &black, &stroke);
        let label = format_tick(x, x_step);
        draw_text(pixmap, &label, px, y + tick_len + pad + font / 2.0, font, Anchor::Center, [0, 0, 0, 255]);
    }
    for &y in &y_ticks {
        let (_, py) = axes.project(e.min_x, y);
        let x = rect.left;
        stroke_line(pixmap, (x, py), (x - tick_len, py), &black, &stroke);
        let label = format_tick(y, y_step);
        draw_text(pixmap, &label, x - tick_len - pad, py, font, Anchor::Right, [0, 0, 0, 255]);
    }
}

fn stroke_line(pixmap: &mut Pixmap, from: (f32, f32), to: (f32, f32), paint: &Paint, stroke: &Stroke) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.0, from.1);
    pb.line_to(to.0, to.1);
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, paint, stroke, Transform::identity(), None);
    }
}

pub fn save_png(pixmap: &Pixmap, path: &Path) -> Result<()> {
    // The canvas starts opaque white, so premultiplied and straight alpha coincide.
    let img = RgbaImage::from_raw(pixmap.width(), pixmap.height(), pixmap.data().to_vec())
        .ok_or_else(|| Error::Render("canvas buffer size mismatch".to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    img.save(path)?;
    info!("Wrote {:?} ({}x{})", path, pixmap.width(), pixmap.height());
    Ok(())
}
