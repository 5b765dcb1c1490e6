//! Color scale for the map fill and the companion color bar.
//!
//! The map fill is discrete (one color per class) while the color bar is a
//! continuous ramp between the rounded data bounds. Both use the same palette.

use crate::classify::{classify, Classification};
use crate::config::RenderConfig;
use crate::error::Result;
use crate::glyphs::{draw_text, Anchor};
use crate::palette::Palette;
use crate::processing::legend_range;
use crate::render::PixelRect;
use crate::ticks::{format_tick, nice_ticks};
use tiny_skia::{Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

#[derive(Debug, Clone)]
pub struct ColorScale {
    pub palette: Palette,
    pub classification: Classification,
    pub vmin: f64,
    pub vmax: f64,
}

impl ColorScale {
    pub fn build(densities: &[f64], config: &RenderConfig) -> Result<Self> {
        let palette = Palette::named(&config.cmap)?;
        let k = config.k.unwrap_or_else(|| palette.steps());
        let classification = classify(densities, config.scheme, k)?;
        let (vmin, vmax) = legend_range(densities)?;

        Ok(Self {
            palette,
            classification,
            vmin,
            vmax,
        })
    }

    /// Fill color for the value at `index` in the classified sequence.
    pub fn fill_color(&self, index: usize) -> [u8; 3] {
        self.palette.sample(self.classification.position(index))
    }

    /// Color the bar shows for `value` on the continuous [vmin, vmax] scale.
    pub fn bar_color(&self, value: f64) -> [u8; 3] {
        let span = self.vmax - self.vmin;
        let t = if span > 0.0 { (value - self.vmin) / span } else { 0.0 };
        self.palette.sample(t)
    }
}

/// Draw the color bar into `rect`, low values at the bottom.
pub fn draw_colorbar(pixmap: &mut Pixmap, rect: PixelRect, scale: &ColorScale, pt: f32) {
    let rows = rect.height.round().max(1.0) as u32;
    let row_h = rect.height / rows as f32;

    let mut paint = Paint::default();
    paint.anti_alias = false;
    for row in 0..rows {
        let t = if rows > 1 { row as f64 / (rows - 1) as f64 } else { 0.0 };
        let [r, g, b] = scale.palette.sample(t);
        paint.set_color_rgba8(r, g, b, 255);

        // Overlap rows slightly so no background seams show between them.
        let y = rect.bottom() - (row + 1) as f32 * row_h;
        if let Some(band) = Rect::from_xywh(rect.left, y, rect.width, row_h + 0.5) {
            pixmap.fill_rect(band, &paint, Transform::identity(), None);
        }
    }

    let mut outline = Paint::default();
    outline.set_color_rgba8(0, 0, 0, 255);
    outline.anti_alias = true;
    let stroke = Stroke {
        width: 0.8 * pt,
        ..Stroke::default()
    };
    if let Some(frame) = Rect::from_xywh(rect.left, rect.top, rect.width, rect.height) {
        let path = PathBuilder::from_rect(frame);
        pixmap.stroke_path(&path, &outline, &stroke, Transform::identity(), None);
    }

    let (ticks, step) = nice_ticks(scale.vmin, scale.vmax, 5);
    let span = scale.vmax - scale.vmin;
    let tick_len = 3.5 * pt;
    let font = 7.0 * pt;

    for value in ticks {
        let frac = if span > 0.0 { ((value - scale.vmin) / span) as f32 } else { 0.0 };
        let y = rect.bottom() - frac * rect.height;
        let x = rect.right();

        let mut pb = PathBuilder::new();
        pb.move_to(x, y);
        pb.line_to(x + tick_len, y);
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &outline, &stroke, Transform::identity(), None);
        }

        let label = format_tick(value, step);
        draw_text(pixmap, &label, x + tick_len + 3.5 * pt, y, font, Anchor::Left, [0, 0, 0, 255]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_from_densities() {
        let config = RenderConfig::default();
        let scale = ColorScale::build(&[50.0, 200.0, 10.0], &config).unwrap();
        assert_eq!(scale.vmin, 10.0);
        assert_eq!(scale.vmax, 200.0);
        assert_eq!(scale.palette.name, "Wistia");

        // Lowest density gets the bottom color, highest the top.
        assert_eq!(scale.fill_color(2), scale.palette.sample(0.0));
        assert_eq!(scale.fill_color(1), scale.palette.sample(1.0));
    }

    #[test]
    fn test_bar_is_continuous_while_fill_is_binned() {
        let config = RenderConfig {
            k: Some(2),
            ..RenderConfig::default()
        };
        let values = [0.0, 1.0, 2.0, 3.0, 100.0];
        let scale = ColorScale::build(&values, &config).unwrap();

        // 3.0 shares a bin with 100.0, so the fill matches the top of the ramp
        // while the bar puts it near the bottom.
        assert_eq!(scale.fill_color(3), scale.palette.sample(1.0));
        assert_eq!(scale.bar_color(3.0), scale.palette.sample(0.03));
    }

    #[test]
    fn test_colorbar_draws_gradient() {
        let scale = ColorScale::build(&[1.0, 2.0, 3.0], &RenderConfig::default()).unwrap();
        let mut pixmap = Pixmap::new(100, 200).unwrap();
        let rect = PixelRect {
            left: 20.0,
            top: 20.0,
            width: 20.0,
            height: 160.0,
        };
        draw_colorbar(&mut pixmap, rect, &scale, 1.0);

        let close = |x: u32, y: u32, expected: [u8; 3]| {
            let p = pixmap.pixel(x, y).unwrap();
            [p.red(), p.green(), p.blue()]
                .iter()
                .zip(expected)
                .all(|(&got, want)| (got as i32 - want as i32).abs() <= 8)
        };
        assert!(close(30, 177, scale.palette.sample(0.0)));
        assert!(close(30, 22, scale.palette.sample(1.0)));
        assert!(!close(30, 100, scale.palette.sample(0.0)));
    }
}
