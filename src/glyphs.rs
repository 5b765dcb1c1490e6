//! Stroke-drawn numeric labels.
//!
//! Tick labels only ever contain digits, a sign and a decimal point, so each
//! glyph is a handful of line segments in a seven-segment layout.

use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `x` is the left edge of the text
    Left,
    /// `x` is the horizontal center of the text
    Center,
    /// `x` is the right edge of the text
    Right,
}

type Segment = ((f32, f32), (f32, f32));

/// Segments for one character in a unit cell centred on the origin, x and y in [-0.5, 0.5].
fn segments(ch: char) -> &'static [Segment] {
    const T: Segment = ((-0.5, -0.5), (0.5, -0.5));
    const M: Segment = ((-0.5, 0.0), (0.5, 0.0));
    const B: Segment = ((-0.5, 0.5), (0.5, 0.5));
    const TL: Segment = ((-0.5, -0.5), (-0.5, 0.0));
    const TR: Segment = ((0.5, -0.5), (0.5, 0.0));
    const BL: Segment = ((-0.5, 0.0), (-0.5, 0.5));
    const BR: Segment = ((0.5, 0.0), (0.5, 0.5));

    match ch {
        '0' => &[T, TR, BR, B, BL, TL],
        '1' => &[((0.0, -0.5), (0.0, 0.5))],
        '2' => &[T, TR, M, BL, B],
        '3' => &[T, TR, M, BR, B],
        '4' => &[TL, M, TR, BR],
        '5' => &[T, TL, M, BR, B],
        '6' => &[T, TL, BL, B, BR, M],
        '7' => &[T, ((0.5, -0.5), (0.0, 0.5))],
        '8' => &[T, TR, BR, B, BL, TL, M],
        '9' => &[M, TL, T, TR, BR, B],
        '-' => &[((-0.35, 0.0), (0.35, 0.0))],
        '.' => &[((0.0, 0.42), (0.0, 0.5))],
        _ => &[],
    }
}

fn advance(ch: char, size: f32) -> f32 {
    match ch {
        '.' => size * 0.35,
        _ => size * 0.75,
    }
}

/// Width in pixels of `text` at glyph height `size`.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().map(|c| advance(c, size)).sum()
}

/// Draw `text` with its vertical middle at `y`.
pub fn draw_text(pixmap: &mut Pixmap, text: &str, x: f32, y: f32, size: f32, anchor: Anchor, color: [u8; 4]) {
    let width = text_width(text, size);
    let mut cursor = match anchor {
        Anchor::Left => x,
        Anchor::Center => x - width / 2.0,
        Anchor::Right => x - width,
    };

    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;

    let stroke = Stroke {
        width: (size * 0.12).max(1.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let glyph_w = size * 0.5;
    for ch in text.chars() {
        let step = advance(ch, size);
        let cx = cursor + step / 2.0;

        let mut pb = PathBuilder::new();
        for &((x1, y1), (x2, y2)) in segments(ch) {
            pb.move_to(cx + x1 * glyph_w, y + y1 * size);
            pb.line_to(cx + x2 * glyph_w, y + y2 * size);
        }
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }

        cursor += step;
    }
}
