//! Correlation value to heatmap paint.
//!
//! Two-segment linear scale: cool blue at -1, white at 0, warm red at +1.
//! Diagonal and missing cells get a flat grey.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const COOL: Rgb = Rgb::new(0x2b, 0x6c, 0xb0);
pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
pub const WARM: Rgb = Rgb::new(0xc5, 0x30, 0x30);
pub const DIAGONAL_GREY: Rgb = Rgb::new(0xd9, 0xd9, 0xd9);
pub const MISSING_GREY: Rgb = Rgb::new(0xe4, 0xe7, 0xeb);
pub const NEUTRAL_TEXT: Rgb = Rgb::new(0x33, 0x33, 0x33);
pub const LIGHT_TEXT: Rgb = Rgb::new(0xff, 0xff, 0xff);
pub const DARK_TEXT: Rgb = Rgb::new(0x11, 0x11, 0x11);

/// Above this magnitude the fill is saturated enough to need light text.
const LIGHT_TEXT_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPaint {
    pub fill: Rgb,
    pub text: Rgb,
}

pub fn mix(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let channel = |x: u8, y: u8| -> u8 {
        let v = x as f64 + (y as f64 - x as f64) * t;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgb {
        r: channel(a.r, b.r),
        g: channel(a.g, b.g),
        b: channel(a.b, b.b),
    }
}

/// Fill color for a (non-diagonal) cell value.
pub fn corr_to_color(value: Option<f64>) -> Rgb {
    let Some(v) = value.filter(|v| !v.is_nan()) else {
        return MISSING_GREY;
    };
    let t = v.clamp(-1.0, 1.0);
    if t < 0.0 {
        mix(COOL, WHITE, t + 1.0)
    } else {
        mix(WHITE, WARM, t)
    }
}

pub fn label_color(value: Option<f64>, is_diagonal: bool) -> Rgb {
    if is_diagonal {
        return NEUTRAL_TEXT;
    }
    match value.filter(|v| !v.is_nan()) {
        None => NEUTRAL_TEXT,
        Some(v) if v.abs() > LIGHT_TEXT_THRESHOLD => LIGHT_TEXT,
        Some(_) => DARK_TEXT,
    }
}

pub fn cell_paint(value: Option<f64>, is_diagonal: bool) -> CellPaint {
    let fill = if is_diagonal {
        DIAGONAL_GREY
    } else {
        corr_to_color(value)
    };
    CellPaint {
        fill,
        text: label_color(value, is_diagonal),
    }
}

/// `steps` evenly spaced fills from -1 to +1, for the legend strip.
pub fn legend_gradient(steps: usize) -> Vec<Rgb> {
    match steps {
        0 => Vec::new(),
        1 => vec![corr_to_color(Some(0.0))],
        n => (0..n)
            .map(|i| {
                let v = -1.0 + 2.0 * (i as f64) / ((n - 1) as f64);
                corr_to_color(Some(v))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_are_exact() {
        assert_eq!(corr_to_color(Some(-1.0)), COOL);
        assert_eq!(corr_to_color(Some(0.0)), WHITE);
        assert_eq!(corr_to_color(Some(1.0)), WARM);
    }

    #[test]
    fn values_beyond_range_clamp_to_anchors() {
        assert_eq!(corr_to_color(Some(-3.0)), COOL);
        assert_eq!(corr_to_color(Some(7.5)), WARM);
    }

    #[test]
    fn missing_and_diagonal_are_grey() {
        assert_eq!(cell_paint(None, false).fill, MISSING_GREY);
        assert_eq!(cell_paint(Some(f64::NAN), false).fill, MISSING_GREY);
        assert_eq!(cell_paint(None, false).text, NEUTRAL_TEXT);
        for v in [Some(-1.0), Some(0.3), Some(1.0), None] {
            let paint = cell_paint(v, true);
            assert_eq!(paint.fill, DIAGONAL_GREY);
            assert_eq!(paint.text, NEUTRAL_TEXT);
        }
    }

    #[test]
    fn midpoint_rounds_each_channel() {
        // -0.5 -> halfway between cool and white.
        // r: 43 + 212 * 0.5 = 149, g: 108 + 147 * 0.5 = 181.5 -> 182, b: 176 + 79 * 0.5 = 215.5 -> 216
        assert_eq!(corr_to_color(Some(-0.5)), Rgb::new(149, 182, 216));
        // 0.5 -> r: 255 - 58 * 0.5 = 226, g/b: 255 - 207 * 0.5 = 151.5 -> 152
        assert_eq!(corr_to_color(Some(0.5)), Rgb::new(226, 152, 152));
    }

    #[test]
    fn channels_are_monotonic_per_segment() {
        let mut prev = corr_to_color(Some(-1.0));
        for i in 1..=100 {
            let v = -1.0 + i as f64 / 100.0;
            let c = corr_to_color(Some(v));
            assert!(c.r >= prev.r && c.g >= prev.g && c.b >= prev.b, "v={v}");
            prev = c;
        }
        let mut prev = corr_to_color(Some(0.0));
        for i in 1..=100 {
            let v = i as f64 / 100.0;
            let c = corr_to_color(Some(v));
            assert!(c.r <= prev.r && c.g <= prev.g && c.b <= prev.b, "v={v}");
            prev = c;
        }
    }

    #[test]
    fn text_contrast_threshold() {
        assert_eq!(label_color(Some(0.6), false), DARK_TEXT);
        assert_eq!(label_color(Some(0.61), false), LIGHT_TEXT);
        assert_eq!(label_color(Some(-0.9), false), LIGHT_TEXT);
        assert_eq!(label_color(Some(0.0), false), DARK_TEXT);
    }

    #[test]
    fn legend_spans_the_scale() {
        let strip = legend_gradient(5);
        assert_eq!(strip.len(), 5);
        assert_eq!(strip[0], COOL);
        assert_eq!(strip[2], WHITE);
        assert_eq!(strip[4], WARM);
        assert!(legend_gradient(0).is_empty());
    }
}
