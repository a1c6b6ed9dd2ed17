use plotters::style::{RGBAColor, RGBColor};

/// Chart theme configuration
pub struct ChartTheme {
    pub background_color: RGBAColor,
    pub text_color: RGBAColor,
    pub grid_color: RGBAColor,
    pub axis_color: RGBAColor,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background_color: RGBAColor(255, 255, 255, 1.0),
            text_color: RGBAColor(30, 30, 30, 1.0),
            grid_color: RGBAColor(0, 0, 0, 0.12),
            axis_color: RGBAColor(0, 0, 0, 0.8),
        }
    }
}

/// Chart style configuration. Sizes are in pixels.
pub struct ChartStyle {
    pub line_width: u32,
    pub marker_size: i32,
    pub font_size: i32,
    pub caption_size: i32,
    pub margin: i32,
    pub label_area_size: i32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            line_width: 2,
            marker_size: 3,
            font_size: 15,
            caption_size: 24,
            margin: 15,
            label_area_size: 60,
        }
    }
}

pub const BLUE: RGBColor = RGBColor(31, 119, 180);
pub const RED: RGBColor = RGBColor(214, 39, 40);
pub const GREEN: RGBColor = RGBColor(44, 160, 44);
pub const ORANGE: RGBColor = RGBColor(255, 127, 14);
pub const PURPLE: RGBColor = RGBColor(148, 103, 189);
pub const GREY: RGBColor = RGBColor(127, 127, 127);
pub const BROWN: RGBColor = RGBColor(140, 86, 75);
pub const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
pub const DARK_RED: RGBColor = RGBColor(139, 0, 0);
pub const DARK_ORANGE: RGBColor = RGBColor(255, 140, 0);
pub const DARK_BLUE: RGBColor = RGBColor(0, 0, 139);
pub const DARK_GREEN: RGBColor = RGBColor(0, 100, 0);

/// Weekly report palette
pub const REPORT_BLUE: RGBColor = RGBColor(0x34, 0x98, 0xdb);
pub const REPORT_RED: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);
pub const REPORT_GREEN: RGBColor = RGBColor(0x2e, 0xcc, 0x40);
pub const REPORT_YELLOW: RGBColor = RGBColor(0xf1, 0xc4, 0x0f);

/// Bar colour by sign: green up, red down, grey flat.
pub fn sign_color(value: f64) -> RGBColor {
    if value > 0.0 {
        GREEN
    } else if value < 0.0 {
        RED
    } else {
        GREY
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

fn blend(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    RGBColor(lerp(a.0, b.0, t), lerp(a.1, b.1, t), lerp(a.2, b.2, t))
}

/// Blue-white-red map for values in `[-1, 1]`. NaN maps to grey.
pub fn diverging(value: f64) -> RGBColor {
    const LOW: RGBColor = RGBColor(5, 48, 97);
    const MID: RGBColor = RGBColor(247, 247, 247);
    const HIGH: RGBColor = RGBColor(103, 0, 31);

    if value.is_nan() {
        return RGBColor(200, 200, 200);
    }
    let v = value.clamp(-1.0, 1.0);
    if v < 0.0 {
        blend(MID, LOW, -v)
    } else {
        blend(MID, HIGH, v)
    }
}

/// Dark purple to yellow, used to order scatter points in time.
pub fn sequential(t: f64) -> RGBColor {
    const START: RGBColor = RGBColor(68, 1, 84);
    const MIDDLE: RGBColor = RGBColor(33, 145, 140);
    const END: RGBColor = RGBColor(253, 231, 37);

    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        blend(START, MIDDLE, t * 2.0)
    } else {
        blend(MIDDLE, END, (t - 0.5) * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_color() {
        assert_eq!(sign_color(3.0), GREEN);
        assert_eq!(sign_color(-0.5), RED);
        assert_eq!(sign_color(0.0), GREY);
    }

    #[test]
    fn test_diverging_endpoints() {
        assert_eq!(diverging(0.0), RGBColor(247, 247, 247));
        assert_eq!(diverging(1.0), RGBColor(103, 0, 31));
        assert_eq!(diverging(-2.0), RGBColor(5, 48, 97));
        assert_eq!(diverging(f64::NAN), RGBColor(200, 200, 200));
    }

    #[test]
    fn test_sequential_endpoints() {
        assert_eq!(sequential(0.0), RGBColor(68, 1, 84));
        assert_eq!(sequential(1.0), RGBColor(253, 231, 37));
    }
}
