use ast::number_value::format_scalar;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ColorValue {
    pub red: i32,
    pub green: i32,
    pub blue: i32,
    pub alpha: f64,
    pub original: Option<String>,
}

fn clamp_channel(c: f64) -> i32 {
    c.round().max(0.0).min(255.0) as i32
}

impl ColorValue {
    pub fn from_rgba(red: f64, green: f64, blue: f64, alpha: f64) -> ColorValue {
        ColorValue {
            red:   clamp_channel(red),
            green: clamp_channel(green),
            blue:  clamp_channel(blue),
            alpha: alpha.max(0.0).min(1.0),
            original: None,
        }
    }

    pub fn from_hex(hex: &str) -> Option<ColorValue> {
        let digits = hex.trim_start_matches('#');
        if !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
            return None
        }
        let channel = |s: &str| i32::from_str_radix(s, 16).ok();
        let (red, green, blue) = match digits.len() {
            3 => (
                channel(&digits[0..1])? * 17,
                channel(&digits[1..2])? * 17,
                channel(&digits[2..3])? * 17,
            ),
            6 => (
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            ),
            _ => return None,
        };
        Some(ColorValue {
            red: red, green: green, blue: blue,
            alpha: 1.0,
            original: Some(hex.to_string()),
        })
    }

    /// Hue in degrees, saturation and lightness in percent.
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let r = self.red as f64 / 255.0;
        let g = self.green as f64 / 255.0;
        let b = self.blue as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let l = (max + min) / 2.0;

        if delta == 0.0 {
            return (0.0, 0.0, l * 100.0)
        }

        let s = if l > 0.5 { delta / (2.0 - max - min) } else { delta / (max + min) };
        let h = if max == r {
            (g - b) / delta + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };

        (h * 60.0, s * 100.0, l * 100.0)
    }

    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64, alpha: f64) -> ColorValue {
        let h = ((hue % 360.0) + 360.0) % 360.0 / 360.0;
        let s = saturation.max(0.0).min(100.0) / 100.0;
        let l = lightness.max(0.0).min(100.0) / 100.0;

        if s == 0.0 {
            let grey = l * 255.0;
            return ColorValue::from_rgba(grey, grey, grey, alpha)
        }

        let m2 = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
        let m1 = l * 2.0 - m2;

        ColorValue::from_rgba(
            hue_to_rgb(m1, m2, h + 1.0 / 3.0) * 255.0,
            hue_to_rgb(m1, m2, h) * 255.0,
            hue_to_rgb(m1, m2, h - 1.0 / 3.0) * 255.0,
            alpha,
        )
    }

    pub fn adjust_hsl(&self, hue: f64, saturation: f64, lightness: f64) -> ColorValue {
        let (h, s, l) = self.to_hsl();
        ColorValue::from_hsl(h + hue, s + saturation, l + lightness, self.alpha)
    }

    /// Weighted mix, `weight` being the share of `self` between 0 and 1.
    pub fn mix(&self, other: &ColorValue, weight: f64) -> ColorValue {
        let w = weight * 2.0 - 1.0;
        let a = self.alpha - other.alpha;
        let combined = if w * a == -1.0 { w } else { (w + a) / (1.0 + w * a) };
        let w1 = (combined + 1.0) / 2.0;
        let w2 = 1.0 - w1;

        ColorValue::from_rgba(
            self.red as f64 * w1 + other.red as f64 * w2,
            self.green as f64 * w1 + other.green as f64 * w2,
            self.blue as f64 * w1 + other.blue as f64 * w2,
            self.alpha * weight + other.alpha * (1.0 - weight),
        )
    }
}

fn hue_to_rgb(m1: f64, m2: f64, h: f64) -> f64 {
    let h = if h < 0.0 { h + 1.0 } else if h > 1.0 { h - 1.0 } else { h };
    if h * 6.0 < 1.0 {
        m1 + (m2 - m1) * h * 6.0
    } else if h * 2.0 < 1.0 {
        m2
    } else if h * 3.0 < 2.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
    } else {
        m1
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref original) = self.original {
            return write!(f, "{}", original)
        }
        if self.alpha < 1.0 {
            write!(f, "rgba({}, {}, {}, {})",
                   self.red, self.green, self.blue, format_scalar(self.alpha))
        } else {
            write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reads_short_and_long_hex() {
        let short = ColorValue::from_hex("#fa0").unwrap();
        assert_eq!((255, 170, 0), (short.red, short.green, short.blue));
        let long = ColorValue::from_hex("#0a64c8").unwrap();
        assert_eq!((10, 100, 200), (long.red, long.green, long.blue));
        assert_eq!(None, ColorValue::from_hex("#abcd"));
        assert_eq!(None, ColorValue::from_hex("#zzz"));
    }

    #[test]
    fn it_keeps_the_original_spelling() {
        assert_eq!("#FFF", ColorValue::from_hex("#FFF").unwrap().to_string());
    }

    #[test]
    fn it_prints_computed_colors_as_hex_or_rgba() {
        assert_eq!("#ff0000", ColorValue::from_rgba(255.0, 0.0, 0.0, 1.0).to_string());
        assert_eq!("rgba(0, 0, 0, 0.5)", ColorValue::from_rgba(0.0, 0.0, 0.0, 0.5).to_string());
    }

    #[test]
    fn it_lightens_through_hsl() {
        let red = ColorValue::from_rgba(255.0, 0.0, 0.0, 1.0);
        assert_eq!("#ff6666", red.adjust_hsl(0.0, 0.0, 20.0).to_string());
        assert_eq!("#990000", red.adjust_hsl(0.0, 0.0, -20.0).to_string());
    }

    #[test]
    fn it_mixes_evenly() {
        let red = ColorValue::from_rgba(255.0, 0.0, 0.0, 1.0);
        let blue = ColorValue::from_rgba(0.0, 0.0, 255.0, 1.0);
        assert_eq!("#800080", red.mix(&blue, 0.5).to_string());
    }
}
