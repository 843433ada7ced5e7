//! Pure color manipulation matching the rendering engine's derivation rules.
//!
//! Colors are CSS strings (`#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`,
//! `hsl()`, `hsla()`). Every helper returns a new CSS string.

use crate::config::number::css;
use crate::error::ColorError;
use std::fmt;
use std::str::FromStr;

/// Helper names callable from code overrides.
pub const HELPERS: [&str; 7] = [
    "alpha",
    "lighten",
    "darken",
    "emphasize",
    "getContrastRatio",
    "rgbToHex",
    "hexToRgb",
];

/// Text color used on dark backgrounds.
pub const LIGHT_TEXT: &str = "#fff";

/// Text color used on light backgrounds.
pub const DARK_TEXT: &str = "rgba(0, 0, 0, 0.87)";

/// Color model of a decomposed color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Rgb,
    Rgba,
    Hsl,
    Hsla,
}

impl ColorSpace {
    fn name(&self) -> &'static str {
        match self {
            ColorSpace::Rgb => "rgb",
            ColorSpace::Rgba => "rgba",
            ColorSpace::Hsl => "hsl",
            ColorSpace::Hsla => "hsla",
        }
    }

    fn is_hsl(&self) -> bool {
        matches!(self, ColorSpace::Hsl | ColorSpace::Hsla)
    }

    fn with_alpha(&self) -> Self {
        if self.is_hsl() {
            ColorSpace::Hsla
        } else {
            ColorSpace::Rgba
        }
    }
}

/// A color split into its channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    pub space: ColorSpace,
    /// `r, g, b` in 0-255 or `h, s, l` with `s`/`l` in percent.
    pub values: [f64; 3],
    pub alpha: Option<f64>,
}

impl Color {
    /// Parse a CSS color string.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex, input);
        }

        let open = s
            .find('(')
            .ok_or_else(|| ColorError::Unsupported(input.to_string()))?;
        if !s.ends_with(')') {
            return Err(ColorError::Unsupported(input.to_string()));
        }

        let space = match s[..open].trim() {
            "rgb" => ColorSpace::Rgb,
            "rgba" => ColorSpace::Rgba,
            "hsl" => ColorSpace::Hsl,
            "hsla" => ColorSpace::Hsla,
            _ => return Err(ColorError::Unsupported(input.to_string())),
        };

        let channels = s[open + 1..s.len() - 1]
            .split(',')
            .map(|part| {
                part.trim()
                    .trim_end_matches('%')
                    .trim_end_matches("deg")
                    .parse::<f64>()
                    .map_err(|_| ColorError::InvalidChannel(input.to_string()))
            })
            .collect::<Result<Vec<f64>, ColorError>>()?;

        match channels.as_slice() {
            [a, b, c] => Ok(Color {
                space,
                values: [*a, *b, *c],
                alpha: None,
            }),
            [a, b, c, d] => Ok(Color {
                space: space.with_alpha(),
                values: [*a, *b, *c],
                alpha: Some(*d),
            }),
            _ => Err(ColorError::InvalidChannel(input.to_string())),
        }
    }

    fn parse_hex(hex: &str, input: &str) -> Result<Self, ColorError> {
        let digits: Vec<u8> = match hex.len() {
            3 | 4 => hex
                .chars()
                .map(|c| u8::from_str_radix(&format!("{c}{c}"), 16))
                .collect::<Result<_, _>>(),
            6 | 8 => (0..hex.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(hex.get(i..i + 2).unwrap_or("zz"), 16))
                .collect::<Result<_, _>>(),
            _ => return Err(ColorError::Unsupported(input.to_string())),
        }
        .map_err(|_| ColorError::InvalidChannel(input.to_string()))?;

        let values = [
            f64::from(digits[0]),
            f64::from(digits[1]),
            f64::from(digits[2]),
        ];
        Ok(match digits.get(3) {
            Some(a) => Color {
                space: ColorSpace::Rgba,
                values,
                alpha: Some((f64::from(*a) / 255.0 * 1000.0).round() / 1000.0),
            },
            None => Color {
                space: ColorSpace::Rgb,
                values,
                alpha: None,
            },
        })
    }

    /// Convert to the rgb model, keeping alpha.
    pub fn to_rgb(&self) -> Color {
        if !self.space.is_hsl() {
            return self.clone();
        }
        let [h, s, l] = self.values;
        let s = s / 100.0;
        let l = l / 100.0;
        let a = s * l.min(1.0 - l);
        let f = |n: f64| {
            let k = (n + h / 30.0) % 12.0;
            l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0)
        };
        Color {
            space: if self.alpha.is_some() {
                ColorSpace::Rgba
            } else {
                ColorSpace::Rgb
            },
            values: [
                (f(0.0) * 255.0).round(),
                (f(8.0) * 255.0).round(),
                (f(4.0) * 255.0).round(),
            ],
            alpha: self.alpha,
        }
    }

    /// Relative luminance, rounded to three decimals.
    pub fn luminance(&self) -> f64 {
        fn channel(v: f64) -> f64 {
            let c = v / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let [r, g, b] = self.to_rgb().values;
        let lum = 0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b);
        (lum * 1000.0).round() / 1000.0
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.values;
        let body = if self.space.is_hsl() {
            format!("{}, {}%, {}%", css(a), css(b), css(c))
        } else {
            format!("{}, {}, {}", a.trunc(), b.trunc(), c.trunc())
        };
        match self.alpha {
            Some(alpha) => write!(f, "{}({}, {})", self.space.name(), body, css(alpha)),
            None => write!(f, "{}({})", self.space.name(), body),
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Set the alpha channel.
pub fn alpha(color: &str, value: f64) -> Result<String, ColorError> {
    let mut c = Color::parse(color)?;
    c.space = c.space.with_alpha();
    c.alpha = Some(clamp_unit(value));
    Ok(c.to_string())
}

/// Move a color toward black by `coefficient` (0-1).
pub fn darken(color: &str, coefficient: f64) -> Result<String, ColorError> {
    let mut c = Color::parse(color)?;
    let k = 1.0 - clamp_unit(coefficient);
    if c.space.is_hsl() {
        c.values[2] *= k;
    } else {
        c.values.iter_mut().for_each(|v| *v *= k);
    }
    Ok(c.to_string())
}

/// Move a color toward white by `coefficient` (0-1).
pub fn lighten(color: &str, coefficient: f64) -> Result<String, ColorError> {
    let mut c = Color::parse(color)?;
    let k = clamp_unit(coefficient);
    if c.space.is_hsl() {
        c.values[2] += (100.0 - c.values[2]) * k;
    } else {
        c.values.iter_mut().for_each(|v| *v += (255.0 - *v) * k);
    }
    Ok(c.to_string())
}

/// Darken light colors and lighten dark ones.
pub fn emphasize(color: &str, coefficient: f64) -> Result<String, ColorError> {
    if Color::parse(color)?.luminance() > 0.5 {
        darken(color, coefficient)
    } else {
        lighten(color, coefficient)
    }
}

/// WCAG contrast ratio between two colors.
pub fn contrast_ratio(foreground: &str, background: &str) -> Result<f64, ColorError> {
    let a = Color::parse(foreground)?.luminance();
    let b = Color::parse(background)?.luminance();
    Ok((a.max(b) + 0.05) / (a.min(b) + 0.05))
}

/// Text color readable on `background`.
pub fn contrast_text(background: &str, threshold: f64) -> Result<String, ColorError> {
    let text = if contrast_ratio(background, LIGHT_TEXT)? >= threshold {
        LIGHT_TEXT
    } else {
        DARK_TEXT
    };
    Ok(text.to_string())
}

/// `#rrggbb` or `rgb(r, g, b)` input to `#rrggbb[aa]`.
pub fn rgb_to_hex(color: &str) -> Result<String, ColorError> {
    if color.trim().starts_with('#') {
        return Ok(color.trim().to_string());
    }
    let c = Color::parse(color)?.to_rgb();
    let mut out = String::from("#");
    for v in c.values {
        out.push_str(&format!("{:02x}", v.clamp(0.0, 255.0) as u8));
    }
    if let Some(a) = c.alpha {
        out.push_str(&format!("{:02x}", (a * 255.0).round().clamp(0.0, 255.0) as u8));
    }
    Ok(out)
}

/// `#hex` input to `rgb()` / `rgba()`.
pub fn hex_to_rgb(color: &str) -> Result<String, ColorError> {
    let trimmed = color.trim();
    if !trimmed.starts_with('#') {
        return Err(ColorError::Unsupported(color.to_string()));
    }
    Ok(Color::parse(trimmed)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== parse tests ====================

    #[test]
    fn test_parse_hex_short_and_long() {
        let short = Color::parse("#abc").unwrap();
        assert_eq!(short.values, [170.0, 187.0, 204.0]);
        let long = Color::parse("#1976d2").unwrap();
        assert_eq!(long.values, [25.0, 118.0, 210.0]);
        assert_eq!(long.space, ColorSpace::Rgb);
    }

    #[test]
    fn test_parse_hex_with_alpha() {
        let c = Color::parse("#1976d280").unwrap();
        assert_eq!(c.space, ColorSpace::Rgba);
        assert_eq!(c.alpha, Some(0.502));
    }

    #[test]
    fn test_parse_functional() {
        let c = Color::parse("rgba(0, 0, 0, 0.87)").unwrap();
        assert_eq!(c.values, [0.0, 0.0, 0.0]);
        assert_eq!(c.alpha, Some(0.87));
        let h = Color::parse("hsl(210, 50%, 40%)").unwrap();
        assert_eq!(h.space, ColorSpace::Hsl);
    }

    #[test]
    fn test_parse_rejects_named_colors() {
        assert!(matches!(
            Color::parse("rebeccapurple"),
            Err(ColorError::Unsupported(_))
        ));
        assert!(Color::parse("#12").is_err());
        assert!(Color::parse("#zzzzzz").is_err());
    }

    // ==================== manipulation tests ====================

    #[test]
    fn test_alpha() {
        assert_eq!(alpha("#1976d2", 0.5).unwrap(), "rgba(25, 118, 210, 0.5)");
        assert_eq!(alpha("hsl(0, 100%, 50%)", 2.0).unwrap(), "hsla(0, 100%, 50%, 1)");
    }

    #[test]
    fn test_lighten_and_darken() {
        assert_eq!(lighten("#000000", 0.5).unwrap(), "rgb(127, 127, 127)");
        assert_eq!(darken("#ffffff", 0.5).unwrap(), "rgb(127, 127, 127)");
        assert_eq!(darken("hsl(0, 100%, 50%)", 0.5).unwrap(), "hsl(0, 100%, 25%)");
    }

    #[test]
    fn test_lighten_primary() {
        assert_eq!(lighten("#1976d2", 0.2).unwrap(), "rgb(71, 145, 219)");
    }

    #[test]
    fn test_emphasize_direction() {
        assert_eq!(emphasize("#ffffff", 0.5).unwrap(), "rgb(127, 127, 127)");
        assert_eq!(emphasize("#000000", 0.5).unwrap(), "rgb(127, 127, 127)");
    }

    #[test]
    fn test_luminance_extremes() {
        assert_eq!(Color::parse("#000").unwrap().luminance(), 0.0);
        assert_eq!(Color::parse("#fff").unwrap().luminance(), 1.0);
    }

    #[test]
    fn test_contrast_ratio_black_white() {
        let ratio = contrast_ratio("#000", "#fff").unwrap();
        assert!((ratio - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_contrast_text() {
        assert_eq!(contrast_text("#1976d2", 3.0).unwrap(), LIGHT_TEXT);
        assert_eq!(contrast_text("#ffeb3b", 3.0).unwrap(), DARK_TEXT);
    }

    #[test]
    fn test_hex_conversions() {
        assert_eq!(hex_to_rgb("#abc").unwrap(), "rgb(170, 187, 204)");
        assert_eq!(rgb_to_hex("rgb(25, 118, 210)").unwrap(), "#1976d2");
        assert_eq!(rgb_to_hex("#123456").unwrap(), "#123456");
        assert!(hex_to_rgb("rgb(1, 2, 3)").is_err());
    }
}
