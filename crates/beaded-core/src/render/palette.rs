use std::fmt;

use crate::error::{ConfigurationError, Result};

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black", Rgb::new(0, 0, 0)),
    ("white", Rgb::new(255, 255, 255)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 128, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
    ("orange", Rgb::new(255, 165, 0)),
    ("purple", Rgb::new(128, 0, 128)),
    ("brown", Rgb::new(165, 42, 42)),
    ("navy", Rgb::new(0, 0, 128)),
];

/// Parse `"RRGGBB"`, `"#RRGGBB"`, `"RGB"` or a basic color name.
pub fn parse_color(s: &str) -> Result<Rgb> {
    let trimmed = s.trim();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(&(_, c)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
        return Ok(c);
    }

    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let bad = || ConfigurationError::InvalidVisParams(format!("unrecognised color '{s}'"));
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(bad().into());
    }
    let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| bad());
    match hex.len() {
        6 => Ok(Rgb::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let r = channel(&hex[0..1])?;
            let g = channel(&hex[1..2])?;
            let b = channel(&hex[2..3])?;
            Ok(Rgb::new(r * 17, g * 17, b * 17))
        }
        _ => Err(bad().into()),
    }
}

/// Evenly spaced color stops, interpolated linearly.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    stops: Vec<Rgb>,
}

impl Palette {
    pub fn parse<S: AsRef<str>>(colors: &[S]) -> Result<Self> {
        if colors.is_empty() {
            return Err(ConfigurationError::InvalidVisParams("empty palette".into()).into());
        }
        let stops = colors
            .iter()
            .map(|c| parse_color(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { stops })
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    /// Color at normalised position `t` (clamped to [0, 1]).
    pub fn evaluate(&self, t: f32) -> Rgb {
        let n = self.stops.len();
        if n == 1 || t <= 0.0 || t.is_nan() {
            return self.stops[0];
        }
        if t >= 1.0 {
            return self.stops[n - 1];
        }
        let pos = t * (n - 1) as f32;
        let i = (pos.floor() as usize).min(n - 2);
        lerp_color(self.stops[i], self.stops[i + 1], pos - i as f32)
    }
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f32) -> Rgb {
    Rgb::new(lerp(c1.r, c2.r, t), lerp(c1.g, c2.g, t), lerp(c1.b, c2.b, t))
}

/// Stable pseudo-random color for a class label.
pub fn label_color(label: u32) -> Rgb {
    // splitmix64 finaliser
    let mut z = (label as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    // Keep colors away from pure black, which marks no-data.
    Rgb::new(
        (z & 0xFF) as u8 | 0x20,
        ((z >> 8) & 0xFF) as u8 | 0x20,
        ((z >> 16) & 0xFF) as u8 | 0x20,
    )
}
