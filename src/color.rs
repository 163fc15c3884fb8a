//! Linear RGB colors with hex wire format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Linear RGB triple, components nominally in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0.0, 0.0, 0.0]);
    pub const WHITE: Rgb = Rgb([1.0, 1.0, 1.0]);

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    /// Component-wise linear interpolation
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let [a0, a1, a2] = self.0;
        let [b0, b1, b2] = other.0;
        Rgb([
            a0 + (b0 - a0) * t,
            a1 + (b1 - a1) * t,
            a2 + (b2 - a2) * t,
        ])
    }

    pub fn scale(self, factor: f32) -> Rgb {
        Rgb(self.0.map(|c| c * factor))
    }

    /// Clamp every component to [0, 1]; NaN becomes 0
    pub fn clamped(self) -> Rgb {
        Rgb(self.0.map(clamp_unit))
    }

    /// Lenient decode: hex string, or `[r, g, b]` in 0-1 or 0-255 range
    pub fn from_json_lenient(value: &Value) -> Option<Rgb> {
        match value {
            Value::String(s) => s.parse().ok(),
            Value::Array(items) if items.len() >= 3 => {
                let mut c = [0.0f32; 3];
                for (slot, item) in c.iter_mut().zip(items) {
                    *slot = item.as_f64()? as f32;
                }
                let byte_range = c.iter().any(|&v| v > 1.0);
                let rgb = if byte_range {
                    Rgb(c.map(|v| v / 255.0))
                } else {
                    Rgb(c)
                };
                Some(rgb.clamped())
            }
            _ => None,
        }
    }
}

fn clamp_unit(c: f32) -> f32 {
    if c.is_nan() {
        0.0
    } else {
        c.clamp(0.0, 1.0)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

/// Hex parse failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color '{}'", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Accepts `#rrggbb`, `#rgb`, with or without the leading `#`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(err());
        }
        let digits: Vec<u8> = match hex.len() {
            6 => (0..3)
                .map(|i| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16))
                .collect::<Result<_, _>>()
                .map_err(|_| err())?,
            3 => (0..3)
                .map(|i| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17))
                .collect::<Result<_, _>>()
                .map_err(|_| err())?,
            _ => return Err(err()),
        };
        Ok(Rgb([
            digits[0] as f32 / 255.0,
            digits[1] as f32 / 255.0,
            digits[2] as f32 / 255.0,
        ]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.clamped().0.map(|c| (c * 255.0).round() as u8);
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}
