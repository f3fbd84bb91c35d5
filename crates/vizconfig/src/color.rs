use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// RGB color stored as `[0, 1]` floats and serialized as a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parses `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    pub fn from_hex(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(ConfigError::Invalid(format!("invalid hex color '{raw}'")));
        }

        let channel = |slice: &str| {
            u8::from_str_radix(slice, 16)
                .map_err(|err| ConfigError::Invalid(format!("invalid hex color '{raw}': {err}")))
        };

        match digits.len() {
            6 => Ok(Self::from_rgb8(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |index: usize| -> Result<u8, ConfigError> {
                    let nibble = channel(&digits[index..index + 1])?;
                    Ok(nibble * 17)
                };
                Ok(Self::from_rgb8(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(ConfigError::Invalid(format!(
                "hex color '{raw}' must have 3 or 6 digits"
            ))),
        }
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let quantize = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_forms() {
        let long = Color::from_hex("#ff0070").unwrap();
        assert_eq!(long.to_rgb8(), [0xff, 0x00, 0x70]);

        let bare = Color::from_hex("007bff").unwrap();
        assert_eq!(bare.to_rgb8(), [0x00, 0x7b, 0xff]);

        let short = Color::from_hex("#f0a").unwrap();
        assert_eq!(short.to_rgb8(), [0xff, 0x00, 0xaa]);
    }

    #[test]
    fn hex_round_trips_through_display() {
        let color: Color = "#12ab9f".parse().unwrap();
        assert_eq!(color.to_string(), "#12ab9f");
    }

    #[test]
    fn rejects_malformed_strings() {
        for raw in ["", "#", "#ff00", "#gg0000", "ff00zz", "#ff00000"] {
            assert!(Color::from_hex(raw).is_err(), "expected '{raw}' to fail");
        }
    }

    #[test]
    fn pure_channels_map_to_unit_range() {
        let red = Color::from_hex("#ff0000").unwrap();
        assert_eq!(red.to_array(), [1.0, 0.0, 0.0]);
    }
}
