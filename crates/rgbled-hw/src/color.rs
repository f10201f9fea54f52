//! RGB color conversions.
//!
//! Colors travel as `#rrggbb` strings in the web UI and as decimal
//! `r,g,b` triplets on the console and on the wire.

use crate::{Error, Result};
use std::str::FromStr;

/// Luminance above which dark overlay text is used, in thousandths.
const CONTRAST_THRESHOLD_MILLI: u32 = 186_000;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Creates a color from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the `#rrggbb` form of this color.
    pub fn to_hex(&self) -> String {
        rgb_to_hex(self.r, self.g, self.b)
    }

    /// Perceived brightness, `0.299r + 0.587g + 0.114b`.
    pub fn luminance(&self) -> f64 {
        f64::from(self.luminance_milli()) / 1000.0
    }

    /// Luminance scaled by 1000 so threshold comparisons stay exact.
    fn luminance_milli(&self) -> u32 {
        299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b)
    }

    /// Parses a decimal `r,g,b` triplet.
    fn from_triplet(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(Error::MalformedColor(s.to_string()));
        }
        let channel = |p: &str| {
            if p.is_empty() || !p.bytes().all(|c| c.is_ascii_digit()) {
                return Err(Error::MalformedColor(s.to_string()));
            }
            p.parse::<u8>()
                .map_err(|_| Error::MalformedColor(s.to_string()))
        };
        Ok(Self::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Accepts `#rrggbb`, `rrggbb` or `r,g,b`.
    fn from_str(s: &str) -> Result<Self> {
        if s.contains(',') {
            Self::from_triplet(s)
        } else {
            hex_to_rgb(s)
        }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Converts `#rrggbb` (or bare `rrggbb`) to a color.
///
/// Exactly six hex digits are required after the optional `#`.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::MalformedColor(hex.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| Error::MalformedColor(hex.to_string()))
    };
    Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Formats a color as lowercase `#rrggbb`.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Overlay text tone that stays readable on a given background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTone {
    /// Black text, for bright backgrounds.
    Dark,
    /// White text, for dim backgrounds.
    Light,
}

impl TextTone {
    /// Picks the text tone for a background color.
    ///
    /// Luminance strictly above 186 selects dark text; 186 itself stays light.
    pub fn for_background(color: Rgb) -> Self {
        if color.luminance_milli() > CONTRAST_THRESHOLD_MILLI {
            TextTone::Dark
        } else {
            TextTone::Light
        }
    }

    /// Picks the text tone for a precomputed luminance.
    pub fn for_luminance(luminance: f64) -> Self {
        if luminance > f64::from(CONTRAST_THRESHOLD_MILLI) / 1000.0 {
            TextTone::Dark
        } else {
            TextTone::Light
        }
    }

    /// CSS color name.
    pub fn css(&self) -> &'static str {
        match self {
            TextTone::Dark => "black",
            TextTone::Light => "white",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#ff0080").unwrap(), Rgb::new(255, 0, 128));
        assert_eq!(hex_to_rgb("00FF00").unwrap(), Rgb::new(0, 255, 0));
        assert_eq!(hex_to_rgb("#000000").unwrap(), Rgb::BLACK);
    }

    #[test]
    fn test_hex_to_rgb_rejects_malformed() {
        for bad in [
            "", "#", "#fff", "#ff00801", "##ff0080", "#gg0000", "+f0000", " ff0000", "#ff 000",
        ] {
            assert!(
                matches!(hex_to_rgb(bad), Err(Error::MalformedColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rgb_to_hex() {
        assert_eq!(rgb_to_hex(255, 0, 128), "#ff0080");
        assert_eq!(rgb_to_hex(1, 2, 3), "#010203");
        assert_eq!(Rgb::new(171, 205, 239).to_string(), "#abcdef");
    }

    #[test]
    fn test_hex_round_trip() {
        let mut levels: Vec<u8> = (0..=255).step_by(17).collect();
        levels.extend([1, 127, 128, 254]);
        for &r in &levels {
            for &g in &levels {
                for &b in &levels {
                    let hex = rgb_to_hex(r, g, b);
                    assert_eq!(hex_to_rgb(&hex).unwrap(), Rgb::new(r, g, b), "{hex}");
                }
            }
        }
        for v in 0..=255u8 {
            assert_eq!(hex_to_rgb(&rgb_to_hex(v, 255 - v, v)).unwrap(), Rgb::new(v, 255 - v, v));
        }
    }

    #[test]
    fn test_from_str_triplet() {
        assert_eq!("10,20,30".parse::<Rgb>().unwrap(), Rgb::new(10, 20, 30));
        assert_eq!(" 255 , 0 ,128 ".parse::<Rgb>().unwrap(), Rgb::new(255, 0, 128));
        assert_eq!("#0a141e".parse::<Rgb>().unwrap(), Rgb::new(10, 20, 30));
        assert!("256,0,0".parse::<Rgb>().is_err());
        assert!("-1,0,0".parse::<Rgb>().is_err());
        assert!("1,2".parse::<Rgb>().is_err());
        assert!("1,2,3,4".parse::<Rgb>().is_err());
        assert!("a,b,c".parse::<Rgb>().is_err());
        assert!("hello".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_luminance() {
        assert_eq!(Rgb::BLACK.luminance(), 0.0);
        assert_eq!(Rgb::new(255, 255, 255).luminance(), 255.0);
        assert_eq!(Rgb::new(100, 0, 0).luminance(), 29.9);
    }

    #[test]
    fn test_contrast_boundary() {
        assert_eq!(TextTone::for_luminance(186.0), TextTone::Light);
        assert_eq!(TextTone::for_luminance(187.0), TextTone::Dark);
        assert_eq!(
            TextTone::for_background(Rgb::new(186, 186, 186)),
            TextTone::Light
        );
        assert_eq!(
            TextTone::for_background(Rgb::new(187, 187, 187)),
            TextTone::Dark
        );
        assert_eq!(TextTone::for_background(Rgb::BLACK).css(), "white");
        assert_eq!(TextTone::for_background(Rgb::new(255, 255, 0)).css(), "black");
    }
}
