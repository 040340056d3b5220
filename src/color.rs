//! Colour values used by the style registry and the renderers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Simple RGB colour independent of any renderer's colour type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 128, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);

    /// Lowercase `#rrggbb` notation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Parse a colour string.
///
/// Accepts `#rgb`, `#rrggbb`, a `[r, g, b]` triple of floats in `0..=1`, and
/// the usual CSS colour names.
pub fn parse_color(val: &str) -> Option<Rgb> {
    let val = val.trim();
    if val.starts_with('[') && val.ends_with(']') {
        let inner = &val[1..val.len() - 1];
        let parts: Vec<&str> = inner.split(',').map(|s| s.trim()).collect();
        if parts.len() != 3 {
            return None;
        }
        let mut channels = [0u8; 3];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            let f = part.parse::<f32>().ok()?;
            *slot = (f.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        return Some(Rgb(channels[0], channels[1], channels[2]));
    }
    if let Some(hex) = val.strip_prefix('#') {
        return parse_hex(hex);
    }
    let rgb = match val.to_ascii_lowercase().as_str() {
        "white" => Rgb(255, 255, 255),
        "black" => Rgb(0, 0, 0),
        "red" => Rgb(255, 0, 0),
        "green" => Rgb(0, 128, 0),
        "blue" => Rgb(0, 0, 255),
        "yellow" => Rgb(255, 255, 0),
        "orange" => Rgb(255, 165, 0),
        "cyan" => Rgb(0, 255, 255),
        "magenta" => Rgb(255, 0, 255),
        "lightblue" => Rgb(173, 216, 230),
        "darkgreen" => Rgb(0, 100, 0),
        "gray" | "grey" => Rgb(128, 128, 128),
        "lightgray" | "lightgrey" => Rgb(211, 211, 211),
        "darkgray" | "darkgrey" => Rgb(169, 169, 169),
        "purple" => Rgb(128, 0, 128),
        "navy" => Rgb(0, 0, 128),
        "teal" => Rgb(0, 128, 128),
        _ => return None,
    };
    Some(rgb)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let expand = |c: u8| c << 4 | c;
    match hex.len() {
        3 => {
            let v = u16::from_str_radix(hex, 16).ok()?;
            Some(Rgb(
                expand(((v >> 8) & 0xf) as u8),
                expand(((v >> 4) & 0xf) as u8),
                expand((v & 0xf) as u8),
            ))
        }
        6 => {
            let v = u32::from_str_radix(hex, 16).ok()?;
            Some(Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8))
        }
        _ => None,
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_color(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid colour '{s}'")))
    }
}
