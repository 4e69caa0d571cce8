//! Colors for the neon aesthetic.
//!
//! Dark page, saturated accents, everything drawn with alpha.

use serde::{Deserialize, Serialize};

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Solid black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Signature orange used across the site.
    pub const VANGUARD_ORANGE: Self = Self::rgba(0.98, 0.62, 0.12, 1.0);
    /// Neon cyan.
    pub const NEON_CYAN: Self = Self::rgba(0.2, 0.9, 1.0, 1.0);
    /// Neon pink.
    pub const NEON_PINK: Self = Self::rgba(1.0, 0.2, 0.6, 1.0);
    /// Neon green.
    pub const NEON_GREEN: Self = Self::rgba(0.2, 1.0, 0.3, 1.0);
    /// Danger red.
    pub const DANGER: Self = Self::rgba(0.95, 0.15, 0.2, 1.0);
    /// Scorched near-black used for decal cores.
    pub const SCORCH: Self = Self::rgba(0.06, 0.05, 0.05, 1.0);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGB values (0-1) with full alpha.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates a color from hex value (0xRRGGBBAA).
    #[must_use]
    pub fn hex(hex: u32) -> Self {
        let r = ((hex >> 24) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let b = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let a = (hex & 0xFF) as f32 / 255.0;
        Self::rgba(r, g, b, a)
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    #[must_use]
    pub fn parse_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(Self::hex((value << 8) | 0xFF)),
            8 => Some(Self::hex(value)),
            _ => None,
        }
    }

    /// Formats as `#RRGGBBAA`.
    #[must_use]
    pub fn to_hex_string(self) -> String {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            byte(self.a)
        )
    }

    /// Returns a new color with different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Multiplies alpha by `factor`, clamped to `[0, 1]`.
    #[must_use]
    pub fn fade(self, factor: f32) -> Self {
        let factor = if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 0.0 };
        self.with_alpha(self.a * factor)
    }

    /// Linearly interpolates between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Converts to array format.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value).ok_or_else(|| format!("expected #RRGGBB or #RRGGBBAA, got `{value}`"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_lerp() {
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);

        assert!((mid.r - 0.5).abs() < 0.01);
        assert!((mid.g - 0.5).abs() < 0.01);
        assert!((mid.b - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_parse_hex_forms() {
        let opaque = Color::parse_hex("#FF0000").unwrap();
        assert!((opaque.r - 1.0).abs() < 0.01);
        assert!((opaque.a - 1.0).abs() < 0.01);

        let translucent = Color::parse_hex("00FF0080").unwrap();
        assert!((translucent.g - 1.0).abs() < 0.01);
        assert!((translucent.a - 0.5).abs() < 0.01);

        assert!(Color::parse_hex("#FFF").is_none());
        assert!(Color::parse_hex("#GG0000").is_none());
    }

    #[test]
    fn test_fade_never_exceeds_source_alpha() {
        let c = Color::NEON_CYAN.with_alpha(0.5);
        assert!((c.fade(2.0).a - 0.5).abs() < 1e-6);
        assert_eq!(c.fade(f32::NAN).a, 0.0);
    }
}
