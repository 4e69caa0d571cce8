//! Visual variants chosen by the embedding page.
//!
//! Pages pick a style with a short string key (`"neon"`, `"danger"`, ...).
//! Each family is a closed enum parsed once at the boundary; after that the
//! style parameters come from a pure `variant -> params` function.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::easing::{Easing, Tween};
use crate::effects::TrailConfig;
use crate::error::FxError;
use crate::style::Color;

/// Cursor trail styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorVariant {
    /// Short orange trail.
    #[default]
    Default,
    /// Thin, fast-fading trail for precise pointing.
    Crosshair,
    /// Long glowing cyan trail.
    Neon,
    /// Pink trail with chunky, abrupt points.
    Glitch,
}

impl CursorVariant {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 4] = [Self::Default, Self::Crosshair, Self::Neon, Self::Glitch];

    /// Trail parameters for this variant.
    #[must_use]
    pub fn trail_config(self) -> TrailConfig {
        let base = TrailConfig::default();
        match self {
            Self::Default => base,
            Self::Crosshair => TrailConfig {
                max_points: 16,
                lifetime: 0.2,
                size: 2.0,
                color: Color::WHITE,
                spacing: 2.0,
                ..base
            },
            Self::Neon => TrailConfig {
                max_points: 60,
                lifetime: 0.8,
                size: 8.0,
                size_easing: Easing::ExponentialOut,
                color: Color::NEON_CYAN,
                opacity: 0.75,
                ..base
            },
            Self::Glitch => TrailConfig {
                max_points: 24,
                lifetime: 0.35,
                size: 10.0,
                size_easing: Easing::Instant,
                color: Color::NEON_PINK,
                spacing: 18.0,
                ..base
            },
        }
    }
}

impl FromStr for CursorVariant {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "" => Ok(Self::Default),
            "crosshair" => Ok(Self::Crosshair),
            "neon" => Ok(Self::Neon),
            "glitch" => Ok(Self::Glitch),
            _ => Err(FxError::UnknownVariant {
                kind: "cursor",
                key: s.to_string(),
            }),
        }
    }
}

/// Button color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonColor {
    /// Orange call to action.
    #[default]
    Primary,
    /// Cyan secondary action.
    Secondary,
    /// Red destructive action.
    Danger,
    /// Outline only.
    Ghost,
}

/// Resolved button glow parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonStyle {
    /// Fill color.
    pub fill: Color,
    /// Border color.
    pub border: Color,
    /// Glow color.
    pub glow: Color,
    /// Glow blur radius in pixels.
    pub glow_radius: f32,
}

impl ButtonColor {
    /// Style parameters for this variant.
    #[must_use]
    pub fn style(self) -> ButtonStyle {
        let accent = match self {
            Self::Primary | Self::Ghost => Color::VANGUARD_ORANGE,
            Self::Secondary => Color::NEON_CYAN,
            Self::Danger => Color::DANGER,
        };
        match self {
            Self::Ghost => ButtonStyle {
                fill: Color::TRANSPARENT,
                border: accent,
                glow: accent.with_alpha(0.25),
                glow_radius: 6.0,
            },
            _ => ButtonStyle {
                fill: accent,
                border: accent.lerp(Color::WHITE, 0.3),
                glow: accent.with_alpha(0.6),
                glow_radius: 14.0,
            },
        }
    }
}

impl FromStr for ButtonColor {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" | "" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            "danger" => Ok(Self::Danger),
            "ghost" => Ok(Self::Ghost),
            _ => Err(FxError::UnknownVariant {
                kind: "button",
                key: s.to_string(),
            }),
        }
    }
}

/// Card hover effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardHover {
    /// Card rises.
    #[default]
    Lift,
    /// Card gains a neon halo.
    Glow,
    /// Card tilts toward the viewer.
    Tilt,
    /// No hover effect.
    None,
}

/// Resolved hover parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverStyle {
    /// Upward offset at full hover, pixels.
    pub lift: f32,
    /// Halo radius at full hover, pixels.
    pub glow_radius: f32,
    /// Tilt at full hover, degrees.
    pub tilt_degrees: f32,
    /// Transition duration, seconds.
    pub duration: f32,
    /// Transition curve.
    pub easing: Easing,
}

impl CardHover {
    /// Style parameters for this variant.
    #[must_use]
    pub fn style(self) -> HoverStyle {
        let idle = HoverStyle {
            lift: 0.0,
            glow_radius: 0.0,
            tilt_degrees: 0.0,
            duration: 0.2,
            easing: Easing::ExponentialOut,
        };
        match self {
            Self::Lift => HoverStyle { lift: 8.0, ..idle },
            Self::Glow => HoverStyle {
                glow_radius: 18.0,
                duration: 0.3,
                ..idle
            },
            Self::Tilt => HoverStyle {
                tilt_degrees: 4.0,
                lift: 2.0,
                ..idle
            },
            Self::None => HoverStyle {
                easing: Easing::Instant,
                ..idle
            },
        }
    }
}

impl FromStr for CardHover {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lift" | "" => Ok(Self::Lift),
            "glow" => Ok(Self::Glow),
            "tilt" => Ok(Self::Tilt),
            "none" => Ok(Self::None),
            _ => Err(FxError::UnknownVariant {
                kind: "card",
                key: s.to_string(),
            }),
        }
    }
}

/// Animates a card between idle and hovered using its [`HoverStyle`].
#[derive(Debug, Clone)]
pub struct HoverAnimator {
    style: HoverStyle,
    amount: Tween,
}

impl HoverAnimator {
    /// Creates an idle animator.
    #[must_use]
    pub fn new(variant: CardHover) -> Self {
        let style = variant.style();
        Self {
            style,
            amount: Tween::new(0.0, style.easing).with_duration(style.duration),
        }
    }

    /// Pointer entered (`true`) or left (`false`) the card.
    pub fn set_hovered(&mut self, hovered: bool) {
        self.amount.set_target(if hovered { 1.0 } else { 0.0 });
    }

    /// Advances the transition.
    pub fn update(&mut self, dt: f32) {
        self.amount.update(dt);
    }

    /// Current lift in pixels.
    #[must_use]
    pub fn lift(&self) -> f32 {
        self.style.lift * self.amount.value()
    }

    /// Current halo radius.
    #[must_use]
    pub fn glow_radius(&self) -> f32 {
        self.style.glow_radius * self.amount.value()
    }

    /// Current tilt in degrees.
    #[must_use]
    pub fn tilt_degrees(&self) -> f32 {
        self.style.tilt_degrees * self.amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive_and_strict() {
        assert_eq!("NEON".parse::<CursorVariant>().unwrap(), CursorVariant::Neon);
        assert_eq!(" danger ".parse::<ButtonColor>().unwrap(), ButtonColor::Danger);
        assert_eq!("".parse::<CardHover>().unwrap(), CardHover::Lift);

        let err = "sparkly".parse::<CursorVariant>().unwrap_err();
        assert_eq!(err.to_string(), "unknown cursor variant `sparkly`");
    }

    #[test]
    fn test_every_cursor_variant_yields_valid_trail() {
        for variant in CursorVariant::ALL {
            assert!(variant.trail_config().validate().is_ok(), "{variant:?}");
        }
    }

    #[test]
    fn test_ghost_button_has_no_fill() {
        assert_eq!(ButtonColor::Ghost.style().fill.a, 0.0);
        assert_eq!(ButtonColor::Danger.style().fill, Color::DANGER);
    }

    #[test]
    fn test_hover_animator_lifts_and_settles() {
        let mut hover = HoverAnimator::new(CardHover::Lift);
        hover.set_hovered(true);
        for _ in 0..30 {
            hover.update(1.0 / 60.0);
        }
        assert!((hover.lift() - 8.0).abs() < 1e-4);
        assert_eq!(hover.tilt_degrees(), 0.0);

        hover.set_hovered(false);
        for _ in 0..30 {
            hover.update(1.0 / 60.0);
        }
        assert!(hover.lift().abs() < 1e-4);
    }

    #[test]
    fn test_no_hover_snaps() {
        let mut hover = HoverAnimator::new(CardHover::Glow);
        hover.set_hovered(true);
        hover.update(0.01);
        assert!(hover.glow_radius() > 0.0);
        assert!(HoverAnimator::new(CardHover::None).glow_radius().abs() < f32::EPSILON);
    }
}
