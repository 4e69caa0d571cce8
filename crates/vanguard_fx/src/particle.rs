//! Transient visual particles and the configs that spawn them.
//!
//! A particle is valid while `age < lifetime`. Everything visual (opacity,
//! size, color) is derived from the life ratio `age / lifetime`, never
//! stored, so the curves stay monotonic no matter how ticks are split.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::{FxError, FxResult};
use crate::field::MAX_CAPACITY;
use crate::math::Vec2;
use crate::style::Color;

/// How opacity falls off over a particle's life.
///
/// Both curves are non-increasing in the life ratio and reach zero at the
/// end of life.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fade {
    /// `1 - ratio`.
    #[default]
    Linear,
    /// Full opacity until `fraction` of the life has passed, then linear.
    Hold {
        /// Fraction of the lifetime spent at full opacity, `0..=1`.
        fraction: f32,
    },
}

impl Fade {
    /// Opacity multiplier for a life ratio in `[0, 1]`.
    #[must_use]
    pub fn factor(self, ratio: f32) -> f32 {
        let ratio = if ratio.is_nan() { 1.0 } else { ratio.clamp(0.0, 1.0) };
        let factor = match self {
            Self::Linear => 1.0 - ratio,
            Self::Hold { fraction } => {
                let hold = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
                if ratio <= hold {
                    if hold >= 1.0 && ratio >= 1.0 { 0.0 } else { 1.0 }
                } else {
                    1.0 - (ratio - hold) / (1.0 - hold)
                }
            }
        };
        factor.clamp(0.0, 1.0)
    }
}

/// A single transient entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in surface pixels.
    pub position: Vec2,
    /// Velocity in pixels per second.
    pub velocity: Vec2,
    /// Size (radius) at birth.
    pub size_start: f32,
    /// Size (radius) at end of life.
    pub size_end: f32,
    /// Curve used to move from `size_start` to `size_end`.
    pub size_easing: Easing,
    /// Color at birth.
    pub color_start: Color,
    /// Color at end of life.
    pub color_end: Color,
    /// Base opacity, `0..=1`.
    pub opacity: f32,
    /// Opacity curve.
    pub fade: Fade,
    /// Seconds since spawn.
    pub age: f32,
    /// Seconds until expiry. `f32::INFINITY` for ambient particles.
    pub lifetime: f32,
    /// Rotation in radians (decals).
    pub rotation: f32,
    /// Downward acceleration, pixels per second squared.
    pub gravity: f32,
    /// Fraction of velocity lost per second.
    pub drag: f32,
    /// Caller-defined tag. The pointer trail numbers its strokes with it.
    pub group: u32,
}

impl Particle {
    /// Creates a particle with white color, unit size and linear fade.
    #[must_use]
    pub fn new(position: Vec2, velocity: Vec2, lifetime: f32) -> Self {
        Self {
            position,
            velocity,
            size_start: 1.0,
            size_end: 1.0,
            size_easing: Easing::Linear,
            color_start: Color::WHITE,
            color_end: Color::WHITE,
            opacity: 1.0,
            fade: Fade::Linear,
            age: 0.0,
            lifetime,
            rotation: 0.0,
            gravity: 0.0,
            drag: 0.0,
            group: 0,
        }
    }

    /// Creates a particle that never ages out.
    #[must_use]
    pub fn immortal(position: Vec2, velocity: Vec2) -> Self {
        Self::new(position, velocity, f32::INFINITY)
    }

    /// Sets a constant size.
    #[must_use]
    pub fn with_size(mut self, size: f32) -> Self {
        self.size_start = size;
        self.size_end = size;
        self
    }

    /// Sets start and end sizes.
    #[must_use]
    pub fn with_size_range(mut self, start: f32, end: f32, easing: Easing) -> Self {
        self.size_start = start;
        self.size_end = end;
        self.size_easing = easing;
        self
    }

    /// Sets a constant color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color_start = color;
        self.color_end = color;
        self
    }

    /// Sets base opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Sets the opacity curve.
    #[must_use]
    pub fn with_fade(mut self, fade: Fade) -> Self {
        self.fade = fade;
        self
    }

    /// Sets the group tag.
    #[must_use]
    pub fn with_group(mut self, group: u32) -> Self {
        self.group = group;
        self
    }

    /// Sets rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Life ratio `age / lifetime` in `[0, 1]`. Immortal particles stay at 0.
    #[must_use]
    pub fn life_ratio(&self) -> f32 {
        if self.lifetime == f32::INFINITY {
            0.0
        } else if self.lifetime.is_nan() || self.lifetime <= 0.0 {
            1.0
        } else {
            (self.age / self.lifetime).clamp(0.0, 1.0)
        }
    }

    /// True while `age < lifetime`.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.age < self.lifetime
    }

    /// Current opacity, clamped to `[0, opacity]`.
    #[must_use]
    pub fn current_opacity(&self) -> f32 {
        let base = if self.opacity.is_finite() { self.opacity.clamp(0.0, 1.0) } else { 0.0 };
        (base * self.fade.factor(self.life_ratio())).clamp(0.0, base)
    }

    /// Current size, never negative.
    #[must_use]
    pub fn current_size(&self) -> f32 {
        let t = self.size_easing.apply(self.life_ratio());
        let size = self.size_start + (self.size_end - self.size_start) * t;
        if size.is_finite() { size.max(0.0) } else { 0.0 }
    }

    /// Current color with opacity folded into alpha.
    #[must_use]
    pub fn current_color(&self) -> Color {
        self.color_start
            .lerp(self.color_end, self.life_ratio())
            .fade(self.current_opacity())
    }

    /// True when position, velocity and age are all finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.age.is_finite()
    }

    /// Integrates velocity and age over `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.velocity.y += self.gravity * dt;
        if self.drag > 0.0 {
            self.velocity = self.velocity * (1.0 - self.drag * dt).max(0.0);
        }
        self.position += self.velocity * dt;
        self.age += dt;
    }
}

/// Configuration for spawning particles at an origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticleConfig {
    /// Particles per spawn call.
    pub spawn_count: u32,
    /// Minimum lifetime in seconds.
    pub lifetime_min: f32,
    /// Maximum lifetime in seconds.
    pub lifetime_max: f32,
    /// Minimum initial speed, pixels per second.
    pub speed_min: f32,
    /// Maximum initial speed, pixels per second.
    pub speed_max: f32,
    /// Emission direction in radians (0 = +x, y grows downward).
    pub direction: f32,
    /// Total angular spread around `direction`, radians.
    pub spread: f32,
    /// Starting color.
    pub color_start: Color,
    /// Ending color.
    pub color_end: Color,
    /// Base opacity.
    pub opacity: f32,
    /// Opacity curve.
    pub fade: Fade,
    /// Starting size.
    pub size_start: f32,
    /// Ending size.
    pub size_end: f32,
    /// Size curve.
    pub size_easing: Easing,
    /// Downward acceleration.
    pub gravity: f32,
    /// Velocity fraction lost per second.
    pub drag: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            spawn_count: 1,
            lifetime_min: 0.6,
            lifetime_max: 1.0,
            speed_min: 0.0,
            speed_max: 0.0,
            direction: 0.0,
            spread: std::f32::consts::TAU,
            color_start: Color::VANGUARD_ORANGE,
            color_end: Color::VANGUARD_ORANGE,
            opacity: 1.0,
            fade: Fade::Linear,
            size_start: 4.0,
            size_end: 0.0,
            size_easing: Easing::Linear,
            gravity: 0.0,
            drag: 0.0,
        }
    }
}

impl ParticleConfig {
    /// Validates ranges. `section` prefixes field names in errors.
    ///
    /// # Errors
    /// Returns [`FxError::InvalidConfig`] for non-finite numbers, non-positive
    /// lifetimes, inverted ranges or out-of-range opacity.
    pub fn validate(&self, section: &str) -> FxResult<()> {
        let field = |name: &str| format!("{section}.{name}");
        if self.spawn_count as usize > MAX_CAPACITY {
            return Err(FxError::invalid(
                &field("spawn_count"),
                format!("must be at most {MAX_CAPACITY}"),
            ));
        }
        let finite = [
            ("lifetime_min", self.lifetime_min),
            ("lifetime_max", self.lifetime_max),
            ("speed_min", self.speed_min),
            ("speed_max", self.speed_max),
            ("direction", self.direction),
            ("spread", self.spread),
            ("opacity", self.opacity),
            ("size_start", self.size_start),
            ("size_end", self.size_end),
            ("gravity", self.gravity),
            ("drag", self.drag),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(FxError::invalid(&field(name), "must be finite"));
            }
        }
        if self.lifetime_min <= 0.0 {
            return Err(FxError::invalid(&field("lifetime_min"), "must be positive"));
        }
        if self.lifetime_max < self.lifetime_min {
            return Err(FxError::invalid(&field("lifetime_max"), "must be >= lifetime_min"));
        }
        if self.speed_min < 0.0 || self.speed_max < self.speed_min {
            return Err(FxError::invalid(&field("speed_max"), "speed range must be 0 <= min <= max"));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(FxError::invalid(&field("opacity"), "must be within 0..=1"));
        }
        if self.size_start < 0.0 || self.size_end < 0.0 {
            return Err(FxError::invalid(&field("size_start"), "sizes must be non-negative"));
        }
        if self.drag < 0.0 {
            return Err(FxError::invalid(&field("drag"), "must be non-negative"));
        }
        Ok(())
    }

    /// Builds one particle at `origin` with randomized lifetime, speed and angle.
    pub fn sample(&self, origin: Vec2, rng: &mut impl Rng) -> Particle {
        let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
        let lifetime = lerp(self.lifetime_min, self.lifetime_max, rng.gen::<f32>());
        let speed = lerp(self.speed_min, self.speed_max, rng.gen::<f32>());
        let angle = self.direction + (rng.gen::<f32>() - 0.5) * self.spread;

        Particle {
            position: origin,
            velocity: Vec2::from_angle(angle, speed),
            size_start: self.size_start,
            size_end: self.size_end,
            size_easing: self.size_easing,
            color_start: self.color_start,
            color_end: self.color_end,
            opacity: self.opacity,
            fade: self.fade,
            age: 0.0,
            lifetime,
            rotation: rng.gen::<f32>() * std::f32::consts::TAU,
            gravity: self.gravity,
            drag: self.drag,
            group: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_linear_fade_hits_zero_at_end_of_life() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO, 2.0).with_opacity(0.8);
        assert!((p.current_opacity() - 0.8).abs() < 1e-6);

        p.age = 1.0;
        assert!((p.current_opacity() - 0.4).abs() < 1e-6);

        p.age = 2.0;
        assert_eq!(p.current_opacity(), 0.0);
        assert!(!p.is_alive());
    }

    #[test]
    fn test_hold_fade_keeps_full_opacity_then_drops() {
        let fade = Fade::Hold { fraction: 0.5 };
        assert_eq!(fade.factor(0.25), 1.0);
        assert_eq!(fade.factor(0.5), 1.0);
        assert!((fade.factor(0.75) - 0.5).abs() < 1e-6);
        assert_eq!(fade.factor(1.0), 0.0);
        assert_eq!(Fade::Hold { fraction: 1.0 }.factor(1.0), 0.0);
    }

    #[test]
    fn test_immortal_particle_never_fades() {
        let mut p = Particle::immortal(Vec2::ZERO, Vec2::new(1.0, 0.0));
        p.advance(1.0e6);
        assert!(p.is_alive());
        assert_eq!(p.current_opacity(), 1.0);
    }

    #[test]
    fn test_size_shrinks_and_never_goes_negative() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO, 1.0).with_size_range(6.0, 0.0, Easing::Linear);
        p.age = 0.5;
        assert!((p.current_size() - 3.0).abs() < 1e-5);
        p.age = 5.0;
        assert_eq!(p.current_size(), 0.0);
    }

    #[test]
    fn test_advance_applies_gravity_and_drag() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::new(10.0, 0.0), 10.0);
        p.gravity = 100.0;
        p.drag = 0.5;
        p.advance(0.1);

        assert!((p.velocity.y - 9.5).abs() < 1e-4);
        assert!((p.velocity.x - 9.5).abs() < 1e-4);
        assert!((p.age - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_sample_respects_ranges() {
        let config = ParticleConfig {
            lifetime_min: 1.0,
            lifetime_max: 2.0,
            speed_min: 10.0,
            speed_max: 20.0,
            ..ParticleConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..100 {
            let p = config.sample(Vec2::new(5.0, 5.0), &mut rng);
            assert!((1.0..=2.0).contains(&p.lifetime));
            let speed = p.velocity.length();
            assert!((9.99..=20.01).contains(&speed), "speed {speed}");
            assert_eq!(p.position, Vec2::new(5.0, 5.0));
        }
    }

    #[test]
    fn test_validate_rejects_bad_lifetime() {
        let config = ParticleConfig {
            lifetime_min: 0.0,
            ..ParticleConfig::default()
        };
        assert!(matches!(
            config.validate("burst.particle"),
            Err(FxError::InvalidConfig { field, .. }) if field == "burst.particle.lifetime_min"
        ));

        let nan = ParticleConfig {
            drag: f32::NAN,
            ..ParticleConfig::default()
        };
        assert!(nan.validate("x").is_err());
    }
}
