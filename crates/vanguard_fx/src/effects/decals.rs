//! Bullet-hole decals.
//!
//! Every click leaves a scorched hole with radial cracks. Holes stay at
//! full opacity for `hold_fraction` of their life, then fade out.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Effect;
use crate::error::{FxError, FxResult};
use crate::field::{check_capacity, ParticleField};
use crate::math::Vec2;
use crate::particle::{Fade, Particle};
use crate::pointer::PointerEvent;
use crate::style::Color;
use crate::surface::Surface;

/// Most crack lines a decal may draw.
pub const MAX_CRACKS: u32 = 64;

/// Decal layer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecalConfig {
    /// Maximum holes on screen; the oldest is evicted first.
    pub max_decals: usize,
    /// Seconds a hole stays on screen.
    pub lifetime: f32,
    /// Fraction of the lifetime spent at full opacity.
    pub hold_fraction: f32,
    /// Radius of the hole.
    pub size: f32,
    /// Hole color.
    pub core_color: Color,
    /// Crack color.
    pub crack_color: Color,
    /// Cracks per hole.
    pub crack_count: u32,
    /// Crack length as a multiple of `size`.
    pub crack_length: f32,
    /// Crack stroke width.
    pub crack_width: f32,
    /// RNG seed for rotations.
    pub seed: u64,
}

impl Default for DecalConfig {
    fn default() -> Self {
        Self {
            max_decals: 24,
            lifetime: 4.0,
            hold_fraction: 0.6,
            size: 5.0,
            core_color: Color::SCORCH,
            crack_color: Color::rgba(0.25, 0.22, 0.2, 0.9),
            crack_count: 5,
            crack_length: 2.5,
            crack_width: 1.0,
            seed: 3,
        }
    }
}

impl DecalConfig {
    /// Validates the config.
    ///
    /// # Errors
    /// Returns [`FxError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> FxResult<()> {
        check_capacity("decals.max_decals", self.max_decals)?;
        if self.crack_count > MAX_CRACKS {
            return Err(FxError::invalid(
                "decals.crack_count",
                format!("must be at most {MAX_CRACKS}"),
            ));
        }
        if !self.lifetime.is_finite() || self.lifetime <= 0.0 {
            return Err(FxError::invalid("decals.lifetime", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.hold_fraction) {
            return Err(FxError::invalid("decals.hold_fraction", "must be within 0..=1"));
        }
        for (name, value) in [
            ("decals.size", self.size),
            ("decals.crack_length", self.crack_length),
            ("decals.crack_width", self.crack_width),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FxError::invalid(name, "must be finite and non-negative"));
            }
        }
        Ok(())
    }
}

/// Bullet-hole overlay.
#[derive(Debug, Clone)]
pub struct DecalLayer {
    config: DecalConfig,
    field: ParticleField,
}

impl DecalLayer {
    /// Creates an empty layer.
    #[must_use]
    pub fn new(config: DecalConfig) -> Self {
        Self {
            field: ParticleField::new(config.max_decals).with_seed(config.seed),
            config,
        }
    }

    /// The underlying field.
    #[must_use]
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Leaves a hole at `at`.
    pub fn shoot(&mut self, at: Vec2) {
        let rotation = self.field.rng().gen::<f32>() * TAU;
        let decal = Particle::new(at, Vec2::ZERO, self.config.lifetime)
            .with_size(self.config.size)
            .with_color(self.config.core_color)
            .with_fade(Fade::Hold {
                fraction: self.config.hold_fraction,
            })
            .with_rotation(rotation);
        self.field.push(decal);
    }

    fn render_cracks(&self, decal: &Particle, opacity: f32, surface: &mut dyn Surface) {
        let color = self.config.crack_color.fade(opacity);
        let reach = self.config.size * self.config.crack_length;
        #[allow(clippy::cast_precision_loss)]
        let step = TAU / self.config.crack_count as f32;

        for k in 0..self.config.crack_count {
            #[allow(clippy::cast_precision_loss)]
            let k = k as f32;
            // Deterministic per-hole variation so cracks don't flicker.
            let jitter = (decal.rotation * (k + 1.0) * 7.3).sin().abs();
            let angle = decal.rotation + k * step;
            let tip = decal.position + Vec2::from_angle(angle, reach * (0.6 + 0.4 * jitter));
            surface.stroke_line(decal.position, tip, self.config.crack_width, color);
        }
    }
}

impl Effect for DecalLayer {
    fn name(&self) -> &'static str {
        "decals"
    }

    fn on_pointer(&mut self, event: PointerEvent) {
        if let PointerEvent::Pressed(at) = event {
            self.shoot(at);
        }
    }

    fn tick(&mut self, dt: f32) {
        self.field.tick(dt);
    }

    fn render(&self, surface: &mut dyn Surface) {
        for decal in self.field.iter() {
            let opacity = decal.current_opacity();
            if opacity <= 0.0 {
                continue;
            }
            self.render_cracks(decal, opacity, surface);
            surface.fill_circle(decal.position, decal.current_size(), decal.current_color());
        }
    }

    fn active_count(&self) -> usize {
        self.field.len()
    }
}
