//! Click sparks.

use serde::{Deserialize, Serialize};

use super::Effect;
use crate::easing::Easing;
use crate::error::FxResult;
use crate::field::{check_capacity, ParticleField};
use crate::math::Vec2;
use crate::particle::ParticleConfig;
use crate::pointer::PointerEvent;
use crate::style::Color;
use crate::surface::Surface;

/// Spark burst configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BurstConfig {
    /// Maximum sparks alive at once.
    pub max_particles: usize,
    /// Per-spark parameters; `spawn_count` sparks per click.
    pub particle: ParticleConfig,
    /// RNG seed.
    pub seed: u64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            max_particles: 96,
            particle: ParticleConfig {
                spawn_count: 14,
                lifetime_min: 0.35,
                lifetime_max: 0.7,
                speed_min: 120.0,
                speed_max: 320.0,
                color_start: Color::rgba(1.0, 0.85, 0.4, 1.0),
                color_end: Color::DANGER,
                size_start: 3.0,
                size_end: 0.0,
                size_easing: Easing::ExponentialIn,
                gravity: 600.0,
                drag: 1.5,
                ..ParticleConfig::default()
            },
            seed: 5,
        }
    }
}

impl BurstConfig {
    /// Validates the config.
    ///
    /// # Errors
    /// Returns [`FxError::InvalidConfig`](crate::FxError::InvalidConfig) naming the first bad field.
    pub fn validate(&self) -> FxResult<()> {
        check_capacity("burst.max_particles", self.max_particles)?;
        self.particle.validate("burst.particle")
    }
}

/// Spark shower on click.
#[derive(Debug, Clone)]
pub struct Burst {
    config: BurstConfig,
    field: ParticleField,
}

impl Burst {
    /// Creates an idle burst effect.
    #[must_use]
    pub fn new(config: BurstConfig) -> Self {
        Self {
            field: ParticleField::new(config.max_particles).with_seed(config.seed),
            config,
        }
    }

    /// Fires one burst at `origin`; returns sparks accepted.
    pub fn fire(&mut self, origin: Vec2) -> usize {
        self.field.spawn(origin, &self.config.particle)
    }
}

impl Effect for Burst {
    fn name(&self) -> &'static str {
        "burst"
    }

    fn on_pointer(&mut self, event: PointerEvent) {
        if let PointerEvent::Pressed(at) = event {
            self.fire(at);
        }
    }

    fn tick(&mut self, dt: f32) {
        self.field.tick(dt);
    }

    fn render(&self, surface: &mut dyn Surface) {
        self.field.render(surface);
    }

    fn active_count(&self) -> usize {
        self.field.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_spawns_and_burns_out() {
        let mut burst = Burst::new(BurstConfig::default());
        assert_eq!(burst.fire(Vec2::new(100.0, 100.0)), 14);

        for _ in 0..60 {
            burst.tick(1.0 / 60.0);
        }
        assert_eq!(burst.active_count(), 0);
    }

    #[test]
    fn test_rapid_clicks_stay_bounded() {
        let mut burst = Burst::new(BurstConfig::default());
        for _ in 0..50 {
            burst.on_pointer(PointerEvent::Pressed(Vec2::new(10.0, 10.0)));
            assert!(burst.active_count() <= 96);
        }
        assert_eq!(burst.active_count(), 96);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(BurstConfig::default().validate().is_ok());
    }
}
