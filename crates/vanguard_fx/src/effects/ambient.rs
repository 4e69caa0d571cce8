//! Ambient particle background.
//!
//! A fixed population of slow particles drifting across the page, bouncing
//! off the edges, shoved around by the pointer, with faint lines between
//! close neighbours. Linking is O(n²), keep `count` in the tens.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Effect;
use crate::error::{FxError, FxResult};
use crate::field::{check_capacity, Boundary, ParticleField};
use crate::force::PointerForce;
use crate::math::{Vec2, Viewport};
use crate::particle::Particle;
use crate::pointer::PointerEvent;
use crate::style::Color;
use crate::surface::Surface;

/// Lines drawn between nearby particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Maximum link length in pixels.
    pub distance: f32,
    /// Line width.
    pub width: f32,
    /// Line color.
    pub color: Color,
    /// Opacity of a zero-length link; falls off linearly to 0 at `distance`.
    pub opacity: f32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            distance: 140.0,
            width: 1.0,
            color: Color::NEON_CYAN,
            opacity: 0.35,
        }
    }
}

/// Ambient background configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AmbientConfig {
    /// Population size (also the field capacity).
    pub count: usize,
    /// Maximum initial speed, pixels per second.
    pub speed: f32,
    /// Speed cap after pointer pushes.
    pub max_speed: f32,
    /// Smallest radius.
    pub size_min: f32,
    /// Largest radius.
    pub size_max: f32,
    /// Particle color.
    pub color: Color,
    /// Particle opacity.
    pub opacity: f32,
    /// Lifetime in seconds; `None` keeps particles forever.
    pub lifetime: Option<f32>,
    /// Pointer interaction. Off unless a `[ambient.force]` table is present.
    pub force: Option<PointerForce>,
    /// Neighbour links. Off unless a `[ambient.links]` table is present.
    pub links: Option<LinkConfig>,
    /// RNG seed.
    pub seed: u64,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            count: 60,
            speed: 30.0,
            max_speed: 120.0,
            size_min: 1.0,
            size_max: 3.0,
            color: Color::VANGUARD_ORANGE,
            opacity: 0.6,
            lifetime: None,
            force: None,
            links: None,
            seed: 1,
        }
    }
}

impl AmbientConfig {
    /// Validates the config.
    ///
    /// # Errors
    /// Returns [`FxError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> FxResult<()> {
        check_capacity("ambient.count", self.count)?;
        for (name, value) in [
            ("ambient.speed", self.speed),
            ("ambient.max_speed", self.max_speed),
            ("ambient.size_min", self.size_min),
            ("ambient.size_max", self.size_max),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FxError::invalid(name, "must be finite and non-negative"));
            }
        }
        if self.size_max < self.size_min {
            return Err(FxError::invalid("ambient.size_max", "must be >= size_min"));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(FxError::invalid("ambient.opacity", "must be within 0..=1"));
        }
        if let Some(lifetime) = self.lifetime {
            if !lifetime.is_finite() || lifetime <= 0.0 {
                return Err(FxError::invalid("ambient.lifetime", "must be positive"));
            }
        }
        if let Some(force) = &self.force {
            force.validate("ambient.force")?;
        }
        if let Some(links) = &self.links {
            if !links.distance.is_finite() || links.distance <= 0.0 {
                return Err(FxError::invalid("ambient.links.distance", "must be positive"));
            }
            if !(0.0..=1.0).contains(&links.opacity) {
                return Err(FxError::invalid("ambient.links.opacity", "must be within 0..=1"));
            }
        }
        Ok(())
    }
}

/// Ambient background effect.
#[derive(Debug, Clone)]
pub struct AmbientField {
    config: AmbientConfig,
    viewport: Viewport,
    field: ParticleField,
}

impl AmbientField {
    /// Creates the background and fills the viewport.
    #[must_use]
    pub fn new(config: AmbientConfig, viewport: Viewport) -> Self {
        let mut field = ParticleField::new(config.count)
            .with_seed(config.seed)
            .with_boundary(Boundary::Bounce(viewport))
            .with_speed_limit(config.max_speed);
        if let Some(force) = config.force {
            field = field.with_force(force);
        }

        let mut ambient = Self {
            config,
            viewport,
            field,
        };
        ambient.refill();
        ambient
    }

    /// The underlying field.
    #[must_use]
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    fn refill(&mut self) {
        while self.field.len() < self.config.count {
            if !self.spawn_one() {
                break;
            }
        }
    }

    fn spawn_one(&mut self) -> bool {
        let rng = self.field.rng();
        let position = self.viewport.random_point(rng);
        let velocity = Vec2::from_angle(rng.gen::<f32>() * TAU, rng.gen::<f32>() * self.config.speed);
        let size = self.config.size_min + (self.config.size_max - self.config.size_min) * rng.gen::<f32>();

        let particle = match self.config.lifetime {
            Some(lifetime) => Particle::new(position, velocity, lifetime),
            None => Particle::immortal(position, velocity),
        }
        .with_size(size)
        .with_color(self.config.color)
        .with_opacity(self.config.opacity);

        self.field.push(particle)
    }

    fn render_links(&self, links: &LinkConfig, surface: &mut dyn Surface) {
        for (i, a) in self.field.iter().enumerate() {
            for b in self.field.iter().skip(i + 1) {
                let distance = a.position.distance(b.position);
                if !distance.is_finite() || distance >= links.distance {
                    continue;
                }
                let strength = 1.0 - distance / links.distance;
                let alpha = links.opacity * strength * a.current_opacity().min(b.current_opacity());
                if alpha > 0.0 {
                    surface.stroke_line(a.position, b.position, links.width, links.color.fade(alpha));
                }
            }
        }
    }
}

impl Effect for AmbientField {
    fn name(&self) -> &'static str {
        "ambient"
    }

    fn on_pointer(&mut self, event: PointerEvent) {
        self.field.set_pointer(event.position());
    }

    fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.field.set_boundary(Boundary::Bounce(viewport));
    }

    fn tick(&mut self, dt: f32) {
        let report = self.field.tick(dt);
        if report.removed() > 0 {
            self.refill();
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        if let Some(links) = &self.config.links {
            self.render_links(links, surface);
        }
        self.field.render(surface);
    }

    fn active_count(&self) -> usize {
        self.field.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::CommandRecorder;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn test_fills_population_inside_viewport() {
        let ambient = AmbientField::new(AmbientConfig::default(), viewport());
        assert_eq!(ambient.active_count(), 60);
        assert!(ambient.field().iter().all(|p| viewport().contains(p.position)));
    }

    #[test]
    fn test_population_stays_constant_with_finite_lifetime() {
        let config = AmbientConfig {
            count: 10,
            lifetime: Some(0.5),
            ..AmbientConfig::default()
        };
        let mut ambient = AmbientField::new(config, viewport());
        for _ in 0..120 {
            ambient.tick(1.0 / 60.0);
            assert_eq!(ambient.active_count(), 10);
        }
    }

    #[test]
    fn test_particles_never_escape() {
        let config = AmbientConfig {
            speed: 2000.0,
            max_speed: 4000.0,
            ..AmbientConfig::default()
        };
        let mut ambient = AmbientField::new(config, viewport());
        for _ in 0..300 {
            ambient.tick(1.0 / 30.0);
        }
        assert!(ambient.field().iter().all(|p| viewport().contains(p.position)));
    }

    #[test]
    fn test_links_only_between_close_neighbours() {
        let config = AmbientConfig {
            count: 2,
            speed: 0.0,
            links: Some(LinkConfig {
                distance: 50.0,
                ..LinkConfig::default()
            }),
            ..AmbientConfig::default()
        };
        let mut ambient = AmbientField::new(config, viewport());
        ambient.field.clear();
        ambient.field.push(Particle::immortal(Vec2::new(10.0, 10.0), Vec2::ZERO).with_size(1.0));
        ambient.field.push(Particle::immortal(Vec2::new(40.0, 10.0), Vec2::ZERO).with_size(1.0));

        let mut recorder = CommandRecorder::new(viewport());
        ambient.render(&mut recorder);
        assert_eq!(recorder.line_count(), 1);
        assert_eq!(recorder.circle_count(), 2);

        ambient.field.clear();
        ambient.field.push(Particle::immortal(Vec2::new(10.0, 10.0), Vec2::ZERO).with_size(1.0));
        ambient.field.push(Particle::immortal(Vec2::new(90.0, 10.0), Vec2::ZERO).with_size(1.0));
        let mut recorder = CommandRecorder::new(viewport());
        ambient.render(&mut recorder);
        assert_eq!(recorder.line_count(), 0);
    }

    #[test]
    fn test_validate_rejects_zero_count() {
        let config = AmbientConfig {
            count: 0,
            ..AmbientConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(AmbientConfig::default().validate().is_ok());
    }
}
