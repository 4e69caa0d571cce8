//! Pointer trail.
//!
//! Drops a point under the cursor every `spacing` pixels. Points shrink and
//! fade over a short lifetime and are joined into a tapering polyline.
//! Leaving the page ends the stroke, so re-entering starts a new line.

use serde::{Deserialize, Serialize};

use super::Effect;
use crate::easing::Easing;
use crate::error::{FxError, FxResult};
use crate::field::{check_capacity, ParticleField};
use crate::math::Vec2;
use crate::particle::Particle;
use crate::pointer::PointerEvent;
use crate::style::Color;
use crate::surface::Surface;

/// Pointer trail configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrailConfig {
    /// Maximum number of trail points.
    pub max_points: usize,
    /// Seconds a point stays visible.
    pub lifetime: f32,
    /// Radius of a fresh point.
    pub size: f32,
    /// How the radius shrinks to zero.
    pub size_easing: Easing,
    /// Trail color.
    pub color: Color,
    /// Opacity of a fresh point.
    pub opacity: f32,
    /// Minimum pointer travel between points, pixels.
    pub spacing: f32,
    /// Consecutive points farther apart than this are not joined.
    pub max_gap: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            max_points: 40,
            lifetime: 0.45,
            size: 6.0,
            size_easing: Easing::Linear,
            color: Color::VANGUARD_ORANGE,
            opacity: 0.9,
            spacing: 4.0,
            max_gap: 80.0,
        }
    }
}

impl TrailConfig {
    /// Validates the config.
    ///
    /// # Errors
    /// Returns [`FxError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> FxResult<()> {
        check_capacity("trail.max_points", self.max_points)?;
        if !self.lifetime.is_finite() || self.lifetime <= 0.0 {
            return Err(FxError::invalid("trail.lifetime", "must be positive"));
        }
        for (name, value) in [
            ("trail.size", self.size),
            ("trail.spacing", self.spacing),
            ("trail.max_gap", self.max_gap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FxError::invalid(name, "must be finite and non-negative"));
            }
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(FxError::invalid("trail.opacity", "must be within 0..=1"));
        }
        Ok(())
    }
}

/// Cursor trail effect.
#[derive(Debug, Clone)]
pub struct PointerTrail {
    config: TrailConfig,
    field: ParticleField,
    last_spawn: Option<Vec2>,
    stroke: u32,
}

impl PointerTrail {
    /// Creates an empty trail.
    #[must_use]
    pub fn new(config: TrailConfig) -> Self {
        Self {
            field: ParticleField::new(config.max_points),
            config,
            last_spawn: None,
            stroke: 0,
        }
    }

    /// The underlying field.
    #[must_use]
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    fn drop_point(&mut self, at: Vec2) {
        let far_enough = self
            .last_spawn
            .map_or(true, |last| last.distance(at) >= self.config.spacing);
        if !far_enough {
            return;
        }

        let point = Particle::new(at, Vec2::ZERO, self.config.lifetime)
            .with_size_range(self.config.size, 0.0, self.config.size_easing)
            .with_color(self.config.color)
            .with_opacity(self.config.opacity)
            .with_group(self.stroke);
        if self.field.push(point) {
            self.last_spawn = Some(at);
        }
    }
}

impl Effect for PointerTrail {
    fn name(&self) -> &'static str {
        "trail"
    }

    fn on_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Moved(at) | PointerEvent::Pressed(at) => self.drop_point(at),
            PointerEvent::Left => {
                if self.last_spawn.take().is_some() {
                    self.stroke = self.stroke.wrapping_add(1);
                }
            }
        }
    }

    fn tick(&mut self, dt: f32) {
        self.field.tick(dt);
    }

    fn render(&self, surface: &mut dyn Surface) {
        let mut previous: Option<&Particle> = None;
        for point in self.field.iter() {
            if let Some(prev) = previous {
                let joined = prev.group == point.group
                    && prev.position.distance(point.position) <= self.config.max_gap;
                if joined {
                    let color = prev.current_color();
                    let width = prev.current_size();
                    if color.a > 0.0 && width > 0.0 {
                        surface.stroke_line(prev.position, point.position, width, color);
                    }
                }
            }
            previous = Some(point);
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
    use crate::math::Viewport;
    use crate::surface::CommandRecorder;

    #[test]
    fn test_spacing_throttles_points() {
        let mut trail = PointerTrail::new(TrailConfig {
            spacing: 10.0,
            ..TrailConfig::default()
        });

        trail.on_pointer(PointerEvent::Moved(Vec2::new(0.0, 0.0)));
        trail.on_pointer(PointerEvent::Moved(Vec2::new(3.0, 0.0)));
        trail.on_pointer(PointerEvent::Moved(Vec2::new(12.0, 0.0)));

        assert_eq!(trail.active_count(), 2);
    }

    #[test]
    fn test_trail_is_bounded_and_fades_out() {
        let mut trail = PointerTrail::new(TrailConfig {
            max_points: 5,
            spacing: 0.0,
            ..TrailConfig::default()
        });
        for i in 0..50u8 {
            trail.on_pointer(PointerEvent::Moved(Vec2::new(f32::from(i) * 5.0, 0.0)));
            assert!(trail.active_count() <= 5);
        }

        trail.tick(1.0);
        assert_eq!(trail.active_count(), 0);
    }

    #[test]
    fn test_segments_skip_gaps_after_leave() {
        let mut trail = PointerTrail::new(TrailConfig::default());
        trail.on_pointer(PointerEvent::Moved(Vec2::new(0.0, 0.0)));
        trail.on_pointer(PointerEvent::Moved(Vec2::new(10.0, 0.0)));
        trail.on_pointer(PointerEvent::Left);
        trail.on_pointer(PointerEvent::Moved(Vec2::new(500.0, 500.0)));

        let mut recorder = CommandRecorder::new(Viewport::new(800.0, 600.0));
        trail.render(&mut recorder);

        assert_eq!(recorder.circle_count(), 3);
        assert_eq!(recorder.line_count(), 1);
    }

    #[test]
    fn test_reentering_near_exit_starts_new_stroke() {
        let mut trail = PointerTrail::new(TrailConfig::default());
        trail.on_pointer(PointerEvent::Moved(Vec2::new(100.0, 100.0)));
        trail.on_pointer(PointerEvent::Moved(Vec2::new(110.0, 100.0)));
        trail.on_pointer(PointerEvent::Left);
        trail.on_pointer(PointerEvent::Moved(Vec2::new(115.0, 100.0)));
        trail.on_pointer(PointerEvent::Moved(Vec2::new(125.0, 100.0)));

        let mut recorder = CommandRecorder::new(Viewport::new(800.0, 600.0));
        trail.render(&mut recorder);

        assert_eq!(recorder.circle_count(), 4);
        // one line per stroke, none across the exit
        assert_eq!(recorder.line_count(), 2);
    }

    #[test]
    fn test_repeated_leave_does_not_split_stroke() {
        let mut trail = PointerTrail::new(TrailConfig::default());
        trail.on_pointer(PointerEvent::Left);
        trail.on_pointer(PointerEvent::Left);
        trail.on_pointer(PointerEvent::Moved(Vec2::new(0.0, 0.0)));
        trail.on_pointer(PointerEvent::Moved(Vec2::new(10.0, 0.0)));

        let mut recorder = CommandRecorder::new(Viewport::new(800.0, 600.0));
        trail.render(&mut recorder);
        assert_eq!(recorder.line_count(), 1);
    }
}
