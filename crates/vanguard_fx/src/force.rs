//! Pointer interaction force.
//!
//! Inside radius `R` an entity at distance `d` receives a velocity impulse
//! scaled by `(R - d) / R`. Degenerate geometry (pointer exactly on the
//! entity, NaN inputs) yields no force.

use serde::{Deserialize, Serialize};

use crate::error::{FxError, FxResult};
use crate::math::Vec2;

/// Direction of the pointer force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceMode {
    /// Push entities away from the pointer.
    #[default]
    Repel,
    /// Pull entities toward the pointer.
    Attract,
}

/// Pointer force parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PointerForce {
    /// Interaction radius in pixels.
    pub radius: f32,
    /// Peak acceleration at the pointer, pixels per second squared.
    pub strength: f32,
    /// Repel or attract.
    pub mode: ForceMode,
}

impl Default for PointerForce {
    fn default() -> Self {
        Self {
            radius: 120.0,
            strength: 600.0,
            mode: ForceMode::Repel,
        }
    }
}

impl PointerForce {
    /// Validates the parameters.
    ///
    /// # Errors
    /// Returns [`FxError::InvalidConfig`] for a negative or non-finite radius
    /// or a non-finite strength.
    pub fn validate(&self, section: &str) -> FxResult<()> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(FxError::invalid(&format!("{section}.radius"), "must be finite and non-negative"));
        }
        if !self.strength.is_finite() {
            return Err(FxError::invalid(&format!("{section}.strength"), "must be finite"));
        }
        Ok(())
    }

    /// Velocity change for an entity at `position` over `dt` seconds.
    #[must_use]
    pub fn impulse(&self, position: Vec2, pointer: Vec2, dt: f32) -> Vec2 {
        if self.radius <= 0.0 {
            return Vec2::ZERO;
        }

        let offset = position - pointer;
        let distance = offset.length();
        if !distance.is_finite() || distance <= f32::EPSILON || distance >= self.radius {
            return Vec2::ZERO;
        }

        let falloff = (self.radius - distance) / self.radius;
        let away = offset * (1.0 / distance);
        let direction = match self.mode {
            ForceMode::Repel => away,
            ForceMode::Attract => -away,
        };

        let impulse = direction * (self.strength * falloff * dt);
        if impulse.is_finite() {
            impulse
        } else {
            Vec2::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repel_scales_with_distance() {
        let force = PointerForce {
            radius: 100.0,
            strength: 100.0,
            mode: ForceMode::Repel,
        };

        let near = force.impulse(Vec2::new(25.0, 0.0), Vec2::ZERO, 1.0);
        let far = force.impulse(Vec2::new(75.0, 0.0), Vec2::ZERO, 1.0);

        assert!((near.x - 75.0).abs() < 1e-4);
        assert!((far.x - 25.0).abs() < 1e-4);
        assert_eq!(near.y, 0.0);
    }

    #[test]
    fn test_attract_points_at_pointer() {
        let force = PointerForce {
            mode: ForceMode::Attract,
            ..PointerForce::default()
        };
        let impulse = force.impulse(Vec2::new(10.0, 0.0), Vec2::ZERO, 1.0);
        assert!(impulse.x < 0.0);
    }

    #[test]
    fn test_outside_radius_and_degenerate_cases_apply_nothing() {
        let force = PointerForce::default();
        assert_eq!(force.impulse(Vec2::new(500.0, 0.0), Vec2::ZERO, 1.0), Vec2::ZERO);
        assert_eq!(force.impulse(Vec2::ZERO, Vec2::ZERO, 1.0), Vec2::ZERO);
        assert_eq!(force.impulse(Vec2::new(f32::NAN, 0.0), Vec2::ZERO, 1.0), Vec2::ZERO);
    }
}
