//! Glitch route transition.
//!
//! The router pushes [`NavigationEvent`]s into a channel; the transition
//! drains it once per frame and replays the glitch whenever the route
//! changed. Several navigations in one frame restart it once.

use crossbeam_channel::{Receiver, Sender};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::easing::{Easing, Tween};
use crate::effects::Effect;
use crate::error::{FxError, FxResult};
use crate::math::{Rect, Viewport};
use crate::style::Color;
use crate::surface::Surface;

/// Most slices a glitch may cut the page into.
pub const MAX_SLICES: u32 = 256;

/// Events published by the routing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// Client-side navigation finished.
    RouteChanged {
        /// New path.
        path: String,
    },
}

/// Creates the channel the router publishes on.
#[must_use]
pub fn navigation_channel() -> (Sender<NavigationEvent>, Receiver<NavigationEvent>) {
    crossbeam_channel::unbounded()
}

/// Glitch transition configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlitchConfig {
    /// Seconds from full glitch to clean.
    pub duration: f32,
    /// Peak horizontal slice displacement, pixels.
    pub max_offset: f32,
    /// Horizontal bands the screen is cut into.
    pub slices: u32,
    /// Band opacity at the start.
    pub opacity: f32,
    /// First band color.
    pub color_a: Color,
    /// Second band color.
    pub color_b: Color,
    /// RNG seed.
    pub seed: u64,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            duration: 0.45,
            max_offset: 40.0,
            slices: 12,
            opacity: 0.35,
            color_a: Color::NEON_CYAN,
            color_b: Color::NEON_PINK,
            seed: 9,
        }
    }
}

impl GlitchConfig {
    /// Validates the config.
    ///
    /// # Errors
    /// Returns [`FxError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> FxResult<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(FxError::invalid("glitch.duration", "must be positive"));
        }
        if !self.max_offset.is_finite() || self.max_offset < 0.0 {
            return Err(FxError::invalid("glitch.max_offset", "must be finite and non-negative"));
        }
        if !(1..=MAX_SLICES).contains(&self.slices) {
            return Err(FxError::invalid(
                "glitch.slices",
                format!("must be within 1..={MAX_SLICES}"),
            ));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(FxError::invalid("glitch.opacity", "must be within 0..=1"));
        }
        Ok(())
    }
}

/// Full-screen glitch replayed on every route change.
#[derive(Debug)]
pub struct GlitchTransition {
    config: GlitchConfig,
    events: Receiver<NavigationEvent>,
    progress: Tween,
    offsets: Vec<f32>,
    viewport: Viewport,
    rng: ChaCha8Rng,
    restarts: u64,
}

impl GlitchTransition {
    /// Creates an idle transition listening on `events`.
    #[must_use]
    pub fn new(config: GlitchConfig, events: Receiver<NavigationEvent>, viewport: Viewport) -> Self {
        Self {
            progress: Tween::new(1.0, Easing::ExponentialOut).with_duration(config.duration),
            offsets: vec![0.0; config.slices as usize],
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            events,
            viewport,
            restarts: 0,
        }
    }

    /// True while the glitch is visible.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.progress.is_complete()
    }

    /// How many times the transition has been restarted.
    #[must_use]
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Remaining glitch strength, 1 at restart and 0 when clean.
    #[must_use]
    pub fn intensity(&self) -> f32 {
        (1.0 - self.progress.value()).clamp(0.0, 1.0)
    }

    /// Current per-slice displacement in pixels.
    #[must_use]
    pub fn slice_offsets(&self) -> Vec<f32> {
        let amplitude = self.intensity() * self.config.max_offset;
        self.offsets.iter().map(|o| o * amplitude).collect()
    }
}

impl Effect for GlitchTransition {
    fn name(&self) -> &'static str {
        "glitch"
    }

    fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn tick(&mut self, dt: f32) {
        let mut last_path = None;
        for NavigationEvent::RouteChanged { path } in self.events.try_iter() {
            last_path = Some(path);
        }
        if let Some(path) = last_path {
            tracing::debug!(%path, "route changed, replaying glitch");
            self.progress.restart(0.0, 1.0);
            self.restarts += 1;
        }

        self.progress.update(dt);

        if self.is_running() {
            for offset in &mut self.offsets {
                *offset = self.rng.gen::<f32>() * 2.0 - 1.0;
            }
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        if !self.is_running() || self.offsets.is_empty() {
            return;
        }

        let intensity = self.intensity();
        #[allow(clippy::cast_precision_loss)]
        let band = self.viewport.height / self.offsets.len() as f32;
        for (i, offset) in self.slice_offsets().into_iter().enumerate() {
            let color = if i % 2 == 0 { self.config.color_a } else { self.config.color_b };
            #[allow(clippy::cast_precision_loss)]
            let y = i as f32 * band;
            surface.fill_rect(
                Rect::new(offset, y, self.viewport.width, band),
                color.fade(self.config.opacity * intensity),
            );
        }
    }

    fn active_count(&self) -> usize {
        if self.is_running() {
            self.offsets.len()
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::CommandRecorder;

    fn route(path: &str) -> NavigationEvent {
        NavigationEvent::RouteChanged {
            path: path.to_string(),
        }
    }

    #[test]
    fn test_idle_until_navigation() {
        let (_tx, rx) = navigation_channel();
        let mut glitch = GlitchTransition::new(GlitchConfig::default(), rx, Viewport::new(100.0, 120.0));
        glitch.tick(0.016);
        assert!(!glitch.is_running());

        let mut recorder = CommandRecorder::new(Viewport::new(100.0, 120.0));
        glitch.render(&mut recorder);
        assert!(recorder.commands().is_empty());
    }

    #[test]
    fn test_burst_of_navigations_restarts_once() {
        let (tx, rx) = navigation_channel();
        let mut glitch = GlitchTransition::new(GlitchConfig::default(), rx, Viewport::new(100.0, 120.0));

        tx.send(route("/heroes")).unwrap();
        tx.send(route("/news")).unwrap();
        glitch.tick(0.016);

        assert!(glitch.is_running());
        assert_eq!(glitch.restarts(), 1);

        let mut recorder = CommandRecorder::new(Viewport::new(100.0, 120.0));
        glitch.render(&mut recorder);
        assert_eq!(recorder.commands().len(), 12);
    }

    #[test]
    fn test_offsets_shrink_to_zero() {
        let (tx, rx) = navigation_channel();
        let config = GlitchConfig {
            duration: 0.5,
            ..GlitchConfig::default()
        };
        let mut glitch = GlitchTransition::new(config, rx, Viewport::new(100.0, 120.0));
        tx.send(route("/media")).unwrap();

        glitch.tick(0.01);
        let early = glitch.intensity();
        for _ in 0..10 {
            glitch.tick(0.01);
        }
        assert!(glitch.intensity() < early);
        assert!(glitch.slice_offsets().iter().all(|o| o.abs() <= 40.0));

        for _ in 0..60 {
            glitch.tick(0.01);
        }
        assert!(!glitch.is_running());
        assert_eq!(glitch.active_count(), 0);
    }
}
