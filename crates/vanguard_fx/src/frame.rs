//! # Frame Loop
//!
//! One `run_frame` per display refresh:
//! 1. Clamp `dt` so a suspended tab doesn't teleport everything
//! 2. Deliver queued pointer events to every effect
//! 3. Tick + render every registered effect, in registration order
//! 4. Record timing against the frame budget
//!
//! Registering an effect returns a [`Registration`]. Dropping it removes the
//! effect, so a torn-down view can never leave a perpetual callback behind.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use crate::effects::Effect;
use crate::error::{FxError, FxResult};
use crate::math::Viewport;
use crate::pointer::{PointerEvent, PointerState};
use crate::surface::Surface;

/// Frame loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    /// Largest `dt` a single frame may advance, seconds.
    pub max_step: f32,
    /// Frame budget in milliseconds.
    pub budget_ms: f32,
    /// Clear the surface before drawing.
    pub clear: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_step: 0.1,
            budget_ms: 16.0,
            clear: true,
        }
    }
}

impl FrameConfig {
    /// Validates the config.
    ///
    /// # Errors
    /// Returns [`FxError::InvalidConfig`] for non-positive values.
    pub fn validate(&self) -> FxResult<()> {
        if !self.max_step.is_finite() || self.max_step <= 0.0 {
            return Err(FxError::invalid("frame.max_step", "must be positive"));
        }
        if !self.budget_ms.is_finite() || self.budget_ms <= 0.0 {
            return Err(FxError::invalid("frame.budget_ms", "must be positive"));
        }
        Ok(())
    }

    fn budget(&self) -> Duration {
        Duration::try_from_secs_f32(self.budget_ms / 1000.0).unwrap_or(Duration::MAX)
    }
}

/// Frame timing counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Frames run.
    pub frames: u64,
    /// Wall time of the last frame.
    pub last_frame: Duration,
    /// Slowest frame so far.
    pub worst_frame: Duration,
    /// Frames that exceeded the budget.
    pub over_budget: u64,
    /// Effects registered during the last frame.
    pub active_effects: usize,
    /// Entities alive across all effects after the last frame.
    pub active_entities: usize,
}

/// Identifier of a registered effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

struct Slot {
    id: RegistrationId,
    effect: Box<dyn Effect>,
}

#[derive(Default)]
struct Registry {
    slots: Vec<Slot>,
    next_id: u64,
}

/// Guard for a registered effect. Dropping it deregisters the effect.
#[must_use = "dropping a Registration immediately removes the effect"]
pub struct Registration {
    id: RegistrationId,
    registry: Weak<Mutex<Registry>>,
}

impl Registration {
    /// The effect's id.
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// True while the effect is still in a live frame loop.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.lock().slots.iter().any(|s| s.id == self.id))
    }

    /// Explicitly deregisters. Same as dropping.
    pub fn cancel(self) {}
}

impl Drop for Registration {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock();
        let before = registry.slots.len();
        registry.slots.retain(|slot| slot.id != self.id);
        if registry.slots.len() < before {
            tracing::debug!(id = self.id.0, "effect deregistered");
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration").field("id", &self.id).finish()
    }
}

/// Drives registered effects once per frame.
pub struct FrameLoop {
    config: FrameConfig,
    registry: Arc<Mutex<Registry>>,
    pending: Vec<PointerEvent>,
    pointer: PointerState,
    viewport: Viewport,
    stats: FrameStats,
}

impl FrameLoop {
    /// Creates an empty loop.
    #[must_use]
    pub fn new(config: FrameConfig, viewport: Viewport) -> Self {
        Self {
            config,
            registry: Arc::new(Mutex::new(Registry::default())),
            pending: Vec::with_capacity(32),
            pointer: PointerState::new(),
            viewport,
            stats: FrameStats::default(),
        }
    }

    /// Registers an effect. Keep the returned guard alive for as long as the
    /// effect should run.
    pub fn register(&self, effect: Box<dyn Effect>) -> Registration {
        let mut registry = self.registry.lock();
        let id = RegistrationId(registry.next_id);
        registry.next_id += 1;

        tracing::debug!(id = id.0, effect = effect.name(), "effect registered");
        registry.slots.push(Slot { id, effect });

        Registration {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Number of registered effects.
    #[must_use]
    pub fn effect_count(&self) -> usize {
        self.registry.lock().slots.len()
    }

    /// Queues a pointer event for the next frame.
    pub fn pointer(&mut self, event: PointerEvent) {
        self.pending.push(event);
    }

    /// Last known pointer state.
    #[must_use]
    pub fn pointer_state(&self) -> PointerState {
        self.pointer
    }

    /// Propagates a viewport resize to every effect.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        for slot in &mut self.registry.lock().slots {
            slot.effect.on_resize(viewport);
        }
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Timing counters.
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Runs one frame: events, tick, render.
    ///
    /// Returns the `dt` actually applied after clamping.
    pub fn run_frame(&mut self, dt: f32, surface: &mut dyn Surface) -> f32 {
        let started = Instant::now();
        let step = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_step)
        } else {
            0.0
        };

        if self.config.clear {
            surface.clear();
        }

        let mut registry = self.registry.lock();
        for event in self.pending.drain(..) {
            self.pointer.apply(event);
            for slot in &mut registry.slots {
                slot.effect.on_pointer(event);
            }
        }

        let mut entities = 0;
        for slot in &mut registry.slots {
            slot.effect.tick(step);
            slot.effect.render(surface);
            entities += slot.effect.active_count();
        }
        let active_effects = registry.slots.len();
        drop(registry);

        let elapsed = started.elapsed();
        self.stats.frames += 1;
        self.stats.last_frame = elapsed;
        self.stats.worst_frame = self.stats.worst_frame.max(elapsed);
        self.stats.active_effects = active_effects;
        self.stats.active_entities = entities;
        if elapsed > self.config.budget() {
            self.stats.over_budget += 1;
            tracing::warn!(
                elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
                entities,
                "frame over budget"
            );
        }

        step
    }
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("config", &self.config)
            .field("effects", &self.effect_count())
            .field("viewport", &self.viewport)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
