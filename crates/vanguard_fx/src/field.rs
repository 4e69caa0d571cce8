//! # Particle Field
//!
//! The shared animation loop behind every effect on the site.
//!
//! A field owns a bounded, insertion-ordered collection of [`Particle`]s:
//! 1. `spawn` / `push` add entities, evicting the oldest when full
//! 2. `tick` applies the pointer force, integrates motion, ages, bounces,
//!    then drops expired and non-finite entities
//! 3. `render` draws survivors oldest first so new entities layer on top
//!
//! Nothing here can fail. Bad input degrades to "no effect".

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{FxError, FxResult};
use crate::force::PointerForce;
use crate::math::{Vec2, Viewport};
use crate::particle::{Particle, ParticleConfig};

/// Largest entity cap a config may ask for. Frame cost grows with the
/// count (quadratically with link lines), so real pages stay in the tens.
pub const MAX_CAPACITY: usize = 10_000;

/// Slots reserved up front; larger fields grow on demand.
const PREALLOCATE: usize = 256;

/// Checks a configured entity cap against `1..=MAX_CAPACITY`.
///
/// # Errors
/// Returns [`FxError::InvalidConfig`] naming `field`.
pub fn check_capacity(field: &str, value: usize) -> FxResult<()> {
    if (1..=MAX_CAPACITY).contains(&value) {
        Ok(())
    } else {
        Err(FxError::invalid(field, format!("must be within 1..={MAX_CAPACITY}")))
    }
}
use crate::surface::Surface;

/// What happens at the viewport edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Boundary {
    /// Entities may leave the surface.
    #[default]
    Unbounded,
    /// Entities bounce off the edges and never escape.
    Bounce(Viewport),
}

/// Lifetime counters for a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldStats {
    /// Entities accepted by `push`/`spawn`.
    pub spawned: u64,
    /// Entities removed after reaching their lifetime.
    pub expired: u64,
    /// Entities evicted to honor the capacity bound.
    pub evicted: u64,
    /// Entities dropped because their state went non-finite.
    pub dropped_invalid: u64,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Entities that reached their lifetime this tick.
    pub expired: usize,
    /// Entities dropped for non-finite state this tick.
    pub dropped: usize,
}

impl TickReport {
    /// Total entities removed.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.expired + self.dropped
    }
}

/// A bounded particle collection with its own RNG.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: VecDeque<Particle>,
    capacity: usize,
    boundary: Boundary,
    force: Option<PointerForce>,
    pointer: Option<Vec2>,
    speed_limit: Option<f32>,
    rng: ChaCha8Rng,
    stats: FieldStats,
}

impl ParticleField {
    /// Default RNG seed.
    pub const DEFAULT_SEED: u64 = 0x5641_4E47;

    /// Creates a field holding at most `capacity` entities.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: VecDeque::with_capacity(capacity.min(PREALLOCATE)),
            capacity,
            boundary: Boundary::Unbounded,
            force: None,
            pointer: None,
            speed_limit: None,
            rng: ChaCha8Rng::seed_from_u64(Self::DEFAULT_SEED),
            stats: FieldStats::default(),
        }
    }

    /// Reseeds the spawn RNG.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Sets edge behavior.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Enables the pointer force.
    #[must_use]
    pub fn with_force(mut self, force: PointerForce) -> Self {
        self.force = Some(force);
        self
    }

    /// Caps entity speed after forces are applied.
    #[must_use]
    pub fn with_speed_limit(mut self, limit: f32) -> Self {
        self.speed_limit = Some(limit);
        self
    }

    /// Maximum number of live entities.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True when no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Live entities, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.particles.iter()
    }

    /// Counters since creation.
    #[must_use]
    pub fn stats(&self) -> FieldStats {
        self.stats
    }

    /// Current edge behavior.
    #[must_use]
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Changes edge behavior (e.g. after a resize). Entities already outside
    /// a new bounce box are pulled back in on the next tick.
    pub fn set_boundary(&mut self, boundary: Boundary) {
        self.boundary = boundary;
    }

    /// Updates the pointer position used by the force.
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = pointer.filter(|p| p.is_finite());
    }

    /// The spawn RNG, for effects that randomize their own spawns.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Removes every entity.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Adds one entity, evicting the oldest when full.
    ///
    /// Returns false when the entity was rejected (zero capacity or
    /// non-finite state).
    pub fn push(&mut self, particle: Particle) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if !particle.is_finite() {
            self.stats.dropped_invalid += 1;
            return false;
        }

        while self.particles.len() >= self.capacity {
            self.particles.pop_front();
            self.stats.evicted += 1;
        }

        self.particles.push_back(particle);
        self.stats.spawned += 1;
        true
    }

    /// Spawns `config.spawn_count` entities at `origin`.
    ///
    /// Returns how many were accepted.
    pub fn spawn(&mut self, origin: Vec2, config: &ParticleConfig) -> usize {
        if !origin.is_finite() {
            return 0;
        }

        let mut accepted = 0;
        for _ in 0..config.spawn_count {
            let particle = config.sample(origin, &mut self.rng);
            if self.push(particle) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Advances every entity by `dt` seconds and removes the dead.
    ///
    /// Non-positive or non-finite `dt` is a no-op.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        if !dt.is_finite() || dt <= 0.0 {
            return TickReport::default();
        }

        let pointer = self.pointer.zip(self.force);
        let speed_limit = self.speed_limit;
        let boundary = self.boundary;

        for particle in &mut self.particles {
            if let Some((pointer, force)) = pointer {
                particle.velocity += force.impulse(particle.position, pointer, dt);
            }
            if let Some(limit) = speed_limit {
                particle.velocity = particle.velocity.clamp_length(limit);
            }

            particle.advance(dt);

            if let Boundary::Bounce(viewport) = boundary {
                bounce(particle, viewport);
            }
        }

        let mut report = TickReport::default();
        self.particles.retain(|p| {
            if !p.is_finite() {
                report.dropped += 1;
                false
            } else if !p.is_alive() {
                report.expired += 1;
                false
            } else {
                true
            }
        });

        if report.dropped > 0 {
            tracing::trace!(dropped = report.dropped, "dropped non-finite particles");
        }

        self.stats.expired += report.expired as u64;
        self.stats.dropped_invalid += report.dropped as u64;
        report
    }

    /// Draws every visible entity as a circle, oldest first.
    pub fn render(&self, surface: &mut dyn Surface) {
        for particle in &self.particles {
            let opacity = particle.current_opacity();
            let size = particle.current_size();
            if opacity > 0.0 && size > 0.0 {
                surface.fill_circle(particle.position, size, particle.current_color());
            }
        }
    }
}

/// Reflects velocity at the viewport edges and clamps position inside.
fn bounce(particle: &mut Particle, viewport: Viewport) {
    let p = &mut particle.position;
    let v = &mut particle.velocity;

    if p.x < 0.0 {
        p.x = 0.0;
        v.x = v.x.abs();
    } else if p.x > viewport.width {
        p.x = viewport.width;
        v.x = -v.x.abs();
    }

    if p.y < 0.0 {
        p.y = 0.0;
        v.y = v.y.abs();
    } else if p.y > viewport.height {
        p.y = viewport.height;
        v.y = -v.y.abs();
    }
}
