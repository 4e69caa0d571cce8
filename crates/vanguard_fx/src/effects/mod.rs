//! # Visual Effects
//!
//! Every decorative effect on the site is a [`ParticleField`] with a
//! different spawn trigger and a different way of drawing its entities:
//! - [`AmbientField`] - page background, bouncing particles with link lines
//! - [`PointerTrail`] - fading trail behind the cursor
//! - [`DecalLayer`] - bullet holes left by clicks
//! - [`Burst`] - spark shower on click
//!
//! [`ParticleField`]: crate::field::ParticleField

mod ambient;
mod burst;
mod decals;
mod trail;

pub use ambient::{AmbientConfig, AmbientField, LinkConfig};
pub use burst::{Burst, BurstConfig};
pub use decals::{DecalConfig, DecalLayer};
pub use trail::{PointerTrail, TrailConfig};

use crate::math::Viewport;
use crate::pointer::PointerEvent;
use crate::surface::Surface;

/// A self-contained animation driven once per frame.
///
/// Each effect owns its entities exclusively; effects never share state,
/// so any number can run in the same frame loop.
pub trait Effect {
    /// Short name for logs and stats.
    fn name(&self) -> &'static str;

    /// Reacts to pointer input. Default: ignore.
    fn on_pointer(&mut self, _event: PointerEvent) {}

    /// Reacts to a viewport resize. Default: ignore.
    fn on_resize(&mut self, _viewport: Viewport) {}

    /// Advances the effect by `dt` seconds.
    fn tick(&mut self, dt: f32);

    /// Draws the effect.
    fn render(&self, surface: &mut dyn Surface);

    /// Number of live entities.
    fn active_count(&self) -> usize;
}
