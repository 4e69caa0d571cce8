//! # VANGUARD FX
//!
//! Frame-driven decorative effects for the VANGUARD fan site.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      FRAME PIPELINE                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  Pointer / Route Events → Effects → Particle Fields →     │
//! │        ↓                    ↓             ↓               │
//! │   PointerState          tick(dt)      render(Surface)     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every effect owns a bounded [`ParticleField`]. Spawning past capacity
//! evicts the oldest entity, ticking drops dead and non-finite entities,
//! and rendering draws survivors oldest first. Effects are registered on a
//! [`FrameLoop`] and deregistered when their [`Registration`] is dropped.
//!
//! Drawing goes through the [`Surface`] trait so the same effects can
//! target a canvas, a GPU quad batch or a command recorder in tests.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod easing;
pub mod effects;
pub mod error;
pub mod field;
pub mod force;
pub mod frame;
pub mod math;
pub mod particle;
pub mod pointer;
pub mod style;
pub mod surface;
pub mod transition;
pub mod variant;

pub use config::EffectsConfig;
pub use easing::{Easing, Tween};
pub use effects::Effect;
pub use error::{FxError, FxResult};
pub use field::{Boundary, ParticleField, TickReport, MAX_CAPACITY};
pub use force::{ForceMode, PointerForce};
pub use frame::{FrameConfig, FrameLoop, FrameStats, Registration};
pub use math::{Rect, Vec2, Viewport};
pub use particle::{Fade, Particle, ParticleConfig};
pub use pointer::{PointerEvent, PointerState};
pub use style::Color;
pub use surface::{CommandRecorder, DrawCommand, QuadBatch, Surface};
pub use transition::{navigation_channel, GlitchTransition, NavigationEvent};
pub use variant::{ButtonColor, CardHover, CursorVariant, HoverAnimator};
