//! Headless page run.
//!
//! Installs every configured effect into one frame loop and feeds it a
//! scripted visitor: the pointer sweeps the page, clicks at a steady rate
//! and navigates once halfway through.

use vanguard_fx::{
    navigation_channel, CommandRecorder, EffectsConfig, FrameLoop, FrameStats, NavigationEvent,
    PointerEvent, Vec2, Viewport,
};

/// Frames between simulated clicks.
const CLICK_EVERY: u32 = 30;

/// Result of a headless run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Frame loop counters after the last frame.
    pub stats: FrameStats,
    /// Draw commands in the last frame.
    pub commands: usize,
    /// Circles in the last frame.
    pub circles: usize,
    /// Lines in the last frame.
    pub lines: usize,
    /// Effects still registered after teardown.
    pub leaked_effects: usize,
}

/// Pointer position for frame `i` of `frames`: a figure-eight across the page.
fn pointer_at(viewport: Viewport, i: u32, frames: u32) -> Vec2 {
    #[allow(clippy::cast_precision_loss)]
    let t = i as f32 / frames.max(1) as f32 * std::f32::consts::TAU;
    Vec2::new(
        viewport.width * (0.5 + 0.4 * t.sin()),
        viewport.height * (0.5 + 0.3 * (2.0 * t).sin()),
    )
}

/// Runs `frames` frames of every effect in `config`, then tears the page down.
pub fn run_page(config: &EffectsConfig, viewport: Viewport, frames: u32, dt: f32) -> RunSummary {
    let mut frame_loop = FrameLoop::new(config.frame, viewport);
    let (router, navigation) = navigation_channel();
    let registrations = config.install(&frame_loop, navigation);
    let mut surface = CommandRecorder::new(viewport);
    tracing::info!(effects = registrations.len(), frames, "page mounted");

    for i in 0..frames {
        let position = pointer_at(viewport, i, frames);
        frame_loop.pointer(PointerEvent::Moved(position));
        if i % CLICK_EVERY == 0 {
            frame_loop.pointer(PointerEvent::Pressed(position));
        }
        if i == frames / 2 {
            let event = NavigationEvent::RouteChanged {
                path: "/heroes".to_string(),
            };
            if router.send(event).is_err() {
                tracing::warn!("navigation listener is gone");
            }
        }
        frame_loop.run_frame(dt, &mut surface);
    }

    let summary = RunSummary {
        stats: frame_loop.stats(),
        commands: surface.commands().len(),
        circles: surface.circle_count(),
        lines: surface.line_count(),
        leaked_effects: 0,
    };

    drop(registrations);
    RunSummary {
        leaked_effects: frame_loop.effect_count(),
        ..summary
    }
}
