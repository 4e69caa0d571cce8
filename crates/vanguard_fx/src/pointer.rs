//! Pointer input from the host page.

use crate::math::Vec2;

/// Pointer event forwarded by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved to a position.
    Moved(Vec2),
    /// Primary button pressed (a "shot" for the decal layer).
    Pressed(Vec2),
    /// Pointer left the surface.
    Left,
}

impl PointerEvent {
    /// Position carried by the event, if any.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        match *self {
            Self::Moved(p) | Self::Pressed(p) => Some(p),
            Self::Left => None,
        }
    }
}

/// Last known pointer position, tracked across events.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    position: Option<Vec2>,
    previous: Option<Vec2>,
}

impl PointerState {
    /// Creates a state with no known position.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an event. Non-finite coordinates are ignored.
    pub fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Moved(p) | PointerEvent::Pressed(p) => {
                if p.is_finite() {
                    self.previous = self.position;
                    self.position = Some(p);
                }
            }
            PointerEvent::Left => {
                self.previous = None;
                self.position = None;
            }
        }
    }

    /// Current position, `None` when the pointer is off the surface.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Position before the latest move.
    #[must_use]
    pub fn previous(&self) -> Option<Vec2> {
        self.previous
    }
}
