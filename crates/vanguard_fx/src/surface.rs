//! Drawing surfaces.
//!
//! Effects draw through the [`Surface`] trait. Two implementations ship:
//! - [`CommandRecorder`] keeps a display list (the canvas-equivalent the
//!   page replays onto its 2D context).
//! - [`QuadBatch`] packs instanced quads for a GPU upload.

use bytemuck::{Pod, Zeroable};

use crate::math::{Rect, Vec2, Viewport};
use crate::style::Color;

/// A 2D drawing target sized to the viewport.
pub trait Surface {
    /// Drawable area.
    fn viewport(&self) -> Viewport;

    /// Clears everything drawn so far this frame.
    fn clear(&mut self);

    /// Filled circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Straight line.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);

    /// Filled axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Clear the surface.
    Clear,
    /// Filled circle.
    Circle {
        /// Center.
        center: Vec2,
        /// Radius.
        radius: f32,
        /// Fill color.
        color: Color,
    },
    /// Line segment.
    Line {
        /// Start point.
        from: Vec2,
        /// End point.
        to: Vec2,
        /// Stroke width.
        width: f32,
        /// Stroke color.
        color: Color,
    },
    /// Filled rectangle.
    Rect {
        /// Bounds.
        bounds: Rect,
        /// Fill color.
        color: Color,
    },
}

/// Display-list surface.
#[derive(Debug, Clone)]
pub struct CommandRecorder {
    viewport: Viewport,
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    /// Creates a recorder for the given viewport.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::with_capacity(1024),
        }
    }

    /// Resizes the target.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Recorded commands, in draw order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of circle commands (handy for counting drawn entities).
    #[must_use]
    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    /// Number of line commands.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }
}

impl Surface for CommandRecorder {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle { center, radius, color });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, width, color });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { bounds: rect, color });
    }
}

/// Shape selector read by the quad shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum QuadShape {
    /// Rectangle (also used for rotated line segments).
    Rect = 0,
    /// Circle inscribed in the quad.
    Circle = 1,
}

/// One instanced quad, laid out for GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct QuadInstance {
    /// Center (x, y).
    pub center: [f32; 2],
    /// Half width, half height.
    pub half_extent: [f32; 2],
    /// Rotation in radians.
    pub rotation: f32,
    /// [`QuadShape`] discriminant.
    pub shape: u32,
    /// Color (RGBA).
    pub color: [f32; 4],
}

impl QuadInstance {
    /// Size of an instance in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// Instanced-quad surface.
#[derive(Debug, Clone)]
pub struct QuadBatch {
    viewport: Viewport,
    instances: Vec<QuadInstance>,
}

impl QuadBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            instances: Vec::with_capacity(1024),
        }
    }

    /// Instances recorded this frame.
    #[must_use]
    pub fn instances(&self) -> &[QuadInstance] {
        &self.instances
    }

    /// Instance data as bytes for the vertex buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Surface for QuadBatch {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn clear(&mut self) {
        self.instances.clear();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.instances.push(QuadInstance {
            center: [center.x, center.y],
            half_extent: [radius, radius],
            rotation: 0.0,
            shape: QuadShape::Circle as u32,
            color: color.to_array(),
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        let delta = to - from;
        let mid = from + delta * 0.5;
        self.instances.push(QuadInstance {
            center: [mid.x, mid.y],
            half_extent: [delta.length() * 0.5, width * 0.5],
            rotation: delta.y.atan2(delta.x),
            shape: QuadShape::Rect as u32,
            color: color.to_array(),
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let center = rect.center();
        self.instances.push(QuadInstance {
            center: [center.x, center.y],
            half_extent: [rect.width * 0.5, rect.height * 0.5],
            rotation: 0.0,
            shape: QuadShape::Rect as u32,
            color: color.to_array(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_instance_layout() {
        // 10 x 4-byte fields, no padding
        assert_eq!(QuadInstance::SIZE, 40);
    }

    #[test]
    fn test_recorder_clear_resets_frame() {
        let mut recorder = CommandRecorder::new(Viewport::new(100.0, 100.0));
        recorder.fill_circle(Vec2::new(1.0, 1.0), 2.0, Color::WHITE);
        recorder.clear();
        recorder.stroke_line(Vec2::ZERO, Vec2::new(5.0, 0.0), 1.0, Color::WHITE);

        assert_eq!(recorder.commands().len(), 2);
        assert_eq!(recorder.commands()[0], DrawCommand::Clear);
        assert_eq!(recorder.line_count(), 1);
        assert_eq!(recorder.circle_count(), 0);
    }

    #[test]
    fn test_quad_batch_line_geometry() {
        let mut batch = QuadBatch::new(Viewport::new(100.0, 100.0));
        batch.stroke_line(Vec2::new(0.0, 0.0), Vec2::new(0.0, 10.0), 2.0, Color::WHITE);

        let quad = batch.instances()[0];
        assert_eq!(quad.center, [0.0, 5.0]);
        assert_eq!(quad.half_extent, [5.0, 1.0]);
        assert!((quad.rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(batch.as_bytes().len(), QuadInstance::SIZE);
    }
}
