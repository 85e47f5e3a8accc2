use flyview_common::{ReticleConfig, Viewport};
use glam::Vec2;

/// A line segment in overlay pixel coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Vec2,
    pub to: Vec2,
}

/// Crosshair centered in the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reticle {
    pub horizontal: Segment,
    pub vertical: Segment,
    pub line_width: f32,
    pub color: [u8; 4],
}

impl Reticle {
    pub fn centered(overlay: Viewport, config: &ReticleConfig) -> Self {
        let (cx, cy) = overlay.center();
        let arm = config.arm_length;
        Self {
            horizontal: Segment {
                from: Vec2::new(cx - arm, cy),
                to: Vec2::new(cx + arm, cy),
            },
            vertical: Segment {
                from: Vec2::new(cx, cy - arm),
                to: Vec2::new(cx, cy + arm),
            },
            line_width: config.line_width,
            color: config.color,
        }
    }

    pub fn segments(&self) -> [Segment; 2] {
        [self.horizontal, self.vertical]
    }

    pub fn center(&self) -> Vec2 {
        (self.horizontal.from + self.horizontal.to) * 0.5
    }
}
