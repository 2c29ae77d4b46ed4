// Viewport - the affine pan/zoom transform between world and screen.

use eframe::egui::{Pos2, Vec2};

/// Multiplicative step applied per wheel notch.
pub const ZOOM_STEP: f32 = 1.1;
/// Scale bounds. The transform itself works at any positive scale, but
/// unbounded zoom degenerates numerically long before it is usable.
pub const MIN_SCALE: f32 = 0.05;
pub const MAX_SCALE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// World-to-screen transform: `screen = world * scale + offset`.
///
/// Single instance per session, mutated by pan and zoom gestures and
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub offset: Vec2,
    pub scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn world_to_screen(&self, p: Pos2) -> Pos2 {
        (p.to_vec2() * self.scale + self.offset).to_pos2()
    }

    pub fn screen_to_world(&self, p: Pos2) -> Pos2 {
        ((p.to_vec2() - self.offset) / self.scale).to_pos2()
    }

    /// Unconstrained translation by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Step the scale and compensate the offset so the world point
    /// under `anchor` stays visually stationary.
    pub fn zoom_at(&mut self, anchor: Pos2, direction: ZoomDirection) {
        let world = self.screen_to_world(anchor);
        let stepped = match direction {
            ZoomDirection::In => self.scale * ZOOM_STEP,
            ZoomDirection::Out => self.scale / ZOOM_STEP,
        };
        self.scale = stepped.clamp(MIN_SCALE, MAX_SCALE);
        self.offset = anchor.to_vec2() - world.to_vec2() * self.scale;
    }
}
