//! Scene composition
//!
//! Paints the session back-to-front into the off-screen frame. Reads the
//! session through shared references only.

use glam::Vec2;

use super::font::{draw_text_centered, text_height};
use super::frame::{FrameBuffer, Rgba};
use super::{PresentError, Surface};
use crate::sim::{GamePhase, GameState, ObstacleSlot};

/// Colors for game elements
pub mod colors {
    use super::Rgba;

    pub const SKY: Rgba = [0x4e, 0xc0, 0xca, 255];
    pub const CLOUD: Rgba = [0xe8, 0xf6, 0xf4, 255];
    pub const GROUND: Rgba = [0xde, 0xd8, 0x95, 255];
    pub const GROUND_STRIPE: Rgba = [0xc9, 0xc2, 0x7a, 255];
    pub const GRASS: Rgba = [0x73, 0xbf, 0x2e, 255];
    pub const PIPE: Rgba = [0x55, 0x80, 0x22, 255];
    pub const PIPE_SHADE: Rgba = [0x3f, 0x62, 0x18, 255];
    pub const PIPE_LIP: Rgba = [0x6c, 0xa0, 0x2d, 255];
    pub const AVATAR_BODY: Rgba = [0xf8, 0xc0, 0x28, 255];
    pub const AVATAR_WING: Rgba = [0xf4, 0xe4, 0x9c, 255];
    pub const AVATAR_BEAK: Rgba = [0xf0, 0x6a, 0x30, 255];
    pub const EYE_WHITE: Rgba = [255, 255, 255, 255];
    pub const EYE_PUPIL: Rgba = [0x20, 0x20, 0x20, 255];
    pub const TEXT: Rgba = [255, 255, 255, 255];
    pub const TEXT_SHADOW: Rgba = [0x30, 0x30, 0x30, 255];
    pub const OVERLAY: Rgba = [0, 0, 0, 255];
}

/// Opacity of the game-over dimming layer
const OVERLAY_ALPHA: f32 = 0.45;
/// Cap drawn at each gap edge
const LIP_HEIGHT: f32 = 12.0;
const LIP_OVERHANG: f32 = 3.0;
const STRIPE_WIDTH: f32 = 24.0;

/// Composes frames for one playfield size
pub struct Renderer {
    frame: FrameBuffer,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: FrameBuffer::new(width, height),
        }
    }

    /// The most recently composed frame
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Compose and publish in one paint
    pub fn paint(
        &mut self,
        state: &GameState,
        best: Option<u32>,
        surface: &mut dyn Surface,
    ) -> Result<(), PresentError> {
        self.compose(state, best);
        self.publish(surface)
    }

    /// Step one: draw everything into the off-screen frame
    pub fn compose(&mut self, state: &GameState, best: Option<u32>) {
        self.paint_background(state);
        match state.phase() {
            GamePhase::Ready => self.paint_welcome(state),
            GamePhase::Playing | GamePhase::Over => {
                for slot in state.obstacles().slots() {
                    self.paint_slot(slot, state.config().floor_y());
                }
                let avatar = state.avatar();
                self.paint_avatar(avatar.pos, avatar.half_extents, avatar.pose);
            }
        }
        self.paint_ground(state);

        match state.phase() {
            GamePhase::Ready => {}
            GamePhase::Playing => self.paint_score(state.score()),
            GamePhase::Over => self.paint_game_over(state.score(), best),
        }
    }

    /// Step two: hand the finished frame to the surface in one call
    pub fn publish(&self, surface: &mut dyn Surface) -> Result<(), PresentError> {
        surface.present(&self.frame)
    }

    fn paint_background(&mut self, state: &GameState) {
        self.frame.clear(colors::SKY);

        // Clouds drift slowly with the tick counter
        let width = self.frame.width() as f32;
        let drift = (state.time_ticks() as f32 * 0.2) % (width + 120.0);
        for (i, (x, y, r)) in [(60.0, 90.0, 34.0), (260.0, 150.0, 26.0), (400.0, 60.0, 30.0)]
            .into_iter()
            .enumerate()
        {
            let cx = (x - drift * (1.0 + i as f32 * 0.25)).rem_euclid(width + 120.0) - 60.0;
            self.frame
                .fill_ellipse(Vec2::new(cx, y), Vec2::new(r * 1.8, r), colors::CLOUD);
            self.frame.fill_ellipse(
                Vec2::new(cx + r, y - r * 0.4),
                Vec2::new(r * 1.2, r * 0.8),
                colors::CLOUD,
            );
        }
    }

    fn paint_ground(&mut self, state: &GameState) {
        let config = state.config();
        let floor = config.floor_y();
        let width = self.frame.width() as f32;
        let height = self.frame.height() as f32;

        self.frame.fill_rect(0.0, floor, width, height, colors::GROUND);
        self.frame.fill_rect(0.0, floor, width, floor + 6.0, colors::GRASS);

        // Stripes scroll with the obstacles and freeze with them
        let scrolled = state.time_ticks() as f32 * config.scroll_speed * config.dt();
        let offset = scrolled % (STRIPE_WIDTH * 2.0);
        let mut x = -offset;
        while x < width {
            self.frame
                .fill_rect(x, floor + 6.0, x + STRIPE_WIDTH, floor + 16.0, colors::GROUND_STRIPE);
            x += STRIPE_WIDTH * 2.0;
        }
    }

    fn paint_slot(&mut self, slot: &ObstacleSlot, floor_y: f32) {
        let (x0, x1) = (slot.x, slot.right());
        let (top, bottom) = (slot.gap_top(), slot.gap_bottom());

        self.frame.fill_rect(x0, 0.0, x1, top, colors::PIPE);
        self.frame.fill_rect(x0, bottom, x1, floor_y, colors::PIPE);
        self.frame.fill_rect(x1 - 8.0, 0.0, x1, top, colors::PIPE_SHADE);
        self.frame.fill_rect(x1 - 8.0, bottom, x1, floor_y, colors::PIPE_SHADE);

        let (lx0, lx1) = (x0 - LIP_OVERHANG, x1 + LIP_OVERHANG);
        self.frame.fill_rect(lx0, top - LIP_HEIGHT, lx1, top, colors::PIPE_LIP);
        self.frame.fill_rect(lx0, bottom, lx1, bottom + LIP_HEIGHT, colors::PIPE_LIP);
    }

    fn paint_avatar(&mut self, pos: Vec2, half: Vec2, pose: u8) {
        self.frame.fill_ellipse(pos, half, colors::AVATAR_BODY);

        let beak = Vec2::new(pos.x + half.x * 0.75, pos.y + half.y * 0.25);
        self.frame.fill_rect(
            beak.x,
            beak.y - 3.0,
            beak.x + half.x * 0.6,
            beak.y + 3.0,
            colors::AVATAR_BEAK,
        );

        let eye = Vec2::new(pos.x + half.x * 0.4, pos.y - half.y * 0.35);
        self.frame
            .fill_ellipse(eye, Vec2::splat(half.y * 0.42), colors::EYE_WHITE);
        self.frame.fill_ellipse(
            eye + Vec2::new(1.5, 0.0),
            Vec2::splat(half.y * 0.18),
            colors::EYE_PUPIL,
        );

        // Wing: middle, up, down
        let lift = match pose {
            1 => -half.y * 0.45,
            2 => half.y * 0.45,
            _ => 0.0,
        };
        let wing = Vec2::new(pos.x - half.x * 0.4, pos.y + half.y * 0.2 + lift);
        self.frame.fill_ellipse(
            wing,
            Vec2::new(half.x * 0.45, half.y * 0.4),
            colors::AVATAR_WING,
        );
    }

    fn paint_welcome(&mut self, state: &GameState) {
        let avatar = state.avatar();
        let bob = (state.time_ticks() as f32 * 0.12).sin() * 6.0;
        let pose = ((state.time_ticks() / 8) % 3) as u8;
        self.paint_avatar(avatar.pos + Vec2::new(0.0, bob), avatar.half_extents, pose);

        let width = self.frame.width() as f32;
        let height = self.frame.height() as f32;
        self.shadowed_text("READY", width / 2.0, height * 0.42, 8);
        self.shadowed_text("TAP", width / 2.0, height * 0.42 + 70.0, 4);
    }

    fn paint_score(&mut self, score: u32) {
        let width = self.frame.width() as f32;
        self.shadowed_text(&score.to_string(), width / 2.0, 24.0, 5);
    }

    fn paint_game_over(&mut self, score: u32, best: Option<u32>) {
        let width = self.frame.width() as f32;
        let height = self.frame.height() as f32;
        self.frame
            .blend_rect(0.0, 0.0, width, height, colors::OVERLAY, OVERLAY_ALPHA);

        let mut y = height * 0.3;
        self.shadowed_text("GAME OVER", width / 2.0, y, 6);
        y += text_height(6) as f32 + 30.0;
        self.shadowed_text(&score.to_string(), width / 2.0, y, 8);
        if let Some(best) = best {
            y += text_height(8) as f32 + 24.0;
            self.shadowed_text(&format!("BEST {}", best), width / 2.0, y, 3);
        }
    }

    fn shadowed_text(&mut self, text: &str, center_x: f32, top: f32, scale: u32) {
        let offset = scale.max(2) as f32 / 2.0;
        draw_text_centered(
            &mut self.frame,
            text,
            center_x + offset,
            top + offset,
            scale,
            colors::TEXT_SHADOW,
        );
        draw_text_centered(&mut self.frame, text, center_x, top, scale, colors::TEXT);
    }
}
