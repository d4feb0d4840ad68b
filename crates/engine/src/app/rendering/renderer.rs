use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::world::interaction::{EntityKind, RegisteredEntity};
use crate::world::player::Direction;
use crate::world::World;

use super::transform::{rect_to_screen_px, ScreenRectPx, Viewport};

const CLEAR_COLOR: [u8; 4] = [58, 92, 54, 255];
const SCENERY_OUTLINE_COLOR: [u8; 4] = [88, 124, 80, 255];
const OBSTACLE_COLOR: [u8; 4] = [96, 88, 80, 255];
const NPC_COLOR: [u8; 4] = [214, 168, 96, 255];
const BUILDING_COLOR: [u8; 4] = [150, 110, 170, 255];
const UNSIZED_MARKER_COLOR: [u8; 4] = [200, 200, 200, 255];
const INDICATOR_COLOR: [u8; 4] = [255, 226, 90, 255];
const ACTIVE_ZONE_COLOR: [u8; 4] = [120, 230, 140, 255];
const TARGET_COLOR: [u8; 4] = [255, 255, 255, 255];
const PLAYER_COLOR: [u8; 4] = [70, 130, 230, 255];
const PLAYER_CONVERSING_COLOR: [u8; 4] = [255, 120, 120, 255];
const FACING_MARK_COLOR: [u8; 4] = [20, 30, 60, 255];
const UNSIZED_MARKER_HALF_SIZE_PX: i32 = 3;
const FACING_MARK_SIZE_PX: i32 = 4;

/// Draws the world as flat coloured rectangles into a frame the size of the
/// world viewport; `pixels` scales it to the window surface.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>, viewport: Viewport) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), viewport, size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), self.viewport, width, height)?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        viewport: Viewport,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(viewport.width, viewport.height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &World) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        draw_world(self.pixels.frame_mut(), self.viewport, world);
        self.pixels.render()
    }
}

pub(crate) fn draw_world(frame: &mut [u8], viewport: Viewport, world: &World) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&CLEAR_COLOR);
    }

    for layer in world.scenery() {
        if let Some(px) = rect_to_screen_px(&layer.rect, viewport) {
            draw_rect_outline(frame, viewport, px, SCENERY_OUTLINE_COLOR);
        }
    }

    for obstacle in world.obstacles().obstacles() {
        if let Some(px) = rect_to_screen_px(&obstacle.rect, viewport) {
            fill_rect(frame, viewport, px, OBSTACLE_COLOR);
        }
    }

    let target = world.player().target();
    for entry in world.entities().all() {
        draw_entity(frame, viewport, entry, Some(entry.handle()) == target);
    }

    let player = world.player();
    let player_color = if player.is_conversing() {
        PLAYER_CONVERSING_COLOR
    } else {
        PLAYER_COLOR
    };
    if let Some(px) = rect_to_screen_px(&player.rect(), viewport) {
        fill_rect(frame, viewport, px, player_color);
        draw_facing_mark(frame, viewport, px, player.facing());
    }
}

fn draw_entity(frame: &mut [u8], viewport: Viewport, entry: &RegisteredEntity, is_target: bool) {
    let entity = entry.entity();
    let Some(rect) = entity.rect() else {
        let x = entity.position.x.round() as i32;
        let y = entity.position.y.round() as i32;
        let half = UNSIZED_MARKER_HALF_SIZE_PX;
        let marker = ScreenRectPx {
            left: x - half,
            top: y - half,
            right: x + half + 1,
            bottom: y + half + 1,
        };
        fill_rect(frame, viewport, marker, UNSIZED_MARKER_COLOR);
        return;
    };

    let state = entry.state();
    if state.is_active {
        if let Some(zone_px) = entry
            .zone()
            .and_then(|zone| rect_to_screen_px(&zone, viewport))
        {
            draw_rect_outline(frame, viewport, zone_px, ACTIVE_ZONE_COLOR);
        }
    }

    let Some(px) = rect_to_screen_px(&rect, viewport) else {
        return;
    };
    let color = match entry.kind() {
        EntityKind::Npc => NPC_COLOR,
        EntityKind::Building => BUILDING_COLOR,
    };
    fill_rect(frame, viewport, px, color);
    if state.show_indicator {
        draw_rect_outline(frame, viewport, px, INDICATOR_COLOR);
    }
    if is_target {
        let ring = ScreenRectPx {
            left: px.left - 2,
            top: px.top - 2,
            right: px.right + 2,
            bottom: px.bottom + 2,
        };
        draw_rect_outline(frame, viewport, ring, TARGET_COLOR);
    }
}

fn draw_facing_mark(
    frame: &mut [u8],
    viewport: Viewport,
    player: ScreenRectPx,
    facing: Direction,
) {
    let mid_x = (player.left + player.right) / 2;
    let mid_y = (player.top + player.bottom) / 2;
    let size = FACING_MARK_SIZE_PX;
    let (x, y) = match facing {
        Direction::Up => (mid_x - size / 2, player.top),
        Direction::Down => (mid_x - size / 2, player.bottom - size),
        Direction::Left => (player.left, mid_y - size / 2),
        Direction::Right => (player.right - size, mid_y - size / 2),
    };
    let mark = ScreenRectPx {
        left: x,
        top: y,
        right: x + size,
        bottom: y + size,
    };
    fill_rect(frame, viewport, mark, FACING_MARK_COLOR);
}

fn fill_rect(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    let left = rect.left.max(0);
    let top = rect.top.max(0);
    let right = rect.right.min(viewport.width as i32);
    let bottom = rect.bottom.min(viewport.height as i32);
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(frame, viewport.width as usize, x, y, color);
        }
    }
}

fn draw_rect_outline(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    let width = viewport.width as usize;
    let last_x = rect.right - 1;
    let last_y = rect.bottom - 1;
    for x in rect.left..rect.right {
        if x >= 0 && x < viewport.width as i32 {
            write_pixel_rgba_clipped(frame, width, x, rect.top, color);
            write_pixel_rgba_clipped(frame, width, x, last_y, color);
        }
    }
    for y in rect.top..rect.bottom {
        if y >= 0 && y < viewport.height as i32 {
            write_pixel_rgba_clipped(frame, width, rect.left, y, color);
            write_pixel_rgba_clipped(frame, width, last_x, y, color);
        }
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
