use crate::world::geometry::Rect;

/// Size of the logical frame buffer. Positions in the world are already
/// screen-relative because the world scrolls around a fixed player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Half-open pixel span `[left, right) x [top, bottom)` inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRectPx {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRectPx {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Rounds `rect` to whole pixels. Returns `None` when nothing of it is on
/// screen; partially visible rects keep their unclipped edges so outlines
/// stay where they belong.
pub fn rect_to_screen_px(rect: &Rect, viewport: Viewport) -> Option<ScreenRectPx> {
    let left = rect.x.round() as i32;
    let top = rect.y.round() as i32;
    let right = rect.right().round() as i32;
    let bottom = rect.bottom().round() as i32;
    let visible = right > 0
        && bottom > 0
        && left < viewport.width as i32
        && top < viewport.height as i32
        && right > left
        && bottom > top;
    visible.then_some(ScreenRectPx {
        left,
        top,
        right,
        bottom,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800,
        height: 600,
    };

    #[test]
    fn rect_maps_to_rounded_pixels() {
        let px = rect_to_screen_px(&Rect::new(10.4, 19.6, 48.0, 68.0), VIEWPORT).expect("visible");
        assert_eq!(
            px,
            ScreenRectPx {
                left: 10,
                top: 20,
                right: 58,
                bottom: 88,
            }
        );
        assert_eq!(px.width(), 48);
        assert_eq!(px.height(), 68);
    }

    #[test]
    fn offscreen_rect_is_culled() {
        assert!(rect_to_screen_px(&Rect::new(-100.0, 0.0, 50.0, 50.0), VIEWPORT).is_none());
        assert!(rect_to_screen_px(&Rect::new(800.0, 10.0, 5.0, 5.0), VIEWPORT).is_none());
    }

    #[test]
    fn partially_visible_rect_keeps_edges() {
        let px = rect_to_screen_px(&Rect::new(-20.0, -20.0, 40.0, 40.0), VIEWPORT).expect("visible");
        assert_eq!(px.left, -20);
        assert_eq!(px.right, 20);
    }

    #[test]
    fn empty_rect_is_culled() {
        assert!(rect_to_screen_px(&Rect::new(10.0, 10.0, 0.0, 10.0), VIEWPORT).is_none());
    }
}
