mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{rect_to_screen_px, ScreenRectPx, Viewport};
