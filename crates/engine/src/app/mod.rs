mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{rect_to_screen_px, Renderer, ScreenRectPx, Viewport};
pub use scene::{InputSnapshot, Scene, SceneCommand};
