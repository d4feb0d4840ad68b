use plaza_engine::{
    build_world, load_world_blueprint, resolve_app_paths, ContentError, LoopConfig, Scene,
    StartupError, TracingWarnings, World,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::town;

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Content(#[from] ContentError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) world: World,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Plaza Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        base_content_dir = %paths.base_content_dir.display(),
        world_file = %paths.world_file,
        "startup"
    );

    let mut warnings = TracingWarnings::default();
    let blueprint = load_world_blueprint(&paths.base_content_dir, &paths.world_file, &mut warnings)?;
    let viewport = blueprint.config.viewport;
    let world = build_world(blueprint, &mut warnings);
    if warnings.count() > 0 {
        info!(warnings = warnings.count(), "world_loaded_with_warnings");
    }

    let config = LoopConfig {
        window_width: viewport.width.max(1.0).round() as u32,
        window_height: viewport.height.max(1.0).round() as u32,
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        world,
        scene: town::build_town_scene(),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
