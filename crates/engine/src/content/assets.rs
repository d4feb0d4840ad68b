use std::path::{Component, Path, PathBuf};

use image::ImageReader;

use crate::world::builder::{BuildWarning, WarningSink};
use crate::world::geometry::Size;

use super::definition::{DefSize, SpriteDef};

/// Visual footprint of one animation frame: the sheet is split horizontally
/// into `frames` equal cells, then scaled.
pub fn frame_size(image_width: u32, image_height: u32, frames: u32, scale: f32) -> Size {
    let frames = frames.max(1);
    Size::new(
        image_width as f32 / frames as f32 * scale,
        image_height as f32 * scale,
    )
}

pub fn probe_sprite_size(asset_root: &Path, sprite: &SpriteDef, scale: f32) -> Result<Size, String> {
    let path = resolve_asset_path(asset_root, &sprite.path)?;
    let (width, height) = ImageReader::open(&path)
        .map_err(|error| format!("file_open_failed:{error}"))?
        .with_guessed_format()
        .map_err(|error| format!("format_probe_failed:{error}"))?
        .into_dimensions()
        .map_err(|error| format!("decode_failed:{error}"))?;
    Ok(frame_size(width, height, sprite.frames, sprite.scale * scale))
}

/// Explicit size wins; otherwise the sprite is probed. A sprite that cannot be
/// read is reported and leaves the size unknown.
pub fn resolve_size(
    asset_root: &Path,
    owner_id: &str,
    explicit: Option<DefSize>,
    sprite: Option<&SpriteDef>,
    scale: f32,
    warnings: &mut dyn WarningSink,
) -> Option<Size> {
    if let Some(size) = explicit {
        return Some(Size::new(size.width * scale, size.height * scale));
    }
    let sprite = sprite?;
    match probe_sprite_size(asset_root, sprite, scale) {
        Ok(size) => Some(size),
        Err(reason) => {
            warnings.warn(BuildWarning::AssetUnavailable {
                id: owner_id.to_string(),
                path: sprite.path.clone(),
                reason,
            });
            None
        }
    }
}

fn resolve_asset_path(asset_root: &Path, relative: &str) -> Result<PathBuf, String> {
    let relative = Path::new(relative);
    let escapes = relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if relative.as_os_str().is_empty() || escapes {
        return Err(format!("invalid_path:{}", relative.display()));
    }
    Ok(asset_root.join(relative))
}

#[cfg(test)]
mod tests {
    use image::{ImageFormat, RgbaImage};
    use tempfile::TempDir;

    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        RgbaImage::new(width, height)
            .save_with_format(dir.join(name), ImageFormat::Png)
            .expect("write png");
    }

    fn sprite(path: &str, frames: u32, scale: f32) -> SpriteDef {
        SpriteDef {
            path: path.to_string(),
            frames,
            scale,
        }
    }

    #[test]
    fn frame_size_divides_width_by_frames() {
        assert_eq!(frame_size(192, 68, 4, 1.0), Size::new(48.0, 68.0));
        assert_eq!(frame_size(100, 50, 1, 2.0), Size::new(200.0, 100.0));
        assert_eq!(frame_size(100, 50, 0, 1.0), Size::new(100.0, 50.0));
    }

    #[test]
    fn probes_png_dimensions() {
        let temp = TempDir::new().expect("tempdir");
        write_png(temp.path(), "villager.png", 64, 16);

        let size = probe_sprite_size(temp.path(), &sprite("villager.png", 4, 1.0), 3.0)
            .expect("probe");
        assert_eq!(size, Size::new(48.0, 48.0));
    }

    #[test]
    fn explicit_size_wins_over_sprite() {
        let temp = TempDir::new().expect("tempdir");
        let mut warnings = Vec::new();
        let size = resolve_size(
            temp.path(),
            "npc",
            Some(DefSize {
                width: 10.0,
                height: 20.0,
            }),
            Some(&sprite("missing.png", 1, 1.0)),
            2.0,
            &mut warnings,
        );
        assert_eq!(size, Some(Size::new(20.0, 40.0)));
        assert!(warnings.is_empty());
    }

    #[test]
    fn unreadable_sprite_warns_and_leaves_size_unknown() {
        let temp = TempDir::new().expect("tempdir");
        let mut warnings = Vec::new();
        let size = resolve_size(
            temp.path(),
            "oldMan",
            None,
            Some(&sprite("missing.png", 4, 1.0)),
            1.0,
            &mut warnings,
        );
        assert_eq!(size, None);
        assert!(matches!(
            warnings.as_slice(),
            [BuildWarning::AssetUnavailable { id, .. }] if id == "oldMan"
        ));
    }

    #[test]
    fn paths_may_not_escape_the_asset_root() {
        let temp = TempDir::new().expect("tempdir");
        let err = probe_sprite_size(temp.path(), &sprite("../secret.png", 1, 1.0), 1.0)
            .expect_err("escape");
        assert!(err.starts_with("invalid_path:"));
    }
}
