use crate::error::Result;
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use std::{
    fs,
    path::{Path, PathBuf},
};
use uuid::Uuid;

/// How imported covers are post-processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverOptions {
    /// Strip fully transparent border rows and columns
    pub trim: bool,
    /// Neither edge of a saved cover exceeds this many pixels
    pub max_size: u32,
}

impl Default for CoverOptions {
    fn default() -> Self {
        Self {
            trim: true,
            max_size: 256,
        }
    }
}

/// Best-effort import of an image into the covers folder.
///
/// Returns the path of the new PNG, or `None` if `source` is missing,
/// cannot be decoded, or the result cannot be written.
pub fn import_cover(
    source: &Path,
    covers_dir: &Path,
    options: CoverOptions,
) -> Option<PathBuf> {
    if !source.is_file() {
        tracing::debug!(path = %source.display(), "no cover source");
        return None;
    }

    match try_import(source, covers_dir, options) {
        Ok(path) => Some(path),
        Err(err) => {
            tracing::debug!(path = %source.display(), %err, "could not import cover");
            None
        }
    }
}

fn try_import(
    source: &Path,
    covers_dir: &Path,
    options: CoverOptions,
) -> Result<PathBuf> {
    let mut cover = image::open(source)?;

    if options.trim {
        cover = trim_transparent(cover);
    }
    cover = bound_size(cover, options.max_size);

    fs::create_dir_all(covers_dir)?;
    let target = covers_dir.join(format!("{}.png", Uuid::new_v4()));
    cover.save_with_format(&target, image::ImageFormat::Png)?;

    Ok(target)
}

/// Crop away border pixels that are fully transparent.
/// An image with no visible pixel is returned unchanged.
pub fn trim_transparent(cover: DynamicImage) -> DynamicImage {
    let rgba = cover.to_rgba8();
    let visible = rgba
        .enumerate_pixels()
        .filter(|(_, _, pixel)| pixel.0[3] != 0)
        .map(|(x, y, _)| (x, y));

    let bounds = visible.fold(None, |acc: Option<(u32, u32, u32, u32)>, (x, y)| {
        Some(match acc {
            None => (x, y, x, y),
            Some((left, top, right, bottom)) => {
                (left.min(x), top.min(y), right.max(x), bottom.max(y))
            }
        })
    });

    match bounds {
        Some((left, top, right, bottom)) => {
            let (width, height) = (right - left + 1, bottom - top + 1);
            if (width, height) == cover.dimensions() {
                cover
            } else {
                cover.crop_imm(left, top, width, height)
            }
        }
        None => cover,
    }
}

/// Shrink the image so neither edge exceeds `max_size`, keeping the aspect ratio
fn bound_size(cover: DynamicImage, max_size: u32) -> DynamicImage {
    let (width, height) = cover.dimensions();
    if max_size == 0 || (width <= max_size && height <= max_size) {
        cover
    } else {
        cover.resize(max_size, max_size, FilterType::Lanczos3)
    }
}

/// Delete a cover file, logging instead of failing
pub fn discard_cover(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed cover"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => tracing::warn!(
            path = %path.display(),
            %err,
            "failed to remove cover image"
        ),
    }
}
