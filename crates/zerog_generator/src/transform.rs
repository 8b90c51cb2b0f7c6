//! Rotated artifact generation.
//!
//! For a plant's sprite sheet and its frame descriptor, registers the three rotated
//! copies in the override container. Each copy lives at
//! `<container>/<image dir>/<image stem>-<direction>.<ext>` and is filled only while
//! it is still empty, so a sheet shared by several plants is rotated once, and a
//! derived file that already has content is left alone.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::geometry::{Direction, FrameGrid, Rotated};
use crate::paths;
use crate::rotate::ImageRotator;
use crate::store::{BinaryId, ContentStore, StructuredId};
use camino::{Utf8Path, Utf8PathBuf};

/// Frame descriptor the game falls back to when a sheet has no `<stem>.frames`.
pub const DEFAULT_FRAMES: &str = "default.frames";

/// Finds the frame descriptor paired with `image`: `<stem>.frames` next to it, or
/// `default.frames` in the same directory.
pub fn find_frames(store: &mut ContentStore, image: BinaryId) -> Result<StructuredId> {
    let file = store.file(image);
    let dir = file.path().parent().unwrap_or(Utf8Path::new("/")).to_path_buf();
    let root = file.root().to_path_buf();
    let paired = dir.join(format!("{}.frames", file.name()));

    let frames = store.structured(&paired, &root)?;
    if store.file(frames).exists() {
        return Ok(frames);
    }

    let fallback = store.structured(dir.join(DEFAULT_FRAMES), &root)?;
    if store.file(fallback).exists() {
        return Ok(fallback);
    }

    Err(Error::MissingAsset(paired))
}

/// Reads the `frameGrid` block of a frame descriptor.
pub fn read_frame_grid(store: &ContentStore, frames: StructuredId) -> Result<FrameGrid> {
    let path = store.file(frames).path();
    let value = store
        .document(frames)
        .frame_grid()
        .ok_or_else(|| Error::missing_field(path, "frameGrid"))?;

    serde_json::from_value(value.clone()).map_err(|e| Error::json(path, e))
}

/// Directory inside `override_root` that mirrors where `image` sits in its mod.
pub fn target_dir(store: &ContentStore, image: BinaryId, override_root: &Utf8Path) -> Utf8PathBuf {
    let relative = store.file(image).relative_path();
    match relative.parent() {
        Some(parent) => override_root.join(parent),
        None => override_root.to_path_buf(),
    }
}

fn derived_path(target_dir: &Utf8Path, stem: &str, direction: Direction, ext: &str) -> Utf8PathBuf {
    target_dir.join(format!("{}-{}.{}", stem, direction.suffix(), ext))
}

/// Registers the rotated frame descriptors, filling the ones that are still empty.
///
/// The descriptors are named after the image stem so the game pairs each rotated
/// sheet with its own descriptor, even when the source uses `default.frames`.
pub fn generate_frame_overrides(
    store: &mut ContentStore,
    frames: StructuredId,
    image_stem: &str,
    target_dir: &Utf8Path,
    override_root: &Utf8Path,
) -> Result<Rotated<StructuredId>> {
    let grid = read_frame_grid(store, frames)?;
    let aliases = store.document(frames).aliases().cloned();

    Rotated::try_from_fn(|direction| {
        let path = derived_path(target_dir, image_stem, direction, "frames");
        let id = store.structured(&path, override_root)?;
        if store.document(id).frame_grid().is_some() {
            return Ok(id);
        }

        let rotated = serde_json::to_value(grid.rotated(direction))
            .map_err(|e| Error::json(&path, e))?;
        let mut doc = Document::new();
        doc.set("frameGrid", rotated);
        if let Some(aliases) = &aliases {
            doc.set("aliases", aliases.clone());
        }
        *store.document_mut(id) = doc;

        tracing::debug!("Generated {}", path);
        Ok(id)
    })
}

/// Registers the rotated sprite sheets, rotating the ones that have no bytes yet.
pub fn generate_image_overrides(
    store: &mut ContentStore,
    image: BinaryId,
    target_dir: &Utf8Path,
    override_root: &Utf8Path,
    rotator: &dyn ImageRotator,
) -> Result<Rotated<BinaryId>> {
    let source = store.file(image);
    let source_path = source.path().to_path_buf();
    let stem = source.name().to_string();
    let ext = source.file_type().to_string();

    Rotated::try_from_fn(|direction| {
        let path = derived_path(target_dir, &stem, direction, &ext);
        let id = store.binary(&path, override_root)?;
        if store.bytes(id).is_some() {
            return Ok(id);
        }

        let bytes = store
            .bytes(image)
            .ok_or_else(|| Error::MissingAsset(source_path.clone()))?;
        let rotated = rotator
            .rotate(bytes, direction.rotation())
            .map_err(|source| Error::Image {
                path: source_path.clone(),
                source,
            })?;
        store.set_bytes(id, rotated);

        tracing::debug!(
            "Rotated {} by {} degrees into {}",
            source_path,
            direction.rotation().degrees(),
            path
        );
        Ok(id)
    })
}

/// Reference to `target` as written in a document at `document_path`.
pub fn asset_reference(document_path: &Utf8Path, target: &Utf8Path) -> String {
    let dir = document_path.parent().unwrap_or(Utf8Path::new("/"));
    paths::to_asset_string(&paths::relative_path(dir, target))
}
