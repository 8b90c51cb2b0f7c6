//! Override documents for farmable plants.
//!
//! A plant's override keeps the original upright orientation, now with explicit
//! spaces and foreground anchors, and adds one orientation per [`Direction`] that
//! points at the rotated sprite sheet. How the override is merged onto the original
//! definition depends on the [`MergeMode`].

use crate::document::Document;
use crate::error::{Error, Result};
use crate::geometry::{Direction, Footprint, Rotated, TILE_SIZE};
use crate::store::{BinaryId, ContentStore, StructuredId};
use crate::transform::asset_reference;
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{json, Map, Value};
use zerog_modinfo::MergeMode;

/// An orientation's `image` or `dualImage` value, `<path>:<options>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub path: String,
    /// Frame selector and directives after the first `:`, e.g. `<color>.<stage>`.
    pub options: Option<String>,
}

impl ImageReference {
    pub fn parse(reference: &str) -> Option<Self> {
        let (path, options) = match reference.split_once(':') {
            Some((path, options)) => (path, Some(options)),
            None => (reference, None),
        };
        if path.is_empty() {
            return None;
        }

        Some(Self {
            path: path.to_string(),
            options: options.filter(|o| !o.is_empty()).map(str::to_string),
        })
    }

    /// The reference with `path` swapped in, keeping the options.
    pub fn with_path(&self, path: &str) -> String {
        match &self.options {
            Some(options) => format!("{path}:{options}"),
            None => path.to_string(),
        }
    }
}

/// Where the override document for `plant` lives in the container.
pub fn override_path(
    store: &ContentStore,
    plant: StructuredId,
    override_root: &Utf8Path,
    mode: MergeMode,
) -> Utf8PathBuf {
    let path = override_root.join(store.file(plant).relative_path());
    match mode {
        MergeMode::JsonPatch => Utf8PathBuf::from(format!("{path}.patch")),
        MergeMode::Merge | MergeMode::Overwrite => path,
    }
}

/// Registers the override document for `plant` and fills it unless it already has
/// content.
pub fn generate_plant_override(
    store: &mut ContentStore,
    plant: StructuredId,
    override_root: &Utf8Path,
    images: &Rotated<BinaryId>,
    reference: &ImageReference,
    footprint: Footprint,
    mode: MergeMode,
) -> Result<StructuredId> {
    let path = override_path(store, plant, override_root, mode);
    let id = store.structured(&path, override_root)?;
    if !store.document(id).is_empty() {
        tracing::debug!("Keeping existing override {}", path);
        return Ok(id);
    }

    // References are resolved against the patched object, which sits next to the .patch file
    let object_path = override_root.join(store.file(plant).relative_path());
    let refs = images.map_ref(|&image| {
        reference.with_path(&asset_reference(&object_path, store.file(image).path()))
    });

    let plant_path = store.file(plant).path().to_path_buf();
    let first = store
        .document(plant)
        .orientations()
        .and_then(|o| o.first())
        .and_then(Value::as_object)
        .ok_or_else(|| Error::missing_field(&plant_path, "orientations"))?;
    let entries = orientation_entries(first, &refs, footprint);

    let doc = match mode {
        MergeMode::Merge => Document::from_value(json!({
            "__merge": [["overwrite", "orientations"]],
            "orientations": entries,
        })),
        MergeMode::JsonPatch => {
            let mut ops = vec![json!({
                "op": "replace",
                "path": "/orientations/0",
                "value": entries[0],
            })];
            ops.extend(entries[1..].iter().map(|entry| {
                json!({
                    "op": "add",
                    "path": "/orientations/-",
                    "value": entry,
                })
            }));
            Document::from_value(Value::Array(ops))
        }
        MergeMode::Overwrite => {
            tracing::warn!(
                "Overwrite mode replaces {} entirely; changes from other mods are lost",
                plant_path
            );
            let mut doc = store.document(plant).clone();
            doc.set("orientations", entries);
            doc
        }
    };

    *store.document_mut(id) = doc;
    Ok(id)
}

/// The upright orientation followed by downwards, leftwards and rightwards.
pub fn orientation_entries(
    first: &Map<String, Value>,
    refs: &Rotated<String>,
    footprint: Footprint,
) -> Vec<Value> {
    let Footprint { width, height } = footprint;
    let offset = (height.saturating_sub(1) * TILE_SIZE) as i64;
    let tiles = || (0..height as i64).flat_map(move |y| (0..width as i64).map(move |x| (x, y)));
    let columns = || 0..width as i64;

    let mut upright = first.clone();
    upright.insert(
        "spaces".to_string(),
        tiles().map(|(x, y)| json!([x, y])).collect(),
    );
    upright.shift_remove("anchors");
    upright.insert(
        "fgAnchors".to_string(),
        columns().map(|x| json!([x, -1])).collect(),
    );

    let placed = |direction: Direction| {
        let (image_key, position, spaces, anchors): (_, _, Vec<Value>, Vec<Value>) =
            match direction {
                Direction::Downwards => (
                    "dualImage",
                    [0, -offset],
                    tiles().map(|(x, y)| json!([x, -y])).collect(),
                    columns().map(|x| json!([x, 1])).collect(),
                ),
                Direction::Leftwards => (
                    "image",
                    [-offset, 0],
                    tiles().map(|(x, y)| json!([-y, x])).collect(),
                    columns().map(|x| json!([1, x])).collect(),
                ),
                Direction::Rightwards => (
                    "image",
                    [0, 0],
                    tiles().map(|(x, y)| json!([y, x])).collect(),
                    columns().map(|x| json!([-1, x])).collect(),
                ),
            };

        json!({
            image_key: refs.get(direction),
            "imagePosition": position,
            "frames": 1,
            "animationCycle": 0.5,
            "spaceScan": 0.1,
            "requireSoilAnchors": true,
            "requireTilledAnchors": false,
            "spaces": spaces,
            "fgAnchors": anchors,
        })
    };

    let mut entries = vec![Value::Object(upright)];
    entries.extend(Direction::ALL.map(placed));
    entries
}
