//! Override mod assembly.
//!
//! The [`Generator`] turns a list of input mods into override containers:
//!
//! 1. Resolve the manifest of every input. Configuration errors (no manifest,
//!    several manifests) abort here, before anything is written.
//! 2. For each mod, clear its container directory and register the container's
//!    manifest.
//! 3. For each farmable plant, register the rotated frame descriptors and sprite
//!    sheets and the plant's override document.
//! 4. Write every registered file once, in the order it was first produced.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::paths;
use crate::rotate::{ImageRotator, RasterRotator};
use crate::scanner::{self, SourceMod};
use crate::sink::{self, OutputSet};
use crate::store::{ContentStore, StructuredId};
use crate::synth::{self, ImageReference};
use crate::transform;
use camino::{Utf8Path, Utf8PathBuf};
use zerog_modinfo::{GeneratorConfig, ModInfo, ModInfoMetadata};

/// One generated override container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerReport {
    /// Name of the override mod, e.g. `soy_gravityless_plants`.
    pub name: String,
    pub path: Utf8PathBuf,
    /// Name of the overridden mod, `None` for synthesized manifests.
    pub overrides: Option<String>,
    pub plants: usize,
}

/// Summary of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub containers: Vec<ContainerReport>,
    /// Distinct files produced across all containers.
    pub files: usize,
}

impl GenerationReport {
    pub fn plants(&self) -> usize {
        self.containers.iter().map(|c| c.plants).sum()
    }
}

/// Generates gravityless plant overrides for a set of mods.
///
/// A generator owns the [`ContentStore`] for the run, so files shared between
/// plants are generated and written once.
pub struct Generator {
    config: GeneratorConfig,
    output_dir: Utf8PathBuf,
    rotator: Box<dyn ImageRotator>,
    store: ContentStore,
    outputs: OutputSet,
}

impl Generator {
    pub fn new(config: GeneratorConfig, output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            config,
            output_dir: output_dir.into(),
            rotator: Box::new(RasterRotator),
            store: ContentStore::new(),
            outputs: OutputSet::new(),
        }
    }

    /// Replace the image backend.
    pub fn with_rotator(mut self, rotator: impl ImageRotator + 'static) -> Self {
        self.rotator = Box::new(rotator);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn outputs(&self) -> &OutputSet {
        &self.outputs
    }

    /// Resolve every input directory to a [`SourceMod`], failing on the first mod
    /// whose manifest cannot be determined.
    pub fn resolve_mods<P: AsRef<Utf8Path>>(&mut self, dirs: &[P]) -> Result<Vec<SourceMod>> {
        dirs.iter()
            .map(|dir| {
                let dir = paths::absolute(dir.as_ref())?;
                SourceMod::resolve(
                    &mut self.store,
                    &dir,
                    self.config.synthesize_missing_manifest,
                )
            })
            .collect()
    }

    /// Generate the override containers for `mods` in memory.
    ///
    /// Container directories are removed from disk up front; nothing is written
    /// until [`write`](Self::write).
    pub fn generate(&mut self, mods: &[SourceMod]) -> Result<GenerationReport> {
        let output_dir = paths::absolute(&self.output_dir)?;
        tracing::info!("Outputting all mods to {}", output_dir);

        let mut report = GenerationReport::default();
        for source in mods {
            let container = self.container_dir(&output_dir, source);
            clear_dir(&container)?;

            let overridden = (!source.synthesized).then_some(&source.info);
            let name = self.config.override_name(overridden);
            tracing::info!(
                "Generating {}/{} to override {}/{}",
                container.file_name().unwrap_or_default(),
                name,
                source.dir_name(),
                source.info.name
            );

            let manifest = self.generate_manifest(source, &container, &name)?;
            self.outputs.insert(manifest);

            let plants = scanner::find_plants(&mut self.store, source)?;
            for &plant in &plants {
                self.generate_plant(source, plant, &container)?;
            }

            report.containers.push(ContainerReport {
                name,
                path: container,
                overrides: overridden.map(|info| info.name.clone()),
                plants: plants.len(),
            });
        }

        report.files = self.outputs.len();
        tracing::info!("Generated {} files", report.files);
        Ok(report)
    }

    /// Write everything generated so far. Returns the number of files written.
    pub fn write(&self) -> Result<usize> {
        sink::write_outputs(&self.store, &self.outputs)
    }

    /// Resolve, generate and write in one go.
    pub fn run<P: AsRef<Utf8Path>>(&mut self, dirs: &[P]) -> Result<GenerationReport> {
        let mods = self.resolve_mods(dirs)?;
        let report = self.generate(&mods)?;
        self.write()?;
        Ok(report)
    }

    fn container_dir(&self, output_dir: &Utf8Path, source: &SourceMod) -> Utf8PathBuf {
        if source.synthesized {
            output_dir.join(&self.config.suffix)
        } else {
            output_dir.join(format!("{}_{}", source.dir_name(), self.config.suffix))
        }
    }

    fn generate_manifest(
        &mut self,
        source: &SourceMod,
        container: &Utf8Path,
        name: &str,
    ) -> Result<StructuredId> {
        let path = container.join(format!("{name}.modinfo"));
        let id = self.store.structured(&path, container)?;

        let description = if source.synthesized {
            self.config.description.clone()
        } else {
            format!("{} for {}", self.config.description, source.info.name)
        };
        let info = ModInfo {
            name: name.to_string(),
            version: Some(
                source
                    .info
                    .version
                    .clone()
                    .unwrap_or_else(|| self.config.default_game_version.clone()),
            ),
            dependencies: if source.synthesized {
                Vec::new()
            } else {
                vec![source.info.name.clone()]
            },
            path: Some(source.info.asset_path().to_string()),
            metadata: Some(ModInfoMetadata {
                version: Some(self.config.version.clone()),
                author: self.config.author.clone(),
                description: Some(description),
                support_url: self.config.support_url.clone(),
                ..Default::default()
            }),
            ..Default::default()
        };

        *self.store.document_mut(id) = Document::from_value(info.to_value()?);
        Ok(id)
    }

    fn generate_plant(
        &mut self,
        source: &SourceMod,
        plant: StructuredId,
        container: &Utf8Path,
    ) -> Result<()> {
        let plant_path = self.store.file(plant).path().to_path_buf();
        let reference = plant_image_reference(&self.store, plant)?;

        let image_path = if let Some(absolute) = reference.path.strip_prefix('/') {
            source.asset_root().join(absolute)
        } else {
            plant_path
                .parent()
                .unwrap_or(Utf8Path::new("/"))
                .join(&reference.path)
        };
        let image = self.store.binary(&image_path, &source.root)?;
        let frames = transform::find_frames(&mut self.store, image)?;

        let grid = transform::read_frame_grid(&self.store, frames)?;
        if !grid.is_tile_aligned() {
            tracing::warn!(
                "Frame size {:?} in {} is not a multiple of the tile size",
                grid.size,
                self.store.file(frames).path()
            );
        }
        let footprint = grid.footprint();

        let target = transform::target_dir(&self.store, image, container);
        let image_stem = self.store.file(image).name().to_string();
        let frame_overrides = transform::generate_frame_overrides(
            &mut self.store,
            frames,
            &image_stem,
            &target,
            container,
        )?;
        let image_overrides = transform::generate_image_overrides(
            &mut self.store,
            image,
            &target,
            container,
            &*self.rotator,
        )?;
        let plant_override = synth::generate_plant_override(
            &mut self.store,
            plant,
            container,
            &image_overrides,
            &reference,
            footprint,
            self.config.merge_mode,
        )?;

        tracing::debug!(
            "Plant {} uses {} ({}x{} tiles)",
            plant_path,
            image_path,
            footprint.width,
            footprint.height
        );

        self.outputs.extend(frame_overrides.iter().copied());
        self.outputs.extend(image_overrides.iter().copied());
        self.outputs.insert(plant_override);
        Ok(())
    }
}

/// The sprite sheet reference of a plant's first orientation, `dualImage` if
/// present, `image` otherwise.
fn plant_image_reference(store: &ContentStore, plant: StructuredId) -> Result<ImageReference> {
    let path = store.file(plant).path();
    let first = store
        .document(plant)
        .orientations()
        .and_then(|o| o.first())
        .ok_or_else(|| Error::missing_field(path, "orientations"))?;

    let raw = ["dualImage", "image"]
        .iter()
        .find_map(|key| first.get(*key).and_then(|v| v.as_str()))
        .ok_or_else(|| Error::missing_field(path, "dualImage"))?;

    ImageReference::parse(raw).ok_or_else(|| Error::InvalidImageReference {
        path: path.to_path_buf(),
        reference: raw.to_string(),
    })
}

fn clear_dir(dir: &Utf8Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {
            tracing::debug!("Removed existing container {}", dir);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(dir, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn write_plant(mod_dir: &Utf8Path, orientation: serde_json::Value) {
        fs::create_dir_all(mod_dir.join("objects/soy")).unwrap();
        fs::write(
            mod_dir.join("objects/soy/soy.object"),
            json!({ "objectType": "farmable", "orientations": [orientation] }).to_string(),
        )
        .unwrap();
    }

    #[test]
    fn test_image_reference_prefers_dual_image() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        write_plant(
            &root,
            json!({ "image": "other.png", "dualImage": "soy.png:<color>" }),
        );

        let mut store = ContentStore::new();
        let plant = store
            .structured(root.join("objects/soy/soy.object"), &root)
            .unwrap();
        let reference = plant_image_reference(&store, plant).unwrap();

        assert_eq!(reference.path, "soy.png");
        assert_eq!(reference.options.as_deref(), Some("<color>"));
    }

    #[test]
    fn test_image_reference_errors() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        write_plant(&root, json!({ "imagePosition": [0, 0] }));

        let mut store = ContentStore::new();
        let plant = store
            .structured(root.join("objects/soy/soy.object"), &root)
            .unwrap();

        assert!(matches!(
            plant_image_reference(&store, plant),
            Err(Error::MissingField { field, .. }) if field == "dualImage"
        ));

        store
            .document_mut(plant)
            .set("orientations", json!([{ "image": ":only-options" }]));
        assert!(matches!(
            plant_image_reference(&store, plant),
            Err(Error::InvalidImageReference { .. })
        ));
    }

    #[test]
    fn test_clear_dir_missing_is_ok() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        clear_dir(&root.join("missing")).unwrap();

        fs::create_dir_all(root.join("container/objects")).unwrap();
        fs::write(root.join("container/objects/stale.object"), "{}").unwrap();
        clear_dir(&root.join("container")).unwrap();
        assert!(!root.join("container").exists());
    }
}
