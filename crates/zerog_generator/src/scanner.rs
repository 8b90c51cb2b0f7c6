//! Mod discovery: manifests, definitions and farmable plants.

use crate::error::{Error, Result};
use crate::paths;
use crate::store::{ContentStore, StructuredId};
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;
use zerog_modinfo::ModInfo;

/// Type tag of object definitions.
pub const OBJECT_TYPE: &str = "object";

/// An input mod whose manifest has been resolved.
#[derive(Debug, Clone)]
pub struct SourceMod {
    /// The mod directory.
    pub root: Utf8PathBuf,
    /// The `.modinfo` entry; absent on disk when synthesized.
    pub manifest: StructuredId,
    pub info: ModInfo,
    /// `true` when the directory had no manifest and one was synthesized, which is
    /// how unpacked base game assets are handled.
    pub synthesized: bool,
}

impl SourceMod {
    /// Resolves the manifest of the mod at `dir`. See [`find_manifest`].
    pub fn resolve(store: &mut ContentStore, dir: &Utf8Path, synthesize: bool) -> Result<Self> {
        let root = paths::normalize(dir);
        let manifest = find_manifest(store, &root, synthesize)?;
        let file = store.file(manifest);
        let synthesized = !file.exists();

        let info = if synthesized {
            ModInfo::default()
        } else {
            ModInfo::from_value(store.document(manifest).value().clone())?
        };

        Ok(Self {
            root,
            manifest,
            info,
            synthesized,
        })
    }

    /// Directory the mod's assets live in, per the manifest's `path`.
    pub fn asset_root(&self) -> Utf8PathBuf {
        paths::normalize(&self.root.join(self.info.asset_path()))
    }

    /// Directory name of the mod, e.g. `soy` for `/mods/soy`.
    pub fn dir_name(&self) -> &str {
        self.root.file_name().unwrap_or_default()
    }
}

/// Finds the single `*.modinfo` directly inside `mod_dir`.
///
/// With no manifest present and `synthesize` set, registers an absent entry at
/// `<mod_dir>/<dir name>.modinfo` instead of failing.
pub fn find_manifest(
    store: &mut ContentStore,
    mod_dir: &Utf8Path,
    synthesize: bool,
) -> Result<StructuredId> {
    let pattern = format!("{}/*.modinfo", glob::Pattern::escape(mod_dir.as_str()));
    let mut found = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(|e| {
            let path = e.path().to_string_lossy().into_owned();
            Error::io(path, e.into_error())
        })?;
        found.push(paths::utf8(path)?);
    }

    match found.len() {
        1 => store.structured(&found[0], mod_dir),
        0 if synthesize => {
            let name = mod_dir.file_name().unwrap_or("assets");
            tracing::debug!("No manifest in {}, synthesizing one", mod_dir);
            store.structured(mod_dir.join(format!("{name}.modinfo")), mod_dir)
        }
        0 => Err(Error::MissingManifest(mod_dir.to_path_buf())),
        count => Err(Error::MultipleManifests {
            dir: mod_dir.to_path_buf(),
            count,
        }),
    }
}

/// Every JSON document under the mod's asset root, in file name order.
///
/// Files that do not parse as JSON (images, sounds, Lua) are skipped.
pub fn find_files(store: &mut ContentStore, source: &SourceMod) -> Result<Vec<StructuredId>> {
    let asset_root = source.asset_root();
    let mut files = Vec::new();

    for entry in WalkDir::new(&asset_root).sort_by_file_name() {
        let entry = entry.map_err(|source| Error::Walk {
            path: asset_root.clone(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = paths::utf8(entry.into_path())?;
        if let Some(id) = store.try_structured(&path, &source.root)? {
            files.push(id);
        }
    }

    Ok(files)
}

/// Object definitions of the mod.
pub fn find_objects(store: &mut ContentStore, source: &SourceMod) -> Result<Vec<StructuredId>> {
    let files = find_files(store, source)?;
    Ok(files
        .into_iter()
        .filter(|&id| store.file(id).file_type() == OBJECT_TYPE)
        .collect())
}

/// Object definitions with `objectType` `farmable`.
pub fn find_plants(store: &mut ContentStore, source: &SourceMod) -> Result<Vec<StructuredId>> {
    let objects = find_objects(store, source)?;
    Ok(objects
        .into_iter()
        .filter(|&id| store.document(id).is_farmable())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn mod_dir(dir: &tempfile::TempDir, name: &str) -> Utf8PathBuf {
        let root = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn test_single_manifest() {
        let dir = tempdir().unwrap();
        let root = mod_dir(&dir, "soy");
        fs::write(
            root.join("soy.modinfo"),
            r#"{"name": "soy", "version": "1.4.4", "path": "."}"#,
        )
        .unwrap();

        let mut store = ContentStore::new();
        let source = SourceMod::resolve(&mut store, &root, false).unwrap();

        assert!(!source.synthesized);
        assert_eq!(source.info.name, "soy");
        assert_eq!(source.dir_name(), "soy");
        assert_eq!(store.file(source.manifest).name(), "soy");
    }

    #[test]
    fn test_multiple_manifests() {
        let dir = tempdir().unwrap();
        let root = mod_dir(&dir, "soy");
        fs::write(root.join("a.modinfo"), "{}").unwrap();
        fs::write(root.join("b.modinfo"), "{}").unwrap();

        let mut store = ContentStore::new();
        let err = find_manifest(&mut store, &root, true).unwrap_err();

        assert!(matches!(err, Error::MultipleManifests { count: 2, .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempdir().unwrap();
        let root = mod_dir(&dir, "soy");

        let mut store = ContentStore::new();
        let err = find_manifest(&mut store, &root, false).unwrap_err();
        assert!(matches!(err, Error::MissingManifest(_)));
    }

    #[test]
    fn test_synthesized_manifest() {
        let dir = tempdir().unwrap();
        let root = mod_dir(&dir, "default_assets");

        let mut store = ContentStore::new();
        let source = SourceMod::resolve(&mut store, &root, true).unwrap();
        let manifest = store.file(source.manifest);

        assert!(source.synthesized);
        assert!(!manifest.exists());
        assert_eq!(manifest.path().file_name(), Some("default_assets.modinfo"));
        assert_eq!(source.info, ModInfo::default());
    }

    #[test]
    fn test_manifest_in_subdirectory_is_ignored() {
        let dir = tempdir().unwrap();
        let root = mod_dir(&dir, "soy");
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("nested/soy.modinfo"), "{}").unwrap();

        let mut store = ContentStore::new();
        assert!(matches!(
            find_manifest(&mut store, &root, false),
            Err(Error::MissingManifest(_))
        ));
    }

    #[test]
    fn test_find_plants_filters_by_type_and_object_type() {
        let dir = tempdir().unwrap();
        let root = mod_dir(&dir, "soy");
        fs::write(root.join("soy.modinfo"), r#"{"name": "soy"}"#).unwrap();
        fs::create_dir_all(root.join("objects/soy")).unwrap();
        fs::create_dir_all(root.join("objects/lamp")).unwrap();
        fs::write(
            root.join("objects/soy/soy.object"),
            r#"{"objectName": "soyseed", "objectType": "farmable"}"#,
        )
        .unwrap();
        fs::write(root.join("objects/soy/soy.png"), [0x89, b'P', b'N', b'G', 0xff]).unwrap();
        fs::write(root.join("objects/soy/broken.object"), "{ nope").unwrap();
        fs::write(
            root.join("objects/lamp/lamp.object"),
            r#"{"objectName": "lamp", "objectType": "light"}"#,
        )
        .unwrap();
        fs::write(
            root.join("objects/soy/soy.frames"),
            r#"{"objectType": "farmable"}"#,
        )
        .unwrap();

        let mut store = ContentStore::new();
        let source = SourceMod::resolve(&mut store, &root, false).unwrap();

        let files = find_files(&mut store, &source).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|&id| store.file(id).relative_path().as_str().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "objects/lamp/lamp.object",
                "objects/soy/soy.frames",
                "objects/soy/soy.object",
                "soy.modinfo",
            ]
        );

        let objects = find_objects(&mut store, &source).unwrap();
        assert_eq!(objects.len(), 2);

        let plants = find_plants(&mut store, &source).unwrap();
        assert_eq!(plants.len(), 1);
        assert_eq!(store.file(plants[0]).name(), "soy");
    }

    #[test]
    fn test_asset_root_follows_manifest_path() {
        let dir = tempdir().unwrap();
        let root = mod_dir(&dir, "soy");
        fs::write(
            root.join("soy.modinfo"),
            r#"{"name": "soy", "path": "assets"}"#,
        )
        .unwrap();
        fs::create_dir_all(root.join("assets/objects")).unwrap();
        fs::create_dir_all(root.join("unused")).unwrap();
        fs::write(
            root.join("assets/objects/soy.object"),
            r#"{"objectType": "farmable"}"#,
        )
        .unwrap();
        fs::write(
            root.join("unused/other.object"),
            r#"{"objectType": "farmable"}"#,
        )
        .unwrap();

        let mut store = ContentStore::new();
        let source = SourceMod::resolve(&mut store, &root, false).unwrap();
        let plants = find_plants(&mut store, &source).unwrap();

        assert_eq!(plants.len(), 1);
        assert_eq!(
            store.file(plants[0]).relative_path().as_str(),
            "assets/objects/soy.object"
        );
    }
}
