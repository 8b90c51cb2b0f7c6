//! Starbound's asset tools and archive packaging.

use crate::errors::CliError;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::BufWriter;
use std::process::Command;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// An external program that is run to completion.
#[derive(Debug, Clone)]
pub struct Tool {
    path: Utf8PathBuf,
}

impl Tool {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Runs the tool with `args`, failing unless it exits successfully.
    /// `step` describes what the run is for, for error messages.
    pub fn run(&self, step: &str, args: &[&Utf8Path]) -> Result<(), CliError> {
        tracing::debug!("Running {} {:?}", self.path, args);

        let status = Command::new(&self.path)
            .args(args.iter().map(|a| a.as_std_path()))
            .status()
            .map_err(|source| CliError::ToolLaunchFailed {
                step: step.to_string(),
                tool: self.path.clone(),
                source,
            })?;

        if !status.success() {
            return Err(CliError::ToolFailed {
                step: step.to_string(),
                tool: self.path.clone(),
                status,
            });
        }
        Ok(())
    }
}

/// `asset_unpacker` and `asset_packer` from a Starbound installation.
#[derive(Debug, Clone)]
pub struct AssetTools {
    pub unpacker: Tool,
    pub packer: Tool,
}

impl AssetTools {
    pub fn from_bin_dir(bin_dir: &Utf8Path) -> Self {
        let exe = |name: &str| bin_dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX));
        Self {
            unpacker: Tool::new(exe("asset_unpacker")),
            packer: Tool::new(exe("asset_packer")),
        }
    }
}

/// Directory of the asset tools inside a Starbound installation.
pub fn default_bin_dir(game_dir: &Utf8Path) -> Utf8PathBuf {
    if cfg!(target_os = "macos") {
        game_dir.join("Starbound.app/Contents/MacOS")
    } else if cfg!(windows) {
        game_dir.join("win64")
    } else {
        game_dir.join("linux")
    }
}

/// Unpacks a `.pak` / `.modpak` archive into `dest`.
pub fn unpack(unpacker: &Tool, archive: &Utf8Path, dest: &Utf8Path) -> Result<(), CliError> {
    unpacker.run(&format!("unpacking {archive}"), &[archive, dest])
}

/// Packs the directory `dir` into the archive `dest`.
pub fn pack(packer: &Tool, dir: &Utf8Path, dest: &Utf8Path) -> Result<(), CliError> {
    packer.run(&format!("packing {dir}"), &[dir, dest])
}

/// Zips `dir` into `zip_path`, with the directory's name as the top-level folder.
pub fn zip_directory(dir: &Utf8Path, zip_path: &Utf8Path) -> Result<(), CliError> {
    let prefix = dir.file_name().unwrap_or_default();
    let zip_err = |source: zip::result::ZipError| CliError::ZipFailed {
        path: zip_path.to_path_buf(),
        source,
    };

    let file = File::create(zip_path).map_err(|e| CliError::io(zip_path, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| CliError::io(dir, e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative_path = path.strip_prefix(dir).unwrap_or(path);
        let zip_entry = format!(
            "{}/{}",
            prefix,
            relative_path.to_string_lossy().replace('\\', "/")
        );

        zip.start_file(zip_entry, options).map_err(zip_err)?;
        let mut file = File::open(path).map_err(|e| CliError::io(dir, e))?;
        std::io::copy(&mut file, &mut zip).map_err(|e| CliError::io(zip_path, e))?;
    }

    zip.finish().map_err(zip_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::tempdir;

    fn utf8_dir(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_zip_directory() {
        let dir = tempdir().unwrap();
        let root = utf8_dir(&dir);
        let container = root.join("soy_gravityless_plants");
        fs::create_dir_all(container.join("objects/soy")).unwrap();
        fs::write(container.join("pak.modinfo"), "{}").unwrap();
        fs::write(container.join("objects/soy/plant.object"), "{\"a\": 1}").unwrap();

        let zip_path = root.join("soy_gravityless_plants.zip");
        zip_directory(&container, &zip_path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            [
                "soy_gravityless_plants/objects/soy/plant.object",
                "soy_gravityless_plants/pak.modinfo",
            ]
        );

        let mut contents = String::new();
        archive
            .by_name("soy_gravityless_plants/objects/soy/plant.object")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "{\"a\": 1}");
    }

    #[test]
    fn test_missing_tool() {
        let dir = tempdir().unwrap();
        let tools = AssetTools::from_bin_dir(&utf8_dir(&dir));
        assert_eq!(tools.packer.path().parent(), Some(utf8_dir(&dir).as_path()));
        assert!(tools.unpacker.path().as_str().contains("asset_unpacker"));

        let err = unpack(
            &tools.unpacker,
            Utf8Path::new("packed.pak"),
            Utf8Path::new("out"),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::ToolLaunchFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_exit_status_is_checked() {
        assert!(Tool::new("true").run("testing", &[]).is_ok());
        assert!(matches!(
            Tool::new("false").run("testing", &[]),
            Err(CliError::ToolFailed { .. })
        ));
    }

    #[test]
    fn test_default_bin_dir() {
        let bin = default_bin_dir(Utf8Path::new("/games/Starbound"));
        assert!(bin.starts_with("/games/Starbound"));
        assert_ne!(bin.as_str(), "/games/Starbound");
    }
}
