//! Generator configuration resolution.

use crate::errors::CliError;
use crate::utils::{validate_suffix, validate_version_format};
use camino::{Utf8Path, Utf8PathBuf};
use zerog_modinfo::{GeneratorConfig, MergeMode};

/// Base name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_STEM: &str = "zerog.config";

/// Settings given on the command line, applied over the configuration file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub merge_mode: Option<MergeMode>,
    pub synthesize_manifest: bool,
}

/// Picks the configuration file: `explicit` if given (it must exist), otherwise
/// `zerog.config.json` or `zerog.config.toml` in `dir`, in that order.
pub fn resolve_config_path(
    explicit: Option<&Utf8Path>,
    dir: &Utf8Path,
) -> Result<Option<Utf8PathBuf>, CliError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(CliError::config_not_found(path.to_path_buf()));
        }
        return Ok(Some(path.to_path_buf()));
    }

    Ok(["json", "toml"]
        .iter()
        .map(|ext| dir.join(format!("{CONFIG_FILE_STEM}.{ext}")))
        .find(|path| path.is_file()))
}

/// Loads the configuration from `path`, or the defaults without one.
pub fn load_config(path: Option<&Utf8Path>) -> Result<GeneratorConfig, CliError> {
    let Some(path) = path else {
        tracing::debug!("No configuration file, using defaults");
        return Ok(GeneratorConfig::default());
    };

    tracing::debug!("Loading configuration from {}", path);
    GeneratorConfig::load(path.as_std_path()).map_err(|source| CliError::ConfigParseError {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves, loads, overrides and validates the configuration.
pub fn resolve_config(
    explicit: Option<&Utf8Path>,
    dir: &Utf8Path,
    overrides: &ConfigOverrides,
) -> Result<GeneratorConfig, CliError> {
    let path = resolve_config_path(explicit, dir)?;
    let mut config = load_config(path.as_deref())?;

    if let Some(mode) = overrides.merge_mode {
        config.merge_mode = mode;
    }
    if overrides.synthesize_manifest {
        config.synthesize_missing_manifest = true;
    }

    validate_suffix(&config.suffix)?;
    validate_version_format(&config.version)?;
    Ok(config)
}

/// The current working directory as a UTF-8 path.
pub fn current_dir() -> Result<Utf8PathBuf, CliError> {
    let cwd = std::env::current_dir().map_err(|e| CliError::io(".", e))?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|path| {
        CliError::io(
            path.to_string_lossy().into_owned(),
            std::io::Error::new(std::io::ErrorKind::InvalidData, "path is not UTF-8"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn utf8_dir(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempdir().unwrap();
        let config = resolve_config(None, &utf8_dir(&dir), &ConfigOverrides::default()).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_json_preferred_over_toml() {
        let dir = tempdir().unwrap();
        let root = utf8_dir(&dir);
        fs::write(root.join("zerog.config.toml"), "suffix = \"from_toml\"").unwrap();
        fs::write(root.join("zerog.config.json"), r#"{"suffix": "from_json"}"#).unwrap();

        assert_eq!(
            resolve_config_path(None, &root).unwrap(),
            Some(root.join("zerog.config.json"))
        );
        let config = resolve_config(None, &root, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.suffix, "from_json");
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempdir().unwrap();
        let root = utf8_dir(&dir);
        fs::write(
            root.join("zerog.config.toml"),
            "merge_mode = \"overwrite\"\nsynthesize_missing_manifest = false\n",
        )
        .unwrap();

        let overrides = ConfigOverrides {
            merge_mode: Some(MergeMode::JsonPatch),
            synthesize_manifest: true,
        };
        let config = resolve_config(None, &root, &overrides).unwrap();

        assert_eq!(config.merge_mode, MergeMode::JsonPatch);
        assert!(config.synthesize_missing_manifest);
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempdir().unwrap();
        let root = utf8_dir(&dir);
        let missing = root.join("custom.toml");

        assert!(matches!(
            resolve_config(Some(missing.as_path()), &root, &ConfigOverrides::default()),
            Err(CliError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempdir().unwrap();
        let root = utf8_dir(&dir);
        fs::write(root.join("zerog.config.json"), r#"{"suffix": "no spaces"}"#).unwrap();
        assert!(matches!(
            resolve_config(None, &root, &ConfigOverrides::default()),
            Err(CliError::InvalidSuffix { .. })
        ));

        fs::write(root.join("zerog.config.json"), r#"{"version": "one"}"#).unwrap();
        assert!(matches!(
            resolve_config(None, &root, &ConfigOverrides::default()),
            Err(CliError::InvalidVersion { .. })
        ));

        fs::write(root.join("zerog.config.json"), r#"{"merge_mode": "sideways"}"#).unwrap();
        assert!(matches!(
            resolve_config(None, &root, &ConfigOverrides::default()),
            Err(CliError::ConfigParseError { .. })
        ));
    }
}
