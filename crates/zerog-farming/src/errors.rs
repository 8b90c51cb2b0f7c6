use camino::Utf8PathBuf;
use miette::{Diagnostic, SourceSpan};
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(config::not_found),
        help("Pass an existing file to --config, or remove the flag to use zerog.config.json / zerog.config.toml from the current directory")
    )]
    ConfigNotFound { path: Utf8PathBuf },

    #[error("Configuration file error: {path}")]
    #[diagnostic(
        code(config::parse_error),
        help("Check your zerog.config.json or zerog.config.toml file for syntax errors")
    )]
    ConfigParseError {
        path: Utf8PathBuf,
        #[source]
        source: zerog_modinfo::Error,
    },

    #[error("Invalid suffix: {suffix}")]
    #[diagnostic(
        code(config::invalid_suffix),
        help("The suffix becomes part of mod and directory names, so it may only contain letters, digits, '_' and '-'")
    )]
    InvalidSuffix {
        suffix: String,
        #[label("invalid suffix")]
        span: Option<SourceSpan>,
    },

    #[error("Invalid version format: {version}")]
    #[diagnostic(
        code(config::invalid_version),
        help("Version must follow semantic versioning (e.g., 1.0.0, 2.1.3-beta)")
    )]
    InvalidVersion {
        version: String,
        #[label("invalid version")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot read packed input {path} without an unpacker")]
    #[diagnostic(
        code(input::unpacker_required),
        help("Pass the path of Starbound's asset_unpacker with --unpacker, or unpack the archive yourself")
    )]
    UnpackerRequired { path: Utf8PathBuf },

    #[error("Input not found: {path}")]
    #[diagnostic(
        code(input::not_found),
        help("Inputs must be mod directories or .pak / .modpak archives")
    )]
    InputNotFound { path: Utf8PathBuf },

    #[error("Cannot find mod {name} at {path}")]
    #[diagnostic(
        code(build::mod_not_found),
        help("Install the mod into the game's mods directory, or check --game-dir / STARBOUND_DIR")
    )]
    ModNotFound { name: String, path: Utf8PathBuf },

    #[error("Failed to run {tool} while {step}")]
    #[diagnostic(
        code(tool::launch_failed),
        help("Check --bin-dir / STARBOUND_BIN_DIR points at the directory containing the Starbound asset tools")
    )]
    ToolLaunchFailed {
        step: String,
        tool: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed while {step} ({status})")]
    #[diagnostic(code(tool::failed))]
    ToolFailed {
        step: String,
        tool: Utf8PathBuf,
        status: ExitStatus,
    },

    #[error("Failed to create archive {path}")]
    #[diagnostic(code(package::zip_failed))]
    ZipFailed {
        path: Utf8PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{0}")]
    #[diagnostic(code(generate::failed))]
    Generation(#[from] zerog_generator::Error),

    #[error("IO operation failed: {path}")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn config_not_found(path: Utf8PathBuf) -> Self {
        Self::ConfigNotFound { path }
    }

    pub fn invalid_suffix(suffix: String, span: Option<SourceSpan>) -> Self {
        Self::InvalidSuffix { suffix, span }
    }

    pub fn invalid_version(version: String, span: Option<SourceSpan>) -> Self {
        Self::InvalidVersion { version, span }
    }

    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error: 3 for a mod with several manifests,
    /// 4 for a mod without one, 5 for other configuration errors and 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Generation(zerog_generator::Error::MultipleManifests { .. }) => 3,
            CliError::Generation(zerog_generator::Error::MissingManifest(_)) => 4,
            CliError::Generation(e) if e.is_configuration() => 5,
            CliError::ConfigNotFound { .. }
            | CliError::ConfigParseError { .. }
            | CliError::InvalidSuffix { .. }
            | CliError::InvalidVersion { .. }
            | CliError::UnpackerRequired { .. } => 5,
            _ => 1,
        }
    }
}
