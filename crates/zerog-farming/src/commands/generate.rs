use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use zerog_generator::{GenerationReport, Generator};
use zerog_modinfo::MergeMode;

use crate::{
    errors::CliError,
    println_pad,
    utils::{
        config::{current_dir, resolve_config, ConfigOverrides},
        tools::{self, Tool},
    },
};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum MergeModeArg {
    Merge,
    JsonPatch,
    Overwrite,
}

impl From<MergeModeArg> for MergeMode {
    fn from(arg: MergeModeArg) -> Self {
        match arg {
            MergeModeArg::Merge => MergeMode::Merge,
            MergeModeArg::JsonPatch => MergeMode::JsonPatch,
            MergeModeArg::Overwrite => MergeMode::Overwrite,
        }
    }
}

#[derive(Debug)]
pub struct GenerateArgs {
    pub inputs: Vec<Utf8PathBuf>,
    pub output: Utf8PathBuf,
    pub config: Option<Utf8PathBuf>,
    pub merge_mode: Option<MergeModeArg>,
    pub synthesize_manifest: bool,
    pub unpacker: Option<Utf8PathBuf>,
}

pub fn generate_overrides(args: GenerateArgs) -> Result<(), CliError> {
    let cwd = current_dir()?;
    let overrides = ConfigOverrides {
        merge_mode: args.merge_mode.map(MergeMode::from),
        synthesize_manifest: args.synthesize_manifest,
    };
    let config = resolve_config(args.config.as_deref(), &cwd, &overrides)?;

    let unpacker = args.unpacker.map(Tool::new);
    let unpack_dir = cwd.join("temp");
    let inputs = args
        .inputs
        .iter()
        .map(|input| resolve_input(input, unpacker.as_ref(), &unpack_dir))
        .collect::<Result<Vec<_>, _>>()?;

    println!(
        "{} {}",
        "🌱 Generating gravityless plants into".bright_blue().bold(),
        args.output.as_str().bright_cyan().bold()
    );
    if config.merge_mode != MergeMode::Merge {
        println_pad!("{} {}", "Merge mode:".bright_yellow(), config.merge_mode);
    }

    let mut generator = Generator::new(config, args.output.clone());
    let report = generator.run(&inputs)?;
    print_report(&report);

    Ok(())
}

/// Turns an input into a mod directory, unpacking `.pak` / `.modpak` archives into
/// `unpack_dir/<archive stem>`.
pub fn resolve_input(
    input: &Utf8Path,
    unpacker: Option<&Tool>,
    unpack_dir: &Utf8Path,
) -> Result<Utf8PathBuf, CliError> {
    if input.is_dir() {
        return Ok(input.to_path_buf());
    }
    if !input.is_file() {
        return Err(CliError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    let Some(unpacker) = unpacker else {
        return Err(CliError::UnpackerRequired {
            path: input.to_path_buf(),
        });
    };

    let dest = unpack_dir.join(input.file_stem().unwrap_or("unpacked"));
    if dest.exists() {
        std::fs::remove_dir_all(&dest).map_err(|e| CliError::io(&dest, e))?;
    }
    std::fs::create_dir_all(unpack_dir).map_err(|e| CliError::io(unpack_dir, e))?;

    println_pad!("{} {}", "Unpacking".bright_blue(), input);
    tools::unpack(unpacker, input, &dest)?;
    Ok(dest)
}

pub fn print_report(report: &GenerationReport) {
    for container in &report.containers {
        let target = match &container.overrides {
            Some(name) => format!("overrides {}", name),
            None => "base assets".to_string(),
        };
        println_pad!(
            "{} {} ({}, {} plants)",
            "•".bright_green(),
            container.name.bright_white().bold(),
            target,
            container.plants
        );
    }

    println!(
        "{} {}",
        "✅ Generated files:".bright_green().bold(),
        report.files.to_string().bright_white().bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_directory_input_is_used_as_is() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let mod_dir = root.join("soy");
        fs::create_dir_all(&mod_dir).unwrap();

        assert_eq!(
            resolve_input(&mod_dir, None, &root.join("temp")).unwrap(),
            mod_dir
        );
    }

    #[test]
    fn test_packed_input_needs_unpacker() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let pak = root.join("soy.pak");
        fs::write(&pak, b"pak").unwrap();

        assert!(matches!(
            resolve_input(&pak, None, &root.join("temp")),
            Err(CliError::UnpackerRequired { .. })
        ));
        assert!(matches!(
            resolve_input(&root.join("missing"), None, &root.join("temp")),
            Err(CliError::InputNotFound { .. })
        ));
    }

    #[test]
    fn test_merge_mode_arg() {
        assert_eq!(MergeMode::from(MergeModeArg::JsonPatch), MergeMode::JsonPatch);
        assert_eq!(MergeMode::from(MergeModeArg::Overwrite), MergeMode::Overwrite);
    }
}
