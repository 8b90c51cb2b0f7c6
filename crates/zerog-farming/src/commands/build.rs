use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use zerog_generator::{ContainerReport, Generator};
use zerog_modinfo::GeneratorConfig;

use crate::{
    errors::CliError,
    println_pad,
    utils::{
        config::{current_dir, resolve_config, ConfigOverrides},
        tools::{self, default_bin_dir, zip_directory, AssetTools},
    },
};

use super::generate::print_report;

/// Manifest name the asset packer expects inside a mod directory.
pub const PAK_MANIFEST: &str = "pak.modinfo";

#[derive(Debug)]
pub struct BuildArgs {
    pub game_dir: Utf8PathBuf,
    pub bin_dir: Option<Utf8PathBuf>,
    pub mods: Vec<String>,
    pub temp_dir: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub config: Option<Utf8PathBuf>,
}

/// Generates overrides for the base game and the given installed mods, and packages
/// each container as a `.zip` and a `.modpak`.
pub fn build_release(args: BuildArgs) -> Result<(), CliError> {
    let cwd = current_dir()?;
    let config = resolve_config(args.config.as_deref(), &cwd, &ConfigOverrides::default())?;
    let bin_dir = args
        .bin_dir
        .clone()
        .unwrap_or_else(|| default_bin_dir(&args.game_dir));
    let asset_tools = AssetTools::from_bin_dir(&bin_dir);

    for dir in [&args.temp_dir, &args.output_dir] {
        std::fs::create_dir_all(dir).map_err(|e| CliError::io(dir, e))?;
    }

    println!(
        "{} {}",
        "📦 Building gravityless plants from".bright_blue().bold(),
        args.game_dir.as_str().bright_cyan().bold()
    );

    let default_assets = args.temp_dir.join("default_assets");
    clear_dir(&default_assets)?;
    tools::unpack(
        &asset_tools.unpacker,
        &args.game_dir.join("assets/packed.pak"),
        &default_assets,
    )?;

    let base_config = GeneratorConfig {
        synthesize_missing_manifest: true,
        ..config.clone()
    };
    let report = Generator::new(base_config, args.temp_dir.clone()).run(&[&default_assets])?;
    print_report(&report);
    let mut containers = report.containers;

    if !args.mods.is_empty() {
        let mod_dirs = args
            .mods
            .iter()
            .map(|name| find_mod(&args.game_dir, name, &asset_tools, &args.temp_dir))
            .collect::<Result<Vec<_>, _>>()?;

        let report = Generator::new(config, args.temp_dir.clone()).run(&mod_dirs)?;
        print_report(&report);
        containers.extend(report.containers);
    }

    for container in &containers {
        package_container(container, &asset_tools, &args.output_dir)?;
    }

    println!(
        "{} {}",
        "✅ Packages written to".bright_green().bold(),
        args.output_dir.as_str().bright_white().bold()
    );
    Ok(())
}

/// Locates an installed mod: `<game>/mods/<name>` as a directory, or
/// `<game>/mods/<name>.pak`, which is unpacked into `temp_dir`.
pub fn find_mod(
    game_dir: &Utf8Path,
    name: &str,
    asset_tools: &AssetTools,
    temp_dir: &Utf8Path,
) -> Result<Utf8PathBuf, CliError> {
    let installed = game_dir.join("mods").join(name);
    if installed.is_dir() {
        return Ok(installed);
    }

    let packed = game_dir.join("mods").join(format!("{name}.pak"));
    if packed.is_file() {
        let dest = temp_dir.join(name);
        clear_dir(&dest)?;
        tools::unpack(&asset_tools.unpacker, &packed, &dest)?;
        return Ok(dest);
    }

    Err(CliError::ModNotFound {
        name: name.to_string(),
        path: installed,
    })
}

/// Zips the container, renames its manifest to `pak.modinfo` and packs it.
pub fn package_container(
    container: &ContainerReport,
    asset_tools: &AssetTools,
    output_dir: &Utf8Path,
) -> Result<(), CliError> {
    let dir_name = container.path.file_name().unwrap_or(container.name.as_str());

    let zip_path = output_dir.join(format!("{dir_name}.zip"));
    zip_directory(&container.path, &zip_path)?;
    println_pad!("{} {}", "Zipped".bright_blue(), zip_path);

    let manifest = container.path.join(format!("{}.modinfo", container.name));
    let pak_manifest = container.path.join(PAK_MANIFEST);
    std::fs::rename(&manifest, &pak_manifest).map_err(|e| CliError::io(&manifest, e))?;

    let modpak = output_dir.join(format!("{dir_name}.modpak"));
    tools::pack(&asset_tools.packer, &container.path, &modpak)?;
    println_pad!("{} {}", "Packed".bright_blue(), modpak);

    Ok(())
}

fn clear_dir(dir: &Utf8Path) -> Result<(), CliError> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| CliError::io(dir, e))?;
    }
    Ok(())
}
