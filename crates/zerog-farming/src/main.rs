use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{build_release, generate_overrides, BuildArgs, GenerateArgs, MergeModeArg};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Log generator activity (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate override mods for unpacked mod directories or packed archives
    Generate {
        /// A mod directory, or a .pak/.modpak archive (requires --unpacker)
        #[arg(short, long, required = true)]
        input: Vec<Utf8PathBuf>,

        /// The directory the override containers are written to
        #[arg(short, long)]
        output: Utf8PathBuf,

        /// The configuration file (defaults to zerog.config.json/toml in the working directory)
        #[arg(short, long)]
        config: Option<Utf8PathBuf>,

        /// How overrides are merged over the original plant definitions
        #[arg(long, value_enum)]
        merge_mode: Option<MergeModeArg>,

        /// Synthesize a manifest for inputs that have none
        #[arg(long)]
        synthesize_manifest: bool,

        /// The asset unpacker used for archive inputs
        #[arg(long)]
        unpacker: Option<Utf8PathBuf>,
    },
    /// Build release packages for the base game and installed mods
    Build {
        /// The Starbound installation directory
        #[arg(long, env = "STARBOUND_DIR")]
        game_dir: Utf8PathBuf,

        /// The directory holding asset_unpacker and asset_packer
        #[arg(long, env = "STARBOUND_BIN_DIR")]
        bin_dir: Option<Utf8PathBuf>,

        /// An installed mod to build an override for, by name under <game_dir>/mods
        #[arg(short, long = "mod")]
        mods: Vec<String>,

        /// Scratch directory for unpacked assets and generated containers
        #[arg(long, default_value = "temp")]
        temp_dir: Utf8PathBuf,

        /// The directory the .zip and .modpak packages are written to
        #[arg(long, default_value = "output")]
        output_dir: Utf8PathBuf,

        /// The configuration file (defaults to zerog.config.json/toml in the working directory)
        #[arg(short, long)]
        config: Option<Utf8PathBuf>,
    },
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "zerog_farming=debug,zerog_generator=debug"
    } else {
        "zerog_farming=info,zerog_generator=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let args = parse_args();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Generate {
            input,
            output,
            config,
            merge_mode,
            synthesize_manifest,
            unpacker,
        } => generate_overrides(GenerateArgs {
            inputs: input,
            output,
            config,
            merge_mode,
            synthesize_manifest,
            unpacker,
        }),
        Commands::Build {
            game_dir,
            bin_dir,
            mods,
            temp_dir,
            output_dir,
            config,
        } => build_release(BuildArgs {
            game_dir,
            bin_dir,
            mods,
            temp_dir,
            output_dir,
            config,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code)
        }
    }
}
