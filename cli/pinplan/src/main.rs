//! pinplan CLI: board pin plans, constraints and programming for FPGA carrier boards.

mod commands;
mod logging;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};

use logging::LevelFilter;
use manifest::PinplanManifest;

#[derive(Parser)]
#[command(name = "pinplan", version, about = "FPGA board pin plans and programming")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Log level (overrides -v and RUST_LOG)
    #[arg(long, value_enum, global = true)]
    log_level: Option<LevelFilter>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new pinplan project
    Init {
        /// Project name
        name: String,
    },
    /// Inspect and manage board descriptions
    Board {
        #[command(subcommand)]
        action: BoardAction,
    },
    /// Emit XDC constraints for the requested resources
    Constraints {
        /// Board name or .board.toml path (default: from pinplan.toml)
        #[arg(long)]
        board: Option<String>,
        /// Toolchain the board is described for
        #[arg(long)]
        toolchain: Option<String>,
        /// Requested resource as name:index (repeatable)
        #[arg(long = "request")]
        requests: Vec<String>,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Emit the bitstream-generation Tcl script
    Script {
        /// Board name or .board.toml path (default: from pinplan.toml)
        #[arg(long)]
        board: Option<String>,
        /// Toolchain the board is described for
        #[arg(long)]
        toolchain: Option<String>,
        /// Build name substituted into the commands
        #[arg(long)]
        build_name: Option<String>,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Plan loading or flashing a bitstream (dry run)
    Program {
        /// Programmer backend (openocd, vivado)
        #[arg(long)]
        programmer: Option<String>,
        /// Write the configuration flash instead of loading the FPGA
        #[arg(long)]
        flash: bool,
        /// Flash address, decimal or 0x-prefixed hex
        #[arg(long, value_parser = commands::program::parse_address)]
        address: Option<u64>,
        /// Board name or .board.toml path (default: from pinplan.toml)
        #[arg(long)]
        board: Option<String>,
        /// Toolchain the board is described for
        #[arg(long)]
        toolchain: Option<String>,
        /// Bitstream or flash image (default: from the build directory)
        file: Option<String>,
    },
    /// Check toolchain and project status
    Doctor,
    /// Remove build artifacts
    Clean,
}

#[derive(Subcommand)]
enum BoardAction {
    /// List available boards
    List,
    /// Show details of a board
    Describe {
        /// Board name
        name: String,
        /// Output format (human, toml, json)
        #[arg(long)]
        format: Option<String>,
        /// Toolchain the board is described for
        #[arg(long, default_value = "vivado")]
        toolchain: String,
    },
    /// Validate a board description
    Validate {
        /// Board name or .board.toml path
        name: String,
        /// Toolchain the board is described for
        #[arg(long, default_value = "vivado")]
        toolchain: String,
    },
    /// Write a board as a .board.toml description
    Export {
        /// Board name
        name: String,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Toolchain the board is described for
        #[arg(long, default_value = "vivado")]
        toolchain: String,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::setup_logging(cli.log_level.or(LevelFilter::from_verbosity(cli.verbose)));

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Board { action } => {
            let (_, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            match action {
                BoardAction::List => commands::board::list(Some(&project_dir)),
                BoardAction::Describe {
                    name,
                    format,
                    toolchain,
                } => commands::board::describe(
                    &name,
                    &toolchain,
                    Some(&project_dir),
                    format.as_deref(),
                ),
                BoardAction::Validate { name, toolchain } => {
                    commands::board::validate(&name, &toolchain, Some(&project_dir))
                }
                BoardAction::Export {
                    name,
                    output,
                    toolchain,
                } => commands::board::export(
                    &name,
                    &toolchain,
                    Some(&project_dir),
                    output.as_deref(),
                ),
            }
        }

        Commands::Constraints {
            board,
            toolchain,
            requests,
            output,
        } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::constraints::run(
                &project_dir,
                manifest.as_ref(),
                board.as_deref(),
                toolchain.as_deref(),
                &requests,
                output.as_deref(),
            )
        }

        Commands::Script {
            board,
            toolchain,
            build_name,
            output,
        } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::script::run(
                &project_dir,
                manifest.as_ref(),
                board.as_deref(),
                toolchain.as_deref(),
                build_name.as_deref(),
                output.as_deref(),
            )
        }

        Commands::Program {
            programmer,
            flash,
            address,
            board,
            toolchain,
            file,
        } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            let options = commands::program::ProgramOptions {
                board: board.as_deref(),
                toolchain: toolchain.as_deref(),
                programmer: programmer.as_deref(),
                flash,
                address,
                file: file.as_deref(),
            };
            commands::program::run(&project_dir, manifest.as_ref(), &options)
        }

        Commands::Doctor => commands::doctor::run(&cwd),

        Commands::Clean => {
            let (manifest, project_dir) = load_manifest_required(&cwd)?;
            commands::clean::run(&project_dir, Some(&manifest))
        }
    }
}

/// Load the manifest from the current directory upward, failing if none exists.
fn load_manifest_required(cwd: &Path) -> anyhow::Result<(PinplanManifest, PathBuf)> {
    match PinplanManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((manifest, dir)),
        None => anyhow::bail!("no pinplan.toml found (run `pinplan init` first)"),
    }
}

/// Try to load a manifest from the current directory upward. Returns (None, None) if not found.
fn load_manifest_optional(
    cwd: &Path,
) -> anyhow::Result<(Option<PinplanManifest>, Option<PathBuf>)> {
    match PinplanManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}
