//! CLI command implementations.

pub mod board;
pub mod clean;
pub mod constraints;
pub mod doctor;
pub mod init;
pub mod program;
pub mod script;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pinplan_platform::{timecard, PlatformDescriptor};

use crate::manifest::{resolve_board, PinplanManifest};

/// Resolve the board to work on: explicit flag, then manifest, then the
/// built-in Time Card.
pub(crate) fn load_board(
    project_dir: &Path,
    manifest: Option<&PinplanManifest>,
    board: Option<&str>,
    toolchain: Option<&str>,
) -> Result<PlatformDescriptor> {
    let name = board
        .or_else(|| manifest.and_then(|m| m.default_board()))
        .unwrap_or(timecard::BOARD_NAME);
    let toolchain = toolchain
        .or_else(|| manifest.and_then(|m| m.toolchain()))
        .unwrap_or(timecard::DEFAULT_TOOLCHAIN);
    tracing::debug!(board = name, toolchain, "resolving board");
    resolve_board(name, toolchain, Some(project_dir))
}

/// Write `content` to `output`, or to stdout when no path is given.
pub(crate) fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}
