//! `pinplan script`: emit the bitstream-generation Tcl for a board.

use std::path::Path;

use anyhow::Result;
use pinplan_platform::parse::ensure_valid;
use pinplan_platform::tcl::render_build_script;

use crate::commands::{load_board, write_output};
use crate::manifest::PinplanManifest;

/// Render the Tcl build tail for `build_name` (default: the project's build name).
pub fn run(
    project_dir: &Path,
    manifest: Option<&PinplanManifest>,
    board: Option<&str>,
    toolchain: Option<&str>,
    build_name: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let descriptor = load_board(project_dir, manifest, board, toolchain)?;
    ensure_valid(&descriptor)?;
    let build_name = build_name
        .or_else(|| manifest.map(|m| m.build_name()))
        .unwrap_or("top");
    tracing::debug!(board = %descriptor.name, build_name, "rendering build script");
    write_output(output, &render_build_script(&descriptor, build_name))
}
