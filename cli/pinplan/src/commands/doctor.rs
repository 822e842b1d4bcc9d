//! `pinplan doctor`: toolchain diagnostics.

use std::path::Path;
use std::process::Command;

use anyhow::Result;
use pinplan_platform::parse::validate_descriptor;
use pinplan_platform::{timecard, ProgrammerKind};

use crate::manifest::{resolve_board, PinplanManifest};

/// Print toolchain and project diagnostic information.
pub fn run(project_dir: &Path) -> Result<()> {
    println!("=== pinplan doctor ===");
    println!();
    println!("pinplan version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("--- External Tools ---");
    for kind in ProgrammerKind::ALL {
        let version_flag = match kind {
            ProgrammerKind::OpenOcd => "--version",
            ProgrammerKind::Vivado => "-version",
        };
        print_tool_status(kind.name(), &[version_flag]);
    }
    println!();

    println!("--- Project Status ---");
    match PinplanManifest::find_and_load(project_dir) {
        Ok(Some((manifest, dir))) => {
            println!("  pinplan.toml: found at {}", dir.display());
            println!("  Project:      {}", manifest.project.name);
            println!("  Build name:   {}", manifest.build_name());
            let programmer = manifest
                .programmer()
                .unwrap_or(ProgrammerKind::default().name());
            println!("  Programmer:   {programmer}");
            if let Some(board) = manifest.default_board() {
                let toolchain = manifest.toolchain().unwrap_or(timecard::DEFAULT_TOOLCHAIN);
                match resolve_board(board, toolchain, Some(&dir)) {
                    Ok(descriptor) => {
                        let status = match validate_descriptor(&descriptor) {
                            Ok(warnings) if warnings.is_empty() => "valid".to_string(),
                            Ok(warnings) => format!("valid, {} warning(s)", warnings.len()),
                            Err(issues) => format!("invalid, {} issue(s)", issues.len()),
                        };
                        println!("  Board:        {board} ({status})");
                    }
                    Err(e) => println!("  Board:        {board}: {e:#}"),
                }
            }
        }
        Ok(None) => {
            println!("  pinplan.toml: not found");
        }
        Err(e) => {
            println!("  pinplan.toml: error: {e:#}");
        }
    }

    Ok(())
}

fn print_tool_status(name: &str, args: &[&str]) {
    match Command::new(name).args(args).output() {
        Ok(output) => {
            // openocd reports its version on stderr.
            let stream = if output.stdout.is_empty() {
                &output.stderr
            } else {
                &output.stdout
            };
            let version = String::from_utf8_lossy(stream);
            let first_line = version.lines().next().unwrap_or("(unknown version)");
            println!("  {name}: {first_line}");
        }
        Err(_) => {
            println!("  {name}: not found");
        }
    }
}
