//! `pinplan board`: board listing, description, validation and export.

use std::path::Path;

use anyhow::{bail, Context, Result};
use pinplan_platform::command::BUILD_NAME_PLACEHOLDER;
use pinplan_platform::hash::{content_hash, hash_hex};
use pinplan_platform::parse::{descriptor_to_toml, discover_boards, validate_descriptor, Severity};
use pinplan_platform::{PlatformDescriptor, Programmer};

use crate::commands::write_output;
use crate::manifest::{builtin_boards, resolve_board};

/// List built-in boards and the board files of the project.
pub fn list(project_dir: Option<&Path>) -> Result<()> {
    println!("Built-in boards:");
    println!();
    for (name, description) in builtin_boards() {
        println!("  {name:<25} {description}");
    }

    if let Some(dir) = project_dir {
        let custom = discover_boards(dir)?;
        if !custom.is_empty() {
            println!();
            println!("Project boards:");
            println!();
            for (name, path) in custom {
                println!("  {name:<25} {}", path.display());
            }
        }
    }

    println!();
    println!("Use 'pinplan board describe <name>' for details.");
    Ok(())
}

/// Describe a board in detail.
pub fn describe(
    name: &str,
    toolchain: &str,
    project_dir: Option<&Path>,
    format: Option<&str>,
) -> Result<()> {
    let board = resolve_board(name, toolchain, project_dir)?;
    match format {
        None | Some("human") => print_human(&board),
        Some("toml") => {
            print!("{}", descriptor_to_toml(&board)?);
            Ok(())
        }
        Some("json") => {
            println!("{}", serde_json::to_string_pretty(&board)?);
            Ok(())
        }
        Some(other) => bail!("unknown format '{other}' (expected human, toml or json)"),
    }
}

fn print_human(board: &PlatformDescriptor) -> Result<()> {
    let fingerprint = hash_hex(&content_hash(board)?);

    println!("=== Board: {} ===", board.name);
    println!("Device:      {}", board.device_id);
    println!("Toolchain:   {}", board.toolchain);
    println!("Fingerprint: {fingerprint}");
    println!();

    println!("--- Default Clock ---");
    let clock = &board.default_clock;
    let port = board
        .lookup(&clock.name, 0)
        .map(|c| c.clock_port_as(&clock.name))
        .unwrap_or_else(|| clock.name.clone());
    let period = clock.constraint_on(port);
    println!(
        "  {} (port {}): {} ns ({:.1} MHz)",
        period.clock,
        period.port,
        period.period_ns,
        period.frequency_mhz()
    );
    println!();

    println!("--- IO ({} entries) ---", board.io.len());
    for constraint in &board.io {
        let standard = constraint.io_standard.as_deref().unwrap_or("-");
        if constraint.subsignals.is_empty() {
            println!(
                "  {:<16} {:<24} {standard}",
                constraint.id(),
                constraint.pins.join(" ")
            );
        } else {
            println!("  {:<16} {:<24} {standard}", constraint.id(), "");
            for sub in &constraint.subsignals {
                println!(
                    "    {:<14} {:<24} {}",
                    sub.name,
                    sub.pins.join(" "),
                    sub.io_standard.as_deref().unwrap_or(standard)
                );
            }
        }
        for attribute in &constraint.misc {
            println!("    {attribute}");
        }
    }
    println!();

    println!("--- Bitstream Commands ---");
    for line in board.bitstream_directives() {
        println!("  {line}");
    }
    println!();

    println!("--- Post-Build Commands ({} steps) ---", board.post_build_commands.len());
    for line in board.post_build_directives() {
        println!("  {line}");
    }
    println!();

    println!("--- Flash Images ---");
    for image in board.flash.images(BUILD_NAME_PLACEHOLDER) {
        println!("  {:<12} {} -> {}", format!("{:?}", image.role), image.bitstream, image.file);
    }
    println!();

    println!("--- Programmers ---");
    for programmer in &board.programmers {
        match programmer {
            Programmer::OpenOcd {
                config,
                flash_proxy,
            } => println!("  openocd: config {config}, flash proxy {flash_proxy}"),
            Programmer::Vivado { flash_part } => println!("  vivado:  flash part {flash_part}"),
        }
    }

    Ok(())
}

/// Validate a board (built-in, project board, or `.board.toml` path).
pub fn validate(name: &str, toolchain: &str, project_dir: Option<&Path>) -> Result<()> {
    let board = resolve_board(name, toolchain, project_dir)?;
    match validate_descriptor(&board) {
        Ok(warnings) => {
            for warning in &warnings {
                println!("  warning: {}", warning.message);
            }
            println!(
                "Board '{}' is valid ({} warning(s))",
                board.name,
                warnings.len()
            );
            Ok(())
        }
        Err(issues) => {
            for issue in &issues {
                let label = match issue.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                println!("  {label}: {}", issue.message);
            }
            let errors = issues
                .iter()
                .filter(|i| i.severity == Severity::Error)
                .count();
            bail!("board '{}' has {errors} error(s)", board.name)
        }
    }
}

/// Write a board as a `.board.toml` description.
pub fn export(
    name: &str,
    toolchain: &str,
    project_dir: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let board = resolve_board(name, toolchain, project_dir)?;
    let content = descriptor_to_toml(&board)
        .with_context(|| format!("serializing board '{}'", board.name))?;
    write_output(output, &content)
}
