//! `pinplan program`: plan a bitstream load or flash write.
//!
//! Nothing is executed: the command prints the programmer invocation and,
//! for script-driven backends, writes the script into the build directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pinplan_platform::ProgrammerKind;

use crate::commands::load_board;
use crate::manifest::PinplanManifest;

/// Options selecting what to program.
#[derive(Debug, Default)]
pub struct ProgramOptions<'a> {
    pub board: Option<&'a str>,
    pub toolchain: Option<&'a str>,
    pub programmer: Option<&'a str>,
    /// Write the configuration flash instead of loading volatile configuration.
    pub flash: bool,
    pub address: Option<u64>,
    pub file: Option<&'a str>,
}

/// Print the plan for programming the board.
pub fn run(
    project_dir: &Path,
    manifest: Option<&PinplanManifest>,
    options: &ProgramOptions<'_>,
) -> Result<()> {
    let descriptor = load_board(project_dir, manifest, options.board, options.toolchain)?;
    let default_name = ProgrammerKind::default().name();
    let name = options
        .programmer
        .or_else(|| manifest.and_then(|m| m.programmer()))
        .unwrap_or(default_name);
    let programmer = descriptor.select_programmer(name)?;

    let build_dir = match manifest {
        Some(m) => project_dir.join(&m.project.build_dir),
        None => project_dir.join("build"),
    };
    let build_name = manifest.map(|m| m.build_name()).unwrap_or("top");
    let extension = if options.flash { "bin" } else { "bit" };
    let file = match options.file {
        Some(file) => file.to_string(),
        None => build_dir
            .join(format!("{build_name}.{extension}"))
            .display()
            .to_string(),
    };

    let plan = if options.flash {
        let address = options.address.unwrap_or(descriptor.flash.load_offset);
        programmer.flash(address, &file)
    } else {
        programmer.load_bitstream(&file)
    };
    tracing::info!(programmer = %programmer.kind(), flash = options.flash, file = %file, "planned programming");

    if let Some((script_name, script)) = &plan.script {
        fs::create_dir_all(&build_dir)
            .with_context(|| format!("creating {}", build_dir.display()))?;
        let path = build_dir.join(script_name);
        fs::write(&path, script).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    println!("{}", plan.command_line());
    Ok(())
}

/// Parse a flash address in decimal or `0x` hexadecimal.
pub fn parse_address(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_addresses() {
        assert_eq!(parse_address("0x400000"), Ok(0x40_0000));
        assert_eq!(parse_address("4096"), Ok(4096));
        assert!(parse_address("0xzz").is_err());
    }

    #[test]
    fn openocd_is_the_default() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), None, &ProgramOptions::default()).unwrap();
        assert!(!dir.path().join("build").exists());
    }

    #[test]
    fn vivado_flash_writes_script() {
        let dir = tempfile::tempdir().unwrap();
        let options = ProgramOptions {
            programmer: Some("vivado"),
            flash: true,
            file: Some("timecard.bin"),
            ..Default::default()
        };
        run(dir.path(), None, &options).unwrap();

        let script = fs::read_to_string(dir.path().join("build/flash.tcl")).unwrap();
        assert!(script.contains("get_cfgmem_parts {s25fl256sxxxxxx0-spi-x1_x2_x4}"));
        assert!(script.contains("PROGRAM.FILES {timecard.bin}"));
    }

    #[test]
    fn manifest_programmer_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = PinplanManifest::from_str(
            "[project]\nname = \"p\"\nbuild_dir = \"out\"\n[programmer]\nname = \"vivado\"\n",
        )
        .unwrap();
        run(dir.path(), Some(&manifest), &ProgramOptions::default()).unwrap();
        assert!(dir.path().join("out/load_bitstream.tcl").is_file());
    }

    #[test]
    fn unsupported_programmer_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = ProgramOptions {
            programmer: Some("bogus"),
            ..Default::default()
        };
        let err = run(dir.path(), None, &options).unwrap_err();
        assert!(err.to_string().contains("unsupported programmer 'bogus'"));
    }
}
