//! Debug/flash programmer selection.
//!
//! A board supports a closed set of programming backends. Each backend
//! carries its own connection parameters and knows how to describe a load
//! or flash operation as a command invocation. Nothing here talks to a
//! probe: plans are handed to the caller to execute.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Programming backend kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgrammerKind {
    /// OpenOCD over an FT232 JTAG adapter, flashing through a BSCAN SPI proxy.
    #[default]
    #[serde(rename = "openocd")]
    OpenOcd,
    /// Vivado hardware manager.
    Vivado,
}

impl ProgrammerKind {
    /// Every supported backend.
    pub const ALL: [ProgrammerKind; 2] = [ProgrammerKind::OpenOcd, ProgrammerKind::Vivado];

    /// Name used on the command line and in manifests.
    pub fn name(self) -> &'static str {
        match self {
            Self::OpenOcd => "openocd",
            Self::Vivado => "vivado",
        }
    }
}

impl fmt::Display for ProgrammerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProgrammerKind {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openocd" => Ok(Self::OpenOcd),
            "vivado" => Ok(Self::Vivado),
            other => Err(PlatformError::UnsupportedProgrammer {
                name: other.to_string(),
            }),
        }
    }
}

/// A resolved programmer with its backend-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Programmer {
    #[serde(rename = "openocd")]
    OpenOcd {
        /// Debug-adapter configuration file.
        config: String,
        /// Boundary-scan bitstream used as a SPI flash proxy.
        flash_proxy: String,
    },
    Vivado {
        /// Configuration memory part name.
        flash_part: String,
    },
}

/// A command invocation that performs a programming operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramPlan {
    /// Executable to run.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Script the invocation sources, with the file name it expects.
    pub script: Option<(String, String)>,
}

impl ProgramPlan {
    /// Shell-style rendering for display.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|arg| {
                if arg.contains(char::is_whitespace) {
                    format!("\"{arg}\"")
                } else {
                    arg.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Programmer {
    /// The kind of this backend.
    pub fn kind(&self) -> ProgrammerKind {
        match self {
            Self::OpenOcd { .. } => ProgrammerKind::OpenOcd,
            Self::Vivado { .. } => ProgrammerKind::Vivado,
        }
    }

    /// Plan loading a bitstream into configuration memory (volatile).
    pub fn load_bitstream(&self, bitstream: &str) -> ProgramPlan {
        match self {
            Self::OpenOcd { config, .. } => openocd_plan(
                config,
                &["init".to_string(), format!("pld load 0 {{{bitstream}}}"), "exit".into()],
            ),
            Self::Vivado { .. } => {
                let script = [
                    "open_hw".to_string(),
                    "connect_hw_server".into(),
                    "open_hw_target".into(),
                    format!("set_property PROGRAM.FILE {{{bitstream}}} [lindex [get_hw_devices] 0]"),
                    "program_hw_devices [lindex [get_hw_devices] 0]".into(),
                    "refresh_hw_device [lindex [get_hw_devices] 0]".into(),
                    "quit".into(),
                ];
                vivado_plan("load_bitstream.tcl", &script)
            }
        }
    }

    /// Plan writing an image to the configuration flash at `address`.
    ///
    /// The Vivado backend places the image by the address range stored in
    /// the file itself; `address` only applies to OpenOCD.
    pub fn flash(&self, address: u64, image: &str) -> ProgramPlan {
        match self {
            Self::OpenOcd {
                config,
                flash_proxy,
            } => openocd_plan(
                config,
                &[
                    "init".to_string(),
                    format!("jtagspi_init 0 {{{flash_proxy}}}"),
                    format!("jtagspi_program {{{image}}} 0x{address:x}"),
                    "fpga_program".into(),
                    "exit".into(),
                ],
            ),
            Self::Vivado { flash_part } => {
                let script = [
                    "open_hw".to_string(),
                    "connect_hw_server".into(),
                    "open_hw_target".into(),
                    format!(
                        "create_hw_cfgmem -hw_device [lindex [get_hw_devices] 0] -mem_dev [lindex [get_cfgmem_parts {{{flash_part}}}] 0]"
                    ),
                    "set_property PROGRAM.ADDRESS_RANGE {use_file} [current_hw_cfgmem]".into(),
                    format!("set_property PROGRAM.FILES {{{image}}} [current_hw_cfgmem]"),
                    "set_property PROGRAM.UNUSED_PIN_TERMINATION {pull-none} [current_hw_cfgmem]".into(),
                    "set_property PROGRAM.BLANK_CHECK 0 [current_hw_cfgmem]".into(),
                    "set_property PROGRAM.ERASE 1 [current_hw_cfgmem]".into(),
                    "set_property PROGRAM.CFG_PROGRAM 1 [current_hw_cfgmem]".into(),
                    "set_property PROGRAM.VERIFY 1 [current_hw_cfgmem]".into(),
                    "create_hw_bitstream -hw_device [current_hw_device] [get_property PROGRAM.HW_CFGMEM_BITFILE [current_hw_device]]".into(),
                    "program_hw_devices [current_hw_device]".into(),
                    "program_hw_cfgmem -hw_cfgmem [current_hw_cfgmem]".into(),
                    "quit".into(),
                ];
                vivado_plan("flash.tcl", &script)
            }
        }
    }
}

fn openocd_plan(config: &str, commands: &[String]) -> ProgramPlan {
    ProgramPlan {
        program: "openocd".into(),
        args: vec![
            "-f".into(),
            config.to_string(),
            "-c".into(),
            commands.join("; "),
        ],
        script: None,
    }
}

fn vivado_plan(script_name: &str, lines: &[String]) -> ProgramPlan {
    let mut script = lines.join("\n");
    script.push('\n');
    ProgramPlan {
        program: "vivado".into(),
        args: vec![
            "-mode".into(),
            "batch".into(),
            "-source".into(),
            script_name.to_string(),
        ],
        script: Some((script_name.to_string(), script)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openocd() -> Programmer {
        Programmer::OpenOcd {
            config: "openocd_xc7_ft232.cfg".into(),
            flash_proxy: "bscan_spi_xc7a200t.bit".into(),
        }
    }

    #[test]
    fn kind_from_str() {
        assert_eq!("openocd".parse::<ProgrammerKind>().unwrap(), ProgrammerKind::OpenOcd);
        assert_eq!("vivado".parse::<ProgrammerKind>().unwrap(), ProgrammerKind::Vivado);
        let err = "OpenOCD".parse::<ProgrammerKind>().unwrap_err();
        assert!(matches!(err, PlatformError::UnsupportedProgrammer { ref name } if name == "OpenOCD"));
    }

    #[test]
    fn default_kind_is_openocd() {
        assert_eq!(ProgrammerKind::default(), ProgrammerKind::OpenOcd);
    }

    #[test]
    fn openocd_load_plan() {
        let plan = openocd().load_bitstream("build/top.bit");
        assert_eq!(plan.program, "openocd");
        assert_eq!(
            plan.args,
            vec!["-f", "openocd_xc7_ft232.cfg", "-c", "init; pld load 0 {build/top.bit}; exit"]
        );
        assert!(plan.script.is_none());
    }

    #[test]
    fn openocd_flash_plan() {
        let plan = openocd().flash(0x40_0000, "top_fallback.bin");
        assert_eq!(
            plan.args[3],
            "init; jtagspi_init 0 {bscan_spi_xc7a200t.bit}; jtagspi_program {top_fallback.bin} 0x400000; fpga_program; exit"
        );
        assert!(plan.command_line().starts_with("openocd -f openocd_xc7_ft232.cfg -c \"init;"));
    }

    #[test]
    fn vivado_flash_script_names_part() {
        let p = Programmer::Vivado {
            flash_part: "s25fl256sxxxxxx0-spi-x1_x2_x4".into(),
        };
        assert_eq!(p.kind(), ProgrammerKind::Vivado);
        let plan = p.flash(0, "top.bin");
        let (name, script) = plan.script.unwrap();
        assert_eq!(name, "flash.tcl");
        assert!(script.contains("get_cfgmem_parts {s25fl256sxxxxxx0-spi-x1_x2_x4}"));
        assert!(script.contains("PROGRAM.FILES {top.bin}"));
        assert!(script.ends_with("quit\n"));
        assert_eq!(plan.args, vec!["-mode", "batch", "-source", "flash.tcl"]);
    }
}
