//! Toolchain steps handed verbatim to the vendor toolchain.
//!
//! Each [`ToolchainStep`] renders to one or more Tcl directive lines. Lines
//! may contain the `{build_name}` placeholder, which the consumer replaces
//! with the design's output name.

use serde::{Deserialize, Serialize};

/// Placeholder substituted with the design's configured output name.
pub const BUILD_NAME_PLACEHOLDER: &str = "{build_name}";

/// A configuration-memory image written by `write_cfgmem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CfgmemImage {
    /// Output format (e.g., "bin", "mcs").
    pub format: String,
    /// Flash interface (e.g., "spix4").
    pub interface: String,
    /// Addressable flash size in MB.
    pub size_mb: u32,
    /// Byte offset the bitstream is loaded at.
    pub load_offset: u64,
    /// Bitstream file to load.
    pub bitstream: String,
    /// Image file to produce.
    pub file: String,
}

impl CfgmemImage {
    /// The `write_cfgmem` directive producing this image.
    pub fn directive(&self) -> String {
        format!(
            "write_cfgmem -force -format {} -interface {} -size {} -loadbit \"up 0x{:x} {}\" -file {}",
            self.format, self.interface, self.size_mb, self.load_offset, self.bitstream, self.file
        )
    }
}

/// One ordered step of a toolchain command sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ToolchainStep {
    /// `set_property <property> <value> [current_design]`.
    SetProperty { property: String, value: String },
    /// Write a flash image from an already generated bitstream.
    WriteCfgmem { image: CfgmemImage },
    /// Generate a bitstream variant, then write its flash image.
    WriteVariant { bitstream: String, image: CfgmemImage },
}

impl ToolchainStep {
    /// A `set_property ... [current_design]` step.
    pub fn set_property(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SetProperty {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Directive lines for this step, placeholders left in place.
    pub fn directives(&self) -> Vec<String> {
        match self {
            Self::SetProperty { property, value } => {
                vec![format!("set_property {property} {value} [current_design]")]
            }
            Self::WriteCfgmem { image } => vec![image.directive()],
            // The trailing space is part of the emitted directive.
            Self::WriteVariant { bitstream, image } => vec![
                format!("write_bitstream -force {bitstream} "),
                image.directive(),
            ],
        }
    }

    /// Directive lines with `{build_name}` substituted.
    pub fn render(&self, build_name: &str) -> Vec<String> {
        self.directives()
            .into_iter()
            .map(|line| substitute_build_name(&line, build_name))
            .collect()
    }
}

/// Replace every `{build_name}` placeholder in `line`.
pub fn substitute_build_name(line: &str, build_name: &str) -> String {
    line.replace(BUILD_NAME_PLACEHOLDER, build_name)
}

/// Flatten steps into directive lines.
pub fn flatten(steps: &[ToolchainStep]) -> Vec<String> {
    steps.iter().flat_map(ToolchainStep::directives).collect()
}

/// Bitstream configuration applied before any image is generated.
#[derive(Debug, Clone, PartialEq)]
pub struct BitstreamConfig {
    /// SPI bus width used during configuration.
    pub spi_buswidth: u32,
    /// Configuration clock rate in MHz.
    pub config_rate_mhz: u32,
    /// Whether bitstream compression is enabled.
    pub compress: bool,
    /// CFGBVS reference.
    pub cfgbvs: String,
    /// Configuration bank voltage.
    pub config_voltage: f64,
}

impl BitstreamConfig {
    /// Quad-SPI, 16 MHz, compressed, 3.3 V bank.
    pub fn quad_spi_3v3() -> Self {
        Self {
            spi_buswidth: 4,
            config_rate_mhz: 16,
            compress: true,
            cfgbvs: "VCCO".into(),
            config_voltage: 3.3,
        }
    }

    /// Steps applied before bitstream generation, in order.
    pub fn steps(&self) -> Vec<ToolchainStep> {
        vec![
            ToolchainStep::set_property(
                "BITSTREAM.CONFIG.SPI_BUSWIDTH",
                self.spi_buswidth.to_string(),
            ),
            ToolchainStep::set_property(
                "BITSTREAM.CONFIG.CONFIGRATE",
                self.config_rate_mhz.to_string(),
            ),
            ToolchainStep::set_property(
                "BITSTREAM.GENERAL.COMPRESS",
                if self.compress { "TRUE" } else { "FALSE" },
            ),
            ToolchainStep::set_property("CFGBVS", self.cfgbvs.clone()),
            ToolchainStep::set_property("CONFIG_VOLTAGE", format!("{:.1}", self.config_voltage)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitstream_config_directives() {
        let lines = flatten(&BitstreamConfig::quad_spi_3v3().steps());
        assert_eq!(
            lines,
            vec![
                "set_property BITSTREAM.CONFIG.SPI_BUSWIDTH 4 [current_design]",
                "set_property BITSTREAM.CONFIG.CONFIGRATE 16 [current_design]",
                "set_property BITSTREAM.GENERAL.COMPRESS TRUE [current_design]",
                "set_property CFGBVS VCCO [current_design]",
                "set_property CONFIG_VOLTAGE 3.3 [current_design]",
            ]
        );
    }

    #[test]
    fn variant_renders_two_lines() {
        let step = ToolchainStep::WriteVariant {
            bitstream: "{build_name}_x.bit".into(),
            image: CfgmemImage {
                format: "bin".into(),
                interface: "spix4".into(),
                size_mb: 16,
                load_offset: 0,
                bitstream: "{build_name}_x.bit".into(),
                file: "{build_name}_x.bin".into(),
            },
        };
        let lines = step.render("top");
        assert_eq!(lines[0], "write_bitstream -force top_x.bit ");
        assert_eq!(
            lines[1],
            "write_cfgmem -force -format bin -interface spix4 -size 16 -loadbit \"up 0x0 top_x.bit\" -file top_x.bin"
        );
    }

    #[test]
    fn nonzero_offset_is_hex() {
        let image = CfgmemImage {
            format: "mcs".into(),
            interface: "spix1".into(),
            size_mb: 32,
            load_offset: 0x40_0000,
            bitstream: "a.bit".into(),
            file: "a.mcs".into(),
        };
        assert!(image.directive().contains("\"up 0x400000 a.bit\""));
    }
}
