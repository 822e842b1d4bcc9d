//! SPI-flash multiboot layout.
//!
//! The flash holds a plain image plus two independently bootable variants:
//! an operational image with the watchdog and configuration fallback
//! enabled, and a fallback image carrying the next-configuration address
//! the device jumps to when the operational load fails.

use serde::{Deserialize, Serialize};

use crate::command::{substitute_build_name, CfgmemImage, ToolchainStep, BUILD_NAME_PLACEHOLDER};

/// Role of an image in the flash layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageRole {
    /// Non-multiboot image of the primary bitstream.
    Primary,
    /// Image booted in normal operation.
    Operational,
    /// Known-good image used when the operational load fails.
    Fallback,
}

/// One image produced by the post-build sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashImage {
    pub role: ImageRole,
    /// Bitstream the image is written from.
    pub bitstream: String,
    /// Flash image file.
    pub file: String,
}

/// Multiboot policy for a configuration flash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MultibootLayout {
    /// `write_cfgmem` interface (e.g., "spix4").
    pub interface: String,
    /// Addressable flash size in MB.
    pub size_mb: u32,
    /// Image file format.
    pub format: String,
    /// Offset every image is anchored at in its own image file.
    pub load_offset: u64,
    /// Watchdog timer configuration value (`BITSTREAM.CONFIG.TIMER_CFG`).
    pub timer_cfg: u32,
    /// Address loaded on fallback (`BITSTREAM.CONFIG.NEXT_CONFIG_ADDR`).
    pub next_config_addr: u32,
    /// Suffix of the operational variant.
    pub operational_suffix: String,
    /// Suffix of the fallback variant.
    pub fallback_suffix: String,
}

impl MultibootLayout {
    /// 16 MB quad-SPI flash with operational/fallback images.
    pub fn quad_spi_16mb() -> Self {
        Self {
            interface: "spix4".into(),
            size_mb: 16,
            format: "bin".into(),
            load_offset: 0x0,
            timer_cfg: 0x0001_fbd0,
            next_config_addr: 0x0040_0000,
            operational_suffix: "_operational".into(),
            fallback_suffix: "_fallback".into(),
        }
    }

    fn image(&self, suffix: &str) -> CfgmemImage {
        CfgmemImage {
            format: self.format.clone(),
            interface: self.interface.clone(),
            size_mb: self.size_mb,
            load_offset: self.load_offset,
            bitstream: format!("{BUILD_NAME_PLACEHOLDER}{suffix}.bit"),
            file: format!("{BUILD_NAME_PLACEHOLDER}{suffix}.{}", self.format),
        }
    }

    fn variant(&self, suffix: &str) -> ToolchainStep {
        ToolchainStep::WriteVariant {
            bitstream: format!("{BUILD_NAME_PLACEHOLDER}{suffix}.bit"),
            image: self.image(suffix),
        }
    }

    /// Post-build steps, run once the primary bitstream exists.
    ///
    /// Order matters: the timer and fallback properties must be set before
    /// the operational variant is written, and the next-configuration
    /// address only applies to the fallback variant.
    pub fn post_build_steps(&self) -> Vec<ToolchainStep> {
        vec![
            ToolchainStep::WriteCfgmem {
                image: self.image(""),
            },
            ToolchainStep::set_property(
                "BITSTREAM.CONFIG.TIMER_CFG",
                format!("0x{:08x}", self.timer_cfg),
            ),
            ToolchainStep::set_property("BITSTREAM.CONFIG.CONFIGFALLBACK", "Enable"),
            self.variant(&self.operational_suffix),
            ToolchainStep::set_property(
                "BITSTREAM.CONFIG.NEXT_CONFIG_ADDR",
                format!("0x{:08x}", self.next_config_addr),
            ),
            self.variant(&self.fallback_suffix),
        ]
    }

    /// Images the post-build sequence produces for `build_name`.
    pub fn images(&self, build_name: &str) -> Vec<FlashImage> {
        [
            (ImageRole::Primary, ""),
            (ImageRole::Operational, self.operational_suffix.as_str()),
            (ImageRole::Fallback, self.fallback_suffix.as_str()),
        ]
        .into_iter()
        .map(|(role, suffix)| {
            let image = self.image(suffix);
            FlashImage {
                role,
                bitstream: substitute_build_name(&image.bitstream, build_name),
                file: substitute_build_name(&image.file, build_name),
            }
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::flatten;

    #[test]
    fn post_build_sequence_is_exact() {
        let steps = MultibootLayout::quad_spi_16mb().post_build_steps();
        assert_eq!(steps.len(), 6);
        let lines = flatten(&steps);
        assert_eq!(
            lines,
            vec![
                "write_cfgmem -force -format bin -interface spix4 -size 16 -loadbit \"up 0x0 {build_name}.bit\" -file {build_name}.bin",
                "set_property BITSTREAM.CONFIG.TIMER_CFG 0x0001fbd0 [current_design]",
                "set_property BITSTREAM.CONFIG.CONFIGFALLBACK Enable [current_design]",
                "write_bitstream -force {build_name}_operational.bit ",
                "write_cfgmem -force -format bin -interface spix4 -size 16 -loadbit \"up 0x0 {build_name}_operational.bit\" -file {build_name}_operational.bin",
                "set_property BITSTREAM.CONFIG.NEXT_CONFIG_ADDR 0x00400000 [current_design]",
                "write_bitstream -force {build_name}_fallback.bit ",
                "write_cfgmem -force -format bin -interface spix4 -size 16 -loadbit \"up 0x0 {build_name}_fallback.bit\" -file {build_name}_fallback.bin",
            ]
        );
    }

    #[test]
    fn images_for_build() {
        let images = MultibootLayout::quad_spi_16mb().images("timecard");
        assert_eq!(images.len(), 3);
        assert_eq!(images[0].role, ImageRole::Primary);
        assert_eq!(images[0].file, "timecard.bin");
        assert_eq!(images[1].bitstream, "timecard_operational.bit");
        assert_eq!(images[2].file, "timecard_fallback.bin");
    }
}
