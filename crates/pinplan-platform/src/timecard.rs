//! OCP TAP Time Card carrier board (Alinx AC7100B Artix-7 SoM).
//!
//! The board pins out a 125 MHz and a 200 MHz differential clock, LEDs and
//! buttons, the quad-SPI configuration flash, a PCIe x1 link, I2C, a PMOD,
//! two GPS receivers and four SMA timing I/O groups.

use crate::command::BitstreamConfig;
use crate::multiboot::MultibootLayout;
use crate::pins::{PinConstraint, SubSignal};
use crate::platform::{DefaultClock, PlatformDescriptor};
use crate::programmer::Programmer;

/// Board name used by the built-in registry.
pub const BOARD_NAME: &str = "ocp-tap-timecard";

/// Target part.
pub const DEVICE_ID: &str = "xc7a100t-fgg484-2";

/// Toolchain assumed when none is given.
pub const DEFAULT_TOOLCHAIN: &str = "vivado";

fn single(name: &str, index: u32, pins: &str, io_standard: &str) -> PinConstraint {
    PinConstraint::new(name, index).pins(pins).io_standard(io_standard)
}

fn differential(name: &str, p: &str, n: &str, io_standard: &str) -> PinConstraint {
    PinConstraint::new(name, 0)
        .subsignal(SubSignal::new("p", p).io_standard(io_standard))
        .subsignal(SubSignal::new("n", n).io_standard(io_standard))
}

fn gps(index: u32, rst_n: &str, tx: &str, rx: &str, tp: &str) -> PinConstraint {
    PinConstraint::new("gps", index)
        .subsignal(SubSignal::new("rst_n", rst_n))
        .subsignal(SubSignal::new("tx", tx))
        .subsignal(SubSignal::new("rx", rx))
        .subsignal(SubSignal::new("tp", tp))
        .io_standard("LVCMOS33")
}

fn sma(index: u32, input: &str, in_en: &str, output: &str, out_en: &str) -> PinConstraint {
    PinConstraint::new("sma", index)
        .subsignal(
            SubSignal::new("in", input)
                .io_standard("LVCMOS33")
                .misc("PULLDOWN=TRUE"),
        )
        .subsignal(SubSignal::new("in_en", in_en).io_standard("LVCMOS33"))
        .subsignal(
            SubSignal::new("out", output)
                .io_standard("LVCMOS33")
                .misc("DRIVE=16"),
        )
        .subsignal(SubSignal::new("out_en", out_en).io_standard("LVCMOS33"))
}

/// The board's IO table, in declaration order.
pub fn io() -> Vec<PinConstraint> {
    vec![
        // Clk / Rst.
        differential("clk125", "F6", "E6", "DIFF_SSTL15"),
        differential("clk200", "R4", "T4", "DIFF_SSTL15"),
        single("rst_n", 0, "T6", "LVCMOS15"),
        // Leds.
        single("user_led", 0, "B13", "LVCMOS33"),
        single("user_led", 1, "C13", "LVCMOS33"),
        single("user_led", 2, "D14", "LVCMOS33"),
        single("user_led", 3, "D15", "LVCMOS33"),
        // Buttons.
        single("user_btn", 0, "J21", "LVCMOS33"),
        single("user_btn", 1, "E13", "LVCMOS33"),
        // SPIFlash.
        single("flash_cs_n", 0, "T19", "LVCMOS33"),
        PinConstraint::new("flash", 0)
            .subsignal(SubSignal::new("mosi", "P22"))
            .subsignal(SubSignal::new("miso", "R22"))
            .subsignal(SubSignal::new("wp", "P21"))
            .subsignal(SubSignal::new("hold", "R21"))
            .io_standard("LVCMOS33"),
        // PCIe.
        PinConstraint::new("pcie_x1", 0)
            .subsignal(
                SubSignal::new("rst_n", "J20")
                    .io_standard("LVCMOS33")
                    .misc("PULLUP=TRUE"),
            )
            .subsignal(SubSignal::new("clk_p", "F10"))
            .subsignal(SubSignal::new("clk_n", "E10"))
            .subsignal(SubSignal::new("rx_p", "D11"))
            .subsignal(SubSignal::new("rx_n", "C11"))
            .subsignal(SubSignal::new("tx_p", "D5"))
            .subsignal(SubSignal::new("tx_n", "C5")),
        // Leds.
        single("led", 0, "E21", "LVCMOS33"),
        single("led", 1, "D21", "LVCMOS33"),
        single("led", 2, "E22", "LVCMOS33"),
        single("led", 3, "D22", "LVCMOS33"),
        // I2C.
        PinConstraint::new("i2c", 0)
            .subsignal(SubSignal::new("scl", "N17").misc("PULLUP=True"))
            .subsignal(SubSignal::new("sda", "T16").misc("PULLUP=True"))
            .io_standard("LVCMOS33"),
        // PMOD.
        single("pmod", 0, "M22 N22 H18 H17 H22 J22 K21 K22", "LVCMOS33"),
        // GPS.
        gps(0, "Y16", "P20", "N15", "W14 Y14"),
        gps(1, "G15", "M17", "J16", "G17 G18"),
        // SMAs.
        sma(0, "Y11", "H15", "W11", "J15"),
        sma(1, "Y12", "J14", "W12", "H14"),
        sma(2, "AA21", "K14", "V10", "K13"),
        // FIXME: the fourth SMA group shares index 2 with the third. Confirm
        // against the board schematic before renumbering it to 3.
        sma(2, "AA20", "L13", "W10", "M13"),
    ]
}

impl PlatformDescriptor {
    /// Construct the Time Card description for `toolchain`.
    ///
    /// Any toolchain name is accepted; an unsupported one is reported by the
    /// toolchain that consumes the description.
    pub fn ocp_tap_timecard(toolchain: impl Into<String>) -> Self {
        let flash = MultibootLayout::quad_spi_16mb();
        let post_build_commands = flash.post_build_steps();
        Self {
            name: BOARD_NAME.into(),
            toolchain: toolchain.into(),
            device_id: DEVICE_ID.into(),
            default_clock: DefaultClock {
                name: "clk200".into(),
                period_ns: 1e9 / 200e6,
            },
            flash,
            programmers: vec![
                Programmer::OpenOcd {
                    config: "openocd_xc7_ft232.cfg".into(),
                    flash_proxy: "bscan_spi_xc7a200t.bit".into(),
                },
                // Some board revisions carry an s25fl128s instead.
                Programmer::Vivado {
                    flash_part: "s25fl256sxxxxxx0-spi-x1_x2_x4".into(),
                },
            ],
            io: io(),
            bitstream_commands: BitstreamConfig::quad_spi_3v3().steps(),
            post_build_commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn device_is_fixed_for_any_toolchain() {
        for toolchain in ["vivado", "symbiflow", "yosys+nextpnr", ""] {
            let p = PlatformDescriptor::ocp_tap_timecard(toolchain);
            assert_eq!(p.device_id, "xc7a100t-fgg484-2");
            assert_eq!(p.toolchain, toolchain);
        }
    }

    #[test]
    fn default_clock_is_200mhz() {
        let p = PlatformDescriptor::ocp_tap_timecard(DEFAULT_TOOLCHAIN);
        assert_eq!(p.default_clock.name, "clk200");
        assert_eq!(p.default_clock.period_ns, 1e9 / 200e6);
        assert_eq!(p.default_clock.period_ns, 5.0);
        assert!(p.lookup("clk200", 0).is_some());
    }

    #[test]
    fn command_sequences_have_fixed_length() {
        let p = PlatformDescriptor::ocp_tap_timecard(DEFAULT_TOOLCHAIN);
        assert_eq!(p.bitstream_commands.len(), 5);
        assert_eq!(p.post_build_commands.len(), 6);
        assert_eq!(p.post_build_directives().len(), 8);
        assert_eq!(
            p.bitstream_directives()[0],
            "set_property BITSTREAM.CONFIG.SPI_BUSWIDTH 4 [current_design]"
        );
        assert_eq!(
            p.post_build_directives()[5],
            "set_property BITSTREAM.CONFIG.NEXT_CONFIG_ADDR 0x00400000 [current_design]"
        );
    }

    #[test]
    fn no_pin_is_bound_twice() {
        let table = io();
        let mut owner: HashMap<&str, usize> = HashMap::new();
        for (position, c) in table.iter().enumerate() {
            for pin in c.all_pins() {
                if let Some(prev) = owner.insert(pin, position) {
                    panic!("pin {pin} bound by {} and {}", table[prev].id(), c.id());
                }
            }
        }
        assert_eq!(owner.len(), 63);
    }

    #[test]
    fn duplicate_sma_index_is_preserved() {
        let table = io();
        let sma2: Vec<_> = table
            .iter()
            .filter(|c| c.signal_name == "sma" && c.index == 2)
            .collect();
        assert_eq!(sma2.len(), 2);
        assert_eq!(sma2[1].subsignal_named("in").unwrap().pins, vec!["AA20"]);
        assert!(!table.iter().any(|c| c.signal_name == "sma" && c.index == 3));
    }

    #[test]
    fn pcie_reset_has_pullup() {
        let table = io();
        let pcie = table.iter().find(|c| c.signal_name == "pcie_x1").unwrap();
        let rst = pcie.subsignal_named("rst_n").unwrap();
        assert_eq!(rst.io_standard.as_deref(), Some("LVCMOS33"));
        assert_eq!(rst.misc, vec!["PULLUP=TRUE".to_string()]);
        assert!(pcie.subsignal_named("tx_p").unwrap().io_standard.is_none());
    }
}
