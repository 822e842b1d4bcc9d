//! Platform descriptor.
//!
//! Aggregates a board's IO table, target device, default clock, toolchain
//! command sequences and programmer backends into one immutable record.
//! Finalizing a design against the descriptor yields a new
//! [`ConstraintSet`]; the descriptor itself is never modified.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::command::{self, ToolchainStep};
use crate::design::{ConstraintSet, Design, PeriodConstraint};
use crate::error::{PlatformError, Result};
use crate::multiboot::MultibootLayout;
use crate::pins::PinConstraint;
use crate::programmer::{Programmer, ProgrammerKind};

/// Default reference clock of a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DefaultClock {
    /// Resource name of the clock in the IO table.
    pub name: String,
    /// Period in nanoseconds.
    pub period_ns: f64,
}

impl DefaultClock {
    /// Period constraint for this clock entering on `port`.
    pub fn constraint_on(&self, port: impl Into<String>) -> PeriodConstraint {
        PeriodConstraint {
            clock: self.name.clone(),
            port: port.into(),
            period_ns: self.period_ns,
        }
    }
}

/// A complete board description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformDescriptor {
    /// Board name (e.g., "ocp-tap-timecard").
    pub name: String,
    /// Toolchain that will consume this description. Not validated here.
    pub toolchain: String,
    /// Exact part number including package and speed grade.
    pub device_id: String,
    /// Default reference clock.
    pub default_clock: DefaultClock,
    /// Configuration flash multiboot policy.
    pub flash: MultibootLayout,
    /// Supported programmer backends.
    pub programmers: Vec<Programmer>,
    /// IO table, in declaration order.
    pub io: Vec<PinConstraint>,
    /// Steps applied before any bitstream is generated.
    pub bitstream_commands: Vec<ToolchainStep>,
    /// Steps run after the primary bitstream exists.
    pub post_build_commands: Vec<ToolchainStep>,
}

impl PlatformDescriptor {
    /// First IO table entry matching `name:index`.
    pub fn lookup(&self, name: &str, index: u32) -> Option<&PinConstraint> {
        self.io
            .iter()
            .find(|c| c.signal_name == name && c.index == index)
    }

    /// Every IO table entry named `name`, in table order.
    pub fn resources<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PinConstraint> + 'a {
        self.io.iter().filter(move |c| c.signal_name == name)
    }

    /// Pre-bitstream directive lines, `{build_name}` left in place.
    pub fn bitstream_directives(&self) -> Vec<String> {
        command::flatten(&self.bitstream_commands)
    }

    /// Post-build directive lines, `{build_name}` left in place.
    pub fn post_build_directives(&self) -> Vec<String> {
        command::flatten(&self.post_build_commands)
    }

    /// Resolve a programmer backend.
    pub fn create_programmer(&self, kind: ProgrammerKind) -> Result<Programmer> {
        self.programmers
            .iter()
            .find(|p| p.kind() == kind)
            .cloned()
            .ok_or_else(|| PlatformError::UnsupportedProgrammer {
                name: kind.name().to_string(),
            })
    }

    /// Resolve a programmer backend by name (`"openocd"` or `"vivado"`).
    pub fn select_programmer(&self, name: &str) -> Result<Programmer> {
        let kind: ProgrammerKind = name.parse()?;
        debug!(programmer = %kind, board = %self.name, "selecting programmer");
        self.create_programmer(kind)
    }

    /// Bind every resource `design` requested to its pins.
    ///
    /// Each request claims the first table entry with its identity that no
    /// earlier request claimed, so a duplicated identity binds its entries in
    /// table order. Requesting more instances than the table holds fails with
    /// [`PlatformError::ResourceExhausted`].
    pub fn bind_requests(&self, design: &Design) -> Result<ConstraintSet> {
        let mut constraints = ConstraintSet::default();
        let mut claimed = vec![false; self.io.len()];
        for signal in &design.signals {
            let Some(origin) = &signal.origin else {
                continue;
            };
            let is_origin =
                |c: &PinConstraint| c.signal_name == origin.name && c.index == origin.index;
            let position = self
                .io
                .iter()
                .enumerate()
                .position(|(i, c)| !claimed[i] && is_origin(c));
            let Some(position) = position else {
                let available = self.io.iter().filter(|&c| is_origin(c)).count();
                return Err(if available == 0 {
                    PlatformError::UnknownResource {
                        name: origin.name.clone(),
                        index: origin.index,
                    }
                } else {
                    PlatformError::ResourceExhausted {
                        name: origin.name.clone(),
                        index: origin.index,
                        available,
                    }
                });
            };
            claimed[position] = true;
            debug!(resource = %origin, entry = position, net = %signal.net, "bound request");
            constraints
                .pins
                .extend(self.io[position].assignments_as(&signal.net));
        }
        Ok(constraints)
    }

    /// Finalize `design`: bind its requested resources, then add a period
    /// constraint on the default clock.
    ///
    /// The clock is looked up loosely so that a renamed or merged clock net
    /// still resolves. Fails with [`PlatformError::MissingClockConstraint`]
    /// when nothing resolves to it.
    pub fn finalize(&self, design: &Design) -> Result<ConstraintSet> {
        let base = self.bind_requests(design)?;
        let clock = &self.default_clock;
        let signal = design.lookup_request(&clock.name, true).ok_or_else(|| {
            PlatformError::MissingClockConstraint {
                clock: clock.name.clone(),
            }
        })?;
        let port = match &signal.origin {
            Some(origin) => self
                .lookup(&origin.name, origin.index)
                .map(|c| c.clock_port_as(&signal.net))
                .unwrap_or_else(|| signal.net.clone()),
            None => signal.net.clone(),
        };
        let period = clock.constraint_on(port);
        info!(
            design = %design.name,
            clock = %period.clock,
            port = %period.port,
            period_ns = period.period_ns,
            frequency_mhz = period.frequency_mhz(),
            "finalized design"
        );
        Ok(base.with_period(period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> PlatformDescriptor {
        PlatformDescriptor::ocp_tap_timecard("vivado")
    }

    #[test]
    fn lookup_first_match() {
        let p = board();
        let sma = p.lookup("sma", 2).unwrap();
        assert_eq!(sma.subsignal_named("in").unwrap().pins, vec!["AA21"]);
        assert!(p.lookup("sma", 3).is_none());
        assert_eq!(p.resources("sma").count(), 4);
    }

    #[test]
    fn select_known_programmers() {
        let p = board();
        assert_eq!(
            p.select_programmer("openocd").unwrap(),
            Programmer::OpenOcd {
                config: "openocd_xc7_ft232.cfg".into(),
                flash_proxy: "bscan_spi_xc7a200t.bit".into(),
            }
        );
        assert_eq!(
            p.select_programmer("vivado").unwrap(),
            Programmer::Vivado {
                flash_part: "s25fl256sxxxxxx0-spi-x1_x2_x4".into(),
            }
        );
    }

    #[test]
    fn select_bogus_programmer() {
        let err = board().select_programmer("bogus").unwrap_err();
        assert!(matches!(err, PlatformError::UnsupportedProgrammer { .. }));
    }

    #[test]
    fn create_programmer_missing_backend() {
        let mut p = board();
        p.programmers.retain(|p| p.kind() == ProgrammerKind::OpenOcd);
        let err = p.create_programmer(ProgrammerKind::Vivado).unwrap_err();
        assert!(matches!(err, PlatformError::UnsupportedProgrammer { ref name } if name == "vivado"));
    }

    #[test]
    fn finalize_adds_clock_period() {
        let design = Design::new("top").request("clk200", 0).request("user_led", 1);
        let constraints = board().finalize(&design).unwrap();
        let period = constraints.period_for("clk200").unwrap();
        assert_eq!(period.period_ns, 5.0);
        assert_eq!(period.port, "clk200_p");
        assert!(constraints
            .pins
            .iter()
            .any(|a| a.port == "user_led1" && a.pin == "C13"));
        assert!(constraints
            .pins
            .iter()
            .any(|a| a.port == "clk200_n" && a.pin == "T4"));
    }

    #[test]
    fn finalize_follows_renamed_clock() {
        let design = Design::new("top")
            .request("clk200", 0)
            .rename_net("clk200", "sys_clk");
        let constraints = board().finalize(&design).unwrap();
        assert_eq!(constraints.period_for("clk200").unwrap().port, "sys_clk_p");
        assert!(constraints.pins.iter().any(|a| a.port == "sys_clk_p" && a.pin == "R4"));
    }

    #[test]
    fn finalize_accepts_merged_net() {
        let design = Design::new("top").net("clk200_p");
        let constraints = board().finalize(&design).unwrap();
        assert_eq!(constraints.period_for("clk200").unwrap().port, "clk200_p");
        assert!(constraints.pins.is_empty());
    }

    #[test]
    fn finalize_without_clock_fails() {
        let design = Design::new("top").request("clk125", 0).request("user_led", 0);
        let err = board().finalize(&design).unwrap_err();
        assert!(matches!(err, PlatformError::MissingClockConstraint { ref clock } if clock == "clk200"));
    }

    #[test]
    fn finalize_unknown_resource_fails() {
        let design = Design::new("top").request("clk200", 0).request("sma", 3);
        let err = board().finalize(&design).unwrap_err();
        assert!(matches!(err, PlatformError::UnknownResource { index: 3, .. }));
    }

    #[test]
    fn repeated_request_binds_next_entry() {
        let design = Design::new("top")
            .request("clk200", 0)
            .request("sma", 2)
            .request("sma", 2);
        let constraints = board().finalize(&design).unwrap();
        let pin_of = |port: &str| {
            constraints
                .pins
                .iter()
                .find(|a| a.port == port)
                .map(|a| a.pin.as_str())
        };
        assert_eq!(pin_of("sma2_in"), Some("AA21"));
        assert_eq!(pin_of("sma2_1_in"), Some("AA20"));
        assert_eq!(pin_of("sma2_1_out_en"), Some("M13"));
    }

    #[test]
    fn exhausted_request_fails() {
        let design = Design::new("top")
            .request("clk200", 0)
            .request("user_led", 0)
            .request("user_led", 0);
        let err = board().bind_requests(&design).unwrap_err();
        assert!(matches!(
            err,
            PlatformError::ResourceExhausted { ref name, index: 0, available: 1 } if name == "user_led"
        ));

        let three_smas = Design::new("top")
            .request("sma", 2)
            .request("sma", 2)
            .request("sma", 2);
        let err = board().bind_requests(&three_smas).unwrap_err();
        assert!(matches!(err, PlatformError::ResourceExhausted { available: 2, .. }));
    }

    #[test]
    fn finalize_puts_period_on_positive_leg() {
        let design = Design::new("top").net("clk200_n").net("clk200_p");
        let constraints = board().finalize(&design).unwrap();
        let period = constraints.period_for("clk200").unwrap();
        assert_eq!(period.port, "clk200_p");
        assert_eq!(period.frequency_mhz(), 200.0);
    }

    #[test]
    fn finalize_leaves_descriptor_untouched() {
        let p = board();
        let before = p.clone();
        let _ = p.finalize(&Design::new("top").request("clk200", 0)).unwrap();
        assert_eq!(p, before);
    }
}
