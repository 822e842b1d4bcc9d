//! Elaborated-design model consumed by platform finalization.
//!
//! A [`Design`] records which platform resources the gateware requested and
//! which net names they ended up on. Elaboration may rename nets or merge
//! them so that the originating resource is no longer known; clock lookup
//! therefore falls back to net names.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pins::{PinAssignment, ResourceId};

/// A top-level signal of an elaborated design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DesignSignal {
    /// Net name after elaboration.
    pub net: String,
    /// Resource the signal was requested from, if still known.
    pub origin: Option<ResourceId>,
}

/// An elaborated design, as far as the platform needs to know it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Design {
    /// Output name; substituted for `{build_name}`.
    pub name: String,
    /// Requested signals, in request order.
    pub signals: Vec<DesignSignal>,
}

impl Design {
    /// Create a design with no requests.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signals: Vec::new(),
        }
    }

    /// Request a platform resource; its net takes the resource's port name.
    ///
    /// Each request claims the next unclaimed table entry with that identity.
    /// Repeat requests get a numbered net (`sma2`, `sma2_1`, ...).
    pub fn request(mut self, name: &str, index: u32) -> Self {
        let origin = ResourceId::new(name, index);
        let repeat = self
            .signals
            .iter()
            .filter(|s| s.origin.as_ref() == Some(&origin))
            .count();
        let net = match repeat {
            0 => origin.port_base(),
            n => format!("{}_{n}", origin.port_base()),
        };
        self.signals.push(DesignSignal {
            net,
            origin: Some(origin),
        });
        self
    }

    /// Add a net whose originating resource is unknown.
    pub fn net(mut self, net: impl Into<String>) -> Self {
        self.signals.push(DesignSignal {
            net: net.into(),
            origin: None,
        });
        self
    }

    /// Rename every net called `from`.
    pub fn rename_net(mut self, from: &str, to: &str) -> Self {
        for signal in self.signals.iter_mut().filter(|s| s.net == from) {
            signal.net = to.to_string();
        }
        self
    }

    /// Resources this design requested, in order.
    pub fn requested(&self) -> impl Iterator<Item = &ResourceId> {
        self.signals.iter().filter_map(|s| s.origin.as_ref())
    }

    /// Find the signal carrying resource `name`.
    ///
    /// Strict lookup requires an exact origin match at index 0. Loose lookup
    /// accepts any index of `name`, then a net called `name`, then `name_p`,
    /// then any net prefixed by `name_` (renamed or merged during elaboration).
    pub fn lookup_request(&self, name: &str, loose: bool) -> Option<&DesignSignal> {
        let exact = ResourceId::new(name, 0);
        if let Some(found) = self.signals.iter().find(|s| s.origin.as_ref() == Some(&exact)) {
            return Some(found);
        }
        if !loose {
            return None;
        }
        let positive = format!("{name}_p");
        let prefix = format!("{name}_");
        let found = self
            .signals
            .iter()
            .find(|s| s.origin.as_ref().is_some_and(|o| o.name == name))
            .or_else(|| self.signals.iter().find(|s| s.net == name))
            .or_else(|| self.signals.iter().find(|s| s.net == positive))
            .or_else(|| self.signals.iter().find(|s| s.net.starts_with(&prefix)));
        if let Some(signal) = found {
            debug!(resource = name, net = %signal.net, "resolved loose request");
        }
        found
    }
}

/// A clock period constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PeriodConstraint {
    /// Clock resource name.
    pub clock: String,
    /// Port the clock enters on.
    pub port: String,
    /// Maximum period in nanoseconds.
    pub period_ns: f64,
}

impl PeriodConstraint {
    /// Clock frequency in MHz.
    pub fn frequency_mhz(&self) -> f64 {
        if self.period_ns > 0.0 {
            1000.0 / self.period_ns
        } else {
            0.0
        }
    }
}

/// Physical and timing constraints of a finalized design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConstraintSet {
    /// Pin bindings of every requested resource.
    pub pins: Vec<PinAssignment>,
    /// Clock period constraints.
    pub periods: Vec<PeriodConstraint>,
}

impl ConstraintSet {
    /// A new set with `period` appended; `self` is left untouched.
    pub fn with_period(&self, period: PeriodConstraint) -> Self {
        let mut next = self.clone();
        next.periods.push(period);
        next
    }

    /// Period constraint on `clock`, if any.
    pub fn period_for(&self, clock: &str) -> Option<&PeriodConstraint> {
        self.periods.iter().find(|p| p.clock == clock)
    }
}
