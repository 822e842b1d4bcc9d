//! Pin constraint model.
//!
//! A [`PinConstraint`] binds one logical resource (a name plus an instance
//! index) to package pins. Composite resources carry named [`SubSignal`]s,
//! each with its own pins; an I/O standard or attribute given on the group
//! applies to every sub-signal that does not override it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a resource within a platform: `name:index`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceId {
    /// Logical signal name (e.g., "user_led").
    pub name: String,
    /// Instance ordinal.
    pub index: u32,
}

impl ResourceId {
    /// Create a resource identity.
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    /// Parse a `name:index` reference. A bare `name` means index 0.
    pub fn parse(s: &str) -> Option<Self> {
        match s.rsplit_once(':') {
            Some((name, index)) if !name.is_empty() => {
                let index = index.parse().ok()?;
                Some(Self::new(name, index))
            }
            Some(_) => None,
            None if !s.is_empty() => Some(Self::new(s, 0)),
            None => None,
        }
    }

    /// Top-level port name used for this resource in generated constraints.
    ///
    /// The first instance keeps the bare name; later instances get the index
    /// appended (`user_led`, `user_led1`, ...).
    pub fn port_base(&self) -> String {
        if self.index == 0 {
            self.name.clone()
        } else {
            format!("{}{}", self.name, self.index)
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.index)
    }
}

/// A named group of pins inside a composite resource (e.g. `p`/`n` of a
/// differential clock, `mosi`/`miso` of a flash bus).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubSignal {
    /// Sub-signal name.
    pub name: String,
    /// Package pins, most significant bit last.
    pub pins: Vec<String>,
    /// I/O standard override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_standard: Option<String>,
    /// Vendor attributes as `KEY=VALUE`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub misc: Vec<String>,
}

impl SubSignal {
    /// Create a sub-signal from a space-separated pin list.
    pub fn new(name: impl Into<String>, pins: &str) -> Self {
        Self {
            name: name.into(),
            pins: split_pins(pins),
            io_standard: None,
            misc: Vec::new(),
        }
    }

    /// Set the I/O standard, overriding the group's.
    pub fn io_standard(mut self, standard: impl Into<String>) -> Self {
        self.io_standard = Some(standard.into());
        self
    }

    /// Add a `KEY=VALUE` vendor attribute.
    pub fn misc(mut self, attribute: impl Into<String>) -> Self {
        self.misc.push(attribute.into());
        self
    }
}

/// One physical-to-logical binding in a platform's IO table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PinConstraint {
    /// Logical signal name; not unique on its own.
    pub signal_name: String,
    /// Instance ordinal distinguishing entries that share `signal_name`.
    pub index: u32,
    /// Top-level pins, order-significant for buses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pins: Vec<String>,
    /// Group I/O standard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_standard: Option<String>,
    /// Group vendor attributes as `KEY=VALUE`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub misc: Vec<String>,
    /// Named sub-pins of a composite signal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsignals: Vec<SubSignal>,
}

/// A single package pin bound to a single top-level port, with the
/// electrical settings that apply to it after group inheritance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PinAssignment {
    /// Port name (e.g., `clk200_p`, `pmod[3]`).
    pub port: String,
    /// Package pin.
    pub pin: String,
    /// Effective I/O standard.
    pub io_standard: Option<String>,
    /// Effective vendor attributes.
    pub misc: Vec<String>,
}

impl PinConstraint {
    /// Create an entry with no pins bound yet.
    pub fn new(signal_name: impl Into<String>, index: u32) -> Self {
        Self {
            signal_name: signal_name.into(),
            index,
            pins: Vec::new(),
            io_standard: None,
            misc: Vec::new(),
            subsignals: Vec::new(),
        }
    }

    /// Set the top-level pins from a space-separated list.
    pub fn pins(mut self, pins: &str) -> Self {
        self.pins = split_pins(pins);
        self
    }

    /// Set the group I/O standard.
    pub fn io_standard(mut self, standard: impl Into<String>) -> Self {
        self.io_standard = Some(standard.into());
        self
    }

    /// Add a group `KEY=VALUE` vendor attribute.
    pub fn misc(mut self, attribute: impl Into<String>) -> Self {
        self.misc.push(attribute.into());
        self
    }

    /// Append a named sub-signal.
    pub fn subsignal(mut self, subsignal: SubSignal) -> Self {
        self.subsignals.push(subsignal);
        self
    }

    /// The `name:index` identity of this entry.
    pub fn id(&self) -> ResourceId {
        ResourceId::new(&self.signal_name, self.index)
    }

    /// Look up a sub-signal by name.
    pub fn subsignal_named(&self, name: &str) -> Option<&SubSignal> {
        self.subsignals.iter().find(|s| s.name == name)
    }

    /// Whether this resource is a differential pair (`p`/`n` sub-signals).
    pub fn is_differential(&self) -> bool {
        self.subsignal_named("p").is_some() && self.subsignal_named("n").is_some()
    }

    /// Every package pin this entry binds, in table order.
    pub fn all_pins(&self) -> impl Iterator<Item = &str> {
        self.pins
            .iter()
            .chain(self.subsignals.iter().flat_map(|s| s.pins.iter()))
            .map(String::as_str)
    }

    /// Port that carries the clock when this resource, bound to net `base`,
    /// is used as one: the positive leg of a differential pair, otherwise
    /// the resource itself.
    pub fn clock_port_as(&self, base: &str) -> String {
        if self.is_differential() {
            format!("{base}_p")
        } else if self.pins.is_empty() {
            match self.subsignals.first() {
                Some(sub) => format!("{base}_{}", sub.name),
                None => base.to_string(),
            }
        } else {
            base.to_string()
        }
    }

    /// Flatten into per-pin assignments for a resource bound to net `base`,
    /// with inherited settings resolved.
    pub fn assignments_as(&self, base: &str) -> Vec<PinAssignment> {
        let mut out = Vec::new();
        push_assignments(
            &mut out,
            base,
            &self.pins,
            self.io_standard.as_ref(),
            &self.misc,
        );
        for sub in &self.subsignals {
            let io_standard = sub.io_standard.as_ref().or(self.io_standard.as_ref());
            let mut misc = self.misc.clone();
            misc.extend(sub.misc.iter().cloned());
            push_assignments(
                &mut out,
                &format!("{base}_{}", sub.name),
                &sub.pins,
                io_standard,
                &misc,
            );
        }
        out
    }
}

fn push_assignments(
    out: &mut Vec<PinAssignment>,
    port: &str,
    pins: &[String],
    io_standard: Option<&String>,
    misc: &[String],
) {
    let bus = pins.len() > 1;
    for (bit, pin) in pins.iter().enumerate() {
        out.push(PinAssignment {
            port: if bus {
                format!("{port}[{bit}]")
            } else {
                port.to_string()
            },
            pin: pin.clone(),
            io_standard: io_standard.cloned(),
            misc: misc.to_vec(),
        });
    }
}

fn split_pins(pins: &str) -> Vec<String> {
    pins.split_whitespace().map(str::to_string).collect()
}

/// Split a `KEY=VALUE` attribute. Attributes without `=` are flags and map to `TRUE`.
pub fn split_attribute(attribute: &str) -> (&str, &str) {
    match attribute.split_once('=') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (attribute.trim(), "TRUE"),
    }
}
