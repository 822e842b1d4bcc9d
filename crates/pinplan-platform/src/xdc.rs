//! Xilinx Design Constraints (XDC) rendering.

use std::fmt::Write;

use crate::design::ConstraintSet;
use crate::pins::split_attribute;

/// Render `constraints` as XDC.
pub fn render_xdc(constraints: &ConstraintSet) -> String {
    let mut xdc = String::new();

    if !constraints.pins.is_empty() {
        xdc.push_str("# IO constraints\n");
    }
    for a in &constraints.pins {
        let _ = writeln!(xdc, "set_property LOC {} [get_ports {{{}}}]", a.pin, a.port);
        if let Some(io_standard) = &a.io_standard {
            let _ = writeln!(
                xdc,
                "set_property IOSTANDARD {io_standard} [get_ports {{{}}}]",
                a.port
            );
        }
        for attribute in &a.misc {
            let (key, value) = split_attribute(attribute);
            let _ = writeln!(xdc, "set_property {key} {value} [get_ports {{{}}}]", a.port);
        }
    }

    if !constraints.periods.is_empty() {
        if !xdc.is_empty() {
            xdc.push('\n');
        }
        xdc.push_str("# Clock constraints\n");
    }
    for p in &constraints.periods {
        let _ = writeln!(
            xdc,
            "create_clock -name {} -period {:.3} [get_ports {{{}}}]",
            p.port, p.period_ns, p.port
        );
    }

    xdc
}
