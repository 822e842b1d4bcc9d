//! Tcl build script rendering.
//!
//! Produces the tail of a Vivado batch script: bitstream settings, the
//! primary `write_bitstream`, then the post-build directives. Project setup,
//! synthesis and implementation are the toolchain driver's business.

use std::fmt::Write;

use crate::command::substitute_build_name;
use crate::platform::PlatformDescriptor;

/// Render the bitstream-generation script for `build_name`.
pub fn render_build_script(descriptor: &PlatformDescriptor, build_name: &str) -> String {
    let mut tcl = String::new();
    let _ = writeln!(tcl, "# {} ({})", descriptor.name, descriptor.device_id);
    tcl.push('\n');

    tcl.push_str("# Bitstream settings\n");
    for line in descriptor.bitstream_directives() {
        let _ = writeln!(tcl, "{}", substitute_build_name(&line, build_name));
    }
    tcl.push('\n');

    tcl.push_str("# Primary bitstream\n");
    let _ = writeln!(tcl, "write_bitstream -force {build_name}.bit");

    if !descriptor.post_build_commands.is_empty() {
        tcl.push('\n');
        tcl.push_str("# Post-build images\n");
        for step in &descriptor.post_build_commands {
            for line in step.render(build_name) {
                let _ = writeln!(tcl, "{line}");
            }
        }
    }

    tcl
}
