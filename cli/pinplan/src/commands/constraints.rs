//! `pinplan constraints`: finalize a design against a board and emit XDC.

use std::path::Path;

use anyhow::{Context, Result};
use pinplan_platform::parse::ensure_valid;
use pinplan_platform::xdc::render_xdc;
use pinplan_platform::{Design, ResourceId};

use crate::commands::{load_board, write_output};
use crate::manifest::{parse_request, PinplanManifest};

/// Render the XDC constraints of the requested resources.
///
/// `requests` on the command line replace the manifest's `[design]` list.
/// With neither, only the board's default clock is requested.
pub fn run(
    project_dir: &Path,
    manifest: Option<&PinplanManifest>,
    board: Option<&str>,
    toolchain: Option<&str>,
    requests: &[String],
    output: Option<&Path>,
) -> Result<()> {
    let descriptor = load_board(project_dir, manifest, board, toolchain)?;
    ensure_valid(&descriptor)?;

    let mut resources: Vec<ResourceId> = if !requests.is_empty() {
        requests
            .iter()
            .map(String::as_str)
            .map(parse_request)
            .collect::<Result<_>>()?
    } else {
        match manifest {
            Some(m) => m.requests()?,
            None => Vec::new(),
        }
    };
    if resources.is_empty() {
        resources.push(ResourceId::new(&descriptor.default_clock.name, 0));
    }

    let design_name = manifest.map(|m| m.build_name()).unwrap_or("top");
    let design = resources
        .iter()
        .fold(Design::new(design_name), |design, r| design.request(&r.name, r.index));
    tracing::debug!(
        design = design_name,
        requests = design.requested().count(),
        "finalizing design"
    );

    let constraints = descriptor
        .finalize(&design)
        .with_context(|| format!("finalizing '{design_name}' for board '{}'", descriptor.name))?;
    write_output(output, &render_xdc(&constraints))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_is_the_clock() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("build/top.xdc");
        run(dir.path(), None, None, None, &[], Some(&out)).unwrap();

        let xdc = std::fs::read_to_string(&out).unwrap();
        assert!(xdc.contains("set_property LOC R4 [get_ports {clk200_p}]"));
        assert!(xdc.contains("create_clock -name clk200_p -period 5.000 [get_ports {clk200_p}]"));
    }

    #[test]
    fn command_line_requests_replace_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = PinplanManifest::from_str(
            "[project]\nname = \"p\"\n[design]\nrequests = [\"clk200:0\", \"pcie_x1\"]\n",
        )
        .unwrap();
        let out = dir.path().join("p.xdc");
        let requests = vec!["clk200".to_string(), "user_led:1".to_string()];
        run(dir.path(), Some(&manifest), None, None, &requests, Some(&out)).unwrap();

        let xdc = std::fs::read_to_string(&out).unwrap();
        assert!(xdc.contains("[get_ports {user_led1}]"));
        assert!(!xdc.contains("pcie_x1"));
    }

    #[test]
    fn repeated_request_reaches_second_sma_group() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sma.xdc");
        let requests: Vec<String> = ["clk200", "sma:2", "sma:2"].map(String::from).to_vec();
        run(dir.path(), None, None, None, &requests, Some(&out)).unwrap();

        let xdc = std::fs::read_to_string(&out).unwrap();
        assert!(xdc.contains("set_property LOC AA21 [get_ports {sma2_in}]"));
        assert!(xdc.contains("set_property LOC AA20 [get_ports {sma2_1_in}]"));

        let too_many: Vec<String> = ["clk200", "sma:2", "sma:2", "sma:2"].map(String::from).to_vec();
        assert!(run(dir.path(), None, None, None, &too_many, None).is_err());
    }

    #[test]
    fn missing_clock_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let requests = vec!["user_led:0".to_string()];
        let err = run(dir.path(), None, None, None, &requests, None).unwrap_err();
        assert!(format!("{err:#}").contains("clk200"));
    }

    #[test]
    fn unknown_resource_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let requests = vec!["clk200:0".to_string(), "sma:7".to_string()];
        assert!(run(dir.path(), None, None, None, &requests, None).is_err());
    }
}
