//! `pinplan.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use pinplan_platform::parse::{discover_boards, load_descriptor_toml, BOARD_FILE_SUFFIX};
use pinplan_platform::{timecard, PlatformDescriptor, ProgrammerKind, ResourceId};

/// Manifest file name.
pub const MANIFEST_FILE: &str = "pinplan.toml";

/// The top-level manifest structure for a pinplan project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinplanManifest {
    /// Project metadata (required).
    pub project: ProjectConfig,
    /// Board selection.
    #[serde(default)]
    pub board: Option<BoardConfig>,
    /// Programmer selection.
    #[serde(default)]
    pub programmer: Option<ProgrammerConfig>,
    /// Resources the gateware requests.
    #[serde(default)]
    pub design: Option<DesignConfig>,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required).
    pub name: String,
    /// Output name substituted for `{build_name}`; defaults to the project name.
    #[serde(default)]
    pub build_name: Option<String>,
    /// Build output directory, relative to the project.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
}

fn default_build_dir() -> String {
    "build".to_string()
}

/// Board section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Board name: built-in, or a `boards/<name>.board.toml` in the project.
    #[serde(default)]
    pub default: Option<String>,
    /// Toolchain the description is built for.
    #[serde(default)]
    pub toolchain: Option<String>,
}

/// Programmer section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgrammerConfig {
    /// Backend name ("openocd" or "vivado").
    #[serde(default)]
    pub name: Option<String>,
}

/// Design section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignConfig {
    /// Requested resources as `name:index`.
    #[serde(default)]
    pub requests: Vec<String>,
}

impl PinplanManifest {
    /// Search upward from `start_dir` for a `pinplan.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: PinplanManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                tracing::debug!(path = %candidate.display(), "loaded manifest");
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing pinplan.toml")
    }

    /// Output name for builds of this project.
    pub fn build_name(&self) -> &str {
        self.project
            .build_name
            .as_deref()
            .unwrap_or(&self.project.name)
    }

    /// Board named in `[board] default`.
    pub fn default_board(&self) -> Option<&str> {
        self.board.as_ref().and_then(|b| b.default.as_deref())
    }

    /// Toolchain named in `[board] toolchain`.
    pub fn toolchain(&self) -> Option<&str> {
        self.board.as_ref().and_then(|b| b.toolchain.as_deref())
    }

    /// Programmer named in `[programmer] name`.
    pub fn programmer(&self) -> Option<&str> {
        self.programmer.as_ref().and_then(|p| p.name.as_deref())
    }

    /// Requested resources, parsed.
    pub fn requests(&self) -> Result<Vec<ResourceId>> {
        let Some(design) = &self.design else {
            return Ok(Vec::new());
        };
        design
            .requests
            .iter()
            .map(String::as_str)
            .map(parse_request)
            .collect()
    }

    /// Generate the default template for `pinplan init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"

[board]
default = "{board}"
toolchain = "{toolchain}"

[programmer]
name = "{programmer}"

[design]
requests = ["clk200:0"]
"#,
            board = timecard::BOARD_NAME,
            toolchain = timecard::DEFAULT_TOOLCHAIN,
            programmer = ProgrammerKind::default(),
        )
    }
}

/// Parse a `name:index` resource reference.
pub fn parse_request(s: &str) -> Result<ResourceId> {
    match ResourceId::parse(s) {
        Some(id) => Ok(id),
        None => bail!("invalid resource reference '{s}' (expected name or name:index)"),
    }
}

/// Resolve a built-in board name to a description.
pub fn resolve_builtin(name: &str, toolchain: &str) -> Option<PlatformDescriptor> {
    match name {
        timecard::BOARD_NAME => Some(PlatformDescriptor::ocp_tap_timecard(toolchain)),
        _ => None,
    }
}

/// List all built-in board names.
pub fn builtin_boards() -> Vec<(&'static str, &'static str)> {
    vec![(
        timecard::BOARD_NAME,
        "OCP TAP Time Card (Artix-7 xc7a100t-fgg484-2, 200 MHz)",
    )]
}

/// Resolve a board by built-in name, project board file, or path.
pub fn resolve_board(
    name: &str,
    toolchain: &str,
    project_dir: Option<&Path>,
) -> Result<PlatformDescriptor> {
    if let Some(descriptor) = resolve_builtin(name, toolchain) {
        return Ok(descriptor);
    }
    if let Some(dir) = project_dir {
        let found = discover_boards(dir)?
            .into_iter()
            .find(|(board, _)| board == name);
        if let Some((_, path)) = found {
            return load_descriptor_toml(&path)
                .with_context(|| format!("loading {}", path.display()));
        }
    }
    let path = Path::new(name);
    if name.ends_with(BOARD_FILE_SUFFIX) && path.is_file() {
        return load_descriptor_toml(path).with_context(|| format!("loading {}", path.display()));
    }
    bail!("unknown board: '{name}'. Use 'pinplan board list' to see available boards.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_manifest() {
        let toml_str = r#"
[project]
name = "timecard-gateware"
build_name = "timecard"
build_dir = "out"

[board]
default = "ocp-tap-timecard"
toolchain = "vivado"

[programmer]
name = "vivado"

[design]
requests = ["clk200:0", "user_led:3", "pcie_x1"]
"#;
        let manifest = PinplanManifest::from_str(toml_str).unwrap();
        assert_eq!(manifest.project.name, "timecard-gateware");
        assert_eq!(manifest.build_name(), "timecard");
        assert_eq!(manifest.project.build_dir, "out");
        assert_eq!(manifest.default_board(), Some("ocp-tap-timecard"));
        assert_eq!(manifest.toolchain(), Some("vivado"));
        assert_eq!(manifest.programmer(), Some("vivado"));
        let requests = manifest.requests().unwrap();
        assert_eq!(requests[1], ResourceId::new("user_led", 3));
        assert_eq!(requests[2], ResourceId::new("pcie_x1", 0));
    }

    #[test]
    fn parse_minimal_manifest() {
        let manifest = PinplanManifest::from_str("[project]\nname = \"minimal\"\n").unwrap();
        assert_eq!(manifest.build_name(), "minimal");
        assert_eq!(manifest.project.build_dir, "build");
        assert!(manifest.default_board().is_none());
        assert!(manifest.programmer().is_none());
        assert!(manifest.requests().unwrap().is_empty());
    }

    #[test]
    fn bad_request_is_rejected() {
        let manifest = PinplanManifest::from_str(
            "[project]\nname = \"x\"\n[design]\nrequests = [\"sma:two\"]\n",
        )
        .unwrap();
        assert!(manifest.requests().is_err());
    }

    #[test]
    fn reject_invalid_toml() {
        assert!(PinplanManifest::from_str("this is not valid toml [[[").is_err());
    }

    #[test]
    fn template_is_valid_toml() {
        let manifest = PinplanManifest::from_str(&PinplanManifest::template("t")).unwrap();
        assert_eq!(manifest.project.name, "t");
        assert_eq!(manifest.default_board(), Some("ocp-tap-timecard"));
        assert_eq!(manifest.toolchain(), Some("vivado"));
        assert_eq!(manifest.programmer(), Some("openocd"));
        assert_eq!(manifest.requests().unwrap(), vec![ResourceId::new("clk200", 0)]);
    }

    #[test]
    fn resolve_builtin_boards() {
        assert!(resolve_builtin("ocp-tap-timecard", "vivado").is_some());
        assert!(resolve_builtin("nonexistent", "vivado").is_none());
        assert!(resolve_board("nonexistent", "vivado", None).is_err());
    }

    #[test]
    fn resolve_project_board_file() {
        let dir = tempfile::tempdir().unwrap();
        let boards = dir.path().join("boards");
        std::fs::create_dir_all(&boards).unwrap();
        let mut custom = PlatformDescriptor::ocp_tap_timecard("vivado");
        custom.name = "rev-b".into();
        let content = pinplan_platform::parse::descriptor_to_toml(&custom).unwrap();
        std::fs::write(boards.join("rev-b.board.toml"), content).unwrap();

        let resolved = resolve_board("rev-b", "vivado", Some(dir.path())).unwrap();
        assert_eq!(resolved.name, "rev-b");
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "[project]\nname = \"parent\"\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (manifest, found_dir) = PinplanManifest::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(manifest.project.name, "parent");
        assert_eq!(found_dir, dir.path());
    }
}
