//! TOML parsing, serialization, validation, and discovery for board descriptions.
//!
//! Board descriptions are stored as `.board.toml` files in the `boards/`
//! directory of a project. This module loads, validates, serializes, and
//! discovers these files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PlatformError, Result};
use crate::pins::{PinConstraint, ResourceId};
use crate::platform::PlatformDescriptor;

/// File suffix of board descriptions.
pub const BOARD_FILE_SUFFIX: &str = ".board.toml";

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A validation issue found in a board description.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn error(message: String) -> Self {
        Self {
            severity: Severity::Error,
            message,
        }
    }

    fn warning(message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
        }
    }
}

/// Load a board description from a `.board.toml` file.
pub fn load_descriptor_toml(path: &Path) -> Result<PlatformDescriptor> {
    if !path.exists() {
        return Err(PlatformError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), "loading board description");
    parse_descriptor_toml(&content)
}

/// Parse a board description from a TOML string.
pub fn parse_descriptor_toml(toml_str: &str) -> Result<PlatformDescriptor> {
    let descriptor: PlatformDescriptor = toml::from_str(toml_str)?;
    Ok(descriptor)
}

/// Serialize a board description to pretty TOML.
pub fn descriptor_to_toml(descriptor: &PlatformDescriptor) -> Result<String> {
    let toml_str = toml::to_string_pretty(descriptor)?;
    Ok(toml_str)
}

#[derive(serde::Serialize, serde::Deserialize)]
struct IoTable {
    io: Vec<PinConstraint>,
}

/// Serialize only an IO table.
pub fn io_table_to_toml(io: &[PinConstraint]) -> Result<String> {
    let table = IoTable { io: io.to_vec() };
    Ok(toml::to_string_pretty(&table)?)
}

/// Parse an IO table written by [`io_table_to_toml`].
pub fn parse_io_table_toml(toml_str: &str) -> Result<Vec<PinConstraint>> {
    let table: IoTable = toml::from_str(toml_str)?;
    Ok(table.io)
}

/// Validate a board description.
///
/// Returns `Ok(warnings)` if there are no errors, or `Err(issues)` with every
/// problem found (errors and warnings).
pub fn validate_descriptor(
    descriptor: &PlatformDescriptor,
) -> std::result::Result<Vec<ValidationIssue>, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    // 1. Device id present
    if descriptor.device_id.trim().is_empty() {
        issues.push(ValidationIssue::error("device id is empty".into()));
    }

    // 2. No physical pin bound by two entries
    let mut owners: HashMap<&str, usize> = HashMap::new();
    for (position, constraint) in descriptor.io.iter().enumerate() {
        for pin in constraint.all_pins() {
            match owners.get(pin) {
                Some(&prev) if prev != position => {
                    issues.push(ValidationIssue::error(format!(
                        "pin {pin} is bound by both '{}' (entry {prev}) and '{}' (entry {position})",
                        descriptor.io[prev].id(),
                        constraint.id()
                    )));
                }
                Some(_) => {
                    issues.push(ValidationIssue::error(format!(
                        "pin {pin} appears twice in '{}'",
                        constraint.id()
                    )));
                }
                None => {
                    owners.insert(pin, position);
                }
            }
        }
    }

    // 3. Every entry binds at least one pin
    for constraint in &descriptor.io {
        if constraint.all_pins().next().is_none() {
            issues.push(ValidationIssue::error(format!(
                "'{}' binds no pins",
                constraint.id()
            )));
        }
        for sub in &constraint.subsignals {
            if sub.pins.is_empty() {
                issues.push(ValidationIssue::error(format!(
                    "sub-signal '{}' of '{}' binds no pins",
                    sub.name,
                    constraint.id()
                )));
            }
        }
    }

    // 4. Duplicate name:index identities
    let mut seen: HashMap<ResourceId, usize> = HashMap::new();
    for (position, constraint) in descriptor.io.iter().enumerate() {
        if let Some(first) = seen.insert(constraint.id(), position) {
            issues.push(ValidationIssue::warning(format!(
                "resource '{}' is declared twice (entries {first} and {position}); repeat requests bind them in table order",
                constraint.id()
            )));
        }
    }

    // 5. Default clock references the IO table
    let clock = &descriptor.default_clock;
    if descriptor.resources(&clock.name).next().is_none() {
        issues.push(ValidationIssue::error(format!(
            "default clock '{}' is not in the IO table",
            clock.name
        )));
    }

    // 6. Positive clock period
    if !(clock.period_ns > 0.0) {
        issues.push(ValidationIssue::error(format!(
            "default clock period {} ns is not positive",
            clock.period_ns
        )));
    }

    // 7. Post-build steps match the multiboot layout
    if descriptor.post_build_commands != descriptor.flash.post_build_steps() {
        issues.push(ValidationIssue::warning(
            "post-build commands differ from the steps derived from the flash layout".into(),
        ));
    }

    // 8. At least one programmer
    if descriptor.programmers.is_empty() {
        issues.push(ValidationIssue::warning("no programmer backends".into()));
    }

    for issue in issues.iter().filter(|i| i.severity == Severity::Warning) {
        warn!(board = %descriptor.name, "{}", issue.message);
    }

    if issues.iter().any(|i| i.severity == Severity::Error) {
        Err(issues)
    } else {
        Ok(issues)
    }
}

/// Validate a board description, folding every error into one
/// [`PlatformError::Validation`]. Returns the warnings otherwise.
pub fn ensure_valid(descriptor: &PlatformDescriptor) -> Result<Vec<ValidationIssue>> {
    validate_descriptor(descriptor).map_err(|issues| {
        let detail = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .map(|i| i.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        PlatformError::Validation {
            detail: format!("board '{}': {detail}", descriptor.name),
        }
    })
}

/// Discover all `.board.toml` files in a project's `boards/` directory.
///
/// Returns a list of (board_name, file_path) pairs.
pub fn discover_boards(project_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let boards_dir = project_dir.join("boards");
    if !boards_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut boards = Vec::new();
    for entry in std::fs::read_dir(&boards_dir)? {
        let path = entry?.path();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(BOARD_FILE_SUFFIX))
            .map(str::to_string);
        if let Some(name) = name {
            boards.push((name, path));
        }
    }
    boards.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(boards)
}
