//! Error types for platform description operations.

use std::path::PathBuf;

/// Errors that can occur while describing, finalizing, or persisting a platform.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The requested programmer backend is not one this board supports.
    #[error("unsupported programmer '{name}' (expected 'openocd' or 'vivado')")]
    UnsupportedProgrammer {
        /// The name that was requested.
        name: String,
    },

    /// The default reference clock could not be resolved in a finalized design.
    #[error("no clock resolvable to '{clock}' in the finalized design")]
    MissingClockConstraint {
        /// The clock resource that was looked up.
        clock: String,
    },

    /// A design requested a resource the platform does not define.
    #[error("platform has no resource '{name}:{index}'")]
    UnknownResource {
        /// Resource name.
        name: String,
        /// Resource index.
        index: u32,
    },

    /// Every table entry for a resource has already been claimed by earlier requests.
    #[error("resource '{name}:{index}' requested more times than the platform provides ({available})")]
    ResourceExhausted {
        /// Resource name.
        name: String,
        /// Resource index.
        index: u32,
        /// Number of table entries with this identity.
        available: usize,
    },

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading/writing board files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Board file not found.
    #[error("board file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Validation error in a platform definition.
    #[error("validation error: {detail}")]
    Validation {
        /// Description of the validation failure.
        detail: String,
    },
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
