//! `pinplan clean`: remove build artifacts.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::manifest::PinplanManifest;

/// Remove the build directory of the project.
pub fn run(project_dir: &Path, manifest: Option<&PinplanManifest>) -> Result<()> {
    let build_dir = match manifest {
        Some(m) => project_dir.join(&m.project.build_dir),
        None => project_dir.join("build"),
    };
    if build_dir.exists() {
        fs::remove_dir_all(&build_dir)
            .with_context(|| format!("removing {}", build_dir.display()))?;
        println!("Removed {}", build_dir.display());
    } else {
        println!("Already clean: {} does not exist", build_dir.display());
    }
    Ok(())
}
