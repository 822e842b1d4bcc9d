//! `pinplan init`: project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::manifest::{PinplanManifest, MANIFEST_FILE};

/// Create a new pinplan project at the given path.
///
/// `name` is the project name. The directory `name` is created relative to cwd.
pub fn run(name: &str) -> Result<()> {
    let project_dir = Path::new(name);
    create_project(project_dir, name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }

    fs::create_dir_all(project_dir.join("boards")).context("creating boards/ directory")?;
    fs::create_dir_all(project_dir.join("build")).context("creating build/ directory")?;

    let manifest_content = PinplanManifest::template(name);
    fs::write(project_dir.join(MANIFEST_FILE), &manifest_content)
        .with_context(|| format!("writing {MANIFEST_FILE}"))?;

    fs::write(project_dir.join(".gitignore"), "build/\n").context("writing .gitignore")?;

    tracing::info!(project = name, path = %project_dir.display(), "created project");
    println!("Created project '{name}'");
    println!("  {name}/{MANIFEST_FILE}");
    println!("  {name}/boards/");
    println!("  {name}/build/");
    println!("  {name}/.gitignore");

    Ok(())
}
