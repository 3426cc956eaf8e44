use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::catalog::GfxDefs;

pub fn load_gfxdefs(path: &Path) -> Result<GfxDefs> {
    info!("Loading {}", path.display());
    let text = fs::read_to_string(path).with_context(|| format!("Unable to read {}", path.display()))?;
    let defs = GfxDefs::from_json(&text).with_context(|| format!("Invalid definition file {}", path.display()))?;
    Ok(defs)
}

/// The user's catalog if one was given, otherwise the built-in one.
pub fn load_catalog(path: Option<&Path>) -> Result<GfxDefs> {
    match path {
        Some(p) => load_gfxdefs(p),
        None => GfxDefs::builtin().context("Built-in definitions are invalid"),
    }
}

pub fn read_binary(path: &Path) -> Result<Vec<u8>> {
    info!("Loading {}", path.display());
    fs::read(path).with_context(|| format!("Unable to read {}", path.display()))
}

pub fn write_binary(path: &Path, data: &[u8]) -> Result<()> {
    info!("Saving {} ({} bytes)", path.display(), data.len());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data).with_context(|| format!("Unable to write {}", path.display()))?;
    Ok(())
}
