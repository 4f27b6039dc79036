//! Loads the JSON data files shared by every page.

use std::path::Path;

use brace::Context;
use walkdir::WalkDir;

use crate::error::{Result, SiteError};

/// Reads every `*.json` file directly in `dir` into a context where each file is a
/// top level name, its file stem: `data/speakers.json` is `speakers`.
///
/// Files are read in name order. A missing directory means there is no data.
pub fn load_data(dir: &Path) -> Result<Context> {
    let mut context = Context::new();
    if !dir.is_dir() {
        log::debug!("No data directory at {}", dir.display());
        return Ok(context);
    }

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            SiteError::io(path, e.into())
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            log::warn!("Skipping data file with a non UTF-8 name: {}", path.display());
            continue;
        };

        log::debug!("Loading data file {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| SiteError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        context.insert(name.to_string(), &value);
    }

    Ok(context)
}
