use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Result, SiteError};

/// Copies everything in `src` into `dst`, keeping the tree as is.
/// Returns how many files were copied. A missing `src` copies nothing.
pub fn copy_static(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        log::debug!("No static directory at {}", src.display());
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            SiteError::io(path, e.into())
        })?;
        // Always under `src` since walkdir yields paths starting with it
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| SiteError::io(&target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| SiteError::io(parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| SiteError::io(entry.path(), e))?;
            log::debug!("Copied {}", relative.display());
            copied += 1;
        }
    }

    Ok(copied)
}
