use std::path::PathBuf;

use globset::GlobBuilder;
use walkdir::WalkDir;

use crate::errors::{BraceResult, Error};

/// Loads the glob and find all files matching that glob,
/// returning a list of (path, path relative to the glob directory)
pub(crate) fn load_from_glob(glob: &str) -> BraceResult<Vec<(PathBuf, String)>> {
    let Some(idx) = glob.find('*') else {
        return Err(Error::message(format!(
            "Not a valid glob: no `*` were found in `{glob}`"
        )));
    };

    let (parent_dir, glob_end) = glob.split_at(idx);

    // A directory that can't be canonicalized most likely doesn't exist: the walk
    // below then finds nothing, which is not an error.
    let parent_dir =
        std::fs::canonicalize(parent_dir).unwrap_or_else(|_| PathBuf::from(parent_dir));

    // Only the part after the directory is a pattern: the directory itself can
    // contain `[`, `{` or `?`
    let glob_matcher = GlobBuilder::new(glob_end)
        .literal_separator(true)
        .build()
        .map_err(|e| Error::message(format!("Glob is invalid: {e}")))?
        .compile_matcher();

    let mut paths = Vec::new();
    for entry in WalkDir::new(&parent_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        let Ok(relative) = path.strip_prefix(&parent_dir) else {
            continue;
        };
        // unify on forward slash
        let relative = relative.to_string_lossy().replace('\\', "/");
        if !glob_matcher.is_match(&relative) {
            continue;
        }

        paths.push((path.to_path_buf(), relative));
    }

    Ok(paths)
}
