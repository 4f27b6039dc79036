//! Configuration model for a site.
//!
//! This module defines the SiteConfig struct that represents `brace.json` at the root
//! of a site. Every field is optional and unknown fields are ignored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};

/// Name of the configuration file looked up at the root of a site.
pub const CONFIG_FILE_NAME: &str = "brace.json";

/// Where a site's sources are and where its output goes.
///
/// Directories are relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Every `*.json` file directly in there becomes a top level name.
    pub data_dir: PathBuf,
    /// Partials, named by their path in that directory without extension.
    pub partials_dir: PathBuf,
    /// One template per page, named the same way.
    pub pages_dir: PathBuf,
    /// Copied as is into the output directory.
    pub static_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Extension of the written pages, without the leading dot.
    pub page_extension: String,
    /// Whether template warnings fail the build.
    pub deny_warnings: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            partials_dir: PathBuf::from("partials"),
            pages_dir: PathBuf::from("pages"),
            static_dir: PathBuf::from("static"),
            output_dir: PathBuf::from("dist"),
            page_extension: "html".to_string(),
            deny_warnings: false,
        }
    }
}

impl SiteConfig {
    /// Loads the config of the site at `root`.
    ///
    /// An explicit `path` must exist. Without one, `<root>/brace.json` is used if it
    /// exists and the defaults otherwise.
    pub fn load(root: &Path, path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = root.join(CONFIG_FILE_NAME);
                if !default_path.is_file() {
                    log::debug!("No {CONFIG_FILE_NAME} in {}, using defaults", root.display());
                    return Ok(Self::default());
                }
                default_path
            }
        };

        log::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(&path).map_err(|e| SiteError::io(&path, e))?;
        Self::from_json(&content)
    }

    /// Parse config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SiteConfig = serde_json::from_str(json)
            .map_err(|e| SiteError::Config(format!("failed to parse config JSON: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks that every directory is set, that the page extension is usable and
    /// that the output directory doesn't overlap any of the source directories.
    pub fn validate(&self) -> Result<()> {
        let dirs = [
            ("data_dir", &self.data_dir),
            ("partials_dir", &self.partials_dir),
            ("pages_dir", &self.pages_dir),
            ("static_dir", &self.static_dir),
            ("output_dir", &self.output_dir),
        ];
        for (name, dir) in dirs {
            if dir.as_os_str().is_empty() {
                return Err(SiteError::Config(format!("`{name}` can't be empty")));
            }
        }

        if self.page_extension.is_empty() {
            return Err(SiteError::Config(
                "`page_extension` can't be empty".to_string(),
            ));
        }
        if self.page_extension.starts_with('.') {
            return Err(SiteError::Config(format!(
                "`page_extension` must not have a leading dot (found '{}'). Use '{}' instead.",
                self.page_extension,
                self.page_extension.trim_start_matches('.')
            )));
        }

        // Output and sources must not overlap in either direction
        let output_dir = normalize(&self.output_dir);
        for (name, dir) in &dirs[..4] {
            let dir = normalize(dir);
            let problem = if dir == output_dir {
                "be the same directory as"
            } else if output_dir.starts_with(&dir) {
                "be inside"
            } else if dir.starts_with(&output_dir) {
                "contain"
            } else {
                continue;
            };
            return Err(SiteError::Config(format!(
                "`output_dir` can't {problem} `{name}`"
            )));
        }

        Ok(())
    }
}

/// `./dist/` and `dist` are the same directory
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}
