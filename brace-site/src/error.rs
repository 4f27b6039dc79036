//! Error types for building a site.
//!
//! Anything in here stops the build. Problems inside templates are not errors: they
//! come back as diagnostics and only fail the build when warnings are denied.

use std::path::PathBuf;

use thiserror::Error;

/// Exit codes of the `brace-site` binary.
pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    /// A template could not be found or loaded by the engine
    pub const ENGINE_FAILURE: u8 = 1;
    /// Bad configuration file or command line
    pub const CONFIG_ERROR: u8 = 2;
    /// A data file is not valid JSON
    pub const DATA_ERROR: u8 = 3;
    /// Reading sources or writing the output failed
    pub const IO_FAILURE: u8 = 4;
    /// Rendering produced warnings and warnings are denied
    pub const WARNINGS_DENIED: u8 = 5;
}

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Failed to access `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in `{}`", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Engine(#[from] brace::Error),

    #[error("{0} warning(s) while rendering and warnings are denied")]
    WarningsDenied(usize),
}

impl SiteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SiteError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the exit code the binary uses for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            SiteError::Io { .. } => exit_codes::IO_FAILURE,
            SiteError::Json { .. } => exit_codes::DATA_ERROR,
            SiteError::Config(_) => exit_codes::CONFIG_ERROR,
            SiteError::Engine(_) => exit_codes::ENGINE_FAILURE,
            SiteError::WarningsDenied(_) => exit_codes::WARNINGS_DENIED,
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            exit_codes::SUCCESS,
            exit_codes::ENGINE_FAILURE,
            exit_codes::CONFIG_ERROR,
            exit_codes::DATA_ERROR,
            exit_codes::IO_FAILURE,
            exit_codes::WARNINGS_DENIED,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b, "Exit codes must be distinct");
            }
        }
    }

    #[test]
    fn errors_map_to_exit_codes() {
        let err = SiteError::io("dist", std::io::Error::other("disk full"));
        assert_eq!(err.exit_code(), exit_codes::IO_FAILURE);
        assert_eq!(err.to_string(), "Failed to access `dist`");

        let err = SiteError::Config("`output_dir` can't be empty".to_string());
        assert_eq!(err.exit_code(), exit_codes::CONFIG_ERROR);

        let err = SiteError::WarningsDenied(2);
        assert_eq!(err.exit_code(), exit_codes::WARNINGS_DENIED);
        assert_eq!(
            err.to_string(),
            "2 warning(s) while rendering and warnings are denied"
        );
    }

    #[test]
    fn engine_errors_convert() {
        let err: SiteError = brace::Error::message("boom").into();
        assert_eq!(err.exit_code(), exit_codes::ENGINE_FAILURE);
        assert_eq!(err.to_string(), "boom");
    }
}
