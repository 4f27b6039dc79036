//! Builds a static site out of brace templates.
//!
//! A site is a directory with JSON data, partials, one template per page and static
//! files, laid out as described by [`SiteConfig`].

pub mod assets;
pub mod config;
pub mod data;
pub mod error;
pub mod site;

pub use config::SiteConfig;
pub use error::{exit_codes, Result, SiteError};
pub use site::{page_context, BuildReport, Site};
