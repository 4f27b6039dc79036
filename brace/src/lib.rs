mod brace;
mod context;
mod diagnostics;
mod errors;
#[cfg(feature = "glob_fs")]
mod globbing;
pub mod parsing;
mod renderer;
mod reporting;
mod scope;
mod template;
mod utils;
pub mod value;

pub use crate::brace::Brace;
pub use context::Context;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use errors::{BraceResult, Error, ErrorKind};
pub use parsing::{scan_block, split_else, Block, BlockKind};
pub use renderer::{render, Rendered};
pub use template::{Partials, Template};
pub use utils::Span;
pub use value::{Map, Value};
