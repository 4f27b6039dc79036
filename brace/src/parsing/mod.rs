pub(crate) mod lexer;
pub mod scanner;

pub use lexer::BlockKind;
pub use scanner::{scan_block, split_else, Block};
