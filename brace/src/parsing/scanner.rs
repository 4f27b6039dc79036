//! Finds where blocks end.
//!
//! Close tags are matched by counting: every block opening (of any kind) goes one
//! level deeper and every block closing (of any kind) comes back up one level.
use crate::parsing::lexer::{BlockKind, Tag, Tags};

/// A block whose opening tag has already been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// The kind of the opening tag
    pub kind: BlockKind,
    /// Everything between the opening tag and its matching close tag
    pub body: &'a str,
    /// Everything after the matching close tag
    pub rest: &'a str,
    /// The kind of the tag that closed the block, None if the input ended first
    pub close: Option<BlockKind>,
}

impl<'a> Block<'a> {
    pub fn is_closed(&self) -> bool {
        self.close.is_some()
    }

    /// `{{#if x}}...{{/each}}` still closes the block but is most likely a typo
    pub fn is_mismatched(&self) -> bool {
        matches!(self.close, Some(close) if close != self.kind)
    }
}

/// Scans `content`, the text right after an opening block tag, for the close tag
/// matching that opening.
///
/// If the content runs out before the block is closed, the whole content is the body
/// and the rest is empty: an unclosed block renders as if it was closed at the end
/// of the input.
pub fn scan_block(content: &str, kind: BlockKind) -> Block<'_> {
    let mut depth = 1usize;

    for (start, tag, end) in Tags::new(content) {
        match tag {
            Tag::Open(..) => depth += 1,
            Tag::Close(close) => {
                depth -= 1;
                if depth == 0 {
                    return Block {
                        kind,
                        body: &content[..start],
                        rest: &content[end..],
                        close: Some(close),
                    };
                }
            }
            _ => (),
        }
    }

    Block {
        kind,
        body: content,
        rest: "",
        close: None,
    }
}

/// Splits the body of an `if` block into its two branches at the first `{{else}}`
/// that isn't inside a nested block.
/// Returns the then-branch and, if there was an `{{else}}`, the else-branch.
pub fn split_else(body: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;

    for (start, tag, end) in Tags::new(body) {
        match tag {
            Tag::Open(..) => depth += 1,
            Tag::Close(_) => depth = depth.saturating_sub(1),
            Tag::Else if depth == 0 => return (&body[..start], Some(&body[end..])),
            _ => (),
        }
    }

    (body, None)
}
