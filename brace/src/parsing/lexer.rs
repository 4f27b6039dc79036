use std::fmt;

pub(crate) const TAG_START: &str = "{{";
pub(crate) const TAG_END: &str = "}}";

/// The three kinds of blocks. Their closing tags are `{{/each}}`, `{{/if}}` and
/// `{{/unless}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Each,
    If,
    Unless,
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Each => "each",
            BlockKind::If => "if",
            BlockKind::Unless => "unless",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "each" => Some(BlockKind::Each),
            "if" => Some(BlockKind::If),
            "unless" => Some(BlockKind::Unless),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recognised `{{ ... }}` tag.
/// Anything between `{{` and `}}` that isn't one of these is plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tag<'a> {
    /// `{{> name}}`
    Partial(&'a str),
    /// `{{#each path}}`, `{{#if path}}`, `{{#unless path}}`
    Open(BlockKind, &'a str),
    /// `{{else}}`
    Else,
    /// `{{/each}}`, `{{/if}}`, `{{/unless}}`
    Close(BlockKind),
    /// `{{path.to.value}}`
    Variable(&'a str),
}

#[inline]
fn trim_ws(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// Dot paths are made of identifiers, plus `@` for the loop variables.
fn is_path(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '@' | '$'))
}

/// Partials can live in subdirectories: `{{> cards/speaker}}`
fn is_partial_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'))
}

fn classify(inner: &str) -> Option<Tag<'_>> {
    if let Some(name) = inner.strip_prefix('>') {
        let name = trim_ws(name);
        return is_partial_name(name).then_some(Tag::Partial(name));
    }

    if let Some(open) = inner.strip_prefix('#') {
        let (keyword, path) = open.split_once(|c: char| c.is_ascii_whitespace())?;
        let kind = BlockKind::from_keyword(keyword)?;
        let path = trim_ws(path);
        return is_path(path).then_some(Tag::Open(kind, path));
    }

    if let Some(close) = inner.strip_prefix('/') {
        return BlockKind::from_keyword(trim_ws(close)).map(Tag::Close);
    }

    if inner == "else" {
        return Some(Tag::Else);
    }

    is_path(inner).then_some(Tag::Variable(inner))
}

/// Lexes the tag at the start of `input`, which must start with `{{`.
/// Returns the tag and its length in bytes, including both delimiters, or None
/// if this `{{` doesn't start a valid tag.
pub(crate) fn lex_tag(input: &str) -> Option<(Tag<'_>, usize)> {
    let after_start = input.strip_prefix(TAG_START)?;
    let end = after_start.find(TAG_END)?;
    let tag = classify(trim_ws(&after_start[..end]))?;
    Some((tag, TAG_START.len() + end + TAG_END.len()))
}

/// Walks over all the recognised tags of a template, in order.
/// Each item is `(start, tag, end)` with byte offsets into the walked text.
pub(crate) struct Tags<'a> {
    source: &'a str,
    cursor: usize,
}

impl<'a> Tags<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self { source, cursor: 0 }
    }

    /// Resumes the walk at `offset`, used to jump over a block once it's been scanned.
    pub(crate) fn seek(&mut self, offset: usize) {
        self.cursor = offset.min(self.source.len());
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = (usize, Tag<'a>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let start = self.cursor + self.source[self.cursor..].find(TAG_START)?;
            match lex_tag(&self.source[start..]) {
                Some((tag, len)) => {
                    self.cursor = start + len;
                    return Some((start, tag, start + len));
                }
                // Not a tag: the `{{` is text and we look again right after it
                None => self.cursor = start + TAG_START.len(),
            }
        }
    }
}
