use std::fmt;
use std::ops::Range;

/// Location of a tag in a template source.
/// Lines are 1-based, columns are 0-based char offsets in that line.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
    pub range: Range<usize>,
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " @ {}:{}-{}:{} ({:?})",
            self.start_line, self.start_col, self.end_line, self.end_col, self.range,
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " @ {}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col,
        )
    }
}

impl Span {
    /// Builds the span of the byte `range` in `source`.
    /// The range is clamped to the source so a bad offset never panics.
    pub fn locate(source: &str, range: Range<usize>) -> Self {
        let end = floor_char_boundary(source, range.end.min(source.len()));
        let start = floor_char_boundary(source, range.start.min(end));
        let (start_line, start_col) = line_col(source, start);
        let (end_line, end_col) = line_col(source, end);

        Self {
            start_line,
            start_col,
            end_line,
            end_col,
            range: start..end,
        }
    }
}

fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    (line, before[line_start..].chars().count())
}

/// Names templates loaded from files: the path with forward slashes and without
/// the extension of the file itself, eg `blocks/card.html` -> `blocks/card`.
pub(crate) fn template_name_from_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let file_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[file_start..].rfind('.') {
        // Dotfiles keep their name
        Some(0) | None => path,
        Some(dot) => path[..file_start + dot].to_string(),
    }
}

fn floor_char_boundary(source: &str, mut idx: usize) -> usize {
    while !source.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
