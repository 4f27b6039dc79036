use crate::diagnostics::Diagnostic;
use crate::utils::Span;

fn get_line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

struct SourceLocation<'a> {
    line: &'a str,
    underline: String,
    start_line: usize,
    start_col: usize,
}

impl<'a> SourceLocation<'a> {
    fn new(source: &'a str, span: &Span) -> Self {
        let line_starts: Vec<_> = get_line_starts(source);
        let start_line = span.start_line.clamp(1, line_starts.len());
        let start_col = span.start_col;
        let line = if start_line == line_starts.len() {
            &source[line_starts[start_line - 1]..]
        } else {
            &source[line_starts[start_line - 1]..line_starts[start_line]]
        }
        .trim_end_matches('\n')
        .trim_end_matches('\r');

        let mut underline = String::with_capacity(100);
        for c in line.chars().take(start_col) {
            match c {
                '\t' => underline.push('\t'),
                _ => underline.push(' '),
            }
        }
        // Multi-line tags only get the part on their first line underlined
        let width = if span.end_line == span.start_line && span.end_col > span.start_col {
            span.end_col - span.start_col
        } else {
            line.chars().count().saturating_sub(start_col).max(1)
        };
        for _ in 0..width {
            underline.push('^');
        }

        Self {
            line,
            underline,
            start_line,
            start_col,
        }
    }
}

pub(crate) fn generate_report(diagnostic: &Diagnostic) -> String {
    let loc = SourceLocation::new(&diagnostic.source, &diagnostic.span);
    let line_num_width = loc.start_line.to_string().len();
    let padding = " ".repeat(line_num_width);

    format!(
        "warning: {}\n\
         {padding}--> {}:{}:{}\n\
         {padding} |\n\
         {} | {}\n\
         {padding} | {}",
        diagnostic.kind,
        diagnostic.template,
        loc.start_line,
        loc.start_col,
        loc.start_line,
        loc.line,
        loc.underline,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::diagnostics::DiagnosticKind;

    #[test]
    fn can_get_line_starts() {
        let source = "foo\nbar\r\n\nbaz";
        let line_starts = get_line_starts(source);
        assert_eq!(
            line_starts,
            [
                0,  // "foo\n"
                4,  // "bar\r\n"
                9,  // ""
                10, // "baz"
            ],
        );
    }

    #[test]
    fn can_generate_report() {
        let source: Arc<str> = Arc::from("<body>\n  {{> nav}}\n</body>");
        let start = source.find("{{").unwrap();
        let diag = Diagnostic::new(
            DiagnosticKind::MissingPartial("nav".to_string()),
            "index",
            &source,
            Span::locate(&source, start..start + 9),
        );

        insta::assert_snapshot!(diag.generate_report(), @r"
        warning: Partial `nav` not found
         --> index:2:2
          |
        2 |   {{> nav}}
          |   ^^^^^^^^^
        ");
    }
}
