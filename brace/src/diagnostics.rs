//! Problems found while rendering.
//!
//! None of them stop a render: the renderer always produces output and hands back
//! the diagnostics next to it so the caller decides whether to log them, fail the
//! build or ignore them.
use std::fmt;
use std::sync::Arc;

use crate::parsing::BlockKind;
use crate::reporting::generate_report;
use crate::utils::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// `{{> name}}` with no partial of that name. The tag renders nothing.
    MissingPartial(String),
    /// A block whose close tag was never found. It runs to the end of the template.
    UnclosedBlock(BlockKind),
    /// A block closed by a close tag of another kind, eg `{{#if x}}...{{/each}}`
    MismatchedClose { open: BlockKind, close: BlockKind },
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::MissingPartial(name) => write!(f, "Partial `{name}` not found"),
            DiagnosticKind::UnclosedBlock(kind) => write!(
                f,
                "`{{{{#{kind}}}}}` block is never closed, rendering it until the end of the template"
            ),
            DiagnosticKind::MismatchedClose { open, close } => write!(
                f,
                "`{{{{#{open}}}}}` block is closed by `{{{{/{close}}}}}`"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Name of the template (page or partial) the tag is in
    pub template: String,
    /// Where the offending tag is in that template
    pub span: Span,
    pub(crate) source: Arc<str>,
}

impl Diagnostic {
    pub(crate) fn new(kind: DiagnosticKind, template: &str, source: &Arc<str>, span: Span) -> Self {
        Self {
            kind,
            template: template.to_string(),
            span,
            source: Arc::clone(source),
        }
    }

    /// A multi-line report showing the offending line with the tag underlined
    pub fn generate_report(&self) -> String {
        generate_report(self)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{}:{})",
            self.kind, self.template, self.span.start_line, self.span.start_col
        )
    }
}
