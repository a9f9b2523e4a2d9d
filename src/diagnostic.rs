//! The in-language diagnostic value: compiler-style messages anchored to a
//! source span, with chained "note" causes. This is *data*, not a Rust
//! `std::error::Error` — see [`crate::error::PljitError`] for the crate's own
//! failure-mode enum.

use std::fmt::Write as _;

use crate::source::SourceCode;
use crate::source::SourceSpan;

/// Whether a diagnostic is the primary failure or an attached explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Error,
    Note,
}

impl DiagnosticKind {
    fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Note => "note",
        }
    }
}

/// A kind-tagged message bound to a source span, optionally carrying ordered
/// note causes. Immutable once constructed; causes are appended by the
/// producer via [`Diagnostic::with_cause`].
#[derive(Debug, Clone)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    message: String,
    span: SourceSpan,
    causes: Vec<Diagnostic>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            kind: DiagnosticKind::Error,
            message: message.into(),
            span,
            causes: Vec::new(),
        }
    }

    pub fn note(message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            kind: DiagnosticKind::Note,
            message: message.into(),
            span,
            causes: Vec::new(),
        }
    }

    /// Appends a note cause, printed after the main message.
    pub fn with_cause(mut self, cause: Diagnostic) -> Self {
        self.causes.push(cause);
        self
    }

    pub fn attach_cause(&mut self, cause: Diagnostic) {
        self.causes.push(cause);
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> SourceSpan {
        self.span
    }

    pub fn causes(&self) -> &[Diagnostic] {
        &self.causes
    }

    /// Renders this diagnostic (and its causes, recursively) against `source`:
    /// ```text
    /// <line>:<col>: <kind>: <message>
    /// <source line containing the span, tabs preserved>
    /// <spaces/tabs matching prefix>^<tildes of length span.len() - 1>
    /// ```
    pub fn render(&self, source: &SourceCode, config: &crate::config::RenderConfig) -> String {
        let mut out = String::new();
        self.render_into(source, config, &mut out);
        out
    }

    fn render_into(&self, source: &SourceCode, config: &crate::config::RenderConfig, out: &mut String) {
        let position = self.span.position(source);
        let line = source.line_containing(self.span.start());
        let underline = self.span.underline(source);

        if config.colored {
            let color = match self.kind {
                DiagnosticKind::Error => "\x1b[31m",
                DiagnosticKind::Note => "\x1b[36m",
            };
            let _ = writeln!(
                out,
                "{position}: {color}{}\x1b[0m: {}",
                self.kind.label(),
                self.message
            );
        } else {
            let _ = writeln!(out, "{position}: {}: {}", self.kind.label(), self.message);
        }
        let _ = writeln!(out, "{line}");
        let _ = writeln!(out, "{underline}");

        for cause in &self.causes {
            cause.render_into(source, config, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;

    #[test]
    fn renders_caret_and_tildes() {
        let source = SourceCode::new("VAR a\nBEGIN RETURN a END.");
        let span = SourceSpan::new(6, 9); // "BEG" of "BEGIN" on line 2
        let diag = Diagnostic::error("Duplicate VAR declaration!", span);
        let rendered = diag.render(&source, &RenderConfig::plain());
        let mut lines = rendered.lines();
        assert_eq!(lines.next().unwrap(), "2:1: error: Duplicate VAR declaration!");
        assert_eq!(lines.next().unwrap(), "BEGIN RETURN a END.");
        assert_eq!(lines.next().unwrap(), "^~~");
    }

    #[test]
    fn renders_chained_causes() {
        let source = SourceCode::new("CONST a = 1, a = 2;\nBEGIN RETURN 0 END.");
        let first = SourceSpan::new(6, 7);
        let second = SourceSpan::new(13, 14);
        let diag = Diagnostic::error("Redefinition of identifier!", second)
            .with_cause(Diagnostic::note("Original declaration here", first));
        let rendered = diag.render(&source, &RenderConfig::plain());
        assert!(rendered.contains("1:14: error: Redefinition of identifier!"));
        assert!(rendered.contains("1:7: note: Original declaration here"));
    }
}
