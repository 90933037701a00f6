use crate::span::Span;

/// A compiler diagnostic (error or warning).
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let (kind, color) = match self.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };

        let mut report = Report::build(kind, filename, self.span.start as usize)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.start as usize..self.span.end as usize))
                    .with_message(&self.message)
                    .with_color(color),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report
            .finish()
            .eprint((filename, Source::from(source)))
            .unwrap();
    }
}

/// Render a list of diagnostics against one source file.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) {
    for diag in diagnostics {
        diag.render(filename, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let d = Diagnostic::error("unexpected character '@'".to_string(), Span::new(4, 5));
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "unexpected character '@'");
        assert_eq!(d.span.start, 4);
        assert!(d.notes.is_empty());
        assert!(d.help.is_none());
    }

    #[test]
    fn test_builders_chain() {
        let d = Diagnostic::error("duplicate declaration of 'x'".to_string(), Span::dummy())
            .with_note("previous declaration is in the class scope".to_string())
            .with_help("rename one of the variables".to_string());
        assert_eq!(d.notes.len(), 1);
        assert_eq!(d.help.as_deref(), Some("rename one of the variables"));
    }

    #[test]
    fn test_render_does_not_panic() {
        let source = "class Main {\n  function void main() { return; }\n}\n";
        let d = Diagnostic::error("expected ';'".to_string(), Span::new(14, 22))
            .with_help("statements end with a semicolon".to_string());
        d.render("Main.jack", source);
    }

    #[test]
    fn test_render_diagnostics_multiple() {
        let source = "let x = 1;\nlet y = 2;\n";
        let diagnostics = vec![
            Diagnostic::warning("first".to_string(), Span::new(4, 5)),
            Diagnostic::warning("second".to_string(), Span::new(15, 16)),
        ];
        render_diagnostics(&diagnostics, "Main.jack", source);
    }
}
