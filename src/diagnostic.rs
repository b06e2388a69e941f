use std::io;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use crate::config::ConfigError;
use crate::syntax::Span;
use crate::tree::TreeError;

/// A user-facing report from validation, loading or the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
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

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    fn report<'a>(&'a self, filename: &'a str, color: bool) -> Report<'a, (&'a str, std::ops::Range<usize>)> {
        let (kind, tint) = match self.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };
        let range = self.span.start as usize..self.span.end as usize;

        let mut report = Report::build(kind, filename, range.start)
            .with_config(Config::default().with_color(color))
            .with_message(&self.message)
            .with_label(
                Label::new((filename, range))
                    .with_message(&self.message)
                    .with_color(tint),
            );
        for note in &self.notes {
            report = report.with_note(note);
        }
        if let Some(help) = &self.help {
            report = report.with_help(help);
        }
        report.finish()
    }

    /// Render to stderr with ariadne.
    pub fn render(&self, filename: &str, source: &str) -> io::Result<()> {
        self.report(filename, true)
            .eprint((filename, Source::from(source)))
    }

    /// Render without color, for logs and tests.
    pub fn render_plain(&self, filename: &str, source: &str) -> String {
        let mut buf = Vec::new();
        if self
            .report(filename, false)
            .write((filename, Source::from(source)), &mut buf)
            .is_err()
        {
            return self.message.clone();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Render a list of diagnostics to stderr.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) -> io::Result<()> {
    for diag in diagnostics {
        diag.render(filename, source)?;
    }
    Ok(())
}

impl From<TreeError> for Diagnostic {
    fn from(err: TreeError) -> Self {
        let help = match &err {
            TreeError::Ownership { .. } => {
                Some("detach the statement first, or clone it".to_string())
            }
            TreeError::DuplicateDeclaration { .. } => {
                Some("declare the name in a nested block to shadow it".to_string())
            }
            TreeError::ForeignDeclaration { .. } => Some(
                "declare the name in a container that encloses its declaration".to_string(),
            ),
            TreeError::UnsupportedClone { .. } => {
                Some("clone the enclosing statement instead".to_string())
            }
            _ => None,
        };
        let diag = Diagnostic::error(err.to_string(), Span::dummy());
        match help {
            Some(help) => diag.with_help(help),
            None => diag,
        }
    }
}

impl From<ConfigError> for Diagnostic {
    fn from(err: ConfigError) -> Self {
        let diag = Diagnostic::error(err.to_string(), Span::dummy());
        match err.help() {
            Some(help) => diag.with_help(help),
            None => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::StmtId;

    #[test]
    fn test_error_construction() {
        let d = Diagnostic::error("duplicate label 'done'".to_string(), Span::new(0, 10, 15));
        assert_eq!(d.severity, Severity::Error);
        assert!(d.is_error());
        assert_eq!(d.span.start, 10);
        assert_eq!(d.span.end, 15);
        assert!(d.notes.is_empty());
        assert!(d.help.is_none());
    }

    #[test]
    fn test_chained_builders() {
        let d = Diagnostic::warning("goto target 'out' is not defined".to_string(), Span::dummy())
            .with_note("in function 'scale'".to_string())
            .with_help("add a label 'out:'".to_string())
            .with_note("reachability is not checked".to_string());
        assert!(!d.is_error());
        assert_eq!(d.notes.len(), 2);
        assert_eq!(d.help.as_deref(), Some("add a label 'out:'"));
    }

    #[test]
    fn test_severity_orders_errors_last() {
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_render_plain_includes_message_and_help() {
        let source = "{\"kind\": \"default\"}\n{\"kind\": \"default\"}\n";
        let d = Diagnostic::error("second default in switch".to_string(), Span::new(0, 21, 40))
            .with_help("merge the two default arms".to_string());
        let text = d.render_plain("kernel.json", source);
        assert!(text.contains("second default in switch"));
        assert!(text.contains("merge the two default arms"));
        assert!(text.contains("kernel.json"));
    }

    #[test]
    fn test_from_tree_error() {
        let err = TreeError::Ownership {
            child: StmtId(3),
            owner: StmtId(1),
        };
        let d = Diagnostic::from(err.clone());
        assert_eq!(d.message, err.to_string());
        assert!(d.help.unwrap().contains("detach"));
    }

    #[test]
    fn test_from_config_error() {
        let d = Diagnostic::from(ConfigError::UnknownBase("hip".to_string()));
        assert!(d.message.contains("hip"));
        assert!(d.help.unwrap().contains("cuda"));
    }
}
