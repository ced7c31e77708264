//! Error types for template substitution

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::template::lexer::Span;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// Placeholder name missing from the substitution table
    #[error("undefined placeholder '{name}'")]
    UndefinedPlaceholder {
        name: String,
        span: Span,
        suggestions: Vec<String>,
    },

    /// `@@` not followed by `@@`, an identifier, or a braced identifier
    #[error("invalid placeholder in template: line {line}, column {column}")]
    InvalidPlaceholder {
        span: Span,
        line: usize,
        column: usize,
    },
}

impl TemplateError {
    pub fn span(&self) -> &Span {
        match self {
            TemplateError::UndefinedPlaceholder { span, .. } => span,
            TemplateError::InvalidPlaceholder { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str, color: bool) -> String {
        let span = self.span().clone();
        let (label, help) = match self {
            TemplateError::UndefinedPlaceholder {
                name, suggestions, ..
            } => {
                let help = if suggestions.is_empty() {
                    None
                } else {
                    Some(format!("did you mean {}?", suggestions.join(", ")))
                };
                (format!("'{}' is not in the substitution table", name), help)
            }
            TemplateError::InvalidPlaceholder { .. } => (
                "expected '@@@@', '@@NAME' or '@@{NAME}'".to_string(),
                None,
            ),
        };

        let mut report = Report::build(ReportKind::Error, filename, span.start)
            .with_config(Config::default().with_color(color))
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            );
        if let Some(help) = help {
            report = report.with_help(help);
        }

        let mut buf = Vec::new();
        match report
            .finish()
            .write((filename, Source::from(source)), &mut buf)
        {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}
