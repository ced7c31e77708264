//! Single-pass placeholder substitution

use crate::error::TemplateError;
use crate::table::SubstitutionTable;

use super::lexer::{lex, line_column, Span, Token, DELIMITER};

/// A lexed template document
#[derive(Debug, Clone)]
pub struct Template<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
}

impl<'a> Template<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: lex(source),
        }
    }

    /// Distinct placeholder names, in order of first appearance
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (tok, _) in &self.tokens {
            if let Some(name) = tok.placeholder() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// False when the template contains a malformed `@@` sequence
    pub fn is_valid(&self) -> bool {
        !self.tokens.iter().any(|(tok, _)| *tok == Token::Dangling)
    }

    /// Replace every placeholder with its table value
    ///
    /// Values are inserted verbatim and never scanned again. Every undefined
    /// or malformed placeholder is reported; nothing is returned unless the
    /// whole template resolves.
    pub fn substitute(&self, table: &SubstitutionTable) -> Result<String, Vec<TemplateError>> {
        let mut output = String::with_capacity(self.source.len());
        let mut errors = Vec::new();

        for (tok, span) in &self.tokens {
            match tok {
                Token::Text | Token::At => output.push_str(&self.source[span.clone()]),
                Token::Escaped => output.push_str(DELIMITER),
                Token::Named(name) | Token::Braced(name) => match table.get(name) {
                    Some(value) => output.push_str(value),
                    None => errors.push(TemplateError::UndefinedPlaceholder {
                        name: name.clone(),
                        span: span.clone(),
                        suggestions: table.suggestions(name),
                    }),
                },
                Token::Dangling => {
                    let (line, column) = line_column(self.source, span.start);
                    errors.push(TemplateError::InvalidPlaceholder {
                        span: span.clone(),
                        line,
                        column,
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(output)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> SubstitutionTable {
        SubstitutionTable::from_entries([
            ("A", "alpha"),
            ("B", "\nline one\nline two\n"),
            ("NESTED", "see @@A and $HOME"),
        ])
        .unwrap()
    }

    #[test]
    fn test_literal_text_is_unchanged() {
        let src = "FROM ubuntu\nRUN echo $PATH user@host\n";
        assert_eq!(Template::new(src).substitute(&table()).unwrap(), src);
    }

    #[test]
    fn test_empty_template() {
        assert_eq!(Template::new("").substitute(&table()).unwrap(), "");
    }

    #[test]
    fn test_every_occurrence_replaced() {
        let out = Template::new("@@A-@@A @@{A}x").substitute(&table()).unwrap();
        assert_eq!(out, "alpha-alpha alphax");
    }

    #[test]
    fn test_named_placeholder_stops_at_non_identifier() {
        let out = Template::new("@@A.@@B").substitute(&table()).unwrap();
        assert_eq!(out, "alpha.\nline one\nline two\n");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let out = Template::new("@@NESTED").substitute(&table()).unwrap();
        assert_eq!(out, "see @@A and $HOME");
    }

    #[test]
    fn test_escape() {
        let out = Template::new("a@@@@b").substitute(&table()).unwrap();
        assert_eq!(out, "a@@b");
    }

    #[test]
    fn test_undefined_placeholders_all_reported() {
        let errors = Template::new("@@A @@MISSING\n@@{a}")
            .substitute(&table())
            .unwrap_err();
        assert_eq!(
            errors,
            vec![
                TemplateError::UndefinedPlaceholder {
                    name: "MISSING".to_string(),
                    span: 4..13,
                    suggestions: vec![],
                },
                TemplateError::UndefinedPlaceholder {
                    name: "a".to_string(),
                    span: 14..19,
                    suggestions: vec!["A".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_invalid_placeholder_position() {
        let errors = Template::new("ok\n  @@ 1").substitute(&table()).unwrap_err();
        assert_eq!(
            errors,
            vec![TemplateError::InvalidPlaceholder {
                span: 5..7,
                line: 2,
                column: 3,
            }]
        );
    }

    #[test]
    fn test_malformed_delimiters_fail() {
        for (src, line, column) in [
            ("@@{OPEN", 1, 1),
            ("ok @@@", 1, 4),
            ("@@{1}", 1, 1),
            ("x\n@@{A x}", 2, 1),
            ("@@{{A}}", 1, 1),
        ] {
            let errors = Template::new(src).substitute(&table()).unwrap_err();
            assert_eq!(errors.len(), 1, "{:?}", src);
            assert!(
                matches!(
                    errors[0],
                    TemplateError::InvalidPlaceholder { line: l, column: c, .. } if l == line && c == column
                ),
                "{:?} gave {:?}",
                src,
                errors
            );
        }
    }

    #[test]
    fn test_unterminated_brace_after_valid_one() {
        let errors = Template::new("x@@{A}@@{A").substitute(&table()).unwrap_err();
        assert_eq!(
            errors,
            vec![TemplateError::InvalidPlaceholder {
                span: 6..8,
                line: 1,
                column: 7,
            }]
        );
    }

    #[test]
    fn test_identifiers_and_validity() {
        let template = Template::new("@@B @@A @@{B} @@@@C");
        assert_eq!(template.identifiers(), vec!["B", "A"]);
        assert!(template.is_valid());
        assert!(!Template::new("trailing @@").is_valid());
    }
}
