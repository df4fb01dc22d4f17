//! Error types for filter translation
//!
//! Every failure surfaces as a [`FilterParserError`] carrying an OWS exception
//! code and a locator naming the offending request parameter. CQL syntax
//! errors additionally carry an ariadne report pointing into the source text.

use ariadne::{Config, Label, Report, ReportKind, Source};
use chumsky::error::SimpleReason;
use chumsky::prelude::Simple;
use std::fmt;
use std::ops::Range;

use crate::lexer::Token;

/// Locator used for errors in the query constraint itself
pub const CONSTRAINT_LOCATOR: &str = "Constraint";

/// Locator used for an unsupported filter version
pub const VERSION_LOCATOR: &str = "version";

/// OWS exception codes a translation can fail with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExceptionCode {
    InvalidParameterValue,
    MissingParameterValue,
    OperationNotSupported,
}

impl ExceptionCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ExceptionCode::InvalidParameterValue => "InvalidParameterValue",
            ExceptionCode::MissingParameterValue => "MissingParameterValue",
            ExceptionCode::OperationNotSupported => "OperationNotSupported",
        }
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A constraint that cannot be turned into a query
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{code} ({locator}): {message}")]
pub struct FilterParserError {
    pub code: ExceptionCode,
    pub locator: String,
    pub message: String,
}

impl FilterParserError {
    pub fn new(
        code: ExceptionCode,
        locator: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            locator: locator.into(),
            message: message.into(),
        }
    }

    /// Invalid parameter value on the query constraint
    pub fn invalid_constraint(message: impl Into<String>) -> Self {
        Self::new(
            ExceptionCode::InvalidParameterValue,
            CONSTRAINT_LOCATOR,
            message,
        )
    }

    pub fn missing_constraint(message: impl Into<String>) -> Self {
        Self::new(
            ExceptionCode::MissingParameterValue,
            CONSTRAINT_LOCATOR,
            message,
        )
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(
            ExceptionCode::OperationNotSupported,
            CONSTRAINT_LOCATOR,
            message,
        )
    }
}

pub type FilterResult<T> = Result<T, FilterParserError>;

fn plain_report(
    offset: usize,
    message: &str,
    span: Range<usize>,
    label: String,
) -> Report<'static, Range<usize>> {
    Report::build(ReportKind::Error, (), offset)
        .with_config(Config::default().with_color(false))
        .with_message(message)
        .with_label(Label::new(span).with_message(label))
        .finish()
}

/// Format lexer errors into a user-friendly string
pub fn format_lexer_errors(source: &str, errors: Vec<Simple<char>>) -> String {
    let mut output = Vec::new();

    for error in errors {
        let span = error.span();
        let report = plain_report(span.start, "Lexical error", span, format_lexer_error(&error));
        // Writing into a Vec cannot fail
        report
            .write(Source::from(source), &mut output)
            .expect("Failed to write error report");
    }

    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}

/// Format a single lexer error into a readable message
fn format_lexer_error(error: &Simple<char>) -> String {
    let found = error
        .found()
        .map(|c| format!("'{}'", c))
        .unwrap_or_else(|| "end of input".to_string());

    if error.expected().next().is_some() {
        format!(
            "Unexpected {}, expected {}",
            found,
            format_char_set(error.expected())
        )
    } else {
        format!("Unexpected character {}", found)
    }
}

/// Format parser errors into a user-friendly string
///
/// Parser spans are character ranges already (the token stream carries the
/// lexer's spans), so the only special case is the end-of-input marker.
pub fn format_parser_errors(
    source: &str,
    errors: Vec<Simple<Token>>,
    token_spans: &[(Token, Range<usize>)],
) -> String {
    let mut output = Vec::new();
    let len = source.chars().count();

    for error in errors {
        let span = error.span();
        let char_span = if span.start >= len {
            match token_spans.last() {
                Some((_, last)) => last.end..last.end,
                None => 0..0,
            }
        } else {
            span.start..span.end.min(len)
        };

        let report = plain_report(
            char_span.start,
            "Parse error",
            char_span,
            format_parser_error(&error),
        );
        report
            .write(Source::from(source), &mut output)
            .expect("Failed to write error report");
    }

    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}

/// Format a single parser error into a readable message
pub fn format_parser_error(error: &Simple<Token>) -> String {
    let found = error
        .found()
        .map(|t| format!("'{}'", t))
        .unwrap_or_else(|| "end of input".to_string());

    // Custom messages from try_map take precedence
    if let SimpleReason::Custom(msg) = error.reason() {
        return msg.clone();
    }
    if let SimpleReason::Unclosed { delimiter, .. } = error.reason() {
        return format!("Unclosed delimiter '{}'", delimiter);
    }

    let expected = format_token_set(error.expected());

    if !expected.is_empty() {
        format!("Unexpected {}, expected one of: {}", found, expected.join(", "))
    } else if let Some(label) = error.label() {
        format!("Unexpected {}, expected {}", found, label)
    } else {
        format!("Unexpected token {}", found)
    }
}

/// Format a set of expected tokens
fn format_token_set<'a>(expected: impl Iterator<Item = &'a Option<Token>>) -> Vec<String> {
    let mut tokens: Vec<String> = expected
        .filter_map(|opt| opt.as_ref())
        .map(|t| format!("'{}'", t))
        .collect();
    // HashSet iteration order is unstable
    tokens.sort();
    tokens
}

/// Format a set of expected characters
fn format_char_set<'a>(expected: impl Iterator<Item = &'a Option<char>>) -> String {
    let mut chars: Vec<String> = expected
        .filter_map(|opt| opt.as_ref())
        .map(|c| format!("'{}'", c))
        .collect();
    chars.sort();

    if chars.is_empty() {
        "valid character".to_string()
    } else if chars.len() == 1 {
        chars[0].clone()
    } else {
        chars.join(" or ")
    }
}
