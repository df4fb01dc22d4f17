//! Comparison, temporal and identifier predicates as Lucene text

use tracing::trace;

use super::{local_name, FilterTranslator};
use crate::ast::{
    Comparison, ComparisonOperator, Literal, Temporal, TemporalOperator, TemporalValue,
};
use crate::error::{FilterParserError, FilterResult};
use crate::temporal::normalize_date;

/// Characters with a meaning in Lucene query syntax
const LUCENE_SPECIAL: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
    '/',
];

/// Escape a value for use inside a quoted Lucene phrase
pub fn escape_phrase(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a bare Lucene term, such as a field name
///
/// Syntax characters and whitespace get a backslash.
pub fn escape_term(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        push_escaped(&mut out, c);
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    if LUCENE_SPECIAL.contains(&c) || c.is_whitespace() {
        out.push('\\');
    }
    out.push(c);
}

fn field_name(property: &str) -> String {
    escape_term(local_name(property))
}

/// Rewrite a LIKE pattern with Lucene wildcards
///
/// Only the translated wildcards stay live; every other character is
/// matched literally.
fn like_pattern(pattern: &str, wildcard: char, single_char: char, escape: char) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == escape {
            if let Some(next) = chars.next() {
                push_escaped(&mut out, next);
            }
        } else if c == wildcard {
            out.push('*');
        } else if c == single_char {
            out.push('?');
        } else {
            push_escaped(&mut out, c);
        }
    }
    out
}

#[derive(Clone, Copy)]
enum Bound {
    Inclusive,
    Exclusive,
}

fn range(field: &str, bound: Bound, lower: &str, upper: &str) -> String {
    match bound {
        Bound::Inclusive => format!("{}:[{} {}]", field, lower, upper),
        Bound::Exclusive => format!("{}:{{{} {}}}", field, lower, upper),
    }
}

fn require<'a, T>(value: &'a Option<T>, message: impl FnOnce() -> String) -> FilterResult<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| FilterParserError::invalid_constraint(message()))
}

fn require_property<'a>(property: &'a Option<String>, element: &str) -> FilterResult<&'a str> {
    require(property, || {
        format!("a {} must specify the propertyName", element)
    })
    .map(String::as_str)
}

/// The value range sentinels for a field
struct RangeKind<'a> {
    lower: &'a str,
    upper: &'a str,
}

impl FilterTranslator {
    pub(super) fn comparison(&self, comparison: &Comparison) -> FilterResult<String> {
        let text = match comparison {
            Comparison::Binary {
                operator,
                property,
                literal,
            } => {
                let element = operator.element_name();
                let name = local_name(require_property(property, element)?);
                let literal = require(literal, || {
                    format!("a {} must specify a literal value", element)
                })?;
                self.binary_comparison(*operator, name, literal)?
            }
            Comparison::Like {
                property,
                pattern,
                wildcard,
                single_char,
                escape,
            } => {
                let field = field_name(require_property(property, "PropertyIsLike")?);
                let pattern = require(pattern, || {
                    "a PropertyIsLike must specify a literal pattern".to_string()
                })?;
                format!(
                    "{}:({})",
                    field,
                    like_pattern(pattern, *wildcard, *single_char, *escape)
                )
            }
            Comparison::IsNull { property } => {
                let field = field_name(require_property(property, "PropertyIsNull")?);
                format!("{}:null", field)
            }
            Comparison::Between {
                property,
                lower,
                upper,
            } => {
                let name = local_name(require_property(property, "PropertyIsBetween")?);
                let lower = require(lower, || {
                    "a PropertyIsBetween must specify a lower boundary".to_string()
                })?;
                let upper = require(upper, || {
                    "a PropertyIsBetween must specify an upper boundary".to_string()
                })?;
                let (from, _) = self.range_value(name, lower)?;
                let (to, _) = self.range_value(name, upper)?;
                range(&escape_term(name), Bound::Inclusive, &from, &to)
            }
        };
        trace!(%text, "translated comparison");
        Ok(text)
    }

    fn binary_comparison(
        &self,
        operator: ComparisonOperator,
        name: &str,
        literal: &Literal,
    ) -> FilterResult<String> {
        use ComparisonOperator::*;

        let field = escape_term(name);
        match operator {
            EqualTo | NotEqualTo => {
                let value = if self.config.is_date_field(name) {
                    normalize_date(literal.value())?
                } else {
                    literal.value().to_string()
                };
                let phrase = format!("{}:\"{}\"", field, escape_phrase(&value));
                if operator == EqualTo {
                    Ok(phrase)
                } else {
                    Ok(format!("{} NOT {}", self.config.all_documents, phrase))
                }
            }
            GreaterThan | GreaterThanOrEqualTo | LessThan | LessThanOrEqualTo => {
                let (value, kind) = self.range_value(name, literal)?;
                let text = match operator {
                    GreaterThanOrEqualTo => range(&field, Bound::Inclusive, &value, kind.upper),
                    GreaterThan => range(&field, Bound::Exclusive, &value, kind.upper),
                    LessThan => range(&field, Bound::Exclusive, kind.lower, &value),
                    _ => range(&field, Bound::Inclusive, kind.lower, &value),
                };
                Ok(text)
            }
        }
    }

    /// Normalise one side of a range and pick the sentinels for the other
    ///
    /// Numbers on non-date fields stay numeric; everything else must be a date.
    fn range_value(
        &self,
        name: &str,
        literal: &Literal,
    ) -> FilterResult<(String, RangeKind<'_>)> {
        match literal {
            Literal::Number(n) if !self.config.is_date_field(name) => Ok((
                n.clone(),
                RangeKind {
                    lower: &self.config.numeric_lower_bound,
                    upper: &self.config.numeric_upper_bound,
                },
            )),
            other => Ok((normalize_date(other.value())?, self.date_range())),
        }
    }

    fn date_range(&self) -> RangeKind<'_> {
        RangeKind {
            lower: &self.config.date_lower_bound,
            upper: &self.config.date_upper_bound,
        }
    }

    pub(super) fn temporal(&self, temporal: &Temporal) -> FilterResult<String> {
        let keyword = temporal.operator.keyword();
        let field = field_name(require(&temporal.property, || {
            format!("a temporal {} must specify the propertyName", keyword)
        })?);
        let value = require(&temporal.value, || {
            format!("a temporal {} must specify a time value", keyword)
        })?;
        let bounds = self.date_range();

        let text = match (temporal.operator, value) {
            (TemporalOperator::After, TemporalValue::Instant(v)) => {
                range(&field, Bound::Exclusive, &normalize_date(v)?, bounds.upper)
            }
            (TemporalOperator::Before, TemporalValue::Instant(v)) => {
                range(&field, Bound::Exclusive, bounds.lower, &normalize_date(v)?)
            }
            (TemporalOperator::During, TemporalValue::Period { begin, end }) => range(
                &field,
                Bound::Exclusive,
                &normalize_date(begin)?,
                &normalize_date(end)?,
            ),
            (TemporalOperator::During, TemporalValue::Instant(_)) => {
                return Err(FilterParserError::invalid_constraint(
                    "DURING requires a time period",
                ))
            }
            (op, TemporalValue::Period { .. }) => {
                return Err(FilterParserError::invalid_constraint(format!(
                    "{} requires a time instant",
                    op.keyword()
                )))
            }
        };
        Ok(text)
    }

    pub(super) fn identifiers(&self, ids: &[String]) -> FilterResult<String> {
        let clauses: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    "{}:\"{}\"",
                    self.config.identifier_field,
                    escape_phrase(id)
                )
            })
            .collect();
        match clauses.len() {
            0 => Err(FilterParserError::invalid_constraint(
                "an identifier filter must list at least one identifier",
            )),
            1 => Ok(clauses.concat()),
            _ => Ok(format!("({})", clauses.join(" OR "))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_phrase() {
        assert_eq!(escape_phrase("VM"), "VM");
        assert_eq!(escape_phrase(r#"a "b" \c"#), r#"a \"b\" \\c"#);
    }

    #[test]
    fn test_like_pattern_cql() {
        assert_eq!(like_pattern("VM%", '%', '_', '\\'), "VM*");
        assert_eq!(like_pattern("V_M", '%', '_', '\\'), "V?M");
        assert_eq!(like_pattern(r"100\%", '%', '_', '\\'), "100%");
    }

    #[test]
    fn test_like_pattern_escaped_lucene_char() {
        assert_eq!(like_pattern("!*a*", '*', '?', '!'), r"\*a*");
        assert_eq!(like_pattern("a!", '*', '?', '!'), "a");
    }
}
