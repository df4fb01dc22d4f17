//! Parser for CQL
//!
//! Parses token streams into a filter tree.

use chumsky::prelude::*;

use crate::ast::*;
use crate::lexer::{Span, Token};

/// Create a parser for a complete CQL constraint
pub fn parser() -> impl Parser<Token, Filter, Error = Simple<Token>> + Clone {
    filter().then_ignore(end())
}

/// Nesting depth of a token stream: open groups plus pending NOTs
///
/// Measured before parsing, since the grammar recurses once per level.
pub fn nesting_depth(tokens: &[(Token, Span)]) -> usize {
    let mut enclosing = Vec::new();
    let mut base = 0;
    let mut nots = 0;
    let mut deepest = 0;
    for (token, _) in tokens {
        match token {
            Token::Not => nots += 1,
            Token::LParen => {
                enclosing.push(base);
                base += nots + 1;
                nots = 0;
            }
            Token::RParen => {
                base = enclosing.pop().unwrap_or(0);
                nots = 0;
            }
            _ => nots = 0,
        }
        deepest = deepest.max(base + nots);
    }
    deepest
}

// ============================================================================
// Helpers
// ============================================================================

fn property() -> impl Parser<Token, String, Error = Simple<Token>> + Clone {
    select! { Token::Ident(s) => s }.labelled("property name")
}

fn number() -> impl Parser<Token, f64, Error = Simple<Token>> + Clone {
    select! { Token::Number(n) => n }.try_map(|n, span| {
        n.parse::<f64>()
            .map_err(|_| Simple::custom(span, format!("invalid number '{}'", n)))
    })
}

fn literal() -> impl Parser<Token, Literal, Error = Simple<Token>> + Clone {
    select! {
        Token::Str(s) => Literal::Text(s),
        Token::Number(n) => Literal::Number(n),
        Token::DateTime(d) => Literal::Temporal(d),
    }
    .labelled("literal")
}

fn datetime() -> impl Parser<Token, String, Error = Simple<Token>> + Clone {
    select! {
        Token::DateTime(d) => d,
        Token::Str(s) => s,
    }
    .labelled("date")
}

fn comma() -> impl Parser<Token, Token, Error = Simple<Token>> + Clone {
    just(Token::Comma)
}

fn parenthesized<O>(
    inner: impl Parser<Token, O, Error = Simple<Token>> + Clone,
) -> impl Parser<Token, O, Error = Simple<Token>> + Clone {
    inner.delimited_by(just(Token::LParen), just(Token::RParen))
}

// ============================================================================
// Geometries
// ============================================================================

fn coord() -> impl Parser<Token, Coord, Error = Simple<Token>> + Clone {
    number().then(number()).map(|(x, y)| Coord::new(x, y))
}

fn coords() -> impl Parser<Token, Vec<Coord>, Error = Simple<Token>> + Clone {
    coord().separated_by(comma()).at_least(1)
}

fn envelope_args() -> impl Parser<Token, Envelope, Error = Simple<Token>> + Clone {
    number()
        .then_ignore(comma())
        .then(number())
        .then_ignore(comma())
        .then(number())
        .then_ignore(comma())
        .then(number())
        .map(|(((min_x, min_y), max_x), max_y)| Envelope::new(min_x, min_y, max_x, max_y))
}

fn geometry() -> impl Parser<Token, Geometry, Error = Simple<Token>> + Clone {
    let point = just(Token::Point)
        .ignore_then(parenthesized(coord()))
        .map(Geometry::Point);

    let line = just(Token::LineString)
        .ignore_then(parenthesized(coords()))
        .try_map(|cs, span| {
            if cs.len() < 2 {
                Err(Simple::custom(span, "a LINESTRING needs at least two coordinates"))
            } else {
                Ok(Geometry::LineString(cs))
            }
        });

    let polygon = just(Token::Polygon)
        .ignore_then(parenthesized(
            parenthesized(coords()).separated_by(comma()).at_least(1),
        ))
        .map(Geometry::Polygon);

    // Arguments are (min_x, min_y, max_x, max_y)
    let envelope = just(Token::Envelope)
        .ignore_then(parenthesized(envelope_args()))
        .map(Geometry::Envelope);

    choice((point, line, polygon, envelope)).labelled("geometry")
}

/// Units are one or more bare words (`statute miles`) or a quoted string
fn units() -> impl Parser<Token, String, Error = Simple<Token>> + Clone {
    let words = select! { Token::Ident(s) => s }
        .repeated()
        .at_least(1)
        .map(|ws: Vec<String>| ws.join(" "));
    let quoted = select! { Token::Str(s) => s };
    choice((quoted, words)).labelled("distance units")
}

// ============================================================================
// Spatial predicates
// ============================================================================

fn spatial() -> impl Parser<Token, Filter, Error = Simple<Token>> + Clone {
    let operator = select! {
        Token::Intersects => SpatialOperator::Intersects,
        Token::Contains => SpatialOperator::Contains,
        Token::Crosses => SpatialOperator::Crosses,
        Token::Disjoint => SpatialOperator::Disjoint,
        Token::Equals => SpatialOperator::Equals,
        Token::Overlaps => SpatialOperator::Overlaps,
        Token::Touches => SpatialOperator::Touches,
        Token::Within => SpatialOperator::Within,
    };

    let binary = operator
        .then(parenthesized(
            property().then_ignore(comma()).then(geometry()),
        ))
        .map(|(operator, (property, geometry))| Spatial::Binary {
            operator,
            property: Some(property),
            geometry: Some(geometry),
        });

    let crs = comma().ignore_then(select! { Token::Str(s) => s }).or_not();
    let bbox = just(Token::BBox)
        .ignore_then(parenthesized(
            property()
                .then_ignore(comma())
                .then(envelope_args())
                .then(crs),
        ))
        .map(|((property, envelope), crs)| Spatial::BBox {
            property: Some(property),
            envelope: Some(envelope),
            crs,
        });

    let distance_operator = select! {
        Token::DWithin => DistanceOperator::DWithin,
        Token::Beyond => DistanceOperator::Beyond,
    };
    let distance = distance_operator
        .then(parenthesized(
            property()
                .then_ignore(comma())
                .then(geometry())
                .then_ignore(comma())
                .then(number())
                .then_ignore(comma())
                .then(units()),
        ))
        .map(
            |(operator, (((property, geometry), value), units))| Spatial::Distance {
                operator,
                property: Some(property),
                geometry: Some(geometry),
                distance: Some(Distance { value, units }),
            },
        );

    choice((binary, bbox, distance)).map(Filter::Spatial)
}

// ============================================================================
// Property predicates
// ============================================================================

#[derive(Clone)]
enum PredicateTail {
    Compare(ComparisonOperator, Literal),
    Like { negated: bool, pattern: String },
    IsNull { negated: bool },
    Between {
        negated: bool,
        lower: Literal,
        upper: Literal,
    },
    Temporal(TemporalOperator, TemporalValue),
}

fn predicate() -> impl Parser<Token, Filter, Error = Simple<Token>> + Clone {
    let comparison_operator = select! {
        Token::Eq => ComparisonOperator::EqualTo,
        Token::Neq => ComparisonOperator::NotEqualTo,
        Token::Lt => ComparisonOperator::LessThan,
        Token::Gt => ComparisonOperator::GreaterThan,
        Token::Le => ComparisonOperator::LessThanOrEqualTo,
        Token::Ge => ComparisonOperator::GreaterThanOrEqualTo,
    };
    let compare = comparison_operator
        .then(literal())
        .map(|(op, lit)| PredicateTail::Compare(op, lit));

    let not = just(Token::Not).or_not().map(|n| n.is_some());

    let like = not
        .clone()
        .then_ignore(just(Token::Like))
        .then(select! { Token::Str(s) => s })
        .map(|(negated, pattern)| PredicateTail::Like { negated, pattern });

    let is_null = just(Token::Is)
        .ignore_then(not.clone())
        .then_ignore(just(Token::Null))
        .map(|negated| PredicateTail::IsNull { negated });

    let between = not
        .then_ignore(just(Token::Between))
        .then(literal())
        .then_ignore(just(Token::And))
        .then(literal())
        .map(|((negated, lower), upper)| PredicateTail::Between {
            negated,
            lower,
            upper,
        });

    let instant = datetime().map(TemporalValue::Instant);
    let period = datetime()
        .then_ignore(just(Token::Slash))
        .then(datetime())
        .map(|(begin, end)| TemporalValue::Period { begin, end });
    let temporal = choice((
        just(Token::After)
            .ignore_then(instant.clone())
            .map(|v| PredicateTail::Temporal(TemporalOperator::After, v)),
        just(Token::Before)
            .ignore_then(instant)
            .map(|v| PredicateTail::Temporal(TemporalOperator::Before, v)),
        just(Token::During)
            .ignore_then(period)
            .map(|v| PredicateTail::Temporal(TemporalOperator::During, v)),
    ));

    property()
        .then(choice((compare, like, is_null, between, temporal)))
        .map(|(property, tail)| {
            let property = Some(property);
            match tail {
                PredicateTail::Compare(operator, literal) => {
                    Filter::Comparison(Comparison::Binary {
                        operator,
                        property,
                        literal: Some(literal),
                    })
                }
                PredicateTail::Like { negated, pattern } => negate_if(
                    negated,
                    Filter::Comparison(Comparison::Like {
                        property,
                        pattern: Some(pattern),
                        wildcard: CQL_WILDCARD,
                        single_char: CQL_SINGLE_CHAR,
                        escape: CQL_ESCAPE,
                    }),
                ),
                PredicateTail::IsNull { negated } => {
                    negate_if(negated, Filter::Comparison(Comparison::IsNull { property }))
                }
                PredicateTail::Between {
                    negated,
                    lower,
                    upper,
                } => negate_if(
                    negated,
                    Filter::Comparison(Comparison::Between {
                        property,
                        lower: Some(lower),
                        upper: Some(upper),
                    }),
                ),
                PredicateTail::Temporal(operator, value) => Filter::Temporal(Temporal {
                    operator,
                    property,
                    value: Some(value),
                }),
            }
        })
}

fn negate_if(negated: bool, filter: Filter) -> Filter {
    if negated {
        Filter::not(filter)
    } else {
        filter
    }
}

/// `IN ('id1', 'id2', ...)`
fn id_filter() -> impl Parser<Token, Filter, Error = Simple<Token>> + Clone {
    just(Token::In)
        .ignore_then(parenthesized(
            literal()
                .map(|lit| lit.value().to_string())
                .separated_by(comma())
                .at_least(1),
        ))
        .map(Filter::Id)
}

// ============================================================================
// Logical composition
// ============================================================================

fn filter() -> impl Parser<Token, Filter, Error = Simple<Token>> + Clone {
    recursive(|filter| {
        let group = filter.delimited_by(just(Token::LParen), just(Token::RParen));

        let primary = choice((group, spatial(), id_filter(), predicate()));

        let negation = recursive(|negation| {
            just(Token::Not)
                .ignore_then(negation)
                .map(Filter::not)
                .or(primary)
        });

        // Operands are collected rather than folded so a parenthesised group
        // stays its own node: `(a AND b) AND c` is And[And[a, b], c]
        let conjunction = negation
            .separated_by(just(Token::And))
            .at_least(1)
            .map(|operands| collapse(operands, Filter::And));

        conjunction
            .separated_by(just(Token::Or))
            .at_least(1)
            .map(|operands| collapse(operands, Filter::Or))
    })
}

fn collapse(mut operands: Vec<Filter>, join: fn(Vec<Filter>) -> Filter) -> Filter {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        join(operands)
    }
}

// Unit tests live in tests/unit_parsing.rs
