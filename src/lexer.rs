//! Lexer for CQL
//!
//! Tokenizes constraint text into a stream for the parser.

use chumsky::prelude::*;
use std::ops::Range;

/// Token types for CQL
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    // Logical and comparison keywords
    And,
    Or,
    Not,
    Like,
    Is,
    Null,
    Between,
    In,

    // Temporal keywords
    Before,
    After,
    During,

    // Spatial operators
    Intersects,
    Contains,
    Crosses,
    Disjoint,
    Equals,
    Overlaps,
    Touches,
    Within,
    BBox,
    DWithin,
    Beyond,

    // Geometry constructors
    Point,
    LineString,
    Polygon,
    Envelope,

    // Literals
    Ident(String),
    Str(String),
    Number(String),
    DateTime(String),

    // Punctuation
    LParen, // (
    RParen, // )
    Comma,  // ,
    Slash,  // /
    Eq,     // =
    Neq,    // <> or !=
    Lt,     // <
    Gt,     // >
    Le,     // <=
    Ge,     // >=
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "{}", s),
            Token::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::Number(s) | Token::DateTime(s) => write!(f, "{}", s),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Slash => write!(f, "/"),
            Token::Eq => write!(f, "="),
            Token::Neq => write!(f, "<>"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Le => write!(f, "<="),
            Token::Ge => write!(f, ">="),
            keyword => match keyword_text(keyword) {
                Some(text) => write!(f, "{}", text),
                None => write!(f, "{:?}", keyword),
            },
        }
    }
}

/// Keyword token for a bare word, matched case-insensitively
pub fn keyword(word: &str) -> Option<Token> {
    let token = match word.to_ascii_uppercase().as_str() {
        "AND" => Token::And,
        "OR" => Token::Or,
        "NOT" => Token::Not,
        "LIKE" => Token::Like,
        "IS" => Token::Is,
        "NULL" => Token::Null,
        "BETWEEN" => Token::Between,
        "IN" => Token::In,
        "BEFORE" => Token::Before,
        "AFTER" => Token::After,
        "DURING" => Token::During,
        "INTERSECTS" => Token::Intersects,
        "CONTAINS" => Token::Contains,
        "CROSSES" => Token::Crosses,
        "DISJOINT" => Token::Disjoint,
        "EQUALS" => Token::Equals,
        "OVERLAPS" => Token::Overlaps,
        "TOUCHES" => Token::Touches,
        "WITHIN" => Token::Within,
        "BBOX" => Token::BBox,
        "DWITHIN" => Token::DWithin,
        "BEYOND" => Token::Beyond,
        "POINT" => Token::Point,
        "LINESTRING" => Token::LineString,
        "POLYGON" => Token::Polygon,
        "ENVELOPE" => Token::Envelope,
        _ => return None,
    };
    Some(token)
}

/// True if `word` would lex as a keyword rather than an identifier
pub fn is_keyword(word: &str) -> bool {
    keyword(word).is_some()
}

fn keyword_text(token: &Token) -> Option<&'static str> {
    let text = match token {
        Token::And => "AND",
        Token::Or => "OR",
        Token::Not => "NOT",
        Token::Like => "LIKE",
        Token::Is => "IS",
        Token::Null => "NULL",
        Token::Between => "BETWEEN",
        Token::In => "IN",
        Token::Before => "BEFORE",
        Token::After => "AFTER",
        Token::During => "DURING",
        Token::Intersects => "INTERSECTS",
        Token::Contains => "CONTAINS",
        Token::Crosses => "CROSSES",
        Token::Disjoint => "DISJOINT",
        Token::Equals => "EQUALS",
        Token::Overlaps => "OVERLAPS",
        Token::Touches => "TOUCHES",
        Token::Within => "WITHIN",
        Token::BBox => "BBOX",
        Token::DWithin => "DWITHIN",
        Token::Beyond => "BEYOND",
        Token::Point => "POINT",
        Token::LineString => "LINESTRING",
        Token::Polygon => "POLYGON",
        Token::Envelope => "ENVELOPE",
        _ => return None,
    };
    Some(text)
}

/// Type alias for spans
pub type Span = Range<usize>;

fn digit() -> impl Parser<char, char, Error = Simple<char>> + Clone {
    filter(|c: &char| c.is_ascii_digit())
}

fn digits(count: usize) -> impl Parser<char, Vec<char>, Error = Simple<char>> + Clone {
    digit().repeated().exactly(count)
}

/// Create a lexer for CQL
pub fn lexer() -> impl Parser<char, Vec<(Token, Span)>, Error = Simple<char>> {
    // Bare words: keywords, or identifiers with an optional `prefix:` part
    let word = text::ident()
        .then(just(':').ignore_then(text::ident()).or_not())
        .map(|(head, local): (String, Option<String>)| match local {
            Some(local) => Token::Ident(format!("{}:{}", head, local)),
            None => keyword(&head).unwrap_or(Token::Ident(head)),
        });

    let quoted_ident = just('"')
        .ignore_then(none_of('"').repeated().at_least(1))
        .then_ignore(just('"'))
        .collect::<String>()
        .map(Token::Ident);

    let string = just('\'')
        .ignore_then(just("''").to('\'').or(none_of('\'')).repeated())
        .then_ignore(just('\''))
        .collect::<String>()
        .map(Token::Str);

    // Dates are checked for validity by the translator, not here
    let time_part = just('T')
        .chain::<char, _, _>(
            filter(|c: &char| c.is_ascii_digit() || matches!(c, ':' | '.' | 'Z' | '+' | '-'))
                .repeated(),
        )
        .or_not()
        .map(Option::unwrap_or_default);
    let datetime = digits(4)
        .chain::<char, _, _>(just('-'))
        .chain::<char, _, _>(digits(2))
        .chain::<char, _, _>(just('-'))
        .chain::<char, _, _>(digits(2))
        .chain::<char, _, _>(time_part)
        .collect::<String>()
        .map(Token::DateTime);

    let fraction = just('.').chain::<char, _, _>(digit().repeated().at_least(1));
    let exponent = one_of("eE")
        .chain::<char, _, _>(one_of("+-").or_not())
        .chain::<char, _, _>(digit().repeated().at_least(1));
    let number = just('-')
        .or_not()
        .chain::<char, _, _>(digit().repeated().at_least(1))
        .chain::<char, _, _>(fraction.or_not().map(Option::unwrap_or_default))
        .chain::<char, _, _>(exponent.or_not().map(Option::unwrap_or_default))
        .collect::<String>()
        .map(Token::Number);

    let punctuation = choice((
        just("<>").to(Token::Neq),
        just("!=").to(Token::Neq),
        just("<=").to(Token::Le),
        just(">=").to(Token::Ge),
        just('<').to(Token::Lt),
        just('>').to(Token::Gt),
        just('=').to(Token::Eq),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just(',').to(Token::Comma),
        just('/').to(Token::Slash),
    ));

    // Order matters: a date starts like a number, a number may start with `-`
    let token = choice((datetime, number, string, quoted_ident, word, punctuation));

    token
        .map_with_span(|tok, span| (tok, span))
        .padded()
        .repeated()
        .then_ignore(end())
}

// Unit tests live in tests/unit_parsing.rs
