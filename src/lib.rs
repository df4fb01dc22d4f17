//! cswfilter: catalog search constraints to Lucene queries
//!
//! A CSW `GetRecords` request carries its constraint either as OGC CQL text
//! or as an `ogc:Filter` tree. This crate parses the CQL form, translates
//! either form into a [`SearchQuery`] that a Lucene-backed catalog can run,
//! and reports every unusable constraint as a [`FilterParserError`].

pub mod ast;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod query;
pub mod repl;
pub mod temporal;
pub mod translate;
pub mod units;

pub use ast::*;
pub use config::{ConfigError, TranslatorConfig, TranslatorConfigLayer};
pub use error::{ExceptionCode, FilterParserError, FilterResult};
pub use lexer::lexer;
pub use parser::parser;
pub use pretty::{pretty_print, render_query};
pub use query::{
    GeometryOperator, LogicalOperator, Query, SearchQuery, SortBy, SortField, SortOrder,
    SpatialFilter,
};
pub use translate::{
    FilterTranslator, FilterVersion, QueryConstraint, QueryRequest, TypeName, MAX_FILTER_DEPTH,
};

/// Parse CQL text into a filter tree
///
/// Syntax errors come back as an invalid `Constraint` value whose message
/// holds the rendered diagnostic.
pub fn parse_cql(input: &str) -> FilterResult<Filter> {
    use chumsky::prelude::*;

    if input.trim().is_empty() {
        return Err(malformed("the constraint is empty".to_string()));
    }

    let tokens = lexer::lexer().parse(input).map_err(|errs| {
        malformed(error::format_lexer_errors(input, errs))
    })?;

    let depth = parser::nesting_depth(&tokens);
    if depth > MAX_NESTING {
        return Err(FilterParserError::invalid_constraint(format!(
            "the constraint nests {} levels deep, the limit is {}",
            depth, MAX_NESTING
        )));
    }

    let len = input.chars().count();
    let filter = parser::parser()
        .parse(chumsky::Stream::from_iter(
            len..len + 1,
            tokens.clone().into_iter(),
        ))
        .map_err(|errs| malformed(error::format_parser_errors(input, errs, &tokens)))?;
    Ok(filter)
}

fn malformed(report: String) -> FilterParserError {
    FilterParserError::invalid_constraint(format!("malformed CQL constraint:\n{}", report))
}
