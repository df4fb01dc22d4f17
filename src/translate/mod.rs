//! Filter translation
//!
//! Walks a [`Filter`] tree bottom-up and produces a [`Query`]:
//!
//! - comparison, temporal and identifier predicates become Lucene text,
//! - spatial predicates become [`SpatialFilter`]s,
//! - AND/OR merge text children into one string when they can, and fall back
//!   to a composite node when geometry or nested composites are involved,
//! - NOT always yields a composite so the negation stays explicit.
//!
//! A [`FilterTranslator`] is immutable; translating is a pure function of the
//! request and may run concurrently from any number of threads.

mod comparison;
mod logical;
mod spatial;

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::ast::{Filter, MAX_NESTING};
use crate::config::TranslatorConfig;
use crate::error::{ExceptionCode, FilterParserError, FilterResult, VERSION_LOCATOR};
use crate::query::{LogicalOperator, Query, SearchQuery, SortBy, SortField, SortOrder};

pub use comparison::escape_phrase;

/// Filter Encoding versions a request may declare
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterVersion {
    V1_0_0,
    V1_1_0,
    V2_0_0,
}

impl FilterVersion {
    /// Temporal operators arrived with Filter Encoding 2.0
    pub fn supports_temporal(self) -> bool {
        self >= FilterVersion::V2_0_0
    }
}

impl fmt::Display for FilterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = match self {
            FilterVersion::V1_0_0 => "1.0.0",
            FilterVersion::V1_1_0 => "1.1.0",
            FilterVersion::V2_0_0 => "2.0.0",
        };
        f.write_str(v)
    }
}

impl FromStr for FilterVersion {
    type Err = FilterParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.0.0" | "1.0" => Ok(FilterVersion::V1_0_0),
            "1.1.0" | "1.1" => Ok(FilterVersion::V1_1_0),
            "2.0.0" | "2.0" => Ok(FilterVersion::V2_0_0),
            other => Err(FilterParserError::new(
                ExceptionCode::InvalidParameterValue,
                VERSION_LOCATOR,
                format!("unsupported filter version '{}'", other),
            )),
        }
    }
}

/// A qualified record type name, e.g. `gmd:MD_Metadata`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub prefix: Option<String>,
    pub local_name: String,
}

impl TypeName {
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local_name: local_name.into(),
        }
    }

    /// Split `prefix:Local` (or `{namespace}Local`) into its parts
    pub fn parse(qualified: &str) -> Self {
        let qualified = qualified.trim();
        if let Some(rest) = qualified.strip_prefix('{') {
            if let Some((ns, local)) = rest.split_once('}') {
                return Self {
                    prefix: Some(ns.to_string()),
                    local_name: local.to_string(),
                };
            }
        }
        match qualified.rsplit_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_string()),
                local_name: local.to_string(),
            },
            None => Self::new(qualified),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// The constraint of a catalog query: CQL text or a Filter tree, never both
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryConstraint {
    pub cql_text: Option<String>,
    pub filter: Option<Filter>,
}

impl QueryConstraint {
    pub fn cql(text: impl Into<String>) -> Self {
        Self {
            cql_text: Some(text.into()),
            filter: None,
        }
    }

    pub fn filter(filter: Filter) -> Self {
        Self {
            cql_text: None,
            filter: Some(filter),
        }
    }
}

/// Everything a translation depends on
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryRequest {
    pub constraint: QueryConstraint,
    pub version: Option<FilterVersion>,
    pub sort_by: Vec<SortBy>,
    pub type_names: Vec<TypeName>,
}

impl QueryRequest {
    pub fn new(constraint: QueryConstraint) -> Self {
        Self {
            constraint,
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: FilterVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_type_names(mut self, type_names: Vec<TypeName>) -> Self {
        self.type_names = type_names;
        self
    }

    pub fn with_sort(mut self, sort_by: Vec<SortBy>) -> Self {
        self.sort_by = sort_by;
        self
    }
}

/// Per-call translation settings
#[derive(Clone, Copy, Debug)]
struct Scope {
    /// Temporal operators are always available from CQL, but only from
    /// Filter Encoding 2.0 documents
    temporal_allowed: bool,
    /// Logical nodes above the current one
    depth: usize,
}

/// Deepest AND/OR/NOT nesting accepted in a Filter tree
///
/// A parenthesised CQL level can hold an OR and an AND node as well as NOTs,
/// so this leaves room for everything [`MAX_NESTING`] lets through.
pub const MAX_FILTER_DEPTH: usize = 4 * MAX_NESTING;

impl Scope {
    fn nested(self) -> FilterResult<Self> {
        if self.depth >= MAX_FILTER_DEPTH {
            return Err(FilterParserError::invalid_constraint(format!(
                "the filter nests more than {} logical operators deep",
                MAX_FILTER_DEPTH
            )));
        }
        Ok(Self {
            depth: self.depth + 1,
            ..self
        })
    }
}

/// Translates constraints into catalog queries
#[derive(Clone, Debug, Default)]
pub struct FilterTranslator {
    config: TranslatorConfig,
}

impl FilterTranslator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate a full query request
    pub fn translate(&self, request: &QueryRequest) -> FilterResult<SearchQuery> {
        let constraint = &request.constraint;
        debug!(
            cql = constraint.cql_text.is_some(),
            filter = constraint.filter.is_some(),
            version = ?request.version,
            type_names = request.type_names.len(),
            "translating query constraint"
        );

        let query = match (&constraint.cql_text, &constraint.filter) {
            (Some(_), Some(_)) => {
                return Err(FilterParserError::invalid_constraint(
                    "the query constraint must be in Filter or CQL but not both",
                ))
            }
            (None, None) => {
                return Err(FilterParserError::missing_constraint(
                    "the query constraint must contain a Filter or a CQL query",
                ))
            }
            (Some(cql), None) => self.translate_cql(cql)?,
            (None, Some(filter)) => self.translate_filter(filter, request.version)?,
        };

        let query = self.scope_to_types(query, &request.type_names);
        let sort = self.sort_fields(&request.sort_by);

        debug!(
            leaf = query.is_leaf(),
            depth = query.depth(),
            sort = sort.len(),
            "translated query constraint"
        );
        Ok(SearchQuery { query, sort })
    }

    /// Parse and translate CQL text
    pub fn translate_cql(&self, cql: &str) -> FilterResult<Query> {
        let filter = crate::parse_cql(cql)?;
        trace!(?filter, "parsed CQL constraint");
        self.visit(
            Scope {
                temporal_allowed: true,
                depth: 0,
            },
            &filter,
        )
    }

    /// Translate a Filter tree, e.g. one unmarshalled from `ogc:Filter` XML
    pub fn translate_filter(
        &self,
        filter: &Filter,
        version: Option<FilterVersion>,
    ) -> FilterResult<Query> {
        let scope = Scope {
            temporal_allowed: version.map_or(true, FilterVersion::supports_temporal),
            depth: 0,
        };
        self.visit(scope, filter)
    }

    fn visit(&self, scope: Scope, filter: &Filter) -> FilterResult<Query> {
        match filter {
            Filter::Comparison(comparison) => self.comparison(comparison).map(Query::Text),
            Filter::Temporal(temporal) => {
                if !scope.temporal_allowed {
                    return Err(FilterParserError::unsupported(format!(
                        "temporal operator {} requires filter version 2.0.0",
                        temporal.operator.keyword()
                    )));
                }
                self.temporal(temporal).map(Query::Text)
            }
            Filter::Id(ids) => self.identifiers(ids).map(Query::Text),
            Filter::Spatial(spatial) => self.spatial(spatial).map(Query::Spatial),
            Filter::And(operands) => {
                self.binary_logic(scope.nested()?, LogicalOperator::And, operands)
            }
            Filter::Or(operands) => {
                self.binary_logic(scope.nested()?, LogicalOperator::Or, operands)
            }
            Filter::Not(operand) => self.negation(scope.nested()?, operand),
        }
    }

    /// Restrict a query to records of the given types
    ///
    /// The original query is kept intact: a text query is ANDed with the
    /// type clause, anything else becomes a sub-query under it.
    pub fn scope_to_types(&self, query: Query, type_names: &[TypeName]) -> Query {
        let clause = match type_names {
            [] => return query,
            [single] => self.type_clause(single),
            several => {
                let clauses: Vec<String> = several.iter().map(|t| self.type_clause(t)).collect();
                format!("({})", clauses.join(" OR "))
            }
        };

        match query {
            Query::Text(text) => {
                Query::Text(format!("({} AND {})", logical::clause(text), clause))
            }
            other => Query::Composite {
                operator: LogicalOperator::And,
                children: vec![Query::Text(clause), other],
            },
        }
    }

    fn type_clause(&self, type_name: &TypeName) -> String {
        format!(
            "{}:\"{}\"",
            self.config.type_field,
            escape_phrase(&type_name.local_name)
        )
    }

    /// Map sort criteria onto the index's sortable fields
    pub fn sort_fields(&self, sort_by: &[SortBy]) -> Vec<SortField> {
        sort_by
            .iter()
            .map(|s| SortField {
                field: format!("{}{}", local_name(&s.property), self.config.sort_suffix),
                descending: s.order == SortOrder::Descending,
            })
            .collect()
    }
}

/// Strip namespace prefixes and XPath steps from a property name
///
/// `apiso:Title` and `/csw:Record/dc:title` index as `Title` and `title`.
pub fn local_name(property: &str) -> &str {
    let step = property.rsplit('/').next().unwrap_or(property);
    step.rsplit(':').next().unwrap_or(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("Title"), "Title");
        assert_eq!(local_name("apiso:Title"), "Title");
        assert_eq!(local_name("/csw:Record/dc:title"), "title");
    }

    #[test]
    fn test_type_name_parse() {
        let t = TypeName::parse("gmd:MD_Metadata");
        assert_eq!(t.prefix.as_deref(), Some("gmd"));
        assert_eq!(t.local_name, "MD_Metadata");

        let t = TypeName::parse("{http://www.opengis.net/cat/csw/2.0.2}Record");
        assert_eq!(t.local_name, "Record");

        assert_eq!(TypeName::parse("Record"), TypeName::new("Record"));
    }

    #[test]
    fn test_version_parse() {
        assert_eq!("1.1.0".parse::<FilterVersion>().unwrap(), FilterVersion::V1_1_0);
        assert!(FilterVersion::V2_0_0.supports_temporal());
        assert!(!FilterVersion::V1_1_0.supports_temporal());

        let err = "3.0.0".parse::<FilterVersion>().unwrap_err();
        assert_eq!(err.locator, "version");
    }
}
