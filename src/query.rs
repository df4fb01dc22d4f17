//! Translated catalog queries
//!
//! A [`Query`] is either a Lucene text query, a spatial filter, or a logical
//! composite of both. Composites appear only where a single Lucene string
//! cannot carry the predicate: mixed text and geometry, or negation.
//!
//! The search side reads a node through its *primary*: a leaf is its own
//! primary, and a composite's primary is its first child when that child is
//! a leaf. Everything after the primary is a sub-query.

use std::fmt;

use crate::ast::{DistanceOperator, Geometry, SpatialOperator};

/// How a node composes its children
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

impl LogicalOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
            LogicalOperator::Not => "NOT",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry predicates understood by the spatial index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryOperator {
    Intersects,
    Contains,
    Crosses,
    Disjoint,
    Equals,
    Overlaps,
    Touches,
    Within,
    BBox,
}

impl From<SpatialOperator> for GeometryOperator {
    fn from(op: SpatialOperator) -> Self {
        match op {
            SpatialOperator::Intersects => GeometryOperator::Intersects,
            SpatialOperator::Contains => GeometryOperator::Contains,
            SpatialOperator::Crosses => GeometryOperator::Crosses,
            SpatialOperator::Disjoint => GeometryOperator::Disjoint,
            SpatialOperator::Equals => GeometryOperator::Equals,
            SpatialOperator::Overlaps => GeometryOperator::Overlaps,
            SpatialOperator::Touches => GeometryOperator::Touches,
            SpatialOperator::Within => GeometryOperator::Within,
        }
    }
}

impl fmt::Display for GeometryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryOperator::Intersects => "INTERSECTS",
            GeometryOperator::Contains => "CONTAINS",
            GeometryOperator::Crosses => "CROSSES",
            GeometryOperator::Disjoint => "DISJOINT",
            GeometryOperator::Equals => "EQUALS",
            GeometryOperator::Overlaps => "OVERLAPS",
            GeometryOperator::Touches => "TOUCHES",
            GeometryOperator::Within => "WITHIN",
            GeometryOperator::BBox => "BBOX",
        };
        f.write_str(name)
    }
}

/// A spatial predicate ready for the geometry index
#[derive(Clone, Debug, PartialEq)]
pub enum SpatialFilter {
    Geometry {
        operator: GeometryOperator,
        field: String,
        geometry: Geometry,
        crs: String,
    },
    Distance {
        operator: DistanceOperator,
        field: String,
        geometry: Geometry,
        crs: String,
        meters: f64,
    },
    /// Several spatial filters joined by one operator
    Chain {
        operator: LogicalOperator,
        filters: Vec<SpatialFilter>,
    },
}

impl SpatialFilter {
    /// Join filters with `operator`; a single filter is returned unchanged
    pub fn chain(operator: LogicalOperator, mut filters: Vec<SpatialFilter>) -> Self {
        if filters.len() == 1 {
            filters.remove(0)
        } else {
            SpatialFilter::Chain { operator, filters }
        }
    }
}

impl fmt::Display for SpatialFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialFilter::Geometry {
                operator,
                field,
                geometry,
                crs,
            } => write!(f, "{}({}, {}) [{}]", operator, field, geometry, crs),
            SpatialFilter::Distance {
                operator,
                field,
                geometry,
                crs,
                meters,
            } => write!(
                f,
                "{}({}, {}, {} m) [{}]",
                operator.keyword(),
                field,
                geometry,
                meters,
                crs
            ),
            SpatialFilter::Chain { operator, filters } => {
                write!(f, "(")?;
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", operator)?;
                    }
                    write!(f, "{}", filter)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A translated query node
#[derive(Clone, Debug, PartialEq)]
pub enum Query {
    /// Lucene query syntax
    Text(String),
    Spatial(SpatialFilter),
    Composite {
        operator: LogicalOperator,
        children: Vec<Query>,
    },
}

impl Query {
    pub fn text_query(text: impl Into<String>) -> Self {
        Query::Text(text.into())
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, Query::Composite { .. })
    }

    /// Operator joining this node's primary to its sub-queries
    pub fn operator(&self) -> LogicalOperator {
        match self {
            Query::Composite { operator, .. } => *operator,
            _ => LogicalOperator::And,
        }
    }

    fn primary(&self) -> Option<&Query> {
        match self {
            Query::Composite { children, .. } => children.first().filter(|c| c.is_leaf()),
            leaf => Some(leaf),
        }
    }

    /// Lucene text of the primary, if it is a text query
    pub fn text(&self) -> Option<&str> {
        match self.primary() {
            Some(Query::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Spatial filter of the primary, if it is one
    pub fn spatial(&self) -> Option<&SpatialFilter> {
        match self.primary() {
            Some(Query::Spatial(filter)) => Some(filter),
            _ => None,
        }
    }

    /// Children after the primary
    pub fn sub_queries(&self) -> &[Query] {
        match self {
            Query::Composite { children, .. } => {
                let skip = usize::from(self.primary().is_some());
                &children[skip..]
            }
            _ => &[],
        }
    }

    /// Depth of composite nesting (leaves are 0)
    pub fn depth(&self) -> usize {
        match self {
            Query::Composite { children, .. } => {
                1 + children.iter().map(Query::depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }
}

/// Sort order requested by the client
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A sort criterion on a queryable property
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortBy {
    pub property: String,
    pub order: SortOrder,
}

impl SortBy {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            order: SortOrder::Descending,
        }
    }
}

/// A sort criterion on an index field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub descending: bool,
}

/// The query handed to the catalog search
#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
    pub query: Query,
    pub sort: Vec<SortField>,
}

impl SearchQuery {
    pub fn text(&self) -> Option<&str> {
        self.query.text()
    }

    pub fn spatial(&self) -> Option<&SpatialFilter> {
        self.query.spatial()
    }

    pub fn sub_queries(&self) -> &[Query] {
        self.query.sub_queries()
    }

    pub fn operator(&self) -> LogicalOperator {
        self.query.operator()
    }
}
