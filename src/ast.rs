//! Filter expression tree
//!
//! One node type for both input forms: CQL text is parsed into it, and the
//! XML binding of `ogc:Filter` documents produces it directly. Parts that the
//! Filter schema marks optional stay optional here, so an incomplete document
//! can be represented and rejected by the translator instead of by the binding.

use std::fmt;

/// Deepest nesting of groups and NOT chains accepted in CQL text
pub const MAX_NESTING: usize = 16;

/// A filter predicate
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// `a AND b AND ...`
    And(Vec<Filter>),
    /// `a OR b OR ...`
    Or(Vec<Filter>),
    /// `NOT a`
    Not(Box<Filter>),
    Comparison(Comparison),
    Temporal(Temporal),
    Spatial(Spatial),
    /// Resource identifier filter, `IN ('id1', 'id2')` in CQL
    Id(Vec<String>),
}

impl Filter {
    pub fn not(inner: Filter) -> Self {
        Filter::Not(Box::new(inner))
    }
}

/// A literal value, kept in its source form
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Quoted string
    Text(String),
    /// Numeric literal (source text, e.g. `-12.5`)
    Number(String),
    /// Unquoted date or date-time (e.g. `2007-06-02T00:00:00Z`)
    Temporal(String),
}

impl Literal {
    pub fn text(s: impl Into<String>) -> Self {
        Literal::Text(s.into())
    }

    pub fn number(s: impl Into<String>) -> Self {
        Literal::Number(s.into())
    }

    pub fn temporal(s: impl Into<String>) -> Self {
        Literal::Temporal(s.into())
    }

    /// The raw value without quoting
    pub fn value(&self) -> &str {
        match self {
            Literal::Text(s) | Literal::Number(s) | Literal::Temporal(s) => s,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Binary comparison operators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    EqualTo,
    NotEqualTo,
    LessThan,
    GreaterThan,
    LessThanOrEqualTo,
    GreaterThanOrEqualTo,
}

impl ComparisonOperator {
    /// Filter Encoding element name, used in error messages
    pub fn element_name(self) -> &'static str {
        match self {
            ComparisonOperator::EqualTo => "PropertyIsEqualTo",
            ComparisonOperator::NotEqualTo => "PropertyIsNotEqualTo",
            ComparisonOperator::LessThan => "PropertyIsLessThan",
            ComparisonOperator::GreaterThan => "PropertyIsGreaterThan",
            ComparisonOperator::LessThanOrEqualTo => "PropertyIsLessThanOrEqualTo",
            ComparisonOperator::GreaterThanOrEqualTo => "PropertyIsGreaterThanOrEqualTo",
        }
    }

    /// CQL symbol
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::EqualTo => "=",
            ComparisonOperator::NotEqualTo => "<>",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThanOrEqualTo => "<=",
            ComparisonOperator::GreaterThanOrEqualTo => ">=",
        }
    }
}

/// Comparison predicates
#[derive(Clone, Debug, PartialEq)]
pub enum Comparison {
    /// `property <op> literal`
    Binary {
        operator: ComparisonOperator,
        property: Option<String>,
        literal: Option<Literal>,
    },
    /// `property LIKE pattern`
    Like {
        property: Option<String>,
        pattern: Option<String>,
        wildcard: char,
        single_char: char,
        escape: char,
    },
    /// `property IS NULL`
    IsNull { property: Option<String> },
    /// `property BETWEEN lower AND upper`
    Between {
        property: Option<String>,
        lower: Option<Literal>,
        upper: Option<Literal>,
    },
}

/// Wildcard characters used by CQL `LIKE`
pub const CQL_WILDCARD: char = '%';
pub const CQL_SINGLE_CHAR: char = '_';
pub const CQL_ESCAPE: char = '\\';

impl Comparison {
    pub fn binary(operator: ComparisonOperator, property: &str, literal: Literal) -> Self {
        Comparison::Binary {
            operator,
            property: Some(property.to_string()),
            literal: Some(literal),
        }
    }

    /// A LIKE predicate with the CQL wildcard characters
    pub fn cql_like(property: &str, pattern: &str) -> Self {
        Comparison::Like {
            property: Some(property.to_string()),
            pattern: Some(pattern.to_string()),
            wildcard: CQL_WILDCARD,
            single_char: CQL_SINGLE_CHAR,
            escape: CQL_ESCAPE,
        }
    }
}

/// Temporal operators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemporalOperator {
    After,
    Before,
    During,
}

impl TemporalOperator {
    pub fn keyword(self) -> &'static str {
        match self {
            TemporalOperator::After => "AFTER",
            TemporalOperator::Before => "BEFORE",
            TemporalOperator::During => "DURING",
        }
    }
}

/// Operand of a temporal operator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemporalValue {
    Instant(String),
    Period { begin: String, end: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Temporal {
    pub operator: TemporalOperator,
    pub property: Option<String>,
    pub value: Option<TemporalValue>,
}

/// Topological spatial operators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpatialOperator {
    Intersects,
    Contains,
    Crosses,
    Disjoint,
    Equals,
    Overlaps,
    Touches,
    Within,
}

impl SpatialOperator {
    pub const ALL: [SpatialOperator; 8] = [
        SpatialOperator::Intersects,
        SpatialOperator::Contains,
        SpatialOperator::Crosses,
        SpatialOperator::Disjoint,
        SpatialOperator::Equals,
        SpatialOperator::Overlaps,
        SpatialOperator::Touches,
        SpatialOperator::Within,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            SpatialOperator::Intersects => "INTERSECTS",
            SpatialOperator::Contains => "CONTAINS",
            SpatialOperator::Crosses => "CROSSES",
            SpatialOperator::Disjoint => "DISJOINT",
            SpatialOperator::Equals => "EQUALS",
            SpatialOperator::Overlaps => "OVERLAPS",
            SpatialOperator::Touches => "TOUCHES",
            SpatialOperator::Within => "WITHIN",
        }
    }
}

/// Distance operators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DistanceOperator {
    DWithin,
    Beyond,
}

impl DistanceOperator {
    pub fn keyword(self) -> &'static str {
        match self {
            DistanceOperator::DWithin => "DWITHIN",
            DistanceOperator::Beyond => "BEYOND",
        }
    }
}

/// A distance with its unit as written (e.g. `10, kilometers`)
#[derive(Clone, Debug, PartialEq)]
pub struct Distance {
    pub value: f64,
    pub units: String,
}

/// Spatial predicates
#[derive(Clone, Debug, PartialEq)]
pub enum Spatial {
    /// `OP(property, geometry)`
    Binary {
        operator: SpatialOperator,
        property: Option<String>,
        geometry: Option<Geometry>,
    },
    /// `BBOX(property, minx, miny, maxx, maxy [, crs])`
    BBox {
        property: Option<String>,
        envelope: Option<Envelope>,
        crs: Option<String>,
    },
    /// `DWITHIN(property, geometry, distance, units)`
    Distance {
        operator: DistanceOperator,
        property: Option<String>,
        geometry: Option<Geometry>,
        distance: Option<Distance>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned envelope, `(min_x, min_y, max_x, max_y)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

/// Geometry literals
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    /// Exterior ring followed by holes
    Polygon(Vec<Vec<Coord>>),
    Envelope(Envelope),
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn coords(f: &mut fmt::Formatter<'_>, cs: &[Coord]) -> fmt::Result {
            for (i, c) in cs.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} {}", c.x, c.y)?;
            }
            Ok(())
        }

        match self {
            Geometry::Point(c) => write!(f, "POINT({} {})", c.x, c.y),
            Geometry::LineString(cs) => {
                write!(f, "LINESTRING(")?;
                coords(f, cs)?;
                write!(f, ")")
            }
            Geometry::Polygon(rings) => {
                write!(f, "POLYGON(")?;
                for (i, ring) in rings.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "(")?;
                    coords(f, ring)?;
                    write!(f, ")")?;
                }
                write!(f, ")")
            }
            Geometry::Envelope(e) => write!(
                f,
                "ENVELOPE({}, {}, {}, {})",
                e.min_x, e.min_y, e.max_x, e.max_y
            ),
        }
    }
}
