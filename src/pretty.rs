//! Pretty-printer for filters and translated queries
//!
//! Renders a filter back to CQL (parsing the output gives the same tree) and
//! a translated query as an indented outline for diagnostics.

use crate::ast::*;
use crate::lexer::is_keyword;
use crate::query::Query;

/// Pretty-print configuration
pub struct PrettyConfig {
    pub indent: usize,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// A pretty-printer with indentation tracking
pub struct Pretty {
    output: String,
    indent_level: usize,
    config: PrettyConfig,
}

impl Default for Pretty {
    fn default() -> Self {
        Self::new()
    }
}

impl Pretty {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            config: PrettyConfig::default(),
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn indent(&mut self) {
        for _ in 0..(self.indent_level * self.config.indent) {
            self.output.push(' ');
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn writeln(&mut self, s: &str) {
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn inc_indent(&mut self) {
        self.indent_level += 1;
    }

    fn dec_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }
}

// ============ CQL ============

impl Pretty {
    pub fn filter(&mut self, filter: &Filter) {
        match filter {
            Filter::And(operands) => self.logical(operands, " AND "),
            Filter::Or(operands) => self.logical(operands, " OR "),
            Filter::Not(inner) => {
                self.write("NOT ");
                self.operand(inner);
            }
            Filter::Comparison(c) => self.comparison(c),
            Filter::Temporal(t) => self.temporal(t),
            Filter::Spatial(s) => self.spatial(s),
            Filter::Id(ids) => {
                self.write("IN (");
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.string(id);
                }
                self.write(")");
            }
        }
    }

    fn logical(&mut self, operands: &[Filter], separator: &str) {
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            self.operand(operand);
        }
    }

    /// Print an operand of AND/OR/NOT, grouping nested AND/OR
    fn operand(&mut self, filter: &Filter) {
        match filter {
            Filter::And(_) | Filter::Or(_) => {
                self.write("(");
                self.filter(filter);
                self.write(")");
            }
            _ => self.filter(filter),
        }
    }

    fn property(&mut self, property: &Option<String>) {
        match property {
            Some(p) if is_plain_identifier(p) => self.write(p),
            Some(p) => {
                self.write("\"");
                self.write(p);
                self.write("\"");
            }
            None => self.write("?"),
        }
    }

    fn string(&mut self, s: &str) {
        self.write("'");
        self.write(&s.replace('\'', "''"));
        self.write("'");
    }

    fn literal(&mut self, literal: &Option<Literal>) {
        match literal {
            Some(Literal::Text(s)) => self.string(s),
            Some(Literal::Number(n)) => self.write(n),
            Some(Literal::Temporal(d)) => self.write(d),
            None => self.write("?"),
        }
    }

    pub fn comparison(&mut self, comparison: &Comparison) {
        match comparison {
            Comparison::Binary {
                operator,
                property,
                literal,
            } => {
                self.property(property);
                self.write(" ");
                self.write(operator.symbol());
                self.write(" ");
                self.literal(literal);
            }
            Comparison::Like {
                property,
                pattern,
                wildcard,
                single_char,
                escape,
            } => {
                self.property(property);
                self.write(" LIKE ");
                match pattern {
                    Some(p) => {
                        let p = cql_pattern(p, *wildcard, *single_char, *escape);
                        self.string(&p);
                    }
                    None => self.write("?"),
                }
            }
            Comparison::IsNull { property } => {
                self.property(property);
                self.write(" IS NULL");
            }
            Comparison::Between {
                property,
                lower,
                upper,
            } => {
                self.property(property);
                self.write(" BETWEEN ");
                self.literal(lower);
                self.write(" AND ");
                self.literal(upper);
            }
        }
    }

    fn datetime(&mut self, value: &str) {
        if looks_like_datetime(value) {
            self.write(value);
        } else {
            self.string(value);
        }
    }

    pub fn temporal(&mut self, temporal: &Temporal) {
        self.property(&temporal.property);
        self.write(" ");
        self.write(temporal.operator.keyword());
        self.write(" ");
        match &temporal.value {
            Some(TemporalValue::Instant(v)) => self.datetime(v),
            Some(TemporalValue::Period { begin, end }) => {
                self.datetime(begin);
                self.write("/");
                self.datetime(end);
            }
            None => self.write("?"),
        }
    }

    fn geometry(&mut self, geometry: &Option<Geometry>) {
        match geometry {
            Some(g) => self.write(&g.to_string()),
            None => self.write("?"),
        }
    }

    pub fn spatial(&mut self, spatial: &Spatial) {
        match spatial {
            Spatial::Binary {
                operator,
                property,
                geometry,
            } => {
                self.write(operator.keyword());
                self.write("(");
                self.property(property);
                self.write(", ");
                self.geometry(geometry);
                self.write(")");
            }
            Spatial::BBox {
                property,
                envelope,
                crs,
            } => {
                self.write("BBOX(");
                self.property(property);
                self.write(", ");
                match envelope {
                    Some(e) => self.write(&format!(
                        "{}, {}, {}, {}",
                        e.min_x, e.min_y, e.max_x, e.max_y
                    )),
                    None => self.write("?"),
                }
                if let Some(crs) = crs {
                    self.write(", ");
                    self.string(crs);
                }
                self.write(")");
            }
            Spatial::Distance {
                operator,
                property,
                geometry,
                distance,
            } => {
                self.write(operator.keyword());
                self.write("(");
                self.property(property);
                self.write(", ");
                self.geometry(geometry);
                self.write(", ");
                match distance {
                    Some(d) => {
                        self.write(&d.value.to_string());
                        self.write(", ");
                        if is_plain_units(&d.units) {
                            self.write(&d.units);
                        } else {
                            self.string(&d.units);
                        }
                    }
                    None => self.write("?"),
                }
                self.write(")");
            }
        }
    }
}

/// True if `name` lexes back as the same identifier without quotes
fn is_plain_identifier(name: &str) -> bool {
    fn ident(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    match name.split_once(':') {
        Some((prefix, local)) => ident(prefix) && ident(local),
        None => ident(name) && !is_keyword(name),
    }
}

fn is_plain_units(units: &str) -> bool {
    let words: Vec<&str> = units.split(' ').collect();
    words
        .iter()
        .all(|w| !w.contains(':') && is_plain_identifier(w))
}

/// True if `value` lexes as a single date/time token
fn looks_like_datetime(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 10 {
        return false;
    }
    let date_ok = bytes[..10].iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !date_ok {
        return false;
    }
    let time = &value[10..];
    match time.strip_prefix('T') {
        Some(rest) => rest
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ':' | '.' | 'Z' | '+' | '-')),
        None => time.is_empty(),
    }
}

/// Rewrite a LIKE pattern with the CQL wildcard characters
fn cql_pattern(pattern: &str, wildcard: char, single_char: char, escape: char) -> String {
    if (wildcard, single_char, escape) == (CQL_WILDCARD, CQL_SINGLE_CHAR, CQL_ESCAPE) {
        return pattern.to_string();
    }
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == escape {
            if let Some(next) = chars.next() {
                if matches!(next, CQL_WILDCARD | CQL_SINGLE_CHAR | CQL_ESCAPE) {
                    out.push(CQL_ESCAPE);
                }
                out.push(next);
            }
        } else if c == wildcard {
            out.push(CQL_WILDCARD);
        } else if c == single_char {
            out.push(CQL_SINGLE_CHAR);
        } else {
            if matches!(c, CQL_WILDCARD | CQL_SINGLE_CHAR | CQL_ESCAPE) {
                out.push(CQL_ESCAPE);
            }
            out.push(c);
        }
    }
    out
}

// ============ Translated queries ============

impl Pretty {
    pub fn query(&mut self, query: &Query) {
        self.indent();
        match query {
            Query::Text(text) => {
                self.write("text: ");
                self.writeln(text);
            }
            Query::Spatial(filter) => {
                self.write("spatial: ");
                self.writeln(&filter.to_string());
            }
            Query::Composite { operator, children } => {
                self.writeln(operator.as_str());
                self.inc_indent();
                for child in children {
                    self.query(child);
                }
                self.dec_indent();
            }
        }
    }
}

/// Render a filter as CQL
pub fn pretty_print(filter: &Filter) -> String {
    let mut p = Pretty::new();
    p.filter(filter);
    p.finish()
}

/// Render a translated query as an indented outline
pub fn render_query(query: &Query) -> String {
    let mut p = Pretty::new();
    p.query(query);
    p.finish()
}

// Unit tests moved to tests/unit_pretty.rs
