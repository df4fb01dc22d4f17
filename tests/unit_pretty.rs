//! Unit tests for pretty-printing roundtrips

use cswfilter::ast::*;
use cswfilter::pretty::{pretty_print, render_query};
use cswfilter::{FilterTranslator, parse_cql};

fn roundtrip(input: &str) -> String {
    let parsed = parse_cql(input).expect("parse failed");
    let printed = pretty_print(&parsed);
    let reparsed = parse_cql(&printed)
        .unwrap_or_else(|e| panic!("reparse of {:?} failed: {}", printed, e));
    assert_eq!(parsed, reparsed, "printed as {:?}", printed);
    printed
}

#[test]
fn test_roundtrip_comparisons() {
    assert_eq!(roundtrip("Title = 'VM'"), "Title = 'VM'");
    assert_eq!(roundtrip("Scale>=10"), "Scale >= 10");
    assert_eq!(roundtrip("Title != 'VM'"), "Title <> 'VM'");
    assert_eq!(roundtrip("Title LIKE 'VM%'"), "Title LIKE 'VM%'");
    assert_eq!(roundtrip("Title IS NULL"), "Title IS NULL");
    assert_eq!(roundtrip("Scale BETWEEN 1 AND 2.5"), "Scale BETWEEN 1 AND 2.5");
}

#[test]
fn test_roundtrip_negated_predicates() {
    assert_eq!(roundtrip("Title NOT LIKE 'a%'"), "NOT Title LIKE 'a%'");
    assert_eq!(roundtrip("Title IS NOT NULL"), "NOT Title IS NULL");
}

#[test]
fn test_roundtrip_quotes() {
    assert_eq!(roundtrip("Title = 'it''s'"), "Title = 'it''s'");
}

#[test]
fn test_roundtrip_keyword_property_is_quoted() {
    assert_eq!(roundtrip(r#""During" = 'x'"#), r#""During" = 'x'"#);
    assert_eq!(roundtrip("dc:and = 'x'"), "dc:and = 'x'");
}

#[test]
fn test_roundtrip_groups() {
    assert_eq!(
        roundtrip("(A = 'a' OR B = 'b') AND C = 'c'"),
        "(A = 'a' OR B = 'b') AND C = 'c'"
    );
    assert_eq!(
        roundtrip("A = 'a' OR B = 'b' AND C = 'c'"),
        "A = 'a' OR (B = 'b' AND C = 'c')"
    );
    assert_eq!(
        roundtrip("NOT (A = 'a' AND B = 'b')"),
        "NOT (A = 'a' AND B = 'b')"
    );
}

#[test]
fn test_roundtrip_temporal() {
    assert_eq!(
        roundtrip("Modified AFTER 2007-06-02T00:00:00Z"),
        "Modified AFTER 2007-06-02T00:00:00Z"
    );
    assert_eq!(
        roundtrip("Modified DURING 2007-01-01/'2007-12-31 10:00:00'"),
        "Modified DURING 2007-01-01/'2007-12-31 10:00:00'"
    );
}

#[test]
fn test_roundtrip_spatial() {
    assert_eq!(
        roundtrip("BBOX(BoundingBox, -10, 40.5, 10, 50, 'EPSG:4326')"),
        "BBOX(BoundingBox, -10, 40.5, 10, 50, 'EPSG:4326')"
    );
    assert_eq!(
        roundtrip("INTERSECTS(geom, POLYGON((0 0, 1 0, 1 1, 0 0), (0.2 0.2, 0.4 0.2, 0.2 0.2)))"),
        "INTERSECTS(geom, POLYGON((0 0, 1 0, 1 1, 0 0), (0.2 0.2, 0.4 0.2, 0.2 0.2)))"
    );
    assert_eq!(
        roundtrip("DWITHIN(geom, POINT(1 2), 10, statute miles)"),
        "DWITHIN(geom, POINT(1 2), 10, statute miles)"
    );
    assert_eq!(
        roundtrip("BEYOND(geom, LINESTRING(0 0, 1 1), 3, 'urn:ogc:def:uom:EPSG::9001')"),
        "BEYOND(geom, LINESTRING(0 0, 1 1), 3, 'urn:ogc:def:uom:EPSG::9001')"
    );
}

#[test]
fn test_roundtrip_ids() {
    assert_eq!(roundtrip("IN ('a', 'b')"), "IN ('a', 'b')");
}

#[test]
fn test_print_filter_encoding_like() {
    let like = Filter::Comparison(Comparison::Like {
        property: Some("Title".to_string()),
        pattern: Some("*50!%?".to_string()),
        wildcard: '*',
        single_char: '?',
        escape: '!',
    });
    assert_eq!(pretty_print(&like), r"Title LIKE '%50\%_'");
}

#[test]
fn test_print_missing_parts() {
    let filter = Filter::Comparison(Comparison::IsNull { property: None });
    assert_eq!(pretty_print(&filter), "? IS NULL");
}

#[test]
fn test_render_query_outline() {
    let query = FilterTranslator::default()
        .translate_cql("BBOX(BoundingBox, 0, 0, 1, 1) AND Title = 'VM'")
        .unwrap();
    assert_eq!(
        render_query(&query),
        "AND\n  spatial: BBOX(BoundingBox, ENVELOPE(0, 0, 1, 1)) [EPSG:4326]\n  text: Title:\"VM\"\n"
    );
}

#[test]
fn test_render_text_leaf() {
    let query = FilterTranslator::default().translate_cql("Title = 'VM'").unwrap();
    assert_eq!(render_query(&query), "text: Title:\"VM\"\n");
}
