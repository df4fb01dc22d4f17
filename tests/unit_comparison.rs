//! Unit tests for comparison, temporal and identifier translation

use cswfilter::ast::*;
use cswfilter::{ExceptionCode, FilterTranslator, FilterVersion, Query};

fn cql(input: &str) -> String {
    match FilterTranslator::default().translate_cql(input) {
        Ok(Query::Text(text)) => text,
        Ok(other) => panic!("expected a text query for {:?}, got {:?}", input, other),
        Err(e) => panic!("translation of {:?} failed: {}", input, e),
    }
}

fn filter(filter: Filter) -> String {
    match FilterTranslator::default().translate_filter(&filter, Some(FilterVersion::V2_0_0)) {
        Ok(Query::Text(text)) => text,
        Ok(other) => panic!("expected a text query, got {:?}", other),
        Err(e) => panic!("translation failed: {}", e),
    }
}

// ============================================================================
// Equality and LIKE
// ============================================================================

#[test]
fn test_equal_to() {
    assert_eq!(cql("Title = 'VM'"), r#"Title:"VM""#);
}

#[test]
fn test_not_equal_to() {
    assert_eq!(cql("Title <> 'VM'"), r#"metafile:doc NOT Title:"VM""#);
    assert_eq!(cql("Title != 'VM'"), r#"metafile:doc NOT Title:"VM""#);
}

#[test]
fn test_property_prefix_is_stripped() {
    assert_eq!(cql("apiso:Title = 'VM'"), r#"Title:"VM""#);
    assert_eq!(
        filter(Filter::Comparison(Comparison::binary(
            ComparisonOperator::EqualTo,
            "/csw:Record/dc:title",
            Literal::text("VM"),
        ))),
        r#"title:"VM""#
    );
}

#[test]
fn test_phrase_is_escaped() {
    assert_eq!(cql(r#"Title = 'say "hi"'"#), r#"Title:"say \"hi\"""#);
}

#[test]
fn test_equal_to_number_is_kept_verbatim() {
    assert_eq!(cql("Scale = 1000"), r#"Scale:"1000""#);
}

#[test]
fn test_equal_to_date_field_is_normalised() {
    assert_eq!(cql("Modified = '2007-06-02'"), r#"Modified:"20070602000000""#);
    assert_eq!(
        cql("CreationDate = 2007-06-02T12:00:00+02:00"),
        r#"CreationDate:"20070602100000""#
    );
}

#[test]
fn test_like_wildcards() {
    assert_eq!(cql("Title LIKE 'VM%'"), "Title:(VM*)");
    assert_eq!(cql("Title LIKE 'V_M'"), "Title:(V?M)");
    assert_eq!(cql(r"Title LIKE '100\%'"), "Title:(100%)");
}

#[test]
fn test_like_with_filter_encoding_wildcards() {
    let like = Filter::Comparison(Comparison::Like {
        property: Some("Title".to_string()),
        pattern: Some("*sea!*ice?".to_string()),
        wildcard: '*',
        single_char: '?',
        escape: '!',
    });
    assert_eq!(filter(like), r"Title:(*sea\*ice?)");
}

#[test]
fn test_like_escapes_lucene_syntax() {
    assert_eq!(
        cql("Title LIKE 'x) OR metafile:doc OR (y'"),
        r"Title:(x\)\ OR\ metafile\:doc\ OR\ \(y)"
    );
    assert_eq!(cql("Title LIKE 'foo(bar%'"), r"Title:(foo\(bar*)");
    assert_eq!(cql("Title LIKE 'sea ice%'"), r"Title:(sea\ ice*)");
    assert_eq!(cql(r#"Title LIKE 'say "hi"_'"#), r#"Title:(say\ \"hi\"?)"#);
}

#[test]
fn test_quoted_property_is_escaped() {
    assert_eq!(cql(r#""a b" = 'x'"#), r#"a\ b:"x""#);
    assert_eq!(cql(r#""a(b" IS NULL"#), r"a\(b:null");
    assert_eq!(cql(r#""sea ice" LIKE 'v%'"#), r"sea\ ice:(v*)");
}

#[test]
fn test_is_null() {
    assert_eq!(cql("Title IS NULL"), "Title:null");
}

// ============================================================================
// Ranges
// ============================================================================

#[test]
fn test_date_ranges_use_date_sentinels() {
    assert_eq!(
        cql("Modified >= '2007-06-02'"),
        "Modified:[20070602000000 30000101000000]"
    );
    assert_eq!(
        cql("Modified > '2007-06-02'"),
        "Modified:{20070602000000 30000101000000}"
    );
    assert_eq!(
        cql("Modified < '2007-06-02'"),
        "Modified:{00000101000000 20070602000000}"
    );
    assert_eq!(
        cql("Modified <= '2007-06-02'"),
        "Modified:[00000101000000 20070602000000]"
    );
}

#[test]
fn test_date_literal_on_any_field_is_a_date_range() {
    assert_eq!(
        cql("Published >= 2007-06-02T00:00:00Z"),
        "Published:[20070602000000 30000101000000]"
    );
}

#[test]
fn test_numeric_ranges_use_integer_sentinels() {
    assert_eq!(cql("Scale >= 1000"), "Scale:[1000 2147483647]");
    assert_eq!(cql("Scale > 1000"), "Scale:{1000 2147483647}");
    assert_eq!(cql("Scale < 1000"), "Scale:{-2147483648 1000}");
    assert_eq!(cql("Scale <= 1000"), "Scale:[-2147483648 1000]");
}

#[test]
fn test_between() {
    assert_eq!(cql("Scale BETWEEN 10 AND 20"), "Scale:[10 20]");
    assert_eq!(
        cql("Modified BETWEEN '2007-01-01' AND '2007-12-31'"),
        "Modified:[20070101000000 20071231000000]"
    );
}

#[test]
fn test_text_range_must_be_a_date() {
    let err = FilterTranslator::default()
        .translate_cql("Title > 'VM'")
        .unwrap_err();
    assert_eq!(err.code, ExceptionCode::InvalidParameterValue);
    assert_eq!(err.locator, "Constraint");
    assert!(err.message.contains("unable to parse the date"), "{}", err.message);
}

#[test]
fn test_number_on_date_field_must_be_a_date() {
    let err = FilterTranslator::default()
        .translate_cql("Modified > 1000")
        .unwrap_err();
    assert_eq!(err.code, ExceptionCode::InvalidParameterValue);
}

// ============================================================================
// Temporal operators
// ============================================================================

#[test]
fn test_after_before_during() {
    assert_eq!(
        cql("Modified AFTER 2007-06-02T00:00:00Z"),
        "Modified:{20070602000000 30000101000000}"
    );
    assert_eq!(
        cql("Modified BEFORE 2007-06-02T00:00:00Z"),
        "Modified:{00000101000000 20070602000000}"
    );
    assert_eq!(
        cql("Modified DURING 2007-01-01/2007-12-31"),
        "Modified:{20070101000000 20071231000000}"
    );
}

#[test]
fn test_temporal_with_quoted_date() {
    assert_eq!(
        cql("TempExtent_begin AFTER '2007-06-02'"),
        "TempExtent_begin:{20070602000000 30000101000000}"
    );
}

#[test]
fn test_temporal_malformed_date() {
    let err = FilterTranslator::default()
        .translate_cql("Modified AFTER 'last week'")
        .unwrap_err();
    assert_eq!(err.code, ExceptionCode::InvalidParameterValue);
    assert!(err.message.contains("last week"));
}

#[test]
fn test_temporal_operand_shape_is_checked() {
    let during_instant = Filter::Temporal(Temporal {
        operator: TemporalOperator::During,
        property: Some("Modified".to_string()),
        value: Some(TemporalValue::Instant("2007-06-02".to_string())),
    });
    let err = FilterTranslator::default()
        .translate_filter(&during_instant, None)
        .unwrap_err();
    assert_eq!(err.code, ExceptionCode::InvalidParameterValue);

    let after_period = Filter::Temporal(Temporal {
        operator: TemporalOperator::After,
        property: Some("Modified".to_string()),
        value: Some(TemporalValue::Period {
            begin: "2007-01-01".to_string(),
            end: "2007-12-31".to_string(),
        }),
    });
    assert!(FilterTranslator::default()
        .translate_filter(&after_period, None)
        .is_err());
}

// ============================================================================
// Identifiers
// ============================================================================

#[test]
fn test_single_identifier() {
    assert_eq!(cql("IN ('urn:uuid:1')"), r#"identifier:"urn:uuid:1""#);
}

#[test]
fn test_several_identifiers() {
    assert_eq!(
        cql("IN ('a', 'b', 'c')"),
        r#"(identifier:"a" OR identifier:"b" OR identifier:"c")"#
    );
}

#[test]
fn test_numeric_identifier() {
    assert_eq!(cql("IN (42)"), r#"identifier:"42""#);
}
