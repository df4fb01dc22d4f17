//! Unit tests for spatial translation

use cswfilter::ast::*;
use cswfilter::{
    ExceptionCode, FilterTranslator, GeometryOperator, Query, SpatialFilter, TranslatorConfig,
};

fn spatial(input: &str) -> SpatialFilter {
    match FilterTranslator::default().translate_cql(input) {
        Ok(Query::Spatial(filter)) => filter,
        Ok(other) => panic!("expected a spatial query for {:?}, got {:?}", input, other),
        Err(e) => panic!("translation of {:?} failed: {}", input, e),
    }
}

fn distance_meters(input: &str) -> f64 {
    match spatial(input) {
        SpatialFilter::Distance { meters, .. } => meters,
        other => panic!("expected a distance filter, got {:?}", other),
    }
}

#[test]
fn test_bbox() {
    assert_eq!(
        spatial("BBOX(ows:BoundingBox, -10, 40, 10, 50)"),
        SpatialFilter::Geometry {
            operator: GeometryOperator::BBox,
            field: "BoundingBox".to_string(),
            geometry: Geometry::Envelope(Envelope::new(-10.0, 40.0, 10.0, 50.0)),
            crs: "EPSG:4326".to_string(),
        }
    );
}

#[test]
fn test_bbox_explicit_crs() {
    match spatial("BBOX(BoundingBox, 0, 0, 100, 100, 'EPSG:3857')") {
        SpatialFilter::Geometry { crs, .. } => assert_eq!(crs, "EPSG:3857"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_binary_operators_map_one_to_one() {
    for op in SpatialOperator::ALL {
        let cql = format!("{}(geom, POINT(1 2))", op.keyword());
        match spatial(&cql) {
            SpatialFilter::Geometry {
                operator,
                field,
                geometry,
                crs,
            } => {
                assert_eq!(operator, GeometryOperator::from(op));
                assert_eq!(operator.to_string(), op.keyword());
                assert_eq!(field, "geom");
                assert_eq!(geometry, Geometry::Point(Coord::new(1.0, 2.0)));
                assert_eq!(crs, "EPSG:4326");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn test_missing_property_uses_default_geometry_field() {
    let filter = Filter::Spatial(Spatial::BBox {
        property: None,
        envelope: Some(Envelope::new(0.0, 0.0, 1.0, 1.0)),
        crs: None,
    });
    match FilterTranslator::default().translate_filter(&filter, None) {
        Ok(Query::Spatial(SpatialFilter::Geometry { field, .. })) => {
            assert_eq!(field, "BoundingBox")
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_configured_defaults() {
    let config = TranslatorConfig {
        default_geometry_field: "geometry".to_string(),
        default_crs: "EPSG:3035".to_string(),
        ..TranslatorConfig::default()
    };
    let filter = Filter::Spatial(Spatial::Binary {
        operator: SpatialOperator::Within,
        property: None,
        geometry: Some(Geometry::Point(Coord::new(0.0, 0.0))),
    });
    match FilterTranslator::new(config).translate_filter(&filter, None) {
        Ok(Query::Spatial(SpatialFilter::Geometry { field, crs, .. })) => {
            assert_eq!(field, "geometry");
            assert_eq!(crs, "EPSG:3035");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_distance_in_meters() {
    assert_eq!(distance_meters("DWITHIN(geom, POINT(0 0), 250, meters)"), 250.0);
    assert_eq!(distance_meters("DWITHIN(geom, POINT(0 0), 10, kilometers)"), 10_000.0);
    assert_eq!(distance_meters("BEYOND(geom, POINT(0 0), 2, nautical miles)"), 3704.0);
    assert!((distance_meters("DWITHIN(geom, POINT(0 0), 1, feet)") - 0.3048).abs() < 1e-9);
    assert!(
        (distance_meters("DWITHIN(geom, POINT(0 0), 1, statute miles)") - 1609.344).abs() < 1e-6
    );
    assert_eq!(
        distance_meters("DWITHIN(geom, POINT(0 0), 3, 'urn:ogc:def:uom:EPSG::9001')"),
        3.0
    );
}

#[test]
fn test_distance_operator_is_kept() {
    match spatial("BEYOND(geom, POINT(0 0), 1, m)") {
        SpatialFilter::Distance { operator, crs, .. } => {
            assert_eq!(operator, DistanceOperator::Beyond);
            assert_eq!(crs, "EPSG:4326");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unknown_unit_is_rejected() {
    let err = FilterTranslator::default()
        .translate_cql("DWITHIN(geom, POINT(0 0), 3, furlongs)")
        .unwrap_err();
    assert_eq!(err.code, ExceptionCode::InvalidParameterValue);
    assert!(err.message.contains("furlongs"));
}

#[test]
fn test_negative_distance_is_rejected() {
    let err = FilterTranslator::default()
        .translate_cql("DWITHIN(geom, POINT(0 0), -3, meters)")
        .unwrap_err();
    assert_eq!(err.code, ExceptionCode::InvalidParameterValue);
}

#[test]
fn test_missing_geometry_and_distance() {
    let translator = FilterTranslator::default();
    let cases = [
        Filter::Spatial(Spatial::Binary {
            operator: SpatialOperator::Intersects,
            property: Some("geom".to_string()),
            geometry: None,
        }),
        Filter::Spatial(Spatial::BBox {
            property: None,
            envelope: None,
            crs: None,
        }),
        Filter::Spatial(Spatial::Distance {
            operator: DistanceOperator::DWithin,
            property: None,
            geometry: None,
            distance: Some(Distance {
                value: 1.0,
                units: "m".to_string(),
            }),
        }),
        Filter::Spatial(Spatial::Distance {
            operator: DistanceOperator::DWithin,
            property: None,
            geometry: Some(Geometry::Point(Coord::new(0.0, 0.0))),
            distance: None,
        }),
        Filter::Spatial(Spatial::Distance {
            operator: DistanceOperator::Beyond,
            property: None,
            geometry: Some(Geometry::Point(Coord::new(0.0, 0.0))),
            distance: Some(Distance {
                value: 1.0,
                units: " ".to_string(),
            }),
        }),
    ];
    for filter in cases {
        let err = translator.translate_filter(&filter, None).unwrap_err();
        assert_eq!(err.code, ExceptionCode::InvalidParameterValue, "{:?}", filter);
        assert_eq!(err.locator, "Constraint");
    }
}
