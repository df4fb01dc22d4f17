//! Spatial predicates as geometry index filters

use tracing::trace;

use super::{local_name, FilterTranslator};
use crate::ast::{Distance, Geometry, Spatial};
use crate::error::{FilterParserError, FilterResult};
use crate::query::{GeometryOperator, SpatialFilter};
use crate::units::DistanceUnit;

impl FilterTranslator {
    pub(super) fn spatial(&self, spatial: &Spatial) -> FilterResult<SpatialFilter> {
        let filter = match spatial {
            Spatial::Binary {
                operator,
                property,
                geometry,
            } => {
                let geometry = geometry.clone().ok_or_else(|| {
                    FilterParserError::invalid_constraint(format!(
                        "the spatial operator {} must specify a geometry",
                        operator.keyword()
                    ))
                })?;
                SpatialFilter::Geometry {
                    operator: GeometryOperator::from(*operator),
                    field: self.geometry_field(property),
                    geometry,
                    crs: self.config.default_crs.clone(),
                }
            }
            Spatial::BBox {
                property,
                envelope,
                crs,
            } => {
                let envelope = envelope.ok_or_else(|| {
                    FilterParserError::invalid_constraint(
                        "the BBOX operator must specify an envelope",
                    )
                })?;
                let crs = crs
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .unwrap_or(&self.config.default_crs)
                    .to_string();
                SpatialFilter::Geometry {
                    operator: GeometryOperator::BBox,
                    field: self.geometry_field(property),
                    geometry: Geometry::Envelope(envelope),
                    crs,
                }
            }
            Spatial::Distance {
                operator,
                property,
                geometry,
                distance,
            } => {
                let keyword = operator.keyword();
                let geometry = geometry.clone().ok_or_else(|| {
                    FilterParserError::invalid_constraint(format!(
                        "the distance operator {} must specify a geometry",
                        keyword
                    ))
                })?;
                let distance = distance.as_ref().ok_or_else(|| {
                    FilterParserError::invalid_constraint(format!(
                        "the distance operator {} must specify a distance",
                        keyword
                    ))
                })?;
                SpatialFilter::Distance {
                    operator: *operator,
                    field: self.geometry_field(property),
                    geometry,
                    crs: self.config.default_crs.clone(),
                    meters: distance_in_meters(distance)?,
                }
            }
        };
        trace!(%filter, "translated spatial predicate");
        Ok(filter)
    }

    fn geometry_field(&self, property: &Option<String>) -> String {
        match property.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => local_name(p).to_string(),
            _ => self.config.default_geometry_field.clone(),
        }
    }
}

fn distance_in_meters(distance: &Distance) -> FilterResult<f64> {
    if !distance.value.is_finite() || distance.value < 0.0 {
        return Err(FilterParserError::invalid_constraint(format!(
            "the distance must be a non-negative number, found {}",
            distance.value
        )));
    }
    if distance.units.trim().is_empty() {
        return Err(FilterParserError::invalid_constraint(
            "the distance must specify its units",
        ));
    }
    let unit: DistanceUnit = distance.units.parse()?;
    Ok(unit.to_meters(distance.value))
}
