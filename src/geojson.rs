//! GeoJSON conversion for districts and schools.
//!
//! Boundary reference data arrives as GeoJSON feature collections produced
//! by external GIS tooling, and school records are served back out as
//! GeoJSON features.

use crate::error::{MaktabError, Result};
use crate::types::{District, School};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde_json::{Map, Value as JsonValue};
use std::time::UNIX_EPOCH;

fn ring_from_positions(positions: &[Vec<f64>]) -> Result<LineString> {
    let mut coords = Vec::with_capacity(positions.len());
    for position in positions {
        if position.len() < 2 {
            return Err(MaktabError::InvalidInput(
                "Coordinate must have at least 2 values".to_string(),
            ));
        }
        coords.push(Coord {
            x: position[0],
            y: position[1],
        });
    }
    Ok(LineString::new(coords))
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Result<Polygon> {
    if rings.is_empty() {
        return Err(MaktabError::InvalidInput(
            "Polygon must have at least one ring".to_string(),
        ));
    }
    let exterior = ring_from_positions(&rings[0])?;
    let interiors = rings[1..]
        .iter()
        .map(|ring| ring_from_positions(ring))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn boundary_from_geometry(geometry: &Geometry) -> Result<MultiPolygon> {
    match &geometry.value {
        Value::Polygon(rings) => Ok(MultiPolygon::new(vec![polygon_from_rings(rings)?])),
        Value::MultiPolygon(polygons) => {
            if polygons.is_empty() {
                return Err(MaktabError::InvalidInput(
                    "MultiPolygon must have at least one polygon".to_string(),
                ));
            }
            let polygons = polygons
                .iter()
                .map(|rings| polygon_from_rings(rings))
                .collect::<Result<Vec<_>>>()?;
            Ok(MultiPolygon::new(polygons))
        }
        _ => Err(MaktabError::InvalidInput(
            "District geometry must be a Polygon or MultiPolygon".to_string(),
        )),
    }
}

fn string_property(properties: &Map<String, JsonValue>, key: &str) -> Option<String> {
    properties
        .get(key)
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}

fn optional_string(value: &Option<String>) -> JsonValue {
    value.clone().map(JsonValue::from).unwrap_or(JsonValue::Null)
}

/// Parse a FeatureCollection of district boundaries.
///
/// Recognized feature properties: `id` (defaults to the 1-based feature
/// position), `name`, `province`, `country`, `tehsil`. Geometries must be
/// Polygon or MultiPolygon.
pub fn districts_from_geojson(input: &str) -> Result<Vec<District>> {
    let geojson: GeoJson = input
        .parse()
        .map_err(|e| MaktabError::InvalidInput(format!("Failed to parse GeoJSON: {}", e)))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(collection) => collection,
        _ => {
            return Err(MaktabError::InvalidInput(
                "Expected a FeatureCollection of district boundaries".to_string(),
            ));
        }
    };

    let mut districts = Vec::with_capacity(collection.features.len());
    for (position, feature) in collection.features.iter().enumerate() {
        let geometry = feature.geometry.as_ref().ok_or_else(|| {
            MaktabError::InvalidInput(format!("District feature {} has no geometry", position))
        })?;
        let boundary = boundary_from_geometry(geometry)?;

        let empty = Map::new();
        let properties = feature.properties.as_ref().unwrap_or(&empty);
        let id = properties
            .get("id")
            .and_then(JsonValue::as_u64)
            .unwrap_or(position as u64 + 1);
        let name =
            string_property(properties, "name").unwrap_or_else(|| format!("district-{}", id));

        let mut district = District::new(id, name, boundary);
        district.country = string_property(properties, "country");
        district.province = string_property(properties, "province");
        district.tehsil = string_property(properties, "tehsil");
        districts.push(district);
    }
    Ok(districts)
}

fn polygon_rings(polygon: &Polygon) -> Vec<Vec<Vec<f64>>> {
    let mut rings = Vec::with_capacity(1 + polygon.interiors().len());
    rings.push(
        polygon
            .exterior()
            .coords()
            .map(|coord| vec![coord.x, coord.y])
            .collect(),
    );
    for interior in polygon.interiors() {
        rings.push(
            interior
                .coords()
                .map(|coord| vec![coord.x, coord.y])
                .collect(),
        );
    }
    rings
}

fn boundary_to_geometry(boundary: &MultiPolygon) -> Geometry {
    Geometry::new(Value::MultiPolygon(
        boundary.0.iter().map(polygon_rings).collect(),
    ))
}

/// Encode a district as a GeoJSON feature (boundary plus name properties).
pub fn district_to_feature(district: &District) -> Feature {
    let mut properties = Map::new();
    properties.insert("id".to_string(), district.id.into());
    properties.insert("name".to_string(), district.name.clone().into());
    properties.insert("country".to_string(), optional_string(&district.country));
    properties.insert("province".to_string(), optional_string(&district.province));
    properties.insert("tehsil".to_string(), optional_string(&district.tehsil));

    Feature {
        bbox: None,
        geometry: Some(boundary_to_geometry(&district.boundary)),
        id: Some(Id::Number(district.id.into())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Encode a school as a GeoJSON point feature.
///
/// `district` is the resolved record behind the school's stored assignment,
/// used to flatten the district and province names into the properties.
pub fn school_to_feature(school: &School, district: Option<&District>) -> Feature {
    let mut properties = Map::new();
    properties.insert("name".to_string(), school.name.clone().into());
    properties.insert("category".to_string(), school.category.as_str().into());
    properties.insert(
        "district".to_string(),
        school
            .district
            .map(JsonValue::from)
            .unwrap_or(JsonValue::Null),
    );
    properties.insert(
        "district_name".to_string(),
        district
            .map(|d| JsonValue::from(d.name.clone()))
            .unwrap_or(JsonValue::Null),
    );
    properties.insert(
        "province_name".to_string(),
        district
            .map(|d| optional_string(&d.province))
            .unwrap_or(JsonValue::Null),
    );
    properties.insert("num_students".to_string(), school.num_students.into());
    properties.insert("num_teachers".to_string(), school.num_teachers.into());
    properties.insert("num_classrooms".to_string(), school.num_classrooms.into());
    properties.insert(
        "establishment_year".to_string(),
        school
            .establishment_year
            .map(JsonValue::from)
            .unwrap_or(JsonValue::Null),
    );
    properties.insert("has_library".to_string(), school.has_library.into());
    properties.insert(
        "has_computer_lab".to_string(),
        school.has_computer_lab.into(),
    );
    properties.insert("has_playground".to_string(), school.has_playground.into());
    properties.insert(
        "created_at".to_string(),
        school
            .created_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
            .into(),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            school.location.x(),
            school.location.y(),
        ]))),
        id: Some(Id::Number(school.id.into())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Wrap features into a FeatureCollection.
pub fn feature_collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
