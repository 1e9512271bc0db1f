#![cfg(feature = "geojson")]

use maktab::{BoundaryIndex, Engine, NewSchool, Point, SchoolCategory};
use std::io::Write;

const BOUNDARY_PACK: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {
                "id": 1,
                "name": "Quetta",
                "province": "Balochistan",
                "country": "Pakistan"
            },
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [[[[69.0, 30.0], [70.0, 30.0], [70.0, 31.0], [69.0, 31.0], [69.0, 30.0]]]]
            }
        },
        {
            "type": "Feature",
            "properties": {
                "id": 2,
                "name": "Lahore",
                "province": "Punjab",
                "country": "Pakistan"
            },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[74.0, 31.0], [75.0, 31.0], [75.0, 32.0], [74.0, 32.0], [74.0, 31.0]]]
            }
        }
    ]
}"#;

#[test]
fn test_index_from_geojson_str() {
    let index = BoundaryIndex::from_geojson_str(BOUNDARY_PACK).unwrap();
    assert_eq!(index.len(), 2);

    let quetta = index.locate(&Point::new(69.5, 30.5)).unwrap();
    assert_eq!(quetta.id, 1);
    assert_eq!(quetta.province.as_deref(), Some("Balochistan"));

    let lahore = index.locate(&Point::new(74.5, 31.5)).unwrap();
    assert_eq!(lahore.id, 2);

    assert!(index.locate(&Point::new(0.0, 0.0)).is_none());
}

#[test]
fn test_index_from_geojson_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(BOUNDARY_PACK.as_bytes()).unwrap();

    let index = BoundaryIndex::from_geojson_file(file.path()).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.get(2).unwrap().name, "Lahore");
}

#[test]
fn test_missing_boundary_file() {
    assert!(BoundaryIndex::from_geojson_file("/nonexistent/boundaries.geojson").is_err());
}

#[test]
fn test_engine_from_boundary_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(BOUNDARY_PACK.as_bytes()).unwrap();

    let engine = Engine::builder()
        .boundary_file(file.path())
        .build()
        .unwrap();

    let school = engine
        .create_school(NewSchool::new(
            "Model Town School",
            SchoolCategory::HigherSecondary,
            74.5,
            31.5,
        ))
        .unwrap();
    assert_eq!(school.district, Some(2));

    let stats = engine.aggregate(2).unwrap();
    assert_eq!(stats.district_name, "Lahore");
    assert_eq!(stats.total_schools, 1);
    assert_eq!(
        stats.schools_by_category.get(&SchoolCategory::HigherSecondary),
        Some(&1)
    );
}

#[test]
fn test_feature_collections_round_trip_through_engine() {
    let engine = Engine::builder()
        .districts(maktab::geojson::districts_from_geojson(BOUNDARY_PACK).unwrap())
        .build()
        .unwrap();

    engine
        .create_school(NewSchool::new(
            "City Model School",
            SchoolCategory::Primary,
            69.5,
            30.5,
        ))
        .unwrap();

    let districts = engine.districts_geojson();
    assert_eq!(districts.features.len(), 2);

    let schools = engine.schools_geojson().unwrap();
    assert_eq!(schools.features.len(), 1);
    let properties = schools.features[0].properties.as_ref().unwrap();
    assert_eq!(properties["district_name"], "Quetta");

    // The districts collection parses back into the same boundary set
    let reparsed = maktab::geojson::districts_from_geojson(&districts.to_string()).unwrap();
    assert_eq!(reparsed.len(), 2);
    assert_eq!(reparsed[0].name, "Quetta");
}
