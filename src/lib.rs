//! Spatial assignment and aggregation engine for school/district mapping.
//!
//! Districts are immutable boundary polygons held in an R-tree index;
//! schools are point records assigned to the district containing them at
//! creation time and aggregated per district with a live containment scan.
//!
//! ```rust
//! use maktab::{District, Engine, MultiPolygon, NewSchool, SchoolCategory};
//! use geo::polygon;
//!
//! let boundary = MultiPolygon::new(vec![polygon![
//!     (x: 69.0, y: 30.0),
//!     (x: 70.0, y: 30.0),
//!     (x: 70.0, y: 31.0),
//!     (x: 69.0, y: 31.0),
//! ]]);
//! let engine = Engine::builder()
//!     .district(District::new(1, "Quetta", boundary))
//!     .build()?;
//!
//! let school = engine.create_school(NewSchool::new(
//!     "City Model School",
//!     SchoolCategory::Primary,
//!     69.5,
//!     30.5,
//! ))?;
//! assert_eq!(school.district, Some(1));
//!
//! assert!(engine.assign_district(0.0, 0.0)?.is_none());
//! # Ok::<(), maktab::MaktabError>(())
//! ```

pub mod boundary;
pub mod builder;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod store;
pub mod types;

#[cfg(feature = "geojson")]
pub mod geojson;

pub use boundary::BoundaryIndex;
pub use builder::EngineBuilder;
pub use engine::Engine;
pub use error::{MaktabError, Result};

pub use geo::{MultiPolygon, Point, Polygon};

pub use geometry::{
    MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE, point_in_boundary, validate_point,
};

pub use store::{MemoryStore, SchoolStore};

pub use types::{
    Config, CoordinatePolicy, District, DistrictRef, DistrictStats, LinkReport, NewSchool, School,
    SchoolCategory, SchoolPatch, SchoolSummary,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Engine, EngineBuilder, MaktabError, Result};

    pub use geo::{MultiPolygon, Point, Polygon};

    pub use crate::{BoundaryIndex, MemoryStore, SchoolStore};

    pub use crate::{
        Config, CoordinatePolicy, District, DistrictRef, DistrictStats, NewSchool, School,
        SchoolCategory,
    };
}
