//! Assignment and aggregation engine.
//!
//! This module defines the main `Engine` type: a read-only boundary index
//! plus a school store, with the two core operations layered on top —
//! point-to-district assignment and per-district school statistics.

use crate::boundary::BoundaryIndex;
use crate::builder::EngineBuilder;
use crate::error::{MaktabError, Result};
use crate::geometry::{point_in_boundary, validate_point};
use crate::store::{MemoryStore, SchoolStore};
use crate::types::{
    Config, District, DistrictRef, DistrictStats, LinkReport, NewSchool, School, SchoolCategory,
    SchoolPatch, SchoolSummary,
};
#[cfg(feature = "geojson")]
use geojson::FeatureCollection;
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Spatial assignment and aggregation engine.
///
/// The boundary index is immutable after construction and shared without a
/// lock; the school store sits behind a read-write lock. Clones share the
/// same underlying state.
///
/// # Examples
///
/// ```rust
/// use maktab::{District, Engine, MultiPolygon, NewSchool, SchoolCategory};
/// use geo::polygon;
///
/// let boundary = MultiPolygon::new(vec![polygon![
///     (x: 69.0, y: 30.0),
///     (x: 70.0, y: 30.0),
///     (x: 70.0, y: 31.0),
///     (x: 69.0, y: 31.0),
/// ]]);
/// let engine = Engine::builder()
///     .district(District::new(1, "Quetta", boundary).with_province("Balochistan"))
///     .build()?;
///
/// let school = engine.create_school(NewSchool::new(
///     "City Model School",
///     SchoolCategory::Primary,
///     69.5,
///     30.5,
/// ))?;
/// assert_eq!(school.district, Some(1));
///
/// let stats = engine.aggregate(1)?;
/// assert_eq!(stats.total_schools, 1);
/// # Ok::<(), maktab::MaktabError>(())
/// ```
#[derive(Clone)]
pub struct Engine {
    boundaries: Arc<BoundaryIndex>,
    store: Arc<RwLock<Box<dyn SchoolStore>>>,
    config: Config,
}

impl Engine {
    /// Create an engine over a boundary index with the in-memory store and
    /// default configuration.
    pub fn new(boundaries: BoundaryIndex) -> Self {
        Self::with_store(boundaries, Box::new(MemoryStore::new()), Config::default())
    }

    /// Create an engine with an explicit store implementation and config.
    pub fn with_store(
        boundaries: BoundaryIndex,
        store: Box<dyn SchoolStore>,
        config: Config,
    ) -> Self {
        Self {
            boundaries: Arc::new(boundaries),
            store: Arc::new(RwLock::new(store)),
            config,
        }
    }

    /// Create an engine builder for advanced configuration.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The boundary index this engine queries.
    pub fn boundaries(&self) -> &BoundaryIndex {
        &self.boundaries
    }

    /// Find the district whose boundary contains the given location.
    ///
    /// Pure lookup over the boundary snapshot: nothing is persisted.
    /// `Ok(None)` means no district contains the point (sea, disputed
    /// territory) and is a normal outcome, not an error. Repeated calls with
    /// the same coordinates and unchanged boundary data return the same
    /// district.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for non-finite coordinates, or out-of-range values
    /// under [`CoordinatePolicy::Reject`](crate::CoordinatePolicy).
    pub fn assign_district(&self, longitude: f64, latitude: f64) -> Result<Option<DistrictRef>> {
        let point = validate_point(longitude, latitude, self.config.coordinate_policy)?;
        Ok(self.boundaries.locate(&point).map(District::to_ref))
    }

    /// Create a school.
    ///
    /// When the payload does not pin a district, the assignment is computed
    /// from the current boundary snapshot before the record is handed to the
    /// store. Computing the assignment and persisting the record are two
    /// separate steps; the containment lookup is the pure part and is also
    /// exposed standalone as [`assign_district`](Self::assign_district).
    pub fn create_school(&self, payload: NewSchool) -> Result<School> {
        let point = validate_point(
            payload.longitude,
            payload.latitude,
            self.config.coordinate_policy,
        )?;

        let district = match payload.district {
            Some(id) => {
                if self.boundaries.get(id).is_none() {
                    return Err(MaktabError::DistrictNotFound(id));
                }
                Some(id)
            }
            None => {
                let assigned = self.boundaries.locate(&point).map(|d| d.id);
                match assigned {
                    Some(id) => debug!("school {:?} assigned to district {}", payload.name, id),
                    None => debug!(
                        "no district contains ({}, {}), school {:?} left unassigned",
                        point.x(),
                        point.y(),
                        payload.name
                    ),
                }
                assigned
            }
        };

        let mut store = self.store.write();
        store.insert(&payload, point, district)
    }

    /// Get a school by id.
    pub fn school(&self, id: u64) -> Result<School> {
        self.store
            .read()
            .get(id)?
            .ok_or(MaktabError::SchoolNotFound(id))
    }

    /// All schools in ascending id order.
    pub fn schools(&self) -> Result<Vec<School>> {
        let store = self.store.read();
        let schools = store.iter()?.collect();
        Ok(schools)
    }

    /// Apply a field patch to a school.
    ///
    /// The stored district assignment is never recomputed here, even when
    /// the location moves; it reflects the containment computed at creation
    /// time. Use [`link_unassigned`](Self::link_unassigned) to fill missing
    /// assignments in bulk.
    pub fn update_school(&self, id: u64, patch: SchoolPatch) -> Result<School> {
        let mut store = self.store.write();
        let mut school = store.get(id)?.ok_or(MaktabError::SchoolNotFound(id))?;

        if patch.longitude.is_some() || patch.latitude.is_some() {
            let longitude = patch.longitude.unwrap_or_else(|| school.location.x());
            let latitude = patch.latitude.unwrap_or_else(|| school.location.y());
            school.location = validate_point(longitude, latitude, self.config.coordinate_policy)?;
        }
        if let Some(name) = patch.name {
            school.name = name;
        }
        if let Some(category) = patch.category {
            school.category = category;
        }
        if let Some(num_students) = patch.num_students {
            school.num_students = num_students;
        }
        if let Some(num_teachers) = patch.num_teachers {
            school.num_teachers = num_teachers;
        }
        if let Some(num_classrooms) = patch.num_classrooms {
            school.num_classrooms = num_classrooms;
        }
        if let Some(establishment_year) = patch.establishment_year {
            school.establishment_year = Some(establishment_year);
        }
        if let Some(has_library) = patch.has_library {
            school.has_library = has_library;
        }
        if let Some(has_computer_lab) = patch.has_computer_lab {
            school.has_computer_lab = has_computer_lab;
        }
        if let Some(has_playground) = patch.has_playground {
            school.has_playground = has_playground;
        }

        store.update(&school)
    }

    /// Delete a school and return the removed record.
    pub fn delete_school(&self, id: u64) -> Result<School> {
        self.store
            .write()
            .delete(id)?
            .ok_or(MaktabError::SchoolNotFound(id))
    }

    /// Assign a district to every school that has none.
    ///
    /// Bulk pass over the store for boundary data loaded after schools were
    /// imported. Already-linked schools are skipped; schools no boundary
    /// contains stay unassigned and are counted in the report.
    pub fn link_unassigned(&self) -> Result<LinkReport> {
        let mut store = self.store.write();
        let schools: Vec<School> = store.iter()?.collect();

        let mut report = LinkReport {
            examined: schools.len(),
            ..LinkReport::default()
        };

        for mut school in schools {
            if school.district.is_some() {
                continue;
            }
            match self.boundaries.locate(&school.location) {
                Some(district) => {
                    school.district = Some(district.id);
                    store.update(&school)?;
                    info!(
                        "linked school {} ({:?}) to district {} ({:?})",
                        school.id, school.name, district.id, district.name
                    );
                    report.linked += 1;
                }
                None => {
                    warn!(
                        "no containing district for school {} ({:?})",
                        school.id, school.name
                    );
                    report.unmatched += 1;
                }
            }
        }

        Ok(report)
    }

    /// Get a district by id.
    pub fn district(&self, id: u64) -> Result<District> {
        self.boundaries
            .get(id)
            .cloned()
            .ok_or(MaktabError::DistrictNotFound(id))
    }

    /// All districts in ascending id order.
    pub fn districts(&self) -> Vec<District> {
        self.boundaries.iter().cloned().collect()
    }

    /// Case-insensitive search on district or province name.
    pub fn search_districts(&self, query: &str) -> Vec<District> {
        self.boundaries
            .search(query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// School statistics for a district, from a live containment scan.
    ///
    /// Membership is recomputed against the boundary polygon for every
    /// school rather than read from the stored assignment, so schools with
    /// stale or missing assignments still count. Categories with no matching
    /// school are omitted from the map, and `total_schools` always equals
    /// the sum of the per-category counts.
    ///
    /// This is an O(schools) scan against one polygon. The boundary side is
    /// already R-tree indexed; if school volumes grow past what a linear
    /// scan tolerates, the school store is the next place to index.
    pub fn aggregate(&self, district_id: u64) -> Result<DistrictStats> {
        let district = self
            .boundaries
            .get(district_id)
            .ok_or(MaktabError::DistrictNotFound(district_id))?;

        let store = self.store.read();
        let mut by_category: BTreeMap<SchoolCategory, u64> = BTreeMap::new();
        let mut summaries = Vec::new();
        let mut total = 0u64;

        for school in store.iter()? {
            if !point_in_boundary(&district.boundary, &school.location) {
                continue;
            }
            total += 1;
            *by_category.entry(school.category).or_insert(0) += 1;
            if self
                .config
                .stats_school_limit
                .is_none_or(|limit| summaries.len() < limit)
            {
                summaries.push(SchoolSummary::from(&school));
            }
        }

        Ok(DistrictStats {
            district_id: district.id,
            district_name: district.name.clone(),
            province_name: district.province.clone(),
            total_schools: total,
            schools_by_category: by_category,
            schools: summaries,
        })
    }
}

#[cfg(feature = "geojson")]
impl Engine {
    /// All schools as a GeoJSON feature collection.
    pub fn schools_geojson(&self) -> Result<FeatureCollection> {
        let store = self.store.read();
        let mut features = Vec::new();
        for school in store.iter()? {
            let district = school.district.and_then(|id| self.boundaries.get(id));
            features.push(crate::geojson::school_to_feature(&school, district));
        }
        Ok(crate::geojson::feature_collection(features))
    }

    /// All district boundaries as a GeoJSON feature collection.
    pub fn districts_geojson(&self) -> FeatureCollection {
        crate::geojson::feature_collection(
            self.boundaries
                .iter()
                .map(crate::geojson::district_to_feature)
                .collect(),
        )
    }
}
