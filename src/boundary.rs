//! Boundary index over district polygons.
//!
//! The index keeps every district's bounding box in an R-tree, so a
//! containment lookup only runs the precise point-in-polygon test against
//! envelope candidates instead of scanning the full district set. The index
//! is read-only once built; boundary updates are a rebuild, not a mutation.

use crate::error::{MaktabError, Result};
use crate::geometry::{boundary_envelope, point_in_boundary};
use crate::types::District;
use geo::Point;
use log::warn;
use rstar::{AABB, RTree, RTreeObject};
use rustc_hash::FxHashMap;

/// R-tree entry: one district's bounding box plus its id.
struct BoundaryEntry {
    envelope: AABB<[f64; 2]>,
    id: u64,
}

impl RTreeObject for BoundaryEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Read-only spatial index over district boundary polygons.
///
/// # Examples
///
/// ```rust
/// use maktab::{BoundaryIndex, District, MultiPolygon, Point};
/// use geo::polygon;
///
/// let boundary = MultiPolygon::new(vec![polygon![
///     (x: 69.0, y: 30.0),
///     (x: 70.0, y: 30.0),
///     (x: 70.0, y: 31.0),
///     (x: 69.0, y: 31.0),
/// ]]);
/// let index = BoundaryIndex::new(vec![District::new(1, "Quetta", boundary)])?;
///
/// assert_eq!(index.locate(&Point::new(69.5, 30.5)).map(|d| d.id), Some(1));
/// assert!(index.locate(&Point::new(0.0, 0.0)).is_none());
/// # Ok::<(), maktab::MaktabError>(())
/// ```
pub struct BoundaryIndex {
    districts: FxHashMap<u64, District>,
    tree: RTree<BoundaryEntry>,
    /// District ids in ascending order for deterministic iteration.
    ordered_ids: Vec<u64>,
}

impl BoundaryIndex {
    /// Build an index from district records.
    ///
    /// Fails with `InvalidInput` on duplicate district ids or a district
    /// with an empty boundary geometry.
    pub fn new(districts: Vec<District>) -> Result<Self> {
        let mut map = FxHashMap::default();
        let mut entries = Vec::with_capacity(districts.len());

        for district in districts {
            let Some(rect) = boundary_envelope(&district.boundary) else {
                return Err(MaktabError::InvalidInput(format!(
                    "District {} has an empty boundary",
                    district.id
                )));
            };
            if map.contains_key(&district.id) {
                return Err(MaktabError::InvalidInput(format!(
                    "Duplicate district id: {}",
                    district.id
                )));
            }

            entries.push(BoundaryEntry {
                envelope: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
                id: district.id,
            });
            map.insert(district.id, district);
        }

        let mut ordered_ids: Vec<u64> = map.keys().copied().collect();
        ordered_ids.sort_unstable();

        Ok(Self {
            districts: map,
            tree: RTree::bulk_load(entries),
            ordered_ids,
        })
    }

    /// Create an empty index. Every lookup returns "no containing district".
    pub fn empty() -> Self {
        Self {
            districts: FxHashMap::default(),
            tree: RTree::new(),
            ordered_ids: Vec::new(),
        }
    }

    /// Find the district whose boundary contains `point`.
    ///
    /// Districts are presumed disjoint. When boundary data overlaps (a data
    /// defect rather than a modeled case), the lowest district id wins so
    /// repeated lookups stay deterministic; the overlap is logged.
    pub fn locate(&self, point: &Point) -> Option<&District> {
        let probe = AABB::from_point([point.x(), point.y()]);
        let mut matched: Option<&District> = None;
        let mut containing = 0usize;

        for entry in self.tree.locate_in_envelope_intersecting(&probe) {
            let district = &self.districts[&entry.id];
            if !point_in_boundary(&district.boundary, point) {
                continue;
            }
            containing += 1;
            match matched {
                Some(current) if current.id <= district.id => {}
                _ => matched = Some(district),
            }
        }

        if containing > 1 {
            warn!(
                "point ({}, {}) lies inside {} overlapping district boundaries, keeping district {}",
                point.x(),
                point.y(),
                containing,
                matched.map(|d| d.id).unwrap_or_default()
            );
        }

        matched
    }

    /// Get a district by id.
    pub fn get(&self, id: u64) -> Option<&District> {
        self.districts.get(&id)
    }

    /// Number of indexed districts.
    pub fn len(&self) -> usize {
        self.districts.len()
    }

    /// Whether the index holds no districts.
    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    /// Iterate districts in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &District> + '_ {
        self.ordered_ids.iter().map(move |id| &self.districts[id])
    }

    /// Case-insensitive substring search on district or province name.
    ///
    /// An empty or whitespace-only query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&District> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.iter()
            .filter(|district| {
                district.name.to_lowercase().contains(&needle)
                    || district
                        .province
                        .as_deref()
                        .is_some_and(|province| province.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

#[cfg(feature = "geojson")]
impl BoundaryIndex {
    /// Build an index from a GeoJSON FeatureCollection string.
    pub fn from_geojson_str(input: &str) -> Result<Self> {
        Self::new(crate::geojson::districts_from_geojson(input)?)
    }

    /// Build an index from a GeoJSON file on disk.
    pub fn from_geojson_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::District;
    use geo::{MultiPolygon, polygon};

    fn square(min_x: f64, min_y: f64, size: f64) -> MultiPolygon {
        MultiPolygon::new(vec![polygon![
            (x: min_x, y: min_y),
            (x: min_x + size, y: min_y),
            (x: min_x + size, y: min_y + size),
            (x: min_x, y: min_y + size),
        ]])
    }

    #[test]
    fn test_locate_inside_and_outside() {
        let index = BoundaryIndex::new(vec![
            District::new(1, "Quetta", square(69.0, 30.0, 1.0)),
            District::new(2, "Pishin", square(71.0, 30.0, 1.0)),
        ])
        .unwrap();

        assert_eq!(index.locate(&Point::new(69.5, 30.5)).map(|d| d.id), Some(1));
        assert_eq!(index.locate(&Point::new(71.5, 30.5)).map(|d| d.id), Some(2));
        assert!(index.locate(&Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_locate_overlap_keeps_lowest_id() {
        // Same square registered under two ids: a data defect, resolved
        // deterministically instead of arbitrarily.
        let forward = BoundaryIndex::new(vec![
            District::new(5, "Copy", square(69.0, 30.0, 1.0)),
            District::new(2, "Original", square(69.0, 30.0, 1.0)),
        ])
        .unwrap();
        let reversed = BoundaryIndex::new(vec![
            District::new(2, "Original", square(69.0, 30.0, 1.0)),
            District::new(5, "Copy", square(69.0, 30.0, 1.0)),
        ])
        .unwrap();

        let probe = Point::new(69.5, 30.5);
        assert_eq!(forward.locate(&probe).map(|d| d.id), Some(2));
        assert_eq!(reversed.locate(&probe).map(|d| d.id), Some(2));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = BoundaryIndex::new(vec![
            District::new(1, "A", square(0.0, 0.0, 1.0)),
            District::new(1, "B", square(2.0, 0.0, 1.0)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_boundary_rejected() {
        let result = BoundaryIndex::new(vec![District::new(
            1,
            "Empty",
            MultiPolygon::new(Vec::new()),
        )]);
        assert!(result.is_err());
    }

    #[test]
    fn test_iter_ascending_id_order() {
        let index = BoundaryIndex::new(vec![
            District::new(9, "C", square(4.0, 0.0, 1.0)),
            District::new(1, "A", square(0.0, 0.0, 1.0)),
            District::new(4, "B", square(2.0, 0.0, 1.0)),
        ])
        .unwrap();

        let ids: Vec<u64> = index.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 4, 9]);
    }

    #[test]
    fn test_search_by_name_and_province() {
        let index = BoundaryIndex::new(vec![
            District::new(1, "Quetta", square(0.0, 0.0, 1.0)).with_province("Balochistan"),
            District::new(2, "Lahore", square(2.0, 0.0, 1.0)).with_province("Punjab"),
            District::new(3, "Multan", square(4.0, 0.0, 1.0)).with_province("Punjab"),
        ])
        .unwrap();

        let by_name = index.search("quet");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, 1);

        let by_province: Vec<u64> = index.search("punjab").iter().map(|d| d.id).collect();
        assert_eq!(by_province, vec![2, 3]);

        assert!(index.search("   ").is_empty());
        assert!(index.search("karachi").is_empty());
    }

    #[test]
    fn test_grid_lookup() {
        // 10x10 grid of unit squares, probe the center of each cell.
        let mut districts = Vec::new();
        for row in 0..10u64 {
            for col in 0..10u64 {
                districts.push(District::new(
                    row * 10 + col + 1,
                    format!("cell-{}-{}", row, col),
                    square(col as f64, row as f64, 1.0),
                ));
            }
        }
        let index = BoundaryIndex::new(districts).unwrap();
        assert_eq!(index.len(), 100);

        for row in 0..10u64 {
            for col in 0..10u64 {
                let probe = Point::new(col as f64 + 0.5, row as f64 + 0.5);
                assert_eq!(
                    index.locate(&probe).map(|d| d.id),
                    Some(row * 10 + col + 1)
                );
            }
        }
    }
}
