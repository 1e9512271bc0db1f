//! Domain types and configuration for the maktab engine.
//!
//! Districts are immutable reference data bulk-loaded from external GIS
//! tooling; schools are the mutable records the engine assigns and
//! aggregates. All geometry is lon/lat in degrees (SRID 4326).

use geo::{MultiPolygon, Point};
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

/// School category enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolCategory {
    Primary,
    Secondary,
    HigherSecondary,
    University,
}

impl SchoolCategory {
    /// All categories, in their canonical order.
    pub const ALL: [SchoolCategory; 4] = [
        SchoolCategory::Primary,
        SchoolCategory::Secondary,
        SchoolCategory::HigherSecondary,
        SchoolCategory::University,
    ];

    /// The wire name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolCategory::Primary => "primary",
            SchoolCategory::Secondary => "secondary",
            SchoolCategory::HigherSecondary => "higher_secondary",
            SchoolCategory::University => "university",
        }
    }

    /// Parse a wire name back into a category.
    pub fn parse(value: &str) -> Option<SchoolCategory> {
        SchoolCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
    }
}

impl fmt::Display for SchoolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A district boundary record.
///
/// Immutable reference data: the engine never creates, mutates, or deletes
/// districts. The name fields mirror the administrative hierarchy of the
/// source boundary data (country, province, district, tehsil).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub id: u64,
    /// Country name (level 0).
    pub country: Option<String>,
    /// Province name (level 1).
    pub province: Option<String>,
    /// District name (level 2).
    pub name: String,
    /// Tehsil/sub-unit name (level 3).
    pub tehsil: Option<String>,
    /// Boundary geometry, lon/lat (SRID 4326).
    pub boundary: MultiPolygon,
}

impl District {
    /// Create a district with the minimal required fields.
    pub fn new(id: u64, name: impl Into<String>, boundary: MultiPolygon) -> Self {
        Self {
            id,
            country: None,
            province: None,
            name: name.into(),
            tehsil: None,
            boundary,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    pub fn with_tehsil(mut self, tehsil: impl Into<String>) -> Self {
        self.tehsil = Some(tehsil.into());
        self
    }

    /// Lightweight reference to this district.
    pub fn to_ref(&self) -> DistrictRef {
        DistrictRef {
            id: self.id,
            name: self.name.clone(),
            province: self.province.clone(),
        }
    }
}

/// Lightweight reference to a district, returned by assignment lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictRef {
    pub id: u64,
    pub name: String,
    pub province: Option<String>,
}

/// A school record with its location and descriptive attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: u64,
    pub name: String,
    pub category: SchoolCategory,
    /// Location, lon/lat (SRID 4326).
    pub location: Point,
    /// Containing district id, if any. Computed once at creation when not
    /// supplied explicitly; never recomputed on update.
    pub district: Option<u64>,
    pub num_students: u32,
    pub num_teachers: u32,
    pub num_classrooms: u32,
    pub establishment_year: Option<i32>,
    pub has_library: bool,
    pub has_computer_lab: bool,
    pub has_playground: bool,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Payload for creating a school.
///
/// Coordinates are raw lon/lat values and are validated by the engine
/// according to the configured [`CoordinatePolicy`]. When `district` is
/// `None` the engine computes the assignment from the boundary index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSchool {
    pub name: String,
    pub category: SchoolCategory,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub district: Option<u64>,
    #[serde(default)]
    pub num_students: u32,
    #[serde(default)]
    pub num_teachers: u32,
    #[serde(default)]
    pub num_classrooms: u32,
    #[serde(default)]
    pub establishment_year: Option<i32>,
    #[serde(default)]
    pub has_library: bool,
    #[serde(default)]
    pub has_computer_lab: bool,
    #[serde(default)]
    pub has_playground: bool,
}

impl NewSchool {
    /// Create a payload with the required fields; everything else defaults.
    pub fn new(
        name: impl Into<String>,
        category: SchoolCategory,
        longitude: f64,
        latitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            longitude,
            latitude,
            district: None,
            num_students: 0,
            num_teachers: 0,
            num_classrooms: 0,
            establishment_year: None,
            has_library: false,
            has_computer_lab: false,
            has_playground: false,
        }
    }
}

/// Field patch for updating a school. `None` leaves a field untouched.
///
/// A location change never triggers reassignment; the stored district
/// reference stays as computed at creation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchoolPatch {
    pub name: Option<String>,
    pub category: Option<SchoolCategory>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub num_students: Option<u32>,
    pub num_teachers: Option<u32>,
    pub num_classrooms: Option<u32>,
    pub establishment_year: Option<i32>,
    pub has_library: Option<bool>,
    pub has_computer_lab: Option<bool>,
    pub has_playground: Option<bool>,
}

/// Condensed school record embedded in district statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolSummary {
    pub id: u64,
    pub name: String,
    pub category: SchoolCategory,
    pub longitude: f64,
    pub latitude: f64,
    pub num_students: u32,
    pub num_teachers: u32,
}

impl From<&School> for SchoolSummary {
    fn from(school: &School) -> Self {
        Self {
            id: school.id,
            name: school.name.clone(),
            category: school.category,
            longitude: school.location.x(),
            latitude: school.location.y(),
            num_students: school.num_students,
            num_teachers: school.num_teachers,
        }
    }
}

/// School statistics for a single district.
///
/// `schools_by_category` only carries categories with at least one matching
/// school; unrepresented categories are omitted, not zero-filled. The map is
/// ordered so serialized output is reproducible for a fixed snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictStats {
    pub district_id: u64,
    pub district_name: String,
    pub province_name: Option<String>,
    pub total_schools: u64,
    pub schools_by_category: BTreeMap<SchoolCategory, u64>,
    pub schools: Vec<SchoolSummary>,
}

/// Outcome of a bulk relink pass over unassigned schools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReport {
    /// Schools examined, including already-linked ones.
    pub examined: usize,
    /// Schools newly linked to a district.
    pub linked: usize,
    /// Unassigned schools no district boundary contains.
    pub unmatched: usize,
}

/// How out-of-range longitude/latitude values are handled.
///
/// Non-finite coordinates are always rejected regardless of policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatePolicy {
    /// Reject values outside [-180, 180] x [-90, 90] with an error.
    #[default]
    Reject,
    /// Clamp values into [-180, 180] x [-90, 90].
    Clamp,
}

/// Engine configuration.
///
/// Designed to be easily serializable and loadable from JSON or TOML while
/// keeping complexity minimal.
///
/// # Example
///
/// ```rust
/// use maktab::{Config, CoordinatePolicy};
///
/// let config = Config::default();
/// assert_eq!(config.coordinate_policy, CoordinatePolicy::Reject);
///
/// let json = r#"{
///     "coordinate_policy": "clamp",
///     "stats_school_limit": 100
/// }"#;
/// let config: Config = Config::from_json(json).unwrap();
/// assert_eq!(config.coordinate_policy, CoordinatePolicy::Clamp);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// How out-of-range coordinates are handled on create and assign.
    #[serde(default)]
    pub coordinate_policy: CoordinatePolicy,

    /// Cap on the school list embedded in district statistics
    /// (None means unlimited). Count fields are never capped.
    #[serde(default)]
    pub stats_school_limit: Option<usize>,
}

impl Config {
    pub fn with_coordinate_policy(mut self, policy: CoordinatePolicy) -> Self {
        self.coordinate_policy = policy;
        self
    }

    pub fn with_stats_school_limit(mut self, limit: usize) -> Self {
        assert!(limit > 0, "Stats school limit must be greater than zero");
        self.stats_school_limit = Some(limit);
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(limit) = self.stats_school_limit
            && limit == 0
        {
            return Err("Stats school limit must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
