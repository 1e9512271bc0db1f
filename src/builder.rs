//! Engine builder for flexible configuration.
//!
//! This module provides a builder pattern for assembling an engine from
//! district records, a boundary pack file, a custom store, and config.

use crate::boundary::BoundaryIndex;
use crate::engine::Engine;
use crate::error::{MaktabError, Result};
use crate::store::{MemoryStore, SchoolStore};
use crate::types::{Config, District};
#[cfg(feature = "geojson")]
use std::path::PathBuf;

/// Builder for engine configuration with explicit boundary and store wiring.
pub struct EngineBuilder {
    districts: Vec<District>,
    #[cfg(feature = "geojson")]
    boundary_path: Option<PathBuf>,
    config: Config,
    store: Option<Box<dyn SchoolStore>>,
}

impl EngineBuilder {
    /// Create a new builder with no districts and the in-memory store.
    pub fn new() -> Self {
        Self {
            districts: Vec::new(),
            #[cfg(feature = "geojson")]
            boundary_path: None,
            config: Config::default(),
            store: None,
        }
    }

    /// Add a single district to the boundary index.
    pub fn district(mut self, district: District) -> Self {
        self.districts.push(district);
        self
    }

    /// Add a batch of districts to the boundary index.
    pub fn districts(mut self, districts: impl IntoIterator<Item = District>) -> Self {
        self.districts.extend(districts);
        self
    }

    /// Load districts from a GeoJSON FeatureCollection file at build time.
    /// Loaded districts are appended to any added explicitly.
    #[cfg(feature = "geojson")]
    pub fn boundary_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.boundary_path = Some(path.into());
        self
    }

    /// Set the engine configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Use a custom school store instead of the in-memory default.
    pub fn store(mut self, store: Box<dyn SchoolStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the engine. Loads the boundary pack if one was configured.
    pub fn build(self) -> Result<Engine> {
        if let Err(e) = self.config.validate() {
            return Err(MaktabError::InvalidInput(e));
        }

        #[allow(unused_mut)]
        let mut districts = self.districts;

        #[cfg(feature = "geojson")]
        if let Some(path) = self.boundary_path {
            let input = std::fs::read_to_string(path)?;
            districts.extend(crate::geojson::districts_from_geojson(&input)?);
        }

        let boundaries = BoundaryIndex::new(districts)?;
        let store = self.store.unwrap_or_else(|| Box::new(MemoryStore::new()));
        Ok(Engine::with_store(boundaries, store, self.config))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
