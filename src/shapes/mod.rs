//! Named shape library.
//!
//! Bodies are usually built from shapes designed offline and referenced by
//! name at spawn time. A [`ShapeCache`] maps each name to the ordered list
//! of fixture definitions to instantiate on the body. Entries can be
//! inserted programmatically or loaded from a RON document:
//!
//! ```text
//! {
//!     "rock": [
//!         (geometry: Circle(offset: (0.0, 0.0), radius: 0.5), density: 2.0),
//!     ],
//!     "ground": [
//!         (geometry: Edge(start: (-10.0, 0.0), end: (10.0, 0.0)), friction: 0.6),
//!     ],
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::FixtureDef;

/// Errors from shape lookup and library loading.
#[derive(Debug, Error)]
pub enum ShapeCacheError {
    /// The requested shape name is not in the cache.
    #[error("shape not found in cache: {0:?}")]
    NotFound(String),

    /// The shape library file could not be parsed.
    #[error("failed to parse shape library: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The shape library file could not be read.
    #[error("failed to read shape library: {0}")]
    Io(#[from] std::io::Error),
}

/// Shape library keyed by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeCache {
    shapes: HashMap<String, Vec<FixtureDef>>,
}

impl ShapeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a cache from a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ShapeCacheError> {
        Ok(ron::from_str(source)?)
    }

    /// Load a cache from a RON file.
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ShapeCacheError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let cache = Self::from_ron_str(&source)?;
        log::info!(
            "loaded {} shapes from {}",
            cache.len(),
            path.as_ref().display()
        );
        Ok(cache)
    }

    /// Insert or replace a named shape.
    pub fn insert(&mut self, name: impl Into<String>, fixtures: Vec<FixtureDef>) {
        self.shapes.insert(name.into(), fixtures);
    }

    /// Fixture definitions for a named shape, in insertion order.
    pub fn fixture_defs(&self, name: &str) -> Result<&[FixtureDef], ShapeCacheError> {
        self.shapes
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ShapeCacheError::NotFound(name.to_owned()))
    }

    /// Whether a shape with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    /// Number of shapes in the cache.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Iterate over the shape names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Filter, Geometry};
    use crate::foundation::math::Vec2;

    fn sample_cache() -> ShapeCache {
        let mut cache = ShapeCache::new();
        cache.insert(
            "rock",
            vec![FixtureDef::circle(Vec2::zeros(), 0.5)
                .with_density(2.0)
                .with_id("core")],
        );
        cache.insert(
            "ground",
            vec![FixtureDef::edge(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0))],
        );
        cache
    }

    #[test]
    fn lookup_returns_definitions_in_order() {
        let cache = sample_cache();
        let defs = cache.fixture_defs("rock").unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].density, 2.0);
        assert_eq!(defs[0].id.as_deref(), Some("core"));
    }

    #[test]
    fn unknown_name_is_a_named_error() {
        let cache = sample_cache();
        let err = cache.fixture_defs("missing").unwrap_err();
        assert!(matches!(err, ShapeCacheError::NotFound(ref name) if name == "missing"));
    }

    #[test]
    fn survives_ron_serialization() {
        let mut cache = sample_cache();
        cache.insert(
            "filtered",
            vec![FixtureDef::circle(Vec2::new(0.1, -0.2), 1.5).with_filter(Filter {
                category: 0x0002,
                mask: 0x00FF,
            })],
        );

        let ron = ron::to_string(&cache).unwrap();
        let parsed = ShapeCache::from_ron_str(&ron).unwrap();
        assert_eq!(parsed.len(), 3);

        let defs = parsed.fixture_defs("filtered").unwrap();
        assert_eq!(defs[0].filter.category, 0x0002);
        match &defs[0].geometry {
            Geometry::Circle { radius, .. } => assert_eq!(*radius, 1.5),
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn bad_ron_is_a_parse_error() {
        let err = ShapeCache::from_ron_str("{ not ron").unwrap_err();
        assert!(matches!(err, ShapeCacheError::Parse(_)));
    }
}
