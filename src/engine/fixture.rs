//! Fixture definitions: collision geometry plus material and filter data.

use serde::{Deserialize, Serialize};

use super::BodyHandle;
use crate::foundation::math::Vec2;

/// Collision geometry of a single fixture, in body-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Solid circle.
    Circle {
        /// Center offset from the body origin.
        offset: Vec2,
        /// Radius in meters.
        radius: f32,
    },
    /// One-sided line segment, typically static ground or walls.
    Edge {
        /// Segment start in body-local coordinates.
        start: Vec2,
        /// Segment end in body-local coordinates.
        end: Vec2,
    },
}

/// Category/mask collision filter.
///
/// `category` says what a fixture *is*, `mask` says what it collides with.
/// Two fixtures generate contacts only if each one's category intersects the
/// other's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// What this fixture is (16 independent bits).
    pub category: u16,
    /// What this fixture collides with.
    pub mask: u16,
}

impl Filter {
    /// True if fixtures carrying `a` and `b` are allowed to collide.
    pub fn allows(a: Filter, b: Filter) -> bool {
        (a.category & b.mask) != 0 && (b.category & a.mask) != 0
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            category: 0x0001,
            mask: 0xFFFF,
        }
    }
}

/// Everything needed to create one fixture on a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureDef {
    /// Collision geometry.
    pub geometry: Geometry,
    /// Mass density in kg/m². Edges have no area and contribute no mass.
    #[serde(default = "default_density")]
    pub density: f32,
    /// Coulomb friction coefficient.
    #[serde(default = "default_friction")]
    pub friction: f32,
    /// Bounciness in `[0, 1]`.
    #[serde(default)]
    pub restitution: f32,
    /// Collision filter bits.
    #[serde(default)]
    pub filter: Filter,
    /// Optional application-assigned identifier, used to address a subset of
    /// an entity's fixtures in the filter mutators.
    #[serde(default)]
    pub id: Option<String>,
}

fn default_density() -> f32 {
    1.0
}

fn default_friction() -> f32 {
    0.2
}

impl FixtureDef {
    /// Circle fixture with default material and filter.
    pub fn circle(offset: Vec2, radius: f32) -> Self {
        Self::new(Geometry::Circle { offset, radius })
    }

    /// Edge fixture with default material and filter.
    pub fn edge(start: Vec2, end: Vec2) -> Self {
        Self::new(Geometry::Edge { start, end })
    }

    /// Fixture with the given geometry and defaults for everything else.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            density: default_density(),
            friction: default_friction(),
            restitution: 0.0,
            filter: Filter::default(),
            id: None,
        }
    }

    /// Set the density.
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Set the restitution.
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set the filter bits.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the application-assigned fixture id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Live fixture as stored in the engine.
#[derive(Debug, Clone)]
pub(crate) struct Fixture {
    pub body: BodyHandle,
    pub geometry: Geometry,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub filter: Filter,
    pub id: Option<String>,
}

impl Fixture {
    pub fn from_def(body: BodyHandle, def: &FixtureDef) -> Self {
        Self {
            body,
            geometry: def.geometry.clone(),
            density: def.density,
            friction: def.friction,
            restitution: def.restitution,
            filter: def.filter,
            id: def.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_requires_mutual_interest() {
        let a = Filter {
            category: 0x0002,
            mask: 0x0004,
        };
        let b = Filter {
            category: 0x0004,
            mask: 0x0002,
        };
        assert!(Filter::allows(a, b));

        let deaf = Filter {
            category: 0x0004,
            mask: 0x0008,
        };
        assert!(!Filter::allows(a, deaf));
    }

    #[test]
    fn default_filter_collides_with_everything() {
        assert!(Filter::allows(Filter::default(), Filter::default()));
    }
}
