use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One plant's coordinates in a 2-D layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionPoint {
    pub plant_name: String,
    pub x: f64,
    pub y: f64,
}

/// A named 2-D layout over the whole catalog, used for the comparison
/// scatter view. Points are stored in catalog position order so a catalog
/// position indexes directly into `points`.
#[derive(Debug, Clone)]
pub struct Projection {
    pub name: String,
    pub points: Vec<ProjectionPoint>,
}

/// All precomputed projection variants, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ProjectionSet {
    projections: HashMap<String, Projection>,
}

impl ProjectionSet {
    pub fn insert(&mut self, projection: Projection) {
        self.projections.insert(projection.name.clone(), projection);
    }

    pub fn get(&self, name: &str) -> Option<&Projection> {
        self.projections.get(name)
    }

    pub fn len(&self) -> usize {
        self.projections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projections.is_empty()
    }
}
