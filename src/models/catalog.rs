use std::collections::HashMap;

use crate::error::{AppError, AppResult};

/// Ordered mapping between plant names and their matrix positions.
///
/// Position is assigned once at catalog-build time (database row order) and
/// is the row index into the similarity matrix. The catalog is loaded
/// read-only at startup and never mutated by requests.
#[derive(Debug, Clone, Default)]
pub struct PlantCatalog {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl PlantCatalog {
    /// Builds a catalog from ids in position order. Duplicate ids are
    /// rejected since they would make the id→position mapping ambiguous.
    pub fn from_ids(ids: Vec<String>) -> AppResult<Self> {
        let mut positions = HashMap::with_capacity(ids.len());
        for (position, id) in ids.iter().enumerate() {
            if positions.insert(id.clone(), position).is_some() {
                return Err(AppError::Internal(format!(
                    "duplicate plant name in catalog: {}",
                    id
                )));
            }
        }
        Ok(Self { ids, positions })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Matrix position for a plant name, if the plant is in the catalog.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Plant name at a matrix position.
    pub fn id_at(&self, position: usize) -> Option<&str> {
        self.ids.get(position).map(String::as_str)
    }

    /// All plant names in position order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}
