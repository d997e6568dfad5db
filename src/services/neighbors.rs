use std::cmp::Ordering;

use crate::{
    error::{AppError, AppResult},
    models::{PlantCatalog, ProjectionSet},
};

/// Finds the plants closest to and furthest from a selected plant in one of
/// the precomputed 2-D layouts, by Manhattan distance.
///
/// Backs the scatter-view comparison panel: the nearest plants are the ones
/// a user would see clustered around their selection, the farthest are the
/// most different under the active axes.
pub struct NeighborLocator<'a> {
    catalog: &'a PlantCatalog,
    projections: &'a ProjectionSet,
}

impl<'a> NeighborLocator<'a> {
    pub fn new(catalog: &'a PlantCatalog, projections: &'a ProjectionSet) -> Self {
        Self {
            catalog,
            projections,
        }
    }

    /// Returns `k_near` nearest plants (ascending distance) followed by
    /// `k_far` farthest plants (descending distance) in the named
    /// projection. The selected plant never appears in either part.
    ///
    /// Several plants can share identical coordinates, so the nearest pass
    /// pulls one candidate beyond `k_near` and drops the selection by
    /// identity rather than by distance; a coordinate twin is a legitimate
    /// neighbor, the selection itself is not. Distance ties break by
    /// ascending catalog position.
    pub fn nearest_and_farthest(
        &self,
        selected_id: &str,
        projection_name: &str,
        k_near: usize,
        k_far: usize,
    ) -> AppResult<Vec<String>> {
        let projection = self.projections.get(projection_name).ok_or_else(|| {
            AppError::NotFound(format!("unknown projection: {}", projection_name))
        })?;
        let selected = self
            .catalog
            .position(selected_id)
            .ok_or_else(|| AppError::NotFound(format!("unknown plant: {}", selected_id)))?;

        let target = &projection.points[selected];
        let mut distances: Vec<(usize, f64)> = projection
            .points
            .iter()
            .enumerate()
            .map(|(position, point)| {
                let distance = (point.x - target.x).abs() + (point.y - target.y).abs();
                (position, distance)
            })
            .collect();

        distances.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut names = Vec::with_capacity(k_near + k_far);

        let mut taken = 0;
        for &(position, _) in distances.iter().take(k_near + 1) {
            if position == selected {
                continue;
            }
            if taken == k_near {
                break;
            }
            if let Some(id) = self.catalog.id_at(position) {
                names.push(id.to_string());
                taken += 1;
            }
        }

        // Walking the ascending order backwards would flip the tie-break for
        // equal far distances, so the farthest pass re-sorts instead.
        distances.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut taken = 0;
        for &(position, _) in distances.iter() {
            if taken == k_far {
                break;
            }
            if position == selected {
                continue;
            }
            if let Some(id) = self.catalog.id_at(position) {
                names.push(id.to_string());
                taken += 1;
            }
        }

        Ok(names)
    }
}
