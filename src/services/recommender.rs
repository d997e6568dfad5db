use std::cmp::Ordering;

use crate::{
    error::{AppError, AppResult},
    models::{round_score, PlantCatalog, SimilarityMatrix},
};

/// Ranks catalog plants by aggregated similarity to one or more query plants.
///
/// The catalog and matrix are injected read-only; every call is a pure
/// function of them, so any number of callers can share one instance.
pub struct Recommender<'a> {
    catalog: &'a PlantCatalog,
    similarity: &'a SimilarityMatrix,
}

impl<'a> Recommender<'a> {
    pub fn new(catalog: &'a PlantCatalog, similarity: &'a SimilarityMatrix) -> Self {
        Self {
            catalog,
            similarity,
        }
    }

    /// Returns the `top_k` plants most similar to the queries, best first.
    ///
    /// Each query contributes its full matrix row, rounded per score; with
    /// several queries the rows are summed position-wise with equal weight
    /// and the sums rounded again. Query plants themselves are excluded
    /// from the ranking, including from each other's results. Ties on the
    /// combined score break by ascending catalog position. Fewer than
    /// `top_k` remaining candidates is not an error; whatever exists is
    /// returned.
    pub fn recommend(&self, query_ids: &[String], top_k: usize) -> AppResult<Vec<String>> {
        if query_ids.is_empty() {
            return Err(AppError::InvalidInput(
                "at least one plant must be selected".to_string(),
            ));
        }

        let n = self.catalog.len();
        let mut excluded = vec![false; n];
        let mut query_positions = Vec::with_capacity(query_ids.len());

        for id in query_ids {
            let position = self
                .catalog
                .position(id)
                .ok_or_else(|| AppError::NotFound(format!("unknown plant: {}", id)))?;
            // A plant listed twice still contributes its row once.
            if !excluded[position] {
                query_positions.push(position);
            }
            excluded[position] = true;
        }

        let mut scores = vec![0.0_f64; n];
        for &position in &query_positions {
            for (candidate, &score) in self.similarity.row(position).iter().enumerate() {
                scores[candidate] += round_score(score);
            }
        }
        if query_positions.len() > 1 {
            for score in &mut scores {
                *score = round_score(*score);
            }
        }

        let mut ranked: Vec<usize> = (0..n).filter(|&p| !excluded[p]).collect();
        ranked.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(&b))
        });

        Ok(ranked
            .into_iter()
            .take(top_k)
            .filter_map(|p| self.catalog.id_at(p))
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> PlantCatalog {
        PlantCatalog::from_ids(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn queries(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_query_ranking() {
        let catalog = catalog(&["P0", "P1", "P2", "P3"]);
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.9, 0.1, 0.5],
            vec![0.9, 1.0, 0.3, 0.2],
            vec![0.1, 0.3, 1.0, 0.7],
            vec![0.5, 0.2, 0.7, 1.0],
        ])
        .unwrap();

        let recommender = Recommender::new(&catalog, &matrix);
        let result = recommender.recommend(&queries(&["P0"]), 2).unwrap();
        assert_eq!(result, vec!["P1", "P3"]);
    }

    #[test]
    fn test_multi_query_sums_scores() {
        let catalog = catalog(&["P0", "P1", "P2", "P3"]);
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.9, 0.1, 0.5],
            vec![0.9, 1.0, 0.3, 0.2],
            vec![0.1, 0.2, 1.0, 0.7],
            vec![0.5, 0.2, 0.7, 1.0],
        ])
        .unwrap();

        // Combined: P1 = 0.9 + 0.2 = 1.1, P3 = 0.5 + 0.7 = 1.2
        let recommender = Recommender::new(&catalog, &matrix);
        let result = recommender.recommend(&queries(&["P0", "P2"]), 2).unwrap();
        assert_eq!(result, vec!["P3", "P1"]);
    }

    #[test]
    fn test_queries_never_recommended() {
        let catalog = catalog(&["P0", "P1", "P2", "P3"]);
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.9, 0.1, 0.5],
            vec![0.9, 1.0, 0.3, 0.2],
            vec![0.1, 0.2, 1.0, 0.7],
            vec![0.5, 0.2, 0.7, 1.0],
        ])
        .unwrap();

        let recommender = Recommender::new(&catalog, &matrix);
        let result = recommender
            .recommend(&queries(&["P0", "P2"]), 10)
            .unwrap();
        assert_eq!(result.len(), 2);
        assert!(!result.contains(&"P0".to_string()));
        assert!(!result.contains(&"P2".to_string()));
    }

    #[test]
    fn test_top_k_larger_than_catalog() {
        let catalog = catalog(&["P0", "P1"]);
        let matrix =
            SimilarityMatrix::from_rows(vec![vec![1.0, 0.4], vec![0.4, 1.0]]).unwrap();

        let recommender = Recommender::new(&catalog, &matrix);
        let result = recommender.recommend(&queries(&["P0"]), 6).unwrap();
        assert_eq!(result, vec!["P1"]);
    }

    #[test]
    fn test_ties_break_by_catalog_position() {
        let catalog = catalog(&["P0", "P1", "P2", "P3"]);
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.5, 0.5, 0.5],
            vec![0.5, 1.0, 0.0, 0.0],
            vec![0.5, 0.0, 1.0, 0.0],
            vec![0.5, 0.0, 0.0, 1.0],
        ])
        .unwrap();

        let recommender = Recommender::new(&catalog, &matrix);
        let result = recommender.recommend(&queries(&["P0"]), 3).unwrap();
        assert_eq!(result, vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn test_duplicate_queries_count_once() {
        let catalog = catalog(&["P0", "P1", "P2"]);
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.9, 0.1],
            vec![0.9, 1.0, 0.3],
            vec![0.1, 0.3, 1.0],
        ])
        .unwrap();

        let recommender = Recommender::new(&catalog, &matrix);
        let once = recommender.recommend(&queries(&["P0"]), 2).unwrap();
        let twice = recommender
            .recommend(&queries(&["P0", "P0"]), 2)
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_plant_names_offender() {
        let catalog = catalog(&["P0", "P1"]);
        let matrix =
            SimilarityMatrix::from_rows(vec![vec![1.0, 0.4], vec![0.4, 1.0]]).unwrap();

        let recommender = Recommender::new(&catalog, &matrix);
        let err = recommender
            .recommend(&queries(&["P0", "Ficus lyrata"]), 2)
            .unwrap_err();
        match err {
            AppError::NotFound(msg) => assert!(msg.contains("Ficus lyrata")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_query_rejected() {
        let catalog = catalog(&["P0"]);
        let matrix = SimilarityMatrix::from_rows(vec![vec![1.0]]).unwrap();

        let recommender = Recommender::new(&catalog, &matrix);
        let err = recommender.recommend(&[], 6).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_symmetric_matrix_round_trip() {
        let catalog = catalog(&["P0", "P1", "P2"]);
        let rows = vec![
            vec![1.0, 0.8, 0.3],
            vec![0.8, 1.0, 0.5],
            vec![0.3, 0.5, 1.0],
        ];
        let matrix = SimilarityMatrix::from_rows(rows).unwrap();

        let recommender = Recommender::new(&catalog, &matrix);
        let result = recommender.recommend(&queries(&["P0"]), 1).unwrap();
        assert_eq!(result, vec!["P1"]);

        // P1 made P0's list, so P1's row scores P0 with the same strength.
        assert_eq!(matrix.row(1)[0], matrix.row(0)[1]);
        assert!(matrix.row(1)[0] > 0.0);
    }

    #[test]
    fn test_deterministic_across_calls() {
        let catalog = catalog(&["P0", "P1", "P2", "P3", "P4"]);
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.33335, 0.33335, 0.2, 0.1],
            vec![0.33335, 1.0, 0.5, 0.4, 0.3],
            vec![0.33335, 0.5, 1.0, 0.6, 0.2],
            vec![0.2, 0.4, 0.6, 1.0, 0.7],
            vec![0.1, 0.3, 0.2, 0.7, 1.0],
        ])
        .unwrap();

        let recommender = Recommender::new(&catalog, &matrix);
        let query = queries(&["P0", "P3"]);
        let first = recommender.recommend(&query, 3).unwrap();
        let second = recommender.recommend(&query, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rounding_applied_per_score_then_after_sum() {
        let catalog = catalog(&["P0", "P1", "P2", "P3"]);
        // Raw sums would put P3 (1.20004) ahead of P1 (1.19996); per-score
        // rounding collapses both to 1.2 and the tie resolves by position.
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.6, 1.0, 0.600_04],
            vec![0.6, 1.0, 0.599_96, 0.1],
            vec![1.0, 0.599_96, 1.0, 0.6],
            vec![0.600_04, 0.1, 0.6, 1.0],
        ])
        .unwrap();

        let recommender = Recommender::new(&catalog, &matrix);
        let result = recommender.recommend(&queries(&["P0", "P2"]), 2).unwrap();
        assert_eq!(result, vec!["P1", "P3"]);
    }
}
