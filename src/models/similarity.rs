use crate::error::{AppError, AppResult};

/// Rounds a similarity score to 4 decimal places.
///
/// Scores are rounded before any summation or comparison so repeated runs
/// never diverge on floating point noise in the stored matrix.
pub fn round_score(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Immutable N×N matrix of pairwise similarity scores, row-major.
///
/// `row(i)[j]` is the similarity between the plants at catalog positions
/// `i` and `j`; higher means more similar. The diagonal holds the maximum
/// (self-similarity) and is always excluded from ranking results. Source
/// data is symmetric but nothing here relies on that.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    scores: Vec<f64>,
    n: usize,
}

impl SimilarityMatrix {
    /// Builds a matrix from nested rows, rejecting ragged or non-square input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> AppResult<Self> {
        let n = rows.len();
        let mut scores = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(AppError::Internal(format!(
                    "similarity matrix is not square: row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            scores.extend(row);
        }
        Ok(Self { scores, n })
    }

    /// Number of catalog items the matrix covers.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Full score row for the item at `position`.
    ///
    /// Panics if `position` is out of bounds; callers resolve positions
    /// through the catalog first.
    pub fn row(&self, position: usize) -> &[f64] {
        &self.scores[position * self.n..(position + 1) * self.n]
    }
}
