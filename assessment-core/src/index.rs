//! Exact inner-product vector index
//!
//! Flat row-major storage; every search compares the query against every row.
//! With unit-norm rows the inner product is the cosine similarity.

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};

/// Similarity metric recorded in the index artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    InnerProduct,
}

/// On-disk shape of the index artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndexFile {
    pub metric: Metric,
    pub dimension: usize,
    pub ntotal: usize,
    /// `ntotal * dimension` floats, row-major
    pub data: Vec<f32>,
}

/// In-memory flat index over all catalog embeddings
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    ntotal: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    /// Build from embedding rows, all of which must share one dimension
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let dimension = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * dimension);
        for (position, row) in rows.iter().enumerate() {
            if row.len() != dimension {
                return Err(RecommendError::initialization(format!(
                    "row {} has dimension {}, expected {}",
                    position,
                    row.len(),
                    dimension
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            dimension,
            ntotal: rows.len(),
            data,
        })
    }

    /// Validate and adopt a decoded index artifact
    pub fn from_file(file: FlatIndexFile) -> Result<Self> {
        if file.metric != Metric::InnerProduct {
            return Err(RecommendError::initialization("index metric must be inner product"));
        }
        if file.data.len() != file.ntotal * file.dimension {
            return Err(RecommendError::initialization(format!(
                "index holds {} floats, header declares {} x {}",
                file.data.len(),
                file.ntotal,
                file.dimension
            )));
        }
        Ok(Self {
            dimension: file.dimension,
            ntotal: file.ntotal,
            data: file.data,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.ntotal
    }

    pub fn is_empty(&self) -> bool {
        self.ntotal == 0
    }

    /// Stored vector at `position`
    pub fn row(&self, position: usize) -> Option<&[f32]> {
        if position >= self.ntotal {
            return None;
        }
        let start = position * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    /// Top `top_n` positions by descending inner product.
    ///
    /// Equal scores keep ascending position order. Never returns a position
    /// outside `[0, len)`.
    pub fn search(&self, query: &[f32], top_n: usize) -> Result<Vec<(usize, f32)>> {
        if self.ntotal == 0 || self.dimension == 0 {
            return Err(RecommendError::NotInitialized);
        }
        if query.len() != self.dimension {
            return Err(RecommendError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = (0..self.ntotal)
            .filter_map(|position| self.row(position).map(|row| (position, dot(query, row))))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_n.min(self.ntotal));
        Ok(scored)
    }
}

/// Inner product of two equal-length vectors
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm
pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale to unit length in place. A zero vector is left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let n = norm(v);
    if n > 0.0 {
        for x in v.iter_mut() {
            *x /= n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(rows: &[[f32; 3]]) -> VectorIndex {
        let rows: Vec<Vec<f32>> = rows.iter().map(|r| r.to_vec()).collect();
        VectorIndex::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_search_orders_by_inner_product() {
        let idx = index(&[[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.6, 0.8, 0.0]]);
        let results = idx.search(&[1.0, 0.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = results.iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![1, 2, 0]);
        assert!((results[0].1 - 1.0).abs() < 1e-6);
        assert!((results[1].1 - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_search_truncates_to_top_n_and_len() {
        let idx = index(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(idx.search(&[1.0, 0.0, 0.0], 1).unwrap().len(), 1);
        assert_eq!(idx.search(&[1.0, 0.0, 0.0], 50).unwrap().len(), 2);
    }

    #[test]
    fn test_ties_keep_position_order() {
        let idx = index(&[[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]]);
        let results = idx.search(&[1.0, 0.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = results.iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let idx = index(&[[1.0, 0.0, 0.0]]);
        let err = idx.search(&[1.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            RecommendError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_empty_index_is_not_initialized() {
        let idx = VectorIndex::from_rows(&[]).unwrap();
        assert!(matches!(
            idx.search(&[1.0], 5),
            Err(RecommendError::NotInitialized)
        ));
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let rows = vec![vec![1.0, 0.0], vec![1.0]];
        assert!(VectorIndex::from_rows(&rows).is_err());
    }

    #[test]
    fn test_from_file_checks_length() {
        let file = FlatIndexFile {
            metric: Metric::InnerProduct,
            dimension: 2,
            ntotal: 2,
            data: vec![1.0, 0.0, 0.0],
        };
        assert!(VectorIndex::from_file(file).is_err());
    }

    #[test]
    fn test_row_access() {
        let idx = index(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(idx.row(1).unwrap(), &[4.0, 5.0, 6.0]);
        assert!(idx.row(2).is_none());
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((norm(&v) - 1.0).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }
}
