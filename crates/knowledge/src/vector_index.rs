//! Vector index abstraction and the exact flat L2 backend.
//!
//! Vectors are identified by their insertion ordinal, which is the ordinal of
//! the chunk they embed. Distances are squared Euclidean (no square root), so
//! smaller means more similar.

use supportbot_core::{AppError, AppResult};

/// Ranked results of a k-nearest-neighbour search.
///
/// `distances[i]` belongs to `ordinals[i]`; both are ordered by ascending
/// distance, ties broken by ascending ordinal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub distances: Vec<f32>,
    pub ordinals: Vec<usize>,
}

impl SearchHits {
    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }
}

/// Trait for vector index backends.
pub trait VectorIndex: Send + Sync {
    /// Fixed dimension D of every stored vector.
    fn dimension(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append vectors; the first one gets ordinal `len()`.
    ///
    /// Fails without modifying the index if any vector has the wrong dimension.
    fn add(&mut self, vectors: &[Vec<f32>]) -> AppResult<()>;

    /// Return the `min(k, len())` nearest stored vectors to `query`.
    fn search(&self, query: &[f32], k: usize) -> AppResult<SearchHits>;
}

/// Squared Euclidean distance between two equal-length vectors.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Exact brute-force index over a contiguous row-major buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Rebuild an index from a raw row-major buffer.
    pub fn from_raw(dimension: usize, data: Vec<f32>) -> AppResult<Self> {
        let aligned = if dimension == 0 {
            data.is_empty()
        } else {
            data.len() % dimension == 0
        };
        if !aligned {
            return Err(AppError::Corruption(format!(
                "vector buffer of {} floats is not a multiple of dimension {}",
                data.len(),
                dimension
            )));
        }
        Ok(Self { dimension, data })
    }

    /// Row-major vector data.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Stored vector for `ordinal`.
    pub fn vector(&self, ordinal: usize) -> Option<&[f32]> {
        let start = ordinal.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    fn check_dimension(&self, len: usize, what: &str) -> AppResult<()> {
        if len != self.dimension {
            return Err(AppError::Corruption(format!(
                "{} has dimension {} but the index expects {}",
                what, len, self.dimension
            )));
        }
        Ok(())
    }
}

impl VectorIndex for FlatL2Index {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    fn add(&mut self, vectors: &[Vec<f32>]) -> AppResult<()> {
        for (i, vector) in vectors.iter().enumerate() {
            self.check_dimension(vector.len(), &format!("vector {}", i))?;
        }

        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> AppResult<SearchHits> {
        self.check_dimension(query.len(), "query vector")?;

        let count = self.len();
        let k = k.min(count);
        if k == 0 {
            return Ok(SearchHits::default());
        }

        let mut scored: Vec<(f32, usize)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(ordinal, row)| (squared_l2(query, row), ordinal))
            .collect();

        let by_rank = |a: &(f32, usize), b: &(f32, usize)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1));
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, by_rank);
            scored.truncate(k);
        }
        scored.sort_unstable_by(by_rank);

        Ok(SearchHits {
            distances: scored.iter().map(|(d, _)| *d).collect(),
            ordinals: scored.iter().map(|(_, o)| *o).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(vectors: &[Vec<f32>]) -> FlatL2Index {
        let mut index = FlatL2Index::new(vectors[0].len());
        index.add(vectors).unwrap();
        index
    }

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_l2(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_add_assigns_sequential_ordinals() {
        let mut index = FlatL2Index::new(2);
        index.add(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        index.add(&[vec![5.0, 5.0]]).unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.vector(2), Some(&[5.0, 5.0][..]));
        assert_eq!(index.vector(3), None);
    }

    #[test]
    fn test_add_rejects_wrong_dimension_atomically() {
        let mut index = FlatL2Index::new(2);
        let err = index
            .add(&[vec![1.0, 0.0], vec![1.0, 2.0, 3.0]])
            .unwrap_err();

        assert!(matches!(err, AppError::Corruption(_)));
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_orders_by_distance() {
        let index = index_with(&[
            vec![10.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 3.0],
            vec![0.5, 0.5],
        ]);

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(hits.ordinals, vec![3, 1, 2]);
        assert_eq!(hits.distances, vec![0.5, 1.0, 9.0]);
    }

    #[test]
    fn test_search_k_larger_than_len() {
        let index = index_with(&[vec![1.0], vec![2.0]]);

        let hits = index.search(&[0.0], 4).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits.ordinals, vec![0, 1]);
    }

    #[test]
    fn test_search_ties_break_by_ordinal() {
        let index = index_with(&[vec![1.0], vec![-1.0], vec![1.0], vec![3.0]]);

        let hits = index.search(&[0.0], 3).unwrap();
        assert_eq!(hits.ordinals, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_empty_and_zero_k() {
        let empty = FlatL2Index::new(3);
        assert!(empty.search(&[0.0, 0.0, 0.0], 4).unwrap().is_empty());

        let index = index_with(&[vec![1.0, 1.0, 1.0]]);
        assert!(index.search(&[0.0, 0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_rejects_query_dimension_mismatch() {
        let index = index_with(&[vec![1.0, 1.0, 1.0]]);
        let err = index.search(&[1.0, 1.0], 1).unwrap_err();
        assert!(matches!(err, AppError::Corruption(_)));
    }

    #[test]
    fn test_from_raw_validates_alignment() {
        assert_eq!(FlatL2Index::from_raw(2, vec![1.0; 6]).unwrap().len(), 3);
        assert!(FlatL2Index::from_raw(2, vec![1.0; 5]).is_err());
        assert!(FlatL2Index::from_raw(0, vec![]).unwrap().is_empty());
    }
}
