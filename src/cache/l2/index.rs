//! Exact flat inner-product index.
//!
//! Vectors are stored row-major in one contiguous buffer. With L2-normalized inputs the inner
//! product is the cosine similarity, so search results are clamped to `[-1, 1]` to absorb
//! floating-point drift.

use super::error::{VectorIndexError, VectorIndexResult};

#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    ordinals: Vec<u32>,
    values: Vec<f32>,
}

/// One search hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHit {
    pub ordinal: u32,
    pub similarity: f32,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> VectorIndexResult<Self> {
        if dimension == 0 {
            return Err(VectorIndexError::InvalidDimension(dimension));
        }
        Ok(Self {
            dimension,
            ordinals: Vec::new(),
            values: Vec::new(),
        })
    }

    /// Rebuilds an index from raw buffers (used when loading from disk).
    pub fn from_parts(
        dimension: usize,
        ordinals: Vec<u32>,
        values: Vec<f32>,
    ) -> VectorIndexResult<Self> {
        if dimension == 0 {
            return Err(VectorIndexError::InvalidDimension(dimension));
        }
        if ordinals.len().checked_mul(dimension) != Some(values.len()) {
            return Err(VectorIndexError::LengthMismatch {
                ordinals: ordinals.len(),
                values: values.len(),
                dimension,
            });
        }
        Ok(Self {
            dimension,
            ordinals,
            values,
        })
    }

    /// Appends a vector. The caller is responsible for normalizing it.
    pub fn add(&mut self, ordinal: u32, vector: &[f32]) -> VectorIndexResult<()> {
        self.check_dimension(vector)?;
        self.ordinals.push(ordinal);
        self.values.extend_from_slice(vector);
        Ok(())
    }

    /// Top-`k` hits by descending inner product.
    ///
    /// Returns fewer than `k` hits only when the index holds fewer vectors. Equal scores keep
    /// insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> VectorIndexResult<Vec<IndexHit>> {
        self.check_dimension(query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<IndexHit> = self
            .rows()
            .zip(&self.ordinals)
            .map(|(row, &ordinal)| IndexHit {
                ordinal,
                similarity: clamp_similarity(dot(row, query)),
            })
            .collect();

        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(k);
        Ok(hits)
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }

    pub fn ordinals(&self) -> &[u32] {
        &self.ordinals
    }

    /// Row-major vector buffer (`len() * dimension()` values).
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(self.dimension)
    }

    fn check_dimension(&self, vector: &[f32]) -> VectorIndexResult<()> {
        if vector.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[inline]
fn clamp_similarity(similarity: f32) -> f32 {
    if similarity.is_nan() {
        -1.0
    } else {
        similarity.clamp(-1.0, 1.0)
    }
}

#[inline]
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
