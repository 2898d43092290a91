use crate::knowledge::Candidate;

#[derive(Debug, Clone)]
pub struct L2LookupResult {
    pub(crate) query_embedding: Vec<f32>,
    pub(crate) candidates: Vec<Candidate>,
    pub(crate) index_hits: usize,
}

impl L2LookupResult {
    pub fn new(query_embedding: Vec<f32>, candidates: Vec<Candidate>, index_hits: usize) -> Self {
        Self {
            query_embedding,
            candidates,
            index_hits,
        }
    }

    pub fn query_embedding(&self) -> &[f32] {
        &self.query_embedding
    }

    /// Candidates by descending similarity.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }

    /// Raw index hits before unresolved ordinals were dropped.
    pub fn index_hits(&self) -> usize {
        self.index_hits
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn best_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    pub fn top_similarity(&self) -> Option<f32> {
        self.best_candidate().map(|c| c.similarity)
    }
}
