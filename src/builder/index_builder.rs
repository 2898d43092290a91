use std::path::Path;

use tracing::{debug, info, instrument, warn};

use super::error::{BuildError, BuildResult};
use super::types::{BuildOutcome, BuildReport};
use crate::cache::{ExactMatchStore, VectorIndex};
use crate::constants::DEFAULT_EMBED_BATCH_SIZE;
use crate::embedding::utils::l2_normalize;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::knowledge::{DatasetSource, KnowledgeEntry};
use crate::storage::{ArtifactPaths, KnowledgeBase};

/// Offline job turning a tabular dataset into the three serving artifacts.
pub struct IndexBuilder<E: EmbeddingProvider, D: DatasetSource> {
    embedder: E,
    source: D,
    batch_size: usize,
}

impl<E: EmbeddingProvider, D: DatasetSource> IndexBuilder<E, D> {
    pub fn new(embedder: E, source: D) -> Self {
        Self {
            embedder,
            source,
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Builds and persists the artifacts under `paths`.
    ///
    /// Existing artifacts are left alone unless `recreate` is set. Nothing is written when
    /// any step fails.
    #[instrument(skip(self, dataset_path, paths), fields(dataset = %dataset_path.display(), dir = %paths.dir().display()))]
    pub async fn build(
        &self,
        dataset_path: &Path,
        paths: &ArtifactPaths,
        recreate: bool,
    ) -> BuildResult<BuildOutcome> {
        if !dataset_path.is_file() {
            return Err(BuildError::DatasetMissing {
                path: dataset_path.to_path_buf(),
            });
        }
        if self.batch_size == 0 {
            return Err(BuildError::InvalidBatchSize);
        }

        if !recreate && paths.all_exist() {
            info!("Artifacts already present, skipping build");
            return Ok(BuildOutcome::Skipped {
                reason: format!("artifacts already exist in {}", paths.dir().display()),
            });
        }

        let rows = self.source.load_rows(dataset_path)?;
        let rows_read = rows.len();
        debug!(rows = rows_read, "Dataset loaded");

        let entries: Vec<KnowledgeEntry> = rows
            .iter()
            .filter_map(|row| {
                let entry = row.to_entry();
                if entry.is_none() {
                    warn!(row = row.index, "Row has no question or template, skipping");
                }
                entry
            })
            .collect();
        let rows_skipped = rows_read - entries.len();

        if entries.is_empty() {
            return Err(BuildError::EmptyKnowledgeBase {
                path: dataset_path.to_path_buf(),
            });
        }

        let vectors = self.embed_questions(&entries).await?;
        let dimension = vectors.first().map_or(0, Vec::len);

        let mut index = VectorIndex::new(dimension)?;
        for (entry, vector) in entries.iter().zip(&vectors) {
            index.add(entry.ordinal, vector)?;
        }

        let exact_match = ExactMatchStore::build(&entries);
        let report = BuildReport {
            rows_read,
            rows_skipped,
            vectors: index.len(),
            dimension,
            exact_matches: exact_match.len(),
        };

        let knowledge = KnowledgeBase::new(index, entries, exact_match);
        knowledge.persist(paths)?;

        info!(
            rows_read,
            rows_skipped,
            vectors = report.vectors,
            dimension,
            exact_matches = report.exact_matches,
            "Knowledge base built"
        );
        Ok(BuildOutcome::Built { report, knowledge })
    }

    /// Embeds every question in sequential batches; vectors come back L2-normalized.
    async fn embed_questions(&self, entries: &[KnowledgeEntry]) -> BuildResult<Vec<Vec<f32>>> {
        let questions: Vec<String> = entries.iter().map(|e| e.question.clone()).collect();
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(questions.len());
        let batches = questions.len().div_ceil(self.batch_size);

        for (batch_no, batch) in questions.chunks(self.batch_size).enumerate() {
            debug!(batch = batch_no + 1, of = batches, size = batch.len(), "Embedding batch");
            let embedded = self.embedder.embed_many(batch).await?;

            if embedded.len() != batch.len() {
                return Err(EmbeddingError::CountMismatch {
                    expected: batch.len(),
                    actual: embedded.len(),
                }
                .into());
            }
            vectors.extend(embedded);
        }

        let dimension = vectors.first().map_or(0, Vec::len);
        for vector in &mut vectors {
            if vector.len() != dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                }
                .into());
            }
            l2_normalize(vector);
        }

        Ok(vectors)
    }
}
