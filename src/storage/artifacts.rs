//! The three build artifacts and the read-only bundle served from them.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::cache::l1::ExactMatchStore;
use crate::cache::l2::VectorIndex;
use crate::constants::{EXACT_MATCH_FILENAME, METADATA_FILENAME, VECTOR_INDEX_FILENAME};
use crate::knowledge::{EntryCatalog, KnowledgeEntry};

use super::error::{StorageError, StorageResult};
use super::vectors::{encode_index, read_index};

/// Locations of the persisted artifacts inside a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn vector_index(&self) -> PathBuf {
        self.dir.join(VECTOR_INDEX_FILENAME)
    }

    pub fn metadata(&self) -> PathBuf {
        self.dir.join(METADATA_FILENAME)
    }

    pub fn exact_match(&self) -> PathBuf {
        self.dir.join(EXACT_MATCH_FILENAME)
    }

    pub fn all(&self) -> [PathBuf; 3] {
        [self.vector_index(), self.metadata(), self.exact_match()]
    }

    /// `true` when every artifact file is present.
    pub fn all_exist(&self) -> bool {
        self.all().iter().all(|p| p.is_file())
    }

    /// First missing artifact, if any.
    pub fn first_missing(&self) -> Option<PathBuf> {
        self.all().into_iter().find(|p| !p.is_file())
    }
}

/// Everything needed to serve requests, loaded once at startup.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub index: Arc<VectorIndex>,
    pub catalog: EntryCatalog,
    pub exact_match: Arc<ExactMatchStore>,
}

impl KnowledgeBase {
    pub fn new(index: VectorIndex, entries: Vec<KnowledgeEntry>, exact_match: ExactMatchStore) -> Self {
        Self {
            index: Arc::new(index),
            catalog: EntryCatalog::new(entries),
            exact_match: Arc::new(exact_match),
        }
    }

    /// Loads and cross-checks all artifacts. Any missing or inconsistent file is an error.
    pub fn load(paths: &ArtifactPaths) -> StorageResult<Self> {
        if let Some(path) = paths.first_missing() {
            return Err(StorageError::MissingArtifact { path });
        }

        let index = read_index(&paths.vector_index())?;
        let entries: Vec<KnowledgeEntry> = read_json(&paths.metadata())?;
        let exact_match: ExactMatchStore = read_json(&paths.exact_match())?;

        let kb = Self::new(index, entries, exact_match);
        kb.verify()?;

        info!(
            dir = %paths.dir().display(),
            vectors = kb.index.len(),
            dimension = kb.index.dimension(),
            entries = kb.catalog.len(),
            exact_matches = kb.exact_match.len(),
            "Knowledge base loaded"
        );
        Ok(kb)
    }

    /// Checks that the index, metadata and exact-match store describe the same entries.
    pub fn verify(&self) -> StorageResult<()> {
        let inconsistent = |reason: String| StorageError::Inconsistent { reason };

        if self.index.len() != self.catalog.len() {
            return Err(inconsistent(format!(
                "index holds {} vectors but metadata holds {} entries",
                self.index.len(),
                self.catalog.len()
            )));
        }

        let mut seen = HashSet::with_capacity(self.index.len());
        for &ordinal in self.index.ordinals() {
            if !self.catalog.contains(ordinal) {
                return Err(inconsistent(format!(
                    "index ordinal {} has no metadata entry",
                    ordinal
                )));
            }
            if !seen.insert(ordinal) {
                return Err(inconsistent(format!("index ordinal {} repeated", ordinal)));
            }
        }

        for stored in self.exact_match.iter() {
            let Some(entry) = self.catalog.get(stored.ordinal) else {
                return Err(inconsistent(format!(
                    "exact-match entry for ordinal {} has no metadata entry",
                    stored.ordinal
                )));
            };
            if *entry != stored.to_knowledge() {
                return Err(inconsistent(format!(
                    "exact-match entry for ordinal {} differs from its metadata entry",
                    stored.ordinal
                )));
            }
        }
        Ok(())
    }

    /// Writes all artifacts to `paths`, replacing all three or none.
    ///
    /// Each file is staged as a temp file in the target directory. Existing targets are moved
    /// aside before their replacement is renamed in; when any rename fails, every target
    /// already swapped is put back.
    pub fn persist(&self, paths: &ArtifactPaths) -> StorageResult<()> {
        fs::create_dir_all(paths.dir())?;

        let staged = [
            (stage(paths.dir(), &encode_index(&self.index)?)?, paths.vector_index()),
            (stage(paths.dir(), &to_json(self.catalog.entries(), &paths.metadata())?)?, paths.metadata()),
            (stage(paths.dir(), &to_json(self.exact_match.as_ref(), &paths.exact_match())?)?, paths.exact_match()),
        ];

        let mut swapped: Vec<(PathBuf, Option<PathBuf>)> = Vec::with_capacity(staged.len());
        for (temp, target) in staged {
            let backup = if target.is_file() {
                let backup = backup_path(&target);
                if let Err(e) = fs::rename(&target, &backup) {
                    roll_back(&swapped);
                    return Err(StorageError::WriteFailed(format!("{}: {}", target.display(), e)));
                }
                Some(backup)
            } else {
                None
            };

            if let Err(e) = temp.persist(&target) {
                if backup.is_some() {
                    restore(&target, backup.as_deref());
                }
                roll_back(&swapped);
                return Err(StorageError::WriteFailed(format!("{}: {}", target.display(), e)));
            }
            debug!(path = %target.display(), "Artifact written");
            swapped.push((target, backup));
        }

        for backup in swapped.iter().filter_map(|(_, backup)| backup.as_ref()) {
            if let Err(e) = fs::remove_file(backup) {
                warn!(path = %backup.display(), error = %e, "Failed to remove previous artifact");
            }
        }

        info!(dir = %paths.dir().display(), "Artifacts persisted");
        Ok(())
    }
}

fn backup_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.previous", name))
}

/// Undoes completed swaps, newest first.
fn roll_back(swapped: &[(PathBuf, Option<PathBuf>)]) {
    for (target, backup) in swapped.iter().rev() {
        restore(target, backup.as_deref());
    }
}

/// Puts the previous file back at `target`, or removes `target` when there was none.
fn restore(target: &Path, backup: Option<&Path>) {
    let result = match backup {
        Some(backup) => fs::rename(backup, target),
        None => fs::remove_file(target),
    };
    match result {
        Ok(()) => debug!(path = %target.display(), "Artifact rolled back"),
        Err(e) => warn!(path = %target.display(), error = %e, "Failed to roll back artifact"),
    }
}

fn stage(dir: &Path, bytes: &[u8]) -> StorageResult<NamedTempFile> {
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    Ok(temp)
}

fn to_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> StorageResult<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serialization {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let raw = fs::read(path)?;
    serde_json::from_slice(&raw).map_err(|e| StorageError::Serialization {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_kb() -> KnowledgeBase {
        let entries = vec![
            KnowledgeEntry::new(0, "Как сбросить пароль?", "Перейдите в настройки"),
            KnowledgeEntry::new(2, "Где мой заказ?", "Проверьте статус"),
        ];
        let index = VectorIndex::from_parts(2, vec![0, 2], vec![1.0, 0.0, 0.0, 1.0]).expect("index");
        let store = ExactMatchStore::build(entries.iter());
        KnowledgeBase::new(index, entries, store)
    }

    fn rebuilt_kb() -> KnowledgeBase {
        let entries = vec![
            KnowledgeEntry::new(0, "Как изменить email?", "Откройте профиль"),
            KnowledgeEntry::new(1, "Как связаться с поддержкой?", "Напишите в чат"),
            KnowledgeEntry::new(2, "Как удалить аккаунт?", "Обратитесь в поддержку"),
        ];
        let index = VectorIndex::from_parts(2, vec![0, 1, 2], vec![1.0, 0.0, 0.0, 1.0, 0.6, 0.8])
            .expect("index");
        let store = ExactMatchStore::build(entries.iter());
        KnowledgeBase::new(index, entries, store)
    }

    fn read_all(paths: &[PathBuf]) -> Vec<Vec<u8>> {
        paths.iter().map(|p| fs::read(p).expect("read")).collect()
    }

    /// Replaces an artifact file with a non-empty directory so renaming onto it fails.
    fn block_with_directory(path: &Path) {
        fs::remove_file(path).expect("remove");
        fs::create_dir(path).expect("mkdir");
        fs::write(path.join("keep"), b"x").expect("write");
    }

    fn dir_entry_count(dir: &Path) -> usize {
        fs::read_dir(dir).expect("read_dir").count()
    }

    #[test]
    fn test_persist_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ArtifactPaths::new(dir.path());
        assert!(!paths.all_exist());

        sample_kb().persist(&paths).expect("persist");
        assert!(paths.all_exist());

        let loaded = KnowledgeBase::load(&paths).expect("load");
        assert_eq!(loaded.index.len(), 2);
        assert_eq!(loaded.catalog.len(), 2);
        assert!(loaded.exact_match.lookup("где мой заказ").is_some());
    }

    #[test]
    fn test_persist_is_byte_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ArtifactPaths::new(dir.path());

        sample_kb().persist(&paths).expect("persist");
        let first: Vec<Vec<u8>> = paths.all().iter().map(|p| fs::read(p).expect("read")).collect();
        sample_kb().persist(&paths).expect("persist");
        let second: Vec<Vec<u8>> = paths.all().iter().map(|p| fs::read(p).expect("read")).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_load_missing_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ArtifactPaths::new(dir.path());
        sample_kb().persist(&paths).expect("persist");
        fs::remove_file(paths.metadata()).expect("remove");

        assert!(matches!(
            KnowledgeBase::load(&paths),
            Err(StorageError::MissingArtifact { .. })
        ));
    }

    #[test]
    fn test_verify_count_mismatch() {
        let entries = vec![KnowledgeEntry::new(0, "q", "t"), KnowledgeEntry::new(1, "q2", "t2")];
        let index = VectorIndex::from_parts(1, vec![0], vec![1.0]).expect("index");
        let kb = KnowledgeBase::new(index, entries, ExactMatchStore::new());
        assert!(matches!(kb.verify(), Err(StorageError::Inconsistent { .. })));
    }

    #[test]
    fn test_verify_dangling_ordinal() {
        let entries = vec![KnowledgeEntry::new(0, "q", "t")];
        let index = VectorIndex::from_parts(1, vec![5], vec![1.0]).expect("index");
        let kb = KnowledgeBase::new(index, entries, ExactMatchStore::new());
        assert!(matches!(kb.verify(), Err(StorageError::Inconsistent { .. })));
    }

    #[test]
    fn test_load_corrupt_metadata() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ArtifactPaths::new(dir.path());
        sample_kb().persist(&paths).expect("persist");
        fs::write(paths.metadata(), b"{not json").expect("write");

        assert!(matches!(
            KnowledgeBase::load(&paths),
            Err(StorageError::Serialization { .. })
        ));
    }

    #[test]
    fn test_verify_exact_match_differs_from_metadata() {
        let entries = vec![KnowledgeEntry::new(0, "Как сбросить пароль?", "Перейдите в настройки")];
        let stale = [KnowledgeEntry::new(0, "Как сбросить пароль?", "Старый шаблон")];
        let index = VectorIndex::from_parts(1, vec![0], vec![1.0]).expect("index");
        let kb = KnowledgeBase::new(index, entries, ExactMatchStore::build(stale.iter()));

        match kb.verify() {
            Err(StorageError::Inconsistent { reason }) => assert!(reason.contains("differs")),
            other => panic!("expected Inconsistent, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_exact_match_without_metadata_entry() {
        let entries = vec![KnowledgeEntry::new(0, "q", "t")];
        let orphan = [KnowledgeEntry::new(7, "другой вопрос", "t")];
        let index = VectorIndex::from_parts(1, vec![0], vec![1.0]).expect("index");
        let kb = KnowledgeBase::new(index, entries, ExactMatchStore::build(orphan.iter()));
        assert!(matches!(kb.verify(), Err(StorageError::Inconsistent { .. })));
    }

    #[test]
    fn test_failed_metadata_swap_keeps_previous_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ArtifactPaths::new(dir.path());
        sample_kb().persist(&paths).expect("first persist");
        block_with_directory(&paths.metadata());
        let untouched = [paths.vector_index(), paths.exact_match()];
        let before = read_all(&untouched);

        let result = rebuilt_kb().persist(&paths);

        assert!(matches!(result, Err(StorageError::WriteFailed(_))));
        assert_eq!(read_all(&untouched), before);
        assert!(paths.metadata().join("keep").exists());
        assert_eq!(dir_entry_count(dir.path()), 3, "staged and backup files are cleaned up");

        fs::remove_dir_all(paths.metadata()).expect("unblock");
        rebuilt_kb().persist(&paths).expect("retry");
        let loaded = KnowledgeBase::load(&paths).expect("load");
        assert_eq!(loaded.catalog.len(), 3);
    }

    #[test]
    fn test_failed_last_swap_restores_earlier_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ArtifactPaths::new(dir.path());
        sample_kb().persist(&paths).expect("first persist");
        let swapped_first = [paths.vector_index(), paths.metadata()];
        let before = read_all(&swapped_first);
        block_with_directory(&paths.exact_match());

        let result = rebuilt_kb().persist(&paths);

        assert!(matches!(result, Err(StorageError::WriteFailed(_))));
        assert_eq!(read_all(&swapped_first), before);
        assert_eq!(dir_entry_count(dir.path()), 3);
    }

    #[test]
    fn test_failed_first_persist_leaves_no_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = ArtifactPaths::new(dir.path());
        fs::create_dir(paths.exact_match()).expect("mkdir");
        fs::write(paths.exact_match().join("keep"), b"x").expect("write");

        assert!(sample_kb().persist(&paths).is_err());
        assert!(!paths.vector_index().exists());
        assert!(!paths.metadata().exists());
        assert_eq!(dir_entry_count(dir.path()), 1);
    }
}
