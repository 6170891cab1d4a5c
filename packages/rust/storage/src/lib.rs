//! Durable JSON storage tier (secondary storage).
//!
//! The [`Storage`] struct owns a data directory holding:
//! - `analyses/<job-id>.json` — one record per completed analysis job
//! - `knowledge.json` — the aggregate knowledge-base snapshot
//!
//! Everything is plain `serde_json` with no binary framing. Writes go to a
//! temp file in the same directory and are renamed into place, so a crash
//! mid-write never leaves a truncated record behind. There is no rollback:
//! if a flush fails, in-memory state may run one mutation ahead of disk
//! until the next successful flush.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use leadlens_shared::{Job, JobId, KnowledgeRecord, LeadLensError, Result};

/// Subdirectory for per-job analysis records.
const ANALYSES_DIR: &str = "analyses";

/// File name of the knowledge-base snapshot.
const KNOWLEDGE_FILE: &str = "knowledge.json";

/// Handle on the durable storage directory.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Open (creating if necessary) the storage directory at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let analyses = root.join(ANALYSES_DIR);
        std::fs::create_dir_all(&analyses).map_err(|e| LeadLensError::io(&analyses, e))?;

        debug!(path = %root.display(), "storage opened");
        Ok(Self { root })
    }

    /// Root directory of this storage instance.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // -----------------------------------------------------------------------
    // Analysis records
    // -----------------------------------------------------------------------

    fn analysis_path(&self, id: &JobId) -> PathBuf {
        self.root.join(ANALYSES_DIR).join(format!("{id}.json"))
    }

    /// Write-through a completed job, keyed by its id.
    pub fn save_analysis(&self, job: &Job) -> Result<()> {
        let path = self.analysis_path(&job.id);
        write_json_atomic(&path, job)?;
        info!(job_id = %job.id, path = %path.display(), "analysis archived");
        Ok(())
    }

    /// Look up an archived job by id. Returns `None` if never archived.
    pub fn load_analysis(&self, id: &JobId) -> Result<Option<Job>> {
        read_json_opt(&self.analysis_path(id))
    }

    // -----------------------------------------------------------------------
    // Knowledge snapshot
    // -----------------------------------------------------------------------

    fn knowledge_path(&self) -> PathBuf {
        self.root.join(KNOWLEDGE_FILE)
    }

    /// Load the knowledge collection. Returns an empty collection if no
    /// snapshot exists yet.
    pub fn load_knowledge(&self) -> Result<Vec<KnowledgeRecord>> {
        Ok(read_json_opt(&self.knowledge_path())?.unwrap_or_default())
    }

    /// Flush the full knowledge collection as one aggregate snapshot.
    pub fn save_knowledge(&self, records: &[KnowledgeRecord]) -> Result<()> {
        let path = self.knowledge_path();
        write_json_atomic(&path, &records)?;
        debug!(count = records.len(), "knowledge snapshot flushed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON file helpers
// ---------------------------------------------------------------------------

/// Serialize `value` as pretty JSON and write it atomically (temp + rename).
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| LeadLensError::Storage(format!("serialize {}: {e}", path.display())))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LeadLensError::Storage(format!("invalid path: {}", path.display())))?;
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, json).map_err(|e| LeadLensError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| LeadLensError::io(path, e))?;
    Ok(())
}

/// Read and deserialize a JSON file, or `None` if it does not exist.
fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(LeadLensError::io(path, e)),
    };

    let value = serde_json::from_str(&content)
        .map_err(|e| LeadLensError::Storage(format!("invalid JSON at {}: {e}", path.display())))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use leadlens_shared::{DocumentId, DocumentMetadata, JobStatus, Priority};

    fn test_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::open(dir.path().join("data")).expect("open storage");
        (dir, storage)
    }

    fn sample_job() -> Job {
        let now = Utc::now();
        Job {
            id: JobId::new(),
            status: JobStatus::Completed,
            progress: 100,
            stage: "Done".into(),
            started_at: now,
            expires_at: now + chrono::Duration::hours(1),
            result: None,
            error: None,
        }
    }

    fn sample_record(filename: &str) -> KnowledgeRecord {
        KnowledgeRecord {
            id: DocumentId::new(),
            filename: filename.into(),
            content: "Modern service teams want automation.".into(),
            chunks: vec!["Modern service teams want automation.".into()],
            metadata: DocumentMetadata {
                category: "general".into(),
                tags: vec!["itsm".into()],
                priority: Priority::Medium,
                uploaded_at: Utc::now(),
                file_size_bytes: 38,
                file_type: "txt".into(),
                uploaded_by: "anonymous".into(),
            },
        }
    }

    #[test]
    fn analysis_roundtrip() {
        let (_dir, storage) = test_storage();
        let job = sample_job();

        storage.save_analysis(&job).expect("save");
        let loaded = storage
            .load_analysis(&job.id)
            .expect("load")
            .expect("present");
        assert_eq!(loaded.id, job.id);
        assert_eq!(loaded.status, JobStatus::Completed);
        assert_eq!(loaded.progress, 100);
    }

    #[test]
    fn missing_analysis_is_none() {
        let (_dir, storage) = test_storage();
        let missing = storage.load_analysis(&JobId::new()).expect("load");
        assert!(missing.is_none());
    }

    #[test]
    fn knowledge_snapshot_roundtrip() {
        let (_dir, storage) = test_storage();
        assert!(storage.load_knowledge().expect("empty load").is_empty());

        let records = vec![sample_record("a.txt"), sample_record("b.txt")];
        storage.save_knowledge(&records).expect("save");

        let loaded = storage.load_knowledge().expect("load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].filename, "a.txt");
        assert_eq!(loaded[1].filename, "b.txt");
    }

    #[test]
    fn snapshot_overwrites_previous() {
        let (_dir, storage) = test_storage();
        storage
            .save_knowledge(&[sample_record("a.txt")])
            .expect("first save");
        storage.save_knowledge(&[]).expect("second save");
        assert!(storage.load_knowledge().expect("load").is_empty());
    }

    #[test]
    fn atomic_write_leaves_no_temp_files() {
        let (_dir, storage) = test_storage();
        storage.save_analysis(&sample_job()).expect("save");
        storage
            .save_knowledge(&[sample_record("a.txt")])
            .expect("save knowledge");

        let mut stack = vec![storage.root().to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in std::fs::read_dir(&dir).expect("read dir") {
                let entry = entry.expect("entry");
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    assert!(!name.ends_with(".tmp"), "leftover temp file: {name}");
                }
            }
        }
    }

    #[test]
    fn corrupt_snapshot_is_a_storage_error() {
        let (_dir, storage) = test_storage();
        std::fs::write(storage.root().join(KNOWLEDGE_FILE), "not json").expect("write");
        let err = storage.load_knowledge().expect_err("should fail");
        assert_eq!(err.code(), "STORAGE_ERROR");
    }
}
