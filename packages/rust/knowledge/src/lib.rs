//! Knowledge Retrieval Engine.
//!
//! Ingests documents of mixed formats into searchable chunked text and
//! serves ranked free-text search over the collection. The collection lives
//! in memory and is flushed to the durable snapshot synchronously after
//! every mutation, so the on-disk copy is never more than one operation
//! stale.

pub mod chunker;
pub mod extract;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use leadlens_shared::{
    DocumentId, DocumentMetadata, KnowledgeRecord, LeadLensError, Priority, Result,
};
use leadlens_storage::Storage;

pub use chunker::DEFAULT_CHUNK_SIZE;

/// Category whose documents get a relevance boost (they exist to be reused
/// in outreach).
const BOOSTED_CATEGORY: &str = "outreach_templates";

/// Multiplier applied to records in [`BOOSTED_CATEGORY`].
const CATEGORY_BOOST: f64 = 1.5;

/// Multiplier applied to high-priority records.
const PRIORITY_BOOST: f64 = 1.3;

/// Term occurrences are normalized per this many characters of record text.
const SCORE_SCALE: f64 = 100.0;

/// Results scoring below this are excluded.
const MIN_SCORE: f64 = 0.01;

/// How many days back an upload counts as "recent" in stats.
const RECENT_WINDOW_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Caller-supplied metadata for an ingestion; absent fields get defaults.
#[derive(Debug, Clone, Default)]
pub struct IngestMetadata {
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub priority: Option<Priority>,
    pub uploaded_by: Option<String>,
}

/// One ranked search result.
#[derive(Debug)]
pub struct SearchHit<'a> {
    pub record: &'a KnowledgeRecord,
    /// Relevance in [0, 1].
    pub score: f64,
}

/// Aggregate statistics over the current collection.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeStats {
    pub total_documents: usize,
    pub total_size_bytes: u64,
    pub categories: BTreeMap<String, usize>,
    /// Uploads within the last 7 days.
    pub recent_uploads: usize,
}

/// Per-file outcome of a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestSuccess {
    pub filename: String,
    pub id: DocumentId,
    pub category: String,
    pub chunks: usize,
}

/// Per-file outcome of a failed ingestion.
#[derive(Debug, Clone)]
pub struct IngestFailure {
    pub filename: String,
    pub error: String,
    pub code: &'static str,
}

/// Batch ingestion report: partial success is always distinguishable from
/// total failure.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub succeeded: Vec<IngestSuccess>,
    pub failed: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Lightweight listing entry (content preview instead of full text).
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub filename: String,
    pub category: String,
    pub priority: Priority,
    pub preview: String,
    pub chunks: usize,
    pub file_size_bytes: u64,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The in-memory knowledge collection plus its durable snapshot handle.
pub struct KnowledgeEngine {
    records: Vec<KnowledgeRecord>,
    storage: Arc<Storage>,
    chunk_size: usize,
}

impl KnowledgeEngine {
    /// Open the engine, loading any existing snapshot from storage.
    pub fn open(storage: Arc<Storage>, chunk_size: usize) -> Result<Self> {
        let records = storage.load_knowledge()?;
        info!(count = records.len(), "knowledge collection loaded");
        Ok(Self {
            records,
            storage,
            chunk_size,
        })
    }

    /// Number of documents in the collection.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // -----------------------------------------------------------------------
    // Ingestion
    // -----------------------------------------------------------------------

    /// Ingest one uploaded file.
    ///
    /// The uploaded artifact is deleted after processing, success or failure,
    /// so failed extractions never leave orphaned files behind.
    #[instrument(skip(self, meta), fields(path = %path.display()))]
    pub fn ingest(&mut self, path: &Path, meta: &IngestMetadata) -> Result<KnowledgeRecord> {
        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let file_type = extract::extension(path);
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let extracted = extract::extract_text(path);
        if let Err(e) = std::fs::remove_file(path) {
            warn!(error = %e, "failed to remove uploaded artifact");
        }
        let content = extracted?;

        let chunks = chunker::chunk_text(&content, self.chunk_size);
        let record = KnowledgeRecord {
            id: DocumentId::new(),
            filename: filename.clone(),
            content,
            chunks,
            metadata: DocumentMetadata {
                category: meta
                    .category
                    .clone()
                    .unwrap_or_else(|| "general".to_string()),
                tags: meta.tags.clone(),
                priority: meta.priority.unwrap_or_default(),
                uploaded_at: Utc::now(),
                file_size_bytes: file_size,
                file_type,
                uploaded_by: meta
                    .uploaded_by
                    .clone()
                    .unwrap_or_else(|| "anonymous".to_string()),
            },
        };

        self.records.push(record.clone());
        self.flush()?;

        info!(
            id = %record.id,
            filename,
            chunks = record.chunks.len(),
            "document ingested"
        );
        Ok(record)
    }

    /// Ingest a batch of files; one file's failure never aborts its siblings.
    pub fn ingest_batch(&mut self, paths: &[PathBuf], meta: &IngestMetadata) -> IngestReport {
        let mut report = IngestReport::default();

        for path in paths {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            match self.ingest(path, meta) {
                Ok(record) => report.succeeded.push(IngestSuccess {
                    filename,
                    id: record.id,
                    category: record.metadata.category,
                    chunks: record.chunks.len(),
                }),
                Err(e) => {
                    warn!(%filename, error = %e, "ingestion failed");
                    report.failed.push(IngestFailure {
                        filename,
                        error: e.to_string(),
                        code: e.code(),
                    });
                }
            }
        }

        info!(
            successful = report.succeeded.len(),
            failed = report.failed.len(),
            "batch ingestion finished"
        );
        report
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Ranked free-text search over the collection.
    ///
    /// Relevance is term-frequency density over the full record text with
    /// fixed category/priority boosts, clamped to [0, 1]. Ties keep
    /// insertion order; results are capped at `limit`.
    #[instrument(skip(self))]
    pub fn search(
        &self,
        query: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SearchHit<'_>>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LeadLensError::validation("search query is required"));
        }

        let tokens: Vec<String> = query.to_lowercase().split_whitespace().map(String::from).collect();

        let mut hits: Vec<SearchHit<'_>> = self
            .records
            .iter()
            .filter(|r| category.is_none_or(|c| r.metadata.category == c))
            .filter_map(|record| {
                let score = relevance(record, &tokens);
                (score >= MIN_SCORE).then_some(SearchHit { record, score })
            })
            .collect();

        // Stable sort keeps insertion order for equal scores.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);

        debug!(query, results = hits.len(), "search complete");
        Ok(hits)
    }

    // -----------------------------------------------------------------------
    // Lookup, listing, stats, deletion
    // -----------------------------------------------------------------------

    /// Full record lookup by id.
    pub fn get(&self, id: &DocumentId) -> Option<&KnowledgeRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Listing summaries in insertion order.
    pub fn list(&self) -> Vec<DocumentSummary> {
        self.records
            .iter()
            .map(|r| DocumentSummary {
                id: r.id.clone(),
                filename: r.filename.clone(),
                category: r.metadata.category.clone(),
                priority: r.metadata.priority,
                preview: preview(&r.content, 300),
                chunks: r.chunks.len(),
                file_size_bytes: r.metadata.file_size_bytes,
            })
            .collect()
    }

    /// Aggregate statistics, computed on demand.
    pub fn stats(&self) -> KnowledgeStats {
        let cutoff = Utc::now() - chrono::Duration::days(RECENT_WINDOW_DAYS);
        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        for record in &self.records {
            *categories
                .entry(record.metadata.category.clone())
                .or_default() += 1;
        }

        KnowledgeStats {
            total_documents: self.records.len(),
            total_size_bytes: self
                .records
                .iter()
                .map(|r| r.metadata.file_size_bytes)
                .sum(),
            categories,
            recent_uploads: self
                .records
                .iter()
                .filter(|r| r.metadata.uploaded_at > cutoff)
                .count(),
        }
    }

    /// Delete a record by id. Returns whether a record existed.
    pub fn delete(&mut self, id: &DocumentId) -> Result<bool> {
        let before = self.records.len();
        self.records.retain(|r| &r.id != id);
        if self.records.len() == before {
            return Ok(false);
        }
        self.flush()?;
        info!(%id, "document deleted");
        Ok(true)
    }

    /// Flush the full collection to the durable snapshot.
    fn flush(&self) -> Result<()> {
        self.storage.save_knowledge(&self.records)
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Term-frequency density relevance for one record.
fn relevance(record: &KnowledgeRecord, tokens: &[String]) -> f64 {
    let text = record.content.to_lowercase();
    if text.is_empty() {
        return 0.0;
    }

    let len = text.len() as f64;
    let mut score: f64 = tokens
        .iter()
        .map(|token| count_occurrences(&text, token) as f64 / len * SCORE_SCALE)
        .sum();

    if record.metadata.category == BOOSTED_CATEGORY {
        score *= CATEGORY_BOOST;
    }
    if record.metadata.priority == Priority::High {
        score *= PRIORITY_BOOST;
    }

    score.clamp(0.0, 1.0)
}

/// Non-overlapping occurrence count of `needle` in `haystack`.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

/// First `max_chars` characters of `text` (at a char boundary), with an
/// ellipsis when truncated.
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}
