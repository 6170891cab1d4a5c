//! Core domain types for LeadLens analyses and the knowledge base.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for analysis job identifiers (time-sortable).
///
/// The v7 layout combines a monotonic timestamp with a random suffix, so ids
/// are unique within a process lifetime without any coordination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Generate a new time-sortable job identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A UUID v7 wrapper for knowledge document identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    /// Generate a new time-sortable document identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// Lifecycle state of an analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Started,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    /// Terminal states are absorbing: no further mutation is accepted.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Error details captured on a failed job, retrievable via status lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    pub message: String,
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

/// One tracked analysis request and its evolving status/result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier, immutable after creation.
    pub id: JobId,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// 0–100, monotonically non-decreasing until a terminal state.
    pub progress: u8,
    /// Human-readable label of the current stage.
    pub stage: String,
    /// When the job was submitted.
    pub started_at: DateTime<Utc>,
    /// When the in-memory record becomes eligible for eviction.
    pub expires_at: DateTime<Utc>,
    /// Present only when `status == Completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    /// Present only when `status == Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
}

impl Job {
    /// Whether the retention window has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// The assembled output of a completed analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub profile: Profile,
    pub organization: Organization,
    pub signals: IntentSignals,
    /// Strategic prep brief text.
    pub summary: String,
    pub outreach_messages: Vec<OutreachMessage>,
    pub metrics: Metrics,
    pub metadata: AnalysisMetadata,
}

/// Provenance metadata attached to every completed analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub job_id: JobId,
    pub analyzed_url: String,
    pub analyzed_at: DateTime<Utc>,
    pub processing_ms: u64,
}

// ---------------------------------------------------------------------------
// Profile & organization
// ---------------------------------------------------------------------------

/// A fully-typed professional profile, decoded from the raw enrichment
/// payload with defined defaults per field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub summary: String,
    /// Top skills (at most 8).
    #[serde(default)]
    pub expertise: Vec<String>,
    /// Certifications (at most 6).
    #[serde(default)]
    pub certifications: Vec<String>,
    /// Most recent positions (at most 5).
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    /// Most recent schools (at most 3).
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub connections: u32,
    #[serde(default)]
    pub follower_count: u32,
}

/// One position in a profile's work history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub description: String,
    pub location: String,
}

/// One entry in a profile's education history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationEntry {
    pub school: String,
    pub degree: String,
    pub field: String,
    pub duration: String,
}

/// The organization associated with a profile's current position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    /// Headcount; 0 when unknown.
    pub size: u32,
    pub industry: String,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Intent signals
// ---------------------------------------------------------------------------

/// Heuristic buying-intent signals derived from a role title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSignals {
    pub job_title: String,
    /// Signal strength; 0 means no signals detected.
    pub count: u32,
    pub pain_points: Vec<String>,
    pub keywords: Vec<String>,
    pub sentiment: String,
    pub urgency: String,
    pub discussions: Vec<Discussion>,
}

/// A representative community discussion backing a signal tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub forum: String,
    pub title: String,
    pub score: u32,
    pub engagement: String,
}

// ---------------------------------------------------------------------------
// Outreach & metrics
// ---------------------------------------------------------------------------

/// One personalized outreach message, tagged with its sender persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutreachMessage {
    pub sender: String,
    pub subject: String,
    pub body: String,
    /// DISC tone of the sending founder.
    pub focus: String,
}

/// Prospect scoring metrics; each sub-score is in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub decision_authority: u8,
    pub budget_influence: u8,
    pub buying_intent: u8,
    pub engagement_score: u8,
    /// Arithmetic mean of the four sub-scores, rounded half-up.
    pub overall_score: u8,
}

// ---------------------------------------------------------------------------
// Knowledge base
// ---------------------------------------------------------------------------

/// Relative importance of a knowledge document, used as a search boost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{s}")
    }
}

/// Descriptive metadata attached to an ingested document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    pub uploaded_at: DateTime<Utc>,
    pub file_size_bytes: u64,
    pub file_type: String,
    pub uploaded_by: String,
}

/// One ingested document: full extracted text plus its retrieval chunks.
///
/// Invariant: concatenating `chunks` reproduces `content` up to whitespace
/// normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub id: DocumentId,
    pub filename: String,
    pub content: String,
    pub chunks: Vec<String>,
    pub metadata: DocumentMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_roundtrip() {
        let id = JobId::new();
        let s = id.to_string();
        let parsed: JobId = s.parse().expect("parse JobId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn job_ids_are_unique_and_sortable() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b);
        // v7 ids embed a timestamp, so later ids compare greater or equal.
        assert!(b.0 >= a.0);
    }

    #[test]
    fn job_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Completed).unwrap(),
            r#""completed""#
        );
        assert_eq!(
            serde_json::from_str::<JobStatus>(r#""error""#).unwrap(),
            JobStatus::Error
        );
    }

    #[test]
    fn terminal_states() {
        assert!(!JobStatus::Started.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Error.is_terminal());
    }

    #[test]
    fn job_serialization_skips_absent_fields() {
        let now = Utc::now();
        let job = Job {
            id: JobId::new(),
            status: JobStatus::Started,
            progress: 0,
            stage: "Initializing".into(),
            started_at: now,
            expires_at: now + chrono::Duration::hours(1),
            result: None,
            error: None,
        };

        let json = serde_json::to_string(&job).expect("serialize");
        assert!(!json.contains("result"));
        assert!(!json.contains("error"));

        let parsed: Job = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.status, JobStatus::Started);
        assert!(parsed.result.is_none());
    }

    #[test]
    fn job_expiry_check() {
        let now = Utc::now();
        let job = Job {
            id: JobId::new(),
            status: JobStatus::Processing,
            progress: 40,
            stage: "Deriving intent signals".into(),
            started_at: now - chrono::Duration::hours(2),
            expires_at: now - chrono::Duration::hours(1),
            result: None,
            error: None,
        };
        assert!(job.is_expired(now));
        assert!(!job.is_expired(now - chrono::Duration::hours(2)));
    }

    #[test]
    fn priority_defaults_to_medium() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(default)]
            priority: Priority,
        }
        let w: Wrapper = serde_json::from_str("{}").unwrap();
        assert_eq!(w.priority, Priority::Medium);
        assert_eq!(
            serde_json::from_str::<Priority>(r#""high""#).unwrap(),
            Priority::High
        );
        assert_eq!(Priority::High.to_string(), "high");
    }
}
