//! The asynchronous analysis pipeline.
//!
//! [`Analyzer::submit`] validates the profile URL, creates the job record,
//! and returns its id immediately; the stage sequence runs as a spawned
//! continuation that updates the shared [`JobStore`] after each stage.
//! Stages are strictly sequential per job; jobs are isolated under their own
//! ids, so concurrent jobs never contend beyond the map lock.
//!
//! Recovery is limited to two substitutions: a failed organization fetch
//! yields the deterministic placeholder, and a malformed outreach payload
//! yields the deterministic fallback set. Any other stage failure marks the
//! job errored and skips the durable write.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use leadlens_enrich::{EnrichClient, RawProfile};
use leadlens_knowledge::KnowledgeEngine;
use leadlens_shared::{
    AnalysisMetadata, AnalysisResult, IntentSignals, Job, JobId, LeadLensError, Organization,
    OutreachMessage, Profile, Result,
};
use leadlens_storage::Storage;

use crate::generation::{self, GenerateClient};
use crate::jobs::JobStore;
use crate::scoring;

/// How many knowledge snippets feed the strategic brief.
const CONTEXT_SNIPPETS: usize = 3;

/// Maximum characters per knowledge snippet.
const SNIPPET_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

/// Enrichment collaborator: profile and organization fetch.
#[async_trait]
pub trait ProfileEnricher: Send + Sync {
    async fn fetch_profile(&self, profile_url: &str) -> Result<RawProfile>;
    async fn fetch_organization(&self, company_url: &str) -> Result<Organization>;
}

#[async_trait]
impl ProfileEnricher for EnrichClient {
    async fn fetch_profile(&self, profile_url: &str) -> Result<RawProfile> {
        EnrichClient::fetch_profile(self, profile_url).await
    }

    async fn fetch_organization(&self, company_url: &str) -> Result<Organization> {
        EnrichClient::fetch_organization(self, company_url).await
    }
}

/// Content-generation collaborator: brief and outreach.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn summarize(
        &self,
        profile: &Profile,
        org: &Organization,
        signals: &IntentSignals,
        context: &[String],
    ) -> Result<String>;

    async fn generate_outreach(
        &self,
        profile: &Profile,
        summary: &str,
        org: &Organization,
        signals: &IntentSignals,
        persona: &str,
    ) -> Result<Vec<OutreachMessage>>;
}

#[async_trait]
impl ContentGenerator for GenerateClient {
    async fn summarize(
        &self,
        profile: &Profile,
        org: &Organization,
        signals: &IntentSignals,
        context: &[String],
    ) -> Result<String> {
        GenerateClient::summarize(self, profile, org, signals, context).await
    }

    async fn generate_outreach(
        &self,
        profile: &Profile,
        summary: &str,
        org: &Organization,
        signals: &IntentSignals,
        persona: &str,
    ) -> Result<Vec<OutreachMessage>> {
        GenerateClient::generate_outreach(self, profile, summary, org, signals, persona).await
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Drives jobs from submission to terminal state and serves status lookups.
#[derive(Clone)]
pub struct Analyzer {
    jobs: JobStore,
    storage: Arc<Storage>,
    enricher: Arc<dyn ProfileEnricher>,
    generator: Arc<dyn ContentGenerator>,
    knowledge: Option<Arc<RwLock<KnowledgeEngine>>>,
}

impl Analyzer {
    pub fn new(
        jobs: JobStore,
        storage: Arc<Storage>,
        enricher: Arc<dyn ProfileEnricher>,
        generator: Arc<dyn ContentGenerator>,
        knowledge: Option<Arc<RwLock<KnowledgeEngine>>>,
    ) -> Self {
        Self {
            jobs,
            storage,
            enricher,
            generator,
            knowledge,
        }
    }

    /// The underlying job store (shared with the submission path).
    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    /// Submit a profile URL for analysis.
    ///
    /// Returns the job id as soon as the record exists; stage work proceeds
    /// as a non-blocking background continuation. A failed continuation is
    /// recorded on the job, never surfaced here.
    #[instrument(skip(self))]
    pub async fn submit(&self, profile_url: &str) -> Result<JobId> {
        leadlens_enrich::validate_profile_url(profile_url)?;

        let job = self.jobs.create().await;
        let id = job.id.clone();
        info!(job_id = %id, url = profile_url, "analysis submitted");

        let analyzer = self.clone();
        let url = profile_url.to_string();
        let job_id = id.clone();
        tokio::spawn(async move {
            if let Err(e) = analyzer.run(&job_id, &url).await {
                error!(job_id = %job_id, error = %e, code = e.code(), "analysis failed");
                analyzer.jobs.fail(&job_id, &e).await;
            }
        });

        Ok(id)
    }

    /// Current job projection: in-memory first, then the durable archive.
    pub async fn status(&self, id: &JobId) -> Result<Job> {
        if let Some(job) = self.jobs.get(id).await {
            return Ok(job);
        }
        if let Some(job) = self.storage.load_analysis(id)? {
            return Ok(job);
        }
        Err(LeadLensError::not_found(format!(
            "analysis {id} not found or expired"
        )))
    }

    /// Spawn the periodic retention sweeper.
    pub fn spawn_sweeper(&self, interval_secs: u64) -> tokio::task::JoinHandle<()> {
        let jobs = self.jobs.clone();
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
            loop {
                ticker.tick().await;
                jobs.sweep_expired().await;
            }
        })
    }

    /// The stage sequence for one job, strictly in order.
    async fn run(&self, id: &JobId, url: &str) -> Result<()> {
        let started = Instant::now();

        // Stage 1: fetch and decode the profile.
        self.jobs
            .set_progress(id, 10, "Extracting professional profile")
            .await;
        let raw = self.enricher.fetch_profile(url).await?;
        let profile = leadlens_enrich::normalize_profile(&raw);

        // Stage 2: resolve the organization. Substitution never fails.
        self.jobs
            .set_progress(id, 25, "Enriching company context")
            .await;
        let organization = match raw.company_url() {
            Some(company_url) => match self.enricher.fetch_organization(company_url).await {
                Ok(org) => org,
                Err(e) => {
                    warn!(job_id = %id, error = %e, "organization fetch failed, using placeholder");
                    leadlens_enrich::placeholder_organization()
                }
            },
            None => leadlens_enrich::placeholder_organization(),
        };

        // Stage 3: derive intent signals (pure).
        self.jobs
            .set_progress(id, 40, "Deriving intent signals")
            .await;
        let signals = leadlens_signals::derive_signals(&profile.title);

        // Stage 4: strategic brief, with optional knowledge context.
        self.jobs
            .set_progress(id, 60, "Creating strategic summary")
            .await;
        let context = self.knowledge_context(&profile, &organization).await;
        let summary = self
            .generator
            .summarize(&profile, &organization, &signals, &context)
            .await?;

        // Stage 5: outreach. Substitution never fails.
        self.jobs
            .set_progress(id, 80, "Generating personalized outreach")
            .await;
        let persona = generation::infer_persona(&profile);
        let outreach_messages = match self
            .generator
            .generate_outreach(&profile, &summary, &organization, &signals, persona)
            .await
        {
            Ok(messages) if !messages.is_empty() => messages,
            Ok(_) => {
                warn!(job_id = %id, "generator returned no messages, using fallback set");
                generation::fallback_outreach(&profile, &organization)
            }
            Err(e) => {
                warn!(job_id = %id, error = %e, "outreach generation failed, using fallback set");
                generation::fallback_outreach(&profile, &organization)
            }
        };

        // Stage 6: metrics, final assembly, durable write-through.
        self.jobs.set_progress(id, 95, "Finalizing and saving").await;
        let metrics = scoring::compute_metrics(&profile, &organization, &signals);
        let result = AnalysisResult {
            profile,
            organization,
            signals,
            summary,
            outreach_messages,
            metrics,
            metadata: AnalysisMetadata {
                job_id: id.clone(),
                analyzed_url: url.to_string(),
                analyzed_at: chrono::Utc::now(),
                processing_ms: started.elapsed().as_millis() as u64,
            },
        };

        match self.jobs.complete(id, result).await {
            Some(job) => self.storage.save_analysis(&job)?,
            None => {
                // Retention elapsed mid-flight; nothing left to archive.
                warn!(job_id = %id, "job evicted before completion, skipping archive");
            }
        }

        info!(
            job_id = %id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );
        Ok(())
    }

    /// Top-ranked knowledge snippets for the brief. Best effort: an empty or
    /// unsearchable collection contributes nothing.
    async fn knowledge_context(&self, profile: &Profile, org: &Organization) -> Vec<String> {
        let Some(engine) = &self.knowledge else {
            return Vec::new();
        };

        let query = format!("{} {}", profile.title, org.industry);
        let engine = engine.read().await;
        match engine.search(&query, None, CONTEXT_SNIPPETS) {
            Ok(hits) => hits
                .iter()
                .map(|hit| {
                    let text = hit
                        .record
                        .chunks
                        .first()
                        .map(String::as_str)
                        .unwrap_or(&hit.record.content);
                    let snippet: String = text.chars().take(SNIPPET_CHARS).collect();
                    format!("{}\n{}", hit.record.filename, snippet)
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "knowledge context lookup failed");
                Vec::new()
            }
        }
    }
}
