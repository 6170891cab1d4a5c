//! Shared types, error model, and configuration for LeadLens.
//!
//! This crate is the foundation depended on by all other LeadLens crates.
//! It provides:
//! - [`LeadLensError`] — the unified error type with stable machine codes
//! - Domain types ([`Job`], [`Profile`], [`IntentSignals`], [`KnowledgeRecord`], …)
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, EnrichmentApiConfig, GenerationApiConfig, api_key_from_env,
    config_dir, config_file_path, data_dir, init_config, load_config, load_config_from,
    require_generation_key,
};
pub use error::{LeadLensError, Result};
pub use types::{
    AnalysisMetadata, AnalysisResult, Discussion, DocumentId, DocumentMetadata, EducationEntry,
    ExperienceEntry, IntentSignals, Job, JobError, JobId, JobStatus, KnowledgeRecord, Metrics,
    Organization, OutreachMessage, Priority, Profile,
};
