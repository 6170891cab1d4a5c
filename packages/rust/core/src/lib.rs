//! Core orchestration: job store, analysis pipeline, content generation,
//! and prospect scoring.

pub mod generation;
pub mod jobs;
pub mod pipeline;
pub mod scoring;

pub use generation::GenerateClient;
pub use jobs::JobStore;
pub use pipeline::{Analyzer, ContentGenerator, ProfileEnricher};
