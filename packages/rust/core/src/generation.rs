//! Content-generation client and prompt assembly.
//!
//! Talks to a chat-completions style API to produce the strategic brief and
//! the per-founder outreach messages. Response parsing is strict: a payload
//! that is not the expected shape surfaces as a `Generation` error, which
//! the pipeline converts into the deterministic fallback set for outreach.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use leadlens_shared::{IntentSignals, LeadLensError, Organization, OutreachMessage, Profile, Result};

/// Founders and their DISC tones; outreach produces one message per entry,
/// in this order.
pub const FOUNDERS: [(&str, &str); 4] = [
    ("Vijay R", "D/I"),
    ("Kiran D", "I/S"),
    ("Lenin G", "S/C"),
    ("Parsu M", "C/D"),
];

/// Subject used when the model response carries none.
const DEFAULT_SUBJECT: &str = "Let's connect";

/// Sampling temperature for the strategic brief.
const SUMMARY_TEMPERATURE: f32 = 0.7;

/// Sampling temperature for outreach messages.
const OUTREACH_TEMPERATURE: f32 = 0.6;

/// Positioning block injected into every prompt.
const POSITIONING: &str = "\
- Agentic service management purpose-built for modern IT teams in the AI era.
- Digital AI (voice, chat, vision), not just chat assistants.
- Self-service-first operations, not ticketing-first.
- Native Microsoft integrations (Azure AD, Intune, Defender).
- Simpler than ServiceNow (complex, legacy); more focused than Jira/Freshworks.";

/// Infer the prospect's DISC tone persona from their summary text.
pub fn infer_persona(profile: &Profile) -> &'static str {
    let summary = profile.summary.to_lowercase();
    if summary.contains("growth") || summary.contains("results") {
        "D/I"
    } else if summary.contains("collaboration") || summary.contains("team") {
        "I/S"
    } else if summary.contains("process") || summary.contains("stability") {
        "S/C"
    } else if summary.contains("systems") || summary.contains("data") {
        "C/D"
    } else {
        "S/C"
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatTurn<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatTurn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the content-generation API.
pub struct GenerateClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GenerateClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("LeadLens/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LeadLensError::Generation(format!("failed to build HTTP client: {e}")))?;

        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// One chat-completion round trip; returns the trimmed message content.
    async fn chat(&self, prompt: &str, temperature: f32) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            temperature,
            messages: vec![ChatTurn {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LeadLensError::Generation(format!("completion request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeadLensError::Generation(format!(
                "completion request: HTTP {status}"
            )));
        }

        let decoded: ChatResponse = response
            .json()
            .await
            .map_err(|e| LeadLensError::Generation(format!("completion payload: {e}")))?;

        let content = decoded
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LeadLensError::Generation("completion payload: no choices".into()))?;

        Ok(content.trim().to_string())
    }

    /// Generate the strategic prep brief.
    #[instrument(skip_all, fields(prospect = %profile.name))]
    pub async fn summarize(
        &self,
        profile: &Profile,
        org: &Organization,
        signals: &IntentSignals,
        context: &[String],
    ) -> Result<String> {
        let prompt = build_summary_prompt(profile, org, signals, context);
        debug!(prompt_len = prompt.len(), "requesting strategic brief");
        self.chat(&prompt, SUMMARY_TEMPERATURE).await
    }

    /// Generate one outreach message per founder, in founder order.
    #[instrument(skip_all, fields(prospect = %profile.name, persona = persona))]
    pub async fn generate_outreach(
        &self,
        profile: &Profile,
        summary: &str,
        org: &Organization,
        signals: &IntentSignals,
        persona: &str,
    ) -> Result<Vec<OutreachMessage>> {
        let mut messages = Vec::with_capacity(FOUNDERS.len());

        for (founder, tone) in FOUNDERS {
            let prompt =
                build_outreach_prompt(founder, tone, profile, summary, org, signals, persona);
            let text = self.chat(&prompt, OUTREACH_TEMPERATURE).await?;
            let (subject, body) = parse_message(&text)?;
            messages.push(OutreachMessage {
                sender: founder.into(),
                subject,
                body,
                focus: tone.into(),
            });
        }

        Ok(messages)
    }
}

// ---------------------------------------------------------------------------
// Prompts & parsing
// ---------------------------------------------------------------------------

fn build_summary_prompt(
    profile: &Profile,
    org: &Organization,
    signals: &IntentSignals,
    context: &[String],
) -> String {
    let experience = profile
        .experience
        .iter()
        .map(|e| format!("{} at {}", e.title, e.company))
        .collect::<Vec<_>>()
        .join(", ");
    let signals_json = serde_json::to_string(signals).unwrap_or_default();
    let knowledge = if context.is_empty() {
        "(none)".to_string()
    } else {
        context.join("\n\n")
    };

    format!(
        "You're an enterprise IT strategist. Based on the prospect profile, company \
         info, and intent signals below, generate a strategic prep brief.\n\n\
         --- Profile ---\n\
         Name: {name}\n\
         Title: {title}\n\
         Company: {company}\n\
         Summary: {summary}\n\
         Location: {location}\n\
         Experience: {experience}\n\n\
         --- Company ---\n\
         Industry: {industry}\n\
         Size: {size}\n\
         Intent Signals: {signals_json}\n\n\
         --- Our Positioning ---\n{POSITIONING}\n\n\
         --- Existing Knowledge ---\n{knowledge}\n\n\
         Create a meeting prep brief including:\n\
         - Connection Angle\n\
         - Common Ground\n\
         - Talking Points\n\
         - Ice Breakers\n\
         - Key Questions\n\
         - ROI Pitch",
        name = profile.name,
        title = profile.title,
        company = org.name,
        summary = profile.summary,
        location = profile.location,
        industry = org.industry,
        size = org.size,
    )
}

#[allow(clippy::too_many_arguments)]
fn build_outreach_prompt(
    founder: &str,
    tone: &str,
    profile: &Profile,
    summary: &str,
    org: &Organization,
    signals: &IntentSignals,
    persona: &str,
) -> String {
    let signals_json = serde_json::to_string(signals).unwrap_or_default();

    format!(
        "You're {founder}, a founder writing in a {tone} DISC tone. Based on this \
         prospect's profile, company, and our mission, write a concise personalized DM.\n\n\
         --- Prospect ---\n\
         Name: {name}\n\
         Title: {title}\n\
         Company: {company}\n\
         Location: {location}\n\
         Summary: {prospect_summary}\n\
         Prospect persona: {persona}\n\
         Company Size: {size}\n\
         Industry: {industry}\n\n\
         --- Signals ---\n\
         Intent Signals: {signals_json}\n\
         Summary Notes: {summary}\n\n\
         --- Our Value ---\n{POSITIONING}\n\n\
         Write a message with:\n\
         Subject: <short>\n\
         Message: <300-500 character DM, crisp, actionable>\n\
         Tone: {tone} founder tone (be specific, bold, or analytical depending on DISC type).",
        name = profile.name,
        title = profile.title,
        company = profile.company,
        location = profile.location,
        prospect_summary = profile.summary,
        size = org.size,
        industry = org.industry,
    )
}

/// Parse `Subject:` / `Message:` lines out of a model response.
///
/// A missing subject falls back to [`DEFAULT_SUBJECT`]; a missing message
/// line means the payload is malformed and the caller should substitute.
fn parse_message(text: &str) -> Result<(String, String)> {
    let subject = text
        .lines()
        .find_map(|l| l.strip_prefix("Subject:"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

    let body = text
        .lines()
        .find_map(|l| l.strip_prefix("Message:"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            LeadLensError::Generation("malformed outreach payload: no Message line".into())
        })?;

    Ok((subject, body))
}

// ---------------------------------------------------------------------------
// Deterministic fallback
// ---------------------------------------------------------------------------

/// Fixed-size deterministic outreach set built from profile/organization
/// fields, substituted when generation yields a malformed payload. Same
/// inputs always produce byte-identical messages.
pub fn fallback_outreach(profile: &Profile, org: &Organization) -> Vec<OutreachMessage> {
    let first_name = profile.name.split_whitespace().next().unwrap_or("there");

    let drafts = [
        (
            format!("Faster IT at {}", org.name),
            format!(
                "Hi {first_name} — teams like yours at {org} are cutting ticket volume \
                 with agentic service management. Worth a 15-minute look at what that \
                 would mean for a {title}?",
                org = org.name,
                title = profile.title,
            ),
        ),
        (
            format!("A note for {first_name}"),
            format!(
                "Hi {first_name}, loved seeing what {company} is doing in {industry}. \
                 We help IT teams deliver self-service-first support without the usual \
                 rollout slog. Open to comparing notes?",
                company = profile.company,
                industry = org.industry,
            ),
        ),
        (
            "One question about your week".to_string(),
            format!(
                "Hi {first_name} — no pitch, just a question: how much of your team's \
                 week goes to repetitive requests? We've helped similar {industry} \
                 organizations hand that work to AI, step by step.",
                industry = org.industry,
            ),
        ),
        (
            format!("Benchmarks for {}-person organizations", org.size),
            format!(
                "Hi {first_name}, for an organization of {size} people the service \
                 metrics usually tell a clear story. Happy to share the benchmarks we \
                 see for teams at {org}'s scale.",
                size = org.size,
                org = org.name,
            ),
        ),
    ];

    FOUNDERS
        .iter()
        .zip(drafts)
        .map(|(&(founder, tone), (subject, body))| OutreachMessage {
            sender: founder.into(),
            subject,
            body,
            focus: tone.into(),
        })
        .collect()
}
