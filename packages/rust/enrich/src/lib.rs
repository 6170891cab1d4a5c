//! Profile and organization enrichment client.
//!
//! Fetches a professional profile (and its associated organization record)
//! from the enrichment API given a public profile URL. Raw payloads are
//! duck-typed upstream, so everything decodes through [`RawProfile`] with
//! per-field defaults before any business logic runs.
//!
//! Without an API key the client serves a deterministic sample profile and
//! organization, keeping the pipeline drivable offline.

mod decode;

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use leadlens_shared::{LeadLensError, Organization, Result};

pub use decode::{
    RawDate, RawEducation, RawExperience, RawNamed, RawOrganization, RawProfile,
    normalize_organization, normalize_profile, placeholder_organization, sample_profile,
};

/// User-Agent string for enrichment requests.
const USER_AGENT: &str = concat!("LeadLens/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Accepted shape of a public profile URL.
static PROFILE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(www\.)?linkedin\.com/in/[A-Za-z0-9-]+/?$").expect("valid regex")
});

/// Validate a profile URL against the required format.
pub fn validate_profile_url(url: &str) -> Result<()> {
    if PROFILE_URL_RE.is_match(url) {
        Ok(())
    } else {
        Err(LeadLensError::validation(format!(
            "invalid or missing profile URL: {url:?}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the enrichment API.
pub struct EnrichClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl EnrichClient {
    /// Build a client. `api_key == None` enables the offline sample mode.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
        if api_key.is_none() {
            warn!("no enrichment API key configured, serving sample data");
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LeadLensError::Upstream(format!("failed to build HTTP client: {e}")))?;

        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Fetch the raw profile record for a profile URL.
    #[instrument(skip(self))]
    pub async fn fetch_profile(&self, profile_url: &str) -> Result<RawProfile> {
        let Some(key) = &self.api_key else {
            debug!("keyless mode, returning sample profile");
            return Ok(sample_profile());
        };

        let endpoint = format!("{}/v2/linkedin", self.base_url);
        let response = self
            .http
            .get(&endpoint)
            .query(&[("url", profile_url)])
            .bearer_auth(key)
            .send()
            .await
            .map_err(|e| LeadLensError::Upstream(format!("profile fetch: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeadLensError::Upstream(format!(
                "profile fetch: HTTP {status}"
            )));
        }

        let raw: RawProfile = response
            .json()
            .await
            .map_err(|e| LeadLensError::Upstream(format!("profile payload: {e}")))?;

        info!(name = raw.full_name.as_deref().unwrap_or("unknown"), "profile fetched");
        Ok(raw)
    }

    /// Fetch and normalize the organization record for a company URL.
    #[instrument(skip(self))]
    pub async fn fetch_organization(&self, company_url: &str) -> Result<Organization> {
        let Some(key) = &self.api_key else {
            debug!("keyless mode, returning placeholder organization");
            return Ok(placeholder_organization());
        };

        let endpoint = format!("{}/linkedin/company", self.base_url);
        let response = self
            .http
            .get(&endpoint)
            .query(&[("url", company_url)])
            .bearer_auth(key)
            .send()
            .await
            .map_err(|e| LeadLensError::Upstream(format!("organization fetch: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeadLensError::Upstream(format!(
                "organization fetch: HTTP {status}"
            )));
        }

        let raw: RawOrganization = response
            .json()
            .await
            .map_err(|e| LeadLensError::Upstream(format!("organization payload: {e}")))?;

        let org = normalize_organization(&raw);
        info!(name = %org.name, "organization fetched");
        Ok(org)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn accepts_well_formed_profile_urls() {
        assert!(validate_profile_url("https://linkedin.com/in/sarah-chen").is_ok());
        assert!(validate_profile_url("https://www.linkedin.com/in/sarah-chen/").is_ok());
        assert!(validate_profile_url("https://www.linkedin.com/in/jdoe42").is_ok());
    }

    #[test]
    fn rejects_malformed_profile_urls() {
        for url in [
            "",
            "not a url",
            "http://linkedin.com/in/sarah-chen",
            "https://linkedin.com/company/acme",
            "https://example.com/in/sarah-chen",
            "https://www.linkedin.com/in/",
            "https://www.linkedin.com/in/sarah chen",
        ] {
            let err = validate_profile_url(url).unwrap_err();
            assert_eq!(err.code(), "VALIDATION_ERROR", "should reject {url:?}");
        }
    }

    #[tokio::test]
    async fn keyless_client_serves_sample_data() {
        let client = EnrichClient::new("https://unused.invalid", None, 5).unwrap();

        let raw = client
            .fetch_profile("https://www.linkedin.com/in/sarah-chen")
            .await
            .unwrap();
        assert_eq!(raw.full_name.as_deref(), Some("Sarah Chen"));

        let org = client
            .fetch_organization("https://www.linkedin.com/company/techcorp")
            .await
            .unwrap();
        assert_eq!(org, placeholder_organization());
    }

    #[tokio::test]
    async fn fetch_profile_decodes_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/linkedin"))
            .and(query_param("url", "https://www.linkedin.com/in/jdoe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "full_name": "Jane Doe",
                "occupation": "Director of IT",
                "connections": 640,
                "experiences": [
                    {
                        "title": "Director of IT",
                        "company": "Acme",
                        "company_linkedin_profile_url": "https://www.linkedin.com/company/acme",
                        "starts_at": {"year": 2020}
                    }
                ],
                "skills": [{"name": "ITSM"}, "Automation"]
            })))
            .mount(&server)
            .await;

        let client = EnrichClient::new(server.uri(), Some("test-key".into()), 5).unwrap();
        let raw = client
            .fetch_profile("https://www.linkedin.com/in/jdoe")
            .await
            .unwrap();

        assert_eq!(raw.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(raw.connections, Some(640));
        assert_eq!(
            raw.company_url(),
            Some("https://www.linkedin.com/company/acme")
        );
    }

    #[tokio::test]
    async fn upstream_failure_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/linkedin"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = EnrichClient::new(server.uri(), Some("test-key".into()), 5).unwrap();
        let err = client
            .fetch_profile("https://www.linkedin.com/in/jdoe")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UPSTREAM_ERROR");
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn organization_fetch_normalizes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/linkedin/company"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Acme Corp",
                "company_size": 1200,
                "industry": "Software"
            })))
            .mount(&server)
            .await;

        let client = EnrichClient::new(server.uri(), Some("test-key".into()), 5).unwrap();
        let org = client
            .fetch_organization("https://www.linkedin.com/company/acme")
            .await
            .unwrap();

        assert_eq!(org.name, "Acme Corp");
        assert_eq!(org.size, 1200);
        assert_eq!(org.industry, "Software");
        assert_eq!(org.description, "");
    }
}
