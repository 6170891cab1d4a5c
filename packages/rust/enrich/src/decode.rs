//! Raw payload decoding and normalization.
//!
//! The upstream API returns loosely-shaped JSON: fields come and go, skills
//! are sometimes bare strings and sometimes `{name}` objects. Everything
//! here decodes with explicit per-field defaults so the rest of the system
//! only sees fully-typed records.

use serde::Deserialize;

use leadlens_shared::{EducationEntry, ExperienceEntry, Organization, Profile};

/// Caps applied during normalization, mirroring what the outreach prompts
/// can actually use.
const MAX_SKILLS: usize = 8;
const MAX_CERTIFICATIONS: usize = 6;
const MAX_EXPERIENCE: usize = 5;
const MAX_EDUCATION: usize = 3;

// ---------------------------------------------------------------------------
// Raw payload shapes
// ---------------------------------------------------------------------------

/// A partial date as sent upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDate {
    #[serde(default)]
    pub year: Option<i32>,
}

/// A value that is either a bare string or an object carrying a name/title.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNamed {
    Named {
        name: String,
    },
    Titled {
        title: String,
    },
    Plain(String),
}

impl RawNamed {
    /// The display string, whichever shape it arrived in.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Named { name } => name,
            Self::Titled { title } => title,
            Self::Plain(s) => s,
        }
    }
}

/// One raw work-history entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExperience {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub company_linkedin_profile_url: Option<String>,
    #[serde(default)]
    pub starts_at: Option<RawDate>,
    #[serde(default)]
    pub ends_at: Option<RawDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// One raw education entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEducation {
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub degree_name: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub starts_at: Option<RawDate>,
    #[serde(default)]
    pub ends_at: Option<RawDate>,
}

/// The raw profile payload as returned by the enrichment API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProfile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub connections: Option<u32>,
    #[serde(default)]
    pub follower_count: Option<u32>,
    #[serde(default)]
    pub experiences: Vec<RawExperience>,
    #[serde(default)]
    pub education: Vec<RawEducation>,
    #[serde(default)]
    pub skills: Vec<RawNamed>,
    #[serde(default)]
    pub certifications: Vec<RawNamed>,
}

impl RawProfile {
    /// The organization reference carried by the most recent position.
    pub fn company_url(&self) -> Option<&str> {
        self.experiences
            .first()
            .and_then(|e| e.company_linkedin_profile_url.as_deref())
            .filter(|u| !u.is_empty())
    }
}

/// The raw organization payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrganization {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company_size: Option<u32>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Decode a raw profile into a fully-typed [`Profile`] with defined defaults.
pub fn normalize_profile(raw: &RawProfile) -> Profile {
    Profile {
        name: raw.full_name.clone().unwrap_or_else(|| "Unknown".into()),
        title: raw
            .occupation
            .clone()
            .or_else(|| raw.headline.clone())
            .unwrap_or_else(|| "Unknown Title".into()),
        company: raw
            .experiences
            .first()
            .and_then(|e| e.company.clone())
            .unwrap_or_else(|| "Unknown Company".into()),
        location: format_location(raw.city.as_deref(), raw.country.as_deref()),
        summary: raw.summary.clone().unwrap_or_default(),
        expertise: raw
            .skills
            .iter()
            .take(MAX_SKILLS)
            .map(|s| s.as_str().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        certifications: raw
            .certifications
            .iter()
            .take(MAX_CERTIFICATIONS)
            .map(|c| c.as_str().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        experience: raw
            .experiences
            .iter()
            .take(MAX_EXPERIENCE)
            .map(normalize_experience)
            .collect(),
        education: raw
            .education
            .iter()
            .take(MAX_EDUCATION)
            .map(normalize_education)
            .collect(),
        connections: raw.connections.unwrap_or(0),
        follower_count: raw.follower_count.unwrap_or(0),
    }
}

fn normalize_experience(raw: &RawExperience) -> ExperienceEntry {
    let title = raw.title.clone().unwrap_or_else(|| "Unknown Title".into());
    let company = raw
        .company
        .clone()
        .unwrap_or_else(|| "Unknown Company".into());
    ExperienceEntry {
        description: raw
            .description
            .clone()
            .unwrap_or_else(|| format!("{title} at {company}")),
        duration: format_duration(raw.starts_at.as_ref(), raw.ends_at.as_ref()),
        location: raw.location.clone().unwrap_or_default(),
        title,
        company,
    }
}

fn normalize_education(raw: &RawEducation) -> EducationEntry {
    EducationEntry {
        school: raw.school.clone().unwrap_or_else(|| "Unknown School".into()),
        degree: raw
            .degree_name
            .clone()
            .unwrap_or_else(|| "Unknown Degree".into()),
        field: raw.field_of_study.clone().unwrap_or_default(),
        duration: format_duration(raw.starts_at.as_ref(), raw.ends_at.as_ref()),
    }
}

/// Decode a raw organization into a typed [`Organization`].
pub fn normalize_organization(raw: &RawOrganization) -> Organization {
    Organization {
        name: raw.name.clone().unwrap_or_else(|| "Unknown Company".into()),
        size: raw.company_size.unwrap_or(0),
        industry: raw.industry.clone().unwrap_or_else(|| "Unknown".into()),
        description: raw.description.clone().unwrap_or_default(),
    }
}

fn format_location(city: Option<&str>, country: Option<&str>) -> String {
    let parts: Vec<&str> = [city, country]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        "Unknown Location".into()
    } else {
        parts.join(", ")
    }
}

fn format_duration(start: Option<&RawDate>, end: Option<&RawDate>) -> String {
    match start.and_then(|d| d.year) {
        Some(start_year) => {
            let end_year = end
                .and_then(|d| d.year)
                .map(|y| y.to_string())
                .unwrap_or_else(|| "Present".into());
            format!("{start_year} - {end_year}")
        }
        None => "Unknown Duration".into(),
    }
}

// ---------------------------------------------------------------------------
// Deterministic offline records
// ---------------------------------------------------------------------------

/// The deterministic placeholder organization, substituted whenever the
/// organization cannot be resolved. This substitution never fails.
pub fn placeholder_organization() -> Organization {
    Organization {
        name: "TechCorp Solutions".into(),
        size: 5000,
        industry: "Information Technology and Services".into(),
        description: "Leading enterprise technology solutions provider".into(),
    }
}

/// The deterministic sample profile served in keyless mode.
pub fn sample_profile() -> RawProfile {
    RawProfile {
        full_name: Some("Sarah Chen".into()),
        headline: Some("VP of IT Operations at TechCorp Solutions".into()),
        occupation: Some("VP of IT Operations".into()),
        summary: Some(
            "Technology leader with 12+ years driving digital transformation \
             initiatives across enterprise environments."
                .into(),
        ),
        city: Some("San Francisco".into()),
        country: Some("United States".into()),
        connections: Some(850),
        follower_count: Some(1200),
        experiences: vec![RawExperience {
            title: Some("VP of IT Operations".into()),
            company: Some("TechCorp Solutions".into()),
            starts_at: Some(RawDate { year: Some(2021) }),
            description: Some("Leading IT operations for 5,000+ employee organization".into()),
            ..Default::default()
        }],
        education: vec![],
        skills: vec![
            RawNamed::Named {
                name: "Digital Transformation".into(),
            },
            RawNamed::Named {
                name: "Cloud Migration".into(),
            },
            RawNamed::Named {
                name: "ITSM".into(),
            },
            RawNamed::Named {
                name: "Team Leadership".into(),
            },
        ],
        certifications: vec![
            RawNamed::Named {
                name: "AWS Solutions Architect".into(),
            },
            RawNamed::Named {
                name: "ITIL v4".into(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_fills_every_default() {
        let profile = normalize_profile(&RawProfile::default());

        assert_eq!(profile.name, "Unknown");
        assert_eq!(profile.title, "Unknown Title");
        assert_eq!(profile.company, "Unknown Company");
        assert_eq!(profile.location, "Unknown Location");
        assert_eq!(profile.summary, "");
        assert!(profile.expertise.is_empty());
        assert!(profile.certifications.is_empty());
        assert!(profile.experience.is_empty());
        assert!(profile.education.is_empty());
        assert_eq!(profile.connections, 0);
        assert_eq!(profile.follower_count, 0);
    }

    #[test]
    fn occupation_wins_over_headline() {
        let raw = RawProfile {
            headline: Some("Builder of things".into()),
            occupation: Some("CTO".into()),
            ..Default::default()
        };
        assert_eq!(normalize_profile(&raw).title, "CTO");

        let raw = RawProfile {
            headline: Some("Builder of things".into()),
            ..Default::default()
        };
        assert_eq!(normalize_profile(&raw).title, "Builder of things");
    }

    #[test]
    fn mixed_shape_skills_decode() {
        let raw: RawProfile = serde_json::from_str(
            r#"{"skills": [{"name": "ITSM"}, "Automation", {"title": "Cloud"}]}"#,
        )
        .unwrap();
        let profile = normalize_profile(&raw);
        assert_eq!(profile.expertise, vec!["ITSM", "Automation", "Cloud"]);
    }

    #[test]
    fn list_fields_are_capped() {
        let raw = RawProfile {
            skills: (0..20)
                .map(|i| RawNamed::Plain(format!("skill-{i}")))
                .collect(),
            experiences: (0..10).map(|_| RawExperience::default()).collect(),
            ..Default::default()
        };
        let profile = normalize_profile(&raw);
        assert_eq!(profile.expertise.len(), 8);
        assert_eq!(profile.experience.len(), 5);
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(
            format_duration(Some(&RawDate { year: Some(2021) }), None),
            "2021 - Present"
        );
        assert_eq!(
            format_duration(
                Some(&RawDate { year: Some(2018) }),
                Some(&RawDate { year: Some(2021) })
            ),
            "2018 - 2021"
        );
        assert_eq!(format_duration(None, None), "Unknown Duration");
    }

    #[test]
    fn location_formatting() {
        assert_eq!(
            format_location(Some("Austin"), Some("United States")),
            "Austin, United States"
        );
        assert_eq!(format_location(Some("Austin"), None), "Austin");
        assert_eq!(format_location(None, None), "Unknown Location");
    }

    #[test]
    fn missing_experience_description_is_synthesized() {
        let raw = RawExperience {
            title: Some("CTO".into()),
            company: Some("Acme".into()),
            ..Default::default()
        };
        assert_eq!(normalize_experience(&raw).description, "CTO at Acme");
    }

    #[test]
    fn company_url_requires_non_empty_value() {
        let mut raw = RawProfile::default();
        assert!(raw.company_url().is_none());

        raw.experiences.push(RawExperience {
            company_linkedin_profile_url: Some("".into()),
            ..Default::default()
        });
        assert!(raw.company_url().is_none());

        raw.experiences[0].company_linkedin_profile_url =
            Some("https://www.linkedin.com/company/acme".into());
        assert_eq!(
            raw.company_url(),
            Some("https://www.linkedin.com/company/acme")
        );
    }

    #[test]
    fn sample_profile_is_deterministic() {
        let a = normalize_profile(&sample_profile());
        let b = normalize_profile(&sample_profile());
        assert_eq!(a.name, b.name);
        assert_eq!(a.title, "VP of IT Operations");
        assert_eq!(a.connections, 850);
        assert_eq!(placeholder_organization(), placeholder_organization());
    }
}
