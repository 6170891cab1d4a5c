//! Prospect scoring.
//!
//! Every function here is a pure, bit-reproducible function of its inputs;
//! metrics are recomputed on demand and never cached.

use leadlens_shared::{IntentSignals, Metrics, Organization, Profile};

/// Keywords in a profile summary that indicate active buying intent.
const INTENT_KEYWORDS: [&str; 5] = [
    "digital transformation",
    "modernization",
    "cloud",
    "automation",
    "efficiency",
];

/// Decision authority from the role title. Case-insensitive substring match
/// against an ordered rule list; first match wins.
pub fn decision_authority(title: &str) -> u8 {
    let t = title.to_lowercase();
    if t.contains("cio") || t.contains("cto") || t.contains("vp") {
        95
    } else if t.contains("director") || t.contains("head") {
        85
    } else if t.contains("manager") || t.contains("lead") {
        75
    } else if t.contains("senior") {
        65
    } else {
        55
    }
}

/// Budget influence: decision authority adjusted for organization size.
pub fn budget_influence(title: &str, org: &Organization) -> u8 {
    let base = decision_authority(title);
    let bonus = if org.size > 1000 {
        10
    } else if org.size > 500 {
        5
    } else {
        0
    };
    (base + bonus).min(100)
}

/// Buying intent from summary keywords and signal strength.
pub fn buying_intent(profile: &Profile, signals: &IntentSignals) -> u8 {
    let summary = profile.summary.to_lowercase();
    let mut score: u8 = 60;
    for keyword in INTENT_KEYWORDS {
        if summary.contains(keyword) {
            score += 5;
        }
    }
    if signals.count > 0 {
        score += 10;
    }
    score.min(100)
}

/// Engagement score from network reach and summary depth.
pub fn engagement_score(profile: &Profile) -> u8 {
    let mut score: u8 = 70;
    if profile.connections > 500 {
        score += 10;
    }
    if profile.follower_count > 1000 {
        score += 5;
    }
    if profile.summary.len() > 200 {
        score += 5;
    }
    score.min(100)
}

/// Compute the full metric set for an analysis result.
pub fn compute_metrics(profile: &Profile, org: &Organization, signals: &IntentSignals) -> Metrics {
    let decision_authority = decision_authority(&profile.title);
    let budget_influence = budget_influence(&profile.title, org);
    let buying_intent = buying_intent(profile, signals);
    let engagement_score = engagement_score(profile);

    Metrics {
        decision_authority,
        budget_influence,
        buying_intent,
        engagement_score,
        overall_score: mean_rounded([
            decision_authority,
            budget_influence,
            buying_intent,
            engagement_score,
        ]),
    }
}

/// Arithmetic mean of the four sub-scores, rounded half-up.
fn mean_rounded(scores: [u8; 4]) -> u8 {
    let sum: u32 = scores.iter().map(|&s| u32::from(s)).sum();
    ((sum as f64) / 4.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadlens_shared::Discussion;

    fn org(size: u32) -> Organization {
        Organization {
            name: "Acme".into(),
            size,
            industry: "Software".into(),
            description: String::new(),
        }
    }

    fn profile(title: &str, summary: &str, connections: u32, followers: u32) -> Profile {
        Profile {
            name: "Test".into(),
            title: title.into(),
            company: "Acme".into(),
            location: "Nowhere".into(),
            summary: summary.into(),
            expertise: vec![],
            certifications: vec![],
            experience: vec![],
            education: vec![],
            connections,
            follower_count: followers,
        }
    }

    fn signals(count: u32) -> IntentSignals {
        IntentSignals {
            job_title: "t".into(),
            count,
            pain_points: vec![],
            keywords: vec![],
            sentiment: "neutral".into(),
            urgency: "low".into(),
            discussions: Vec::<Discussion>::new(),
        }
    }

    #[test]
    fn decision_authority_tiers() {
        assert_eq!(decision_authority("VP of Engineering"), 95);
        assert_eq!(decision_authority("CIO"), 95);
        assert_eq!(decision_authority("Director of IT"), 85);
        assert_eq!(decision_authority("Head of Platform"), 85);
        assert_eq!(decision_authority("IT Manager"), 75);
        assert_eq!(decision_authority("Tech Lead"), 75);
        assert_eq!(decision_authority("Senior Analyst"), 65);
        assert_eq!(decision_authority("Coordinator"), 55);
    }

    #[test]
    fn budget_influence_size_bonuses() {
        assert_eq!(budget_influence("Director", &org(2000)), 95);
        assert_eq!(budget_influence("Director", &org(600)), 90);
        assert_eq!(budget_influence("Director", &org(100)), 85);
        // Clamped at 100.
        assert_eq!(budget_influence("VP of Sales", &org(5000)), 100);
    }

    #[test]
    fn buying_intent_keywords_and_signals() {
        let p = profile(
            "CTO",
            "Driving digital transformation and cloud automation for efficiency.",
            0,
            0,
        );
        // 60 + 4 keywords * 5 + 10 for signals = 90.
        assert_eq!(buying_intent(&p, &signals(3)), 90);

        let quiet = profile("CTO", "", 0, 0);
        assert_eq!(buying_intent(&quiet, &signals(0)), 60);
        assert_eq!(buying_intent(&quiet, &signals(1)), 70);
    }

    #[test]
    fn buying_intent_clamps_at_100() {
        let p = profile(
            "CTO",
            "digital transformation modernization cloud automation efficiency \
             digital transformation modernization",
            0,
            0,
        );
        // 60 + 25 + 10 = 95; keywords only count once each.
        assert_eq!(buying_intent(&p, &signals(9)), 95);
    }

    #[test]
    fn engagement_score_components() {
        assert_eq!(engagement_score(&profile("x", "", 0, 0)), 70);
        assert_eq!(engagement_score(&profile("x", "", 600, 0)), 80);
        assert_eq!(engagement_score(&profile("x", "", 600, 1500)), 85);
        let long_summary = "s".repeat(250);
        assert_eq!(engagement_score(&profile("x", &long_summary, 600, 1500)), 90);
    }

    #[test]
    fn overall_is_rounded_mean() {
        let metrics = compute_metrics(
            &profile("VP of IT Operations", "", 850, 1200),
            &org(5000),
            &signals(8),
        );
        assert_eq!(metrics.decision_authority, 95);
        assert_eq!(metrics.budget_influence, 100);
        assert_eq!(metrics.buying_intent, 70);
        assert_eq!(metrics.engagement_score, 85);
        // (95 + 100 + 70 + 85) / 4 = 87.5 → 88
        assert_eq!(metrics.overall_score, 88);
    }

    #[test]
    fn half_means_round_up() {
        assert_eq!(mean_rounded([95, 100, 70, 85]), 88);
        assert_eq!(mean_rounded([55, 60, 70, 85]), 68);
        assert_eq!(mean_rounded([55, 55, 55, 55]), 55);
    }

    #[test]
    fn half_mean_from_real_inputs() {
        // Coordinator (55), org 600 → budget 60, no keywords + signals (70),
        // connections 600 & followers 1500 & short summary (85): 270/4 = 67.5.
        let metrics = compute_metrics(
            &profile(
                "Coordinator",
                "Operations coordinator focused on scheduling.",
                600,
                1500,
            ),
            &org(600),
            &signals(4),
        );
        assert_eq!(
            (
                metrics.decision_authority,
                metrics.budget_influence,
                metrics.buying_intent,
                metrics.engagement_score,
            ),
            (55, 60, 70, 85)
        );
        assert_eq!(metrics.overall_score, 68);
    }

    #[test]
    fn metrics_are_reproducible() {
        let p = profile("Director of IT", "Cloud first.", 510, 0);
        let o = org(900);
        let s = signals(7);
        assert_eq!(compute_metrics(&p, &o, &s), compute_metrics(&p, &o, &s));
    }
}
