//! Heuristic buying-intent signals keyed on a prospect's role title.
//!
//! Maps a job-title string to a fixed tier of canned pain points, keywords,
//! sentiment, and representative community discussions. Pure function of the
//! title text — no I/O, no caching, deterministic output for identical input.

use tracing::debug;

use leadlens_shared::{Discussion, IntentSignals};

/// Derive intent signals for a role title.
///
/// Matching is case-insensitive substring; tiers are checked from most to
/// least senior and the first match wins.
pub fn derive_signals(title: &str) -> IntentSignals {
    let t = title.to_lowercase();
    debug!(title, "deriving intent signals");

    if t.contains("cio") || t.contains("cto") || t.contains("chief") {
        return tier_c_level(title);
    }
    if t.contains("vp") || t.contains("vice president") {
        return tier_vp(title);
    }
    if t.contains("director") || t.contains("head of") {
        return tier_director(title);
    }
    if t.contains("manager") || t.contains("lead") {
        return tier_manager(title);
    }
    if t.contains("senior") || t.contains("specialist") || t.contains("analyst") {
        return tier_senior(title);
    }
    tier_default(title)
}

fn discussion(forum: &str, title: &str, score: u32, engagement: &str) -> Discussion {
    Discussion {
        forum: forum.into(),
        title: title.into(),
        score,
        engagement: engagement.into(),
    }
}

fn signals(
    job_title: &str,
    count: u32,
    pain_points: &[&str],
    keywords: &[&str],
    sentiment: &str,
    urgency: &str,
    discussions: Vec<Discussion>,
) -> IntentSignals {
    IntentSignals {
        job_title: job_title.into(),
        count,
        pain_points: pain_points.iter().map(|s| s.to_string()).collect(),
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        sentiment: sentiment.into(),
        urgency: urgency.into(),
        discussions,
    }
}

fn tier_c_level(title: &str) -> IntentSignals {
    signals(
        title,
        9,
        &[
            "Digital transformation initiatives stalling",
            "Legacy system modernization challenges",
            "ROI pressure on technology investments",
            "Talent acquisition difficulties",
        ],
        &[
            "automation",
            "modernization",
            "roi",
            "enterprise",
            "digital transformation",
        ],
        "solution_seeking",
        "high",
        vec![
            discussion("CIO", "ServiceNow implementation lessons learned", 156, "high"),
            discussion(
                "sysadmin",
                "Enterprise automation strategies that actually work",
                243,
                "high",
            ),
            discussion(
                "ITManagement",
                "Justifying ITSM platform costs to board",
                89,
                "medium",
            ),
        ],
    )
}

fn tier_vp(title: &str) -> IntentSignals {
    signals(
        title,
        8,
        &[
            "Team productivity bottlenecks",
            "Cross-department workflow inefficiencies",
            "Reporting and visibility gaps",
            "Vendor management complexity",
        ],
        &[
            "productivity",
            "workflow",
            "visibility",
            "operations",
            "efficiency",
        ],
        "frustrated",
        "medium-high",
        vec![
            discussion(
                "ITManagers",
                "Streamlining IT operations across departments",
                178,
                "high",
            ),
            discussion(
                "technology",
                "Best practices for service management",
                134,
                "medium",
            ),
            discussion("BusinessIntelligence", "KPI tracking for IT teams", 67, "medium"),
        ],
    )
}

fn tier_director(title: &str) -> IntentSignals {
    signals(
        title,
        7,
        &[
            "Manual process overhead",
            "Ticket volume management",
            "Team burnout from repetitive tasks",
            "SLA compliance challenges",
        ],
        &["automation", "ticketing", "workflow", "sla", "efficiency"],
        "solution_seeking",
        "medium",
        vec![
            discussion("ITManagers", "Reducing manual ticket routing", 124, "high"),
            discussion(
                "sysadmin",
                "Automation wins that saved our sanity",
                298,
                "very_high",
            ),
            discussion(
                "ITIL",
                "SLA improvements through workflow automation",
                85,
                "medium",
            ),
        ],
    )
}

fn tier_manager(title: &str) -> IntentSignals {
    signals(
        title,
        6,
        &[
            "Daily operational firefighting",
            "Limited visibility into team workload",
            "Manual reporting requirements",
            "User satisfaction concerns",
        ],
        &[
            "support",
            "self-service",
            "metrics",
            "workload",
            "user satisfaction",
        ],
        "problem_aware",
        "medium",
        vec![
            discussion("ITManagers", "Tools to reduce L1 support volume", 167, "high"),
            discussion("sysadmin", "Self-service portal implementations", 203, "high"),
            discussion(
                "HelpDesk",
                "Metrics that matter for support teams",
                92,
                "medium",
            ),
        ],
    )
}

fn tier_senior(title: &str) -> IntentSignals {
    signals(
        title,
        5,
        &[
            "Repetitive manual tasks",
            "Knowledge sharing challenges",
            "Tool fragmentation",
            "Career development concerns",
        ],
        &["automation", "skills", "tools", "maintenance", "knowledge"],
        "learning_oriented",
        "low-medium",
        vec![
            discussion("sysadmin", "Automating routine maintenance tasks", 234, "high"),
            discussion(
                "ITCareerQuestions",
                "Skills for IT automation specialists",
                145,
                "medium",
            ),
            discussion(
                "technology",
                "Knowledge management best practices",
                78,
                "medium",
            ),
        ],
    )
}

fn tier_default(title: &str) -> IntentSignals {
    signals(
        title,
        4,
        &[
            "General operational inefficiencies",
            "Process improvement opportunities",
            "Technology adoption challenges",
        ],
        &["efficiency", "processes", "technology", "improvement"],
        "neutral",
        "low",
        vec![
            discussion("technology", "Service automation trends", 112, "medium"),
            discussion("ITSupport", "Improving user experience", 89, "medium"),
        ],
    )
}
