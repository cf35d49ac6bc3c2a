use tracing::debug;

use crate::text::TextFeatures;
use crate::traits::CompetitionTable;
use crate::types::{SignalName, SubScore};

/// Neutral intensity used for industries missing from the table.
pub const DEFAULT_COMPETITION: f64 = 0.5;

const TEXT_NUDGE: f64 = 0.1;

const NICHE_MARKERS: &[&str] = &[
    "niche",
    "specialized",
    "specialised",
    "unique",
    "underserved",
    "rural",
    "patent*",
    "proprietary",
];

const CROWDED_MARKERS: &[&str] = &[
    "app",
    "crm",
    "software",
    "marketplace",
    "delivery",
    "dropshipping",
    "e-commerce",
    "social media",
];

const SCALABLE_MARKERS: &[&str] = &[
    "software",
    "platform",
    "saas",
    "cloud",
    "digital",
    "online",
    "app",
    "api",
    "subscription",
    "marketplace",
    "automat*",
    "licens*",
    "franchise",
];

const SERVICE_MARKERS: &[&str] = &["consulting", "service", "services", "training", "coaching"];

const BOUND_MARKERS: &[&str] = &[
    "local",
    "physical",
    "brick-and-mortar",
    "on-site",
    "in-person",
    "single location",
    "restaurant",
    "cafe",
    "storefront",
    "handmade",
    "bespoke",
];

const SCALE_STEP: f64 = 0.2;

/// Reference competition intensities keyed by normalized industry name.
const COMPETITION_INTENSITY: &[(&str, f64)] = &[
    ("technology", 0.80),
    ("software", 0.85),
    ("fintech", 0.75),
    ("finance", 0.70),
    ("ecommerce", 0.85),
    ("retail", 0.80),
    ("consumer", 0.75),
    ("food", 0.80),
    ("hospitality", 0.75),
    ("healthcare", 0.55),
    ("education", 0.60),
    ("real estate", 0.65),
    ("media", 0.70),
    ("entertainment", 0.70),
    ("manufacturing", 0.50),
    ("energy", 0.45),
    ("agriculture", 0.40),
    ("logistics", 0.60),
    ("sustainability", 0.45),
    ("biotech", 0.40),
    ("aerospace", 0.30),
];

const INDUSTRY_ALIASES: &[(&str, &str)] = &[
    ("tech", "technology"),
    ("it", "technology"),
    ("saas", "software"),
    ("financial services", "finance"),
    ("banking", "finance"),
    ("e commerce", "ecommerce"),
    ("online retail", "ecommerce"),
    ("health", "healthcare"),
    ("medical", "healthcare"),
    ("edtech", "education"),
    ("restaurants", "food"),
    ("food and beverage", "food"),
    ("travel", "hospitality"),
    ("green", "sustainability"),
    ("cleantech", "sustainability"),
    ("climate", "sustainability"),
    ("proptech", "real estate"),
    ("agritech", "agriculture"),
];

/// Lowercase, trim and collapse separators so lookups ignore formatting.
pub fn normalize_industry(industry: &str) -> String {
    let collapsed = industry
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_' || c == '/')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");
    INDUSTRY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == collapsed)
        .map_or(collapsed, |(_, canonical)| (*canonical).to_string())
}

/// Built-in competition table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCompetitionTable;

impl CompetitionTable for StaticCompetitionTable {
    fn name(&self) -> &'static str {
        "static"
    }

    fn lookup(&self, industry: &str) -> Option<f64> {
        let key = normalize_industry(industry);
        COMPETITION_INTENSITY
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, intensity)| *intensity)
    }
}

pub fn evaluate_competition(
    industry: &str,
    idea_text: &str,
    table: &dyn CompetitionTable,
) -> SubScore {
    let key = normalize_industry(industry);
    let (base, known) = match table.lookup(&key) {
        Some(v) if v.is_finite() => (v.clamp(0.0, 1.0), true),
        Some(v) => {
            debug!(table = table.name(), industry = %key, value = v, "ignoring non-finite intensity");
            (DEFAULT_COMPETITION, false)
        }
        None => {
            debug!(table = table.name(), industry = %key, "industry not in competition table");
            (DEFAULT_COMPETITION, false)
        }
    };

    let features = TextFeatures::new(idea_text);
    let mut value = base;
    if features.any(NICHE_MARKERS) {
        value -= TEXT_NUDGE;
    }
    if features.any(CROWDED_MARKERS) {
        value += TEXT_NUDGE;
    }

    SubScore::available(
        SignalName::Competition,
        value.clamp(0.0, 1.0),
        if known { 1.0 } else { 0.5 },
    )
}

/// Baseline 0.5, raised by replicable business-model markers and lowered by
/// physically bound ones. Service markers pull gently toward the middle.
pub fn evaluate_scalability(idea_text: &str) -> SubScore {
    let features = TextFeatures::new(idea_text);
    let scalable = features.matches(SCALABLE_MARKERS).len().min(2);
    let bound = features.matches(BOUND_MARKERS).len().min(2);
    let service = features.any(SERVICE_MARKERS);

    let mut value = 0.5 + SCALE_STEP * scalable as f64 - SCALE_STEP * bound as f64;
    if service {
        value = (value + 0.5) / 2.0;
    }
    let matched = scalable > 0 || bound > 0 || service;

    SubScore::available(
        SignalName::Scalability,
        value.clamp(0.0, 1.0),
        if matched { 1.0 } else { 0.5 },
    )
}
