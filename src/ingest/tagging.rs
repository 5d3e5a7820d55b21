// src/ingest/tagging.rs
//! Topic tagging for providers that do not label their records.
//!
//! Tags come from the same vocabulary viewers pick their interests from, so a
//! derived tag can match a declared interest exactly.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Interest vocabulary offered to viewers at sign-up.
pub const INTEREST_TOPICS: [&str; 10] = [
    "Voting Rights",
    "Election Security",
    "Campaign Finance",
    "Local Politics",
    "State Politics",
    "Federal Politics",
    "International Relations",
    "Environmental Policy",
    "Healthcare",
    "Education",
];

static TOPIC_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        (
            "Voting Rights",
            r"\b(voting rights?|voter (id|registration|suppression)|ballot access|suffrage|redistricting|gerrymander\w*)\b",
        ),
        (
            "Election Security",
            r"\b(election (security|integrity|systems?)|voting (machines?|systems?)|ballot security|poll workers?)\b",
        ),
        (
            "Campaign Finance",
            r"\b(campaign (finance|contributions?|donations?)|super ?pacs?|political action committees?|lobby\w*)\b",
        ),
        (
            "Local Politics",
            r"\b(city council|county (board|commission)|mayor\w*|municipal\w*|ordinances?|zoning)\b",
        ),
        (
            "State Politics",
            r"\b(state (legislature|senate|house|budget)|legislatures?|governor\w*|statehouse|general assembly)\b",
        ),
        (
            "Federal Politics",
            r"\b(congress\w*|u\.?s\.? senate|house of representatives|white house|federal government|president\w*|executive orders?)\b",
        ),
        (
            "International Relations",
            r"\b(foreign (policy|affairs)|treat(y|ies)|trade (agreement|deal|war)s?|tariffs?|nato|united nations|diplomat\w*|sanctions?)\b",
        ),
        (
            "Environmental Policy",
            r"\b(environment\w*|emissions?|epa|renewable\w*|clean (energy|air|water)|wildlife|conservation|pollution)\b",
        ),
        (
            "Climate Change",
            r"\b(climate|carbon (neutral\w*|emissions?)|greenhouse gas\w*|global warming)\b",
        ),
        (
            "Healthcare",
            r"\b(health ?care|health (insurance|coverage|reform)|medicare|medicaid|hospitals?|prescription drugs?|drug prices?|abortion)\b",
        ),
        (
            "Education",
            r"\b(education\w*|schools?|students?|teachers?|tuition|universit(y|ies)|colleges?)\b",
        ),
    ]
    .into_iter()
    .map(|(tag, pat)| {
        let re = Regex::new(&format!("(?i){pat}")).expect("topic regex");
        (tag, re)
    })
    .collect()
});

/// Topics mentioned in `text`. Empty when nothing matches.
pub fn derive_tags(text: &str) -> BTreeSet<String> {
    TOPIC_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(tag, _)| (*tag).to_string())
        .collect()
}
