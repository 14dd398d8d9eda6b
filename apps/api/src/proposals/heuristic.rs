//! Heuristic draft scorer: deterministic keyword coverage per proposal section.
//!
//! Used directly when `ANALYSIS_BACKEND=heuristic` and as the fallback whenever
//! the completion-backed analysis cannot produce a usable result.
//!
//! Algorithm, per section:
//! 1. matches = number of the section's keywords found as substrings of the lower-cased text
//! 2. coverage_bonus = min(30, word_count / 200), word_count ≥ 1
//! 3. score = clamp(40 + matches × 12 + coverage_bonus, 30, 92)
//! 4. No match → one "add this section" recommendation.
//!    Otherwise one "strengthen" recommendation only while score < 75.

use crate::proposals::models::DraftAnalysis;

const BASE_SCORE: i64 = 40;
const POINTS_PER_MATCH: i64 = 12;
const WORDS_PER_BONUS_POINT: usize = 200;
const MAX_COVERAGE_BONUS: i64 = 30;
const MIN_SCORE: i64 = 30;
const MAX_SCORE: i64 = 92;
const STRONG_SECTION_SCORE: i64 = 75;

/// A scored section and the keywords that signal its presence.
pub struct SectionKeywords {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

/// Fixed scoring order. Every heuristic result has one entry per row, in this order.
pub const SECTION_KEYWORDS: &[SectionKeywords] = &[
    SectionKeywords {
        name: "Executive Summary",
        keywords: &["executive", "summary", "overview"],
    },
    SectionKeywords {
        name: "Community Context",
        keywords: &["community", "population", "background", "residents"],
    },
    SectionKeywords {
        name: "Problem Statement",
        keywords: &["problem", "challenge", "need", "gap"],
    },
    SectionKeywords {
        name: "Project Description",
        keywords: &["project", "objective", "activities", "implementation"],
    },
    SectionKeywords {
        name: "Budget",
        keywords: &["budget", "cost", "funding", "expense"],
    },
    SectionKeywords {
        name: "Outcomes",
        keywords: &["outcome", "impact", "indicator", "evaluation"],
    },
    SectionKeywords {
        name: "Risk Management",
        keywords: &["risk", "mitigation", "contingency"],
    },
];

/// Scores every section of `text`. `text` is expected to be non-empty and normalized.
pub fn score_sections(text: &str) -> Vec<DraftAnalysis> {
    let lowered = text.to_lowercase();
    let bonus = coverage_bonus(text);

    SECTION_KEYWORDS
        .iter()
        .map(|section| score_section(section, &lowered, bonus))
        .collect()
}

fn score_section(section: &SectionKeywords, lowered: &str, bonus: i64) -> DraftAnalysis {
    let matches = section
        .keywords
        .iter()
        .filter(|kw| lowered.contains(*kw))
        .count() as i64;

    let score = (BASE_SCORE + matches * POINTS_PER_MATCH + bonus).clamp(MIN_SCORE, MAX_SCORE);
    let name = section.name;

    if matches == 0 {
        return DraftAnalysis::new(
            name,
            format!("The {name} section appears to be missing or light on detail."),
            vec![format!(
                "Add a dedicated {name} section with concrete specifics."
            )],
            score,
        );
    }

    let recommendations = if score < STRONG_SECTION_SCORE {
        vec![format!(
            "Strengthen the {name} with more evidence, data, or examples."
        )]
    } else {
        Vec::new()
    };

    DraftAnalysis::new(
        name,
        format!("Detected {name} content with {matches} supporting signal(s)."),
        recommendations,
        score,
    )
}

/// One point per 200 words, capped at 30. Word count never drops below 1.
fn coverage_bonus(text: &str) -> i64 {
    let word_count = text.split_whitespace().count().max(1);
    ((word_count / WORDS_PER_BONUS_POINT) as i64).min(MAX_COVERAGE_BONUS)
}
