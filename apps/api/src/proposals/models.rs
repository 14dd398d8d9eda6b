use serde::{Deserialize, Serialize};

/// Findings for one proposal section.
///
/// `score` is always within 0–100 and `recommendations` never holds blank entries;
/// both constructors below enforce that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftAnalysis {
    pub section: String,
    pub summary: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub score: u8,
}

impl DraftAnalysis {
    pub fn new(
        section: impl Into<String>,
        summary: impl Into<String>,
        recommendations: Vec<String>,
        score: i64,
    ) -> Self {
        Self {
            section: section.into(),
            summary: summary.into(),
            recommendations: recommendations
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
            score: score.clamp(0, 100) as u8,
        }
    }
}

/// Structured proposal submitted from the builder form.
#[derive(Debug, Clone, Deserialize)]
pub struct ProposalPayload {
    pub project_title: String,
    pub organization_name: String,
    pub submission_date: Option<String>,
    pub executive_summary: Option<String>,
    pub community_background: Option<String>,
    pub problem_description: Option<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<String>,
    pub requested_amount: Option<String>,
    pub risks: Option<String>,
}

impl ProposalPayload {
    /// `proposal-` followed by the lower-cased title with spaces turned into hyphens.
    pub fn proposal_id(&self) -> String {
        format!(
            "proposal-{}",
            self.project_title.to_lowercase().replace(' ', "-")
        )
    }

    /// Number of optional narrative fields that carry text.
    pub fn narrative_field_count(&self) -> usize {
        [
            &self.executive_summary,
            &self.community_background,
            &self.problem_description,
            &self.requested_amount,
            &self.risks,
        ]
        .iter()
        .filter(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
        .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposalResponse {
    pub message: String,
    pub proposal_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(title: &str) -> ProposalPayload {
        serde_json::from_value(json!({
            "project_title": title,
            "organization_name": "Northern Co-op",
        }))
        .unwrap()
    }

    #[test]
    fn test_proposal_id_from_title() {
        assert_eq!(
            payload("Rural Broadband Access").proposal_id(),
            "proposal-rural-broadband-access"
        );
    }

    #[test]
    fn test_proposal_id_keeps_punctuation() {
        assert_eq!(payload("Clean Water: Phase 2").proposal_id(), "proposal-clean-water:-phase-2");
    }

    #[test]
    fn test_list_fields_default_empty() {
        let p = payload("x");
        assert!(p.objectives.is_empty());
        assert!(p.milestones.is_empty());
        assert_eq!(p.narrative_field_count(), 0);
    }

    #[test]
    fn test_missing_organization_is_rejected() {
        let parsed = serde_json::from_value::<ProposalPayload>(json!({"project_title": "x"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_draft_analysis_clamps_and_drops_blank_recommendations() {
        let a = DraftAnalysis::new("Budget", "ok", vec!["  ".into(), " Add totals ".into()], 140);
        assert_eq!(a.score, 100);
        assert_eq!(a.recommendations, vec!["Add totals"]);
        assert_eq!(DraftAnalysis::new("Budget", "", vec![], -3).score, 0);
    }
}
