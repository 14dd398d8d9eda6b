//! Proposal builder sections and the form fields the assistant may fill for each.
//!
//! The table is static: one record per builder step, indexed 0–10.

/// Form fields the assistant may populate while the user is on one builder step.
#[derive(Debug)]
pub struct SectionFieldConfig {
    pub index: usize,
    pub description: &'static str,
    pub fields: &'static [&'static str],
}

impl SectionFieldConfig {
    pub fn allows(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }
}

pub static SECTION_FIELDS: &[SectionFieldConfig] = &[
    SectionFieldConfig {
        index: 0,
        description: "Quick start intake overview",
        fields: &[
            "projectTitle",
            "organizationName",
            "executiveSummary",
            "problemDescription",
            "expectedOutcomes",
            "objective1",
            "communityBackground",
            "needsChallenges",
        ],
    },
    SectionFieldConfig {
        index: 1,
        description: "Cover Page details",
        fields: &[
            "projectTitle",
            "organizationName",
            "submissionDate",
            "contactName",
            "contactPhone",
            "contactEmail",
            "contactAddress",
            "fundedBy",
        ],
    },
    SectionFieldConfig {
        index: 2,
        description: "Executive Summary narrative",
        fields: &["executiveSummary"],
    },
    SectionFieldConfig {
        index: 3,
        description: "Community and background context",
        fields: &[
            "communityName",
            "population",
            "communityBackground",
            "economicBaseline",
            "culturalContext",
            "needsChallenges",
        ],
    },
    SectionFieldConfig {
        index: 4,
        description: "Problem / Opportunity statement details",
        fields: &["problemDescription", "supportingEvidence"],
    },
    SectionFieldConfig {
        index: 5,
        description: "Project objectives and yearly activities",
        fields: &[
            "objective1",
            "objective2",
            "objective3",
            "year1Activities",
            "year2Activities",
            "year3Activities",
        ],
    },
    SectionFieldConfig {
        index: 6,
        description: "Implementation plan details",
        fields: &[
            "governanceStructure",
            "implementationResponsibilities",
            "implementationPartnerships",
            "implementationRiskOverview",
        ],
    },
    SectionFieldConfig {
        index: 7,
        description: "Budget and financial plan",
        fields: &[
            "totalBudget",
            "requestedAmount",
            "communityContribution",
            "personnelBudget",
            "equipmentBudget",
            "trainingBudget",
            "marketingBudget",
            "otherBudget",
            "sustainabilityPlan",
        ],
    },
    SectionFieldConfig {
        index: 8,
        description: "Expected outcomes and evaluation plans",
        fields: &[
            "expectedOutcomes",
            "successIndicators",
            "dataCollectionPlan",
            "evaluationPlan",
        ],
    },
    SectionFieldConfig {
        index: 9,
        description: "Alignment with priorities and sustainability",
        fields: &[
            "communityAlignment",
            "funderAlignment",
            "longTermSustainability",
        ],
    },
    SectionFieldConfig {
        index: 10,
        description: "Risk management overview",
        fields: &["risksMitigation"],
    },
];

/// Looks up a section by builder index. Negative or unknown indices yield `None`.
pub fn section_config(index: i64) -> Option<&'static SectionFieldConfig> {
    let index = usize::try_from(index).ok()?;
    SECTION_FIELDS.iter().find(|s| s.index == index)
}
