// Completion prompts for draft analysis.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// System instruction for scoring an uploaded draft.
pub fn analysis_system_prompt() -> String {
    format!(
        "You are an experienced grant reviewer helping an organization improve a funding proposal. \
        Review the draft and assess each proposal section: Executive Summary, Community Context, \
        Problem Statement, Project Description, Budget, Outcomes, Risk Management. \
        Return a JSON object with a single key \"sections\" holding an array. \
        Each element must have: \"section\" (section name), \"summary\" (two or three sentences \
        on what the draft says), \"recommendations\" (array of short, actionable strings) and \
        \"score\" (integer 0-100 reflecting completeness and persuasiveness). \
        If a section is absent, still include it with a low score and a recommendation to add it. \
        {JSON_ONLY_INSTRUCTION}"
    )
}

/// User turn carrying the draft text.
pub fn analysis_user_prompt(draft: &str) -> String {
    format!("PROPOSAL DRAFT:\n{draft}")
}
