// Shared prompt fragments.
// Each feature area that calls the completion service keeps its own prompts.rs;
// only cross-cutting fragments live here.

/// Appended to every instruction that expects a machine-readable reply.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
