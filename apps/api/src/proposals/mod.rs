// Proposal drafting: upload analysis and proposal intake.
// Remote calls go through llm_client; everything else here is pure.

pub mod analysis;
pub mod extract;
pub mod handlers;
pub mod heuristic;
pub mod models;
pub mod prompts;
