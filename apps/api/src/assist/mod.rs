// Conversational assist: chat with structured field extraction, plus speech pass-through.
// Completion calls go through llm_client; speech calls go through speech.rs.

pub mod chat;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod sections;
pub mod speech;
