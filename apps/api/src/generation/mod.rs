// Structured document generation.
// Every generator goes through structured::generate_structured; model calls go through llm_client.

pub mod ats;
pub mod diagram;
pub mod handlers;
pub mod letter;
pub mod normalize;
pub mod presentation;
pub mod prompts;
pub mod resume;
pub mod structured;
