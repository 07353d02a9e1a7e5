// Email triage: text intake, prompt construction, model call, reply parsing.
// All model calls go through llm_client::TextModel.

pub mod classifier;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;
