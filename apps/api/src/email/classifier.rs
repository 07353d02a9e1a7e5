//! Classifier — one prompt, one model call, one parse.

use tracing::info;

use crate::email::models::AnalysisResult;
use crate::email::parser::parse_model_reply;
use crate::email::prompts::{build_classification_prompt, CLASSIFY_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::TextModel;

/// Classifies `email_text` and drafts a reply through the remote model.
/// No retry: any model failure becomes `AppError::Llm`.
pub async fn analyze_email(
    email_text: &str,
    model: &dyn TextModel,
) -> Result<AnalysisResult, AppError> {
    let prompt = build_classification_prompt(email_text);
    let reply = model
        .complete(&prompt, CLASSIFY_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Email classification failed: {e}")))?;

    let result = parse_model_reply(&reply);
    info!(
        "Email classified as {:?} ({} chars in, {} chars suggested)",
        result.category,
        email_text.chars().count(),
        result.suggested_response.chars().count()
    );
    Ok(result)
}
