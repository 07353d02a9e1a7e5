use serde::{Deserialize, Serialize};

/// JSON body of `POST /process-email`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailInput {
    pub email_text: String,
}

/// Classification label assigned to an email.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Productive,
    Unproductive,
    #[default]
    Unknown,
}

/// Result returned by both analysis endpoints. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub category: Category,
    pub suggested_response: String,
}
