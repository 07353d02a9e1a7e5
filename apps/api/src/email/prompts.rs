// Classification prompt templates.
// The reply format here is what email::parser scrapes; change them together.

/// System prompt for email classification.
pub const CLASSIFY_SYSTEM: &str = "You are an assistant that triages incoming email \
    for a customer support team. You classify each email and draft a short, polite reply. \
    You follow the requested output format exactly, with no extra commentary.";

/// Classification prompt template. Replace `{email_text}` before sending.
pub const CLASSIFY_PROMPT_TEMPLATE: &str = r#"Classify the email below into exactly one of these categories:

- Productive: the email requires an action or a response (support requests, questions about a case or an invoice, status updates on an open issue, system problems).
- Unproductive: the email requires no immediate action (greetings, thanks, congratulations, holiday wishes, messages unrelated to work).

Then write a suggested reply to the sender.

The email may be written in English or Brazilian Portuguese. Write the suggested reply in the SAME language as the email. Keep the category label in English.

Answer in exactly this format, with nothing before the first line:
Category: <Productive or Unproductive>
Suggested Response: <the reply, which may span several lines>

EMAIL:
{email_text}"#;

/// Builds the user prompt for a single email. Deterministic; the text is embedded verbatim.
pub fn build_classification_prompt(email_text: &str) -> String {
    CLASSIFY_PROMPT_TEMPLATE.replace("{email_text}", email_text)
}
