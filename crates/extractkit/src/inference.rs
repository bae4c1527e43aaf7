//! Inference collaborator interface
//!
//! The LLM call itself is opaque to the pipeline: providers implement
//! [`InferenceProvider`] and return a structured record as JSON. Provider
//! failures (rate limits, transport faults, malformed output) surface as
//! [`InferenceError`] and are recovered into a failed extraction result by
//! the caller; the pipeline itself never retries.

use crate::error::InferenceError;
use crate::types::{FieldSet, RawContent};
use async_trait::async_trait;

/// Instruction preamble submitted ahead of page content
pub const EXTRACTION_INSTRUCTIONS: &str = "\
You are an expert web content analyzer. Extract the requested fields from \
the provided webpage content.

Rules:
- Never fabricate information.
- If a field cannot be determined from the content, set it to null.
- Return only the requested fields as a JSON object.
- Clean extracted text of navigation artifacts and ads.";

/// External collaborator that turns content plus a schema into a record
///
/// Implementations wrap a model API, a local model, or a test double. The
/// returned value must be a JSON object; the pipeline enforces the
/// closed-world schema on it, so extra fields are tolerated here.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Run inference over the prompt and return a structured record
    async fn infer(
        &self,
        prompt: &str,
        schema: &FieldSet,
    ) -> Result<serde_json::Value, InferenceError>;
}

/// Provider that returns a fixed response
///
/// Useful for offline runs and tests; stands in for a real model API.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    response: serde_json::Value,
}

impl StaticProvider {
    /// Create a provider that always answers with `response`
    pub fn new(response: serde_json::Value) -> Self {
        Self { response }
    }
}

#[async_trait]
impl InferenceProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn infer(
        &self,
        _prompt: &str,
        _schema: &FieldSet,
    ) -> Result<serde_json::Value, InferenceError> {
        Ok(self.response.clone())
    }
}

/// Assemble the prompt for one inference attempt
///
/// `body` is the (possibly truncated) content to submit, passed separately
/// so truncation stays the caller's concern.
pub(crate) fn build_prompt(content: &RawContent, body: &str, schema: &FieldSet) -> String {
    format!(
        "{EXTRACTION_INSTRUCTIONS}\n\n\
        URL: {}\n\n\
        Fields to extract:\n{}\n\
        WEBPAGE CONTENT:\n{body}",
        content.url,
        schema.describe(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldSpec;

    #[tokio::test]
    async fn test_static_provider_echoes_response() {
        let provider = StaticProvider::new(serde_json::json!({"title": "Hello"}));
        let schema = FieldSet::new().field(FieldSpec::new("title"));
        let response = provider.infer("prompt", &schema).await.unwrap();
        assert_eq!(response["title"], "Hello");
    }

    #[test]
    fn test_prompt_carries_url_schema_and_body() {
        let content = RawContent::new("https://example.com/post", "full body");
        let schema = FieldSet::new().field(FieldSpec::new("title").required());
        let prompt = build_prompt(&content, "truncated body", &schema);

        assert!(prompt.contains("URL: https://example.com/post"));
        assert!(prompt.contains("- title (required)"));
        assert!(prompt.ends_with("truncated body"));
        assert!(!prompt.contains("full body"));
    }
}
