//! Structuring strategies
//!
//! Two interchangeable ways to populate a record from raw content: the
//! deterministic selector strategy and the inference strategy. Both honor
//! the same contract: required fields are always present in the output,
//! optional fields only when positively resolved, and any field the
//! inference collaborator returns outside the declared schema is dropped.

use crate::diagnostics::Recorder;
use crate::error::InferenceError;
use crate::inference::{build_prompt, InferenceProvider};
use crate::resolve::Resolver;
use crate::types::{FieldSet, RawContent, Record, Value, FAILED_VALUE, UNKNOWN_VALUE};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Structuring strategy, selected by configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Resolve each field through its locator chain
    #[default]
    Selectors,
    /// Submit content and schema to an inference provider
    Inference,
}

/// Default content budget for the inference strategy, in characters
pub const DEFAULT_CONTENT_BUDGET: usize = 25_000;

/// Populate a record by resolving every field's locator chain
///
/// Never fails: unresolved optional fields stay absent, unresolved
/// required fields get the `"unknown"` sentinel.
pub fn structure_with_selectors(content: &RawContent, schema: &FieldSet) -> Record {
    let resolver = Resolver::new(content);
    let mut fields = Record::new();
    for spec in schema.fields() {
        match resolver.resolve(&spec.locator) {
            Some(text) => fields.insert(&spec.name, Value::String(text)),
            None if spec.required => fields.insert(&spec.name, Value::from(UNKNOWN_VALUE)),
            None => {}
        }
    }
    fields
}

/// Populate a record through the inference collaborator
///
/// Truncates content to `budget` characters (noting the truncation in the
/// recorder as informational, non-fatal), submits prompt plus schema, and
/// enforces the closed-world schema on the response.
pub(crate) async fn structure_with_inference(
    content: &RawContent,
    schema: &FieldSet,
    provider: &dyn InferenceProvider,
    budget: usize,
    recorder: &mut Recorder,
) -> Result<Record, InferenceError> {
    let (body, truncated) = truncate_chars(&content.body, budget);
    if truncated {
        recorder.note(format!(
            "content truncated from {} to {} characters before inference",
            content.len(),
            budget
        ));
    }

    let prompt = build_prompt(content, &body, schema);
    tracing::debug!(provider = provider.name(), url = %content.url, "running inference");
    let response = provider.infer(&prompt, schema).await?;

    let serde_json::Value::Object(map) = response else {
        return Err(InferenceError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    let mut fields = Record::new();
    for spec in schema.fields() {
        match map.get(&spec.name) {
            Some(serde_json::Value::Null) | None => {
                if spec.required {
                    fields.insert(&spec.name, Value::from(UNKNOWN_VALUE));
                }
            }
            Some(value) => fields.insert(&spec.name, Value::from(value.clone())),
        }
    }
    for name in map.keys() {
        if !schema.declares(name) {
            tracing::debug!(field = %name, "dropping undeclared field from inference response");
        }
    }

    Ok(fields)
}

/// Record for a failed attempt: required fields carry the failure
/// sentinel, optional fields are absent
pub(crate) fn failed_fields(schema: &FieldSet) -> Record {
    let mut fields = Record::new();
    for spec in schema.fields() {
        if spec.required {
            fields.insert(&spec.name, Value::from(FAILED_VALUE));
        }
    }
    fields
}

/// Keep at most `budget` characters of the body
pub(crate) fn truncate_chars(body: &str, budget: usize) -> (Cow<'_, str>, bool) {
    if body.chars().count() <= budget {
        (Cow::Borrowed(body), false)
    } else {
        (Cow::Owned(body.chars().take(budget).collect()), true)
    }
}
