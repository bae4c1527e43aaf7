//! Core types for ExtractKit

use crate::diagnostics::Diagnostics;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

/// Sentinel for a required field that could not be resolved from content
pub const UNKNOWN_VALUE: &str = "unknown";

/// Sentinel for required fields when the whole attempt failed
pub const FAILED_VALUE: &str = "extraction failed";

/// Fetched or rendered document payload, prior to structuring
///
/// Created once per extraction attempt and consumed by the structuring
/// phase; never mutated.
#[derive(Debug, Clone)]
pub struct RawContent {
    /// Source URL the payload was fetched from
    pub url: String,
    /// Document body as text
    pub body: String,
    /// Content-Type header value, when the source provides one
    pub content_type: Option<String>,
    /// Time of the successful fetch
    pub fetched_at: DateTime<Utc>,
}

impl RawContent {
    /// Create new content fetched just now
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            content_type: None,
            fetched_at: Utc::now(),
        }
    }

    /// Attach the Content-Type reported by the source
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Payload length in characters
    pub fn len(&self) -> usize {
        self.body.chars().count()
    }

    /// True when the payload is empty
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// JSON-like value produced by extraction
///
/// Maps preserve insertion order, unlike `serde_json::Map`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit absence of a value
    Null,
    /// Boolean
    Bool(bool),
    /// Number (stored as f64)
    Number(f64),
    /// Text
    String(String),
    /// Ordered list
    List(Vec<Value>),
    /// Ordered map
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Text content, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for `Value::Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (name, value) in entries {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

/// Ordered name-to-value record
///
/// Field order follows insertion order, which in turn follows the field
/// set's declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any existing value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// True when the record carries a field with this name
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no fields are present
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterate field names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One candidate selection rule for a logical field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocatorRule {
    /// Text content of the first non-empty element matching a CSS selector
    Text {
        /// CSS selector
        selector: String,
    },
    /// Attribute value of the first matching element that carries it
    Attr {
        /// CSS selector
        selector: String,
        /// Attribute name
        attr: String,
    },
}

/// Ordered candidate rule list for resolving one logical field
///
/// Rules are tried in declared order; the first match wins. No match is a
/// normal outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FieldLocator {
    rules: Vec<LocatorRule>,
}

impl FieldLocator {
    /// Create an empty locator (never matches)
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text rule
    pub fn text(mut self, selector: impl Into<String>) -> Self {
        self.rules.push(LocatorRule::Text {
            selector: selector.into(),
        });
        self
    }

    /// Append an attribute rule
    pub fn attr(mut self, selector: impl Into<String>, attr: impl Into<String>) -> Self {
        self.rules.push(LocatorRule::Attr {
            selector: selector.into(),
            attr: attr.into(),
        });
        self
    }

    /// Candidate rules in declared order
    pub fn rules(&self) -> &[LocatorRule] {
        &self.rules
    }

    /// True when no rules are declared
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Declaration of one logical field in a field set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    /// Field name in the output record
    pub name: String,

    /// Required fields are always present in the output, with a sentinel
    /// value when unresolved
    #[serde(default)]
    pub required: bool,

    /// Human-readable description, forwarded to inference providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Candidate selection rules for the deterministic strategy
    #[serde(default, skip_serializing_if = "FieldLocator::is_empty")]
    pub locator: FieldLocator,
}

impl FieldSpec {
    /// Declare a new optional field
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            description: None,
            locator: FieldLocator::new(),
        }
    }

    /// Mark the field required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the description
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Set the locator
    pub fn locator(mut self, locator: FieldLocator) -> Self {
        self.locator = locator;
        self
    }
}

/// Ordered, closed-world set of fields an extraction produces
///
/// Any field an inference provider returns that is not declared here is
/// discarded. Field sets round-trip through JSON so locator configuration
/// can live in data files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSet {
    fields: Vec<FieldSpec>,
}

impl FieldSet {
    /// Create an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field declaration
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Declared fields in order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a declaration by name
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// True when the name is declared
    pub fn declares(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no fields are declared
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// One line per field, suitable for an inference prompt
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for field in &self.fields {
            out.push_str("- ");
            out.push_str(&field.name);
            if field.required {
                out.push_str(" (required)");
            }
            if let Some(ref description) = field.description {
                out.push_str(": ");
                out.push_str(description);
            }
            out.push('\n');
        }
        out
    }

    /// General-purpose article field set
    ///
    /// Locator chains cover the common markup variants for blog and news
    /// pages; sites with unusual markup should load their own field set.
    pub fn article() -> Self {
        Self::new()
            .field(
                FieldSpec::new("title")
                    .required()
                    .describe("Main page title")
                    .locator(
                        FieldLocator::new()
                            .text("h1")
                            .text(".title")
                            .text("#title")
                            .text(r#"[class*="title"]"#),
                    ),
            )
            .field(
                FieldSpec::new("content")
                    .required()
                    .describe("Primary page content as clean text")
                    .locator(
                        FieldLocator::new()
                            .text(".content")
                            .text("#content")
                            .text("article")
                            .text(".post-content"),
                    ),
            )
            .field(
                FieldSpec::new("author")
                    .describe("Author name or byline")
                    .locator(
                        FieldLocator::new()
                            .text(".author")
                            .text(".by-author")
                            .text(r#"[class*="author"]"#),
                    ),
            )
            .field(
                FieldSpec::new("date")
                    .describe("Publication date")
                    .locator(
                        FieldLocator::new()
                            .attr("time", "datetime")
                            .text("time")
                            .text(".date")
                            .text(".published"),
                    ),
            )
    }
}

/// Final structured record plus embedded diagnostics
///
/// Fully populated on creation and immutable thereafter. Required fields
/// are always present (possibly as a sentinel); optional fields are present
/// only when positively resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// URL the record was extracted from
    pub url: String,
    /// Extracted fields in declaration order
    pub fields: Record,
    /// Execution diagnostics, present on success and failure alike
    pub diagnostics: Diagnostics,
}

impl ExtractionResult {
    /// True when the attempt succeeded
    pub fn succeeded(&self) -> bool {
        self.diagnostics.success
    }

    /// Look up an extracted field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_content_length_in_chars() {
        let content = RawContent::new("https://example.com", "héllo");
        assert_eq!(content.len(), 5);
        assert!(!content.is_empty());
        assert!(RawContent::new("https://example.com", "").is_empty());
    }

    #[test]
    fn test_value_from_json_preserves_shape() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{"name": "a", "count": 2, "tags": ["x", "y"], "missing": null}"#,
        )
        .unwrap();
        let value = Value::from(json);

        let Value::Map(entries) = value else {
            panic!("expected map");
        };
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().any(|(k, v)| k == "name" && v.as_str() == Some("a")));
        assert!(entries.iter().any(|(k, v)| k == "missing" && v.is_null()));
    }

    #[test]
    fn test_value_serializes_to_plain_json() {
        let value = Value::Map(vec![
            ("title".to_string(), Value::String("Hello".to_string())),
            ("tags".to_string(), Value::List(vec![Value::from("a")])),
            ("score".to_string(), Value::Number(1.5)),
            ("draft".to_string(), Value::Bool(false)),
            ("subtitle".to_string(), Value::Null),
        ]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Hello","tags":["a"],"score":1.5,"draft":false,"subtitle":null}"#
        );
    }

    #[test]
    fn test_record_insert_replaces() {
        let mut record = Record::new();
        record.insert("title", Value::from("first"));
        record.insert("author", Value::from("someone"));
        record.insert("title", Value::from("second"));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("title").unwrap().as_str(), Some("second"));
        let names: Vec<&str> = record.names().collect();
        assert_eq!(names, vec!["title", "author"]);
    }

    #[test]
    fn test_record_serializes_in_insertion_order() {
        let mut record = Record::new();
        record.insert("z", Value::from("1"));
        record.insert("a", Value::from("2"));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"z":"1","a":"2"}"#);
    }

    #[test]
    fn test_locator_builder_order() {
        let locator = FieldLocator::new().text("h1").attr("time", "datetime");
        assert_eq!(locator.rules().len(), 2);
        assert_eq!(
            locator.rules()[0],
            LocatorRule::Text {
                selector: "h1".to_string()
            }
        );
    }

    #[test]
    fn test_field_set_round_trips_through_json() {
        let set = FieldSet::article();
        let json = serde_json::to_string(&set).unwrap();
        let back: FieldSet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, back);
    }

    #[test]
    fn test_field_set_from_config_json() {
        let set: FieldSet = serde_json::from_str(
            r#"{"fields": [
                {"name": "title", "required": true,
                 "locator": [{"text": {"selector": "h1"}}]},
                {"name": "hero", "locator": [{"attr": {"selector": "img", "attr": "src"}}]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.get("title").unwrap().required);
        assert!(!set.get("hero").unwrap().required);
        assert!(set.declares("hero"));
        assert!(!set.declares("extra"));
    }

    #[test]
    fn test_field_set_describe() {
        let set = FieldSet::new()
            .field(FieldSpec::new("title").required().describe("Main title"))
            .field(FieldSpec::new("author"));
        let text = set.describe();
        assert!(text.contains("- title (required): Main title"));
        assert!(text.contains("- author"));
    }

    #[test]
    fn test_article_field_set_shape() {
        let set = FieldSet::article();
        assert!(set.get("title").unwrap().required);
        assert!(set.get("content").unwrap().required);
        assert!(!set.get("author").unwrap().required);
        assert!(!set.get("date").unwrap().required);
    }
}
