//! Per-attempt execution diagnostics
//!
//! Every extraction attempt produces exactly one [`Diagnostics`] instance,
//! built by a [`Recorder`] that accumulates phase timings and notes while
//! the attempt runs. Phase timings are recorded even when a phase fails;
//! the duration then covers the work up to the failure point.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Execution diagnostics attached to every extraction result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostics {
    /// Elapsed fetch phase in milliseconds
    pub fetch_ms: u64,

    /// Elapsed structuring phase in milliseconds
    pub structure_ms: u64,

    /// Total elapsed milliseconds (fetch + structuring)
    pub total_ms: u64,

    /// Raw content length in characters (0 when the fetch failed)
    pub content_length: usize,

    /// Attempt completion time, RFC 3339
    pub timestamp: String,

    /// True when the attempt produced a positively resolved record
    pub success: bool,

    /// Error and informational notes in the order they occurred
    pub errors: Vec<String>,
}

/// Accumulates diagnostics for one extraction attempt
///
/// Consumed by [`Recorder::finish`]; the resulting [`Diagnostics`] is
/// immutable.
#[derive(Debug, Default)]
pub struct Recorder {
    fetch: Duration,
    structure: Duration,
    content_length: usize,
    errors: Vec<String>,
}

impl Recorder {
    /// Start recording a new attempt
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the elapsed fetch phase
    pub fn record_fetch(&mut self, elapsed: Duration) {
        self.fetch = elapsed;
    }

    /// Record the elapsed structuring phase
    pub fn record_structure(&mut self, elapsed: Duration) {
        self.structure = elapsed;
    }

    /// Record the raw content length
    pub fn record_content_length(&mut self, length: usize) {
        self.content_length = length;
    }

    /// Append an error or informational note
    pub fn note(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Stamp the completion time and produce the final diagnostics
    pub fn finish(self, success: bool) -> Diagnostics {
        let fetch_ms = self.fetch.as_millis() as u64;
        let structure_ms = self.structure.as_millis() as u64;
        Diagnostics {
            fetch_ms,
            structure_ms,
            total_ms: fetch_ms + structure_ms,
            content_length: self.content_length,
            timestamp: Utc::now().to_rfc3339(),
            success,
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_covers_both_phases() {
        let mut recorder = Recorder::new();
        recorder.record_fetch(Duration::from_millis(5));
        recorder.record_structure(Duration::from_millis(7));
        let diagnostics = recorder.finish(true);

        assert_eq!(diagnostics.fetch_ms, 5);
        assert_eq!(diagnostics.structure_ms, 7);
        assert_eq!(diagnostics.total_ms, 12);
        assert!(diagnostics.total_ms >= diagnostics.fetch_ms);
        assert!(diagnostics.total_ms >= diagnostics.structure_ms);
        assert!(diagnostics.success);
        assert!(diagnostics.errors.is_empty());
    }

    #[test]
    fn test_partial_diagnostics_on_failure() {
        let mut recorder = Recorder::new();
        recorder.record_fetch(Duration::from_millis(30));
        recorder.note("request timed out");
        let diagnostics = recorder.finish(false);

        assert_eq!(diagnostics.fetch_ms, 30);
        assert_eq!(diagnostics.structure_ms, 0);
        assert_eq!(diagnostics.total_ms, 30);
        assert_eq!(diagnostics.content_length, 0);
        assert!(!diagnostics.success);
        assert_eq!(diagnostics.errors, vec!["request timed out".to_string()]);
    }

    #[test]
    fn test_notes_keep_order() {
        let mut recorder = Recorder::new();
        recorder.note("first");
        recorder.note("second");
        let diagnostics = recorder.finish(false);
        assert_eq!(diagnostics.errors, vec!["first", "second"]);
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let diagnostics = Recorder::new().finish(true);
        assert!(chrono::DateTime::parse_from_rfc3339(&diagnostics.timestamp).is_ok());
    }
}
