//! Batch orchestration
//!
//! Runs the pipeline over many URLs with isolated per-item failure: one
//! result per input, in input order, whether items ran sequentially or
//! under bounded parallelism.

use crate::pipeline::Pipeline;
use crate::types::ExtractionResult;
use futures::StreamExt;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Results of a batch run, one entry per input URL in input order
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    results: Vec<ExtractionResult>,
}

impl BatchResult {
    /// All results in input order
    pub fn results(&self) -> &[ExtractionResult] {
        &self.results
    }

    /// First result recorded for a URL
    pub fn get(&self, url: &str) -> Option<&ExtractionResult> {
        self.results.iter().find(|result| result.url == url)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when the batch had no inputs
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterate results in input order
    pub fn iter(&self) -> impl Iterator<Item = &ExtractionResult> {
        self.results.iter()
    }

    /// Success count against the total, without altering any result
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            succeeded: self.results.iter().filter(|r| r.succeeded()).count(),
            total: self.results.len(),
        }
    }
}

/// Aggregate success count for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Items whose diagnostics report success
    pub succeeded: usize,
    /// Items in the batch
    pub total: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} succeeded", self.succeeded, self.total)
    }
}

/// Process every URL, preserving input order in the output
pub(crate) async fn run(pipeline: &Pipeline, urls: &[String]) -> BatchResult {
    let concurrency = pipeline.concurrency();

    let results = if concurrency <= 1 {
        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            info!(%url, "extracting");
            results.push(pipeline.extract(url).await);
        }
        results
    } else {
        // `buffered` yields in input order regardless of completion order.
        futures::stream::iter(urls)
            .map(|url| pipeline.extract(url))
            .buffered(concurrency)
            .collect()
            .await
    };

    BatchResult { results }
}
