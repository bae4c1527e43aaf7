//! Pipeline configuration and the single-attempt entry point
//!
//! A [`Pipeline`] is an explicit configuration object built per invocation:
//! content source, optional inference provider, strategy, field set and
//! budgets all live here, never in process-wide state. `extract` wraps the
//! two-phase attempt (fetch, structure) and always returns a well-formed
//! [`ExtractionResult`]; fetch and inference failures are folded into the
//! result's diagnostics instead of propagating.

use crate::batch::{self, BatchResult};
use crate::diagnostics::Recorder;
use crate::error::InferenceError;
use crate::extract::{
    failed_fields, structure_with_inference, structure_with_selectors, Strategy,
    DEFAULT_CONTENT_BUDGET,
};
use crate::inference::InferenceProvider;
use crate::sources::{ContentSource, HttpSource};
use crate::types::{ExtractionResult, FieldSet, RawContent};
use schemars::schema_for;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Default per-attempt fetch timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for [`Pipeline`]
#[derive(Default)]
pub struct PipelineBuilder {
    source: Option<Box<dyn ContentSource>>,
    provider: Option<Arc<dyn InferenceProvider>>,
    strategy: Strategy,
    schema: Option<FieldSet>,
    timeout: Option<Duration>,
    content_budget: Option<usize>,
    concurrency: Option<usize>,
    user_agent: Option<String>,
}

impl PipelineBuilder {
    /// Start from defaults: HTTP source, article field set, selector
    /// strategy, sequential batches
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom content source
    pub fn source(mut self, source: impl ContentSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Attach an inference provider (required for [`Strategy::Inference`])
    pub fn provider(mut self, provider: impl InferenceProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Select the structuring strategy
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the field set to extract
    pub fn schema(mut self, schema: FieldSet) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Set the per-attempt fetch timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the inference content budget, in characters
    pub fn content_budget(mut self, budget: usize) -> Self {
        self.content_budget = Some(budget);
        self
    }

    /// Bound batch parallelism (1 = sequential)
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit.max(1));
        self
    }

    /// User-Agent for the default HTTP source
    ///
    /// Ignored when a custom source is supplied.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        let source = self.source.unwrap_or_else(|| {
            let mut http = HttpSource::new();
            if let Some(user_agent) = self.user_agent {
                http = http.user_agent(user_agent);
            }
            Box::new(http)
        });

        Pipeline {
            source,
            provider: self.provider,
            strategy: self.strategy,
            schema: self.schema.unwrap_or_else(FieldSet::article),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            content_budget: self.content_budget.unwrap_or(DEFAULT_CONTENT_BUDGET),
            concurrency: self.concurrency.unwrap_or(1),
        }
    }
}

/// Configured extraction pipeline
pub struct Pipeline {
    source: Box<dyn ContentSource>,
    provider: Option<Arc<dyn InferenceProvider>>,
    strategy: Strategy,
    schema: FieldSet,
    timeout: Duration,
    content_budget: usize,
    concurrency: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        PipelineBuilder::new().build()
    }
}

impl Pipeline {
    /// Create a new builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The field set this pipeline extracts
    pub fn schema(&self) -> &FieldSet {
        &self.schema
    }

    /// JSON schema describing field-set configuration files
    pub fn schema_json() -> serde_json::Value {
        serde_json::to_value(schema_for!(FieldSet)).unwrap_or_default()
    }

    pub(crate) fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run one complete extraction attempt
    ///
    /// Fetches the URL, structures the content with the configured
    /// strategy, and embeds diagnostics. Never fails: fetch and inference
    /// errors produce a failed result with required fields set to the
    /// failure sentinel.
    pub async fn extract(&self, url: &str) -> ExtractionResult {
        let mut recorder = Recorder::new();

        let started = Instant::now();
        let fetched = self.source.fetch(url, self.timeout).await;
        recorder.record_fetch(started.elapsed());

        match fetched {
            Ok(content) => self.structure(content, recorder).await,
            Err(err) => {
                warn!(%url, error = %err, "fetch failed");
                recorder.note(err.to_string());
                ExtractionResult {
                    url: url.to_string(),
                    fields: failed_fields(&self.schema),
                    diagnostics: recorder.finish(false),
                }
            }
        }
    }

    /// Structure content that was fetched elsewhere
    ///
    /// The fetch phase is recorded as zero; everything else behaves like
    /// [`Pipeline::extract`].
    pub async fn extract_content(&self, content: RawContent) -> ExtractionResult {
        self.structure(content, Recorder::new()).await
    }

    async fn structure(&self, content: RawContent, mut recorder: Recorder) -> ExtractionResult {
        recorder.record_content_length(content.len());
        let url = content.url.clone();

        let started = Instant::now();
        let outcome = match self.strategy {
            Strategy::Selectors => Ok(structure_with_selectors(&content, &self.schema)),
            Strategy::Inference => match self.provider {
                Some(ref provider) => {
                    structure_with_inference(
                        &content,
                        &self.schema,
                        provider.as_ref(),
                        self.content_budget,
                        &mut recorder,
                    )
                    .await
                }
                None => Err(InferenceError::Provider(
                    "no inference provider configured".to_string(),
                )),
            },
        };
        recorder.record_structure(started.elapsed());

        match outcome {
            Ok(fields) => ExtractionResult {
                url,
                fields,
                diagnostics: recorder.finish(true),
            },
            Err(err) => {
                warn!(%url, error = %err, "structuring failed");
                recorder.note(err.to_string());
                ExtractionResult {
                    url,
                    fields: failed_fields(&self.schema),
                    diagnostics: recorder.finish(false),
                }
            }
        }
    }

    /// Run the pipeline over many URLs
    ///
    /// One result per input in input order; a failed item never halts or
    /// removes its siblings.
    pub async fn run_batch(&self, urls: &[String]) -> BatchResult {
        batch::run(self, urls).await
    }
}
