//! ExtractKit - structured web content extraction pipeline
//!
//! This crate turns unstructured documents (static HTML or browser-rendered
//! pages) into well-defined structured records through ordered fallback
//! selection, with an alternative LLM-inference strategy behind the same
//! contract, and execution diagnostics attached to every result.
//!
//! ## Pipeline
//!
//! A [`Pipeline`] composes a [`ContentSource`] (HTTP or rendered), a
//! [`FieldSet`] describing the record to produce, and a structuring
//! [`Strategy`]. Extraction never fails past the pipeline boundary: fetch
//! and inference errors are folded into a failed [`ExtractionResult`]
//! whose [`Diagnostics`] carry the error list.
//!
//! ```no_run
//! use extractkit::Pipeline;
//!
//! # async fn run() {
//! let pipeline = Pipeline::default();
//! let result = pipeline.extract("https://example.com/post").await;
//! println!("{}", result.get("title").and_then(|v| v.as_str()).unwrap_or("?"));
//! # }
//! ```
//!
//! Batches keep input order and isolate per-item failure:
//!
//! ```no_run
//! # async fn run(urls: Vec<String>) {
//! let pipeline = extractkit::Pipeline::builder().concurrency(4).build();
//! let batch = pipeline.run_batch(&urls).await;
//! println!("{}", batch.summary());
//! # }
//! ```

mod batch;
mod diagnostics;
mod error;
mod export;
mod extract;
mod inference;
pub mod page;
mod pipeline;
mod resolve;
pub mod sources;
mod types;

pub use batch::{BatchResult, BatchSummary};
pub use diagnostics::{Diagnostics, Recorder};
pub use error::{FetchError, InferenceError};
pub use export::{to_csv_string, write_csv};
pub use extract::{structure_with_selectors, Strategy, DEFAULT_CONTENT_BUDGET};
pub use inference::{InferenceProvider, StaticProvider, EXTRACTION_INSTRUCTIONS};
pub use page::{images, links, table, Image, Link};
pub use pipeline::{Pipeline, PipelineBuilder, DEFAULT_TIMEOUT};
pub use resolve::{resolve, Resolver};
pub use sources::{
    scroll_to_end, ContentSource, HttpSource, PageAction, PageDriver, RenderSource, ScrollPolicy,
};
pub use types::{
    ExtractionResult, FieldLocator, FieldSet, FieldSpec, LocatorRule, RawContent, Record, Value,
    FAILED_VALUE, UNKNOWN_VALUE,
};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "ExtractKit/1.0";
