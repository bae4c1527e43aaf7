//! Content sources
//!
//! A content source turns a URL into [`RawContent`] within a timeout. Two
//! implementations ship with the crate: [`HttpSource`] for static pages and
//! [`RenderSource`] for JavaScript-rendered pages behind a [`PageDriver`].
//! Both present a complete-before-return contract (no content is visible
//! mid-fetch) and neither retains any handle beyond the call.

mod http;
mod render;

pub use http::HttpSource;
pub use render::{scroll_to_end, PageAction, PageDriver, RenderSource, ScrollPolicy};

use crate::error::FetchError;
use crate::types::RawContent;
use async_trait::async_trait;
use std::time::Duration;

/// Abstracts fetch-and-render of a target resource into raw content
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Retrieve the resource, completing within `timeout`
    ///
    /// On success the returned content carries the fetch timestamp and the
    /// payload as text. Failure is local to this call; the source holds no
    /// state across calls.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<RawContent, FetchError>;
}
