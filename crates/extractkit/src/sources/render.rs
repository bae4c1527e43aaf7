//! Browser-rendered content source
//!
//! The browser engine itself is an external collaborator behind the
//! [`PageDriver`] trait; this module owns the policy around it: wait for a
//! readiness selector instead of sleeping blindly, run pre-capture actions
//! (popup dismissal, form fill), optionally settle for deferred rendering,
//! and drive infinite scroll to convergence. The driver sits behind a
//! mutex so one session is never shared by two in-flight extractions.

use crate::error::FetchError;
use crate::sources::ContentSource;
use crate::types::RawContent;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Interaction performed on a rendered page before capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    /// Click the first element matching the selector
    Click {
        /// CSS selector
        selector: String,
    },
    /// Clear and type into the first element matching the selector
    Fill {
        /// CSS selector
        selector: String,
        /// Text to enter
        value: String,
    },
    /// Submit the form containing the first element matching the selector
    Submit {
        /// CSS selector
        selector: String,
    },
}

/// Browser automation collaborator
///
/// One driver is one logical browser session. All methods take `&mut self`;
/// [`RenderSource`] serializes access through its own mutex.
#[async_trait]
pub trait PageDriver: Send {
    /// Navigate the session to a URL
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError>;

    /// Current rendered document as text
    async fn content(&mut self) -> Result<String, FetchError>;

    /// Wait until an element matching the selector is present
    ///
    /// Fails with [`FetchError::RenderTimeout`] when the budget expires
    /// before the element appears.
    async fn wait_for(&mut self, selector: &str, budget: Duration) -> Result<(), FetchError>;

    /// Scroll to the bottom of the page, triggering deferred rendering
    async fn scroll_to_bottom(&mut self) -> Result<(), FetchError>;

    /// Number of elements currently matching the selector
    async fn count(&mut self, selector: &str) -> Result<usize, FetchError>;

    /// Perform an interaction
    async fn perform(&mut self, action: &PageAction) -> Result<(), FetchError>;

    /// Allow deferred script-driven rendering to complete
    ///
    /// The default implementation sleeps on the tokio clock, so tests can
    /// drive it with a paused clock or override it entirely.
    async fn settle(&mut self, wait: Duration) -> Result<(), FetchError> {
        tokio::time::sleep(wait).await;
        Ok(())
    }
}

/// Bounds for the infinite-scroll convergence loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollPolicy {
    /// Hard cap on scroll rounds
    pub max_rounds: usize,
    /// Selector counting loaded items, for the `max_items` budget
    pub item_selector: Option<String>,
    /// Stop once this many items are present
    pub max_items: Option<usize>,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            max_rounds: 20,
            item_selector: None,
            max_items: None,
        }
    }
}

impl ScrollPolicy {
    /// Policy bounded only by content stability and the round cap
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the round cap
    pub fn max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Stop once `max` elements match `selector`
    pub fn max_items(mut self, selector: impl Into<String>, max: usize) -> Self {
        self.item_selector = Some(selector.into());
        self.max_items = Some(max);
        self
    }
}

/// Scroll until content stops growing
///
/// After each scroll round the rendered content length is observed; the
/// loop terminates as soon as two consecutive observations are equal, when
/// the round cap is reached, or when the item budget is met. Deterministic
/// on stable content.
pub async fn scroll_to_end<D: PageDriver + ?Sized>(
    driver: &mut D,
    policy: &ScrollPolicy,
) -> Result<(), FetchError> {
    let mut last_length: Option<usize> = None;

    for round in 0..policy.max_rounds {
        if let (Some(selector), Some(max)) = (&policy.item_selector, policy.max_items) {
            if driver.count(selector).await? >= max {
                debug!(round, max, "scroll stopped: item budget met");
                return Ok(());
            }
        }

        driver.scroll_to_bottom().await?;
        let length = driver.content().await?.chars().count();
        if last_length == Some(length) {
            debug!(round, length, "scroll converged: no growth");
            return Ok(());
        }
        last_length = Some(length);
    }

    debug!(rounds = policy.max_rounds, "scroll stopped: round cap");
    Ok(())
}

/// Content source for JavaScript-rendered pages
///
/// Capture sequence: navigate, wait for the readiness selector, perform
/// actions, settle, scroll to convergence, read the document.
pub struct RenderSource<D> {
    driver: Mutex<D>,
    wait_selector: Option<String>,
    actions: Vec<PageAction>,
    settle: Option<Duration>,
    scroll: Option<ScrollPolicy>,
}

impl<D: PageDriver> RenderSource<D> {
    /// Wrap a driver session
    pub fn new(driver: D) -> Self {
        Self {
            driver: Mutex::new(driver),
            wait_selector: None,
            actions: Vec::new(),
            settle: None,
            scroll: None,
        }
    }

    /// Wait for this selector before considering the page ready
    pub fn wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_selector = Some(selector.into());
        self
    }

    /// Append a pre-capture interaction
    pub fn action(mut self, action: PageAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Allow this much extra time for deferred rendering
    pub fn settle(mut self, wait: Duration) -> Self {
        self.settle = Some(wait);
        self
    }

    /// Scroll to convergence before capture
    pub fn scroll(mut self, policy: ScrollPolicy) -> Self {
        self.scroll = Some(policy);
        self
    }
}

#[async_trait]
impl<D: PageDriver> ContentSource for RenderSource<D> {
    fn name(&self) -> &'static str {
        "render"
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<RawContent, FetchError> {
        let mut driver = self.driver.lock().await;

        driver.navigate(url).await?;
        if let Some(ref selector) = self.wait_selector {
            driver.wait_for(selector, timeout).await?;
        }
        for action in &self.actions {
            driver.perform(action).await?;
        }
        if let Some(wait) = self.settle {
            driver.settle(wait).await?;
        }
        if let Some(ref policy) = self.scroll {
            scroll_to_end(&mut *driver, policy).await?;
        }

        let body = driver.content().await?;
        debug!(%url, length = body.len(), "rendered");
        Ok(RawContent::new(url, body))
    }
}
