// Assertions - Auto-retry assertions over element contexts
//
// Provides the expect() API: each assertion re-resolves the locator and
// retries until it passes or times out, so UI that has not settled yet
// does not fail the test.

use crate::condition::{Attempt, Cardinality, ElementCriteriaCondition};
use crate::context::{ElementContext, ElementHandle};
use crate::error::{Error, Result};
use crate::locator::Locator;
use std::time::Duration;

/// Default timeout for assertions (5 seconds)
const DEFAULT_ASSERTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Default polling interval for assertions (100ms)
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Creates an expectation for a locator with auto-retry behavior.
///
/// Assertions retry until they pass or time out (default: 5 seconds).
///
/// # Example
///
/// ```ignore
/// use vigil_rs::{Locator, expect};
/// use std::time::Duration;
///
/// expect(&page, Locator::css("#save")).to_be_visible().await?;
/// expect(&page, Locator::css("#save")).not().to_be_disabled().await?;
/// expect(&page, Locator::css(".status"))
///     .with_timeout(Duration::from_secs(10))
///     .to_have_text("Saved")
///     .await?;
/// ```
pub fn expect<C: ElementContext>(ctx: &C, locator: Locator) -> Expectation<'_, C> {
    Expectation::new(ctx, locator)
}

/// Expectation wraps a context and locator and provides assertion methods
/// with auto-retry.
pub struct Expectation<'c, C: ElementContext> {
    ctx: &'c C,
    locator: Locator,
    timeout: Duration,
    poll_interval: Duration,
    negate: bool,
}

// Allow clippy::wrong_self_convention for to_* methods that consume self
// This matches the expect API pattern where assertions are chained and consumed
#[allow(clippy::wrong_self_convention)]
impl<'c, C: ElementContext> Expectation<'c, C> {
    pub(crate) fn new(ctx: &'c C, locator: Locator) -> Self {
        Self {
            ctx,
            locator,
            timeout: DEFAULT_ASSERTION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            negate: false,
        }
    }

    /// Sets a custom timeout for this assertion.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets a custom poll interval for this assertion.
    ///
    /// Default is 100ms.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Negates the assertion.
    #[allow(clippy::should_implement_trait)]
    pub fn not(mut self) -> Self {
        self.negate = true;
        self
    }

    /// Asserts that a visible element matches the locator.
    ///
    /// This assertion will retry until the element becomes visible or timeout.
    pub async fn to_be_visible(self) -> Result<()> {
        let start = tokio::time::Instant::now();
        let selector = self.locator.to_string();
        let condition = ElementCriteriaCondition::<C::Handle>::new(self.locator.clone())
            .cardinality(Cardinality::FirstMatch);

        loop {
            let is_visible = condition.evaluate(self.ctx).await?.is_found();

            let matches = if self.negate { !is_visible } else { is_visible };

            if matches {
                return Ok(());
            }

            if start.elapsed() >= self.timeout {
                let message = if self.negate {
                    format!(
                        "Expected element '{}' NOT to be visible, but it was visible after {:?}",
                        selector, self.timeout
                    )
                } else {
                    format!(
                        "Expected element '{}' to be visible, but it was not visible after {:?}",
                        selector, self.timeout
                    )
                };
                return Err(Error::AssertionTimeout(message));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Asserts that no visible element matches the locator.
    pub async fn to_be_hidden(self) -> Result<()> {
        // to_be_hidden is the opposite of to_be_visible
        let negated = Expectation {
            negate: !self.negate,
            ..self
        };
        negated.to_be_visible().await
    }

    /// Asserts that the element is enabled for interaction.
    ///
    /// This assertion will retry until the element is enabled or timeout.
    pub async fn to_be_enabled(self) -> Result<()> {
        let start = tokio::time::Instant::now();
        let selector = self.locator.to_string();
        let condition = ElementCriteriaCondition::<C::Handle>::new(self.locator.clone())
            .displayed(false)
            .cardinality(Cardinality::FirstMatch);

        loop {
            let is_enabled = match condition.evaluate(self.ctx).await? {
                Attempt::Found(matched) => match matched.into_first() {
                    Some(handle) => match handle.is_enabled().await {
                        Ok(enabled) => enabled,
                        Err(err) if err.is_transient() => false,
                        Err(err) => return Err(err),
                    },
                    None => false,
                },
                Attempt::NotYet(_) => false,
            };

            let matches = if self.negate { !is_enabled } else { is_enabled };

            if matches {
                return Ok(());
            }

            if start.elapsed() >= self.timeout {
                let message = if self.negate {
                    format!(
                        "Expected element '{}' NOT to be enabled, but it was enabled after {:?}",
                        selector, self.timeout
                    )
                } else {
                    format!(
                        "Expected element '{}' to be enabled, but it was not enabled after {:?}",
                        selector, self.timeout
                    )
                };
                return Err(Error::AssertionTimeout(message));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Asserts that the element is disabled.
    pub async fn to_be_disabled(self) -> Result<()> {
        // to_be_disabled is the opposite of to_be_enabled
        let negated = Expectation {
            negate: !self.negate,
            ..self
        };
        negated.to_be_enabled().await
    }

    /// Asserts that the element has the specified text content (exact match).
    ///
    /// This assertion will retry until the element has the exact text or
    /// timeout. Text is trimmed before comparison.
    pub async fn to_have_text(self, expected: &str) -> Result<()> {
        let expectation = format!("have text '{}'", expected.trim());
        let expected = expected.trim().to_string();
        self.text_assertion(move |actual| actual == expected, expectation)
            .await
    }

    /// Asserts that the element contains the specified text (substring match).
    pub async fn to_contain_text(self, expected: &str) -> Result<()> {
        let expectation = format!("contain text '{expected}'");
        let needle = expected.to_string();
        self.text_assertion(move |actual| actual.contains(needle.as_str()), expectation)
            .await
    }

    /// Asserts that the element's text matches the specified regex pattern.
    pub async fn to_match_text(self, pattern: &str) -> Result<()> {
        let re = regex::Regex::new(pattern)
            .map_err(|e| Error::InvalidArgument(format!("Invalid regex: {}", e)))?;
        let expectation = format!("match pattern '{pattern}'");
        self.text_assertion(move |actual| re.is_match(actual), expectation)
            .await
    }

    /// Shared retry loop for the text assertions: resolve the first
    /// matching element, read its text, compare.
    async fn text_assertion<M>(self, matches_text: M, expectation: String) -> Result<()>
    where
        M: Fn(&str) -> bool,
    {
        let start = tokio::time::Instant::now();
        let selector = self.locator.to_string();
        let condition = ElementCriteriaCondition::<C::Handle>::new(self.locator.clone())
            .displayed(false)
            .cardinality(Cardinality::FirstMatch);
        let mut last_actual: Option<String> = None;

        loop {
            let actual = match condition.evaluate(self.ctx).await? {
                Attempt::Found(matched) => match matched.into_first() {
                    Some(handle) => match handle.text().await {
                        Ok(text) => Some(text.trim().to_string()),
                        Err(err) if err.is_transient() => None,
                        Err(err) => return Err(err),
                    },
                    None => None,
                },
                Attempt::NotYet(_) => None,
            };

            let is_match = actual.as_deref().map(&matches_text).unwrap_or(false);
            if let Some(actual) = actual {
                last_actual = Some(actual);
            }

            let matches = if self.negate { !is_match } else { is_match };

            if matches {
                return Ok(());
            }

            if start.elapsed() >= self.timeout {
                let actual = last_actual.unwrap_or_else(|| "<no matching element>".to_string());
                let message = if self.negate {
                    format!(
                        "Expected element '{}' NOT to {}, but it did after {:?}",
                        selector, expectation, self.timeout
                    )
                } else {
                    format!(
                        "Expected element '{}' to {}, but had '{}' after {:?}",
                        selector, expectation, actual, self.timeout
                    )
                };
                return Err(Error::AssertionTimeout(message));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
