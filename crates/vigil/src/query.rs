// Query - fluent construction of element waits
//
// The layer page actions and verification helpers go through: build the
// criteria, pick a terminal operation, get back handles. Uniqueness is a
// property of the terminal operation, never a flag: single() always
// enforces it, first() and all() never do.

use crate::condition::{Attempt, Cardinality, ElementCriteriaCondition, Match};
use crate::context::ElementContext;
use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::wait::{RetryPolicy, wait_until, wait_until_not};
use regex::Regex;
use tokio::time::Instant;

/// Starts a query for elements under the context.
///
/// # Examples
///
/// ```ignore
/// use vigil_rs::{Locator, query};
///
/// // Wait for the unique save button and click it atomically.
/// let button = query(&page, Locator::css("button"))
///     .with_exact_text("Save")
///     .clickable(true)
///     .single()
///     .await?;
///
/// // All visible grid rows, waiting until at least one renders.
/// let rows = query(&page, Locator::css(".grid-row")).all().await?;
///
/// // Short probe that never raises on absence.
/// if query(&page, Locator::css(".spinner")).exists().await? {
///     query(&page, Locator::css(".spinner")).until_not_visible().await?;
/// }
/// ```
pub fn query<C: ElementContext>(ctx: &C, locator: Locator) -> Query<'_, C> {
    Query {
        ctx,
        condition: ElementCriteriaCondition::new(locator),
        policy: None,
        message: None,
    }
}

/// Builder for one element wait. Construct via [`query`].
pub struct Query<'c, C: ElementContext> {
    ctx: &'c C,
    condition: ElementCriteriaCondition<C::Handle>,
    policy: Option<RetryPolicy>,
    message: Option<String>,
}

impl<'c, C: ElementContext> Query<'c, C> {
    /// Requires candidate text to contain the string.
    pub fn with_text(mut self, expected: impl Into<String>) -> Self {
        self.condition = self.condition.with_text(expected);
        self
    }

    /// Requires candidate text to equal the string exactly.
    pub fn with_exact_text(mut self, expected: impl Into<String>) -> Self {
        self.condition = self.condition.with_exact_text(expected);
        self
    }

    /// Requires candidate text to match the pattern.
    pub fn with_text_matching(mut self, pattern: Regex) -> Self {
        self.condition = self.condition.with_text_matching(pattern);
        self
    }

    /// Whether candidates must be visible. Default true.
    pub fn displayed(mut self, required: bool) -> Self {
        self.condition = self.condition.displayed(required);
        self
    }

    /// Whether candidates must be enabled for interaction. Default false.
    pub fn clickable(mut self, required: bool) -> Self {
        self.condition = self.condition.clickable(required);
        self
    }

    /// Adds a custom async predicate over a candidate handle.
    pub fn filtered_by<F, Fut>(mut self, filter: F) -> Self
    where
        F: Fn(C::Handle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        self.condition = self.condition.filtered_by(filter);
        self
    }

    /// Registers a side-effecting callback retried atomically with the
    /// find (see [`ElementCriteriaCondition::on_match`]).
    pub fn on_match<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(Match<C::Handle>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.condition = self.condition.on_match(callback);
        self
    }

    /// Overrides the retry policy for this query.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Overrides the timeout, keeping the current poll interval.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        let mut policy = self.policy.unwrap_or_default();
        policy.timeout = timeout;
        self.policy = Some(policy);
        self
    }

    /// Overrides the sleep between poll attempts.
    pub fn with_poll_interval(mut self, interval: std::time::Duration) -> Self {
        let mut policy = self.policy.unwrap_or_default();
        policy.poll_interval = interval;
        self.policy = Some(policy);
        self
    }

    /// Sets the intent message embedded in a timeout error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Waits for exactly one qualifying element. Two or more raise the
    /// ambiguous-match error immediately, without waiting the ambiguity
    /// out.
    pub async fn single(self) -> Result<C::Handle> {
        let condition = self.condition.cardinality(Cardinality::RequireUnique);
        let message = self
            .message
            .unwrap_or_else(|| format!("waiting for exactly one {}", condition.describe()));
        let policy = self.policy.unwrap_or_default();
        let matched = wait_until(self.ctx, &condition, &message, policy).await?;
        matched
            .into_first()
            .ok_or_else(|| Error::Backend("unique match resolved to an empty set".to_string()))
    }

    /// Waits for the first qualifying element, ignoring duplicates.
    pub async fn first(self) -> Result<C::Handle> {
        let condition = self.condition.cardinality(Cardinality::FirstMatch);
        let message = self
            .message
            .unwrap_or_else(|| format!("waiting for {}", condition.describe()));
        let policy = self.policy.unwrap_or_default();
        let matched = wait_until(self.ctx, &condition, &message, policy).await?;
        matched
            .into_first()
            .ok_or_else(|| Error::Backend("first match resolved to an empty set".to_string()))
    }

    /// Waits until at least one element qualifies, then returns them all.
    pub async fn all(self) -> Result<Vec<C::Handle>> {
        let condition = self.condition.cardinality(Cardinality::All);
        let message = self
            .message
            .unwrap_or_else(|| format!("waiting for at least one {}", condition.describe()));
        let policy = self.policy.unwrap_or_default();

        let start = Instant::now();
        let mut last_report = None;
        loop {
            match condition.evaluate(self.ctx).await {
                Ok(Attempt::Found(matched)) => {
                    if !matched.is_empty() {
                        return Ok(matched.into_all());
                    }
                }
                Ok(Attempt::NotYet(report)) => {
                    if !report.is_empty() {
                        last_report = Some(report);
                    }
                }
                Err(err) if err.is_transient() => {}
                Err(err) => return Err(err),
            }
            if start.elapsed() >= policy.timeout {
                let detail = match &last_report {
                    Some(report) => format!(" (after {:?}; last attempt: {report})", policy.timeout),
                    None => format!(" (after {:?})", policy.timeout),
                };
                return Err(Error::WaitTimeout(format!("{message}{detail}")));
            }
            tokio::time::sleep(policy.poll_interval).await;
        }
    }

    /// Single evaluation, no waiting: whatever qualifies right now,
    /// possibly nothing.
    pub async fn all_now(self) -> Result<Vec<C::Handle>> {
        let condition = self.condition.cardinality(Cardinality::All);
        match condition.evaluate(self.ctx).await? {
            Attempt::Found(matched) => Ok(matched.into_all()),
            Attempt::NotYet(_) => Ok(Vec::new()),
        }
    }

    /// Short probe: true if a qualifying element shows up within the
    /// probe window, false otherwise. Absence is an answer, not an error.
    pub async fn exists(self) -> Result<bool> {
        let condition = self.condition.cardinality(Cardinality::FirstMatch);
        let message = self
            .message
            .unwrap_or_else(|| format!("probing for {}", condition.describe()));
        let policy = self.policy.unwrap_or_else(RetryPolicy::probe);
        match wait_until(self.ctx, &condition, &message, policy).await {
            Ok(_) => Ok(true),
            Err(Error::WaitTimeout(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Waits until no element qualifies any more.
    pub async fn until_not_visible(self) -> Result<()> {
        let condition = self.condition.cardinality(Cardinality::FirstMatch);
        let message = self
            .message
            .unwrap_or_else(|| format!("waiting for {} to disappear", condition.describe()));
        let policy = self.policy.unwrap_or_default();
        wait_until_not(self.ctx, &condition, &message, policy).await
    }
}

/// Waits for the first visible element under the locator.
pub async fn until_visible<C: ElementContext>(ctx: &C, locator: Locator) -> Result<C::Handle> {
    query(ctx, locator).first().await
}

/// Waits until no visible element remains under the locator.
pub async fn until_not_visible<C: ElementContext>(ctx: &C, locator: Locator) -> Result<()> {
    query(ctx, locator).until_not_visible().await
}
