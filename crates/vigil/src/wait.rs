// Polling driver - bounded-retry evaluation of conditions
//
// The driver owns timing; conditions own matching. Within one wait,
// attempts are strictly sequential: attempt N+1 never starts before
// attempt N's evaluation (including any on-match callback) has returned
// or raised. There is no external cancellation; a wait ends only by
// success, timeout, or a fatal error.

use crate::condition::{Attempt, ElementCriteriaCondition, Match, RejectionReport};
use crate::context::{ElementContext, ElementHandle};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Default ceiling for DOM waits.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default ceiling for "check, don't wait" visibility probes.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default sleep between poll attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default attempt count for count-bounded assertion polling.
pub const DEFAULT_RETRIES: u32 = 60;

/// Default sleep between count-bounded attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Wall-clock budget and poll interval for one wait.
///
/// Passed explicitly into every wait operation; the process-wide defaults
/// live in [`WaitConfig`](crate::WaitConfig), constructed once at startup
/// and threaded through as values, never read ad hoc inside the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl RetryPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Short policy for visibility probes that should not block long.
    pub fn probe() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_TIMEOUT)
    }
}

/// A predicate the polling driver can evaluate against a context.
///
/// Implemented by [`ElementCriteriaCondition`] for DOM queries; callers
/// with non-DOM conditions implement it directly or use
/// [`until_condition_met`] for count-bounded assertion polling.
///
/// [`ElementCriteriaCondition`]: crate::ElementCriteriaCondition
#[async_trait]
pub trait PollCondition<C: Send + Sync + ?Sized>: Send + Sync {
    type Output: Send;

    async fn evaluate(&self, ctx: &C) -> Result<Attempt<Self::Output>>;
}

#[async_trait]
impl<C, H> PollCondition<C> for ElementCriteriaCondition<H>
where
    C: ElementContext<Handle = H> + ?Sized,
    H: ElementHandle,
{
    type Output = Match<H>;

    async fn evaluate(&self, ctx: &C) -> Result<Attempt<Match<H>>> {
        ElementCriteriaCondition::evaluate(self, ctx).await
    }
}

/// Repeatedly evaluates the condition until it is satisfied or the policy
/// timeout elapses.
///
/// A satisfied attempt returns its value immediately, with no trailing
/// sleep. A "not yet" attempt, or a transient error, sleeps the poll
/// interval and retries. On timeout the raised [`Error::WaitTimeout`]
/// embeds `message` verbatim plus the last attempt's rejection breakdown.
/// Any non-transient error propagates immediately, aborting the wait.
pub async fn wait_until<C, P>(
    ctx: &C,
    condition: &P,
    message: &str,
    policy: RetryPolicy,
) -> Result<P::Output>
where
    C: Send + Sync + ?Sized,
    P: PollCondition<C>,
{
    let start = Instant::now();
    let mut last_report: Option<RejectionReport> = None;
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        match condition.evaluate(ctx).await {
            Ok(Attempt::Found(value)) => {
                tracing::debug!(attempt, "wait satisfied");
                return Ok(value);
            }
            Ok(Attempt::NotYet(report)) => {
                if !report.is_empty() {
                    last_report = Some(report);
                }
            }
            Err(err) if err.is_transient() => {
                tracing::trace!(attempt, error = %err, "transient error, counted as non-match");
            }
            Err(err) => return Err(err),
        }

        if start.elapsed() >= policy.timeout {
            return Err(Error::WaitTimeout(timeout_message(
                message,
                policy.timeout,
                last_report.as_ref(),
            )));
        }
        tokio::time::sleep(policy.poll_interval).await;
    }
}

/// Symmetric counterpart of [`wait_until`]: returns as soon as the
/// condition stops matching, times out if it keeps matching.
///
/// A transient error counts as "stopped matching": a handle that went
/// stale is gone from the page.
pub async fn wait_until_not<C, P>(
    ctx: &C,
    condition: &P,
    message: &str,
    policy: RetryPolicy,
) -> Result<()>
where
    C: Send + Sync + ?Sized,
    P: PollCondition<C>,
{
    let start = Instant::now();
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        match condition.evaluate(ctx).await {
            Ok(Attempt::NotYet(_)) => {
                tracing::debug!(attempt, "condition stopped matching");
                return Ok(());
            }
            Ok(Attempt::Found(_)) => {}
            Err(err) if err.is_transient() => {
                tracing::debug!(attempt, error = %err, "transient error, condition treated as gone");
                return Ok(());
            }
            Err(err) => return Err(err),
        }

        if start.elapsed() >= policy.timeout {
            return Err(Error::WaitTimeout(format!(
                "{message} (still satisfied after {:?})",
                policy.timeout
            )));
        }
        tokio::time::sleep(policy.poll_interval).await;
    }
}

/// Count-bounded retry of an assertion-based check, for consistency waits
/// that are not DOM-aware (e.g. REST state catching up).
///
/// Only assertion failures are retried, including ones wrapped with
/// [`Error::context`]; after exactly `retries` invocations the last
/// assertion error propagates with its real message, not a generic
/// timeout. Any other error propagates immediately: a business rule not
/// yet satisfied is distinguishable from something being broken.
pub async fn until_condition_met<T, F, Fut>(
    mut condition: F,
    retries: u32,
    interval: Duration,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let retries = retries.max(1);
    let mut attempt: u32 = 1;
    loop {
        match condition().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_assertion() => {
                if attempt >= retries {
                    return Err(err);
                }
                tracing::debug!(attempt, retries, error = %err, "condition not met, retrying");
            }
            Err(err) => return Err(err),
        }
        attempt += 1;
        tokio::time::sleep(interval).await;
    }
}

fn timeout_message(message: &str, timeout: Duration, report: Option<&RejectionReport>) -> String {
    match report {
        Some(report) => format!("{message} (after {timeout:?}; last attempt: {report})"),
        None => format!("{message} (after {timeout:?})"),
    }
}
