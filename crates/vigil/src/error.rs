// Error types for vigil

use thiserror::Error;

/// Result type alias for vigil operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving elements or polling conditions.
///
/// Variants fall into three classes:
///
/// - **Terminal**: [`Error::AmbiguousMatch`], [`Error::WaitTimeout`] and
///   [`Error::AssertionTimeout`] end a wait and surface to the caller with
///   a fully formatted diagnostic message.
/// - **Transient**: [`Error::Stale`] and [`Error::Retry`] are swallowed by
///   the polling driver and count as "no match this attempt". Callers never
///   observe them.
/// - **Fatal**: everything else (bad arguments, backend/transport failures)
///   propagates immediately on first occurrence, aborting the wait.
#[derive(Debug, Error)]
pub enum Error {
    /// More than one element satisfied a query that requires a unique match.
    ///
    /// This is a caller-fixable usage error, not a condition that can
    /// resolve itself over time, so it is never retried. `detail` names the
    /// parent locator chain and the expected text where present.
    #[error("Ambiguous match: {count} elements satisfied {locator}{detail}; expected exactly one")]
    AmbiguousMatch {
        locator: String,
        count: usize,
        detail: String,
    },

    /// A wait exhausted its time budget without the condition being met.
    ///
    /// The message embeds the caller's intent message verbatim plus, where
    /// available, the last attempt's per-candidate rejection breakdown.
    #[error("Wait timed out: {0}")]
    WaitTimeout(String),

    /// An auto-retry assertion (expect API) exhausted its time budget.
    #[error("Assertion timeout: {0}")]
    AssertionTimeout(String),

    /// A business-rule check was not (yet) satisfied.
    ///
    /// Inside `until_condition_met` this is the one error kind that is
    /// retried; the last occurrence propagates on exhaustion so the caller
    /// sees the actual unmet condition, not a generic timeout.
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// An element handle was invalidated by a page mutation.
    ///
    /// Transient: equivalent to "no match this attempt".
    #[error("Stale element: {0}")]
    Stale(String),

    /// Deliberate "not settled yet, try again" signal.
    ///
    /// Raised by on-match callbacks to retry a composite find-and-act
    /// operation atomically. Transient, never observed by callers.
    #[error("Condition not ready: {0}")]
    Retry(String),

    /// Invalid argument provided to an operation (e.g. a malformed pattern)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Backend/transport failure unrelated to page staleness
    #[error("Backend error: {0}")]
    Backend(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Shorthand for [`Error::AssertionFailed`]
    pub fn assertion(msg: impl Into<String>) -> Self {
        Error::AssertionFailed(msg.into())
    }

    /// Shorthand for [`Error::Retry`]
    pub fn retry(msg: impl Into<String>) -> Self {
        Error::Retry(msg.into())
    }

    /// Whether this error counts as "no match this attempt" rather than a
    /// failure. The polling driver branches on this alone, never on
    /// concrete error identity.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Stale(_) | Error::Retry(_) => true,
            Error::Context(_, inner) => inner.is_transient(),
            _ => false,
        }
    }

    /// Whether this error is an assertion failure, possibly wrapped in
    /// context. `until_condition_met` branches on this to decide what to
    /// retry.
    pub fn is_assertion(&self) -> bool {
        match self {
            Error::AssertionFailed(_) => true,
            Error::Context(_, inner) => inner.is_assertion(),
            _ => false,
        }
    }

    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }
}
