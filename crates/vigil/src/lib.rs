//! vigil: condition-polling and element-resolution core for browser test automation
//!
//! Two cooperating pieces:
//!
//! - [`ElementCriteriaCondition`] — a predicate object that resolves
//!   elements under a [`Locator`] and filters them by text, visibility,
//!   clickability, a custom predicate, and a cardinality mode.
//! - The polling driver — [`wait_until`] / [`wait_until_not`] /
//!   [`until_condition_met`] — a bounded-retry loop that re-evaluates a
//!   predicate against a context, sleeping between attempts, until it
//!   succeeds, the budget is exhausted, or an unrecoverable error occurs.
//!
//! The driver owns timing; conditions own matching. Transient conditions
//! (stale handles, deliberate retry signals) are absorbed as "no match
//! this attempt" and never reach callers; ambiguous-match and timeout
//! errors always do, carrying the locator, the parent chain, and the last
//! attempt's rejection reasons.
//!
//! Backends plug in by implementing [`ElementContext`] and
//! [`ElementHandle`] for their session and element types; a root session
//! and a resolved element are interchangeable as contexts.
//!
//! # Examples
//!
//! ## Querying with criteria
//!
//! ```ignore
//! use vigil_rs::{Locator, query};
//!
//! // Exactly one visible, clickable "Save" button; ambiguity is an
//! // immediate error, absence is waited out.
//! let button = query(&page, Locator::css("button"))
//!     .with_exact_text("Save")
//!     .clickable(true)
//!     .single()
//!     .await?;
//!
//! // Find-and-act retried atomically: a click that lands mid-rerender
//! // raises a retry signal and the whole find+click runs again.
//! query(&page, Locator::css("button"))
//!     .with_exact_text("Save")
//!     .on_match(|matched| async move {
//!         match matched.into_first() {
//!             Some(handle) => click(&handle).await,
//!             None => Ok(()),
//!         }
//!     })
//!     .single()
//!     .await?;
//! ```
//!
//! ## REST-level consistency waits
//!
//! ```ignore
//! use std::time::Duration;
//! use vigil_rs::{Error, until_condition_met};
//!
//! // Retries only assertion failures; on exhaustion the last real
//! // failure message propagates, not a generic timeout.
//! let report = until_condition_met(
//!     || async {
//!         let report = client.fetch_report(report_id).await?;
//!         if report.row_count != 42 {
//!             return Err(Error::assertion(format!(
//!                 "expected 42 rows, got {}",
//!                 report.row_count
//!             )));
//!         }
//!         Ok(report)
//!     },
//!     60,
//!     Duration::from_secs(1),
//! )
//! .await?;
//! ```
//!
//! ## Auto-retry assertions
//!
//! ```ignore
//! use vigil_rs::{Locator, expect};
//!
//! expect(&page, Locator::css(".status")).to_have_text("Saved").await?;
//! expect(&page, Locator::css(".spinner")).not().to_be_visible().await?;
//! ```

mod assertions;
mod condition;
mod config;
mod context;
mod error;
mod locator;
mod query;
mod wait;

// Re-export error types
pub use error::{Error, Result};

// Re-export the backend seam
pub use context::{ElementContext, ElementHandle};

// Re-export locators
pub use locator::{Locator, SelectorKind, format_chain};

// Re-export condition types
pub use condition::{
    Attempt, Cardinality, ElementCriteriaCondition, HandleFilter, Match, MatchCallback,
    RejectReason, RejectionReport, TextMatch,
};

// Re-export the polling driver
pub use wait::{
    DEFAULT_POLL_INTERVAL, DEFAULT_PROBE_TIMEOUT, DEFAULT_RETRIES, DEFAULT_RETRY_INTERVAL,
    DEFAULT_WAIT_TIMEOUT, PollCondition, RetryPolicy, until_condition_met, wait_until,
    wait_until_not,
};

// Re-export the query layer
pub use query::{Query, query, until_not_visible, until_visible};

// Re-export assertions API
pub use assertions::{Expectation, expect};

// Re-export configuration
pub use config::WaitConfig;
