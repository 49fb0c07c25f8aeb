// ElementCriteriaCondition - per-attempt element matching
//
// The condition owns matching logic; the polling driver (wait.rs) owns
// timing. One condition is constructed per call site and re-evaluated on
// every retry of the same wait.
//
// Filtering order is fixed: text -> visibility -> clickability -> custom
// filter. Each rejected candidate records which criterion failed so a
// timeout can report why the late-stage candidates were turned away.

use crate::context::{ElementContext, ElementHandle};
use crate::error::{Error, Result};
use crate::locator::{Locator, format_chain};
use futures_util::future::BoxFuture;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Text requirement for a candidate element. Actual text is trimmed
/// before comparison.
#[derive(Debug, Clone)]
pub enum TextMatch {
    /// Candidate text must contain the string.
    Substring(String),
    /// Candidate text must equal the string exactly (after trimming).
    Exact(String),
    /// Candidate text must match the pattern.
    Pattern(Regex),
}

impl TextMatch {
    pub fn matches(&self, actual: &str) -> bool {
        let actual = actual.trim();
        match self {
            TextMatch::Substring(expected) => actual.contains(expected.as_str()),
            TextMatch::Exact(expected) => actual == expected.trim(),
            TextMatch::Pattern(pattern) => pattern.is_match(actual),
        }
    }

    /// Human-readable form for messages ("text containing 'Save'").
    pub fn describe(&self) -> String {
        match self {
            TextMatch::Substring(expected) => format!("text containing '{expected}'"),
            TextMatch::Exact(expected) => format!("exact text '{expected}'"),
            TextMatch::Pattern(pattern) => format!("text matching /{pattern}/"),
        }
    }
}

/// How many matches a query wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// Exactly one: zero is "not yet", two or more is a fatal
    /// ambiguous-match error surfaced on the spot.
    RequireUnique,
    /// First surviving candidate; duplicates ignored.
    FirstMatch,
    /// Every surviving candidate, possibly none.
    All,
}

/// Why one candidate was rejected during an attempt.
#[derive(Debug, Clone)]
pub enum RejectReason {
    TextMismatch { expected: String, actual: String },
    NotDisplayed,
    NotClickable,
    FilterRejected,
    WentStale,
    CallbackDeferred(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TextMismatch { expected, actual } => {
                write!(f, "text '{actual}' did not match {expected}")
            }
            RejectReason::NotDisplayed => write!(f, "not visible"),
            RejectReason::NotClickable => write!(f, "not clickable"),
            RejectReason::FilterRejected => write!(f, "rejected by custom filter"),
            RejectReason::WentStale => write!(f, "went stale mid-check"),
            RejectReason::CallbackDeferred(msg) => write!(f, "match callback deferred: {msg}"),
        }
    }
}

/// Per-attempt breakdown of rejected candidates, kept so a timeout error
/// can explain the last attempt.
#[derive(Debug, Clone, Default)]
pub struct RejectionReport {
    reasons: Vec<RejectReason>,
}

impl RejectionReport {
    pub fn push(&mut self, reason: RejectReason) {
        self.reasons.push(reason);
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn reasons(&self) -> &[RejectReason] {
        &self.reasons
    }
}

impl fmt::Display for RejectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reasons.is_empty() {
            return write!(f, "no candidates matched the locator");
        }
        write!(f, "{} candidate(s) rejected: ", self.reasons.len())?;
        for (i, reason) in self.reasons.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{reason}")?;
        }
        Ok(())
    }
}

/// Outcome of one poll attempt.
///
/// Transient exceptions from the backend are collapsed into `NotYet` at
/// the condition boundary, so the polling loop never branches on error
/// identity.
pub enum Attempt<T> {
    Found(T),
    NotYet(RejectionReport),
}

impl<T> Attempt<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Attempt::Found(_))
    }
}

/// Resolved value of a satisfied element condition: one handle or many,
/// depending on the cardinality mode.
#[derive(Debug, Clone)]
pub enum Match<H> {
    One(H),
    Many(Vec<H>),
}

impl<H> Match<H> {
    pub fn into_first(self) -> Option<H> {
        match self {
            Match::One(handle) => Some(handle),
            Match::Many(handles) => handles.into_iter().next(),
        }
    }

    pub fn into_all(self) -> Vec<H> {
        match self {
            Match::One(handle) => vec![handle],
            Match::Many(handles) => handles,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Match::One(_) => 1,
            Match::Many(handles) => handles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stored async predicate over a candidate handle.
pub type HandleFilter<H> = Arc<dyn Fn(H) -> BoxFuture<'static, Result<bool>> + Send + Sync>;

/// Stored async callback invoked once per successful resolution.
pub type MatchCallback<H> = Arc<dyn Fn(Match<H>) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Predicate object: resolves candidates under a locator and filters them
/// by the configured criteria.
///
/// Defaults: any text, must be visible, need not be clickable, no custom
/// filter, unique match required.
///
/// # Examples
///
/// ```ignore
/// use vigil_rs::{Cardinality, ElementCriteriaCondition, Locator};
///
/// let save_button = ElementCriteriaCondition::new(Locator::css("button"))
///     .with_exact_text("Save")
///     .clickable(true);
///
/// let grid_rows = ElementCriteriaCondition::new(Locator::css(".grid-row"))
///     .cardinality(Cardinality::All);
/// ```
pub struct ElementCriteriaCondition<H> {
    locator: Locator,
    text: Option<TextMatch>,
    must_be_displayed: bool,
    must_be_clickable: bool,
    filter: Option<HandleFilter<H>>,
    cardinality: Cardinality,
    on_match: Option<MatchCallback<H>>,
}

impl<H: ElementHandle> ElementCriteriaCondition<H> {
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            text: None,
            must_be_displayed: true,
            must_be_clickable: false,
            filter: None,
            cardinality: Cardinality::RequireUnique,
            on_match: None,
        }
    }

    /// Requires candidate text to contain the string.
    pub fn with_text(mut self, expected: impl Into<String>) -> Self {
        self.text = Some(TextMatch::Substring(expected.into()));
        self
    }

    /// Requires candidate text to equal the string exactly.
    pub fn with_exact_text(mut self, expected: impl Into<String>) -> Self {
        self.text = Some(TextMatch::Exact(expected.into()));
        self
    }

    /// Requires candidate text to match the pattern.
    pub fn with_text_matching(mut self, pattern: Regex) -> Self {
        self.text = Some(TextMatch::Pattern(pattern));
        self
    }

    /// Whether candidates must be visible. Default true.
    pub fn displayed(mut self, required: bool) -> Self {
        self.must_be_displayed = required;
        self
    }

    /// Whether candidates must be enabled for interaction. Default false.
    pub fn clickable(mut self, required: bool) -> Self {
        self.must_be_clickable = required;
        self
    }

    /// Adds a custom async predicate over a candidate handle.
    pub fn filtered_by<F, Fut>(mut self, filter: F) -> Self
    where
        F: Fn(H) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        self.filter = Some(Arc::new(move |handle| Box::pin(filter(handle))));
        self
    }

    /// Sets the cardinality mode. Default [`Cardinality::RequireUnique`].
    pub fn cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Registers a side-effecting callback invoked once per successful
    /// resolution. A transient failure from the callback converts the
    /// whole attempt to "not yet", so composite find-and-act operations
    /// are retried atomically as a unit.
    pub fn on_match<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(Match<H>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_match = Some(Arc::new(move |matched| Box::pin(callback(matched))));
        self
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Human-readable form for wait messages.
    pub fn describe(&self) -> String {
        let mut out = format!("element {}", self.locator);
        if let Some(text) = &self.text {
            out.push_str(&format!(" with {}", text.describe()));
        }
        out
    }

    /// Runs one matching attempt against the context.
    pub async fn evaluate<C>(&self, ctx: &C) -> Result<Attempt<Match<H>>>
    where
        C: ElementContext<Handle = H> + ?Sized,
    {
        let candidates = match ctx.find_all(&self.locator).await {
            Ok(found) => found,
            Err(err) if err.is_transient() => {
                tracing::trace!(locator = %self.locator, error = %err,
                    "transient error during resolution, zero candidates this attempt");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let mut report = RejectionReport::default();
        let mut survivors = Vec::new();
        for candidate in candidates {
            match self.qualify(&candidate).await? {
                None => survivors.push(candidate),
                Some(reason) => report.push(reason),
            }
        }

        let resolved = match self.cardinality {
            Cardinality::All => Match::Many(survivors),
            Cardinality::FirstMatch => match survivors.into_iter().next() {
                Some(first) => Match::One(first),
                None => return Ok(Attempt::NotYet(report)),
            },
            Cardinality::RequireUnique => {
                if survivors.len() > 1 {
                    return Err(self.ambiguous(survivors.len(), ctx.locator_chain()));
                }
                match survivors.into_iter().next() {
                    Some(only) => Match::One(only),
                    None => return Ok(Attempt::NotYet(report)),
                }
            }
        };

        if let Some(callback) = &self.on_match {
            if let Err(err) = callback(resolved.clone()).await {
                if err.is_transient() {
                    tracing::debug!(locator = %self.locator, error = %err,
                        "match callback deferred, retrying whole attempt");
                    report.push(RejectReason::CallbackDeferred(err.to_string()));
                    return Ok(Attempt::NotYet(report));
                }
                return Err(err);
            }
        }

        Ok(Attempt::Found(resolved))
    }

    /// Checks one candidate against the criteria, in order. Returns the
    /// rejection reason, or `None` for a survivor. Transient errors while
    /// probing reject that candidate only.
    async fn qualify(&self, candidate: &H) -> Result<Option<RejectReason>> {
        if let Some(expected) = &self.text {
            let actual = match candidate.text().await {
                Ok(text) => text,
                Err(err) if err.is_transient() => return Ok(Some(RejectReason::WentStale)),
                Err(err) => return Err(err),
            };
            if !expected.matches(&actual) {
                return Ok(Some(RejectReason::TextMismatch {
                    expected: expected.describe(),
                    actual: actual.trim().to_string(),
                }));
            }
        }

        if self.must_be_displayed {
            match candidate.is_displayed().await {
                Ok(true) => {}
                Ok(false) => return Ok(Some(RejectReason::NotDisplayed)),
                Err(err) if err.is_transient() => return Ok(Some(RejectReason::WentStale)),
                Err(err) => return Err(err),
            }
        }

        if self.must_be_clickable {
            match candidate.is_enabled().await {
                Ok(true) => {}
                Ok(false) => return Ok(Some(RejectReason::NotClickable)),
                Err(err) if err.is_transient() => return Ok(Some(RejectReason::WentStale)),
                Err(err) => return Err(err),
            }
        }

        if let Some(filter) = &self.filter {
            match filter(candidate.clone()).await {
                Ok(true) => {}
                Ok(false) => return Ok(Some(RejectReason::FilterRejected)),
                Err(err) if err.is_transient() => return Ok(Some(RejectReason::WentStale)),
                Err(err) => return Err(err),
            }
        }

        Ok(None)
    }

    fn ambiguous(&self, count: usize, chain: Vec<Locator>) -> Error {
        let mut detail = String::new();
        if !chain.is_empty() {
            detail.push_str(&format!(" under {}", format_chain(&chain)));
        }
        if let Some(text) = &self.text {
            detail.push_str(&format!(" with {}", text.describe()));
        }
        Error::AmbiguousMatch {
            locator: self.locator.to_string(),
            count,
            detail,
        }
    }
}
