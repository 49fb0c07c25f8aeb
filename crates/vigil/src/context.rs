// ElementContext / ElementHandle - capability traits at the backend seam
//
// A context is anything elements can be resolved under: a root browser
// session or a previously resolved element. Callers depend only on these
// traits, never on which concrete kind they hold.
//
// The backend contract: `find_all` and the per-handle probes must raise a
// transient error (Error::Stale, or Error::Retry) for stale-handle and
// mid-mutation races, distinguishable from genuine transport failures, so
// the polling driver can classify them as "no match this attempt".

use crate::error::Result;
use crate::locator::Locator;
use async_trait::async_trait;

/// One resolved DOM node.
///
/// Handles carry no explicit disposal; they are invalidated whenever the
/// underlying page mutates, at which point probes return [`Error::Stale`]
/// and the current poll attempt counts as a non-match.
///
/// [`Error::Stale`]: crate::Error::Stale
#[async_trait]
pub trait ElementHandle: Clone + Send + Sync + 'static {
    /// Whether the element is currently rendered and not hidden.
    async fn is_displayed(&self) -> Result<bool>;

    /// Whether the element is enabled for interaction.
    async fn is_enabled(&self) -> Result<bool>;

    /// The element's visible text content.
    async fn text(&self) -> Result<String>;
}

/// Anything elements can be resolved under.
#[async_trait]
pub trait ElementContext: Send + Sync {
    type Handle: ElementHandle;

    /// Resolves every element below this context matching the locator.
    ///
    /// Returns an empty vector when nothing matches. Transient races
    /// (stale parent, mid-navigation) surface as transient errors and are
    /// absorbed by the caller; anything else is fatal.
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Handle>>;

    /// The locators that produced this context, outermost first. Used to
    /// name the parent chain in error messages. Empty at the root.
    fn locator_chain(&self) -> Vec<Locator> {
        Vec::new()
    }
}
