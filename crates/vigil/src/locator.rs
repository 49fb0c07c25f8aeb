// Locator - selector syntax + selector string pair
//
// A Locator identifies zero or more elements within a context. It is
// immutable once constructed and carries no reference to any backend:
// resolution happens through an ElementContext.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector syntax understood by element contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
    /// Structural selector: walk up from the context to the enclosing
    /// element matching the selector string (a tag or class name).
    Ancestor,
}

impl SelectorKind {
    fn as_str(self) -> &'static str {
        match self {
            SelectorKind::Css => "css",
            SelectorKind::XPath => "xpath",
            SelectorKind::Ancestor => "ancestor",
        }
    }
}

/// Identifies candidate elements within a context.
///
/// # Examples
///
/// ```ignore
/// use vigil_rs::Locator;
///
/// let save_button = Locator::css("button.save");
/// let row = Locator::xpath("//tr[@data-id='42']");
/// let enclosing_cell = Locator::ancestor("td");
/// assert_eq!(save_button.to_string(), "css=button.save");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    kind: SelectorKind,
    selector: String,
}

impl Locator {
    pub fn new(kind: SelectorKind, selector: impl Into<String>) -> Self {
        Self {
            kind,
            selector: selector.into(),
        }
    }

    /// Creates a CSS locator.
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(SelectorKind::Css, selector)
    }

    /// Creates an XPath locator.
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::new(SelectorKind::XPath, selector)
    }

    /// Creates a structural locator for the enclosing element.
    pub fn ancestor(selector: impl Into<String>) -> Self {
        Self::new(SelectorKind::Ancestor, selector)
    }

    /// Returns the selector syntax kind.
    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    /// Returns the selector string.
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind.as_str(), self.selector)
    }
}

/// Renders a parent locator chain for error messages, outermost first.
pub fn format_chain(chain: &[Locator]) -> String {
    chain
        .iter()
        .map(Locator::to_string)
        .collect::<Vec<_>>()
        .join(" > ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_selector() {
        assert_eq!(Locator::css("#btn").to_string(), "css=#btn");
        assert_eq!(Locator::xpath("//div").to_string(), "xpath=//div");
        assert_eq!(Locator::ancestor("td").to_string(), "ancestor=td");
    }

    #[test]
    fn test_format_chain() {
        let chain = vec![Locator::css("#grid"), Locator::css(".row")];
        assert_eq!(format_chain(&chain), "css=#grid > css=.row");
        assert_eq!(format_chain(&[]), "");
    }

    #[test]
    fn test_serde_round_trip() {
        let locator = Locator::css("button.save");
        let json = serde_json::to_string(&locator).expect("serialize");
        assert!(json.contains("\"css\""));
        let back: Locator = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, locator);
    }
}
