// Fake Page - scripted in-memory backend for integration tests
//
// Stands in for a real browser session: each selector carries a script of
// per-resolution steps (element sets, stale races, fatal failures), so
// tests can replay a page settling over time without a browser.

// Note: Functions appear "unused" because each test binary compiles separately,
// but they ARE used across multiple test files. Suppress false-positive warnings.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vigil_rs::{ElementContext, ElementHandle, Error, Locator, Result, SelectorKind};

/// One scripted DOM node.
#[derive(Debug, Clone)]
pub struct FakeElement {
    text: String,
    displayed: bool,
    enabled: bool,
    stale: bool,
    chain: Vec<Locator>,
    children: Arc<Mutex<HashMap<String, Vec<FakeElement>>>>,
    ancestors: Arc<Mutex<HashMap<String, Vec<FakeElement>>>>,
}

impl FakeElement {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            displayed: true,
            enabled: true,
            stale: false,
            chain: Vec::new(),
            children: Arc::new(Mutex::new(HashMap::new())),
            ancestors: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Every probe on a stale element raises Error::Stale.
    pub fn stale(mut self) -> Self {
        self.stale = true;
        self
    }

    pub fn with_chain(mut self, chain: Vec<Locator>) -> Self {
        self.chain = chain;
        self
    }

    /// Registers children resolved when this element is used as a context.
    pub fn add_children(&self, selector: &str, children: Vec<FakeElement>) {
        self.children
            .lock()
            .insert(selector.to_string(), children);
    }

    /// Registers the enclosing element resolved for an ancestor locator.
    pub fn add_ancestor(&self, selector: &str, ancestor: FakeElement) {
        self.ancestors
            .lock()
            .insert(selector.to_string(), vec![ancestor]);
    }

    fn live(&self) -> Result<()> {
        if self.stale {
            Err(Error::Stale(format!("element '{}'", self.text)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ElementHandle for FakeElement {
    async fn is_displayed(&self) -> Result<bool> {
        self.live()?;
        Ok(self.displayed)
    }

    async fn is_enabled(&self) -> Result<bool> {
        self.live()?;
        Ok(self.enabled)
    }

    async fn text(&self) -> Result<String> {
        self.live()?;
        Ok(self.text.clone())
    }
}

// A resolved element is itself a context for nested queries.
#[async_trait]
impl ElementContext for FakeElement {
    type Handle = FakeElement;

    async fn find_all(&self, locator: &Locator) -> Result<Vec<FakeElement>> {
        self.live()?;
        let table = match locator.kind() {
            SelectorKind::Ancestor => &self.ancestors,
            _ => &self.children,
        };
        Ok(table
            .lock()
            .get(locator.selector())
            .cloned()
            .unwrap_or_default())
    }

    fn locator_chain(&self) -> Vec<Locator> {
        self.chain.clone()
    }
}

/// One step of a selector's script, consumed per resolution. The last
/// step repeats forever (the page has settled).
#[derive(Clone)]
pub enum Step {
    Elements(Vec<FakeElement>),
    Stale,
    Fatal,
}

/// Root session context with scripted selector resolutions.
pub struct FakePage {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    finds: AtomicUsize,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            finds: AtomicUsize::new(0),
        }
    }

    /// Steady state: the selector resolves to these elements on every call.
    pub fn set(&self, selector: &str, elements: Vec<FakeElement>) {
        self.script(selector, vec![Step::Elements(elements)]);
    }

    /// Scripted sequence, one step per find_all call.
    pub fn script(&self, selector: &str, steps: Vec<Step>) {
        self.scripts
            .lock()
            .insert(selector.to_string(), steps.into());
    }

    /// Total find_all calls across all selectors.
    pub fn find_calls(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ElementContext for FakePage {
    type Handle = FakeElement;

    async fn find_all(&self, locator: &Locator) -> Result<Vec<FakeElement>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        let mut scripts = self.scripts.lock();
        let Some(steps) = scripts.get_mut(locator.selector()) else {
            return Ok(Vec::new());
        };
        let step = if steps.len() > 1 {
            steps.pop_front()
        } else {
            steps.front().cloned()
        };
        match step {
            Some(Step::Elements(elements)) => Ok(elements),
            Some(Step::Stale) => Err(Error::Stale("scripted mid-mutation race".to_string())),
            Some(Step::Fatal) => Err(Error::Backend("scripted transport failure".to_string())),
            None => Ok(Vec::new()),
        }
    }
}
