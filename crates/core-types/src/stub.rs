//! In-memory scripted driver for tests.
//!
//! The page is a table keyed by (browsing context, locator). Elements can
//! become visible after a delay, appear when another element is clicked, or
//! refuse clicks with a chosen driver error. Every interaction is recorded.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::driver::{Driver, DriverError, ElementHandle, ElementState};
use crate::{BrowsingContext, LocatorExpression};

type Key = (BrowsingContext, LocatorExpression);

/// Interaction recorded by [`StubDriver`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverCall {
    Navigate(String),
    Click {
        context: BrowsingContext,
        locator: LocatorExpression,
    },
    Type {
        context: BrowsingContext,
        locator: LocatorExpression,
        text: String,
    },
    SwitchContext(BrowsingContext),
    Quit,
}

/// Element description; the visibility delay counts from insertion into the page.
#[derive(Clone, Debug)]
pub struct StubElement {
    visible_after: Option<Duration>,
    text: Option<String>,
}

impl StubElement {
    pub fn visible() -> Self {
        Self::visible_after(Duration::ZERO)
    }

    pub fn visible_after(delay: Duration) -> Self {
        Self {
            visible_after: Some(delay),
            text: None,
        }
    }

    /// Present in the document but never displayed
    pub fn hidden() -> Self {
        Self {
            visible_after: None,
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[derive(Clone, Debug)]
struct PageElement {
    visible_at: Option<Instant>,
    text: Option<String>,
    value: Option<String>,
}

impl PageElement {
    fn place(element: StubElement) -> Self {
        Self {
            visible_at: element.visible_after.map(|delay| Instant::now() + delay),
            text: element.text,
            value: None,
        }
    }

    fn is_visible(&self, now: Instant) -> bool {
        self.visible_at.map(|at| now >= at).unwrap_or(false)
    }
}

#[derive(Default)]
struct StubState {
    active: BrowsingContext,
    url: Option<String>,
    frames: HashSet<String>,
    elements: HashMap<Key, PageElement>,
    reveals: HashMap<Key, Vec<(Key, StubElement)>>,
    click_failures: HashMap<Key, DriverError>,
    handles: HashMap<String, Key>,
    next_handle: u64,
    queries: usize,
    calls: Vec<DriverCall>,
}

/// Scripted [`Driver`] backed by an in-memory page model
#[derive(Default)]
pub struct StubDriver {
    state: Mutex<StubState>,
}

impl StubDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(
        self,
        context: BrowsingContext,
        locator: LocatorExpression,
        element: StubElement,
    ) -> Self {
        self.insert(context, locator, element);
        self
    }

    pub fn insert(&self, context: BrowsingContext, locator: LocatorExpression, element: StubElement) {
        self.state
            .lock()
            .elements
            .insert((context, locator), PageElement::place(element));
    }

    pub fn remove(&self, context: &BrowsingContext, locator: &LocatorExpression) {
        self.state
            .lock()
            .elements
            .remove(&(context.clone(), locator.clone()));
    }

    /// Register an embedded document named `name` whose host element in the
    /// top document matches `host`. The host is present but not displayed.
    pub fn add_frame(&self, name: &str, host: LocatorExpression) {
        let mut state = self.state.lock();
        state.frames.insert(name.to_string());
        state.elements.insert(
            (BrowsingContext::Top, host),
            PageElement::place(StubElement::hidden()),
        );
    }

    /// Insert `element` under (`revealed_context`, `revealed`) whenever `trigger` is clicked.
    pub fn reveal_on_click(
        &self,
        trigger_context: BrowsingContext,
        trigger: LocatorExpression,
        revealed_context: BrowsingContext,
        revealed: LocatorExpression,
        element: StubElement,
    ) {
        self.state
            .lock()
            .reveals
            .entry((trigger_context, trigger))
            .or_default()
            .push(((revealed_context, revealed), element));
    }

    pub fn fail_clicks(&self, context: BrowsingContext, locator: LocatorExpression, error: DriverError) {
        self.state
            .lock()
            .click_failures
            .insert((context, locator), error);
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.state.lock().calls.clone()
    }

    pub fn context_switches(&self) -> Vec<BrowsingContext> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::SwitchContext(ctx) => Some(ctx.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clicked(&self, locator: &LocatorExpression) -> bool {
        self.state.lock().calls.iter().any(|call| {
            matches!(call, DriverCall::Click { locator: clicked, .. } if clicked == locator)
        })
    }

    pub fn typed_value(&self, context: &BrowsingContext, locator: &LocatorExpression) -> Option<String> {
        self.state
            .lock()
            .elements
            .get(&(context.clone(), locator.clone()))
            .and_then(|element| element.value.clone())
    }

    pub fn active_context(&self) -> BrowsingContext {
        self.state.lock().active.clone()
    }

    pub fn current_url(&self) -> Option<String> {
        self.state.lock().url.clone()
    }

    pub fn query_count(&self) -> usize {
        self.state.lock().queries
    }
}

impl StubState {
    fn element_for(&self, handle: &ElementHandle) -> Result<Key, DriverError> {
        let key = self
            .handles
            .get(&handle.0)
            .cloned()
            .ok_or_else(|| DriverError::UnknownHandle(handle.0.clone()))?;
        if key.0 != self.active || !self.elements.contains_key(&key) {
            return Err(DriverError::StaleElement);
        }
        Ok(key)
    }
}

#[async_trait]
impl Driver for StubDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.url = Some(url.to_string());
        state.active = BrowsingContext::Top;
        state.calls.push(DriverCall::Navigate(url.to_string()));
        Ok(())
    }

    async fn query(&self, locator: &LocatorExpression) -> Result<ElementState, DriverError> {
        let mut state = self.state.lock();
        state.queries += 1;
        let key = (state.active.clone(), locator.clone());
        let Some(element) = state.elements.get(&key) else {
            return Ok(ElementState::absent());
        };
        let visible = element.is_visible(Instant::now());
        let text = element.text.clone();

        state.next_handle += 1;
        let handle = format!("stub-{}", state.next_handle);
        state.handles.insert(handle.clone(), key);

        Ok(ElementState {
            present: true,
            visible,
            text,
            handle: Some(ElementHandle(handle)),
        })
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let key = state.element_for(handle)?;
        if let Some(err) = state.click_failures.get(&key) {
            return Err(err.clone());
        }

        state.calls.push(DriverCall::Click {
            context: key.0.clone(),
            locator: key.1.clone(),
        });
        if let Some(revealed) = state.reveals.get(&key).cloned() {
            for (target, element) in revealed {
                state.elements.insert(target, PageElement::place(element));
            }
        }
        Ok(())
    }

    async fn clear_and_type(&self, handle: &ElementHandle, text: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let key = state.element_for(handle)?;
        state.calls.push(DriverCall::Type {
            context: key.0.clone(),
            locator: key.1.clone(),
            text: text.to_string(),
        });
        if let Some(element) = state.elements.get_mut(&key) {
            element.value = Some(text.to_string());
        }
        Ok(())
    }

    async fn switch_context(&self, context: &BrowsingContext) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if let BrowsingContext::Embedded(name) = context {
            if !state.frames.contains(name) {
                return Err(DriverError::NoSuchFrame(name.clone()));
            }
        }
        state.active = context.clone();
        state.calls.push(DriverCall::SwitchContext(context.clone()));
        Ok(())
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.state.lock().calls.push(DriverCall::Quit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_delayed_visibility() {
        let locator = LocatorExpression::id("late");
        let driver = StubDriver::new().with_element(
            BrowsingContext::Top,
            locator.clone(),
            StubElement::visible_after(Duration::from_secs(2)),
        );

        let state = driver.query(&locator).await.unwrap();
        assert!(state.present);
        assert!(!state.visible);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(driver.query(&locator).await.unwrap().visible);
    }

    #[tokio::test]
    async fn test_click_reveals_follow_up() {
        let trigger = LocatorExpression::id("open");
        let panel = LocatorExpression::css(".panel");
        let driver = StubDriver::new().with_element(
            BrowsingContext::Top,
            trigger.clone(),
            StubElement::visible(),
        );
        driver.reveal_on_click(
            BrowsingContext::Top,
            trigger.clone(),
            BrowsingContext::Top,
            panel.clone(),
            StubElement::visible(),
        );

        assert!(!driver.query(&panel).await.unwrap().present);
        let handle = driver.query(&trigger).await.unwrap().handle.unwrap();
        driver.click(&handle).await.unwrap();
        assert!(driver.query(&panel).await.unwrap().visible);
        assert!(driver.clicked(&trigger));
    }

    #[tokio::test]
    async fn test_handles_go_stale_after_switch() {
        let button = LocatorExpression::id("b");
        let driver = StubDriver::new().with_element(
            BrowsingContext::Top,
            button.clone(),
            StubElement::visible(),
        );
        driver.add_frame("pay", LocatorExpression::id("pay"));

        let handle = driver.query(&button).await.unwrap().handle.unwrap();
        driver
            .switch_context(&BrowsingContext::embedded("pay"))
            .await
            .unwrap();
        assert_eq!(driver.click(&handle).await, Err(DriverError::StaleElement));
        assert!(!driver.query(&button).await.unwrap().present);
    }

    #[tokio::test]
    async fn test_unknown_frame_rejected() {
        let driver = StubDriver::new();
        let result = driver
            .switch_context(&BrowsingContext::embedded("missing"))
            .await;
        assert_eq!(result, Err(DriverError::NoSuchFrame("missing".into())));
        assert!(driver.active_context().is_top());
    }
}
