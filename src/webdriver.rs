//! WebDriver-backed [`Driver`]
//!
//! Talks to a W3C WebDriver endpoint (chromedriver by default) through
//! `fantoccini`. Window size or device emulation is fixed when the session
//! is created; element handles are issued per active browsing context and
//! dropped whenever the context changes.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use checkout_core_types::{
    BrowsingContext, Driver, DriverError, ElementHandle, ElementState, LocatorExpression,
    SelectionStrategy,
};
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::config::DeviceProfile;

pub struct WebDriver {
    client: Client,
    handles: Mutex<HandleCache<Element>>,
}

/// Handles issued in the active context, one per locator. A fresh lookup
/// replaces the element behind the existing handle.
struct HandleCache<E> {
    elements: HashMap<String, E>,
    by_locator: HashMap<LocatorExpression, String>,
    issued: u64,
}

impl<E: Clone> HandleCache<E> {
    fn new() -> Self {
        Self {
            elements: HashMap::new(),
            by_locator: HashMap::new(),
            issued: 0,
        }
    }

    fn issue(&mut self, locator: &LocatorExpression, element: E) -> ElementHandle {
        let id = match self.by_locator.get(locator) {
            Some(id) => id.clone(),
            None => {
                self.issued += 1;
                let id = format!("wd-{}", self.issued);
                self.by_locator.insert(locator.clone(), id.clone());
                id
            }
        };
        self.elements.insert(id.clone(), element);
        ElementHandle(id)
    }

    fn get(&self, handle: &ElementHandle) -> Option<E> {
        self.elements.get(&handle.0).cloned()
    }

    /// The id counter survives, so handles from before never alias new ones
    fn clear(&mut self) {
        self.elements.clear();
        self.by_locator.clear();
    }

    fn len(&self) -> usize {
        self.elements.len()
    }
}

impl WebDriver {
    /// Open a browser session sized or emulated per `profile`
    pub async fn connect(webdriver_url: &str, profile: &DeviceProfile) -> Result<Self> {
        info!(
            url = webdriver_url,
            width = profile.width,
            height = profile.height,
            emulate = profile.emulate,
            "Connecting to WebDriver"
        );

        let client = ClientBuilder::rustls()
            .capabilities(capabilities(profile))
            .connect(webdriver_url)
            .await
            .with_context(|| format!("Failed to connect to WebDriver at {}", webdriver_url))?;

        if !profile.emulate {
            debug!("Setting window to {}x{}", profile.width, profile.height);
            client
                .set_window_size(profile.width, profile.height)
                .await
                .context("Failed to size browser window")?;
        }

        Ok(Self {
            client,
            handles: Mutex::new(HandleCache::new()),
        })
    }

    fn element(&self, handle: &ElementHandle) -> Result<Element, DriverError> {
        self.handles
            .lock()
            .get(handle)
            .ok_or(DriverError::StaleElement)
    }

    fn release_handles(&self) {
        let mut handles = self.handles.lock();
        debug!(released = handles.len(), "Dropping element handles");
        handles.clear();
    }
}

fn capabilities(profile: &DeviceProfile) -> Map<String, Value> {
    let mut chrome = Map::new();
    chrome.insert("args".to_string(), json!(["--remote-allow-origins=*"]));
    if profile.emulate {
        let mut emulation = Map::new();
        emulation.insert(
            "deviceMetrics".to_string(),
            json!({
                "width": profile.width,
                "height": profile.height,
                "pixelRatio": profile.pixel_ratio,
            }),
        );
        if let Some(user_agent) = &profile.user_agent {
            emulation.insert("userAgent".to_string(), json!(user_agent));
        }
        chrome.insert("mobileEmulation".to_string(), Value::Object(emulation));
    }

    let mut caps = Map::new();
    caps.insert("goog:chromeOptions".to_string(), Value::Object(chrome));
    caps
}

/// XPath used for text-contains locators
fn text_xpath(text: &str) -> String {
    format!("//*[contains(text(), {})]", xpath_literal(text))
}

/// XPath 1.0 string literals have no escapes: pick the quote the text
/// lacks, or splice single quotes in with `concat()` when it has both
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{}'", text)
    } else if !text.contains('"') {
        format!("\"{}\"", text)
    } else {
        let parts: Vec<String> = text.split('\'').map(|part| format!("'{}'", part)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

fn map_error(err: CmdError) -> DriverError {
    match err {
        CmdError::Standard(ref wd) => map_status(&wd.error, err.to_string()),
        other => DriverError::Transport(other.to_string()),
    }
}

fn map_status(status: &ErrorStatus, detail: String) -> DriverError {
    match status {
        ErrorStatus::NoSuchElement => DriverError::NoSuchElement,
        ErrorStatus::StaleElementReference => DriverError::StaleElement,
        ErrorStatus::ElementNotInteractable => DriverError::NotInteractable,
        ErrorStatus::ElementClickIntercepted => DriverError::Obscured(detail),
        _ => DriverError::Transport(detail),
    }
}

#[async_trait]
impl Driver for WebDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.release_handles();
        self.client.goto(url).await.map_err(map_error)
    }

    async fn query(&self, locator: &LocatorExpression) -> Result<ElementState, DriverError> {
        let text_path;
        let by = match locator.strategy {
            SelectionStrategy::Id => Locator::Id(&locator.value),
            SelectionStrategy::Css => Locator::Css(&locator.value),
            SelectionStrategy::XPath => Locator::XPath(&locator.value),
            SelectionStrategy::Text => {
                text_path = text_xpath(&locator.value);
                Locator::XPath(&text_path)
            }
        };

        let element = match self.client.find(by).await {
            Ok(element) => element,
            Err(err) if err.is_no_such_element() => return Ok(ElementState::absent()),
            Err(err) => return Err(map_error(err)),
        };
        let visible = element.is_displayed().await.map_err(map_error)?;
        let text = if visible {
            Some(element.text().await.map_err(map_error)?)
        } else {
            None
        };

        Ok(ElementState {
            present: true,
            visible,
            text,
            handle: Some(self.handles.lock().issue(locator, element)),
        })
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), DriverError> {
        self.element(handle)?.click().await.map_err(map_error)
    }

    async fn clear_and_type(&self, handle: &ElementHandle, text: &str) -> Result<(), DriverError> {
        let element = self.element(handle)?;
        element.clear().await.map_err(map_error)?;
        element.send_keys(text).await.map_err(map_error)
    }

    async fn switch_context(&self, context: &BrowsingContext) -> Result<(), DriverError> {
        self.release_handles();
        match context {
            BrowsingContext::Top => self.client.enter_frame(None).await.map_err(map_error),
            BrowsingContext::Embedded(name) => {
                let host = self
                    .client
                    .find(Locator::Id(name))
                    .await
                    .map_err(|_| DriverError::NoSuchFrame(name.clone()))?;
                host.enter_frame().await.map_err(|err| {
                    warn!(frame = %name, cause = %err, "Frame switch rejected");
                    DriverError::NoSuchFrame(name.clone())
                })?;
                Ok(())
            }
        }
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.release_handles();
        self.client.clone().close().await.map_err(map_error)
    }
}
