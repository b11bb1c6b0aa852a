//! Browser driver collaborator seam

use async_trait::async_trait;
use thiserror::Error;

use crate::{BrowsingContext, LocatorExpression};

/// Errors reported by a driver implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Nothing matched the locator in the active context
    #[error("no such element")]
    NoSuchElement,

    /// Handle refers to an element detached from the document
    #[error("stale element reference")]
    StaleElement,

    /// Element exists but cannot receive input
    #[error("element not interactable")]
    NotInteractable,

    /// Another element would receive the click
    #[error("element click intercepted: {0}")]
    Obscured(String),

    /// Embedded document could not be entered
    #[error("no such frame: {0}")]
    NoSuchFrame(String),

    /// Handle was never issued by this driver
    #[error("unknown element handle: {0}")]
    UnknownHandle(String),

    /// Connection or protocol failure
    #[error("driver transport error: {0}")]
    Transport(String),
}

impl DriverError {
    /// Errors the poll loop absorbs while the document is still rendering
    pub fn is_transient(&self) -> bool {
        matches!(self, DriverError::NoSuchElement | DriverError::StaleElement)
    }
}

/// Opaque reference to a located element, valid until the active context changes
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementHandle(pub String);

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of an element's state in the active context
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementState {
    pub present: bool,
    pub visible: bool,
    pub text: Option<String>,
    pub handle: Option<ElementHandle>,
}

impl ElementState {
    pub fn absent() -> Self {
        Self::default()
    }
}

/// Capability the interaction layer consumes from a browser automation driver.
///
/// Launch, window sizing and device emulation happen when the implementation
/// is constructed; nothing here reconfigures them.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Locate the first element matching `locator` in the active context
    async fn query(&self, locator: &LocatorExpression) -> Result<ElementState, DriverError>;

    async fn click(&self, handle: &ElementHandle) -> Result<(), DriverError>;

    async fn clear_and_type(&self, handle: &ElementHandle, text: &str) -> Result<(), DriverError>;

    /// Make `context` the active one. Handles from the previous context are invalidated.
    async fn switch_context(&self, context: &BrowsingContext) -> Result<(), DriverError>;

    async fn quit(&self) -> Result<(), DriverError>;
}
