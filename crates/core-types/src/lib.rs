//! Shared primitives for the checkout interaction layer.
//!
//! Everything the locator registry, the wait-act primitives and the flow
//! orchestrator exchange lives here: logical target names, layout variants,
//! locator expressions, browsing contexts and the driver collaborator seam.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod driver;
#[cfg(any(test, feature = "stub"))]
pub mod stub;

pub use driver::{Driver, DriverError, ElementHandle, ElementState};

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a UI concept, independent of how any layout renders it.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalTarget(Cow<'static, str>);

impl LogicalTarget {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Layout/device classification selecting which locator expression applies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantTag {
    Desktop,
    Mobile,
    Tablet,
}

impl VariantTag {
    pub const ALL: [VariantTag; 3] = [VariantTag::Desktop, VariantTag::Mobile, VariantTag::Tablet];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantTag::Desktop => "desktop",
            VariantTag::Mobile => "mobile",
            VariantTag::Tablet => "tablet",
        }
    }
}

impl Default for VariantTag {
    fn default() -> Self {
        VariantTag::Desktop
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(VariantTag::Desktop),
            "mobile" => Ok(VariantTag::Mobile),
            "tablet" => Ok(VariantTag::Tablet),
            other => Err(format!("unknown variant '{}'", other)),
        }
    }
}

/// How the driver should interpret a locator expression's value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStrategy {
    /// Element id attribute
    Id,
    /// CSS selector, typically an attribute predicate
    Css,
    /// Structural XPath
    XPath,
    /// Element whose own text contains the value
    Text,
}

impl SelectionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            SelectionStrategy::Id => "id",
            SelectionStrategy::Css => "css",
            SelectionStrategy::XPath => "xpath",
            SelectionStrategy::Text => "text",
        }
    }
}

/// Engine-specific selector. Never interpreted outside the driver.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LocatorExpression {
    pub strategy: SelectionStrategy,
    pub value: String,
}

impl LocatorExpression {
    pub fn new(strategy: SelectionStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(SelectionStrategy::Id, value)
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(SelectionStrategy::Css, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(SelectionStrategy::XPath, value)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(SelectionStrategy::Text, value)
    }
}

impl fmt::Display for LocatorExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy.name(), self.value)
    }
}

/// Document that locator resolution and actions currently apply to.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowsingContext {
    Top,
    Embedded(String),
}

impl BrowsingContext {
    pub fn embedded(name: impl Into<String>) -> Self {
        BrowsingContext::Embedded(name.into())
    }

    pub fn is_top(&self) -> bool {
        matches!(self, BrowsingContext::Top)
    }

    pub fn name(&self) -> &str {
        match self {
            BrowsingContext::Top => "top",
            BrowsingContext::Embedded(name) => name,
        }
    }
}

impl Default for BrowsingContext {
    fn default() -> Self {
        BrowsingContext::Top
    }
}

impl fmt::Display for BrowsingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowsingContext::Top => f.write_str("top"),
            BrowsingContext::Embedded(name) => write!(f, "embedded:{}", name),
        }
    }
}

/// A logical target paired with the expression chosen for one variant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedTarget {
    pub target: LogicalTarget,
    pub variant: VariantTag,
    pub locator: LocatorExpression,
}

impl ResolvedTarget {
    pub fn new(target: LogicalTarget, variant: VariantTag, locator: LocatorExpression) -> Self {
        Self {
            target,
            variant,
            locator,
        }
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] -> {}", self.target, self.variant, self.locator)
    }
}
