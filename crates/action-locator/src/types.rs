//! Core types for the locator registry

use checkout_core_types::{LocatorExpression, LogicalTarget, SelectionStrategy, VariantTag};
use serde::{Deserialize, Serialize};

/// Declaration of one logical target and the expressions it owns.
///
/// A definition holds at most one expression per variant plus, optionally,
/// one variant-agnostic expression used when no tagged expression applies.
#[derive(Debug, Clone)]
pub struct TargetDef {
    pub(crate) target: LogicalTarget,
    pub(crate) agnostic: Vec<LocatorExpression>,
    pub(crate) tagged: Vec<(VariantTag, LocatorExpression)>,
}

impl TargetDef {
    /// Start a definition for `target`
    pub fn new(target: LogicalTarget) -> Self {
        Self {
            target,
            agnostic: Vec::new(),
            tagged: Vec::new(),
        }
    }

    /// Expression shared by every layout
    pub fn any(mut self, expression: LocatorExpression) -> Self {
        self.agnostic.push(expression);
        self
    }

    /// Expression for one layout variant
    pub fn on(mut self, variant: VariantTag, expression: LocatorExpression) -> Self {
        self.tagged.push((variant, expression));
        self
    }

    pub fn desktop(self, expression: LocatorExpression) -> Self {
        self.on(VariantTag::Desktop, expression)
    }

    pub fn mobile(self, expression: LocatorExpression) -> Self {
        self.on(VariantTag::Mobile, expression)
    }

    pub fn target(&self) -> &LogicalTarget {
        &self.target
    }
}

/// Replacement expression supplied by configuration.
///
/// Applied while the registry is being built; the table is still immutable
/// once construction finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorOverride {
    /// Target to override (must already be declared)
    pub target: LogicalTarget,

    /// Variant to replace; omitted means the variant-agnostic expression
    #[serde(default)]
    pub variant: Option<VariantTag>,

    pub strategy: SelectionStrategy,

    pub value: String,
}

impl LocatorOverride {
    pub fn expression(&self) -> LocatorExpression {
        LocatorExpression::new(self.strategy, self.value.clone())
    }
}
