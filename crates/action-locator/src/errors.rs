//! Error types for the locator registry

use checkout_core_types::{LogicalTarget, VariantTag};
use thiserror::Error;

/// Locator registry errors. Every variant is a configuration defect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// No expression applies to the requested variant
    #[error("No locator for target '{target}' on variant '{variant}'")]
    Unresolved {
        target: LogicalTarget,
        variant: VariantTag,
    },

    /// Two definitions share a target identifier
    #[error("Target '{0}' is defined more than once")]
    DuplicateTarget(LogicalTarget),

    /// One definition tags the same variant twice (None = variant-agnostic)
    #[error("Target '{target}' declares {} more than once", variant_label(.variant))]
    DuplicateVariant {
        target: LogicalTarget,
        variant: Option<VariantTag>,
    },

    /// Definition carries no expression at all
    #[error("Target '{0}' has no locator expression")]
    EmptyTarget(LogicalTarget),

    /// Override names a target the table never declared
    #[error("Override refers to unknown target '{0}'")]
    UnknownTarget(LogicalTarget),
}

fn variant_label(variant: &Option<VariantTag>) -> &'static str {
    match variant {
        Some(variant) => variant.as_str(),
        None => "the variant-agnostic expression",
    }
}

impl LocatorError {
    /// Target the error is about
    pub fn target(&self) -> &LogicalTarget {
        match self {
            LocatorError::Unresolved { target, .. }
            | LocatorError::DuplicateVariant { target, .. } => target,
            LocatorError::DuplicateTarget(target)
            | LocatorError::EmptyTarget(target)
            | LocatorError::UnknownTarget(target) => target,
        }
    }
}
