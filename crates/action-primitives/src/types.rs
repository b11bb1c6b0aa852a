//! Core data types for wait-act primitives

use checkout_core_types::{BrowsingContext, LogicalTarget, VariantTag};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Interaction performed after the wait succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    TypeText,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::TypeText => "type_text",
        }
    }
}

/// Record of one successful wait-act interaction
#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    /// Unique identifier for tracing and correlation
    pub action_id: String,

    pub kind: ActionKind,

    pub target: LogicalTarget,

    pub variant: VariantTag,

    /// Browsing context the action ran in
    pub context: BrowsingContext,

    /// When the action started
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,

    /// Wait plus interaction time in milliseconds
    pub latency_ms: u64,
}

impl ActionReport {
    pub fn success(
        kind: ActionKind,
        target: LogicalTarget,
        variant: VariantTag,
        context: BrowsingContext,
        started_at: DateTime<Utc>,
        latency_ms: u64,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            kind,
            target,
            variant,
            context,
            started_at,
            latency_ms,
        }
    }
}
