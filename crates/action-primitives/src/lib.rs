//! Wait-Act Primitives - bounded synchronization for browser interactions
//!
//! This crate provides the single interaction layer every checkout action goes through:
//! - `await_visible` / `await_present`: poll until the element is actionable or the wait window closes
//! - `click` / `type_text`: wait, then perform exactly one driver interaction (no retries)
//! - `is_visible`: the only non-throwing probe
//! - Outcome logging for every operation (target, context, latency)

pub mod errors;
mod primitives;
pub mod types;
mod waiting;

pub use errors::*;
pub use primitives::*;
pub use types::*;
pub use waiting::*;
