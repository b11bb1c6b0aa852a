//! Checkout Flow Orchestration Layer
//!
//! This crate sequences logical targets into the stages of the checkout form:
//! - A catalog of every target the flow touches and its built-in locator table
//! - Stateless stage definitions shared by desktop and mobile sessions
//! - `CheckoutSession`, one per driver, tracking variant, active browsing
//!   context and coarse stage
//! - Whole-flow convenience sequences for each layout

pub mod errors;
pub mod session;
pub mod stages;
pub mod targets;
#[cfg(any(test, feature = "stub"))]
pub mod testing;
pub mod types;

pub use errors::{FailureKind, FlowError};
pub use session::CheckoutSession;
pub use targets::checkout_registry;
pub use types::{
    Bank, CheckoutInput, CheckoutStage, Field, FlowReport, FlowStage, FlowStep, StageInputs,
    StageReport, StepAction, StepReport,
};
