//! Locator Registry - logical target resolution per layout variant
//!
//! This crate owns the single seam where desktop and mobile layouts diverge:
//! - An immutable `(target, variant) -> expression` table built once at startup
//! - Variant-agnostic fallback when a target renders identically everywhere
//! - Construction-time rejection of duplicate or empty definitions
//! - Build-time locator overrides loaded from configuration

pub mod errors;
pub mod resolver;
pub mod types;

pub use errors::*;
pub use resolver::*;
pub use types::*;
