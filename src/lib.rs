//! Checkout end-to-end runner
//!
//! Wires configuration, the locator table and a browser driver into
//! checkout sessions and runs the checkout scenarios against them.

pub mod config;
pub mod scenarios;
pub mod session;
#[cfg(feature = "webdriver")]
pub mod webdriver;

pub use config::{load_config, Config, ConfigError, DeviceProfile, LoadedConfig};
pub use scenarios::{run_scenario, Scenario, ScenarioOutcome};
pub use session::{build_registry, open_session, LocatorCoverage};
