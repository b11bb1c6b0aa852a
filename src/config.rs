//! Run configuration
//!
//! Loaded once per invocation from YAML. Every field has a default, so an
//! empty or missing file yields a runnable desktop configuration.

use std::path::{Path, PathBuf};

use action_flow::CheckoutInput;
use action_locator::LocatorOverride;
use action_primitives::WaitPolicy;
use anyhow::{Context, Result};
use checkout_core_types::VariantTag;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

const CONFIG_FILE: &str = "checkout.yaml";
const CONFIG_DIR: &str = "checkout-e2e";

const IPHONE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 13_6 like Mac OS X) \
AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.1.2 Mobile/15E148 Safari/604.1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("variant '{0}' has no checkout layout")]
    UnsupportedVariant(VariantTag),

    #[error("device profile for {variant} has zero {dimension}")]
    EmptyViewport {
        variant: VariantTag,
        dimension: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Checkout page loaded at the start of every scenario
    pub base_url: String,
    pub webdriver_url: String,
    pub variant: VariantTag,
    pub wait: WaitPolicy,
    pub data: CheckoutInput,
    pub devices: Devices,
    pub locator_overrides: Vec<LocatorOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://example.com/payment".to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            variant: VariantTag::Desktop,
            wait: WaitPolicy::default(),
            data: CheckoutInput::default(),
            devices: Devices::default(),
            locator_overrides: Vec::new(),
        }
    }
}

impl Config {
    /// Reject settings the session layer would only discover mid-run
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_variant(self.variant)?;
        for variant in [VariantTag::Desktop, VariantTag::Mobile] {
            let profile = self.devices.profile(variant)?;
            if profile.width == 0 {
                return Err(ConfigError::EmptyViewport {
                    variant,
                    dimension: "width",
                });
            }
            if profile.height == 0 {
                return Err(ConfigError::EmptyViewport {
                    variant,
                    dimension: "height",
                });
            }
        }
        Ok(())
    }
}

fn check_variant(variant: VariantTag) -> Result<(), ConfigError> {
    match variant {
        VariantTag::Desktop | VariantTag::Mobile => Ok(()),
        VariantTag::Tablet => Err(ConfigError::UnsupportedVariant(variant)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Devices {
    pub desktop: DeviceProfile,
    pub mobile: DeviceProfile,
}

impl Default for Devices {
    fn default() -> Self {
        Self {
            desktop: DeviceProfile {
                width: 1920,
                height: 1080,
                pixel_ratio: 1.0,
                user_agent: None,
                emulate: false,
            },
            mobile: DeviceProfile {
                width: 414,
                height: 896,
                pixel_ratio: 3.0,
                user_agent: Some(IPHONE_USER_AGENT.to_string()),
                emulate: true,
            },
        }
    }
}

impl Devices {
    pub fn profile(&self, variant: VariantTag) -> Result<&DeviceProfile, ConfigError> {
        match variant {
            VariantTag::Desktop => Ok(&self.desktop),
            VariantTag::Mobile => Ok(&self.mobile),
            VariantTag::Tablet => Err(ConfigError::UnsupportedVariant(variant)),
        }
    }
}

/// Browser window or emulated device a variant runs in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f64,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Use the browser's device emulation instead of sizing the window
    #[serde(default)]
    pub emulate: bool,
}

fn default_pixel_ratio() -> f64 {
    1.0
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

/// Default lookup: `./config/checkout.yaml`, then the user config directory
pub fn default_config_path() -> Result<PathBuf> {
    let local_config = Path::new("config").join(CONFIG_FILE);
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    Ok(path)
}

pub async fn load_config(config_path: Option<&Path>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if !config_path.exists() {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        return Ok(LoadedConfig {
            config: Config::default(),
            path: config_path,
        });
    }

    let content = fs::read_to_string(&config_path)
        .await
        .context("Failed to read config file")?;
    let config: Config = if content.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&content).context("Failed to parse config file")?
    };
    config.validate().context("Invalid configuration")?;

    info!("Loaded configuration from: {}", config_path.display());
    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}
