use anyhow::Result;
use clap::{Args, ValueEnum};
use checkout_core_types::VariantTag;
use checkout_e2e::{Config, Scenario, ScenarioOutcome};

use super::output::{emit, OutputFormat};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum VariantArg {
    Desktop,
    Mobile,
}

impl From<VariantArg> for VariantTag {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Desktop => VariantTag::Desktop,
            VariantArg::Mobile => VariantTag::Mobile,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Scenario to run (repeatable; defaults to all)
    #[arg(short, long, value_enum)]
    pub scenario: Vec<Scenario>,

    /// Layout to run against (defaults to the configured variant)
    #[arg(short, long, value_enum)]
    pub variant: Option<VariantArg>,

    /// Override the configured checkout URL
    #[arg(long)]
    pub url: Option<String>,
}

impl RunArgs {
    fn scenarios(&self) -> Vec<Scenario> {
        if self.scenario.is_empty() {
            Scenario::ALL.to_vec()
        } else {
            self.scenario.clone()
        }
    }
}

pub async fn cmd_run(args: RunArgs, config: &Config, format: &OutputFormat) -> Result<()> {
    let variant = args.variant.map(VariantTag::from).unwrap_or(config.variant);
    let url = args.url.clone().unwrap_or_else(|| config.base_url.clone());
    let outcomes = execute(&args.scenarios(), variant, &url, config).await?;
    report(&outcomes, format)
}

#[cfg(feature = "webdriver")]
async fn execute(
    scenarios: &[Scenario],
    variant: VariantTag,
    url: &str,
    config: &Config,
) -> Result<Vec<ScenarioOutcome>> {
    use anyhow::Context;
    use checkout_e2e::webdriver::WebDriver;
    use checkout_e2e::{build_registry, open_session, run_scenario};
    use std::sync::Arc;

    let registry = build_registry(config).context("Failed to build locator table")?;
    let profile = config.devices.profile(variant)?;

    let mut outcomes = Vec::with_capacity(scenarios.len());
    for &scenario in scenarios {
        // Fresh browser per scenario
        let driver = WebDriver::connect(&config.webdriver_url, profile).await?;
        let session = open_session(Arc::new(driver), registry.clone(), config, variant)
            .with_context(|| format!("Failed to open {} session", variant))?;
        outcomes.push(run_scenario(session, scenario, url, &config.data).await);
    }
    Ok(outcomes)
}

#[cfg(not(feature = "webdriver"))]
async fn execute(
    _scenarios: &[Scenario],
    _variant: VariantTag,
    _url: &str,
    _config: &Config,
) -> Result<Vec<ScenarioOutcome>> {
    anyhow::bail!(
        "the run command needs a browser driver; rebuild with `--features webdriver`"
    )
}

fn report(outcomes: &[ScenarioOutcome], format: &OutputFormat) -> Result<()> {
    if !emit(format, &outcomes)? {
        for outcome in outcomes {
            println!(
                "{} {:<26} [{}] {}ms  {}",
                if outcome.passed { "PASS" } else { "FAIL" },
                outcome.scenario.name(),
                outcome.variant,
                outcome.latency_ms,
                outcome.detail
            );
        }
    }

    let failed = outcomes.iter().filter(|outcome| !outcome.passed).count();
    if failed > 0 {
        anyhow::bail!("{} of {} scenario(s) failed", failed, outcomes.len());
    }
    Ok(())
}
