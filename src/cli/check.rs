use anyhow::{bail, Context, Result};
use checkout_core_types::VariantTag;
use checkout_e2e::{build_registry, Config, LocatorCoverage};

use super::output::{emit, OutputFormat};

pub fn cmd_check_locators(config: &Config, format: &OutputFormat) -> Result<()> {
    let registry = build_registry(config).context("Failed to build locator table")?;
    let report: Vec<LocatorCoverage> = [VariantTag::Desktop, VariantTag::Mobile]
        .into_iter()
        .map(|variant| LocatorCoverage::check(&registry, variant))
        .collect();

    if !emit(format, &report)? {
        println!("Locator table: {} targets", registry.len());
        for coverage in &report {
            if coverage.is_complete() {
                println!(
                    "  {:<8} ok ({} targets)",
                    coverage.variant.as_str(),
                    coverage.required
                );
            } else {
                println!(
                    "  {:<8} {} of {} unresolved",
                    coverage.variant.as_str(),
                    coverage.unresolved.len(),
                    coverage.required
                );
                for target in &coverage.unresolved {
                    println!("    - {}", target);
                }
            }
        }
    }

    let gaps: usize = report.iter().map(|coverage| coverage.unresolved.len()).sum();
    if gaps > 0 {
        bail!("{} locator gap(s) found", gaps);
    }
    Ok(())
}
