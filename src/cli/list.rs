use anyhow::Result;
use checkout_e2e::Scenario;
use serde::Serialize;

use super::output::{emit, OutputFormat};

#[derive(Serialize)]
struct ScenarioEntry {
    name: &'static str,
    description: &'static str,
}

pub fn cmd_list(format: &OutputFormat) -> Result<()> {
    let entries: Vec<ScenarioEntry> = Scenario::ALL
        .iter()
        .map(|scenario| ScenarioEntry {
            name: scenario.name(),
            description: scenario.description(),
        })
        .collect();

    if emit(format, &entries)? {
        return Ok(());
    }

    println!("Available scenarios:");
    for entry in &entries {
        println!("  {:<26} {}", entry.name, entry.description);
    }
    Ok(())
}
