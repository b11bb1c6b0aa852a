use clap::Subcommand;

use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run checkout scenarios against a WebDriver endpoint
    Run(RunArgs),

    /// List the available scenarios
    List,

    /// Verify the locator table covers every layout
    CheckLocators,
}
