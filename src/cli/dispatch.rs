use anyhow::Result;
use checkout_e2e::Config;

use super::check::cmd_check_locators;
use super::commands::Commands;
use super::env::CliArgs;
use super::list::cmd_list;
use super::run::cmd_run;

pub async fn dispatch(cli: &CliArgs, config: &Config) -> Result<()> {
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, config, &cli.output).await,
        Commands::List => cmd_list(&cli.output),
        Commands::CheckLocators => cmd_check_locators(config, &cli.output),
    }
}
