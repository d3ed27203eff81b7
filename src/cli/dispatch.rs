use super::compare::cmd_compare;
use super::env::CliArgs;
use super::personas::cmd_personas;
use super::run::cmd_run;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, ctx, &cli.output).await,
        Commands::Compare(args) => cmd_compare(args, ctx, &cli.output).await,
        Commands::Personas => cmd_personas(ctx, &cli.output),
    }
}
