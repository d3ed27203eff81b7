use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use super::context::CliContext;
use super::output::OutputFormat;
use crate::report::{render_human, write_reports};
use crate::runner::VerifyRunner;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Persona to run (repeatable; default: all)
    #[arg(short, long = "persona", value_name = "KEY")]
    pub personas: Vec<String>,

    /// Journey to run
    #[arg(short, long, default_value = action_flow::PURCHASE)]
    pub journey: String,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext, output: &OutputFormat) -> Result<()> {
    let runner = VerifyRunner::new(ctx.config().clone());
    let personas = runner.select_personas(&args.personas)?;
    info!(
        config = %ctx.config_path().display(),
        journey = %args.journey,
        personas = personas.len(),
        "starting verification run"
    );

    let reports = runner.run_all(&args.journey, &personas).await?;
    write_reports(&ctx.config().output_dir, &reports).await?;
    output.emit(&reports, || render_human(&reports))?;

    let failed: Vec<&str> = reports
        .iter()
        .filter(|r| !r.success)
        .map(|r| r.persona.as_str())
        .collect();
    if !failed.is_empty() {
        bail!("journey '{}' failed for: {}", args.journey, failed.join(", "));
    }
    Ok(())
}
