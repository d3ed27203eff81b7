use action_flow::{LatencyComparison, LOGIN};
use anyhow::{bail, Result};
use clap::Args;

use super::context::CliContext;
use super::output::OutputFormat;
use crate::runner::VerifyRunner;

#[derive(Args, Clone, Debug)]
pub struct CompareArgs {
    /// Baseline persona
    #[arg(long, default_value = "standard")]
    pub baseline: String,

    /// Candidate persona
    #[arg(long, default_value = "performance_glitch")]
    pub candidate: String,

    /// Step whose latency is compared
    #[arg(long, default_value = "submit-login")]
    pub step: String,
}

pub async fn cmd_compare(args: CompareArgs, ctx: &CliContext, output: &OutputFormat) -> Result<()> {
    let runner = VerifyRunner::new(ctx.config().clone());
    let selected = runner.select_personas(&[args.baseline.clone(), args.candidate.clone()])?;
    let [baseline, candidate] = selected.as_slice() else {
        bail!("expected a baseline and a candidate persona");
    };

    let baseline_report = runner.run(LOGIN, baseline).await?;
    let candidate_report = runner.run(LOGIN, candidate).await?;
    for report in [&baseline_report, &candidate_report] {
        if !report.success {
            bail!(
                "login journey failed for '{}': {}",
                report.persona,
                report.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let comparison =
        LatencyComparison::between(&args.step, &baseline_report, &candidate_report, candidate)?;
    output.emit(&comparison, || {
        let verdict = match comparison.meets_expected_added_latency {
            Some(true) => " (meets expected added latency)",
            Some(false) => " (below expected added latency)",
            None => "",
        };
        format!(
            "{}: {} {}ms vs {} {}ms, delta {:+}ms{}",
            comparison.step_id,
            comparison.baseline,
            comparison.baseline_ms,
            comparison.candidate,
            comparison.candidate_ms,
            comparison.delta_ms,
            verdict
        )
    })
}
