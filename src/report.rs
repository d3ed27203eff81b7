//! Run reports written to the output directory

use action_flow::{JourneyReport, StepStatus};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

pub const RESULTS_FILE: &str = "results.json";

/// Top-level `results.json` document.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub total: usize,
    pub failed: usize,
    pub reports: &'a [JourneyReport],
}

impl<'a> RunSummary<'a> {
    pub fn new(reports: &'a [JourneyReport]) -> Self {
        Self {
            generated_at: chrono::Utc::now(),
            total: reports.len(),
            failed: reports.iter().filter(|r| !r.success).count(),
            reports,
        }
    }
}

/// Write `results.json` plus one `<persona>.json` per persona.
pub async fn write_reports(output_dir: &Path, reports: &[JourneyReport]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut written = Vec::new();
    let results = output_dir.join(RESULTS_FILE);
    write_json(&results, &RunSummary::new(reports)).await?;
    written.push(results);

    let mut by_persona: BTreeMap<&str, Vec<&JourneyReport>> = BTreeMap::new();
    for report in reports {
        by_persona.entry(report.persona.as_str()).or_default().push(report);
    }
    for (persona, reports) in by_persona {
        let path = output_dir.join(format!("{}.json", persona));
        write_json(&path, &reports).await?;
        written.push(path);
    }

    info!(dir = %output_dir.display(), files = written.len(), "reports written");
    Ok(written)
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("Failed to serialize report")?;
    fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// One line per journey, then one indented line per step that did not pass.
pub fn render_human(reports: &[JourneyReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let verdict = if report.success { "PASS" } else { "FAIL" };
        out.push_str(&format!(
            "{} {:<20} {:<10} {:>7}ms",
            verdict, report.persona, report.journey, report.latency_ms
        ));
        if !report.observed_deviations.is_empty() {
            out.push_str(&format!("  deviations: {:?}", report.observed_deviations));
        }
        out.push('\n');
        for step in &report.steps {
            match step.status {
                StepStatus::Failed => {
                    let message = step.error.as_ref().map(|e| e.message.as_str()).unwrap_or("");
                    out.push_str(&format!("    x {}: {}\n", step.step_id, message));
                    if let Some(bundle) = &step.diagnostics {
                        out.push_str(&format!("      screenshot: {}\n", bundle.artifact_name));
                    }
                    for warning in &step.warnings {
                        out.push_str(&format!("      warning: {}\n", warning));
                    }
                }
                StepStatus::ExpectedDeviation => {
                    out.push_str(&format!("    ~ {} (expected deviation)\n", step.step_id));
                }
                StepStatus::Passed | StepStatus::Skipped => {}
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_flow::StepReport;

    fn report(persona: &str, success: bool) -> JourneyReport {
        let report = JourneyReport::new("login", persona, "s-1")
            .with_step(StepReport::new("open-login", "navigate").finish());
        if success {
            report.with_success().finish()
        } else {
            report.with_error("step 'open-login' failed".into()).finish()
        }
    }

    #[tokio::test]
    async fn writes_results_and_per_persona_files() {
        let dir = tempfile::tempdir().unwrap();
        let reports = vec![report("standard", true), report("locked_out", false)];
        let written = write_reports(dir.path(), &reports).await.unwrap();
        assert_eq!(written.len(), 3);

        let results: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join(RESULTS_FILE)).unwrap()).unwrap();
        assert_eq!(results["total"], 2);
        assert_eq!(results["failed"], 1);

        let standard: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("standard.json")).unwrap()).unwrap();
        assert_eq!(standard[0]["journey"], "login");
        assert_eq!(standard[0]["steps"][0]["step_id"], "open-login");
    }

    #[test]
    fn human_summary_flags_failures() {
        let text = render_human(&[report("standard", true), report("locked_out", false)]);
        assert!(text.contains("PASS standard"));
        assert!(text.contains("FAIL locked_out"));
    }
}
