//! Report artifacts — JSON summary, markdown report, CSV results table.
//!
//! The summary itself stays deterministic; timestamps are added only at
//! render time.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::aggregate::StudySummary;
use crate::orchestrator::{EvaluationResult, Outcome};

/// Serialize the summary to pretty-printed JSON.
pub fn summary_to_json(summary: &StudySummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("serializing study summary")
}

/// Write the JSON summary artifact.
pub fn write_summary_json(summary: &StudySummary, path: &Path) -> Result<()> {
    let json = summary_to_json(summary)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

const INSUFFICIENT: &str = "insufficient data";

fn opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.6}"),
        None => INSUFFICIENT.to_string(),
    }
}

/// Render the human-readable markdown report.
pub fn render_markdown(summary: &StudySummary) -> String {
    let mut report = format!(
        "# VariLab Study Report\n\n\
Run: `{}`\n\
Generated: {}\n\
Seed: {}\n\n\
## Samples\n\
- Requested: {}\n\
- Succeeded: {}\n\
- Failed: {}\n",
        summary.runtitle,
        Utc::now().format("%Y-%m-%d %H:%M UTC"),
        summary.seed,
        summary.n_samples,
        summary.n_success,
        summary.n_failed,
    );

    if summary.n_samples == 0 {
        report.push_str("\nNo samples were evaluated; no statistics to report.\n");
        return report;
    }

    report.push_str("\n## Output Statistics\n\n");
    report.push_str("| Output | Mean | Std | Min | Max | P10 | Median | P90 | N |\n");
    report.push_str("|--------|------|-----|-----|-----|-----|--------|-----|---|\n");
    for o in &summary.outputs {
        let _ = writeln!(
            report,
            "| {} | {:.6} | {} | {:.6} | {:.6} | {:.6} | {:.6} | {:.6} | {} |",
            o.name,
            o.mean,
            opt(o.std),
            o.min,
            o.max,
            o.p10,
            o.median,
            o.p90,
            o.n
        );
    }

    let fom = &summary.figure_of_merit;
    report.push_str("\n## Figure of Merit\n");
    let _ = writeln!(report, "- Variable: `{}`", fom.name);
    let _ = writeln!(report, "- Reference mean: {:.6}", fom.reference_mean);
    let _ = writeln!(report, "- Observed mean: {}", opt(fom.observed_mean));
    match fom.relative_delta {
        Some(d) => {
            let _ = writeln!(report, "- Relative delta: {:+.4}%", d * 100.0);
        }
        None => {
            let _ = writeln!(report, "- Relative delta: {INSUFFICIENT}");
        }
    }

    if let Some(sobol) = &summary.sobol {
        report.push_str("\n## Sobol Indices\n\n");
        let _ = writeln!(report, "Base points per matrix: {}\n", sobol.n_base);
        report.push_str("| Variable | Output | First-order | Total-order |\n");
        report.push_str("|----------|--------|-------------|-------------|\n");
        for idx in &sobol.indices {
            let _ = writeln!(
                report,
                "| {} | {} | {} | {} |",
                idx.variable,
                idx.output,
                opt(idx.first_order),
                opt(idx.total_order)
            );
        }
    }

    if let Some(morris) = &summary.morris {
        report.push_str("\n## Morris Elementary Effects\n\n");
        let _ = writeln!(report, "Trajectories: {}\n", morris.trajectories);
        report.push_str("| Variable | Output | Mean | Mean abs | Std |\n");
        report.push_str("|----------|--------|------|----------|-----|\n");
        for e in &morris.effects {
            let _ = writeln!(
                report,
                "| {} | {} | {} | {} | {} |",
                e.variable,
                e.output,
                opt(e.mean),
                opt(e.mean_abs),
                opt(e.std)
            );
        }
    }

    if !summary.failures.is_empty() {
        report.push_str("\n## Failures\n\n");
        for f in &summary.failures {
            let _ = writeln!(report, "- sample {}: {}", f.index, f.reason);
        }
    }

    report
}

/// Write the (sample, outputs, status) table as a CSV artifact.
///
/// Column layout: sample index, one column per input variable (taken from the
/// first sample), one column per output variable, status, reason.
pub fn write_results_csv(
    results: &[EvaluationResult],
    output_vars: &[String],
    path: &Path,
) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    let var_names: Vec<String> = results
        .first()
        .map(|r| r.sample.values.iter().map(|(n, _)| n.clone()).collect())
        .unwrap_or_default();

    let mut header = vec!["sample".to_string()];
    header.extend(var_names.iter().cloned());
    header.extend(output_vars.iter().cloned());
    header.push("status".to_string());
    header.push("reason".to_string());
    writer.write_record(&header).context("writing csv header")?;

    for r in results {
        let mut record = vec![r.index.to_string()];
        for name in &var_names {
            record.push(match r.sample.get(name) {
                Some(v) => v.to_string(),
                None => String::new(),
            });
        }
        match &r.outcome {
            Outcome::Success { outputs } => {
                for name in output_vars {
                    record.push(outputs.get(name).map(|v| v.to_string()).unwrap_or_default());
                }
                record.push("success".to_string());
                record.push(String::new());
            }
            Outcome::Failure { reason } => {
                for _ in output_vars {
                    record.push(String::new());
                }
                record.push("failure".to_string());
                record.push(reason.clone());
            }
        }
        writer.write_record(&record).context("writing csv record")?;
    }

    writer.flush().context("flushing csv")?;
    Ok(())
}
