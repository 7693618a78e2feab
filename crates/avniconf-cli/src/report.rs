//! Human-readable rendering of run summaries and hierarchy resolutions.

use avniconf_core::{ConfigSummary, HierarchyResolution, OutcomeStatus};
use serde::Serialize;

/// Renders a run summary as a plain-text report.
pub fn render_text(summary: &ConfigSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Result: {} ({})\n",
        wire_name(&summary.result),
        wire_name(&summary.status)
    ));
    out.push_str(&format!("{}\n", summary.message));

    for report in &summary.results {
        let counts = report.counts();
        out.push_str(&format!(
            "\n{} ({} created, {} skipped, {} failed)\n",
            report.kind, counts.successful, counts.skipped, counts.failed
        ));
        for outcome in &report.outcomes {
            let marker = match outcome.status {
                OutcomeStatus::Success => "+",
                OutcomeStatus::Skipped => "=",
                OutcomeStatus::Error => "!",
            };
            if outcome.is_error() {
                out.push_str(&format!(
                    "  {} {} [{}]: {}\n",
                    marker, outcome.name, outcome.status_code, outcome.message
                ));
            } else {
                out.push_str(&format!("  {} {}: {}\n", marker, outcome.name, outcome.message));
            }
        }
    }

    push_warnings(&mut out, &summary.warnings);
    out.push_str(&format!("\nNext step: {}\n", wire_name(&summary.flow_action)));
    out
}

/// Renders the parent assignment of every location, one per line.
pub fn render_resolution(resolution: &HierarchyResolution) -> String {
    let mut out = String::new();

    for location in &resolution.locations {
        let level = location
            .level
            .map(|l| l.to_string())
            .unwrap_or_else(|| "?".to_string());
        let parent = location.parent_name.as_deref().unwrap_or("(none)");
        out.push_str(&format!("[{}] {} -> {}\n", level, location.name, parent));
    }

    push_warnings(&mut out, &resolution.warnings);
    out
}

fn push_warnings<W: std::fmt::Display>(out: &mut String, warnings: &[W]) {
    if warnings.is_empty() {
        return;
    }
    out.push_str("\nWarnings:\n");
    for warning in warnings {
        out.push_str(&format!("  - {}\n", warning));
    }
}

/// The serialized name of a unit enum variant, e.g. `partial_success`.
fn wire_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}
