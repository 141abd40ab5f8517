//! Read-only text views over an analysis session.
//!
//! Three independent views: the dashboard (metric lines plus bar charts),
//! the executive summary, and the raw JSON data.

use std::fmt::Write;

use crate::models::ResultSet;
use crate::session::AnalysisSession;

/// Width of the longest bar in a chart, in characters.
const CHART_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum View {
    Dashboard,
    Summary,
    Raw,
    All,
}

/// Render the requested view, or `None` when there is nothing to show yet.
pub fn render(session: &AnalysisSession, view: View) -> Option<String> {
    let snapshot = session.snapshot()?;
    let rendered = match view {
        View::Dashboard => render_dashboard(&snapshot.results),
        View::Summary => render_summary(snapshot.summary.as_deref()),
        View::Raw => render_raw(&snapshot.results),
        View::All => [
            render_dashboard(&snapshot.results),
            render_summary(snapshot.summary.as_deref()),
            render_raw(&snapshot.results),
        ]
        .join("\n"),
    };
    Some(rendered)
}

/// Key metrics per quarter and two bar charts (revenue, AUS).
pub fn render_dashboard(results: &ResultSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Key Metrics ==");
    for (label, record) in results.iter() {
        let _ = writeln!(
            out,
            "{label}: ${}B (EPS: ${})",
            format_number(record.revenue_bn()),
            format_number(record.eps_value())
        );
    }
    out.push('\n');

    let revenue: Vec<(&str, f64)> = results.iter().map(|(l, r)| (l, r.revenue_bn())).collect();
    out.push_str(&render_bar_chart("Quarterly Revenue ($bn)", &revenue));
    out.push('\n');

    let assets: Vec<(&str, f64)> = results.iter().map(|(l, r)| (l, r.assets_bn())).collect();
    out.push_str(&render_bar_chart("Assets Under Supervision ($bn)", &assets));
    out
}

/// The summary verbatim.
pub fn render_summary(summary: Option<&str>) -> String {
    let mut out = String::from("== Executive Summary ==\n");
    match summary {
        Some(text) => {
            out.push_str(text);
            if !text.ends_with('\n') {
                out.push('\n');
            }
        }
        None => out.push_str("(no summary available)\n"),
    }
    out
}

/// Full result set as pretty JSON.
pub fn render_raw(results: &ResultSet) -> String {
    format!("== Extracted JSON Data ==\n{}\n", results.to_pretty_json())
}

/// Horizontal bar chart scaled to the largest value in the series.
pub fn render_bar_chart(title: &str, series: &[(&str, f64)]) -> String {
    let mut out = format!("{title}\n");
    let label_width = series.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = series.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

    for (label, value) in series {
        let bar_len = if max > 0.0 && *value > 0.0 {
            ((value / max) * CHART_WIDTH as f64).round().max(1.0) as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  {label:<label_width$} | {} {}",
            "#".repeat(bar_len),
            format_number(*value)
        );
    }
    out
}

/// Integers print without a fractional part; everything else keeps its digits.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
