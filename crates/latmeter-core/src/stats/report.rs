use serde::Serialize;

use super::{OverallStatistics, PerUrlStatistics};

/// Computed statistics bundled for export. Consumers must treat the
/// contents as read-only; `cv_latency` and `performance_score` are
/// policy-normalized, not raw arithmetic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StatsReport<'a> {
    pub overall: &'a OverallStatistics,
    pub per_url: &'a [PerUrlStatistics],
}

/// Render a human-readable report: overall block first, one labeled block
/// per URL second. Pure formatting over already-computed statistics.
pub fn render_report(overall: &OverallStatistics, per_url: &[PerUrlStatistics]) -> String {
    let mut out = String::new();

    out.push_str("Overall\n");
    out.push_str(&format!("  Total attempts:   {}\n", overall.total_attempts));
    out.push_str(&format!("  Total successes:  {}\n", overall.total_successes));
    out.push_str(&format!("  Total failures:   {}\n", overall.total_failures));
    out.push_str(&format!(
        "  Success rate:     {:.2}%\n",
        overall.overall_success_rate
    ));
    out.push_str(&format!(
        "  Avg latency:      {}\n",
        fmt_ms(overall.overall_avg_latency_ms)
    ));
    out.push_str(&format!(
        "  StdDev latency:   {}\n",
        fmt_ms(overall.overall_stddev_latency_ms)
    ));
    out.push_str(&format!(
        "  Min latency:      {}\n",
        fmt_ms(overall.min_latency_ms)
    ));
    out.push_str(&format!(
        "  Max latency:      {}\n",
        fmt_ms(overall.max_latency_ms)
    ));

    out.push_str("\nPer-URL\n");
    for s in per_url {
        out.push_str(&format!("  {}\n", s.url));
        out.push_str(&format!(
            "    Attempts:         {} ({} ok, {} failed)\n",
            s.attempts_total, s.successes_total, s.failures_total
        ));
        out.push_str(&format!(
            "    Success rate:     {:.2}%   Failure rate: {:.2}%\n",
            s.success_rate, s.failure_rate
        ));
        out.push_str(&format!(
            "    Latency:          min {}  max {}  avg {}\n",
            fmt_ms(s.min_latency_ms),
            fmt_ms(s.max_latency_ms),
            fmt_ms(s.avg_latency_ms)
        ));
        out.push_str(&format!(
            "    Spread:           range {}  max dev {}  stddev {}\n",
            fmt_ms(s.latency_range_ms),
            fmt_ms(s.max_dev_from_avg),
            fmt_ms(s.stddev_latency_ms)
        ));
        out.push_str(&format!("    CV latency:       {:.2}%\n", s.cv_latency));
        out.push_str(&format!(
            "    Performance:      {}\n",
            match s.performance_score {
                Some(score) => format!("{score:.2}"),
                None => "n/a".to_string(),
            }
        ));
    }

    out
}

/// Export the same two projections as pretty-printed JSON.
pub fn export_json(
    overall: &OverallStatistics,
    per_url: &[PerUrlStatistics],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&StatsReport { overall, per_url })
}

fn fmt_ms(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2} ms"),
        None => "n/a".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
