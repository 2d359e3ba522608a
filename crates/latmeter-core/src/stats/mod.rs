pub mod report;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::LatmeterError;
use crate::table::{LatencyTable, SessionRow};

// ---------------------------------------------------------------------------
// PerUrlStatistics — derived, one row per distinct URL
// ---------------------------------------------------------------------------

/// Derived statistics for all sessions of a single URL.
///
/// `success_rate`/`failure_rate` are weighted by the group's summed attempt
/// count, not averaged over per-session rates. `avg_latency_ms` is the mean
/// of per-session averages (sessions weigh equally regardless of their
/// attempt count). `cv_latency` is policy-normalized: always finite, `0.0`
/// when the standard deviation or mean is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PerUrlStatistics {
    pub url: String,
    pub attempts_total: u64,
    pub successes_total: u64,
    pub failures_total: u64,
    pub success_rate: f64,
    pub failure_rate: f64,
    /// Minimum of per-session `min_ms`; `None` when no session succeeded.
    pub min_latency_ms: Option<f64>,
    /// Maximum of per-session `max_ms`.
    pub max_latency_ms: Option<f64>,
    /// Mean of per-session `avg_ms` values.
    pub avg_latency_ms: Option<f64>,
    /// Sample standard deviation of per-session `avg_ms`; `None` with fewer
    /// than 2 sessions carrying an average.
    pub stddev_latency_ms: Option<f64>,
    pub latency_range_ms: Option<f64>,
    pub max_dev_from_avg: Option<f64>,
    /// Coefficient of variation as a percentage. Lower is more consistent.
    pub cv_latency: f64,
    /// `(1000 / avg_latency_ms) * (successes_total / attempts_total)`.
    /// Higher is better; `None` when the average is zero or unavailable.
    pub performance_score: Option<f64>,
}

// ---------------------------------------------------------------------------
// OverallStatistics — one summary across the whole table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OverallStatistics {
    pub total_attempts: u64,
    pub total_successes: u64,
    pub total_failures: u64,
    /// Sum-weighted: summed successes over summed attempts.
    pub overall_success_rate: f64,
    /// Mean of per-session `avg_ms` values, not attempt-weighted.
    pub overall_avg_latency_ms: Option<f64>,
    pub overall_stddev_latency_ms: Option<f64>,
    pub min_latency_ms: Option<f64>,
    pub max_latency_ms: Option<f64>,
}

// ---------------------------------------------------------------------------
// Statistics engine
// ---------------------------------------------------------------------------

/// Compute per-URL statistics over the table.
///
/// Rows are partitioned by exact (already trimmed) URL; groups appear in
/// first-seen row order, which keeps display output deterministic. An empty
/// table fails with [`LatmeterError::NoData`] before any grouping happens.
pub fn per_url_statistics(table: &LatencyTable) -> Result<Vec<PerUrlStatistics>, LatmeterError> {
    if table.is_empty() {
        return Err(LatmeterError::NoData);
    }

    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&SessionRow>> = HashMap::new();
    for row in table.rows() {
        let entry = groups.entry(row.url.as_str()).or_default();
        if entry.is_empty() {
            order.push(row.url.as_str());
        }
        entry.push(row);
    }

    order
        .iter()
        .map(|url| group_statistics(url, &groups[url]))
        .collect()
}

/// Compute one summary over the whole table, no grouping.
pub fn overall_statistics(table: &LatencyTable) -> Result<OverallStatistics, LatmeterError> {
    if table.is_empty() {
        return Err(LatmeterError::NoData);
    }

    let rows = table.rows();
    let total_attempts: u64 = rows.iter().map(|r| u64::from(r.attempts)).sum();
    let total_successes: u64 = rows.iter().map(|r| u64::from(r.successes)).sum();
    let total_failures: u64 = rows.iter().map(|r| u64::from(r.failures)).sum();

    let overall_success_rate =
        rate_pct(total_successes, total_attempts, "overall_success_rate", "table")?;

    let avgs: Vec<f64> = rows.iter().filter_map(|r| r.avg_ms).collect();
    let overall_avg_latency_ms = mean(&avgs);
    let overall_stddev_latency_ms = sample_stddev(&avgs, overall_avg_latency_ms);

    Ok(OverallStatistics {
        total_attempts,
        total_successes,
        total_failures,
        overall_success_rate,
        overall_avg_latency_ms,
        overall_stddev_latency_ms,
        min_latency_ms: rows.iter().filter_map(|r| r.min_ms).reduce(f64::min),
        max_latency_ms: rows.iter().filter_map(|r| r.max_ms).reduce(f64::max),
    })
}

fn group_statistics(url: &str, rows: &[&SessionRow]) -> Result<PerUrlStatistics, LatmeterError> {
    let attempts_total: u64 = rows.iter().map(|r| u64::from(r.attempts)).sum();
    let successes_total: u64 = rows.iter().map(|r| u64::from(r.successes)).sum();
    let failures_total: u64 = rows.iter().map(|r| u64::from(r.failures)).sum();

    // Rates use the group's own attempts total as denominator, so high-volume
    // sessions weigh more than a naive mean of per-session rates would allow.
    let success_rate = rate_pct(successes_total, attempts_total, "success_rate", url)?;
    let failure_rate = rate_pct(failures_total, attempts_total, "failure_rate", url)?;

    let min_latency_ms = rows.iter().filter_map(|r| r.min_ms).reduce(f64::min);
    let max_latency_ms = rows.iter().filter_map(|r| r.max_ms).reduce(f64::max);

    let avgs: Vec<f64> = rows.iter().filter_map(|r| r.avg_ms).collect();
    let avg_latency_ms = mean(&avgs);
    let stddev_latency_ms = sample_stddev(&avgs, avg_latency_ms);

    let latency_range_ms = match (max_latency_ms, min_latency_ms) {
        (Some(max), Some(min)) => Some(max - min),
        _ => None,
    };
    let max_dev_from_avg = match (max_latency_ms, avg_latency_ms) {
        (Some(max), Some(avg)) => Some(max - avg),
        _ => None,
    };

    let performance_score = match avg_latency_ms {
        Some(avg) if avg != 0.0 => {
            Some((1000.0 / avg) * (successes_total as f64 / attempts_total as f64))
        }
        _ => None,
    };

    Ok(PerUrlStatistics {
        url: url.to_string(),
        attempts_total,
        successes_total,
        failures_total,
        success_rate,
        failure_rate,
        min_latency_ms,
        max_latency_ms,
        avg_latency_ms,
        stddev_latency_ms,
        latency_range_ms,
        max_dev_from_avg,
        cv_latency: normalized_cv(stddev_latency_ms, avg_latency_ms),
        performance_score,
    })
}

// ---------------------------------------------------------------------------
// Numeric policy helpers — denominators are checked before any division,
// never computed and patched afterwards.
// ---------------------------------------------------------------------------

fn rate_pct(
    count: u64,
    attempts: u64,
    operation: &str,
    scope: &str,
) -> Result<f64, LatmeterError> {
    if attempts == 0 {
        return Err(LatmeterError::stats(
            operation,
            format!("attempts total is zero for {scope}"),
        ));
    }
    Ok(count as f64 / attempts as f64 * 100.0)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n − 1 denominator). Undefined below 2 samples.
fn sample_stddev(values: &[f64], mean: Option<f64>) -> Option<f64> {
    let mean = mean?;
    if values.len() < 2 {
        return None;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Coefficient of variation, normalized to `0.0` whenever the standard
/// deviation or mean is unavailable, the mean is zero, or the result would
/// not be finite.
fn normalized_cv(stddev: Option<f64>, avg: Option<f64>) -> f64 {
    let (Some(stddev), Some(avg)) = (stddev, avg) else {
        return 0.0;
    };
    if avg == 0.0 {
        return 0.0;
    }
    let cv = stddev / avg * 100.0;
    if cv.is_finite() {
        cv
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
