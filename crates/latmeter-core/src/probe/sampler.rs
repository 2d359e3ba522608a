use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::client::HttpClient;
use crate::table::SessionRow;

// ---------------------------------------------------------------------------
// AttemptOutcome — one timed request within a session
// ---------------------------------------------------------------------------

/// The outcome of a single timed attempt. A failed attempt (timeout,
/// connection error, or an HTTP error status) carries no status code when
/// the request never produced a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AttemptOutcome {
    pub url: String,
    pub attempt: u32,
    pub elapsed_ms: f64,
    pub status: Option<u16>,
    pub ok: bool,
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ok {
            write!(
                f,
                "{} attempt {}: {:.2} ms (status {})",
                self.url,
                self.attempt,
                self.elapsed_ms,
                self.status.unwrap_or(0)
            )
        } else {
            write!(
                f,
                "{} attempt {}: ERROR after {:.2} ms",
                self.url, self.attempt, self.elapsed_ms
            )
        }
    }
}

// ---------------------------------------------------------------------------
// LatencySession — N sequential timed attempts against one URL
// ---------------------------------------------------------------------------

/// One test session: a fixed number of sequential GET attempts against a
/// single URL. No retries, no concurrency; every attempt runs to its own
/// completion or timeout and the session always finishes its full count.
pub struct LatencySession {
    url: String,
    attempts: u32,
    label: String,
    run_started_at: String,
}

impl LatencySession {
    /// Capture the wall-clock session start at construction time, so the
    /// persisted row reflects when the session was created.
    pub fn new(url: impl Into<String>, attempts: u32, label: impl Into<String>) -> Self {
        Self {
            url: url.into().trim().to_string(),
            attempts,
            label: label.into(),
            run_started_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run the session's full attempt count, one attempt at a time.
    ///
    /// An attempt is successful only when the request completed and the
    /// final status is not an HTTP error (2xx/3xx). Failures are recorded
    /// and probing continues.
    pub async fn run(&self, client: &HttpClient) -> Vec<AttemptOutcome> {
        let mut outcomes = Vec::with_capacity(self.attempts as usize);

        for attempt in 1..=self.attempts {
            let start = Instant::now();
            let outcome = match client.get(&self.url).await {
                Ok(status) => {
                    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                    AttemptOutcome {
                        url: self.url.clone(),
                        attempt,
                        elapsed_ms,
                        status: Some(status),
                        ok: (200..400).contains(&status),
                    }
                }
                Err(err) => {
                    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                    tracing::debug!(url = %self.url, attempt, error = %err, "attempt failed");
                    AttemptOutcome {
                        url: self.url.clone(),
                        attempt,
                        elapsed_ms,
                        status: None,
                        ok: false,
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Reduce the attempt outcomes into the session's single persisted row.
    ///
    /// Latency aggregates cover successful attempts only and are rounded to
    /// two decimals; all three are absent when nothing succeeded.
    pub fn summarize(&self, outcomes: &[AttemptOutcome]) -> SessionRow {
        let times: Vec<f64> = outcomes
            .iter()
            .filter(|o| o.ok)
            .map(|o| o.elapsed_ms)
            .collect();

        let successes = times.len() as u32;
        let failures = outcomes.len() as u32 - successes;

        let (min_ms, max_ms, avg_ms) = if times.is_empty() {
            (None, None, None)
        } else {
            let min = times.iter().copied().fold(f64::INFINITY, f64::min);
            let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let avg = times.iter().sum::<f64>() / times.len() as f64;
            (Some(round2(min)), Some(round2(max)), Some(round2(avg)))
        };

        SessionRow {
            run_started_at: self.run_started_at.clone(),
            label: self.label.clone(),
            url: self.url.clone(),
            attempts: self.attempts,
            successes,
            failures,
            min_ms,
            max_ms,
            avg_ms,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
