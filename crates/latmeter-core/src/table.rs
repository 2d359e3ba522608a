use serde::{Deserialize, Serialize};

/// Column order of the persisted latency log. The header is written in
/// exactly this order and the loader validates against these names.
pub const LOG_COLUMNS: [&str; 9] = [
    "run_started_at",
    "label",
    "url",
    "attempts",
    "successes",
    "failures",
    "min_ms",
    "max_ms",
    "avg_ms",
];

// ---------------------------------------------------------------------------
// SessionRow — one persisted test session
// ---------------------------------------------------------------------------

/// Summary of a single test session: a fixed number of timed attempts
/// against one URL. One row per session in the persistent log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionRow {
    /// Wall-clock session start, formatted `%Y-%m-%d %H:%M:%S`.
    pub run_started_at: String,
    /// Free-text session tag (network name, environment, ...).
    pub label: String,
    pub url: String,
    pub attempts: u32,
    pub successes: u32,
    pub failures: u32,
    /// Latency of successful attempts only. All three are `None` when the
    /// session had zero successes.
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,
    pub avg_ms: Option<f64>,
}

impl SessionRow {
    /// Stringified value of a named column, for ad-hoc equality queries.
    /// Absent latency values stringify as the empty string; whole-number
    /// latencies print without a decimal point.
    pub fn cell(&self, column: &str) -> Option<String> {
        let value = match column {
            "run_started_at" => self.run_started_at.clone(),
            "label" => self.label.clone(),
            "url" => self.url.clone(),
            "attempts" => self.attempts.to_string(),
            "successes" => self.successes.to_string(),
            "failures" => self.failures.to_string(),
            "min_ms" => fmt_opt(self.min_ms),
            "max_ms" => fmt_opt(self.max_ms),
            "avg_ms" => fmt_opt(self.avg_ms),
            _ => return None,
        };
        Some(value)
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// LatencyTable — in-memory, ordered view of the log
// ---------------------------------------------------------------------------

/// An ordered collection of [`SessionRow`], one row per session, possibly
/// spanning many URLs and many runs over time. Constructed fresh from the
/// log (or from rows already in memory) for each analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyTable {
    rows: Vec<SessionRow>,
}

impl LatencyTable {
    /// Build a table from rows already in memory. URL values are trimmed so
    /// in-memory tables obey the same invariant as loaded ones.
    pub fn from_rows(rows: Vec<SessionRow>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.url = row.url.trim().to_string();
                row
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[SessionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_exists(column: &str) -> bool {
        LOG_COLUMNS.contains(&column)
    }

    /// Row-wise equality filter over the stringified column.
    ///
    /// The value is trimmed before comparing. An unknown column or a query
    /// matching nothing is a query miss, not an error: both are reported via
    /// `tracing` and a non-`Rows` outcome. A successful match returns an
    /// independent copy of the matching rows.
    pub fn filter_by_value(&self, column: &str, value: &str) -> FilterOutcome {
        if !Self::column_exists(column) {
            tracing::info!(column, "column does not exist");
            return FilterOutcome::UnknownColumn;
        }

        let needle = value.trim();
        let rows: Vec<SessionRow> = self
            .rows
            .iter()
            .filter(|row| {
                row.cell(column)
                    .map(|cell| cell.trim() == needle)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        if rows.is_empty() {
            tracing::info!(column, value = needle, "no rows found");
            return FilterOutcome::NoMatch;
        }
        FilterOutcome::Rows(LatencyTable { rows })
    }
}

/// Outcome of [`LatencyTable::filter_by_value`]. Misses are valid "no data"
/// results for exploratory queries, distinguishable by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Rows(LatencyTable),
    UnknownColumn,
    NoMatch,
}

impl FilterOutcome {
    pub fn rows(self) -> Option<LatencyTable> {
        match self {
            FilterOutcome::Rows(table) => Some(table),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
