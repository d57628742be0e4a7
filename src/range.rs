use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

/// What the caller asked for, before anything is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSpec {
    /// Explicit dates. A missing end is closed by the resolver's "now".
    Dates {
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    },
    /// Explicit revisions or tags, passed through as-is.
    Revisions { start: String, end: String },
    /// Signed day count relative to now; `date_pattern` is handed to the
    /// SCM collaborator untouched.
    Days { range: i32, date_pattern: String },
}

/// A fully concrete query for the SCM collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeLogQuery {
    Dates {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        date_pattern: Option<String>,
    },
    Revisions { start: String, end: String },
}

impl ChangeLogQuery {
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeLogQuery::Dates { .. } => "dates",
            ChangeLogQuery::Revisions { .. } => "revisions",
        }
    }
}

/// Resolves range specs against a single captured "now", so every query of
/// one run agrees on the same instant.
#[derive(Debug, Clone, Copy)]
pub struct RangeResolver {
    now: DateTime<Utc>,
}

impl RangeResolver {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn at_current_time() -> Self {
        Self::new(Utc::now())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn resolve(&self, spec: &RangeSpec) -> ChangeLogQuery {
        let query = match spec {
            RangeSpec::Dates { start, end } => ChangeLogQuery::Dates {
                start: *start,
                end: end.unwrap_or(self.now),
                date_pattern: None,
            },
            RangeSpec::Revisions { start, end } => ChangeLogQuery::Revisions {
                start: start.clone(),
                end: end.clone(),
            },
            RangeSpec::Days { range, date_pattern } => {
                let (start, end) = day_range_bounds(self.now, *range);
                ChangeLogQuery::Dates {
                    start,
                    end,
                    date_pattern: Some(date_pattern.clone()),
                }
            }
        };
        debug!(kind = query.kind(), ?query, "resolved changelog query");
        query
    }

    pub fn resolve_all(&self, specs: &[RangeSpec]) -> Vec<ChangeLogQuery> {
        specs.iter().map(|spec| self.resolve(spec)).collect()
    }
}

/// `(start, end)` for a relative day range.
///
/// Zero or negative: `start = now + range days`, `end = now`.
/// Positive: `start = now`, `end = now - range days`, so start falls after
/// end. Callers must not assume the two are ordered.
pub fn day_range_bounds(now: DateTime<Utc>, range: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    let days = Duration::days(i64::from(range));
    if range <= 0 {
        (shift(now, days), now)
    } else {
        (now, shift(now, -days))
    }
}

fn shift(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    at.checked_add_signed(by).unwrap_or(if by < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
