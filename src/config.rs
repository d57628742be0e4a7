use crate::cli::CommonArgs;
use crate::error::{ChangelogError, Result};
use crate::model::DATE_PATTERN;
use crate::range::RangeSpec;
use chrono::{NaiveDate, TimeZone, Utc};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_RANGE: i32 = -30;
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";

/// How the queried history is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportType {
    #[default]
    Range,
    Date,
    Tag,
}

impl FromStr for ReportType {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "range" => Ok(ReportType::Range),
            "date" => Ok(ReportType::Date),
            "tag" => Ok(ReportType::Tag),
            other => Err(ChangelogError::InvalidConfig(format!(
                "The type parameter has an invalid value: {other}."
            ))),
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportType::Range => "range",
            ReportType::Date => "date",
            ReportType::Tag => "tag",
        };
        f.write_str(s)
    }
}

/// Validated report settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub input: Option<PathBuf>,
    pub report_type: ReportType,
    pub range: i32,
    pub dates: Vec<String>,
    pub tags: Vec<String>,
    pub date_format: String,
    /// Overrides the encoding of the input document on export.
    pub output_encoding: Option<String>,
    /// False when no range option was given: the input is then reported whole.
    pub explicit_range: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: None,
            report_type: ReportType::default(),
            range: DEFAULT_RANGE,
            dates: Vec::new(),
            tags: Vec::new(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            output_encoding: None,
            explicit_range: false,
        }
    }
}

impl ReportConfig {
    pub fn from_args(args: &CommonArgs) -> Result<Self> {
        let report_type = match args.report_type.as_deref() {
            Some(t) => t.parse()?,
            None if !args.dates.is_empty() => ReportType::Date,
            None if !args.tags.is_empty() => ReportType::Tag,
            None => ReportType::Range,
        };

        let explicit_range = args.report_type.is_some()
            || args.range.is_some()
            || !args.dates.is_empty()
            || !args.tags.is_empty();

        let config = Self {
            input: args.input.clone(),
            report_type,
            range: args.range.unwrap_or(DEFAULT_RANGE),
            dates: args.dates.clone(),
            tags: args.tags.clone(),
            date_format: args
                .date_format
                .clone()
                .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
            output_encoding: args.encoding.clone(),
            explicit_range,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // parsing every value up front keeps bad input away from the resolver
        self.range_specs().map(|_| ())
    }

    /// One spec per configured range, in configuration order.
    pub fn range_specs(&self) -> Result<Vec<RangeSpec>> {
        match self.report_type {
            ReportType::Range => Ok(vec![RangeSpec::Days {
                range: self.range,
                date_pattern: self.date_format.clone(),
            }]),
            ReportType::Date => {
                if self.dates.is_empty() {
                    return Err(ChangelogError::InvalidConfig(
                        "The dates parameter is required when type is \"date\".".to_string(),
                    ));
                }
                self.dates
                    .chunks(2)
                    .map(|pair| -> Result<RangeSpec> {
                        let start = parse_date(&pair[0])?;
                        let end = pair.get(1).map(|d| parse_date(d)).transpose()?;
                        Ok(RangeSpec::Dates { start, end })
                    })
                    .collect()
            }
            ReportType::Tag => {
                if self.tags.is_empty() {
                    return Err(ChangelogError::InvalidConfig(
                        "The tags parameter is required when type is \"tag\".".to_string(),
                    ));
                }
                Ok(self
                    .tags
                    .chunks(2)
                    .map(|pair| RangeSpec::Revisions {
                        start: pair[0].clone(),
                        end: pair.get(1).cloned().unwrap_or_default(),
                    })
                    .collect())
            }
        }
    }
}

fn parse_date(value: &str) -> Result<chrono::DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value.trim(), DATE_PATTERN)
        .map_err(|e| ChangelogError::InvalidDate(format!("'{value}' is not a yyyy-MM-dd date: {e}")))?;
    Ok(Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::default())))
}
