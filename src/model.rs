use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// chrono pattern for the `<date>` element and `<changeset>` bounds.
pub const DATE_PATTERN: &str = "%Y-%m-%d";
/// chrono pattern for the `<time>` element.
pub const TIME_PATTERN: &str = "%H:%M:%S";
/// Combined date and time, as change-set dates are displayed.
pub const DATE_TIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// One file touched by one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeFile {
    name: String,
    revision: String,
}

impl ChangeFile {
    pub fn new(name: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            revision: revision.into(),
        }
    }

    /// A file entry whose revision is unknown.
    pub fn unversioned(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Empty when the SCM reported no revision.
    pub fn revision(&self) -> &str {
        &self.revision
    }
}

/// One commit: when, who, why, and the files it touched in reported order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    date: DateTime<Utc>,
    author: String,
    comment: String,
    files: Vec<ChangeFile>,
}

impl ChangeSet {
    /// `date` is truncated to whole seconds, the precision the changelog
    /// format stores.
    pub fn new(
        date: DateTime<Utc>,
        author: impl Into<String>,
        comment: impl Into<String>,
        files: Vec<ChangeFile>,
    ) -> Self {
        Self {
            date: date.trunc_subsecs(0),
            author: author.into(),
            comment: comment.into(),
            files,
        }
    }

    pub fn date(&self) -> &DateTime<Utc> {
        &self.date
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn files(&self) -> &[ChangeFile] {
        &self.files
    }

    pub fn formatted_date(&self) -> String {
        self.date.format(DATE_TIME_PATTERN).to_string()
    }
}

/// The change sets returned for one queried range, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogSet {
    change_sets: Vec<ChangeSet>,
    #[serde(flatten)]
    bounds: SetBounds,
}

/// Optional query bounds recorded on a [`ChangeLogSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_version: Option<String>,
}

impl ChangeLogSet {
    pub fn new(change_sets: Vec<ChangeSet>) -> Self {
        Self {
            change_sets,
            bounds: SetBounds::default(),
        }
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.bounds.start_date = start;
        self.bounds.end_date = end;
        self
    }

    pub fn with_versions(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.bounds.start_version = start;
        self.bounds.end_version = end;
        self
    }

    pub fn with_bounds(mut self, bounds: SetBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn change_sets(&self) -> &[ChangeSet] {
        &self.change_sets
    }

    pub fn bounds(&self) -> &SetBounds {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.change_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.change_sets.is_empty()
    }

    /// Human-readable range label, e.g. `2005-02-01 .. 2005-03-01`.
    pub fn title(&self) -> String {
        let b = &self.bounds;
        match (&b.start_version, &b.end_version, b.start_date, b.end_date) {
            (Some(s), e, _, _) => format!("{} .. {}", s, e.as_deref().unwrap_or("HEAD")),
            (None, _, Some(s), Some(e)) => format!("{} .. {}", s, e),
            (None, _, Some(s), None) => format!("since {}", s),
            (None, _, None, Some(e)) => format!("until {}", e),
            _ => "all changes".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileActivityRow {
    pub path: String,
    pub times_changed: usize,
    pub latest_revision: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileActivitySection {
    #[serde(flatten)]
    pub bounds: SetBounds,
    pub change_sets: usize,
    pub files: Vec<FileActivityRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileActivityOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub sections: Vec<FileActivitySection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperRow {
    pub author: String,
    pub commits: usize,
    pub files_changed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperSection {
    #[serde(flatten)]
    pub bounds: SetBounds,
    pub change_sets: usize,
    pub developers: Vec<DeveloperRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub sections: Vec<DeveloperSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLogOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub sets: Vec<ChangeLogSet>,
}
