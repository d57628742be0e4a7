use super::compare::{compare_file_activity, latest_revision};
use crate::model::{ChangeFile, ChangeLogSet, ChangeSet};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Every revision of one file, in the order the change sets delivered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileActivity<'a> {
    revisions: Vec<&'a ChangeFile>,
    latest: &'a str,
}

impl<'a> FileActivity<'a> {
    pub fn new(revisions: Vec<&'a ChangeFile>) -> Self {
        let latest = latest_revision(&revisions);
        Self { revisions, latest }
    }

    /// Name of the first revision; all revisions share it.
    pub fn name(&self) -> Option<&'a str> {
        self.revisions.first().map(|f| f.name())
    }

    pub fn times_changed(&self) -> usize {
        self.revisions.len()
    }

    pub fn revisions(&self) -> &[&'a ChangeFile] {
        &self.revisions
    }

    /// Fixed at construction.
    pub fn latest_revision(&self) -> &'a str {
        self.latest
    }
}

/// Groups file revisions by exact file name. Each list keeps change-set order,
/// and its length is the number of times the file changed.
pub fn aggregate_files<'a, I>(change_sets: I) -> HashMap<&'a str, Vec<&'a ChangeFile>>
where
    I: IntoIterator<Item = &'a ChangeSet>,
{
    let mut map: HashMap<&'a str, Vec<&'a ChangeFile>> = HashMap::new();
    for change_set in change_sets {
        for file in change_set.files() {
            map.entry(file.name()).or_default().push(file);
        }
    }
    map
}

/// Groups across every change set of every log, in log order.
pub fn aggregate_logs(sets: &[ChangeLogSet]) -> HashMap<&str, Vec<&ChangeFile>> {
    aggregate_files(sets.iter().flat_map(|set| set.change_sets()))
}

/// Files of `change_sets` ranked most active first.
pub fn ordered_file_activity(change_sets: &[ChangeSet]) -> Vec<FileActivity<'_>> {
    let grouped = aggregate_files(change_sets);
    let mut activity: Vec<FileActivity<'_>> = grouped.into_values().map(FileActivity::new).collect();
    activity.sort_by(compare_file_activity);
    debug!(
        change_sets = change_sets.len(),
        files = activity.len(),
        "ranked file activity"
    );
    activity
}

/// Commits and distinct files of one author.
#[derive(Debug, Clone)]
pub struct DeveloperActivity<'a> {
    pub author: &'a str,
    pub commits: Vec<&'a ChangeSet>,
    pub files: HashSet<&'a str>,
}

/// Per-author totals, most commits first, then by author name.
pub fn aggregate_developers(change_sets: &[ChangeSet]) -> Vec<DeveloperActivity<'_>> {
    let mut map: HashMap<&str, DeveloperActivity<'_>> = HashMap::new();
    for change_set in change_sets {
        let author = change_set.author();
        let entry = map.entry(author).or_insert_with(|| DeveloperActivity {
            author,
            commits: Vec::new(),
            files: HashSet::new(),
        });
        entry.commits.push(change_set);
        entry.files.extend(change_set.files().iter().map(|f| f.name()));
    }

    let mut developers: Vec<_> = map.into_values().collect();
    developers.sort_by(|a, b| {
        b.commits
            .len()
            .cmp(&a.commits.len())
            .then_with(|| a.author.cmp(b.author))
    });
    developers
}
