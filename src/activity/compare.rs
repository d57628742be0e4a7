//! Ranking of file activity.
//!
//! Three keys, first difference wins:
//! 1. more changes first;
//! 2. latest revision, compared as plain strings (no numeric coercion),
//!    lexically smaller first, with a blank latest revision after any
//!    non-blank one;
//! 3. file name, ascending.

use super::aggregate::FileActivity;
use crate::model::ChangeFile;
use std::cmp::Ordering;

pub fn compare_file_activity(a: &FileActivity<'_>, b: &FileActivity<'_>) -> Ordering {
    by_changes(a, b)
        .then_with(|| by_revision(a, b))
        .then_with(|| by_name(a, b))
}

fn by_changes(a: &FileActivity<'_>, b: &FileActivity<'_>) -> Ordering {
    b.times_changed().cmp(&a.times_changed())
}

// Ascending on purpose: the lexically smaller latest revision ranks first.
// A blank never outranks a real revision.
fn by_revision(a: &FileActivity<'_>, b: &FileActivity<'_>) -> Ordering {
    let (ra, rb) = (a.latest_revision(), b.latest_revision());
    match (is_blank(ra), is_blank(rb)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => ra.cmp(rb),
    }
}

fn by_name(a: &FileActivity<'_>, b: &FileActivity<'_>) -> Ordering {
    a.name().cmp(&b.name())
}

/// Lexically greatest revision in `revisions`. A blank value seen so far is
/// always replaced by the next one, so blank only survives if every
/// revision is blank.
pub fn latest_revision<'a>(revisions: &[&'a ChangeFile]) -> &'a str {
    let mut latest = "";
    for file in revisions {
        let revision = file.revision();
        if is_blank(latest) || revision > latest {
            latest = revision;
        }
    }
    latest
}

fn is_blank(revision: &str) -> bool {
    revision.trim().is_empty()
}
