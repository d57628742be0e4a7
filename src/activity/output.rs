use super::aggregate::{aggregate_developers, ordered_file_activity};
use crate::model::{
    ChangeLogSet, DeveloperOutput, DeveloperRow, DeveloperSection, FileActivityOutput,
    FileActivityRow, FileActivitySection, SCHEMA_VERSION,
};
use anyhow::Result;
use chrono::Utc;
use console::style;
use std::io::Write;

const TABLE_LIMIT: usize = 50;

/// One ranked section per change-log set; each set is aggregated on its own.
pub fn file_activity_sections(sets: &[ChangeLogSet]) -> Vec<FileActivitySection> {
    sets.iter()
        .map(|set| FileActivitySection {
            bounds: set.bounds().clone(),
            change_sets: set.len(),
            files: ordered_file_activity(set.change_sets())
                .into_iter()
                .map(|activity| FileActivityRow {
                    path: activity.name().unwrap_or_default().to_string(),
                    times_changed: activity.times_changed(),
                    latest_revision: activity.latest_revision().to_string(),
                })
                .collect(),
        })
        .collect()
}

pub fn developer_sections(sets: &[ChangeLogSet]) -> Vec<DeveloperSection> {
    sets.iter()
        .map(|set| DeveloperSection {
            bounds: set.bounds().clone(),
            change_sets: set.len(),
            developers: aggregate_developers(set.change_sets())
                .into_iter()
                .map(|dev| DeveloperRow {
                    author: dev.author.to_string(),
                    commits: dev.commits.len(),
                    files_changed: dev.files.len(),
                })
                .collect(),
        })
        .collect()
}

pub fn output_files_json<W: Write>(out: &mut W, sections: &[FileActivitySection], source: &str) -> Result<()> {
    let output = FileActivityOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        source: source.to_string(),
        sections: sections.to_vec(),
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

pub fn output_files_ndjson<W: Write>(out: &mut W, sections: &[FileActivitySection]) -> Result<()> {
    for row in sections.iter().flat_map(|s| &s.files) {
        writeln!(out, "{}", serde_json::to_string(row)?)?;
    }
    Ok(())
}

pub fn output_files_table<W: Write>(out: &mut W, sets: &[ChangeLogSet], sections: &[FileActivitySection]) -> Result<()> {
    writeln!(out, "{}", style("File Activity Report").bold())?;
    if sections.is_empty() {
        writeln!(out, "No change sets found")?;
        return Ok(());
    }

    for (set, section) in sets.iter().zip(sections) {
        writeln!(out)?;
        writeln!(
            out,
            "{} ({} change sets)",
            style(set.title()).bold(),
            section.change_sets
        )?;
        if section.files.is_empty() {
            writeln!(out, "No change sets found")?;
            continue;
        }
        writeln!(
            out,
            "{:<60} {:>8} {:>12}",
            style("Filename").bold(),
            style("Changes").bold(),
            style("Latest rev").bold()
        )?;
        writeln!(out, "{}", "─".repeat(82))?;
        for row in section.files.iter().take(TABLE_LIMIT) {
            writeln!(
                out,
                "{:<60} {:>8} {:>12}",
                row.path, row.times_changed, row.latest_revision
            )?;
        }
        if section.files.len() > TABLE_LIMIT {
            writeln!(out, "\n... and {} more files", section.files.len() - TABLE_LIMIT)?;
        }
    }
    Ok(())
}

pub fn output_developers_json<W: Write>(out: &mut W, sections: &[DeveloperSection], source: &str) -> Result<()> {
    let output = DeveloperOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        source: source.to_string(),
        sections: sections.to_vec(),
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

pub fn output_developers_ndjson<W: Write>(out: &mut W, sections: &[DeveloperSection]) -> Result<()> {
    for row in sections.iter().flat_map(|s| &s.developers) {
        writeln!(out, "{}", serde_json::to_string(row)?)?;
    }
    Ok(())
}

pub fn output_developers_table<W: Write>(out: &mut W, sets: &[ChangeLogSet], sections: &[DeveloperSection]) -> Result<()> {
    writeln!(out, "{}", style("Developer Activity Report").bold())?;
    if sections.is_empty() {
        writeln!(out, "No change sets found")?;
        return Ok(());
    }

    for (set, section) in sets.iter().zip(sections) {
        writeln!(out)?;
        writeln!(
            out,
            "{} ({} change sets)",
            style(set.title()).bold(),
            section.change_sets
        )?;
        if section.developers.is_empty() {
            writeln!(out, "No developers found")?;
            continue;
        }
        writeln!(
            out,
            "{:<40} {:>8} {:>14}",
            style("Developer").bold(),
            style("Commits").bold(),
            style("Files changed").bold()
        )?;
        writeln!(out, "{}", "─".repeat(64))?;
        for row in &section.developers {
            writeln!(out, "{:<40} {:>8} {:>14}", row.author, row.commits, row.files_changed)?;
        }
    }
    Ok(())
}
