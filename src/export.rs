use crate::cli::CommonArgs;
use crate::fetch::load;
use crate::model::{ChangeLogOutput, ChangeLogSet, SCHEMA_VERSION};
use crate::xml::write_change_logs;
use anyhow::{Context, Result};
use chrono::Utc;
use console::style;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

pub fn exec(common: &CommonArgs, output: Option<PathBuf>) -> Result<()> {
    let loaded = load(common)?;
    let encoding = common.encoding.clone().unwrap_or(loaded.encoding);

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_change_logs(&mut out, &loaded.sets, &encoding).context("Failed to write changelog XML")?;
            info!(path = %path.display(), sets = loaded.sets.len(), %encoding, "exported changelog");
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_change_logs(&mut out, &loaded.sets, &encoding).context("Failed to write changelog XML")?;
        }
    }
    Ok(())
}

pub fn exec_listing(common: &CommonArgs, json: bool, ndjson: bool) -> Result<()> {
    let loaded = load(common)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        output_json(&mut out, &loaded.sets, &loaded.source)
    } else if ndjson {
        output_ndjson(&mut out, &loaded.sets)
    } else {
        output_summary(&mut out, &loaded.sets)
    }
}

pub fn output_json<W: Write>(out: &mut W, sets: &[ChangeLogSet], source: &str) -> Result<()> {
    let output = ChangeLogOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        source: source.to_string(),
        sets: sets.to_vec(),
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

pub fn output_ndjson<W: Write>(out: &mut W, sets: &[ChangeLogSet]) -> Result<()> {
    for change_set in sets.iter().flat_map(|s| s.change_sets()) {
        writeln!(out, "{}", serde_json::to_string(change_set)?)?;
    }
    Ok(())
}

pub fn output_summary<W: Write>(out: &mut W, sets: &[ChangeLogSet]) -> Result<()> {
    writeln!(out, "{}", style("Changelog").bold())?;
    writeln!(out, "{}", "─".repeat(50))?;

    if sets.iter().all(|s| s.is_empty()) {
        writeln!(out, "No change sets found")?;
        return Ok(());
    }

    for set in sets {
        let total_files: usize = set.change_sets().iter().map(|cs| cs.files().len()).sum();
        let authors: HashSet<&str> = set.change_sets().iter().map(|cs| cs.author()).collect();

        writeln!(out, "\n{}", style(set.title()).bold())?;
        writeln!(
            out,
            "Total commits: {}, files changed: {}, authors: {}",
            style(set.len()).cyan(),
            style(total_files).cyan(),
            style(authors.len()).yellow()
        )?;
        for cs in set.change_sets() {
            writeln!(
                out,
                "  {} {:<24} {:>4} files  {}",
                style(cs.formatted_date()).dim(),
                cs.author(),
                cs.files().len(),
                cs.comment().lines().next().unwrap_or("")
            )?;
        }
    }

    writeln!(out, "\nUse --json or --ndjson flags to export the raw data.")?;
    Ok(())
}
