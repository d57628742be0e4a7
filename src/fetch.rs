use crate::cli::CommonArgs;
use crate::config::ReportConfig;
use crate::model::ChangeLogSet;
use crate::range::RangeResolver;
use crate::scm::{fetch_change_logs, XmlCacheSource};
use crate::xml;
use anyhow::{anyhow, Context};
use std::path::Path;
use tracing::info;

/// Change-log sets selected for one report run.
#[derive(Debug, Clone)]
pub struct LoadedChangeLog {
    pub source: String,
    pub encoding: String,
    pub sets: Vec<ChangeLogSet>,
}

/// Reads the input document. Without range options the document is used
/// whole; otherwise each configured range is queried from it separately.
pub fn load(common: &CommonArgs) -> anyhow::Result<LoadedChangeLog> {
    let config = ReportConfig::from_args(common).context("Invalid report configuration")?;
    let input = config
        .input
        .as_deref()
        .ok_or_else(|| anyhow!("--input <changelog.xml> is required"))?;

    let parsed = xml::parse_file(input)
        .with_context(|| format!("Failed to read changelog {}", input.display()))?;
    let source = input.display().to_string();
    info!(source = %source, sets = parsed.sets.len(), "loaded changelog document");

    if !config.explicit_range {
        return Ok(LoadedChangeLog {
            source,
            encoding: parsed.encoding,
            sets: parsed.sets,
        });
    }

    let resolver = RangeResolver::at_current_time();
    let queries = resolver.resolve_all(&config.range_specs()?);
    let cache = XmlCacheSource::new(parsed.sets);
    let basedir = input.parent().unwrap_or_else(|| Path::new("."));
    let sets = fetch_change_logs(&cache, &source, basedir, &queries)
        .context("Failed to query change history")?;

    Ok(LoadedChangeLog {
        source,
        encoding: parsed.encoding,
        sets,
    })
}

pub fn exec_queries(common: &CommonArgs) -> anyhow::Result<()> {
    let config = ReportConfig::from_args(common).context("Invalid report configuration")?;
    let resolver = RangeResolver::at_current_time();
    let queries = resolver.resolve_all(&config.range_specs()?);
    println!("{}", serde_json::to_string_pretty(&queries)?);
    Ok(())
}
