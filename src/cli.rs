use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scm-changelog")]
#[command(about = "Changelog, file activity and developer activity reports from SCM change history")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, help = "Path to a persisted changelog XML document")]
    pub input: Option<PathBuf>,

    #[arg(long = "type", help = "How the history is bounded: range, date or tag")]
    pub report_type: Option<String>,

    #[arg(long, allow_negative_numbers = true, help = "Signed number of days relative to now (default -30)")]
    pub range: Option<i32>,

    #[arg(long, value_delimiter = ',', help = "Start/end date pairs (yyyy-MM-dd), comma separated")]
    pub dates: Vec<String>,

    #[arg(long, value_delimiter = ',', help = "Start/end revision or tag pairs, comma separated")]
    pub tags: Vec<String>,

    #[arg(long, help = "Date pattern handed to the SCM for range queries")]
    pub date_format: Option<String>,

    #[arg(long, help = "Encoding declared on exported XML (defaults to the input's)")]
    pub encoding: Option<String>,

    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Files ranked by how often they changed
    FileActivity {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Commits and files changed per developer
    DevActivity {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// List the change sets of each range
    Changelog {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Write the selected change sets back out as changelog XML
    Export {
        #[arg(long, help = "Write to this file instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Print the resolved SCM queries as JSON
    Range,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::FileActivity { json, ndjson } => crate::activity::exec_files(&self.common, json, ndjson),
            Commands::DevActivity { json, ndjson } => crate::activity::exec_developers(&self.common, json, ndjson),
            Commands::Changelog { json, ndjson } => crate::export::exec_listing(&self.common, json, ndjson),
            Commands::Export { output } => crate::export::exec(&self.common, output),
            Commands::Range => crate::fetch::exec_queries(&self.common),
        }
    }
}
