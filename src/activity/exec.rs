use super::output::{
    developer_sections, file_activity_sections, output_developers_json, output_developers_ndjson,
    output_developers_table, output_files_json, output_files_ndjson, output_files_table,
};
use crate::cli::CommonArgs;
use crate::fetch::load;
use std::io;

pub fn exec_files(common: &CommonArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let loaded = load(common)?;
    let sections = file_activity_sections(&loaded.sets);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        output_files_json(&mut out, &sections, &loaded.source)
    } else if ndjson {
        output_files_ndjson(&mut out, &sections)
    } else {
        output_files_table(&mut out, &loaded.sets, &sections)
    }
}

pub fn exec_developers(common: &CommonArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let loaded = load(common)?;
    let sections = developer_sections(&loaded.sets);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        output_developers_json(&mut out, &sections, &loaded.source)
    } else if ndjson {
        output_developers_ndjson(&mut out, &sections)
    } else {
        output_developers_table(&mut out, &loaded.sets, &sections)
    }
}
