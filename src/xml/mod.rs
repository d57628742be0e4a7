//! Persisted changelog documents: a streaming reader and the matching writer.

pub mod parse;
pub mod write;

pub use parse::{load_change_sets, parse_file, parse_reader, parse_str, ParsedChangeLog, DEFAULT_ENCODING};
pub use write::{to_xml_string, write_change_logs};
