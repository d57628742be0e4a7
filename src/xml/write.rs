use crate::error::{ChangelogError, Result};
use crate::model::{ChangeLogSet, ChangeSet, DATE_PATTERN, TIME_PATTERN};
use encoding_rs::Encoding;
use quick_xml::escape::escape;
use std::io::Write;
use tracing::debug;

/// Java-style patterns recorded in the document next to the values.
const DATE_PATTERN_LABEL: &str = "yyyy-MM-dd";
const TIME_PATTERN_LABEL: &str = "HH:mm:ss";

/// Writes `sets` as a changelog document encoded with `encoding`.
///
/// Labels that `encoding_rs` cannot encode into (UTF-16 variants,
/// `replacement`) fall back to UTF-8, and the declaration names the
/// encoding actually written.
pub fn write_change_logs<W: Write>(out: &mut W, sets: &[ChangeLogSet], encoding: &str) -> Result<()> {
    let requested = Encoding::for_label(encoding.trim().as_bytes())
        .ok_or_else(|| ChangelogError::InvalidConfig(format!("Unsupported output encoding: {encoding}")))?;
    let target = requested.output_encoding();
    let label = if target == requested { encoding.trim() } else { target.name() };
    if target != requested {
        debug!(requested = encoding, written = label, "encoding cannot be written, falling back");
    }

    let document = to_xml_string(sets, label);
    let (bytes, _, unmappable) = target.encode(&document);
    if unmappable {
        debug!(encoding = label, "characters not representable in output encoding were replaced");
    }
    out.write_all(&bytes)?;
    out.flush()?;
    Ok(())
}

/// Renders the document text. The declaration names `encoding` verbatim;
/// the returned string itself is always UTF-8.
pub fn to_xml_string(sets: &[ChangeLogSet], encoding: &str) -> String {
    let mut xml = format!("<?xml version=\"1.0\" encoding=\"{}\"?>\n", escape(encoding));
    xml.push_str("<changelog>\n");
    for set in sets {
        write_set(&mut xml, set);
    }
    xml.push_str("</changelog>");
    xml
}

fn write_set(xml: &mut String, set: &ChangeLogSet) {
    let bounds = set.bounds();
    xml.push_str(&format!("<changeset datePattern=\"{DATE_PATTERN_LABEL}\""));
    if let Some(start) = bounds.start_date {
        xml.push_str(&format!(" start=\"{}\"", start.format(DATE_PATTERN)));
    }
    if let Some(end) = bounds.end_date {
        xml.push_str(&format!(" end=\"{}\"", end.format(DATE_PATTERN)));
    }
    if let Some(start) = &bounds.start_version {
        xml.push_str(&format!(" startVersion=\"{}\"", escape(start)));
    }
    if let Some(end) = &bounds.end_version {
        xml.push_str(&format!(" endVersion=\"{}\"", escape(end)));
    }
    xml.push_str(">\n");
    for change_set in set.change_sets() {
        write_entry(xml, change_set);
    }
    xml.push_str("</changeset>\n");
}

fn write_entry(xml: &mut String, change_set: &ChangeSet) {
    let date = change_set.date();
    xml.push_str("\t<changelog-entry>\n");
    xml.push_str(&format!(
        "\t\t<date pattern=\"{DATE_PATTERN_LABEL}\">{}</date>\n",
        date.format(DATE_PATTERN)
    ));
    xml.push_str(&format!(
        "\t\t<time pattern=\"{TIME_PATTERN_LABEL}\">{}</time>\n",
        date.format(TIME_PATTERN)
    ));
    xml.push_str(&format!("\t\t<author>{}</author>\n", cdata(change_set.author())));
    for file in change_set.files() {
        xml.push_str("\t\t<file>\n");
        xml.push_str(&format!("\t\t\t<name>{}</name>\n", escape(file.name())));
        if !file.revision().is_empty() {
            xml.push_str(&format!("\t\t\t<revision>{}</revision>\n", escape(file.revision())));
        }
        xml.push_str("\t\t</file>\n");
    }
    xml.push_str(&format!("\t\t<msg>{}</msg>\n", cdata(change_set.comment())));
    xml.push_str("\t</changelog-entry>\n");
}

/// Wraps text in CDATA, splitting any `]]>` across two sections.
fn cdata(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}
