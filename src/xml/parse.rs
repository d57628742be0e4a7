use crate::error::{ChangelogError, Result};
use crate::model::{ChangeFile, ChangeLogSet, ChangeSet, SetBounds, DATE_PATTERN, TIME_PATTERN};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_ENCODING: &str = "UTF-8";

const READ_AHEAD: usize = 8192;

/// Result of parsing one changelog document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChangeLog {
    /// Encoding label from the XML declaration, `UTF-8` when undeclared.
    pub encoding: String,
    pub sets: Vec<ChangeLogSet>,
}

pub fn parse_file(path: &Path) -> Result<ParsedChangeLog> {
    let file = File::open(path)?;
    parse_reader(BufReader::with_capacity(READ_AHEAD, file))
}

pub fn parse_str(document: &str) -> Result<ParsedChangeLog> {
    parse_reader(document.as_bytes())
}

/// Parses a changelog and returns only its sets.
pub fn load_change_sets<R: BufRead>(input: R) -> Result<Vec<ChangeLogSet>> {
    Ok(parse_reader(input)?.sets)
}

/// Single forward pass over the document. Fails on the first malformed
/// record; nothing parsed before the failure is returned.
pub fn parse_reader<R: BufRead>(input: R) -> Result<ParsedChangeLog> {
    let mut reader = Reader::from_reader(input);
    let mut handler = Handler::default();
    let mut encoding: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position();
        let event = reader.read_event_into(&mut buf).map_err(|e| xml_error(position, e))?;
        match event {
            Event::Decl(decl) => {
                if let Some(label) = decl.encoding() {
                    let label = label.map_err(|e| ChangelogError::malformed(position, e))?;
                    encoding = Some(String::from_utf8_lossy(&label).into_owned());
                }
            }
            Event::Start(e) => {
                let attrs = attributes(&reader, &e, position)?;
                handler.start(e.name().as_ref(), &attrs, position)?;
            }
            Event::Empty(e) => {
                let attrs = attributes(&reader, &e, position)?;
                let name = e.name().as_ref().to_vec();
                handler.start(&name, &attrs, position)?;
                handler.end(&name, position)?;
            }
            Event::End(e) => handler.end(e.name().as_ref(), position)?,
            Event::Text(e) => {
                let text = e.unescape().map_err(|err| ChangelogError::malformed(position, err))?;
                handler.text(&text, position)?;
            }
            Event::CData(e) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| ChangelogError::malformed(position, err))?;
                handler.text(&text, position)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let sets = handler.finish(reader.buffer_position())?;
    let encoding = encoding.unwrap_or_else(|| DEFAULT_ENCODING.to_string());
    let entries: usize = sets.iter().map(ChangeLogSet::len).sum();
    debug!(sets = sets.len(), entries, encoding = %encoding, "parsed changelog document");
    Ok(ParsedChangeLog { encoding, sets })
}

fn xml_error(position: usize, err: quick_xml::Error) -> ChangelogError {
    match err {
        quick_xml::Error::Io(io) => ChangelogError::Io(std::io::Error::new(io.kind(), io.to_string())),
        other => ChangelogError::malformed(position, other),
    }
}

fn attributes<R>(
    reader: &Reader<R>,
    element: &BytesStart<'_>,
    position: usize,
) -> Result<Vec<(Vec<u8>, String)>> {
    let mut out = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ChangelogError::malformed(position, e))?;
        let value = attr
            .decode_and_unescape_value(reader)
            .map_err(|e| ChangelogError::malformed(position, e))?;
        out.push((attr.key.as_ref().to_vec(), value.into_owned()));
    }
    Ok(out)
}

fn attribute<'a>(attrs: &'a [(Vec<u8>, String)], key: &[u8]) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k.as_slice() == key)
        .map(|(_, v)| v.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Date,
    Time,
    Author,
    Msg,
    FileName,
    FileRevision,
}

struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

struct SetBuilder {
    bounds: SetBounds,
    change_sets: Vec<ChangeSet>,
    explicit: bool,
}

impl SetBuilder {
    fn build(self) -> ChangeLogSet {
        ChangeLogSet::new(self.change_sets).with_bounds(self.bounds)
    }
}

#[derive(Default)]
struct EntryBuilder {
    date: Option<String>,
    time: Option<String>,
    author: Option<String>,
    msg: Option<String>,
    files: Vec<ChangeFile>,
}

impl EntryBuilder {
    fn build(self, position: usize) -> Result<ChangeSet> {
        let date = self
            .date
            .ok_or_else(|| ChangelogError::malformed(position, "changelog-entry without <date>"))?;
        let author = self
            .author
            .ok_or_else(|| ChangelogError::malformed(position, "changelog-entry without <author>"))?;

        let day = NaiveDate::parse_from_str(date.trim(), DATE_PATTERN)
            .map_err(|e| ChangelogError::malformed(position, format!("unparseable date '{date}': {e}")))?;
        let time = match self.time {
            Some(t) => NaiveTime::parse_from_str(t.trim(), TIME_PATTERN)
                .map_err(|e| ChangelogError::malformed(position, format!("unparseable time '{t}': {e}")))?,
            None => NaiveTime::default(),
        };

        Ok(ChangeSet::new(
            Utc.from_utc_datetime(&day.and_time(time)),
            author,
            self.msg.unwrap_or_default(),
            self.files,
        ))
    }
}

#[derive(Default)]
struct FileBuilder {
    name: Option<String>,
    revision: Option<String>,
}

#[derive(Default)]
struct Handler {
    stack: Vec<Vec<u8>>,
    root_seen: bool,
    sets: Vec<ChangeLogSet>,
    set: Option<SetBuilder>,
    entry: Option<EntryBuilder>,
    file: Option<FileBuilder>,
    capture: Option<Capture>,
}

impl Handler {
    fn start(&mut self, name: &[u8], attrs: &[(Vec<u8>, String)], position: usize) -> Result<()> {
        let parent = self.stack.last().cloned();
        match (parent.as_deref(), name) {
            (None, b"changelog") if !self.root_seen => self.root_seen = true,
            (None, other) => {
                return Err(ChangelogError::malformed(
                    position,
                    format!("unexpected root element <{}>", String::from_utf8_lossy(other)),
                ))
            }
            (Some(b"changelog"), b"changeset") => {
                self.flush_set();
                self.set = Some(SetBuilder {
                    bounds: set_bounds(attrs, position)?,
                    change_sets: Vec::new(),
                    explicit: true,
                });
            }
            (Some(b"changelog"), b"changelog-entry") | (Some(b"changeset"), b"changelog-entry") => {
                if self.set.is_none() {
                    self.set = Some(SetBuilder {
                        bounds: SetBounds::default(),
                        change_sets: Vec::new(),
                        explicit: false,
                    });
                }
                self.entry = Some(EntryBuilder::default());
            }
            (Some(b"changelog-entry"), field) if self.entry.is_some() => match field {
                b"date" => self.begin_capture(Field::Date),
                b"time" => self.begin_capture(Field::Time),
                b"author" => self.begin_capture(Field::Author),
                b"msg" => self.begin_capture(Field::Msg),
                b"file" => {
                    self.file = Some(FileBuilder {
                        name: attribute(attrs, b"name").map(str::to_string),
                        revision: attribute(attrs, b"revision").map(str::to_string),
                    })
                }
                _ => {}
            },
            (Some(b"file"), b"name") if self.file.is_some() => self.begin_capture(Field::FileName),
            (Some(b"file"), b"revision") if self.file.is_some() => self.begin_capture(Field::FileRevision),
            _ => {}
        }
        self.stack.push(name.to_vec());
        Ok(())
    }

    fn begin_capture(&mut self, field: Field) {
        // nested fields are text only; the outer capture keeps collecting
        if self.capture.is_none() {
            self.capture = Some(Capture {
                field,
                depth: self.stack.len(),
                text: String::new(),
            });
        }
    }

    fn text(&mut self, text: &str, position: usize) -> Result<()> {
        if self.stack.is_empty() && !text.trim().is_empty() {
            return Err(ChangelogError::malformed(position, "text outside the <changelog> root"));
        }
        if let Some(capture) = self.capture.as_mut() {
            capture.text.push_str(text);
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8], position: usize) -> Result<()> {
        self.stack.pop();
        let depth = self.stack.len();

        if self.capture.as_ref().is_some_and(|c| c.depth == depth) {
            if let Some(capture) = self.capture.take() {
                self.store(capture);
            }
            return Ok(());
        }

        match name {
            b"file" if self.file.is_some() && self.stack.last().map(|p| p.as_slice()) == Some(&b"changelog-entry"[..]) => {
                if let Some(file) = self.file.take() {
                    let name = file
                        .name
                        .filter(|n| !n.is_empty())
                        .ok_or_else(|| ChangelogError::malformed(position, "<file> without a name"))?;
                    if let Some(entry) = self.entry.as_mut() {
                        entry.files.push(ChangeFile::new(name, file.revision.unwrap_or_default()));
                    }
                }
            }
            b"changelog-entry" => {
                if let Some(entry) = self.entry.take() {
                    let change_set = entry.build(position)?;
                    if let Some(set) = self.set.as_mut() {
                        set.change_sets.push(change_set);
                    }
                }
            }
            b"changeset" if depth == 1 => self.flush_set(),
            b"changelog" if depth == 0 => self.flush_set(),
            _ => {}
        }
        Ok(())
    }

    fn store(&mut self, capture: Capture) {
        let Capture { field, text, .. } = capture;
        match field {
            Field::FileName | Field::FileRevision => {
                if let Some(file) = self.file.as_mut() {
                    if field == Field::FileName {
                        file.name = Some(text);
                    } else {
                        file.revision = Some(text);
                    }
                }
            }
            _ => {
                if let Some(entry) = self.entry.as_mut() {
                    let slot = match field {
                        Field::Date => &mut entry.date,
                        Field::Time => &mut entry.time,
                        Field::Author => &mut entry.author,
                        _ => &mut entry.msg,
                    };
                    *slot = Some(text);
                }
            }
        }
    }

    fn flush_set(&mut self) {
        if let Some(set) = self.set.take() {
            // a run of bare entries only becomes a set if it has entries
            if set.explicit || !set.change_sets.is_empty() {
                self.sets.push(set.build());
            }
        }
    }

    fn finish(mut self, position: usize) -> Result<Vec<ChangeLogSet>> {
        if !self.root_seen {
            return Err(ChangelogError::malformed(position, "no <changelog> root element"));
        }
        if let Some(open) = self.stack.last() {
            return Err(ChangelogError::malformed(
                position,
                format!("unexpected end of document inside <{}>", String::from_utf8_lossy(open)),
            ));
        }
        self.flush_set();
        Ok(self.sets)
    }
}

fn set_bounds(attrs: &[(Vec<u8>, String)], position: usize) -> Result<SetBounds> {
    let date = |key: &[u8]| -> Result<Option<NaiveDate>> {
        match attribute(attrs, key).map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => NaiveDate::parse_from_str(v, DATE_PATTERN)
                .map(Some)
                .map_err(|e| ChangelogError::malformed(position, format!("unparseable changeset date '{v}': {e}"))),
            None => Ok(None),
        }
    };
    Ok(SetBounds {
        start_date: date(b"start")?,
        end_date: date(b"end")?,
        start_version: attribute(attrs, b"startVersion").map(str::to_string),
        end_version: attribute(attrs, b"endVersion").map(str::to_string),
    })
}
