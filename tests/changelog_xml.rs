use pretty_assertions::assert_eq;
use scm_changelog::xml::{load_change_sets, parse_file, parse_reader, parse_str, to_xml_string, write_change_logs};
use scm_changelog::{ChangeFile, ChangeLogSet, ChangeSet, ChangelogError};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn assert_malformed(doc: &str) {
    match parse_str(doc) {
        Err(ChangelogError::MalformedDocument(_)) => {}
        other => panic!("expected a malformed document error, got {other:?}"),
    }
}

#[test]
fn reads_min_changelog() {
    let parsed = parse_file(&fixture("min-changelog.xml")).unwrap();
    assert_eq!(parsed.encoding, "UTF-8");

    let sets = parsed.sets;
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].len(), 2);

    let first = &sets[0].change_sets()[0];
    assert_eq!(first.formatted_date(), "1977-08-06 05:30:00");
    assert_eq!(first.author(), "Edwin Punzalan");
    assert_eq!(first.comment(), "First commit msg");
    assert_eq!(first.files(), &[ChangeFile::new("/path/to/file.extension", "1")]);

    let second = &sets[0].change_sets()[1];
    assert_eq!(second.formatted_date(), "2005-02-24 21:30:00");
    assert_eq!(second.comment(), "Second commit msg");
    assert_eq!(
        second.files(),
        &[
            ChangeFile::new("/path/to/file.extension", "2"),
            ChangeFile::new("/path/to/file2.extension", "2"),
        ]
    );

    assert_eq!(sets[1].len(), 2);
    let third = &sets[1].change_sets()[0];
    assert_eq!(third.formatted_date(), "2005-02-25 22:45:00");
    assert_eq!(third.author(), "Keogh Edrich Punzalan");
    assert_eq!(third.comment(), "Third commit msg");
    assert_eq!(third.files(), &[ChangeFile::new("/path/to/file.extension", "3")]);

    let last = &sets[1].change_sets()[1];
    assert_eq!(last.formatted_date(), "2100-02-25 05:30:00");
    assert_eq!(last.comment(), "Last commit msg");
    assert_eq!(last.files().len(), 2);
    assert_eq!(last.files()[1].revision(), "4");
}

#[test]
fn changeset_bounds_are_kept() {
    let sets = parse_file(&fixture("min-changelog.xml")).unwrap().sets;
    let bounds = sets[0].bounds();
    assert_eq!(bounds.start_date.unwrap().to_string(), "1977-01-01");
    assert_eq!(bounds.end_date.unwrap().to_string(), "2005-02-24");
    assert_eq!(bounds.start_version, None);
}

#[test]
fn empty_document_is_not_an_error() {
    assert!(parse_str("<changelog></changelog>").unwrap().sets.is_empty());
    assert!(parse_str("<?xml version=\"1.0\"?>\n<changelog/>").unwrap().sets.is_empty());
}

#[test]
fn bare_entries_form_one_set() {
    let doc = r#"<changelog>
        <changelog-entry><date>2020-01-01</date><time>10:00:00</time><author>a</author>
            <file><name>x</name><revision>1</revision></file></changelog-entry>
        <changelog-entry><date>2020-01-01</date><time>10:00:00</time><author>b</author>
            <file><name>y</name><revision>2</revision></file></changelog-entry>
    </changelog>"#;
    let sets = parse_str(doc).unwrap().sets;
    assert_eq!(sets.len(), 1);
    let authors: Vec<&str> = sets[0].change_sets().iter().map(|cs| cs.author()).collect();
    assert_eq!(authors, vec!["a", "b"]);
}

#[test]
fn file_attributes_and_missing_revision() {
    let doc = r#"<changelog><changelog-entry>
        <date>2020-01-01</date><author>a</author>
        <file name="/a.txt" revision="7"/>
        <file><name>/b.txt</name></file>
        <file name="/c.txt"></file>
    </changelog-entry></changelog>"#;
    let sets = parse_str(doc).unwrap().sets;
    assert_eq!(
        sets[0].change_sets()[0].files(),
        &[
            ChangeFile::new("/a.txt", "7"),
            ChangeFile::unversioned("/b.txt"),
            ChangeFile::unversioned("/c.txt"),
        ]
    );
}

#[test]
fn element_text_is_preserved_exactly() {
    let doc = "<changelog><changelog-entry><date>2020-01-01</date>\
               <author> Jane  Doe </author><msg>\n  fix: keep   spacing\n</msg>\
               <file><name> odd name.txt</name><revision>1.2.3</revision></file>\
               </changelog-entry></changelog>";
    let parsed = parse_str(doc).unwrap();
    let cs = &parsed.sets[0].change_sets()[0];
    assert_eq!(cs.author(), " Jane  Doe ");
    assert_eq!(cs.comment(), "\n  fix: keep   spacing\n");
    assert_eq!(cs.files()[0].name(), " odd name.txt");
}

#[test]
fn missing_message_is_empty_comment() {
    let doc = "<changelog><changelog-entry><date>2020-01-01</date><author>a</author></changelog-entry></changelog>";
    let parsed = parse_str(doc).unwrap();
    let cs = &parsed.sets[0].change_sets()[0];
    assert_eq!(cs.comment(), "");
    assert!(cs.files().is_empty());
}

#[test]
fn malformed_documents_are_rejected() {
    assert_malformed("");
    assert_malformed("<log></log>");
    assert_malformed("junk<changelog></changelog>");
    assert_malformed("<changelog></changelog>trailing junk");
    assert_malformed("<changelog></changelog><![CDATA[x]]>");
    assert_malformed("<changelog><changelog-entry></changelog>");
    assert_malformed("<changelog><changelog-entry><date>2020-01-01</date>");
    assert_malformed(
        "<changelog><changelog-entry><author>a</author></changelog-entry></changelog>",
    );
    assert_malformed(
        "<changelog><changelog-entry><date>2020-01-01</date></changelog-entry></changelog>",
    );
    assert_malformed(
        "<changelog><changelog-entry><date>01/02/2020</date><author>a</author></changelog-entry></changelog>",
    );
    assert_malformed(
        "<changelog><changelog-entry><date>2020-01-01</date><time>25:61</time><author>a</author></changelog-entry></changelog>",
    );
}

#[test]
fn one_bad_entry_fails_the_whole_parse() {
    let doc = "<changelog>\
               <changelog-entry><date>2020-01-01</date><author>a</author></changelog-entry>\
               <changelog-entry><date>never</date><author>b</author></changelog-entry>\
               </changelog>";
    assert!(parse_str(doc).is_err());
}

#[test]
fn declared_encoding_is_decoded_and_reported() {
    let mut doc = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\
<changelog><changelog-entry><date>2020-01-01</date><author>Jos"
        .to_vec();
    doc.push(0xE9);
    doc.extend_from_slice(b"</author></changelog-entry></changelog>");

    let parsed = parse_reader(&doc[..]).unwrap();
    assert_eq!(parsed.encoding, "ISO-8859-1");
    assert_eq!(parsed.sets[0].change_sets()[0].author(), "José");
}

#[test]
fn written_document_has_header_and_footer() {
    let sets = parse_file(&fixture("min-changelog.xml")).unwrap().sets;
    let xml = to_xml_string(&sets, "UTF-8");
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.ends_with("</changelog>"));
}

#[test]
fn reparsing_written_output_is_idempotent() {
    let original = parse_file(&fixture("min-changelog.xml")).unwrap().sets;
    let reparsed = parse_str(&to_xml_string(&original, "UTF-8")).unwrap().sets;
    assert_eq!(reparsed, original);

    let again = parse_str(&to_xml_string(&reparsed, "UTF-8")).unwrap().sets;
    assert_eq!(again, reparsed);
}

#[test]
fn awkward_text_survives_a_round_trip() {
    let date = chrono::DateTime::parse_from_rfc3339("2021-03-04T05:06:07Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let sets = vec![ChangeLogSet::new(vec![ChangeSet::new(
        date,
        "A <b> & \"c\"",
        "ends with ]]> and <tags> & more",
        vec![
            ChangeFile::new("/dir/a&b<c>.txt", "r'1\""),
            ChangeFile::unversioned("/dir/none"),
        ],
    )])
    .with_versions(Some("v1.0".to_string()), None)];

    let reparsed = parse_str(&to_xml_string(&sets, "UTF-8")).unwrap().sets;
    assert_eq!(reparsed, sets);
}

#[test]
fn writer_encodes_in_the_requested_encoding() {
    let date = chrono::DateTime::parse_from_rfc3339("2021-03-04T05:06:07Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let sets = vec![ChangeLogSet::new(vec![ChangeSet::new(date, "José", "", vec![])])];

    let mut bytes = Vec::new();
    write_change_logs(&mut bytes, &sets, "ISO-8859-1").unwrap();
    assert!(bytes.contains(&0xE9));

    let parsed = parse_reader(&bytes[..]).unwrap();
    assert_eq!(parsed.encoding, "ISO-8859-1");
    assert_eq!(parsed.sets, sets);
}

#[test]
fn unwritable_encoding_falls_back_to_utf8() {
    let sets = parse_file(&fixture("min-changelog.xml")).unwrap().sets;
    for label in ["UTF-16", "UTF-16LE", "utf-16be"] {
        let mut bytes = Vec::new();
        write_change_logs(&mut bytes, &sets, label).unwrap();
        assert!(bytes.starts_with(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));

        let parsed = parse_reader(&bytes[..]).unwrap();
        assert_eq!(parsed.encoding, "UTF-8");
        assert_eq!(parsed.sets, sets);
    }
}

#[test]
fn dates_keep_whole_seconds() {
    let date = chrono::DateTime::parse_from_rfc3339("2020-09-13T12:26:40.500Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let sets = vec![ChangeLogSet::new(vec![ChangeSet::new(date, "a", "", vec![])])];
    assert_eq!(sets[0].change_sets()[0].formatted_date(), "2020-09-13 12:26:40");
    assert_eq!(sets[0].change_sets()[0].date().timestamp_subsec_nanos(), 0);

    let reparsed = parse_str(&to_xml_string(&sets, "UTF-8")).unwrap().sets;
    assert_eq!(reparsed, sets);
}

#[test]
fn unknown_output_encoding_is_rejected() {
    let mut bytes = Vec::new();
    let err = write_change_logs(&mut bytes, &[], "no-such-charset").unwrap_err();
    assert!(matches!(err, ChangelogError::InvalidConfig(_)));
}

#[test]
fn load_change_sets_reads_from_any_buffered_reader() {
    let file = std::fs::File::open(fixture("min-changelog.xml")).unwrap();
    let sets = load_change_sets(std::io::BufReader::new(file)).unwrap();
    assert_eq!(sets.len(), 2);
}
