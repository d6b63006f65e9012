use pretty_assertions::assert_eq;
use storyid_core::{AnchorSet, DocumentSession, LineId, MarkerBuffer, extract, reconstruct};

fn id(raw: &str) -> LineId {
    LineId::parse(raw).unwrap()
}

#[test]
fn extract_then_reconstruct_is_exact() {
    let source = "\
== Forest ==
The trees whisper. #id:Forest_7K2Q
* [Look closer #id:Forest_AB12]
Plain untagged line.
";
    let extraction = extract(source);
    assert_eq!(
        extraction.clean,
        "== Forest ==\nThe trees whisper.\n* [Look closer]\nPlain untagged line.\n"
    );
    assert_eq!(
        extraction.ids_by_line,
        vec![(1, id("Forest_7K2Q")), (2, id("Forest_AB12"))]
    );

    let rebuilt = reconstruct(&extraction.clean, &extraction.ids_by_line);
    assert_eq!(rebuilt, source);
}

#[test]
fn anchors_survive_unrelated_edits() {
    let extraction = extract("alpha #id:AAAA\nbeta\ngamma #id:BBBB\n");
    let mut buffer = MarkerBuffer::from_text(&extraction.clean);
    let mut anchors = AnchorSet::new();
    anchors.rebind(&mut buffer, &extraction.ids_by_line);

    // Insert three lines above the second tagged line.
    let offset = buffer.line_to_char(1).unwrap();
    buffer.insert(offset, "one\ntwo\nthree\n");

    let associations = anchors.associations(&buffer);
    assert_eq!(associations, vec![(0, id("AAAA")), (5, id("BBBB"))]);

    // Reconstruction places the original tags on the moved lines unchanged.
    let rebuilt = reconstruct(&buffer.text(), &associations);
    assert_eq!(
        rebuilt,
        "alpha #id:AAAA\none\ntwo\nthree\nbeta\ngamma #id:BBBB\n"
    );
}

#[test]
fn deleting_the_host_line_removes_the_binding() {
    let extraction = extract("alpha #id:AAAA\nbeta #id:BBBB\n");
    let mut buffer = MarkerBuffer::from_text(&extraction.clean);
    let mut anchors = AnchorSet::new();
    anchors.rebind(&mut buffer, &extraction.ids_by_line);

    // Delete the whole first line including its newline.
    buffer.remove(0..6);

    assert_eq!(anchors.associations(&buffer), vec![(0, id("BBBB"))]);
    assert_eq!(reconstruct(&buffer.text(), &anchors.associations(&buffer)), "beta #id:BBBB\n");
}

#[test]
fn cut_and_paste_relocates_tags_with_their_text() {
    let extraction = extract("keep\nmove me #id:MOVE\ntail\n");
    let mut buffer = MarkerBuffer::from_text(&extraction.clean);
    let mut anchors = AnchorSet::new();
    anchors.rebind(&mut buffer, &extraction.ids_by_line);

    // Cut "move me\n" and paste it after "tail\n". The cut collapses the
    // anchor; the host re-binds it at the paste site, as an editor's
    // cut/paste integration would.
    let start = buffer.line_to_char(1).unwrap();
    let end = buffer.line_to_char(2).unwrap();
    buffer.remove(start..end);
    assert!(anchors.associations(&buffer).is_empty());

    let paste_at = buffer.len_chars();
    buffer.insert(paste_at, "move me\n");
    anchors.bind(&mut buffer, 2, id("MOVE"));

    let associations = anchors.associations(&buffer);
    assert_eq!(associations, vec![(2, id("MOVE"))]);
    assert_eq!(
        reconstruct(&buffer.text(), &associations),
        "keep\ntail\nmove me #id:MOVE\n"
    );
}

#[test]
fn session_round_trip_through_save() {
    let mut session = DocumentSession::new();
    session.open_file(
        "cave.story",
        "Deep dark. #id:Cave_ZZ11\r\n* [Strike a match #id:Cave_M4T0]\r\n",
    );

    assert_eq!(
        session.clean_text("cave.story").unwrap(),
        "Deep dark.\n* [Strike a match]\n"
    );

    let payload = session.save_payload("cave.story").unwrap();
    assert_eq!(payload.path, "cave.story");
    assert_eq!(
        payload.content,
        "Deep dark. #id:Cave_ZZ11\r\n* [Strike a match #id:Cave_M4T0]\r\n"
    );
}
