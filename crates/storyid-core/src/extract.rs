//! Extraction and reconstruction of tagged file content.
//!
//! `extract` turns raw on-disk text into the clean form shown in (and parsed
//! from) the editable buffer, plus the `(line, id)` pairs that seed anchors.
//! `reconstruct` is the inverse, applied before saving or before handing
//! content to the compiler: tags are reinjected at their canonical position.
//!
//! Round-trip contract: for content whose tags are well-formed, one per
//! line, and at canonical placement, `reconstruct(extract(x).clean, ids)`
//! returns `x` byte-for-byte (LF-normalized input).

use crate::tag::{self, LineId};

/// Result of extracting managed tags from raw file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Content with every managed tag stripped.
    pub clean: String,
    /// One `(line index, identifier)` pair per stripped tag. Line indexes
    /// are 0-based.
    pub ids_by_line: Vec<(usize, LineId)>,
}

/// Split keeping editor semantics: N newlines => N+1 lines; CRLF tolerated
/// by stripping the trailing `'\r'`.
fn split_lines_preserve_trailing(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Strip every managed tag out of `content`, recording where each one was.
pub fn extract(content: &str) -> Extraction {
    let mut ids_by_line = Vec::new();
    let lines: Vec<String> = split_lines_preserve_trailing(content)
        .into_iter()
        .enumerate()
        .map(|(index, line)| match tag::detect_tag(&line) {
            Some(m) => {
                let mut clean = String::with_capacity(line.len());
                clean.push_str(&line[..m.range.start]);
                clean.push_str(&line[m.range.end..]);
                ids_by_line.push((index, m.id));
                clean
            }
            None => line,
        })
        .collect();
    Extraction {
        clean: lines.join("\n"),
        ids_by_line,
    }
}

/// Reinject tags into clean content.
///
/// `associations` is typically an anchor snapshot taken at save time. Lines
/// without an association are left as-is; associations pointing past the end
/// of the content are skipped — a missing anchor means "this line carries no
/// managed identifier", not an error.
pub fn reconstruct(clean: &str, associations: &[(usize, LineId)]) -> String {
    let mut lines = split_lines_preserve_trailing(clean);
    for (line, id) in associations {
        if let Some(slot) = lines.get_mut(*line) {
            *slot = tag::inject_tag(slot, id);
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> LineId {
        LineId::parse(raw).unwrap()
    }

    #[test]
    fn extract_records_line_indexes_and_strips_tags() {
        let extraction = extract("plain\ntagged #id:AAAA\n* [choice #id:DOOR_A1B2]\n");
        assert_eq!(extraction.clean, "plain\ntagged\n* [choice]\n");
        assert_eq!(
            extraction.ids_by_line,
            vec![(1, id("AAAA")), (2, id("DOOR_A1B2"))]
        );
    }

    #[test]
    fn extract_of_tag_only_line_leaves_an_empty_line() {
        let extraction = extract("#id:AAAA\nrest\n");
        assert_eq!(extraction.clean, "\nrest\n");
        assert_eq!(extraction.ids_by_line, vec![(0, id("AAAA"))]);
    }

    #[test]
    fn extract_keeps_second_tag_visible() {
        // First match wins; the ambiguous second tag stays in the clean text
        // where the author can see it.
        let extraction = extract("a #id:AAAA #id:BBBB\n");
        assert_eq!(extraction.clean, "a #id:BBBB\n");
        assert_eq!(extraction.ids_by_line, vec![(0, id("AAAA"))]);
    }

    #[test]
    fn reconstruct_skips_out_of_range_associations() {
        let rebuilt = reconstruct("only\n", &[(0, id("AAAA")), (9, id("BBBB"))]);
        assert_eq!(rebuilt, "only #id:AAAA\n");
    }

    #[test]
    fn clean_content_is_idempotent_under_round_trip() {
        let source = "intro\nspoken line #id:Cave_ZZ11\n* [leave #id:Cave_Q8Q8]\n";
        let first = extract(source);
        let rebuilt = reconstruct(&first.clean, &first.ids_by_line);
        let second = extract(&rebuilt);
        assert_eq!(second.clean, first.clean);
        assert_eq!(second.ids_by_line, first.ids_by_line);
        assert_eq!(rebuilt, source);
    }
}
