//! Tag codec: recognize, strip, and inject identifier tags in script lines.
//!
//! A tag is the textual encoding of a [`LineId`] inside one line of script
//! source: `#id:<identifier>`, optionally preceded by one separating space.
//! This module is pure string surgery; it never touches buffers or anchors.
//!
//! All ranges returned here are **byte offsets** into the input line. Tag
//! text is ASCII, but the surrounding line may not be.

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Marker that introduces a managed tag inside a line.
pub const TAG_SIGIL: &str = "#id:";

/// Tag pattern: optional separating space, the sigil, zero or more `Name_`
/// prefix segments, and a 4-character uppercase-alphanumeric suffix. The
/// trailing word boundary keeps the suffix from matching inside a longer
/// alphanumeric run.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r" ?#id:((?:[A-Za-z0-9_]+_)*[A-Z0-9]{4})\b").expect("tag pattern is valid")
});

/// Full-string identifier shape used by [`LineId::parse`].
static ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9_]+_)*[A-Z0-9]{4}$").expect("identifier pattern is valid")
});

/// A stable line identifier: zero or more `Name_` prefix segments followed
/// by an uppercase-alphanumeric suffix.
///
/// Identifiers are opaque to callers; project-wide uniqueness is the only
/// contract. They are durable: once written to disk they must never
/// silently change or collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(String);

/// Error returned when a string does not have identifier shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("not a valid line identifier: {0:?}")]
pub struct IdShapeError(pub String);

impl LineId {
    /// Parse a standard-shape identifier: `(Name_)*` segments plus a
    /// 4-character uppercase-alphanumeric suffix.
    pub fn parse(raw: &str) -> Result<Self, IdShapeError> {
        if ID_RE.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(IdShapeError(raw.to_string()))
        }
    }

    /// Assemble an identifier from a minted prefix and suffix.
    ///
    /// The prefix must be empty or a run of `Name_` segments; the suffix
    /// must be non-empty uppercase-alphanumeric. Generators use this rather
    /// than [`LineId::parse`] so shrunken suffix lengths (test mint
    /// policies) still construct identifiers.
    pub fn from_parts(prefix: &str, suffix: &str) -> Result<Self, IdShapeError> {
        let prefix_ok = prefix.is_empty()
            || (prefix.ends_with('_')
                && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        let suffix_ok = !suffix.is_empty()
            && suffix
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if prefix_ok && suffix_ok {
            Ok(Self(format!("{prefix}{suffix}")))
        } else {
            Err(IdShapeError(format!("{prefix}{suffix}")))
        }
    }

    /// The identifier as text, without the `#id:` sigil.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LineId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A tag detected in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    /// The identifier carried by the tag.
    pub id: LineId,
    /// Byte range of the tag text, including one leading separating space
    /// when present.
    pub range: Range<usize>,
}

/// Locate the managed tag in a line.
///
/// If a line carries more than one tag, the first match is authoritative.
/// That mirrors the historical behavior this subsystem is compatible with;
/// authors placing two tags on one line get the first honored and the rest
/// left visible in the clean text.
pub fn detect_tag(line: &str) -> Option<TagMatch> {
    let caps = TAG_RE.captures(line)?;
    let whole = caps.get(0)?;
    let id = caps.get(1)?;
    Some(TagMatch {
        id: LineId(id.as_str().to_string()),
        range: whole.start()..whole.end(),
    })
}

/// Remove the managed tag (and its one separating space) from a line.
///
/// The rest of the line is preserved byte-for-byte. Lines without a tag are
/// returned unchanged.
pub fn strip_tag(line: &str) -> String {
    match detect_tag(line) {
        Some(m) => {
            let mut out = String::with_capacity(line.len());
            out.push_str(&line[..m.range.start]);
            out.push_str(&line[m.range.end..]);
            out
        }
        None => line.to_string(),
    }
}

/// Insert `" #id:<id>"` into a line at its canonical position.
///
/// Placement rules, applied identically by every caller so extraction and
/// reconstruction land on the same spot:
///
/// - a bracketed choice (`*`/`+`/`-` markers followed by `[...]` in the
///   non-comment portion) gets the tag immediately before the closing `]`;
/// - any other line gets it at the end of the non-comment portion, before a
///   trailing `//` comment;
/// - lines whose non-comment portion is empty or whitespace are returned
///   untouched.
///
/// Comment-boundary policy: the first `//` in the line starts the trailing
/// comment, even when it appears inside quoted text. This matches the
/// textual treatment on the compile side; authors who need `//` in spoken
/// text can place the tag by hand.
pub fn inject_tag(line: &str, id: &LineId) -> String {
    let (content, comment) = match line.find("//") {
        Some(pos) => line.split_at(pos),
        None => (line, ""),
    };

    if content.trim().is_empty() {
        return line.to_string();
    }

    let insert_at = choice_close_bracket(content).unwrap_or_else(|| content.trim_end().len());

    let mut out = String::with_capacity(line.len() + TAG_SIGIL.len() + id.as_str().len() + 1);
    out.push_str(&content[..insert_at]);
    out.push(' ');
    out.push_str(TAG_SIGIL);
    out.push_str(id.as_str());
    out.push_str(&content[insert_at..]);
    out.push_str(comment);
    out
}

/// Byte offset of the closing `]` of a bracketed choice, if the content is
/// one: leading `*`/`+`/`-` markers (whitespace between markers allowed)
/// and a `[...]` section. The tag belongs inside the brackets so it stays
/// part of the choice label.
fn choice_close_bracket(content: &str) -> Option<usize> {
    let mut rest = content.trim_start();
    let mut saw_marker = false;
    while let Some(ch) = rest.chars().next() {
        if ch == '*' || ch == '+' || ch == '-' {
            saw_marker = true;
            rest = rest[1..].trim_start();
        } else {
            break;
        }
    }
    if !saw_marker {
        return None;
    }
    content
        .rfind(']')
        .filter(|&close| content[..close].contains('['))
}
