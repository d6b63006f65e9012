//! Line ending helpers.
//!
//! The overlay engine works on LF (`'\n'`) newlines internally. Content that
//! arrives with CRLF (`"\r\n"`) is normalized on load; the preferred line
//! ending is tracked per file so saving reproduces what the author had.

/// The preferred newline sequence used when saving a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

impl LineEnding {
    /// Detect the dominant line ending from a source text.
    ///
    /// Policy: if the input contains any CRLF (`"\r\n"`), returns
    /// [`LineEnding::Crlf`], otherwise [`LineEnding::Lf`].
    pub fn detect_in_text(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else {
            Self::Lf
        }
    }

    /// Normalize text to LF newlines for internal processing.
    pub fn normalize(text: &str) -> String {
        text.replace("\r\n", "\n")
    }

    /// Convert an LF-normalized text to this line ending for saving.
    pub fn apply_to_text(self, text: &str) -> String {
        match self {
            Self::Lf => text.to_string(),
            Self::Crlf => text.replace('\n', "\r\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_and_restores_crlf() {
        let source = "a\r\nb\r\n";
        let ending = LineEnding::detect_in_text(source);
        assert_eq!(ending, LineEnding::Crlf);

        let normalized = LineEnding::normalize(source);
        assert_eq!(normalized, "a\nb\n");
        assert_eq!(ending.apply_to_text(&normalized), source);
    }

    #[test]
    fn lf_text_passes_through() {
        assert_eq!(LineEnding::detect_in_text("a\nb"), LineEnding::Lf);
        assert_eq!(LineEnding::Lf.apply_to_text("a\nb"), "a\nb");
    }
}
