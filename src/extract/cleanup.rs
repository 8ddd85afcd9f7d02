//! Normalization of recognized text.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static HYPHENATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z])-[ \t]*\n[ \t]*([a-z])").expect("valid regex"));
static SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]{2,}").expect("valid regex"));
static TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").expect("valid regex"));

const LIGATURES: [(&str, &str); 7] = [
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
    ("\u{FB05}", "st"),
    ("\u{FB06}", "st"),
];

/// Options for text cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Replace ligature code points (fi, fl, ...) by their letters
    pub fix_ligatures: bool,

    /// Drop control characters (except newline and tab) and U+FFFD
    pub remove_control_chars: bool,

    /// Join words hyphenated across a line break
    pub fix_hyphenation: bool,

    /// Collapse runs of spaces and strip trailing spaces
    pub normalize_whitespace: bool,

    /// Maximum consecutive newlines (0 = unlimited)
    pub max_consecutive_newlines: u8,

    /// Strip leading and trailing whitespace
    pub trim: bool,
}

impl CleanupOptions {
    /// No cleanup: text passes through unchanged.
    pub fn none() -> Self {
        Self {
            normalize_unicode: false,
            fix_ligatures: false,
            remove_control_chars: false,
            fix_hyphenation: false,
            normalize_whitespace: false,
            max_consecutive_newlines: 0,
            trim: false,
        }
    }

    /// Cleanup for prose recognized by OCR.
    pub fn standard() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            remove_control_chars: true,
            fix_hyphenation: true,
            normalize_whitespace: true,
            max_consecutive_newlines: 2,
            trim: true,
        }
    }

    /// Cleanup that keeps layout intact (code, markup, tables).
    pub fn verbatim() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            remove_control_chars: true,
            fix_hyphenation: false,
            normalize_whitespace: false,
            max_consecutive_newlines: 0,
            trim: true,
        }
    }

    /// These options minus the steps that rewrite line structure.
    pub fn layout_preserving(&self) -> Self {
        Self {
            fix_hyphenation: false,
            normalize_whitespace: false,
            max_consecutive_newlines: 0,
            ..self.clone()
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::none()
    }
}

/// Run `text` through the cleanup steps enabled in `options`.
pub fn clean(text: &str, options: &CleanupOptions) -> String {
    let mut result: String = if options.normalize_unicode {
        text.nfc().collect()
    } else {
        text.to_string()
    };

    if options.fix_ligatures {
        for (ligature, replacement) in LIGATURES {
            result = result.replace(ligature, replacement);
        }
    }

    if options.remove_control_chars {
        result = result.replace("\r\n", "\n");
        result.retain(|c| c == '\n' || c == '\t' || !(c.is_control() || c == '\u{FFFD}'));
    }

    if options.fix_hyphenation {
        result = HYPHENATION.replace_all(&result, "$1$2").into_owned();
    }

    if options.normalize_whitespace {
        result = SPACE_RUNS.replace_all(&result, " ").into_owned();
        result = TRAILING_SPACE.replace_all(&result, "").into_owned();
    }

    if options.max_consecutive_newlines > 0 {
        result = limit_newlines(&result, options.max_consecutive_newlines as usize);
    }

    if options.trim {
        result = result.trim().to_string();
    }
    result
}

fn limit_newlines(text: &str, max: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0;
    for c in text.chars() {
        if c == '\n' {
            run += 1;
            if run > max {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_normalization() {
        let text = "cafe\u{0301}";
        assert_eq!(clean(text, &CleanupOptions::standard()), "caf\u{00E9}");
    }

    #[test]
    fn test_ligature_fix() {
        let result = clean("ﬁnding ﬂowers", &CleanupOptions::standard());
        assert_eq!(result, "finding flowers");
    }

    #[test]
    fn test_control_chars_removed() {
        let result = clean("a\u{0007}b\u{FFFD}c\r\nd", &CleanupOptions::standard());
        assert_eq!(result, "abc\nd");
    }

    #[test]
    fn test_hyphenation_fix() {
        let options = CleanupOptions::standard();
        assert_eq!(clean("infor-\nmation", &options), "information");
        assert_eq!(clean("con-\n sectetuer", &options), "consectetuer");
        assert_eq!(clean("well-known", &options), "well-known");
    }

    #[test]
    fn test_whitespace_and_newlines() {
        let text = "  a    b  \n\n\n\n\nc  ";
        assert_eq!(clean(text, &CleanupOptions::standard()), "a b\n\nc");
    }

    #[test]
    fn test_verbatim_keeps_layout() {
        let text = "fn main() {\n    let x = 1;\n}";
        assert_eq!(clean(text, &CleanupOptions::verbatim()), text);
    }

    #[test]
    fn test_none_is_identity() {
        let text = "  co-\noperation   of  two\n\n\n\nparts  \u{FB01}";
        assert_eq!(clean(text, &CleanupOptions::none()), text);
        assert_eq!(CleanupOptions::default(), CleanupOptions::none());
    }

    #[test]
    fn test_layout_preserving_subset() {
        let options = CleanupOptions::standard().layout_preserving();
        assert!(options.normalize_unicode && options.trim);
        assert!(!options.fix_hyphenation && !options.normalize_whitespace);
        assert_eq!(clean("a  b-\nc\n\n\n", &options), "a  b-\nc");
        assert_eq!(CleanupOptions::none().layout_preserving(), CleanupOptions::none());
    }

    #[test]
    fn test_blank_input() {
        assert!(clean(" \n\t \u{FFFD}", &CleanupOptions::standard()).is_empty());
    }
}
