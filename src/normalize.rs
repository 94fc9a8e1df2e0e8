use once_cell::sync::Lazy;
use regex::Regex;

// @module: Unicode and OCR artifact cleanup

// @const: Hyphen-broken word across a line break
static BROKEN_HYPHEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\p{L})-[ \t]*\r?\n[ \t]*(\p{L})").unwrap()
});

// @const: Runs of in-line whitespace
static REPEATED_SPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[ \t]{2,}").unwrap()
});

// @const: Three or more consecutive newlines
static EXCESS_BLANK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n{3,}").unwrap()
});

/// OCR scans break words across lines with a trailing hyphen. Rejoin them
/// so paragraph splitting sees whole words.
pub fn repair_hyphenation(text: &str) -> String {
    BROKEN_HYPHEN_REGEX.replace_all(text, "$1$2").into_owned()
}

/// Map OCR-mangled Unicode to its plain equivalent: ligatures, smart
/// quotes, ellipsis, en-dash to em-dash.
pub fn normalize_unicode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{FB00}' => out.push_str("ff"),
            '\u{FB01}' => out.push_str("fi"),
            '\u{FB02}' => out.push_str("fl"),
            '\u{FB03}' => out.push_str("ffi"),
            '\u{FB04}' => out.push_str("ffl"),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            '\u{2013}' => out.push('\u{2014}'),
            _ => out.push(c),
        }
    }
    out
}

/// Collapse repeated in-line spaces and tabs to a single space.
pub fn collapse_spaces(text: &str) -> String {
    REPEATED_SPACE_REGEX.replace_all(text, " ").into_owned()
}

/// Collapse runs of blank lines left behind by noise stripping.
pub fn collapse_blank_lines(text: &str) -> String {
    EXCESS_BLANK_REGEX.replace_all(text, "\n\n").into_owned()
}

/// Full cleanup pass applied before segmentation: hyphenation repair,
/// Unicode normalization, space collapse. Pure function.
pub fn clean(text: &str) -> String {
    let repaired = repair_hyphenation(text);
    let normalized = normalize_unicode(&repaired);
    collapse_spaces(&normalized)
}
