//! Unicode helpers: normalization, accent stripping, grapheme-aware reverse
//! and script detection.

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Compose to NFC.
pub fn to_nfc(s: &str) -> String {
    s.nfc().collect()
}

/// Decompose to NFD.
pub fn to_nfd(s: &str) -> String {
    s.nfd().collect()
}

/// NFD, drop non-spacing-mark codepoints, recompose to NFC.
pub fn strip_accents(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .nfc()
        .collect()
}

fn is_combining_mark(c: char) -> bool {
    // Approximates Unicode general category Mn (non-spacing mark) by range:
    // the combining-diacritics blocks plus the common combining blocks used
    // by Latin/Cyrillic/Arabic/Hebrew/Indic text, which is what accent
    // stripping needs in practice.
    matches!(c as u32,
        0x0300..=0x036F   // Combining Diacritical Marks
        | 0x0483..=0x0489 // Combining Cyrillic
        | 0x0591..=0x05BD // Hebrew points
        | 0x05BF | 0x05C1 | 0x05C2 | 0x05C4 | 0x05C5 | 0x05C7
        | 0x0610..=0x061A // Arabic marks
        | 0x064B..=0x065F
        | 0x0670
        | 0x06D6..=0x06DC
        | 0x06DF..=0x06E4
        | 0x06E7..=0x06E8
        | 0x06EA..=0x06ED
        | 0x0711
        | 0x0730..=0x074A // Syriac
        | 0x07A6..=0x07B0 // Thaana
        | 0x0900..=0x0902 // Devanagari marks
        | 0x093A | 0x093C
        | 0x0941..=0x0948
        | 0x094D
        | 0x0951..=0x0957
        | 0x1AB0..=0x1AFF // Combining Diacritical Marks Extended
        | 0x1DC0..=0x1DFF // Combining Diacritical Marks Supplement
        | 0x20D0..=0x20FF // Combining Diacritical Marks for Symbols
        | 0xFE20..=0xFE2F // Combining Half Marks
    )
}

/// Reverse a string by extended grapheme cluster rather than by codepoint or
/// byte, so multi-codepoint clusters (accented letters, emoji) stay intact.
pub fn reverse_graphemes(s: &str) -> String {
    s.graphemes(true).rev().collect()
}

/// A Unicode writing system, used to select script-specific normalization
/// behavior and as a CRF feature (`script=<Script>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Latin,
    Cyrillic,
    Arabic,
    Hebrew,
    Greek,
    Han,
    Hangul,
    Hiragana,
    Katakana,
    Thai,
    Devanagari,
    Unknown,
}

impl Script {
    pub fn name(&self) -> &'static str {
        match self {
            Script::Latin => "Latin",
            Script::Cyrillic => "Cyrillic",
            Script::Arabic => "Arabic",
            Script::Hebrew => "Hebrew",
            Script::Greek => "Greek",
            Script::Han => "Han",
            Script::Hangul => "Hangul",
            Script::Hiragana => "Hiragana",
            Script::Katakana => "Katakana",
            Script::Thai => "Thai",
            Script::Devanagari => "Devanagari",
            Script::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn classify_codepoint(c: char) -> Option<Script> {
    let cp = c as u32;
    match cp {
        0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F | 0x1E00..=0x1EFF => {
            Some(Script::Latin)
        }
        0x0400..=0x04FF | 0x0500..=0x052F => Some(Script::Cyrillic),
        0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF => Some(Script::Arabic),
        0x0590..=0x05FF => Some(Script::Hebrew),
        0x0370..=0x03FF | 0x1F00..=0x1FFF => Some(Script::Greek),
        0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0x20000..=0x2A6DF | 0xF900..=0xFAFF => {
            Some(Script::Han)
        }
        0xAC00..=0xD7A3 | 0x1100..=0x11FF | 0x3130..=0x318F => Some(Script::Hangul),
        0x3040..=0x309F => Some(Script::Hiragana),
        0x30A0..=0x30FF => Some(Script::Katakana),
        0x0E00..=0x0E7F => Some(Script::Thai),
        0x0900..=0x097F => Some(Script::Devanagari),
        _ => None,
    }
}

/// Classify the dominant script of a string.
///
/// Whitespace, punctuation and digits are ignored; the script with the
/// highest codepoint count wins. Empty input, or input containing only
/// ignored codepoints, returns [`Script::Unknown`].
pub fn detect_script(s: &str) -> Script {
    let mut counts: std::collections::HashMap<Script, usize> = std::collections::HashMap::new();
    for c in s.chars() {
        if c.is_whitespace() || c.is_ascii_punctuation() || c.is_numeric() {
            continue;
        }
        if let Some(script) = classify_codepoint(c) {
            *counts.entry(script).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(script, _)| script)
        .unwrap_or(Script::Unknown)
}
