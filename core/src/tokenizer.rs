//! Tokenizer: produces a [`TokenizedString`] from raw Unicode text.
//!
//! Offsets are tracked in UTF-16 code units (§3 invariant: for every token,
//! `input[offset..offset+length] == text` where `input` is addressed in
//! UTF-16 units), since that is the addressing scheme most host platforms
//! (JVM, JS, ICU-based frameworks) use for text ranges.
//!
//! Recognition rules run in priority order at each position, greedy-longest
//! within a rule (§4.F). `&str` is always valid UTF-8/UTF-16, so
//! `TokenKind::InvalidChar` is never produced here; the variant exists in
//! the closed enum (§3) for callers that construct `Token`s from other
//! sources.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::token::{Token, TokenKind, TokenizedString};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap()
});

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s]+").unwrap());

static ACRONYM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{L}+(?:\.\p{L}+)+\.?").unwrap());

/// A char together with its UTF-16 offset and code-unit width.
struct Cp {
    ch: char,
    byte_offset: usize,
    utf16_offset: u32,
    utf16_len: u32,
}

fn scan_codepoints(input: &str) -> Vec<Cp> {
    let mut out = Vec::new();
    let mut utf16_offset = 0u32;
    for (byte_offset, ch) in input.char_indices() {
        let utf16_len = ch.len_utf16() as u32;
        out.push(Cp {
            ch,
            byte_offset,
            utf16_offset,
            utf16_len,
        });
        utf16_offset += utf16_len;
    }
    out
}

fn is_cjk_ideograph(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0xF900..=0xFAFF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2EBEF
    )
}

fn is_hangul_syllable(c: char) -> bool {
    matches!(c as u32, 0xAC00..=0xD7AF)
}

fn is_horizontal_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

/// Tokenize `input` into a [`TokenizedString`] per the rule priority of
/// §4.F.
pub fn tokenize(input: &str) -> TokenizedString {
    let cps = scan_codepoints(input);
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < cps.len() {
        let rest = &input[cps[i].byte_offset..];

        // Rule 1: email.
        if let Some(m) = EMAIL_RE.find(rest) {
            let (end_idx, tok) = take_match(input, &cps, i, m.end(), TokenKind::Email);
            tokens.push(tok);
            i = end_idx;
            continue;
        }

        // Rule 2: URL.
        if let Some(m) = URL_RE.find(rest) {
            let (end_idx, tok) = take_match(input, &cps, i, m.end(), TokenKind::Url);
            tokens.push(tok);
            i = end_idx;
            continue;
        }

        // Rule 3: newline.
        if cps[i].ch == '\n' {
            tokens.push(single_cp_token(&cps[i], "\n", TokenKind::Newline));
            i += 1;
            continue;
        }

        // Rule 4: horizontal whitespace run.
        if is_horizontal_ws(cps[i].ch) {
            let start = i;
            let mut j = i;
            while j < cps.len() && is_horizontal_ws(cps[j].ch) {
                j += 1;
            }
            tokens.push(run_token(input, &cps, start, j, TokenKind::Whitespace));
            i = j;
            continue;
        }

        // Rule 5: ideographic char (one per token).
        if is_cjk_ideograph(cps[i].ch) {
            let mut buf = [0u8; 4];
            let s = cps[i].ch.encode_utf8(&mut buf);
            tokens.push(single_cp_token(&cps[i], s, TokenKind::IdeographicChar));
            i += 1;
            continue;
        }

        // Rule 6: Hangul syllable (one per token).
        if is_hangul_syllable(cps[i].ch) {
            let mut buf = [0u8; 4];
            let s = cps[i].ch.encode_utf8(&mut buf);
            tokens.push(single_cp_token(&cps[i], s, TokenKind::HangulSyllable));
            i += 1;
            continue;
        }

        // Rule 7: acronym (letter+ ('.' letter+)+ '.'?).
        if let Some(m) = ACRONYM_RE.find(rest) {
            // An acronym must contain at least one internal period to be
            // distinguished from a bare word; the regex requires it via
            // `(?:\.\p{L}+)+`.
            let (end_idx, tok) = take_match(input, &cps, i, m.end(), TokenKind::Acronym);
            tokens.push(tok);
            i = end_idx;
            continue;
        }

        // Rule 8: digit run.
        if cps[i].ch.is_ascii_digit() || cps[i].ch.is_numeric() {
            let start = i;
            let mut j = i;
            while j < cps.len() && (cps[j].ch.is_ascii_digit() || cps[j].ch.is_numeric()) {
                j += 1;
            }
            tokens.push(run_token(input, &cps, start, j, TokenKind::Numeric));
            i = j;
            continue;
        }

        // Rule 9: letter run.
        if cps[i].ch.is_alphabetic() {
            let start = i;
            let mut j = i;
            while j < cps.len() && cps[j].ch.is_alphabetic() {
                j += 1;
            }
            tokens.push(run_token(input, &cps, start, j, TokenKind::Word));
            i = j;
            continue;
        }

        // Rule 10: punctuation.
        if let Some(kind) = TokenKind::punctuation_for(cps[i].ch) {
            let mut buf = [0u8; 4];
            let s = cps[i].ch.encode_utf8(&mut buf);
            tokens.push(single_cp_token(&cps[i], s, kind));
            i += 1;
            continue;
        }

        // Rule 11: other.
        let mut buf = [0u8; 4];
        let s = cps[i].ch.encode_utf8(&mut buf);
        tokens.push(single_cp_token(&cps[i], s, TokenKind::Other));
        i += 1;
    }

    TokenizedString::new(input.to_string(), tokens)
}

fn single_cp_token(cp: &Cp, text: &str, kind: TokenKind) -> Token {
    Token::new(text, kind, cp.utf16_offset, cp.utf16_len)
}

fn run_token(input: &str, cps: &[Cp], start: usize, end: usize, kind: TokenKind) -> Token {
    let byte_start = cps[start].byte_offset;
    let byte_end = if end < cps.len() {
        cps[end].byte_offset
    } else {
        input.len()
    };
    let utf16_start = cps[start].utf16_offset;
    let utf16_end = if end < cps.len() {
        cps[end].utf16_offset
    } else {
        cps[start..end]
            .iter()
            .map(|c| c.utf16_len)
            .sum::<u32>()
            + utf16_start
    };
    Token::new(
        &input[byte_start..byte_end],
        kind,
        utf16_start,
        utf16_end - utf16_start,
    )
}

/// Consume codepoints until the regex match's byte end is reached, starting
/// from codepoint index `start`. Returns the next codepoint index and the
/// assembled token.
fn take_match(
    input: &str,
    cps: &[Cp],
    start: usize,
    match_byte_end_rel: usize,
    kind: TokenKind,
) -> (usize, Token) {
    let byte_start = cps[start].byte_offset;
    let byte_end = byte_start + match_byte_end_rel;
    let mut j = start;
    while j < cps.len() && cps[j].byte_offset < byte_end {
        j += 1;
    }
    let utf16_start = cps[start].utf16_offset;
    let utf16_end = if j < cps.len() {
        cps[j].utf16_offset
    } else {
        cps[start..j].iter().map(|c| c.utf16_len).sum::<u32>() + utf16_start
    };
    let text = &input[byte_start..byte_end];
    (j, Token::new(text, kind, utf16_start, utf16_end - utf16_start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstructs_input_exactly() {
        let inputs = [
            "123 Main Street",
            "U.S.A. or USA",
            "Hello, 北京市 World!",
            "",
            "a.b.c.d",
        ];
        for input in inputs {
            let ts = tokenize(input);
            for t in ts.tokens() {
                let units: Vec<u16> = input.encode_utf16().collect();
                let start = t.offset as usize;
                let end = start + t.length as usize;
                let slice = String::from_utf16(&units[start..end]).unwrap();
                assert_eq!(slice, t.text, "token {:?} mismatched span", t);
            }
            assert_eq!(ts.reconstruct(), input);
        }
    }

    #[test]
    fn numeric_word_whitespace_offsets() {
        let ts = tokenize("123 Main Street");
        let kinds: Vec<_> = ts.tokens().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Numeric,
                TokenKind::Whitespace,
                TokenKind::Word,
                TokenKind::Whitespace,
                TokenKind::Word,
            ]
        );
        let offsets: Vec<(u32, u32)> = ts.tokens().iter().map(|t| (t.offset, t.length)).collect();
        assert_eq!(
            offsets,
            vec![(0, 3), (3, 1), (4, 4), (8, 1), (9, 6)]
        );
    }

    #[test]
    fn acronym_vs_word() {
        let ts = tokenize("U.S.A. or USA");
        let acronyms: Vec<_> = ts
            .tokens()
            .iter()
            .filter(|t| t.kind == TokenKind::Acronym)
            .collect();
        assert_eq!(acronyms.len(), 1);
        assert_eq!(acronyms[0].text, "U.S.A.");

        let words: Vec<_> = ts
            .tokens()
            .iter()
            .filter(|t| t.kind == TokenKind::Word)
            .collect();
        assert_eq!(words.len(), 2); // "or" and "USA"
        assert!(words.iter().any(|t| t.text == "USA"));
    }

    #[test]
    fn email_and_url_tokens() {
        let ts = tokenize("mail me at foo@bar.com or https://example.com/x");
        assert!(ts.tokens().iter().any(|t| t.kind == TokenKind::Email && t.text == "foo@bar.com"));
        assert!(ts
            .tokens()
            .iter()
            .any(|t| t.kind == TokenKind::Url && t.text == "https://example.com/x"));
    }

    #[test]
    fn ideographic_and_hangul_are_single_codepoint_tokens() {
        let ts = tokenize("北京");
        assert_eq!(ts.tokens().len(), 2);
        assert!(ts
            .tokens()
            .iter()
            .all(|t| t.kind == TokenKind::IdeographicChar));

        let ts = tokenize("안녕");
        assert_eq!(ts.tokens().len(), 2);
        assert!(ts
            .tokens()
            .iter()
            .all(|t| t.kind == TokenKind::HangulSyllable));
    }

    #[test]
    fn punctuation_maps_to_specific_kind() {
        let ts = tokenize("a, b.");
        let kinds: Vec<_> = ts.tokens().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Word,
                TokenKind::Comma,
                TokenKind::Whitespace,
                TokenKind::Word,
                TokenKind::Period,
            ]
        );
    }
}
