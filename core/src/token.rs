//! Token data model: [`Token`], [`TokenKind`] and [`TokenizedString`].

use serde::{Deserialize, Serialize};

/// Closed enumeration of token kinds the tokenizer can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Word,
    Abbreviation,
    IdeographicChar,
    HangulSyllable,
    Acronym,
    Phrase,
    Email,
    Url,
    UsPhone,
    InternationalPhone,
    Numeric,
    Ordinal,
    RomanNumeral,
    IdeographicNumber,
    // Punctuation (24 variants).
    Period,
    Comma,
    Colon,
    Semicolon,
    Exclamation,
    Question,
    Hyphen,
    Slash,
    Backslash,
    Ampersand,
    At,
    Hash,
    Percent,
    Apostrophe,
    Quote,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Asterisk,
    Plus,
    Equals,
    Whitespace,
    Newline,
    Other,
    InvalidChar,
}

impl TokenKind {
    /// Map a single punctuation codepoint to its token kind, per the 24
    /// fixed mappings. Returns `None` for codepoints that are not one of
    /// these 24 (tokenizer rule 11 then falls back to `Other`).
    pub fn punctuation_for(c: char) -> Option<TokenKind> {
        Some(match c {
            '.' => TokenKind::Period,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '!' => TokenKind::Exclamation,
            '?' => TokenKind::Question,
            '-' => TokenKind::Hyphen,
            '/' => TokenKind::Slash,
            '\\' => TokenKind::Backslash,
            '&' => TokenKind::Ampersand,
            '@' => TokenKind::At,
            '#' => TokenKind::Hash,
            '%' => TokenKind::Percent,
            '\'' => TokenKind::Apostrophe,
            '"' => TokenKind::Quote,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '*' => TokenKind::Asterisk,
            '+' => TokenKind::Plus,
            '=' => TokenKind::Equals,
            _ => return None,
        })
    }

    /// Whether this kind should be skipped by the CRF/parser pipeline
    /// (non-content tokens).
    pub fn is_skippable_for_parsing(&self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Newline)
    }
}

/// A single token. `offset`/`length` are UTF-16 code unit positions into the
/// original input string, satisfying `input[offset..offset+length] == text`
/// (measured in UTF-16 code units, see [`TokenizedString`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub offset: u32,
    pub length: u32,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, offset: u32, length: u32) -> Self {
        Self {
            text: text.into(),
            kind,
            offset,
            length,
        }
    }
}

/// Owns the original string and an ordered, immutable sequence of tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizedString {
    original: String,
    tokens: Vec<Token>,
}

impl TokenizedString {
    pub fn new(original: String, tokens: Vec<Token>) -> Self {
        Self { original, tokens }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Reconstruct the original string from `offset`/`length`-addressed
    /// slices of the UTF-16 encoding of `original` (invariant #2 of §8).
    pub fn reconstruct(&self) -> String {
        let units: Vec<u16> = self.original.encode_utf16().collect();
        let mut out: Vec<u16> = Vec::with_capacity(units.len());
        for t in &self.tokens {
            let start = t.offset as usize;
            let end = start + t.length as usize;
            out.extend_from_slice(&units[start..end]);
        }
        String::from_utf16_lossy(&out)
    }

    /// The non-whitespace, non-newline token subsequence, in order, as used
    /// by the parser façade (§4.L step 1).
    pub fn content_tokens(&self) -> impl Iterator<Item = (usize, &Token)> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_skippable_for_parsing())
    }
}
