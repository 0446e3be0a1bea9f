//! Cross-module invariants for the tokenizer (§8 invariants #1 and #2):
//! every token's `offset..offset+length` slice of the UTF-16 encoding of
//! the input equals its `text`, and concatenating tokens in order
//! reconstructs the input exactly.

use address_parser_core::tokenizer::tokenize;
use address_parser_core::token::TokenKind;

const SAMPLES: &[&str] = &[
    "781 Franklin Ave, Brooklyn NY 11216, USA",
    "30 W 26th St",
    "N Main St",
    "U.S.A. or USA",
    "mail me at foo@bar.com or https://example.com/address?q=1",
    "Hello, 北京市 World!",
    "서울특별시 강남구",
    "Calle San Martín 123, 2º B",
    "",
    "a.b.c.d",
    "line one\nline two",
];

#[test]
fn every_token_span_matches_its_text() {
    for input in SAMPLES {
        let ts = tokenize(input);
        let units: Vec<u16> = input.encode_utf16().collect();
        for t in ts.tokens() {
            let start = t.offset as usize;
            let end = start + t.length as usize;
            assert!(end <= units.len(), "token {:?} out of bounds for {input:?}", t);
            let slice = String::from_utf16(&units[start..end]).unwrap();
            assert_eq!(slice, t.text, "mismatched span for {input:?}");
        }
    }
}

#[test]
fn tokens_reconstruct_the_original_string() {
    for input in SAMPLES {
        let ts = tokenize(input);
        assert_eq!(&ts.reconstruct(), input, "failed to reconstruct {input:?}");
    }
}

#[test]
fn scenario_123_main_street_offsets() {
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
    assert_eq!(offsets, vec![(0, 3), (3, 1), (4, 4), (8, 1), (9, 6)]);
}

#[test]
fn scenario_usa_acronym_vs_word() {
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
    assert_eq!(words.len(), 2);
}
