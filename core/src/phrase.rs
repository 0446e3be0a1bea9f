//! Address expansions, phrases, the phrase dictionary and the phrase
//! searcher (§3 data model, §4.H).

use ahash::AHashMap;

use crate::component::{ComponentMask, DictionaryType};
use crate::token::{Token, TokenizedString};

/// A canonical alternative for a matched phrase (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct AddressExpansion {
    pub canonical: String,
    pub language: String,
    pub components: ComponentMask,
    pub dictionary: DictionaryType,
    pub separable: bool,
}

/// A contiguous run of tokens (including intervening whitespace tokens)
/// matching a dictionary key.
#[derive(Debug, Clone, PartialEq)]
pub struct Phrase {
    pub start_token: u32,
    pub length_tokens: u32,
    pub value: String,
    pub expansions: Vec<AddressExpansion>,
}

impl Phrase {
    pub fn end_token_exclusive(&self) -> u32 {
        self.start_token + self.length_tokens
    }
}

/// Shared, read-only-after-load mapping from a normalized phrase key
/// (lowercase, spaces collapsed) to its non-empty expansion list.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: AHashMap<String, Vec<AddressExpansion>>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a phrase key. `key` is normalized (lowercased, internal
    /// whitespace collapsed to single spaces) before storage. Panics if
    /// `expansions` is empty, since a `Dictionary` entry must be non-empty
    /// per §3.
    pub fn insert(&mut self, key: &str, expansions: Vec<AddressExpansion>) {
        assert!(
            !expansions.is_empty(),
            "dictionary entries must have at least one expansion"
        );
        self.entries
            .entry(normalize_key(key))
            .or_default()
            .extend(expansions);
    }

    pub fn get(&self, key: &str) -> Option<&[AddressExpansion]> {
        self.entries.get(key).map(|v| v.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_prefix(&self, prefix: &str) -> bool {
        self.entries.keys().any(|k| k.starts_with(prefix) && k.len() > prefix.len() || k == prefix)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Lowercase and collapse internal whitespace to single spaces.
pub fn normalize_key(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Find every non-overlapping phrase match in `ts` against `dict`.
///
/// Implements §4.H: at each non-whitespace starting token, extend greedily
/// (consuming whitespace tokens as single-space separators) while a strict
/// prefix of some dictionary key remains possible, remembering every
/// dictionary hit along the way. When candidate matches from different
/// starting positions overlap, the longer match wins; equal-length ties
/// prefer the earlier start. An empty dictionary yields an empty result.
pub fn search_phrases(ts: &TokenizedString, dict: &Dictionary) -> Vec<Phrase> {
    if dict.is_empty() {
        return Vec::new();
    }

    let tokens = ts.tokens();
    let content_positions: Vec<usize> = ts.content_tokens().map(|(i, _)| i).collect();

    // candidates[s] = Some((content_end_exclusive, matched_key)) for the
    // longest dictionary match starting at content_positions[s], if any.
    let mut candidates: Vec<Option<(usize, String)>> = vec![None; content_positions.len()];

    for s in 0..content_positions.len() {
        let mut key = String::new();
        let mut best: Option<(usize, String)> = None;
        let mut j = s;
        loop {
            if j >= content_positions.len() {
                break;
            }
            let word = tokens[content_positions[j]].text.to_lowercase();
            let candidate_key = if key.is_empty() {
                word
            } else {
                format!("{key} {word}")
            };
            if dict.contains_key(&candidate_key) {
                best = Some((j + 1, candidate_key.clone()));
            }
            if !dict.is_prefix(&candidate_key) {
                break;
            }
            key = candidate_key;
            j += 1;
        }
        candidates[s] = best;
    }

    // Interval-selection: prefer longer matches, tie-break earlier start.
    let mut intervals: Vec<(usize, usize, String)> = candidates
        .iter()
        .enumerate()
        .filter_map(|(s, c)| c.as_ref().map(|(end, key)| (s, *end, key.clone())))
        .collect();
    intervals.sort_by(|a, b| {
        let len_a = a.1 - a.0;
        let len_b = b.1 - b.0;
        len_b.cmp(&len_a).then(a.0.cmp(&b.0))
    });

    let mut taken = vec![false; content_positions.len()];
    let mut accepted: Vec<(usize, usize, String)> = Vec::new();
    for (start, end, key) in intervals {
        if (start..end).any(|i| taken[i]) {
            continue;
        }
        for i in start..end {
            taken[i] = true;
        }
        accepted.push((start, end, key));
    }
    accepted.sort_by_key(|(start, ..)| *start);

    accepted
        .into_iter()
        .map(|(start, end, key)| {
            let start_tok = content_positions[start];
            let end_tok = content_positions[end - 1];
            let value = (start..end)
                .map(|i| tokens[content_positions[i]].text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let expansions = dict.get(&key).expect("matched key must exist").to_vec();
            Phrase {
                start_token: start_tok as u32,
                length_tokens: (end_tok - start_tok + 1) as u32,
                value,
                expansions,
            }
        })
        .collect()
}

/// Look up the [`Phrase`] (if any) covering token index `i`.
pub fn phrase_covering(phrases: &[Phrase], i: usize) -> Option<&Phrase> {
    phrases.iter().find(|p| {
        let start = p.start_token as usize;
        let end = p.end_token_exclusive() as usize;
        i >= start && i < end
    })
}

/// Position of token `i` within the phrase covering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhrasePosition {
    Begin,
    Middle,
    End,
    Single,
}

pub fn phrase_position(phrase: &Phrase, token_index: usize, token: &Token) -> Option<PhrasePosition> {
    let _ = token;
    let start = phrase.start_token as usize;
    let end = phrase.end_token_exclusive() as usize;
    if token_index < start || token_index >= end {
        return None;
    }
    Some(if phrase.length_tokens == 1 {
        PhrasePosition::Single
    } else if token_index == start {
        PhrasePosition::Begin
    } else if token_index == end - 1 {
        PhrasePosition::End
    } else {
        PhrasePosition::Middle
    })
}
