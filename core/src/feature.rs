//! Feature extractor (§4.J): emits the bag of state-feature strings for each
//! token position in a parse window.
//!
//! Grounded on the same "feature = formatted string, looked up in a table"
//! shape used by the n-gram scoring path in this crate's teacher, adapted to
//! the closed feature family required here.

use crate::phrase::{phrase_covering, phrase_position, Phrase, PhrasePosition};
use crate::token::Token;
use crate::unicode_util::detect_script;

const SENTINEL_BEFORE: &str = "^";
const SENTINEL_AFTER: &str = "$";

fn word_at(tokens: &[Token], i: isize) -> String {
    if i < 0 {
        SENTINEL_BEFORE.to_string()
    } else if i as usize >= tokens.len() {
        SENTINEL_AFTER.to_string()
    } else {
        tokens[i as usize].text.to_lowercase()
    }
}

fn shape_of(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_uppercase() {
                'X'
            } else if c.is_lowercase() {
                'x'
            } else if c.is_ascii_digit() {
                'd'
            } else {
                c
            }
        })
        .collect()
}

fn affix(s: &str, k: usize, from_start: bool) -> Option<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < k || k == 0 {
        return None;
    }
    let slice = if from_start {
        &chars[..k]
    } else {
        &chars[chars.len() - k..]
    };
    Some(slice.iter().collect())
}

/// Extract the state-feature strings for `tokens[i]` in a window of length
/// `T = tokens.len()`. `phrases` supplies phrase-membership features and
/// must be indexed in the same token space as `tokens` (callers that built
/// `phrases` against the original, whitespace-inclusive token stream must
/// translate them into `tokens`'s index space first — see
/// `parser::translate_phrases_to_content_space`). `language` is the BCP-47
/// hint from `ParserOptions` (§4.L) and, when set, restricts the
/// `phrase_dict`/`phrase_canonical` features to `AddressExpansion`s tagged
/// with that language — falling back to every expansion on the covering
/// phrase if none match, so an unrecognized hint never silently drops all
/// phrase features.
pub fn extract_state_features(
    tokens: &[Token],
    i: usize,
    phrases: &[Phrase],
    language: Option<&str>,
) -> Vec<String> {
    let mut feats = Vec::new();
    let t = &tokens[i];
    let lower = t.text.to_lowercase();

    feats.push("bias".to_string());
    feats.push(format!("word={lower}"));
    let digit_form: String = lower
        .chars()
        .map(|c| if c.is_ascii_digit() { 'D' } else { c })
        .collect();
    if digit_form != lower {
        feats.push(format!("word={digit_form}"));
    }

    for k in 1..=4 {
        if let Some(p) = affix(&lower, k, true) {
            feats.push(format!("prefix{k}={p}"));
        }
        if let Some(s) = affix(&lower, k, false) {
            feats.push(format!("suffix{k}={s}"));
        }
    }

    feats.push(format!("shape={}", shape_of(&t.text)));
    feats.push(format!("script={}", detect_script(&t.text)));

    feats.push(format!("prev_word={}", word_at(tokens, i as isize - 1)));
    feats.push(format!("next_word={}", word_at(tokens, i as isize + 1)));
    feats.push(format!("prev2={}", word_at(tokens, i as isize - 2)));
    feats.push(format!("next2={}", word_at(tokens, i as isize + 2)));

    if let Some(phrase) = phrase_covering(phrases, i) {
        let matching: Vec<_> = match language {
            Some(lang) => phrase.expansions.iter().filter(|e| e.language == lang).collect(),
            None => Vec::new(),
        };
        let to_emit: Vec<_> = if matching.is_empty() {
            phrase.expansions.iter().collect()
        } else {
            matching
        };
        for exp in to_emit {
            feats.push(format!("phrase_dict={}", exp.dictionary));
            feats.push(format!("phrase_canonical={}", exp.canonical));
        }
        if let Some(pos) = phrase_position(phrase, i, t) {
            let label = match pos {
                PhrasePosition::Begin => "begin",
                PhrasePosition::Middle => "middle",
                PhrasePosition::End => "end",
                PhrasePosition::Single => "single",
            };
            feats.push(format!("in_phrase_{label}"));
        }
    }

    feats
}

/// Extract the state-transition feature strings for the edge arriving at
/// `tokens[i]` (§4.J: these follow the same path through
/// `state_trans_features`/`state_trans_weights` as state features, but
/// contribute to the transient `[L×L]` transition overlay for that step
/// rather than to `state`). Grounded on the same token-context shape as
/// [`extract_state_features`], restricted to the edge-local subset (bias,
/// current word, shape) since transition features describe the boundary
/// rather than the token in isolation.
pub fn extract_transition_features(tokens: &[Token], i: usize) -> Vec<String> {
    let t = &tokens[i];
    let lower = t.text.to_lowercase();
    vec![
        "trans_bias".to_string(),
        format!("trans_word={lower}"),
        format!("trans_shape={}", shape_of(&t.text)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentMask;
    use crate::phrase::AddressExpansion;
    use crate::tokenizer::tokenize;

    fn expansion(canonical: &str) -> AddressExpansion {
        AddressExpansion {
            canonical: canonical.to_string(),
            language: "en".to_string(),
            components: ComponentMask::all(),
            dictionary: crate::component::DictionaryType::StreetType,
            separable: true,
        }
    }

    #[test]
    fn phrase_features_attach_at_the_phrase_s_own_index() {
        let ts = tokenize("Ave");
        let phrase = Phrase {
            start_token: 0,
            length_tokens: 1,
            value: "Ave".to_string(),
            expansions: vec![expansion("Avenue")],
        };
        let feats = extract_state_features(ts.tokens(), 0, &[phrase], None);
        assert!(feats.contains(&"phrase_canonical=Avenue".to_string()));
        assert!(feats.contains(&"in_phrase_single".to_string()));
    }

    #[test]
    fn phrase_features_absent_outside_the_phrase_s_span() {
        let ts = tokenize("Franklin Ave");
        let phrase = Phrase {
            start_token: 1,
            length_tokens: 1,
            value: "Ave".to_string(),
            expansions: vec![expansion("Avenue")],
        };
        let feats = extract_state_features(ts.tokens(), 0, &[phrase], None);
        assert!(!feats.iter().any(|f| f.starts_with("phrase_canonical=")));
    }

    #[test]
    fn bias_and_word_features_present() {
        let ts = tokenize("123");
        let feats = extract_state_features(ts.tokens(), 0, &[], None);
        assert!(feats.contains(&"bias".to_string()));
        assert!(feats.contains(&"word=123".to_string()));
        assert!(feats.contains(&"word=DDD".to_string()));
    }

    #[test]
    fn sentinel_context_at_window_edges() {
        let ts = tokenize("Main");
        let feats = extract_state_features(ts.tokens(), 0, &[], None);
        assert!(feats.contains(&"prev_word=^".to_string()));
        assert!(feats.contains(&"next_word=$".to_string()));
    }

    #[test]
    fn affix_features_bounded_by_token_length() {
        let ts = tokenize("St");
        let feats = extract_state_features(ts.tokens(), 0, &[], None);
        assert!(feats.contains(&"prefix1=s".to_string()));
        assert!(feats.contains(&"prefix2=st".to_string()));
        assert!(!feats.iter().any(|f| f.starts_with("prefix3=")));
    }

    #[test]
    fn shape_feature_classifies_case_and_digits() {
        // Built directly: the tokenizer itself never mixes letters and
        // digits into one token (rules 8/9 are separate digit/letter runs).
        let tokens = vec![Token::new("Ave12", crate::token::TokenKind::Other, 0, 5)];
        let feats = extract_state_features(&tokens, 0, &[], None);
        assert!(feats.contains(&"shape=Xxxdd".to_string()));
    }
}
