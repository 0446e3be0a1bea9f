//! Parser façade (§4.L): orchestrates tokenize -> feature extraction ->
//! Viterbi -> label merge into address components.

use crate::crf::{viterbi_with_overlays, CrfContext, CrfModel};
use crate::dense::DenseMatrix;
use crate::error::ParseError;
use crate::feature::{extract_state_features, extract_transition_features};
use crate::options::ParserOptions;
use crate::phrase::{search_phrases, Dictionary, Phrase};
use crate::tokenizer::tokenize;

/// Re-express `phrases` (indexed in the original, whitespace-inclusive
/// token stream per [`search_phrases`]) in the content-token index space
/// used by [`parse`]'s feature-extraction loop. A phrase's start/end tokens
/// are always non-whitespace (phrase matching only ever starts and ends on
/// content tokens), so both endpoints are guaranteed present in
/// `content_positions`.
fn translate_phrases_to_content_space(phrases: &[Phrase], content_positions: &[usize]) -> Vec<Phrase> {
    phrases
        .iter()
        .filter_map(|p| {
            let orig_start = p.start_token as usize;
            let orig_end_incl = p.end_token_exclusive() as usize - 1;
            let content_start = content_positions.binary_search(&orig_start).ok()?;
            let content_end_incl = content_positions.binary_search(&orig_end_incl).ok()?;
            Some(Phrase {
                start_token: content_start as u32,
                length_tokens: (content_end_incl - content_start + 1) as u32,
                value: p.value.clone(),
                expansions: p.expansions.clone(),
            })
        })
        .collect()
}

/// A single labeled span of the parsed address (§6: `Model::parse` return
/// element).
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub label: String,
    pub text: String,
}

/// Parse `input` against `model`/`dictionary`, reusing `ctx` as scratch.
///
/// Per §7: an empty input yields an empty list; this never fails once a
/// live `&CrfModel` is in hand, since a `Model` only exists via a
/// fully-successful load (see [`crate::model::Model::try_parse`]).
pub fn parse(
    model: &CrfModel,
    dictionary: &Dictionary,
    ctx: &mut CrfContext,
    input: &str,
    options: &ParserOptions,
) -> Vec<Component> {
    if input.is_empty() {
        return Vec::new();
    }

    let ts = tokenize(input);
    let content_positions: Vec<usize> = ts.content_tokens().map(|(i, _)| i).collect();
    let content: Vec<_> = ts.content_tokens().map(|(_, t)| t.clone()).collect();
    let t = content.len();
    if t == 0 {
        return Vec::new();
    }

    ctx.prepare(t);

    let phrases = translate_phrases_to_content_space(&search_phrases(&ts, dictionary), &content_positions);
    let language = options.language.as_deref();

    let mut overlays: Vec<Option<DenseMatrix>> = vec![None; t];
    let num_labels = model.num_labels();

    for i in 0..t {
        let feats = extract_state_features(&content, i, &phrases, language);
        for feat in &feats {
            if let Some(weights) = model.state_feature_weights(feat) {
                for (label, w) in weights.iter().enumerate() {
                    let current = ctx.state.get(i, label);
                    ctx.state.set(i, label, current + w);
                }
            }
        }

        if i == 0 {
            continue;
        }
        for feat in extract_transition_features(&content, i) {
            if let Some(row) = model.state_trans_feature_weights(&feat) {
                if row.len() != num_labels * num_labels {
                    continue;
                }
                let overlay = overlays[i].get_or_insert_with(|| DenseMatrix::zeros(num_labels, num_labels));
                for prev in 0..num_labels {
                    for next in 0..num_labels {
                        let current = overlay.get(prev, next);
                        overlay.set(prev, next, current + row[prev * num_labels + next]);
                    }
                }
            }
        }
    }

    let decoded = viterbi_with_overlays(ctx, &model.transitions, &overlays);

    merge_labels(&content, &decoded.labels, &model.labels)
}

/// Like [`parse`], but returns [`ParseError::ModelNotReady`] instead of
/// panicking when `model.num_labels() == 0` (an uninitialized/placeholder
/// model), and [`ParseError::InvalidInput`] is never produced here since
/// empty input is a valid, zero-component parse per §7.
pub fn try_parse(
    model: &CrfModel,
    dictionary: &Dictionary,
    ctx: &mut CrfContext,
    input: &str,
    options: &ParserOptions,
) -> Result<Vec<Component>, ParseError> {
    if model.num_labels() == 0 {
        return Err(ParseError::ModelNotReady);
    }
    Ok(parse(model, dictionary, ctx, input, options))
}

/// Merge contiguous tokens sharing the same label into one component whose
/// text is the joined, lowercased, space-separated surface forms (§4.L
/// step 5).
fn merge_labels(
    tokens: &[crate::token::Token],
    label_ids: &[u32],
    label_names: &[String],
) -> Vec<Component> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < tokens.len() {
        let label_id = label_ids[i] as usize;
        let mut j = i + 1;
        while j < tokens.len() && label_ids[j] as usize == label_id {
            j += 1;
        }
        let text = tokens[i..j]
            .iter()
            .map(|t| t.text.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        let label = label_names
            .get(label_id)
            .cloned()
            .unwrap_or_else(|| format!("label{label_id}"));
        out.push(Component { label, text });
        i = j;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentMask, DictionaryType};
    use crate::phrase::{phrase_covering, AddressExpansion};

    #[test]
    fn translate_phrases_to_content_space_maps_original_index_to_content_index() {
        // "781 Franklin Ave": tokens are 781(0) ws(1) Franklin(2) ws(3) Ave(4);
        // content positions are [0, 2, 4], so original index 4 ("Ave") is
        // content index 2, not 4.
        let ts = tokenize("781 Franklin Ave");
        let content_positions: Vec<usize> = ts.content_tokens().map(|(i, _)| i).collect();
        assert_eq!(content_positions, vec![0, 2, 4]);

        let phrase = Phrase {
            start_token: 4,
            length_tokens: 1,
            value: "Ave".to_string(),
            expansions: vec![AddressExpansion {
                canonical: "Avenue".to_string(),
                language: "en".to_string(),
                components: ComponentMask::all(),
                dictionary: DictionaryType::StreetType,
                separable: true,
            }],
        };

        let translated = translate_phrases_to_content_space(&[phrase], &content_positions);
        assert_eq!(translated.len(), 1);
        assert_eq!(translated[0].start_token, 2);

        // Covers the content-space "Ave" token (index 2), not the
        // original-space index (4), which is now out of range for `content`.
        assert!(phrase_covering(&translated, 2).is_some());
        assert!(phrase_covering(&translated, 0).is_none());
    }

    #[test]
    fn merges_contiguous_same_label_tokens() {
        let ts = tokenize("781 Franklin Ave");
        let tokens: Vec<_> = ts.content_tokens().map(|(_, t)| t.clone()).collect();
        let labels = vec![0u32, 1, 1];
        let names = vec!["house_number".to_string(), "road".to_string()];
        let merged = merge_labels(&tokens, &labels, &names);
        assert_eq!(
            merged,
            vec![
                Component {
                    label: "house_number".to_string(),
                    text: "781".to_string(),
                },
                Component {
                    label: "road".to_string(),
                    text: "franklin ave".to_string(),
                },
            ]
        );
    }

    #[test]
    fn try_parse_reports_model_not_ready_when_no_labels() {
        use crate::csr::CsrMatrix;
        use crate::dat::DoubleArrayTrie;
        use crate::dense::DenseMatrix;

        let empty_trie = DoubleArrayTrie::from_parts([0u32; 256], Vec::new(), Vec::new(), Vec::new());
        let model = CrfModel {
            labels: Vec::new(),
            state_features: empty_trie_clone(&empty_trie),
            state_trans_features: empty_trie_clone(&empty_trie),
            weights: CsrMatrix::from_parts(0, 0, vec![0], vec![], vec![]).unwrap(),
            state_trans_weights: CsrMatrix::from_parts(0, 0, vec![0], vec![], vec![]).unwrap(),
            transitions: DenseMatrix::zeros(0, 0),
        };
        let dict = Dictionary::new();
        let mut ctx = CrfContext::new(0);
        let result = try_parse(&model, &dict, &mut ctx, "123 Main St", &ParserOptions::default());
        assert_eq!(result.unwrap_err(), ParseError::ModelNotReady);

        fn empty_trie_clone(t: &DoubleArrayTrie) -> DoubleArrayTrie {
            t.clone()
        }
    }

    #[test]
    fn empty_input_yields_empty_list_without_touching_model() {
        use crate::csr::CsrMatrix;
        use crate::dat::DoubleArrayTrie;
        use crate::dense::DenseMatrix;

        let model = CrfModel {
            labels: vec!["road".to_string()],
            state_features: DoubleArrayTrie::from_parts([0u32; 256], Vec::new(), Vec::new(), Vec::new()),
            state_trans_features: DoubleArrayTrie::from_parts([0u32; 256], Vec::new(), Vec::new(), Vec::new()),
            weights: CsrMatrix::from_parts(0, 1, vec![0], vec![], vec![]).unwrap(),
            state_trans_weights: CsrMatrix::from_parts(0, 1, vec![0], vec![], vec![]).unwrap(),
            transitions: DenseMatrix::zeros(1, 1),
        };
        let dict = Dictionary::new();
        let mut ctx = CrfContext::new(1);
        let result = parse(&model, &dict, &mut ctx, "", &ParserOptions::default());
        assert!(result.is_empty());
    }
}
