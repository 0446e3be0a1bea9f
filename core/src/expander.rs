//! Expander (§4.I): builds the slot sequence for a tokenized string and its
//! matched phrases, then enumerates the Cartesian product of alternatives.

use crate::component::ComponentMask;
use crate::normalize::{normalize_token_text, TokenNormalizeFlags};
use crate::phrase::Phrase;
use crate::token::TokenizedString;

/// Hard cap on the number of distinct expansion variants returned (§4.I).
pub const EXPANSION_CAP: usize = 100;

enum Slot {
    Literal(String),
    Phrase { alternatives: Vec<String> },
}

/// Build the slot sequence for `ts`, given its phrase matches and the
/// requested component filter. Literal tokens are normalized with
/// `token_flags`; phrase alternatives whose `components` mask is disjoint
/// from `filter` are dropped, but the phrase's surface form is always kept
/// as the first alternative.
fn build_slots(
    ts: &TokenizedString,
    phrases: &[Phrase],
    filter: ComponentMask,
    token_flags: &TokenNormalizeFlags,
) -> Vec<Slot> {
    let tokens = ts.tokens();
    let mut slots = Vec::new();
    let mut i = 0usize;

    while i < tokens.len() {
        if tokens[i].kind.is_skippable_for_parsing() {
            i += 1;
            continue;
        }

        if let Some(phrase) = phrases
            .iter()
            .find(|p| p.start_token as usize == i)
        {
            let mut alternatives = vec![phrase.value.to_lowercase()];
            for exp in &phrase.expansions {
                if filter.is_empty() || filter.intersects(exp.components) {
                    let canonical = exp.canonical.to_lowercase();
                    if !alternatives.contains(&canonical) {
                        alternatives.push(canonical);
                    }
                }
            }
            slots.push(Slot::Phrase { alternatives });
            i = phrase.end_token_exclusive() as usize;
            continue;
        }

        let normalized = normalize_token_text(&tokens[i].text, token_flags).to_lowercase();
        slots.push(Slot::Literal(normalized));
        i += 1;
    }

    slots
}

/// Generate the deduplicated Cartesian product of slot alternatives, capped
/// at [`EXPANSION_CAP`] distinct variants in insertion order (§4.I, §9 open
/// question: cap order is first-appearance insertion order).
pub fn expand(
    ts: &TokenizedString,
    phrases: &[Phrase],
    filter: ComponentMask,
    token_flags: &TokenNormalizeFlags,
) -> Vec<String> {
    if ts.is_empty() {
        return Vec::new();
    }

    let slots = build_slots(ts, phrases, filter, token_flags);
    if slots.is_empty() {
        return Vec::new();
    }

    let mut partials: Vec<String> = vec![String::new()];
    for slot in &slots {
        let alts: &[String] = match slot {
            Slot::Literal(s) => std::slice::from_ref(s),
            Slot::Phrase { alternatives } => alternatives.as_slice(),
        };

        let mut next = Vec::with_capacity(partials.len() * alts.len());
        'outer: for p in &partials {
            for a in alts {
                let joined = if p.is_empty() {
                    a.clone()
                } else {
                    format!("{p} {a}")
                };
                next.push(joined);
                if next.len() >= EXPANSION_CAP {
                    break 'outer;
                }
            }
        }
        partials = next;
        if partials.len() >= EXPANSION_CAP {
            break;
        }
    }

    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for p in partials {
        if seen.insert(p.clone()) {
            out.push(p);
            if out.len() >= EXPANSION_CAP {
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::DictionaryType;
    use crate::phrase::{AddressExpansion, Dictionary};
    use crate::tokenizer::tokenize;

    fn expansion(canonical: &str) -> AddressExpansion {
        AddressExpansion {
            canonical: canonical.to_string(),
            language: "en".to_string(),
            components: ComponentMask::all(),
            dictionary: DictionaryType::StreetType,
            separable: true,
        }
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let ts = tokenize("");
        let out = expand(&ts, &[], ComponentMask::all(), &TokenNormalizeFlags::default());
        assert!(out.is_empty());
    }

    #[test]
    fn phrase_alternatives_cartesian_product_is_deduplicated_and_lowercase() {
        let mut dict = Dictionary::new();
        dict.insert("n", vec![expansion("north")]);
        dict.insert("st", vec![expansion("street")]);

        let ts = tokenize("N Main St");
        let phrases = crate::phrase::search_phrases(&ts, &dict);
        let out = expand(&ts, &phrases, ComponentMask::all(), &TokenNormalizeFlags::default());

        assert!(out.contains(&"north main street".to_string()));
        assert!(out.contains(&"n main street".to_string()));
        assert!(out.contains(&"north main st".to_string()));
        assert!(out.contains(&"n main st".to_string()));
        assert!(out.iter().all(|s| s == &s.to_lowercase()));
        let unique: std::collections::HashSet<_> = out.iter().collect();
        assert_eq!(unique.len(), out.len());
    }

    #[test]
    fn result_never_exceeds_cap() {
        let mut dict = Dictionary::new();
        // Eight slots with 3 alternatives each would be 3^8 = 6561 without a cap.
        for w in ["a", "b", "c", "d", "e", "f", "g", "h"] {
            dict.insert(w, vec![expansion(&format!("{w}-x")), expansion(&format!("{w}-y"))]);
        }
        let ts = tokenize("a b c d e f g h");
        let phrases = crate::phrase::search_phrases(&ts, &dict);
        let out = expand(&ts, &phrases, ComponentMask::all(), &TokenNormalizeFlags::default());
        assert!(out.len() <= EXPANSION_CAP);
    }

    #[test]
    fn component_filter_drops_expansions_outside_mask() {
        let mut dict = Dictionary::new();
        dict.insert(
            "st",
            vec![AddressExpansion {
                canonical: "street".to_string(),
                language: "en".to_string(),
                components: ComponentMask::single(crate::component::AddressComponent::Road),
                dictionary: DictionaryType::StreetType,
                separable: true,
            }],
        );
        let ts = tokenize("Main St");
        let phrases = crate::phrase::search_phrases(&ts, &dict);
        let filter = ComponentMask::single(crate::component::AddressComponent::City);
        let out = expand(&ts, &phrases, filter, &TokenNormalizeFlags::default());
        assert!(!out.iter().any(|s| s.contains("street")));
        assert!(out.iter().any(|s| s.contains("st")));
    }
}
