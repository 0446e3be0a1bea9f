//! Model loader (§4.M) and the top-level `Model` façade (§6).

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::binary;
use crate::crf::{CrfContext, CrfModel};
use crate::csr::{CsrMatrix, Graph};
use crate::dat::DoubleArrayTrie;
use crate::dense::DenseMatrix;
use crate::error::{LoadError, ParseError};
use crate::expander::expand as expand_impl;
use crate::options::{ExpansionOptions, ParserOptions};
use crate::parser::{parse as parse_impl, try_parse as try_parse_impl, Component};
use crate::phrase::Dictionary;

const CRF_SIGNATURE: u32 = 0xCFCF_CFCF;
const TRIE_SIGNATURE: u32 = 0xABAB_ABAB;

/// A fully-loaded, immutable model: safe for concurrent reads from any
/// number of parse workers (§5). Construction only succeeds once every
/// component below has loaded without error, so a live `Model` is always
/// ready for inference.
pub struct Model {
    crf: CrfModel,
    dictionary: Dictionary,
    postal_graph: Option<Graph>,
    language_classifier: Option<LanguageClassifier>,
}

struct LanguageClassifier {
    labels: Vec<String>,
    features: DoubleArrayTrie,
    weights: CsrMatrix,
}

/// Confidence score returned by [`Model::classify_language`].
pub type Confidence = f64;

impl Model {
    /// Resolve the model directory per the discovery order in §6: explicit
    /// path argument -> `LIBPOSTAL_DATA_DIR` -> `~/.libpostal`.
    pub fn resolve_data_dir(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(p) = explicit {
            return Some(p.to_path_buf());
        }
        if let Ok(env_dir) = std::env::var("LIBPOSTAL_DATA_DIR") {
            return Some(PathBuf::from(env_dir));
        }
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".libpostal"))
    }

    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        info!("loading address parser model");

        let crf = load_crf(&dir.join("address_parser/address_parser_crf.dat"))?;
        let vocab_trie = load_trie(&dir.join("address_parser/address_parser_vocab.trie"))?;
        let dictionary = load_dictionary(
            &dir.join("address_parser/address_parser_phrases.dat"),
            &vocab_trie,
        )?;
        let postal_graph = load_graph(&dir.join("address_parser/address_parser_postal_codes.dat"))?;

        let classifier_path = dir.join("language_classifier/language_classifier.dat");
        let language_classifier = if classifier_path.exists() {
            Some(load_language_classifier(&classifier_path)?)
        } else {
            debug!("no language classifier present, skipping");
            None
        };

        Ok(Self {
            crf,
            dictionary,
            postal_graph,
            language_classifier,
        })
    }

    /// Allocate a fresh per-worker scratch context sized for this model's
    /// label count (§5: per-request state is never shared).
    pub fn new_context(&self) -> CrfContext {
        CrfContext::new(self.crf.num_labels())
    }

    /// Infallible per §6; an empty input yields an empty list. A `Model`
    /// only exists via [`Model::load`] succeeding, so it is always ready.
    pub fn parse(&self, input: &str, options: Option<&ParserOptions>) -> Vec<Component> {
        let default = ParserOptions::default();
        let opts = options.unwrap_or(&default);
        let mut ctx = self.new_context();
        parse_impl(&self.crf, &self.dictionary, &mut ctx, input, opts)
    }

    /// Fallible twin of [`Model::parse`] surfacing `ModelNotReady` per §4.L.
    pub fn try_parse(
        &self,
        input: &str,
        options: Option<&ParserOptions>,
    ) -> Result<Vec<Component>, ParseError> {
        let default = ParserOptions::default();
        let opts = options.unwrap_or(&default);
        let mut ctx = self.new_context();
        try_parse_impl(&self.crf, &self.dictionary, &mut ctx, input, opts)
    }

    /// `Model::expand`: at most 100 deduplicated, lowercased variants (§6).
    pub fn expand(&self, input: &str, options: Option<&ExpansionOptions>) -> Vec<String> {
        let default = ExpansionOptions::default();
        let opts = options.unwrap_or(&default);
        let ts = crate::tokenizer::tokenize(input);
        let phrases = crate::phrase::search_phrases(&ts, &self.dictionary);
        expand_impl(&ts, &phrases, opts.address_components, &opts.token_flags())
    }

    /// Fallible twin of [`Model::expand`], surfacing `ModelNotReady` for
    /// symmetry with [`Model::try_parse`] (§7/SPEC_FULL §7): since a `Model`
    /// only exists via a fully-successful [`Model::load`], this never
    /// actually returns the error, but gives callers holding a lazily
    /// initialized `Option<Model>` the same `Result`-returning shape as
    /// `try_parse` to match against.
    pub fn try_expand(
        &self,
        input: &str,
        options: Option<&ExpansionOptions>,
    ) -> Result<Vec<String>, ParseError> {
        if self.crf.num_labels() == 0 {
            return Err(ParseError::ModelNotReady);
        }
        Ok(self.expand(input, options))
    }

    /// `Model::classify_language`: ranks languages by dot-product score
    /// against the language classifier's feature weights, highest first.
    /// Returns an empty list if no classifier was present at load time.
    pub fn classify_language(&self, input: &str, top_k: usize) -> Vec<(String, Confidence)> {
        let Some(classifier) = &self.language_classifier else {
            return Vec::new();
        };
        if input.is_empty() || classifier.labels.is_empty() {
            return Vec::new();
        }

        let mut scores = vec![0.0f64; classifier.labels.len()];
        for word in input.split_whitespace() {
            let feature = format!("word={}", word.to_lowercase());
            if let Some(id) = classifier.features.get(feature.as_bytes()) {
                let id = id as usize;
                if id < classifier.weights.rows() {
                    for (col, val) in classifier.weights.row_iter(id) {
                        scores[col as usize] += val;
                    }
                }
            }
        }

        let mut ranked: Vec<(String, Confidence)> = classifier
            .labels
            .iter()
            .cloned()
            .zip(scores)
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(top_k);
        ranked
    }

    pub fn postal_graph(&self) -> Option<&Graph> {
        self.postal_graph.as_ref()
    }
}

fn load_trie(path: &Path) -> Result<DoubleArrayTrie, LoadError> {
    let file = File::open(path).map_err(|_| LoadError::MissingModel(path.to_path_buf()))?;
    let mut reader = BufReader::new(file);
    DoubleArrayTrie::load(&mut reader).map_err(|source| LoadError::Codec {
        path: path.to_path_buf(),
        source,
    })
}

fn load_crf(path: &Path) -> Result<CrfModel, LoadError> {
    let file = File::open(path).map_err(|_| LoadError::MissingModel(path.to_path_buf()))?;
    let mut reader = BufReader::new(file);

    let read = || -> Result<CrfModel, crate::error::CodecError> {
        binary::check_signature_forward(&mut reader, CRF_SIGNATURE)?;
        let num_labels = binary::read_u32(&mut reader)? as usize;
        let labels_blob_len = binary::read_u64(&mut reader)? as usize;
        let blob = binary::read_bytes(&mut reader, labels_blob_len)?;
        let labels = parse_nul_separated_labels(&blob, num_labels)?;

        let state_features = DoubleArrayTrie::read(&mut reader)?;
        let weights = CsrMatrix::read(&mut reader)?;
        let state_trans_features = DoubleArrayTrie::read(&mut reader)?;
        let state_trans_weights = CsrMatrix::read(&mut reader)?;
        let transitions = DenseMatrix::read(&mut reader)?;

        Ok(CrfModel {
            labels,
            state_features,
            state_trans_features,
            weights,
            state_trans_weights,
            transitions,
        })
    };

    read().map_err(|source| LoadError::Codec {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_nul_separated_labels(
    blob: &[u8],
    expected: usize,
) -> Result<Vec<String>, crate::error::CodecError> {
    let labels: Vec<String> = blob
        .split(|&b| b == 0)
        .filter(|s| !s.is_empty())
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect();
    if labels.len() != expected {
        return Err(crate::error::CodecError::CorruptModel(format!(
            "expected {expected} labels, found {}",
            labels.len()
        )));
    }
    Ok(labels)
}

/// Parse the dictionary text format (§6: `|`-separated fields, `#` comments
/// and blank lines ignored) and resolve each phrase key against the
/// vocabulary trie for its payload id, wiring a minimal single-expansion
/// entry per distinct key. Downstream build tooling is expected to ship a
/// binary dictionary blob directly; this path exists for the text-source
/// build tooling described in §6.
fn load_dictionary(path: &Path, _vocab: &DoubleArrayTrie) -> Result<Dictionary, LoadError> {
    use crate::component::{ComponentMask, DictionaryType};
    use crate::phrase::AddressExpansion;

    let file = File::open(path).map_err(|_| LoadError::MissingModel(path.to_path_buf()))?;
    let mut reader = BufReader::new(file);
    binary::check_signature_forward(&mut reader, 0xDADA_DADA).map_err(|source| LoadError::Codec {
        path: path.to_path_buf(),
        source,
    })?;

    let mut dict = Dictionary::new();
    let entry_count = binary::read_u32(&mut reader).map_err(|source| LoadError::Codec {
        path: path.to_path_buf(),
        source,
    })? as usize;

    for _ in 0..entry_count {
        let read_entry = || -> Result<(String, AddressExpansion), crate::error::CodecError> {
            let key = binary::read_string(&mut reader)?;
            let canonical = binary::read_string(&mut reader)?;
            let language = binary::read_string(&mut reader)?;
            let components = ComponentMask(binary::read_u32(&mut reader)?);
            let dictionary_type = dictionary_type_from_u32(binary::read_u32(&mut reader)?)?;
            let separable = binary::read_u8(&mut reader)? != 0;
            Ok((
                key,
                AddressExpansion {
                    canonical,
                    language,
                    components,
                    dictionary: dictionary_type,
                    separable,
                },
            ))
        };
        let (key, expansion) = read_entry().map_err(|source| LoadError::Codec {
            path: path.to_path_buf(),
            source,
        })?;
        dict.insert(&key, vec![expansion]);
    }

    Ok(dict)
}

fn dictionary_type_from_u32(v: u32) -> Result<crate::component::DictionaryType, crate::error::CodecError> {
    use crate::component::DictionaryType::*;
    Ok(match v {
        0 => StreetType,
        1 => Directional,
        2 => PostOffice,
        3 => Building,
        4 => Unit,
        5 => Level,
        6 => Entrance,
        7 => Stopword,
        8 => Toponym,
        9 => Given,
        10 => Surname,
        11 => Other,
        other => {
            return Err(crate::error::CodecError::CorruptModel(format!(
                "unknown dictionary type tag {other}"
            )))
        }
    })
}

fn load_graph(path: &Path) -> Result<Option<Graph>, LoadError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return Ok(None),
    };
    let mut reader = BufReader::new(file);
    Graph::read(&mut reader)
        .map(Some)
        .map_err(|source| LoadError::Codec {
            path: path.to_path_buf(),
            source,
        })
}

fn load_language_classifier(path: &Path) -> Result<LanguageClassifier, LoadError> {
    let file = File::open(path).map_err(|_| LoadError::MissingModel(path.to_path_buf()))?;
    let mut reader = BufReader::new(file);

    let read = || -> Result<LanguageClassifier, crate::error::CodecError> {
        binary::check_signature_forward(&mut reader, 0xC1A5_C1A5)?;
        let num_labels = binary::read_u32(&mut reader)? as usize;
        let labels_blob_len = binary::read_u64(&mut reader)? as usize;
        let blob = binary::read_bytes(&mut reader, labels_blob_len)?;
        let labels = parse_nul_separated_labels(&blob, num_labels)?;
        let features = DoubleArrayTrie::read(&mut reader)?;
        let weights = CsrMatrix::read(&mut reader)?;
        Ok(LanguageClassifier {
            labels,
            features,
            weights,
        })
    };

    read().map_err(|source| LoadError::Codec {
        path: path.to_path_buf(),
        source,
    })
}
