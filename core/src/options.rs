//! `ParserOptions` and `ExpansionOptions`: plain, serde + toml serializable
//! option structs passed at call sites (§6, SPEC_FULL §10.3). Neither reads
//! the environment; only model-directory discovery (§6) does that.

use serde::{Deserialize, Serialize};

use crate::component::ComponentMask;
use crate::normalize::{StringNormalizeFlags, TokenNormalizeFlags};

/// Options accepted by `Model::parse`/`Model::try_parse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserOptions {
    /// BCP-47 language hint; does not change tokenization, only which
    /// dictionary entries the loader prefers when expansions collide.
    pub language: Option<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { language: None }
    }
}

impl ParserOptions {
    /// Load options from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save options to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load options from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize options to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Options accepted by `Model::expand`/`Model::try_expand` (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionOptions {
    pub languages: Vec<String>,
    pub address_components: ComponentMask,
    pub latin_ascii: bool,
    pub transliterate: bool,
    pub strip_accents: bool,
    pub decompose: bool,
    pub lowercase: bool,
    pub trim_string: bool,
    pub drop_parentheticals: bool,
    pub replace_numeric_hyphens: bool,
    pub delete_numeric_hyphens: bool,
    pub split_alpha_from_numeric: bool,
    pub replace_word_hyphens: bool,
    pub delete_word_hyphens: bool,
    pub delete_final_periods: bool,
    pub delete_acronym_periods: bool,
    pub drop_english_possessives: bool,
    pub delete_apostrophes: bool,
    pub expand_numex: bool,
    pub roman_numerals: bool,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            address_components: ComponentMask::none(),
            latin_ascii: false,
            transliterate: false,
            strip_accents: false,
            decompose: false,
            lowercase: true,
            trim_string: true,
            drop_parentheticals: false,
            replace_numeric_hyphens: false,
            delete_numeric_hyphens: false,
            split_alpha_from_numeric: false,
            replace_word_hyphens: false,
            delete_word_hyphens: false,
            delete_final_periods: true,
            delete_acronym_periods: false,
            drop_english_possessives: false,
            delete_apostrophes: false,
            expand_numex: false,
            roman_numerals: false,
        }
    }
}

impl ExpansionOptions {
    /// Load options from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save options to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load options from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize options to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Project onto the string-level normalizer flags used before phrase
    /// search.
    pub fn string_flags(&self) -> StringNormalizeFlags {
        StringNormalizeFlags {
            lowercase: self.lowercase,
            trim: self.trim_string,
            strip_accents: self.strip_accents,
            decompose: self.decompose,
            compose: false,
            replace_hyphens: self.replace_word_hyphens,
        }
    }

    /// Project onto the token-level normalizer flags used for literal slots.
    pub fn token_flags(&self) -> TokenNormalizeFlags {
        TokenNormalizeFlags {
            delete_hyphens: self.delete_word_hyphens,
            delete_final_period: self.delete_final_periods,
            delete_acronym_periods: self.delete_acronym_periods,
            delete_possessive: self.drop_english_possessives,
            delete_apostrophe: self.delete_apostrophes,
            split_alpha_numeric: self.split_alpha_from_numeric,
            replace_digits: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_6() {
        let opts = ExpansionOptions::default();
        assert!(opts.lowercase);
        assert!(opts.trim_string);
        assert!(opts.delete_final_periods);
        assert!(!opts.expand_numex);
    }

    #[test]
    fn toml_round_trip() {
        let opts = ExpansionOptions::default();
        let text = toml::to_string(&opts).unwrap();
        let back: ExpansionOptions = toml::from_str(&text).unwrap();
        assert_eq!(opts, back);
    }

    #[test]
    fn to_toml_string_then_from_toml_str_round_trips() {
        let mut opts = ExpansionOptions::default();
        opts.languages = vec!["en".to_string()];
        let text = opts.to_toml_string().unwrap();
        let back = ExpansionOptions::from_toml_str(&text).unwrap();
        assert_eq!(opts, back);
    }

    #[test]
    fn save_toml_then_load_toml_round_trips() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!(
            "address_parser_expansion_options_test_{:?}.toml",
            std::thread::current().id()
        ));
        let opts = ExpansionOptions::default();
        opts.save_toml(&path).unwrap();
        let loaded = ExpansionOptions::load_toml(&path).unwrap();
        assert_eq!(opts, loaded);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn parser_options_toml_round_trip() {
        let opts = ParserOptions {
            language: Some("es".to_string()),
        };
        let text = opts.to_toml_string().unwrap();
        let back = ParserOptions::from_toml_str(&text).unwrap();
        assert_eq!(opts, back);
    }
}
