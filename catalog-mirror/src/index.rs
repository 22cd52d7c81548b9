//! Reference index over tri-lingual records
//!
//! The pair index answers "which vehicle is this row about?" from any brand spelling
//! combined with any model spelling. The per-language union patterns answer "does this
//! keyword mention any known model?" in a single scan.

use fancy_regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::confusable::ConfusablePatternCompiler;
use crate::error::MirrorResult;
use crate::record::{Language, ReferenceCollection, TriRecord};
use crate::resolver::base_token;

/// Trim, collapse internal whitespace and lower-case
pub fn normalize_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Union patterns for one language
#[derive(Debug, Default)]
struct LanguagePatterns {
    full: Option<Regex>,
    base: Option<Regex>,
}

#[derive(Debug)]
pub struct ReferenceIndex {
    pairs: HashMap<(String, String), Arc<TriRecord>>,
    // Indexed in Language::ALL order
    patterns: [LanguagePatterns; 3],
}

fn slot(language: Language) -> usize {
    match language {
        Language::Ua => 0,
        Language::Ru => 1,
        Language::En => 2,
    }
}

impl ReferenceIndex {
    /// Build the pair index and union patterns from a collection
    ///
    /// Each record contributes the nine brand-language × model-language combinations.
    /// When two different records produce the same key the later one wins.
    pub fn build(
        records: &ReferenceCollection,
        compiler: &ConfusablePatternCompiler,
    ) -> MirrorResult<Self> {
        let mut pairs: HashMap<(String, String), Arc<TriRecord>> = HashMap::new();
        let mut models: [Vec<String>; 3] = Default::default();
        let mut bases: [Vec<String>; 3] = Default::default();

        for record in records.iter() {
            if !record.is_valid() {
                debug!(record = %record, "Skipping incomplete reference record");
                continue;
            }
            for brand_language in Language::ALL {
                let brand = normalize_key(record.brand(brand_language));
                for model_language in Language::ALL {
                    let key = (brand.clone(), normalize_key(record.model(model_language)));
                    if let Some(previous) = pairs.insert(key, Arc::clone(record)) {
                        if previous.as_ref() != record.as_ref() {
                            debug!(
                                previous = %previous,
                                current = %record,
                                "Reference pair key collision, keeping the later record"
                            );
                        }
                    }
                }
            }
            for language in Language::ALL {
                let model = record.model(language);
                models[slot(language)].push(model.to_string());
                if let Some(base) = base_token(model) {
                    bases[slot(language)].push(base);
                }
            }
        }

        let mut patterns: [LanguagePatterns; 3] = Default::default();
        for language in Language::ALL {
            let i = slot(language);
            patterns[i] = LanguagePatterns {
                full: compiler.union_pattern(&models[i])?,
                base: compiler.union_pattern(&bases[i])?,
            };
        }

        debug!(
            records = records.len(),
            pair_keys = pairs.len(),
            "Built reference index"
        );

        Ok(ReferenceIndex { pairs, patterns })
    }

    /// Find the record a row's brand/model pair belongs to
    pub fn lookup(&self, brand: &str, model: &str) -> Option<&TriRecord> {
        self.pairs
            .get(&(normalize_key(brand), normalize_key(model)))
            .map(|record| record.as_ref())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Union pattern over every full model spelling in `language`
    pub fn model_pattern(&self, language: Language) -> Option<&Regex> {
        self.patterns[slot(language)].full.as_ref()
    }

    /// Union pattern over every model base token in `language`
    pub fn base_pattern(&self, language: Language) -> Option<&Regex> {
        self.patterns[slot(language)].base.as_ref()
    }
}
