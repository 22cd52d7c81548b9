//! Brand/model rewriting inside free text
//!
//! Both operations are idempotent: feeding their output back in with the destination as
//! the new source leaves it unchanged. Text outside the matched span is never touched.

use crate::confusable::{ConfusablePatternCompiler, PairOrder};
use crate::config::KeywordPolicy;
use crate::error::MirrorResult;
use crate::index::ReferenceIndex;
use crate::keywords;
use crate::record::{Language, TriRecord};

#[derive(Debug, Default)]
pub struct TextSubstitutionEngine {
    compiler: ConfusablePatternCompiler,
    policy: KeywordPolicy,
}

impl TextSubstitutionEngine {
    pub fn new(policy: KeywordPolicy) -> Self {
        TextSubstitutionEngine {
            compiler: ConfusablePatternCompiler::new(),
            policy,
        }
    }

    /// The compiler whose cache backs every pattern this engine uses
    pub fn compiler(&self) -> &ConfusablePatternCompiler {
        &self.compiler
    }

    /// Rewrite the first mention of `source`'s brand+model pair
    ///
    /// Languages are scanned in [`Language::ALL`] order and brand-then-model is tried
    /// before model-then-brand; the first hit is replaced and scanning stops. The new
    /// spelling comes from `destination` in `target_language`, or from `source` itself
    /// when there is no destination, which only normalizes the script. The separator found
    /// in the text is kept, falling back to a single space when the words were glued.
    ///
    /// # Arguments
    /// * `text` - Free text to rewrite
    /// * `source` - Vehicle currently mentioned in the text
    /// * `destination` - Vehicle to mention instead, `None` to keep `source`
    /// * `target_language` - Language of the column, which picks the new spelling
    /// * `force_brand_first` - Write model-then-brand mentions as brand-then-model
    ///
    /// # Errors
    /// `MirrorError::Pattern` when a pattern fails to compile or match
    pub fn substitute_pair(
        &self,
        text: &str,
        source: &TriRecord,
        destination: Option<&TriRecord>,
        target_language: Language,
        force_brand_first: bool,
    ) -> MirrorResult<String> {
        if text.is_empty() {
            return Ok(String::new());
        }

        for language in Language::ALL {
            let Some(pattern) = self
                .compiler
                .pair_patterns(source.brand(language), source.model(language))?
            else {
                continue;
            };
            let Some(found) = pattern.find(text)? else {
                continue;
            };

            let target = destination.unwrap_or(source).get(target_language);
            let separator = if found.separator.is_empty() {
                " "
            } else {
                found.separator.as_str()
            };
            let replacement = if found.order == PairOrder::ModelFirst && !force_brand_first {
                format!("{}{}{}", target.model, separator, target.brand)
            } else {
                format!("{}{}{}", target.brand, separator, target.model)
            };

            let mut result = String::with_capacity(text.len() + replacement.len());
            result.push_str(&text[..found.start]);
            result.push_str(&replacement);
            result.push_str(&text[found.end..]);
            return Ok(result);
        }

        Ok(text.to_string())
    }

    /// Normalize a comma-separated keyword cell towards `destination`
    ///
    /// See [`keywords::normalize`] for the item-level rules.
    pub fn normalize_keywords(
        &self,
        text: &str,
        index: &ReferenceIndex,
        destination: &TriRecord,
        target_script: Language,
        strict_full: bool,
    ) -> MirrorResult<String> {
        keywords::normalize(
            text,
            index,
            destination,
            target_script,
            strict_full,
            &self.policy,
        )
    }
}
