//! Tri-lingual vehicle records
//!
//! A [`TriRecord`] holds one vehicle identity spelled in Ukrainian, Russian and English.
//! Records are built once from reference data and shared read-only for the rest of a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The three scripts a catalog carries brand/model names in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Ukrainian, Cyrillic script
    Ua,
    /// Russian, Cyrillic script
    Ru,
    /// English, Latin script
    En,
}

impl Language {
    /// Scan priority used by every matcher: Ukrainian, then Russian, then English.
    pub const ALL: [Language; 3] = [Language::Ua, Language::Ru, Language::En];

    pub fn code(self) -> &'static str {
        match self {
            Language::Ua => "ua",
            Language::Ru => "ru",
            Language::En => "en",
        }
    }

    pub fn is_cyrillic(self) -> bool {
        matches!(self, Language::Ua | Language::Ru)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A brand and model spelled in one language
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrandModel {
    pub brand: String,
    pub model: String,
}

impl BrandModel {
    pub fn new(brand: impl Into<String>, model: impl Into<String>) -> Self {
        BrandModel {
            brand: brand.into(),
            model: model.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.brand.trim().is_empty() && !self.model.trim().is_empty()
    }

    /// Case-insensitive comparison against another spelling, ignoring surrounding whitespace
    pub fn same_pair(&self, brand: &str, model: &str) -> bool {
        self.brand.trim().to_lowercase() == brand.trim().to_lowercase()
            && self.model.trim().to_lowercase() == model.trim().to_lowercase()
    }
}

/// One vehicle identity with brand/model spellings in all three languages
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriRecord {
    pub ua: BrandModel,
    pub ru: BrandModel,
    pub en: BrandModel,
}

impl TriRecord {
    pub fn new(ua: BrandModel, ru: BrandModel, en: BrandModel) -> Self {
        TriRecord { ua, ru, en }
    }

    pub fn get(&self, language: Language) -> &BrandModel {
        match language {
            Language::Ua => &self.ua,
            Language::Ru => &self.ru,
            Language::En => &self.en,
        }
    }

    pub fn brand(&self, language: Language) -> &str {
        &self.get(language).brand
    }

    pub fn model(&self, language: Language) -> &str {
        &self.get(language).model
    }

    /// A record is indexable only when every language supplies both a brand and a model
    pub fn is_valid(&self) -> bool {
        Language::ALL
            .iter()
            .all(|&language| self.get(language).is_complete())
    }

    /// Lower-cased brand spellings across all languages
    pub fn brands_lower(&self) -> [String; 3] {
        Language::ALL.map(|language| self.brand(language).trim().to_lowercase())
    }

    /// True when any language's spelling equals the given brand/model pair
    pub fn matches_pair(&self, brand: &str, model: &str) -> bool {
        Language::ALL
            .iter()
            .any(|&language| self.get(language).same_pair(brand, model))
    }
}

impl fmt::Display for TriRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.en.brand, self.en.model)
    }
}

/// Ordered collection of reference records
///
/// Duplicates are allowed; they simply contribute more index entries.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCollection {
    records: Vec<Arc<TriRecord>>,
}

impl ReferenceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TriRecord) -> &mut Self {
        self.records.push(Arc::new(record));
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TriRecord>> {
        self.records.iter()
    }
}

impl FromIterator<TriRecord> for ReferenceCollection {
    fn from_iter<I: IntoIterator<Item = TriRecord>>(iter: I) -> Self {
        ReferenceCollection {
            records: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl From<Vec<TriRecord>> for ReferenceCollection {
    fn from(records: Vec<TriRecord>) -> Self {
        records.into_iter().collect()
    }
}
