//! Model name resolution
//!
//! Turns one entry of a free-form compatibility list ("Golf", "a3", "Golf VII") into a
//! reference record. Exact full-string matches are preferred; the base-token fallback
//! recovers from series suffixes at the cost of precision and is opt-in per call.

use std::collections::HashMap;
use std::sync::Arc;

use crate::index::normalize_key;
use crate::record::{Language, ReferenceCollection, TriRecord};

fn is_model_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '.' | '-' | '_' | '/')
}

fn first_token(model: &str) -> Option<&str> {
    model
        .split(is_model_separator)
        .find(|token| !token.is_empty())
}

/// First separator-delimited token of a model name, lower-cased
///
/// Single-letter tokens without a digit carry no meaning on their own and yield `None`.
pub fn base_token(model: &str) -> Option<String> {
    let token = first_token(model)?;
    if token.chars().count() < 2 && !token.chars().any(|ch| ch.is_numeric()) {
        return None;
    }
    Some(token.to_lowercase())
}

#[derive(Debug)]
struct Candidate {
    record: Arc<TriRecord>,
    brands: [String; 3],
}

#[derive(Debug, Default)]
pub struct ModelResolver {
    full: HashMap<String, Vec<Candidate>>,
    base: HashMap<String, Vec<Candidate>>,
}

impl ModelResolver {
    pub fn build(records: &ReferenceCollection) -> Self {
        let mut resolver = ModelResolver::default();
        for record in records.iter() {
            if !record.is_valid() {
                continue;
            }
            let brands = record.brands_lower();
            for language in Language::ALL {
                let model = record.model(language);
                resolver
                    .full
                    .entry(normalize_key(model))
                    .or_default()
                    .push(Candidate {
                        record: Arc::clone(record),
                        brands: brands.clone(),
                    });
                if let Some(base) = base_token(model) {
                    resolver.base.entry(base).or_default().push(Candidate {
                        record: Arc::clone(record),
                        brands: brands.clone(),
                    });
                }
            }
        }
        resolver
    }

    /// Resolve a model string to a record
    ///
    /// With `prefer_brand` the first candidate carrying that brand (in any language) wins,
    /// otherwise the first candidate in insertion order. Without `allow_base_fallback`
    /// only exact full-string matches are returned.
    ///
    /// # Arguments
    /// * `query` - Model string as written, e.g. `"Golf VII"`; whitespace and case are ignored
    /// * `prefer_brand` - Brand used to break ties between models with the same name
    /// * `allow_base_fallback` - Retry with the query's first token when no full name matches
    ///
    /// # Returns
    /// The matching record, or `None` when nothing resolves
    pub fn resolve(
        &self,
        query: &str,
        prefer_brand: Option<&str>,
        allow_base_fallback: bool,
    ) -> Option<&TriRecord> {
        let key = normalize_key(query);
        if let Some(record) = self.full.get(&key).and_then(|c| pick(c, prefer_brand)) {
            return Some(record);
        }
        if !allow_base_fallback {
            return None;
        }
        let base = first_token(&key)?;
        self.base.get(base).and_then(|c| pick(c, prefer_brand))
    }
}

fn pick<'a>(candidates: &'a [Candidate], prefer_brand: Option<&str>) -> Option<&'a TriRecord> {
    let first = candidates.first()?;
    let preferred = prefer_brand
        .map(|brand| brand.trim().to_lowercase())
        .filter(|brand| !brand.is_empty());
    if let Some(brand) = preferred {
        if let Some(candidate) = candidates.iter().find(|c| c.brands.contains(&brand)) {
            return Some(candidate.record.as_ref());
        }
    }
    Some(first.record.as_ref())
}
