//! Confusable-aware pattern compilation
//!
//! Catalog text freely mixes Latin and Cyrillic look-alike letters ("A3" typed with a
//! Cyrillic "А", "BMW" with a Cyrillic "В", ...). Every letter of a token is compiled into
//! a class accepting the letter in both cases plus its cross-script twin in both cases.
//! Separators inside a token (whitespace, `.`, `-`, `_`) match any run of separators, so
//! "Grand Cherokee", "Grand-Cherokee" and "Grand.Cherokee" share one pattern.
//!
//! Matches never start or end inside a longer alphanumeric run.

use fancy_regex::{Regex, RegexBuilder};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::error::{MirrorError, MirrorResult};

/// Latin/Cyrillic letter pairs that render identically in catalog fonts
const CONFUSABLE_PAIRS: [(char, char); 12] = [
    ('A', 'А'),
    ('B', 'В'),
    ('C', 'С'),
    ('E', 'Е'),
    ('H', 'Н'),
    ('K', 'К'),
    ('M', 'М'),
    ('O', 'О'),
    ('P', 'Р'),
    ('T', 'Т'),
    ('X', 'Х'),
    ('Y', 'У'),
];

const SEPARATOR_RUN: &str = r"[\s.\-_]*";
const NOT_AFTER_WORD: &str = r"(?<!\w)";
const NOT_BEFORE_WORD: &str = r"(?!\w)";

/// Union patterns over a full reference set are large; the default regex limits are not.
const DELEGATE_SIZE_LIMIT: usize = 256 * (1 << 20);
const DELEGATE_DFA_SIZE_LIMIT: usize = 64 * (1 << 20);

/// Name of the capture group holding the separator found between brand and model
pub const SEPARATOR_GROUP: &str = "sep";

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '.' | '-' | '_')
}

fn lower(ch: char) -> String {
    ch.to_lowercase().collect()
}

fn upper(ch: char) -> String {
    ch.to_uppercase().collect()
}

/// Build the pattern fragment accepting `ch` and all of its case/script variants
pub fn char_class(ch: char) -> String {
    let up = upper(ch);
    let lo = lower(ch);
    let mut variants: BTreeSet<String> = BTreeSet::new();
    variants.insert(ch.to_string());
    variants.insert(up.clone());
    variants.insert(lo.clone());

    for (latin, cyrillic) in CONFUSABLE_PAIRS {
        let twins = [latin.to_string(), cyrillic.to_string()];
        let twins_lower = [lower(latin), lower(cyrillic)];
        if twins.contains(&up) || twins_lower.contains(&lo) {
            variants.extend(twins);
            variants.extend(twins_lower);
        }
    }

    if variants.len() == 1 {
        return regex::escape(&ch.to_string());
    }

    if variants.iter().all(|v| v.chars().count() == 1) {
        let body: String = variants.iter().map(|v| regex::escape(v)).collect();
        format!("[{}]", body)
    } else {
        let body: Vec<String> = variants.iter().map(|v| regex::escape(v)).collect();
        format!("(?:{})", body.join("|"))
    }
}

/// Pattern body for a token, without boundaries or flags
pub fn token_body(token: &str) -> String {
    token
        .chars()
        .map(|ch| {
            if is_separator(ch) {
                SEPARATOR_RUN.to_string()
            } else {
                char_class(ch)
            }
        })
        .collect()
}

fn bounded(body: &str) -> String {
    format!("(?i){}{}{}", NOT_AFTER_WORD, body, NOT_BEFORE_WORD)
}

fn build(pattern: &str) -> MirrorResult<Regex> {
    RegexBuilder::new(pattern)
        .delegate_size_limit(DELEGATE_SIZE_LIMIT)
        .delegate_dfa_size_limit(DELEGATE_DFA_SIZE_LIMIT)
        .build()
        .map_err(|e| MirrorError::pattern(pattern, e))
}

/// Which way round a brand/model mention was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOrder {
    BrandFirst,
    ModelFirst,
}

/// A located brand/model mention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairMatch {
    pub start: usize,
    pub end: usize,
    pub separator: String,
    pub order: PairOrder,
}

/// Compiled "brand then model" and "model then brand" patterns for one pair
#[derive(Debug)]
pub struct PairPattern {
    brand_first: Regex,
    model_first: Regex,
}

impl PairPattern {
    /// Find the first mention, preferring brand-then-model over model-then-brand
    pub fn find(&self, text: &str) -> MirrorResult<Option<PairMatch>> {
        let attempts = [
            (&self.brand_first, PairOrder::BrandFirst),
            (&self.model_first, PairOrder::ModelFirst),
        ];
        for (regex, order) in attempts {
            let captures = regex
                .captures(text)
                .map_err(|e| MirrorError::pattern(regex.as_str(), e))?;
            let Some(captures) = captures else {
                continue;
            };
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let separator = captures
                .name(SEPARATOR_GROUP)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            return Ok(Some(PairMatch {
                start: whole.start(),
                end: whole.end(),
                separator,
                order,
            }));
        }
        Ok(None)
    }
}

/// Memoized patterns keyed by their literal source strings
///
/// Reference data is immutable for a run, so entries are never invalidated. Concurrent
/// insertion of the same key compiles twice and keeps whichever lands first; both are
/// identical.
#[derive(Debug, Default)]
pub struct PatternCache {
    tokens: RwLock<HashMap<String, Option<Arc<Regex>>>>,
    pairs: RwLock<HashMap<(String, String), Option<Arc<PairPattern>>>>,
}

impl PatternCache {
    pub fn token_count(&self) -> usize {
        self.tokens.read().len()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.read().len()
    }
}

/// Compiles case-insensitive, script-confusable-tolerant patterns
#[derive(Debug, Default)]
pub struct ConfusablePatternCompiler {
    cache: PatternCache,
}

impl ConfusablePatternCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    /// Pattern matching a single token on word boundaries
    ///
    /// Returns `None` for empty or whitespace-only tokens.
    pub fn token_pattern(&self, token: &str) -> MirrorResult<Option<Arc<Regex>>> {
        if let Some(hit) = self.cache.tokens.read().get(token) {
            return Ok(hit.clone());
        }

        let trimmed = token.trim();
        let compiled = if trimmed.is_empty() {
            None
        } else {
            Some(Arc::new(build(&bounded(&token_body(trimmed)))?))
        };

        Ok(self
            .cache
            .tokens
            .write()
            .entry(token.to_string())
            .or_insert(compiled)
            .clone())
    }

    /// Brand-then-model and model-then-brand patterns capturing the separator
    ///
    /// Returns `None` when either side is blank.
    pub fn pair_patterns(&self, brand: &str, model: &str) -> MirrorResult<Option<Arc<PairPattern>>> {
        let key = (brand.to_string(), model.to_string());
        if let Some(hit) = self.cache.pairs.read().get(&key) {
            return Ok(hit.clone());
        }

        let (brand_trimmed, model_trimmed) = (brand.trim(), model.trim());
        let compiled = if brand_trimmed.is_empty() || model_trimmed.is_empty() {
            None
        } else {
            let brand_body = token_body(brand_trimmed);
            let model_body = token_body(model_trimmed);
            let separator = format!("(?P<{}>{})", SEPARATOR_GROUP, SEPARATOR_RUN);
            Some(Arc::new(PairPattern {
                brand_first: build(&bounded(&format!(
                    "{}{}{}",
                    brand_body, separator, model_body
                )))?,
                model_first: build(&bounded(&format!(
                    "{}{}{}",
                    model_body, separator, brand_body
                )))?,
            }))
        };

        Ok(self
            .cache
            .pairs
            .write()
            .entry(key)
            .or_insert(compiled)
            .clone())
    }

    /// One pattern matching any of `alternatives` on word boundaries
    ///
    /// Alternatives are de-duplicated case-insensitively and ordered longest first, so the
    /// longest known spelling wins at a given position. Union patterns are built once per
    /// index and are not cached here.
    pub fn union_pattern<S: AsRef<str>>(&self, alternatives: &[S]) -> MirrorResult<Option<Regex>> {
        let mut seen = HashSet::new();
        let mut unique: Vec<&str> = Vec::new();
        for alternative in alternatives {
            let trimmed = alternative.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            if seen.insert(trimmed.to_lowercase()) {
                unique.push(trimmed);
            }
        }
        if unique.is_empty() {
            return Ok(None);
        }

        unique.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });

        let body: Vec<String> = unique.iter().map(|alt| token_body(alt)).collect();
        let pattern = bounded(&format!("(?:{})", body.join("|")));
        Ok(Some(build(&pattern)?))
    }
}
