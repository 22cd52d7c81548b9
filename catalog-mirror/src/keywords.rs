//! Keyword cell normalization
//!
//! A keyword cell is a comma-separated list of search terms. Each term is searched first
//! in the language its script suggests (any Cyrillic letter means the configured Cyrillic
//! language, otherwise English) and then in the other two. The first known model name
//! found is rewritten to the destination's spelling in the language that matched.

use fancy_regex::Regex;
use std::collections::HashSet;

use crate::config::KeywordPolicy;
use crate::error::{MirrorError, MirrorResult};
use crate::index::ReferenceIndex;
use crate::record::{Language, TriRecord};

/// True when the text holds at least one Russian or Ukrainian letter
pub fn contains_cyrillic(text: &str) -> bool {
    text.chars()
        .any(|ch| matches!(ch, 'А'..='я' | 'Ё' | 'ё' | 'І' | 'і' | 'Ї' | 'ї' | 'Є' | 'є' | 'Ґ' | 'ґ'))
}

fn split_items(text: &str) -> Vec<&str> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

fn find_span(pattern: Option<&Regex>, text: &str) -> MirrorResult<Option<(usize, usize)>> {
    let Some(pattern) = pattern else {
        return Ok(None);
    };
    let found = pattern
        .find(text)
        .map_err(|e| MirrorError::pattern(pattern.as_str(), e))?;
    Ok(found.map(|m| (m.start(), m.end())))
}

/// Join items, dropping whole items from the end once the limit would be exceeded
pub fn truncate_join(items: &[String], limit: usize, separator: &str) -> String {
    let separator_len = separator.chars().count();
    let mut total = 0;
    let mut kept: Vec<&str> = Vec::new();
    for item in items {
        let item_len = item.chars().count();
        let added = if kept.is_empty() {
            item_len
        } else {
            separator_len + item_len
        };
        if total + added > limit {
            break;
        }
        kept.push(item);
        total += added;
    }
    kept.join(separator)
}

/// Languages to search for an item, starting with the one its script suggests
fn search_order(first: Language) -> impl Iterator<Item = Language> {
    std::iter::once(first).chain(Language::ALL.into_iter().filter(move |l| *l != first))
}

/// Rewrite one keyword item; `None` when it mentions no known model
///
/// Full model names are tried in every language before any base token, and the match is
/// replaced with the destination's model in the language that matched.
fn rewrite_item(
    item: &str,
    index: &ReferenceIndex,
    destination: &TriRecord,
    target_script: Language,
    strict_full: bool,
) -> MirrorResult<Option<String>> {
    let first = if contains_cyrillic(item) {
        target_script
    } else {
        Language::En
    };

    let mut found = None;
    for language in search_order(first) {
        if let Some(span) = find_span(index.model_pattern(language), item)? {
            found = Some((language, span));
            break;
        }
    }
    if found.is_none() && !strict_full {
        for language in search_order(first) {
            if let Some(span) = find_span(index.base_pattern(language), item)? {
                found = Some((language, span));
                break;
            }
        }
    }

    Ok(found.map(|(language, (start, end))| {
        format!(
            "{}{}{}",
            &item[..start],
            destination.model(language),
            &item[end..]
        )
    }))
}

/// Normalize a keyword cell
///
/// Blank cells come back unchanged. Items are rewritten one by one, items without a known
/// model are dropped when `policy.drop_unchanged` is set, duplicates are removed
/// case-insensitively keeping the first, and the result is re-joined within
/// `policy.max_len` characters.
pub fn normalize(
    text: &str,
    index: &ReferenceIndex,
    destination: &TriRecord,
    target_script: Language,
    strict_full: bool,
    policy: &KeywordPolicy,
) -> MirrorResult<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }

    let mut seen = HashSet::new();
    let mut out: Vec<String> = Vec::new();
    for item in split_items(text) {
        let rewritten = rewrite_item(item, index, destination, target_script, strict_full)?;
        let value = match rewritten {
            Some(value) => value,
            None if policy.drop_unchanged => continue,
            None => item.to_string(),
        };
        if policy.deduplicate && !seen.insert(value.to_lowercase()) {
            continue;
        }
        out.push(value);
    }

    Ok(truncate_join(&out, policy.max_len, &policy.separator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confusable::ConfusablePatternCompiler;
    use crate::record::fixtures::*;
    use crate::record::ReferenceCollection;

    fn index_of(records: ReferenceCollection) -> ReferenceIndex {
        ReferenceIndex::build(&records, &ConfusablePatternCompiler::new()).unwrap()
    }

    fn normalize_with(
        text: &str,
        destination: &TriRecord,
        script: Language,
        strict_full: bool,
        policy: &KeywordPolicy,
    ) -> String {
        let index = index_of(collection());
        normalize(text, &index, destination, script, strict_full, policy).unwrap()
    }

    #[test]
    fn test_contains_cyrillic() {
        assert!(contains_cyrillic("бампер"));
        assert!(contains_cyrillic("Ґанок"));
        assert!(contains_cyrillic("mixed Ї"));
        assert!(!contains_cyrillic("Golf 7"));
        assert!(!contains_cyrillic(""));
    }

    #[test]
    fn test_drop_unchanged_keeps_only_model_terms() {
        let index = index_of(vec![golf()].into());
        let result = normalize(
            "foo, Golf, bar",
            &index,
            &golf(),
            Language::Ru,
            true,
            &KeywordPolicy::default(),
        )
        .unwrap();
        assert_eq!(result, "Golf");
    }

    #[test]
    fn test_items_rewritten_per_script() {
        let result = normalize_with(
            "бампер гольф, bumper Golf, mirror",
            &a3(),
            Language::Ua,
            true,
            &KeywordPolicy::default(),
        );
        assert_eq!(result, "бампер А3, bumper A3");
    }

    #[test]
    fn test_keep_unchanged_items_when_policy_allows() {
        let policy = KeywordPolicy {
            drop_unchanged: false,
            ..KeywordPolicy::default()
        };
        let result = normalize_with("foo, Golf,  bar ", &a3(), Language::Ru, true, &policy);
        assert_eq!(result, "foo, A3, bar");
    }

    #[test]
    fn test_base_fallback_only_when_not_strict() {
        let policy = KeywordPolicy::default();
        let strict = normalize_with("Camryx, Grand Vitara", &a3(), Language::Ru, true, &policy);
        assert_eq!(strict, "");
        let relaxed = normalize_with("Camryx, Grand Vitara", &a3(), Language::Ru, false, &policy);
        assert_eq!(relaxed, "A3 Vitara");
    }

    #[test]
    fn test_deduplicates_case_insensitively() {
        let result = normalize_with(
            "Golf, golf, Camry, GOLF",
            &a3(),
            Language::Ru,
            true,
            &KeywordPolicy::default(),
        );
        assert_eq!(result, "A3");
    }

    #[test]
    fn test_blank_cell_unchanged() {
        let policy = KeywordPolicy::default();
        assert_eq!(normalize_with("", &a3(), Language::Ru, true, &policy), "");
        assert_eq!(normalize_with("   ", &a3(), Language::Ru, true, &policy), "   ");
    }

    #[test]
    fn test_other_cyrillic_language_is_searched_next() {
        // Russian spelling in a Ukrainian column keeps its Russian form
        let result = normalize_with(
            "коврик камри",
            &camry(),
            Language::Ua,
            true,
            &KeywordPolicy::default(),
        );
        assert_eq!(result, "коврик Камри");
    }

    #[test]
    fn test_latin_model_with_cyrillic_lookalike() {
        // "Cаmry" carries a Cyrillic "а", so Russian is searched before English
        let result = normalize_with(
            "C\u{0430}mry mat",
            &golf(),
            Language::Ru,
            true,
            &KeywordPolicy::default(),
        );
        assert_eq!(result, "Golf mat");
    }

    #[test]
    fn test_mixed_script_item_prefers_cyrillic_match() {
        // The Cyrillic language is searched first, so its mention is the one rewritten
        let result = normalize_with(
            "Golf Гольф",
            &a3(),
            Language::Ru,
            true,
            &KeywordPolicy::default(),
        );
        assert_eq!(result, "Golf А3");
    }

    #[test]
    fn test_truncate_join_drops_whole_items() {
        let items: Vec<String> = ["alpha", "beta", "gamma"].iter().map(|s| s.to_string()).collect();
        assert_eq!(truncate_join(&items, 100, ", "), "alpha, beta, gamma");
        // "alpha, beta" is 11 characters; adding ", gamma" would reach 18
        assert_eq!(truncate_join(&items, 17, ", "), "alpha, beta");
        assert_eq!(truncate_join(&items, 11, ", "), "alpha, beta");
        assert_eq!(truncate_join(&items, 4, ", "), "");
    }

    #[test]
    fn test_length_limit_applies_after_dedup() {
        let policy = KeywordPolicy {
            max_len: 12,
            ..KeywordPolicy::default()
        };
        let result = normalize_with(
            "Golf mat, golf MAT, Golf cover",
            &camry(),
            Language::Ru,
            true,
            &policy,
        );
        assert_eq!(result, "Camry mat");
    }

    #[test]
    fn test_keyword_normalization_is_idempotent() {
        let policy = KeywordPolicy::default();
        let once = normalize_with(
            "бампер гольф, Golf mat, foo",
            &camry(),
            Language::Ru,
            true,
            &policy,
        );
        let twice = normalize_with(&once, &camry(), Language::Ru, true, &policy);
        assert_eq!(once, "бампер Камри, Camry mat");
        assert_eq!(once, twice);
    }
}
