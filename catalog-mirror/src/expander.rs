//! Row expansion: one catalog row in, the original plus its mirrors out

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::{debug, trace};

use crate::config::ExpanderConfig;
use crate::error::{MirrorError, MirrorResult};
use crate::index::ReferenceIndex;
use crate::record::{Language, TriRecord};
use crate::resolver::ModelResolver;
use crate::row::CatalogRow;
use crate::substitution::TextSubstitutionEngine;

/// Tag written to the record-type column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Original,
    Mirror,
}

impl RecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Original => "Original",
            RecordType::Mirror => "Mirror",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model name → catalog group code side table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct GroupCodes(pub HashMap<String, String>);

impl GroupCodes {
    pub fn get(&self, model: &str) -> Option<&str> {
        self.0
            .get(model)
            .map(|code| code.as_str())
            .filter(|code| !code.is_empty())
    }
}

impl FromIterator<(String, String)> for GroupCodes {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        GroupCodes(iter.into_iter().collect())
    }
}

/// Distinct, trimmed, sorted entries of a comma-separated compatibility cell
pub fn compatibility_entries(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub struct RowExpander<'a> {
    config: &'a ExpanderConfig,
    index: &'a ReferenceIndex,
    resolver: &'a ModelResolver,
    engine: &'a TextSubstitutionEngine,
    group_codes: &'a GroupCodes,
}

impl<'a> RowExpander<'a> {
    pub fn new(
        config: &'a ExpanderConfig,
        index: &'a ReferenceIndex,
        resolver: &'a ModelResolver,
        engine: &'a TextSubstitutionEngine,
        group_codes: &'a GroupCodes,
    ) -> Self {
        RowExpander {
            config,
            index,
            resolver,
            engine,
            group_codes,
        }
    }

    /// Expand a row into `[original, mirror₁, …, mirrorₙ]`
    ///
    /// Compatibility entries are resolved strictly (no base-token guessing). Entries that
    /// do not resolve, or that resolve to the row's own vehicle, produce no mirror. A row
    /// whose own vehicle is unknown is still emitted, only without text rewriting.
    ///
    /// # Arguments
    /// * `row` - The catalog row; it is not modified
    ///
    /// # Returns
    /// The original row first, then one mirror per distinct compatible vehicle in sorted
    /// entry order
    ///
    /// # Errors
    /// - `MirrorError::Configuration` when no brand or model column is configured
    /// - `MirrorError::Pattern` when a match gives up on its backtracking limit
    pub fn expand(&self, row: &CatalogRow) -> MirrorResult<Vec<CatalogRow>> {
        let columns = &self.config.columns;
        let (Some(brand_column), Some(model_column)) =
            (columns.primary_brand(), columns.primary_model())
        else {
            return Err(MirrorError::Configuration(
                "brand and model columns must be configured".to_string(),
            ));
        };

        let current_brand = row.text_or_empty(brand_column);
        let current_model = row.text_or_empty(model_column);
        let source = self.index.lookup(&current_brand, &current_model);
        if source.is_none() {
            debug!(
                brand = %current_brand,
                model = %current_model,
                "Row vehicle not in reference data, text left as is"
            );
        }

        let mut original = row.clone();
        if self.config.include_record_type {
            original.set(&columns.record_type, RecordType::Original.as_str());
        }
        self.apply_all(&mut original, source, None)?;

        let mut result = vec![original];
        let raw_compatibility = row.text(&columns.compatibility);
        for entry in compatibility_entries(raw_compatibility.as_deref()) {
            let Some(destination) = self.resolver.resolve(&entry, None, false) else {
                trace!(entry = %entry, "Compatibility entry did not resolve");
                continue;
            };
            if destination.matches_pair(&current_brand, &current_model) {
                trace!(entry = %entry, "Compatibility entry is the row's own vehicle");
                continue;
            }
            result.push(self.mirror(row, source, destination)?);
        }

        Ok(result)
    }

    fn mirror(
        &self,
        row: &CatalogRow,
        source: Option<&TriRecord>,
        destination: &TriRecord,
    ) -> MirrorResult<CatalogRow> {
        let columns = &self.config.columns;
        let mut mirror = row.clone();

        for spec in &columns.brand {
            mirror.set(&spec.column, destination.brand(spec.language));
        }
        for spec in &columns.model {
            mirror.set(&spec.column, destination.model(spec.language));
        }

        let target_model = destination.model(Language::En);
        if !columns.category.is_empty() && mirror.contains(&columns.category) {
            mirror.set(&columns.category, target_model);
        }
        if let Some(code) = self.group_codes.get(target_model) {
            mirror.set(&columns.group_name, target_model);
            mirror.set(&columns.group_code, code);
        }

        if self.config.include_record_type {
            mirror.set(&columns.record_type, RecordType::Mirror.as_str());
        }

        // Mirrors are not orderable under the original SKU
        let article = mirror.get(&columns.article).cloned().unwrap_or(Value::Null);
        mirror.set(&columns.new_article, article);
        mirror.set(&columns.article, Value::Null);

        for column in &columns.mirror_clear {
            mirror.clear(column);
        }

        self.apply_all(&mut mirror, source, Some(destination))?;
        Ok(mirror)
    }

    /// Run pair substitution over text columns and normalization over keyword columns
    fn apply_all(
        &self,
        row: &mut CatalogRow,
        source: Option<&TriRecord>,
        destination: Option<&TriRecord>,
    ) -> MirrorResult<()> {
        let Some(source) = source else {
            return Ok(());
        };
        let columns = &self.config.columns;

        for spec in &columns.text {
            let Some(text) = row.text(&spec.column) else {
                continue;
            };
            let rewritten = self.engine.substitute_pair(
                &text,
                source,
                destination,
                spec.language,
                self.config.force_brand_first,
            )?;
            if rewritten != text {
                row.set(&spec.column, rewritten);
            }
        }

        let keyword_target = destination.unwrap_or(source);
        let strict_full = !self.config.keywords.allow_base_fallback;
        for spec in &columns.keywords {
            let Some(text) = row.text(&spec.column) else {
                continue;
            };
            let normalized = self.engine.normalize_keywords(
                &text,
                self.index,
                keyword_target,
                spec.language,
                strict_full,
            )?;
            if normalized != text {
                row.set(&spec.column, normalized);
            }
        }

        Ok(())
    }
}
