//! Driving loop over a whole catalog
//!
//! Indices are built once in a [`MirrorContext`]; every input row is then expanded
//! independently against them. Output keeps input row order, and input column order
//! followed by any newly introduced columns.

use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use serde_json::Value;
use tracing::info;

use crate::config::ExpanderConfig;
use crate::error::MirrorResult;
use crate::expander::{GroupCodes, RowExpander};
use crate::index::ReferenceIndex;
use crate::record::ReferenceCollection;
use crate::resolver::ModelResolver;
use crate::row::CatalogRow;
use crate::substitution::TextSubstitutionEngine;

/// Everything built once per run from reference data and configuration
#[derive(Debug)]
pub struct MirrorContext {
    config: ExpanderConfig,
    index: ReferenceIndex,
    resolver: ModelResolver,
    engine: TextSubstitutionEngine,
    group_codes: GroupCodes,
}

impl MirrorContext {
    pub fn build(
        records: &ReferenceCollection,
        config: ExpanderConfig,
        group_codes: GroupCodes,
    ) -> MirrorResult<Self> {
        config.validate()?;
        let engine = TextSubstitutionEngine::new(config.keywords.clone());
        let index = ReferenceIndex::build(records, engine.compiler())?;
        let resolver = ModelResolver::build(records);
        Ok(MirrorContext {
            config,
            index,
            resolver,
            engine,
            group_codes,
        })
    }

    pub fn config(&self) -> &ExpanderConfig {
        &self.config
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    pub fn engine(&self) -> &TextSubstitutionEngine {
        &self.engine
    }

    pub fn expander(&self) -> RowExpander<'_> {
        RowExpander::new(
            &self.config,
            &self.index,
            &self.resolver,
            &self.engine,
            &self.group_codes,
        )
    }
}

/// Output of a full catalog expansion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub columns: Vec<String>,
    pub rows: Vec<CatalogRow>,
    pub originals: usize,
    pub mirrors: usize,
}

/// Expand every row and concatenate the results in input order
///
/// # Arguments
/// * `rows` - Input rows
/// * `context` - Indices and configuration built once for the run
///
/// # Returns
/// An [`Expansion`] with aligned rows and the output column list
///
/// # Errors
/// The first error any row's expansion returns
pub fn expand_all(rows: &[CatalogRow], context: &MirrorContext) -> MirrorResult<Expansion> {
    let expander = context.expander();

    let per_row: Vec<Vec<CatalogRow>> = if context.config().parallel {
        // Indexed parallel collect keeps input order
        rows.par_iter()
            .map(|row| expander.expand(row))
            .collect::<MirrorResult<_>>()?
    } else {
        rows.iter()
            .map(|row| expander.expand(row))
            .collect::<MirrorResult<_>>()?
    };

    let originals = per_row.len();
    let expanded: Vec<CatalogRow> = per_row.into_iter().flatten().collect();
    let mirrors = expanded.len() - originals;
    let columns = output_columns(rows, &expanded);
    let rows_out = align_columns(expanded, &columns);

    info!(
        originals,
        mirrors,
        patterns = context.engine().compiler().cache().pair_count(),
        "Expanded catalog rows"
    );

    Ok(Expansion {
        columns,
        rows: rows_out,
        originals,
        mirrors,
    })
}

/// Input columns in first-seen order, then columns introduced by expansion
pub fn output_columns(input: &[CatalogRow], output: &[CatalogRow]) -> Vec<String> {
    let mut columns: IndexSet<String> = IndexSet::new();
    for row in input.iter().chain(output) {
        for column in row.columns() {
            if !columns.contains(column) {
                columns.insert(column.to_string());
            }
        }
    }
    columns.into_iter().collect()
}

/// Re-key rows to `columns`, filling missing cells with `null`
pub fn align_columns(rows: Vec<CatalogRow>, columns: &[String]) -> Vec<CatalogRow> {
    rows.into_iter()
        .map(|mut row| {
            let cells: IndexMap<String, Value> = columns
                .iter()
                .map(|column| {
                    let value = row.0.shift_remove(column).unwrap_or(Value::Null);
                    (column.clone(), value)
                })
                .collect();
            CatalogRow(cells)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnSpec;
    use crate::record::Language;
    use crate::record::fixtures::*;

    fn context(parallel: bool) -> MirrorContext {
        let mut config = ExpanderConfig::default();
        config.columns.text = vec![ColumnSpec::new("Title", Language::En)];
        config.parallel = parallel;
        MirrorContext::build(&collection(), config, GroupCodes::default()).unwrap()
    }

    fn rows() -> Vec<CatalogRow> {
        vec![
            CatalogRow::new()
                .with("Артикул", "1")
                .with("Марка", "VW")
                .with("Модель", "Golf")
                .with("Совместимость", "A3, Camry")
                .with("Title", "VW Golf bumper"),
            CatalogRow::new()
                .with("Артикул", "2")
                .with("Марка", "Audi")
                .with("Модель", "A3")
                .with("Совместимость", "")
                .with("Title", "Audi A3 mirror"),
            CatalogRow::new()
                .with("Артикул", "3")
                .with("Марка", "Toyota")
                .with("Модель", "Camry")
                .with("Совместимость", "Golf")
                .with("Title", "Camry Toyota mat"),
        ]
    }

    #[test]
    fn test_expand_all_preserves_row_order() {
        let expansion = expand_all(&rows(), &context(false)).unwrap();
        assert_eq!(expansion.originals, 3);
        assert_eq!(expansion.mirrors, 3);
        let titles: Vec<String> = expansion
            .rows
            .iter()
            .map(|r| r.text_or_empty("Title"))
            .collect();
        assert_eq!(
            titles,
            vec![
                "VW Golf bumper",
                "Audi A3 bumper",
                "Toyota Camry bumper",
                "Audi A3 mirror",
                "Toyota Camry mat",
                "VW Golf mat",
            ]
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = expand_all(&rows(), &context(false)).unwrap();
        let parallel = expand_all(&rows(), &context(true)).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_new_columns_follow_input_columns() {
        let expansion = expand_all(&rows(), &context(false)).unwrap();
        assert_eq!(
            &expansion.columns[..5],
            &["Артикул", "Марка", "Модель", "Совместимость", "Title"]
        );
        assert!(expansion.columns[5..].contains(&"Тип_записи".to_string()));
        assert!(expansion.columns[5..].contains(&"Новый_артикул".to_string()));
        for row in &expansion.rows {
            let columns: Vec<&str> = row.columns().collect();
            assert_eq!(columns, expansion.columns);
        }
        // Originals never had a new-article value
        assert_eq!(expansion.rows[0].get("Новый_артикул"), Some(&Value::Null));
    }

    #[test]
    fn test_empty_input() {
        let expansion = expand_all(&[], &context(false)).unwrap();
        assert!(expansion.rows.is_empty());
        assert!(expansion.columns.is_empty());
        assert_eq!(expansion.mirrors, 0);
    }
}
