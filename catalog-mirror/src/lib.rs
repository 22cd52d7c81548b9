//! Mirror-row generation for multilingual automotive parts catalogs
//!
//! A catalog row describes a part for one vehicle and lists other compatible vehicles.
//! [`RowExpander`] emits the original row plus one mirror row per compatible vehicle,
//! with brand/model columns replaced and every mention of the source vehicle in the
//! free-text columns rewritten to the target vehicle, in Ukrainian, Russian and English.
//!
//! Free text mixes Latin and Cyrillic look-alike letters, so vehicle names are matched
//! with confusable-tolerant patterns built by [`ConfusablePatternCompiler`].

pub mod config;
pub mod confusable;
pub mod error;
pub mod expander;
pub mod index;
pub mod keywords;
pub mod loader;
pub mod pipeline;
pub mod record;
pub mod resolver;
pub mod row;
pub mod source;
pub mod substitution;


pub use config::{ColumnConfig, ColumnSpec, ExpanderConfig, KeywordPolicy};
pub use confusable::{ConfusablePatternCompiler, PairMatch, PairOrder, PairPattern};
pub use error::{MirrorError, MirrorResult};
pub use expander::{GroupCodes, RecordType, RowExpander};
pub use index::ReferenceIndex;
pub use loader::{JsonReferenceSource, load_group_codes, load_records_from_dir, load_records_from_file};
pub use pipeline::{Expansion, MirrorContext, expand_all};
pub use record::{BrandModel, Language, ReferenceCollection, TriRecord};
pub use resolver::ModelResolver;
pub use row::CatalogRow;
pub use source::{ReferenceSource, RowSink, RowSource};
pub use substitution::TextSubstitutionEngine;
