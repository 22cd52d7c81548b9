//! Column and policy configuration
//!
//! Which columns carry brand/model text, and in which script, is static configuration
//! rather than something discovered from the data. `Default` reproduces the production
//! catalog schema.

use serde::Deserialize;

use crate::error::{MirrorError, MirrorResult};
use crate::record::Language;

/// A column paired with the language its text should be written in
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnSpec {
    pub column: String,
    pub language: Language,
}

impl ColumnSpec {
    pub fn new(column: &str, language: Language) -> Self {
        ColumnSpec {
            column: column.to_string(),
            language,
        }
    }
}

fn specs(pairs: &[(&str, Language)]) -> Vec<ColumnSpec> {
    pairs
        .iter()
        .map(|&(column, language)| ColumnSpec::new(column, language))
        .collect()
}

fn names(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

/// Where the expander reads and writes its bookkeeping fields
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Brand column per language; the English one identifies the row's own vehicle
    pub brand: Vec<ColumnSpec>,
    /// Model column per language; the English one identifies the row's own vehicle
    pub model: Vec<ColumnSpec>,
    pub compatibility: String,
    pub article: String,
    pub new_article: String,
    pub category: String,
    pub group_name: String,
    pub group_code: String,
    pub record_type: String,
    /// Free-text columns receiving pair substitution
    pub text: Vec<ColumnSpec>,
    /// Comma-separated keyword columns; the language names the Cyrillic script used
    pub keywords: Vec<ColumnSpec>,
    /// Columns that do not carry over to a different vehicle fit
    pub mirror_clear: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        ColumnConfig {
            brand: specs(&[
                ("Марка", Language::En),
                ("Марка_кириллицей", Language::Ru),
                ("Марка_кириллицей_укр", Language::Ua),
            ]),
            model: specs(&[
                ("Модель", Language::En),
                ("Модель_кириллицей", Language::Ru),
                ("Модель_кириллицей_укр", Language::Ua),
            ]),
            compatibility: "Совместимость".to_string(),
            article: "Артикул".to_string(),
            new_article: "Новый_артикул".to_string(),
            category: "Категория_BAS".to_string(),
            group_name: "Название_группы".to_string(),
            group_code: "Код_группы".to_string(),
            record_type: "Тип_записи".to_string(),
            text: specs(&[
                ("Наименование_WestLine", Language::Ru),
                ("Наименование_WestLine_ua", Language::Ua),
                ("Наименование_Automotive", Language::Ru),
                ("Наименование_Automotive_ua", Language::Ua),
                ("Описание_WestLine", Language::Ru),
                ("Описание_WestLine_ua", Language::Ua),
                ("Описание_Automotive", Language::Ru),
                ("Описание_Automotive_ua", Language::Ua),
            ]),
            keywords: specs(&[
                ("Ключевые_слова", Language::Ru),
                ("Ключевые_слова_укр", Language::Ua),
            ]),
            mirror_clear: names(&[
                "Код_BAS",
                "Цена_продажи",
                "Поставщик",
                "Производитель",
                "Страна_производитель",
                "Идентификатор_подраздела",
                "Состояние",
                "Срок_гарантии",
                "Тип_запчасти",
                "Код_запчасти",
                "Код_запчасти_поставщика",
                "Код_закупки",
                "Размещение_на_складе",
                "Мин_уровень_запаса",
                "Макс_уровень_запаса",
                "Вес",
                "Совместимость",
                "Уточнение",
                "Сторона_установки",
                "Количество_контактов",
                "Тип_кузова",
                "Комплектация",
                "Тип_установки",
                "Материал",
                "Размер",
                "Цвет",
            ]),
        }
    }
}

impl ColumnConfig {
    /// English brand column, used to identify a row's own vehicle
    pub fn primary_brand(&self) -> Option<&str> {
        primary(&self.brand)
    }

    /// English model column, used to identify a row's own vehicle
    pub fn primary_model(&self) -> Option<&str> {
        primary(&self.model)
    }
}

fn primary(columns: &[ColumnSpec]) -> Option<&str> {
    columns
        .iter()
        .find(|spec| spec.language == Language::En)
        .or_else(|| columns.first())
        .map(|spec| spec.column.as_str())
}

/// How keyword cells are filtered and re-joined
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeywordPolicy {
    /// Drop items that mention no known model
    pub drop_unchanged: bool,
    /// Retry with base tokens when no full model name matches
    pub allow_base_fallback: bool,
    /// Maximum length of the re-joined cell, in characters
    pub max_len: usize,
    pub separator: String,
    pub deduplicate: bool,
}

impl Default for KeywordPolicy {
    fn default() -> Self {
        KeywordPolicy {
            drop_unchanged: true,
            allow_base_fallback: true,
            max_len: 1000,
            separator: ", ".to_string(),
            deduplicate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExpanderConfig {
    pub columns: ColumnConfig,
    pub keywords: KeywordPolicy,
    /// Tag output rows as original or mirror
    pub include_record_type: bool,
    /// Rewrite model-then-brand mentions as brand-then-model
    pub force_brand_first: bool,
    /// Expand rows on the rayon thread pool
    pub parallel: bool,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        ExpanderConfig {
            columns: ColumnConfig::default(),
            keywords: KeywordPolicy::default(),
            include_record_type: true,
            force_brand_first: true,
            parallel: false,
        }
    }
}

impl ExpanderConfig {
    pub fn validate(&self) -> MirrorResult<()> {
        let columns = &self.columns;
        if columns.primary_brand().is_none() || columns.primary_model().is_none() {
            return Err(MirrorError::Configuration(
                "brand and model columns must be configured".to_string(),
            ));
        }

        let required = [
            ("compatibility", &columns.compatibility),
            ("article", &columns.article),
            ("new_article", &columns.new_article),
            ("record_type", &columns.record_type),
        ];
        for (name, column) in required {
            if column.trim().is_empty() {
                return Err(MirrorError::Configuration(format!(
                    "column '{}' must not be empty",
                    name
                )));
            }
        }

        let named = columns
            .brand
            .iter()
            .chain(&columns.model)
            .chain(&columns.text)
            .chain(&columns.keywords);
        for spec in named {
            if spec.column.trim().is_empty() {
                return Err(MirrorError::Configuration(format!(
                    "a {} column has an empty name",
                    spec.language
                )));
            }
        }

        if let Some(spec) = columns.keywords.iter().find(|s| !s.language.is_cyrillic()) {
            return Err(MirrorError::Configuration(format!(
                "keyword column '{}' must name a Cyrillic language",
                spec.column
            )));
        }

        if self.keywords.max_len == 0 {
            return Err(MirrorError::Configuration(
                "keyword max_len must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExpanderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.columns.primary_brand(), Some("Марка"));
        assert_eq!(config.columns.primary_model(), Some("Модель"));
        assert_eq!(config.columns.text.len(), 8);
        assert_eq!(config.keywords.max_len, 1000);
    }

    #[test]
    fn test_mirror_clear_keeps_brand_columns() {
        let config = ColumnConfig::default();
        assert!(!config.mirror_clear.iter().any(|c| c.starts_with("Марка")));
        assert!(config.mirror_clear.contains(&"Поставщик".to_string()));
    }

    #[test]
    fn test_partial_json_config() {
        let json = r#"{
            "parallel": true,
            "keywords": {"max_len": 200},
            "columns": {"text": [{"column": "Title", "language": "en"}]}
        }"#;
        let config: ExpanderConfig = serde_json::from_str(json).unwrap();
        assert!(config.parallel);
        assert_eq!(config.keywords.max_len, 200);
        assert!(config.keywords.drop_unchanged);
        assert_eq!(config.columns.text, vec![ColumnSpec::new("Title", Language::En)]);
        assert_eq!(config.columns.article, "Артикул");
    }

    #[test]
    fn test_validate_rejects_latin_keyword_column() {
        let mut config = ExpanderConfig::default();
        config.columns.keywords = vec![ColumnSpec::new("Keywords", Language::En)];
        assert!(matches!(
            config.validate(),
            Err(MirrorError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_missing_brand_columns() {
        let mut config = ExpanderConfig::default();
        config.columns.brand.clear();
        assert!(config.validate().is_err());

        let mut config = ExpanderConfig::default();
        config.keywords.max_len = 0;
        assert!(config.validate().is_err());
    }
}
