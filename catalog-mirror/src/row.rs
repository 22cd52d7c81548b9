//! Catalog rows
//!
//! A row is an ordered column → value record. The expander only interprets the columns
//! named in its configuration; everything else is carried through untouched.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogRow(pub IndexMap<String, Value>);

impl CatalogRow {
    pub fn new() -> Self {
        CatalogRow(IndexMap::new())
    }

    /// Builder-style insert, mostly useful in tests and fixtures
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Cell rendered as text; `None` for missing, `null` and non-scalar cells
    pub fn text(&self, column: &str) -> Option<String> {
        match self.0.get(column)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Cell rendered as text, with missing and null cells as the empty string
    pub fn text_or_empty(&self, column: &str) -> String {
        self.text(column).unwrap_or_default()
    }

    /// Overwrite a cell, appending the column when it is new
    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        self.0.insert(column.to_string(), value.into());
    }

    /// Blank a cell if the column exists
    pub fn clear(&mut self, column: &str) {
        if let Some(cell) = self.0.get_mut(column) {
            *cell = Value::Null;
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<IndexMap<String, Value>> for CatalogRow {
    fn from(cells: IndexMap<String, Value>) -> Self {
        CatalogRow(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_rendering() {
        let row = CatalogRow::new()
            .with("title", "Bumper")
            .with("qty", 3)
            .with("price", 12.5)
            .with("flag", true)
            .with("empty", Value::Null);
        assert_eq!(row.text("title"), Some("Bumper".to_string()));
        assert_eq!(row.text("qty"), Some("3".to_string()));
        assert_eq!(row.text("price"), Some("12.5".to_string()));
        assert_eq!(row.text("flag"), Some("true".to_string()));
        assert_eq!(row.text("empty"), None);
        assert_eq!(row.text_or_empty("missing"), "");
    }

    #[test]
    fn test_set_appends_new_columns_in_order() {
        let mut row = CatalogRow::new().with("b", "1").with("a", "2");
        row.set("b", "3");
        row.set("c", "4");
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["b", "a", "c"]);
        assert_eq!(row.text("b"), Some("3".to_string()));
    }

    #[test]
    fn test_clear_only_touches_existing_columns() {
        let mut row = CatalogRow::new().with("stock", 5);
        row.clear("stock");
        row.clear("supplier");
        assert_eq!(row.get("stock"), Some(&Value::Null));
        assert!(!row.contains("supplier"));
    }

    #[test]
    fn test_serde_preserves_column_order() {
        let row: CatalogRow = serde_json::from_str(r#"{"z": 1, "a": "x", "m": null}"#).unwrap();
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["z", "a", "m"]);

        // Going through a `Value` keeps document order as well
        let row: CatalogRow =
            serde_json::from_value(json!({"z": 1, "a": "x", "m": null})).unwrap();
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["z", "a", "m"]);

        let written = serde_json::to_string(&row).unwrap();
        assert_eq!(written, r#"{"z":1,"a":"x","m":null}"#);
    }
}
