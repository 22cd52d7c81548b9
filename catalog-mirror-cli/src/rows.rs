//! JSON row files: an array of objects, one object per catalog row

use catalog_mirror::{CatalogRow, MirrorError, MirrorResult, RowSink, RowSource};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Reads rows from a JSON array, keeping each object's key order
#[derive(Debug, Clone)]
pub struct JsonRowSource {
    path: PathBuf,
}

impl JsonRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonRowSource { path: path.into() }
    }
}

impl RowSource for JsonRowSource {
    fn read(&self) -> MirrorResult<Vec<CatalogRow>> {
        let content = fs::read_to_string(&self.path).map_err(|e| MirrorError::io(&self.path, e))?;
        serde_json::from_str(&content).map_err(|e| MirrorError::json(&self.path, e))
    }
}

/// Writes rows as a pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonRowSink {
    path: PathBuf,
}

impl JsonRowSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonRowSink { path: path.into() }
    }
}

impl RowSink for JsonRowSink {
    fn write(&self, rows: &[CatalogRow]) -> MirrorResult<()> {
        let file = File::create(&self.path).map_err(|e| MirrorError::io(&self.path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, rows)
            .map_err(|e| MirrorError::json(&self.path, e))?;
        writer
            .write_all(b"\n")
            .and_then(|_| writer.flush())
            .map_err(|e| MirrorError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_keep_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rows.json");
        fs::write(
            &input,
            r#"[{"Модель": "Golf", "Марка": "VW", "Цена": 12.5, "Пусто": null}]"#,
        )
        .unwrap();

        let rows = JsonRowSource::new(&input).read().unwrap();
        assert_eq!(rows.len(), 1);
        let columns: Vec<&str> = rows[0].columns().collect();
        assert_eq!(columns, vec!["Модель", "Марка", "Цена", "Пусто"]);
        assert_eq!(rows[0].text_or_empty("Цена"), "12.5");
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let rows = vec![
            CatalogRow::new().with("Марка", "Audi").with("Модель", "A3"),
            CatalogRow::new().with("Марка", "VW").with("Модель", "Golf"),
        ];

        JsonRowSink::new(&output).write(&rows).unwrap();
        let back = JsonRowSource::new(&output).read().unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_non_array_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rows.json");
        fs::write(&input, r#"{"Марка": "VW"}"#).unwrap();
        assert!(matches!(
            JsonRowSource::new(&input).read(),
            Err(MirrorError::Json { .. })
        ));
    }
}
