use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{MirrorError, MirrorResult};
use crate::expander::GroupCodes;
use crate::record::{BrandModel, Language, ReferenceCollection, TriRecord};

#[derive(Debug, Default, Deserialize)]
struct RawPair {
    brand: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    ua: Option<RawPair>,
    ru: Option<RawPair>,
    en: Option<RawPair>,
}

impl RawRecord {
    fn pair(&self, language: Language) -> Option<BrandModel> {
        let raw = match language {
            Language::Ua => self.ua.as_ref(),
            Language::Ru => self.ru.as_ref(),
            Language::En => self.en.as_ref(),
        }?;
        let pair = BrandModel::new(raw.brand.as_deref()?.trim(), raw.model.as_deref()?.trim());
        pair.is_complete().then_some(pair)
    }

    fn into_record(self) -> Option<TriRecord> {
        Some(TriRecord::new(
            self.pair(Language::Ua)?,
            self.pair(Language::Ru)?,
            self.pair(Language::En)?,
        ))
    }
}

fn read_json(path: &Path) -> MirrorResult<Value> {
    let content = fs::read_to_string(path).map_err(|e| MirrorError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| MirrorError::json(path, e))
}

/// Load reference records from a single JSON file
///
/// The file holds either one record object or an array of them:
/// ```json
/// {
///     "ua": {"brand": "Ауді", "model": "А3"},
///     "ru": {"brand": "Ауди", "model": "А3"},
///     "en": {"brand": "Audi", "model": "A3"}
/// }
/// ```
///
/// Records with a missing or blank brand/model in any language are skipped with a warning.
///
/// # Arguments
/// * `path` - Path to the JSON file
///
/// # Returns
/// Every complete record, in file order
///
/// # Errors
/// - File read errors
/// - Invalid JSON
/// - A root that is neither an object nor an array
pub fn load_records_from_file(path: &Path) -> MirrorResult<Vec<TriRecord>> {
    let entries = match read_json(path)? {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => {
            return Err(MirrorError::InvalidReference {
                path: path.to_path_buf(),
                reason: "root must be an object or an array of objects".to_string(),
            });
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        let raw: RawRecord = serde_json::from_value(entry).unwrap_or_default();
        match raw.into_record() {
            Some(record) => records.push(record),
            None => warn!(
                file = %path.display(),
                position,
                "Skipping reference record without brand/model in every language"
            ),
        }
    }
    Ok(records)
}

/// Load reference records from every `*.json` file in a directory
///
/// Files are read in file-name order so repeated runs index identically.
///
/// # Arguments
/// * `dir` - Directory holding the reference files; other file types are ignored
///
/// # Errors
/// The directory cannot be listed, or any file fails as in [`load_records_from_file`]
pub fn load_records_from_dir(dir: &Path) -> MirrorResult<Vec<TriRecord>> {
    let entries = fs::read_dir(dir).map_err(|e| MirrorError::io(dir, e))?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| MirrorError::io(dir, e))?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        warn!(dir = %dir.display(), "No reference JSON files found");
    }

    let mut records = Vec::new();
    for file in &files {
        let loaded = load_records_from_file(file)?;
        debug!(file = %file.display(), records = loaded.len(), "Loaded reference file");
        records.extend(loaded);
    }
    Ok(records)
}

/// Load the model → group code side table from a JSON object
pub fn load_group_codes(path: &Path) -> MirrorResult<GroupCodes> {
    let content = fs::read_to_string(path).map_err(|e| MirrorError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| MirrorError::json(path, e))
}

/// Reference data backed by a JSON file or a directory of JSON files
#[derive(Debug, Clone)]
pub struct JsonReferenceSource {
    path: PathBuf,
}

impl JsonReferenceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonReferenceSource { path: path.into() }
    }
}

impl crate::source::ReferenceSource for JsonReferenceSource {
    fn load(&self) -> MirrorResult<ReferenceCollection> {
        let records = if self.path.is_dir() {
            load_records_from_dir(&self.path)?
        } else {
            load_records_from_file(&self.path)?
        };
        Ok(records.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ReferenceSource;
    use std::fs;

    const A3: &str = r#"{
        "ua": {"brand": "Ауді", "model": "А3"},
        "ru": {"brand": "Ауди", "model": "А3"},
        "en": {"brand": "Audi", "model": "A3"}
    }"#;

    #[test]
    fn test_load_single_object_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audi.json");
        fs::write(&path, A3).unwrap();

        let records = load_records_from_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].model(Language::En), "A3");
    }

    #[test]
    fn test_load_array_skips_incomplete_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars.json");
        let json = format!(
            r#"[{}, {{"ua": {{"brand": "Ауді", "model": ""}}, "ru": {{"brand": "Ауди", "model": "А4"}}, "en": {{"brand": "Audi", "model": "A4"}}}}, {{"en": {{"brand": "Audi"}}}}, 42]"#,
            A3
        );
        fs::write(&path, json).unwrap();

        let records = load_records_from_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_valid());
    }

    #[test]
    fn test_load_dir_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_audi.json"), A3).unwrap();
        fs::write(
            dir.path().join("a_vw.json"),
            r#"{"ua": {"brand": "Фольксваген", "model": "Гольф"},
                "ru": {"brand": "Фольксваген", "model": "Гольф"},
                "en": {"brand": "VW", "model": "Golf"}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let collection = JsonReferenceSource::new(dir.path()).load().unwrap();
        let models: Vec<&str> = collection.iter().map(|r| r.model(Language::En)).collect();
        assert_eq!(models, vec!["Golf", "A3"]);
    }

    #[test]
    fn test_invalid_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "\"just a string\"").unwrap();
        assert!(matches!(
            load_records_from_file(&path),
            Err(MirrorError::InvalidReference { .. })
        ));

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_records_from_file(&path),
            Err(MirrorError::Json { .. })
        ));
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            load_records_from_dir(&missing),
            Err(MirrorError::Io { .. })
        ));
    }

    #[test]
    fn test_load_group_codes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.json");
        fs::write(&path, r#"{"A3": "000123", "Golf": ""}"#).unwrap();
        let codes = load_group_codes(&path).unwrap();
        assert_eq!(codes.get("A3"), Some("000123"));
        assert_eq!(codes.get("Golf"), None);
        assert_eq!(codes.get("Camry"), None);
    }
}
