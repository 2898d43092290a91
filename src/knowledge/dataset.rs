//! Tabular dataset loading with column-alias resolution.
//!
//! Knowledge bases arrive under several schema variants (Russian headers from the support
//! team's spreadsheet, English headers from exports). Each field is resolved by trying an
//! ordered alias list; the first alias present with a real value wins.

use std::collections::HashMap;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use serde_json::Value;
use tracing::debug;

use super::entry::KnowledgeEntry;
use super::error::{DatasetError, DatasetResult};

pub const QUESTION_ALIASES: &[&str] = &["Вопрос клиента", "Пример вопроса", "Вопрос", "question"];
pub const TEMPLATE_ALIASES: &[&str] = &[
    "Шаблон ответа",
    "Шаблонный ответ",
    "Ответ",
    "template",
    "answer",
];
pub const CATEGORY_ALIASES: &[&str] = &["Категория", "Основная категория", "category"];
pub const SUBCATEGORY_ALIASES: &[&str] = &["Подкатегория", "subcategory"];
pub const KEYWORDS_ALIASES: &[&str] = &["Ключевые слова", "keywords"];

/// Cell values that mean "absent" (spreadsheet exports write these for empty cells).
const PLACEHOLDERS: &[&str] = &["nan", "none", "null", "n/a"];

/// One dataset row keyed by case-folded header name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetRow {
    /// Zero-based position among data rows (header excluded).
    pub index: usize,
    fields: HashMap<String, String>,
}

impl DatasetRow {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(fold_header(name), value.into());
    }

    /// Raw value of a column, if the column exists.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(&fold_header(name)).map(String::as_str)
    }

    /// First alias whose column is present and holds a non-placeholder value.
    pub fn resolve(&self, aliases: &[&str]) -> Option<String> {
        aliases
            .iter()
            .filter_map(|alias| self.get(alias))
            .map(str::trim)
            .find(|value| !is_placeholder(value))
            .map(str::to_string)
    }

    /// Builds a [`KnowledgeEntry`]; `None` when the question or template is missing.
    pub fn to_entry(&self) -> Option<KnowledgeEntry> {
        let question = self.resolve(QUESTION_ALIASES)?;
        let template = self.resolve(TEMPLATE_ALIASES)?;
        let entry = KnowledgeEntry::new(self.index as u32, question, template)
            .with_category(
                self.resolve(CATEGORY_ALIASES).unwrap_or_default(),
                self.resolve(SUBCATEGORY_ALIASES).unwrap_or_default(),
            )
            .with_keywords(self.resolve(KEYWORDS_ALIASES).unwrap_or_default());
        Some(entry)
    }
}

fn fold_header(name: &str) -> String {
    name.trim().to_lowercase()
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty()
        || PLACEHOLDERS
            .iter()
            .any(|p| value.eq_ignore_ascii_case(p))
}

/// Source of ordered dataset rows (used only by the index builder).
pub trait DatasetSource: Send + Sync {
    fn load_rows(&self, path: &Path) -> DatasetResult<Vec<DatasetRow>>;
}

/// Reads `.xlsx`/`.xls`/`.ods` (first sheet), `.csv` and `.json` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDataset;

impl DatasetSource for FileDataset {
    fn load_rows(&self, path: &Path) -> DatasetResult<Vec<DatasetRow>> {
        if !path.exists() {
            return Err(DatasetError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let rows = match extension.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => read_spreadsheet(path)?,
            "csv" => read_csv(path)?,
            "json" => read_json(path)?,
            _ => {
                return Err(DatasetError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension,
                });
            }
        };

        debug!(path = %path.display(), rows = rows.len(), "Dataset rows loaded");
        Ok(rows)
    }
}

fn read_error(path: &Path, reason: impl ToString) -> DatasetError {
    DatasetError::Read {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn read_spreadsheet(path: &Path) -> DatasetResult<Vec<DatasetRow>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| read_error(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DatasetError::MissingHeader {
            path: path.to_path_buf(),
        })?
        .map_err(|e| read_error(path, e))?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| DatasetError::MissingHeader {
            path: path.to_path_buf(),
        })?
        .iter()
        .map(cell_to_string)
        .collect();

    Ok(rows
        .enumerate()
        .map(|(index, cells)| {
            let mut row = DatasetRow::new(index);
            for (name, cell) in header.iter().zip(cells) {
                row.insert(name, cell_to_string(cell));
            }
            row
        })
        .collect())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn read_csv(path: &Path) -> DatasetResult<Vec<DatasetRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| read_error(path, e))?;

    let header = reader.headers().map_err(|e| read_error(path, e))?.clone();
    if header.is_empty() {
        return Err(DatasetError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| read_error(path, e))?;
        let mut row = DatasetRow::new(index);
        for (name, value) in header.iter().zip(record.iter()) {
            row.insert(name, value);
        }
        rows.push(row);
    }
    Ok(rows)
}

fn read_json(path: &Path) -> DatasetResult<Vec<DatasetRow>> {
    let raw = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
    let records: Vec<serde_json::Map<String, Value>> =
        serde_json::from_str(&raw).map_err(|e| read_error(path, e))?;

    Ok(records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let mut row = DatasetRow::new(index);
            for (name, value) in record {
                let value = match value {
                    Value::Null => String::new(),
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                row.insert(&name, value);
            }
            row
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file.flush().expect("flush");
        file
    }

    #[test]
    fn test_resolve_prefers_first_alias() {
        let row = DatasetRow::new(0)
            .with_field("question", "english")
            .with_field("Вопрос клиента", "русский");
        assert_eq!(row.resolve(QUESTION_ALIASES).as_deref(), Some("русский"));
    }

    #[test]
    fn test_resolve_skips_placeholders() {
        let row = DatasetRow::new(0)
            .with_field("Вопрос клиента", "nan")
            .with_field("question", "  fallback  ");
        assert_eq!(row.resolve(QUESTION_ALIASES).as_deref(), Some("fallback"));

        let row = DatasetRow::new(0).with_field("template", "None");
        assert_eq!(row.resolve(TEMPLATE_ALIASES), None);
    }

    #[test]
    fn test_headers_are_case_folded() {
        let row = DatasetRow::new(0).with_field("  QUESTION ", "q");
        assert_eq!(row.get("question"), Some("q"));
    }

    #[test]
    fn test_to_entry_requires_question_and_template() {
        let row = DatasetRow::new(4).with_field("question", "q");
        assert!(row.to_entry().is_none());

        let row = DatasetRow::new(4)
            .with_field("question", "q")
            .with_field("answer", "a")
            .with_field("category", "c");
        let entry = row.to_entry().expect("entry");
        assert_eq!(entry.ordinal, 4);
        assert_eq!(entry.template, "a");
        assert_eq!(entry.category, "c");
        assert_eq!(entry.subcategory, "");
    }

    #[test]
    fn test_read_csv_rows() {
        let file = write_temp(
            ".csv",
            "Вопрос клиента,Шаблон ответа,Категория\n\
             Как сбросить пароль?,Перейдите в настройки,Аккаунт\n\
             ,Пустой вопрос,Прочее\n",
        );

        let rows = FileDataset.load_rows(file.path()).expect("load");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[0].get("категория"), Some("Аккаунт"));
        assert!(rows[1].to_entry().is_none());
    }

    #[test]
    fn test_read_json_rows() {
        let file = write_temp(
            ".json",
            r#"[{"question": "q1", "template": "t1", "keywords": null},
                {"question": "q2", "template": "t2", "category": 7}]"#,
        );

        let rows = FileDataset.load_rows(file.path()).expect("load");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("keywords"), Some(""));
        assert_eq!(rows[1].get("category"), Some("7"));
    }

    #[test]
    fn test_missing_dataset() {
        let err = FileDataset
            .load_rows(Path::new("/nonexistent/smart_support.xlsx"))
            .unwrap_err();
        assert!(matches!(err, DatasetError::NotFound { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".txt", "question\nq\n");
        let err = FileDataset.load_rows(file.path()).unwrap_err();
        assert!(matches!(err, DatasetError::UnsupportedFormat { .. }));
    }
}
