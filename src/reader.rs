//! スプレッドシート読み込み
//!
//! 全シートを読み、各シートの1行目をヘッダーとしてレコード化する。

use crate::error::{AuditError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value;
use size_audit_common::{
    ingest_records, AnalyzerConfig, ColumnAliases, FileMeta, ManufacturerGroup, RawRecord,
};
use std::path::Path;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// 対応形式か（拡張子で判定）
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or(false)
}

/// ファイル名とサイズ
pub fn file_meta(path: &Path) -> Result<FileMeta> {
    if !path.exists() {
        return Err(AuditError::FileNotFound(path.display().to_string()));
    }
    let metadata = std::fs::metadata(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(FileMeta {
        name,
        size: metadata.len(),
    })
}

/// 全シートをレコード列として読む
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        return Err(AuditError::FileNotFound(path.display().to_string()));
    }
    if !is_supported(path) {
        return Err(AuditError::UnsupportedFileType(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AuditError::SpreadsheetRead(format!("{}: {}", path.display(), e)))?;

    let mut records = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&sheet) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!(sheet = %sheet, error = %e, "シートを読めないためスキップ");
                continue;
            }
        };

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            continue;
        };
        let headers: Vec<String> = header_row.iter().map(|c| c.to_string().trim().to_string()).collect();

        let before = records.len();
        for row in rows {
            let mut record = RawRecord::new();
            for (header, cell) in headers.iter().zip(row) {
                if header.is_empty() {
                    continue;
                }
                let value = cell_value(cell);
                if !value.is_null() {
                    record.insert(header.clone(), value);
                }
            }
            if !record.is_empty() {
                records.push(record);
            }
        }
        tracing::debug!(sheet = %sheet, rows = records.len() - before, "シート読み込み");
    }

    Ok(records)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}

/// スプレッドシートを読み、グループ化・解析まで行う
pub fn read_catalog(
    path: &Path,
    aliases: &ColumnAliases,
    config: &AnalyzerConfig,
) -> Result<Vec<ManufacturerGroup>> {
    let records = read_records(path)?;
    let groups = ingest_records(&records, aliases, config);

    if groups.is_empty() {
        return Err(AuditError::NoCatalogRows(path.display().to_string()));
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        assert!(is_supported(Path::new("catalog.xlsx")));
        assert!(is_supported(Path::new("CATALOG.XLS")));
        assert!(is_supported(Path::new("a/b.ods")));
        assert!(!is_supported(Path::new("catalog.csv")));
        assert!(!is_supported(Path::new("catalog")));
    }

    #[test]
    fn test_cell_value() {
        assert_eq!(cell_value(&Data::Float(4510.0)), serde_json::json!(4510.0));
        assert_eq!(cell_value(&Data::String("Φ3.5x10".into())), serde_json::json!("Φ3.5x10"));
        assert!(cell_value(&Data::Empty).is_null());
    }
}
