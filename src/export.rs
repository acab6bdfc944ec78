//! 修正結果の受け渡し
//!
//! 承認済みの修正マップと元ファイルの参照を、後段の一括取り込み処理向けに
//! JSON / Excel で書き出す。

use crate::error::{AuditError, Result};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use size_audit_common::ItemKey;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 後段のデータ設定処理に渡す内容
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionHandoff {
    pub file: Option<PathBuf>,
    /// 異常なしの場合は None
    pub corrections: Option<BTreeMap<String, String>>,
    pub manual_fix: Vec<ItemKey>,
}

impl CorrectionHandoff {
    pub fn correction_count(&self) -> usize {
        self.corrections.as_ref().map(|c| c.len()).unwrap_or(0)
    }
}

pub fn write_json(handoff: &CorrectionHandoff, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(handoff)?;
    std::fs::write(output_path, json)?;
    Ok(())
}

/// 修正一覧と手作業対象をExcelに出力
pub fn write_xlsx(handoff: &CorrectionHandoff, output_path: &Path) -> Result<()> {
    let to_export = |e: rust_xlsxwriter::XlsxError| AuditError::Export(format!("Excel生成エラー: {}", e));

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("corrections").map_err(to_export)?;
    sheet.write_string_with_format(0, 0, "元の規格", &header).map_err(to_export)?;
    sheet.write_string_with_format(0, 1, "修正後", &header).map_err(to_export)?;
    if let Some(corrections) = &handoff.corrections {
        for (i, (original, corrected)) in corrections.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, original).map_err(to_export)?;
            sheet.write_string(row, 1, corrected).map_err(to_export)?;
        }
    }
    sheet.set_column_width(0, 24).map_err(to_export)?;
    sheet.set_column_width(1, 24).map_err(to_export)?;

    let manual = workbook.add_worksheet();
    manual.set_name("manual_fix").map_err(to_export)?;
    for (col, title) in ["製造社", "ブランド", "規格"].iter().enumerate() {
        manual.write_string_with_format(0, col as u16, *title, &header).map_err(to_export)?;
    }
    for (i, key) in handoff.manual_fix.iter().enumerate() {
        let row = i as u32 + 1;
        manual.write_string(row, 0, &key.manufacturer).map_err(to_export)?;
        manual.write_string(row, 1, &key.brand).map_err(to_export)?;
        manual.write_string(row, 2, &key.size).map_err(to_export)?;
    }

    workbook.save(output_path).map_err(to_export)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handoff() -> CorrectionHandoff {
        let mut corrections = BTreeMap::new();
        corrections.insert("4510".to_string(), "Φ4.5x10".to_string());
        CorrectionHandoff {
            file: Some(PathBuf::from("catalog.xlsx")),
            corrections: Some(corrections),
            manual_fix: vec![ItemKey::new("M", "B", "FREE")],
        }
    }

    #[test]
    fn test_write_json_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("corrections.json");
        write_json(&handoff(), &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["corrections"]["4510"], "Φ4.5x10");
        assert_eq!(value["manualFix"][0]["size"], "FREE");
        assert_eq!(value["file"], "catalog.xlsx");
    }

    #[test]
    fn test_write_xlsx_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        write_xlsx(&handoff(), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_correction_count_without_map() {
        assert_eq!(CorrectionHandoff::default().correction_count(), 0);
    }
}
