//! スプレッドシート読み込みテスト
//!
//! rust_xlsxwriter で作ったブックを読み込み、グループ化まで検証

use rust_xlsxwriter::Workbook;
use size_audit::error::AuditError;
use size_audit::reader;
use size_audit_common::{AnalyzerConfig, ColumnAliases};
use std::path::Path;
use tempfile::tempdir;

fn aliases() -> ColumnAliases {
    ColumnAliases::from_preset("default").expect("default preset")
}

/// 韓国語ヘッダーのシートと英語ヘッダーのシートを持つブック
fn write_catalog(path: &Path) {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    for (col, title) in ["제조사", "브랜드", "규격", "미사용"].iter().enumerate() {
        sheet.write_string(0, col as u16, *title).unwrap();
    }
    let rows = [
        ("OSSTEM", "TSIII SA", "Φ3.5x8.5", ""),
        ("OSSTEM", "TSIII SA", "Φ3.5x10", ""),
        ("OSSTEM", "TSIII SA", "Φ4.0x8.5", ""),
        ("OSSTEM", "TSIII SA", "Φ9.9x99", "v"),
    ];
    for (i, (m, b, s, unused)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, *m).unwrap();
        sheet.write_string(row, 1, *b).unwrap();
        sheet.write_string(row, 2, *s).unwrap();
        if !unused.is_empty() {
            sheet.write_string(row, 3, *unused).unwrap();
        }
    }
    // 数値セルとして書かれた規格
    sheet.write_string(5, 0, "OSSTEM").unwrap();
    sheet.write_string(5, 1, "TSIII SA").unwrap();
    sheet.write_number(5, 2, 4510).unwrap();

    let sheet = workbook.add_worksheet();
    for (col, title) in ["Manufacturer", "Brand", "Size"].iter().enumerate() {
        sheet.write_string(0, col as u16, *title).unwrap();
    }
    sheet.write_string(1, 0, "Dentium").unwrap();
    sheet.write_string(1, 1, "SuperLine").unwrap();
    sheet.write_string(1, 2, "3.6x10").unwrap();

    workbook.save(path).unwrap();
}

#[test]
fn test_read_catalog_all_sheets() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.xlsx");
    write_catalog(&path);

    let groups = reader::read_catalog(&path, &aliases(), &AnalyzerConfig::default()).unwrap();
    assert_eq!(groups.len(), 2);

    let osstem = &groups[0];
    assert_eq!(osstem.manufacturer, "OSSTEM");
    // 未使用行は除外
    assert_eq!(osstem.total, 4);
    let brand = &osstem.brands[0];
    assert!(brand.sizes.contains(&"4510".to_string()));
    assert!(brand.is_anomalous("4510"));
    assert!(!brand.sizes.contains(&"Φ9.9x99".to_string()));

    assert_eq!(groups[1].manufacturer, "Dentium");
    assert_eq!(groups[1].anomalous_count, 0);
}

#[test]
fn test_file_meta() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.xlsx");
    write_catalog(&path);

    let meta = reader::file_meta(&path).unwrap();
    assert_eq!(meta.name, "catalog.xlsx");
    assert_eq!(meta.size, std::fs::metadata(&path).unwrap().len());
}

#[test]
fn test_missing_file() {
    let result = reader::read_catalog(
        Path::new("/nonexistent/catalog.xlsx"),
        &aliases(),
        &AnalyzerConfig::default(),
    );
    assert!(matches!(result, Err(AuditError::FileNotFound(_))));
    assert!(matches!(
        reader::file_meta(Path::new("/nonexistent/catalog.xlsx")),
        Err(AuditError::FileNotFound(_))
    ));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalog.csv");
    std::fs::write(&path, "manufacturer,brand,size\nA,B,1\n").unwrap();

    let result = reader::read_catalog(&path, &aliases(), &AnalyzerConfig::default());
    assert!(matches!(result, Err(AuditError::UnsupportedFileType(_))));
}

#[test]
fn test_no_catalog_rows() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("other.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "이름").unwrap();
    sheet.write_string(0, 1, "전화번호").unwrap();
    sheet.write_string(1, 0, "홍길동").unwrap();
    sheet.write_string(1, 1, "010-0000-0000").unwrap();
    workbook.save(&path).unwrap();

    let result = reader::read_catalog(&path, &aliases(), &AnalyzerConfig::default());
    assert!(matches!(result, Err(AuditError::NoCatalogRows(_))));
}
