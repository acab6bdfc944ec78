//! カタログ行の取り込み
//!
//! 行パーサーの出力（列名→値のレコード）を CatalogRow に変換し、
//! 製造社 → ブランド → 規格集合 の構造に畳み込む。

use crate::alias::{Column, ColumnAliases};
use crate::config::AnalyzerConfig;
use crate::pattern::analyze_brand;
use crate::types::{BrandGroup, CatalogRow, ManufacturerGroup};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// 行パーサーが返す1レコード
pub type RawRecord = Map<String, Value>;

/// レコード列を CatalogRow に変換
///
/// 製造社・ブランド・規格のいずれも取れないレコードは捨てない
/// （空文字のまま返し、group_rows 側で除外する）。
pub fn records_to_rows(records: &[RawRecord], aliases: &ColumnAliases) -> Vec<CatalogRow> {
    records
        .iter()
        .map(|record| {
            let headers: Vec<&str> = record.keys().map(|k| k.as_str()).collect();
            let field = |column: Column| {
                aliases
                    .resolve(column, headers.iter().copied())
                    .and_then(|h| record.get(h))
            };

            CatalogRow {
                manufacturer: field(Column::Manufacturer).map(cell_text).unwrap_or_default(),
                brand: field(Column::Brand).map(cell_text).unwrap_or_default(),
                size: field(Column::Size).map(cell_text).unwrap_or_default(),
                unused: field(Column::Unused).map(is_unused_flag).unwrap_or(false),
            }
        })
        .collect()
}

/// セル値を文字列化（整数値は小数点なし）
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                    Some(f) => f.to_string(),
                    None => n.to_string(),
                }
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 未使用フラグ（true または "v"）
fn is_unused_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("v"),
        _ => false,
    }
}

/// 行をグループ化して解析する
///
/// - 製造社・ブランド・規格が欠けた行、未使用行は除外
/// - 規格はブランド内で重複除去（初出順を保持）
/// - 製造社は規格総数の降順、ブランドは規格数の降順（同数は初出順）
pub fn group_rows(rows: &[CatalogRow], config: &AnalyzerConfig) -> Vec<ManufacturerGroup> {
    struct Pending<'a> {
        manufacturer: &'a str,
        brands: Vec<(&'a str, Vec<String>, HashSet<&'a str>)>,
        brand_index: HashMap<&'a str, usize>,
    }

    let mut pending: Vec<Pending> = Vec::new();
    let mut manufacturer_index: HashMap<&str, usize> = HashMap::new();
    let mut dropped = 0usize;

    for row in rows {
        if row.unused || row.manufacturer.is_empty() || row.brand.is_empty() || row.size.is_empty() {
            dropped += 1;
            continue;
        }

        let mi = *manufacturer_index
            .entry(row.manufacturer.as_str())
            .or_insert_with(|| {
                pending.push(Pending {
                    manufacturer: row.manufacturer.as_str(),
                    brands: Vec::new(),
                    brand_index: HashMap::new(),
                });
                pending.len() - 1
            });
        let Pending { brands, brand_index, .. } = &mut pending[mi];

        let bi = *brand_index.entry(row.brand.as_str()).or_insert_with(|| {
            brands.push((row.brand.as_str(), Vec::new(), HashSet::new()));
            brands.len() - 1
        });
        let (_, sizes, seen) = &mut brands[bi];
        if seen.insert(row.size.as_str()) {
            sizes.push(row.size.clone());
        }
    }

    tracing::debug!(kept = rows.len() - dropped, dropped, "カタログ行を取り込み");

    let mut groups: Vec<ManufacturerGroup> = pending
        .into_iter()
        .map(|m| {
            let mut brands: Vec<BrandGroup> = m
                .brands
                .into_iter()
                .map(|(brand, sizes, _)| analyze_brand(brand, sizes, config))
                .collect();
            brands.sort_by(|a, b| b.sizes.len().cmp(&a.sizes.len()));

            let total = brands.iter().map(|b| b.sizes.len()).sum();
            let anomalous_count = brands.iter().map(|b| b.anomalous_sizes.len()).sum();

            ManufacturerGroup {
                manufacturer: m.manufacturer.to_string(),
                brands,
                total,
                anomalous_count,
            }
        })
        .collect();

    groups.sort_by(|a, b| b.total.cmp(&a.total));
    groups
}

/// レコード列から直接グループを構築
pub fn ingest_records(
    records: &[RawRecord],
    aliases: &ColumnAliases,
    config: &AnalyzerConfig,
) -> Vec<ManufacturerGroup> {
    let rows = records_to_rows(records, aliases);
    group_rows(&rows, config)
}
