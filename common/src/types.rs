//! カタログ規格監査の型定義
//!
//! - CatalogRow: 行パーサーから受け取る1行分の生データ
//! - BrandGroup / ManufacturerGroup: 取り込み・解析後のグループ構造
//! - ItemKey / ConversionEdit: レビュー中の修正案

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 数値コード型ブランドの dominant_pattern
pub const NUMERIC_PATTERN: &str = "numeric";

/// シェイプシグネチャ内の数値プレースホルダ
pub const PLACEHOLDER: &str = "{N}";

/// 行パーサーから受け取る1行
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRow {
    pub manufacturer: String,
    pub brand: String,
    pub size: String,
    pub unused: bool,
}

/// ブランド単位の規格集合と解析結果
///
/// 取り込み時に一度だけ作られ、以後は変更しない。
/// 修正内容はレビュー状態側で別管理する。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrandGroup {
    pub brand: String,
    /// 重複なしの規格（初出順）
    pub sizes: Vec<String>,
    /// sizes の部分集合
    pub anomalous_sizes: HashSet<String>,
    pub is_numeric_code: bool,
    pub dominant_pattern: String,
    /// 正常表記のサンプル（最大4件）
    pub normal_samples: Vec<String>,
}

impl BrandGroup {
    /// 異常規格を sizes の順序で列挙
    pub fn anomalies(&self) -> impl Iterator<Item = &str> {
        self.sizes
            .iter()
            .filter(|s| self.anomalous_sizes.contains(s.as_str()))
            .map(|s| s.as_str())
    }

    pub fn is_anomalous(&self, size: &str) -> bool {
        self.anomalous_sizes.contains(size)
    }

    /// 修正の雛形に使う正常サンプル
    pub fn template_sample(&self) -> Option<&str> {
        self.normal_samples.first().map(|s| s.as_str())
    }

    /// dominant_pattern が示す数値スロット数
    pub fn component_count(&self) -> usize {
        component_count(&self.dominant_pattern)
    }
}

/// パターン文字列の数値スロット数
///
/// 数値コード型はコード1つを1スロットとして数える。
pub fn component_count(pattern: &str) -> usize {
    if pattern == NUMERIC_PATTERN {
        1
    } else {
        pattern.matches(PLACEHOLDER).count()
    }
}

/// 製造社単位のグループ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManufacturerGroup {
    pub manufacturer: String,
    /// 規格数の降順
    pub brands: Vec<BrandGroup>,
    /// 全ブランドの規格数合計
    pub total: usize,
    pub anomalous_count: usize,
}

/// レビュー対象1件を指す複合キー
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub manufacturer: String,
    pub brand: String,
    pub size: String,
}

impl ItemKey {
    pub fn new(manufacturer: &str, brand: &str, size: &str) -> Self {
        Self {
            manufacturer: manufacturer.to_string(),
            brand: brand.to_string(),
            size: size.to_string(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.manufacturer, self.brand, self.size)
    }
}

/// 修正案の編集対象フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditField {
    /// 直径（数値コード型ではコード本体）
    D,
    /// 長さ
    L,
    /// カフ
    C,
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditField::D => write!(f, "D"),
            EditField::L => write!(f, "L"),
            EditField::C => write!(f, "C"),
        }
    }
}

/// 異常規格1件に対する修正案
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionEdit {
    pub d: String,
    pub l: String,
    pub c: String,
    pub component_count: usize,
}

impl ConversionEdit {
    pub fn get(&self, field: EditField) -> &str {
        match field {
            EditField::D => &self.d,
            EditField::L => &self.l,
            EditField::C => &self.c,
        }
    }

    pub fn set(&mut self, field: EditField, value: String) {
        match field {
            EditField::D => self.d = value,
            EditField::L => self.l = value,
            EditField::C => self.c = value,
        }
    }
}

/// 選択ファイルの同一性判定に使うメタデータ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_count() {
        assert_eq!(component_count("Φ{N}x{N}"), 2);
        assert_eq!(component_count("D{N} L{N} C{N}"), 3);
        assert_eq!(component_count(NUMERIC_PATTERN), 1);
        assert_eq!(component_count("FREE"), 0);
    }

    #[test]
    fn test_item_key_display() {
        let key = ItemKey::new("OSSTEM", "TSIII SA", "4510");
        assert_eq!(key.to_string(), "OSSTEM:TSIII SA:4510");
    }

    #[test]
    fn test_brand_anomalies_keep_size_order() {
        let group = BrandGroup {
            brand: "B".into(),
            sizes: vec!["a".into(), "b".into(), "c".into()],
            anomalous_sizes: ["c".to_string(), "a".to_string()].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(group.anomalies().collect::<Vec<_>>(), vec!["a", "c"]);
    }
}
