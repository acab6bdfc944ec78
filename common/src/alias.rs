//! 列名エイリアスモジュール
//!
//! 製造社・ブランド・規格・未使用フラグの列名ゆれ（韓国語/英語）を吸収する。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 取り込み対象の論理列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Manufacturer,
    Brand,
    Size,
    Unused,
}

/// 列名エイリアス定義
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnAliases {
    #[serde(default)]
    pub manufacturer: Vec<String>,
    #[serde(default)]
    pub brand: Vec<String>,
    #[serde(default)]
    pub size: Vec<String>,
    #[serde(default)]
    pub unused: Vec<String>,
}

impl ColumnAliases {
    /// 組み込みプリセットを取得
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "korean" | "ko" | "한국어" => Some(Self::korean_preset()),
            "english" | "en" => Some(Self::english_preset()),
            "default" => Some(Self::default_preset()),
            _ => None,
        }
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.is_empty() {
            return Err(Error::Config("エイリアス定義が空です".into()));
        }
        Ok(config)
    }

    /// 韓国語の列名
    fn korean_preset() -> Self {
        Self {
            manufacturer: vec!["제조사".into(), "제조회사".into(), "제조사명".into()],
            brand: vec!["브랜드".into(), "브랜드명".into(), "제품명".into()],
            size: vec!["규격".into(), "사이즈".into(), "크기".into()],
            unused: vec!["미사용".into(), "사용안함".into()],
        }
    }

    /// 英語の列名
    fn english_preset() -> Self {
        Self {
            manufacturer: vec!["manufacturer".into(), "maker".into(), "vendor".into()],
            brand: vec!["brand".into(), "product".into()],
            size: vec!["size".into(), "spec".into()],
            unused: vec!["unused".into(), "inactive".into()],
        }
    }

    /// 韓国語+英語
    fn default_preset() -> Self {
        let mut config = Self::korean_preset();
        config.merge(&Self::english_preset());
        config
    }

    fn is_empty(&self) -> bool {
        self.manufacturer.is_empty()
            && self.brand.is_empty()
            && self.size.is_empty()
            && self.unused.is_empty()
    }

    fn aliases(&self, column: Column) -> &[String] {
        match column {
            Column::Manufacturer => &self.manufacturer,
            Column::Brand => &self.brand,
            Column::Size => &self.size,
            Column::Unused => &self.unused,
        }
    }

    /// 設定をマージ（後から追加した設定を先に照合）
    pub fn merge(&mut self, other: &ColumnAliases) {
        fn prepend(base: &mut Vec<String>, extra: &[String]) {
            let mut merged: Vec<String> = extra.to_vec();
            merged.extend(base.drain(..).filter(|a| !extra.contains(a)));
            *base = merged;
        }
        prepend(&mut self.manufacturer, &other.manufacturer);
        prepend(&mut self.brand, &other.brand);
        prepend(&mut self.size, &other.size);
        prepend(&mut self.unused, &other.unused);
    }

    /// ヘッダー一覧から論理列に対応する列名を探す
    ///
    /// 1. 完全一致
    /// 2. 空白・大文字小文字を無視した一致
    /// 3. ヘッダーに含まれるエイリアスの最長マッチ
    pub fn resolve<'a, I>(&self, column: Column, headers: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        let aliases = self.aliases(column);

        for alias in aliases {
            if let Some(h) = headers.clone().into_iter().find(|h| *h == alias.as_str()) {
                return Some(h);
            }
        }

        for alias in aliases {
            let wanted = fold(alias);
            if let Some(h) = headers.clone().into_iter().find(|h| fold(h) == wanted) {
                return Some(h);
            }
        }

        let mut best_match: Option<(&'a str, usize)> = None;
        for header in headers {
            let folded = fold(header);
            for alias in aliases {
                let a = fold(alias);
                if !a.is_empty()
                    && folded.contains(&a)
                    && best_match.map_or(true, |(_, len)| a.len() > len)
                {
                    best_match = Some((header, a.len()));
                }
            }
        }
        best_match.map(|(h, _)| h)
    }
}

fn fold(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_korean_preset() {
        let config = ColumnAliases::from_preset("korean").unwrap();
        assert!(config.manufacturer.contains(&"제조사".to_string()));
        assert!(config.size.contains(&"규격".to_string()));
    }

    #[test]
    fn test_unknown_preset() {
        assert!(ColumnAliases::from_preset("klingon").is_none());
    }

    #[test]
    fn test_resolve_exact_match() {
        let config = ColumnAliases::from_preset("default").unwrap();
        let headers = ["제조사", "브랜드", "규격"];
        assert_eq!(config.resolve(Column::Manufacturer, headers), Some("제조사"));
        assert_eq!(config.resolve(Column::Size, headers), Some("규격"));
        assert_eq!(config.resolve(Column::Unused, headers), None);
    }

    #[test]
    fn test_resolve_case_and_space_insensitive() {
        let config = ColumnAliases::from_preset("english").unwrap();
        let headers = ["Manufacturer ", "BRAND", "Size"];
        assert_eq!(config.resolve(Column::Manufacturer, headers), Some("Manufacturer "));
        assert_eq!(config.resolve(Column::Brand, headers), Some("BRAND"));
    }

    #[test]
    fn test_resolve_partial_longest_match() {
        let config = ColumnAliases::from_preset("default").unwrap();
        let headers = ["제품 규격(mm)", "비고"];
        assert_eq!(config.resolve(Column::Size, headers), Some("제품 규격(mm)"));
    }

    #[test]
    fn test_merge_custom_first() {
        let mut config = ColumnAliases::from_preset("korean").unwrap();
        let custom = ColumnAliases::from_json(r#"{"size": ["치수"]}"#).unwrap();
        config.merge(&custom);
        assert_eq!(config.size[0], "치수");
        assert!(config.size.contains(&"규격".to_string()));
    }

    #[test]
    fn test_from_json_empty_is_error() {
        assert!(matches!(ColumnAliases::from_json("{}"), Err(Error::Config(_))));
    }
}
