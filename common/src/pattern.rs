//! ブランド単位の表記パターン解析
//!
//! ## 判定手順
//! 1. 規格数が少ないブランドは判定しない（誤検出回避）
//! 2. 数値コード（`4510`, `4510SA` 等）が9割以上なら数値コード型
//! 3. それ以外はシェイプシグネチャの最頻値を基準表記とし、
//!    6割以上を占める場合のみ外れた表記を異常とする

use crate::config::AnalyzerConfig;
use crate::types::{BrandGroup, NUMERIC_PATTERN, PLACEHOLDER};
use regex::Regex;
use std::collections::HashMap;

lazy_static::lazy_static! {
    /// 数字+任意の英字のみ（数字は半角のみ）
    pub static ref NUMERIC_CODE_RE: Regex = Regex::new(r"^[0-9]+[A-Za-z]*$").unwrap();
    /// 数値トークン（小数点を含む、半角のみ）
    pub static ref NUMBER_RE: Regex = Regex::new(r"[0-9]+(?:\.[0-9]+)?").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// 数値コード形式か
pub fn is_numeric_code(size: &str) -> bool {
    NUMERIC_CODE_RE.is_match(size)
}

/// シェイプシグネチャを計算
///
/// 数値の連続（小数含む）をプレースホルダに置換し、空白を1つに畳む。
/// `"Φ3.5 x  10"` → `"Φ{N} x {N}"`
pub fn shape_signature(size: &str) -> String {
    let replaced = NUMBER_RE.replace_all(size, PLACEHOLDER);
    WHITESPACE_RE.replace_all(replaced.trim(), " ").into_owned()
}

/// 最頻値とその件数を取得（同数は初出優先）
pub fn find_dominant<'a>(values: impl Iterator<Item = &'a str>) -> Option<(&'a str, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for value in values {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for value in order {
        let count = counts[value];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best
}

/// ブランドの規格集合を解析して BrandGroup を構築
pub fn analyze_brand(brand: &str, sizes: Vec<String>, config: &AnalyzerConfig) -> BrandGroup {
    let mut group = BrandGroup {
        brand: brand.to_string(),
        ..Default::default()
    };

    if sizes.len() < config.min_brand_sizes {
        group.normal_samples = sizes.iter().take(config.small_brand_samples).cloned().collect();
        group.sizes = sizes;
        return group;
    }

    let total = sizes.len() as f64;
    let numeric_count = sizes.iter().filter(|s| is_numeric_code(s)).count();
    let numeric_ratio = numeric_count as f64 / total;

    if numeric_ratio >= config.numeric_code_ratio {
        group.is_numeric_code = true;
        group.dominant_pattern = NUMERIC_PATTERN.to_string();
        group.anomalous_sizes = sizes.iter().filter(|s| !is_numeric_code(s)).cloned().collect();
        group.normal_samples = sizes
            .iter()
            .filter(|s| is_numeric_code(s))
            .take(config.max_normal_samples)
            .cloned()
            .collect();
        tracing::debug!(brand, numeric_ratio, anomalies = group.anomalous_sizes.len(), "数値コード型");
        group.sizes = sizes;
        return group;
    }

    let signatures: Vec<String> = sizes.iter().map(|s| shape_signature(s)).collect();
    let Some((dominant, count)) = find_dominant(signatures.iter().map(|s| s.as_str())) else {
        group.sizes = sizes;
        return group;
    };
    group.dominant_pattern = dominant.to_string();

    if (count as f64) < config.dominance_ratio * total {
        // 表記がばらばらで基準を決められない
        tracing::debug!(brand, dominant, share = count as f64 / total, "基準表記の占有率不足");
        group.normal_samples = sizes.iter().take(config.max_normal_samples).cloned().collect();
        group.sizes = sizes;
        return group;
    }

    for (size, signature) in sizes.iter().zip(&signatures) {
        if signature.as_str() == dominant {
            if group.normal_samples.len() < config.max_normal_samples {
                group.normal_samples.push(size.clone());
            }
        } else {
            group.anomalous_sizes.insert(size.clone());
        }
    }

    tracing::debug!(brand, dominant, anomalies = group.anomalous_sizes.len(), "テンプレート型");
    group.sizes = sizes;
    group
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_numeric_code() {
        assert!(is_numeric_code("4510"));
        assert!(is_numeric_code("4510SA"));
        assert!(!is_numeric_code("SA4510"));
        assert!(!is_numeric_code("45-10"));
        assert!(!is_numeric_code(""));
        assert!(!is_numeric_code("４５１０"));
    }

    #[test]
    fn test_shape_signature() {
        assert_eq!(shape_signature("Φ3.5x8.5"), "Φ{N}x{N}");
        assert_eq!(shape_signature("Ø3.7x07mm"), "Ø{N}x{N}mm");
        assert_eq!(shape_signature("D 4.0   L 10"), "D {N} L {N}");
        assert_eq!(shape_signature("4510"), "{N}");
        // 全角数字はプレースホルダにしない
        assert_eq!(shape_signature("Φ４.５x10"), "Φ４.５x{N}");
    }

    #[test]
    fn test_find_dominant_tie_uses_first_seen() {
        let values = ["b", "a", "a", "b", "c"];
        assert_eq!(find_dominant(values.iter().copied()), Some(("b", 2)));
        assert_eq!(find_dominant(std::iter::empty()), None);
    }

    #[test]
    fn test_small_brand_never_flagged() {
        let group = analyze_brand("B", sizes(&["Φ3.5x10", "4510", "???"]), &AnalyzerConfig::default());
        assert!(group.anomalous_sizes.is_empty());
        assert_eq!(group.normal_samples.len(), 3);
        assert!(!group.is_numeric_code);
    }

    #[test]
    fn test_templated_brand() {
        let group = analyze_brand(
            "TSIII SA",
            sizes(&["Φ3.5x8.5", "Φ3.5x10", "Φ4.0x8.5", "4510"]),
            &AnalyzerConfig::default(),
        );
        assert!(!group.is_numeric_code);
        assert_eq!(group.dominant_pattern, "Φ{N}x{N}");
        assert_eq!(group.anomalous_sizes.len(), 1);
        assert!(group.is_anomalous("4510"));
        assert_eq!(group.normal_samples, sizes(&["Φ3.5x8.5", "Φ3.5x10", "Φ4.0x8.5"]));
    }

    #[test]
    fn test_numeric_code_brand() {
        let mut values: Vec<String> = (0..9).map(|i| format!("45{:02}", i + 10)).collect();
        values.push("45#10".to_string());
        let group = analyze_brand("Code", values, &AnalyzerConfig::default());
        assert!(group.is_numeric_code);
        assert_eq!(group.dominant_pattern, NUMERIC_PATTERN);
        assert!(group.is_anomalous("45#10"));
        assert_eq!(group.normal_samples.len(), 4);
    }

    #[test]
    fn test_numeric_ratio_below_threshold_is_templated() {
        // 4/5 = 80% < 90%
        let group = analyze_brand("Mixed", sizes(&["4510", "4511", "4512", "4513", "4.5x10"]), &AnalyzerConfig::default());
        assert!(!group.is_numeric_code);
        assert_eq!(group.dominant_pattern, "{N}");
        assert!(group.is_anomalous("4.5x10"));
    }

    #[test]
    fn test_inconsistent_brand_not_flagged() {
        // 最頻シグネチャ 2/5 = 40% < 60%
        let group = analyze_brand(
            "Chaos",
            sizes(&["Φ3.5x10", "Φ4x10", "3.5/10", "D3 L10", "S"]),
            &AnalyzerConfig::default(),
        );
        assert!(group.anomalous_sizes.is_empty());
    }

    #[test]
    fn test_anomalies_are_exact_signature_mismatches() {
        let values = sizes(&["3.5x10", "4x10", "4.5x12", "5x8", "5 X 8", "Φ5x8"]);
        let group = analyze_brand("B", values.clone(), &AnalyzerConfig::default());
        let expected: std::collections::HashSet<String> = values
            .iter()
            .filter(|s| shape_signature(s) != "{N}x{N}")
            .cloned()
            .collect();
        assert_eq!(group.anomalous_sizes, expected);
    }
}
