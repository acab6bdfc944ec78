//! データ健全性スコア（0〜100）
//!
//! - 未承認の異常が残る間は最大99
//! - 不良・交換カテゴリ、保険請求カテゴリの行が無ければ最大85

use crate::config::AnalyzerConfig;
use crate::types::ManufacturerGroup;
use crate::workflow::ReviewState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub score: u8,
    pub total: usize,
    pub anomalous_remaining: usize,
    pub has_failure_marker: bool,
    pub has_insurance_marker: bool,
}

/// スコアを計算
pub fn health_score(
    total: usize,
    anomalous_remaining: usize,
    has_failure_marker: bool,
    has_insurance_marker: bool,
) -> u8 {
    let raw = if total == 0 {
        100.0
    } else {
        let clean = total.saturating_sub(anomalous_remaining) as f64;
        (100.0 * clean / total as f64).round()
    };
    let mut score = raw.clamp(0.0, 100.0) as u8;

    if anomalous_remaining > 0 {
        score = score.min(99);
    }
    if !(has_failure_marker && has_insurance_marker) {
        score = score.min(85);
    }
    score
}

/// 製造社名・ブランド名にキーワードを含むグループがあるか
pub fn has_marker(groups: &[ManufacturerGroup], keywords: &[String]) -> bool {
    let matches = |name: &str| {
        let lower = name.to_lowercase();
        keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
    };
    groups
        .iter()
        .any(|m| matches(&m.manufacturer) || m.brands.iter().any(|b| matches(&b.brand)))
}

/// レビュー状態から健全性を評価
pub fn evaluate(state: &ReviewState, config: &AnalyzerConfig) -> HealthReport {
    let groups = state.groups();
    let total = groups.iter().map(|m| m.total).sum();
    let anomalous_remaining = state.anomalous_remaining();
    let has_failure_marker = has_marker(groups, &config.failure_keywords);
    let has_insurance_marker = has_marker(groups, &config.insurance_keywords);

    HealthReport {
        score: health_score(total, anomalous_remaining, has_failure_marker, has_insurance_marker),
        total,
        anomalous_remaining,
        has_failure_marker,
        has_insurance_marker,
    }
}
