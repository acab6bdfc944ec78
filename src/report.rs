//! 解析結果の表示とJSONレポート

use crate::error::Result;
use serde::Serialize;
use size_audit_common::{HealthReport, ItemKey, ReviewState};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyEntry {
    pub size: String,
    pub diagnosis: String,
    pub suggestion: Option<String>,
    pub correctable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSummary {
    pub brand: String,
    pub size_count: usize,
    pub pattern: String,
    pub is_numeric_code: bool,
    pub anomalies: Vec<AnomalyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerSummary {
    pub manufacturer: String,
    pub total: usize,
    pub anomalous_count: usize,
    pub brands: Vec<BrandSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub file_name: String,
    pub health_score: u8,
    pub total: usize,
    pub anomalous_count: usize,
    pub has_failure_marker: bool,
    pub has_insurance_marker: bool,
    pub manufacturers: Vec<ManufacturerSummary>,
}

impl AuditReport {
    pub fn build(file_name: &str, state: &ReviewState, health: &HealthReport) -> Self {
        let manufacturers = state
            .groups()
            .iter()
            .map(|m| ManufacturerSummary {
                manufacturer: m.manufacturer.clone(),
                total: m.total,
                anomalous_count: m.anomalous_count,
                brands: m
                    .brands
                    .iter()
                    .map(|b| BrandSummary {
                        brand: b.brand.clone(),
                        size_count: b.sizes.len(),
                        pattern: b.dominant_pattern.clone(),
                        is_numeric_code: b.is_numeric_code,
                        anomalies: b
                            .anomalies()
                            .filter_map(|size| {
                                state.item(&ItemKey::new(&m.manufacturer, &b.brand, size))
                            })
                            .map(|item| AnomalyEntry {
                                size: item.key.size,
                                diagnosis: item.diagnosis.to_string(),
                                suggestion: item.preview,
                                correctable: item.correctable,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            file_name: file_name.to_string(),
            health_score: health.score,
            total: health.total,
            anomalous_count: state.anomaly_keys().len(),
            has_failure_marker: health.has_failure_marker,
            has_insurance_marker: health.has_insurance_marker,
            manufacturers,
        }
    }

    pub fn print(&self) {
        println!("ファイル: {}", self.file_name);
        println!("規格数: {}  異常: {}件", self.total, self.anomalous_count);
        println!("---");

        for m in &self.manufacturers {
            println!("{} ({}件, 異常{}件)", m.manufacturer, m.total, m.anomalous_count);
            for b in m.brands.iter().filter(|b| !b.anomalies.is_empty()) {
                let pattern = if b.is_numeric_code { "数値コード" } else { b.pattern.as_str() };
                println!("  {} [{}] {}件", b.brand, pattern, b.size_count);
                for a in &b.anomalies {
                    match &a.suggestion {
                        Some(s) => println!("    ✗ {} → {}  {}", a.size, s, a.diagnosis),
                        None => println!("    ✗ {}  {}", a.size, a.diagnosis),
                    }
                }
            }
        }

        println!("---");
        println!("健全性スコア: {}", self.health_score);
        if !self.has_failure_marker {
            println!("  ⚠ 不良・交換カテゴリの行がありません");
        }
        if !self.has_insurance_marker {
            println!("  ⚠ 保険請求カテゴリの行がありません");
        }
    }

    pub fn write_json(&self, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(output_path, json)?;
        Ok(())
    }
}
