//! セッションスナップショット
//!
//! ReviewState は HashSet / HashMap を含むため、そのまま汎用シリアライザに渡さず、
//! 集合は配列、マップは (キー, 値) の配列に明示的に変換してから保存する。
//! ファイルハンドルは保存できないので、代わりにファイル名とサイズを持つ。

use crate::error::{Error, Result};
use crate::types::{BrandGroup, ConversionEdit, FileMeta, ItemKey, ManufacturerGroup};
use crate::workflow::ReviewState;
use serde::{Deserialize, Serialize};

/// 保存形式のバージョン
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandRecord {
    pub brand: String,
    pub sizes: Vec<String>,
    pub anomalous_sizes: Vec<String>,
    pub is_numeric_code: bool,
    pub dominant_pattern: String,
    pub normal_samples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerRecord {
    pub manufacturer: String,
    pub brands: Vec<BrandRecord>,
    pub total: usize,
    pub anomalous_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub version: u32,
    pub file_name: String,
    pub file_size: u64,
    #[serde(default)]
    pub saved_at: Option<String>,
    pub groups: Vec<ManufacturerRecord>,
    pub approved: Vec<ItemKey>,
    pub edits: Vec<(ItemKey, ConversionEdit)>,
    pub current_brand_idx: usize,
}

impl From<&BrandGroup> for BrandRecord {
    fn from(group: &BrandGroup) -> Self {
        // 集合 → 配列（sizes の順序に揃える）
        let anomalous_sizes = group.anomalies().map(str::to_string).collect();
        Self {
            brand: group.brand.clone(),
            sizes: group.sizes.clone(),
            anomalous_sizes,
            is_numeric_code: group.is_numeric_code,
            dominant_pattern: group.dominant_pattern.clone(),
            normal_samples: group.normal_samples.clone(),
        }
    }
}

impl TryFrom<BrandRecord> for BrandGroup {
    type Error = Error;

    fn try_from(record: BrandRecord) -> Result<Self> {
        if let Some(stray) = record.anomalous_sizes.iter().find(|s| !record.sizes.contains(*s)) {
            return Err(Error::Parse(format!(
                "ブランド {} の異常規格 {} が規格一覧にありません",
                record.brand, stray
            )));
        }
        Ok(Self {
            brand: record.brand,
            anomalous_sizes: record.anomalous_sizes.into_iter().collect(),
            sizes: record.sizes,
            is_numeric_code: record.is_numeric_code,
            dominant_pattern: record.dominant_pattern,
            normal_samples: record.normal_samples,
        })
    }
}

impl From<&ManufacturerGroup> for ManufacturerRecord {
    fn from(group: &ManufacturerGroup) -> Self {
        Self {
            manufacturer: group.manufacturer.clone(),
            brands: group.brands.iter().map(BrandRecord::from).collect(),
            total: group.total,
            anomalous_count: group.anomalous_count,
        }
    }
}

impl TryFrom<ManufacturerRecord> for ManufacturerGroup {
    type Error = Error;

    fn try_from(record: ManufacturerRecord) -> Result<Self> {
        Ok(Self {
            manufacturer: record.manufacturer,
            brands: record
                .brands
                .into_iter()
                .map(BrandGroup::try_from)
                .collect::<Result<Vec<_>>>()?,
            total: record.total,
            anomalous_count: record.anomalous_count,
        })
    }
}

impl SessionSnapshot {
    /// レビュー状態を保存形式に変換
    pub fn capture(state: &ReviewState, file: &FileMeta) -> Self {
        let mut approved: Vec<ItemKey> = state.approved().iter().cloned().collect();
        approved.sort();

        let mut edits: Vec<(ItemKey, ConversionEdit)> = state
            .edits()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        edits.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            version: SNAPSHOT_VERSION,
            file_name: file.name.clone(),
            file_size: file.size,
            saved_at: None,
            groups: state.groups().iter().map(ManufacturerRecord::from).collect(),
            approved,
            edits,
            current_brand_idx: state.current_brand_idx(),
        }
    }

    pub fn file_meta(&self) -> FileMeta {
        FileMeta {
            name: self.file_name.clone(),
            size: self.file_size,
        }
    }

    /// 保存形式からレビュー状態を復元
    pub fn restore(self) -> Result<ReviewState> {
        if self.version != SNAPSHOT_VERSION {
            return Err(Error::Parse(format!(
                "スナップショットのバージョン不一致: {} (期待値 {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        let groups = self
            .groups
            .into_iter()
            .map(ManufacturerGroup::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(ReviewState::new(groups).with_progress(self.approved, self.edits, self.current_brand_idx))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// 新しく選択したファイルで前回のレビュー結果を引き継ぐか
///
/// ファイル名とサイズが一致すれば同じファイルの再選択とみなす。
pub fn preserve_review(previous: Option<&FileMeta>, selected: &FileMeta) -> bool {
    previous.is_some_and(|p| p == selected)
}

/// 解析し直したグループに、同じファイルであれば前回の進捗を載せる
pub fn resume_review(
    groups: Vec<ManufacturerGroup>,
    previous: Option<SessionSnapshot>,
    selected: &FileMeta,
) -> ReviewState {
    let fresh = ReviewState::new(groups);
    match previous {
        Some(snapshot) if preserve_review(Some(&snapshot.file_meta()), selected) => {
            tracing::info!(file = %selected.name, "前回のレビュー結果を引き継ぎます");
            fresh.with_progress(snapshot.approved, snapshot.edits, snapshot.current_brand_idx)
        }
        Some(_) => {
            tracing::info!(file = %selected.name, "別ファイルのため前回のレビュー結果を破棄します");
            fresh
        }
        None => fresh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::ingest::group_rows;
    use crate::types::{CatalogRow, EditField};
    use crate::workflow::ReviewAction;
    use std::collections::HashSet;

    fn groups() -> Vec<ManufacturerGroup> {
        let mut rows: Vec<CatalogRow> = ["Φ3.5x8.5", "Φ3.5x10", "Φ4.0x8.5", "4510"]
            .iter()
            .map(|s| CatalogRow {
                manufacturer: "OSSTEM".into(),
                brand: "TSIII SA".into(),
                size: s.to_string(),
                unused: false,
            })
            .collect();
        rows.extend(["3.5x10", "4x10", "4.5x12", "3710", "3.5/12"].iter().map(|s| CatalogRow {
            manufacturer: "Dentium".into(),
            brand: "SuperLine".into(),
            size: s.to_string(),
            unused: false,
        }));
        group_rows(&rows, &AnalyzerConfig::default())
    }

    fn meta() -> FileMeta {
        FileMeta {
            name: "catalog.xlsx".into(),
            size: 2048,
        }
    }

    fn reviewed_state() -> ReviewState {
        ReviewState::new(groups())
            .dispatch(ReviewAction::ToggleApprove(ItemKey::new("OSSTEM", "TSIII SA", "4510")))
            .dispatch(ReviewAction::UpdateEdit {
                key: ItemKey::new("Dentium", "SuperLine", "3.5/12"),
                field: EditField::L,
                value: "12".into(),
            })
            .dispatch(ReviewAction::Next)
    }

    #[test]
    fn test_round_trip_preserves_collections() {
        let state = reviewed_state();
        let json = SessionSnapshot::capture(&state, &meta()).to_json().unwrap();
        let restored = SessionSnapshot::from_json(&json).unwrap().restore().unwrap();

        assert_eq!(restored.approved(), state.approved());
        assert_eq!(restored.edits(), state.edits());
        assert_eq!(restored.current_brand_idx(), state.current_brand_idx());
        for (a, b) in restored.groups().iter().zip(state.groups()) {
            for (x, y) in a.brands.iter().zip(&b.brands) {
                assert_eq!(x.anomalous_sizes, y.anomalous_sizes);
            }
        }
        assert_eq!(restored, state);
    }

    #[test]
    fn test_sets_are_stored_as_arrays() {
        let snapshot = SessionSnapshot::capture(&reviewed_state(), &meta());
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert!(value["approved"].is_array());
        assert!(value["edits"][0].is_array());
        assert!(value["groups"][0]["brands"][0]["anomalousSizes"].is_array());
        assert_eq!(value["fileName"], "catalog.xlsx");
        assert_eq!(value["fileSize"], 2048);
    }

    #[test]
    fn test_restore_rejects_version_mismatch() {
        let mut snapshot = SessionSnapshot::capture(&reviewed_state(), &meta());
        snapshot.version = 99;
        assert!(matches!(snapshot.restore(), Err(Error::Parse(_))));
    }

    #[test]
    fn test_restore_rejects_anomaly_outside_sizes() {
        let mut snapshot = SessionSnapshot::capture(&reviewed_state(), &meta());
        snapshot.groups[0].brands[0].anomalous_sizes.push("ghost".into());
        assert!(snapshot.restore().is_err());
    }

    #[test]
    fn test_preserve_review_same_file_only() {
        let m = meta();
        assert!(preserve_review(Some(&m), &m));
        assert!(!preserve_review(None, &m));
        let resized = FileMeta { size: 1, ..meta() };
        assert!(!preserve_review(Some(&m), &resized));
    }

    #[test]
    fn test_resume_review_keeps_progress_for_same_file() {
        let snapshot = SessionSnapshot::capture(&reviewed_state(), &meta());
        let resumed = resume_review(groups(), Some(snapshot), &meta());
        assert_eq!(resumed.approved().len(), 1);
        assert_eq!(resumed.edits().len(), 1);
    }

    #[test]
    fn test_resume_review_discards_for_other_file() {
        let snapshot = SessionSnapshot::capture(&reviewed_state(), &meta());
        let other = FileMeta {
            name: "other.xlsx".into(),
            size: 2048,
        };
        let resumed = resume_review(groups(), Some(snapshot), &other);
        assert!(resumed.approved().is_empty());
        assert!(resumed.edits().is_empty());
        assert_eq!(resumed.current_brand_idx(), 0);
    }

    #[test]
    fn test_approved_order_insensitive() {
        let state = reviewed_state();
        let snapshot = SessionSnapshot::capture(&state, &meta());
        let as_set: HashSet<ItemKey> = snapshot.approved.into_iter().collect();
        assert_eq!(&as_set, state.approved());
    }
}
