//! レビューワークフロー
//!
//! 異常規格ごとの承認状態と修正案、ブランド単位のカーソルを保持する。
//! 遷移は `dispatch` のみで行い、常に新しい状態を返す（元の状態は変更しない）。
//!
//! ## 承認状態
//! - 未承認（初期値）
//! - 承認済み: 現在の修正案を確定として扱う
//!
//! 修正案を編集すると承認は必ず取り消される。

use crate::correction::{
    corrected_value, default_edit_for, is_correctable, is_valid_numeric_code,
};
use crate::diagnosis::{diagnose, Diagnosis};
use crate::types::{BrandGroup, ConversionEdit, EditField, ItemKey, ManufacturerGroup};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// 異常を含むブランドへの参照（groups 内のインデックス）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrandRef {
    pub manufacturer_idx: usize,
    pub brand_idx: usize,
}

/// レビュー操作
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewAction {
    ToggleApprove(ItemKey),
    UpdateEdit {
        key: ItemKey,
        field: EditField,
        value: String,
    },
    Prev,
    Next,
    /// 未承認が残る次のブランドへ進む（自動送り）
    AdvanceToPending,
}

/// 画面表示用の1件分
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewItem {
    pub key: ItemKey,
    pub diagnosis: Diagnosis,
    pub edit: ConversionEdit,
    pub approved: bool,
    pub correctable: bool,
    pub can_approve: bool,
    /// 現在の修正案で再構成した規格
    pub preview: Option<String>,
}

/// 下流のデータ設定処理に渡す修正結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corrections {
    /// 元の規格 → 修正後の規格（承認済みかつ再構成できたもののみ）
    pub map: BTreeMap<String, String>,
    /// 自動修正できず手作業に回すもの
    pub manual_fix: Vec<ItemKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewState {
    groups: Arc<Vec<ManufacturerGroup>>,
    /// 解析ごとに一度だけ作り、並び替えない
    anomaly_brands: Arc<Vec<BrandRef>>,
    approved: HashSet<ItemKey>,
    edits: HashMap<ItemKey, ConversionEdit>,
    current_brand_idx: usize,
}

impl ReviewState {
    pub fn new(groups: Vec<ManufacturerGroup>) -> Self {
        let anomaly_brands = groups
            .iter()
            .enumerate()
            .flat_map(|(mi, m)| {
                m.brands
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| !b.anomalous_sizes.is_empty())
                    .map(move |(bi, _)| BrandRef {
                        manufacturer_idx: mi,
                        brand_idx: bi,
                    })
            })
            .collect();

        Self {
            groups: Arc::new(groups),
            anomaly_brands: Arc::new(anomaly_brands),
            approved: HashSet::new(),
            edits: HashMap::new(),
            current_brand_idx: 0,
        }
    }

    /// 保存済みの進捗を復元する
    ///
    /// 現在のグループに存在しないキーは捨てる。
    pub fn with_progress(
        mut self,
        approved: impl IntoIterator<Item = ItemKey>,
        edits: impl IntoIterator<Item = (ItemKey, ConversionEdit)>,
        current_brand_idx: usize,
    ) -> Self {
        let approved: HashSet<ItemKey> = approved.into_iter().filter(|k| self.find(k).is_some()).collect();
        let edits: HashMap<ItemKey, ConversionEdit> = edits
            .into_iter()
            .filter(|(k, _)| self.find(k).is_some())
            .collect();
        self.approved = approved;
        self.edits = edits;
        self.current_brand_idx = current_brand_idx.min(self.anomaly_brands.len().saturating_sub(1));
        self
    }

    pub fn groups(&self) -> &[ManufacturerGroup] {
        &self.groups
    }

    pub fn anomaly_brands(&self) -> &[BrandRef] {
        &self.anomaly_brands
    }

    pub fn approved(&self) -> &HashSet<ItemKey> {
        &self.approved
    }

    pub fn edits(&self) -> &HashMap<ItemKey, ConversionEdit> {
        &self.edits
    }

    pub fn current_brand_idx(&self) -> usize {
        self.current_brand_idx
    }

    pub fn has_anomalies(&self) -> bool {
        !self.anomaly_brands.is_empty()
    }

    /// 異常ブランドの (製造社, ブランド)
    pub fn brand_at(&self, idx: usize) -> Option<(&ManufacturerGroup, &BrandGroup)> {
        let r = self.anomaly_brands.get(idx)?;
        let m = self.groups.get(r.manufacturer_idx)?;
        Some((m, m.brands.get(r.brand_idx)?))
    }

    pub fn current_brand(&self) -> Option<(&ManufacturerGroup, &BrandGroup)> {
        self.brand_at(self.current_brand_idx)
    }

    /// キーが指す異常規格のブランドを探す
    pub fn find(&self, key: &ItemKey) -> Option<&BrandGroup> {
        self.groups
            .iter()
            .find(|m| m.manufacturer == key.manufacturer)?
            .brands
            .iter()
            .find(|b| b.brand == key.brand)
            .filter(|b| b.is_anomalous(&key.size))
    }

    fn keys_in_brand(&self, idx: usize) -> Vec<ItemKey> {
        match self.brand_at(idx) {
            Some((m, b)) => b
                .anomalies()
                .map(|size| ItemKey::new(&m.manufacturer, &b.brand, size))
                .collect(),
            None => Vec::new(),
        }
    }

    /// 全異常規格のキー（ブランド順）
    pub fn anomaly_keys(&self) -> Vec<ItemKey> {
        (0..self.anomaly_brands.len())
            .flat_map(|idx| self.keys_in_brand(idx))
            .collect()
    }

    /// 現在の修正案（未編集なら初期案）
    pub fn edit_for(&self, key: &ItemKey) -> Option<ConversionEdit> {
        let group = self.find(key)?;
        Some(
            self.edits
                .get(key)
                .cloned()
                .unwrap_or_else(|| default_edit_for(group, &key.size)),
        )
    }

    pub fn is_approved(&self, key: &ItemKey) -> bool {
        self.approved.contains(key)
    }

    pub fn is_correctable(&self, key: &ItemKey) -> bool {
        self.find(key)
            .map(|group| is_correctable(group, &key.size))
            .unwrap_or(false)
    }

    /// 承認可能か
    ///
    /// - 数値コード型: D が4文字以上の [0-9A-Z]
    /// - テンプレート型: D は必須、スロット数が2以上なら L、3以上なら C も必須
    pub fn can_approve(&self, key: &ItemKey) -> bool {
        let Some(group) = self.find(key) else {
            return false;
        };
        if !is_correctable(group, &key.size) {
            return false;
        }
        let Some(edit) = self.edit_for(key) else {
            return false;
        };

        if group.is_numeric_code {
            return is_valid_numeric_code(&edit.d);
        }

        let count = group.component_count();
        !edit.d.trim().is_empty()
            && (count < 2 || !edit.l.trim().is_empty())
            && (count < 3 || !edit.c.trim().is_empty())
    }

    pub fn item(&self, key: &ItemKey) -> Option<ReviewItem> {
        let group = self.find(key)?;
        let edit = self.edit_for(key)?;
        let correctable = is_correctable(group, &key.size);
        Some(ReviewItem {
            key: key.clone(),
            diagnosis: diagnose(group, &key.size),
            preview: if correctable { corrected_value(group, &edit) } else { None },
            edit,
            approved: self.is_approved(key),
            correctable,
            can_approve: self.can_approve(key),
        })
    }

    /// ブランド内の表示用一覧
    pub fn items_in_brand(&self, idx: usize) -> Vec<ReviewItem> {
        self.keys_in_brand(idx)
            .iter()
            .filter_map(|k| self.item(k))
            .collect()
    }

    /// ブランド内で承認待ちの件数（自動修正できないものは数えない）
    pub fn pending_in_brand(&self, idx: usize) -> usize {
        self.keys_in_brand(idx)
            .iter()
            .filter(|k| !self.is_approved(k) && self.is_correctable(k))
            .count()
    }

    /// 現在位置より後ろで承認待ちが残るブランド
    pub fn next_pending_brand(&self) -> Option<usize> {
        (self.current_brand_idx + 1..self.anomaly_brands.len()).find(|&idx| self.pending_in_brand(idx) > 0)
    }

    /// 自動送りを予約すべきか
    pub fn needs_auto_advance(&self) -> bool {
        self.has_anomalies()
            && self.pending_in_brand(self.current_brand_idx) == 0
            && self.next_pending_brand().is_some()
    }

    /// 未承認の異常規格数（自動修正できないものも含む）
    pub fn anomalous_remaining(&self) -> usize {
        self.anomaly_keys()
            .iter()
            .filter(|k| !self.is_approved(k))
            .count()
    }

    /// 自動修正できる異常がすべて承認済みか
    pub fn is_complete(&self) -> bool {
        (0..self.anomaly_brands.len()).all(|idx| self.pending_in_brand(idx) == 0)
    }

    /// 状態遷移
    pub fn dispatch(&self, action: ReviewAction) -> ReviewState {
        let mut next = self.clone();
        match action {
            ReviewAction::ToggleApprove(key) => {
                if self.can_approve(&key) && !next.approved.remove(&key) {
                    next.approved.insert(key);
                }
            }
            ReviewAction::UpdateEdit { key, field, value } => {
                if let Some(mut edit) = self.edit_for(&key) {
                    edit.set(field, value);
                    next.approved.remove(&key);
                    next.edits.insert(key, edit);
                }
            }
            ReviewAction::Prev => {
                next.current_brand_idx = self.current_brand_idx.saturating_sub(1);
            }
            ReviewAction::Next => {
                if self.current_brand_idx + 1 < self.anomaly_brands.len() {
                    next.current_brand_idx = self.current_brand_idx + 1;
                }
            }
            ReviewAction::AdvanceToPending => {
                if let Some(idx) = self.next_pending_brand() {
                    next.current_brand_idx = idx;
                }
            }
        }
        next
    }

    /// 承認済みの修正を集計
    ///
    /// 同じ元規格に異なる修正後の値が承認された場合は、どちらも採用せず手作業に回す。
    pub fn corrections(&self) -> Corrections {
        let mut result = Corrections::default();
        let mut sources: HashMap<String, ItemKey> = HashMap::new();
        let mut conflicted: HashSet<String> = HashSet::new();

        for key in self.anomaly_keys() {
            let Some(group) = self.find(&key) else {
                continue;
            };
            if !is_correctable(group, &key.size) {
                result.manual_fix.push(key);
                continue;
            }
            if !self.is_approved(&key) {
                continue;
            }
            let corrected = self
                .edit_for(&key)
                .and_then(|edit| corrected_value(group, &edit));
            let Some(value) = corrected else {
                result.manual_fix.push(key);
                continue;
            };
            if conflicted.contains(&key.size) {
                result.manual_fix.push(key);
                continue;
            }
            match result.map.get(&key.size) {
                Some(existing) if *existing != value => {
                    tracing::warn!(
                        size = %key.size,
                        first = %existing,
                        second = %value,
                        "同じ規格に異なる修正が承認されたため手作業に回します"
                    );
                    result.map.remove(&key.size);
                    if let Some(first) = sources.remove(&key.size) {
                        result.manual_fix.push(first);
                    }
                    conflicted.insert(key.size.clone());
                    result.manual_fix.push(key);
                }
                Some(_) => {}
                None => {
                    sources.insert(key.size.clone(), key.clone());
                    result.map.insert(key.size.clone(), value);
                }
            }
        }

        result
    }
}
