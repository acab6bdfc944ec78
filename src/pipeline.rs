//! 解析パイプライン
//!
//! ## 段階
//! 1. Idle: ファイル未選択
//! 2. Parsing: 読み込み中（世代番号つき）
//! 3. Failed / NoIssues / ResultsReady: 読み込み結果
//! 4. Committed: 修正結果を後段に渡し終えた
//!
//! 読み込みを開始するたびに世代番号を進め、古い世代の結果は捨てる。

use crate::error::{AuditError, Result};
use crate::export::CorrectionHandoff;
use crate::reader;
use crate::session::SessionStore;
use size_audit_common::{
    evaluate_health, resume_review, AnalyzerConfig, ColumnAliases, FileMeta, HealthReport,
    ManufacturerGroup, ReviewAction, ReviewState, SessionSnapshot,
};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

/// 処理と最短待ち時間を並行に待つ（待ち時間 = max(処理時間, min_delay)）
pub async fn with_min_delay<F: Future>(task: F, min_delay: Duration) -> F::Output {
    let (output, _) = tokio::join!(task, tokio::time::sleep(min_delay));
    output
}

/// スプレッドシートをブロッキングスレッドで読み込む
pub async fn parse_with_min_delay(
    path: PathBuf,
    aliases: ColumnAliases,
    analyzer: AnalyzerConfig,
    min_delay: Duration,
) -> Result<Vec<ManufacturerGroup>> {
    let task = tokio::task::spawn_blocking(move || reader::read_catalog(&path, &aliases, &analyzer));
    with_min_delay(task, min_delay)
        .await
        .map_err(|e| AuditError::SpreadsheetRead(format!("読み込みタスク異常終了: {}", e)))?
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditPhase {
    Idle,
    Parsing { generation: u64 },
    Failed(String),
    NoIssues,
    ResultsReady,
    Committed,
}

#[derive(Debug)]
pub struct AuditSession {
    store: SessionStore,
    analyzer: AnalyzerConfig,
    phase: AuditPhase,
    generation: u64,
    selected: Option<(PathBuf, FileMeta)>,
    review: Option<ReviewState>,
}

impl AuditSession {
    pub fn new(store: SessionStore, analyzer: AnalyzerConfig) -> Self {
        Self {
            store,
            analyzer,
            phase: AuditPhase::Idle,
            generation: 0,
            selected: None,
            review: None,
        }
    }

    pub fn phase(&self) -> &AuditPhase {
        &self.phase
    }

    pub fn review(&self) -> Option<&ReviewState> {
        self.review.as_ref()
    }

    pub fn selected_file(&self) -> Option<&FileMeta> {
        self.selected.as_ref().map(|(_, meta)| meta)
    }

    /// 読み込み開始。返した世代番号を finish_parse に渡す
    pub fn begin_parse(&mut self, path: PathBuf, meta: FileMeta) -> u64 {
        self.generation += 1;
        tracing::info!(generation = self.generation, file = %meta.name, "読み込み開始");
        self.selected = Some((path, meta));
        self.review = None;
        self.phase = AuditPhase::Parsing {
            generation: self.generation,
        };
        self.generation
    }

    /// 読み込み結果を反映
    ///
    /// 後から開始した読み込みがある場合は結果を捨てて false を返す。
    pub fn finish_parse(&mut self, generation: u64, result: Result<Vec<ManufacturerGroup>>) -> bool {
        if generation != self.generation {
            tracing::warn!(generation, latest = self.generation, "古い読み込み結果を破棄");
            return false;
        }

        let groups = match result {
            Ok(groups) => groups,
            Err(e) => {
                tracing::info!(error = %e, "読み込み失敗");
                self.review = None;
                self.phase = AuditPhase::Failed(e.to_string());
                return true;
            }
        };

        let Some((_, meta)) = &self.selected else {
            self.phase = AuditPhase::Failed("ファイルが選択されていません".into());
            return true;
        };

        let state = resume_review(groups, self.store.load(), meta);
        if state.has_anomalies() {
            self.phase = AuditPhase::ResultsReady;
            self.review = Some(state);
            self.persist();
        } else {
            self.phase = AuditPhase::NoIssues;
            self.review = Some(state);
        }
        tracing::info!(phase = ?self.phase, "読み込み完了");
        true
    }

    /// レビュー操作を適用し、結果を保存
    pub fn dispatch(&mut self, action: ReviewAction) -> Option<&ReviewState> {
        if self.phase != AuditPhase::ResultsReady {
            return None;
        }
        let next = self.review.as_ref()?.dispatch(action);
        self.review = Some(next);
        self.persist();
        self.review.as_ref()
    }

    fn persist(&self) {
        if let (Some(state), Some((_, meta))) = (&self.review, &self.selected) {
            self.store.save(&SessionSnapshot::capture(state, meta));
        }
    }

    pub fn health(&self) -> Option<HealthReport> {
        self.review.as_ref().map(|s| evaluate_health(s, &self.analyzer))
    }

    /// 修正結果を確定して後段に渡す
    ///
    /// 自動修正できる異常がすべて承認済みであること。保存済みセッションは削除する。
    pub fn commit(&mut self) -> Result<CorrectionHandoff> {
        let file = self.selected.as_ref().map(|(path, _)| path.clone());

        let handoff = match (&self.phase, &self.review) {
            (AuditPhase::NoIssues, _) => CorrectionHandoff {
                file,
                corrections: None,
                manual_fix: Vec::new(),
            },
            (AuditPhase::ResultsReady, Some(state)) => {
                if !state.is_complete() {
                    let pending = (0..state.anomaly_brands().len())
                        .map(|idx| state.pending_in_brand(idx))
                        .sum();
                    return Err(AuditError::Incomplete(pending));
                }
                let corrections = state.corrections();
                CorrectionHandoff {
                    file,
                    corrections: Some(corrections.map),
                    manual_fix: corrections.manual_fix,
                }
            }
            (phase, _) => return Err(AuditError::InvalidPhase(format!("{:?}", phase))),
        };

        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "セッションを削除できません");
        }
        self.review = None;
        self.phase = AuditPhase::Committed;
        tracing::info!(corrections = handoff.correction_count(), "修正結果を確定");
        Ok(handoff)
    }
}
