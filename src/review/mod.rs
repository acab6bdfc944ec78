//! 対話式レビューモジュール
//!
//! 異常のあるブランドを1つずつ表示し、修正案の編集と承認を行う。
//! 操作はすべて AuditSession::dispatch を通し、状態の保存もそこで行われる。
//! ブランド内の承認待ちがなくなると、自動送りタイマーで次のブランドへ移る。

pub mod timer;

pub use timer::AdvanceTimer;

use crate::error::{AuditError, Result};
use crate::export::CorrectionHandoff;
use crate::pipeline::AuditSession;
use dialoguer::{Input, Select};
use size_audit_common::correction::normalize_numeric_code;
use size_audit_common::{BrandGroup, EditField, ItemKey, ReviewAction, ReviewItem, ReviewState};
use std::time::Duration;

/// レビューの終わり方
#[derive(Debug)]
pub enum ReviewOutcome {
    /// 確定して修正結果を受け取った
    Committed(CorrectionHandoff),
    /// 途中で中断（進捗は保存済み）
    Suspended,
}

/// ブランド一覧画面の操作
#[derive(Debug, Clone, PartialEq)]
enum BrandMenu {
    Item(ItemKey),
    Prev,
    Next,
    Finish,
    Suspend,
}

/// 規格ごとの操作
#[derive(Debug, Clone, Copy, PartialEq)]
enum ItemMenu {
    ToggleApprove,
    Edit(EditField),
    Back,
}

/// 編集可能なフィールド
///
/// 数値コード型は D（コード本体）のみ。テンプレート型はスロット数ぶん。
pub fn editable_fields(group: &BrandGroup) -> Vec<EditField> {
    if group.is_numeric_code {
        return vec![EditField::D];
    }
    [EditField::D, EditField::L, EditField::C]
        .into_iter()
        .take(group.component_count())
        .collect()
}

/// 入力値の整形（数値コード型は大文字化・記号除去）
pub fn normalize_input(group: &BrandGroup, value: &str) -> String {
    if group.is_numeric_code {
        normalize_numeric_code(value)
    } else {
        value.trim().to_string()
    }
}

/// 一覧に表示する1行
pub fn item_label(item: &ReviewItem) -> String {
    let mark = if item.approved {
        "✓"
    } else if item.correctable {
        " "
    } else {
        "!"
    };
    let preview = match (&item.preview, item.correctable) {
        (Some(value), _) => value.clone(),
        (None, true) => "（入力待ち）".to_string(),
        (None, false) => "（手作業で修正）".to_string(),
    };
    format!("[{}] {} → {}  {}", mark, item.key.size, preview, item.diagnosis)
}

/// 承認操作の後に自動送りを予約するか取り消すか
pub fn sync_timer(timer: &mut AdvanceTimer, state: &ReviewState) {
    if state.needs_auto_advance() {
        timer.schedule();
    } else {
        timer.cancel();
    }
}

/// 予約済みの自動送りを満了まで待って適用する
///
/// プロンプトは入力を待つ間ブロックするため、次のプロンプトを出す前に呼ぶ。
/// 満了時点で送りが不要になっていれば何もしない。送った場合 true。
pub async fn settle_auto_advance(session: &mut AuditSession, timer: &mut AdvanceTimer) -> bool {
    if !timer.is_pending() {
        return false;
    }
    println!("  → ブランドの確認が終わりました。次のブランドへ移動します...");
    if timer.wait().await.is_none() {
        return false;
    }
    let still_needed = session.review().is_some_and(|s| s.needs_auto_advance());
    if !still_needed {
        return false;
    }
    session.dispatch(ReviewAction::AdvanceToPending).is_some()
}

fn current_review(session: &AuditSession) -> Result<ReviewState> {
    session
        .review()
        .cloned()
        .ok_or_else(|| AuditError::InvalidPhase(format!("{:?}", session.phase())))
}

fn print_brand(state: &ReviewState) {
    let Some((m, b)) = state.current_brand() else {
        return;
    };
    let idx = state.current_brand_idx();
    println!(
        "\n[{}/{}] {} / {}  (承認待ち {}件)",
        idx + 1,
        state.anomaly_brands().len(),
        m.manufacturer,
        b.brand,
        state.pending_in_brand(idx)
    );
    if b.is_numeric_code {
        println!("  表記: 数値コード");
    } else {
        println!("  表記: {}", b.dominant_pattern);
    }
    if !b.normal_samples.is_empty() {
        println!("  正常例: {}", b.normal_samples.join(", "));
    }
}

fn prompt_brand_menu(state: &ReviewState) -> Result<BrandMenu> {
    let items = state.items_in_brand(state.current_brand_idx());
    let mut labels: Vec<String> = items.iter().map(item_label).collect();
    let mut choices: Vec<BrandMenu> = items.into_iter().map(|i| BrandMenu::Item(i.key)).collect();

    for (label, choice) in [
        ("← 前のブランド", BrandMenu::Prev),
        ("→ 次のブランド", BrandMenu::Next),
        ("確定して終了", BrandMenu::Finish),
        ("中断（保存して終了）", BrandMenu::Suspend),
    ] {
        labels.push(label.to_string());
        choices.push(choice);
    }

    let selected = Select::new()
        .with_prompt("操作を選択")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(|e| AuditError::Prompt(e.to_string()))?;

    Ok(choices.swap_remove(selected))
}

fn prompt_item_menu(state: &ReviewState, key: &ItemKey) -> Result<ItemMenu> {
    let (Some(item), Some(group)) = (state.item(key), state.find(key)) else {
        return Ok(ItemMenu::Back);
    };

    println!("\n  {}", item.key.size);
    println!("  {}", item.diagnosis);
    if !item.correctable {
        println!("  自動修正できません。手作業の修正対象として出力されます");
        return Ok(ItemMenu::Back);
    }

    let mut labels = Vec::new();
    let mut choices = Vec::new();
    if item.approved {
        labels.push("承認を取り消す".to_string());
        choices.push(ItemMenu::ToggleApprove);
    } else if item.can_approve {
        labels.push(format!("承認（{}）", item.preview.as_deref().unwrap_or("")));
        choices.push(ItemMenu::ToggleApprove);
    }
    for field in editable_fields(group) {
        labels.push(format!("{} を編集（現在: {}）", field, item.edit.get(field)));
        choices.push(ItemMenu::Edit(field));
    }
    labels.push("戻る".to_string());
    choices.push(ItemMenu::Back);

    let selected = Select::new()
        .with_prompt("修正案")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(|e| AuditError::Prompt(e.to_string()))?;

    Ok(choices[selected])
}

fn prompt_field(current: &str, field: EditField) -> Result<String> {
    Input::<String>::new()
        .with_prompt(format!("{} の値", field))
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| AuditError::Prompt(e.to_string()))
}

/// 対話式レビューを実行
pub async fn run_review(session: &mut AuditSession, advance_delay: Duration) -> Result<ReviewOutcome> {
    let mut timer = AdvanceTimer::new(advance_delay);
    let state = current_review(session)?;
    sync_timer(&mut timer, &state);

    println!("異常のあるブランド: {}件", state.anomaly_brands().len());
    println!("---");

    loop {
        settle_auto_advance(session, &mut timer).await;

        let state = current_review(session)?;
        print_brand(&state);
        if let Some(health) = session.health() {
            println!("  健全性スコア: {}  (未承認 {}件)", health.score, health.anomalous_remaining);
        }

        match prompt_brand_menu(&state)? {
            BrandMenu::Item(key) => match prompt_item_menu(&state, &key)? {
                ItemMenu::ToggleApprove => {
                    if let Some(next) = session.dispatch(ReviewAction::ToggleApprove(key)) {
                        sync_timer(&mut timer, next);
                    }
                }
                ItemMenu::Edit(field) => {
                    let Some(group) = state.find(&key) else {
                        continue;
                    };
                    let current = state.edit_for(&key).map(|e| e.get(field).to_string()).unwrap_or_default();
                    let value = normalize_input(group, &prompt_field(&current, field)?);
                    if let Some(next) = session.dispatch(ReviewAction::UpdateEdit { key, field, value }) {
                        sync_timer(&mut timer, next);
                    }
                }
                ItemMenu::Back => {}
            },
            BrandMenu::Prev => {
                session.dispatch(ReviewAction::Prev);
            }
            BrandMenu::Next => {
                session.dispatch(ReviewAction::Next);
            }
            BrandMenu::Finish => match session.commit() {
                Ok(handoff) => return Ok(ReviewOutcome::Committed(handoff)),
                Err(AuditError::Incomplete(n)) => {
                    println!("⚠ 承認待ちの規格が{}件残っています", n);
                }
                Err(e) => return Err(e),
            },
            BrandMenu::Suspend => {
                println!("進捗を保存しました。同じファイルで review を実行すると再開できます");
                return Ok(ReviewOutcome::Suspended);
            }
        }
    }
}
