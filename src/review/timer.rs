//! 自動送りタイマー
//!
//! 予約は常に1件まで。再予約すると前の予約は取り消される。

use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, Sleep};

#[derive(Debug)]
pub struct AdvanceTimer {
    delay: Duration,
    pending: Option<(u64, Pin<Box<Sleep>>)>,
    next_id: u64,
}

impl AdvanceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            next_id: 0,
        }
    }

    /// 予約（既存の予約は破棄）。予約番号を返す
    pub fn schedule(&mut self) -> u64 {
        self.next_id += 1;
        self.pending = Some((self.next_id, Box::pin(sleep(self.delay))));
        self.next_id
    }

    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 予約の満了を待つ
    ///
    /// 予約がなければ即座に None。途中で future を破棄しても予約は残る。
    pub async fn wait(&mut self) -> Option<u64> {
        let (_, timer) = self.pending.as_mut()?;
        timer.as_mut().await;
        self.pending.take().map(|(id, _)| id)
    }
}
