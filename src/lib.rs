//! size-audit
//!
//! スプレッドシートの読み込み、解析待ち、セッション保存、対話式レビューなど
//! 入出力を伴う部分。判定ロジックは size_audit_common にある。

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod review;
pub mod session;
