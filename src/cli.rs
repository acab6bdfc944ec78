use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "size-audit")]
#[command(about = "カタログ規格の表記揺れ検出・修正レビューツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// スプレッドシートを解析して異常規格を一覧表示
    Analyze {
        /// スプレッドシートのパス（xlsx/xlsm/xlsb/xls/ods）
        #[arg(required = true)]
        file: PathBuf,

        /// 解析結果をJSONで出力
        #[arg(long)]
        json: Option<PathBuf>,

        /// カスタムエイリアスファイル（JSON）
        #[arg(long)]
        alias: Option<PathBuf>,
    },

    /// 異常規格を対話的にレビューし、修正結果を出力
    Review {
        /// スプレッドシートのパス
        #[arg(required = true)]
        file: PathBuf,

        /// 修正結果JSON（デフォルト: 入力ファイルと同じ場所の corrections.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 修正結果をExcelでも出力
        #[arg(long)]
        xlsx: Option<PathBuf>,

        /// カスタムエイリアスファイル（JSON）
        #[arg(long)]
        alias: Option<PathBuf>,
    },

    /// 保存済みセッションの管理
    Session {
        /// セッション情報を表示
        #[arg(long)]
        info: bool,

        /// セッションを削除
        #[arg(long)]
        clear: bool,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 自動送りの待ち時間（ミリ秒）
        #[arg(long)]
        auto_advance_ms: Option<u64>,

        /// 解析中表示の最短時間（ミリ秒）
        #[arg(long)]
        min_parse_delay_ms: Option<u64>,
    },
}
