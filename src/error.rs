use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("対応していないファイル形式です: {0}（xlsx/xlsm/xlsb/xls/ods）")]
    UnsupportedFileType(String),

    #[error("スプレッドシート読み込みエラー: {0}")]
    SpreadsheetRead(String),

    #[error("製造社・ブランド・規格の揃った行がどのシートにもありません: {0}")]
    NoCatalogRows(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Common(#[from] size_audit_common::Error),

    #[error("出力エラー: {0}")]
    Export(String),

    #[error("未承認の規格が{0}件残っています")]
    Incomplete(usize),

    #[error("この段階では実行できません: {0}")]
    InvalidPhase(String),

    #[error("入力エラー: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;
