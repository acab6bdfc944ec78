use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use size_audit_common::{AnalyzerConfig, ColumnAliases};
use std::path::PathBuf;
use std::time::Duration;

const SESSION_DIR_NAME: &str = "size-audit";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 解析中表示の最短時間
    pub min_parse_delay_ms: u64,
    /// ブランド完了から次ブランドへ移るまでの待ち時間
    pub auto_advance_ms: u64,
    pub session_dir: Option<PathBuf>,
    /// 追加の列名エイリアス（JSON）
    pub alias_file: Option<PathBuf>,
    pub analyzer: AnalyzerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_parse_delay_ms: 800,
            auto_advance_ms: 500,
            session_dir: None,
            alias_file: None,
            analyzer: AnalyzerConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AuditError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("size-audit").join("config.json"))
    }

    pub fn min_parse_delay(&self) -> Duration {
        Duration::from_millis(self.min_parse_delay_ms)
    }

    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_ms)
    }

    /// セッション保存先（未設定ならローカルデータディレクトリ）
    pub fn session_dir(&self) -> PathBuf {
        self.session_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(SESSION_DIR_NAME)
        })
    }

    /// 組み込みエイリアスに alias_file を重ねたもの
    pub fn column_aliases(&self) -> Result<ColumnAliases> {
        let mut aliases = ColumnAliases::from_preset("default")
            .ok_or_else(|| AuditError::Config("既定のエイリアスがありません".into()))?;
        if let Some(path) = &self.alias_file {
            if !path.exists() {
                return Err(AuditError::FileNotFound(path.display().to_string()));
            }
            aliases.merge(&ColumnAliases::from_file(path)?);
        }
        Ok(aliases)
    }
}
