//! セッション保存モジュール
//!
//! レビュー途中の状態をスナップショットとして1ファイルに保存し、
//! 同じファイルを選び直したときに再開できるようにする。
//! 書き込み失敗は警告のみで処理を続ける（以降はメモリ上のみで動作）。

use chrono::Local;
use size_audit_common::SessionSnapshot;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        Self::session_path(&self.dir)
    }

    pub fn session_path(dir: &Path) -> PathBuf {
        dir.join(SESSION_FILE_NAME)
    }

    /// 保存済みスナップショットを読み込み
    ///
    /// 存在しない・壊れている・バージョン違いの場合は None
    pub fn load(&self) -> Option<SessionSnapshot> {
        let path = self.path();
        if !path.exists() {
            return None;
        }

        let file = File::open(&path).ok()?;
        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, SessionSnapshot>(reader) {
            Ok(snapshot) if snapshot.version == size_audit_common::snapshot::SNAPSHOT_VERSION => Some(snapshot),
            Ok(snapshot) => {
                tracing::warn!(version = snapshot.version, "セッションのバージョン不一致、破棄します");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "セッションファイルが壊れているため無視します");
                None
            }
        }
    }

    /// スナップショットを保存（失敗しても続行）
    pub fn save(&self, snapshot: &SessionSnapshot) -> bool {
        let mut snapshot = snapshot.clone();
        snapshot.saved_at = Some(Local::now().to_rfc3339());

        match self.try_save(&snapshot) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %self.path().display(), error = %e, "セッションを保存できません");
                false
            }
        }
    }

    fn try_save(&self, snapshot: &SessionSnapshot) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let file = File::create(self.path())?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, snapshot)?;
        Ok(())
    }

    /// セッションを削除
    ///
    /// 削除した場合 true、元々無かった場合 false
    pub fn clear(&self) -> std::io::Result<bool> {
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
