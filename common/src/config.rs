//! 解析パラメータ
//!
//! 起動時に一度だけ読み込み、以後は参照で渡す。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// これ未満の規格数のブランドは判定しない
    pub min_brand_sizes: usize,
    /// 判定しないブランドで返すサンプル数
    pub small_brand_samples: usize,
    /// 正常サンプルの最大件数
    pub max_normal_samples: usize,
    /// 数値コード型と判定する割合
    pub numeric_code_ratio: f64,
    /// 最頻シグネチャの必要占有率
    pub dominance_ratio: f64,
    /// 不良・交換カテゴリのキーワード
    pub failure_keywords: Vec<String>,
    /// 保険請求カテゴリのキーワード
    pub insurance_keywords: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_brand_sizes: 4,
            small_brand_samples: 3,
            max_normal_samples: 4,
            numeric_code_ratio: 0.9,
            dominance_ratio: 0.6, // 60%以上で統一とみなす
            failure_keywords: vec![
                "실패".into(),
                "교환".into(),
                "failure".into(),
                "exchange".into(),
            ],
            insurance_keywords: vec!["보험".into(), "insurance".into()],
        }
    }
}
