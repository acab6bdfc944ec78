//! Size Audit Common Library
//!
//! カタログ規格の表記揺れ検出・修正レビューの中核ロジック。
//! CLI以外のフロントエンドからも使えるよう、入出力を持たない。

pub mod types;
pub mod config;
pub mod alias;
pub mod error;
pub mod ingest;
pub mod pattern;
pub mod correction;
pub mod diagnosis;
pub mod workflow;
pub mod health;
pub mod snapshot;

pub use types::{BrandGroup, CatalogRow, ConversionEdit, EditField, FileMeta, ItemKey, ManufacturerGroup};
pub use config::AnalyzerConfig;
pub use alias::{Column, ColumnAliases};
pub use error::{Error, Result};
pub use ingest::{group_rows, ingest_records, records_to_rows, RawRecord};
pub use pattern::{analyze_brand, shape_signature};
pub use correction::{compute_default_edit, decode_numeric_code, reconstruct_corrected_size, DecodedCode};
pub use diagnosis::{diagnose, Diagnosis};
pub use workflow::{Corrections, ReviewAction, ReviewItem, ReviewState};
pub use health::{evaluate as evaluate_health, HealthReport};
pub use snapshot::{preserve_review, resume_review, SessionSnapshot};
