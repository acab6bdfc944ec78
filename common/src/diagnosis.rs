//! 異常規格の原因診断

use crate::correction::{decode_numeric_code, DecodedCode};
use crate::types::BrandGroup;
use std::fmt;

/// テンプレート型で混入を疑う記号
const STRAY_SYMBOLS: &[char] = &['*', '!', '@', '#', '$', '%', '^', '&', '\\', '|', '`', '~'];

/// 診断結果
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnosis {
    /// 数値コードに使えない文字を含む
    DisallowedChars(Vec<char>),
    /// 数値コードの形式違反（文字種は正しいが並びが違う）
    CodeFormatError,
    /// 数値コードの混入（詰め込みコードとして解釈可能）
    FormatMixing {
        decoded: DecodedCode,
        component_count: usize,
    },
    /// テンプレート型に紛れ込んだ記号
    StraySymbols(Vec<char>),
    /// 上記以外の表記不一致
    PatternMismatch { expected: String },
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnosis::DisallowedChars(chars) => {
                let list: Vec<String> = chars.iter().map(|c| format!("'{}'", c)).collect();
                write!(f, "使用できない文字: {}", list.join(" "))
            }
            Diagnosis::CodeFormatError => write!(f, "コード形式エラー（数字の後に英字のみ可）"),
            Diagnosis::FormatMixing { decoded, component_count } => {
                if *component_count >= 3 {
                    write!(
                        f,
                        "表記混在の疑い: D{} L{} と解釈できます（C は要入力）",
                        decoded.diameter_text(),
                        decoded.length_text()
                    )
                } else {
                    write!(
                        f,
                        "表記混在の疑い: D{} L{} と解釈できます",
                        decoded.diameter_text(),
                        decoded.length_text()
                    )
                }
            }
            Diagnosis::StraySymbols(chars) => {
                let list: String = chars.iter().collect();
                write!(f, "不要な記号を含む: {}", list)
            }
            Diagnosis::PatternMismatch { expected } => {
                write!(f, "表記パターン不一致（基準: {}）", expected)
            }
        }
    }
}

/// 異常規格が基準表記から外れた理由を診断
pub fn diagnose(group: &BrandGroup, anomaly: &str) -> Diagnosis {
    if group.is_numeric_code {
        let disallowed = unique_chars(anomaly.chars().filter(|c| !c.is_ascii_alphanumeric()));
        return if disallowed.is_empty() {
            Diagnosis::CodeFormatError
        } else {
            Diagnosis::DisallowedChars(disallowed)
        };
    }

    if let Some(decoded) = decode_numeric_code(anomaly) {
        return Diagnosis::FormatMixing {
            decoded,
            component_count: group.component_count(),
        };
    }

    let stray = unique_chars(anomaly.chars().filter(|c| STRAY_SYMBOLS.contains(c)));
    if !stray.is_empty() {
        return Diagnosis::StraySymbols(stray);
    }

    Diagnosis::PatternMismatch {
        expected: group.dominant_pattern.clone(),
    }
}

fn unique_chars(chars: impl Iterator<Item = char>) -> Vec<char> {
    let mut seen = Vec::new();
    for c in chars {
        if !seen.contains(&c) {
            seen.push(c);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NUMERIC_PATTERN;

    fn templated(pattern: &str) -> BrandGroup {
        BrandGroup {
            dominant_pattern: pattern.into(),
            ..Default::default()
        }
    }

    fn numeric() -> BrandGroup {
        BrandGroup {
            is_numeric_code: true,
            dominant_pattern: NUMERIC_PATTERN.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_numeric_disallowed_chars() {
        let d = diagnose(&numeric(), "45-10 -");
        assert_eq!(d, Diagnosis::DisallowedChars(vec!['-', ' ']));
    }

    #[test]
    fn test_numeric_positional_error() {
        assert_eq!(diagnose(&numeric(), "SA4510"), Diagnosis::CodeFormatError);
    }

    #[test]
    fn test_templated_format_mixing() {
        let d = diagnose(&templated("Φ{N}x{N}"), "4510");
        assert!(matches!(d, Diagnosis::FormatMixing { component_count: 2, .. }));
        assert!(d.to_string().contains("D4.5 L10"));
        assert!(!d.to_string().contains("C は要入力"));
    }

    #[test]
    fn test_templated_format_mixing_three_components() {
        let d = diagnose(&templated("{N}x{N}x{N}"), "4510");
        assert!(d.to_string().contains("C は要入力"));
    }

    #[test]
    fn test_templated_stray_symbols() {
        assert_eq!(
            diagnose(&templated("Φ{N}x{N}"), "Φ3.5x10*"),
            Diagnosis::StraySymbols(vec!['*'])
        );
    }

    #[test]
    fn test_templated_generic_mismatch() {
        let d = diagnose(&templated("Φ{N}x{N}"), "3.5/10");
        assert_eq!(d, Diagnosis::PatternMismatch { expected: "Φ{N}x{N}".into() });
    }
}
