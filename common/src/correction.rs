//! 修正案の算出と修正後規格の再構成
//!
//! - decode_numeric_code: 4桁/6桁の詰め込みコードを直径・長さに分解
//! - compute_default_edit: 異常規格から初期の修正案を作る
//! - reconstruct_corrected_size: 正常サンプルの数値部分だけを差し替える

use crate::pattern::NUMBER_RE;
use crate::types::{component_count, BrandGroup, ConversionEdit};
use regex::Regex;

lazy_static::lazy_static! {
    static ref PACKED_CODE_RE: Regex = Regex::new(r"^([0-9]{4}|[0-9]{6})[A-Za-z]*$").unwrap();
    static ref CODE_CHARS_RE: Regex = Regex::new(r"^[0-9A-Z]+$").unwrap();
}

/// 詰め込みコードの解釈結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedCode {
    /// 直径（mm）
    pub diameter: f64,
    /// 長さ（mm）
    pub length: u32,
}

impl DecodedCode {
    pub fn diameter_text(&self) -> String {
        format!("{}", self.diameter)
    }

    pub fn length_text(&self) -> String {
        self.length.to_string()
    }
}

/// 4桁/6桁の数値コードを直径・長さとして解釈
///
/// - 4桁: 直径 = [0..2] / 10, 長さ = [2..4]
/// - 6桁: 直径 = [2..4] / 10, 長さ = [4..6]
///
/// 直径 (0, 10)、長さ (0, 30) の範囲外は解釈しない。
pub fn decode_numeric_code(size: &str) -> Option<DecodedCode> {
    let caps = PACKED_CODE_RE.captures(size.trim())?;
    let digits = &caps[1];

    let (d, l) = if digits.len() == 4 {
        (&digits[0..2], &digits[2..4])
    } else {
        (&digits[2..4], &digits[4..6])
    };

    let diameter = d.parse::<u32>().ok()? as f64 / 10.0;
    let length = l.parse::<u32>().ok()?;

    if diameter > 0.0 && diameter < 10.0 && length > 0 && length < 30 {
        Some(DecodedCode { diameter, length })
    } else {
        None
    }
}

/// 数値トークンを左から順に抽出
pub fn numeric_tokens(size: &str) -> Vec<&str> {
    NUMBER_RE.find_iter(size).map(|m| m.as_str()).collect()
}

/// 初期の修正案を算出（テンプレート型）
///
/// 詰め込みコードとして解釈できればそれを使い、
/// できなければ数値トークンを D → L → C の順に割り当てる。
pub fn compute_default_edit(anomaly: &str, dominant_pattern: &str) -> ConversionEdit {
    let count = component_count(dominant_pattern);
    let mut edit = ConversionEdit {
        component_count: count,
        ..Default::default()
    };

    if let Some(decoded) = decode_numeric_code(anomaly) {
        edit.d = decoded.diameter_text();
        if count >= 2 {
            edit.l = decoded.length_text();
        }
        return edit;
    }

    let mut tokens = numeric_tokens(anomaly).into_iter().take(count.min(3));
    edit.d = tokens.next().unwrap_or_default().to_string();
    edit.l = tokens.next().unwrap_or_default().to_string();
    edit.c = tokens.next().unwrap_or_default().to_string();
    edit
}

/// 数値コード型の初期修正案（英大文字・数字のみ残す）
pub fn compute_numeric_code_edit(anomaly: &str) -> ConversionEdit {
    ConversionEdit {
        d: normalize_numeric_code(anomaly),
        component_count: 1,
        ..Default::default()
    }
}

/// ブランド種別に応じた初期修正案
pub fn default_edit_for(group: &BrandGroup, anomaly: &str) -> ConversionEdit {
    if group.is_numeric_code {
        compute_numeric_code_edit(anomaly)
    } else {
        compute_default_edit(anomaly, &group.dominant_pattern)
    }
}

/// 数値コードを大文字化し [0-9A-Z] 以外を除去
pub fn normalize_numeric_code(value: &str) -> String {
    value
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        .collect()
}

/// 数値コードとして承認可能な値か（4文字以上の [0-9A-Z]）
pub fn is_valid_numeric_code(value: &str) -> bool {
    value.chars().count() >= 4 && CODE_CHARS_RE.is_match(value)
}

/// 正常サンプルを雛形に修正後の規格を再構成
///
/// 雛形中の数値トークンを順に D, L, C で置き換える。区切りや単位はそのまま残す。
/// 置き換え先の値が空なら再構成できない。
pub fn reconstruct_corrected_size(edit: &ConversionEdit, template: &str) -> Option<String> {
    let slots = [edit.d.trim(), edit.l.trim(), edit.c.trim()];
    let mut result = String::with_capacity(template.len());
    let mut last = 0;
    let mut replaced = 0;

    for (i, m) in NUMBER_RE.find_iter(template).enumerate() {
        result.push_str(&template[last..m.start()]);
        match slots.get(i) {
            Some(value) if value.is_empty() => return None,
            Some(value) => {
                result.push_str(value);
                replaced += 1;
            }
            None => result.push_str(m.as_str()),
        }
        last = m.end();
    }
    result.push_str(&template[last..]);

    if replaced == 0 {
        return None;
    }
    Some(result)
}

/// 自動修正の対象にできるか
///
/// 数値コード型は常に対象。テンプレート型は雛形に数値スロットがあり、
/// 異常規格が詰め込みコードとして解釈できるか数値を含む場合のみ。
pub fn is_correctable(group: &BrandGroup, anomaly: &str) -> bool {
    if group.is_numeric_code {
        return true;
    }
    let has_slot = group
        .template_sample()
        .map(|t| NUMBER_RE.is_match(t))
        .unwrap_or(false);
    has_slot
        && group.component_count() > 0
        && (decode_numeric_code(anomaly).is_some() || NUMBER_RE.is_match(anomaly))
}

/// 修正案から修正後の規格を求める
pub fn corrected_value(group: &BrandGroup, edit: &ConversionEdit) -> Option<String> {
    if group.is_numeric_code {
        let code = normalize_numeric_code(&edit.d);
        return (!code.is_empty()).then_some(code);
    }
    reconstruct_corrected_size(edit, group.template_sample()?)
}
