//! ファイル名サニタイズ・重複回避モジュール

use super::{DEFAULT_MAX_NAME_LEN, collapse_whitespace};
use crate::error::RenameError;
use std::collections::HashSet;

/// 元のファイル名すら使えない場合の名前
const FALLBACK_NAME: &str = "document";

/// ファイル名に使用できない文字を空白に置換して整形
///
/// 英数字（Unicode含む）・空白・`-`・`_` 以外はすべて空白に置き換え、
/// 空白をまとめてから `max_len` 文字で切り詰める。
pub fn sanitize(name: &str, max_len: usize) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') {
                c
            } else {
                ' '
            }
        })
        .collect();

    let result = collapse_whitespace(&replaced);

    if result.chars().count() > max_len {
        let truncated: String = result.chars().take(max_len).collect();
        truncated.trim_end().to_string()
    } else {
        result
    }
}

/// 確定したファイル名（拡張子なし）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedName {
    pub name: String,
    /// 重複のため連番サフィックスを付けたか
    pub suffixed: bool,
}

/// バッチ内で使用済みのファイル名（大文字小文字を区別しない）
#[derive(Debug, Clone)]
pub struct NameRegistry {
    used: HashSet<String>,
    max_len: usize,
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NAME_LEN)
    }
}

impl NameRegistry {
    pub fn new(max_len: usize) -> Self {
        Self {
            used: HashSet::new(),
            max_len,
        }
    }

    /// 名前をサニタイズし、重複していれば " (n)" を付けて登録する
    ///
    /// n は 2 から始まる未使用の最小値。処理順で連番が決まる。
    pub fn claim(&mut self, name: &str) -> Result<ClaimedName, RenameError> {
        let base = sanitize(name, self.max_len);
        if base.is_empty() {
            return Err(RenameError::SanitizationEmpty);
        }
        Ok(self.reserve(base))
    }

    /// 荷受人名が取れなかったファイル用
    ///
    /// 元のファイル名を同じ規則で登録する。
    pub fn claim_fallback(&mut self, original_stem: &str) -> ClaimedName {
        let base = sanitize(original_stem, self.max_len);
        if base.is_empty() {
            self.reserve(FALLBACK_NAME.to_string())
        } else {
            self.reserve(base)
        }
    }

    fn reserve(&mut self, base: String) -> ClaimedName {
        let mut name = base.clone();
        let mut counter = 2;

        while self.contains(&name) {
            name = format!("{} ({})", base, counter);
            counter += 1;
        }

        self.used.insert(name.to_lowercase());
        ClaimedName {
            name,
            suffixed: counter > 2,
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.used.contains(&name.to_lowercase())
    }
}
