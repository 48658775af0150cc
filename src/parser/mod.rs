//! テキスト解析モジュール - 荷受人名の抽出とファイル名の生成

mod consignee;
mod filename;

use regex::Regex;
use std::sync::LazyLock;

pub use consignee::resolve;
pub use filename::{ClaimedName, NameRegistry, sanitize};

/// 抽出された荷受人名（クリーンアップ済み、未サニタイズ）
pub type ConsigneeName = String;

/// サニタイズ後のファイル名の既定最大文字数
pub const DEFAULT_MAX_NAME_LEN: usize = 100;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// 連続する空白を1つにまとめ、前後の空白を削除
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// 元のファイル名から拡張子を除いた部分（フォールバック用）
pub fn original_stem(original_name: &str) -> &str {
    std::path::Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(original_name)
}
