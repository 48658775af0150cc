//! エラー定義 - ドキュメント単位で回復可能な失敗

use serde::Serialize;
use thiserror::Error;

/// 1ファイルのリネームに失敗した理由
///
/// どれもバッチ全体を止めない。
/// 呼び出し側は元のファイル名にフォールバックする。
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RenameError {
    /// PDFからテキストを抽出できなかった（破損・未対応形式）
    #[error("text extraction failed: {0}")]
    Extraction(String),

    /// "Consignee (Ship to)" / "Ship to" ラベルが見つからない
    #[error("consignee label not found")]
    LabelNotFound,

    /// サニタイズ後に名前が空になった
    #[error("consignee name is empty after sanitizing")]
    SanitizationEmpty,

    /// GUIでリネーム対象に選ばれなかった
    #[error("not selected for renaming")]
    NotSelected,
}
