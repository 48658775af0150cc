//! PDF処理モジュール - PDFからのテキスト抽出

use crate::error::RenameError;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// ドキュメントのバイト列からテキストを取り出す
///
/// パイプラインはこのトレイト越しに抽出器を呼ぶ。テストでは差し替えられる。
pub trait TextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, RenameError>;
}

/// `pdf-extract` による純Rustのテキスト抽出
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, RenameError> {
        if !looks_like_pdf(bytes) {
            return Err(RenameError::Extraction("missing %PDF header".to_string()));
        }

        // 壊れたPDFで pdf-extract がパニックすることがあるので捕捉する
        let outcome = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));

        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(RenameError::Extraction(e.to_string())),
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "extractor panicked".to_string());
                Err(RenameError::Extraction(reason))
            }
        }
    }
}

/// 先頭1024バイト以内に `%PDF-` があるか
fn looks_like_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(5).any(|w| w == b"%PDF-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_pdf_bytes() {
        let err = PdfTextExtractor.extract_text(b"PK\x03\x04 not a pdf").unwrap_err();
        assert!(matches!(err, RenameError::Extraction(_)));
    }

    #[test]
    fn truncated_pdf_is_an_extraction_error() {
        let err = PdfTextExtractor.extract_text(b"%PDF-1.4\n1 0 obj\n<<").unwrap_err();
        assert!(matches!(err, RenameError::Extraction(_)));
    }

    #[test]
    fn header_may_follow_leading_garbage() {
        assert!(looks_like_pdf(b"\xef\xbb\xbf%PDF-1.7"));
        assert!(!looks_like_pdf(b""));
    }
}
