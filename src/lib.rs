//! 荷受人リネーマー - PDFの "Consignee (Ship to)" 欄でZIP内のファイルを自動リネームするツール
//!
//! # 機能
//! - ZIPアーカイブからPDFを取り出し、テキストを抽出
//! - "Consignee (Ship to)" / "Ship to" ラベルから荷受人名を特定
//! - ファイル名として安全な名前に整形し、重複には " (2)" などの連番を付与
//! - リネーム済みPDFを新しいZIPにまとめて保存（PDFの中身は変更しない）
//! - ドラッグ＆ドロップ対応GUIとコマンドライン

pub mod archive;
pub mod config;
pub mod error;
pub mod gui;
pub mod parser;
pub mod pdf;

pub use archive::{BatchReport, BatchSummary, Outcome, RenameResult};
pub use config::Config;
pub use error::RenameError;
