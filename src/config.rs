//! 設定 - 環境変数（.env 対応）から読み込む

use crate::parser::DEFAULT_MAX_NAME_LEN;

/// 出力ZIPの既定ファイル名
pub const DEFAULT_OUTPUT_NAME: &str = "renamed_files.zip";

const MAX_NAME_LEN_RANGE: std::ops::RangeInclusive<usize> = 10..=200;

/// 実行時設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// サニタイズ後のファイル名の最大文字数（連番サフィックスを除く）
    pub max_name_len: usize,
    /// 出力ZIPのファイル名
    pub output_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_name_len: DEFAULT_MAX_NAME_LEN,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }
}

impl Config {
    /// `RENAMER_MAX_NAME_LEN` / `RENAMER_OUTPUT_NAME` から設定を作成
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("RENAMER_MAX_NAME_LEN") {
            match raw.trim().parse::<usize>() {
                Ok(len) if MAX_NAME_LEN_RANGE.contains(&len) => config.max_name_len = len,
                Ok(len) => {
                    let clamped = len.clamp(*MAX_NAME_LEN_RANGE.start(), *MAX_NAME_LEN_RANGE.end());
                    tracing::warn!(len, clamped, "RENAMER_MAX_NAME_LEN out of range");
                    config.max_name_len = clamped;
                }
                Err(e) => {
                    tracing::warn!(
                        value = %raw,
                        error = %e,
                        "invalid RENAMER_MAX_NAME_LEN, using default"
                    );
                }
            }
        }

        if let Some(name) = lookup("RENAMER_OUTPUT_NAME") {
            let name = name.trim();
            if name.is_empty() {
                tracing::warn!("empty RENAMER_OUTPUT_NAME, using default");
            } else if name.to_ascii_lowercase().ends_with(".zip") {
                config.output_name = name.to_string();
            } else {
                config.output_name = format!("{name}.zip");
            }
        }

        config
    }
}
