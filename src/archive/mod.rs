//! ZIPアーカイブ処理モジュール - 展開・リネーム・再圧縮

use crate::error::RenameError;
use crate::parser::{ConsigneeName, NameRegistry, original_stem, resolve};
use crate::pdf::TextExtractor;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{Cursor, Read, Write};
use std::path::{Component, Path, PathBuf};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// 展開前の事前確保の上限。ヘッダの宣言サイズは信用しない
const MAX_PREALLOC: u64 = 64 << 20;

/// アーカイブ内のPDF 1件
#[derive(Debug, Clone)]
pub struct Document {
    /// アーカイブ内のファイル名（ディレクトリ部分を除く）
    pub name: String,
    pub bytes: Vec<u8>,
}

/// 1回のアップロードで処理するドキュメント群
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub documents: Vec<Document>,
    /// PDF以外で読み飛ばしたエントリ
    pub skipped: Vec<String>,
}

/// リネームの結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Renamed,
    CollisionResolved,
    Unchanged { reason: RenameError },
}

/// ドキュメント1件の処理結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameResult {
    pub original: String,
    /// 出力ZIP内のファイル名（`.pdf` 付き）
    pub new_name: String,
    pub consignee: Option<ConsigneeName>,
    pub outcome: Outcome,
}

impl RenameResult {
    pub fn is_renamed(&self) -> bool {
        !matches!(self.outcome, Outcome::Unchanged { .. })
    }
}

/// バッチの集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub renamed: usize,
    pub collision_resolved: usize,
    pub unchanged: usize,
    pub skipped_entries: usize,
}

impl BatchSummary {
    fn record(&mut self, result: &RenameResult) {
        self.total += 1;
        match result.outcome {
            Outcome::Renamed => self.renamed += 1,
            Outcome::CollisionResolved => self.collision_resolved += 1,
            Outcome::Unchanged { .. } => self.unchanged += 1,
        }
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} file(s): {} renamed, {} left unchanged",
            self.total,
            self.renamed + self.collision_resolved,
            self.unchanged
        )?;
        if self.skipped_entries > 0 {
            write!(f, ", {} non-PDF entr(ies) skipped", self.skipped_entries)?;
        }
        Ok(())
    }
}

/// バッチ処理の結果一式
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub results: Vec<RenameResult>,
    pub summary: BatchSummary,
}

/// ZIPファイルを読み込む
pub fn read_archive_file(path: impl AsRef<Path>) -> Result<Batch> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read archive: {}", path.display()))?;
    read_archive(&bytes).with_context(|| format!("failed to open archive: {}", path.display()))
}

/// ZIPのバイト列からPDFエントリを取り出す
pub fn read_archive(bytes: &[u8]) -> Result<Batch> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("not a valid ZIP archive")?;
    let mut batch = Batch::default();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }

        let Some(path) = file.enclosed_name() else {
            tracing::warn!(entry = file.name(), "skipping entry with unsafe path");
            batch.skipped.push(file.name().to_string());
            continue;
        };

        // macOS のリソースフォークと隠しファイルは無視
        if is_system_entry(&path) {
            tracing::debug!(entry = %path.display(), "ignoring system entry");
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };

        if !has_pdf_extension(&name) {
            tracing::info!(entry = %path.display(), "skipping non-PDF entry");
            batch.skipped.push(name);
            continue;
        }

        let mut buffer = Vec::with_capacity(initial_capacity(file.size()));
        file.read_to_end(&mut buffer)
            .with_context(|| format!("failed to decompress entry: {}", path.display()))?;

        batch.documents.push(Document { name, bytes: buffer });
    }

    tracing::info!(
        documents = batch.documents.len(),
        skipped = batch.skipped.len(),
        "archive loaded"
    );
    Ok(batch)
}

fn initial_capacity(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOC) as usize
}

fn is_system_entry(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(part) => {
            let part = part.to_string_lossy();
            part == "__MACOSX" || part.starts_with('.')
        }
        _ => false,
    })
}

fn has_pdf_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// 単一ドキュメントの新しいファイル名を決める
///
/// 荷受人名が得られなければ元のファイル名を同じ規則で登録する。
pub fn rename_document(
    document: &Document,
    extractor: &dyn TextExtractor,
    registry: &mut NameRegistry,
) -> RenameResult {
    let consignee = extractor
        .extract_text(&document.bytes)
        .and_then(|text| resolve(&text).ok_or(RenameError::LabelNotFound));

    let claimed = consignee
        .as_ref()
        .map_err(Clone::clone)
        .and_then(|name| registry.claim(name));

    let (claimed, outcome) = match claimed {
        Ok(claimed) if claimed.suffixed => (claimed, Outcome::CollisionResolved),
        Ok(claimed) => (claimed, Outcome::Renamed),
        Err(reason) => {
            tracing::warn!(file = %document.name, %reason, "keeping original name");
            let fallback = registry.claim_fallback(original_stem(&document.name));
            (fallback, Outcome::Unchanged { reason })
        }
    };

    RenameResult {
        original: document.name.clone(),
        new_name: format!("{}.pdf", claimed.name),
        consignee: consignee.ok(),
        outcome,
    }
}

/// バッチ内の全ドキュメントをアーカイブ順に処理
///
/// `on_result` は1件処理するたびに (処理済み件数, 結果) で呼ばれる。
pub fn process_batch(
    batch: &Batch,
    extractor: &dyn TextExtractor,
    max_name_len: usize,
    on_result: impl FnMut(usize, &RenameResult),
) -> BatchReport {
    process_selected(batch, extractor, max_name_len, |_| true, on_result)
}

/// 選択されたドキュメントだけをリネームする
///
/// 選択外のドキュメントも同じ順序で元の名前を登録し、出力ZIPに含める。
pub fn process_selected(
    batch: &Batch,
    extractor: &dyn TextExtractor,
    max_name_len: usize,
    is_selected: impl Fn(usize) -> bool,
    mut on_result: impl FnMut(usize, &RenameResult),
) -> BatchReport {
    let mut registry = NameRegistry::new(max_name_len);
    let mut report = BatchReport {
        results: Vec::with_capacity(batch.documents.len()),
        summary: BatchSummary {
            skipped_entries: batch.skipped.len(),
            ..BatchSummary::default()
        },
    };

    for (i, document) in batch.documents.iter().enumerate() {
        let result = if is_selected(i) {
            rename_document(document, extractor, &mut registry)
        } else {
            keep_original(document, &mut registry)
        };
        tracing::debug!(original = %result.original, new_name = %result.new_name, "processed");

        report.summary.record(&result);
        on_result(i + 1, &result);
        report.results.push(result);
    }

    tracing::info!(summary = %report.summary, "batch finished");
    report
}

fn keep_original(document: &Document, registry: &mut NameRegistry) -> RenameResult {
    let claimed = registry.claim_fallback(original_stem(&document.name));
    RenameResult {
        original: document.name.clone(),
        new_name: format!("{}.pdf", claimed.name),
        consignee: None,
        outcome: Outcome::Unchanged {
            reason: RenameError::NotSelected,
        },
    }
}

/// リネーム済みのPDFを新しいZIPにまとめる（中身は元のバイト列のまま）
pub fn write_archive(batch: &Batch, results: &[RenameResult]) -> Result<Vec<u8>> {
    if batch.documents.len() != results.len() {
        anyhow::bail!(
            "result count ({}) does not match document count ({})",
            results.len(),
            batch.documents.len()
        );
    }

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (document, result) in batch.documents.iter().zip(results) {
        writer
            .start_file(result.new_name.as_str(), options)
            .with_context(|| format!("failed to add entry: {}", result.new_name))?;
        writer.write_all(&document.bytes)?;
    }

    let cursor = writer.finish().context("failed to finalize ZIP archive")?;
    Ok(cursor.into_inner())
}

/// 出力ZIPを書き出す
pub fn save_archive(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write archive: {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "archive saved");
    Ok(())
}

/// 入力ZIPと同じフォルダに、既存ファイルと衝突しない出力パスを作る
pub fn default_output_path(input: &Path, output_name: &str) -> PathBuf {
    let directory = input.parent().unwrap_or(Path::new("."));
    directory.join(get_unique_filename(directory, output_name))
}

/// ユニークなファイル名を取得（同名ファイルがある場合は連番を付与）
pub fn get_unique_filename(directory: &Path, filename: &str) -> String {
    let path = Path::new(filename);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(filename);
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("zip");

    let mut final_name = filename.to_string();
    let mut counter = 1;

    while directory.join(&final_name).exists() {
        final_name = format!("{}_{}.{}", stem, counter, ext);
        counter += 1;
    }

    final_name
}
