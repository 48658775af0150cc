//! メインアプリケーションウィンドウ

use crate::archive::{
    Batch, BatchReport, BatchSummary, Outcome, RenameResult, process_selected, read_archive_file,
    save_archive, write_archive,
};
use crate::config::Config;
use crate::pdf::PdfTextExtractor;
use anyhow::{Context, Result};
use eframe::egui;
use egui::{CentralPanel, RichText, Vec2};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use tokio::runtime::Runtime;

use super::theme::{Colors, dark_theme};

/// バックグラウンド処理からの通知
enum WorkerEvent {
    Processed { done: usize, result: RenameResult },
    Finished(Result<(BatchReport, Vec<u8>), String>),
}

/// アプリケーション状態
pub struct ConsigneeRenamerApp {
    config: Config,
    /// Tokioランタイム
    runtime: Runtime,
    /// 読み込んだZIPのパス
    input_path: Option<PathBuf>,
    /// 読み込んだバッチ
    batch: Option<Arc<Batch>>,
    /// リネーム対象として選択されているか（ドキュメントと同じ順）
    selected: Vec<bool>,
    /// 処理結果（アーカイブ順）
    results: Vec<RenameResult>,
    summary: Option<BatchSummary>,
    /// 保存待ちの出力ZIP
    output: Option<Vec<u8>>,
    /// 最後に保存したファイル
    last_saved: Option<PathBuf>,
    is_processing: bool,
    progress: f32,
    status: String,
    /// ステータスログ
    log: Vec<String>,
    event_rx: Receiver<WorkerEvent>,
    event_tx: Sender<WorkerEvent>,
}

impl ConsigneeRenamerApp {
    pub fn new(config: Config) -> Result<Self> {
        let (event_tx, event_rx) = channel();
        let runtime = Runtime::new().context("failed to start background runtime")?;

        let mut app = Self {
            config,
            runtime,
            input_path: None,
            batch: None,
            selected: Vec::new(),
            results: Vec::new(),
            summary: None,
            output: None,
            last_saved: None,
            is_processing: false,
            progress: 0.0,
            status: "Drop a ZIP file of PDFs to begin".to_string(),
            log: Vec::new(),
            event_rx,
            event_tx,
        };
        app.push_log("Ready. Please upload a ZIP file containing PDFs.");
        Ok(app)
    }

    fn push_log(&mut self, message: impl Into<String>) {
        let line = format!("[{}] {}", chrono::Local::now().format("%H:%M:%S"), message.into());
        self.log.push(line);
    }

    /// ZIPファイルを読み込む
    fn load_archive(&mut self, path: PathBuf) {
        if self.is_processing {
            return;
        }

        self.push_log(format!("Extracting ZIP file: {}", display_name(&path)));

        match read_archive_file(&path) {
            Ok(batch) => {
                if batch.documents.is_empty() {
                    self.push_log("ERROR: No PDF files found in ZIP.");
                    self.status = "No PDF files found in the ZIP archive".to_string();
                    self.batch = None;
                    self.selected.clear();
                } else {
                    self.push_log(format!("Found {} PDF file(s).", batch.documents.len()));
                    if !batch.skipped.is_empty() {
                        let skipped = batch.skipped.len();
                        self.push_log(format!("Skipped {} non-PDF entr(ies).", skipped));
                    }
                    self.status = format!("{} PDF file(s) ready", batch.documents.len());
                    self.selected = vec![true; batch.documents.len()];
                    self.batch = Some(Arc::new(batch));
                }
                self.input_path = Some(path);
                self.results.clear();
                self.summary = None;
                self.output = None;
                self.progress = 0.0;
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "failed to load archive");
                self.push_log(format!("ERROR: {e:#}"));
                self.status = "Failed to extract ZIP".to_string();
            }
        }
    }

    /// 選択されたPDFのリネームをバックグラウンドで開始
    fn start_processing(&mut self) {
        let Some(batch) = self.batch.clone() else {
            return;
        };

        let selected_count = self.selected.iter().filter(|&&s| s).count();
        if selected_count == 0 {
            self.push_log("Please select at least one PDF file to rename.");
            self.status = "No files selected".to_string();
            return;
        }

        self.results.clear();
        self.summary = None;
        self.output = None;
        self.is_processing = true;
        self.progress = 0.0;
        self.status = format!(
            "Processing {} of {} file(s)...",
            selected_count,
            batch.documents.len()
        );
        self.push_log("Starting renaming process...");

        let event_tx = self.event_tx.clone();
        let max_name_len = self.config.max_name_len;
        let selected = self.selected.clone();

        // 1バッチ内は逐次処理。UIを止めないためにワーカースレッドで実行する
        self.runtime.spawn_blocking(move || {
            let progress_tx = event_tx.clone();
            let is_selected = |i: usize| selected.get(i).copied().unwrap_or(false);
            let report = process_selected(
                &batch,
                &PdfTextExtractor,
                max_name_len,
                is_selected,
                |done, result| {
                    let _ = progress_tx.send(WorkerEvent::Processed {
                        done,
                        result: result.clone(),
                    });
                },
            );

            let finished = write_archive(&batch, &report.results)
                .map(|bytes| (report, bytes))
                .map_err(|e| format!("{e:#}"));
            let _ = event_tx.send(WorkerEvent::Finished(finished));
        });
    }

    /// 結果を受信
    fn receive_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                WorkerEvent::Processed { done, result } => {
                    let total = self.batch.as_ref().map_or(done, |b| b.documents.len());
                    self.progress = done as f32 / total.max(1) as f32;
                    self.push_log(describe(&result));
                    self.results.push(result);
                }
                WorkerEvent::Finished(Ok((report, bytes))) => {
                    self.is_processing = false;
                    self.progress = 1.0;
                    self.results = report.results;
                    self.summary = Some(report.summary);
                    self.output = Some(bytes);
                    self.status = format!("Done: {}", report.summary);
                    self.push_log(format!("Finished. {}", report.summary));
                }
                WorkerEvent::Finished(Err(e)) => {
                    self.is_processing = false;
                    self.status = "Processing failed".to_string();
                    self.push_log(format!("ERROR: {e}"));
                }
            }
        }
    }

    /// 出力ZIPを保存
    fn save_output(&mut self) {
        let Some(bytes) = self.output.as_ref() else {
            return;
        };

        let mut dialog = rfd::FileDialog::new()
            .set_title("Save renamed files as")
            .add_filter("ZIP files", &["zip"])
            .set_file_name(&self.config.output_name);
        if let Some(dir) = self.input_path.as_ref().and_then(|p| p.parent()) {
            dialog = dialog.set_directory(dir);
        }

        let Some(path) = dialog.save_file() else {
            return;
        };

        match save_archive(&path, bytes) {
            Ok(()) => {
                self.push_log(format!("ZIP file saved: {}", path.display()));
                self.status = format!("Saved {}", display_name(&path));
                self.last_saved = Some(path);
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "failed to save archive");
                self.push_log(format!("ERROR: {e:#}"));
                self.status = "Failed to create ZIP".to_string();
            }
        }
    }

    fn pick_archive(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Select ZIP file")
            .add_filter("ZIP files", &["zip"])
            .pick_file()
        {
            self.load_archive(path);
        }
    }
}

impl eframe::App for ConsigneeRenamerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.receive_events();

        // ドロップされたZIPを読み込む
        let dropped: Option<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .find(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("zip")))
        });
        if let Some(path) = dropped {
            self.load_archive(path);
        }

        if self.is_processing {
            ctx.request_repaint();
        }

        // ステータスバー（CentralPanel より先に確保する）
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(
                RichText::new(&self.status)
                    .size(13.0)
                    .color(Colors::TEXT_SECONDARY),
            );
        });

        CentralPanel::default().show(ctx, |ui| {
            ui.spacing_mut().item_spacing = Vec2::new(8.0, 10.0);

            // ヘッダー
            ui.horizontal(|ui| {
                ui.heading(
                    RichText::new("Consignee PDF Renamer")
                        .size(26.0)
                        .color(Colors::TEXT_PRIMARY),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let open_folder = egui::Button::new("📁 Open folder");
                    if ui.add_enabled(self.last_saved.is_some(), open_folder).clicked() {
                        if let Some(folder) = self.last_saved.as_ref().and_then(|p| p.parent()) {
                            if let Err(e) = open::that(folder) {
                                tracing::warn!(error = %e, "failed to open folder");
                            }
                        }
                    }
                });
            });

            ui.label(
                RichText::new("Upload ZIP → read \"Consignee (Ship to)\" → save renamed ZIP")
                    .size(14.0)
                    .color(Colors::TEXT_SECONDARY),
            );

            // ドロップゾーン
            let is_hovering = !ui.ctx().input(|i| i.raw.hovered_files.is_empty());
            let (frame_color, bg_color) = if is_hovering {
                (Colors::ACCENT, Colors::BG_HOVER)
            } else {
                (Colors::BORDER, Colors::BG_CARD)
            };

            let drop_zone = egui::Frame::new()
                .fill(bg_color)
                .stroke(egui::Stroke::new(2.0, frame_color))
                .corner_radius(14.0)
                .inner_margin(24.0)
                .show(ui, |ui| {
                    ui.set_min_size(Vec2::new(ui.available_width(), 90.0));
                    ui.vertical_centered(|ui| {
                        let icon = if is_hovering { "📥" } else { "🗜" };
                        ui.label(RichText::new(icon).size(40.0));
                        let hint = match &self.input_path {
                            Some(path) => format!("Loaded: {}", display_name(path)),
                            None => "Drop a ZIP file here, or click to choose one".to_string(),
                        };
                        ui.label(RichText::new(hint).size(16.0).color(Colors::TEXT_PRIMARY));
                    });
                });

            let clicked = drop_zone.response.interact(egui::Sense::click()).clicked();
            if clicked && !self.is_processing {
                self.pick_archive();
            }

            // 操作ボタン
            ui.horizontal(|ui| {
                let can_rename = self.batch.is_some() && !self.is_processing;
                if ui
                    .add_enabled(can_rename, egui::Button::new("☑ Select all"))
                    .clicked()
                {
                    self.selected.iter_mut().for_each(|s| *s = true);
                }
                if ui
                    .add_enabled(can_rename, egui::Button::new("☐ Select none"))
                    .clicked()
                {
                    self.selected.iter_mut().for_each(|s| *s = false);
                }
                if ui
                    .add_enabled(can_rename, egui::Button::new("✏ Rename Selected"))
                    .clicked()
                {
                    self.start_processing();
                }

                let can_save = self.output.is_some() && !self.is_processing;
                if ui
                    .add_enabled(can_save, egui::Button::new("⬇ Save ZIP"))
                    .clicked()
                {
                    self.save_output();
                }

                if let Some(summary) = &self.summary {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(format!(
                                "{}/{} renamed",
                                summary.renamed + summary.collision_resolved,
                                summary.total
                            ))
                            .size(13.0)
                            .color(Colors::TEXT_SECONDARY),
                        );
                    });
                }
            });

            if self.is_processing {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new(&self.status).color(Colors::ACCENT));
                });
                ui.add(egui::ProgressBar::new(self.progress).fill(Colors::ACCENT));
            }

            ui.columns(2, |columns| {
                self.show_files(&mut columns[0]);
                self.show_log(&mut columns[1]);
            });
        });

    }
}

impl ConsigneeRenamerApp {
    /// PDF一覧
    ///
    /// チェックでリネーム対象を選ぶ。処理済みなら新しい名前と荷受人も表示する。
    fn show_files(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("PDF Files").size(16.0).color(Colors::TEXT_PRIMARY));

        let Some(batch) = self.batch.clone() else {
            return;
        };
        let editable = !self.is_processing;

        egui::ScrollArea::vertical()
            .id_salt("files")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (i, document) in batch.documents.iter().enumerate() {
                    egui::Frame::new()
                        .fill(Colors::BG_CARD)
                        .corner_radius(10.0)
                        .inner_margin(8.0)
                        .show(ui, |ui| {
                            ui.set_min_width(ui.available_width());
                            ui.horizontal(|ui| {
                                if let Some(flag) = self.selected.get_mut(i) {
                                    ui.add_enabled(editable, egui::Checkbox::without_text(flag));
                                }
                                match self.results.get(i) {
                                    Some(result) => show_result(ui, &document.name, result),
                                    None => {
                                        ui.label(
                                            RichText::new(&document.name)
                                                .size(13.0)
                                                .color(Colors::TEXT_PRIMARY),
                                        );
                                    }
                                }
                            });
                        });
                }
            });
    }

    fn show_log(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Status Log").size(16.0).color(Colors::TEXT_PRIMARY));

        egui::ScrollArea::vertical()
            .id_salt("log")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &self.log {
                    ui.label(
                        RichText::new(line)
                            .monospace()
                            .size(12.0)
                            .color(Colors::TEXT_SECONDARY),
                    );
                }
            });
    }
}

/// 処理済みカードの中身
fn show_result(ui: &mut egui::Ui, original: &str, result: &RenameResult) {
    let (icon, color) = outcome_style(&result.outcome);
    ui.label(RichText::new(icon).size(15.0).color(color));
    ui.vertical(|ui| {
        ui.label(
            RichText::new(original)
                .size(12.0)
                .color(Colors::TEXT_SECONDARY),
        );
        ui.label(
            RichText::new(format!("→ {}", result.new_name))
                .size(13.0)
                .color(Colors::TEXT_PRIMARY),
        );
        ui.label(
            RichText::new(consignee_label(result))
                .size(12.0)
                .color(Colors::TEXT_SECONDARY),
        );
        if let Outcome::Unchanged { reason } = &result.outcome {
            ui.label(RichText::new(reason.to_string()).size(12.0).color(Colors::WARNING));
        }
    });
}

/// 抽出された荷受人名（無ければ "Not found"）
fn consignee_label(result: &RenameResult) -> String {
    match &result.consignee {
        Some(name) => format!("Consignee: {}", name),
        None => "Consignee: Not found".to_string(),
    }
}

fn outcome_style(outcome: &Outcome) -> (&'static str, egui::Color32) {
    match outcome {
        Outcome::Renamed => ("✓", Colors::SUCCESS),
        Outcome::CollisionResolved => ("✓", Colors::ACCENT),
        Outcome::Unchanged { .. } => ("⚠", Colors::WARNING),
    }
}

/// ログ用の1行説明
fn describe(result: &RenameResult) -> String {
    match &result.outcome {
        Outcome::Renamed => format!("✓ {} → {}", result.original, result.new_name),
        Outcome::CollisionResolved => {
            format!("✓ {} → {} (duplicate name)", result.original, result.new_name)
        }
        Outcome::Unchanged { reason } => {
            format!("⚠ {}: {} (kept as {})", result.original, reason, result.new_name)
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// アプリケーションを起動
pub fn run(config: Config) -> Result<()> {
    let app = ConsigneeRenamerApp::new(config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([700.0, 500.0])
            .with_title("Consignee PDF Renamer")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Consignee PDF Renamer",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_style(dark_theme());
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("application error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenameError;

    fn result(outcome: Outcome) -> RenameResult {
        RenameResult {
            original: "scan.pdf".to_string(),
            new_name: "Acme Corp (2).pdf".to_string(),
            consignee: Some("Acme Corp".to_string()),
            outcome,
        }
    }

    #[test]
    fn log_lines_describe_outcome() {
        assert_eq!(
            describe(&result(Outcome::CollisionResolved)),
            "✓ scan.pdf → Acme Corp (2).pdf (duplicate name)"
        );
        let unchanged = describe(&result(Outcome::Unchanged {
            reason: RenameError::LabelNotFound,
        }));
        assert!(unchanged.contains("consignee label not found"));
    }

    #[test]
    fn cards_show_consignee_or_not_found() {
        assert_eq!(
            consignee_label(&result(Outcome::Renamed)),
            "Consignee: Acme Corp"
        );

        let mut missing = result(Outcome::Unchanged {
            reason: RenameError::NotSelected,
        });
        missing.consignee = None;
        assert_eq!(consignee_label(&missing), "Consignee: Not found");
    }

    #[test]
    fn display_name_uses_file_name() {
        assert_eq!(display_name(Path::new("/tmp/in/batch.zip")), "batch.zip");
    }
}
