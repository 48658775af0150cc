//! 荷受人リネーマー - メインエントリポイント

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use consignee_renamer::archive::{
    default_output_path, process_batch, read_archive_file, save_archive, write_archive,
};
use consignee_renamer::pdf::PdfTextExtractor;
use consignee_renamer::{Config, gui};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// 省略時はGUIを起動
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rename the PDFs inside a ZIP archive without opening the window
    Rename {
        /// ZIP archive containing the PDF documents
        input: PathBuf,
        /// Output ZIP (defaults to RENAMER_OUTPUT_NAME next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write a JSON report of every rename to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // 環境変数の読み込み（RUST_LOG も .env から指定できるよう先に読む）
    dotenvy::dotenv().ok();

    // ロギング初期化
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    match args.command {
        None => gui::run(config),
        Some(Command::Rename {
            input,
            output,
            report,
        }) => rename_archive(&config, input, output, report),
    }
}

/// GUIなしでZIPを処理
fn rename_archive(
    config: &Config,
    input: PathBuf,
    output: Option<PathBuf>,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let batch = read_archive_file(&input)?;
    if batch.documents.is_empty() {
        anyhow::bail!("no PDF files found in {}", input.display());
    }

    let report = process_batch(&batch, &PdfTextExtractor, config.max_name_len, |done, result| {
        let marker = if result.is_renamed() { "✓" } else { "⚠" };
        println!(
            "[{}/{}] {} {} -> {}",
            done,
            batch.documents.len(),
            marker,
            result.original,
            result.new_name
        );
    });

    let bytes = write_archive(&batch, &report.results)?;
    let output = output.unwrap_or_else(|| default_output_path(&input, &config.output_name));
    save_archive(&output, &bytes)?;

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report.results)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
    }

    println!("{}", report.summary);
    println!("Saved {}", output.display());
    Ok(())
}
