use consignee_renamer::archive::{process_batch, process_selected, read_archive, write_archive};
use consignee_renamer::pdf::{PdfTextExtractor, TextExtractor};
use consignee_renamer::{Outcome, RenameError};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;

/// バイト列をそのままテキストとみなす抽出器
struct PlainText;

impl TextExtractor for PlainText {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, RenameError> {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| RenameError::Extraction(e.to_string()))
    }
}

fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn entries_of(bytes: Vec<u8>) -> Vec<(String, String)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut body = String::new();
            file.read_to_string(&mut body).unwrap();
            (file.name().to_string(), body)
        })
        .collect()
}

#[test]
fn renames_batch_end_to_end() {
    let input = build_zip(&[
        ("invoices/INV-001.pdf", "TAX INVOICE\nConsignee (Ship to)\nAcme Corp\nMumbai"),
        ("invoices/INV-002.pdf", "Ship to: Acme Corp Buyer's Order No. 123"),
        ("invoices/INV-003.pdf", "Packing list without consignee"),
        ("invoices/summary.xlsx", "not a pdf"),
    ]);

    let batch = read_archive(&input).unwrap();
    assert_eq!(batch.documents.len(), 3);

    let report = process_batch(&batch, &PlainText, 100, |_, _| {});
    let output = entries_of(write_archive(&batch, &report.results).unwrap());

    assert_eq!(
        output,
        vec![
            (
                "Acme Corp.pdf".to_string(),
                "TAX INVOICE\nConsignee (Ship to)\nAcme Corp\nMumbai".to_string()
            ),
            (
                "Acme Corp (2).pdf".to_string(),
                "Ship to: Acme Corp Buyer's Order No. 123".to_string()
            ),
            (
                "INV-003.pdf".to_string(),
                "Packing list without consignee".to_string()
            ),
        ]
    );

    assert_eq!(report.results[1].outcome, Outcome::CollisionResolved);
    assert_eq!(
        report.results[2].outcome,
        Outcome::Unchanged {
            reason: RenameError::LabelNotFound
        }
    );
    assert_eq!(report.summary.skipped_entries, 1);
}

#[test]
fn duplicate_original_names_stay_unique() {
    let input = build_zip(&[
        ("a/scan.pdf", "nothing"),
        ("b/scan.pdf", "nothing"),
        ("c/other.pdf", "Ship to: scan"),
    ]);

    let batch = read_archive(&input).unwrap();
    let report = process_batch(&batch, &PlainText, 100, |_, _| {});
    let names: Vec<&str> = report.results.iter().map(|r| r.new_name.as_str()).collect();

    assert_eq!(names, ["scan.pdf", "scan (2).pdf", "scan (3).pdf"]);
}

#[test]
fn unreadable_pdfs_keep_their_names() {
    let input = build_zip(&[("one.pdf", "garbage"), ("two.pdf", "%PDF-1.4 truncated")]);

    let batch = read_archive(&input).unwrap();
    let report = process_batch(&batch, &PdfTextExtractor, 100, |_, _| {});

    assert_eq!(report.summary.unchanged, 2);
    assert!(report.results.iter().all(|r| matches!(
        r.outcome,
        Outcome::Unchanged {
            reason: RenameError::Extraction(_)
        }
    )));

    let output = entries_of(write_archive(&batch, &report.results).unwrap());
    assert_eq!(output[0], ("one.pdf".to_string(), "garbage".to_string()));
    assert_eq!(output[1].0, "two.pdf");
}

#[test]
fn report_serializes_outcomes() {
    let input = build_zip(&[("x.pdf", "Consignee (Ship to): Globex"), ("y.pdf", "")]);
    let batch = read_archive(&input).unwrap();
    let report = process_batch(&batch, &PlainText, 100, |_, _| {});

    let json = serde_json::to_value(&report.results).unwrap();
    assert_eq!(json[0]["new_name"], "Globex.pdf");
    assert_eq!(json[0]["consignee"], "Globex");
    assert_eq!(json[0]["outcome"], "renamed");
    assert_eq!(json[1]["consignee"], serde_json::Value::Null);
    assert_eq!(
        json[1]["outcome"]["unchanged"]["reason"]["kind"],
        "label_not_found"
    );
}

#[test]
fn short_name_limit_applies_before_suffix() {
    let input = build_zip(&[
        ("1.pdf", "Ship to: International Shipping Company"),
        ("2.pdf", "Ship to: International Shipping Co"),
    ]);
    let batch = read_archive(&input).unwrap();
    let report = process_batch(&batch, &PlainText, 13, |_, _| {});

    assert_eq!(report.results[0].new_name, "International.pdf");
    assert_eq!(report.results[1].new_name, "International (2).pdf");
}

#[test]
fn unselected_documents_are_copied_under_original_names() {
    let input = build_zip(&[
        ("x.pdf", "Consignee (Ship to)      Buyer's Order No.      Dated\nACME CORP\nMumbai"),
        ("y.pdf", "Ship to: Globex"),
    ]);
    let batch = read_archive(&input).unwrap();
    let report = process_selected(&batch, &PlainText, 100, |i| i == 0, |_, _| {});
    let output = entries_of(write_archive(&batch, &report.results).unwrap());

    assert_eq!(output[0].0, "ACME CORP.pdf");
    assert_eq!(output[1], ("y.pdf".to_string(), "Ship to: Globex".to_string()));
    assert_eq!(report.summary.renamed, 1);
    assert_eq!(report.summary.unchanged, 1);
}
