//! 荷受人名抽出モジュール

use super::{ConsigneeName, collapse_whitespace};
use regex::Regex;
use std::sync::LazyLock;

/// ラベルルール（優先度順）
struct LabelRule {
    label: &'static str,
    pattern: Regex,
}

static LABEL_RULES: LazyLock<Vec<LabelRule>> = LazyLock::new(|| {
    [
        ("Consignee (Ship to)", r"(?i)consignee\s*\(\s*ship\s*to\s*\)"),
        ("Ship to", r"(?i)\bship\s*to\b"),
    ]
    .into_iter()
    .map(|(label, pattern)| LabelRule {
        label,
        pattern: Regex::new(pattern).expect("valid label pattern"),
    })
    .collect()
});

/// 荷受人名の後ろに連結されがちな別項目のラベル
///
/// "Dated" は単語として、大文字始まりで前の単語に連結されている場合、
/// または全大文字の単語に連結され直後に日付の数字が続く場合に切る。
/// "Consolidated" / "CONSOLIDATED FREIGHT" は残る。
static TRAILING_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i:buyer['’]?s?\s*order\s*no\.?)",
        r"|(?i:\bdated\b)",
        r"|Dated",
        r"|\p{Lu}(?P<glued>DATED)\s*[:.\-]?\s*\d",
    ))
    .expect("valid trailing label pattern")
});

/// テキストから荷受人名を抽出
/// 優先順位: "Consignee (Ship to)" > "Ship to"
pub fn resolve(text: &str) -> Option<ConsigneeName> {
    let lines: Vec<&str> = text.lines().collect();

    for (priority, rule) in LABEL_RULES.iter().enumerate() {
        let higher = &LABEL_RULES[..priority];

        for (i, line) in lines.iter().enumerate() {
            // 上位ルールのラベル行は下位ルールでは扱わない
            if higher.iter().any(|r| r.pattern.is_match(line)) {
                continue;
            }
            let Some(m) = rule.pattern.find(line) else {
                continue;
            };

            // ラベル行の残りが見出し（"Buyer's Order No." など）だけなら次の行を読む
            let name = clean_candidate(strip_separator(&line[m.end()..])).or_else(|| {
                next_non_empty(&lines[i + 1..]).and_then(clean_candidate)
            });

            if let Some(name) = name {
                tracing::debug!(label = rule.label, name = %name, "consignee resolved");
                return Some(name);
            }
            // 最初にラベルが出た行で名前が取れなければ次のルールへ
            break;
        }
    }

    None
}

/// ラベル直後の ":" や "-" を取り除く
fn strip_separator(rest: &str) -> &str {
    let rest = rest.trim_start();
    rest.strip_prefix([':', '-', '–'])
        .unwrap_or(rest)
        .trim()
}

fn next_non_empty<'a>(lines: &[&'a str]) -> Option<&'a str> {
    lines.iter().copied().map(str::trim).find(|l| !l.is_empty())
}

/// 候補文字列のクリーンアップ
fn clean_candidate(candidate: &str) -> Option<ConsigneeName> {
    let trimmed = candidate.trim();

    let cut = match TRAILING_LABEL_RE.captures(trimmed) {
        Some(caps) => {
            let start = caps
                .name("glued")
                .or_else(|| caps.get(0))
                .map_or(trimmed.len(), |m| m.start());
            &trimmed[..start]
        }
        None => trimmed,
    };

    let name = collapse_whitespace(cut);
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_with_name_on_same_line() {
        let text = "TAX INVOICE\nConsignee (Ship to): Acme Corp\nGSTIN 1234";
        assert_eq!(resolve(text).as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn label_is_case_insensitive_and_spacing_tolerant() {
        let text = "CONSIGNEE(SHIP TO) :  Globex   Industries ";
        assert_eq!(resolve(text).as_deref(), Some("Globex Industries"));
    }

    #[test]
    fn name_on_following_non_empty_line() {
        let text = "Consignee (Ship to)\n\n   \n  Initech Pvt Ltd  \nPlot 4, Sector 9";
        assert_eq!(resolve(text).as_deref(), Some("Initech Pvt Ltd"));
    }

    #[test]
    fn ship_to_fallback_strips_buyers_order() {
        let text = "Invoice No. 42\nShip to: Acme Corp Buyer's Order No. 123";
        assert_eq!(resolve(text).as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn strips_concatenated_labels() {
        assert_eq!(
            resolve("Consignee (Ship to)\nAcme CorpDated 12-Mar-2024").as_deref(),
            Some("Acme Corp")
        );
        assert_eq!(
            resolve("Consignee (Ship to)\nAcme CorpBuyers Order No 7").as_deref(),
            Some("Acme Corp")
        );
        assert_eq!(
            resolve("Consignee (Ship to)\nAcme Corp DATED 1/2/24").as_deref(),
            Some("Acme Corp")
        );
    }

    #[test]
    fn keeps_words_containing_dated() {
        let text = "Consignee (Ship to): Consolidated Freight Dated 4 May";
        assert_eq!(resolve(text).as_deref(), Some("Consolidated Freight"));
    }

    #[test]
    fn primary_label_wins_over_ship_to() {
        let text = "Ship to: Wrong Party\nConsignee (Ship to): Right Party";
        assert_eq!(resolve(text).as_deref(), Some("Right Party"));
    }

    #[test]
    fn header_row_label_reads_next_line() {
        let text = "Consignee (Ship to)      Buyer's Order No.      Dated\nACME CORP\nMumbai";
        assert_eq!(resolve(text).as_deref(), Some("ACME CORP"));

        let text = "Ship to: Other Party\nConsignee (Ship to): Dated 1 Jan\n\nRight Party";
        assert_eq!(resolve(text).as_deref(), Some("Right Party"));
    }

    #[test]
    fn falls_back_to_ship_to_when_primary_is_empty() {
        let text = "Ship to: Backup Party\nConsignee (Ship to): Dated 1 Jan";
        assert_eq!(resolve(text).as_deref(), Some("Backup Party"));
    }

    #[test]
    fn strips_all_caps_glued_dated() {
        assert_eq!(
            resolve("Consignee (Ship to)\nACME CORPDATED 12-MAR-2024").as_deref(),
            Some("ACME CORP")
        );
        assert_eq!(
            resolve("Consignee (Ship to)\nACME CORPDATED: 01.02.2024").as_deref(),
            Some("ACME CORP")
        );
        assert_eq!(
            resolve("Consignee (Ship to)\nCONSOLIDATED FREIGHT").as_deref(),
            Some("CONSOLIDATED FREIGHT")
        );
    }

    #[test]
    fn primary_label_at_end_of_text() {
        assert_eq!(resolve("header\nConsignee (Ship to)"), None);
        assert_eq!(resolve("header\nConsignee (Ship to):\n   \n"), None);
    }

    #[test]
    fn missing_label_is_not_found() {
        assert_eq!(resolve("Invoice\nBill to: Someone\nTotal 100"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn shipment_is_not_a_label() {
        assert_eq!(resolve("Shiptoken batch\nShipment details"), None);
    }
}
