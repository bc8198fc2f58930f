use scraper::{ElementRef, Html, Selector};

use crate::records::DetailRecord;

/// One named field with an ordered chain of selector strategies.
pub struct FieldSpec {
    pub name: &'static str,
    pub selectors: &'static [&'static str],
}

/// Fixed detail-page fields. The first selector matches the current
/// markup, the second the older variant still served on some listings.
pub const DETAIL_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "Giá",
        selectors: &[".moreinfor .price .value", ".ct_price"],
    },
    FieldSpec {
        name: "Diện tích",
        selectors: &[".moreinfor .square .value", ".ct_dt"],
    },
    FieldSpec {
        name: "Địa chỉ tài sản",
        selectors: &[".address .value", ".ct_dis"],
    },
];

/// Rows of the attribute table, read as alternating key/value cells.
const ATTRIBUTE_ROWS_SELECTOR: &str = ".moreinfor1 table tr";

/// Extract the fixed fields and the open attribute table from a loaded
/// detail page.
///
/// Field extraction never aborts the record: a field whose whole
/// selector chain fails is recorded as an empty string, and any cell
/// that yields nothing becomes an empty value for its key.
pub fn extract_fields(html: &str, url: &str) -> DetailRecord {
    let doc = Html::parse_document(html);
    let mut record = DetailRecord::new(url);

    for field in DETAIL_FIELDS {
        record.insert(field.name, first_text(&doc, field.selectors));
    }

    scan_attribute_table(&doc, &mut record);
    record
}

/// First selector in the chain that yields non-empty text wins; a chain
/// where every selector fails produces an empty string, never an absent
/// key.
fn first_text(doc: &Html, selectors: &[&str]) -> String {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = doc.select(&selector).next() {
            let text = element_text(element);
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Walk the attribute table treating each row as a flat sequence of
/// alternating key/value cells. A row with an odd cell count yields an
/// empty value for its trailing key; blank keys are dropped.
fn scan_attribute_table(doc: &Html, record: &mut DetailRecord) {
    let rows = Selector::parse(ATTRIBUTE_ROWS_SELECTOR).unwrap();
    let cell = Selector::parse("td").unwrap();

    for row in doc.select(&rows) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell).collect();
        for pair in cells.chunks(2) {
            let key = element_text(pair[0]);
            if key.is_empty() {
                continue;
            }
            let value = pair.get(1).map(|c| element_text(*c)).unwrap_or_default();
            record.insert(&key, value);
        }
    }
}
