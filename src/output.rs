use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::records::{DetailRecord, LinkSet, column_union};

/// Byte-order mark prepended to the CSV so spreadsheet apps pick UTF-8.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Write the collected links, one absolute URL per line, first-seen order.
pub fn write_links(path: &Path, links: &LinkSet) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    for link in links.iter() {
        writeln!(file, "{}", link)?;
    }
    Ok(())
}

/// Read the scrape-stage input: one URL per line, blanks skipped.
pub fn read_links(path: &Path) -> std::io::Result<Vec<String>> {
    let file = File::open(path)?;
    let mut urls = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            urls.push(trimmed.to_string());
        }
    }
    Ok(urls)
}

/// Serialize the records as CSV with the computed column union as the
/// header; keys a record does not carry become empty cells.
pub fn write_records(path: &Path, records: &[DetailRecord]) -> Result<(), csv::Error> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let columns = column_union(records);
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(&columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|c| record.value_for_column(c)))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a records CSV back as header plus rows, stripping the BOM.
pub fn read_records(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), csv::Error> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok((headers, rows))
}
