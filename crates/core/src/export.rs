//! CSV and JSON rendering of item lists.
//!
//! CSV columns are the sorted union of every key present in the items; a
//! record without a column renders an empty cell.

use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::{Error, Item};

/// Output format for the command-line tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Csv => f.write_str("csv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

/// JSON body of the listing endpoint.
#[derive(Debug, Serialize)]
pub struct Listing<'a> {
    pub count: usize,
    pub items: &'a [Item],
}

impl<'a> Listing<'a> {
    pub fn new(items: &'a [Item]) -> Self {
        Self { count: items.len(), items }
    }
}

/// Sorted union of keys across all items.
pub fn csv_headers(items: &[Item]) -> Vec<&str> {
    items
        .iter()
        .flat_map(|item| item.keys().map(String::as_str))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Write items as CSV with a header row.
pub fn write_csv<W: Write>(items: &[Item], writer: W) -> Result<(), Error> {
    let headers = csv_headers(items);
    if headers.is_empty() {
        let mut writer = writer;
        writer.write_all(b"\n")?;
        return Ok(());
    }

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&headers)?;
    for item in items {
        csv.write_record(headers.iter().map(|h| item.get(*h).map(String::as_str).unwrap_or("")))?;
    }
    csv.flush()?;
    Ok(())
}

/// Render items as CSV bytes.
pub fn to_csv(items: &[Item]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    write_csv(items, &mut out)?;
    Ok(out)
}

/// Write items as a pretty-printed JSON array.
pub fn write_json<W: Write>(items: &[Item], mut writer: W) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut writer, items)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Write items in the requested format.
pub fn write_items<W: Write>(items: &[Item], format: OutputFormat, writer: W) -> Result<(), Error> {
    match format {
        OutputFormat::Json => write_json(items, writer),
        OutputFormat::Csv => write_csv(items, writer),
    }
}
