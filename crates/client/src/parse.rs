//! Small-giant XML payload parsing.
//!
//! Every `smallGiant` element becomes one [`Item`]: each direct child element
//! contributes `tag -> trimmed text`, in document order. The first `total`
//! element anywhere in the document supplies the record-count hint when its
//! text is all digits.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallgiants_core::Item;

const RECORD_TAG: &[u8] = b"smallGiant";
const TOTAL_TAG: &[u8] = b"total";

/// Parsed content of one upstream page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    pub items: Vec<Item>,
    /// Upstream-reported total record count, if the page carried one.
    pub total: Option<u64>,
}

/// Malformed page payload.
#[derive(Debug, Clone, thiserror::Error)]
#[error("malformed XML at byte {position}: {reason}")]
pub struct ParseError {
    pub position: u64,
    pub reason: String,
}

/// Field currently being read inside a record.
struct OpenField {
    name: String,
    depth: usize,
    text: String,
}

/// In-progress record and the depth of its element.
struct OpenRecord {
    item: Item,
    depth: usize,
    field: Option<OpenField>,
}

fn tag_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Parse one page of XML into items and an optional total.
pub fn parse_page(bytes: &[u8]) -> Result<PageResult, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    let fail =
        |reader: &Reader<&[u8]>, reason: String| ParseError { position: reader.buffer_position() as u64, reason };

    let mut result = PageResult::default();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut record: Option<OpenRecord> = None;
    // (depth of the first `total` element, collected text); None once finished or never seen
    let mut total: Option<(usize, String)> = None;
    let mut total_done = false;

    loop {
        let event = reader.read_event().map_err(|e| fail(&reader, e.to_string()))?;
        match event {
            Event::Start(start) => {
                depth += 1;
                saw_root = true;
                let local = start.local_name();
                let name = local.as_ref();

                if !total_done && total.is_none() && name == TOTAL_TAG {
                    total = Some((depth, String::new()));
                }

                match record.as_mut() {
                    None if name == RECORD_TAG => {
                        record = Some(OpenRecord { item: Item::new(), depth, field: None });
                    }
                    Some(open) if depth == open.depth + 1 => {
                        open.field = Some(OpenField { name: tag_name(&start), depth, text: String::new() });
                    }
                    _ => {}
                }
            }
            Event::Empty(start) => {
                saw_root = true;
                match record.as_mut() {
                    Some(open) if depth == open.depth => {
                        open.item.insert(tag_name(&start), String::new());
                    }
                    None if start.local_name().as_ref() == RECORD_TAG => result.items.push(Item::new()),
                    _ => {}
                }
                if !total_done && total.is_none() && start.local_name().as_ref() == TOTAL_TAG {
                    total_done = true;
                }
            }
            Event::Text(text) => {
                let decoded = text.unescape().map_err(|e| fail(&reader, e.to_string()))?;
                append_text(&mut record, &mut total, depth, &decoded);
            }
            Event::CData(data) => {
                let raw = data.into_inner();
                append_text(&mut record, &mut total, depth, &String::from_utf8_lossy(&raw));
            }
            Event::End(_) => {
                if let Some((total_depth, text)) = total.as_ref()
                    && *total_depth == depth
                {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
                        result.total = trimmed.parse().ok();
                    }
                    total = None;
                    total_done = true;
                }

                let mut finished = false;
                if let Some(open) = record.as_mut() {
                    if open.field.as_ref().is_some_and(|f| f.depth == depth) {
                        if let Some(field) = open.field.take() {
                            open.item.insert(field.name, field.text.trim().to_string());
                        }
                    } else if open.depth == depth {
                        finished = true;
                    }
                }
                if finished && let Some(done) = record.take() {
                    result.items.push(done.item);
                }

                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(fail(&reader, "no root element".into()));
    }
    if depth != 0 {
        return Err(fail(&reader, "unexpected end of document".into()));
    }

    Ok(result)
}

/// Route character data to the open field and the open `total` element.
///
/// Only text directly inside the element counts; text of nested children is ignored.
fn append_text(record: &mut Option<OpenRecord>, total: &mut Option<(usize, String)>, depth: usize, text: &str) {
    if let Some(field) = record.as_mut().and_then(|r| r.field.as_mut())
        && field.depth == depth
    {
        field.text.push_str(text);
    }
    if let Some((total_depth, buf)) = total.as_mut()
        && *total_depth == depth
    {
        buf.push_str(text);
    }
}
