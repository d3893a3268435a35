//! Registry record model.

use indexmap::IndexMap;

/// Field holding the company name on every small-giant record.
pub const COMPANY_NAME_FIELD: &str = "coNm";

/// One upstream record: child tag name to trimmed text, in document order.
///
/// The key set varies by record, so lookups are always optional.
pub type Item = IndexMap<String, String>;

/// Company name of a record, if present.
pub fn company_name(item: &Item) -> Option<&str> {
    item.get(COMPANY_NAME_FIELD).map(String::as_str)
}
