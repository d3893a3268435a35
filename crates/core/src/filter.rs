//! Company-name filtering and normalization.
//!
//! Matching always targets the `coNm` field. Both sides are case-folded; with
//! normalization enabled, legal-entity markers and every non-alphanumeric
//! character are removed as well, so `(주) 스몰 캡` and `스몰캡` compare equal.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::item::{Item, company_name};

/// Korean and English legal-entity markers stripped during normalization.
static LEGAL_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"주식회사|유한회사|\(주\)|\(유\)|㈜|\b(?:co\.,?\s*ltd|inc|corp|ltd|llc)\b\.?").unwrap()
});

/// Company-name matching mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Keyword must appear somewhere in the name.
    #[default]
    Partial,
    /// Name must equal the keyword.
    Exact,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Partial => "partial",
            MatchMode::Exact => "exact",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "partial" => Ok(MatchMode::Partial),
            "exact" => Ok(MatchMode::Exact),
            other => Err(Error::InvalidInput(format!("match must be partial or exact, got {other:?}"))),
        }
    }
}

/// Normalize a company name for comparison.
///
/// Lowercases, strips legal-entity markers, then keeps only alphanumeric
/// characters (Unicode-aware, so Hangul survives).
pub fn normalize_name(value: &str) -> String {
    let lowered = value.to_lowercase();
    LEGAL_ENTITY
        .replace_all(&lowered, "")
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

fn fold(value: &str, normalize: bool) -> String {
    if normalize { normalize_name(value) } else { value.to_lowercase() }
}

/// Keep the items whose company name matches `keyword`.
///
/// An empty keyword returns the input unchanged. Items without a company
/// name never match a non-empty keyword. A keyword that normalizes to
/// nothing (only legal-entity markers or punctuation) is compared with
/// case-folding alone.
pub fn filter_by_company(items: &[Item], keyword: &str, mode: MatchMode, normalize: bool) -> Vec<Item> {
    if keyword.is_empty() {
        return items.to_vec();
    }

    let mut key = fold(keyword, normalize);
    let normalize = normalize && !key.is_empty();
    if key.is_empty() {
        key = keyword.to_lowercase();
    }
    items
        .iter()
        .filter(|item| {
            let Some(name) = company_name(item) else {
                return false;
            };
            let name = fold(name, normalize);
            match mode {
                MatchMode::Exact => name == key,
                MatchMode::Partial => name.contains(&key),
            }
        })
        .cloned()
        .collect()
}
