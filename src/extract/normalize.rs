// src/extract/normalize.rs

use once_cell::sync::Lazy;
use regex::Regex;

// The source sometimes concatenates the next row's identifier into the name cell.
static ECHOED_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:USDOT|MC)\b").expect("identifier regex"));

static LICENSING_DISCLAIMER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)for\s+licensing").expect("disclaimer regex"));

fn truncate_at(value: &str, re: &Regex, min_offset: usize) -> String {
    let cut = re
        .find_iter(value)
        .map(|m| m.start())
        .find(|&start| start >= min_offset)
        .unwrap_or(value.len());
    value[..cut].trim().to_string()
}

/// Cut a legal name at an echoed `USDOT`/`MC` identifier fragment.
///
/// A token at the very start of the name is part of the name itself
/// (`MC TRANSPORT INC`), so only later occurrences truncate.
pub fn clean_legal_name(value: &str) -> String {
    truncate_at(value, &ECHOED_IDENTIFIER, 1)
}

/// Cut an authority status at the trailing "For Licensing ..." disclaimer.
pub fn clean_authority_status(value: &str) -> String {
    truncate_at(value, &LICENSING_DISCLAIMER, 0)
}
