// src/output.rs

use std::str::FromStr;

use anyhow::bail;
use url::Url;

use crate::record::CarrierRecord;

/// How a finished lookup is handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    Json,
    /// 303 to the given form URL with the record in the query string.
    Redirect(Url),
}

/// Parameter naming used by form integrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScheme {
    /// `addr_line1`, `city`, ...
    Flat,
    /// `physical_address[addr_line1]`, `physical_address[city]`, ...
    Bracketed,
}

impl FromStr for KeyScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(KeyScheme::Flat),
            "bracketed" => Ok(KeyScheme::Bracketed),
            other => bail!("unknown key scheme {other:?} (expected flat|bracketed)"),
        }
    }
}

impl KeyScheme {
    fn address_key(&self, part: &str) -> String {
        match self {
            KeyScheme::Flat => part.to_string(),
            KeyScheme::Bracketed => format!("physical_address[{part}]"),
        }
    }
}

/// Record as ordered key/value pairs. Empty fields are kept so stale form values get cleared.
pub fn form_params(record: &CarrierRecord, scheme: KeyScheme) -> Vec<(String, String)> {
    let a = &record.address;
    let mut params: Vec<(String, String)> = [
        ("usdot", &record.usdot),
        ("mc_number", &record.mc_number),
        ("legal_name", &record.legal_name),
        ("dba_name", &record.dba_name),
        ("authority_status", &record.authority_status),
        ("office_phone", &record.office_phone),
        ("power_units", &record.power_units),
        ("drivers", &record.drivers),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.clone()))
    .collect();

    params.extend(
        [
            ("addr_line1", &a.street),
            ("addr_line2", &a.unit),
            ("city", &a.city),
            ("state", &a.state),
            ("postal", &a.postal_code),
        ]
        .into_iter()
        .map(|(k, v)| (scheme.address_key(k), v.clone())),
    );
    params
}

/// Append the record to `base` as query parameters.
pub fn redirect_url(base: &Url, record: &CarrierRecord, scheme: KeyScheme) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .extend_pairs(form_params(record, scheme));
    url
}
