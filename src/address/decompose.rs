// src/address/decompose.rs

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::states::state_name;
use super::AddressComponents;
use crate::extract::clean_text;

/// Street suffix glued to a unit designator, e.g. `RDAPT 1120`.
static GLUED_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b([A-Z0-9]*(?:RD|ST|AVE|DR|BLVD|LN|WAY|CT|HWY|PKWY|PL|CIR|TRL))(APT|STE|UNIT)([\s#0-9]|$)",
    )
    .expect("glued unit regex")
});

/// `<body>, <ST> <ZIP>` at the end of the line; ZIP+4 tolerated.
static TERMINAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<body>.*?)\s*,\s*(?P<state>[A-Za-z]{2})\s+(?P<zip>\d{5})(?:-\d{4})?$")
        .expect("terminal regex")
});

/// `APT 1120`, `STE #200`, or a numeric value glued on as in `APT1120`.
static UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?P<designator>APT|STE|UNIT)(?:\b\s*#?\s*(?P<value>[A-Z0-9][A-Z0-9-]*)|(?P<glued>[0-9][A-Z0-9-]*))",
    )
    .expect("unit regex")
});

// Two tokens cover most multi-word US city names. Single-word cities pull in
// one street token (`PO BOX 100 RENO` -> city `100 RENO`); callers keep the
// raw line for that reason.
const CITY_TOKENS: usize = 2;

/// Split a single-line US address into postal components.
///
/// Never fails: a line without the `, ST 12345` tail comes back trimmed but
/// otherwise verbatim in `street` with every other component empty.
pub fn decompose(raw: &str) -> AddressComponents {
    let cleaned = clean_text(raw);
    let line = clean_text(&GLUED_UNIT.replace_all(&cleaned, "${1} ${2}${3}"));
    if line.is_empty() {
        return AddressComponents::default();
    }

    let Some(caps) = TERMINAL.captures(&line) else {
        trace!(raw, "address tail did not match");
        return AddressComponents {
            street: raw.trim().to_string(),
            ..Default::default()
        };
    };

    let state = state_name(&caps["state"].to_ascii_uppercase());
    let postal_code = caps["zip"].to_string();
    let (body, unit) = take_unit(&caps["body"]);
    let (street, city) = split_street_city(&body);

    trace!(%street, %unit, %city, %state, %postal_code, "decomposed address");
    AddressComponents {
        street,
        unit,
        city,
        state,
        postal_code,
    }
}

/// A comma inside the body is taken as the street/city boundary; without one
/// the trailing `CITY_TOKENS` tokens become the city.
fn split_street_city(body: &str) -> (String, String) {
    if let Some((street, city)) = body.rsplit_once(',') {
        let city = clean_text(city);
        if !city.is_empty() {
            return (clean_text(&street.replace(',', " ")), city);
        }
    }

    let tokens: Vec<&str> = body
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    let split = tokens.len().saturating_sub(CITY_TOKENS);
    (tokens[..split].join(" "), tokens[split..].join(" "))
}

/// Remove the last secondary-unit designator from `body`, returning the
/// remaining text and the unit as `"<DESIGNATOR> <VALUE>"`.
fn take_unit(body: &str) -> (String, String) {
    let Some(caps) = UNIT.captures_iter(body).last() else {
        return (body.to_string(), String::new());
    };
    let Some(whole) = caps.get(0) else {
        return (body.to_string(), String::new());
    };

    let Some(value) = caps.name("value").or_else(|| caps.name("glued")) else {
        return (body.to_string(), String::new());
    };

    let unit = format!(
        "{} {}",
        caps["designator"].to_ascii_uppercase(),
        value.as_str()
    );
    let rest = format!("{} {}", &body[..whole.start()], &body[whole.end()..]);
    (clean_text(&rest), unit)
}
