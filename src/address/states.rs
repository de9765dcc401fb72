// src/address/states.rs

use once_cell::sync::Lazy;
use std::collections::HashMap;

static STATE_NAMES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

static STATE_TABLE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| STATE_NAMES.iter().copied().collect());

/// Full state name for an uppercase two-letter code; unknown codes
/// (territories, typos) come back unchanged.
pub fn state_name(code: &str) -> String {
    STATE_TABLE
        .get(code)
        .map(|name| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_fifty_states() {
        assert_eq!(STATE_TABLE.len(), 50);
        for (code, name) in STATE_NAMES {
            assert_eq!(state_name(code), *name);
        }
    }

    #[test]
    fn spot_checks() {
        assert_eq!(state_name("NV"), "Nevada");
        assert_eq!(state_name("NC"), "North Carolina");
        assert_eq!(state_name("WV"), "West Virginia");
    }

    #[test]
    fn unknown_codes_pass_through() {
        for code in ["PR", "DC", "GU", "nv", "XX", "", "Nevada"] {
            assert_eq!(state_name(code), code);
        }
    }
}
