//! Interpretation of OpenStreetMap tag values.

use std::fmt;

/// Parse an OSM boolean-ish tag value.
///
/// `yes`/`true`/`1` map to `Some(true)`, `no`/`false`/`0` to `Some(false)`.
/// Anything else (including conditional or free-form values) is unknown.
pub fn parse_yes_no(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Wheelchair accessibility as tagged in OSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheelchair {
    Yes,
    Limited,
    No,
}

impl Wheelchair {
    /// Parse the `wheelchair=*` tag value.
    pub fn from_tag(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "designated" => Some(Wheelchair::Yes),
            "limited" => Some(Wheelchair::Limited),
            "no" => Some(Wheelchair::No),
            _ => None,
        }
    }
}

impl fmt::Display for Wheelchair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Wheelchair::Yes => "accessible",
            Wheelchair::Limited => "limited access",
            Wheelchair::No => "not accessible",
        };
        f.write_str(s)
    }
}
