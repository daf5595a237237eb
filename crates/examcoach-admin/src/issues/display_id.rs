//! Human-readable issue identifiers: `<PREFIX>-<n>`.
//!
//! Prefixes name the client app that filed the issue. Only [`VALID_PREFIXES`]
//! are recognized; anything else is treated as if no identifier were present.

use std::sync::LazyLock;

/// Prefixes assigned by the client apps.
pub const VALID_PREFIXES: [&str; 2] = ["AC", "EC"];

/// Prefix used when the backend assigns an identifier itself.
pub const FALLBACK_PREFIX: &str = "EC";

/// How many recent issues the fallback scans for the current maximum.
pub const SCAN_WINDOW: usize = 100;

static DISPLAY_ID_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^([A-Z]{2})-(\d+)$").expect("DISPLAY_ID_REGEX is a valid regex pattern")
});

/// Whether `display_id` already starts with a recognized `<PREFIX>-`.
#[must_use]
pub fn has_valid_prefix(display_id: &str) -> bool {
    VALID_PREFIXES.iter().any(|prefix| {
        display_id
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('-'))
    })
}

/// Parse `<PREFIX>-<n>` into its numeric suffix.
///
/// Returns `None` for malformed identifiers, unrecognized prefixes and
/// suffixes that overflow `u64`.
#[must_use]
pub fn parse_suffix(display_id: &str) -> Option<u64> {
    let caps = DISPLAY_ID_REGEX.captures(display_id)?;
    let prefix = caps.get(1)?.as_str();
    if !VALID_PREFIXES.contains(&prefix) {
        return None;
    }
    caps.get(2)?.as_str().parse().ok()
}

/// Highest recognized suffix among `ids`, or 0 when none parse.
pub fn max_suffix<'a>(ids: impl IntoIterator<Item = &'a str>) -> u64 {
    ids.into_iter().filter_map(parse_suffix).max().unwrap_or(0)
}

/// Format a fallback identifier.
#[must_use]
pub fn fallback_display_id(suffix: u64) -> String {
    format!("{FALLBACK_PREFIX}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_valid_prefix() {
        assert!(has_valid_prefix("AC-42"));
        assert!(has_valid_prefix("EC-"));
        assert!(!has_valid_prefix("ACX-1"));
        assert!(!has_valid_prefix("XY-1"));
        assert!(!has_valid_prefix(""));
    }

    #[test]
    fn test_parse_suffix() {
        assert_eq!(parse_suffix("AC-42"), Some(42));
        assert_eq!(parse_suffix("EC-007"), Some(7));
        assert_eq!(parse_suffix("XY-99"), None);
        assert_eq!(parse_suffix("ec-3"), None);
        assert_eq!(parse_suffix("EC-3a"), None);
        assert_eq!(parse_suffix("EC-99999999999999999999999"), None);
    }

    #[test]
    fn test_max_suffix_spans_prefixes() {
        assert_eq!(max_suffix(["AC-7", "EC-3", "XY-50", "junk"]), 7);
        assert_eq!(max_suffix(Vec::<&str>::new()), 0);
        assert_eq!(fallback_display_id(8), "EC-8");
    }
}
