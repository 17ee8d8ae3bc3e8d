//! Serial codes and the file-name fragments derived from participants.

use common::model::settings::{RenderSettings, DEFAULT_ZIP_NAME_PREFIX};
use regex::Regex;
use std::sync::OnceLock;

pub const UNKNOWN_REGION: &str = "Unknown_County";
pub const NAME_NOT_PROVIDED_FILE: &str = "NAME_NOT_PROVIDED";
pub const NAME_NOT_PROVIDED_DISPLAY: &str = "NAME NOT PROVIDED";
const NAME_FRAGMENT_LEN: usize = 50;

/// Left-pads `number` with zeros to `digits`. Never truncates.
pub fn pad_serial(number: u64, digits: usize) -> String {
    format!("{:0>width$}", number, width = digits)
}

/// Serial for the participant at `index` in the canonical set.
pub fn serial_for(index: usize, settings: &RenderSettings) -> String {
    let number = settings.start_index.saturating_add(index as u64);
    format!("{}{}", settings.serial_prefix, pad_serial(number, settings.digit_width))
}

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // ASCII word characters only, like a browser's `\w`.
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("static regex"))
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn sanitize_fragment(value: &str) -> String {
    let kept = disallowed().replace_all(value, "");
    whitespace_run().replace_all(&kept, "_").trim().to_string()
}

/// Archive folder name for a region.
pub fn sanitize_region(region: &str) -> String {
    let region = region.trim();
    if region.is_empty() {
        return UNKNOWN_REGION.to_string();
    }
    let safe = sanitize_fragment(region);
    if safe.is_empty() {
        UNKNOWN_REGION.to_string()
    } else {
        safe
    }
}

/// Archive file-name prefix. Path separators and dots are stripped, so the
/// archive always lands in the job's own output folder.
pub fn sanitize_archive_prefix(prefix: &str) -> String {
    let safe = sanitize_fragment(prefix.trim());
    if safe.is_empty() {
        DEFAULT_ZIP_NAME_PREFIX.to_string()
    } else {
        safe
    }
}

/// Upper-cased, sanitized name fragment of at most 50 characters.
pub fn sanitize_name_for_file(name: &str) -> String {
    let safe: String = sanitize_fragment(&name.trim().to_uppercase())
        .chars()
        .take(NAME_FRAGMENT_LEN)
        .collect();
    if safe.is_empty() {
        NAME_NOT_PROVIDED_FILE.to_string()
    } else {
        safe
    }
}

/// Name as printed on the certificate.
pub fn display_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        NAME_NOT_PROVIDED_DISPLAY.to_string()
    } else {
        name.to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(prefix: &str, start: u64, digits: usize) -> RenderSettings {
        RenderSettings {
            serial_prefix: prefix.into(),
            start_index: start,
            digit_width: digits,
            ..RenderSettings::default()
        }
    }

    #[test]
    fn serials_use_prefix_start_and_width() {
        let s = settings("CBA", 0, 4);
        assert_eq!(serial_for(0, &s), "CBA0000");
        assert_eq!(serial_for(41, &s), "CBA0041");
        assert_eq!(serial_for(3, &settings("KN-", 998, 3)), "KN-1001");
    }

    #[test]
    fn padding_never_truncates() {
        assert_eq!(pad_serial(123456, 4), "123456");
        assert_eq!(pad_serial(7, 0), "7");
    }

    #[test]
    fn serials_are_strictly_increasing_and_unique() {
        let s = settings("CBA", 5, 4);
        let serials: Vec<String> = (0..500).map(|i| serial_for(i, &s)).collect();
        for pair in serials.windows(2) {
            assert!(pair[1] > pair[0], "{} !> {}", pair[1], pair[0]);
        }
        let again: Vec<String> = (0..500).map(|i| serial_for(i, &s)).collect();
        assert_eq!(serials, again);
    }

    #[test]
    fn region_sanitization() {
        assert_eq!(sanitize_region("  Nairobi City "), "Nairobi_City");
        assert_eq!(sanitize_region("Murang'a / Thika"), "Muranga_Thika");
        assert_eq!(sanitize_region(""), UNKNOWN_REGION);
        assert_eq!(sanitize_region("???"), UNKNOWN_REGION);
        assert_eq!(sanitize_region("Élgeyo-Marakwet"), "lgeyo-Marakwet");
    }

    #[test]
    fn region_sanitization_is_idempotent() {
        for raw in ["Nairobi City", "Murang'a / Thika", "", "a  b\tc", "Taita-Taveta"] {
            let once = sanitize_region(raw);
            assert_eq!(sanitize_region(&once), once);
        }
    }

    #[test]
    fn name_fragment_is_upper_cased_and_bounded() {
        assert_eq!(sanitize_name_for_file(" jane o'doe "), "JANE_ODOE");
        assert_eq!(sanitize_name_for_file(""), NAME_NOT_PROVIDED_FILE);
        assert_eq!(sanitize_name_for_file("!!!"), NAME_NOT_PROVIDED_FILE);
        let long = "a".repeat(80);
        assert_eq!(sanitize_name_for_file(&long).len(), 50);
    }

    #[test]
    fn display_name_defaults_when_empty() {
        assert_eq!(display_name("  jane doe "), "JANE DOE");
        assert_eq!(display_name("   "), NAME_NOT_PROVIDED_DISPLAY);
    }
}
