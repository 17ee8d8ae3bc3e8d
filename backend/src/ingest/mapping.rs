//! Best-effort mapping of roster headers onto semantic fields.

use common::model::mapping::{FieldMapping, SemanticField};
use log::debug;

/// Lowercase, trimmed candidate header names per field, in priority order.
pub const CANDIDATES: [(SemanticField, &[&str]); 6] = [
    (
        SemanticField::Name,
        &["participant name", "name", "full name"],
    ),
    (
        SemanticField::Id,
        &["national id", "id number", "id", "what is your national id?"],
    ),
    (
        SemanticField::Region,
        &["business location", "county", "location"],
    ),
    (
        SemanticField::Course,
        &["course(s)", "course", "courses", "training", "ta needs", "type of ta"],
    ),
    (
        SemanticField::Date,
        &["training date(s)", "training date", "date(s)", "date"],
    ),
    (
        SemanticField::IssueDate,
        &["issue date", "certificate date"],
    ),
];

pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Picks a header for one field: any exact match in candidate order first,
/// then the first header containing a candidate, again in candidate order.
pub fn match_header<'a>(headers: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    let normalized: Vec<(String, &str)> = headers
        .iter()
        .map(|h| (normalize_header(h), h.as_str()))
        .collect();

    candidates
        .iter()
        .find_map(|c| normalized.iter().find(|(n, _)| n == c).map(|(_, h)| *h))
        .or_else(|| {
            candidates
                .iter()
                .find_map(|c| normalized.iter().find(|(n, _)| n.contains(c)).map(|(_, h)| *h))
        })
}

/// Proposes a mapping for `headers`. Fields with no plausible column stay unbound.
pub fn suggest(headers: &[String]) -> FieldMapping {
    let mut mapping = FieldMapping::default();
    for (field, candidates) in CANDIDATES {
        let hit = match_header(headers, candidates);
        debug!("Column suggestion for {}: {:?}", field, hit);
        mapping.set(field, hit.map(str::to_string));
    }
    mapping
}
