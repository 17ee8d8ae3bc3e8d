//! Turns raw roster rows into the canonical participant set.

use crate::error::MappingIncompleteError;
use crate::ingest::RawRow;
use common::model::mapping::{FieldMapping, SemanticField};
use common::model::participant::Participant;
use common::requests::NormalizationSummary;
use std::collections::HashSet;

/// The deduplicated, validated participant list. Order defines serial order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalSet {
    participants: Vec<Participant>,
    ids: HashSet<String>,
}

impl CanonicalSet {
    /// Rebuilds a set from previously persisted participants. Ids are
    /// re-stripped of whitespace and any later repeat of an id is dropped.
    pub fn restore(participants: Vec<Participant>) -> Self {
        let mut set = CanonicalSet::default();
        for mut participant in participants {
            participant.national_id = strip_whitespace(&participant.national_id);
            set.push(participant);
        }
        set
    }

    /// Adds `participant` unless its id is already present.
    fn push(&mut self, participant: Participant) -> bool {
        if !self.ids.insert(participant.national_id.clone()) {
            return false;
        }
        self.participants.push(participant);
        true
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    #[cfg(test)]
    pub fn contains_id(&self, national_id: &str) -> bool {
        self.ids.contains(national_id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

/// Result of one normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub set: CanonicalSet,
    /// Rows missing a name, id or region.
    pub skipped: usize,
    /// Rows whose id was already taken by an earlier row.
    pub duplicates: usize,
}

impl Normalized {
    pub fn summary(&self) -> NormalizationSummary {
        NormalizationSummary {
            participants: self.set.len(),
            skipped: self.skipped,
            duplicates: self.duplicates,
        }
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

fn field_value(row: &RawRow, mapping: &FieldMapping, field: SemanticField) -> String {
    mapping
        .get(field)
        .map(|column| row.get(column).trim().to_string())
        .unwrap_or_default()
}

/// Applies `mapping` to `rows`. Refuses to look at any row unless name, id
/// and region are all bound. The returned set is built from scratch on every
/// call, so re-running after a re-mapping never appends to an older set.
pub fn normalize(rows: &[RawRow], mapping: &FieldMapping) -> Result<Normalized, MappingIncompleteError> {
    let missing = mapping.missing_required();
    if !missing.is_empty() {
        return Err(MappingIncompleteError { missing });
    }

    let mut out = Normalized::default();
    for row in rows {
        let participant = Participant {
            name: field_value(row, mapping, SemanticField::Name),
            national_id: strip_whitespace(&field_value(row, mapping, SemanticField::Id)),
            region: field_value(row, mapping, SemanticField::Region),
            course: field_value(row, mapping, SemanticField::Course),
            date: field_value(row, mapping, SemanticField::Date),
            issue_date: field_value(row, mapping, SemanticField::IssueDate),
        };

        if participant.name.is_empty()
            || participant.national_id.is_empty()
            || participant.region.is_empty()
        {
            out.skipped += 1;
            continue;
        }
        if !out.set.push(participant) {
            out.duplicates += 1;
        }
    }
    Ok(out)
}
