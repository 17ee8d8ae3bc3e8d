use serde::{Deserialize, Serialize};
use std::fmt;

/// The semantic roles a roster column can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticField {
    Name,
    Id,
    Region,
    Course,
    Date,
    IssueDate,
}

impl SemanticField {
    pub const ALL: [SemanticField; 6] = [
        SemanticField::Name,
        SemanticField::Id,
        SemanticField::Region,
        SemanticField::Course,
        SemanticField::Date,
        SemanticField::IssueDate,
    ];

    /// Fields that must be bound before normalization can run.
    pub const REQUIRED: [SemanticField; 3] =
        [SemanticField::Name, SemanticField::Id, SemanticField::Region];

    pub fn label(self) -> &'static str {
        match self {
            SemanticField::Name => "Participant Name",
            SemanticField::Id => "National ID",
            SemanticField::Region => "Business Location",
            SemanticField::Course => "Course(s)",
            SemanticField::Date => "Training Date(s)",
            SemanticField::IssueDate => "Issue Date",
        }
    }
}

impl fmt::Display for SemanticField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Binding of each semantic field to a column header, or `None` for "(none)".
///
/// An empty or whitespace-only column name is treated the same as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub issue_date: Option<String>,
}

impl FieldMapping {
    pub fn get(&self, field: SemanticField) -> Option<&str> {
        let slot = match field {
            SemanticField::Name => &self.name,
            SemanticField::Id => &self.id,
            SemanticField::Region => &self.region,
            SemanticField::Course => &self.course,
            SemanticField::Date => &self.date,
            SemanticField::IssueDate => &self.issue_date,
        };
        slot.as_deref().filter(|column| !column.trim().is_empty())
    }

    pub fn set(&mut self, field: SemanticField, column: Option<String>) {
        let slot = match field {
            SemanticField::Name => &mut self.name,
            SemanticField::Id => &mut self.id,
            SemanticField::Region => &mut self.region,
            SemanticField::Course => &mut self.course,
            SemanticField::Date => &mut self.date,
            SemanticField::IssueDate => &mut self.issue_date,
        };
        *slot = column;
    }

    /// Required fields that are still unbound, in declaration order.
    pub fn missing_required(&self) -> Vec<SemanticField> {
        SemanticField::REQUIRED
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_binding_counts_as_unbound() {
        let mapping = FieldMapping {
            name: Some("Name".into()),
            id: Some("  ".into()),
            region: None,
            ..Default::default()
        };
        assert_eq!(
            mapping.missing_required(),
            vec![SemanticField::Id, SemanticField::Region]
        );
        assert!(!mapping.is_complete());
    }

    #[test]
    fn deserializes_partial_payload() {
        let mapping: FieldMapping =
            serde_json::from_str(r#"{"name":"Full Name","id":"ID","region":"County"}"#).unwrap();
        assert!(mapping.is_complete());
        assert_eq!(mapping.get(SemanticField::Course), None);
    }
}
