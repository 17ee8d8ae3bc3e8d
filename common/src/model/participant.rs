use serde::{Deserialize, Serialize};

/// One canonical, deduplicated participant.
///
/// `name`, `national_id` and `region` are never empty once a participant has
/// been produced by normalization. `national_id` carries no whitespace at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    pub national_id: String,
    pub region: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub issue_date: String,
}
