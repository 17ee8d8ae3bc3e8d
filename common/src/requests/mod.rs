use crate::model::mapping::FieldMapping;
use crate::model::settings::SettingsInput;
use serde::{Deserialize, Serialize};

/// Render settings as typed by the user. Sent to the participant preview,
/// the processed CSV export and `POST /api/generate/start`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsRequest {
    #[serde(default)]
    pub settings: SettingsInput,
}

/// Counters reported after a normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationSummary {
    pub participants: usize,
    pub skipped: usize,
    pub duplicates: usize,
}

/// Response to a roster upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterUploadResponse {
    pub file_name: String,
    pub rows: usize,
    pub headers: Vec<String>,
    pub suggested_mapping: FieldMapping,
    /// `None` when auto-mapping could not bind every required field.
    pub normalization: Option<NormalizationSummary>,
    pub message: String,
}

/// One row of the participant preview table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRow {
    pub index: usize,
    pub serial: String,
    pub name: String,
    pub national_id: String,
    pub region: String,
    pub course: String,
    pub date: String,
    pub issue_date: String,
}

/// Response carrying the id of a freshly scheduled job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreated {
    pub job_id: String,
}

/// Current template as seen by `GET /api/template/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStatus {
    pub loaded: bool,
    /// `"default"` or the uploaded file name.
    pub source: Option<String>,
    pub md5: Option<String>,
    pub size: usize,
}

/// Which custom fonts are in use. `None` means the standard serif face.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontStatus {
    pub regular: Option<String>,
    pub bold: Option<String>,
}

/// Headers of the loaded roster and the mapping currently applied to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingState {
    pub headers: Vec<String>,
    pub mapping: FieldMapping,
    pub participants: usize,
}
