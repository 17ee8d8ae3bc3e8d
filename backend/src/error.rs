//! Error types for every stage of the certificate pipeline.
//!
//! Ingestion and mapping errors are fatal to the request that caused them.
//! [`ComposeError`] is per participant and never aborts a batch; the batch loop
//! turns it into a diagnostic archive entry instead.

use common::model::mapping::SemanticField;
use thiserror::Error;

/// The uploaded roster could not be decoded.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("failed to parse delimited text: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to open spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("spreadsheet contains no worksheets")]
    NoSheets,
}

/// A required semantic field has no column bound to it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("mapping required: {}", .missing.iter().map(|f| f.label()).collect::<Vec<_>>().join(", "))]
pub struct MappingIncompleteError {
    pub missing: Vec<SemanticField>,
}

/// Failures of the document model.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("{0}")]
    Lopdf(#[from] lopdf::Error),
    #[error("template has no pages")]
    NoPages,
    #[error("malformed template: {0}")]
    Malformed(String),
    #[error("invalid font: {0}")]
    Font(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// A single certificate could not be produced.
#[derive(Error, Debug)]
#[error("failed to compose certificate for participant {national_id}: {source}")]
pub struct ComposeError {
    pub national_id: String,
    #[source]
    pub source: PdfError,
}

/// Writing to the output archive failed. This one does abort the batch.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// The session is not in a state that allows the requested operation.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("upload a participant file first")]
    NoRoster,
    #[error("load a template PDF first")]
    NoTemplate,
    #[error("no participants loaded")]
    NoParticipants,
    #[error(transparent)]
    MappingIncomplete(#[from] MappingIncompleteError),
}

/// A multipart upload did not carry a usable file.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{0}")]
    Multipart(#[from] actix_multipart::MultipartError),
    #[error("missing `file` field")]
    MissingFile,
    #[error("uploaded file is empty")]
    Empty,
}

/// Failure of an HTTP operation, mapped to a status code by the handlers.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
}
