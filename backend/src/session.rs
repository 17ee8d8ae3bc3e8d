//! Session context: the template, fonts, loaded roster and canonical
//! participant set that requests work on.
//!
//! The whole session sits behind one `RwLock`. Handlers take the write lock
//! for the duration of a single change, so there is exactly one writer at a
//! time. Generation jobs copy what they need with [`Session::snapshot`] and
//! never look at the session again.

use crate::certificate::compose::FontAssets;
use crate::error::SessionError;
use crate::ingest::mapping::suggest;
use crate::ingest::normalize::{normalize, CanonicalSet};
use crate::ingest::Roster;
use crate::storage::ParticipantStore;
use common::model::mapping::FieldMapping;
use common::model::participant::Participant;
use common::model::settings::RenderSettings;
use common::requests::{FontStatus, MappingState, NormalizationSummary, TemplateStatus};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const DEFAULT_TEMPLATE_SOURCE: &str = "default";

#[derive(Debug, Clone)]
pub struct TemplateAsset {
    pub bytes: Arc<Vec<u8>>,
    pub source: String,
    pub md5: String,
}

impl TemplateAsset {
    pub fn new(bytes: Vec<u8>, source: impl Into<String>) -> Self {
        let md5 = format!("{:x}", md5::compute(&bytes));
        TemplateAsset {
            bytes: Arc::new(bytes),
            source: source.into(),
            md5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FontUpload {
    pub bytes: Arc<Vec<u8>>,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "regular" => Some(FontWeight::Regular),
            "bold" => Some(FontWeight::Bold),
            _ => None,
        }
    }
}

/// Everything a generation run needs, detached from the session.
#[derive(Debug, Clone)]
pub struct GenerationSnapshot {
    pub template: Arc<Vec<u8>>,
    pub participants: Vec<Participant>,
    pub fonts: FontAssets,
    pub settings: RenderSettings,
}

#[derive(Debug, Default)]
pub struct Session {
    template: Option<TemplateAsset>,
    regular_font: Option<FontUpload>,
    bold_font: Option<FontUpload>,
    roster: Roster,
    mapping: FieldMapping,
    participants: CanonicalSet,
}

impl Session {
    /// A session that starts from a previously persisted participant set.
    pub fn restored(participants: CanonicalSet) -> Self {
        Session {
            participants,
            ..Session::default()
        }
    }

    pub fn set_template(&mut self, template: TemplateAsset) {
        info!(
            "Template loaded from {} ({} bytes, md5 {})",
            template.source,
            template.bytes.len(),
            template.md5
        );
        self.template = Some(template);
    }

    pub fn template_status(&self) -> TemplateStatus {
        match &self.template {
            Some(t) => TemplateStatus {
                loaded: true,
                source: Some(t.source.clone()),
                md5: Some(t.md5.clone()),
                size: t.bytes.len(),
            },
            None => TemplateStatus::default(),
        }
    }

    pub fn set_font(&mut self, weight: FontWeight, font: Option<FontUpload>) {
        match weight {
            FontWeight::Regular => self.regular_font = font,
            FontWeight::Bold => self.bold_font = font,
        }
    }

    pub fn fonts(&self) -> FontAssets {
        FontAssets {
            regular: self.regular_font.as_ref().map(|f| f.bytes.clone()),
            bold: self.bold_font.as_ref().map(|f| f.bytes.clone()),
        }
    }

    pub fn font_status(&self) -> FontStatus {
        FontStatus {
            regular: self.regular_font.as_ref().map(|f| f.file_name.clone()),
            bold: self.bold_font.as_ref().map(|f| f.file_name.clone()),
        }
    }

    /// Replaces the loaded roster and proposes a mapping for its headers.
    /// When the proposal binds every required field the roster is normalized
    /// straight away; otherwise the previous participant set stays in place
    /// until a mapping is applied by hand.
    pub fn load_roster(&mut self, roster: Roster) -> (FieldMapping, Option<NormalizationSummary>) {
        let suggested = suggest(&roster.headers);
        self.roster = roster;
        self.mapping = suggested.clone();
        let summary = match self.apply_mapping(suggested.clone()) {
            Ok(summary) => Some(summary),
            Err(e) => {
                info!("Auto-mapping incomplete: {}", e);
                None
            }
        };
        (suggested, summary)
    }

    /// Normalizes the loaded roster with `mapping`. On success the canonical
    /// set is replaced wholesale; on failure nothing changes.
    pub fn apply_mapping(&mut self, mapping: FieldMapping) -> Result<NormalizationSummary, SessionError> {
        if self.roster.rows.is_empty() {
            return Err(SessionError::NoRoster);
        }
        let normalized = normalize(&self.roster.rows, &mapping)?;
        let summary = normalized.summary();
        info!(
            "Mapping applied. Participants ready: {} (skipped {}, duplicates removed {})",
            summary.participants, summary.skipped, summary.duplicates
        );
        self.mapping = mapping;
        self.participants = normalized.set;
        Ok(summary)
    }

    pub fn mapping_state(&self) -> MappingState {
        MappingState {
            headers: self.roster.headers.clone(),
            mapping: self.mapping.clone(),
            participants: self.participants.len(),
        }
    }

    pub fn participants(&self) -> &CanonicalSet {
        &self.participants
    }

    /// Forgets the roster, the mapping and every participant.
    pub fn reset(&mut self) {
        self.roster = Roster::default();
        self.mapping = FieldMapping::default();
        self.participants = CanonicalSet::default();
    }

    pub fn snapshot(&self, settings: RenderSettings) -> Result<GenerationSnapshot, SessionError> {
        let template = self.template.as_ref().ok_or(SessionError::NoTemplate)?;
        if self.participants.is_empty() {
            return Err(SessionError::NoParticipants);
        }
        Ok(GenerationSnapshot {
            template: template.bytes.clone(),
            participants: self.participants.participants().to_vec(),
            fonts: self.fonts(),
            settings,
        })
    }
}

/// Shared handle injected into every handler as `web::Data<SessionState>`.
#[derive(Clone)]
pub struct SessionState {
    pub session: Arc<RwLock<Session>>,
    pub store: Option<ParticipantStore>,
}

impl SessionState {
    pub fn new(session: Session, store: Option<ParticipantStore>) -> Self {
        SessionState {
            session: Arc::new(RwLock::new(session)),
            store,
        }
    }

    /// Persists `set`. Failures are logged and otherwise ignored.
    pub fn persist(&self, set: &CanonicalSet) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(set) {
                warn!("Failed to persist participants: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::reader::read_delimited;

    const ROSTER: &str = "Participant Name,National ID,County,Course,Training Date\n\
        Ann Njeri,123 456,Nairobi,Digital Trade,2026-01-30\n\
        Bob Otieno,123456,Nairobi,Digital Trade,2026-01-30\n\
        Carol,789,,Export,2026-01-30\n";

    fn loaded() -> Session {
        let mut session = Session::default();
        let roster = read_delimited(ROSTER.as_bytes()).unwrap();
        session.load_roster(roster);
        session
    }

    #[test]
    fn upload_with_recognisable_headers_normalizes_immediately() {
        let mut session = Session::default();
        let roster = read_delimited(ROSTER.as_bytes()).unwrap();
        let (mapping, summary) = session.load_roster(roster);
        assert_eq!(mapping.region.as_deref(), Some("County"));
        assert_eq!(
            summary,
            Some(NormalizationSummary {
                participants: 1,
                skipped: 1,
                duplicates: 1
            })
        );
    }

    #[test]
    fn failed_mapping_keeps_previous_participants() {
        let mut session = loaded();
        let mut mapping = session.mapping_state().mapping;
        mapping.id = None;
        assert!(matches!(
            session.apply_mapping(mapping),
            Err(SessionError::MappingIncomplete(_))
        ));
        assert_eq!(session.participants().len(), 1);
    }

    #[test]
    fn mapping_without_roster_is_refused() {
        let mut session = Session::default();
        assert!(matches!(
            session.apply_mapping(FieldMapping::default()),
            Err(SessionError::NoRoster)
        ));
    }

    #[test]
    fn snapshot_requires_template_and_participants() {
        let mut session = loaded();
        assert!(matches!(
            session.snapshot(RenderSettings::default()),
            Err(SessionError::NoTemplate)
        ));
        session.set_template(TemplateAsset::new(b"%PDF-1.5".to_vec(), "upload.pdf"));
        let snapshot = session.snapshot(RenderSettings::default()).unwrap();
        assert_eq!(snapshot.participants.len(), 1);

        session.reset();
        assert!(matches!(
            session.snapshot(RenderSettings::default()),
            Err(SessionError::NoParticipants)
        ));
        assert!(session.mapping_state().headers.is_empty());
    }

    #[test]
    fn template_status_reports_fingerprint() {
        let mut session = Session::default();
        assert!(!session.template_status().loaded);
        session.set_template(TemplateAsset::new(b"abc".to_vec(), DEFAULT_TEMPLATE_SOURCE));
        let status = session.template_status();
        assert_eq!(status.md5.as_deref(), Some("900150983cd24fb0d6963f7d28e17f72"));
        assert_eq!(status.size, 3);
    }
}
