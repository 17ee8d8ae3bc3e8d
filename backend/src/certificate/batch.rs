//! Batch generation: one certificate per participant, packaged by region.
//!
//! Participants are composed strictly in canonical order, one at a time. A
//! participant whose certificate cannot be composed gets an `ERROR_*.txt`
//! entry in the archive and the run moves on; only archive write failures
//! end a run early.

use crate::certificate::compose::{compose, FontAssets};
use crate::certificate::serial::{sanitize_archive_prefix, sanitize_name_for_file, sanitize_region, serial_for};
use crate::error::ArchiveError;
use chrono::{DateTime, Local};
use common::model::participant::Participant;
use common::model::settings::RenderSettings;
use log::{error, info};
use std::io::{Seek, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Progress is reported after this many participants, and once at the end.
pub const PROGRESS_EVERY: usize = 50;

/// Destination for finished entries. Paths use `/` to separate folders.
pub trait ArchiveSink {
    fn add_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), ArchiveError>;
}

pub struct ZipSink<W: Write + Seek> {
    writer: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> ZipSink<W> {
    pub fn new(inner: W) -> Self {
        ZipSink {
            writer: ZipWriter::new(inner),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644),
        }
    }

    /// Writes the central directory and hands back the underlying writer.
    pub fn finish(self) -> Result<W, ArchiveError> {
        Ok(self.writer.finish()?)
    }
}

impl<W: Write + Seek> ArchiveSink for ZipSink<W> {
    fn add_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        self.writer.start_file(path, self.options)?;
        self.writer.write_all(bytes)?;
        Ok(())
    }
}

/// `{prefix}_{YYYYMMDD}_{HHMM}.zip` for a run started at `started`. The
/// prefix comes from the client and is reduced to a plain file-name fragment.
pub fn archive_file_name(prefix: &str, started: DateTime<Local>) -> String {
    format!("{}_{}.zip", sanitize_archive_prefix(prefix), started.format("%Y%m%d_%H%M"))
}

pub fn certificate_path(participant: &Participant, serial: &str) -> String {
    format!(
        "{}/{}_{}.pdf",
        sanitize_region(&participant.region),
        serial,
        sanitize_name_for_file(&participant.name)
    )
}

pub fn error_entry_path(participant: &Participant, serial: &str) -> String {
    format!("ERROR_{}_{}.txt", serial, sanitize_name_for_file(&participant.name))
}

/// Everything a run reads. Borrowed from a snapshot taken when the job was
/// started, so later session edits do not reach a running batch.
pub struct BatchRequest<'a> {
    pub template: &'a [u8],
    pub participants: &'a [Participant],
    pub settings: &'a RenderSettings,
    pub fonts: &'a FontAssets,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub generated: usize,
    pub failed: usize,
    /// Set when the run stopped early on request.
    pub cancelled: bool,
}

/// Runs the batch into `sink`. `cancel` is checked between participants, so
/// a certificate that has started is always finished and archived.
/// `on_progress` receives `(done, total)`.
pub fn generate<S: ArchiveSink>(
    request: &BatchRequest<'_>,
    sink: &mut S,
    cancel: &AtomicBool,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<BatchOutcome, ArchiveError> {
    let total = request.participants.len();
    let mut outcome = BatchOutcome::default();
    info!("Generating {} certificates", total);

    for (idx, participant) in request.participants.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            info!("Generation cancelled after {} of {} participants", idx, total);
            outcome.cancelled = true;
            break;
        }

        let serial = serial_for(idx, request.settings);
        match compose(request.template, participant, &serial, request.settings, request.fonts) {
            Ok(pdf) => {
                sink.add_file(&certificate_path(participant, &serial), &pdf)?;
                outcome.generated += 1;
            }
            Err(e) => {
                error!("{} ({}): {}", serial, participant.national_id, e);
                sink.add_file(&error_entry_path(participant, &serial), e.to_string().as_bytes())?;
                outcome.failed += 1;
            }
        }

        let done = idx + 1;
        if done % PROGRESS_EVERY == 0 && done < total {
            info!("Progress: {}/{}", done, total);
            on_progress(done, total);
        }
    }

    if !outcome.cancelled {
        on_progress(total, total);
    }
    info!(
        "Generation finished: {} generated, {} failed",
        outcome.generated, outcome.failed
    );
    Ok(outcome)
}
