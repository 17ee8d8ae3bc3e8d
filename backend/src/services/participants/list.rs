use crate::certificate::serial::{display_name, sanitize_region, serial_for};
use crate::ingest::normalize::CanonicalSet;
use crate::session::SessionState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use common::model::mapping::SemanticField;
use common::model::settings::RenderSettings;
use common::requests::{ParticipantRow, SettingsRequest};

pub const EXPORT_FILE_NAME: &str = "participants_processed.csv";

/// The preview table: one row per participant with the serial it will get.
pub(crate) fn participant_rows(set: &CanonicalSet, settings: &RenderSettings) -> Vec<ParticipantRow> {
    set.participants()
        .iter()
        .enumerate()
        .map(|(idx, p)| ParticipantRow {
            index: idx + 1,
            serial: serial_for(idx, settings),
            name: display_name(&p.name),
            national_id: p.national_id.clone(),
            region: sanitize_region(&p.region),
            course: p.course.clone(),
            date: p.date.clone(),
            issue_date: p.issue_date.clone(),
        })
        .collect()
}

pub(crate) async fn process(state: web::Data<SessionState>, payload: web::Json<SettingsRequest>) -> impl Responder {
    let settings = payload.settings.resolve();
    let session = state.session.read().await;
    HttpResponse::Ok().json(participant_rows(session.participants(), &settings))
}

/// Every value is quoted, with embedded quotes doubled.
pub(crate) fn export_csv(rows: &[ParticipantRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut headers = vec!["Serial"];
    headers.extend(SemanticField::ALL.iter().map(|f| f.label()));
    writer.write_record(&headers)?;
    for row in rows {
        writer.write_record([
            &row.serial,
            &row.name,
            &row.national_id,
            &row.region,
            &row.course,
            &row.date,
            &row.issue_date,
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

pub(crate) async fn export(state: web::Data<SessionState>, payload: web::Json<SettingsRequest>) -> impl Responder {
    let settings = payload.settings.resolve();
    let rows = {
        let session = state.session.read().await;
        if session.participants().is_empty() {
            return HttpResponse::Conflict().body("Error: nothing to export");
        }
        participant_rows(session.participants(), &settings)
    };

    match export_csv(&rows) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(EXPORT_FILE_NAME.to_string())],
            })
            .body(csv),
        Err(e) => HttpResponse::InternalServerError().body(format!("Error: {}", e)),
    }
}
