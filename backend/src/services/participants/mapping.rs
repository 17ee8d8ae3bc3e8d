use crate::error::ServiceError;
use crate::services::error_response;
use crate::session::SessionState;
use actix_web::{web, HttpResponse, Responder};
use common::model::mapping::FieldMapping;
use common::requests::NormalizationSummary;

pub(crate) async fn process(state: web::Data<SessionState>, payload: web::Json<FieldMapping>) -> impl Responder {
    match apply_mapping(&state, payload.into_inner()).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => error_response(&e),
    }
}

pub(crate) async fn current(state: web::Data<SessionState>) -> impl Responder {
    HttpResponse::Ok().json(state.session.read().await.mapping_state())
}

/// Re-normalizes the loaded roster with a user-chosen mapping. An incomplete
/// mapping leaves the current participants untouched.
async fn apply_mapping(state: &SessionState, mapping: FieldMapping) -> Result<NormalizationSummary, ServiceError> {
    let mut session = state.session.write().await;
    let summary = session.apply_mapping(mapping)?;
    state.persist(session.participants());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use crate::ingest::reader::read_delimited;
    use crate::services::participants::configure_routes;
    use crate::session::{Session, SessionState};
    use actix_web::{test, web, App};
    use common::model::mapping::FieldMapping;
    use common::requests::{MappingState, NormalizationSummary};

    #[actix_web::test]
    async fn manual_mapping_replaces_the_set() {
        let mut session = Session::default();
        session.load_roster(read_delimited(b"Who,Code,Where\nAnn,1,Embu\nBob,2,\n").unwrap());
        let state = SessionState::new(session, None);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(configure_routes()),
        )
        .await;

        let incomplete = FieldMapping {
            name: Some("Who".into()),
            ..FieldMapping::default()
        };
        let req = test::TestRequest::post()
            .uri("/api/participants/mapping")
            .set_json(&incomplete)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("mapping required: National ID, Business Location"));

        let mapping = FieldMapping {
            name: Some("Who".into()),
            id: Some("Code".into()),
            region: Some("Where".into()),
            ..FieldMapping::default()
        };
        let req = test::TestRequest::post()
            .uri("/api/participants/mapping")
            .set_json(&mapping)
            .to_request();
        let summary: NormalizationSummary = test::call_and_read_body_json(&app, req).await;
        assert_eq!((summary.participants, summary.skipped), (1, 1));

        let req = test::TestRequest::get().uri("/api/participants/mapping").to_request();
        let current: MappingState = test::call_and_read_body_json(&app, req).await;
        assert_eq!(current.mapping, mapping);
        assert_eq!(current.headers, vec!["Who", "Code", "Where"]);
    }
}
