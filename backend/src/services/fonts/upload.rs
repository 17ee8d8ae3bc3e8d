use crate::certificate::fonts::TrueTypeFont;
use crate::error::ServiceError;
use crate::services::error_response;
use crate::services::upload::read_file_field;
use crate::session::{FontUpload, FontWeight, SessionState};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::requests::FontStatus;
use log::info;
use std::sync::Arc;

pub(crate) async fn process(
    state: web::Data<SessionState>,
    weight: web::Path<String>,
    payload: Multipart,
) -> impl Responder {
    match upload_font(&state, &weight, payload).await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e) => error_response(&e),
    }
}

/// Installs an uploaded TrueType/OpenType font for `weight`. The font is
/// parsed once here so a broken file is refused up front instead of failing
/// every certificate later.
async fn upload_font(state: &SessionState, weight: &str, payload: Multipart) -> Result<FontStatus, ServiceError> {
    let weight = FontWeight::parse(weight)
        .ok_or_else(|| ServiceError::BadRequest(format!("unknown font weight '{}'", weight)))?;
    let upload = read_file_field(payload).await?;
    let bytes = Arc::new(upload.bytes);
    let font = TrueTypeFont::parse(bytes.clone())?;
    info!("{:?} font set to {} ({})", weight, upload.file_name, font.postscript_name);

    let mut session = state.session.write().await;
    session.set_font(
        weight,
        Some(FontUpload {
            bytes,
            file_name: upload.file_name,
        }),
    );
    Ok(session.font_status())
}

#[cfg(test)]
mod tests {
    use crate::services::fonts::configure_routes;
    use crate::services::upload::tests::multipart_file;
    use crate::session::{Session, SessionState};
    use actix_web::{test, web, App};
    use common::requests::FontStatus;

    #[actix_web::test]
    async fn rejects_unknown_weight_and_broken_fonts() {
        let state = SessionState::new(Session::default(), None);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(configure_routes()),
        )
        .await;

        let (content_type, body) = multipart_file("x.ttf", b"not a font");
        let req = test::TestRequest::post()
            .uri("/api/fonts/upload/italic")
            .insert_header(("content-type", content_type.clone()))
            .set_payload(body.clone())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::post()
            .uri("/api/fonts/upload/bold")
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::get().uri("/api/fonts/status").to_request();
        let status: FontStatus = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status, FontStatus::default());

        let req = test::TestRequest::delete().uri("/api/fonts").to_request();
        assert!(test::call_service(&app, req).await.status().is_success());
    }
}
