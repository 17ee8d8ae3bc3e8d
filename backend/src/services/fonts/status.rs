use crate::session::{FontWeight, SessionState};
use actix_web::{web, HttpResponse, Responder};
use log::info;

pub(crate) async fn process(state: web::Data<SessionState>) -> impl Responder {
    HttpResponse::Ok().json(state.session.read().await.font_status())
}

/// Drops both custom fonts; certificates go back to the standard serif faces.
pub(crate) async fn clear(state: web::Data<SessionState>) -> impl Responder {
    let mut session = state.session.write().await;
    session.set_font(FontWeight::Regular, None);
    session.set_font(FontWeight::Bold, None);
    info!("Custom fonts cleared");
    HttpResponse::Ok().json(session.font_status())
}
