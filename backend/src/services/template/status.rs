use crate::session::SessionState;
use actix_web::{web, HttpResponse, Responder};

pub(crate) async fn process(state: web::Data<SessionState>) -> impl Responder {
    let session = state.session.read().await;
    HttpResponse::Ok().json(session.template_status())
}
