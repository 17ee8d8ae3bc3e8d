use crate::certificate::document::CertificateDocument;
use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::services::error_response;
use crate::session::{SessionState, TemplateAsset, DEFAULT_TEMPLATE_SOURCE};
use actix_web::{web, HttpResponse, Responder};
use common::requests::TemplateStatus;
use log::warn;
use std::io::ErrorKind;

pub(crate) async fn process(state: web::Data<SessionState>, config: web::Data<AppConfig>) -> impl Responder {
    match load_default_template(&state, &config).await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e) => error_response(&e),
    }
}

pub(crate) async fn load_default_template(
    state: &SessionState,
    config: &AppConfig,
) -> Result<TemplateStatus, ServiceError> {
    let path = config.default_template_path();
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Default template {} not found; no template loaded", path.display());
            return Err(ServiceError::NotFound(format!(
                "default template {} not found; no template loaded",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };
    if let Err(e) = CertificateDocument::load(&bytes) {
        warn!("Default template {} is not a usable PDF ({}); no template loaded", path.display(), e);
        return Err(ServiceError::NotFound(format!(
            "default template {} is not a usable PDF: {}; no template loaded",
            path.display(),
            e
        )));
    }

    let mut session = state.session.write().await;
    session.set_template(TemplateAsset::new(bytes, DEFAULT_TEMPLATE_SOURCE));
    Ok(session.template_status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::document::tests::template_pdf;
    use crate::session::Session;
    use std::path::PathBuf;

    fn config(assets_dir: PathBuf) -> AppConfig {
        AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            assets_dir,
            output_dir: PathBuf::from("archives"),
            db_path: PathBuf::from("unused.sqlite"),
        }
    }

    #[actix_web::test]
    async fn missing_default_leaves_no_template_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let state = SessionState::new(Session::default(), None);
        let err = load_default_template(&state, &config(dir.path().to_path_buf()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(!state.session.read().await.template_status().loaded);
    }

    #[actix_web::test]
    async fn default_is_read_from_assets_dir() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = template_pdf();
        std::fs::write(dir.path().join("template.pdf"), &pdf).unwrap();
        let state = SessionState::new(Session::default(), None);
        let status = load_default_template(&state, &config(dir.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(status.source.as_deref(), Some(DEFAULT_TEMPLATE_SOURCE));
        assert_eq!(status.size, pdf.len());
    }

    #[actix_web::test]
    async fn corrupt_default_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("template.pdf"), b"%PDF-1.5 truncated").unwrap();
        let state = SessionState::new(Session::default(), None);
        let err = load_default_template(&state, &config(dir.path().to_path_buf()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(err.to_string().contains("not a usable PDF"));
        assert!(!state.session.read().await.template_status().loaded);
    }
}
