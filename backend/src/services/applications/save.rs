use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use common::model::application::ApplicationStatus;
use common::model::form::FormModel;
use common::requests::SaveApplicationResponse;
use log::{error, info};

/// Actix handler for `POST /api/applications/{application_id}/draft`.
pub async fn draft(
    state: web::Data<AppState>,
    application_id: web::Path<String>,
    form: web::Json<FormModel>,
) -> impl Responder {
    save(state, application_id.into_inner(), form.into_inner(), ApplicationStatus::Draft).await
}

/// Actix handler for `POST /api/applications/{application_id}/submit`.
pub async fn submit(
    state: web::Data<AppState>,
    application_id: web::Path<String>,
    form: web::Json<FormModel>,
) -> impl Responder {
    save(
        state,
        application_id.into_inner(),
        form.into_inner(),
        ApplicationStatus::Submitted,
    )
    .await
}

async fn save(
    state: web::Data<AppState>,
    id: String,
    form: FormModel,
    status: ApplicationStatus,
) -> HttpResponse {
    let encoded = state.codec.encode_application(&form, status);
    let patch = encoded.patch;
    let target = id.clone();

    let stored = state
        .store
        .run(move |store| store.update_application(&target, &patch))
        .await;

    match stored {
        Ok(Some(record)) => {
            info!(
                "saved application {} as {:?} ({} warnings)",
                id,
                status,
                encoded.warnings.len()
            );
            HttpResponse::Ok().json(SaveApplicationResponse {
                record,
                warnings: encoded.warnings,
            })
        }
        Ok(None) => HttpResponse::NotFound().body(format!("Application {} not found", id)),
        Err(e) => {
            error!("saving application {}: {}", id, e);
            HttpResponse::ServiceUnavailable().body(format!("Error saving application: {}", e))
        }
    }
}
