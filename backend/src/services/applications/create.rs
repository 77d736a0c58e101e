use crate::state::AppState;
use crate::store::StoreError;
use actix_web::{web, HttpResponse, Responder};
use common::model::application::ApplicationStatus;
use common::model::form::FormModel;
use common::requests::CreateApplicationResponse;
use log::{error, info};

/// Actix handler for `POST /api/applications`.
pub async fn process(state: web::Data<AppState>) -> impl Responder {
    match create_application(&state).await {
        Ok(id) => HttpResponse::Created().json(CreateApplicationResponse { id }),
        Err(e) => {
            error!("creating application: {}", e);
            HttpResponse::ServiceUnavailable().body(format!("Error creating application: {}", e))
        }
    }
}

/// Inserts a row and stamps it with the metadata of an empty draft.
async fn create_application(state: &AppState) -> Result<String, StoreError> {
    let patch = state
        .codec
        .encode_application(&FormModel::default(), ApplicationStatus::Draft)
        .patch;

    let id = state
        .store
        .run(move |store| {
            let id = store.create_application()?;
            store.update_application(&id, &patch)?;
            Ok(id)
        })
        .await?;

    info!("created draft application {}", id);
    Ok(id)
}
