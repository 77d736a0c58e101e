//! # Application Retrieval Service
//!
//! Backs `GET /api/applications/{application_id}`, used when an applicant
//! reopens a draft for editing.
//!
//! 1.  The stored row is loaded through `ApplicationStore::get_application`.
//! 2.  `Codec::decode_application` unpacks the composite columns, converts the
//!     stored point back to latitude/longitude and lower-cases the province.
//! 3.  Identity and contact fields come from the query string; storage does not
//!     hold them.
//!
//! Values that cannot be decoded come back empty rather than failing the
//! request, so the form can highlight what needs to be filled in again.

use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use common::model::form::UserContext;
use log::error;

/// Actix handler for `GET /api/applications/{application_id}`.
///
/// # Returns
/// - `200 OK` with the decoded `FormModel`.
/// - `404 Not Found` if no application has this id.
/// - `503 Service Unavailable` if the store cannot be read.
pub async fn process(
    state: web::Data<AppState>,
    application_id: web::Path<String>,
    user: web::Query<UserContext>,
) -> impl Responder {
    let id = application_id.into_inner();
    let lookup = id.clone();
    let record = state
        .store
        .run(move |store| store.get_application(&lookup))
        .await;

    match record {
        Ok(Some(record)) => {
            let form = state.codec.decode_application(&record, &user);
            HttpResponse::Ok().json(form)
        }
        Ok(None) => HttpResponse::NotFound().body(format!("Application {} not found", id)),
        Err(e) => {
            error!("loading application {}: {}", id, e);
            HttpResponse::ServiceUnavailable().body(format!("Error retrieving application: {}", e))
        }
    }
}
