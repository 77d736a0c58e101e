//! # Application Service Module
//!
//! This module aggregates all API endpoints related to permit applications.
//! It routes requests under `/api/applications` to the handlers in its
//! sub-modules. Handlers stay thin: they move data between HTTP, the codec and
//! the store, and decide the `draft` / `submitted` status.
//!
//! ## Sub-modules:
//! - `create`: Inserts a new, empty draft.
//! - `get`: Loads a stored application and decodes it into the form model.
//! - `save`: Encodes a form model and writes it as a draft or a submission.

mod create;
mod get;
mod save;

#[cfg(test)]
mod tests;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// The base path for all application endpoints.
const API_PATH: &str = "/api/applications";

/// Configures and returns the Actix `Scope` for all application routes.
///
/// # Registered Routes:
///
/// *   **`POST /`**:
///     - **Handler**: `create::process`
///     - **Description**: Creates an empty draft and returns `{ "id": ... }` with `201 Created`.
///
/// *   **`GET /{application_id}`**:
///     - **Handler**: `get::process`
///     - **Description**: Returns the stored application as a `FormModel`, ready to reopen
///       in the form. Identity fields are taken from the query string
///       (`applicantName`, `email`, `phone`, `nationalId`, `organization`); they are
///       never read from storage.
///
/// *   **`POST /{application_id}/draft`**:
///     - **Handler**: `save::draft`
///     - **Description**: Encodes the `FormModel` body and stores it with status `draft`.
///
/// *   **`POST /{application_id}/submit`**:
///     - **Handler**: `save::submit`
///     - **Description**: Same as `draft`, with status `submitted`.
///
/// Both save routes answer with the stored record and the list of codec warnings.
/// Unknown ids answer `404 Not Found`; storage failures `503 Service Unavailable`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(create::process))
        .route("/{application_id}", get().to(get::process))
        .route("/{application_id}/draft", post().to(save::draft))
        .route("/{application_id}/submit", post().to(save::submit))
}
