use crate::codec::CodecWarning;
use crate::model::application::ApplicationRecord;
use serde::{Deserialize, Serialize};

/// Response of `POST /api/applications`.
/// Carries the id of the empty draft that was just created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApplicationResponse {
    pub id: String,
}

/// Response of the draft and submit endpoints.
///
/// `record` is the row as stored after the update. `warnings` lists values that
/// could not be stored exactly as entered, so the form can point the applicant
/// at them.
#[derive(Debug, Clone, Serialize)]
pub struct SaveApplicationResponse {
    pub record: ApplicationRecord,
    pub warnings: Vec<CodecWarning>,
}
