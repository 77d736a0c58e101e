//! Shared application state injected into every handler as `web::Data<AppState>`.

use crate::store::ApplicationStore;
use common::codec::Codec;

#[derive(Clone)]
pub struct AppState {
    /// Persistence for application rows.
    pub store: ApplicationStore,
    /// Stateless; cloned per worker.
    pub codec: Codec,
}
