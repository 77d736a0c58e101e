/// Errors raised by [`ApplicationStore`](super::ApplicationStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored row (or a patch) does not fit the application schema.
    #[error("application row does not match the schema: {0}")]
    Json(#[from] serde_json::Error),

    /// The blocking task running the query did not complete.
    #[error("storage task failed: {0}")]
    Task(String),
}
