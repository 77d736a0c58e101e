//! # Application Store
//!
//! SQLite persistence for permit applications. This is the collaborator the
//! codec hands its patches to:
//!
//! - `create_application` inserts an empty row and returns its id.
//! - `get_application` loads one row as an `ApplicationRecord`.
//! - `update_application` writes only the columns present in an
//!   `ApplicationPatch` and returns the row as stored afterwards.
//!
//! Rows move through JSON on both ways: a patch is serialized and each present
//! key becomes one `SET` assignment; a row is read into a JSON object and
//! deserialized into a record. `coordinates` is stored as JSON text.
//!
//! Every call opens its own connection, so a store can be cloned into
//! blocking tasks freely. Use [`ApplicationStore::run`] from async code.

mod error;

pub use error::StoreError;

use common::model::application::{ApplicationPatch, ApplicationRecord};
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::{Map, Number, Value};
use std::path::{Path, PathBuf};

const TABLE: &str = "applications";

/// Columns holding JSON documents rather than plain text.
const JSON_COLUMNS: &[&str] = &["coordinates"];

/// Columns with REAL affinity.
const REAL_COLUMNS: &[&str] = &["water_usage"];

#[derive(Debug, Clone)]
pub struct ApplicationStore {
    path: PathBuf,
}

impl ApplicationStore {
    /// Opens the database at `path`, creating the table if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        Ok(Connection::open(&self.path)?)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let columns: Vec<String> = ApplicationPatch::COLUMNS
            .iter()
            .map(|column| {
                let affinity = if REAL_COLUMNS.contains(column) {
                    "REAL"
                } else {
                    "TEXT"
                };
                format!("{} {}", column, affinity)
            })
            .collect();

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                {}
            )",
            TABLE,
            columns.join(",\n                ")
        );
        self.connect()?.execute_batch(&ddl)?;
        Ok(())
    }

    /// Runs `f` on the blocking thread pool.
    pub async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&ApplicationStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Inserts an empty application and returns its id.
    pub fn create_application(&self) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.connect()?.execute(
            &format!("INSERT INTO {} (id) VALUES (?1)", TABLE),
            params![id],
        )?;
        debug!("created application {}", id);
        Ok(id)
    }

    pub fn get_application(&self, id: &str) -> Result<Option<ApplicationRecord>, StoreError> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT id, created_at, updated_at, {} FROM {} WHERE id = ?1",
            ApplicationPatch::COLUMNS.join(", "),
            TABLE
        );

        let row = conn
            .query_row(&sql, params![id], |row| {
                let mut cells = Vec::with_capacity(ApplicationPatch::COLUMNS.len() + 3);
                for idx in 0..ApplicationPatch::COLUMNS.len() + 3 {
                    cells.push(row.get::<_, SqlValue>(idx)?);
                }
                Ok(cells)
            })
            .optional()?;

        let Some(cells) = row else {
            return Ok(None);
        };

        let names = ["id", "created_at", "updated_at"]
            .into_iter()
            .chain(ApplicationPatch::COLUMNS.iter().copied());
        let mut object = Map::new();
        for (name, cell) in names.zip(cells) {
            if let Some(value) = to_json(name, cell) {
                object.insert(name.to_string(), value);
            }
        }

        Ok(Some(serde_json::from_value(Value::Object(object))?))
    }

    /// Writes the columns present in `patch`. Returns `None` if `id` does not exist.
    pub fn update_application(
        &self,
        id: &str,
        patch: &ApplicationPatch,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let Value::Object(fields) = serde_json::to_value(patch)? else {
            return Err(StoreError::Task("patch did not serialize to an object".to_string()));
        };

        let mut assignments = Vec::with_capacity(fields.len() + 1);
        let mut values = Vec::with_capacity(fields.len() + 1);
        for (column, value) in fields {
            // Column names are interpolated into SQL; only accept known ones.
            let Some(column) = ApplicationPatch::COLUMNS.iter().find(|c| **c == column) else {
                continue;
            };
            values.push(to_sql(value));
            assignments.push(format!("{} = ?{}", column, values.len()));
        }
        assignments.push("updated_at = datetime('now')".to_string());
        values.push(SqlValue::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            TABLE,
            assignments.join(", "),
            values.len()
        );
        let changed = self.connect()?.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Ok(None);
        }
        debug!("updated application {} ({} columns)", id, assignments.len() - 1);
        self.get_application(id)
    }
}

fn to_sql(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) if !n.is_f64() => SqlValue::Integer(i),
            _ => n.as_f64().map_or(SqlValue::Null, SqlValue::Real),
        },
        Value::String(s) => SqlValue::Text(s),
        other => SqlValue::Text(other.to_string()),
    }
}

fn to_json(column: &str, cell: SqlValue) -> Option<Value> {
    match cell {
        SqlValue::Null | SqlValue::Blob(_) => None,
        SqlValue::Integer(i) => Some(Value::from(i)),
        SqlValue::Real(f) => Number::from_f64(f).map(Value::Number),
        // Unparsable JSON is passed through as a string for the codec to reject.
        SqlValue::Text(text) if JSON_COLUMNS.contains(&column) => {
            Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        }
        SqlValue::Text(text) => Some(Value::String(text)),
    }
}
