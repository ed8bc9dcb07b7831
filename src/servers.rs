use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{ConnectionInfo, SaveServerPayload, SelectOption, ServerRecord};
use crate::redaction;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

pub const ACTIVE_SERVER_KEY: &str = "active_server";

const DEFAULT_SERVER_LABEL: &str = "XBMC server";

/// Remote media-server connection records, plus which one is active and the
/// cleanup policy for a server's cached artifacts.
#[derive(Clone)]
pub struct ServerRegistry {
    db: Arc<Database>,
    cache_root: PathBuf,
}

impl ServerRegistry {
    pub fn new(db: Arc<Database>, cache_root: PathBuf) -> Self {
        Self { db, cache_root }
    }

    /// An empty label falls back to a fixed placeholder. The first server
    /// ever created becomes the active one.
    pub fn create(&self, mut payload: SaveServerPayload) -> AppResult<ServerRecord> {
        if payload.label.is_empty() {
            payload.label = DEFAULT_SERVER_LABEL.to_string();
        }
        let record = self.db.insert_server(&payload)?;

        if self.db.ensure_setting(ACTIVE_SERVER_KEY, &record.id)? {
            tracing::info!(id = %record.id, label = %record.label, "first media server registered, marking it active");
        }

        Ok(record)
    }

    pub fn update(&self, id: &str, mut payload: SaveServerPayload) -> AppResult<ServerRecord> {
        if payload.label.is_empty() {
            payload.label = DEFAULT_SERVER_LABEL.to_string();
        }
        self.db
            .update_server(id, &payload)?
            .ok_or_else(|| AppError::NotFound(format!("No media server with id {}", id)))
    }

    pub fn get(&self, id: &str) -> AppResult<ServerRecord> {
        self.db
            .get_server(id)?
            .ok_or_else(|| AppError::NotFound(format!("No media server with id {}", id)))
    }

    pub fn list(&self) -> AppResult<Vec<ServerRecord>> {
        self.db.list_servers()
    }

    /// The record the `active_server` setting points at, if any. The setting
    /// may dangle after a delete; a dangling id resolves to `None`.
    pub fn active(&self) -> AppResult<Option<ServerRecord>> {
        let Some(setting) = self.db.get_setting(ACTIVE_SERVER_KEY)? else {
            return Ok(None);
        };
        self.db.get_server(&setting.value)
    }

    /// Deletes the record, its cached recently-added rows and its on-disk
    /// image cache. The cache steps are best-effort: failures are logged and
    /// never fail the delete.
    pub fn delete(&self, id: &str) -> AppResult<()> {
        let record = self.get(id)?;
        self.db.delete_server_row(id)?;

        for name in cache_entry_names(&record.label) {
            match self.db.delete_recently_added(&name) {
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(name = %name, error = %error, "failed to remove recently-added cache row");
                }
            }
        }

        let image_dir = self.cache_root.join(&record.label);
        if image_dir.is_dir() {
            if let Err(error) = fs::remove_dir_all(&image_dir) {
                tracing::warn!(path = %image_dir.to_string_lossy(), error = %error, "failed to remove server image cache");
            }
        }

        Ok(())
    }

    pub fn switch_active(&self, id: &str) -> AppResult<()> {
        let record = self.get(id)?;
        self.db.upsert_setting(ACTIVE_SERVER_KEY, &record.id)?;
        tracing::info!(id = %record.id, label = %record.label, "switched active media server");
        Ok(())
    }

    /// Builds the JSON-RPC connection descriptor for a record. The API URL is
    /// empty unless both hostname and port are set; the credential segment is
    /// included only when both username and password are non-empty.
    pub fn connection_info(record: &ServerRecord) -> ConnectionInfo {
        let mut api = String::new();
        if !record.hostname.is_empty() && !record.port.is_empty() {
            api.push_str("http://");
            if !record.username.is_empty() && !record.password.is_empty() {
                api.push_str(&format!("{}:{}@", record.username, record.password));
            }
            api.push_str(&format!("{}:{}/jsonrpc", record.hostname, record.port));
        }

        ConnectionInfo {
            label: record.label.clone(),
            hostname: record.hostname.clone(),
            port: record.port.clone(),
            username: record.username.clone(),
            password: record.password.clone(),
            mac_address: record.mac_address.clone(),
            api,
        }
    }

    /// Options for a server-selector control: a `Default` sentinel followed
    /// by one option per server in position order. The option value is a
    /// stable encoding of the full connection descriptor.
    pub fn options(&self) -> AppResult<Vec<SelectOption>> {
        let mut options = vec![SelectOption::new("", "Default")];

        for server in self.list()? {
            let info = Self::connection_info(&server);
            tracing::debug!(
                label = %info.label,
                api = %redaction::mask_secrets(&info.api),
                "built media server option"
            );
            let value = BASE64.encode(serde_json::to_vec(&info)?);
            options.push(SelectOption::new(value, server.label.clone()));
        }

        Ok(options)
    }
}

pub(crate) fn cache_entry_names(label: &str) -> [String; 3] {
    [
        format!("{}_episodes", label),
        format!("{}_movies", label),
        format!("{}_albums", label),
    ]
}
