use crate::errors::{AppError, AppResult};
use crate::models::{PlacedModule, RecentlyAddedCache, SaveServerPayload, ServerRecord, Setting};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

const SCHEMA_SQL: &str = include_str!("schema.sql");

#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // ─── Settings ─────────────────────────────────────────────────────────────

    pub fn get_setting(&self, key: &str) -> AppResult<Option<Setting>> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.query_row(
            "SELECT key, value FROM settings WHERE key = ?1",
            [key],
            |row| {
                Ok(Setting {
                    key: row.get(0)?,
                    value: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(AppError::from)
    }

    pub fn upsert_setting(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO settings (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Creates the row with the given value only when the key is absent.
    /// Returns whether a row was created.
    pub fn ensure_setting(&self, key: &str, value: &str) -> AppResult<bool> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let changed = conn.execute(
            "INSERT INTO settings (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO NOTHING",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    // ─── Placed modules ───────────────────────────────────────────────────────

    pub fn get_placed_module(&self, name: &str) -> AppResult<Option<PlacedModule>> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.query_row(
            "SELECT name, col, position, poll, delay FROM modules WHERE name = ?1",
            [name],
            parse_module_row,
        )
        .optional()
        .map_err(AppError::from)
    }

    pub fn list_placed_modules(&self) -> AppResult<Vec<PlacedModule>> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let mut stmt = conn.prepare(
            "SELECT name, col, position, poll, delay FROM modules ORDER BY col ASC, position ASC",
        )?;
        let rows = stmt
            .query_map([], parse_module_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Places a module and seeds its settings rows in one transaction.
    /// Re-placing an existing module moves it but keeps its poll/delay
    /// overrides; seeded settings never overwrite existing values.
    pub fn place_module(&self, module: &PlacedModule, setting_defaults: &[(String, String)]) -> AppResult<()> {
        let mut conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO modules (name, col, position, poll, delay)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(name) DO UPDATE SET col = excluded.col, position = excluded.position",
            params![module.name, module.column, module.position, module.poll, module.delay],
        )?;
        let now = Utc::now().to_rfc3339();
        for (key, value) in setting_defaults {
            tx.execute(
                "INSERT INTO settings (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO NOTHING",
                params![key, value, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn update_placement(&self, name: &str, column: i64, position: i64) -> AppResult<usize> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let changed = conn.execute(
            "UPDATE modules SET col = ?1, position = ?2 WHERE name = ?3",
            params![column, position, name],
        )?;
        Ok(changed)
    }

    pub fn update_module_poll(&self, name: &str, poll: i64) -> AppResult<usize> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let changed = conn.execute(
            "UPDATE modules SET poll = ?1 WHERE name = ?2",
            params![poll, name],
        )?;
        Ok(changed)
    }

    pub fn update_module_delay(&self, name: &str, delay: i64) -> AppResult<usize> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let changed = conn.execute(
            "UPDATE modules SET delay = ?1 WHERE name = ?2",
            params![delay, name],
        )?;
        Ok(changed)
    }

    pub fn delete_placed_module(&self, name: &str) -> AppResult<usize> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let changed = conn.execute("DELETE FROM modules WHERE name = ?1", [name])?;
        Ok(changed)
    }

    // ─── Servers ──────────────────────────────────────────────────────────────

    pub fn insert_server(&self, payload: &SaveServerPayload) -> AppResult<ServerRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO servers (id, label, position, hostname, port, username, password, mac_address, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                id,
                payload.label,
                payload.position,
                payload.hostname,
                payload.port,
                payload.username,
                payload.password,
                payload.mac_address,
                now.to_rfc3339(),
            ],
        )?;

        Ok(ServerRecord {
            id,
            label: payload.label.clone(),
            position: payload.position,
            hostname: payload.hostname.clone(),
            port: payload.port.clone(),
            username: payload.username.clone(),
            password: payload.password.clone(),
            mac_address: payload.mac_address.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_server(&self, id: &str, payload: &SaveServerPayload) -> AppResult<Option<ServerRecord>> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let changed = conn.execute(
            "UPDATE servers
             SET label = ?1, position = ?2, hostname = ?3, port = ?4, username = ?5,
                 password = ?6, mac_address = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                payload.label,
                payload.position,
                payload.hostname,
                payload.port,
                payload.username,
                payload.password,
                payload.mac_address,
                now,
                id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        drop(conn);
        self.get_server(id)
    }

    pub fn get_server(&self, id: &str) -> AppResult<Option<ServerRecord>> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.query_row(
            "SELECT id, label, position, hostname, port, username, password, mac_address, created_at, updated_at
             FROM servers WHERE id = ?1",
            [id],
            parse_server_row,
        )
        .optional()
        .map_err(AppError::from)
    }

    pub fn list_servers(&self) -> AppResult<Vec<ServerRecord>> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let mut stmt = conn.prepare(
            "SELECT id, label, position, hostname, port, username, password, mac_address, created_at, updated_at
             FROM servers ORDER BY position ASC",
        )?;
        let rows = stmt
            .query_map([], parse_server_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn delete_server_row(&self, id: &str) -> AppResult<usize> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let changed = conn.execute("DELETE FROM servers WHERE id = ?1", [id])?;
        Ok(changed)
    }

    // ─── Recently-added cache ─────────────────────────────────────────────────

    pub fn upsert_recently_added(&self, name: &str, payload: &serde_json::Value) -> AppResult<()> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO recently_added (name, payload_json, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET payload_json = excluded.payload_json, updated_at = excluded.updated_at",
            params![name, serde_json::to_string(payload)?, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get_recently_added(&self, name: &str) -> AppResult<Option<RecentlyAddedCache>> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.query_row(
            "SELECT name, payload_json, updated_at FROM recently_added WHERE name = ?1",
            [name],
            |row| {
                Ok(RecentlyAddedCache {
                    name: row.get(0)?,
                    payload: serde_json::from_str::<serde_json::Value>(&row.get::<_, String>(1)?)
                        .unwrap_or(serde_json::json!({})),
                    updated_at: parse_time(&row.get::<_, String>(2)?)?,
                })
            },
        )
        .optional()
        .map_err(AppError::from)
    }

    pub fn delete_recently_added(&self, name: &str) -> AppResult<usize> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let changed = conn.execute("DELETE FROM recently_added WHERE name = ?1", [name])?;
        Ok(changed)
    }
}

fn parse_module_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlacedModule> {
    Ok(PlacedModule {
        name: row.get(0)?,
        column: row.get(1)?,
        position: row.get(2)?,
        poll: row.get(3)?,
        delay: row.get(4)?,
    })
}

fn parse_server_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ServerRecord> {
    Ok(ServerRecord {
        id: row.get(0)?,
        label: row.get(1)?,
        position: row.get(2)?,
        hostname: row.get(3)?,
        port: row.get(4)?,
        username: row.get(5)?,
        password: row.get(6)?,
        mac_address: row.get(7)?,
        created_at: parse_time(&row.get::<_, String>(8)?)?,
        updated_at: parse_time(&row.get::<_, String>(9)?)?,
    })
}

fn parse_time(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, error.to_string())),
            )
        })
}
