mod auth;
mod catalog;
mod dashboard;
mod db;
mod dialogs;
mod errors;
mod models;
mod placements;
mod redaction;
mod servers;

pub use crate::auth::{AuthConfig, AuthHandle, AUTH_PASSWORD_KEY, AUTH_USERNAME_KEY};
pub use crate::catalog::ModuleCatalog;
pub use crate::dashboard::DashboardCore;
pub use crate::db::Database;
pub use crate::dialogs::DialogResolver;
pub use crate::errors::{AppError, AppResult};
pub use crate::models::{
    AddModuleOutcome, ConnectionInfo, DialogType, DialogView, FieldKind, ModuleDefinition,
    PlacedModule, PlacementUpdate, RecentlyAddedCache, RenderableModule, ResolvedField,
    SaveOutcome, SaveServerPayload, SelectOption, ServerRecord, Setting, SettingEntry,
    SettingField, SettingsView,
};
pub use crate::placements::PlacementRegistry;
pub use crate::redaction::mask_secrets;
pub use crate::servers::{ServerRegistry, ACTIVE_SERVER_KEY};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn init_tracing(data_dir: &Path) -> Result<(), String> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "dashboard.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
