use crate::auth::{AuthHandle, AUTH_PASSWORD_KEY, AUTH_USERNAME_KEY};
use crate::catalog::ModuleCatalog;
use crate::db::Database;
use crate::dialogs::DialogResolver;
use crate::errors::AppResult;
use crate::models::{
    AddModuleOutcome, DialogView, ModuleDefinition, PlacedModule, SaveOutcome, SaveServerPayload,
    SelectOption, ServerRecord, Setting, SettingsView,
};
use crate::placements::PlacementRegistry;
use crate::servers::ServerRegistry;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Wires the database, module catalog, auth handle and registries together
/// and exposes the operation surface the HTTP layer calls into.
pub struct DashboardCore {
    db: Arc<Database>,
    catalog: Arc<ModuleCatalog>,
    auth: AuthHandle,
    placements: PlacementRegistry,
    servers: ServerRegistry,
    dialogs: DialogResolver,
}

impl DashboardCore {
    pub fn new(data_dir: &Path) -> AppResult<Self> {
        Self::with_catalog(data_dir, ModuleCatalog::default())
    }

    pub fn with_catalog(data_dir: &Path, catalog: ModuleCatalog) -> AppResult<Self> {
        let db = Arc::new(Database::new(&data_dir.join("dashboard.sqlite"))?);
        let catalog = Arc::new(catalog);

        // Credentials persisted in the settings table become the live auth
        // configuration at startup; later saves keep it in sync.
        let auth = AuthHandle::default();
        if let Some(setting) = db.get_setting(AUTH_USERNAME_KEY)? {
            auth.set_username(&setting.value)?;
        }
        if let Some(setting) = db.get_setting(AUTH_PASSWORD_KEY)? {
            auth.set_password(&setting.value)?;
        }

        let servers = ServerRegistry::new(db.clone(), data_dir.join("cache").join("xbmc"));
        let dialogs = DialogResolver::new(db.clone());
        let placements = PlacementRegistry::new(
            db.clone(),
            catalog.clone(),
            auth.clone(),
            servers.clone(),
            dialogs.clone(),
        );

        Ok(Self {
            db,
            catalog,
            auth,
            placements,
            servers,
            dialogs,
        })
    }

    pub fn auth(&self) -> &AuthHandle {
        &self.auth
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    pub fn placements(&self) -> &PlacementRegistry {
        &self.placements
    }

    pub fn servers(&self) -> &ServerRegistry {
        &self.servers
    }

    pub fn dialogs(&self) -> &DialogResolver {
        &self.dialogs
    }

    /// Catalog entries not currently on the page, for the add-module menu.
    pub fn available_modules(&self) -> AppResult<Vec<ModuleDefinition>> {
        let placed: HashSet<String> = self
            .db
            .list_placed_modules()?
            .into_iter()
            .map(|module| module.name)
            .collect();
        Ok(self
            .catalog
            .available_to_add(&placed)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn placed_modules(&self) -> AppResult<Vec<PlacedModule>> {
        self.db.list_placed_modules()
    }

    pub fn add_module(&self, module_id: &str, column: i64, position: i64) -> AppResult<AddModuleOutcome> {
        self.placements.add_module(module_id, column, position)
    }

    pub fn rearrange_modules(&self, raw: &str) -> AppResult<()> {
        self.placements.rearrange(raw)
    }

    pub fn remove_module(&self, name: &str) -> AppResult<bool> {
        self.placements.remove(name)
    }

    pub fn module_settings(&self, name: &str) -> AppResult<SettingsView> {
        self.placements.settings_view(name)
    }

    pub fn save_settings(&self, name: &str, raw: &str) -> AppResult<SaveOutcome> {
        self.placements.save_settings(name, raw)
    }

    /// Create or edit a server record; `id` is present when editing.
    pub fn save_server(&self, id: Option<&str>, payload: SaveServerPayload) -> AppResult<ServerRecord> {
        match id {
            Some(id) => self.servers.update(id, payload),
            None => self.servers.create(payload),
        }
    }

    pub fn delete_server(&self, id: &str) -> AppResult<()> {
        self.servers.delete(id)
    }

    pub fn switch_server(&self, id: &str) -> AppResult<()> {
        self.servers.switch_active(id)
    }

    pub fn active_server(&self) -> AppResult<Option<ServerRecord>> {
        self.servers.active()
    }

    pub fn server_options(&self) -> AppResult<Vec<SelectOption>> {
        self.servers.options()
    }

    pub fn extra_settings_dialog(&self, dialog_type: &str) -> AppResult<DialogView> {
        self.dialogs.resolve(dialog_type)
    }

    pub fn get_setting(&self, key: &str) -> AppResult<Option<Setting>> {
        self.db.get_setting(key)
    }

    pub fn upsert_setting(&self, key: &str, value: &str) -> AppResult<()> {
        self.db.upsert_setting(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::DashboardCore;

    #[test]
    fn available_modules_shrink_as_modules_are_placed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = DashboardCore::new(dir.path()).expect("core");

        let before = core.available_modules().expect("available");
        core.add_module("diskspace", 1, 0).expect("add");
        let after = core.available_modules().expect("available");

        assert_eq!(after.len(), before.len() - 1);
        assert!(!after.iter().any(|def| def.name == "diskspace"));
    }

    #[test]
    fn persisted_credentials_seed_the_auth_config_on_startup() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let core = DashboardCore::new(dir.path()).expect("core");
            core.save_settings(
                "server_settings",
                r#"[{"name":"maraschino_username","value":"bob"},{"name":"maraschino_password","value":"hunter2"}]"#,
            )
            .expect("save");
        }

        let reopened = DashboardCore::new(dir.path()).expect("core");
        let auth = reopened.auth().snapshot().expect("snapshot");
        assert_eq!(auth.username.as_deref(), Some("bob"));
        assert_eq!(auth.password.as_deref(), Some("hunter2"));
    }
}
