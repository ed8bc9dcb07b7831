use crate::auth::{AuthHandle, AUTH_PASSWORD_KEY, AUTH_USERNAME_KEY};
use crate::catalog::ModuleCatalog;
use crate::db::Database;
use crate::dialogs::DialogResolver;
use crate::errors::{AppError, AppResult};
use crate::models::{
    AddModuleOutcome, DialogType, FieldKind, ModuleDefinition, PlacedModule, PlacementUpdate,
    RenderableModule, ResolvedField, SaveOutcome, SettingEntry, SettingsView,
};
use crate::servers::ServerRegistry;
use std::sync::Arc;

enum SaveTarget<'a> {
    Dialog(DialogType),
    Module(&'a ModuleDefinition),
}

/// Tracks which modules are placed on the dashboard and at what
/// column/position, and owns the module settings dialog flow.
#[derive(Clone)]
pub struct PlacementRegistry {
    db: Arc<Database>,
    catalog: Arc<ModuleCatalog>,
    auth: AuthHandle,
    servers: ServerRegistry,
    dialogs: DialogResolver,
}

impl PlacementRegistry {
    pub fn new(
        db: Arc<Database>,
        catalog: Arc<ModuleCatalog>,
        auth: AuthHandle,
        servers: ServerRegistry,
        dialogs: DialogResolver,
    ) -> Self {
        Self {
            db,
            catalog,
            auth,
            servers,
            dialogs,
        }
    }

    pub fn placed(&self) -> AppResult<Vec<PlacedModule>> {
        self.db.list_placed_modules()
    }

    /// Places a module with its catalog defaults and seeds its settings rows.
    /// Existing setting values are never overwritten, so re-adding a module
    /// keeps whatever the user configured before.
    pub fn add_module(&self, module_id: &str, column: i64, position: i64) -> AppResult<AddModuleOutcome> {
        let def = self
            .catalog
            .lookup(module_id)
            .ok_or_else(|| AppError::UnknownModule(module_id.to_string()))?;

        let placed = PlacedModule {
            name: def.name.clone(),
            column,
            position,
            poll: def.default_poll,
            delay: def.default_delay,
        };
        let defaults: Vec<(String, String)> = def
            .settings
            .iter()
            .map(|field| (field.key.clone(), field.default.clone()))
            .collect();
        self.db.place_module(&placed, &defaults)?;
        tracing::info!(name = %def.name, column, position, "module added to the page");

        // Static modules without settings render straight away; everything
        // else goes through the settings dialog first.
        if def.static_module && !def.has_settings() {
            Ok(AddModuleOutcome::Ready {
                module: renderable(def, &placed),
            })
        } else {
            Ok(AddModuleOutcome::NeedsSettings {
                view: self.settings_view(&def.name)?,
            })
        }
    }

    /// Applies a full-layout rearrange payload. Entries naming modules that
    /// are not on the page are skipped; only a malformed payload fails.
    pub fn rearrange(&self, raw: &str) -> AppResult<()> {
        let updates: Vec<PlacementUpdate> = serde_json::from_str(raw)
            .map_err(|error| AppError::InvalidValue(format!("malformed rearrange payload: {}", error)))?;

        for update in updates {
            let changed = self
                .db
                .update_placement(&update.name, update.column, update.position)?;
            if changed == 0 {
                tracing::debug!(name = %update.name, "skipping rearrange entry for module not on the page");
            }
        }
        Ok(())
    }

    /// Removes a module from the page. Idempotent: removing a module that is
    /// not placed is a no-op, not an error.
    pub fn remove(&self, name: &str) -> AppResult<bool> {
        let removed = self.db.delete_placed_module(name)?;
        if removed == 0 {
            tracing::debug!(name = %name, "remove requested for module not on the page");
        }
        Ok(removed > 0)
    }

    /// The module settings dialog: schema merged with stored values, plus the
    /// current poll/delay from the placement row.
    pub fn settings_view(&self, name: &str) -> AppResult<SettingsView> {
        let def = self
            .catalog
            .lookup(name)
            .ok_or_else(|| AppError::NotFound(format!("No module template named {}", name)))?;
        let placed = self
            .db
            .get_placed_module(name)?
            .ok_or_else(|| AppError::NotFound(format!("Module {} is not on the page", name)))?;

        Ok(SettingsView {
            name: def.name.clone(),
            label: def.label.clone(),
            static_module: def.static_module,
            poll: placed.poll,
            delay: placed.delay,
            fields: self.resolve_fields(def)?,
        })
    }

    /// Saves a settings dialog. `poll`/`delay` entries update the placement
    /// row; everything else is upserted into the settings table. Saves to the
    /// dashboard credential keys also update the live auth configuration.
    pub fn save_settings(&self, name: &str, raw: &str) -> AppResult<SaveOutcome> {
        let entries: Vec<SettingEntry> = serde_json::from_str(raw)
            .map_err(|error| AppError::InvalidValue(format!("malformed settings payload: {}", error)))?;

        let target = match DialogType::parse(name) {
            Some(dialog) => SaveTarget::Dialog(dialog),
            None => SaveTarget::Module(
                self.catalog
                    .lookup(name)
                    .ok_or_else(|| AppError::UnknownModule(name.to_string()))?,
            ),
        };

        // Validate everything before the first write so a bad entry leaves
        // the registry untouched.
        let mut interval_updates: Vec<(String, i64)> = Vec::new();
        let mut setting_writes: Vec<(String, String)> = Vec::new();
        for entry in entries {
            if entry.name == "poll" || entry.name == "delay" {
                let value: i64 = entry.value.trim().parse().map_err(|_| {
                    AppError::InvalidValue(format!(
                        "{} must be an integer, got '{}'",
                        entry.name, entry.value
                    ))
                })?;
                interval_updates.push((entry.name, value));
            } else {
                setting_writes.push((entry.name, entry.value));
            }
        }

        if let SaveTarget::Module(def) = &target {
            if self.db.get_placed_module(&def.name)?.is_none() {
                return Err(AppError::NotFound(format!("Module {} is not on the page", name)));
            }
        }

        for (field, value) in &interval_updates {
            if field == "poll" {
                self.db.update_module_poll(name, *value)?;
            } else {
                self.db.update_module_delay(name, *value)?;
            }
        }

        for (key, value) in &setting_writes {
            self.db.upsert_setting(key, value)?;
            match key.as_str() {
                AUTH_USERNAME_KEY => self.auth.set_username(value)?,
                AUTH_PASSWORD_KEY => self.auth.set_password(value)?,
                _ => {}
            }
        }

        match target {
            SaveTarget::Dialog(DialogType::ServerSettings) => Ok(SaveOutcome::ServerSettingsSaved {
                view: self.dialogs.resolve_with_confirmation(name, true)?,
            }),
            SaveTarget::Dialog(_) => Ok(SaveOutcome::Saved),
            SaveTarget::Module(def) => {
                let placed = self
                    .db
                    .get_placed_module(&def.name)?
                    .ok_or_else(|| AppError::NotFound(format!("Module {} is not on the page", name)))?;
                Ok(SaveOutcome::Module {
                    module: renderable(def, &placed),
                })
            }
        }
    }

    fn resolve_fields(&self, def: &ModuleDefinition) -> AppResult<Vec<ResolvedField>> {
        def.settings
            .iter()
            .map(|field| {
                let value = self
                    .db
                    .get_setting(&field.key)?
                    .map(|setting| setting.value)
                    .unwrap_or_else(|| field.default.clone());
                // Media-server selects get their options from the server
                // registry at view time.
                let kind = match &field.kind {
                    FieldKind::MediaServerSelect => FieldKind::Select {
                        options: self.servers.options()?,
                    },
                    other => other.clone(),
                };
                Ok(ResolvedField {
                    key: field.key.clone(),
                    label: field.label.clone(),
                    value,
                    kind,
                })
            })
            .collect()
    }
}

fn renderable(def: &ModuleDefinition, placed: &PlacedModule) -> RenderableModule {
    RenderableModule {
        name: def.name.clone(),
        label: def.label.clone(),
        template: format!("{}.html", def.name),
        static_module: def.static_module,
        poll: placed.poll,
        delay: placed.delay,
    }
}
