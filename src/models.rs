use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Display type of a settings field, tagged as `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Bool,
    Select { options: Vec<SelectOption> },
    /// A select whose options are the registered media servers. Options are
    /// filled in at view time by the server registry.
    MediaServerSelect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingField {
    pub key: String,
    pub label: String,
    pub default: String,
    pub kind: FieldKind,
}

impl SettingField {
    pub fn text(key: &str, label: &str, default: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            default: default.to_string(),
            kind: FieldKind::Text,
        }
    }

    pub fn bool(key: &str, label: &str, default: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            default: default.to_string(),
            kind: FieldKind::Bool,
        }
    }

    pub fn select(key: &str, label: &str, default: &str, options: Vec<SelectOption>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            default: default.to_string(),
            kind: FieldKind::Select { options },
        }
    }

    pub fn media_server_select(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            default: String::new(),
            kind: FieldKind::MediaServerSelect,
        }
    }
}

/// A module template from the fixed catalog. `name` is the unique key;
/// `label`, `description` and the defaults are not user-editable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDefinition {
    pub name: String,
    pub label: String,
    pub description: String,
    /// Static modules have no refresh cycle; poll and delay are ignored.
    pub static_module: bool,
    pub default_poll: i64,
    pub default_delay: i64,
    pub settings: Vec<SettingField>,
}

impl ModuleDefinition {
    pub fn has_settings(&self) -> bool {
        !self.settings.is_empty()
    }
}

/// A module currently placed on the dashboard. At most one row per name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedModule {
    pub name: String,
    pub column: i64,
    pub position: i64,
    pub poll: i64,
    pub delay: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    pub id: String,
    pub label: String,
    pub position: i64,
    pub hostname: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub mac_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveServerPayload {
    pub label: String,
    pub position: i64,
    pub hostname: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub mac_address: String,
}

/// Cached recently-added rows, keyed by `<label>_episodes` / `_movies` /
/// `_albums`. Owned by the server whose label prefixes the name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyAddedCache {
    pub name: String,
    pub payload: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Connection descriptor for a media server's JSON-RPC endpoint. `api` is
/// empty when the record has no hostname or port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub label: String,
    pub hostname: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub mac_address: String,
    pub api: String,
}

/// What the presentation layer needs to render a placed module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderableModule {
    pub name: String,
    pub label: String,
    pub template: String,
    pub static_module: bool,
    pub poll: i64,
    pub delay: i64,
}

/// A settings field merged with its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField {
    pub key: String,
    pub label: String,
    pub value: String,
    pub kind: FieldKind,
}

/// Module settings dialog contents: schema merged with stored values plus
/// the current poll/delay from the placement row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub name: String,
    pub label: String,
    pub static_module: bool,
    pub poll: i64,
    pub delay: i64,
    pub fields: Vec<ResolvedField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AddModuleOutcome {
    /// Static module with no settings: render immediately.
    Ready { module: RenderableModule },
    /// The caller must route to the settings dialog before first display.
    NeedsSettings { view: SettingsView },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogType {
    SearchSettings,
    MiscSettings,
    ServerSettings,
}

impl DialogType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SearchSettings => "search_settings",
            Self::MiscSettings => "misc_settings",
            Self::ServerSettings => "server_settings",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "search_settings" => Some(Self::SearchSettings),
            "misc_settings" => Some(Self::MiscSettings),
            "server_settings" => Some(Self::ServerSettings),
            _ => None,
        }
    }
}

/// Extra settings dialog contents. `updated` drives the "settings saved"
/// confirmation shown after a server-settings save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogView {
    pub dialog_type: DialogType,
    pub title: String,
    pub text: Option<String>,
    pub fields: Vec<ResolvedField>,
    pub updated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SaveOutcome {
    /// A placed module's settings were saved: the caller re-renders it.
    Module { module: RenderableModule },
    /// A search/misc dialog save: plain success, the dialog closes.
    Saved,
    /// Server-settings saves re-render the dialog with a confirmation.
    ServerSettingsSaved { view: DialogView },
}

/// One entry of a rearrange payload; the client sends the full layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementUpdate {
    pub name: String,
    pub column: i64,
    pub position: i64,
}

/// One entry of a settings-save payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingEntry {
    pub name: String,
    pub value: String,
}
