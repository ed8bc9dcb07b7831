use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{DialogType, DialogView, ResolvedField, SelectOption, SettingField};
use once_cell::sync::Lazy;
use std::sync::Arc;

pub static SEARCH_SETTINGS: Lazy<Vec<SettingField>> = Lazy::new(|| {
    vec![
        SettingField::bool("search", "Enable search feature", "0"),
        SettingField::text("search_retention", "Usenet retention", ""),
        SettingField::bool("search_ssl", "Prefer SSL", "0"),
        SettingField::bool("search_english", "Prefer English only", "0"),
    ]
});

pub static MISC_SETTINGS: Lazy<Vec<SettingField>> = Lazy::new(|| {
    vec![
        SettingField::select(
            "show_currently_playing",
            "Show currently playing bar",
            "1",
            vec![
                SelectOption::new("1", "Yes"),
                SelectOption::new("2", "Minimized"),
                SelectOption::new("0", "No"),
            ],
        ),
        SettingField::bool(
            "fanart_backgrounds",
            "Show fanart backgrounds when watching media",
            "0",
        ),
        SettingField::bool(
            "random_backgrounds",
            "Use a random background when not watching media",
            "0",
        ),
        SettingField::text(
            "remote_inactivity_enable",
            "Disable remote control after x seconds of inactivity (0 to disable)",
            "60",
        ),
        SettingField::select(
            "num_columns",
            "Number of columns",
            "3",
            vec![
                SelectOption::new("3", "3"),
                SelectOption::new("4", "4"),
                SelectOption::new("5", "5"),
            ],
        ),
        SettingField::text("title_color", "Module title color (hexadecimal)", "EEE"),
    ]
});

pub static SERVER_SETTINGS: Lazy<Vec<SettingField>> = Lazy::new(|| {
    vec![
        SettingField::text("maraschino_username", "Maraschino username", ""),
        SettingField::text("maraschino_password", "Maraschino password", ""),
        SettingField::text("maraschino_port", "Maraschino port", "7000"),
        SettingField::text("maraschino_webroot", "Maraschino webroot", ""),
    ]
});

const SEARCH_DIALOG_TEXT: &str =
    "N.B. With search enabled, you can press 'ALT-s' to display the search module.";

/// Maps a dialog tag to its static field list and overlays stored values.
#[derive(Clone)]
pub struct DialogResolver {
    db: Arc<Database>,
}

impl DialogResolver {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn resolve(&self, dialog_type: &str) -> AppResult<DialogView> {
        self.resolve_with_confirmation(dialog_type, false)
    }

    /// `updated` is set on the view returned after a server-settings save,
    /// which re-renders the dialog with a confirmation instead of closing.
    pub fn resolve_with_confirmation(&self, dialog_type: &str, updated: bool) -> AppResult<DialogView> {
        let parsed = DialogType::parse(dialog_type)
            .ok_or_else(|| AppError::UnknownDialogType(dialog_type.to_string()))?;

        let (title, text, fields) = match parsed {
            DialogType::SearchSettings => (
                "Search settings",
                Some(SEARCH_DIALOG_TEXT.to_string()),
                &*SEARCH_SETTINGS,
            ),
            DialogType::MiscSettings => ("Misc. settings", None, &*MISC_SETTINGS),
            DialogType::ServerSettings => ("Server settings", None, &*SERVER_SETTINGS),
        };

        Ok(DialogView {
            dialog_type: parsed,
            title: title.to_string(),
            text,
            fields: resolve_fields(&self.db, fields)?,
            updated,
        })
    }
}

/// Overlays stored setting values onto a field list, falling back to each
/// field's default when no row exists yet.
pub(crate) fn resolve_fields(db: &Database, fields: &[SettingField]) -> AppResult<Vec<ResolvedField>> {
    fields
        .iter()
        .map(|field| {
            let value = db
                .get_setting(&field.key)?
                .map(|setting| setting.value)
                .unwrap_or_else(|| field.default.clone());
            Ok(ResolvedField {
                key: field.key.clone(),
                label: field.label.clone(),
                value,
                kind: field.kind.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::DialogResolver;
    use crate::db::Database;
    use crate::errors::AppError;
    use crate::models::DialogType;
    use std::sync::Arc;

    fn resolver(dir: &tempfile::TempDir) -> (Arc<Database>, DialogResolver) {
        let db = Arc::new(Database::new(&dir.path().join("test.db")).expect("db"));
        (db.clone(), DialogResolver::new(db))
    }

    #[test]
    fn unknown_dialog_type_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_db, resolver) = resolver(&dir);

        let error = resolver.resolve("plex_settings").expect_err("should fail");
        assert!(matches!(error, AppError::UnknownDialogType(_)));
    }

    #[test]
    fn dialog_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_db, resolver) = resolver(&dir);

        let view = resolver.resolve("server_settings").expect("resolve");
        assert_eq!(view.dialog_type, DialogType::ServerSettings);
        assert!(!view.updated);

        let port = view
            .fields
            .iter()
            .find(|field| field.key == "maraschino_port")
            .expect("port field");
        assert_eq!(port.value, "7000");
    }

    #[test]
    fn dialog_fields_overlay_stored_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (db, resolver) = resolver(&dir);

        db.upsert_setting("num_columns", "5").expect("store");
        let view = resolver.resolve("misc_settings").expect("resolve");

        let columns = view
            .fields
            .iter()
            .find(|field| field.key == "num_columns")
            .expect("columns field");
        assert_eq!(columns.value, "5");
    }

    #[test]
    fn search_dialog_carries_the_shortcut_hint() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_db, resolver) = resolver(&dir);

        let view = resolver.resolve("search_settings").expect("resolve");
        assert!(view.text.expect("text").contains("ALT-s"));
    }
}
