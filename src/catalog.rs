use crate::models::{ModuleDefinition, SelectOption, SettingField};
use once_cell::sync::Lazy;
use std::collections::HashSet;

// name, label, description and static are fixed here; poll and delay are the
// defaults copied onto the placement row when a module is added, and the
// settings entries are seeded into the settings table with these defaults.
static DEFAULT_MODULES: Lazy<Vec<ModuleDefinition>> = Lazy::new(|| {
    vec![
        ModuleDefinition {
            name: "applications".to_string(),
            label: "Applications".to_string(),
            description: "Shortcuts to your other web applications".to_string(),
            static_module: true,
            default_poll: 0,
            default_delay: 0,
            settings: vec![],
        },
        ModuleDefinition {
            name: "controls".to_string(),
            label: "Controls".to_string(),
            description: "Playback and volume controls for the active media server".to_string(),
            static_module: true,
            default_poll: 0,
            default_delay: 0,
            settings: vec![SettingField::media_server_select(
                "controls_server",
                "Media server to control",
            )],
        },
        ModuleDefinition {
            name: "diskspace".to_string(),
            label: "Disk space".to_string(),
            description: "Free space on your media drives".to_string(),
            static_module: false,
            default_poll: 350,
            default_delay: 0,
            settings: vec![],
        },
        ModuleDefinition {
            name: "library".to_string(),
            label: "Library".to_string(),
            description: "Browse the media server library".to_string(),
            static_module: false,
            default_poll: 0,
            default_delay: 0,
            settings: vec![
                SettingField::media_server_select("library_server", "Media server"),
                SettingField::bool("library_show_info", "Show media information", "1"),
            ],
        },
        ModuleDefinition {
            name: "recently_added".to_string(),
            label: "Recently added episodes".to_string(),
            description: "Episodes recently added to the library".to_string(),
            static_module: false,
            default_poll: 350,
            default_delay: 0,
            settings: vec![
                SettingField::text("num_recent_episodes", "Number of episodes to display", "3"),
                SettingField::bool(
                    "recently_added_watched_episodes",
                    "Mark watched episodes",
                    "0",
                ),
                SettingField::media_server_select("recently_added_server", "Media server"),
            ],
        },
        ModuleDefinition {
            name: "recently_added_movies".to_string(),
            label: "Recently added movies".to_string(),
            description: "Movies recently added to the library".to_string(),
            static_module: false,
            default_poll: 350,
            default_delay: 0,
            settings: vec![
                SettingField::text("num_recent_movies", "Number of movies to display", "3"),
                SettingField::media_server_select("recently_added_movies_server", "Media server"),
            ],
        },
        ModuleDefinition {
            name: "recently_added_albums".to_string(),
            label: "Recently added albums".to_string(),
            description: "Albums recently added to the library".to_string(),
            static_module: false,
            default_poll: 350,
            default_delay: 0,
            settings: vec![
                SettingField::text("num_recent_albums", "Number of albums to display", "3"),
                SettingField::media_server_select("recently_added_albums_server", "Media server"),
            ],
        },
        ModuleDefinition {
            name: "sabnzbd".to_string(),
            label: "SABnzbd+".to_string(),
            description: "Usenet download queue".to_string(),
            static_module: false,
            default_poll: 10,
            default_delay: 0,
            settings: vec![SettingField::bool(
                "sabnzbd_show_empty",
                "Show module when queue is empty",
                "1",
            )],
        },
        ModuleDefinition {
            name: "search".to_string(),
            label: "Search".to_string(),
            description: "Search box for the configured indexers".to_string(),
            static_module: true,
            default_poll: 0,
            default_delay: 0,
            settings: vec![],
        },
        ModuleDefinition {
            name: "trakt".to_string(),
            label: "Trakt".to_string(),
            description: "Recommendations and friend activity from trakt.tv".to_string(),
            static_module: false,
            default_poll: 3600,
            default_delay: 10,
            settings: vec![
                SettingField::text("trakt_api_key", "Trakt API key", ""),
                SettingField::text("trakt_username", "Trakt username", ""),
            ],
        },
        ModuleDefinition {
            name: "transmission".to_string(),
            label: "Transmission".to_string(),
            description: "Torrent download queue".to_string(),
            static_module: false,
            default_poll: 15,
            default_delay: 0,
            settings: vec![SettingField::bool(
                "transmission_show_empty",
                "Show module when queue is empty",
                "1",
            )],
        },
        ModuleDefinition {
            name: "weather".to_string(),
            label: "Weather".to_string(),
            description: "Local weather conditions".to_string(),
            static_module: false,
            default_poll: 1800,
            default_delay: 0,
            settings: vec![
                SettingField::text("weather_location", "Location code", ""),
                SettingField::select(
                    "weather_units",
                    "Units",
                    "metric",
                    vec![
                        SelectOption::new("metric", "Metric"),
                        SelectOption::new("imperial", "Imperial"),
                    ],
                ),
            ],
        },
    ]
});

/// The fixed, read-only list of module templates. Order matters: the
/// add-module menu preserves catalog order.
#[derive(Debug, Clone)]
pub struct ModuleCatalog {
    defs: Vec<ModuleDefinition>,
}

impl ModuleCatalog {
    pub fn new(defs: Vec<ModuleDefinition>) -> Self {
        Self { defs }
    }

    pub fn definitions(&self) -> &[ModuleDefinition] {
        &self.defs
    }

    pub fn lookup(&self, name: &str) -> Option<&ModuleDefinition> {
        self.defs.iter().find(|def| def.name == name)
    }

    /// Catalog entries not currently placed, in catalog order.
    pub fn available_to_add(&self, placed: &HashSet<String>) -> Vec<&ModuleDefinition> {
        self.defs
            .iter()
            .filter(|def| !placed.contains(&def.name))
            .collect()
    }
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_MODULES.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::ModuleCatalog;
    use crate::models::ModuleDefinition;
    use std::collections::HashSet;

    fn catalog(names: &[&str]) -> ModuleCatalog {
        ModuleCatalog::new(
            names
                .iter()
                .map(|name| ModuleDefinition {
                    name: name.to_string(),
                    label: name.to_string(),
                    description: String::new(),
                    static_module: false,
                    default_poll: 30,
                    default_delay: 0,
                    settings: vec![],
                })
                .collect(),
        )
    }

    #[test]
    fn lookup_is_exact_match() {
        let catalog = ModuleCatalog::default();
        assert!(catalog.lookup("diskspace").is_some());
        assert!(catalog.lookup("disk").is_none());
    }

    #[test]
    fn available_to_add_is_set_difference_in_catalog_order() {
        let catalog = catalog(&["a", "b", "c", "d"]);
        let placed: HashSet<String> = ["b", "d"].iter().map(|s| s.to_string()).collect();

        let names: Vec<&str> = catalog
            .available_to_add(&placed)
            .iter()
            .map(|def| def.name.as_str())
            .collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn available_to_add_with_nothing_placed_returns_all() {
        let catalog = catalog(&["a", "b"]);
        assert_eq!(catalog.available_to_add(&HashSet::new()).len(), 2);
    }

    #[test]
    fn available_to_add_with_everything_placed_returns_none() {
        let catalog = catalog(&["a", "b"]);
        let placed: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert!(catalog.available_to_add(&placed).is_empty());
    }

    #[test]
    fn placed_names_outside_the_catalog_are_ignored() {
        let catalog = catalog(&["a"]);
        let placed: HashSet<String> = ["ghost"].iter().map(|s| s.to_string()).collect();
        assert_eq!(catalog.available_to_add(&placed).len(), 1);
    }
}
