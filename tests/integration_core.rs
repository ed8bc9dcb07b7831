use maraschino_core::{
    AddModuleOutcome, AppError, DashboardCore, SaveOutcome, SaveServerPayload,
};

fn server(label: &str, position: i64) -> SaveServerPayload {
    SaveServerPayload {
        label: label.to_string(),
        position,
        hostname: label.to_lowercase(),
        port: "9090".to_string(),
        username: "bob".to_string(),
        password: "hunter2".to_string(),
        mac_address: "00:11:22:33:44:55".to_string(),
    }
}

#[test]
fn module_lifecycle_from_add_to_remove() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = DashboardCore::new(dir.path()).expect("core");

    // Fresh page: everything is available, nothing is placed.
    let catalog_size = core.available_modules().expect("available").len();
    assert!(core.placed_modules().expect("placed").is_empty());

    // A static module without settings renders immediately.
    match core.add_module("applications", 1, 0).expect("add") {
        AddModuleOutcome::Ready { module } => assert_eq!(module.template, "applications.html"),
        other => panic!("expected ready outcome, got {:?}", other),
    }

    // A configurable module routes to its settings dialog first.
    let view = match core.add_module("recently_added", 2, 0).expect("add") {
        AddModuleOutcome::NeedsSettings { view } => view,
        other => panic!("expected settings outcome, got {:?}", other),
    };
    assert_eq!(view.poll, 350);
    assert!(view
        .fields
        .iter()
        .any(|field| field.key == "num_recent_episodes" && field.value == "3"));

    assert_eq!(core.available_modules().expect("available").len(), catalog_size - 2);

    // Rearranging applies the full layout and skips stale entries.
    core.rearrange_modules(
        r#"[{"name":"applications","column":3,"position":1},{"name":"ghost","column":1,"position":0}]"#,
    )
    .expect("rearrange");
    let placed = core.placed_modules().expect("placed");
    let applications = placed
        .iter()
        .find(|module| module.name == "applications")
        .expect("applications placed");
    assert_eq!((applications.column, applications.position), (3, 1));

    // Saving settings updates the placement row and the settings table.
    match core
        .save_settings(
            "recently_added",
            r#"[{"name":"poll","value":"120"},{"name":"num_recent_episodes","value":"5"}]"#,
        )
        .expect("save")
    {
        SaveOutcome::Module { module } => assert_eq!(module.poll, 120),
        other => panic!("expected module outcome, got {:?}", other),
    }
    assert_eq!(
        core.get_setting("num_recent_episodes")
            .expect("get")
            .expect("row")
            .value,
        "5"
    );

    // Removal is tolerant and frees the catalog slot again.
    assert!(core.remove_module("recently_added").expect("remove"));
    assert!(!core.remove_module("recently_added").expect("remove again"));
    assert_eq!(core.available_modules().expect("available").len(), catalog_size - 1);
}

#[test]
fn server_lifecycle_with_cache_cleanup() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = DashboardCore::new(dir.path()).expect("core");

    let lounge = core.save_server(None, server("Lounge", 1)).expect("create");
    let bedroom = core.save_server(None, server("Bedroom", 2)).expect("create");

    // First server registered became active; switching moves the pointer.
    assert_eq!(
        core.get_setting("active_server").expect("get").expect("row").value,
        lounge.id
    );
    core.switch_server(&bedroom.id).expect("switch");
    assert_eq!(
        core.get_setting("active_server").expect("get").expect("row").value,
        bedroom.id
    );

    // Selector options: sentinel first, then servers by position.
    let options = core.server_options().expect("options");
    let labels: Vec<&str> = options.iter().map(|option| option.label.as_str()).collect();
    assert_eq!(labels, ["Default", "Lounge", "Bedroom"]);

    // Editing keeps the id and bumps the stored fields.
    let renamed = core
        .save_server(Some(&lounge.id), server("Cinema", 1))
        .expect("update");
    assert_eq!(renamed.id, lounge.id);
    assert_eq!(renamed.label, "Cinema");

    // Deleting removes the record and its cached artifacts.
    let image_dir = dir.path().join("cache").join("xbmc").join("Cinema");
    std::fs::create_dir_all(&image_dir).expect("image dir");
    core.delete_server(&lounge.id).expect("delete");
    assert!(!image_dir.exists());
    assert!(matches!(
        core.delete_server(&lounge.id).expect_err("already gone"),
        AppError::NotFound(_)
    ));
}

#[test]
fn server_settings_save_applies_credentials_immediately() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = DashboardCore::new(dir.path()).expect("core");

    let outcome = core
        .save_settings(
            "server_settings",
            r#"[{"name":"maraschino_username","value":"bob"},{"name":"maraschino_port","value":"7001"}]"#,
        )
        .expect("save");
    match outcome {
        SaveOutcome::ServerSettingsSaved { view } => assert!(view.updated),
        other => panic!("expected confirmation outcome, got {:?}", other),
    }

    let auth = core.auth().snapshot().expect("snapshot");
    assert_eq!(auth.username.as_deref(), Some("bob"));

    let dialog = core.extra_settings_dialog("server_settings").expect("dialog");
    assert!(!dialog.updated);
    assert!(dialog
        .fields
        .iter()
        .any(|field| field.key == "maraschino_port" && field.value == "7001"));
}

#[test]
fn unknown_identifiers_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let core = DashboardCore::new(dir.path()).expect("core");

    assert!(matches!(
        core.add_module("ghost", 1, 0).expect_err("unknown module"),
        AppError::UnknownModule(_)
    ));
    assert!(matches!(
        core.extra_settings_dialog("ghost_settings").expect_err("unknown dialog"),
        AppError::UnknownDialogType(_)
    ));
    assert!(matches!(
        core.switch_server("ghost").expect_err("unknown server"),
        AppError::NotFound(_)
    ));
}
