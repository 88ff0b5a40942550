use std::path::PathBuf;

use serial_test::serial;
use todo_api::config::AppConfig;

const VARS: &[&str] = &[
    "TODO_PORT",
    "TODO_DBFILE",
    "TODO_PASSWORD",
    "TODO_JWT_SECRET",
    "TODO__TASKS__PAGE_SIZE",
    "TODO__DATABASE__DRIVER",
    "TODO__SERVER__HOST",
];

fn set(key: &str, value: &str) {
    // SAFETY: env-mutating tests are serialized with #[serial].
    unsafe { std::env::set_var(key, value) };
}

fn clear_env() {
    for key in VARS {
        // SAFETY: env-mutating tests are serialized with #[serial].
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
#[serial]
fn test_defaults_without_env() {
    clear_env();
    let config = AppConfig::load(None).expect("Failed to load config");
    assert_eq!(config.server.port, 7540);
    assert_eq!(config.database.path, PathBuf::from("scheduler.db"));
    assert_eq!(config.tasks.page_size, 50);
    assert!(!config.auth.is_enabled());
}

#[test]
#[serial]
fn test_short_variables_override() {
    clear_env();
    set("TODO_PORT", "8181");
    set("TODO_DBFILE", "/tmp/todo-test.db");
    set("TODO_PASSWORD", "hunter2");
    set("TODO_JWT_SECRET", "s3cret");

    let config = AppConfig::load(None).expect("Failed to load config");
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.database.path, PathBuf::from("/tmp/todo-test.db"));
    assert_eq!(config.auth.password(), Some("hunter2"));
    assert_eq!(config.auth.jwt_secret.as_deref(), Some("s3cret"));

    clear_env();
}

#[test]
#[serial]
fn test_nested_variables_override() {
    clear_env();
    set("TODO__TASKS__PAGE_SIZE", "20");
    set("TODO__DATABASE__DRIVER", "memory");
    set("TODO__SERVER__HOST", "127.0.0.1");

    let config = AppConfig::load(None).expect("Failed to load config");
    assert_eq!(config.tasks.page_size, 20);
    assert_eq!(config.database.driver, "memory");
    assert_eq!(config.bind_address(), "127.0.0.1:7540");

    clear_env();
}

#[test]
#[serial]
fn test_invalid_values_rejected() {
    clear_env();
    set("TODO_PORT", "not-a-port");
    assert!(AppConfig::load(None).is_err());
    clear_env();

    set("TODO__TASKS__PAGE_SIZE", "0");
    let err = AppConfig::load(None).unwrap_err();
    assert!(err.to_string().contains("page_size"));
    clear_env();

    set("TODO__DATABASE__DRIVER", "postgres");
    assert!(AppConfig::load(None).is_err());
    clear_env();
}

#[test]
#[serial]
fn test_explicit_config_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.toml");
    std::fs::write(
        &path,
        "[server]\nport = 9000\n\n[tasks]\npage_size = 10\n",
    )
    .unwrap();

    let config = AppConfig::load(path.to_str()).expect("Failed to load config");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.tasks.page_size, 10);

    let missing = dir.path().join("missing.toml");
    assert!(AppConfig::load(missing.to_str()).is_err());
}
