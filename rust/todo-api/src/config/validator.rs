//! Startup validation for the task scheduler configuration.
//!
//! Every rule runs and all failures are reported together, so a broken
//! deployment is fixed in one pass instead of one error at a time.

use super::error::{ConfigResult, ConfigurationError};
use super::{AppConfig, AuthConfig, DatabaseConfig, DatabaseDriver, ServerConfig, TasksConfig};

/// Largest accepted listing page size.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Configuration validator.
///
/// | Setting                 | Rule                              |
/// |-------------------------|-----------------------------------|
/// | `server.port`           | not 0                             |
/// | `server.timeout_secs`   | not 0                             |
/// | `database.driver`       | `sqlite` or `memory`              |
/// | `database.path`         | non-empty for `sqlite`            |
/// | `tasks.page_size`       | 1..=1000                          |
/// | `auth.token_ttl_hours`  | not 0                             |
/// | `auth.jwt_secret`       | non-empty when set                |
#[derive(Debug)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the entire application configuration.
    ///
    /// Returns `Ok(())` if valid, or a `ConfigurationError` with all issues.
    pub fn validate(config: &AppConfig) -> ConfigResult<()> {
        let mut errors = Vec::new();

        errors.extend(Self::validate_server(&config.server));
        errors.extend(Self::validate_database(&config.database));
        errors.extend(Self::validate_tasks(&config.tasks));
        errors.extend(Self::validate_auth(&config.auth));

        match ConfigurationError::collect(errors) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Validate the HTTP server settings.
    pub fn validate_server(server: &ServerConfig) -> Vec<ConfigurationError> {
        let mut errors = Vec::new();
        if server.port == 0 {
            errors.push(ConfigurationError::invalid(
                "server.port must not be 0",
                "Set TODO_PORT or TODO__SERVER__PORT to a free port, e.g. 7540.",
            ));
        }
        if server.timeout_secs == 0 {
            errors.push(ConfigurationError::invalid(
                "server.timeout_secs must be at least 1",
                "Set TODO__SERVER__TIMEOUT_SECS to a positive number of seconds.",
            ));
        }
        errors
    }

    /// Validate the task store settings.
    pub fn validate_database(database: &DatabaseConfig) -> Vec<ConfigurationError> {
        match database.driver() {
            Ok(DatabaseDriver::Sqlite) if database.path.as_os_str().is_empty() => {
                vec![ConfigurationError::missing_required(
                    "database.path",
                    "Storing tasks with the sqlite driver",
                    "TODO_DBFILE or TODO__DATABASE__PATH",
                )]
            }
            Ok(_) => Vec::new(),
            Err(reason) => vec![ConfigurationError::invalid(
                reason,
                "Set TODO__DATABASE__DRIVER to 'sqlite' or 'memory'.",
            )],
        }
    }

    /// Validate the listing settings.
    pub fn validate_tasks(tasks: &TasksConfig) -> Vec<ConfigurationError> {
        if (1..=MAX_PAGE_SIZE).contains(&tasks.page_size) {
            Vec::new()
        } else {
            vec![ConfigurationError::invalid(
                format!(
                    "tasks.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                    tasks.page_size
                ),
                "Set TODO__TASKS__PAGE_SIZE to a value in range, e.g. 50.",
            )]
        }
    }

    /// Validate the sign-in settings.
    pub fn validate_auth(auth: &AuthConfig) -> Vec<ConfigurationError> {
        let mut errors = Vec::new();
        if auth.token_ttl_hours == 0 {
            errors.push(ConfigurationError::invalid(
                "auth.token_ttl_hours must be at least 1",
                "Set TODO__AUTH__TOKEN_TTL_HOURS to a positive number of hours.",
            ));
        }
        if auth.jwt_secret.as_deref().is_some_and(str::is_empty) {
            errors.push(ConfigurationError::invalid(
                "auth.jwt_secret is set but empty",
                "Unset TODO_JWT_SECRET to use a generated secret, or give it a value.",
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_memory_driver_needs_no_path() {
        let mut config = AppConfig::default();
        config.database.driver = "memory".to_string();
        config.database.path = PathBuf::new();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("server.port"));
        assert!(err.to_string().contains("TODO_PORT"));
    }

    #[test]
    fn test_unknown_driver_rejected() {
        let mut config = AppConfig::default();
        config.database.driver = "postgres".to_string();
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("postgres"));
        assert!(err.to_string().contains("sqlite"));
    }

    #[test]
    fn test_empty_sqlite_path_rejected() {
        let mut config = AppConfig::default();
        config.database.path = PathBuf::new();
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingRequired { .. }));
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = AppConfig::default();
        for size in [1, 50, MAX_PAGE_SIZE] {
            config.tasks.page_size = size;
            assert!(ConfigValidator::validate(&config).is_ok(), "{size}");
        }
        for size in [0, MAX_PAGE_SIZE + 1] {
            config.tasks.page_size = size;
            assert!(ConfigValidator::validate(&config).is_err(), "{size}");
        }
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some(String::new());
        assert!(ConfigValidator::validate(&config).is_err());

        config.auth.jwt_secret = Some("s3cret".to_string());
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_all_errors_reported_together() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        config.tasks.page_size = 0;
        config.auth.token_ttl_hours = 0;
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(err, ConfigurationError::Multiple(_)));
        assert_eq!(err.count(), 3);
    }
}
