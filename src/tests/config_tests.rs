#[cfg(test)]
mod tests {
    use crate::config::{self, AppConfig};
    use crate::tests::common::TEST_SECRET;

    fn valid_config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = TEST_SECRET.to_string();
        cfg
    }

    #[test]
    fn test_embedded_defaults() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.server.port, 3001);
        assert_eq!(cfg.auth.token_ttl_hours, 24);
        assert_eq!(cfg.auth.bcrypt_cost, 10);
        assert_eq!(cfg.bootstrap.admin_username, "admin");
        assert!(cfg.server.static_dir.is_none());
        assert!(config::validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_rejects_shipped_jwt_secret() {
        let err = config::validate(&AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("auth.jwt_secret"));

        let mut cfg = valid_config();
        cfg.auth.jwt_secret = format!("  {}  ", AppConfig::default().auth.jwt_secret);
        assert!(config::validate(&cfg).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = valid_config();
        cfg.server.port = 0;
        assert!(config::validate(&cfg).is_err());

        let mut cfg = valid_config();
        cfg.auth.jwt_secret = "   ".into();
        assert!(config::validate(&cfg).is_err());

        let mut cfg = valid_config();
        cfg.auth.bcrypt_cost = 3;
        assert!(config::validate(&cfg).is_err());

        let mut cfg = valid_config();
        cfg.auth.token_ttl_hours = 0;
        assert!(config::validate(&cfg).is_err());

        let mut cfg = valid_config();
        cfg.database.max_connections = 0;
        assert!(config::validate(&cfg).is_err());

        let mut cfg = valid_config();
        cfg.bootstrap.admin_library = String::new();
        assert!(config::validate(&cfg).is_err());
    }

    #[test]
    fn test_ensure_sqlite_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let url = format!("sqlite://{}/tracker.db?mode=rwc", nested.display());

        config::ensure_sqlite_parent_dir(&url).unwrap();
        assert!(nested.is_dir());

        config::ensure_sqlite_parent_dir("sqlite::memory:").unwrap();
        config::ensure_sqlite_parent_dir("sqlite://:memory:").unwrap();
    }
}
