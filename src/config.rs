use std::path::Path;

use serde::Deserialize;

const DEFAULT_JWT_SECRET: &str = "change-me-srp-tracker-secret";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the built dashboard. Unknown paths fall back to its `index.html`.
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    pub admin_username: String,
    pub admin_password: String,
    pub admin_library: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub bootstrap: BootstrapConfig,
    pub security: Option<SecurityConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
            .and_then(|cfg| cfg.try_deserialize())
        {
            Ok(app_cfg) => app_cfg,
            Err(e) => panic!("embedded default config is invalid: {}", e),
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        .add_source(::config::File::with_name("srp-tracker").required(false));

    if let Ok(custom_path) = std::env::var("SRP_TRACKER_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("SRP_TRACKER").separator("__"));

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    if cfg.database.max_connections == 0 {
        return Err(anyhow::anyhow!("database.max_connections must be > 0"));
    }

    let secret = cfg.auth.jwt_secret.trim();
    if secret.is_empty() {
        return Err(anyhow::anyhow!("auth.jwt_secret must not be empty"));
    }
    // The shipped placeholder is public, so tokens signed with it could be forged.
    if secret == DEFAULT_JWT_SECRET {
        return Err(anyhow::anyhow!(
            "auth.jwt_secret is still the shipped default; set SRP_TRACKER__AUTH__JWT_SECRET"
        ));
    }
    if secret.len() < 32 {
        tracing::warn!("auth.jwt_secret is shorter than 32 bytes");
    }
    if cfg.auth.token_ttl_hours <= 0 {
        return Err(anyhow::anyhow!("auth.token_ttl_hours must be > 0"));
    }
    if !(4..=31).contains(&cfg.auth.bcrypt_cost) {
        return Err(anyhow::anyhow!("auth.bcrypt_cost must be in 4..=31"));
    }

    if cfg.bootstrap.admin_username.trim().is_empty() {
        return Err(anyhow::anyhow!("bootstrap.admin_username must not be empty"));
    }
    if cfg.bootstrap.admin_library.trim().is_empty() {
        return Err(anyhow::anyhow!("bootstrap.admin_library must not be empty"));
    }
    if cfg.bootstrap.admin_password == DEFAULT_ADMIN_PASSWORD {
        tracing::warn!("bootstrap admin uses the default password; change it after first login");
    }

    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    let path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"));
    if let Some(path) = path {
        if path.starts_with(":memory:") {
            return Ok(());
        }
        let path = path.split('?').next().unwrap_or(path);
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}
