use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;

/// Environment variable that overrides `database_url`
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable that carries the session signing secret
pub const SECRET_KEY_ENV: &str = "SECRET_KEY";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default)]
    pub qr: QrConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Session signing secret. Never read from the yaml file.
    #[serde(skip)]
    pub secret_key: String,
    /// Set when `secret_key` was generated at startup
    #[serde(skip)]
    pub ephemeral_secret: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QrConfig {
    pub dir: String,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            dir: "./data/qrcodes".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionConfig {
    pub ttl_hours: i64,
    /// Adds the `Secure` attribute to session cookies (HTTPS deployments)
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            cookie_secure: false,
        }
    }
}

fn default_database_url() -> String {
    "sqlite://mockupi.db?mode=rwc".to_string()
}

impl AppConfig {
    /// Load `config/<env>.yaml` and apply environment overrides.
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config yaml: {}", config_path))?;
        config.with_env_overrides(
            env,
            std::env::var(DATABASE_URL_ENV).ok(),
            std::env::var(SECRET_KEY_ENV).ok(),
        )
    }

    fn with_env_overrides(
        mut self,
        env: &str,
        database_url: Option<String>,
        secret_key: Option<String>,
    ) -> Result<Self> {
        if let Some(url) = database_url.filter(|u| !u.trim().is_empty()) {
            self.database_url = url;
        }

        match secret_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => self.secret_key = key,
            None if env == "dev" => {
                // Sessions do not survive a restart with an ephemeral key
                let bytes: [u8; 32] = rand::random();
                self.secret_key = hex::encode(bytes);
                self.ephemeral_secret = true;
            }
            None => bail!(
                "{} must be set for the '{}' environment",
                SECRET_KEY_ENV,
                env
            ),
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
log_level: info
log_dir: ./logs
log_file: mockupi.log
use_json: false
rotation: daily
gateway:
  host: 127.0.0.1
  port: 8080
"#;

    fn base() -> AppConfig {
        serde_yaml::from_str(YAML).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = base();
        assert_eq!(config.database_url, "sqlite://mockupi.db?mode=rwc");
        assert_eq!(config.qr.dir, "./data/qrcodes");
        assert_eq!(config.session.ttl_hours, 24);
        assert!(config.secret_key.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let config = base()
            .with_env_overrides(
                "prod",
                Some("sqlite::memory:".to_string()),
                Some("s3cr3t".to_string()),
            )
            .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.secret_key, "s3cr3t");
    }

    #[test]
    fn test_dev_generates_ephemeral_secret() {
        let config = base().with_env_overrides("dev", None, None).unwrap();
        assert_eq!(config.secret_key.len(), 64);
        assert!(config.ephemeral_secret);
    }

    #[test]
    fn test_missing_secret_outside_dev_fails() {
        let err = base()
            .with_env_overrides("prod", None, Some("  ".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(SECRET_KEY_ENV));
    }
}
