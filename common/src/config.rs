use serde::Deserialize;
use std::{env, error::Error, fs};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommonConfig {
    pub project_name: String,
    pub database_url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BackendConfig {
    pub server_address: String,
    pub log_level: String,
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: u64,
    #[serde(default)]
    pub bcrypt_cost: Option<u32>,
}

fn default_access_ttl() -> u64 {
    900
}

fn default_refresh_ttl() -> u64 {
    7 * 24 * 3600
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl_secs: default_access_ttl(),
            refresh_ttl_secs: default_refresh_ttl(),
            bcrypt_cost: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub common: CommonConfig,
    pub backend: BackendConfig,
    pub auth: AuthConfig,
}

impl Config {
    pub fn load(config_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let contents = fs::read_to_string(config_path)?;
        let mut config: Config = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();

        Ok(config)
    }

    /// Secrets and the database URL can be supplied through the environment,
    /// which takes precedence over the YAML file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("DATABASE_URL") {
            self.common.database_url = url;
        }
        if let Ok(secret) = env::var("JWT_SECRET") {
            self.auth.access_secret = secret;
        }
        if let Ok(secret) = env::var("JWT_REFRESH_SECRET") {
            self.auth.refresh_secret = secret;
        }
    }
}
