use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Connection settings for the hosted identity/row-storage backend.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub service_role_key: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_role_key: String::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.directory.normalize_from_env();
        self.directory.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DirectoryConfig {
    /// Fill missing values from the environment. `SUPABASE_URL` and
    /// `SUPABASE_SERVICE_ROLE_KEY` take effect only when the TOML file did
    /// not already provide them.
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("SUPABASE_URL") {
                self.url = url;
            }
        }
        if self.service_role_key.trim().is_empty() {
            if let Ok(key) = std::env::var("SUPABASE_SERVICE_ROLE_KEY") {
                self.service_role_key = key;
            }
        }
        // Trailing slash would double up when joining API paths.
        while self.url.ends_with('/') {
            self.url.pop();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!(
                "directory.url is empty; set it in config.toml or via SUPABASE_URL"
            ));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("directory.url must start with http:// or https://"));
        }
        if self.service_role_key.trim().is_empty() {
            return Err(anyhow!(
                "directory.service_role_key is empty; set it in config.toml or via SUPABASE_SERVICE_ROLE_KEY"
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("directory.request_timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }

    /// Build directly from the environment, bypassing config.toml.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.normalize_from_env();
        cfg.validate()?;
        Ok(cfg)
    }
}
