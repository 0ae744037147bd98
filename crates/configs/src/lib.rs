use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
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

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    /// Path of the JSON file the user table persists to.
    #[serde(default)]
    pub data_path: String,
    #[serde(default = "default_scan_page_size")]
    pub scan_page_size: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { data_path: String::new(), scan_page_size: default_scan_page_size() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DispatchConfig {
    /// When set, every domain failure surfaces as HTTP 500 regardless of kind,
    /// matching the pre-redesign contract.
    #[serde(default)]
    pub legacy_status_codes: bool,
}

fn default_scan_page_size() -> usize { 100 }
fn default_data_path() -> String { "data/users.json".to_string() }

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
        self.table.normalize_from_env();
        self.table.validate()?;
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
        if self.worker_threads.unwrap_or(0) == 0 {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl TableConfig {
    /// Fill the data path from the environment when the TOML leaves it empty.
    pub fn normalize_from_env(&mut self) {
        if self.data_path.trim().is_empty() {
            if let Ok(path) = std::env::var("TABLE_PATH") {
                self.data_path = path;
            }
        }
        if self.data_path.trim().is_empty() {
            self.data_path = default_data_path();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_path.trim().is_empty() {
            return Err(anyhow!("table.data_path is empty; provide it in config.toml or TABLE_PATH"));
        }
        if self.scan_page_size == 0 {
            return Err(anyhow!("table.scan_page_size must be >= 1"));
        }
        Ok(())
    }
}
