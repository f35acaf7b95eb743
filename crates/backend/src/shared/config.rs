use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub records: RecordsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Каталог собранного frontend (trunk dist)
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecordsConfig {
    /// Верхняя граница itemsPerPage
    pub max_page_size: usize,
    /// Сколько демонстрационных строк создать, если seed_path не задан
    #[serde(default)]
    pub demo_rows: usize,
    /// JSON-файл с массивом объектов для начального наполнения
    #[serde(default)]
    pub seed_path: Option<String>,
}

fn default_static_dir() -> String {
    "dist".to_string()
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000
static_dir = "dist"

[records]
max_page_size = 500
demo_rows = 250
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.records.max_page_size == 0 {
        anyhow::bail!("records.max_page_size must be greater than 0");
    }
    Ok(config)
}

/// Resolves a configured path relative to the executable directory
pub fn resolve_path(path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        return candidate.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(candidate);
        }
    }

    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.static_dir, "dist");
        assert_eq!(config.records.max_page_size, 500);
        assert_eq!(config.records.demo_rows, 250);
        assert!(config.records.seed_path.is_none());
    }

    #[test]
    fn test_optional_fields_default() {
        let config = parse_config(
            r#"
            [server]
            port = 8080

            [records]
            max_page_size = 100
            seed_path = "seed/records.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.static_dir, "dist");
        assert_eq!(config.records.demo_rows, 0);
        assert_eq!(config.records.seed_path.as_deref(), Some("seed/records.json"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let result = parse_config(
            r#"
            [server]
            port = 3000

            [records]
            max_page_size = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_absolute_path_kept() {
        let path = if cfg!(windows) { "C:\\data\\seed.json" } else { "/data/seed.json" };
        assert_eq!(resolve_path(path), PathBuf::from(path));
    }
}
