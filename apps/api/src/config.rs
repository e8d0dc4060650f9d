use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::brief::catalog::RuleCatalog;

/// Application configuration loaded from environment variables.
/// Nothing is required; every variable has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// JSON rule catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_port(optional_env("PORT"))?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            catalog_path: optional_env("BRIEF_CATALOG_PATH").map(PathBuf::from),
        })
    }

    /// Loads the rule catalog once at startup.
    pub fn load_catalog(&self) -> Result<RuleCatalog> {
        match &self.catalog_path {
            Some(path) => RuleCatalog::from_json_file(path),
            None => Ok(RuleCatalog::builtin()),
        }
    }

    pub fn catalog_source(&self) -> String {
        self.catalog_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "builtin".to_string())
    }
}

/// Unset and empty variables are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_port(raw: Option<String>) -> Result<u16> {
    raw.as_deref()
        .unwrap_or("8080")
        .trim()
        .parse::<u16>()
        .context("PORT must be a valid port number")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config(catalog_path: Option<PathBuf>) -> Config {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            catalog_path,
        }
    }

    #[test]
    fn test_port_defaults_to_8080() {
        assert_eq!(parse_port(None).unwrap(), 8080);
    }

    #[test]
    fn test_port_parsed_from_value() {
        assert_eq!(parse_port(Some(" 3000 ".to_string())).unwrap(), 3000);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = parse_port(Some("eighty".to_string())).unwrap_err();
        assert_eq!(err.to_string(), "PORT must be a valid port number");
        assert!(parse_port(Some("70000".to_string())).is_err());
    }

    #[test]
    fn test_builtin_catalog_when_no_path() {
        let cfg = config(None);
        assert_eq!(cfg.load_catalog().unwrap(), RuleCatalog::builtin());
        assert_eq!(cfg.catalog_source(), "builtin");
    }

    #[test]
    fn test_catalog_loaded_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"defaults": {{"material": "stone"}}, "groups": [], "rules": []}}"#
        )
        .unwrap();

        let cfg = config(Some(file.path().to_path_buf()));
        let catalog = cfg.load_catalog().unwrap();
        assert!(catalog.groups.is_empty());
        assert_eq!(cfg.catalog_source(), file.path().display().to_string());
    }
}
