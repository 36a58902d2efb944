//! Configuration for mediashelf paths.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (MEDIASHELF_HOME, MEDIASHELF_DOCUMENTS)
//! 2. Config file (.mediashelf/config.yaml)
//! 3. Defaults (~/.mediashelf)
//!
//! Config file discovery:
//! - Searches current directory and parents for .mediashelf/config.yaml
//! - `home` is relative to the .mediashelf/ directory, `documents` to its parent

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::library::CATALOG_KEY;

pub mod paths;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const HOME_ENV: &str = "MEDIASHELF_HOME";
const DOCUMENTS_ENV: &str = "MEDIASHELF_DOCUMENTS";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .mediashelf/)
    pub home: Option<String>,
    /// Permanent media directory (relative to the project root)
    pub documents: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Key the catalog is stored under
    pub catalog_key: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// State directory (key-value store lives underneath)
    pub home: PathBuf,
    /// Where finished recordings are moved to
    pub documents: PathBuf,
    /// Storage key for the catalog
    pub catalog_key: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Key-value store directory
    pub fn store_dir(&self) -> PathBuf {
        self.home.join("store")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".mediashelf").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Combine a parsed config file with env overrides
fn resolve(
    config_path: Option<&Path>,
    config: Option<ConfigFile>,
    default_home: PathBuf,
    env_home: Option<PathBuf>,
    env_documents: Option<PathBuf>,
) -> ResolvedConfig {
    let paths = config
        .as_ref()
        .map(|c| c.paths.clone())
        .unwrap_or_default();

    // .mediashelf/ and the directory containing it
    let shelf_dir = config_path.and_then(Path::parent);
    let base_dir = shelf_dir.and_then(Path::parent);

    let home = match (env_home, shelf_dir, paths.home.as_deref()) {
        (Some(env_home), _, _) => env_home,
        (None, Some(dir), Some(home)) => resolve_path(dir, home),
        _ => default_home,
    };

    let documents = match (env_documents, base_dir, paths.documents.as_deref()) {
        (Some(env_docs), _, _) => env_docs,
        (None, Some(dir), Some(docs)) => resolve_path(dir, docs),
        _ => home.join("documents"),
    };

    let catalog_key = config
        .and_then(|c| c.storage)
        .and_then(|s| s.catalog_key)
        .unwrap_or_else(|| CATALOG_KEY.to_string());

    ResolvedConfig {
        home,
        documents,
        catalog_key,
        config_file: config_path.map(Path::to_path_buf),
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".mediashelf");

    let config_file = find_config_file();
    let config = config_file
        .as_deref()
        .map(load_config_file)
        .transpose()?;

    Ok(resolve(
        config_file.as_deref(),
        config,
        default_home,
        env_path(HOME_ENV),
        env_path(DOCUMENTS_ENV),
    ))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (bypasses the cache)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let config = resolve(None, None, PathBuf::from("/home/u/.mediashelf"), None, None);

        assert_eq!(config.home, PathBuf::from("/home/u/.mediashelf"));
        assert_eq!(config.documents, PathBuf::from("/home/u/.mediashelf/documents"));
        assert_eq!(config.store_dir(), PathBuf::from("/home/u/.mediashelf/store"));
        assert_eq!(config.catalog_key, "files");
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let file: ConfigFile = serde_yaml::from_str(
            r#"
version: "1.0"
paths:
  home: /from/file
"#,
        )
        .unwrap();

        let config = resolve(
            Some(Path::new("/project/.mediashelf/config.yaml")),
            Some(file),
            PathBuf::from("/default"),
            Some(PathBuf::from("/from/env")),
            Some(PathBuf::from("/docs/env")),
        );

        assert_eq!(config.home, PathBuf::from("/from/env"));
        assert_eq!(config.documents, PathBuf::from("/docs/env"));
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let shelf_dir = temp.path().join(".mediashelf");
        std::fs::create_dir_all(&shelf_dir).unwrap();

        let config_path = shelf_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  home: ./
  documents: media
storage:
  catalog_key: media-files
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.paths.home, Some("./".to_string()));
        assert_eq!(parsed.paths.documents, Some("media".to_string()));

        let config = resolve(
            Some(config_path.as_path()),
            Some(parsed),
            PathBuf::from("/default"),
            None,
            None,
        );
        assert_eq!(config.home, shelf_dir.canonicalize().unwrap());
        assert_eq!(config.documents, temp.path().join("media"));
        assert_eq!(config.catalog_key, "media-files");
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
