//! Configuration for refract paths and defaults.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (REFRACT_HOME)
//! 2. Config file (.refract/config.yaml)
//! 3. Defaults (~/.refract)
//!
//! Config file discovery:
//! - Searches current directory and parents for .refract/config.yaml
//! - Paths in config file are relative to the config file's parent directory
//!
//! The generator section only carries connection settings; the client
//! itself is constructed explicitly where it is used, never held globally.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::http::HttpGeneratorConfig;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<std::result::Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub generator: Option<HttpGeneratorConfig>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Engine state directory (relative to config file)
    pub home: Option<String>,
    /// Program document directory (relative to project root)
    pub programs: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to refract home (engine state)
    pub home: PathBuf,
    /// Absolute path to the program document directory
    pub programs: PathBuf,
    /// Generator connection settings
    pub generator: HttpGeneratorConfig,
    /// Languages offered when a program does not specify its own
    pub default_languages: Vec<String>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".refract").join("config.yaml");
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

/// Resolve a path that may be relative to the config file's parent
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

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    // Default home directory
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".refract");

    // Check for config file
    let config_file = find_config_file();

    let (home, programs, generator, default_languages) = if let Some(ref config_path) = config_file
    {
        let config = load_config_file(config_path)?;

        // Base directory is the parent of .refract/ (i.e., grandparent of config.yaml)
        let base_dir = config_path
            .parent() // .refract/
            .and_then(|p| p.parent()) // project root
            .unwrap_or(Path::new("."));

        // Resolve home path
        let home = if let Ok(env_home) = std::env::var("REFRACT_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            // home is relative to .refract/ directory
            let refract_dir = config_path.parent().unwrap_or(Path::new("."));
            resolve_path(refract_dir, home_path)
        } else {
            default_home.clone()
        };

        // Resolve program document directory
        let programs = if let Some(ref programs_path) = config.paths.programs {
            resolve_path(base_dir, programs_path)
        } else {
            home.join("programs")
        };

        let generator = config.generator.unwrap_or_default();
        let default_languages = config
            .languages
            .unwrap_or_else(|| vec!["en".to_string()]);

        (home, programs, generator, default_languages)
    } else {
        // No config file - use env vars or defaults
        let home = std::env::var("REFRACT_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home.clone());

        let programs = home.join("programs");

        (
            home,
            programs,
            HttpGeneratorConfig::default(),
            vec!["en".to_string()],
        )
    };

    Ok(ResolvedConfig {
        home,
        programs,
        generator,
        default_languages,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Get the refract home directory (engine state).
pub fn refract_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the program document directory
pub fn programs_dir() -> Result<PathBuf> {
    Ok(config()?.programs.clone())
}

/// Get the generator connection settings
pub fn generator_config() -> Result<HttpGeneratorConfig> {
    Ok(config()?.generator.clone())
}

/// Get the default language list
pub fn default_languages() -> Result<Vec<String>> {
    Ok(config()?.default_languages.clone())
}
