//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `<config dir>/config.toml` where the config dir is `$SFJWT_CONFIG_DIR`
//!    or the platform default (`~/.config/sfjwt` on Linux)
//! 2. `./sfjwt.toml` (project-local)
//! 3. CLI arguments (handled by the binary)

use std::path::{Path, PathBuf};

use crate::{ConfigError, Result, SfjwtConfig};

const PROJECT_CONFIG_FILE: &str = "sfjwt.toml";
const USER_CONFIG_FILE: &str = "config.toml";
const APP_NAME: &str = "sfjwt";

/// Overrides the platform config directory.
const CONFIG_DIR_ENV: &str = "SFJWT_CONFIG_DIR";

/// One config layer that was checked.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    /// Whether the file existed and parsed.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: SfjwtConfig,
    /// Layers checked, lowest precedence first.
    pub sources: Vec<ConfigSource>,
    /// Problems that did not stop loading, such as an unparsable layer.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Paths of the layers that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Discover and merge every config layer.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Like [`load_config`] with an explicit user config directory.
///
/// `config_dir` overrides both `SFJWT_CONFIG_DIR` and the platform default.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut config = SfjwtConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    let user_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => xdg_config_path(),
    };
    if let Some(path) = user_path {
        sources.push(load_layer(&mut config, &path, &mut warnings));
    }

    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    sources.push(load_layer(&mut config, &project_path, &mut warnings));

    warnings.extend(config.lint());

    Ok(LoadedConfig {
        config,
        sources,
        warnings,
    })
}

/// Load one file with no discovery. Missing or invalid files are errors.
pub fn load_config_file(path: &Path) -> Result<SfjwtConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    SfjwtConfig::from_toml(&contents)
}

/// Path of the user config file.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// The user config directory: `$SFJWT_CONFIG_DIR`, else the platform default.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Directory for rotated log files.
pub fn log_dir() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join("logs"))
}

fn load_layer(config: &mut SfjwtConfig, path: &Path, warnings: &mut Vec<String>) -> ConfigSource {
    if !path.is_file() {
        return ConfigSource {
            path: path.to_path_buf(),
            loaded: false,
        };
    }

    let loaded = match load_config_file(path) {
        Ok(layer) => {
            config.merge(layer);
            true
        }
        Err(e) => {
            warnings.push(format!("Failed to load {}: {}", path.display(), e));
            false
        }
    };

    ConfigSource {
        path: path.to_path_buf(),
        loaded,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
