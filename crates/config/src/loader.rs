use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::PonteConfig};

/// Standard config file names, checked in order. YAML first: that is the
/// format the deployment docs describe.
const CONFIG_FILENAMES: &[&str] = &["ponte.yaml", "ponte.yml", "ponte.toml", "ponte.json"];

/// Override for the config directory, set via `set_config_dir()`.
static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Set a custom config directory. When set, discovery only looks in this
/// directory (project-local and user-global paths are skipped). Each call
/// replaces the previous override; used by tests for isolation.
pub fn set_config_dir(path: PathBuf) {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.lock() {
        *guard = Some(path);
    }
}

fn config_dir_override() -> Option<PathBuf> {
    CONFIG_DIR_OVERRIDE.lock().ok().and_then(|g| g.clone())
}

/// Load config from an explicit path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<PonteConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./ponte.{yaml,yml,toml,json}` (project-local)
/// 2. `~/.config/ponte/ponte.{yaml,yml,toml,json}` (user-global)
///
/// Returns defaults when no file is found or the file fails to parse; a
/// parse failure is logged, never fatal.
pub fn discover_and_load() -> PonteConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return PonteConfig::default();
    };

    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            PonteConfig::default()
        },
    }
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        // Override is set — don't fall through to other locations.
        return first_existing(&dir);
    }

    if let Some(path) = first_existing(Path::new(".")) {
        return Some(path);
    }

    let dir = directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".config").join("ponte"))?;
    first_existing(&dir)
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<PonteConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    match ext {
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "toml" => Ok(toml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
