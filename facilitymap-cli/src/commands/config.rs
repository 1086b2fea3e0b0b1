//! `facilitymap config` - inspect and edit `config.ini`.

use std::path::Path;

use clap::Subcommand;
use facilitymap::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value, e.g. `sync.debounce_ms`
    Get { key: String },

    /// Validate and store one value, e.g. `layers.toilets true`
    Set { key: String, value: String },

    /// List settings as `section.key = value`, layers first
    List {
        /// Only show values that differ from the defaults
        #[arg(long)]
        changed: bool,
    },

    /// Print where config.ini lives
    Path,

    /// Write a default configuration file if none exists
    Init,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List { changed } => run_list(changed),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Init => run_init(),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'facilitymap config list' to see available keys.",
            key
        ))
    })
}

/// Prints the bare value so it can be captured by scripts.
fn run_get(key: &str) -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();
    println!("{}", parse_key(key)?.get(&config));
    Ok(())
}

fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let config_key = set_in(&config_file_path(), key, value)?;
    println!("Set {} = {}", config_key.name(), value);
    Ok(())
}

/// Validate and store one value in the config file at `path`.
fn set_in(path: &Path, key: &str, value: &str) -> Result<ConfigKey, CliError> {
    let config_key = parse_key(key)?;

    let mut config = ConfigFile::load_from(path).unwrap_or_default();
    config_key
        .set(&mut config, value)
        .map_err(|e| CliError::Config(e.to_string()))?;
    config.save_to(path)?;

    Ok(config_key)
}

fn run_list(changed: bool) -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();
    for line in list_lines(&config, changed) {
        println!("{}", line);
    }
    Ok(())
}

/// Sections in the order a user is most likely to touch them.
const LIST_ORDER: [&str; 6] = ["layers", "map", "sync", "location", "overpass", "logging"];

/// One aligned `name = value` line per key. Overridden values carry the default.
fn list_lines(config: &ConfigFile, changed_only: bool) -> Vec<String> {
    let defaults = ConfigFile::default();
    let width = ConfigKey::all()
        .iter()
        .map(|key| key.name().len())
        .max()
        .unwrap_or(0);

    LIST_ORDER
        .iter()
        .flat_map(|section| ConfigKey::all().iter().filter(move |key| key.section() == *section))
        .filter_map(|key| {
            let value = key.get(config);
            let default = key.get(&defaults);
            if value == default {
                (!changed_only).then(|| format!("{:width$} = {}", key.name(), value))
            } else {
                Some(format!(
                    "{:width$} = {}  (default: {})",
                    key.name(),
                    value,
                    if default.is_empty() { "unset" } else { default.as_str() }
                ))
            }
        })
        .collect()
}

fn run_path() -> Result<(), CliError> {
    let path = config_file_path();
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(not created yet, run 'facilitymap config init')");
    }
    Ok(())
}

fn run_init() -> Result<(), CliError> {
    let path = ConfigFile::ensure_exists()?;
    println!("Configuration file: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use facilitymap::facility::Layer;
    use tempfile::TempDir;

    #[test]
    fn test_set_persists_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let key = set_in(&path, "layers.toilets", "true").unwrap();
        assert_eq!(key, ConfigKey::LayersToilets);

        let config = ConfigFile::load_from(&path).unwrap();
        assert!(config.layers.is_enabled(Layer::Toilets));
    }

    #[test]
    fn test_set_rejects_invalid_value_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let result = set_in(&path, "map.fallback_lat", "123");

        assert!(matches!(result, Err(CliError::Config(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_list_starts_with_layers() {
        let lines = list_lines(&ConfigFile::default(), false);

        assert_eq!(lines.len(), ConfigKey::all().len());
        assert!(lines[0].starts_with("layers.water"));
        assert!(lines[1].starts_with("layers.toilets"));
        assert!(lines.last().unwrap().starts_with("logging.file"));
        assert!(lines.iter().all(|line| !line.contains("default:")));
    }

    #[test]
    fn test_list_changed_shows_overrides_with_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        set_in(&path, "sync.debounce_ms", "750").unwrap();
        set_in(&path, "layers.toilets", "true").unwrap();
        let config = ConfigFile::load_from(&path).unwrap();

        let lines = list_lines(&config, true);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("layers.toilets"));
        assert!(lines[0].ends_with("= true  (default: false)"));
        assert!(lines[1].starts_with("sync.debounce_ms"));
        assert!(lines[1].contains("= 750  (default: "));
    }

    #[test]
    fn test_unknown_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let err = set_in(&path, "map.zoom", "3").unwrap_err();
        assert!(err.to_string().contains("facilitymap config list"));
    }
}
