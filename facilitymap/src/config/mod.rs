//! User configuration.
//!
//! Settings live in `~/.facilitymap/config.ini`. A missing file yields the
//! defaults; a present file overlays them key by key.
//!
//! # Example
//!
//! ```no_run
//! use facilitymap::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::load()?;
//! ConfigKey::SyncDebounceMs.set(&mut config, "500")?;
//! config.save()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod defaults;
mod file;
mod keys;
mod settings;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{
    ConfigFile, LayerSettings, LocationSettings, LoggingSettings, MapSettings, OverpassSettings,
    SyncSettings,
};
