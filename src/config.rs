use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Root directory holding the tier folders (daily/, weekly/, ...).
    pub root: PathBuf,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("root", ".")?
            // Start off by merging in the "default" configuration file
            .add_source(File::new("config/default", FileFormat::Toml).required(false))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(File::new(&format!("config/{}", env), FileFormat::Toml).required(false))
            .build()?;

        Ok(s.try_deserialize()?)
    }
}
