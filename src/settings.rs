//! Code for loading program settings.
use crate::get_h2fleet_config_dir;
use crate::input::{read_toml, to_commented_toml};
use crate::log::DEFAULT_LOG_LEVEL;
use anyhow::Result;
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

const DEFAULT_SETTINGS_FILE_HEADER: &str = "# This file contains the program settings for h2fleet.
# Delete it (or run `h2fleet settings dump-default`) to restore the defaults.
";

/// Default log level for program
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Default width of rendered figures in pixels
fn default_figure_width() -> u32 {
    1350
}

/// Default height of rendered figures in pixels
fn default_figure_height() -> u32 {
    825
}

/// Get the path to where the settings file will be read from
pub fn get_settings_file_path() -> PathBuf {
    let mut path = get_h2fleet_config_dir();
    path.push(SETTINGS_FILE_NAME);

    path
}

/// Program settings from config file
#[derive(Debug, DocumentedFields, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// The default program log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Width of rendered figures in pixels
    #[serde(default = "default_figure_width")]
    pub figure_width: u32,
    /// Height of rendered figures in pixels
    #[serde(default = "default_figure_height")]
    pub figure_height: u32,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            log_level: default_log_level(),
            figure_width: default_figure_width(),
            figure_height: default_figure_height(),
        }
    }
}

impl Settings {
    /// Read the contents of the settings file from the user's config directory.
    ///
    /// If the file is not present, default values for settings will be used.
    ///
    /// # Returns
    ///
    /// The program settings as a `Settings` struct or an error if the file is invalid
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&get_settings_file_path())
    }

    /// Read the settings from the specified path, falling back to defaults if it doesn't exist
    fn load_from_path(file_path: &Path) -> Result<Settings> {
        if !file_path.is_file() {
            return Ok(Settings::default());
        }

        read_toml(file_path)
    }

    /// The contents of the default settings file
    pub fn default_file_contents() -> Result<String> {
        to_commented_toml(&Settings::default(), DEFAULT_SETTINGS_FILE_HEADER)
    }

    /// The dimensions of rendered figures in pixels
    pub fn figure_size(&self) -> (u32, u32) {
        (self.figure_width, self.figure_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_settings_load_from_path_no_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME); // NB: doesn't exist
        assert_eq!(
            Settings::load_from_path(&file_path).unwrap(),
            Settings::default()
        );
    }

    #[test]
    fn test_settings_load_from_path() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME);

        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "log_level = \"warn\"").unwrap();
        }

        assert_eq!(
            Settings::load_from_path(&file_path).unwrap(),
            Settings {
                log_level: "warn".to_string(),
                figure_width: 1350,
                figure_height: 825
            }
        );
    }

    #[test]
    fn test_default_file_contents() {
        let contents = Settings::default_file_contents().unwrap();

        // Every parameter should be commented out, so the file should parse as empty
        let parsed: Settings = toml::from_str(&contents).unwrap();
        assert_eq!(parsed, Settings::default());
        assert!(contents.contains("# log_level = \"info\""));
    }
}
