//! Common functionality for the h2fleet techno-economic model.
#![warn(missing_docs)]
pub mod analysis;
pub mod cli;
pub mod demand;
pub mod economics;
pub mod emissions;
pub mod figures;
pub mod finance;
pub mod infrastructure;
pub mod input;
pub mod log;
pub mod output;
pub mod scenario;
pub mod sensitivity;
pub mod settings;
pub mod summary;
pub mod utils;

#[cfg(test)]
mod fixture;

use std::path::PathBuf;

/// Get the path to the h2fleet configuration directory.
///
/// This is in a platform-dependent location (e.g. `~/.config/h2fleet` on Linux) and may not yet
/// have been created.
pub fn get_h2fleet_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_default();
    path.push("h2fleet");
    path
}
