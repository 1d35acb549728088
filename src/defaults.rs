//! Default values for tfmerge configuration.
//!
//! This module provides centralized default values used across the library
//! and the commands, ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Lineage written to the merged state when no base state supplies one.
pub const DEFAULT_LINEAGE: &str = "00000000-0000-0000-0000-000000000000";

/// Executable used by the terraform normalizer.
pub const DEFAULT_TERRAFORM_BINARY: &str = "terraform";

/// Name of the per-project configuration file.
pub const CONFIG_FILE_NAME: &str = ".tfmerge.yaml";

/// Returns the user-level configuration file path.
///
/// Uses the platform-appropriate config directory:
/// - Linux: `~/.config/tfmerge/config.yaml` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/tfmerge/config.yaml`
/// - Windows: `{FOLDERID_RoamingAppData}\tfmerge\config.yaml`
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tfmerge").join("config.yaml"))
}

/// Locate the configuration file to use when none is given explicitly.
///
/// `.tfmerge.yaml` in `working_dir` wins over the user-level file.
pub fn discover_config(working_dir: &Path) -> Option<PathBuf> {
    let local = working_dir.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    global_config_path().filter(|path| path.is_file())
}
