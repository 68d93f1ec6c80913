//! First-run setup and config migration.
//!
//! Writes the default configuration file when none exists, and re-stamps an
//! existing file written by an older version so the check does not repeat.

pub mod version;

pub use version::{check_setup_status, stamp_config_version, SetupStatus};

use std::path::Path;

/// Embedded default configuration template.
pub(crate) const DEFAULT_CONFIG: &str = include_str!("../../environments/xyscope.toml");

/// Writes the default config, prefixed with the current version line.
///
/// # Errors
/// Returns an error if the config directory or file cannot be written.
pub fn write_default_config(config_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let version_line = format!(r#"config_version = "{}""#, version::CURRENT_VERSION);
    std::fs::write(config_path, format!("{version_line}\n{DEFAULT_CONFIG}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_current() {
        let path = std::env::temp_dir().join(format!("xyscope_setup_{}.toml", std::process::id()));
        write_default_config(&path).unwrap();
        let status = check_setup_status(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(status, SetupStatus::Current);
    }
}
