//! Config file version tracking.
//!
//! The first line of the config file records the xyscope version that last
//! wrote it, as `config_version = "X.Y.Z"`.

use anyhow::anyhow;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

/// Current application version from Cargo.toml
pub(crate) const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the startup check found at the config path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStatus {
    /// No config file yet
    Missing,
    /// Written by this version (or a newer one)
    Current,
    /// Written by an older version; holds the recorded version
    Outdated(String),
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    fn parse(version_str: &str) -> anyhow::Result<Self> {
        let mut parts = version_str.trim().split('.');
        let mut next = |name: &str| -> anyhow::Result<u32> {
            let part = parts
                .next()
                .ok_or_else(|| anyhow!("Invalid version '{version_str}': missing {name}"))?;
            part.parse::<u32>()
                .map_err(|_| anyhow!("Invalid {name} version: '{part}'"))
        };

        let version = SemanticVersion {
            major: next("major")?,
            minor: next("minor")?,
            patch: next("patch")?,
        };
        if parts.next().is_some() {
            return Err(anyhow!(
                "Invalid version format: '{version_str}'. Expected 'major.minor.patch'"
            ));
        }
        Ok(version)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Extracts the version from a `config_version = "X.Y.Z"` line.
///
/// Commented-out lines do not match.
fn parse_version_line(line: &str) -> Option<String> {
    let regex = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#).ok()?;
    regex.captures(line).map(|caps| caps[1].to_string())
}

/// Compares the config file's recorded version against this binary.
///
/// A file without a version line is treated as outdated.
///
/// # Errors
/// - If the file exists but cannot be read
/// - If the recorded version is not `major.minor.patch`
pub fn check_setup_status(config_path: &Path) -> anyhow::Result<SetupStatus> {
    if !config_path.exists() {
        return Ok(SetupStatus::Missing);
    }

    let content = std::fs::read_to_string(config_path)?;
    let Some(recorded) = content.lines().next().and_then(parse_version_line) else {
        return Ok(SetupStatus::Outdated("unknown".to_string()));
    };

    let recorded_version = SemanticVersion::parse(&recorded)?;
    let current_version = SemanticVersion::parse(CURRENT_VERSION)?;

    Ok(match recorded_version.cmp(&current_version) {
        Ordering::Less => SetupStatus::Outdated(recorded),
        Ordering::Equal => SetupStatus::Current,
        Ordering::Greater => {
            tracing::warn!(
                "Config version {} is newer than app version {}",
                recorded_version,
                CURRENT_VERSION
            );
            SetupStatus::Current
        }
    })
}

/// Rewrites the first line of the config with the current version, keeping
/// every other line.
pub fn stamp_config_version(config_path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;
    let body: Vec<&str> = content
        .lines()
        .filter(|line| parse_version_line(line).is_none())
        .collect();

    let version_line = format!(r#"config_version = "{CURRENT_VERSION}""#);
    let new_content = if body.is_empty() {
        version_line
    } else {
        format!("{}\n{}\n", version_line, body.join("\n"))
    };

    std::fs::write(config_path, new_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "xyscope_version_{}_{}.toml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_semantic_version_ordering() {
        let v1 = SemanticVersion::parse("0.0.4").unwrap();
        let v2 = SemanticVersion::parse("0.1.0").unwrap();
        let v3 = SemanticVersion::parse("1.0.0").unwrap();

        assert!(v1 < v2);
        assert!(v2 < v3);
        assert_eq!(v2.to_string(), "0.1.0");
    }

    #[test]
    fn test_invalid_version_format() {
        assert!(SemanticVersion::parse("0.1").is_err());
        assert!(SemanticVersion::parse("0.1.0.2").is_err());
        assert!(SemanticVersion::parse("one.two.three").is_err());
    }

    #[test]
    fn test_parse_version_line_ignores_comments() {
        assert_eq!(
            parse_version_line(r#"config_version = "0.1.0""#),
            Some("0.1.0".to_string())
        );
        assert_eq!(parse_version_line(r#"# config_version = "0.1.0""#), None);
    }

    #[test]
    fn test_missing_config() {
        let path = Path::new("/nonexistent/xyscope/xyscope.toml");
        assert_eq!(check_setup_status(path).unwrap(), SetupStatus::Missing);
    }

    #[test]
    fn test_outdated_then_stamped() {
        let path = temp_config("outdated", "config_version = \"0.0.1\"\n[display]\ngain = 3.0\n");
        assert_eq!(
            check_setup_status(&path).unwrap(),
            SetupStatus::Outdated("0.0.1".to_string())
        );

        stamp_config_version(&path).unwrap();
        assert_eq!(check_setup_status(&path).unwrap(), SetupStatus::Current);

        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(content.contains("gain = 3.0"));
        assert_eq!(content.matches("config_version").count(), 1);
    }

    #[test]
    fn test_unversioned_config_is_outdated() {
        let path = temp_config("legacy", "[playback]\nfps = 30\n");
        let status = check_setup_status(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(status, SetupStatus::Outdated("unknown".to_string()));
    }
}
