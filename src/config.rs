//! Configuration system using TOML files.
//!
//! An explicit `--config` file wins. Otherwise the config is read from the
//! OS-standard config directory:
//! - Windows: %APPDATA%\music-pages\config.toml
//! - macOS: ~/Library/Application Support/music-pages/config.toml
//! - Linux: ~/.config/music-pages/config.toml
//!
//! Every section is optional. Command-line path overrides are applied on
//! top of whatever was loaded.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input, output and template locations
    pub paths: PathsConfig,

    /// Build behaviour
    pub build: BuildConfig,
}

/// Filesystem locations. Relative paths resolve against the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Alternate template directory (None = bundled templates)
    pub templates: Option<PathBuf>,

    /// Output root directory
    pub output: PathBuf,

    /// Music directory to scan
    pub music: PathBuf,

    /// Secondary directory that receives a copy of the top-level index page
    pub copy_index: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates: None,
            output: PathBuf::from("."),
            music: PathBuf::from("music"),
            copy_index: None,
        }
    }
}

/// What to do when a page fails to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// Stop on the first filesystem error
    #[default]
    FailFast,
    /// Log the failure and keep writing the remaining pages
    BestEffort,
}

/// Ordering of artists on the index page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtistOrder {
    /// Order in which artists were first encountered
    #[default]
    Insertion,
    /// Byte-wise ordering of artist names
    Alphabetical,
}

/// Build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Audio file extensions to pick up (case-insensitive, without the dot)
    pub extensions: Vec<String>,

    /// Failure handling during the write phase
    pub write_policy: WritePolicy,

    /// Artist ordering on the index page
    pub artist_order: ArtistOrder,

    /// Title of the top-level index page
    pub index_title: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            extensions: crate::scanner::DEFAULT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            write_policy: WritePolicy::default(),
            artist_order: ArtistOrder::default(),
            index_title: "Music".to_string(),
        }
    }
}

impl Config {
    /// Resolve every relative path against `cwd`.
    pub fn resolve_paths(&mut self, cwd: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = cwd.join(&*p);
            }
        };
        resolve(&mut self.paths.output);
        resolve(&mut self.paths.music);
        if let Some(p) = self.paths.templates.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.paths.copy_index.as_mut() {
            resolve(p);
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("music-pages"))
}

/// Get the full path to the default config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from an explicit file.
///
/// Unlike [`load`], a missing or malformed file is an error: the user asked
/// for this file by name.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config = toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::debug!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file found, using defaults");
        return Config::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load config file");
            tracing::warn!("Using default configuration");
            Config::default()
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        crate::error::Error::config(e.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.paths.music, PathBuf::from("music"));
        assert_eq!(config.paths.output, PathBuf::from("."));
        assert!(config.paths.templates.is_none());
        assert_eq!(config.build.write_policy, WritePolicy::FailFast);
        assert_eq!(config.build.artist_order, ArtistOrder::Insertion);
        assert_eq!(config.build.index_title, "Music");
        assert!(config.build.extensions.contains(&"mp3".to_string()));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[build]
write_policy = "best-effort"
artist_order = "alphabetical"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.build.write_policy, WritePolicy::BestEffort);
        assert_eq!(config.build.artist_order, ArtistOrder::Alphabetical);
        assert_eq!(config.build.index_title, "Music");
        assert_eq!(config.paths.music, PathBuf::from("music"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[paths]\nmusic = \"/srv/audio\"\ncopy_index = \"public\"").unwrap();

        let config = load_from(file.path()).unwrap();
        assert_eq!(config.paths.music, PathBuf::from("/srv/audio"));
        assert_eq!(config.paths.copy_index, Some(PathBuf::from("public")));
    }

    #[test]
    fn test_load_from_malformed_file_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[paths\nmusic = ").unwrap();
        assert!(matches!(load_from(file.path()), Err(ConfigError::Parse(_, _))));
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = load_from(Path::new("/definitely/not/here/config.toml"));
        assert!(matches!(result, Err(ConfigError::Read(_, _))));
    }

    #[test]
    fn test_resolve_paths() {
        let mut config = Config::default();
        config.paths.copy_index = Some(PathBuf::from("mirror"));
        config.paths.templates = Some(PathBuf::from("/abs/templates"));
        config.resolve_paths(Path::new("/work"));

        assert_eq!(config.paths.music, PathBuf::from("/work/music"));
        assert_eq!(config.paths.output, PathBuf::from("/work/."));
        assert_eq!(config.paths.copy_index, Some(PathBuf::from("/work/mirror")));
        assert_eq!(config.paths.templates, Some(PathBuf::from("/abs/templates")));
    }
}
