//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use switchboard::{SwitchboardError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for SwitchboardError {
    fn from(err: ConfigError) -> Self {
        SwitchboardError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (switchboard/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed or holds invalid values
pub fn load_config(
    explicit_path: Option<impl AsRef<Path>>,
) -> Result<AppConfig, SwitchboardError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("switchboard/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "switchboard", "switchboard") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load and validate configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, SwitchboardError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    config.layout().validate().map_err(ConfigError::Validation)?;
    config
        .style()
        .background_color()
        .and(config.style().node_fill())
        .map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use switchboard::{editors::EditorKind, layout::PackingStrategy};
    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_explicit_config() {
        let file = write_config(
            r##"
            [layout]
            strategy = "rows"
            max_row_width = 600.0

            [editor]
            kind = "routing"

            [style]
            background_color = "#fafafa"
            "##,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.layout().strategy(), PackingStrategy::Rows);
        assert_eq!(config.layout().num_cols(), 3);
        assert_eq!(config.editor().kind(), EditorKind::Routing);
        assert!(config.style().background_color().unwrap().is_some());
    }

    #[test]
    fn test_missing_explicit_config() {
        let result = load_config(Some("does/not/exist.toml"));
        assert!(matches!(result, Err(SwitchboardError::Config(_))));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let file = write_config("[layout]\nnum_cols = 0\n");
        assert!(load_config(Some(file.path())).is_err());

        let file = write_config("[style]\nnode_fill = \"nope\"\n");
        assert!(load_config(Some(file.path())).is_err());

        let file = write_config("[layout\n");
        assert!(load_config(Some(file.path())).is_err());
    }
}
