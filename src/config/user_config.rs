//! User configuration file handling
//!
//! Manages settings from ~/.config/fontsieve/settings.json

use super::plan::BUILTIN_PLAN_JSON;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// User configuration from ~/.config/fontsieve/settings.json
///
/// These settings override built-in defaults but are overridden by CLI arguments
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    /// Directory holding the source fonts (e.g., "/opt/fonts")
    pub font_dir: Option<PathBuf>,
    /// Font plan to use instead of the built-in one
    pub plan: Option<PathBuf>,
    /// Subsetting program to invoke instead of `pyftsubset` from PATH
    pub subsetter: Option<PathBuf>,
}

impl ConfigFile {
    /// Get the path to the fontsieve config directory
    pub fn config_dir() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
        config_dir.join("fontsieve")
    }

    /// Get the path to the user config file
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }

    /// Get the path to the logs directory
    pub fn logs_dir() -> PathBuf {
        Self::config_dir().join("logs")
    }

    /// Load configuration from the user config file
    pub fn load() -> Option<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit settings file
    pub fn load_from(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    debug!("Loaded user settings from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Save configuration to the given settings file
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Initialize the complete user configuration directory
    ///
    /// This creates:
    /// 1. The ~/.config/fontsieve directory structure
    /// 2. A settings.json file pointing at the plan copy
    /// 3. plan.json, a copy of the built-in font plan to customize
    /// 4. A logs/ directory for --log-file output
    pub fn initialize_config_directory() -> anyhow::Result<()> {
        Self::initialize_at(&Self::config_dir())
    }

    /// Initialize a configuration directory at an explicit location.
    ///
    /// Existing files are left untouched.
    pub fn initialize_at(config_dir: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(config_dir)?;
        println!("Created config directory: {:?}", config_dir);

        let logs_dir = config_dir.join("logs");
        fs::create_dir_all(&logs_dir)?;
        println!("Created logs directory: {:?}", logs_dir);

        let plan_path = config_dir.join("plan.json");
        if !plan_path.exists() {
            fs::write(&plan_path, BUILTIN_PLAN_JSON)?;
            println!("Created font plan: {:?}", plan_path);
        } else {
            println!("Font plan already exists: {:?}", plan_path);
        }

        let settings_path = config_dir.join("settings.json");
        if !settings_path.exists() {
            let example = ConfigFile {
                font_dir: None,
                plan: Some(plan_path.clone()),
                subsetter: None,
            };
            example.save_to(&settings_path)?;
            println!("Created settings file: {:?}", settings_path);
        } else {
            println!("Settings file already exists: {:?}", settings_path);
        }

        println!("\nConfiguration initialized successfully!");
        println!("You can now:");
        println!("  - Edit settings at: {:?}", settings_path);
        println!("  - Customize families and weights in: {:?}", plan_path);
        println!("  - View run logs in: {:?}", logs_dir);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_creates_settings_and_plan() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("fontsieve");

        ConfigFile::initialize_at(&config_dir).unwrap();

        assert!(config_dir.join("logs").is_dir());
        let plan = fs::read_to_string(config_dir.join("plan.json")).unwrap();
        assert_eq!(plan, BUILTIN_PLAN_JSON);

        let settings = ConfigFile::load_from(&config_dir.join("settings.json")).unwrap();
        assert_eq!(settings.plan, Some(config_dir.join("plan.json")));
        assert_eq!(settings.font_dir, None);
    }

    #[test]
    fn test_initialize_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("plan.json"), "{}").unwrap();

        ConfigFile::initialize_at(dir.path()).unwrap();

        let plan = fs::read_to_string(dir.path().join("plan.json")).unwrap();
        assert_eq!(plan, "{}");
    }

    #[test]
    fn test_load_ignores_malformed_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(ConfigFile::load_from(&path), None);
        assert_eq!(ConfigFile::load_from(&dir.path().join("missing.json")), None);
    }
}
