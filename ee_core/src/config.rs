//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/ee-toolbox/config.toml`.
//!
//! ```toml
//! [settings]
//! default_material = "al"
//! default_temperature_c = 90
//! default_drop_limit_percent = 5
//!
//! [library]
//! path = "/srv/ee/library.json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calculations::voltage_drop::{
    DEFAULT_DROP_LIMIT_PERCENT, DEFAULT_MATERIAL, DEFAULT_TEMPERATURE_C,
};
use crate::calculations::CalculationInput;
use crate::errors::{CalcError, CalcResult};
use crate::library::LibrarySnapshot;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub library: LibraryConfig,
}

/// Defaults applied to fields a caller left blank
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_material")]
    pub default_material: String,

    #[serde(default = "default_temperature_c")]
    pub default_temperature_c: f64,

    #[serde(default = "default_drop_limit_percent")]
    pub default_drop_limit_percent: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_material: default_material(),
            default_temperature_c: default_temperature_c(),
            default_drop_limit_percent: default_drop_limit_percent(),
        }
    }
}

/// Property library source
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct LibraryConfig {
    /// JSON library snapshot; the built-in library is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// Default value functions
fn default_material() -> String {
    DEFAULT_MATERIAL.to_string()
}

fn default_temperature_c() -> f64 {
    DEFAULT_TEMPERATURE_C
}

fn default_drop_limit_percent() -> f64 {
    DEFAULT_DROP_LIMIT_PERCENT
}

impl Settings {
    /// Fill blank fields of `input` from these settings.
    ///
    /// Fields the caller supplied are never overwritten.
    pub fn apply_defaults(&self, input: &mut CalculationInput) {
        if let CalculationInput::VoltageDrop(vdrop) = input {
            if vdrop.material.trim().is_empty() {
                vdrop.material = self.default_material.clone();
            }
            vdrop.temperature_c.get_or_insert(self.default_temperature_c);
            vdrop.drop_limit_percent.get_or_insert(self.default_drop_limit_percent);
        }
    }
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> CalcResult<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> CalcResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
        let config: Config = toml::from_str(&contents).map_err(CalcError::serialization)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("ee-toolbox").join("config.toml")
    }

    /// Save the configuration to a specific path
    pub fn save_to(&self, path: &Path) -> CalcResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalcError::file_error("create_dir", parent.display().to_string(), e.to_string())
            })?;
        }

        let contents = toml::to_string_pretty(self).map_err(CalcError::serialization)?;
        std::fs::write(path, contents)
            .map_err(|e| CalcError::file_error("write", path.display().to_string(), e.to_string()))?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Resolve the library snapshot: the configured file, or the built-in one.
    pub fn load_library(&self) -> CalcResult<LibrarySnapshot> {
        match &self.library.path {
            Some(path) => load_library_file(path),
            None => Ok(LibrarySnapshot::default()),
        }
    }
}

/// Read and validate a JSON library snapshot.
pub fn load_library_file(path: &Path) -> CalcResult<LibrarySnapshot> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    let snapshot = LibrarySnapshot::from_json(&json)?;
    tracing::info!("Loaded property library from {:?}", path);
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::VoltageDropInput;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.settings.default_material, "cu");
        assert_eq!(config.settings.default_temperature_c, 75.0);
        assert_eq!(config.settings.default_drop_limit_percent, 3.0);
        assert_eq!(config.library.path, None);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[settings]
default_material = "al"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.settings.default_material, "al");
        assert_eq!(config.settings.default_temperature_c, 75.0); // default
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        crate::logging::init_test();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.settings.default_drop_limit_percent = 5.0;
        config.library.path = Some(dir.path().join("library.json"));
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let err = Config::load_from(Path::new("/nonexistent/ee-toolbox.toml")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_apply_defaults_fills_only_blanks() {
        let settings = Settings {
            default_material: "al".to_string(),
            default_temperature_c: 90.0,
            default_drop_limit_percent: 5.0,
        };
        let mut input = CalculationInput::VoltageDrop(VoltageDropInput {
            temperature_c: Some(60.0),
            ..Default::default()
        });
        settings.apply_defaults(&mut input);

        match input {
            CalculationInput::VoltageDrop(v) => {
                assert_eq!(v.material, "al");
                assert_eq!(v.temperature_c, Some(60.0));
                assert_eq!(v.drop_limit_percent, Some(5.0));
            }
            other => panic!("unexpected input {:?}", other),
        }
    }

    #[test]
    fn test_load_library_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");

        let mut library = LibrarySnapshot::default();
        library.fill_limits.conduit_percent = 35.0;
        std::fs::write(&path, serde_json::to_string(&library).unwrap()).unwrap();

        let config = Config {
            library: LibraryConfig { path: Some(path) },
            ..Default::default()
        };
        assert_eq!(config.load_library().unwrap().fill_limits.conduit_percent, 35.0);
    }

    #[test]
    fn test_invalid_library_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");

        let mut library = LibrarySnapshot::default();
        library.fill_limits.wireway_percent = 120.0;
        std::fs::write(&path, serde_json::to_string(&library).unwrap()).unwrap();

        let err = load_library_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_LIBRARY");
    }
}
