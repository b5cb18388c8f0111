use super::{
    evolution::EvolutionConfig, features::FeaturesConfig, run::RunConfig,
    traits::ConfigSection,
};
use crate::error::TreevoError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Environment variables with this prefix override file values,
/// e.g. `TREEVOLVE__EVOLUTION__DRAWS=40`
pub const ENV_PREFIX: &str = "TREEVOLVE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), TreevoError> {
        check_section(&self.run)?;
        check_section(&self.evolution)?;
        check_section(&self.features)?;
        Ok(())
    }
}

fn check_section<S: ConfigSection>(section: &S) -> Result<(), TreevoError> {
    section.validate().inspect_err(|e| {
        log::error!("Invalid [{}] section: {}", S::section_name(), e);
    })
}

#[derive(Default)]
pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TreevoError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TreevoError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| TreevoError::Configuration(format!("Failed to parse config: {}", e)))?;

        self.replace(config)
    }

    /// Loads `path` with `TREEVOLVE__SECTION__KEY` environment overrides on top
    pub fn load_layered<P: AsRef<Path>>(&self, path: P) -> Result<(), TreevoError> {
        let config: AppConfig = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| TreevoError::Configuration(format!("Failed to load config: {}", e)))?;

        self.replace(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TreevoError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| TreevoError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| TreevoError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        match self.config.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update<F>(&self, f: F) -> Result<(), TreevoError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.get();
        f(&mut config);
        self.replace(config)
    }

    fn replace(&self, config: AppConfig) -> Result<(), TreevoError> {
        config.validate()?;
        match self.config.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
        Ok(())
    }
}
