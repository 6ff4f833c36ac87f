use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use super::{
    ConfigContentProvider, ConfigError, ConfigSerializer, FileContentConfigProvider, Validate,
    YamlConfigSerializer,
};

/// Loads a config once, validates it and keeps it cached. A missing file
/// yields `TConfig::default()`; writes go through validation first.
pub struct ConfigManager<TConfigContentProvider, TConfig, TConfigSerializer = YamlConfigSerializer>
where
    TConfigContentProvider: ConfigContentProvider,
    TConfig: Clone + for<'de> Deserialize<'de> + Serialize + Validate + Default,
    TConfigSerializer: ConfigSerializer<TConfig>,
{
    config_serializer: TConfigSerializer,
    config_content_provider: TConfigContentProvider,
    config: Arc<Mutex<Option<TConfig>>>,
}

impl<TConfig> ConfigManager<FileContentConfigProvider, TConfig, YamlConfigSerializer>
where
    TConfig: Clone + for<'de> Deserialize<'de> + Serialize + Validate + Default,
{
    pub fn from_yaml_file(file_path: &str) -> Self {
        Self::new(
            FileContentConfigProvider::new(file_path.to_string()),
            YamlConfigSerializer::new(),
        )
    }
}

impl<TConfigContentProvider, TConfig, TConfigSerializer>
    ConfigManager<TConfigContentProvider, TConfig, TConfigSerializer>
where
    TConfigContentProvider: ConfigContentProvider,
    TConfig: Clone + for<'de> Deserialize<'de> + Serialize + Validate + Default,
    TConfigSerializer: ConfigSerializer<TConfig>,
{
    pub fn new(
        config_content_provider: TConfigContentProvider,
        config_serializer: TConfigSerializer,
    ) -> Self {
        Self {
            config: Arc::new(Mutex::new(None)),
            config_content_provider,
            config_serializer,
        }
    }

    pub fn get_config(&self) -> Result<TConfig, ConfigError> {
        let mut current = self.config.lock().map_err(|_| ConfigError::Poisoned)?;

        if let Some(config) = current.as_ref() {
            return Ok(config.clone());
        }

        let Some(config_data) = self.config_content_provider.get_config_content()? else {
            return Ok(TConfig::default());
        };

        let config: TConfig = self.config_serializer.deserialize(&config_data)?;
        config.validate().map_err(ConfigError::Invalid)?;

        *current = Some(config.clone());
        Ok(config)
    }

    pub fn set_config(&self, config: &TConfig) -> Result<(), ConfigError> {
        config.validate().map_err(ConfigError::Invalid)?;

        let serialized_config = self.config_serializer.serialize(config)?;
        self.config_content_provider
            .set_config_content(&serialized_config)?;

        let mut current = self.config.lock().map_err(|_| ConfigError::Poisoned)?;
        *current = Some(config.clone());
        Ok(())
    }

    /// Read-modify-write against the cached value.
    pub fn update_config(&self, update: impl FnOnce(&mut TConfig)) -> Result<TConfig, ConfigError> {
        let mut config = self.get_config()?;
        update(&mut config);
        self.set_config(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct SampleConfig {
        name: String,
        count: u32,
    }

    impl Validate for SampleConfig {
        fn validate(&self) -> Result<(), String> {
            if self.count > 10 {
                return Err("count must be at most 10".to_string());
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryProvider {
        content: RefCell<Option<String>>,
    }

    impl ConfigContentProvider for MemoryProvider {
        fn get_config_content(&self) -> Result<Option<String>, ConfigError> {
            Ok(self.content.borrow().clone())
        }

        fn set_config_content(&self, content: &str) -> Result<(), ConfigError> {
            *self.content.borrow_mut() = Some(content.to_string());
            Ok(())
        }
    }

    fn get_temp_file_path() -> String {
        let mut path = std::env::temp_dir();
        let random_number: u32 = rand::random();
        path.push(format!("temp_snake_common_config_{}.yaml", random_number));
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_missing_content_returns_default() {
        let manager: ConfigManager<_, SampleConfig, _> =
            ConfigManager::new(MemoryProvider::default(), YamlConfigSerializer::new());
        assert_eq!(manager.get_config().unwrap(), SampleConfig::default());
    }

    #[test]
    fn test_set_then_get_uses_file() {
        let file_path = get_temp_file_path();
        let manager: ConfigManager<_, SampleConfig, _> = ConfigManager::from_yaml_file(&file_path);
        let config = SampleConfig { name: "snake".to_string(), count: 3 };
        manager.set_config(&config).unwrap();

        let reloaded: ConfigManager<_, SampleConfig, _> = ConfigManager::from_yaml_file(&file_path);
        assert_eq!(reloaded.get_config().unwrap(), config);
        let _ = std::fs::remove_file(file_path);
    }

    #[test]
    fn test_invalid_config_is_rejected_on_write_and_read() {
        let manager: ConfigManager<_, SampleConfig, _> =
            ConfigManager::new(MemoryProvider::default(), YamlConfigSerializer::new());
        let invalid = SampleConfig { name: "x".to_string(), count: 11 };
        assert!(matches!(manager.set_config(&invalid), Err(ConfigError::Invalid(_))));

        let provider = MemoryProvider::default();
        provider.set_config_content("name: x\ncount: 42\n").unwrap();
        let manager: ConfigManager<_, SampleConfig, _> =
            ConfigManager::new(provider, YamlConfigSerializer::new());
        assert!(matches!(manager.get_config(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_yaml_is_a_deserialize_error() {
        let provider = MemoryProvider::default();
        provider.set_config_content("name: [unterminated").unwrap();
        let manager: ConfigManager<_, SampleConfig, _> =
            ConfigManager::new(provider, YamlConfigSerializer::new());
        assert!(matches!(manager.get_config(), Err(ConfigError::Deserialize(_))));
    }

    #[test]
    fn test_update_config_persists_change() {
        let manager: ConfigManager<_, SampleConfig, _> =
            ConfigManager::new(MemoryProvider::default(), YamlConfigSerializer::new());
        let updated = manager.update_config(|c| c.count = 7).unwrap();
        assert_eq!(updated.count, 7);
        assert_eq!(manager.get_config().unwrap().count, 7);
    }
}
