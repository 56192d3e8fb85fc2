use config::{Config, File};
use serde::Deserialize;

use super::Environment;
use crate::domain::{EmissionMode, PendingMode};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub messaging: MessagingSettings,
    pub chunking: ChunkingSettings,
    pub storage: StorageSettings,
    pub processing: ProcessingSettings,
    pub pending: PendingSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessagingSettings {
    pub input_destination: String,
    pub output_destination: String,
    pub binding_name: String,
    pub consumer_group: String,
    pub concurrency: usize,
    /// Only honoured when processing is enabled at startup.
    pub auto_startup: bool,
    pub startup_stop_delay_ms: u64,
    pub max_delivery_attempts: u32,
    pub redelivery_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub chunk_size_bytes: usize,
    pub bytes_per_token: usize,
    pub min_tokens: usize,
    pub max_tokens: usize,
    pub keep_separator: bool,
    pub max_chunks_per_document: usize,
    pub emission: EmissionMode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub staging_path: String,
    pub durable_root: String,
    pub base_url: String,
    pub output_dir: String,
    pub input_dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Local,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    pub download_timeout_secs: u64,
    pub extraction_timeout_secs: u64,
    pub max_document_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PendingSettings {
    pub mode: PendingMode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl Settings {
    /// Loads `appsettings.{environment}` (optional) overlaid with `APP_*`
    /// environment variables, `__` separating nested keys.
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        let configuration = Config::builder()
            .add_source(File::with_name(&environment.settings_file()).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = configuration.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.chunking.bytes_per_token == 0 {
            return Err(SettingsError::Invalid {
                field: "chunking.bytes_per_token",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.chunking.min_tokens == 0 || self.chunking.min_tokens > self.chunking.max_tokens {
            return Err(SettingsError::Invalid {
                field: "chunking.min_tokens",
                reason: format!(
                    "must be in 1..={} (max_tokens)",
                    self.chunking.max_tokens
                ),
            });
        }
        if self.messaging.concurrency == 0 {
            return Err(SettingsError::Invalid {
                field: "messaging.concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.messaging.max_delivery_attempts == 0 {
            return Err(SettingsError::Invalid {
                field: "messaging.max_delivery_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for MessagingSettings {
    fn default() -> Self {
        Self {
            input_destination: "documents.input".to_string(),
            output_destination: "documents.extracted".to_string(),
            binding_name: "extractor-in-0".to_string(),
            consumer_group: "docstream".to_string(),
            concurrency: 2,
            auto_startup: false,
            startup_stop_delay_ms: 500,
            max_delivery_attempts: 3,
            redelivery_delay_ms: 1000,
        }
    }
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size_bytes: 256 * 1024,
            bytes_per_token: 4,
            min_tokens: 1000,
            max_tokens: 2000,
            keep_separator: true,
            max_chunks_per_document: 10_000,
            emission: EmissionMode::Document,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProviderSetting::Local,
            staging_path: "./data/staging".to_string(),
            durable_root: "./data/store".to_string(),
            base_url: "hdfs://docstream".to_string(),
            output_dir: "processed".to_string(),
            input_dir: "incoming".to_string(),
        }
    }
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            download_timeout_secs: 60,
            extraction_timeout_secs: 120,
            max_document_bytes: 100 * 1024 * 1024,
        }
    }
}

impl Default for PendingSettings {
    fn default() -> Self {
        Self {
            mode: PendingMode::Queue,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_json: false,
        }
    }
}
