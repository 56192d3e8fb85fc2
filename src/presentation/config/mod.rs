mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ChunkingSettings, LoggingSettings, MessagingSettings, PendingSettings, ProcessingSettings, ServerSettings, Settings, SettingsError,
    StorageProviderSetting, StorageSettings,
};
