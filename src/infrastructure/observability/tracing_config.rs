use crate::presentation::config::{Environment, LoggingSettings};

const DEFAULT_DIRECTIVES: &str = "docstream=debug,tower_http=debug";

/// Inputs to [`super::init_tracing`], resolved from settings and the
/// `LOG_FORMAT` override.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: Environment,
    pub json_format: bool,
    pub default_filter: String,
}

impl TracingConfig {
    pub fn from_settings(environment: Environment, logging: &LoggingSettings) -> Self {
        let json_override = std::env::var("LOG_FORMAT")
            .ok()
            .map(|v| v.eq_ignore_ascii_case("json"));

        Self {
            environment,
            json_format: json_override
                .unwrap_or(logging.enable_json || environment.prefers_json_logs()),
            default_filter: format!("{},{DEFAULT_DIRECTIVES}", logging.level),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::from_settings(Environment::Local, &LoggingSettings::default())
    }
}
