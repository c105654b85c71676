use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for alurkerja
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlurkerjaConfig {
    /// Root directory for workflow definitions, project records and the
    /// user roster
    pub data_dir: String,
    /// Roles allowed to act on any project and to apply manual overrides
    pub admin_roles: Vec<String>,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Notification settings
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
    /// Emit log events as JSON lines
    pub json_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Deliver transition notifications to the sink
    pub enabled: bool,
}

impl Default for AlurkerjaConfig {
    fn default() -> Self {
        Self {
            data_dir: ".alurkerja".to_string(),
            admin_roles: vec![
                "Owner".to_string(),
                "Admin Proyek".to_string(),
                "Admin Developer".to_string(),
            ],
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
            notifications: NotificationConfig { enabled: true },
        }
    }
}

impl AlurkerjaConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. Configuration file (alurkerja.toml)
    /// 3. Environment variables (prefixed with ALURKERJA_)
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("data_dir", defaults.data_dir.clone())?
            .set_default("admin_roles", defaults.admin_roles.clone())?
            .set_default(
                "observability.log_level",
                defaults.observability.log_level.clone(),
            )?
            .set_default("observability.json_logs", defaults.observability.json_logs)?
            .set_default("notifications.enabled", defaults.notifications.enabled)?;

        if Path::new("alurkerja.toml").exists() {
            builder = builder.add_source(File::with_name("alurkerja"));
        }

        builder = builder.add_source(
            Environment::with_prefix("ALURKERJA")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_admin_tier_roles() {
        let config = AlurkerjaConfig::default();
        assert!(config.admin_roles.contains(&"Owner".to_string()));
        assert_eq!(config.data_dir, ".alurkerja");
        assert!(config.notifications.enabled);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = AlurkerjaConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: AlurkerjaConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.admin_roles, config.admin_roles);
    }
}
