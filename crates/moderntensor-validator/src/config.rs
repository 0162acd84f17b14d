//! On-disk validator configuration: the ambient surface around the
//! scheduling core (subnet identity, registry/publisher endpoints,
//! logging) plus the core's own `SchedulerConfig` table.

use moderntensor_core::SchedulerConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub validator: ValidatorSection,
    pub network: NetworkSection,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorSection {
    /// Identifier of the subnet this validator serves.
    pub subnet_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSection {
    /// Base URL of the registry collaborator (`fetch_active_miners`).
    pub registry_endpoint: String,
    /// Base URL of the publisher collaborator (`publish_scores`).
    pub publish_endpoint: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            validator: ValidatorSection { subnet_id: 0 },
            network: NetworkSection {
                registry_endpoint: "http://127.0.0.1:9000".to_string(),
                publish_endpoint: "http://127.0.0.1:9001".to_string(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            scheduler: SchedulerConfig::default(),
            logging: LoggingSection::default(),
        }
    }
}

impl ValidatorConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ValidatorConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.network.registry_endpoint.is_empty() {
            anyhow::bail!("network.registry_endpoint must not be empty");
        }
        if self.network.publish_endpoint.is_empty() {
            anyhow::bail!("network.publish_endpoint must not be empty");
        }
        self.scheduler.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(())
    }
}
