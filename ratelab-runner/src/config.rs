//! Analysis configuration loaded from TOML.
//!
//! ```toml
//! stablecoins = ["0xdba3...::usdc::USDC"]
//!
//! [[strategy]]
//! strategy_type = "recursive_lending"
//! protocol_a = "navi"
//! protocol_b = "suilend"
//! token1 = { symbol = "USDC", contract = "0xdba3...::usdc::USDC" }
//! token2 = { symbol = "SUI", contract = "0x2::sui::SUI" }
//! ```

use std::path::Path;

use ratelab_core::{ConfigError, HandlerRegistry, RegistryError, StrategyConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Why one configured strategy cannot be analysed.
#[derive(Debug, Error)]
pub enum StrategyProblem {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Stablecoin allowlist plus the strategies to analyse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub stablecoins: Vec<String>,
    #[serde(default, rename = "strategy")]
    pub strategies: Vec<StrategyConfig>,
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, LoadError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve and validate every strategy, in file order.
    pub fn validate(&self, registry: &HandlerRegistry) -> Vec<Result<(), StrategyProblem>> {
        self.strategies
            .iter()
            .map(|config| {
                let shape = registry.get(&config.strategy_type)?;
                shape.validate_config(config)?;
                Ok(())
            })
            .collect()
    }

    /// Find a strategy by position or by `strategy_id`.
    pub fn find_strategy(&self, selector: &str) -> Option<&StrategyConfig> {
        let by_index = selector
            .parse::<usize>()
            .ok()
            .and_then(|i| self.strategies.get(i));
        by_index.or_else(|| {
            self.strategies
                .iter()
                .find(|s| s.strategy_id() == selector)
        })
    }
}
