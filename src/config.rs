use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::recovery::RecoveryStrategy;

/// Engine configuration
///
/// The strategy-defaults table drives which bounded budget the handler
/// assigns when the caller does not supply an explicit action. The
/// compiled defaults match tuned production values; a TOML file can
/// override any subset of fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-strategy attempt/wait budgets
    #[serde(default)]
    pub strategies: StrategyDefaults,

    /// Upper bound for best-effort session introspection calls (ms)
    #[serde(default = "default_introspection_timeout_ms")]
    pub introspection_timeout_ms: u64,
}

/// Default budgets for each executable recovery strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDefaults {
    #[serde(default = "StrategyBudget::retry")]
    pub retry: StrategyBudget,

    #[serde(default = "StrategyBudget::refresh")]
    pub refresh: StrategyBudget,

    #[serde(default = "StrategyBudget::navigate")]
    pub navigate: StrategyBudget,

    #[serde(default = "StrategyBudget::restart_session")]
    pub restart_session: StrategyBudget,
}

/// Bounded budget for one strategy: attempt ceiling and inter-attempt wait
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StrategyBudget {
    pub max_attempts: u32,
    pub wait_secs: u64,
}

fn default_introspection_timeout_ms() -> u64 {
    2000
}

impl StrategyBudget {
    fn retry() -> Self {
        Self {
            max_attempts: 3,
            wait_secs: 2,
        }
    }

    fn refresh() -> Self {
        Self {
            max_attempts: 2,
            wait_secs: 5,
        }
    }

    fn navigate() -> Self {
        Self {
            max_attempts: 2,
            wait_secs: 10,
        }
    }

    fn restart_session() -> Self {
        Self {
            max_attempts: 1,
            wait_secs: 15,
        }
    }

    /// Inter-attempt wait as a `Duration`
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }
}

impl Default for StrategyDefaults {
    fn default() -> Self {
        Self {
            retry: StrategyBudget::retry(),
            refresh: StrategyBudget::refresh(),
            navigate: StrategyBudget::navigate(),
            restart_session: StrategyBudget::restart_session(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default location, falling back to
    /// compiled defaults if no file exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(EngineConfig::default());
        }

        Self::from_file(&config_path)
    }

    /// Load configuration from an explicit file path
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: EngineConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;

        Ok(home.join(".flakeguard").join("config.toml"))
    }

    /// Budget for an executable strategy; `None` for Skip/Fail, which
    /// carry no attempt budget
    pub fn budget_for(&self, strategy: RecoveryStrategy) -> Option<StrategyBudget> {
        match strategy {
            RecoveryStrategy::Retry => Some(self.strategies.retry),
            RecoveryStrategy::Refresh => Some(self.strategies.refresh),
            RecoveryStrategy::Navigate => Some(self.strategies.navigate),
            RecoveryStrategy::RestartSession => Some(self.strategies.restart_session),
            RecoveryStrategy::Skip | RecoveryStrategy::Fail => None,
        }
    }

    /// Introspection bound as a `Duration`
    pub fn introspection_timeout(&self) -> Duration {
        Duration::from_millis(self.introspection_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            strategies: StrategyDefaults::default(),
            introspection_timeout_ms: default_introspection_timeout_ms(),
        }
    }
}
