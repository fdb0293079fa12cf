use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

pub const MAX_WINDOW_CAPACITY: usize = 10_000;
pub const MAX_HISTORY_CAPACITY: usize = 100_000;
pub const MAX_BROADCAST_BUFFER: usize = 65_536;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub spread: SpreadConfig,
    #[serde(default)]
    pub symbols: Vec<SymbolConfig>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_interval_ms: u64,
    pub window_capacity: usize,
    pub zscore_min_samples: usize,
    pub history_capacity: usize,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            window_capacity: 30,
            zscore_min_samples: 5,
            history_capacity: 500,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Anchor/base designation for the spread policy. Unset roles fall back to
/// the first configured symbol (anchor) and the first non-anchor symbol (base).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpreadConfig {
    pub anchor: Option<String>,
    pub base: Option<String>,
    pub ratio: f64,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            anchor: None,
            base: None,
            ratio: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolConfig {
    pub id: String,
    pub initial_price: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub broadcast_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            broadcast_buffer: 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load `.env`, read the TOML file (`MARKET_SIM_CONFIG` or `config/default.toml`),
    /// apply env overrides and validate.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var("MARKET_SIM_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_from(Path::new(&path))?;
        config.apply_env_overrides()?;
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&config_str).with_context(|| format!("failed to parse {}", path.display()))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("MARKET_SIM_BIND") {
            self.server.bind_addr = addr;
        }
        if let Ok(ms) = std::env::var("MARKET_SIM_TICK_MS") {
            self.simulation.tick_interval_ms = ms
                .trim()
                .parse()
                .with_context(|| format!("MARKET_SIM_TICK_MS is not an integer: '{}'", ms))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        if self.symbols.len() < 2 {
            return Err(ConfigError::TooFewSymbols(self.symbols.len()));
        }

        let mut seen = HashSet::new();
        for (idx, sym) in self.symbols.iter().enumerate() {
            let id = sym.id.trim();
            if id.is_empty() {
                return Err(ConfigError::EmptySymbolId(idx));
            }
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateSymbol(id.to_string()));
            }
            if !sym.initial_price.is_finite() || sym.initial_price <= 0.0 {
                return Err(ConfigError::InvalidPrice {
                    symbol: id.to_string(),
                    price: sym.initial_price,
                });
            }
            if !sym.volatility.is_finite() || sym.volatility < 0.0 {
                return Err(ConfigError::InvalidVolatility {
                    symbol: id.to_string(),
                    volatility: sym.volatility,
                });
            }
        }

        let sim = &self.simulation;
        if sim.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroSetting("simulation.tick_interval_ms"));
        }
        if sim.window_capacity == 0 {
            return Err(ConfigError::ZeroSetting("simulation.window_capacity"));
        }
        if sim.history_capacity == 0 {
            return Err(ConfigError::ZeroSetting("simulation.history_capacity"));
        }
        check_max(
            "simulation.window_capacity",
            sim.window_capacity,
            MAX_WINDOW_CAPACITY,
        )?;
        check_max(
            "simulation.history_capacity",
            sim.history_capacity,
            MAX_HISTORY_CAPACITY,
        )?;
        if sim.zscore_min_samples == 0 || sim.zscore_min_samples > sim.window_capacity {
            return Err(ConfigError::InvalidMinSamples {
                min: sim.zscore_min_samples,
                capacity: sim.window_capacity,
            });
        }
        if self.server.broadcast_buffer == 0 {
            return Err(ConfigError::ZeroSetting("server.broadcast_buffer"));
        }
        check_max(
            "server.broadcast_buffer",
            self.server.broadcast_buffer,
            MAX_BROADCAST_BUFFER,
        )?;

        if !self.spread.ratio.is_finite() {
            return Err(ConfigError::InvalidRatio(self.spread.ratio));
        }
        let (anchor, base) = self.spread_roles();
        if !seen.contains(anchor.as_str()) {
            return Err(ConfigError::UnknownSpreadSymbol {
                role: "anchor",
                symbol: anchor,
            });
        }
        if !seen.contains(base.as_str()) {
            return Err(ConfigError::UnknownSpreadSymbol {
                role: "base",
                symbol: base,
            });
        }
        if anchor == base {
            return Err(ConfigError::AnchorIsBase(anchor));
        }
        Ok(())
    }

    /// Ordered symbol ids, trimmed.
    pub fn symbol_ids(&self) -> Vec<String> {
        self.symbols.iter().map(|s| s.id.trim().to_string()).collect()
    }

    /// Resolved `(anchor, base)` symbol ids.
    pub fn spread_roles(&self) -> (String, String) {
        let ids = self.symbol_ids();
        let anchor = self
            .spread
            .anchor
            .as_deref()
            .map(|s| s.trim().to_string())
            .or_else(|| ids.first().cloned())
            .unwrap_or_default();
        let base = self
            .spread
            .base
            .as_deref()
            .map(|s| s.trim().to_string())
            .or_else(|| ids.iter().find(|id| **id != anchor).cloned())
            .unwrap_or_default();
        (anchor, base)
    }
}

// Windows, history and the broadcast ring are allocated up front.
fn check_max(setting: &'static str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::SettingTooLarge {
            setting,
            value,
            max,
        });
    }
    Ok(())
}
