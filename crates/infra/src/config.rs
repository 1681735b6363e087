//! Engine configuration.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. `<dir>/rackquote.{toml,json,yaml}` (optional)
//! 3. `<dir>/local.{toml,json,yaml}` (optional, not checked in)
//! 4. environment, prefix `RACKQUOTE`, separator `__`
//!    (e.g. `RACKQUOTE__HISTORY_CAP=80`)

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use rackquote_engine::EngineSettings;
use rackquote_pricing::rate::FULL_RATE;
use rackquote_pricing::{ResolverSettings, SubtotalPolicy, clamp_history_cap};

pub const DEFAULT_CONFIG_DIR: &str = "config";
pub const ENV_PREFIX: &str = "RACKQUOTE";

/// Load from `config/` and the environment.
pub fn load() -> anyhow::Result<EngineConfig> {
    EngineConfig::load()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub history_cap: usize,
    pub suffix_fallback: bool,
    pub subtotal_policy: SubtotalPolicy,
    pub apply_rate: f64,
    /// Directory holding the catalog JSON documents.
    pub catalog_dir: PathBuf,
    pub override_store_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_cap: ResolverSettings::default().history_cap,
            suffix_fallback: true,
            subtotal_policy: SubtotalPolicy::default(),
            apply_rate: FULL_RATE,
            catalog_dir: PathBuf::from("catalog"),
            override_store_path: PathBuf::from("data/overrides.json"),
        }
    }
}

impl EngineConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_DIR))
    }

    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("history_cap", defaults.history_cap as i64)?
            .set_default("suffix_fallback", defaults.suffix_fallback)?
            .set_default("subtotal_policy", "material-with-item-fallback")?
            .set_default("apply_rate", defaults.apply_rate)?
            .set_default("catalog_dir", defaults.catalog_dir.to_string_lossy().into_owned())?
            .set_default("override_store_path", defaults.override_store_path.to_string_lossy().into_owned())?
            .add_source(File::from(dir.join("rackquote")).required(false))
            .add_source(File::from(dir.join("local")).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("loading configuration from {}", dir.display()))?;

        let config: Self = settings
            .try_deserialize()
            .context("deserializing engine configuration")?;
        Ok(config.normalized())
    }

    /// Clamp out-of-range values instead of rejecting them.
    fn normalized(mut self) -> Self {
        self.history_cap = clamp_history_cap(self.history_cap);
        if !(0.0..=FULL_RATE).contains(&self.apply_rate) {
            tracing::warn!(apply_rate = self.apply_rate, "apply_rate out of range; using 100");
            self.apply_rate = FULL_RATE;
        }
        self
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            resolver: ResolverSettings {
                suffix_fallback: self.suffix_fallback,
                history_cap: self.history_cap,
            },
            subtotal_policy: self.subtotal_policy,
            apply_rate: self.apply_rate,
        }
    }
}
