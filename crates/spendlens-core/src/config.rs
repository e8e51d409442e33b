//! Analytics configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for an override (explicit path, or
//!    ~/.local/share/spendlens/config/analytics.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Every key is optional; missing keys keep the built-in default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Category;

/// Upper bound for `trend.height_base + trend.height_span`
pub const MAX_BAR_HEIGHT: u32 = 1000;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

/// Remote API settings
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Amount bands and minimum input size for the clustering fallback
#[derive(Debug, Clone)]
pub struct ClusteringConfig {
    /// Amounts strictly below this are "low"
    pub low_band_max: f64,
    /// Amounts at or above this are "high"
    pub high_band_min: f64,
    pub min_records: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            low_band_max: 100.0,
            high_band_min: 500.0,
            min_records: 5,
        }
    }
}

/// Trend window and bar scaling
#[derive(Debug, Clone)]
pub struct TrendConfig {
    pub window_months: usize,
    pub height_base: u32,
    pub height_span: u32,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window_months: 6,
            height_base: 10,
            height_span: 80,
        }
    }
}

/// Budget utilization thresholds (percent)
#[derive(Debug, Clone)]
pub struct BudgetConfig {
    pub warning_percent: f64,
    pub exceeded_percent: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            warning_percent: 80.0,
            exceeded_percent: 100.0,
        }
    }
}

/// Full analytics configuration
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub remote: RemoteConfig,
    pub clustering: ClusteringConfig,
    pub trend: TrendConfig,
    pub budget: BudgetConfig,
    /// Category display order
    pub categories: Vec<Category>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            clustering: ClusteringConfig::default(),
            trend: TrendConfig::default(),
            budget: BudgetConfig::default(),
            categories: Category::all().to_vec(),
        }
    }
}

impl AnalyticsConfig {
    /// Load from the default override location, else embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit override path (embedded defaults if it does not exist)
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse config from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Apply `SPENDLENS_API_URL` if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("SPENDLENS_API_URL") {
            if !url.trim().is_empty() {
                self.remote.base_url = url.trim().to_string();
            }
        }
        self
    }

    /// Position of a category in display order (unlisted categories sort last)
    pub fn display_rank(&self, category: Category) -> usize {
        self.categories
            .iter()
            .position(|c| *c == category)
            .unwrap_or(self.categories.len())
    }

    fn validate(&self) -> Result<()> {
        let c = &self.clustering;
        if !(c.low_band_max > 0.0 && c.low_band_max <= c.high_band_min) {
            return Err(Error::Config(format!(
                "clustering bands out of order: low_band_max={} high_band_min={}",
                c.low_band_max, c.high_band_min
            )));
        }
        if c.min_records == 0 {
            return Err(Error::Config("clustering.min_records must be > 0".into()));
        }
        if self.trend.window_months < 2 {
            return Err(Error::Config(format!(
                "trend.window_months must be at least 2, got {}",
                self.trend.window_months
            )));
        }
        let t = &self.trend;
        if t.height_span == 0
            || t.height_base
                .checked_add(t.height_span)
                .map_or(true, |top| top > MAX_BAR_HEIGHT)
        {
            return Err(Error::Config(format!(
                "trend heights out of range: height_base={} height_span={} (span > 0, sum <= {})",
                t.height_base, t.height_span, MAX_BAR_HEIGHT
            )));
        }
        let b = &self.budget;
        if !(b.warning_percent >= 0.0 && b.warning_percent <= b.exceeded_percent) {
            return Err(Error::Config(format!(
                "budget thresholds out of order: warning={} exceeded={}",
                b.warning_percent, b.exceeded_percent
            )));
        }
        if self.categories.is_empty() {
            return Err(Error::Config("categories.names must not be empty".into()));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendlens").join("config").join("analytics.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AnalyticsConfig> {
    let path = match override_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let content = match path {
        Some(path) if path.exists() => {
            tracing::debug!(path = %path.display(), "Loading analytics config override");
            fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    remote: Option<RawRemote>,
    clustering: Option<RawClustering>,
    trend: Option<RawTrend>,
    budget: Option<RawBudget>,
    categories: Option<RawCategories>,
}

#[derive(Debug, Deserialize)]
struct RawRemote {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawClustering {
    low_band_max: Option<f64>,
    high_band_min: Option<f64>,
    min_records: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawTrend {
    window_months: Option<usize>,
    height_base: Option<u32>,
    height_span: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawBudget {
    warning_percent: Option<f64>,
    exceeded_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCategories {
    names: Option<Vec<String>>,
}

fn parse_config(content: &str) -> Result<AnalyticsConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AnalyticsConfig::default();

    if let Some(remote) = raw.remote {
        if let Some(url) = remote.base_url {
            config.remote.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = remote.timeout_secs {
            config.remote.timeout = Duration::from_secs(secs);
        }
    }

    if let Some(clustering) = raw.clustering {
        if let Some(v) = clustering.low_band_max {
            config.clustering.low_band_max = v;
        }
        if let Some(v) = clustering.high_band_min {
            config.clustering.high_band_min = v;
        }
        if let Some(v) = clustering.min_records {
            config.clustering.min_records = v;
        }
    }

    if let Some(trend) = raw.trend {
        if let Some(v) = trend.window_months {
            config.trend.window_months = v;
        }
        if let Some(v) = trend.height_base {
            config.trend.height_base = v;
        }
        if let Some(v) = trend.height_span {
            config.trend.height_span = v;
        }
    }

    if let Some(budget) = raw.budget {
        if let Some(v) = budget.warning_percent {
            config.budget.warning_percent = v;
        }
        if let Some(v) = budget.exceeded_percent {
            config.budget.exceeded_percent = v;
        }
    }

    if let Some(names) = raw.categories.and_then(|c| c.names) {
        config.categories = names
            .iter()
            .map(|name| name.parse::<Category>().map_err(Error::Config))
            .collect::<Result<Vec<_>>>()?;
    }

    config.validate()?;
    Ok(config)
}
