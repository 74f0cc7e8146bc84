use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quantile fractions used to derive outlier limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_q1")]
    pub q1: f64,
    #[serde(default = "default_q3")]
    pub q3: f64,
}

fn default_q1() -> f64 {
    0.25
}
fn default_q3() -> f64 {
    0.75
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            q1: default_q1(),
            q3: default_q3(),
        }
    }
}

/// Cardinality thresholds for the column classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyConfig {
    #[serde(default = "default_cat_th")]
    pub cat_th: usize, // numeric columns below this many distinct values count as categorical
    #[serde(default = "default_car_th")]
    pub car_th: usize, // categorical columns above this many distinct values count as cardinal
}

fn default_cat_th() -> usize {
    10
}
fn default_car_th() -> usize {
    20
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            cat_th: default_cat_th(),
            car_th: default_car_th(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_tail_rows")]
    pub tail_rows: usize,
    #[serde(default)]
    pub plot: bool,
    #[serde(default)]
    pub format: ReportFormat,
}

fn default_tail_rows() -> usize {
    5
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            tail_rows: default_tail_rows(),
            plot: false,
            format: ReportFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    #[serde(default = "default_corr_threshold")]
    pub threshold: f64,
}

fn default_corr_threshold() -> f64 {
    0.90
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            threshold: default_corr_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EdaConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub classify: ClassifyConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub correlation: CorrelationConfig,
}

impl EdaConfig {
    pub fn config_path() -> PathBuf {
        if let Ok(env_path) = std::env::var("EDA_LENS_CONFIG") {
            return PathBuf::from(env_path); // $EDA_LENS_CONFIG overrides default config path
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eda-lens")
            .join("config.toml")
    }

    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Reads the config at `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let cfg: Self =
            toml::from_str(&content).map_err(|e| crate::EdaLensError::Other(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::EdaLensError::Other(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> crate::Result<()> {
        let ThresholdConfig { q1, q3 } = self.thresholds;
        if !(0.0..=1.0).contains(&q1) || !(0.0..=1.0).contains(&q3) || q1 >= q3 {
            return Err(crate::EdaLensError::InvalidInput(format!(
                "quantile fractions must satisfy 0 <= q1 < q3 <= 1, got q1={q1} q3={q3}"
            )));
        }
        if !(0.0..=1.0).contains(&self.correlation.threshold) {
            return Err(crate::EdaLensError::InvalidInput(format!(
                "correlation threshold must be in [0, 1], got {}",
                self.correlation.threshold
            )));
        }
        Ok(())
    }
}
