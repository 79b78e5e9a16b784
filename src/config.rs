use crate::{bias::Thresholds, chart::IdealRounding};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: Analysis,
    #[serde(default)]
    pub chart: Chart,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub significance_level: f64,
    pub min_total_rolls: usize,
    pub min_expected_per_face: f64,
}
impl Default for Analysis {
    fn default() -> Self {
        let t = Thresholds::default();
        Self {
            significance_level: t.significance_level,
            min_total_rolls: t.min_total_rolls,
            min_expected_per_face: t.min_expected_per_face,
        }
    }
}
impl Analysis {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            significance_level: self.significance_level,
            min_total_rolls: self.min_total_rolls,
            min_expected_per_face: self.min_expected_per_face,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Chart {
    pub ideal_rounding: IdealRounding,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub format: OutputFormat,
    pub pretty_json: bool,
    pub bar_width: usize,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty_json: true,
            bar_width: 40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
