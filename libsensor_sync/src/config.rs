use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::constants::{DEFAULT_SAMPLE_RATE, DEFAULT_TOLERANCE_NS};
use super::error::ConfigError;

/// Fuse two fibers. `fiber_a` is the reference whose time axis is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FiberJob {
    pub fiber_a: u32,
    pub fiber_b: u32,
    #[serde(default = "default_tolerance")]
    pub tolerance_ns: i64,
}

impl Default for FiberJob {
    fn default() -> Self {
        Self {
            fiber_a: 1,
            fiber_b: 2,
            tolerance_ns: DEFAULT_TOLERANCE_NS,
        }
    }
}

/// Merge vibration channels 101, 102 and 103
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VibrationJob {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,
}

impl Default for VibrationJob {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

fn default_tolerance() -> i64 {
    DEFAULT_TOLERANCE_NS
}

fn default_sample_rate() -> f64 {
    DEFAULT_SAMPLE_RATE
}

/// Structure representing the application configuration. Contains the store and output paths
/// and the jobs to run.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub store_path: PathBuf,
    pub output_path: PathBuf,
    pub fibers: Option<FiberJob>,
    pub vibration: Option<VibrationJob>,
    #[serde(default)]
    pub generic_groups: Vec<String>,
}

impl Default for Config {
    /// Generate a new Config object. Paths will be empty/invalid, every job kind is enabled
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("None"),
            output_path: PathBuf::from("None"),
            fibers: Some(FiberJob::default()),
            vibration: Some(VibrationJob::default()),
            generic_groups: vec![
                String::from("environment_rpm"),
                String::from("environment_temperature"),
                String::from("load_temperature"),
            ],
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    pub fn does_store_exist(&self) -> bool {
        self.store_path.exists()
    }

    /// Get the path to an output csv file
    pub fn get_output_file_name(&self, stem: &str) -> Result<PathBuf, ConfigError> {
        if self.output_path.exists() {
            Ok(self.output_path.join(format!("{stem}.csv")))
        } else {
            Err(ConfigError::BadFilePath(self.output_path.clone()))
        }
    }

    /// Total number of jobs this config asks for
    pub fn job_count(&self) -> usize {
        self.fibers.iter().count() + self.vibration.iter().count() + self.generic_groups.len()
    }
}
