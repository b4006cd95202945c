use crate::errors::{BloomError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Sizing and storage options for a new filter, loadable from JSON.
///
/// ```json
/// { "capacity": 1000000, "fp_rate": 0.01, "compress": false }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub capacity: u64,
    pub fp_rate: f64,
    #[serde(default)]
    pub compress: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000_000,
            fp_rate: 0.01,
            compress: false,
        }
    }
}

impl FilterConfig {
    pub fn new(capacity: u64, fp_rate: f64) -> Self {
        Self { capacity, fp_rate, ..Default::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(BloomError::InvalidParameter("capacity must be greater than 0".into()));
        }
        if !(self.fp_rate > 0.0 && self.fp_rate < 1.0) {
            return Err(BloomError::InvalidParameter(format!(
                "fp_rate must be in (0, 1), got {}",
                self.fp_rate
            )));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let cfg: FilterConfig = serde_json::from_str(&s)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
