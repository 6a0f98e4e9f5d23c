use std::path::Path;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,
    pub asset_path: String,
    pub summary_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            asset_path: "/search.json".to_string(),
            summary_length: 160,
        }
    }
}

pub fn validate_search_config(config: &SearchConfig, origin: &Path) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let trimmed = config.asset_path.trim();
    if trimmed.is_empty() || trimmed.trim_start_matches('/').is_empty() {
        bail!("{}: search.asset_path must not be empty", origin.display());
    }

    if trimmed.split('/').any(|segment| segment == "..") {
        bail!(
            "{}: search.asset_path '{}' must stay inside the output directory",
            origin.display(),
            config.asset_path
        );
    }

    if config.summary_length == 0 {
        bail!(
            "{}: search.summary_length must be greater than zero",
            origin.display()
        );
    }

    Ok(())
}
