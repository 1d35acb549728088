//! # Configuration File
//!
//! Optional YAML settings that supply defaults for the merge commands. CLI
//! flags and their environment variables take precedence over everything
//! here.
//!
//! ```yaml
//! resolution: skip        # overwrite | merge | skip | default
//! strict: true            # report collisions under the default policy
//! lineage: 0b5e...        # lineage when no base state is given
//! normalizer: terraform   # state | terraform
//! terraform:
//!   binary: /usr/local/bin/terraform
//!   working_dir: ./infra
//! ```
//!
//! The file is looked up with [`crate::defaults::discover_config`] unless a
//! path is passed explicitly.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resolve::Resolution;

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Collision policy name.
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub strict: Option<bool>,
    #[serde(default)]
    pub lineage: Option<String>,
    #[serde(default)]
    pub normalizer: Option<NormalizerKind>,
    #[serde(default)]
    pub terraform: TerraformConfig,
}

/// Settings for the terraform-backed normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerraformConfig {
    #[serde(default)]
    pub binary: Option<PathBuf>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// Which normalizer turns state files into module trees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizerKind {
    /// Read the module tree from the state file itself.
    #[default]
    State,
    /// Run `terraform show -json`.
    Terraform,
}

impl fmt::Display for NormalizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizerKind::State => f.write_str("state"),
            NormalizerKind::Terraform => f.write_str("terraform"),
        }
    }
}

impl FromStr for NormalizerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "state" => Ok(NormalizerKind::State),
            "terraform" => Ok(NormalizerKind::Terraform),
            _ => Err(Error::ConfigParse {
                message: format!("unknown normalizer '{}'", s),
                hint: Some("Use 'state' or 'terraform'".to_string()),
            }),
        }
    }
}

impl Config {
    /// The configured resolution policy, `Unset` when absent.
    pub fn resolution(&self) -> Result<Resolution> {
        match &self.resolution {
            Some(value) => value.parse(),
            None => Ok(Resolution::Unset),
        }
    }
}

/// Parse configuration YAML. An empty document yields the defaults.
pub fn parse(yaml_content: &str) -> Result<Config> {
    if yaml_content.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(yaml_content).map_err(|err| {
        let message = err.to_string();
        let hint = if message.contains("unknown field") {
            Some(
                "Valid keys are: resolution, strict, lineage, normalizer, terraform".to_string(),
            )
        } else {
            None
        };
        Error::ConfigParse { message, hint }
    })?;
    // Reject bad policy names at load time rather than at merge time.
    config.resolution()?;
    Ok(config)
}

/// Parse a configuration file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
