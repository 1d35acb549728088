//! Normalization through `terraform show -json`.
//!
//! This uses the system `terraform` executable, which must be able to read
//! the state file (the working directory needs the providers referenced by
//! the state to be initialized).
//!
//! `show -json` lists one entry per resource *instance*. Entries that share a
//! resource block (same module, mode, type and name) are folded into a single
//! [`TreeResource`] addressed without the instance key, so the tree lines up
//! with the resource blocks of the state file.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use serde::de::IgnoredAny;
use serde::Deserialize;

use super::{Module, StateNormalizer, TreeResource};
use crate::defaults::DEFAULT_TERRAFORM_BINARY;
use crate::error::{Error, Result};
use crate::state::resource_address;

#[derive(Debug, Deserialize)]
struct ShowOutput {
    #[serde(default)]
    values: Option<ShowValues>,
}

#[derive(Debug, Deserialize)]
struct ShowValues {
    #[serde(default)]
    root_module: Option<ShowModule>,
}

#[derive(Debug, Default, Deserialize)]
struct ShowModule {
    #[serde(default)]
    address: String,
    #[serde(default)]
    resources: Vec<ShowResource>,
    #[serde(default)]
    child_modules: Vec<ShowModule>,
}

#[derive(Debug, Deserialize)]
struct ShowResource {
    mode: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    index: Option<IgnoredAny>,
    #[serde(default)]
    provider_name: String,
    #[serde(default)]
    schema_version: u64,
    #[serde(default)]
    depends_on: Option<Vec<String>>,
}

/// Normalizer backed by the `terraform` CLI.
#[derive(Debug, Clone)]
pub struct TerraformNormalizer {
    binary: PathBuf,
    working_dir: Option<PathBuf>,
}

impl Default for TerraformNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_TERRAFORM_BINARY)
    }
}

impl TerraformNormalizer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: None,
        }
    }

    /// Run terraform in `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl StateNormalizer for TerraformNormalizer {
    fn normalize(&self, path: &Path) -> Result<Module> {
        let absolute = std::path::absolute(path)?;
        let mut command = Command::new(&self.binary);
        command.args(["show", "-json"]).arg(&absolute);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let display = format!("{} show -json {}", self.binary.display(), absolute.display());
        debug!("running {}", display);

        let output = command.output().map_err(|e| Error::TerraformCommand {
            command: display.clone(),
            stderr: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(Error::TerraformCommand {
                command: display,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        module_from_show_json(&output.stdout).map_err(|message| Error::Normalize {
            path: path.to_path_buf(),
            message,
        })
    }
}

/// Build a module tree from `terraform show -json` output.
pub fn module_from_show_json(bytes: &[u8]) -> std::result::Result<Module, String> {
    let show: ShowOutput = serde_json::from_slice(bytes)
        .map_err(|e| format!("unexpected terraform show output: {}", e))?;
    let root = show
        .values
        .and_then(|values| values.root_module)
        .unwrap_or_default();
    Ok(convert(root))
}

fn convert(module: ShowModule) -> Module {
    let mut resources: Vec<TreeResource> = Vec::new();
    for resource in module.resources {
        let address = resource_address(
            &module.address,
            &resource.mode,
            &resource.resource_type,
            &resource.name,
        );
        // Instances of one block share its address; keep the first.
        if resource.index.is_some() && resources.iter().any(|r| r.address == address) {
            continue;
        }
        resources.push(TreeResource {
            address,
            mode: resource.mode,
            resource_type: resource.resource_type,
            name: resource.name,
            provider_name: resource.provider_name,
            schema_version: resource.schema_version,
            depends_on: resource.depends_on,
        });
    }

    Module {
        address: module.address,
        resources,
        children: module.child_modules.into_iter().map(convert).collect(),
    }
}
