//! # State Document Model
//!
//! Typed representation of the Terraform state file format, used both for
//! parsing input documents and for emitting the merged result.
//!
//! Fields the merge engine never interprets (output values, check results,
//! sensitive attribute markers and instance payloads) are held as
//! [`RawValue`] so their bytes pass through unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

use crate::error::{Error, Result};

/// An uninterpreted JSON value carried verbatim.
pub type Opaque = Box<RawValue>;

/// A complete state document: one input file, the base state, or the merged
/// output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub terraform_version: String,
    #[serde(default)]
    pub serial: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lineage: String,
    #[serde(default)]
    pub outputs: BTreeMap<String, Opaque>,
    #[serde(default)]
    pub check_results: Option<Opaque>,
    #[serde(default)]
    pub resources: Vec<StateResource>,
}

impl StateDocument {
    /// Parse a state document. `origin` names the document in error messages.
    pub fn from_slice(bytes: &[u8], origin: &str) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|source| Error::ParseState {
            origin: origin.to_string(),
            source,
        })
    }

    /// Serialize as indented JSON with a trailing newline.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self).map_err(|err| Error::Serialization {
            message: format!("Failed to serialize merged state: {}", err),
        })?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// One resource block of a state document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResource {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub module: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub provider: String,
    #[serde(default)]
    pub schema_version: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dependencies: Vec<String>,
    #[serde(
        default,
        deserialize_with = "present_as_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub sensitive_attributes: Option<Opaque>,
    #[serde(default)]
    pub instances: Vec<Opaque>,
}

impl StateResource {
    /// Address of this block including its module path, e.g.
    /// `module.app.data.aws_ami.base`.
    pub fn address(&self) -> String {
        resource_address(&self.module, &self.mode, &self.resource_type, &self.name)
    }

    /// Correlation key used to find this block from a module tree resource.
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.module, &self.mode, &self.resource_type, &self.name)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Keeps an explicit `null` as `Some("null")`; only a missing key is `None`.
fn present_as_some<'de, D>(deserializer: D) -> std::result::Result<Option<Opaque>, D::Error>
where
    D: Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

/// Identifies a resource block within one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub module: String,
    pub mode: String,
    pub resource_type: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(module: &str, mode: &str, resource_type: &str, name: &str) -> Self {
        Self {
            module: module.to_string(),
            mode: mode.to_string(),
            resource_type: resource_type.to_string(),
            name: name.to_string(),
        }
    }
}

/// Build a resource address in Terraform notation.
///
/// Data sources get a `data.` prefix and resources inside a module are
/// prefixed with the module address.
pub fn resource_address(module: &str, mode: &str, resource_type: &str, name: &str) -> String {
    let local = if mode == "data" {
        format!("data.{}.{}", resource_type, name)
    } else {
        format!("{}.{}", resource_type, name)
    };
    if module.is_empty() {
        local
    } else {
        format!("{}.{}", module, local)
    }
}

/// Format a fully-qualified provider name as a state provider descriptor.
pub fn provider_descriptor(fq_name: &str) -> String {
    format!("provider[\"{}\"]", fq_name)
}

/// Extract the fully-qualified provider name from a descriptor.
///
/// Accepts `provider["registry.terraform.io/hashicorp/null"]`, optionally
/// prefixed by a module path and optionally with an alias suffix. Anything
/// else is returned unchanged.
pub fn provider_name(descriptor: &str) -> &str {
    const OPEN: &str = "provider[\"";
    let Some(start) = descriptor.find(OPEN) else {
        return descriptor;
    };
    let rest = &descriptor[start + OPEN.len()..];
    match rest.find("\"]") {
        Some(end) => &rest[..end],
        None => descriptor,
    }
}

/// Where a resource record came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// The pre-existing state the inputs are merged on top of.
    Base,
    /// An input state file.
    File(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Base => write!(f, "base state"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A record that has been placed in the merged output, with its source and
/// canonical address.
#[derive(Debug, Clone)]
pub struct PlacedResource {
    pub address: String,
    pub source: Source,
    pub record: StateResource,
}
