//! # Module Trees and Normalization
//!
//! The merge engine walks a normalized module hierarchy rather than the flat
//! resource list of a state file. This module defines that hierarchy and the
//! [`StateNormalizer`] collaborator that produces it from a file on disk.
//!
//! Two normalizers are provided:
//!
//! - [`StateFileNormalizer`] derives the tree from the state file itself,
//!   grouping resource blocks by their `module` address.
//! - [`terraform::TerraformNormalizer`] asks the `terraform` executable for
//!   its `show -json` rendering of the file.

pub mod terraform;

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::state::{self, StateDocument};

/// A node of the module hierarchy. The root module has an empty address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub address: String,
    pub resources: Vec<TreeResource>,
    pub children: Vec<Module>,
}

/// A resource as seen in a normalized module tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeResource {
    /// Explicit address; may be empty.
    pub address: String,
    pub mode: String,
    pub resource_type: String,
    pub name: String,
    /// Fully-qualified provider name, e.g. `registry.terraform.io/hashicorp/null`.
    pub provider_name: String,
    pub schema_version: u64,
    /// `None` when the source did not report dependencies.
    pub depends_on: Option<Vec<String>>,
}

impl TreeResource {
    /// The identity used by the ledger: the explicit address when present,
    /// otherwise `provider.type.name`.
    pub fn canonical_address(&self) -> String {
        if !self.address.is_empty() {
            self.address.clone()
        } else {
            [
                self.provider_name.as_str(),
                self.resource_type.as_str(),
                self.name.as_str(),
            ]
            .join(".")
        }
    }
}

impl Module {
    /// Build the module hierarchy of a state document.
    ///
    /// Child modules appear in the order their first resource appears in the
    /// document. Intermediate modules that own no resources are created so
    /// that every module hangs off its parent.
    pub fn from_document(document: &StateDocument) -> Module {
        let mut order: Vec<String> = Vec::new();
        let mut flat: HashMap<String, Module> = HashMap::new();

        for resource in &document.resources {
            ensure_module(&resource.module, &mut order, &mut flat);
            let Some(node) = flat.get_mut(&resource.module) else {
                continue;
            };
            node.resources.push(TreeResource {
                address: resource.address(),
                mode: resource.mode.clone(),
                resource_type: resource.resource_type.clone(),
                name: resource.name.clone(),
                provider_name: state::provider_name(&resource.provider).to_string(),
                schema_version: resource.schema_version,
                depends_on: Some(resource.dependencies.clone()),
            });
        }

        let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
        for address in &order {
            if let Some(parent) = parent_address(address) {
                children_of
                    .entry(parent.to_string())
                    .or_default()
                    .push(address.clone());
            }
        }

        assemble("", &mut flat, &children_of)
    }

    /// Number of resources in this module and all of its descendants.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
            + self
                .children
                .iter()
                .map(Module::resource_count)
                .sum::<usize>()
    }

    /// Canonical addresses in walk order: own resources first, then each
    /// child subtree.
    pub fn addresses(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.resource_count());
        self.collect_addresses(&mut out);
        out
    }

    fn collect_addresses(&self, out: &mut Vec<String>) {
        out.extend(self.resources.iter().map(TreeResource::canonical_address));
        for child in &self.children {
            child.collect_addresses(out);
        }
    }
}

fn ensure_module(address: &str, order: &mut Vec<String>, flat: &mut HashMap<String, Module>) {
    if flat.contains_key(address) {
        return;
    }
    if let Some(parent) = parent_address(address) {
        ensure_module(parent, order, flat);
    }
    order.push(address.to_string());
    flat.insert(
        address.to_string(),
        Module {
            address: address.to_string(),
            ..Default::default()
        },
    );
}

fn assemble(
    address: &str,
    flat: &mut HashMap<String, Module>,
    children_of: &HashMap<String, Vec<String>>,
) -> Module {
    let mut node = flat.remove(address).unwrap_or_default();
    if let Some(children) = children_of.get(address) {
        node.children = children
            .iter()
            .map(|child| assemble(child, flat, children_of))
            .collect();
    }
    node
}

/// Address of the enclosing module; `None` for the root.
///
/// `module.a.module.b["x"]` has parent `module.a`, and `module.a` has the
/// root (empty address) as parent.
pub fn parent_address(address: &str) -> Option<&str> {
    if address.is_empty() {
        return None;
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut split = None;
    for (idx, ch) in address.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 && address[idx..].starts_with(".module.") => split = Some(idx),
            _ => {}
        }
    }
    Some(split.map_or("", |idx| &address[..idx]))
}

/// Produces the module tree of a state file.
///
/// Implementations are called exactly once per input document per merge.
pub trait StateNormalizer {
    fn normalize(&self, path: &Path) -> Result<Module>;
}

impl<T: StateNormalizer + ?Sized> StateNormalizer for Box<T> {
    fn normalize(&self, path: &Path) -> Result<Module> {
        (**self).normalize(path)
    }
}

/// Derives the module tree directly from the state file contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateFileNormalizer;

impl StateNormalizer for StateFileNormalizer {
    fn normalize(&self, path: &Path) -> Result<Module> {
        let bytes = std::fs::read(path).map_err(|e| Error::Normalize {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let document: StateDocument =
            serde_json::from_slice(&bytes).map_err(|e| Error::Normalize {
                path: path.to_path_buf(),
                message: format!("not a valid state file: {}", e),
            })?;
        Ok(Module::from_document(&document))
    }
}
