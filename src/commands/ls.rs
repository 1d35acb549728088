//! # Ls Command Implementation
//!
//! This module implements the `ls` subcommand, which lists the canonical
//! address of every resource in a state file, in the order a merge would
//! place them: each module's own resources first, then its child modules.
//!
//! Comparing the listings of two files is a quick way to predict collisions.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use tfmerge::normalize::{Module, StateFileNormalizer, StateNormalizer};

/// List the canonical resource addresses of a state file
#[derive(Args, Debug)]
pub struct LsArgs {
    /// State file to list.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only list resources inside this module and its descendants
    /// (e.g. `module.network`).
    #[arg(short, long, value_name = "ADDRESS")]
    pub module: Option<String>,

    /// Show only the total count of resources.
    #[arg(long)]
    pub count: bool,
}

/// Execute the `ls` command.
pub fn execute(args: LsArgs) -> Result<()> {
    let tree = StateFileNormalizer
        .normalize(&args.file)
        .with_context(|| format!("Failed to list {}", args.file.display()))?;

    let addresses = listing(&tree, args.module.as_deref());
    if args.count {
        println!("{}", addresses.len());
    } else {
        for address in addresses {
            println!("{}", address);
        }
    }
    Ok(())
}

/// Addresses in walk order, optionally restricted to one module subtree.
pub fn listing(tree: &Module, module: Option<&str>) -> Vec<String> {
    match module {
        None => tree.addresses(),
        Some(prefix) => find(tree, prefix)
            .map(Module::addresses)
            .unwrap_or_default(),
    }
}

fn find<'a>(module: &'a Module, address: &str) -> Option<&'a Module> {
    if module.address == address {
        return Some(module);
    }
    module.children.iter().find_map(|child| find(child, address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfmerge::StateDocument;

    fn tree() -> Module {
        let json = r#"{"version":4,"resources":[
            {"module":"module.a.module.b","mode":"managed","type":"null_resource","name":"deep","provider":"provider[\"registry.terraform.io/hashicorp/null\"]","instances":[]},
            {"mode":"data","type":"null_data_source","name":"root","provider":"provider[\"registry.terraform.io/hashicorp/null\"]","instances":[]},
            {"module":"module.a","mode":"managed","type":"null_resource","name":"mid","provider":"provider[\"registry.terraform.io/hashicorp/null\"]","instances":[]}
        ]}"#;
        Module::from_document(&StateDocument::from_slice(json.as_bytes(), "test").unwrap())
    }

    #[test]
    fn test_listing_walk_order() {
        assert_eq!(
            listing(&tree(), None),
            vec![
                "data.null_data_source.root",
                "module.a.null_resource.mid",
                "module.a.module.b.null_resource.deep",
            ]
        );
    }

    #[test]
    fn test_listing_module_filter() {
        assert_eq!(
            listing(&tree(), Some("module.a.module.b")),
            vec!["module.a.module.b.null_resource.deep"]
        );
        assert!(listing(&tree(), Some("module.missing")).is_empty());
    }

    #[test]
    fn test_execute_missing_file() {
        let result = execute(LsArgs {
            file: PathBuf::from("/nonexistent/terraform.tfstate"),
            module: None,
            count: false,
        });
        assert!(result.unwrap_err().to_string().contains("Failed to list"));
    }
}
