//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which displays the module
//! hierarchy of a state file with the resources each module owns.
//!
//! ## Functionality
//!
//! - **Module Visualization**: Nested modules appear under their parent
//! - **Depth Control**: Supports `--depth` flag to limit tree depth
//! - **Summary Mode**: `--modules-only` hides individual resources
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::{Context, Result};
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::path::PathBuf;

use tfmerge::normalize::{Module, StateFileNormalizer, StateNormalizer};

/// Display the module hierarchy of a state file
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// State file to display.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Maximum depth to display in the tree.
    ///
    /// Use 0 to show only the root module, 1 to show its direct children,
    /// and so on.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,

    /// Show modules with resource counts instead of individual resources.
    #[arg(long)]
    pub modules_only: bool,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs) -> Result<()> {
    let module = StateFileNormalizer
        .normalize(&args.file)
        .with_context(|| format!("Failed to read module tree of {}", args.file.display()))?;

    let root = build_tree_node(
        &module,
        args.depth.unwrap_or(usize::MAX),
        0,
        args.modules_only,
    );
    print_tree(&root).context("Failed to display tree")?;
    Ok(())
}

fn build_tree_node(
    module: &Module,
    max_depth: usize,
    current_depth: usize,
    modules_only: bool,
) -> TreeNode {
    let name = if module.address.is_empty() {
        "root"
    } else {
        module.address.as_str()
    };
    let label = format!("{} ({} resources)", name, module.resource_count());

    let mut children = Vec::new();
    if !modules_only {
        children.extend(module.resources.iter().map(|resource| TreeNode {
            label: resource.canonical_address(),
            children: vec![],
        }));
    }
    if current_depth < max_depth {
        children.extend(module.children.iter().map(|child| {
            build_tree_node(child, max_depth, current_depth + 1, modules_only)
        }));
    }

    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}
