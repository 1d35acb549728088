//! # Check Command Implementation
//!
//! This module implements the `check` subcommand, which runs a full merge
//! without writing anything and reports what would go wrong: documents the
//! normalizer rejects and resource addresses the active policy cannot settle.
//!
//! Use it with `--strict` to find every address contributed by more than one
//! file before choosing a resolution policy.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;

use tfmerge::output::{OutputConfig, Status};
use tfmerge::MergeOutput;

use super::merge::MergeInputArgs;

/// Merge state files without writing, reporting conflicts and failures
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: MergeInputArgs,
}

/// Execute the `check` command.
pub fn execute(args: CheckArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let output = args.input.run()?;

    for line in report(&out, &output) {
        println!("{}", line);
    }

    if output.has_errors() {
        anyhow::bail!("Check failed with {} error(s)", output.errors.len());
    }
    Ok(())
}

fn report(out: &OutputConfig, output: &MergeOutput) -> Vec<String> {
    let summary = &output.summary;
    let mut lines = vec![out.status(
        Status::Info,
        format!(
            "{} of {} state file(s) merged, {} resources",
            summary.documents_merged,
            summary.documents_merged + summary.documents_failed,
            output.document.resources.len()
        ),
    )];

    if summary.base_resources > 0 {
        lines.push(format!("   Base state resources: {}", summary.base_resources));
    }
    if summary.walk.replaced > 0 {
        lines.push(format!("   Replaced: {}", summary.walk.replaced));
    }
    if summary.walk.dropped > 0 {
        lines.push(format!("   Duplicates dropped: {}", summary.walk.dropped));
    }

    for error in &output.errors {
        lines.push(out.status(Status::Err, error));
    }

    if output.errors.is_empty() {
        lines.push(out.status(Status::Ok, "No conflicts or failures"));
    }
    lines
}
