//! # Merge Command Implementation
//!
//! This module implements the `merge` subcommand, which combines state files
//! into one consolidated state and writes it to stdout or a file.
//!
//! ## Settings
//!
//! Every merge setting is resolved from, highest precedence first:
//!
//! 1. Command-line flags
//! 2. Environment variables (`TFMERGE_RESOLUTION`, `TFMERGE_STRICT`,
//!    `TFMERGE_CONFIG`, `TFMERGE_TERRAFORM`)
//! 3. The configuration file (`--config`, else `.tfmerge.yaml`, else the
//!    user-level file)
//! 4. Built-in defaults
//!
//! ## Failures
//!
//! Unreadable or malformed state files abort without output. Documents the
//! normalizer rejects and unresolved resource conflicts are reported on
//! stderr; by default they also fail the command and suppress the output,
//! unless `--allow-partial` is given.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use log::debug;

use tfmerge::config::{self, Config, NormalizerKind};
use tfmerge::defaults::{discover_config, DEFAULT_TERRAFORM_BINARY};
use tfmerge::normalize::terraform::TerraformNormalizer;
use tfmerge::normalize::{StateFileNormalizer, StateNormalizer};
use tfmerge::output::{OutputConfig, Status};
use tfmerge::{MergeOptions, MergeOutput, Merger, Resolution};

/// Inputs and policy shared by `merge` and `check`.
#[derive(Args, Debug, Clone)]
pub struct MergeInputArgs {
    /// State files to merge, in priority order.
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Existing state to merge into. Its lineage and serial are carried over.
    #[arg(short, long, value_name = "FILE")]
    pub base: Option<PathBuf>,

    /// How to handle a resource address contributed by more than one file
    /// (overwrite, merge, skip, default).
    #[arg(short, long, value_name = "POLICY", env = "TFMERGE_RESOLUTION")]
    pub resolution: Option<Resolution>,

    /// Report duplicate addresses as errors under the default policy.
    /// `--strict=false` turns off `strict: true` from the config file.
    #[arg(
        long,
        env = "TFMERGE_STRICT",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub strict: Option<bool>,

    /// Lineage for the merged state when no base state supplies one.
    #[arg(long, value_name = "LINEAGE")]
    pub lineage: Option<String>,

    /// How state files are read into module trees (state, terraform).
    #[arg(long, value_name = "KIND")]
    pub normalizer: Option<NormalizerKind>,

    /// Terraform executable used by the terraform normalizer.
    #[arg(long, value_name = "BIN", env = "TFMERGE_TERRAFORM")]
    pub terraform: Option<PathBuf>,

    /// Path to a tfmerge configuration file.
    #[arg(short, long, value_name = "FILE", env = "TFMERGE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Merge settings after layering flags, environment and config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSettings {
    pub options: MergeOptions,
    pub normalizer: NormalizerKind,
    pub terraform_binary: PathBuf,
    pub terraform_working_dir: Option<PathBuf>,
}

impl MergeInputArgs {
    /// Load the explicit config file, or discover one from `working_dir`.
    pub fn load_config(&self, working_dir: &Path) -> Result<Config> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => match discover_config(working_dir) {
                Some(path) => path,
                None => return Ok(Config::default()),
            },
        };
        debug!("loading configuration from {}", path.display());
        config::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    /// Layer these arguments over `config`.
    pub fn settings(&self, config: &Config) -> Result<MergeSettings> {
        let resolution = match self.resolution {
            Some(resolution) => resolution,
            None => config.resolution()?,
        };
        Ok(MergeSettings {
            options: MergeOptions {
                resolution,
                strict: self.strict.or(config.strict).unwrap_or(false),
                lineage: self.lineage.clone().or_else(|| config.lineage.clone()),
            },
            normalizer: self
                .normalizer
                .or(config.normalizer)
                .unwrap_or_default(),
            terraform_binary: self
                .terraform
                .clone()
                .or_else(|| config.terraform.binary.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TERRAFORM_BINARY)),
            terraform_working_dir: config.terraform.working_dir.clone(),
        })
    }

    /// Contents of the base state file, empty when none was given.
    pub fn read_base(&self) -> Result<Vec<u8>> {
        match &self.base {
            Some(path) => std::fs::read(path)
                .with_context(|| format!("Failed to read base state {}", path.display())),
            None => Ok(Vec::new()),
        }
    }

    /// Build the merger and run it over the input files.
    pub fn run(&self) -> Result<MergeOutput> {
        let working_dir =
            std::env::current_dir().context("Failed to determine the working directory")?;
        let config = self.load_config(&working_dir)?;
        let settings = self.settings(&config)?;
        debug!("merge settings: {:?}", settings);

        let base = self.read_base()?;
        let output = build_merger(settings).merge(&base, &self.files)?;
        Ok(output)
    }
}

fn build_merger(settings: MergeSettings) -> Merger {
    let normalizer: Box<dyn StateNormalizer> = match settings.normalizer {
        NormalizerKind::State => Box::new(StateFileNormalizer),
        NormalizerKind::Terraform => {
            let mut terraform = TerraformNormalizer::new(settings.terraform_binary);
            if let Some(dir) = settings.terraform_working_dir {
                terraform = terraform.with_working_dir(dir);
            }
            Box::new(terraform)
        }
    };
    Merger::new(normalizer).with_options(settings.options)
}

/// Merge state files and write the consolidated state
#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub input: MergeInputArgs,

    /// Write the merged state to FILE instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the merged state even when some files or resources failed.
    #[arg(long)]
    pub allow_partial: bool,
}

/// Execute the `merge` command.
pub fn execute(args: MergeArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let output = args.input.run()?;

    for error in &output.errors {
        eprintln!("{}", out.status(Status::Err, error));
    }

    if output.has_errors() && !args.allow_partial {
        anyhow::bail!(
            "{} error(s) during merge; no state written (use --allow-partial to write it anyway)",
            output.errors.len()
        );
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &output.state)
                .with_context(|| format!("Failed to write merged state to {}", path.display()))?;
            eprintln!(
                "{}",
                out.status(
                    Status::Ok,
                    format!(
                        "Merged {} state file(s), {} resources -> {}",
                        output.summary.documents_merged,
                        output.document.resources.len(),
                        out.dim(path.display())
                    )
                )
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&output.state)
                .context("Failed to write merged state to stdout")?;
            stdout.flush()?;
        }
    }

    if output.has_errors() {
        eprintln!(
            "{}",
            out.status(
                Status::Warn,
                format!("Partial merge: {} error(s) ignored", output.errors.len())
            )
        );
    }

    Ok(())
}
