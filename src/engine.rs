//! # Merge Engine
//!
//! Orchestrates a complete merge of state files into one document:
//!
//! 1.  **Base seeding**: a non-empty base state is parsed and its resources
//!     are placed first, so collisions against it go through the same policy
//!     as collisions between inputs.
//! 2.  **Per-document walk**: each input is read and parsed, normalized into a
//!     module tree, and walked into the shared output. A normalizer failure
//!     skips that document and is accumulated; an unreadable or unparseable
//!     file aborts the merge.
//! 3.  **Assembly**: version metadata comes from the first input, lineage from
//!     the base state (or the configured default), outputs and check results
//!     from the last input that merged successfully, and the serial is the
//!     base serial plus the number of merged inputs.
//!
//! Each call owns its ledger and output; nothing is shared between calls.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};

use crate::defaults::DEFAULT_LINEAGE;
use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::normalize::{Module, StateFileNormalizer, StateNormalizer};
use crate::resolve::{Reconciler, Resolution, ResolutionStrategy};
use crate::state::{PlacedResource, Source, StateDocument};
use crate::walker::{self, RawDocument, WalkContext, WalkStats};

/// Caller-selected merge behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub resolution: Resolution,
    /// Report collisions under the unset policy instead of keeping the first
    /// record silently.
    pub strict: bool,
    /// Lineage for the merged state when the base state has none.
    pub lineage: Option<String>,
}

/// Counters describing a finished merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub documents_merged: usize,
    pub documents_failed: usize,
    pub base_resources: usize,
    pub walk: WalkStats,
}

/// Result of a merge that was not aborted.
#[derive(Debug)]
pub struct MergeOutput {
    /// The merged state, serialized.
    pub state: Vec<u8>,
    /// The merged state as a document.
    pub document: StateDocument,
    /// Per-document and per-resource errors accumulated along the way.
    pub errors: Vec<Error>,
    pub summary: MergeSummary,
}

impl MergeOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Treat any accumulated error as failure.
    pub fn into_result(self) -> Result<Vec<u8>> {
        match Error::from_many(self.errors) {
            Some(error) => Err(error),
            None => Ok(self.state),
        }
    }
}

/// Merges state files using a configured normalizer and policy.
pub struct Merger {
    normalizer: Box<dyn StateNormalizer>,
    options: MergeOptions,
    reconciler: Option<Box<dyn Reconciler>>,
    cancellation: Option<Arc<AtomicBool>>,
}

impl Default for Merger {
    fn default() -> Self {
        Self::new(StateFileNormalizer)
    }
}

impl Merger {
    pub fn new(normalizer: impl StateNormalizer + 'static) -> Self {
        Self {
            normalizer: Box::new(normalizer),
            options: MergeOptions::default(),
            reconciler: None,
            cancellation: None,
        }
    }

    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    /// Install the reconciler used by the `merge` policy.
    pub fn with_reconciler(mut self, reconciler: impl Reconciler + 'static) -> Self {
        self.reconciler = Some(Box::new(reconciler));
        self
    }

    /// Stop before the next normalizer call once `flag` is set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge `paths` in order on top of `base_state` (empty for none).
    pub fn merge<P: AsRef<Path>>(&self, base_state: &[u8], paths: &[P]) -> Result<MergeOutput> {
        if paths.is_empty() {
            return Err(Error::NoInputDocuments);
        }

        let strategy = ResolutionStrategy::select(
            self.options.resolution,
            self.options.strict,
            self.reconciler.as_deref(),
        );
        let mut ledger = Ledger::new();
        let mut resources: Vec<PlacedResource> = Vec::new();
        let mut errors: Vec<Error> = Vec::new();
        let mut summary = MergeSummary::default();

        let mut merged = StateDocument {
            lineage: self
                .options
                .lineage
                .clone()
                .unwrap_or_else(|| DEFAULT_LINEAGE.to_string()),
            ..Default::default()
        };
        let mut base_serial = 0;

        if !base_state.trim_ascii().is_empty() {
            let base = StateDocument::from_slice(base_state, "base state")?;
            let tree = Module::from_document(&base);
            let raw = RawDocument::new(Source::Base, &base);
            let mut ctx = WalkContext {
                ledger: &mut ledger,
                resources: &mut resources,
                issues: &mut errors,
                strategy: &strategy,
            };
            let stats = walker::walk(&mut ctx, Some(&tree), &raw);
            summary.base_resources = stats.placed;
            summary.walk.absorb(stats);
            info!("base state: {} resources", stats.placed);

            base_serial = base.serial;
            if !base.lineage.is_empty() {
                merged.lineage = base.lineage;
            }
            merged.outputs = base.outputs;
            merged.check_results = base.check_results;
        }

        for (position, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            let bytes = std::fs::read(path).map_err(|source| Error::ReadState {
                path: path.to_path_buf(),
                source,
            })?;
            let document = StateDocument::from_slice(&bytes, &path.display().to_string())?;

            if position == 0 {
                merged.version = document.version;
                merged.terraform_version = document.terraform_version.clone();
            }

            self.check_cancelled(path)?;
            let tree = match self.normalizer.normalize(path) {
                Ok(tree) => tree,
                Err(error) => {
                    warn!("skipping {}: {}", path.display(), error);
                    summary.documents_failed += 1;
                    errors.push(error);
                    continue;
                }
            };

            let raw = RawDocument::new(Source::File(path.to_path_buf()), &document);
            let mut ctx = WalkContext {
                ledger: &mut ledger,
                resources: &mut resources,
                issues: &mut errors,
                strategy: &strategy,
            };
            let stats = walker::walk(&mut ctx, Some(&tree), &raw);
            info!(
                "{}: {} placed, {} replaced, {} dropped, {} conflicts",
                path.display(),
                stats.placed,
                stats.replaced,
                stats.dropped,
                stats.conflicts
            );
            summary.walk.absorb(stats);
            summary.documents_merged += 1;

            merged.outputs = document.outputs;
            merged.check_results = document.check_results;
        }

        merged.serial = base_serial + summary.documents_merged as u64;
        merged.resources = resources.into_iter().map(|placed| placed.record).collect();

        let state = merged.to_json_bytes()?;
        Ok(MergeOutput {
            state,
            document: merged,
            errors,
            summary,
        })
    }

    fn check_cancelled(&self, path: &Path) -> Result<()> {
        match &self.cancellation {
            Some(flag) if flag.load(Ordering::SeqCst) => Err(Error::Cancelled {
                path: path.to_path_buf(),
            }),
            _ => Ok(()),
        }
    }
}

/// Merge state files with the in-process normalizer.
///
/// `base_state` may be empty. Accumulated errors are returned in
/// [`MergeOutput::errors`]; see [`MergeOutput::into_result`].
pub fn merge<P: AsRef<Path>>(
    base_state: &[u8],
    resolution: Resolution,
    paths: &[P],
) -> Result<MergeOutput> {
    Merger::default()
        .with_options(MergeOptions {
            resolution,
            ..Default::default()
        })
        .merge(base_state, paths)
}
