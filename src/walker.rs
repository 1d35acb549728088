//! # Module Tree Walker
//!
//! Visits every resource of one document's module tree, parent module before
//! children, and places it into the shared merge output.
//!
//! The normalized tree says *which* resources exist; the raw state document
//! supplies their instance payloads. The two are correlated by
//! `(module, mode, type, name)` through a [`RawDocument`] index, and the raw
//! payloads are moved into the output without being parsed.

use std::collections::HashMap;

use log::{debug, warn};

use crate::error::Error;
use crate::ledger::Ledger;
use crate::normalize::{Module, TreeResource};
use crate::resolve::{ResolutionStrategy, Verdict};
use crate::state::{
    provider_descriptor, PlacedResource, ResourceKey, Source, StateDocument, StateResource,
};

/// A parsed state document indexed for instance lookup.
#[derive(Debug)]
pub struct RawDocument<'a> {
    source: Source,
    document: &'a StateDocument,
    index: HashMap<ResourceKey, usize>,
}

impl<'a> RawDocument<'a> {
    pub fn new(source: Source, document: &'a StateDocument) -> Self {
        let mut index = HashMap::with_capacity(document.resources.len());
        for (position, resource) in document.resources.iter().enumerate() {
            index.entry(resource.key()).or_insert(position);
        }
        Self {
            source,
            document,
            index,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// The raw resource block matching `key`.
    pub fn block(&self, key: &ResourceKey) -> Option<&'a StateResource> {
        self.index
            .get(key)
            .map(|&position| &self.document.resources[position])
    }
}

/// Counters for one or more walks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Records placed at a newly claimed address.
    pub placed: usize,
    /// Records that replaced an earlier record (overwrite or reconcile).
    pub replaced: usize,
    /// Incoming records discarded by keep/skip verdicts.
    pub dropped: usize,
    /// Collisions reported as unresolved.
    pub conflicts: usize,
}

impl WalkStats {
    pub fn absorb(&mut self, other: WalkStats) {
        self.placed += other.placed;
        self.replaced += other.replaced;
        self.dropped += other.dropped;
        self.conflicts += other.conflicts;
    }
}

/// Mutable merge state shared by every walk of a single merge call.
pub struct WalkContext<'m, 'r> {
    pub ledger: &'m mut Ledger,
    pub resources: &'m mut Vec<PlacedResource>,
    pub issues: &'m mut Vec<Error>,
    pub strategy: &'m ResolutionStrategy<'r>,
}

/// Walk `module` and its descendants, placing each resource.
///
/// A `None` module is a no-op.
pub fn walk(
    ctx: &mut WalkContext<'_, '_>,
    module: Option<&Module>,
    raw: &RawDocument<'_>,
) -> WalkStats {
    let mut stats = WalkStats::default();
    let Some(module) = module else {
        return stats;
    };

    for resource in &module.resources {
        place(ctx, module, resource, raw, &mut stats);
    }

    for child in &module.children {
        stats.absorb(walk(ctx, Some(child), raw));
    }

    stats
}

fn place(
    ctx: &mut WalkContext<'_, '_>,
    module: &Module,
    resource: &TreeResource,
    raw: &RawDocument<'_>,
    stats: &mut WalkStats,
) {
    let address = resource.canonical_address();
    let key = ResourceKey::new(
        &module.address,
        &resource.mode,
        &resource.resource_type,
        &resource.name,
    );
    let block = raw.block(&key);
    if block.is_none() {
        warn!(
            "{}: no resource block found for {}, placing it without instances",
            raw.source(),
            address
        );
    }

    let incoming = PlacedResource {
        address: address.clone(),
        source: raw.source().clone(),
        record: build_record(module, resource, block),
    };

    let Some(position) = ctx.ledger.position(&address) else {
        let position = ctx.resources.len();
        ctx.resources.push(incoming);
        ctx.ledger.claim(address, position);
        stats.placed += 1;
        return;
    };

    let existing = &ctx.resources[position];
    match ctx.strategy.resolve(existing, &incoming) {
        Verdict::Keep => {
            debug!(
                "{}: keeping {} from {}",
                incoming.source, address, existing.source
            );
            stats.dropped += 1;
        }
        Verdict::Skip => {
            debug!("{}: skipping duplicate {}", incoming.source, address);
            stats.dropped += 1;
        }
        Verdict::Replace => {
            debug!(
                "{}: overwriting {} from {}",
                incoming.source, address, existing.source
            );
            ctx.resources[position] = incoming;
            stats.replaced += 1;
        }
        Verdict::Merged(record) => {
            debug!("{}: reconciled {}", incoming.source, address);
            // The reconciled record is attributed to the latest contributor.
            ctx.resources[position] = PlacedResource { record, ..incoming };
            stats.replaced += 1;
        }
        Verdict::Unresolved => {
            ctx.issues.push(Error::ResourceConflict {
                address,
                existing: existing.source.to_string(),
                incoming: incoming.source.to_string(),
            });
            stats.conflicts += 1;
        }
    }
}

fn build_record(
    module: &Module,
    resource: &TreeResource,
    block: Option<&StateResource>,
) -> StateResource {
    let dependencies = resource
        .depends_on
        .clone()
        .or_else(|| block.map(|b| b.dependencies.clone()))
        .unwrap_or_default();

    StateResource {
        module: module.address.clone(),
        mode: resource.mode.clone(),
        resource_type: resource.resource_type.clone(),
        name: resource.name.clone(),
        provider: provider_descriptor(&resource.provider_name),
        schema_version: resource.schema_version,
        dependencies,
        sensitive_attributes: block.and_then(|b| b.sensitive_attributes.clone()),
        instances: block.map(|b| b.instances.clone()).unwrap_or_default(),
    }
}
