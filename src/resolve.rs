//! # Conflict Resolution
//!
//! When two documents contribute the same resource address, the walker asks
//! the active [`ResolutionStrategy`] what to do. The strategy is chosen once
//! per merge from the caller's [`Resolution`] policy and strict flag:
//!
//! | policy      | strategy              | verdict on collision                |
//! |-------------|-----------------------|-------------------------------------|
//! | `overwrite` | `Overwrite`           | `Replace`                           |
//! | `merge`     | `Reconcile`           | `Merged`, or `Unresolved` if no reconciler settles it |
//! | `skip`      | `Skip`                | `Skip`                              |
//! | unset       | `KeepFirst`           | `Keep`                              |
//! | unset + strict | `Strict`           | `Unresolved`                        |
//!
//! No reconciliation algorithm ships with the crate. Callers that need one
//! implement [`Reconciler`] and install it on the `Merger`.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::state::{PlacedResource, StateResource};

/// Caller-selected collision policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    /// No policy: the first record wins. Collisions are reported only in
    /// strict mode.
    #[default]
    Unset,
    /// The later record replaces the earlier one.
    Overwrite,
    /// Hand both records to a [`Reconciler`].
    Merge,
    /// The later record is discarded.
    Skip,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Unset => "default",
            Resolution::Overwrite => "overwrite",
            Resolution::Merge => "merge",
            Resolution::Skip => "skip",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "default" => Ok(Resolution::Unset),
            "overwrite" => Ok(Resolution::Overwrite),
            "merge" => Ok(Resolution::Merge),
            "skip" => Ok(Resolution::Skip),
            _ => Err(Error::InvalidResolution {
                value: s.to_string(),
            }),
        }
    }
}

/// Field-level reconciliation of two records that share an address.
///
/// Return `None` when the pair cannot be reconciled; the collision is then
/// reported as unresolved.
pub trait Reconciler {
    fn reconcile(&self, existing: &StateResource, incoming: &StateResource)
        -> Option<StateResource>;
}

/// Outcome of a single collision.
#[derive(Debug)]
pub enum Verdict {
    /// Keep the existing record; the incoming one is dropped without comment.
    Keep,
    /// Put the incoming record in place of the existing one.
    Replace,
    /// Drop the incoming record because the policy says so.
    Skip,
    /// Put this reconciled record in place of the existing one.
    Merged(StateResource),
    /// Drop the incoming record and report the collision.
    Unresolved,
}

/// Resolution strategy selected once at merge start.
pub enum ResolutionStrategy<'r> {
    Overwrite,
    Reconcile(Option<&'r dyn Reconciler>),
    Skip,
    KeepFirst,
    Strict,
}

impl fmt::Debug for ResolutionStrategy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionStrategy::Overwrite => f.write_str("Overwrite"),
            ResolutionStrategy::Reconcile(reconciler) => f
                .debug_tuple("Reconcile")
                .field(&reconciler.map(|_| "<reconciler>"))
                .finish(),
            ResolutionStrategy::Skip => f.write_str("Skip"),
            ResolutionStrategy::KeepFirst => f.write_str("KeepFirst"),
            ResolutionStrategy::Strict => f.write_str("Strict"),
        }
    }
}

impl<'r> ResolutionStrategy<'r> {
    pub fn select(
        resolution: Resolution,
        strict: bool,
        reconciler: Option<&'r dyn Reconciler>,
    ) -> Self {
        match resolution {
            Resolution::Overwrite => ResolutionStrategy::Overwrite,
            Resolution::Merge => ResolutionStrategy::Reconcile(reconciler),
            Resolution::Skip => ResolutionStrategy::Skip,
            Resolution::Unset if strict => ResolutionStrategy::Strict,
            Resolution::Unset => ResolutionStrategy::KeepFirst,
        }
    }

    /// Decide a collision between a placed record and a newcomer with the
    /// same address. Never touches the ledger.
    pub fn resolve(&self, existing: &PlacedResource, incoming: &PlacedResource) -> Verdict {
        match self {
            ResolutionStrategy::Overwrite => Verdict::Replace,
            ResolutionStrategy::Reconcile(Some(reconciler)) => {
                match reconciler.reconcile(&existing.record, &incoming.record) {
                    Some(record) => Verdict::Merged(record),
                    None => Verdict::Unresolved,
                }
            }
            ResolutionStrategy::Reconcile(None) => Verdict::Unresolved,
            ResolutionStrategy::Skip => Verdict::Skip,
            ResolutionStrategy::KeepFirst => Verdict::Keep,
            ResolutionStrategy::Strict => Verdict::Unresolved,
        }
    }
}
