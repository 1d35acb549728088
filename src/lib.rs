//! # Terraform State Merge Library
//!
//! This library merges independently produced Terraform state files into a
//! single consolidated state. It is designed to be used by the `tfmerge`
//! command-line tool but can also be embedded in other tooling that needs to
//! combine state files programmatically.
//!
//! ## Quick Example
//!
//! ```no_run
//! use tfmerge::{merge, Resolution};
//!
//! let output = merge(b"", Resolution::Skip, &["network.tfstate", "compute.tfstate"])?;
//! for error in &output.errors {
//!     eprintln!("{}", error);
//! }
//! std::fs::write("merged.tfstate", &output.state)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **State documents (`state`)**: The on-disk format. Instance payloads,
//!   sensitive attribute paths, outputs and check results are carried as raw
//!   JSON and written back byte-for-byte.
//! - **Normalization (`normalize`)**: Turns a state file into a tree of
//!   modules and resources with canonical addresses. The in-process
//!   normalizer reads the file itself; the terraform normalizer runs
//!   `terraform show -json`.
//! - **Ledger (`ledger`)**: Records which canonical address has been claimed
//!   and where its record lives in the output.
//! - **Resolution (`resolve`)**: Decides what happens when two documents
//!   contribute the same address (`overwrite`, `merge`, `skip`, or keep the
//!   first).
//! - **Walker (`walker`)**: Visits a module tree depth-first and places each
//!   resource into the shared output.
//! - **Engine (`engine`)**: Ties the above together and assembles the final
//!   document.
//!
//! ## Execution Flow
//!
//! 1.  **Base seeding**: An optional base state is walked first.
//! 2.  **Reading**: Each input file is read and parsed; failures abort.
//! 3.  **Normalizing**: Each input is turned into a module tree; failures
//!     skip that input and are reported.
//! 4.  **Walking**: Each tree is walked into the shared output in input
//!     order, consulting the ledger and resolution strategy.
//! 5.  **Assembly**: Metadata, outputs and resources are combined and
//!     serialized.

pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod normalize;
pub mod output;
pub mod resolve;
pub mod state;
pub mod walker;

pub use engine::{merge, MergeOptions, MergeOutput, MergeSummary, Merger};
pub use error::{Error, Result};
pub use normalize::{Module, StateFileNormalizer, StateNormalizer};
pub use resolve::{Reconciler, Resolution};
pub use state::{StateDocument, StateResource};

#[cfg(test)]
mod engine_proptest;
