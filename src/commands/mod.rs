//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `tfmerge` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `tfmerge` library.
//!
//! `merge` and `check` share [`merge::MergeInputArgs`], which layers CLI
//! flags, environment variables and the configuration file into a ready
//! `Merger`.

pub mod check;
pub mod completions;
pub mod ls;
pub mod merge;
pub mod tree;
