//! Shared test utilities for integration and E2E tests.
//!
//! This module provides state-file builders and a temporary-directory fixture
//! to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_state("a.tfstate", &state(&[resource("", "null_resource", "a")]));
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{module_resource, resource, state, state_with, TestFixture};
}

/// A managed `null_resource` block in the root module or `module`.
#[allow(dead_code)]
pub fn resource(module: &str, resource_type: &str, name: &str) -> String {
    module_resource(module, resource_type, name, &format!(r#"{{"id":"{}"}}"#, name))
}

/// A managed resource block with the given instance attributes.
#[allow(dead_code)]
pub fn module_resource(module: &str, resource_type: &str, name: &str, attributes: &str) -> String {
    format!(
        r#"{{"module":"{}","mode":"managed","type":"{}","name":"{}","provider":"provider[\"registry.terraform.io/hashicorp/null\"]","instances":[{{"schema_version":0,"attributes":{}}}]}}"#,
        module, resource_type, name, attributes
    )
}

/// A version 4 state document holding `resources`.
#[allow(dead_code)]
pub fn state(resources: &[String]) -> String {
    state_with("1.5.7", 1, "input-lineage", resources)
}

/// A version 4 state document with explicit metadata.
#[allow(dead_code)]
pub fn state_with(terraform_version: &str, serial: u64, lineage: &str, resources: &[String]) -> String {
    format!(
        r#"{{"version":4,"terraform_version":"{}","serial":{},"lineage":"{}","outputs":{{}},"resources":[{}]}}"#,
        terraform_version,
        serial,
        lineage,
        resources.join(",")
    )
}

/// A test fixture that provides a temporary directory with state files.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a state file with the given content.
    pub fn with_state(self, name: &str, content: &str) -> Self {
        self.temp_dir
            .child(name)
            .write_str(content)
            .expect("Failed to write state file");
        self
    }

    /// Add a `.tfmerge.yaml` configuration file.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child(".tfmerge.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a file inside the fixture.
    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    ///
    /// `TFMERGE_*` variables from the calling environment are cleared and
    /// the user-level config directory points into the fixture.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("tfmerge");
        cmd.current_dir(self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env_remove("TFMERGE_RESOLUTION")
            .env_remove("TFMERGE_STRICT")
            .env_remove("TFMERGE_CONFIG")
            .env_remove("TFMERGE_TERRAFORM")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
