//! Test fixtures for layered configuration builds
//!
//! - `params/`: base and overlay parameter files, a remap file, and
//!   malformed documents
//! - `profiles/`: launch profiles referencing the parameter files

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ros2_launch_helpers::source::{ResolveEnv, SourceReader};
use ros2_launch_helpers::LayeredConfigBuilder;

/// Path to a parameter fixture
pub fn params_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/params")
        .join(name)
}

/// Parameter fixture path as a source spec
pub fn params_spec(name: &str) -> String {
    params_path(name).to_string_lossy().to_string()
}

/// Path to a launch profile fixture
pub fn profile_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/profiles")
        .join(name)
}

/// Builder that ignores the process environment
pub fn isolated_builder() -> LayeredConfigBuilder {
    LayeredConfigBuilder::with_reader(SourceReader::with_env(ResolveEnv {
        ament_prefixes: Some(Vec::new()),
        home: None,
    }))
}
