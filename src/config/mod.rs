//! Layered launch configuration
//!
//! Parameters are merged from:
//! 1. The base parameter file
//! 2. Overlay files (or literal mappings), in order
//!
//! Remappings and option strings are resolved alongside, and the builder
//! returns one `ResolvedConfiguration` with provenance for every file read.

mod defaults;
mod effective;
mod merge;
mod overlay;
mod strict;

pub use defaults::{
    default_log_options_str, default_node_options_str, log_options_desc, node_options_desc,
    remappings_desc, BuiltinDefaults, ITEM_SEPARATOR, KEY_VALUE_SEPARATOR,
};
pub use effective::{
    overrides_mapping, parse_mapping, select_node_parameters, BuildRequest, ConfigError,
    LayeredConfigBuilder, OptionInputs, OptionLayer, RemapInputs, ResolvedConfiguration,
    SourceOrigin, SourceRecord, ROS_PARAMETERS, WILDCARD_NODE,
};
pub use merge::{deep_merge, merge, merge_layers};
pub use overlay::OverlaySpec;
pub use strict::{merge_strict, MergeError, StrictMerge, StrictOptions};
