//! ROS 2 Launch Helpers - layered launch configuration
//!
//! Collects launch-time configuration (parameter files, overlays,
//! remappings, node options, ROS arguments, log options) from several
//! sources and resolves it into one precedence-ordered configuration.

pub mod config;
pub mod helpers;
pub mod names;
pub mod options;
pub mod remap;
pub mod source;
pub mod value;

pub use config::{
    BuildRequest, ConfigError, LayeredConfigBuilder, OverlaySpec, ResolvedConfiguration,
};
pub use helpers::get_params;
pub use launch_args::{OptionParseError, OptionToken, RemapEntry, RemapParseError};
pub use options::{LogOptions, NodeOptions, OptionList};
pub use remap::RemapSet;
pub use source::{Source, SourceError, SourceReader};
pub use value::{ParamValue, ParameterMapping};
