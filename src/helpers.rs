//! Launch-file entry points
//!
//! Thin wrappers for launch files that only need one piece of the
//! pipeline.

use crate::config::{ConfigError, LayeredConfigBuilder, OverlaySpec};
use crate::source::Source;
use crate::value::ParameterMapping;

pub use crate::options::{resolve_log_options, resolve_node_options, resolve_ros_arguments};
pub use crate::remap::resolve_remappings;

/// Merge a base parameter file with a comma-separated overlay list.
///
/// Overlay entries that are empty, equal to the base file or repeated are
/// skipped.
pub fn get_params(base_file: &str, overlay_list: &str) -> Result<ParameterMapping, ConfigError> {
    get_params_with(&LayeredConfigBuilder::new(), base_file, overlay_list)
}

/// [`get_params`] with an explicit builder (and so an explicit reader).
pub fn get_params_with(
    builder: &LayeredConfigBuilder,
    base_file: &str,
    overlay_list: &str,
) -> Result<ParameterMapping, ConfigError> {
    let overlays = OverlaySpec::from_list_str(base_file, overlay_list);
    let (parameters, _) = builder.load_parameters(&Source::path(base_file.trim()), &overlays, None)?;
    Ok(parameters)
}
