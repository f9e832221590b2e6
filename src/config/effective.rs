//! Resolved launch configuration with full provenance
//!
//! `LayeredConfigBuilder` runs the fixed pipeline:
//! 1. Read the base parameter source
//! 2. Read each overlay, in order
//! 3. Merge parameters (deep, or strict when requested)
//! 4. Resolve remappings (defaults < YAML file < CLI < launch argument)
//! 5. Resolve node options, ROS arguments and log options
//!
//! Any failure aborts the build; nothing partial is returned.

use std::fs;
use std::path::{Path, PathBuf};

use launch_args::{OptionParseError, RemapEntry, RemapParseError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::merge::{deep_merge, merge_layers};
use super::overlay::OverlaySpec;
use super::strict::{merge_strict, MergeError, StrictOptions};
use crate::names::{is_valid_name, NameError};
use crate::options::{
    resolve_log_options, resolve_node_options, resolve_ros_arguments, LogOptions, NodeOptions,
    OptionList,
};
use crate::remap::{resolve_remappings, RemapSet};
use crate::source::{expect_mapping, Source, SourceError, SourceReader};
use crate::value::{lookup, JsonMapping, ParamValue, ParameterMapping};

/// Section key that applies to every node.
pub const WILDCARD_NODE: &str = "/**";

/// Key holding a node section's parameters.
pub const ROS_PARAMETERS: &str = "ros__parameters";

/// Remapping inputs, lowest precedence first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemapInputs {
    /// Rules supplied by the launch file
    pub defaults: Vec<RemapEntry>,

    /// YAML (or TOML) file holding remapping rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Comma-delimited CLI string
    pub cli: String,

    /// Comma-delimited launch argument string
    pub launch_arg: String,
}

/// One option family: a default string and an override string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionLayer {
    /// `None` uses the built-in defaults for this family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<String>,
    pub overrides: String,
}

impl OptionLayer {
    pub fn overrides(overrides: impl Into<String>) -> Self {
        Self {
            defaults: None,
            overrides: overrides.into(),
        }
    }
}

/// Option inputs for the three option families.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionInputs {
    pub node_options: OptionLayer,
    pub ros_arguments: OptionLayer,
    pub log_options: OptionLayer,
}

/// Everything one build needs. Deserializes from a launch profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildRequest {
    pub base: Source,

    #[serde(default)]
    pub overlays: OverlaySpec,

    #[serde(default)]
    pub remaps: RemapInputs,

    #[serde(default)]
    pub options: OptionInputs,

    /// Node whose parameters are selected after the merge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,

    /// Merge overlays type-checked against the base
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<StrictOptions>,
}

impl BuildRequest {
    pub fn new(base: impl Into<Source>) -> Self {
        Self {
            base: base.into(),
            overlays: OverlaySpec::default(),
            remaps: RemapInputs::default(),
            options: OptionInputs::default(),
            node_name: None,
            strict: None,
        }
    }

    /// Load a launch profile (`.toml`, otherwise YAML).
    ///
    /// Relative file paths in the profile are taken relative to the
    /// profile's directory.
    pub fn from_profile(path: &Path) -> Result<Self, ConfigError> {
        let profile_error = |reason: String| ConfigError::Profile {
            path: path.to_path_buf(),
            reason,
        };

        let contents = fs::read_to_string(path).map_err(|e| profile_error(e.to_string()))?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let mut request: Self = if is_toml {
            toml::from_str(&contents).map_err(|e| profile_error(e.to_string()))?
        } else {
            serde_yaml::from_str(&contents).map_err(|e| profile_error(e.to_string()))?
        };

        if let Some(dir) = path.parent() {
            request.anchor_paths(dir);
        }

        debug!(profile = %path.display(), "loaded launch profile");
        Ok(request)
    }

    fn anchor_paths(&mut self, dir: &Path) {
        if let Source::Path(spec) = &mut self.base {
            *spec = anchor(spec, dir);
        }
        let overlays = self
            .overlays
            .iter()
            .map(|source| match source {
                Source::Path(spec) => Source::Path(anchor(spec, dir)),
                literal => literal.clone(),
            })
            .collect();
        self.overlays = OverlaySpec::new(overlays);
        if let Some(file) = &mut self.remaps.file {
            *file = anchor(file, dir);
        }
    }

    pub fn with_overlay(mut self, source: impl Into<Source>) -> Self {
        let mut sources = self.overlays.sources().to_vec();
        sources.push(source.into());
        self.overlays = OverlaySpec::new(sources);
        self
    }

    pub fn with_overlays(mut self, overlays: OverlaySpec) -> Self {
        self.overlays = overlays;
        self
    }

    pub fn with_remap_defaults(mut self, defaults: Vec<RemapEntry>) -> Self {
        self.remaps.defaults = defaults;
        self
    }

    pub fn with_remap_file(mut self, file: impl Into<String>) -> Self {
        self.remaps.file = Some(file.into());
        self
    }

    pub fn with_cli_remaps(mut self, cli: impl Into<String>) -> Self {
        self.remaps.cli = cli.into();
        self
    }

    pub fn with_launch_arg_remaps(mut self, launch_arg: impl Into<String>) -> Self {
        self.remaps.launch_arg = launch_arg.into();
        self
    }

    pub fn with_node_options(mut self, overrides: impl Into<String>) -> Self {
        self.options.node_options.overrides = overrides.into();
        self
    }

    pub fn with_ros_arguments(mut self, overrides: impl Into<String>) -> Self {
        self.options.ros_arguments.overrides = overrides.into();
        self
    }

    pub fn with_log_options(mut self, overrides: impl Into<String>) -> Self {
        self.options.log_options.overrides = overrides.into();
        self
    }

    pub fn with_node_name(mut self, node: impl Into<String>) -> Self {
        self.node_name = Some(node.into());
        self
    }

    pub fn with_strict(mut self, options: StrictOptions) -> Self {
        self.strict = Some(options);
        self
    }
}

/// Plain relative paths join onto `dir`; URIs, `~` paths and absolute paths
/// are left alone.
fn anchor(spec: &str, dir: &Path) -> String {
    let trimmed = spec.trim();
    if trimmed.is_empty()
        || trimmed.contains("://")
        || trimmed.starts_with('~')
        || Path::new(trimmed).is_absolute()
    {
        return spec.to_string();
    }
    dir.join(trimmed).to_string_lossy().to_string()
}

/// Role of a contributing source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceOrigin {
    Base,
    Overlay,
    Remappings,
}

/// A contributing source with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRecord {
    pub origin: SourceOrigin,

    /// Resolved file path (None for literal mappings)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for literal mappings)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Output of one build. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfiguration {
    parameters: ParameterMapping,
    remappings: RemapSet,
    node_options: OptionList,
    ros_arguments: OptionList,
    log_options: OptionList,
    typed_node_options: NodeOptions,
    typed_log_options: LogOptions,
    node_name: Option<String>,
    node_params: Option<ParameterMapping>,
    sources: Vec<SourceRecord>,
}

/// Serialized form: option lists as argument strings, remappings as
/// ordered pairs.
#[derive(Serialize)]
struct ResolvedView<'a> {
    parameters: JsonMapping<'a>,
    remappings: Vec<(String, String)>,
    node_options: Vec<String>,
    ros_arguments: Vec<String>,
    log_options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_parameters: Option<JsonMapping<'a>>,
    sources: Vec<SourceRecord>,
}

impl ResolvedConfiguration {
    pub fn parameters(&self) -> &ParameterMapping {
        &self.parameters
    }

    /// Remapping rules as `(from, to)` pairs
    pub fn remappings(&self) -> Vec<(String, String)> {
        self.remappings.to_pairs()
    }

    pub fn remap_set(&self) -> &RemapSet {
        &self.remappings
    }

    pub fn node_options(&self) -> &OptionList {
        &self.node_options
    }

    pub fn ros_arguments(&self) -> &OptionList {
        &self.ros_arguments
    }

    pub fn log_options(&self) -> &OptionList {
        &self.log_options
    }

    pub fn typed_node_options(&self) -> &NodeOptions {
        &self.typed_node_options
    }

    pub fn typed_log_options(&self) -> &LogOptions {
        &self.typed_log_options
    }

    /// Log options as node argv words
    pub fn log_ros_args(&self) -> Vec<String> {
        self.typed_log_options.to_ros_args()
    }

    pub fn node_name(&self) -> Option<&str> {
        self.node_name.as_deref()
    }

    /// Parameters selected for the requested node, if one was named
    pub fn node_params(&self) -> Option<&ParameterMapping> {
        self.node_params.as_ref()
    }

    /// Parameters that apply to `node` (see [`select_node_parameters`])
    pub fn node_parameters(&self, node: &str) -> ParameterMapping {
        select_node_parameters(&self.parameters, node)
    }

    /// Contributing sources in precedence order
    pub fn sources(&self) -> &[SourceRecord] {
        &self.sources
    }

    /// Get a parameter by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&ParamValue> {
        lookup(&self.parameters, path)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(ParamValue::as_str)
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(ParamValue::as_i64)
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(ParamValue::as_f64)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(ParamValue::as_bool)
    }

    fn view(&self, with_paths: bool) -> ResolvedView<'_> {
        let sources = self
            .sources
            .iter()
            .map(|source| SourceRecord {
                path: source.path.clone().filter(|_| with_paths),
                ..source.clone()
            })
            .collect();

        ResolvedView {
            parameters: JsonMapping(&self.parameters),
            remappings: self.remappings.to_pairs(),
            node_options: self.node_options.to_args(),
            ros_arguments: self.ros_arguments.to_args(),
            log_options: self.log_options.to_args(),
            node_name: self.node_name.as_deref(),
            node_parameters: self.node_params.as_ref().map(JsonMapping),
            sources,
        }
    }

    /// Fingerprint of the configuration
    ///
    /// digest = SHA-256 hex digest of JCS (RFC 8785) of the JSON form, with
    /// source paths left out so the same files fingerprint the same from any
    /// checkout. Sources still count through their content digests.
    pub fn digest(&self) -> Result<String, ConfigError> {
        let jcs_bytes = serde_json_canonicalizer::to_vec(&self.view(false))
            .map_err(|e| ConfigError::Digest(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Serialize to JSON (pretty printed)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.view(true))
    }

    /// Multi-line summary for terminals
    pub fn to_human(&self) -> String {
        let mut out = String::new();

        out.push_str("sources:\n");
        for source in &self.sources {
            let origin = match source.origin {
                SourceOrigin::Base => "base",
                SourceOrigin::Overlay => "overlay",
                SourceOrigin::Remappings => "remappings",
            };
            out.push_str(&format!(
                "  {:<10} {}\n",
                origin,
                source.path.as_deref().unwrap_or("<literal>")
            ));
        }

        out.push_str(&format!("parameters: {} top-level keys\n", self.parameters.len()));
        if let Some(node) = &self.node_name {
            let count = self.node_params.as_ref().map_or(0, |p| p.len());
            out.push_str(&format!("node '{}': {} parameters\n", node, count));
        }

        out.push_str("remappings:\n");
        for (from, to) in self.remappings.iter() {
            out.push_str(&format!("  {} -> {}\n", from, to));
        }

        out.push_str(&format!("node options: {}\n", self.node_options.join(",")));
        out.push_str(&format!("ros arguments: {}\n", self.ros_arguments));
        out.push_str(&format!("log options: {}\n", self.log_options.join(",")));
        out
    }
}

/// Parameters that apply to one node.
///
/// Merges the `ros__parameters` of the `/**` section, then those of the
/// node's own section (keyed with or without a leading `/`). Other sections
/// are ignored.
pub fn select_node_parameters(parameters: &ParameterMapping, node: &str) -> ParameterMapping {
    let node = node.trim().trim_start_matches('/');
    let slashed = format!("/{}", node);

    let sections = [WILDCARD_NODE, node, slashed.as_str()];
    merge_layers(sections.iter().filter_map(|key| {
        parameters
            .get(*key)
            .and_then(ParamValue::as_table)
            .and_then(|section| section.get(ROS_PARAMETERS))
            .and_then(ParamValue::as_table)
            .cloned()
    }))
}

/// Runs the build pipeline. Holds no state between builds.
#[derive(Debug, Clone, Default)]
pub struct LayeredConfigBuilder {
    reader: SourceReader,
}

impl LayeredConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reader(reader: SourceReader) -> Self {
        Self { reader }
    }

    /// Read and merge the base and overlay sources.
    pub fn load_parameters(
        &self,
        base: &Source,
        overlays: &OverlaySpec,
        strict: Option<StrictOptions>,
    ) -> Result<(ParameterMapping, Vec<SourceRecord>), ConfigError> {
        let mut layers = Vec::with_capacity(overlays.len() + 1);
        let mut sources = Vec::with_capacity(overlays.len() + 1);

        let loaded = self.reader.read(base)?;
        layers.push(loaded.mapping);
        sources.push(SourceRecord {
            origin: SourceOrigin::Base,
            path: loaded.path.map(|p| p.to_string_lossy().to_string()),
            digest: loaded.digest,
        });

        for overlay in overlays.iter() {
            let loaded = self.reader.read(overlay)?;
            debug!(overlay = %overlay, keys = loaded.mapping.len(), "loaded overlay");
            layers.push(loaded.mapping);
            sources.push(SourceRecord {
                origin: SourceOrigin::Overlay,
                path: loaded.path.map(|p| p.to_string_lossy().to_string()),
                digest: loaded.digest,
            });
        }

        let merged = match strict {
            None => merge_layers(layers),
            Some(options) => {
                let mut layers = layers.into_iter();
                let mut merged = layers.next().unwrap_or_default();
                for overlay in layers {
                    let result = merge_strict(&merged, &overlay, options)?;
                    for key in &result.ignored {
                        warn!(key = %key, "overlay key not applied in strict merge");
                    }
                    merged = result.merged;
                }
                merged
            }
        };

        Ok((merged, sources))
    }

    /// Build a resolved configuration from a request.
    pub fn build(&self, request: &BuildRequest) -> Result<ResolvedConfiguration, ConfigError> {
        let (parameters, mut sources) =
            self.load_parameters(&request.base, &request.overlays, request.strict)?;

        // Remappings
        let remap_doc = match &request.remaps.file {
            Some(file) => {
                let doc = self.reader.read_document(file)?;
                sources.push(SourceRecord {
                    origin: SourceOrigin::Remappings,
                    path: Some(doc.path.to_string_lossy().to_string()),
                    digest: Some(doc.digest.clone()),
                });
                Some(doc)
            }
            None => None,
        };
        let remap_origin = remap_doc
            .as_ref()
            .map(|doc| doc.path.to_string_lossy().to_string())
            .unwrap_or_default();
        let remappings = resolve_remappings(
            &request.remaps.defaults,
            remap_doc.as_ref().map(|doc| (&doc.value, remap_origin.as_str())),
            &request.remaps.cli,
            &request.remaps.launch_arg,
        )?;

        // Options
        let inputs = &request.options;
        let node_options = resolve_node_options(
            inputs.node_options.defaults.as_deref(),
            &inputs.node_options.overrides,
        )?;
        let ros_arguments = resolve_ros_arguments(
            inputs.ros_arguments.defaults.as_deref().unwrap_or_default(),
            &inputs.ros_arguments.overrides,
        )?;
        let log_options = resolve_log_options(
            inputs.log_options.defaults.as_deref(),
            &inputs.log_options.overrides,
        )?;
        let typed_node_options = NodeOptions::from_option_list(&node_options)?;
        let typed_log_options = LogOptions::from_option_list(&log_options)?;

        // Node selection
        let node_name = match &request.node_name {
            Some(node) => {
                let bare = node.trim().trim_start_matches('/');
                if !is_valid_name(bare) {
                    return Err(NameError::InvalidName(node.clone()).into());
                }
                Some(bare.to_string())
            }
            None => None,
        };
        let node_params = node_name
            .as_deref()
            .map(|node| select_node_parameters(&parameters, node));

        info!(
            sources = sources.len(),
            remappings = remappings.len(),
            node_options = node_options.len(),
            ros_arguments = ros_arguments.len(),
            log_options = log_options.len(),
            "resolved launch configuration"
        );

        Ok(ResolvedConfiguration {
            parameters,
            remappings,
            node_options,
            ros_arguments,
            log_options,
            typed_node_options,
            typed_log_options,
            node_name,
            node_params,
            sources,
        })
    }

    /// Build from separate inputs.
    pub fn build_from(
        &self,
        base: Source,
        overlays: OverlaySpec,
        remaps: RemapInputs,
        options: OptionInputs,
    ) -> Result<ResolvedConfiguration, ConfigError> {
        let request = BuildRequest {
            overlays,
            remaps,
            options,
            ..BuildRequest::new(base)
        };
        self.build(&request)
    }
}

/// Apply `key.path=value` overrides as one extra mapping.
///
/// Values are typed like YAML plain scalars.
pub fn overrides_mapping<'a, I>(assignments: I) -> Result<ParameterMapping, ConfigError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut mapping = ParameterMapping::new();
    for assignment in assignments {
        let Some((path, value)) = assignment.split_once('=') else {
            return Err(ConfigError::Override(format!(
                "'{}' is not of the form key.path=value",
                assignment
            )));
        };
        let parts: Vec<&str> = path.trim().split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::Override(format!(
                "'{}' has an empty key segment",
                assignment
            )));
        }
        let mut single = ParameterMapping::new();
        crate::value::insert_path(&mut single, &parts, ParamValue::parse_scalar(value.trim()));
        mapping = deep_merge(mapping, single);
    }
    Ok(mapping)
}

/// Parse a document that must be a mapping (used by the CLI for stdin input).
pub fn parse_mapping(text: &str, origin: &str) -> Result<ParameterMapping, ConfigError> {
    let doc: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| SourceError::Parse {
        origin: origin.to_string(),
        reason: format!("invalid YAML syntax: {}", e),
    })?;
    let value = ParamValue::from_yaml(doc).map_err(|reason| SourceError::Parse {
        origin: origin.to_string(),
        reason,
    })?;
    Ok(expect_mapping(value, origin)?)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Remap(#[from] RemapParseError),

    #[error(transparent)]
    Options(#[from] OptionParseError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Name(#[from] NameError),

    #[error("invalid launch profile '{}': {reason}", path.display())]
    Profile { path: PathBuf, reason: String },

    #[error("invalid override: {0}")]
    Override(String),

    #[error("digest error: {0}")]
    Digest(String),
}
