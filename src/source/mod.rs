//! Parameter source reader
//!
//! Loads parameter mappings from YAML (or TOML) files, or passes literal
//! mappings through. Every file read records the SHA-256 of its raw bytes so
//! a resolved configuration can say exactly what it was built from.

mod resolve;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::value::{ParamValue, ParameterMapping};

pub use resolve::{resolve_file, ResolveEnv};

/// Where a parameter mapping comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    /// File path or `package://` / `file://` URI
    Path(String),

    /// Mapping supplied directly
    Literal(ParameterMapping),
}

impl Source {
    pub fn path(spec: impl Into<String>) -> Self {
        Self::Path(spec.into())
    }

    /// Path spec, if this is a file source.
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path(p) => Some(p),
            Self::Literal(_) => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p),
            Self::Literal(m) => write!(f, "<literal mapping, {} keys>", m.len()),
        }
    }
}

impl From<&str> for Source {
    fn from(spec: &str) -> Self {
        Self::Path(spec.to_string())
    }
}

impl From<String> for Source {
    fn from(spec: String) -> Self {
        Self::Path(spec)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_string_lossy().to_string())
    }
}

impl From<ParameterMapping> for Source {
    fn from(mapping: ParameterMapping) -> Self {
        Self::Literal(mapping)
    }
}

/// A mapping loaded from a [`Source`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSource {
    pub mapping: ParameterMapping,

    /// Resolved file path (None for literals)
    pub path: Option<PathBuf>,

    /// SHA-256 of the raw file bytes (None for literals)
    pub digest: Option<String>,
}

/// Any well-formed document loaded from a file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub value: ParamValue,
    pub path: PathBuf,
    pub digest: String,
}

/// Source reading errors.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source '{spec}' not found (resolved to '{}')", resolved.display())]
    NotFound { spec: String, resolved: PathBuf },

    #[error("package '{package}' for source '{spec}' is not in the ament index")]
    PackageNotFound { spec: String, package: String },

    #[error("invalid source '{spec}': {reason}")]
    InvalidUri { spec: String, reason: String },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{origin}': {reason}")]
    Parse { origin: String, reason: String },
}

impl SourceError {
    /// True for the "source does not resolve" class of errors, as opposed to
    /// content that exists but is malformed.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::PackageNotFound { .. } | Self::InvalidUri { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

fn parse_document(text: &str, format: Format, origin: &str) -> Result<ParamValue, SourceError> {
    let parse_error = |reason: String| SourceError::Parse {
        origin: origin.to_string(),
        reason,
    };

    match format {
        Format::Yaml => {
            let doc: serde_yaml::Value = serde_yaml::from_str(text)
                .map_err(|e| parse_error(format!("invalid YAML syntax: {}", e)))?;
            ParamValue::from_yaml(doc).map_err(parse_error)
        }
        Format::Toml => {
            let table: toml::Table = toml::from_str(text)
                .map_err(|e| parse_error(format!("invalid TOML syntax: {}", e)))?;
            Ok(ParamValue::from_toml(toml::Value::Table(table)))
        }
    }
}

/// Require a document to be a mapping.
pub(crate) fn expect_mapping(value: ParamValue, origin: &str) -> Result<ParameterMapping, SourceError> {
    match value {
        ParamValue::Table(table) => Ok(table),
        ParamValue::Null => Err(SourceError::Parse {
            origin: origin.to_string(),
            reason: "document is empty; expected a mapping".to_string(),
        }),
        other => Err(SourceError::Parse {
            origin: origin.to_string(),
            reason: format!("expected a mapping, found {}", other.kind()),
        }),
    }
}

/// Reads parameter sources. Holds no state between reads.
#[derive(Debug, Clone, Default)]
pub struct SourceReader {
    env: ResolveEnv,
}

impl SourceReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit environment lookups instead of the process environment.
    pub fn with_env(env: ResolveEnv) -> Self {
        Self { env }
    }

    /// Resolve a path spec without reading it.
    pub fn resolve(&self, spec: &str) -> Result<PathBuf, SourceError> {
        resolve_file(spec, &self.env)
    }

    /// Read a source as a mapping.
    pub fn read(&self, source: &Source) -> Result<LoadedSource, SourceError> {
        match source {
            Source::Path(spec) => {
                let doc = self.read_document(spec)?;
                let mapping = expect_mapping(doc.value, &doc.path.to_string_lossy())?;
                Ok(LoadedSource {
                    mapping,
                    path: Some(doc.path),
                    digest: Some(doc.digest),
                })
            }
            Source::Literal(mapping) => Ok(LoadedSource {
                mapping: mapping.clone(),
                path: None,
                digest: None,
            }),
        }
    }

    /// Read any well-formed document (mapping, list, scalar or empty).
    pub fn read_document(&self, spec: &str) -> Result<LoadedDocument, SourceError> {
        let path = self.resolve(spec)?;

        if !path.is_file() {
            return Err(SourceError::NotFound {
                spec: spec.trim().to_string(),
                resolved: path,
            });
        }

        let bytes = fs::read(&path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let origin = path.to_string_lossy().to_string();
        let text = String::from_utf8(bytes).map_err(|e| SourceError::Parse {
            origin: origin.clone(),
            reason: format!("invalid UTF-8: {}", e),
        })?;

        let value = parse_document(&text, Format::of(&path), &origin)?;
        debug!(path = %path.display(), %digest, kind = value.kind(), "read parameter source");

        Ok(LoadedDocument {
            value,
            path,
            digest,
        })
    }
}
