//! Source path resolution.
//!
//! Supports `package://<pkg>/<path>` (through the ament index),
//! `file://<absolute path>` and plain paths with `~` expansion.

use std::path::{Path, PathBuf};

use super::SourceError;

const PACKAGE_SCHEME: &str = "package://";
const FILE_SCHEME: &str = "file://";

/// Marker directory an installed ament package registers itself in.
const AMENT_PACKAGES_INDEX: &str = "share/ament_index/resource_index/packages";

/// Environment lookups used during resolution.
///
/// Fields left unset fall back to the process environment at resolve time.
#[derive(Debug, Clone, Default)]
pub struct ResolveEnv {
    pub ament_prefixes: Option<Vec<PathBuf>>,
    pub home: Option<PathBuf>,
}

impl ResolveEnv {
    fn ament_prefixes(&self) -> Vec<PathBuf> {
        if let Some(prefixes) = &self.ament_prefixes {
            return prefixes.clone();
        }
        std::env::var_os("AMENT_PREFIX_PATH")
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default()
    }

    fn home(&self) -> Option<PathBuf> {
        self.home
            .clone()
            .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
    }

    /// Expand a leading `~` or `~/`.
    pub fn expand_user(&self, path: &str) -> PathBuf {
        let rest = match path.strip_prefix('~') {
            Some("") => "",
            Some(rest) if rest.starts_with('/') => &rest[1..],
            _ => return PathBuf::from(path),
        };
        match self.home() {
            Some(home) if rest.is_empty() => home,
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    }

    /// Share directory of an installed package.
    pub fn package_share_directory(&self, package: &str) -> Option<PathBuf> {
        self.ament_prefixes().into_iter().find_map(|prefix| {
            let marker = prefix.join(AMENT_PACKAGES_INDEX).join(package);
            marker
                .is_file()
                .then(|| prefix.join("share").join(package))
        })
    }
}

/// Resolve a source spec to a filesystem path.
///
/// Does not check that the file exists.
pub fn resolve_file(spec: &str, env: &ResolveEnv) -> Result<PathBuf, SourceError> {
    let spec = spec.trim();

    if spec.is_empty() {
        return Err(SourceError::InvalidUri {
            spec: spec.to_string(),
            reason: "empty source path".to_string(),
        });
    }

    if let Some(rest) = spec.strip_prefix(PACKAGE_SCHEME) {
        let Some((package, relative)) = rest.split_once('/') else {
            return Err(SourceError::InvalidUri {
                spec: spec.to_string(),
                reason: "expected 'package://<pkg>/<path>'".to_string(),
            });
        };
        if package.is_empty() || relative.is_empty() {
            return Err(SourceError::InvalidUri {
                spec: spec.to_string(),
                reason: "expected 'package://<pkg>/<path>'".to_string(),
            });
        }
        let share = env
            .package_share_directory(package)
            .ok_or_else(|| SourceError::PackageNotFound {
                spec: spec.to_string(),
                package: package.to_string(),
            })?;
        return Ok(share.join(relative));
    }

    if let Some(rest) = spec.strip_prefix(FILE_SCHEME) {
        let path = env.expand_user(rest);
        if !Path::new(&path).is_absolute() {
            return Err(SourceError::InvalidUri {
                spec: spec.to_string(),
                reason: format!("file URI must point to an absolute path (got '{}')", rest),
            });
        }
        return Ok(path);
    }

    Ok(env.expand_user(spec))
}
