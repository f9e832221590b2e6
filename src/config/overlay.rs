//! Overlay source lists

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::source::Source;

/// Ordered overlay sources; each entry overrides the ones before it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlaySpec {
    sources: Vec<Source>,
}

impl OverlaySpec {
    pub fn new(sources: Vec<Source>) -> Self {
        Self { sources }
    }

    /// Parse a comma-separated overlay list (`"a.yaml, b.yaml"`).
    ///
    /// Pieces are trimmed. Empty pieces are skipped; pieces equal to `base`
    /// or to an earlier piece are dropped with a warning.
    pub fn from_list_str(base: &str, list: &str) -> Self {
        let base = base.trim();
        let mut seen: Vec<&str> = Vec::new();

        for piece in list.split(',').map(str::trim) {
            if piece.is_empty() {
                continue;
            }
            if piece == base {
                warn!(overlay = piece, "skipping overlay equal to the base file");
                continue;
            }
            if seen.contains(&piece) {
                warn!(overlay = piece, "skipping duplicate overlay");
                continue;
            }
            seen.push(piece);
        }

        Self {
            sources: seen.into_iter().map(Source::from).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }
}

impl From<Vec<Source>> for OverlaySpec {
    fn from(sources: Vec<Source>) -> Self {
        Self::new(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_list_str() {
        let spec = OverlaySpec::from_list_str(
            "base.yaml",
            " a.yaml, ,base.yaml,b.yaml , a.yaml,",
        );
        assert_eq!(
            spec.sources(),
            &[Source::path("a.yaml"), Source::path("b.yaml")]
        );
    }

    #[test]
    fn test_empty_list() {
        assert!(OverlaySpec::from_list_str("base.yaml", "").is_empty());
        assert!(OverlaySpec::from_list_str("base.yaml", " , ").is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let spec = OverlaySpec::from_list_str("", "c.yaml,a.yaml,b.yaml");
        let names: Vec<String> = spec.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["c.yaml", "a.yaml", "b.yaml"]);
    }
}
