//! Node name and namespace helpers
//!
//! Name rules follow ROS 2 node name validation: non-empty, at most 255
//! characters, ASCII `[A-Za-z0-9_]` only, not starting with a digit.

/// Longest accepted node name.
pub const MAX_NAME_LEN: usize = 255;

/// Name / namespace errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("'{0}' must be a non-empty string with ASCII [A-Za-z0-9_] only")]
    InvalidName(String),

    #[error("invalid namespace '{ns}': {reason}")]
    InvalidNamespace { ns: String, reason: String },
}

/// Check a single name segment.
pub fn is_valid_name(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_NAME_LEN {
        return false;
    }
    if s.starts_with(|c: char| c.is_ascii_digit()) {
        return false;
    }
    s.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Validate a namespace.
///
/// `""` and `"/"` are accepted. Otherwise one leading and one trailing `/`
/// are ignored and every remaining segment must be a valid name.
pub fn validate_namespace(ns: &str) -> Result<(), NameError> {
    if ns.is_empty() || ns == "/" {
        return Ok(());
    }

    let invalid = |reason: &str| NameError::InvalidNamespace {
        ns: ns.to_string(),
        reason: reason.to_string(),
    };

    let inner = ns.strip_prefix('/').unwrap_or(ns);
    let inner = inner.strip_suffix('/').unwrap_or(inner);

    if inner.is_empty() {
        return Err(invalid(
            "namespace cannot be empty after removing leading and trailing '/'",
        ));
    }

    for segment in inner.split('/') {
        if segment.is_empty() {
            return Err(invalid("consecutive '/' are not allowed in a namespace"));
        }
        if !is_valid_name(segment) {
            return Err(invalid("namespace segments must be ASCII [A-Za-z0-9_] only"));
        }
    }

    Ok(())
}

/// Normalize to a global namespace: leading `/`, no trailing `/`.
///
/// `""` and `"/"` both give `"/"`.
pub fn create_global_namespace(namespace: &str) -> Result<String, NameError> {
    let namespace = namespace.trim();
    if namespace.is_empty() || namespace == "/" {
        return Ok("/".to_string());
    }

    let namespace = namespace.trim_end_matches('/');
    let namespace = if namespace.starts_with('/') {
        namespace.to_string()
    } else {
        format!("/{}", namespace)
    };

    validate_namespace(&namespace)?;
    Ok(namespace)
}

/// Join a base namespace and a robot name.
///
/// `""` gives `robot`, `"/"` gives `/robot`, `"ns/"` gives `ns/robot`. A
/// leading `/` is neither added nor removed.
pub fn create_robot_namespace(namespace: &str, robot_name: &str) -> Result<String, NameError> {
    let robot_name = robot_name.trim();
    if !is_valid_name(robot_name) {
        return Err(NameError::InvalidName(robot_name.to_string()));
    }

    if namespace.is_empty() || namespace == "/" {
        return Ok(format!("{}{}", namespace, robot_name));
    }

    let namespace = namespace.trim_end_matches('/');
    validate_namespace(namespace)?;

    Ok(format!("{}/{}", namespace, robot_name))
}

/// Robot name with a trailing `_`, for frame and joint prefixes.
pub fn create_robot_prefix(robot_name: &str) -> Result<String, NameError> {
    let robot_name = robot_name.trim();
    if !is_valid_name(robot_name) {
        return Err(NameError::InvalidName(robot_name.to_string()));
    }

    if robot_name.ends_with('_') {
        Ok(robot_name.to_string())
    } else {
        Ok(format!("{}_", robot_name))
    }
}

fn replace_separator(namespace: &str, separator: &str) -> Result<String, NameError> {
    if namespace.is_empty() || namespace == "/" {
        return Ok(String::new());
    }
    validate_namespace(namespace)?;
    Ok(namespace.trim_matches('/').replace('/', separator))
}

/// `/robot1/arm` → `robot1.arm`
pub fn dottify_namespace(namespace: &str) -> Result<String, NameError> {
    replace_separator(namespace, ".")
}

/// `/robot1/arm` → `robot1_arm`
pub fn underscorify_namespace(namespace: &str) -> Result<String, NameError> {
    replace_separator(namespace, "_")
}
