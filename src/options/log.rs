//! Typed view of log options and their ROS argument form.

use std::fmt;

use indexmap::IndexMap;
use launch_args::{OptionParseError, OptionToken};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{parse_bool, OptionList};

/// Logger severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Only accepted for named loggers
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "fatal" => Some(Self::Fatal),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logging configuration handed to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogOptions {
    pub log_level: LogLevel,
    pub disable_stdout_logs: bool,
    pub disable_rosout_logs: bool,
    pub disable_external_lib_logs: bool,

    /// Per-logger levels, in first-seen order
    pub loggers: IndexMap<String, LogLevel>,
}

impl LogOptions {
    /// Build from a resolved option list.
    ///
    /// Known keys are `log-level` and the three `disable-*` switches; any
    /// other key names a logger. Keys are case-sensitive, values are not.
    pub fn from_option_list(list: &OptionList) -> Result<Self, OptionParseError> {
        let mut options = Self::default();

        for token in list.iter() {
            let OptionToken::KeyValue {
                flag: None, key, value, ..
            } = token
            else {
                debug!(token = %token, "ignoring log option token");
                continue;
            };

            match key.as_str() {
                "log-level" => {
                    options.log_level = LogLevel::parse(value)
                        .filter(|level| *level != LogLevel::Fatal)
                        .ok_or_else(|| OptionParseError::InvalidValue {
                            key: key.clone(),
                            value: value.clone(),
                            expected: "one of debug, info, warn, error".to_string(),
                        })?;
                }
                "disable-stdout-logs" => options.disable_stdout_logs = parse_bool(key, value)?,
                "disable-rosout-logs" => options.disable_rosout_logs = parse_bool(key, value)?,
                "disable-external-lib-logs" => {
                    options.disable_external_lib_logs = parse_bool(key, value)?
                }
                logger => {
                    let level =
                        LogLevel::parse(value).ok_or_else(|| OptionParseError::InvalidValue {
                            key: key.clone(),
                            value: value.clone(),
                            expected: "one of debug, info, warn, error, fatal".to_string(),
                        })?;
                    options.loggers.insert(logger.to_string(), level);
                }
            }
        }

        Ok(options)
    }

    /// Node argv words for these options.
    ///
    /// `--log-level <level>`, then one `--disable-*` flag per enabled switch,
    /// then `--log-level <logger>:=<level>` per named logger.
    pub fn to_ros_args(&self) -> Vec<String> {
        let mut args = vec!["--log-level".to_string(), self.log_level.to_string()];

        let switches = [
            ("--disable-stdout-logs", self.disable_stdout_logs),
            ("--disable-rosout-logs", self.disable_rosout_logs),
            ("--disable-external-lib-logs", self.disable_external_lib_logs),
        ];
        args.extend(
            switches
                .into_iter()
                .filter(|(_, on)| *on)
                .map(|(flag, _)| flag.to_string()),
        );

        for (logger, level) in &self.loggers {
            args.push("--log-level".to_string());
            args.push(format!("{}:={}", logger, level));
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::resolve_log_options;

    fn typed(overrides: &str) -> Result<LogOptions, OptionParseError> {
        LogOptions::from_option_list(&resolve_log_options(None, overrides)?)
    }

    #[test]
    fn test_default_ros_args() {
        assert_eq!(typed("").unwrap().to_ros_args(), vec!["--log-level", "info"]);
    }

    #[test]
    fn test_full_ros_args() {
        let options = typed(
            "log-level=DEBUG,disable-stdout-logs=True,disable-rosout-logs=true,\
             disable-external-lib-logs=true,/robot/talker=warn,rcl=fatal",
        )
        .unwrap();

        assert_eq!(
            options.to_ros_args(),
            vec![
                "--log-level",
                "debug",
                "--disable-stdout-logs",
                "--disable-rosout-logs",
                "--disable-external-lib-logs",
                "--log-level",
                "/robot/talker:=warn",
                "--log-level",
                "rcl:=fatal",
            ]
        );
    }

    #[test]
    fn test_fatal_rejected_for_global_level() {
        let err = typed("log-level=fatal").unwrap_err();
        assert!(matches!(err, OptionParseError::InvalidValue { ref key, .. } if key == "log-level"));
    }

    #[test]
    fn test_invalid_logger_level() {
        assert!(typed("my_logger=loud").is_err());
        assert!(typed("disable-rosout-logs=maybe").is_err());
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        // "Log-Level" is not the known key, so it names a logger
        let options = typed("Log-Level=warn").unwrap();
        assert_eq!(options.log_level, LogLevel::Info);
        assert_eq!(options.loggers.get("Log-Level"), Some(&LogLevel::Warn));
    }
}
