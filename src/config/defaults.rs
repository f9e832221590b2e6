//! Built-in option defaults
//!
//! Every accessor builds a fresh value; nothing here is shared state.

use serde::{Deserialize, Serialize};

/// Separator between items in node and log option strings.
pub const ITEM_SEPARATOR: &str = ",";

/// Separator between key and value in node and log option strings.
pub const KEY_VALUE_SEPARATOR: &str = "=";

/// Built-in default option values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Node name (default: "", keep the executable's name)
    pub name: String,

    /// Output target (default: "screen")
    pub output: String,

    /// Emulate a TTY for stdout/stderr (default: true)
    pub emulate_tty: bool,

    /// Respawn on exit (default: false)
    pub respawn: bool,

    /// Respawn delay in seconds (default: 0.0)
    pub respawn_delay: f64,

    /// Global log level (default: "info")
    pub log_level: String,

    pub disable_stdout_logs: bool,
    pub disable_rosout_logs: bool,
    pub disable_external_lib_logs: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            name: String::new(),
            output: "screen".to_string(),
            emulate_tty: true,
            respawn: false,
            respawn_delay: 0.0,
            log_level: "info".to_string(),
            disable_stdout_logs: false,
            disable_rosout_logs: false,
            disable_external_lib_logs: false,
        }
    }
}

impl BuiltinDefaults {
    /// Node options as ordered key/value pairs
    pub fn node_option_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("output", self.output.clone()),
            ("emulate_tty", self.emulate_tty.to_string()),
            ("respawn", self.respawn.to_string()),
            // Debug keeps the fractional part ("0.0", not "0")
            ("respawn_delay", format!("{:?}", self.respawn_delay)),
        ]
    }

    /// Log options as ordered key/value pairs
    pub fn log_option_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("log-level", self.log_level.clone()),
            ("disable-stdout-logs", self.disable_stdout_logs.to_string()),
            ("disable-rosout-logs", self.disable_rosout_logs.to_string()),
            (
                "disable-external-lib-logs",
                self.disable_external_lib_logs.to_string(),
            ),
        ]
    }

    /// Convert to JSON Value for display
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "node_options": {
                "name": self.name,
                "output": self.output,
                "emulate_tty": self.emulate_tty,
                "respawn": self.respawn,
                "respawn_delay": self.respawn_delay
            },
            "log_options": {
                "log-level": self.log_level,
                "disable-stdout-logs": self.disable_stdout_logs,
                "disable-rosout-logs": self.disable_rosout_logs,
                "disable-external-lib-logs": self.disable_external_lib_logs
            }
        })
    }
}

fn join_pairs(pairs: Vec<(&'static str, String)>, item_sep: &str, kv_sep: &str) -> String {
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}{}{}", k, kv_sep, v))
        .collect::<Vec<_>>()
        .join(item_sep)
}

/// Default node options string, e.g. `name=,output=screen,...`.
pub fn default_node_options_str(item_sep: &str, kv_sep: &str) -> String {
    join_pairs(BuiltinDefaults::default().node_option_pairs(), item_sep, kv_sep)
}

/// Default log options string, e.g. `log-level=info,disable-stdout-logs=false,...`.
pub fn default_log_options_str(item_sep: &str, kv_sep: &str) -> String {
    join_pairs(BuiltinDefaults::default().log_option_pairs(), item_sep, kv_sep)
}

pub fn node_options_desc() -> &'static str {
    "key-value string, like \"name=any_name,output=both,emulate_tty=true,respawn=true,respawn_delay=3.0\"."
}

pub fn log_options_desc() -> &'static str {
    "key-value string, like \"log-level=info,disable-stdout-logs=true,disable-rosout-logs=true,\
     disable-external-lib-logs=true,logger1_name=<level>,logger2_name=<level>\"."
}

pub fn remappings_desc() -> &'static str {
    "key-value string, like \"/a:=/b,/c:=d,e:=/f,g:=h\""
}
