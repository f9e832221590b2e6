//! Option string tokenizer.
//!
//! Parses node options, ROS arguments and log options into [`OptionToken`]s.
//! Three token shapes are recognized:
//!
//! - `key=value` / `key:=value`: key/value token, key is everything before
//!   the first separator
//! - `--flag value`: a dash flag directly followed by a value word is a
//!   key/value token keyed by the flag; when the value word is itself
//!   `name:=value` (as in `-r from:=to` or `-p name:=1`) the key becomes
//!   `flag name`
//! - anything else: a bare flag
//!
//! Repeatable flags such as `--params-file` keep one token per value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::OptionParseError;

/// Flags that may repeat with different values (`--params-file a.yaml
/// --params-file b.yaml`). Their value is part of the token identity.
pub const REPEATABLE_FLAGS: &[&str] = &["--params-file"];

/// How an option string is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// Split on runs of whitespace (ROS arguments).
    Whitespace,
    /// Split on `,` (node options, log options).
    Comma,
}

/// Separator between key and value inside a key/value token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSeparator {
    Equals,
    ColonEquals,
    Space,
}

impl ValueSeparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::ColonEquals => ":=",
            Self::Space => " ",
        }
    }
}

/// A single option token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionToken {
    /// Bare flag such as `--verbose`.
    Flag { name: String },

    /// Key/value token. `flag` is set when the pair was introduced by a
    /// dash flag (`-p name:=1`).
    KeyValue {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flag: Option<String>,
        key: String,
        separator: ValueSeparator,
        value: String,
    },
}

impl OptionToken {
    pub fn flag(name: impl Into<String>) -> Self {
        Self::Flag { name: name.into() }
    }

    pub fn key_value(
        key: impl Into<String>,
        separator: ValueSeparator,
        value: impl Into<String>,
    ) -> Self {
        Self::KeyValue {
            flag: None,
            key: key.into(),
            separator,
            value: value.into(),
        }
    }

    /// Identity used for de-duplication: the flag name, or the key
    /// (prefixed by its introducing flag, if any). A [repeatable
    /// flag](REPEATABLE_FLAGS) is identified by flag and value.
    pub fn identity(&self) -> String {
        match self {
            Self::Flag { name } => name.clone(),
            Self::KeyValue {
                flag: Some(flag),
                key,
                ..
            } => format!("{} {}", flag, key),
            Self::KeyValue {
                flag: None,
                key,
                value,
                ..
            } if REPEATABLE_FLAGS.contains(&key.as_str()) => format!("{} {}", key, value),
            Self::KeyValue { flag: None, key, .. } => key.clone(),
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, Self::Flag { .. })
    }

    /// The value of a key/value token.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Flag { .. } => None,
            Self::KeyValue { value, .. } => Some(value),
        }
    }

    /// Split into process argv words: `-r a:=b` becomes `["-r", "a:=b"]`,
    /// `--use_sim_time true` becomes `["--use_sim_time", "true"]`.
    pub fn to_argv(&self) -> Vec<String> {
        match self {
            Self::Flag { name } => vec![name.clone()],
            Self::KeyValue {
                flag: Some(flag),
                key,
                separator,
                value,
            } => vec![
                flag.clone(),
                format!("{}{}{}", key, separator.as_str(), value),
            ],
            Self::KeyValue {
                flag: None,
                key,
                separator: ValueSeparator::Space,
                value,
            } => vec![key.clone(), value.clone()],
            Self::KeyValue { .. } => vec![self.to_string()],
        }
    }
}

impl fmt::Display for OptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag { name } => write!(f, "{}", name),
            Self::KeyValue {
                flag,
                key,
                separator,
                value,
            } => {
                if let Some(flag) = flag {
                    write!(f, "{} ", flag)?;
                }
                write!(f, "{}{}{}", key, separator.as_str(), value)
            }
        }
    }
}

/// Split a word on its first `=` / `:=` separator.
///
/// Returns `None` when the word has no separator.
fn split_key_value(word: &str) -> Option<(&str, ValueSeparator, &str)> {
    let eq = word.find('=')?;
    let (head, tail) = (&word[..eq], &word[eq + 1..]);
    match head.strip_suffix(':') {
        Some(key) => Some((key, ValueSeparator::ColonEquals, tail)),
        None => Some((head, ValueSeparator::Equals, tail)),
    }
}

fn is_dash_flag(word: &str) -> bool {
    word.starts_with('-') && word.parse::<f64>().is_err()
}

fn is_value_word(word: &str) -> bool {
    !is_dash_flag(word)
}

fn key_value_token(
    word: &str,
    flag: Option<&str>,
    origin: &str,
) -> Result<Option<OptionToken>, OptionParseError> {
    let Some((key, separator, value)) = split_key_value(word) else {
        return Ok(None);
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(OptionParseError::EmptyKey {
            token: word.to_string(),
            origin: origin.to_string(),
        });
    }
    Ok(Some(OptionToken::KeyValue {
        flag: flag.map(str::to_string),
        key: key.to_string(),
        separator,
        value: value.trim().to_string(),
    }))
}

/// Tokenize an option string.
///
/// A blank input yields no tokens. With [`Delimiter::Comma`], an empty piece
/// between commas is an error.
pub fn tokenize_options(
    input: &str,
    delimiter: Delimiter,
    origin: &str,
) -> Result<Vec<OptionToken>, OptionParseError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    match delimiter {
        Delimiter::Comma => tokenize_comma(input, origin),
        Delimiter::Whitespace => tokenize_whitespace(input, origin),
    }
}

fn tokenize_comma(input: &str, origin: &str) -> Result<Vec<OptionToken>, OptionParseError> {
    let mut tokens = Vec::new();

    for (position, piece) in input.split(',').enumerate() {
        let piece = piece.trim();
        if piece.is_empty() {
            return Err(OptionParseError::EmptyToken {
                position,
                origin: origin.to_string(),
            });
        }
        match key_value_token(piece, None, origin)? {
            Some(token) => tokens.push(token),
            None => tokens.push(OptionToken::flag(piece)),
        }
    }

    Ok(tokens)
}

fn tokenize_whitespace(input: &str, origin: &str) -> Result<Vec<OptionToken>, OptionParseError> {
    let words: Vec<&str> = input.split_whitespace().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < words.len() {
        let word = words[i];

        // key=value, key:=value, --flag=value
        if let Some(token) = key_value_token(word, None, origin)? {
            tokens.push(token);
            i += 1;
            continue;
        }

        // --flag value, -r from:=to
        if is_dash_flag(word) && i + 1 < words.len() && is_value_word(words[i + 1]) {
            let next = words[i + 1];
            let token = match key_value_token(next, Some(word), origin)? {
                Some(token) => token,
                None => OptionToken::key_value(word, ValueSeparator::Space, next),
            };
            tokens.push(token);
            i += 2;
            continue;
        }

        tokens.push(OptionToken::flag(word));
        i += 1;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(tokens: &[OptionToken]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_flag_followed_by_value() {
        let tokens =
            tokenize_options("--use_sim_time true --verbose", Delimiter::Whitespace, "defaults")
                .unwrap();
        assert_eq!(
            tokens,
            vec![
                OptionToken::key_value("--use_sim_time", ValueSeparator::Space, "true"),
                OptionToken::flag("--verbose"),
            ]
        );
        assert_eq!(tokens[0].identity(), "--use_sim_time");
    }

    #[test]
    fn test_repeated_params_file_keeps_both() {
        let tokens = tokenize_options(
            "--ros-args --params-file a.yaml --params-file b.yaml --use_sim_time true",
            Delimiter::Whitespace,
            "cli",
        )
        .unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1].identity(), "--params-file a.yaml");
        assert_eq!(tokens[2].identity(), "--params-file b.yaml");
        assert_eq!(tokens[3].identity(), "--use_sim_time");
    }

    #[test]
    fn test_key_value_separators() {
        let tokens =
            tokenize_options("name=talker level:=debug", Delimiter::Whitespace, "cli").unwrap();
        assert_eq!(
            tokens,
            vec![
                OptionToken::key_value("name", ValueSeparator::Equals, "talker"),
                OptionToken::key_value("level", ValueSeparator::ColonEquals, "debug"),
            ]
        );
    }

    #[test]
    fn test_ros_args_remap_and_param() {
        let tokens = tokenize_options(
            "--ros-args -r chatter:=/talk -p rate:=10",
            Delimiter::Whitespace,
            "cli",
        )
        .unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], OptionToken::flag("--ros-args"));
        assert_eq!(tokens[1].identity(), "-r chatter");
        assert_eq!(tokens[2].identity(), "-p rate");
        assert_eq!(
            rendered(&tokens),
            vec!["--ros-args", "-r chatter:=/talk", "-p rate:=10"]
        );
        assert_eq!(tokens[1].to_argv(), vec!["-r", "chatter:=/talk"]);
    }

    #[test]
    fn test_negative_number_is_a_value() {
        let tokens = tokenize_options("--offset -1.5", Delimiter::Whitespace, "cli").unwrap();
        assert_eq!(
            tokens,
            vec![OptionToken::key_value("--offset", ValueSeparator::Space, "-1.5")]
        );
    }

    #[test]
    fn test_consecutive_flags_stay_bare() {
        let tokens = tokenize_options("--a --b -c", Delimiter::Whitespace, "cli").unwrap();
        assert!(tokens.iter().all(|t| t.is_flag()));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_bare_word_is_flag() {
        let tokens = tokenize_options("verbose", Delimiter::Whitespace, "cli").unwrap();
        assert_eq!(tokens, vec![OptionToken::flag("verbose")]);
    }

    #[test]
    fn test_comma_delimited() {
        let tokens = tokenize_options(
            "name=,output=screen, emulate_tty=true ,debug",
            Delimiter::Comma,
            "node options",
        )
        .unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].value(), Some(""));
        assert_eq!(tokens[2].identity(), "emulate_tty");
        assert_eq!(tokens[3], OptionToken::flag("debug"));
    }

    #[test]
    fn test_comma_empty_piece_is_error() {
        let err = tokenize_options("a=1,,b=2", Delimiter::Comma, "log options").unwrap_err();
        assert_eq!(
            err,
            OptionParseError::EmptyToken {
                position: 1,
                origin: "log options".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_key_is_error() {
        let err = tokenize_options("=value", Delimiter::Whitespace, "cli").unwrap_err();
        assert!(matches!(err, OptionParseError::EmptyKey { .. }));

        let err = tokenize_options("-p :=1", Delimiter::Whitespace, "cli").unwrap_err();
        assert!(matches!(err, OptionParseError::EmptyKey { .. }));
    }

    #[test]
    fn test_blank_input() {
        assert!(tokenize_options("", Delimiter::Comma, "x").unwrap().is_empty());
        assert!(tokenize_options(" \t ", Delimiter::Whitespace, "x")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_flag_with_inline_value() {
        let tokens = tokenize_options("--log-level=debug", Delimiter::Whitespace, "cli").unwrap();
        assert_eq!(
            tokens,
            vec![OptionToken::key_value("--log-level", ValueSeparator::Equals, "debug")]
        );
        assert_eq!(tokens[0].to_argv(), vec!["--log-level=debug"]);
    }
}
