//! Tokenizers for the string mini-languages of ROS launch arguments.
//!
//! Remapping lists (`a:=b,c:=d`) and option strings
//! (`--use_sim_time true -r a:=b`, `name=x,output=screen`) are parsed here,
//! independent of where the string came from, so precedence rules built on
//! top of these tokens can be tested in isolation.

mod error;
mod options;
mod remap;

pub use error::{OptionParseError, RemapParseError};
pub use options::{tokenize_options, Delimiter, OptionToken, ValueSeparator, REPEATABLE_FLAGS};
pub use remap::{parse_remap_list, parse_remap_token, RemapEntry, REMAP_ITEM_SEPARATOR, REMAP_SEPARATOR};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_text_same_tokens_regardless_of_origin() {
        let a = tokenize_options("--verbose -p x:=1", Delimiter::Whitespace, "cli").unwrap();
        let b = tokenize_options("--verbose -p x:=1", Delimiter::Whitespace, "profile").unwrap();
        assert_eq!(a, b);

        let a = parse_remap_list("x:=y", "cli").unwrap();
        let b = parse_remap_list("x:=y", "launch argument").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_errors_carry_origin() {
        let err = parse_remap_list("x", "launch argument").unwrap_err();
        assert_eq!(err.origin(), "launch argument");

        let err = tokenize_options("a,,b", Delimiter::Comma, "node options").unwrap_err();
        assert!(err.to_string().contains("node options"));
    }
}
