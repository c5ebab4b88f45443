use serde::{Deserialize, Serialize};
use validator::Validate;

/// Command name that turns compression off for volume archives.
pub const NO_COMPRESSION: &str = "none";
pub const DEFAULT_COMPRESSION_COMMAND: &str = "xz";

/// External streaming compressor.
///
/// The command is invoked as `<cmd> --stdout <args...>` and fed on stdin.
#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate, PartialEq, Eq)]
pub struct CompressionDefinition {
    #[serde(default, rename = "cmd", alias = "type")]
    #[validate(length(min = 1, message = "missing command"))]
    pub command: String,
    /// Defaults to the command's file name.
    #[serde(default, rename = "ext", alias = "extension")]
    pub extension: String,
    /// Extra flags, split on whitespace.
    #[serde(default)]
    pub args: String,
}

impl CompressionDefinition {
    pub fn is_disabled(&self) -> bool {
        self.command == NO_COMPRESSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_aliases() {
        let by_cmd: CompressionDefinition = serde_yml::from_str("cmd: gzip\next: gz").unwrap();
        let by_type: CompressionDefinition =
            serde_yml::from_str("type: gzip\nextension: gz").unwrap();
        assert_eq!(by_cmd, by_type);
        assert_eq!(by_cmd.command, "gzip");
        assert_eq!(by_cmd.extension, "gz");
        assert!(by_cmd.args.is_empty());
    }

    #[test]
    fn test_compression_missing_command() {
        let definition: CompressionDefinition = serde_yml::from_str("args: -9").unwrap();
        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_none_disables() {
        let definition: CompressionDefinition = serde_yml::from_str("type: none").unwrap();
        assert!(definition.is_disabled());
    }
}
