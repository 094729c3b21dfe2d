use crate::utils::error::{Result, SyncError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Optional config file. Every key may be omitted.
///
/// ```toml
/// [source]
/// input_path = "prices.json"
/// key_file = "apikeys"
///
/// [target]
/// endpoint = "https://api.jsonbin.io/v3/b/${BIN_ID}"
/// access_key_header = "X-Access-Key"
/// timeout_seconds = 30
///
/// [target.headers]
/// X-Bin-Meta = "false"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub target: TargetConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub input_path: Option<String>,
    pub key_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub endpoint: Option<String>,
    pub access_key_header: Option<String>,
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SyncError::ConfigError {
            message: format!("cannot read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BIN_ID})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[source]
input_path = "data/prices.json"
key_file = "secrets/apikeys"

[target]
endpoint = "https://api.jsonbin.io/v3/b/abc"
access_key_header = "X-Master-Key"
timeout_seconds = 10

[target.headers]
X-Bin-Meta = "false"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.source.input_path.as_deref(), Some("data/prices.json"));
        assert_eq!(config.source.key_file.as_deref(), Some("secrets/apikeys"));
        assert_eq!(
            config.target.endpoint.as_deref(),
            Some("https://api.jsonbin.io/v3/b/abc")
        );
        assert_eq!(config.target.access_key_header.as_deref(), Some("X-Master-Key"));
        assert_eq!(config.target.timeout_seconds, Some(10));
        assert_eq!(config.target.headers.get("X-Bin-Meta").map(String::as_str), Some("false"));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PRICE_SYNC_TEST_BIN_ID", "684db7dd");

        let toml_content = r#"
[target]
endpoint = "https://api.jsonbin.io/v3/b/${PRICE_SYNC_TEST_BIN_ID}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.target.endpoint.as_deref(),
            Some("https://api.jsonbin.io/v3/b/684db7dd")
        );

        std::env::remove_var("PRICE_SYNC_TEST_BIN_ID");
    }

    #[test]
    fn test_unknown_env_var_left_intact() {
        let toml_content = r#"
[target]
endpoint = "https://example.com/${PRICE_SYNC_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.target.endpoint.as_deref(),
            Some("https://example.com/${PRICE_SYNC_TEST_UNSET_VAR}")
        );
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = TomlConfig::from_toml_str("[target]\nretries = 3\n").unwrap_err();
        assert!(err.to_string().contains("TOML parsing error"));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[source]\ninput_path = \"from-file.json\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.source.input_path.as_deref(), Some("from-file.json"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = TomlConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
