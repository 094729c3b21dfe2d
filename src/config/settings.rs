use crate::config::toml_config::TomlConfig;
use crate::config::CliConfig;
use crate::core::{ConfigProvider, Storage};
use crate::domain::model::AccessKey;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{self, Validate};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.jsonbin.io/v3/b/684db7dd8a456b7966ae2a8a";
pub const DEFAULT_INPUT_PATH: &str = "prices.json";
pub const DEFAULT_KEY_FILE: &str = "apikeys";
pub const DEFAULT_ACCESS_KEY_HEADER: &str = "X-Access-Key";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const MAX_TIMEOUT_SECONDS: u64 = 600;

/// Environment variable that supplies the access key directly, bypassing the key file.
pub const ACCESS_KEY_ENV: &str = "PRICE_SYNC_ACCESS_KEY";

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    pub endpoint: String,
    pub input_path: String,
    pub key_file: String,
    pub access_key_header: String,
    pub timeout_seconds: u64,
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            input_path: DEFAULT_INPUT_PATH.to_string(),
            key_file: DEFAULT_KEY_FILE.to_string(),
            access_key_header: DEFAULT_ACCESS_KEY_HEADER.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            extra_headers: BTreeMap::new(),
        }
    }
}

impl SyncSettings {
    /// Resolves settings from the command line, loading `--config` if given.
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                tracing::debug!("Loading config file {}", path.display());
                Some(TomlConfig::from_file(path)?)
            }
            None => None,
        };
        Self::merge(cli, file.unwrap_or_default())
    }

    /// Flag (or its env var) wins over the file, the file wins over the default.
    pub fn merge(cli: &CliConfig, file: TomlConfig) -> Result<Self> {
        let defaults = Self::default();

        let settings = Self {
            endpoint: cli
                .endpoint
                .clone()
                .or(file.target.endpoint)
                .unwrap_or(defaults.endpoint),
            input_path: cli
                .input
                .clone()
                .or(file.source.input_path)
                .unwrap_or(defaults.input_path),
            key_file: cli
                .key_file
                .clone()
                .or(file.source.key_file)
                .unwrap_or(defaults.key_file),
            access_key_header: cli
                .access_key_header
                .clone()
                .or(file.target.access_key_header)
                .unwrap_or(defaults.access_key_header),
            timeout_seconds: cli
                .timeout_seconds
                .or(file.target.timeout_seconds)
                .unwrap_or(defaults.timeout_seconds),
            extra_headers: file.target.headers,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Loads the access key, preferring `PRICE_SYNC_ACCESS_KEY` over the key file.
    pub async fn load_access_key<S: Storage>(&self, storage: &S) -> Result<AccessKey> {
        let from_env = std::env::var(ACCESS_KEY_ENV).ok();
        self.load_access_key_with(storage, from_env).await
    }

    pub async fn load_access_key_with<S: Storage>(
        &self,
        storage: &S,
        from_env: Option<String>,
    ) -> Result<AccessKey> {
        if let Some(raw) = from_env {
            tracing::debug!("Using access key from {}", ACCESS_KEY_ENV);
            return AccessKey::from_raw(&raw);
        }

        let bytes = storage
            .read_file(&self.key_file)
            .await
            .map_err(|source| SyncError::CredentialReadError {
                path: self.key_file.clone(),
                source,
            })?;

        let raw = String::from_utf8(bytes).map_err(|_| SyncError::CredentialInvalidError {
            reason: format!("'{}' is not valid UTF-8", self.key_file),
        })?;

        AccessKey::from_raw(&raw)
    }
}

impl Validate for SyncSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("endpoint", &self.endpoint)?;
        validation::validate_path("input_path", &self.input_path)?;
        validation::validate_path("key_file", &self.key_file)?;
        validation::validate_header_name("access_key_header", &self.access_key_header)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, MAX_TIMEOUT_SECONDS)?;

        for (name, value) in &self.extra_headers {
            let field = format!("target.headers.{}", name);
            validation::validate_header_name(&field, name)?;
            validation::validate_header_value(&field, value)?;
            if name.eq_ignore_ascii_case(&self.access_key_header)
                || name.eq_ignore_ascii_case("content-type")
            {
                return Err(SyncError::InvalidConfigValueError {
                    field,
                    value: value.clone(),
                    reason: "this header is managed by price-sync".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for SyncSettings {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn access_key_header(&self) -> &str {
        &self.access_key_header
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn extra_headers(&self) -> &BTreeMap<String, String> {
        &self.extra_headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use crate::utils::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = SyncSettings::merge(&CliConfig::default(), TomlConfig::default()).unwrap();

        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.input_path, "prices.json");
        assert_eq!(settings.key_file, "apikeys");
        assert_eq!(settings.access_key_header, "X-Access-Key");
        assert_eq!(settings.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = TomlConfig::from_toml_str(
            r#"
[source]
input_path = "file.json"
key_file = "file-keys"

[target]
endpoint = "https://file.example.com/b/1"
timeout_seconds = 12
"#,
        )
        .unwrap();

        let cli = CliConfig {
            input: Some("cli.json".to_string()),
            ..Default::default()
        };

        let settings = SyncSettings::merge(&cli, file).unwrap();
        assert_eq!(settings.input_path, "cli.json");
        assert_eq!(settings.key_file, "file-keys");
        assert_eq!(settings.endpoint, "https://file.example.com/b/1");
        assert_eq!(settings.timeout_seconds, 12);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cli = CliConfig {
            endpoint: Some("not a url".to_string()),
            ..Default::default()
        };
        let err = SyncSettings::merge(&cli, TomlConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let cli = CliConfig {
            timeout_seconds: Some(0),
            ..Default::default()
        };
        assert!(SyncSettings::merge(&cli, TomlConfig::default()).is_err());

        let cli = CliConfig {
            access_key_header: Some("X Access Key".to_string()),
            ..Default::default()
        };
        assert!(SyncSettings::merge(&cli, TomlConfig::default()).is_err());
    }

    #[test]
    fn test_extra_headers_cannot_shadow_managed_headers() {
        let file = TomlConfig::from_toml_str("[target.headers]\nx-access-key = \"other\"\n").unwrap();
        assert!(SyncSettings::merge(&CliConfig::default(), file).is_err());

        let file = TomlConfig::from_toml_str("[target.headers]\nContent-Type = \"text/plain\"\n").unwrap();
        assert!(SyncSettings::merge(&CliConfig::default(), file).is_err());
    }

    #[tokio::test]
    async fn test_load_access_key_from_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("apikeys"), "secret123\n").unwrap();

        let settings = SyncSettings::default();
        let key = settings
            .load_access_key_with(&LocalStorage::new(dir.path()), None)
            .await
            .unwrap();
        assert_eq!(key.expose(), "secret123");
    }

    #[tokio::test]
    async fn test_env_key_wins_over_file() {
        let dir = TempDir::new().unwrap();
        let settings = SyncSettings::default();

        let key = settings
            .load_access_key_with(&LocalStorage::new(dir.path()), Some("from-env".to_string()))
            .await
            .unwrap();
        assert_eq!(key.expose(), "from-env");
    }

    #[tokio::test]
    async fn test_missing_key_file_is_credential_error() {
        let dir = TempDir::new().unwrap();
        let settings = SyncSettings::default();

        let err = settings
            .load_access_key_with(&LocalStorage::new(dir.path()), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialRead);
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("apikeys"));
    }
}
