use crate::core::fetcher::{DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY};
use crate::core::merge::DEFAULT_PRECISION_SCALE;
use crate::core::service::MergeSettings;
use crate::utils::error::{AreaError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub merge: MergeSection,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: String,
    pub auth_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    pub batch_size: Option<usize>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeSection {
    pub precision_scale: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: String,
}

impl MergeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AreaError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| AreaError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PCMILER_TOKEN})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AreaError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn auth_token(&self) -> Result<&str> {
        let token = validation::validate_required_field("source.auth_token", &self.source.auth_token)?;
        validation::validate_non_empty_string("source.auth_token", token)?;
        Ok(token.as_str())
    }

    pub fn settings(&self) -> MergeSettings {
        MergeSettings {
            batch_size: self.fetch.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            concurrency: self.fetch.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            precision_scale: self.merge.precision_scale.unwrap_or(DEFAULT_PRECISION_SCALE),
        }
    }
}

impl Validate for MergeConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        self.auth_token()?;
        validation::validate_path("store.path", &self.store.path)?;

        let settings = self.settings();
        validation::validate_positive_number("fetch.batch_size", settings.batch_size, 1)?;
        validation::validate_positive_number("fetch.concurrency", settings.concurrency, 1)?;
        validation::validate_range("merge.precision_scale", settings.precision_scale, 0, 12)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[source]
endpoint = "https://pcmiler.alk.com/apis/rest/v1.0/Service.svc"
auth_token = "token-123"
timeout_seconds = 30

[fetch]
batch_size = 50
concurrency = 4

[merge]
precision_scale = 4

[store]
path = "./boundaries"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = MergeConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.source.timeout_seconds, Some(30));
        assert_eq!(config.auth_token().unwrap(), "token-123");
        assert_eq!(
            config.settings(),
            MergeSettings {
                batch_size: 50,
                concurrency: 4,
                precision_scale: 4,
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let config = MergeConfig::from_toml_str(
            r#"
[source]
endpoint = "https://example.com"
auth_token = "t"

[store]
path = "./out"
"#,
        )
        .unwrap();

        assert_eq!(config.settings(), MergeSettings::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("AREA_MERGE_TEST_TOKEN", "from-env");

        let config = MergeConfig::from_toml_str(
            r#"
[source]
endpoint = "https://example.com"
auth_token = "${AREA_MERGE_TEST_TOKEN}"

[store]
path = "./out"
"#,
        )
        .unwrap();
        assert_eq!(config.auth_token().unwrap(), "from-env");

        std::env::remove_var("AREA_MERGE_TEST_TOKEN");
    }

    #[test]
    fn test_config_validation() {
        let config = MergeConfig::from_toml_str(
            r#"
[source]
endpoint = "invalid-url"
auth_token = "t"

[store]
path = "./out"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = MergeConfig::from_toml_str(
            r#"
[source]
endpoint = "https://example.com"

[fetch]
concurrency = 0

[store]
path = "./out"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(AreaError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = MergeConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.store.path, "./boundaries");
    }
}
