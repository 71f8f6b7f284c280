use std::env::var;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Where the backend lives and which database, collections and bucket the
/// client talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringsConfig {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub user_collection_id: String,
    pub post_collection_id: String,
    pub saves_collection_id: String,
    pub storage_id: String,
}

impl Default for StringsConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost/v1".to_string(),
            project_id: "strings".to_string(),
            database_id: "strings".to_string(),
            user_collection_id: "users".to_string(),
            post_collection_id: "posts".to_string(),
            saves_collection_id: "saves".to_string(),
            storage_id: "media".to_string(),
        }
    }
}

#[derive(Debug, ::thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] ::std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] ::toml::de::Error),
    #[error("`{0}` must not be empty")]
    Empty(&'static str),
}

/// Runtime variable first, then the value baked in at build time, then the
/// default.
macro_rules! try_get_value {
    ($n:literal, $bn:literal, $default:expr) => {{
        match var($n) {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!("error on getting `{}`: {}", $n, e);

                match option_env!($bn) {
                    Some(t) => t.to_string(),
                    None => $default,
                }
            },
        }
    }};
}

impl StringsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();

        Self {
            endpoint: try_get_value!("STRINGS_ENDPOINT", "BUILD_WITH_STRINGS_ENDPOINT", d.endpoint),
            project_id: try_get_value!(
                "STRINGS_PROJECT_ID",
                "BUILD_WITH_STRINGS_PROJECT_ID",
                d.project_id
            ),
            database_id: try_get_value!(
                "STRINGS_DATABASE_ID",
                "BUILD_WITH_STRINGS_DATABASE_ID",
                d.database_id
            ),
            user_collection_id: try_get_value!(
                "STRINGS_USER_COLLECTION_ID",
                "BUILD_WITH_STRINGS_USER_COLLECTION_ID",
                d.user_collection_id
            ),
            post_collection_id: try_get_value!(
                "STRINGS_POST_COLLECTION_ID",
                "BUILD_WITH_STRINGS_POST_COLLECTION_ID",
                d.post_collection_id
            ),
            saves_collection_id: try_get_value!(
                "STRINGS_SAVES_COLLECTION_ID",
                "BUILD_WITH_STRINGS_SAVES_COLLECTION_ID",
                d.saves_collection_id
            ),
            storage_id: try_get_value!(
                "STRINGS_STORAGE_ID",
                "BUILD_WITH_STRINGS_STORAGE_ID",
                d.storage_id
            ),
        }
        .validated()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        ::toml::from_str::<Self>(s)?.validated()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = ::std::fs::read_to_string(path)?;

        Self::from_toml_str(&raw)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let fields = [
            ("endpoint", &self.endpoint),
            ("project_id", &self.project_id),
            ("database_id", &self.database_id),
            ("user_collection_id", &self.user_collection_id),
            ("post_collection_id", &self.post_collection_id),
            ("saves_collection_id", &self.saves_collection_id),
            ("storage_id", &self.storage_id),
        ];

        let empty = fields
            .iter()
            .find(|(_, v)| v.is_empty())
            .map(|(name, _)| *name);

        match empty {
            Some(name) => Err(ConfigError::Empty(name)),
            None => Ok(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_defaults() {
        let c = StringsConfig::from_toml_str(
            r#"
            endpoint = "https://cloud.example.com/v1"
            post_collection_id = "posts-v2"
            "#,
        )
        .unwrap();

        assert_eq!(c.endpoint, "https://cloud.example.com/v1");
        assert_eq!(c.post_collection_id, "posts-v2");
        assert_eq!(c.user_collection_id, "users");
    }

    #[test]
    fn empty_value_rejected() {
        let e = StringsConfig::from_toml_str(r#"storage_id = """#).unwrap_err();

        assert!(matches!(e, ConfigError::Empty("storage_id")));
    }

    #[test]
    fn broken_toml_rejected() {
        assert!(matches!(
            StringsConfig::from_toml_str("endpoint = "),
            Err(ConfigError::Parse(_))
        ));
    }
}
