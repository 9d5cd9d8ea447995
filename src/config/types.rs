use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::StoreConfig;

/// Seven days.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    pub store: StoreConfig,
    pub jwt: JWTConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Signing settings for issued bearer tokens.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct JWTConfig {
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub iss: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub exp: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct PasswordConfig {
    /// bcrypt work factor.
    #[serde(default = "default_bcrypt_cost")]
    pub cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        PasswordConfig {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}

fn default_issuer() -> String {
    "jobboard".to_string()
}

fn default_token_ttl() -> i64 {
    DEFAULT_TOKEN_TTL_SECS
}

fn default_bcrypt_cost() -> u32 {
    DEFAULT_BCRYPT_COST
}

fn extract(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from a YAML file, with `JOBBOARD_`-prefixed environment
/// variables layered on top (`JOBBOARD_JWT__SECRET` sets `jwt.secret`).
pub fn load_config(path: &str) -> Result<ConfigV1, figment::Error> {
    extract(
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("JOBBOARD_").split("__")),
    )
}

/// Parse config from an in-memory YAML document. No environment overrides.
pub fn parse_config(yaml: &str) -> Result<ConfigV1, figment::Error> {
    extract(Figment::new().merge(Yaml::string(yaml)))
}

/// The JSON schema for the configuration, pretty-printed.
pub fn config_schema() -> String {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:8080
store:
  type: memory
jwt:
  secret: test-secret
"#;

    /// Test that omitted sections fall back to their defaults.
    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config(MINIMAL).expect("minimal config should parse");
        assert_eq!(config.jwt.exp, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(config.jwt.iss, "jobboard");
        assert_eq!(config.password.cost, DEFAULT_BCRYPT_COST);
        assert_eq!(config.logging.level, "info");
        assert!(matches!(config.store, StoreConfig::Memory));
    }

    /// Test that the mongo backend is selected by its type tag.
    #[test]
    fn test_mongo_store_config() {
        let yaml = r#"
version: "1.0.0"
bind_address: 0.0.0.0:8080
store:
  type: mongo
  uri: mongodb://localhost:27017/?replicaSet=rs0
  database: jobboard
jwt:
  secret: s
  exp: 60
password:
  cost: 4
"#;
        let config = parse_config(yaml).unwrap();
        match config.store {
            StoreConfig::MongoDB(m) => assert_eq!(m.database, "jobboard"),
            other => panic!("unexpected store config: {:?}", other),
        }
        assert_eq!(config.jwt.exp, 60);
        assert_eq!(config.password.cost, 4);
    }

    /// Test that an unknown version is rejected.
    #[test]
    fn test_unknown_version_is_rejected() {
        let yaml = MINIMAL.replace("1.0.0", "2.0.0");
        assert!(parse_config(&yaml).is_err());
    }

    #[test]
    fn test_schema_mentions_store_types() {
        let schema = config_schema();
        assert!(schema.contains("memory"));
        assert!(schema.contains("mongo"));
    }
}
