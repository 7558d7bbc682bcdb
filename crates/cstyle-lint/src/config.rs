//! Linter config definition.

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// The default indentation unit used when one cannot be inferred.
pub const DEFAULT_TAB_SIZE: usize = 4;

/// An error that occurred while loading a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration is not valid TOML or has unknown keys.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The fallback tab size is zero.
    #[error("`fallback_tab_size` must be greater than zero")]
    ZeroTabSize,
    /// A disabled rule does not exist.
    #[error("unknown lint rule `{0}` in `disabled_rules`")]
    UnknownRule(String),
}

/// The configuration for lint rules.
///
/// ## Example
///
/// ```toml
/// fallback_tab_size = 2
/// disabled_rules = ["UnnecessaryIfBraces"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The indentation unit used by `ExpressionIndentation` when the unit
    /// cannot be inferred from the enclosing type declaration.
    pub fallback_tab_size: usize,
    /// The identifiers of rules that should not run.
    pub disabled_rules: HashSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fallback_tab_size: DEFAULT_TAB_SIZE,
            disabled_rules: HashSet::default(),
        }
    }
}

impl Config {
    /// Parses and validates a configuration from TOML source.
    ///
    /// Missing keys take their default values.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fallback_tab_size == 0 {
            return Err(ConfigError::ZeroTabSize);
        }

        let known = crate::rules(self);
        if let Some(unknown) = self
            .disabled_rules
            .iter()
            .find(|id| !known.iter().any(|r| r.id() == id.as_str()))
        {
            return Err(ConfigError::UnknownRule(unknown.clone()));
        }

        Ok(())
    }

    /// Determines if the rule with the given identifier is enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        !self.disabled_rules.contains(id)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_toml("").expect("should parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.fallback_tab_size, DEFAULT_TAB_SIZE);
        assert!(config.is_enabled("ExpressionIndentation"));
    }

    #[test]
    fn from_toml() {
        let config = Config::from_toml(
            "fallback_tab_size = 2\ndisabled_rules = [\"UnnecessaryIfBraces\"]\n",
        )
        .expect("should parse");
        assert_eq!(config.fallback_tab_size, 2);
        assert!(!config.is_enabled("UnnecessaryIfBraces"));
        assert!(config.is_enabled("ExpressionIndentation"));
    }

    #[test]
    fn round_trip() {
        let mut config = Config::default();
        config.disabled_rules.insert("ExpressionIndentation".to_string());
        let source = config.to_toml().expect("should serialize");
        assert_eq!(Config::from_toml(&source).expect("should parse"), config);
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            Config::from_toml("tab_size = 2"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::from_toml("fallback_tab_size = 0"),
            Err(ConfigError::ZeroTabSize)
        ));
        match Config::from_toml("disabled_rules = [\"NoSuchRule\"]") {
            Err(ConfigError::UnknownRule(id)) => assert_eq!(id, "NoSuchRule"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
