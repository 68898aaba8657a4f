use crate::core::candidate::CandidateStrategy;
use crate::core::escalation::EscalationPolicy;
use crate::utils::error::{MeetError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings file. Every section is optional and falls back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub mapbox: MapboxSettings,
    pub engine: EngineSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapboxSettings {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for MapboxSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapbox.com".to_string(),
            token: None,
            timeout_seconds: 20,
        }
    }
}

impl MapboxSettings {
    /// The configured token, ignoring placeholders left unresolved.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.starts_with("${"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub default_budget: u32,
    pub min_budget: u32,
    pub max_participants: usize,
    pub tolerance_minutes: f64,
    pub candidate_strategy: CandidateStrategy,
    pub escalation: EscalationPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_budget: crate::DEFAULT_MAX_MINUTES,
            min_budget: crate::MIN_MAX_MINUTES,
            max_participants: crate::MAX_PARTICIPANTS,
            tolerance_minutes: crate::BUDGET_TOLERANCE_MINUTES,
            candidate_strategy: CandidateStrategy::default(),
            escalation: EscalationPolicy::default(),
        }
    }
}

impl EngineSettings {
    pub fn max_budget(&self) -> u32 {
        self.escalation.ceiling
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub max_capacity: u64,
    pub ttl_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl_seconds: 24 * 3600,
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| MeetError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are kept.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MeetError::Config {
            message: format!("placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for EngineSettings {
    fn validate(&self) -> Result<()> {
        let ceiling = self.escalation.ceiling;
        validation::validate_range("engine.escalation.ceiling", ceiling, 1, crate::MAX_MAX_MINUTES)?;
        validation::validate_range("engine.min_budget", self.min_budget, 1, ceiling)?;
        validation::validate_range(
            "engine.default_budget",
            self.default_budget,
            self.min_budget,
            ceiling,
        )?;
        validation::validate_positive_number("engine.escalation.step", self.escalation.step as u64, 1)?;
        validation::validate_range(
            "engine.max_participants",
            self.max_participants,
            1,
            crate::MAX_PARTICIPANTS,
        )?;
        validation::validate_range("engine.tolerance_minutes", self.tolerance_minutes, 0.0, 5.0)?;
        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("mapbox.base_url", &self.mapbox.base_url)?;
        validation::validate_positive_number("mapbox.timeout_seconds", self.mapbox.timeout_seconds, 1)?;
        if let Some(token) = &self.mapbox.token {
            validation::validate_non_empty_string("mapbox.token", token)?;
        }
        validation::validate_positive_number("cache.max_capacity", self.cache.max_capacity, 1)?;
        validation::validate_positive_number("cache.ttl_seconds", self.cache.ttl_seconds, 1)?;
        self.engine.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.engine.default_budget, 15);
        assert_eq!(config.engine.max_budget(), 60);
        assert_eq!(config.engine.escalation.step, 5);
        assert_eq!(config.engine.escalation.max_escalations, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[mapbox]
base_url = "http://127.0.0.1:9000"
token = "pk.test"
timeout_seconds = 5

[engine]
default_budget = 20
candidate_strategy = "interior_point"

[engine.escalation]
step = 10
max_escalations = 3

[cache]
max_capacity = 50
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.mapbox.token(), Some("pk.test"));
        assert_eq!(config.mapbox.timeout(), Duration::from_secs(5));
        assert_eq!(config.engine.candidate_strategy, CandidateStrategy::InteriorPoint);
        assert_eq!(config.engine.escalation.step, 10);
        assert_eq!(config.engine.escalation.ceiling, 60);
        assert_eq!(config.engine.escalation.max_escalations, 3);
        assert_eq!(config.cache.max_capacity, 50);
        assert_eq!(config.cache.ttl_seconds, 24 * 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MEETPOINT_TEST_TOKEN", "pk.from-env");

        let toml_content = r#"
[mapbox]
token = "${MEETPOINT_TEST_TOKEN}"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.mapbox.token(), Some("pk.from-env"));

        std::env::remove_var("MEETPOINT_TEST_TOKEN");
    }

    #[test]
    fn test_unresolved_placeholder_is_no_token() {
        let toml_content = r#"
[mapbox]
token = "${MEETPOINT_SURELY_UNSET_VAR}"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.mapbox.token(), None);
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = TomlConfig::from_toml_str("[mapbox]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(invalid_url.validate().is_err());

        let zero_step = TomlConfig::from_toml_str("[engine.escalation]\nstep = 0\n").unwrap();
        assert!(zero_step.validate().is_err());

        let default_above_ceiling =
            TomlConfig::from_toml_str("[engine]\ndefault_budget = 45\n[engine.escalation]\nceiling = 30\n")
                .unwrap();
        assert!(default_above_ceiling.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[engine]\ntolerance_minutes = 1.0\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.engine.tolerance_minutes, 1.0);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[engine\n").unwrap_err();
        assert!(matches!(err, MeetError::Config { .. }));
    }
}
