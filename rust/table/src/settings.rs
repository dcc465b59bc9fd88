use mille_ai::AVAILABLE_STRATEGIES;
use mille_engine::game::DEFAULT_MATCH_TARGET;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const MAX_THINK_DELAY_MS: u64 = 10_000;

/// Knobs for the tables a [`crate::session::SessionManager`] opens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSettings {
    /// Name passed to `mille_ai::create_ai`
    pub ai_strategy: String,
    /// Pause before each automated draw and play
    pub think_delay_ms: u64,
    /// Fixed RNG seed for reproducible tables
    pub seed: Option<u64>,
    /// Cumulative score that ends a match
    pub match_target: u32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            ai_strategy: "baseline".to_string(),
            think_delay_ms: 1500,
            seed: None,
            match_target: DEFAULT_MATCH_TARGET,
        }
    }
}

impl TableSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.ai_strategy.is_empty() {
            return Err(SettingsError::InvalidValue(
                "ai_strategy cannot be empty".to_string(),
            ));
        }
        if !AVAILABLE_STRATEGIES.contains(&self.ai_strategy.as_str()) {
            return Err(SettingsError::InvalidValue(format!(
                "ai_strategy must be one of {}",
                AVAILABLE_STRATEGIES.join(", ")
            )));
        }
        if self.match_target == 0 {
            return Err(SettingsError::InvalidValue(
                "match_target must be greater than 0".to_string(),
            ));
        }
        if self.think_delay_ms > MAX_THINK_DELAY_MS {
            return Err(SettingsError::InvalidValue(format!(
                "think_delay_ms must be at most {MAX_THINK_DELAY_MS}"
            )));
        }
        Ok(())
    }

    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    #[default]
    Default,
    File,
    Env,
}

/// Where each setting came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SettingsSources {
    pub ai_strategy: ValueSource,
    pub think_delay_ms: ValueSource,
    pub seed: ValueSource,
    pub match_target: ValueSource,
}

#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub settings: TableSettings,
    pub sources: SettingsSources,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    #[error("Cannot read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    #[serde(default)]
    ai_strategy: Option<String>,
    #[serde(default)]
    think_delay_ms: Option<u64>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    match_target: Option<u32>,
}

pub fn load() -> Result<TableSettings, SettingsError> {
    load_with_sources().map(|resolved| resolved.settings)
}

/// Defaults, then the TOML file named by `MILLE_CONFIG`, then `MILLE_SEED`,
/// `MILLE_AI`, `MILLE_THINK_MS` and `MILLE_MATCH_TARGET`.
pub fn load_with_sources() -> Result<ResolvedSettings, SettingsError> {
    let mut settings = TableSettings::default();
    let mut sources = SettingsSources::default();

    if let Some(path) = env_value("MILLE_CONFIG") {
        apply_file(&mut settings, &mut sources, Path::new(&path))?;
    }

    if let Some(seed) = env_value("MILLE_SEED") {
        settings.seed = Some(parse_env("MILLE_SEED", &seed)?);
        sources.seed = ValueSource::Env;
    }
    if let Some(name) = env_value("MILLE_AI") {
        settings.ai_strategy = name;
        sources.ai_strategy = ValueSource::Env;
    }
    if let Some(delay) = env_value("MILLE_THINK_MS") {
        settings.think_delay_ms = parse_env("MILLE_THINK_MS", &delay)?;
        sources.think_delay_ms = ValueSource::Env;
    }
    if let Some(target) = env_value("MILLE_MATCH_TARGET") {
        settings.match_target = parse_env("MILLE_MATCH_TARGET", &target)?;
        sources.match_target = ValueSource::Env;
    }

    settings.validate()?;
    Ok(ResolvedSettings { settings, sources })
}

/// Reads a TOML file on top of the defaults, without looking at the environment.
pub fn load_file(path: &Path) -> Result<TableSettings, SettingsError> {
    let mut settings = TableSettings::default();
    apply_file(&mut settings, &mut SettingsSources::default(), path)?;
    settings.validate()?;
    Ok(settings)
}

fn apply_file(
    settings: &mut TableSettings,
    sources: &mut SettingsSources,
    path: &Path,
) -> Result<(), SettingsError> {
    let text = fs::read_to_string(path)?;
    let file: FileSettings = toml::from_str(&text)?;
    if let Some(v) = file.ai_strategy {
        settings.ai_strategy = v;
        sources.ai_strategy = ValueSource::File;
    }
    if let Some(v) = file.think_delay_ms {
        settings.think_delay_ms = v;
        sources.think_delay_ms = ValueSource::File;
    }
    if let Some(v) = file.seed {
        settings.seed = Some(v);
        sources.seed = ValueSource::File;
    }
    if let Some(v) = file.match_target {
        settings.match_target = v;
        sources.match_target = ValueSource::File;
    }
    Ok(())
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, SettingsError> {
    raw.trim()
        .parse()
        .map_err(|_| SettingsError::InvalidValue(format!("{key}: cannot parse {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(TableSettings::default().validate().is_ok());
        assert_eq!(TableSettings::default().think_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn validates_ai_strategy() {
        let empty = TableSettings {
            ai_strategy: String::new(),
            ..Default::default()
        };
        assert!(empty.validate().is_err());

        let unknown = TableSettings {
            ai_strategy: "oracle".into(),
            ..Default::default()
        };
        let err = unknown.validate().expect_err("unknown strategy");
        assert!(err.to_string().contains("baseline, random"));

        let random = TableSettings {
            ai_strategy: "random".into(),
            ..Default::default()
        };
        assert!(random.validate().is_ok());
    }

    #[test]
    fn validates_match_target_and_delay() {
        let zero_target = TableSettings {
            match_target: 0,
            ..Default::default()
        };
        assert!(zero_target.validate().is_err());

        let slow = TableSettings {
            think_delay_ms: MAX_THINK_DELAY_MS + 1,
            ..Default::default()
        };
        assert!(slow.validate().is_err());

        let instant = TableSettings {
            think_delay_ms: 0,
            ..Default::default()
        };
        assert!(instant.validate().is_ok());
    }

    #[test]
    fn file_settings_reject_unknown_keys() {
        let parsed: Result<FileSettings, _> = toml::from_str("think_delay = 3");
        assert!(parsed.is_err());
        let parsed: FileSettings = toml::from_str("seed = 3").expect("toml");
        assert_eq!(parsed.seed, Some(3));
        assert!(parsed.ai_strategy.is_none());
    }
}
