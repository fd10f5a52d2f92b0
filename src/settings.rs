use std::{fs, path::Path, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::db::ReminderSeed;

/// Reminders are matched per wall-clock minute; a slower tick could skip one.
pub const MAX_TICK_PERIOD_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalsSourceKind {
    Simulated,
    Ingest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorySettings {
    /// Base URL of an Ollama-compatible server.
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Language the advice (or the fallback) is spoken in.
    pub language: String,
    pub fallback_message: String,
}

impl Default for AdvisorySettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".into(),
            model: "mistral".into(),
            timeout_secs: 10,
            language: "ta".into(),
            fallback_message:
                "Sorry, I couldn't connect to the doctor AI. Please check vitals manually.".into(),
        }
    }
}

impl AdvisorySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationSettings {
    /// `None` re-alerts on every tick while a condition persists.
    pub realert_cooldown_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialSettings {
    pub prompt_probability: f64,
}

impl Default for SocialSettings {
    fn default() -> Self {
        Self {
            prompt_probability: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotifierSettings {
    /// Write notifications to the log only.
    Log,
    /// Spawn a text-to-speech program per notification. `{text}` and `{lang}`
    /// in `args` are substituted.
    Command { program: String, args: Vec<String> },
}

impl Default for NotifierSettings {
    fn default() -> Self {
        NotifierSettings::Log
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub enabled: bool,
    pub bind_addr: String,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_addr: "127.0.0.1:5000".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub tick_period_secs: u64,
    pub inactivity_threshold_secs: u64,
    pub supported_languages: Vec<String>,
    pub model_path: PathBuf,
    pub db_path: PathBuf,
    pub vitals_source: VitalsSourceKind,
    pub reminders: Vec<ReminderSeed>,
    pub advisory: AdvisorySettings,
    pub escalation: EscalationSettings,
    pub social: SocialSettings,
    pub notifier: NotifierSettings,
    pub ingest: IngestSettings,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_period_secs: 60,
            inactivity_threshold_secs: 300,
            supported_languages: vec!["ta".into(), "hi".into(), "te".into()],
            model_path: PathBuf::from("models/health_model.json"),
            db_path: PathBuf::from("db/memory.sqlite3"),
            vitals_source: VitalsSourceKind::Simulated,
            reminders: default_reminders(),
            advisory: AdvisorySettings::default(),
            escalation: EscalationSettings::default(),
            social: SocialSettings::default(),
            notifier: NotifierSettings::default(),
            ingest: IngestSettings::default(),
        }
    }
}

fn default_reminders() -> Vec<ReminderSeed> {
    [
        ("14:30", "மருந்து எடுத்துக்கொள்ளுங்கள்", "ta"),
        ("14:30", "अपनी दवाई लीजिए", "hi"),
        ("14:30", "మీ మందును తీసుకోండి", "te"),
    ]
    .into_iter()
    .map(|(time, message, language)| ReminderSeed {
        time: time.into(),
        message: message.into(),
        language: language.into(),
    })
    .collect()
}

impl MonitorConfig {
    /// Loads the config file, or defaults when `path` does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let config: MonitorConfig = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        } else {
            log::info!(
                "No config at {}, using built-in defaults",
                path.display()
            );
            MonitorConfig::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_period_secs == 0 || self.tick_period_secs > MAX_TICK_PERIOD_SECS {
            bail!(
                "tick_period_secs must be between 1 and {MAX_TICK_PERIOD_SECS}, got {}",
                self.tick_period_secs
            );
        }
        if self.inactivity_threshold_secs == 0 {
            bail!("inactivity_threshold_secs must be positive");
        }
        if self.supported_languages.is_empty() {
            bail!("supported_languages must not be empty");
        }
        if !(0.0..=1.0).contains(&self.social.prompt_probability) {
            bail!(
                "social.prompt_probability must be within [0, 1], got {}",
                self.social.prompt_probability
            );
        }
        if self.advisory.timeout_secs == 0 {
            bail!("advisory.timeout_secs must be positive");
        }
        if let NotifierSettings::Command { program, .. } = &self.notifier {
            if program.trim().is_empty() {
                bail!("notifier.program must not be empty");
            }
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(self.tick_period_secs)
    }

    pub fn inactivity_threshold(&self) -> Duration {
        Duration::from_secs(self.inactivity_threshold_secs)
    }

    pub fn realert_cooldown(&self) -> Option<Duration> {
        self.escalation.realert_cooldown_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carewatch.json");
        fs::write(
            &path,
            r#"{ "tick_period_secs": 30, "advisory": { "timeout_secs": 3 } }"#,
        )
        .unwrap();

        let config = MonitorConfig::load(&path).unwrap();
        assert_eq!(config.tick_period(), Duration::from_secs(30));
        assert_eq!(config.advisory.timeout(), Duration::from_secs(3));
        assert_eq!(config.advisory.model, "mistral");
        assert_eq!(config.inactivity_threshold(), Duration::from_secs(300));
        assert_eq!(config.reminders.len(), 3);
        assert_eq!(config.notifier, NotifierSettings::Log);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn tick_slower_than_a_minute_is_rejected() {
        let config = MonitorConfig {
            tick_period_secs: 61,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn command_notifier_parses() {
        let config: MonitorConfig = serde_json::from_str(
            r#"{ "notifier": { "kind": "command", "program": "espeak-ng", "args": ["-v", "{lang}", "{text}"] } }"#,
        )
        .unwrap();
        assert_eq!(
            config.notifier,
            NotifierSettings::Command {
                program: "espeak-ng".into(),
                args: vec!["-v".into(), "{lang}".into(), "{text}".into()],
            }
        );
    }

    #[test]
    fn probability_out_of_range_is_rejected() {
        let mut config = MonitorConfig::default();
        config.social.prompt_probability = 1.5;
        assert!(config.validate().is_err());
    }
}
