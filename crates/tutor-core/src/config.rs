//! Study configuration types and validation.
//!
//! Pure domain types: voice persona, playback rate, autoplay, and the learning
//! goals that shape the generated replies. Reading these from flags or the
//! environment is the CLI's job.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Slowest supported playback rate.
pub const MIN_PLAYBACK_RATE: f32 = 0.5;

/// Fastest supported playback rate.
pub const MAX_PLAYBACK_RATE: f32 = 2.0;

/// Rate used when nothing else is configured.
pub const DEFAULT_PLAYBACK_RATE: f32 = 1.0;

/// Prebuilt voices offered by the speech service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VoicePersona {
    #[default]
    Puck,
    Charon,
    Kore,
    Fenrir,
    Zephyr,
}

impl VoicePersona {
    /// Every persona, in display order.
    pub const ALL: [Self; 5] = [
        Self::Puck,
        Self::Charon,
        Self::Kore,
        Self::Fenrir,
        Self::Zephyr,
    ];

    /// Voice name as the speech service expects it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Puck => "Puck",
            Self::Charon => "Charon",
            Self::Kore => "Kore",
            Self::Fenrir => "Fenrir",
            Self::Zephyr => "Zephyr",
        }
    }
}

impl std::fmt::Display for VoicePersona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoicePersona {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownVoice(s.to_string()))
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Playback rate must be between 0.5 and 2.0, got {0}")]
    RateOutOfRange(f32),

    #[error("Unknown voice '{0}' (expected one of Puck, Charon, Kore, Fenrir, Zephyr)")]
    UnknownVoice(String),
}

/// Clamp a rate into the supported range. Non-finite input falls back to the
/// default rate.
#[must_use]
pub fn clamp_rate(rate: f32) -> f32 {
    if rate.is_finite() {
        rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE)
    } else {
        DEFAULT_PLAYBACK_RATE
    }
}

/// Validate a user-supplied rate without clamping it.
pub fn validate_rate(rate: f32) -> Result<f32, ConfigError> {
    if rate.is_finite() && (MIN_PLAYBACK_RATE..=MAX_PLAYBACK_RATE).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::RateOutOfRange(rate))
    }
}

fn deserialize_rate<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    f32::deserialize(deserializer).map(clamp_rate)
}

/// Process-wide study configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyConfig {
    /// Voice used for synthesis.
    pub voice: VoicePersona,

    /// Playback rate multiplier, kept within `[0.5, 2.0]`.
    #[serde(deserialize_with = "deserialize_rate")]
    speed: f32,

    /// Play replies automatically once their audio is ready.
    pub auto_play: bool,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            voice: VoicePersona::default(),
            speed: DEFAULT_PLAYBACK_RATE,
            auto_play: true,
        }
    }
}

impl StudyConfig {
    #[must_use]
    pub fn new(voice: VoicePersona, speed: f32, auto_play: bool) -> Self {
        Self {
            voice,
            speed: clamp_rate(speed),
            auto_play,
        }
    }

    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the playback rate, clamping into the supported range.
    /// Returns the rate actually stored.
    pub fn set_speed(&mut self, speed: f32) -> f32 {
        self.speed = clamp_rate(speed);
        self.speed
    }
}

/// What the learner wants out of the session; feeds the generation prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserGoals {
    pub objectives: String,
    pub knowledge_base: String,
}

impl UserGoals {
    #[must_use]
    pub fn new(objectives: impl Into<String>, knowledge_base: impl Into<String>) -> Self {
        Self {
            objectives: objectives.into(),
            knowledge_base: knowledge_base.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StudyConfig::default();
        assert_eq!(config.voice, VoicePersona::Puck);
        assert!((config.speed() - 1.0).abs() < f32::EPSILON);
        assert!(config.auto_play);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut config = StudyConfig::default();
        assert!((config.set_speed(3.0) - MAX_PLAYBACK_RATE).abs() < f32::EPSILON);
        assert!((config.set_speed(0.1) - MIN_PLAYBACK_RATE).abs() < f32::EPSILON);
        assert!((config.set_speed(f32::NAN) - DEFAULT_PLAYBACK_RATE).abs() < f32::EPSILON);
        assert!((config.set_speed(1.5) - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validate_rate() {
        assert_eq!(validate_rate(0.5), Ok(0.5));
        assert_eq!(validate_rate(2.0), Ok(2.0));
        assert_eq!(validate_rate(2.5), Err(ConfigError::RateOutOfRange(2.5)));
        assert!(validate_rate(f32::INFINITY).is_err());
    }

    #[test]
    fn test_voice_parse_is_case_insensitive() {
        assert_eq!("kore".parse::<VoicePersona>(), Ok(VoicePersona::Kore));
        assert_eq!(" Zephyr ".parse::<VoicePersona>(), Ok(VoicePersona::Zephyr));
        assert_eq!(
            "alloy".parse::<VoicePersona>(),
            Err(ConfigError::UnknownVoice("alloy".to_string()))
        );
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: StudyConfig = serde_json::from_str(r#"{"voice":"Fenrir"}"#).unwrap();
        assert_eq!(config.voice, VoicePersona::Fenrir);
        assert!(config.auto_play);
        assert!((config.speed() - 1.0).abs() < f32::EPSILON);

        let fast: StudyConfig = serde_json::from_str(r#"{"speed":4.0}"#).unwrap();
        assert!((fast.speed() - MAX_PLAYBACK_RATE).abs() < f32::EPSILON);
    }
}
