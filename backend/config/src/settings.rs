//! Runtime settings resolved from a prepared config.

use std::time::Duration;

use weatherwise_voice::{StartParams, VoiceSettings};

use crate::defaults::*;
use crate::schema::WeatherWiseConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
    pub profile: Option<String>,
}

/// Voice session timings plus the parameters passed to `start`.
#[derive(Debug, Clone)]
pub struct VoiceSetup {
    pub settings: VoiceSettings,
    pub params: StartParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
    pub dir: Option<String>,
}

impl WeatherWiseConfig {
    pub fn chat_settings(&self) -> ChatSettings {
        let chat = self.chat.clone().unwrap_or_default();
        ChatSettings {
            min_delay: Duration::from_millis(chat.min_delay_ms.unwrap_or(DEFAULT_CHAT_MIN_DELAY_MS)),
            max_delay: Duration::from_millis(chat.max_delay_ms.unwrap_or(DEFAULT_CHAT_MAX_DELAY_MS)),
            timeout: Duration::from_millis(chat.timeout_ms.unwrap_or(DEFAULT_CHAT_TIMEOUT_MS)),
            profile: chat.profile,
        }
    }

    pub fn voice_setup(&self) -> VoiceSetup {
        let voice = self.voice.clone().unwrap_or_default();
        let ms = |v: Option<u64>, default: u64| Duration::from_millis(v.unwrap_or(default));
        VoiceSetup {
            settings: VoiceSettings {
                handshake: ms(voice.handshake_ms, DEFAULT_VOICE_HANDSHAKE_MS),
                speaking_interval: ms(
                    voice.speaking_interval_ms,
                    DEFAULT_VOICE_SPEAKING_INTERVAL_MS,
                ),
                audio_level_interval: ms(
                    voice.audio_level_interval_ms,
                    DEFAULT_VOICE_AUDIO_LEVEL_INTERVAL_MS,
                ),
                greeting_delay: ms(voice.greeting_delay_ms, DEFAULT_VOICE_GREETING_DELAY_MS),
                default_volume: voice.default_volume.unwrap_or(DEFAULT_VOICE_VOLUME),
            },
            params: voice.agent_id.map(StartParams::with_agent).unwrap_or_default(),
        }
    }

    pub fn log_settings(&self) -> LogSettings {
        let logging = self.logging.clone().unwrap_or_default();
        LogSettings {
            level: logging.level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            json: logging.json.unwrap_or(false),
            dir: logging.dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::VoiceConfig;

    #[test]
    fn unset_config_uses_defaults() {
        let cfg = WeatherWiseConfig::default();
        let chat = cfg.chat_settings();
        assert_eq!(chat.min_delay, Duration::from_millis(500));
        assert_eq!(chat.timeout, Duration::from_secs(5));
        let voice = cfg.voice_setup();
        assert_eq!(voice.settings.greeting_delay, Duration::from_millis(1500));
        assert_eq!(voice.settings.default_volume, 0.8);
        assert_eq!(voice.params.agent_id, None);
        assert_eq!(cfg.log_settings().level, "info");
    }

    #[test]
    fn converts_milliseconds() {
        let cfg = WeatherWiseConfig {
            voice: Some(VoiceConfig {
                handshake_ms: Some(250),
                agent_id: Some("agent-7".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let voice = cfg.voice_setup();
        assert_eq!(voice.settings.handshake, Duration::from_millis(250));
        assert_eq!(voice.params.agent_id.as_deref(), Some("agent-7"));
    }

    #[test]
    fn every_voice_key_reaches_the_session_settings() {
        let cfg = WeatherWiseConfig {
            voice: Some(VoiceConfig {
                handshake_ms: Some(1),
                speaking_interval_ms: Some(2),
                audio_level_interval_ms: Some(3),
                greeting_delay_ms: Some(4),
                default_volume: Some(0.25),
                agent_id: None,
            }),
            ..Default::default()
        };
        let VoiceSetup { settings, .. } = cfg.voice_setup();
        assert_eq!(settings.handshake, Duration::from_millis(1));
        assert_eq!(settings.speaking_interval, Duration::from_millis(2));
        assert_eq!(settings.audio_level_interval, Duration::from_millis(3));
        assert_eq!(settings.greeting_delay, Duration::from_millis(4));
        assert_eq!(settings.default_volume, 0.25);
    }
}
