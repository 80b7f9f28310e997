//! Config defaults: fills every unset field after loading.

use crate::schema::{ChatConfig, LoggingConfig, VoiceConfig, WeatherWiseConfig};

pub const DEFAULT_CHAT_MIN_DELAY_MS: u64 = 500;
pub const DEFAULT_CHAT_MAX_DELAY_MS: u64 = 1500;
pub const DEFAULT_CHAT_TIMEOUT_MS: u64 = 5000;

pub const DEFAULT_VOICE_HANDSHAKE_MS: u64 = 1000;
pub const DEFAULT_VOICE_SPEAKING_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_VOICE_AUDIO_LEVEL_INTERVAL_MS: u64 = 100;
pub const DEFAULT_VOICE_GREETING_DELAY_MS: u64 = 1500;
pub const DEFAULT_VOICE_VOLUME: f32 = 0.8;

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub fn apply_all_defaults(config: WeatherWiseConfig) -> WeatherWiseConfig {
    let config = apply_chat_defaults(config);
    let config = apply_voice_defaults(config);
    apply_logging_defaults(config)
}

fn apply_chat_defaults(mut config: WeatherWiseConfig) -> WeatherWiseConfig {
    let chat = config.chat.get_or_insert_with(ChatConfig::default);
    chat.min_delay_ms.get_or_insert(DEFAULT_CHAT_MIN_DELAY_MS);
    chat.max_delay_ms.get_or_insert(DEFAULT_CHAT_MAX_DELAY_MS);
    chat.timeout_ms.get_or_insert(DEFAULT_CHAT_TIMEOUT_MS);
    config
}

fn apply_voice_defaults(mut config: WeatherWiseConfig) -> WeatherWiseConfig {
    let voice = config.voice.get_or_insert_with(VoiceConfig::default);
    voice.handshake_ms.get_or_insert(DEFAULT_VOICE_HANDSHAKE_MS);
    voice
        .speaking_interval_ms
        .get_or_insert(DEFAULT_VOICE_SPEAKING_INTERVAL_MS);
    voice
        .audio_level_interval_ms
        .get_or_insert(DEFAULT_VOICE_AUDIO_LEVEL_INTERVAL_MS);
    voice
        .greeting_delay_ms
        .get_or_insert(DEFAULT_VOICE_GREETING_DELAY_MS);
    voice.default_volume.get_or_insert(DEFAULT_VOICE_VOLUME);
    config
}

fn apply_logging_defaults(mut config: WeatherWiseConfig) -> WeatherWiseConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.as_deref().map_or(true, str::is_empty) {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    logging.json.get_or_insert(false);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_gap() {
        let cfg = apply_all_defaults(WeatherWiseConfig::default());
        let chat = cfg.chat.unwrap();
        assert_eq!(chat.min_delay_ms, Some(500));
        assert_eq!(chat.max_delay_ms, Some(1500));
        assert_eq!(chat.timeout_ms, Some(5000));

        let voice = cfg.voice.unwrap();
        assert_eq!(voice.handshake_ms, Some(1000));
        assert_eq!(voice.speaking_interval_ms, Some(2000));
        assert_eq!(voice.audio_level_interval_ms, Some(100));
        assert_eq!(voice.greeting_delay_ms, Some(1500));
        assert_eq!(voice.default_volume, Some(0.8));

        assert_eq!(cfg.logging.unwrap().level.as_deref(), Some("info"));
        assert!(cfg.providers.is_none());
    }

    #[test]
    fn keeps_explicit_values() {
        let cfg = WeatherWiseConfig {
            chat: Some(ChatConfig {
                timeout_ms: Some(100),
                ..Default::default()
            }),
            logging: Some(LoggingConfig {
                level: Some("debug".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.chat.unwrap().timeout_ms, Some(100));
        assert_eq!(cfg.logging.unwrap().level.as_deref(), Some("debug"));
    }
}
