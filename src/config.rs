use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    // Discord
    pub discord_token: String,
    pub application_id: u64,
    pub guild_id: Option<u64>, // Para comandos de desarrollo

    // Audio (porcentajes)
    pub default_volume: u32,
    pub min_volume: u32,
    pub max_volume: u32,
    pub voice_volume_multiplier: f32,

    // Conexión
    pub idle_timeout_secs: u64,

    // Anuncios hablados
    pub announce_language: String,
    pub tts_endpoint: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            // Discord
            discord_token: std::env::var("DISCORD_TOKEN")?,
            application_id: std::env::var("APPLICATION_ID")?.parse()?,
            guild_id: std::env::var("GUILD_ID").ok().and_then(|s| s.parse().ok()),

            // Audio
            default_volume: std::env::var("DEFAULT_VOLUME")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,
            min_volume: std::env::var("MIN_VOLUME")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
            max_volume: std::env::var("MAX_VOLUME")
                .unwrap_or_else(|_| "200".to_string())
                .parse()?,
            voice_volume_multiplier: std::env::var("VOICE_VOLUME_MULTIPLIER")
                .unwrap_or_else(|_| "1.5".to_string())
                .parse()?,

            // Conexión
            idle_timeout_secs: std::env::var("IDLE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,

            // Anuncios
            announce_language: std::env::var("ANNOUNCE_LANGUAGE")
                .unwrap_or_else(|_| "en".to_string()),
            tts_endpoint: std::env::var("TTS_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_TTS_ENDPOINT.to_string()),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validates configuration values for correctness.
    ///
    /// - Volumes are percentages with `1 <= min <= default <= max`
    /// - The announcement multiplier is finite and positive
    /// - The idle timeout is at least one second
    pub fn validate(&self) -> Result<()> {
        if self.min_volume == 0 {
            anyhow::bail!("Min volume must be at least 1%");
        }

        if self.min_volume > self.max_volume {
            anyhow::bail!(
                "Min volume ({}%) cannot exceed max volume ({}%)",
                self.min_volume,
                self.max_volume
            );
        }

        if !(self.min_volume..=self.max_volume).contains(&self.default_volume) {
            anyhow::bail!(
                "Default volume must be between {}% and {}%, got: {}%",
                self.min_volume,
                self.max_volume,
                self.default_volume
            );
        }

        if !self.voice_volume_multiplier.is_finite() || self.voice_volume_multiplier <= 0.0 {
            anyhow::bail!(
                "Voice volume multiplier must be a positive number, got: {}",
                self.voice_volume_multiplier
            );
        }

        if self.idle_timeout_secs == 0 {
            anyhow::bail!("Idle timeout must be greater than 0");
        }

        if self.announce_language.trim().is_empty() {
            anyhow::bail!("Announce language cannot be empty");
        }

        url::Url::parse(&self.tts_endpoint)
            .map_err(|e| anyhow::anyhow!("Invalid TTS endpoint {}: {}", self.tts_endpoint, e))?;

        Ok(())
    }

    /// Volumen inicial como ganancia (100% = 1.0).
    pub fn default_volume_ratio(&self) -> f32 {
        self.default_volume as f32 / 100.0
    }

    /// Ajusta un porcentaje pedido por un usuario a los límites configurados.
    pub fn clamp_volume(&self, requested: i64) -> u32 {
        requested.clamp(self.min_volume as i64, self.max_volume as i64) as u32
    }

    /// Returns a summary of the current configuration for logging.
    ///
    /// The token is never included.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Discord: App ID {} (Guild: {})\n  \
            Audio: {}% vol ({}-{}%), voz x{}\n  \
            Idle timeout: {}s\n  \
            Anuncios: {} via {}",
            self.application_id,
            self.guild_id.map_or("global".to_string(), |id| id.to_string()),
            self.default_volume,
            self.min_volume,
            self.max_volume,
            self.voice_volume_multiplier,
            self.idle_timeout_secs,
            self.announce_language,
            self.tts_endpoint,
        )
    }
}

/// Default configuration values.
///
/// Used as fallbacks when environment variables are not provided.
impl Default for Config {
    fn default() -> Self {
        Self {
            // Discord (no defaults - must be provided)
            discord_token: String::new(),
            application_id: 0,
            guild_id: None,

            default_volume: 100,
            min_volume: 1,
            max_volume: 200,
            voice_volume_multiplier: 1.5,

            idle_timeout_secs: 60,

            announce_language: "en".to_string(),
            tts_endpoint: DEFAULT_TTS_ENDPOINT.to_string(),
        }
    }
}
