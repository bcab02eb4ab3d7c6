use async_trait::async_trait;
use regex::Regex;
use songbird::input::Input;
use std::{sync::LazyLock, time::Duration};
use tracing::{debug, warn};

use super::SpeechSynthesizer;
use crate::audio::{error::PlaybackError, player::AudioResource};

/// El endpoint de Google rechaza textos más largos.
const MAX_CHARS: usize = 200;

static MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:@[!&]?|#)\d+>|<a?:\w+:\d+>").expect("regex de menciones válida")
});

/// Texto a voz usando el endpoint público de Google Translate.
pub struct GoogleTts {
    http: reqwest::Client,
    endpoint: String,
    language: String,
}

impl GoogleTts {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            language: language.into(),
        }
    }

    /// Quita menciones y emojis personalizados, colapsa espacios y corta a
    /// `MAX_CHARS` caracteres.
    pub fn prepare_text(text: &str) -> String {
        let cleaned = MENTION_REGEX.replace_all(text, " ");
        let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.chars().take(MAX_CHARS).collect()
    }

    fn request_url(&self, text: &str) -> String {
        format!(
            "{}?ie=UTF-8&client=tw-ob&tl={}&q={}",
            self.endpoint,
            urlencoding::encode(&self.language),
            urlencoding::encode(text)
        )
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str) -> Result<AudioResource, PlaybackError> {
        let text = Self::prepare_text(text);
        if text.is_empty() {
            return Err(PlaybackError::Synthesis("texto vacío".to_string()));
        }

        debug!("🗣️ Sintetizando anuncio ({}): {}", self.language, text);

        let response = self
            .http
            .get(self.request_url(&text))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| PlaybackError::Synthesis(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PlaybackError::Synthesis(e.to_string()))?;

        if bytes.is_empty() {
            warn!("⚠️ El servicio de voz devolvió un cuerpo vacío");
            return Err(PlaybackError::Synthesis("respuesta vacía".to_string()));
        }

        Ok(AudioResource::new(Input::from(bytes.to_vec())))
    }
}
