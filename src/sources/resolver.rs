use async_trait::async_trait;
use songbird::input::{
    codecs::{get_codec_registry, get_probe},
    HttpRequest, Input, YoutubeDl,
};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

use super::MediaResolver;
use crate::audio::{
    error::PlaybackError,
    player::AudioResource,
    track::{SourceKind, Track},
};

const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolver de producción basado en los inputs de songbird.
///
/// Servicios de streaming: yt-dlp + probe de symphonia para detectar
/// contenedor y códec. Archivos directos: petición HTTP perezosa, sin probe.
pub struct SongbirdResolver {
    http: reqwest::Client,
}

impl SongbirdResolver {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn streaming_input(&self, track: &Track) -> Result<Input, PlaybackError> {
        let input = Input::from(YoutubeDl::new(self.http.clone(), track.url().to_string()));

        match timeout(
            PROBE_TIMEOUT,
            input.make_playable_async(get_codec_registry(), get_probe()),
        )
        .await
        {
            Ok(Ok(input)) => Ok(input),
            Ok(Err(e)) => Err(PlaybackError::Resolution(e.to_string())),
            Err(_) => Err(PlaybackError::Resolution(format!(
                "timeout de {}s con yt-dlp",
                PROBE_TIMEOUT.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl MediaResolver for SongbirdResolver {
    async fn resolve(&self, track: &Track) -> Result<AudioResource, PlaybackError> {
        let kind = track.audio_kind();

        let input = match kind {
            kind if kind.is_streaming() => {
                debug!("📡 Abriendo stream con yt-dlp: {}", track.url());
                self.streaming_input(track).await?
            }
            kind if kind.is_collection() => {
                return Err(PlaybackError::UnsupportedSource(kind));
            }
            SourceKind::DirectFile => {
                debug!("🌐 Abriendo archivo directo: {}", track.url());
                Input::from(HttpRequest::new(self.http.clone(), track.url().to_string()))
            }
            other => return Err(PlaybackError::UnsupportedSource(other)),
        };

        info!("✅ Audio listo para: {}", track.title());
        Ok(AudioResource::new(input))
    }
}
