use songbird::input::{AuxMetadata, Compose, YoutubeDl};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};
use url::Url;

use super::{determine_source_kind, is_url};
use crate::audio::{
    error::PlaybackError,
    track::{SourceKind, Track},
};

const METADATA_TIMEOUT: Duration = Duration::from_secs(20);

/// Convierte lo que escribe el usuario (URL o búsqueda) en un [`Track`].
///
/// Sólo obtiene metadatos; el audio se resuelve más tarde, al reproducir.
pub struct TrackLookup {
    http: reqwest::Client,
}

impl TrackLookup {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn lookup(
        &self,
        query: &str,
        requested_by: &str,
        announce: bool,
    ) -> Result<Track, PlaybackError> {
        let query = query.trim();
        let kind = determine_source_kind(query);
        info!("🔍 Buscando track ({}): {}", kind.label(), query);

        let track = match kind {
            SourceKind::DirectFile => direct_file_track(query, requested_by),
            kind if kind.is_streaming() => {
                let metadata = self.fetch_metadata(query).await?;
                metadata_track(kind, query, requested_by, metadata)
            }
            other => {
                warn!("🚫 Fuente no soportada: {}", other.label());
                return Err(PlaybackError::UnsupportedSource(other));
            }
        };

        Ok(track.with_announce(announce))
    }

    async fn fetch_metadata(&self, query: &str) -> Result<AuxMetadata, PlaybackError> {
        let mut ytdl = if is_url(query) {
            YoutubeDl::new(self.http.clone(), query.to_string())
        } else {
            YoutubeDl::new_search(self.http.clone(), query.to_string())
        };

        match timeout(METADATA_TIMEOUT, ytdl.aux_metadata()).await {
            Ok(Ok(metadata)) => Ok(metadata),
            Ok(Err(e)) => Err(PlaybackError::Resolution(e.to_string())),
            Err(_) => Err(PlaybackError::Resolution(format!(
                "timeout buscando metadatos de '{query}'"
            ))),
        }
    }
}

fn metadata_track(kind: SourceKind, query: &str, requested_by: &str, metadata: AuxMetadata) -> Track {
    let url = metadata
        .source_url
        .clone()
        .unwrap_or_else(|| query.to_string());
    let title = metadata
        .title
        .clone()
        .unwrap_or_else(|| "Sin título".to_string());

    let mut track = Track::new(kind, kind, url.clone(), title, requested_by).with_display_url(url);

    if let Some(duration) = metadata.duration {
        track = track.with_duration(duration);
    }
    if let Some(thumbnail) = metadata.thumbnail {
        track = track.with_artwork_url(thumbnail);
    }
    if let Some(author) = metadata.artist.or(metadata.channel) {
        track = track.with_description(author);
    }
    if let Some(date) = metadata.date {
        track = track.with_uploaded(date);
    }

    track
}

/// El título de un archivo directo es el último segmento de la ruta.
fn direct_file_track(url: &str, requested_by: &str) -> Track {
    let title = Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            urlencoding::decode(&segment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or(segment)
        })
        .unwrap_or_else(|| url.to_string());

    Track::new(SourceKind::DirectFile, SourceKind::DirectFile, url, title, requested_by)
}
