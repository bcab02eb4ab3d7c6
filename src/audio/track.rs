use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    audio::{error::PlaybackError, player::AudioResource},
    sources::MediaResolver,
};

/// De dónde viene un track (y, como `audio_kind`, quién produce sus bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    DirectFile,
    YouTube,
    YouTubePlaylist,
    SoundCloud,
    Newgrounds,
    SpotifyTrack,
    SpotifyPlaylist,
    SpotifyAlbum,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::DirectFile => "Archivo",
            SourceKind::YouTube => "YouTube",
            SourceKind::YouTubePlaylist => "YouTube Playlist",
            SourceKind::SoundCloud => "SoundCloud",
            SourceKind::Newgrounds => "Newgrounds",
            SourceKind::SpotifyTrack => "Spotify",
            SourceKind::SpotifyPlaylist => "Spotify Playlist",
            SourceKind::SpotifyAlbum => "Spotify Album",
        }
    }

    /// Fuentes cuyo stream se obtiene con yt-dlp y se pasa por el probe de
    /// songbird para detectar contenedor y códec.
    pub fn is_streaming(&self) -> bool {
        matches!(
            self,
            SourceKind::YouTube | SourceKind::SoundCloud | SourceKind::Newgrounds
        )
    }

    /// Fuentes que agrupan varios tracks; nunca producen audio por sí mismas.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            SourceKind::YouTubePlaylist | SourceKind::SpotifyPlaylist | SourceKind::SpotifyAlbum
        )
    }
}

/// Descripción inmutable de algo reproducible.
///
/// Un `Track` no contiene audio: [`Track::resolve_audio`] crea un
/// [`AudioResource`] nuevo cada vez que se llama, por eso repetir o reiniciar
/// una canción vuelve a abrir el stream desde el principio.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    kind: SourceKind,
    audio_kind: SourceKind,
    url: String,
    title: String,
    requested_by: String,
    announce: bool,
    display_url: String,
    duration_secs: u64,
    artwork_url: String,
    description: String,
    genre: String,
    uploaded: String,
}

impl Track {
    pub fn new(
        kind: SourceKind,
        audio_kind: SourceKind,
        url: impl Into<String>,
        title: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            audio_kind,
            url: url.into(),
            title: title.into(),
            requested_by: requested_by.into(),
            announce: false,
            display_url: String::new(),
            duration_secs: 0,
            artwork_url: String::new(),
            description: "Not available.".to_string(),
            genre: "Unknown".to_string(),
            uploaded: "Unknown".to_string(),
        }
    }

    // Getters
    pub fn kind(&self) -> SourceKind {
        self.kind
    }
    pub fn audio_kind(&self) -> SourceKind {
        self.audio_kind
    }
    pub fn url(&self) -> &str {
        &self.url
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn requested_by(&self) -> &str {
        &self.requested_by
    }
    pub fn announce(&self) -> bool {
        self.announce
    }
    pub fn display_url(&self) -> &str {
        if self.display_url.is_empty() {
            &self.url
        } else {
            &self.display_url
        }
    }
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
    pub fn artwork_url(&self) -> Option<&str> {
        (!self.artwork_url.is_empty()).then_some(self.artwork_url.as_str())
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn genre(&self) -> &str {
        &self.genre
    }
    pub fn uploaded(&self) -> &str {
        &self.uploaded
    }

    // Setters
    pub fn with_announce(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }

    pub fn with_display_url(mut self, display_url: impl Into<String>) -> Self {
        self.display_url = display_url.into();
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_secs = duration.as_secs();
        self
    }

    pub fn with_artwork_url(mut self, artwork_url: impl Into<String>) -> Self {
        self.artwork_url = artwork_url.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_uploaded(mut self, uploaded: impl Into<String>) -> Self {
        self.uploaded = uploaded.into();
        self
    }

    /// Obtiene un recurso de audio reproducible para este track.
    ///
    /// No reintenta: si el resolver falla el error se devuelve tal cual y es
    /// la suscripción quien decide pasar al siguiente track.
    pub async fn resolve_audio(
        &self,
        resolver: &dyn MediaResolver,
    ) -> Result<AudioResource, PlaybackError> {
        debug!("🔗 Resolviendo audio ({}) para: {}", self.audio_kind.label(), self.title);

        match resolver.resolve(self).await {
            Ok(resource) => Ok(resource.with_track(self.clone())),
            Err(e) => {
                warn!("❌ No se pudo resolver {}: {}", self.title, e);
                Err(e)
            }
        }
    }
}
