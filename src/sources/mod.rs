pub mod lookup;
pub mod resolver;
pub mod speech;

use async_trait::async_trait;

use crate::audio::{error::PlaybackError, player::AudioResource, track::{SourceKind, Track}};

pub use lookup::TrackLookup;
pub use resolver::SongbirdResolver;
pub use speech::GoogleTts;

/// Convierte un [`Track`] en audio reproducible.
///
/// Cada llamada debe devolver un recurso nuevo; la suscripción vuelve a
/// resolver el mismo track para repetirlo o reiniciarlo.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, track: &Track) -> Result<AudioResource, PlaybackError>;
}

/// Texto a voz para los anuncios.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioResource, PlaybackError>;
}

const YOUTUBE_PREFIXES: &[&str] = &[
    "http://youtube.com/",
    "https://youtube.com/",
    "http://www.youtube.com/",
    "https://www.youtube.com/",
    "http://m.youtube.com/",
    "https://m.youtube.com/",
    "http://youtu.be/",
    "https://youtu.be/",
];

const SOUNDCLOUD_PREFIXES: &[&str] = &["http://soundcloud.com/", "https://soundcloud.com/"];

const NEWGROUNDS_PREFIXES: &[&str] = &["https://www.newgrounds.com/audio/listen/"];

fn has_prefix(input: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| input.starts_with(prefix))
}

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Clasifica lo que escribió el usuario.
///
/// Cualquier cosa que no sea una URL se trata como búsqueda en YouTube; una
/// URL que no reconocemos se intenta reproducir como archivo directo.
pub fn determine_source_kind(input: &str) -> SourceKind {
    let input = input.trim();

    if !is_url(input) {
        return SourceKind::YouTube;
    }

    if has_prefix(input, YOUTUBE_PREFIXES) {
        return if input.contains("playlist?list=") {
            SourceKind::YouTubePlaylist
        } else {
            SourceKind::YouTube
        };
    }

    if has_prefix(input, SOUNDCLOUD_PREFIXES) {
        SourceKind::SoundCloud
    } else if has_prefix(input, NEWGROUNDS_PREFIXES) {
        SourceKind::Newgrounds
    } else if input.starts_with("https://open.spotify.com/track/") {
        SourceKind::SpotifyTrack
    } else if input.starts_with("https://open.spotify.com/album/") {
        SourceKind::SpotifyAlbum
    } else if input.starts_with("https://open.spotify.com/playlist/") {
        SourceKind::SpotifyPlaylist
    } else {
        SourceKind::DirectFile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_free_text_is_a_youtube_search() {
        assert_eq!(determine_source_kind("never gonna give you up"), SourceKind::YouTube);
        assert_eq!(determine_source_kind("  ftp-ish words  "), SourceKind::YouTube);
    }

    #[test]
    fn test_youtube_urls() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
        ] {
            assert_eq!(determine_source_kind(url), SourceKind::YouTube, "{url}");
        }

        assert_eq!(
            determine_source_kind("https://www.youtube.com/playlist?list=PL123"),
            SourceKind::YouTubePlaylist
        );
    }

    #[test]
    fn test_other_services() {
        assert_eq!(
            determine_source_kind("https://soundcloud.com/artist/song"),
            SourceKind::SoundCloud
        );
        assert_eq!(
            determine_source_kind("https://www.newgrounds.com/audio/listen/12345"),
            SourceKind::Newgrounds
        );
        assert_eq!(
            determine_source_kind("https://open.spotify.com/track/abc"),
            SourceKind::SpotifyTrack
        );
        assert_eq!(
            determine_source_kind("https://open.spotify.com/album/abc"),
            SourceKind::SpotifyAlbum
        );
        assert_eq!(
            determine_source_kind("https://open.spotify.com/playlist/abc"),
            SourceKind::SpotifyPlaylist
        );
    }

    #[test]
    fn test_unknown_urls_are_direct_files() {
        assert_eq!(
            determine_source_kind("https://example.com/music/song.mp3"),
            SourceKind::DirectFile
        );
        // Sin "www." no coincide con los prefijos de Newgrounds
        assert_eq!(
            determine_source_kind("https://newgrounds.com/audio/listen/1"),
            SourceKind::DirectFile
        );
    }
}
