use async_trait::async_trait;
use parking_lot::Mutex;
use songbird::input::Input;
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};
use tracing::debug;

use crate::audio::{
    events::{EventSink, SubscriptionEvent},
    track::Track,
};

/// Estado visible de un reproductor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Idle,
    Buffering,
    Playing,
    Paused,
}

/// Cada suscripción tiene dos reproductores: la música y los anuncios hablados.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Main,
    Announcement,
}

/// Transición de estado de un reproductor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerEvent {
    pub kind: PlayerKind,
    pub old: PlayerStatus,
    pub new: PlayerStatus,
}

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Audio listo para entregarse a un reproductor.
///
/// Se consume al reproducirse; el volumen guardado aquí es la ganancia inicial,
/// los cambios en vivo pasan por [`AudioPlayer::set_volume`].
pub struct AudioResource {
    id: u64,
    input: Input,
    volume: f32,
    track: Option<Track>,
}

impl AudioResource {
    pub fn new(input: Input) -> Self {
        Self {
            id: NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed),
            input,
            volume: 1.0,
            track: None,
        }
    }

    pub fn with_track(mut self, track: Track) -> Self {
        self.track = Some(track);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn into_input(self) -> Input {
        self.input
    }
}

impl fmt::Debug for AudioResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioResource")
            .field("id", &self.id)
            .field("volume", &self.volume)
            .field("track", &self.track.as_ref().map(Track::title))
            .finish()
    }
}

/// Reproductor de audio controlado por la suscripción.
///
/// Las implementaciones publican cada cambio de estado con un
/// [`PlayerStatusCell`]; los métodos devuelven `false` cuando la orden no
/// aplica al estado actual (p. ej. `unpause` sin estar en pausa).
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    fn status(&self) -> PlayerStatus;
    async fn play(&self, resource: AudioResource);
    fn pause(&self) -> bool;
    fn unpause(&self) -> bool;
    fn stop(&self) -> bool;
    fn set_volume(&self, volume: f32);
}

/// Estado compartido de un reproductor que emite un evento por cada cambio.
#[derive(Debug)]
pub struct PlayerStatusCell {
    kind: PlayerKind,
    status: Mutex<PlayerStatus>,
    sink: EventSink,
}

impl PlayerStatusCell {
    pub fn new(kind: PlayerKind, sink: EventSink) -> Self {
        Self {
            kind,
            status: Mutex::new(PlayerStatus::Idle),
            sink,
        }
    }

    pub fn get(&self) -> PlayerStatus {
        *self.status.lock()
    }

    /// Cambia el estado; devuelve `false` si ya estaba en `new`.
    pub fn set(&self, new: PlayerStatus) -> bool {
        let old = std::mem::replace(&mut *self.status.lock(), new);
        if old == new {
            return false;
        }

        debug!("🎚️ Reproductor {:?}: {:?} -> {:?}", self.kind, old, new);
        self.sink.emit(SubscriptionEvent::Player(PlayerEvent {
            kind: self.kind,
            old,
            new,
        }));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_cell_emits_only_real_transitions() {
        let (sink, events) = EventSink::channel();
        let cell = PlayerStatusCell::new(PlayerKind::Main, sink);

        assert!(cell.set(PlayerStatus::Playing));
        assert!(!cell.set(PlayerStatus::Playing));
        assert!(cell.set(PlayerStatus::Idle));

        let received: Vec<_> = events.drain().collect();
        assert_eq!(
            received,
            vec![
                SubscriptionEvent::Player(PlayerEvent {
                    kind: PlayerKind::Main,
                    old: PlayerStatus::Idle,
                    new: PlayerStatus::Playing,
                }),
                SubscriptionEvent::Player(PlayerEvent {
                    kind: PlayerKind::Main,
                    old: PlayerStatus::Playing,
                    new: PlayerStatus::Idle,
                }),
            ]
        );
    }

    #[test]
    fn resources_get_distinct_ids() {
        let a = AudioResource::new(Input::from(Vec::<u8>::new()));
        let b = AudioResource::new(Input::from(Vec::<u8>::new()));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.volume(), 1.0);
    }
}
