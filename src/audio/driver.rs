use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId};
use songbird::{
    events::context_data::DisconnectReason as DriverDisconnectReason,
    id::ChannelId as VoiceChannelId,
    model::CloseCode,
    tracks::{Track as SongbirdTrack, TrackHandle},
    Call, CoreEvent, Event, Songbird, TrackEvent,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Weak,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    audio::{
        connection::{
            ConnectionState, ConnectionStateCell, ConnectionStatus, DisconnectReason,
            VoiceConnection, VoiceGateway, VoiceSession, KICK_OR_MOVE_CLOSE_CODE,
        },
        error::PlaybackError,
        events::EventSink,
        player::{AudioPlayer, AudioResource, PlayerKind, PlayerStatus, PlayerStatusCell},
    },
    bot::events::{ConnectionEvents, PlayerTrackEvents},
};

/// Abre conexiones de voz con songbird.
pub struct SongbirdGateway {
    manager: Arc<Songbird>,
}

impl SongbirdGateway {
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl VoiceGateway for SongbirdGateway {
    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        sink: EventSink,
    ) -> Result<VoiceSession, PlaybackError> {
        let call = self
            .manager
            .join(guild_id, channel_id)
            .await
            .map_err(|e| PlaybackError::Join(e.to_string()))?;

        let main = SongbirdPlayer::new(PlayerKind::Main, call.clone(), sink.clone());
        let announcer = SongbirdPlayer::new(PlayerKind::Announcement, call.clone(), sink.clone());

        let connection = Arc::new(SongbirdConnection {
            guild_id,
            channel: CurrentChannel::new(channel_id),
            manager: self.manager.clone(),
            call: call.clone(),
            cell: ConnectionStateCell::new(ConnectionState::new(ConnectionStatus::Ready), sink),
            main: main.clone(),
            announcer: announcer.clone(),
        });

        {
            let mut handler = call.lock().await;
            // Un Call reutilizado conserva los handlers de la conexión anterior
            handler.remove_all_global_events();
            for event in [
                CoreEvent::DriverConnect,
                CoreEvent::DriverReconnect,
                CoreEvent::DriverDisconnect,
            ] {
                handler.add_global_event(
                    Event::Core(event),
                    ConnectionEvents {
                        connection: Arc::downgrade(&connection),
                    },
                );
            }
        }

        info!("🔊 Conectado a canal {} en guild {}", channel_id, guild_id);
        Ok(VoiceSession {
            connection,
            main,
            announcer,
        })
    }
}

/// Canal de voz en el que está el bot. Si lo mueven, songbird reconecta el
/// driver en el canal nuevo y lo informa en el evento de conexión.
#[derive(Debug)]
struct CurrentChannel(Mutex<ChannelId>);

impl CurrentChannel {
    fn new(channel_id: ChannelId) -> Self {
        Self(Mutex::new(channel_id))
    }

    fn get(&self) -> ChannelId {
        *self.0.lock()
    }

    /// Devuelve `true` si el canal cambió.
    fn follow(&self, reported: Option<VoiceChannelId>) -> bool {
        let Some(reported) = reported else {
            return false;
        };
        let reported = ChannelId::new(reported.0.get());
        let mut current = self.0.lock();
        if *current == reported {
            return false;
        }
        *current = reported;
        true
    }
}

/// Conexión de voz de songbird.
///
/// songbird mezcla todos los tracks de un `Call`; el reproductor que no está
/// suscrito queda silenciado en lugar de desconectado.
pub struct SongbirdConnection {
    guild_id: GuildId,
    channel: CurrentChannel,
    manager: Arc<Songbird>,
    call: Arc<tokio::sync::Mutex<Call>>,
    cell: ConnectionStateCell,
    main: Arc<SongbirdPlayer>,
    announcer: Arc<SongbirdPlayer>,
}

impl SongbirdConnection {
    /// `channel` es el canal que reporta el driver al conectar, si lo sabe.
    pub fn on_driver_ready(&self, channel: Option<VoiceChannelId>) {
        if self.channel.follow(channel) {
            info!(
                "🔀 Guild {}: ahora en el canal {}",
                self.guild_id,
                self.channel.get()
            );
        }
        if self.cell.get().status != ConnectionStatus::Ready {
            self.cell.set(ConnectionState::new(ConnectionStatus::Ready));
        }
    }

    pub fn on_driver_disconnect(&self, reason: Option<DriverDisconnectReason>) {
        let current = self.cell.get();
        let already_final = current.status == ConnectionStatus::Destroyed
            || current.reason == Some(DisconnectReason::Manual);
        if already_final {
            return;
        }

        let reason = match reason {
            Some(DriverDisconnectReason::WsClosed(Some(CloseCode::Disconnected))) => {
                DisconnectReason::WebSocketClose {
                    code: Some(KICK_OR_MOVE_CLOSE_CODE),
                }
            }
            Some(DriverDisconnectReason::WsClosed(_)) => {
                DisconnectReason::WebSocketClose { code: None }
            }
            _ => DisconnectReason::Transport,
        };

        warn!("🔌 Guild {}: driver de voz desconectado ({:?})", self.guild_id, reason);
        self.cell
            .set(ConnectionState::disconnected(reason, current.rejoin_attempts));
    }
}

#[async_trait]
impl VoiceConnection for SongbirdConnection {
    fn state(&self) -> ConnectionState {
        self.cell.get()
    }

    fn watch(&self) -> watch::Receiver<ConnectionState> {
        self.cell.subscribe()
    }

    fn subscribe(&self, player: PlayerKind) {
        self.main.set_audible(player == PlayerKind::Main);
        self.announcer.set_audible(player == PlayerKind::Announcement);
    }

    async fn rejoin(&self) {
        let attempts = self.cell.get().rejoin_attempts + 1;
        self.cell
            .set(ConnectionState::new(ConnectionStatus::Connecting).with_attempts(attempts));

        match self.manager.join(self.guild_id, self.channel.get()).await {
            Ok(_) => self.on_driver_ready(None),
            Err(e) => {
                warn!("❌ Guild {}: rejoin fallido: {}", self.guild_id, e);
                self.cell.set(ConnectionState::disconnected(
                    DisconnectReason::Transport,
                    attempts,
                ));
            }
        }
    }

    async fn disconnect(&self) {
        let attempts = self.cell.get().rejoin_attempts;
        self.cell
            .set(ConnectionState::disconnected(DisconnectReason::Manual, attempts));

        if let Err(e) = self.call.lock().await.leave().await {
            warn!("⚠️ Guild {}: error al salir del canal: {}", self.guild_id, e);
        }
    }

    async fn destroy(&self) {
        if self.cell.get().status == ConnectionStatus::Destroyed {
            return;
        }

        if let Err(e) = self.manager.remove(self.guild_id).await {
            debug!("Guild {}: remove: {}", self.guild_id, e);
        }
        self.cell
            .set(ConnectionState::new(ConnectionStatus::Destroyed));
    }
}

/// Reproductor sobre un `Call` de songbird. Cada `play` crea un track nuevo.
pub struct SongbirdPlayer {
    me: Weak<SongbirdPlayer>,
    call: Arc<tokio::sync::Mutex<Call>>,
    status: PlayerStatusCell,
    handle: Mutex<Option<TrackHandle>>,
    volume: Mutex<f32>,
    audible: AtomicBool,
}

impl SongbirdPlayer {
    fn new(kind: PlayerKind, call: Arc<tokio::sync::Mutex<Call>>, sink: EventSink) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            call,
            status: PlayerStatusCell::new(kind, sink),
            handle: Mutex::new(None),
            volume: Mutex::new(1.0),
            audible: AtomicBool::new(kind == PlayerKind::Main),
        })
    }

    fn effective_volume(&self) -> f32 {
        if self.audible.load(Ordering::SeqCst) {
            *self.volume.lock()
        } else {
            0.0
        }
    }

    fn apply_volume(&self) {
        if let Some(handle) = self.handle.lock().as_ref() {
            let _ = handle.set_volume(self.effective_volume());
        }
    }

    pub fn set_audible(&self, audible: bool) {
        self.audible.store(audible, Ordering::SeqCst);
        self.apply_volume();
    }

    /// Llamado por los eventos de fin/error del track. Los eventos de tracks
    /// ya reemplazados se ignoran.
    pub fn on_track_finished(&self, finished: &TrackHandle) {
        let is_current = {
            let mut handle = self.handle.lock();
            match handle.as_ref() {
                Some(current) if current.uuid() == finished.uuid() => {
                    handle.take();
                    true
                }
                _ => false,
            }
        };

        if is_current {
            self.status.set(PlayerStatus::Idle);
        }
    }
}

#[async_trait]
impl AudioPlayer for SongbirdPlayer {
    fn status(&self) -> PlayerStatus {
        self.status.get()
    }

    async fn play(&self, resource: AudioResource) {
        *self.volume.lock() = resource.volume();
        let volume = self.effective_volume();

        if let Some(previous) = self.handle.lock().take() {
            let _ = previous.stop();
        }

        self.status.set(PlayerStatus::Buffering);
        let handle = {
            let mut call = self.call.lock().await;
            call.play(SongbirdTrack::from(resource.into_input()).volume(volume))
        };

        for event in [TrackEvent::End, TrackEvent::Error] {
            if let Err(e) = handle.add_event(
                Event::Track(event),
                PlayerTrackEvents {
                    player: self.me.clone(),
                },
            ) {
                warn!("⚠️ No se pudo registrar evento de track: {}", e);
            }
        }

        *self.handle.lock() = Some(handle);
        self.status.set(PlayerStatus::Playing);
    }

    fn pause(&self) -> bool {
        if self.status.get() != PlayerStatus::Playing {
            return false;
        }
        let paused = self
            .handle
            .lock()
            .as_ref()
            .is_some_and(|handle| handle.pause().is_ok());
        paused && self.status.set(PlayerStatus::Paused)
    }

    fn unpause(&self) -> bool {
        if self.status.get() != PlayerStatus::Paused {
            return false;
        }
        let resumed = self
            .handle
            .lock()
            .as_ref()
            .is_some_and(|handle| handle.play().is_ok());
        resumed && self.status.set(PlayerStatus::Playing)
    }

    fn stop(&self) -> bool {
        let Some(handle) = self.handle.lock().take() else {
            return false;
        };
        let _ = handle.stop();
        self.status.set(PlayerStatus::Idle)
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock() = volume;
        self.apply_volume();
    }
}
