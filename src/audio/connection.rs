use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::debug;

use crate::audio::{
    error::PlaybackError,
    events::{EventSink, SubscriptionEvent},
    player::{AudioPlayer, PlayerKind},
};

/// Código con el que el servidor de voz cierra tanto al expulsar al bot como
/// al moverlo de canal.
pub const KICK_OR_MOVE_CLOSE_CODE: u16 = 4014;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Signalling,
    Connecting,
    Ready,
    Disconnected,
    Destroyed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// El websocket de voz se cerró desde el otro lado.
    WebSocketClose { code: Option<u16> },
    /// Timeout, IO, protocolo o un rejoin fallido.
    Transport,
    /// Nosotros pedimos la desconexión (`stop` o el watchdog).
    Manual,
}

impl DisconnectReason {
    pub fn is_kick_or_move(&self) -> bool {
        matches!(
            self,
            DisconnectReason::WebSocketClose {
                code: Some(KICK_OR_MOVE_CLOSE_CODE)
            }
        )
    }
}

/// Estado de la conexión tal y como lo publica el transporte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    pub reason: Option<DisconnectReason>,
    pub rejoin_attempts: u32,
}

impl ConnectionState {
    pub fn new(status: ConnectionStatus) -> Self {
        Self {
            status,
            reason: None,
            rejoin_attempts: 0,
        }
    }

    pub fn disconnected(reason: DisconnectReason, rejoin_attempts: u32) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            reason: Some(reason),
            rejoin_attempts,
        }
    }

    pub fn with_attempts(mut self, rejoin_attempts: u32) -> Self {
        self.rejoin_attempts = rejoin_attempts;
        self
    }
}

/// Conexión de voz de una guild.
///
/// Sólo un reproductor a la vez está suscrito a la salida de audio; cambiarlo
/// siempre es una llamada explícita a `subscribe`.
#[async_trait]
pub trait VoiceConnection: Send + Sync {
    fn state(&self) -> ConnectionState;
    fn watch(&self) -> watch::Receiver<ConnectionState>;
    fn subscribe(&self, player: PlayerKind);
    async fn rejoin(&self);
    async fn disconnect(&self);
    async fn destroy(&self);
}

/// Lo que hace falta para montar una suscripción en una guild.
pub struct VoiceSession {
    pub connection: Arc<dyn VoiceConnection>,
    pub main: Arc<dyn AudioPlayer>,
    pub announcer: Arc<dyn AudioPlayer>,
}

/// Abre sesiones de voz. En producción lo implementa songbird.
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        sink: EventSink,
    ) -> Result<VoiceSession, PlaybackError>;
}

/// Publica el estado de una conexión por dos vías: un `watch` para las esperas
/// con timeout y el canal de eventos de la suscripción, que no pierde
/// transiciones intermedias.
#[derive(Debug)]
pub struct ConnectionStateCell {
    tx: watch::Sender<ConnectionState>,
    sink: EventSink,
}

impl ConnectionStateCell {
    /// El estado inicial no se emite como evento.
    pub fn new(initial: ConnectionState, sink: EventSink) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx, sink }
    }

    pub fn get(&self) -> ConnectionState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }

    pub fn set(&self, state: ConnectionState) {
        debug!(
            "🔌 Conexión de voz -> {:?} ({:?}, intentos {})",
            state.status, state.reason, state.rejoin_attempts
        );
        self.tx.send_replace(state.clone());
        self.sink.emit(SubscriptionEvent::Connection(state));
    }
}

/// Espera a que la conexión llegue a alguno de `targets`, como mucho
/// `within`. Si ya está en uno vuelve enseguida.
pub async fn enters_any(
    mut rx: watch::Receiver<ConnectionState>,
    targets: &[ConnectionStatus],
    within: Duration,
) -> Result<(), PlaybackError> {
    let reached = rx.wait_for(|state| targets.contains(&state.status));

    match tokio::time::timeout(within, reached).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(_)) => Err(PlaybackError::ConnectionDisconnected(
            "el transporte dejó de publicar su estado".to_string(),
        )),
        Err(_) => Err(PlaybackError::ConnectionTimeout {
            status: targets.first().copied().unwrap_or(ConnectionStatus::Ready),
            after: within,
        }),
    }
}
