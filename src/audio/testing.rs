//! Transportes, reproductores y colaboradores en memoria para los tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId};
use songbird::input::Input;
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::{watch, Semaphore};

use crate::{
    audio::{
        connection::{
            ConnectionState, ConnectionStateCell, ConnectionStatus, DisconnectReason,
            VoiceConnection, VoiceGateway, VoiceSession,
        },
        error::PlaybackError,
        events::EventSink,
        notifier::{NowPlaying, NowPlayingNotifier},
        player::{AudioPlayer, AudioResource, PlayerKind, PlayerStatus, PlayerStatusCell},
        subscription::{MusicSubscription, PlaybackServices, PlaybackSettings},
        track::{SourceKind, Track},
    },
    sources::{MediaResolver, SpeechSynthesizer},
};

pub fn track(name: &str) -> Track {
    Track::new(
        SourceKind::YouTube,
        SourceKind::YouTube,
        format!("https://youtu.be/{name}"),
        name,
        "tester",
    )
}

fn silence() -> AudioResource {
    AudioResource::new(Input::from(Vec::<u8>::new()))
}

/// Deja correr todas las tareas pendientes (con el reloj pausado el runtime
/// sólo avanza el tiempo cuando no queda nada listo).
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

// ----------------------------------------------------------------------
// Resolver / síntesis
// ----------------------------------------------------------------------

#[derive(Default)]
pub struct FakeResolver {
    failing: HashSet<String>,
    gate: Option<Arc<Semaphore>>,
    resolved: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Los tracks con estos títulos fallan al resolverse.
    pub fn failing<'a>(mut self, titles: impl IntoIterator<Item = &'a str>) -> Self {
        self.failing.extend(titles.into_iter().map(str::to_string));
        self
    }

    /// Cada resolución espera un permiso del semáforo.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Títulos que se intentaron resolver, en orden.
    pub fn resolved(&self) -> Vec<String> {
        self.resolved.lock().clone()
    }
}

#[async_trait]
impl MediaResolver for FakeResolver {
    async fn resolve(&self, track: &Track) -> Result<AudioResource, PlaybackError> {
        self.resolved.lock().push(track.title().to_string());

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        if self.failing.contains(track.title()) {
            return Err(PlaybackError::Resolution(format!("{} no existe", track.title())));
        }
        Ok(silence())
    }
}

#[derive(Default)]
pub struct FakeSpeech {
    fail: AtomicBool,
    texts: Mutex<Vec<String>>,
}

impl FakeSpeech {
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioResource, PlaybackError> {
        self.texts.lock().push(text.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(PlaybackError::Synthesis("sin servicio".to_string()));
        }
        Ok(silence())
    }
}

/// Notificador que no hace nada.
pub struct QuietNotifier;

#[async_trait]
impl NowPlayingNotifier for QuietNotifier {
    async fn now_playing(&self, _info: NowPlaying) {}

    async fn resolution_failed(
        &self,
        _guild_id: GuildId,
        _text_channel: Option<ChannelId>,
        _track: Track,
        _error: String,
    ) {
    }
}

// ----------------------------------------------------------------------
// Conexión
// ----------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionCall {
    Rejoin,
    Disconnect,
    Destroy,
}

pub struct FakeConnection {
    cell: ConnectionStateCell,
    calls: Mutex<Vec<ConnectionCall>>,
    bound: Mutex<PlayerKind>,
    rejoin_succeeds: AtomicBool,
}

impl FakeConnection {
    pub fn new(sink: EventSink) -> Self {
        Self::with_status(sink, ConnectionStatus::Ready)
    }

    pub fn with_status(sink: EventSink, status: ConnectionStatus) -> Self {
        Self {
            cell: ConnectionStateCell::new(ConnectionState::new(status), sink),
            calls: Mutex::new(Vec::new()),
            bound: Mutex::new(PlayerKind::Main),
            rejoin_succeeds: AtomicBool::new(false),
        }
    }

    pub fn transition(&self, state: ConnectionState) {
        self.cell.set(state);
    }

    pub fn set_rejoin_succeeds(&self, succeeds: bool) {
        self.rejoin_succeeds.store(succeeds, Ordering::SeqCst);
    }

    pub fn count(&self, call: ConnectionCall) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    pub fn bound(&self) -> PlayerKind {
        *self.bound.lock()
    }
}

#[async_trait]
impl VoiceConnection for FakeConnection {
    fn state(&self) -> ConnectionState {
        self.cell.get()
    }

    fn watch(&self) -> watch::Receiver<ConnectionState> {
        self.cell.subscribe()
    }

    fn subscribe(&self, player: PlayerKind) {
        *self.bound.lock() = player;
    }

    /// Igual que el adaptador de songbird: pasa por `Connecting` antes de
    /// saber si el intento funcionó.
    async fn rejoin(&self) {
        self.calls.lock().push(ConnectionCall::Rejoin);
        let attempts = self.cell.get().rejoin_attempts + 1;
        self.cell
            .set(ConnectionState::new(ConnectionStatus::Connecting).with_attempts(attempts));
        if self.rejoin_succeeds.load(Ordering::SeqCst) {
            self.cell.set(ConnectionState::new(ConnectionStatus::Ready));
        } else {
            self.cell
                .set(ConnectionState::disconnected(DisconnectReason::Transport, attempts));
        }
    }

    async fn disconnect(&self) {
        self.calls.lock().push(ConnectionCall::Disconnect);
        let attempts = self.cell.get().rejoin_attempts;
        self.cell
            .set(ConnectionState::disconnected(DisconnectReason::Manual, attempts));
    }

    async fn destroy(&self) {
        self.calls.lock().push(ConnectionCall::Destroy);
        if self.cell.get().status != ConnectionStatus::Destroyed {
            self.cell.set(ConnectionState::new(ConnectionStatus::Destroyed));
        }
    }
}

// ----------------------------------------------------------------------
// Reproductores
// ----------------------------------------------------------------------

/// Lo que un reproductor falso tiene cargado.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub id: u64,
    pub volume: f32,
    pub title: Option<String>,
}

pub struct FakePlayer {
    cell: PlayerStatusCell,
    current: Mutex<Option<Loaded>>,
    played: Mutex<Vec<Loaded>>,
}

impl FakePlayer {
    pub fn new(kind: PlayerKind, sink: EventSink) -> Self {
        Self {
            cell: PlayerStatusCell::new(kind, sink),
            current: Mutex::new(None),
            played: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> Option<Loaded> {
        self.current.lock().clone()
    }

    pub fn played(&self) -> Vec<Loaded> {
        self.played.lock().clone()
    }

    pub fn played_titles(&self) -> Vec<String> {
        self.played()
            .into_iter()
            .filter_map(|loaded| loaded.title)
            .collect()
    }

    /// El audio actual llegó al final.
    pub fn finish(&self) {
        self.current.lock().take();
        self.cell.set(PlayerStatus::Idle);
    }
}

#[async_trait]
impl AudioPlayer for FakePlayer {
    fn status(&self) -> PlayerStatus {
        self.cell.get()
    }

    async fn play(&self, resource: AudioResource) {
        let loaded = Loaded {
            id: resource.id(),
            volume: resource.volume(),
            title: resource.track().map(|t| t.title().to_string()),
        };
        self.played.lock().push(loaded.clone());
        *self.current.lock() = Some(loaded);
        self.cell.set(PlayerStatus::Playing);
    }

    fn pause(&self) -> bool {
        self.cell.get() == PlayerStatus::Playing && self.cell.set(PlayerStatus::Paused)
    }

    fn unpause(&self) -> bool {
        self.cell.get() == PlayerStatus::Paused && self.cell.set(PlayerStatus::Playing)
    }

    fn stop(&self) -> bool {
        if self.cell.get() == PlayerStatus::Idle {
            return false;
        }
        self.current.lock().take();
        self.cell.set(PlayerStatus::Idle)
    }

    fn set_volume(&self, volume: f32) {
        if let Some(loaded) = self.current.lock().as_mut() {
            loaded.volume = volume;
        }
    }
}

// ----------------------------------------------------------------------
// Gateway y arnés
// ----------------------------------------------------------------------

#[derive(Clone)]
pub struct FakeSession {
    pub connection: Arc<FakeConnection>,
    pub main: Arc<FakePlayer>,
    pub announcer: Arc<FakePlayer>,
}

impl FakeSession {
    pub fn new(sink: &EventSink, status: ConnectionStatus) -> Self {
        Self {
            connection: Arc::new(FakeConnection::with_status(sink.clone(), status)),
            main: Arc::new(FakePlayer::new(PlayerKind::Main, sink.clone())),
            announcer: Arc::new(FakePlayer::new(PlayerKind::Announcement, sink.clone())),
        }
    }

    pub fn voice_session(&self) -> VoiceSession {
        VoiceSession {
            connection: self.connection.clone(),
            main: self.main.clone(),
            announcer: self.announcer.clone(),
        }
    }
}

#[derive(Default)]
pub struct FakeGateway {
    connects: AtomicUsize,
    sessions: Mutex<Vec<FakeSession>>,
}

impl FakeGateway {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn last_session(&self) -> Option<FakeSession> {
        self.sessions.lock().last().cloned()
    }
}

#[async_trait]
impl VoiceGateway for FakeGateway {
    async fn connect(
        &self,
        _guild_id: GuildId,
        _channel_id: ChannelId,
        sink: EventSink,
    ) -> Result<VoiceSession, PlaybackError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        // Da tiempo a que otra llamada concurrente llegue mientras tanto
        tokio::time::sleep(Duration::from_millis(10)).await;

        let session = FakeSession::new(&sink, ConnectionStatus::Ready);
        self.sessions.lock().push(session.clone());
        Ok(session.voice_session())
    }
}

pub fn services(
    resolver: Arc<FakeResolver>,
    speech: Arc<FakeSpeech>,
    notifier: Arc<dyn NowPlayingNotifier>,
) -> PlaybackServices {
    PlaybackServices {
        resolver,
        speech,
        notifier,
    }
}

/// Una suscripción conectada a transportes falsos.
pub struct Harness {
    pub subscription: Arc<MusicSubscription>,
    pub connection: Arc<FakeConnection>,
    pub main: Arc<FakePlayer>,
    pub announcer: Arc<FakePlayer>,
    pub resolver: Arc<FakeResolver>,
    pub speech: Arc<FakeSpeech>,
}

pub struct HarnessBuilder {
    resolver: FakeResolver,
    notifier: Arc<dyn NowPlayingNotifier>,
    status: ConnectionStatus,
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            resolver: FakeResolver::new(),
            notifier: Arc::new(QuietNotifier),
            status: ConnectionStatus::Ready,
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }
}

impl HarnessBuilder {
    pub fn resolver(mut self, resolver: FakeResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn notifier(mut self, notifier: impl NowPlayingNotifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn connection_status(mut self, status: ConnectionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Harness {
        let (sink, events) = EventSink::channel();
        let session = FakeSession::new(&sink, self.status);
        let resolver = Arc::new(self.resolver);
        let speech = Arc::new(FakeSpeech::default());

        let subscription = MusicSubscription::start(
            GuildId::new(1),
            session.voice_session(),
            events,
            services(resolver.clone(), speech.clone(), self.notifier),
            PlaybackSettings::default(),
        );

        Harness {
            subscription,
            connection: session.connection,
            main: session.main,
            announcer: session.announcer,
            resolver,
            speech,
        }
    }
}
