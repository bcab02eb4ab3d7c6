use parking_lot::Mutex;
use serenity::model::id::{ChannelId, GuildId};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
    time::Duration,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    audio::{
        connection::{enters_any, ConnectionState, ConnectionStatus, VoiceConnection, VoiceSession},
        error::PlaybackError,
        events::SubscriptionEvent,
        notifier::{NowPlaying, NowPlayingNotifier},
        player::{AudioPlayer, AudioResource, PlayerEvent, PlayerKind, PlayerStatus},
        queue::Queue,
        supervisor::{ConnectionSupervisor, SupervisorAction},
        track::Track,
        watchdog::IdleWatchdog,
    },
    config::Config,
    sources::{MediaResolver, SpeechSynthesizer},
};

/// Parámetros de reproducción comunes a todas las guilds.
#[derive(Debug, Clone)]
pub struct PlaybackSettings {
    pub default_volume: f32,
    /// Los anuncios suenan a `volumen × multiplicador`.
    pub announcement_multiplier: f32,
    pub idle_timeout: Duration,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_volume: 1.0,
            announcement_multiplier: 1.5,
            idle_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&Config> for PlaybackSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_volume: config.default_volume_ratio(),
            announcement_multiplier: config.voice_volume_multiplier,
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
        }
    }
}

/// Colaboradores externos de una suscripción.
#[derive(Clone)]
pub struct PlaybackServices {
    pub resolver: Arc<dyn MediaResolver>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub notifier: Arc<dyn NowPlayingNotifier>,
}

#[derive(Debug)]
struct PlaybackState {
    queue: Queue,
    current: Option<Track>,
    /// Audio principal esperando a que termine el anuncio de su título.
    staged_main: Option<AudioResource>,
    /// Anuncio esperando a que el reproductor principal se pause.
    staged_announcement: Option<AudioResource>,
    volume: f32,
    autoplay: bool,
    repeat: bool,
    restart_requested: bool,
    announcement_pending: bool,
    paused_for_announcement: bool,
    show_now_playing: bool,
    text_channel: Option<ChannelId>,
    /// Se incrementa con skip/stop/restart; un audio resuelto con una época
    /// anterior se descarta.
    epoch: u64,
    terminated: bool,
}

impl PlaybackState {
    fn new(volume: f32) -> Self {
        Self {
            queue: Queue::new(),
            current: None,
            staged_main: None,
            staged_announcement: None,
            volume,
            autoplay: true,
            repeat: false,
            restart_requested: false,
            announcement_pending: false,
            paused_for_announcement: false,
            show_now_playing: true,
            text_channel: None,
            epoch: 0,
            terminated: false,
        }
    }
}

/// Reproducción de música de una guild.
///
/// Posee la conexión de voz, el reproductor principal, el de anuncios, la cola
/// y el watchdog de inactividad. Todos los cambios de estado de la conexión y
/// de los reproductores llegan por un único canal y se procesan de uno en uno
/// en una tarea propia; las esperas largas (resolver audio, timeouts,
/// backoff) se lanzan aparte para no bloquear esa tarea.
pub struct MusicSubscription {
    guild_id: GuildId,
    settings: PlaybackSettings,
    services: PlaybackServices,
    connection: Arc<dyn VoiceConnection>,
    main: Arc<dyn AudioPlayer>,
    announcer: Arc<dyn AudioPlayer>,
    supervisor: ConnectionSupervisor,
    watchdog: IdleWatchdog,
    state: Mutex<PlaybackState>,
    queue_lock: tokio::sync::Mutex<()>,
    /// Alguien pidió procesar la cola mientras `queue_lock` estaba tomado.
    queue_rerun: AtomicBool,
    ready_lock: Arc<tokio::sync::Mutex<()>>,
    closed: CancellationToken,
}

impl MusicSubscription {
    /// Crea la suscripción y arranca su bomba de eventos.
    pub fn start(
        guild_id: GuildId,
        session: VoiceSession,
        events: flume::Receiver<SubscriptionEvent>,
        services: PlaybackServices,
        settings: PlaybackSettings,
    ) -> Arc<Self> {
        let subscription = Arc::new(Self {
            guild_id,
            watchdog: IdleWatchdog::new(settings.idle_timeout),
            state: Mutex::new(PlaybackState::new(settings.default_volume)),
            settings,
            services,
            connection: session.connection,
            main: session.main,
            announcer: session.announcer,
            supervisor: ConnectionSupervisor::default(),
            queue_lock: tokio::sync::Mutex::new(()),
            queue_rerun: AtomicBool::new(false),
            ready_lock: Arc::new(tokio::sync::Mutex::new(())),
            closed: CancellationToken::new(),
        });

        subscription.connection.subscribe(PlayerKind::Main);
        tokio::spawn(Self::pump(Arc::downgrade(&subscription), events, subscription.closed.clone()));

        // El estado inicial no llega como evento
        let initial = subscription.connection.state();
        if let SupervisorAction::AwaitReady(within) = subscription.supervisor.decide(&initial) {
            subscription.guard_ready(within);
        }

        info!("🎶 Suscripción creada para guild {}", guild_id);
        subscription
    }

    async fn pump(
        subscription: Weak<Self>,
        events: flume::Receiver<SubscriptionEvent>,
        closed: CancellationToken,
    ) {
        loop {
            let event = tokio::select! {
                _ = closed.cancelled() => break,
                event = events.recv_async() => match event {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };

            let Some(subscription) = subscription.upgrade() else {
                break;
            };
            subscription.dispatch(event).await;
        }

        debug!("📭 Bomba de eventos terminada");
    }

    async fn dispatch(self: &Arc<Self>, event: SubscriptionEvent) {
        match event {
            SubscriptionEvent::Connection(state) => self.on_connection(state).await,
            SubscriptionEvent::Player(event) => match event.kind {
                PlayerKind::Main => self.on_main_player(event).await,
                PlayerKind::Announcement => self.on_announcer(event).await,
            },
        }
    }

    // ------------------------------------------------------------------
    // Conexión
    // ------------------------------------------------------------------

    async fn on_connection(self: &Arc<Self>, state: ConnectionState) {
        match self.supervisor.decide(&state) {
            SupervisorAction::AwaitMove(window) => {
                warn!(
                    "🔌 Guild {}: cierre 4014, esperando {:?} por si fue un cambio de canal",
                    self.guild_id, window
                );
                let this = Arc::clone(self);
                let rx = self.connection.watch();
                tokio::spawn(async move {
                    let moved = enters_any(
                        rx,
                        &[ConnectionStatus::Connecting, ConnectionStatus::Ready],
                        window,
                    )
                    .await;
                    match moved {
                        Ok(()) => info!("🔀 Guild {}: el bot fue movido de canal", this.guild_id),
                        Err(_) => {
                            warn!("👢 Guild {}: el bot fue expulsado del canal", this.guild_id);
                            this.connection.destroy().await;
                        }
                    }
                });
            }
            SupervisorAction::Rejoin { after } => {
                info!(
                    "🔄 Guild {}: reconectando en {:?} (intento {})",
                    self.guild_id,
                    after,
                    state.rejoin_attempts + 1
                );
                let this = Arc::clone(self);
                tokio::spawn(async move {
                    tokio::select! {
                        _ = this.closed.cancelled() => return,
                        _ = tokio::time::sleep(after) => {}
                    }
                    if this.connection.state().status == ConnectionStatus::Disconnected {
                        this.connection.rejoin().await;
                    }
                });
            }
            SupervisorAction::Destroy => {
                if state.reason.is_some() {
                    warn!(
                        "💥 Guild {}: destruyendo conexión ({:?}, {} intentos)",
                        self.guild_id, state.reason, state.rejoin_attempts
                    );
                }
                self.connection.destroy().await;
            }
            SupervisorAction::Shutdown => self.shutdown(),
            SupervisorAction::AwaitReady(within) => self.guard_ready(within),
            SupervisorAction::ProcessQueue => {
                debug!("✅ Guild {}: conexión lista", self.guild_id);
                if self.state.lock().autoplay {
                    self.kick_queue();
                }
            }
        }
    }

    /// Destruye la conexión si sigue en `Signalling`/`Connecting` después de
    /// `within`. La espera termina con cualquier salida de esos estados; una
    /// caída a `Disconnected` la resuelve el supervisor. Sólo hay una espera
    /// activa a la vez.
    fn guard_ready(self: &Arc<Self>, within: Duration) {
        let Ok(guard) = Arc::clone(&self.ready_lock).try_lock_owned() else {
            debug!("⏳ Ya hay una espera de conexión en curso");
            return;
        };

        let this = Arc::clone(self);
        let rx = self.connection.watch();
        tokio::spawn(async move {
            let _guard = guard;
            let settled = enters_any(
                rx,
                &[
                    ConnectionStatus::Ready,
                    ConnectionStatus::Disconnected,
                    ConnectionStatus::Destroyed,
                ],
                within,
            )
            .await;
            if let Err(e) = settled {
                let stuck = matches!(
                    this.connection.state().status,
                    ConnectionStatus::Signalling | ConnectionStatus::Connecting
                );
                if stuck {
                    error!("❌ Guild {}: {}", this.guild_id, e);
                    this.connection.destroy().await;
                }
            }
        });
    }

    fn shutdown(&self) {
        {
            let mut state = self.state.lock();
            if state.terminated {
                return;
            }
            state.terminated = true;
            state.autoplay = false;
            state.staged_main = None;
            state.staged_announcement = None;
        }

        self.main.pause();
        self.announcer.pause();
        self.watchdog.cancel();
        self.closed.cancel();
        info!("🛑 Suscripción de guild {} terminada", self.guild_id);
    }

    // ------------------------------------------------------------------
    // Reproductores
    // ------------------------------------------------------------------

    async fn on_main_player(self: &Arc<Self>, event: PlayerEvent) {
        match event.new {
            PlayerStatus::Idle if event.old != PlayerStatus::Idle => {
                self.arm_watchdog();
                let (autoplay, replay) = {
                    let state = self.state.lock();
                    (state.autoplay, state.repeat || state.restart_requested)
                };
                if autoplay && replay {
                    let this = Arc::clone(self);
                    tokio::spawn(async move { this.replay_current().await });
                } else if autoplay {
                    self.kick_queue();
                }
            }
            PlayerStatus::Playing => {
                self.watchdog.cancel();
                self.state.lock().restart_requested = false;
            }
            PlayerStatus::Paused => {
                let staged = {
                    let mut state = self.state.lock();
                    if state.paused_for_announcement {
                        state.staged_announcement.take()
                    } else {
                        None
                    }
                };
                if let Some(announcement) = staged {
                    self.connection.subscribe(PlayerKind::Announcement);
                    self.announcer.play(announcement).await;
                }
            }
            _ => {}
        }
    }

    async fn on_announcer(self: &Arc<Self>, event: PlayerEvent) {
        match event.new {
            PlayerStatus::Idle if event.old != PlayerStatus::Idle => {
                // Otro anuncio empezó antes de procesar este evento
                if self.announcer.status() != PlayerStatus::Idle {
                    return;
                }

                self.connection.subscribe(PlayerKind::Main);
                self.arm_watchdog();

                enum Resume {
                    Unpause,
                    Play(AudioResource),
                    Nothing,
                }

                let resume = {
                    let mut state = self.state.lock();
                    if state.paused_for_announcement {
                        state.paused_for_announcement = false;
                        Resume::Unpause
                    } else if state.announcement_pending {
                        state.announcement_pending = false;
                        match state.staged_main.take() {
                            Some(resource) if !state.terminated => Resume::Play(resource),
                            _ => Resume::Nothing,
                        }
                    } else {
                        Resume::Nothing
                    }
                };

                match resume {
                    Resume::Unpause => {
                        self.main.unpause();
                    }
                    Resume::Play(resource) => self.main.play(resource).await,
                    Resume::Nothing => {}
                }
            }
            PlayerStatus::Playing => {
                self.watchdog.cancel();
                let mut state = self.state.lock();
                if !state.terminated {
                    state.autoplay = true;
                }
            }
            _ => {}
        }
    }

    fn arm_watchdog(self: &Arc<Self>) {
        if self.state.lock().terminated {
            return;
        }

        let weak = Arc::downgrade(self);
        self.watchdog.arm(async move {
            let Some(this) = weak.upgrade() else {
                return;
            };
            if this.main.status() != PlayerStatus::Playing
                && this.announcer.status() != PlayerStatus::Playing
            {
                info!(
                    "💤 Guild {}: {}s sin reproducir, desconectando",
                    this.guild_id,
                    this.watchdog.grace().as_secs()
                );
                this.connection.disconnect().await;
            }
        });
    }

    // ------------------------------------------------------------------
    // Cola
    // ------------------------------------------------------------------

    fn kick_queue(self: &Arc<Self>) {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.process_queue().await });
    }

    /// Procesa la cola. Si ya hay otra ejecución en curso deja la petición
    /// marcada y esa ejecución da otra vuelta al terminar.
    async fn process_queue(&self) {
        let Some(mut guard) = self.claim_queue() else {
            debug!("🔒 Cola ya en proceso para guild {}", self.guild_id);
            return;
        };

        loop {
            let notification = self.drain_queue().await;
            let rerun = self.release_queue(guard);

            if let Some(info) = notification {
                self.services.notifier.now_playing(info).await;
            }
            if !rerun {
                return;
            }
            guard = match self.claim_queue() {
                Some(guard) => guard,
                None => return,
            };
        }
    }

    fn claim_queue(&self) -> Option<tokio::sync::MutexGuard<'_, ()>> {
        let guard = match self.queue_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                self.queue_rerun.store(true, Ordering::SeqCst);
                // El dueño pudo soltar el candado antes de ver la marca
                self.queue_lock.try_lock().ok()?
            }
        };
        self.queue_rerun.store(false, Ordering::SeqCst);
        Some(guard)
    }

    /// Suelta el candado de la cola; `true` si mientras estaba tomado llegó
    /// otra petición.
    fn release_queue(&self, guard: tokio::sync::MutexGuard<'_, ()>) -> bool {
        drop(guard);
        self.queue_rerun.swap(false, Ordering::SeqCst)
    }

    /// Saca tracks de la cola hasta que uno se pueda reproducir.
    ///
    /// No hace nada si el reproductor principal no está en `Idle` o si un
    /// anuncio de título sigue pendiente.
    async fn drain_queue(&self) -> Option<NowPlaying> {
        enum Next {
            Main(AudioResource),
            Announce(AudioResource),
        }

        loop {
            let (track, epoch) = {
                let mut state = self.state.lock();
                if state.terminated
                    || state.announcement_pending
                    || self.main.status() != PlayerStatus::Idle
                {
                    return None;
                }
                match state.queue.dequeue() {
                    Ok(track) => (track, state.epoch),
                    Err(_) => {
                        state.current = None;
                        return None;
                    }
                }
            };

            let mut resource = match track.resolve_audio(self.services.resolver.as_ref()).await {
                Ok(resource) => resource,
                Err(e) => {
                    self.report_failure(track, &e);
                    continue;
                }
            };

            let announcement = if track.announce() {
                let text = format!("Now playing: {}", track.title());
                match self.services.speech.synthesize(&text).await {
                    Ok(announcement) => Some(announcement),
                    Err(e) => {
                        warn!("🗣️ Sin anuncio para {}: {}", track.title(), e);
                        None
                    }
                }
            } else {
                None
            };

            let (next, notification) = {
                let mut state = self.state.lock();
                if state.terminated {
                    return None;
                }
                if state.epoch != epoch {
                    debug!("🗑️ Descartado {}: se pidió otra cosa mientras cargaba", track.title());
                    if state.autoplay {
                        continue;
                    }
                    return None;
                }

                resource.set_volume(state.volume);
                state.current = Some(track.clone());
                let notification = state.show_now_playing.then(|| NowPlaying {
                    guild_id: self.guild_id,
                    text_channel: state.text_channel,
                    track: track.clone(),
                    queue_len: state.queue.len(),
                    volume: state.volume,
                    repeat: state.repeat,
                });

                let next = match announcement {
                    Some(mut announcement) => {
                        announcement
                            .set_volume(state.volume * self.settings.announcement_multiplier);
                        state.staged_main = Some(resource);
                        state.announcement_pending = true;
                        Next::Announce(announcement)
                    }
                    None => Next::Main(resource),
                };
                (next, notification)
            };

            match next {
                Next::Announce(announcement) => {
                    self.connection.subscribe(PlayerKind::Announcement);
                    self.announcer.play(announcement).await;
                }
                Next::Main(resource) => self.main.play(resource).await,
            }

            info!("▶️ Guild {}: reproduciendo {}", self.guild_id, track.title());
            return notification;
        }
    }

    /// Vuelve a resolver y reproducir el track actual (repeat / restart).
    async fn replay_current(&self) {
        let (fall_back_to_queue, rerun) = {
            let Ok(guard) = self.queue_lock.try_lock() else {
                return;
            };
            let fall_back = self.replay_locked().await;
            (fall_back, self.release_queue(guard))
        };

        if fall_back_to_queue || rerun {
            self.process_queue().await;
        }
    }

    async fn replay_locked(&self) -> bool {
        let (track, epoch) = {
            let state = self.state.lock();
            if state.terminated || self.main.status() != PlayerStatus::Idle {
                return false;
            }
            match state.current.clone() {
                Some(track) => (track, state.epoch),
                None => return true,
            }
        };

        match track.resolve_audio(self.services.resolver.as_ref()).await {
            Ok(mut resource) => {
                {
                    let state = self.state.lock();
                    if state.terminated {
                        return false;
                    }
                    if state.epoch != epoch {
                        return state.autoplay;
                    }
                    resource.set_volume(state.volume);
                }
                debug!("🔁 Repitiendo: {}", track.title());
                self.main.play(resource).await;
                false
            }
            Err(e) => {
                self.state.lock().restart_requested = false;
                self.report_failure(track, &e);
                true
            }
        }
    }

    fn report_failure(&self, track: Track, e: &PlaybackError) {
        warn!(
            "⚠️ Guild {}: saltando {} ({})",
            self.guild_id,
            track.title(),
            e
        );
        let notifier = Arc::clone(&self.services.notifier);
        let guild_id = self.guild_id;
        let channel = self.state.lock().text_channel;
        let error = e.to_string();
        tokio::spawn(async move {
            notifier
                .resolution_failed(guild_id, channel, track, error)
                .await;
        });
    }

    // ------------------------------------------------------------------
    // API pública
    // ------------------------------------------------------------------

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// Agrega al final de la cola. Devuelve la posición del track.
    pub fn enqueue(self: &Arc<Self>, track: Track) -> Result<usize, PlaybackError> {
        let position = {
            let mut state = self.state.lock();
            if state.terminated {
                return Err(PlaybackError::Terminated(self.guild_id));
            }
            state.queue.enqueue(track);
            state.queue.len()
        };
        self.kick_queue();
        Ok(position)
    }

    /// Agrega al principio de la cola.
    pub fn play_next(self: &Arc<Self>, track: Track) -> Result<usize, PlaybackError> {
        {
            let mut state = self.state.lock();
            if state.terminated {
                return Err(PlaybackError::Terminated(self.guild_id));
            }
            state.queue.play_next(track);
        }
        self.kick_queue();
        Ok(1)
    }

    pub fn shuffle(&self) {
        self.state.lock().queue.shuffle();
    }

    pub fn queue_snapshot(&self) -> Vec<Track> {
        self.state.lock().queue.snapshot()
    }

    pub fn queue_len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn queue_duration(&self) -> Duration {
        self.state.lock().queue.total_duration()
    }

    pub fn now_playing(&self) -> Option<Track> {
        self.state.lock().current.clone()
    }

    /// Detiene todo y se desconecta. La suscripción no se reutiliza después.
    pub async fn stop(&self) {
        {
            let mut state = self.state.lock();
            state.autoplay = false;
            state.epoch += 1;
        }
        self.main.stop();
        self.connection.disconnect().await;
        info!("⏹️ Guild {}: reproducción detenida", self.guild_id);
    }

    pub fn pause(&self) -> bool {
        self.main.pause()
    }

    /// Reanuda si está en pausa; si no, intenta empezar con la cola.
    pub fn play(self: &Arc<Self>) {
        if self.main.status() == PlayerStatus::Paused {
            self.main.unpause();
        } else {
            self.state.lock().paused_for_announcement = false;
            self.kick_queue();
        }
    }

    pub fn skip(self: &Arc<Self>) {
        let dropped_announcement = {
            let mut state = self.state.lock();
            state.epoch += 1;
            if state.announcement_pending {
                state.announcement_pending = false;
                state.staged_main = None;
                true
            } else {
                false
            }
        };

        if dropped_announcement {
            self.announcer.stop();
            self.connection.subscribe(PlayerKind::Main);
            self.kick_queue();
            return;
        }

        match self.main.status() {
            PlayerStatus::Idle => self.play(),
            PlayerStatus::Paused => {
                self.main.unpause();
                self.main.stop();
            }
            _ => {
                self.main.stop();
            }
        }
    }

    /// Vuelve a empezar el track actual.
    ///
    /// Con el reproductor en `Idle` no se invalida nada: si el siguiente track
    /// ya se está cargando, sigue siendo el que suena.
    pub fn restart(self: &Arc<Self>) {
        let has_current = {
            let mut state = self.state.lock();
            state.restart_requested = true;
            if self.main.status() != PlayerStatus::Idle {
                state.epoch += 1;
            }
            state.current.is_some() && !state.announcement_pending
        };

        if !self.main.stop() && has_current {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.replay_current().await });
        }
    }

    /// Cambia el volumen del audio actual, del anuncio y de lo que esté
    /// preparado para sonar.
    pub fn set_volume(&self, volume: f32) -> Result<(), PlaybackError> {
        if !volume.is_finite() || volume <= 0.0 {
            return Err(PlaybackError::InvalidVolume(volume));
        }

        let announcement_volume = volume * self.settings.announcement_multiplier;
        {
            let mut state = self.state.lock();
            state.volume = volume;
            if let Some(resource) = state.staged_main.as_mut() {
                resource.set_volume(volume);
            }
            if let Some(resource) = state.staged_announcement.as_mut() {
                resource.set_volume(announcement_volume);
            }
        }

        self.main.set_volume(volume);
        self.announcer.set_volume(announcement_volume);
        info!("🔊 Guild {}: volumen {:.2}", self.guild_id, volume);
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    pub fn set_repeat(&self, repeat: bool) {
        self.state.lock().repeat = repeat;
    }

    pub fn repeat(&self) -> bool {
        self.state.lock().repeat
    }

    pub fn set_now_playing_display(&self, show: bool) {
        self.state.lock().show_now_playing = show;
    }

    pub fn set_text_channel(&self, channel: ChannelId) {
        self.state.lock().text_channel = Some(channel);
    }

    /// Sintetiza `text` y lo reproduce por encima de la música.
    pub async fn announce(&self, text: &str) -> Result<(), PlaybackError> {
        let resource = self.services.speech.synthesize(text).await?;
        self.play_voice(resource).await;
        Ok(())
    }

    /// Reproduce un audio de voz. Si hay música sonando, la pausa y la
    /// reanuda cuando termina la voz.
    pub async fn play_voice(&self, mut resource: AudioResource) {
        let ducking = {
            let mut state = self.state.lock();
            if state.terminated {
                return;
            }
            resource.set_volume(state.volume * self.settings.announcement_multiplier);
            if self.main.status() == PlayerStatus::Playing {
                state.staged_announcement = Some(resource);
                state.paused_for_announcement = true;
                None
            } else {
                Some(resource)
            }
        };

        match ducking {
            None => {
                debug!("🦆 Pausando la música para un anuncio");
                self.main.pause();
            }
            Some(resource) => {
                self.connection.subscribe(PlayerKind::Announcement);
                self.announcer.play(resource).await;
            }
        }
    }

    /// Destruye la conexión y termina la suscripción.
    pub async fn destroy(&self) {
        self.connection.destroy().await;
        self.shutdown();
    }

    /// Se cancela cuando la suscripción termina.
    pub fn termination(&self) -> CancellationToken {
        self.closed.clone()
    }

    pub fn is_terminated(&self) -> bool {
        self.state.lock().terminated
    }

    pub fn is_playing(&self) -> bool {
        self.main.status() == PlayerStatus::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.main.status() == PlayerStatus::Paused
    }

    pub fn is_idle(&self) -> bool {
        self.main.status() == PlayerStatus::Idle
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection.state().status
    }
}

impl Drop for MusicSubscription {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}
