use dashmap::DashMap;
use serenity::{
    model::id::{ChannelId, GuildId},
    prelude::TypeMapKey,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::audio::{
    connection::VoiceGateway,
    error::PlaybackError,
    events::EventSink,
    subscription::{MusicSubscription, PlaybackServices, PlaybackSettings},
};

type Slot = Arc<OnceCell<Arc<MusicSubscription>>>;

/// Una suscripción viva por guild.
///
/// La creación es de un solo vuelo por guild: si dos comandos llegan a la
/// vez, ambos esperan la misma conexión. Las entradas se quitan solas cuando
/// la suscripción termina.
pub struct SubscriptionRegistry {
    entries: Arc<DashMap<GuildId, Slot>>,
    gateway: Arc<dyn VoiceGateway>,
    services: PlaybackServices,
    settings: PlaybackSettings,
}

impl SubscriptionRegistry {
    pub fn new(
        gateway: Arc<dyn VoiceGateway>,
        services: PlaybackServices,
        settings: PlaybackSettings,
    ) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            gateway,
            services,
            settings,
        }
    }

    /// Devuelve la suscripción de la guild, conectándose a `channel_id` si
    /// todavía no existe.
    pub async fn get_or_create(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<MusicSubscription>, PlaybackError> {
        loop {
            let slot = self.entries.entry(guild_id).or_default().clone();

            let subscription = match slot
                .get_or_try_init(|| self.create(guild_id, channel_id))
                .await
            {
                Ok(subscription) => Arc::clone(subscription),
                Err(e) => {
                    self.entries
                        .remove_if(&guild_id, |_, current| Arc::ptr_eq(current, &slot) && !current.initialized());
                    return Err(e);
                }
            };

            if !subscription.is_terminated() {
                return Ok(subscription);
            }

            // Terminó entre medias; se reemplaza por una nueva
            self.entries
                .remove_if(&guild_id, |_, current| Arc::ptr_eq(current, &slot));
        }
    }

    async fn create(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<MusicSubscription>, PlaybackError> {
        info!("🔗 Conectando a canal {} en guild {}", channel_id, guild_id);

        let (sink, events) = EventSink::channel();
        let session = self.gateway.connect(guild_id, channel_id, sink).await?;
        let subscription = MusicSubscription::start(
            guild_id,
            session,
            events,
            self.services.clone(),
            self.settings.clone(),
        );

        let entries = Arc::clone(&self.entries);
        let termination = subscription.termination();
        let watched = Arc::downgrade(&subscription);
        tokio::spawn(async move {
            termination.cancelled().await;
            entries.remove_if(&guild_id, |_, slot| match (slot.get(), watched.upgrade()) {
                (Some(current), Some(watched)) => Arc::ptr_eq(current, &watched),
                _ => false,
            });
            debug!("🧹 Guild {} fuera del registro", guild_id);
        });

        Ok(subscription)
    }

    /// La suscripción viva de la guild, sin crearla.
    pub fn get(&self, guild_id: GuildId) -> Option<Arc<MusicSubscription>> {
        self.entries
            .get(&guild_id)
            .and_then(|slot| slot.get().cloned())
            .filter(|subscription| !subscription.is_terminated())
    }

    /// Quita la guild del registro y destruye su conexión.
    pub async fn destroy(&self, guild_id: GuildId) -> bool {
        let Some((_, slot)) = self.entries.remove(&guild_id) else {
            return false;
        };

        match slot.get() {
            Some(subscription) => {
                subscription.destroy().await;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().is_some_and(|s| !s.is_terminated()))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TypeMapKey for SubscriptionRegistry {
    type Value = Arc<SubscriptionRegistry>;
}
