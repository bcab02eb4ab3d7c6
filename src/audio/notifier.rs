use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};

use crate::audio::track::Track;

/// Datos para el mensaje de "reproduciendo ahora".
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub guild_id: GuildId,
    pub text_channel: Option<ChannelId>,
    pub track: Track,
    pub queue_len: usize,
    pub volume: f32,
    pub repeat: bool,
}

/// Avisos hacia el chat. La suscripción nunca espera a que se entreguen para
/// seguir reproduciendo.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NowPlayingNotifier: Send + Sync {
    async fn now_playing(&self, info: NowPlaying);

    async fn resolution_failed(
        &self,
        guild_id: GuildId,
        text_channel: Option<ChannelId>,
        track: Track,
        error: String,
    );
}
