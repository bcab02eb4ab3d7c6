use async_trait::async_trait;
use serenity::{
    builder::CreateMessage,
    http::Http,
    model::id::{ChannelId, GuildId},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    audio::{
        notifier::{NowPlaying, NowPlayingNotifier},
        track::Track,
    },
    ui::{buttons, embeds},
};

/// Publica los avisos de reproducción en el canal de texto de la guild.
pub struct DiscordNotifier {
    http: Arc<Http>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    async fn send(&self, channel: ChannelId, message: CreateMessage) {
        if let Err(e) = channel.send_message(&self.http, message).await {
            warn!("⚠️ No se pudo enviar mensaje al canal {}: {:?}", channel, e);
        }
    }
}

#[async_trait]
impl NowPlayingNotifier for DiscordNotifier {
    async fn now_playing(&self, info: NowPlaying) {
        let Some(channel) = info.text_channel else {
            debug!("Guild {}: sin canal de texto para anunciar", info.guild_id);
            return;
        };

        let message = CreateMessage::new()
            .embed(embeds::create_now_playing_embed(&info))
            .components(buttons::create_player_buttons(false, info.repeat));
        self.send(channel, message).await;
    }

    async fn resolution_failed(
        &self,
        guild_id: GuildId,
        text_channel: Option<ChannelId>,
        track: Track,
        error: String,
    ) {
        let Some(channel) = text_channel else {
            debug!("Guild {}: fallo de '{}' sin canal de texto", guild_id, track.title());
            return;
        };

        let embed = embeds::create_error_embed(
            "No se pudo reproducir",
            &format!("**{}**\n`{}`\n\n⏭️ Pasando a la siguiente canción", track.title(), error),
        );
        self.send(channel, CreateMessage::new().embed(embed)).await;
    }
}
