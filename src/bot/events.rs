use serenity::async_trait;
use songbird::{Event as VoiceEvent, EventContext, EventHandler as VoiceEventHandler};
use std::sync::Weak;
use tracing::{debug, error};

use crate::audio::driver::{SongbirdConnection, SongbirdPlayer};

/// Handler para fin y errores de los tracks de un reproductor
pub struct PlayerTrackEvents {
    pub player: Weak<SongbirdPlayer>,
}

#[async_trait]
impl VoiceEventHandler for PlayerTrackEvents {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<VoiceEvent> {
        let Some(player) = self.player.upgrade() else {
            return Some(VoiceEvent::Cancel);
        };

        if let EventContext::Track(track_list) = ctx {
            for (state, handle) in *track_list {
                if state.playing.is_done() {
                    debug!("🎵 Track terminado: {:?}", state.playing);
                } else {
                    error!("❌ Error en track: {:?}", state.playing);
                }
                player.on_track_finished(handle);
            }
        }

        None
    }
}

/// Handler para los eventos del driver de voz (conexión, reconexión y
/// desconexión)
pub struct ConnectionEvents {
    pub connection: Weak<SongbirdConnection>,
}

#[async_trait]
impl VoiceEventHandler for ConnectionEvents {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<VoiceEvent> {
        let Some(connection) = self.connection.upgrade() else {
            return Some(VoiceEvent::Cancel);
        };

        match ctx {
            EventContext::DriverConnect(data) | EventContext::DriverReconnect(data) => {
                connection.on_driver_ready(data.channel_id);
            }
            EventContext::DriverDisconnect(data) => {
                connection.on_driver_disconnect(data.reason.clone());
            }
            _ => {}
        }

        None
    }
}
