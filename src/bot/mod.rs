//! # Bot Module
//!
//! Capa de Discord del bot:
//! - registro de comandos slash ([`commands`])
//! - despacho de comandos y botones ([`handlers`])
//! - eventos del driver de voz de songbird ([`events`])
//! - avisos de "reproduciendo ahora" en el chat ([`notifier`])
//!
//! El estado de reproducción vive en el
//! [`SubscriptionRegistry`](crate::audio::registry::SubscriptionRegistry), que
//! `main` guarda en el `TypeMap` del cliente.

use anyhow::Result;
use serenity::{
    all::{Context, EventHandler, GuildId, Interaction, Ready, VoiceState},
    async_trait,
};
use std::sync::Arc;
use tracing::{error, info, warn};

pub mod commands;
pub mod events;
pub mod handlers;
pub mod notifier;

use crate::{audio::registry::SubscriptionRegistry, config::Config, sources::TrackLookup};

/// Handler de eventos de Discord.
pub struct MusicBot {
    pub config: Arc<Config>,
    pub lookup: TrackLookup,
}

impl MusicBot {
    pub fn new(config: Config, lookup: TrackLookup) -> Self {
        Self {
            config: Arc::new(config),
            lookup,
        }
    }

    /// Registra los comandos slash: en la guild de desarrollo si hay
    /// `GUILD_ID` (se propagan al instante), si no globalmente.
    async fn register_commands(&self, ctx: &Context) -> Result<()> {
        let Some(guild_id) = self.config.guild_id.map(GuildId::new) else {
            info!("🌐 Registrando comandos globales (app {})", self.config.application_id);
            commands::register_global_commands(ctx).await.map_err(|e| {
                error!("❌ Registro global fallido: {:?}", e);
                anyhow::anyhow!("Falta el permiso 'applications.commands' o la API rechazó los comandos")
            })?;
            info!("✅ Comandos globales listos");
            return Ok(());
        };

        if !ctx.cache.guilds().contains(&guild_id) {
            warn!("⚠️ GUILD_ID {} no es una guild del bot, no se registran comandos", guild_id);
            return Ok(());
        }

        commands::register_guild_commands(ctx, guild_id)
            .await
            .map_err(|e| {
                error!("❌ Registro en guild {} fallido: {:?}", guild_id, e);
                anyhow::anyhow!("Falta el permiso 'applications.commands' en la guild {}", guild_id)
            })?;
        info!("✅ Comandos registrados en guild {}", guild_id);

        Ok(())
    }
}

#[async_trait]
impl EventHandler for MusicBot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🤖 {} está en línea!", ready.user.name);
        info!("📊 Conectado a {} servidores", ready.guilds.len());

        if let Err(e) = self.register_commands(&ctx).await {
            error!("Error al registrar comandos: {:?}", e);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command_interaction) => {
                if let Err(e) = handlers::handle_command(&ctx, command_interaction, self).await {
                    error!("Error manejando comando: {:?}", e);
                }
            }
            Interaction::Component(component_interaction) => {
                if let Err(e) = handlers::handle_component(&ctx, component_interaction, self).await
                {
                    error!("Error manejando componente: {:?}", e);
                }
            }
            _ => {}
        }
    }

    /// Si alguien saca al bot del canal de voz, la suscripción de la guild se
    /// destruye. Un movimiento a otro canal lo maneja el supervisor de la
    /// conexión.
    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let current_user_id = ctx.cache.current_user().id;
        if new.user_id != current_user_id || old.is_none() || new.channel_id.is_some() {
            return;
        }

        let Some(guild_id) = new.guild_id else {
            return;
        };

        let registry = {
            let data_read = ctx.data.read().await;
            data_read.get::<SubscriptionRegistry>().cloned()
        };

        if let Some(registry) = registry {
            if registry.destroy(guild_id).await {
                info!("🔌 Bot desconectado en guild {}, suscripción destruida", guild_id);
            }
        }
    }
}
