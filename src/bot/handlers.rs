use anyhow::Result;
use serenity::{
    builder::{
        CreateInteractionResponse, CreateInteractionResponseFollowup,
        CreateInteractionResponseMessage, EditInteractionResponse,
    },
    model::{
        application::{CommandInteraction, ComponentInteraction},
        id::{ChannelId, GuildId, UserId},
    },
    prelude::Context,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

use crate::{
    audio::{
        notifier::NowPlaying, registry::SubscriptionRegistry, subscription::MusicSubscription,
    },
    bot::MusicBot,
    ui::{
        buttons::{self, ButtonAction},
        embeds,
    },
};

/// Maneja comandos slash
pub async fn handle_command(
    ctx: &Context,
    command: CommandInteraction,
    bot: &MusicBot,
) -> Result<()> {
    let guild_id = command
        .guild_id
        .ok_or_else(|| anyhow::anyhow!("Comando usado fuera de un servidor"))?;

    info!(
        "📝 Comando /{} usado por {} en guild {}",
        command.data.name, command.user.name, guild_id
    );

    // Defer la respuesta: buscar metadatos o conectarse puede tardar
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new()),
        )
        .await?;

    let result = match command.data.name.as_str() {
        "play" => handle_play(ctx, &command, bot, guild_id).await,
        "playnext" => handle_playnext(ctx, &command, bot, guild_id).await,
        "pause" => handle_pause(ctx, &command, guild_id).await,
        "resume" => handle_resume(ctx, &command, guild_id).await,
        "skip" => handle_skip(ctx, &command, guild_id).await,
        "stop" => handle_stop(ctx, &command, guild_id).await,
        "restart" => handle_restart(ctx, &command, guild_id).await,
        "volume" => handle_volume(ctx, &command, bot, guild_id).await,
        "repeat" => handle_repeat(ctx, &command, guild_id).await,
        "shuffle" => handle_shuffle(ctx, &command, guild_id).await,
        "queue" => handle_queue(ctx, &command, guild_id).await,
        "nowplaying" => handle_nowplaying(ctx, &command, guild_id).await,
        "say" => handle_say(ctx, &command, guild_id).await,
        other => Err(anyhow::anyhow!("Comando no reconocido: {}", other)),
    };

    if let Err(e) = result {
        error!("❌ Error en /{}: {:?}", command.data.name, e);
        report_error(ctx, &command, &e.to_string()).await?;
    }

    Ok(())
}

/// Maneja interacciones con los botones del reproductor
pub async fn handle_component(
    ctx: &Context,
    component: ComponentInteraction,
    _bot: &MusicBot,
) -> Result<()> {
    let guild_id = component
        .guild_id
        .ok_or_else(|| anyhow::anyhow!("Componente usado fuera de un servidor"))?;

    info!(
        "🔘 Botón {} presionado por {} en guild {}",
        component.data.custom_id, component.user.name, guild_id
    );

    let action = ButtonAction::from_custom_id(&component.data.custom_id);
    let subscription = registry(ctx).await?.get(guild_id);

    let (Some(action), Some(subscription)) = (action, subscription) else {
        component
            .create_response(
                &ctx.http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content("❌ No hay reproducción activa")
                        .ephemeral(true),
                ),
            )
            .await?;
        return Ok(());
    };

    let components = match action {
        ButtonAction::PlayPause => {
            if subscription.is_paused() {
                subscription.play();
            } else {
                subscription.pause();
            }
            buttons::create_player_buttons(subscription.is_paused(), subscription.repeat())
        }
        ButtonAction::Skip => {
            subscription.skip();
            buttons::create_player_buttons(false, subscription.repeat())
        }
        ButtonAction::Repeat => {
            subscription.set_repeat(!subscription.repeat());
            buttons::create_player_buttons(subscription.is_paused(), subscription.repeat())
        }
        ButtonAction::Stop => {
            subscription.stop().await;
            Vec::new()
        }
    };

    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new().components(components),
            ),
        )
        .await?;

    Ok(())
}

// Handlers específicos para cada comando

async fn handle_play(
    ctx: &Context,
    command: &CommandInteraction,
    bot: &MusicBot,
    guild_id: GuildId,
) -> Result<()> {
    let query = option_str(command, "query")
        .ok_or_else(|| anyhow::anyhow!("Query no proporcionado"))?;
    let mode = option_str(command, "mode");
    let announce = option_bool(command, "announce").unwrap_or(false);

    let subscription = connect(ctx, command, guild_id).await?;
    let track = bot
        .lookup
        .lookup(query, &command.user.name, announce)
        .await?;

    let was_active = subscription.is_playing() || subscription.is_paused();
    let position = match mode {
        Some("skip") | Some("next") => subscription.play_next(track.clone())?,
        _ => subscription.enqueue(track.clone())?,
    };
    if mode == Some("skip") && was_active {
        subscription.skip();
    }

    reply(ctx, command, embeds::create_track_added_embed(&track, position)).await
}

async fn handle_playnext(
    ctx: &Context,
    command: &CommandInteraction,
    bot: &MusicBot,
    guild_id: GuildId,
) -> Result<()> {
    let query = option_str(command, "query")
        .ok_or_else(|| anyhow::anyhow!("Query no proporcionado"))?;

    let subscription = connect(ctx, command, guild_id).await?;
    let track = bot.lookup.lookup(query, &command.user.name, false).await?;
    let position = subscription.play_next(track.clone())?;

    reply(ctx, command, embeds::create_track_added_embed(&track, position)).await
}

async fn handle_pause(ctx: &Context, command: &CommandInteraction, guild_id: GuildId) -> Result<()> {
    let subscription = active_subscription(ctx, guild_id).await?;

    let embed = if subscription.pause() {
        embeds::create_success_embed("Pausa", "⏸️ Reproducción pausada")
    } else {
        embeds::create_info_embed("Pausa", "No hay nada sonando ahora mismo")
    };

    reply(ctx, command, embed).await
}

async fn handle_resume(ctx: &Context, command: &CommandInteraction, guild_id: GuildId) -> Result<()> {
    let subscription = active_subscription(ctx, guild_id).await?;
    subscription.play();

    reply(
        ctx,
        command,
        embeds::create_success_embed("Reanudar", "▶️ Reproducción reanudada"),
    )
    .await
}

async fn handle_skip(ctx: &Context, command: &CommandInteraction, guild_id: GuildId) -> Result<()> {
    let subscription = active_subscription(ctx, guild_id).await?;
    subscription.skip();

    reply(
        ctx,
        command,
        embeds::create_success_embed("Saltar", "⏭️ Pasando a la siguiente canción"),
    )
    .await
}

async fn handle_stop(ctx: &Context, command: &CommandInteraction, guild_id: GuildId) -> Result<()> {
    let subscription = active_subscription(ctx, guild_id).await?;
    subscription.stop().await;

    reply(
        ctx,
        command,
        embeds::create_success_embed("Detener", "⏹️ Reproducción detenida, hasta luego 👋"),
    )
    .await
}

async fn handle_restart(ctx: &Context, command: &CommandInteraction, guild_id: GuildId) -> Result<()> {
    let subscription = active_subscription(ctx, guild_id).await?;
    if subscription.now_playing().is_none() {
        anyhow::bail!("No hay ninguna canción para reiniciar");
    }
    subscription.restart();

    reply(
        ctx,
        command,
        embeds::create_success_embed("Reiniciar", "⏮️ La canción vuelve a empezar"),
    )
    .await
}

async fn handle_volume(
    ctx: &Context,
    command: &CommandInteraction,
    bot: &MusicBot,
    guild_id: GuildId,
) -> Result<()> {
    let subscription = registry(ctx).await?.get(guild_id);

    let embed = match (option_i64(command, "level"), subscription) {
        (Some(requested), Some(subscription)) => {
            let percent = bot.config.clamp_volume(requested);
            subscription.set_volume(percent as f32 / 100.0)?;
            embeds::create_success_embed("Volumen", &format!("🔊 Volumen ajustado a {}%", percent))
        }
        (Some(_), None) => anyhow::bail!("No estoy reproduciendo nada en este servidor"),
        (None, subscription) => {
            let volume = subscription
                .map(|s| s.volume())
                .unwrap_or_else(|| bot.config.default_volume_ratio());
            embeds::create_info_embed(
                "Volumen",
                &format!("🔉 Volumen actual: {}%", (volume * 100.0).round() as u32),
            )
        }
    };

    reply(ctx, command, embed).await
}

async fn handle_repeat(ctx: &Context, command: &CommandInteraction, guild_id: GuildId) -> Result<()> {
    let subscription = active_subscription(ctx, guild_id).await?;

    let message = match option_bool(command, "enabled") {
        Some(enabled) => {
            subscription.set_repeat(enabled);
            if enabled {
                "🔂 Repetir canción activado"
            } else {
                "➡️ Repetición desactivada"
            }
        }
        None if subscription.repeat() => "🔂 La repetición está activada",
        None => "➡️ La repetición está desactivada",
    };

    reply(ctx, command, embeds::create_info_embed("Repetir", message)).await
}

async fn handle_shuffle(ctx: &Context, command: &CommandInteraction, guild_id: GuildId) -> Result<()> {
    let subscription = active_subscription(ctx, guild_id).await?;
    subscription.shuffle();

    reply(
        ctx,
        command,
        embeds::create_success_embed(
            "Mezclar",
            &format!("🔀 {} canciones mezcladas", subscription.queue_len()),
        ),
    )
    .await
}

async fn handle_queue(ctx: &Context, command: &CommandInteraction, guild_id: GuildId) -> Result<()> {
    let page = option_i64(command, "page").unwrap_or(1).max(1) as usize;

    let embed = match registry(ctx).await?.get(guild_id) {
        Some(subscription) => embeds::create_queue_embed(
            subscription.now_playing().as_ref(),
            &subscription.queue_snapshot(),
            subscription.queue_duration(),
            subscription.repeat(),
            page,
        ),
        None => embeds::create_queue_embed(None, &[], Duration::ZERO, false, page),
    };

    reply(ctx, command, embed).await
}

async fn handle_nowplaying(
    ctx: &Context,
    command: &CommandInteraction,
    guild_id: GuildId,
) -> Result<()> {
    let subscription = active_subscription(ctx, guild_id).await?;

    if let Some(show) = option_bool(command, "announce") {
        subscription.set_now_playing_display(show);
        subscription.set_text_channel(command.channel_id);
    }

    let Some(track) = subscription.now_playing() else {
        return reply(
            ctx,
            command,
            embeds::create_info_embed("Reproduciendo", "❌ No hay nada reproduciéndose actualmente"),
        )
        .await;
    };

    let info = NowPlaying {
        guild_id,
        text_channel: Some(command.channel_id),
        track,
        queue_len: subscription.queue_len(),
        volume: subscription.volume(),
        repeat: subscription.repeat(),
    };

    command
        .edit_response(
            &ctx.http,
            EditInteractionResponse::new()
                .embed(embeds::create_now_playing_embed(&info))
                .components(buttons::create_player_buttons(
                    subscription.is_paused(),
                    info.repeat,
                )),
        )
        .await?;

    Ok(())
}

async fn handle_say(ctx: &Context, command: &CommandInteraction, guild_id: GuildId) -> Result<()> {
    let text = option_str(command, "text")
        .ok_or_else(|| anyhow::anyhow!("Texto no proporcionado"))?;

    let subscription = connect(ctx, command, guild_id).await?;
    subscription.announce(text).await?;

    reply(
        ctx,
        command,
        embeds::create_success_embed("Anuncio", &format!("🗣️ {}", text)),
    )
    .await
}

// Funciones auxiliares

async fn registry(ctx: &Context) -> Result<Arc<SubscriptionRegistry>> {
    let data_read = ctx.data.read().await;
    data_read
        .get::<SubscriptionRegistry>()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Registro de suscripciones no inicializado"))
}

async fn active_subscription(ctx: &Context, guild_id: GuildId) -> Result<Arc<MusicSubscription>> {
    registry(ctx)
        .await?
        .get(guild_id)
        .ok_or_else(|| anyhow::anyhow!("No estoy reproduciendo nada en este servidor"))
}

/// Suscripción de la guild, uniéndose al canal de voz del usuario si hace
/// falta. El canal del comando pasa a recibir los avisos.
async fn connect(
    ctx: &Context,
    command: &CommandInteraction,
    guild_id: GuildId,
) -> Result<Arc<MusicSubscription>> {
    let voice_channel_id = get_user_voice_channel(ctx, guild_id, command.user.id)?;
    let subscription = registry(ctx)
        .await?
        .get_or_create(guild_id, voice_channel_id)
        .await?;
    subscription.set_text_channel(command.channel_id);
    Ok(subscription)
}

fn get_user_voice_channel(ctx: &Context, guild_id: GuildId, user_id: UserId) -> Result<ChannelId> {
    let guild = guild_id
        .to_guild_cached(&ctx.cache)
        .ok_or_else(|| anyhow::anyhow!("Guild no encontrada en caché"))?;

    let channel_id = guild
        .voice_states
        .get(&user_id)
        .and_then(|voice_state| voice_state.channel_id)
        .ok_or_else(|| anyhow::anyhow!("Debes estar en un canal de voz"))?;

    Ok(channel_id)
}

fn option_str<'a>(command: &'a CommandInteraction, name: &str) -> Option<&'a str> {
    command
        .data
        .options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_str())
}

fn option_bool(command: &CommandInteraction, name: &str) -> Option<bool> {
    command
        .data
        .options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_bool())
}

fn option_i64(command: &CommandInteraction, name: &str) -> Option<i64> {
    command
        .data
        .options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_i64())
}

async fn reply(
    ctx: &Context,
    command: &CommandInteraction,
    embed: serenity::builder::CreateEmbed,
) -> Result<()> {
    command
        .edit_response(&ctx.http, EditInteractionResponse::new().embed(embed))
        .await?;
    Ok(())
}

/// Sustituye la respuesta diferida por un error que sólo ve el usuario.
async fn report_error(ctx: &Context, command: &CommandInteraction, message: &str) -> Result<()> {
    command.delete_response(&ctx.http).await?;
    command
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new()
                .embed(embeds::create_error_embed("Error", &format!("`{}`", message)))
                .ephemeral(true),
        )
        .await?;
    Ok(())
}
