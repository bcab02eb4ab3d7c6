use anyhow::Result;
use serenity::{model::gateway::GatewayIntents, Client};
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tracing::{error, info};

mod audio;
mod bot;
mod config;
mod sources;
mod ui;

use crate::audio::{
    driver::SongbirdGateway,
    registry::SubscriptionRegistry,
    subscription::{PlaybackServices, PlaybackSettings},
};
use crate::bot::{notifier::DiscordNotifier, MusicBot};
use crate::config::Config;
use crate::sources::{GoogleTts, SongbirdResolver, TrackLookup};

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("botterino=debug".parse()?)
                .add_directive("serenity=info".parse()?)
                .add_directive("songbird=info".parse()?),
        )
        .init();

    info!("🎵 Iniciando Botterino v{}", env!("CARGO_PKG_VERSION"));

    // Manejar health check si es necesario
    if std::env::args().any(|arg| arg == "--health-check") {
        return health_check().await;
    }

    // Cargar configuración
    let config = Config::load()?;
    info!("{}", config.summary());

    // Configurar intents mínimos necesarios
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_VOICE_STATES;

    // Un solo cliente HTTP para yt-dlp, archivos directos y TTS
    let http = reqwest::Client::new();

    let handler = MusicBot::new(config.clone(), TrackLookup::new(http.clone()));

    // Construir cliente
    let songbird = Songbird::serenity();
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird_with(songbird.clone())
        .await?;

    let services = PlaybackServices {
        resolver: Arc::new(SongbirdResolver::new(http.clone())),
        speech: Arc::new(GoogleTts::new(
            http,
            config.tts_endpoint.clone(),
            config.announce_language.clone(),
        )),
        notifier: Arc::new(DiscordNotifier::new(client.http.clone())),
    };
    let registry = Arc::new(SubscriptionRegistry::new(
        Arc::new(SongbirdGateway::new(songbird)),
        services,
        PlaybackSettings::from(&config),
    ));

    {
        let mut data = client.data.write().await;
        data.insert::<SubscriptionRegistry>(registry);
    }

    // Manejar shutdown graceful
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Error al registrar Ctrl+C: {:?}", e);
            return;
        }
        info!("⚠️ Señal de shutdown recibida, cerrando...");
        shard_manager.shutdown_all().await;
    });

    // Iniciar bot
    info!("🚀 Bot iniciado exitosamente");
    if let Err(why) = client.start().await {
        error!("Error al ejecutar cliente: {:?}", why);
    }

    Ok(())
}

/// `--health-check`: comprueba que yt-dlp y ffmpeg estén instalados.
async fn health_check() -> Result<()> {
    for (binary, flag) in [("yt-dlp", "--version"), ("ffmpeg", "-version")] {
        let output = async_process::Command::new(binary).arg(flag).output().await?;
        if !output.status.success() {
            anyhow::bail!("{} no responde a {}", binary, flag);
        }
    }

    println!("OK");
    Ok(())
}
