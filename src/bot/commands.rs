use anyhow::Result;
use serenity::{
    builder::{CreateCommand, CreateCommandOption},
    model::{application::CommandOptionType, id::GuildId},
    prelude::Context,
};

/// Registra comandos globales
pub async fn register_global_commands(ctx: &Context) -> Result<()> {
    for command in all_commands() {
        ctx.http.create_global_command(&command).await?;
    }

    Ok(())
}

/// Registra comandos para una guild específica (desarrollo)
pub async fn register_guild_commands(ctx: &Context, guild_id: GuildId) -> Result<()> {
    guild_id.set_commands(&ctx.http, all_commands()).await?;

    Ok(())
}

fn all_commands() -> Vec<CreateCommand> {
    vec![
        play_command(),
        playnext_command(),
        pause_command(),
        resume_command(),
        skip_command(),
        stop_command(),
        restart_command(),
        volume_command(),
        repeat_command(),
        shuffle_command(),
        queue_command(),
        nowplaying_command(),
        say_command(),
    ]
}

// Comandos de reproducción

fn play_command() -> CreateCommand {
    CreateCommand::new("play")
        .description("Reproduce o agrega una canción a la cola")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "query",
                "URL (YouTube, SoundCloud, Newgrounds, archivo) o término de búsqueda",
            )
            .required(true),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "mode", "¿Saltar la actual o sonar después?")
                .add_string_choice("Saltar", "skip")
                .add_string_choice("Siguiente", "next"),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::Boolean,
            "announce",
            "Anunciar el track con voz antes de sonar",
        ))
}

fn playnext_command() -> CreateCommand {
    CreateCommand::new("playnext")
        .description("Agrega una canción al principio de la cola")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "query", "URL o término de búsqueda")
                .required(true),
        )
}

// Comandos de control

fn pause_command() -> CreateCommand {
    CreateCommand::new("pause").description("Pausa la reproducción actual")
}

fn resume_command() -> CreateCommand {
    CreateCommand::new("resume").description("Reanuda la reproducción pausada")
}

fn skip_command() -> CreateCommand {
    CreateCommand::new("skip").description("Salta a la siguiente canción")
}

fn stop_command() -> CreateCommand {
    CreateCommand::new("stop").description("Detiene la reproducción y sale del canal de voz")
}

fn restart_command() -> CreateCommand {
    CreateCommand::new("restart").description("Vuelve a empezar la canción actual")
}

// Comandos de audio

fn volume_command() -> CreateCommand {
    CreateCommand::new("volume")
        .description("Muestra o ajusta el volumen de reproducción")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "level", "Nivel de volumen en %")
                .min_int_value(1),
        )
}

fn repeat_command() -> CreateCommand {
    CreateCommand::new("repeat")
        .description("Activa/desactiva la repetición de la canción actual")
        .add_option(CreateCommandOption::new(
            CommandOptionType::Boolean,
            "enabled",
            "¿Activar? (sin valor muestra el estado)",
        ))
}

// Comandos de cola

fn shuffle_command() -> CreateCommand {
    CreateCommand::new("shuffle").description("Mezcla las canciones de la cola")
}

fn queue_command() -> CreateCommand {
    CreateCommand::new("queue")
        .description("Muestra la cola de reproducción")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "page", "Número de página")
                .min_int_value(1),
        )
}

fn nowplaying_command() -> CreateCommand {
    CreateCommand::new("nowplaying")
        .description("Muestra información de la canción actual")
        .add_option(CreateCommandOption::new(
            CommandOptionType::Boolean,
            "announce",
            "¿Publicar cada nueva canción en este canal?",
        ))
}

fn say_command() -> CreateCommand {
    CreateCommand::new("say")
        .description("Dice un texto en el canal de voz")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "text", "Texto a decir")
                .required(true)
                .max_length(200),
        )
}
