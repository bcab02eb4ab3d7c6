use serenity::{
    all::{Colour, Timestamp},
    builder::{CreateEmbed, CreateEmbedFooter},
};
use std::time::Duration;

use crate::audio::{notifier::NowPlaying, track::Track};

/// Paleta de colores estandarizada para el bot
pub mod colors {
    use serenity::all::Colour;

    pub const SUCCESS_GREEN: Colour = Colour::from_rgb(67, 181, 129);
    pub const ERROR_RED: Colour = Colour::from_rgb(220, 53, 69);
    pub const INFO_BLUE: Colour = Colour::from_rgb(52, 144, 220);
    pub const MUSIC_PURPLE: Colour = Colour::from_rgb(138, 43, 226);
    pub const NEUTRAL_GRAY: Colour = Colour::from_rgb(108, 117, 125);
}

/// Footer estandarizado para todos los embeds
const STANDARD_FOOTER: &str = "🎵 Botterino";

const QUEUE_PAGE_SIZE: usize = 10;

/// Embed de "reproduciendo ahora" con los metadatos del track
pub fn create_now_playing_embed(now: &NowPlaying) -> CreateEmbed {
    let track = &now.track;

    let mut embed = CreateEmbed::default()
        .title("🎵 Reproduciendo Ahora")
        .description(format!("**{}**", track.title()))
        .color(colors::MUSIC_PURPLE)
        .field("⏱️ Duración", duration_label(track.duration()), true)
        .field("👤 Solicitado por", track.requested_by(), true)
        .field("🔗 Fuente", track.kind().label(), true)
        .field("🎼 Género", track.genre(), true)
        .field("📅 Subido", track.uploaded(), true)
        .field(
            "🔊 Volumen",
            format!("{}%", (now.volume * 100.0).round() as u32),
            true,
        )
        .field("📋 En cola", now.queue_len.to_string(), true)
        .field("🔁 Repetir", if now.repeat { "Sí" } else { "No" }, true);

    if let Some(artwork) = track.artwork_url() {
        embed = embed.thumbnail(artwork);
    }

    embed
        .url(track.display_url())
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

/// Embed para un track recién agregado. `position` es 1 para el primero de
/// la cola.
pub fn create_track_added_embed(track: &Track, position: usize) -> CreateEmbed {
    let description = if position == 1 {
        format!("**{}** es el siguiente en sonar", track.title())
    } else {
        format!(
            "**{}** se ha agregado a la cola en la posición **{}**",
            track.title(),
            position
        )
    };

    let mut embed = CreateEmbed::default()
        .title("✅ Canción Agregada")
        .description(description)
        .color(colors::SUCCESS_GREEN)
        .field("⏱️ Duración", duration_label(track.duration()), true)
        .field("👤 Solicitado por", track.requested_by(), true)
        .field("🔗 Fuente", track.kind().label(), true);

    if let Some(artwork) = track.artwork_url() {
        embed = embed.thumbnail(artwork);
    }

    embed
        .url(track.display_url())
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(
            "🎵 Se reproducirá automáticamente si no hay música sonando",
        ))
}

/// Crea un embed para mostrar la cola de reproducción
pub fn create_queue_embed(
    current: Option<&Track>,
    upcoming: &[Track],
    total: Duration,
    repeat: bool,
    page: usize,
) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title("📋 Cola de Reproducción")
        .color(colors::INFO_BLUE);

    if current.is_none() && upcoming.is_empty() {
        return embed
            .description("😴 **La cola está vacía**\n\n💡 Usa `/play <canción>` para agregar música")
            .color(colors::NEUTRAL_GRAY)
            .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
            .timestamp(Timestamp::now());
    }

    if let Some(current) = current {
        let status = if repeat { "🔂" } else { "▶️" };
        embed = embed.field(
            format!("{} Reproduciendo", status),
            format!("**{}**", current.title()),
            false,
        );
    }

    let total_pages = upcoming.len().div_ceil(QUEUE_PAGE_SIZE).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * QUEUE_PAGE_SIZE;

    let lines: Vec<String> = upcoming
        .iter()
        .enumerate()
        .skip(start)
        .take(QUEUE_PAGE_SIZE)
        .map(|(i, track)| {
            format!(
                "**{}**. {} `[{}]`",
                i + 1,
                track.title(),
                duration_label(track.duration())
            )
        })
        .collect();

    if !lines.is_empty() {
        embed = embed.field("Próximas canciones", lines.join("\n"), false);
    }

    let mut info = format!("**Total:** {} canciones", upcoming.len());
    if total > Duration::ZERO {
        info.push_str(&format!(" • **Duración:** {}", format_duration(total)));
    }
    embed = embed.field("Información", info, false);

    let footer = if total_pages > 1 {
        format!("Página {} de {} • Botterino", page, total_pages)
    } else {
        STANDARD_FOOTER.to_string()
    };

    embed
        .footer(CreateEmbedFooter::new(footer))
        .timestamp(Timestamp::now())
}

/// Embed corto de estado: error, éxito o información
fn status_embed(emoji: &str, title: &str, description: &str, color: Colour) -> CreateEmbed {
    CreateEmbed::default()
        .title(format!("{} {}", emoji, title))
        .description(description)
        .color(color)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(STANDARD_FOOTER))
}

pub fn create_error_embed(title: &str, description: &str) -> CreateEmbed {
    status_embed("❌", title, description, colors::ERROR_RED)
}

pub fn create_success_embed(title: &str, description: &str) -> CreateEmbed {
    status_embed("✅", title, description, colors::SUCCESS_GREEN)
}

pub fn create_info_embed(title: &str, description: &str) -> CreateEmbed {
    status_embed("ℹ️", title, description, colors::INFO_BLUE)
}

fn duration_label(duration: Duration) -> String {
    if duration.is_zero() {
        "🔴 En vivo".to_string()
    } else {
        format_duration(duration)
    }
}

/// `m:ss`, o `h:mm:ss` a partir de una hora
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match (secs / 3600, secs % 3600 / 60, secs % 60) {
        (0, m, s) => format!("{m}:{s:02}"),
        (h, m, s) => format!("{h}:{m:02}:{s:02}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn durations_are_formatted_with_hours_only_when_needed() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0:00");
        assert_eq!(format_duration(Duration::from_secs(65)), "1:05");
        assert_eq!(format_duration(Duration::from_secs(3_725)), "1:02:05");
    }

    #[test]
    fn unknown_duration_is_shown_as_live() {
        assert_eq!(duration_label(Duration::ZERO), "🔴 En vivo");
        assert_eq!(duration_label(Duration::from_secs(200)), "3:20");
    }
}
