use serenity::model::id::GuildId;
use std::time::Duration;
use thiserror::Error;

use crate::audio::{connection::ConnectionStatus, track::SourceKind};

/// Errores del motor de reproducción.
///
/// `Resolution` y `Synthesis` son recuperables: la suscripción los registra y
/// continúa con el siguiente track. Los errores de conexión se gestionan dentro
/// de la máquina de estados y nunca llegan a quien pidió la reproducción.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("la cola está vacía")]
    EmptyQueue,

    #[error("no se pudo obtener el audio: {0}")]
    Resolution(String),

    #[error("no se pudo sintetizar el anuncio: {0}")]
    Synthesis(String),

    #[error("la conexión de voz no alcanzó {status:?} en {after:?}")]
    ConnectionTimeout {
        status: ConnectionStatus,
        after: Duration,
    },

    #[error("conexión de voz desconectada: {0}")]
    ConnectionDisconnected(String),

    #[error("no se pudo conectar al canal de voz: {0}")]
    Join(String),

    #[error("fuente no soportada: {}", .0.label())]
    UnsupportedSource(SourceKind),

    #[error("volumen inválido: {0}")]
    InvalidVolume(f32),

    #[error("la suscripción de la guild {0} ya terminó")]
    Terminated(GuildId),
}
