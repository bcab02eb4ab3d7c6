use tracing::trace;

use crate::audio::{connection::ConnectionState, player::PlayerEvent};

/// Todo lo que puede hacer avanzar la máquina de estados de una suscripción.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    Connection(ConnectionState),
    Player(PlayerEvent),
}

/// Extremo emisor del canal de eventos de una suscripción.
///
/// Lo reciben los adaptadores de transporte y de reproductor; la suscripción
/// consume el otro extremo desde una única tarea, de modo que los eventos se
/// procesan de uno en uno y en el orden en que se emitieron.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: flume::Sender<SubscriptionEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, flume::Receiver<SubscriptionEvent>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: SubscriptionEvent) {
        if self.tx.send(event).is_err() {
            trace!("Evento descartado: la suscripción ya no escucha");
        }
    }
}
