use std::time::Duration;

use crate::audio::connection::{ConnectionState, ConnectionStatus, DisconnectReason};

/// Qué hacer ante un cambio de estado de la conexión de voz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorAction {
    /// Cierre 4014: esperar a `Connecting` (movido de canal) o destruir (expulsado).
    AwaitMove(Duration),
    Rejoin { after: Duration },
    Destroy,
    /// La conexión fue destruida; la suscripción termina.
    Shutdown,
    /// Destruir si no llega a `Ready` en el plazo.
    AwaitReady(Duration),
    ProcessQueue,
}

/// Política de reconexión.
#[derive(Debug, Clone)]
pub struct ConnectionSupervisor {
    pub max_rejoin_attempts: u32,
    pub backoff_step: Duration,
    pub move_window: Duration,
    pub ready_timeout: Duration,
}

impl Default for ConnectionSupervisor {
    fn default() -> Self {
        Self {
            max_rejoin_attempts: 5,
            backoff_step: Duration::from_secs(5),
            move_window: Duration::from_secs(5),
            ready_timeout: Duration::from_secs(20),
        }
    }
}

impl ConnectionSupervisor {
    pub fn decide(&self, state: &ConnectionState) -> SupervisorAction {
        match state.status {
            ConnectionStatus::Disconnected => match &state.reason {
                Some(DisconnectReason::Manual) => SupervisorAction::Destroy,
                Some(reason) if reason.is_kick_or_move() => {
                    SupervisorAction::AwaitMove(self.move_window)
                }
                _ if state.rejoin_attempts < self.max_rejoin_attempts => SupervisorAction::Rejoin {
                    after: self.backoff_step * (state.rejoin_attempts + 1),
                },
                _ => SupervisorAction::Destroy,
            },
            ConnectionStatus::Destroyed => SupervisorAction::Shutdown,
            ConnectionStatus::Signalling | ConnectionStatus::Connecting => {
                SupervisorAction::AwaitReady(self.ready_timeout)
            }
            ConnectionStatus::Ready => SupervisorAction::ProcessQueue,
        }
    }
}
