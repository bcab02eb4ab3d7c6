use parking_lot::Mutex;
use std::{future::Future, time::Duration};
use tokio::task::JoinHandle;
use tracing::debug;

/// Temporizador de inactividad con un único disparo pendiente.
///
/// Armarlo de nuevo reemplaza el temporizador anterior. La acción se lanza en
/// su propia tarea, así que cancelar después de la expiración no la corta a
/// medias.
#[derive(Debug)]
pub struct IdleWatchdog {
    grace: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl IdleWatchdog {
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            pending: Mutex::new(None),
        }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    pub fn arm<F>(&self, on_expiry: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let grace = self.grace;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            debug!("⏰ Watchdog de inactividad expirado");
            tokio::spawn(on_expiry);
        });

        if let Some(previous) = self.pending.lock().replace(timer) {
            previous.abort();
        }
    }

    /// Devuelve `true` si había un temporizador pendiente.
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(timer) => {
                let was_pending = !timer.is_finished();
                timer.abort();
                was_pending
            }
            None => false,
        }
    }

    #[cfg(test)]
    fn is_armed(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for IdleWatchdog {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.get_mut().take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn counter_action(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_grace() {
        let fired = Arc::new(AtomicUsize::new(0));
        let watchdog = IdleWatchdog::new(Duration::from_secs(60));

        watchdog.arm(counter_action(&fired));
        assert!(watchdog.is_armed());

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!watchdog.is_armed());

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_the_previous_timer() {
        let fired = Arc::new(AtomicUsize::new(0));
        let watchdog = IdleWatchdog::new(Duration::from_secs(60));

        watchdog.arm(counter_action(&fired));
        tokio::time::sleep(Duration::from_secs(30)).await;
        watchdog.arm(counter_action(&fired));

        tokio::time::sleep(Duration::from_secs(45)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let watchdog = IdleWatchdog::new(Duration::from_secs(60));

        watchdog.arm(counter_action(&fired));
        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(watchdog.cancel());
        assert!(!watchdog.cancel());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
