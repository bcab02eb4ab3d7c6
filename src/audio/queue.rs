use rand::seq::SliceRandom;
use std::{collections::VecDeque, time::Duration};
use tracing::{debug, info};

use crate::audio::{error::PlaybackError, track::Track};

/// Cola de tracks pendientes de una guild.
///
/// Sin límite de tamaño. El orden es FIFO estricto salvo `play_next`
/// (inserta en cabeza) y `shuffle`.
#[derive(Debug, Default)]
pub struct Queue {
    items: VecDeque<Track>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un track al final de la cola
    pub fn enqueue(&mut self, track: Track) {
        info!("➕ Agregado a la cola: {}", track.title());
        self.items.push_back(track);
    }

    /// Agrega un track para que suene a continuación
    pub fn play_next(&mut self, track: Track) {
        info!("⏭️ Agregado como siguiente: {}", track.title());
        self.items.push_front(track);
    }

    /// Saca el primer track de la cola
    pub fn dequeue(&mut self) -> Result<Track, PlaybackError> {
        let track = self.items.pop_front().ok_or(PlaybackError::EmptyQueue)?;
        debug!("➡️ Siguiente en cola (FIFO): {}", track.title());
        Ok(track)
    }

    /// Mezcla la cola
    pub fn shuffle(&mut self) {
        let mut rng = rand::thread_rng();
        self.items.make_contiguous().shuffle(&mut rng);
        info!("🔀 Cola mezclada ({} canciones)", self.items.len());
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Copia de los tracks pendientes, en orden de reproducción
    pub fn snapshot(&self) -> Vec<Track> {
        self.items.iter().cloned().collect()
    }

    pub fn total_duration(&self) -> Duration {
        self.items.iter().map(Track::duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::track;
    use pretty_assertions::assert_eq;

    fn titles(queue: &mut Queue) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(track) = queue.dequeue() {
            out.push(track.title().to_string());
        }
        out
    }

    #[test]
    fn dequeues_in_enqueue_order() {
        let mut queue = Queue::new();
        for name in ["a", "b", "c", "d"] {
            queue.enqueue(track(name));
        }

        assert_eq!(queue.len(), 4);
        assert_eq!(titles(&mut queue), vec!["a", "b", "c", "d"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn play_next_jumps_the_line() {
        let mut queue = Queue::new();
        queue.enqueue(track("a"));
        queue.enqueue(track("b"));
        queue.play_next(track("urgent"));
        queue.enqueue(track("c"));

        assert_eq!(titles(&mut queue), vec!["urgent", "a", "b", "c"]);
    }

    #[test]
    fn empty_dequeue_fails_with_empty_queue() {
        let mut queue = Queue::new();
        assert!(matches!(queue.dequeue(), Err(PlaybackError::EmptyQueue)));

        queue.enqueue(track("a"));
        queue.dequeue().unwrap();
        assert!(matches!(queue.dequeue(), Err(PlaybackError::EmptyQueue)));
    }

    #[test]
    fn shuffle_keeps_every_track() {
        let mut queue = Queue::new();
        let names: Vec<String> = (0..32).map(|i| format!("t{i}")).collect();
        for name in &names {
            queue.enqueue(track(name));
        }

        queue.shuffle();

        let mut shuffled = titles(&mut queue);
        assert_eq!(shuffled.len(), names.len());
        shuffled.sort();
        let mut expected = names.clone();
        expected.sort();
        assert_eq!(shuffled, expected);
    }

    #[test]
    fn shuffle_on_empty_queue_is_harmless() {
        let mut queue = Queue::new();
        queue.shuffle();
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn snapshot_and_duration_do_not_consume() {
        let mut queue = Queue::new();
        queue.enqueue(track("a").with_duration(Duration::from_secs(90)));
        queue.enqueue(track("b").with_duration(Duration::from_secs(30)));

        let snapshot: Vec<String> = queue
            .snapshot()
            .iter()
            .map(|t| t.title().to_string())
            .collect();
        assert_eq!(snapshot, vec!["a", "b"]);
        assert_eq!(queue.total_duration(), Duration::from_secs(120));
        assert_eq!(queue.len(), 2);
    }
}
