/// Notification emitted by [`super::RaceState`] to its listeners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RaceEvent {
    /// A new lap started; carries the new lap number (1-based).
    LapNumberChanged(u32),
    /// Running lap time while a lap is active, or the final time of a completed lap.
    LapTimeUpdated(f32),
    /// A completed lap beat the previous best (or set the first one).
    BestTimeUpdated(f32),
    /// A checkpoint was cleared and a best-lap split exists for it.
    SplitUpdated {
        split: f32,
        /// `split - best_split`; negative means ahead of the best lap.
        delta: f32,
        is_ahead: bool,
    },
}

/// Identifier handed out by [`RaceListeners::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&RaceEvent) + Send + Sync>;

/// Ordered list of race event callbacks.
///
/// Fan-out is synchronous and runs on the caller's thread, in subscription order.
#[derive(Default)]
pub struct RaceListeners {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl RaceListeners {
    pub fn subscribe(&mut self, listener: impl FnMut(&RaceEvent) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(crate) fn emit(&mut self, event: RaceEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for RaceListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaceListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn emits_to_every_listener_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = RaceListeners::default();

        let first = log.clone();
        listeners.subscribe(move |e| first.lock().unwrap().push(("first", *e)));
        let second = log.clone();
        listeners.subscribe(move |e| second.lock().unwrap().push(("second", *e)));

        listeners.emit(RaceEvent::LapNumberChanged(1));

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                ("first", RaceEvent::LapNumberChanged(1)),
                ("second", RaceEvent::LapNumberChanged(1)),
            ]
        );
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let count = Arc::new(Mutex::new(0));
        let mut listeners = RaceListeners::default();

        let c = count.clone();
        let id = listeners.subscribe(move |_| *c.lock().unwrap() += 1);

        listeners.emit(RaceEvent::BestTimeUpdated(30.0));
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.emit(RaceEvent::BestTimeUpdated(29.0));

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(listeners.is_empty());
    }
}
