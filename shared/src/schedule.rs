/// Identifies one scheduling of a [`OneShotTimer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Single pending deadline. Scheduling again replaces the previous deadline.
#[derive(Clone, Debug, Default)]
pub struct OneShotTimer {
    next_id: u64,
    pending: Option<(TimerHandle, f32)>,
}

impl OneShotTimer {
    pub fn schedule(&mut self, now: f32, delay: f32) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending = Some((handle, now + delay.max(0.0)));
        handle
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Seconds until the deadline, if one is pending.
    pub fn remaining(&self, now: f32) -> Option<f32> {
        self.pending.map(|(_, at)| (at - now).max(0.0))
    }

    /// Returns the handle once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now: f32) -> Option<TimerHandle> {
        match self.pending {
            Some((handle, at)) if now >= at => {
                self.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_at_deadline() {
        let mut timer = OneShotTimer::default();
        let handle = timer.schedule(1.0, 2.0);

        assert_eq!(timer.poll(2.5), None);
        assert_eq!(timer.remaining(2.5), Some(0.5));
        assert_eq!(timer.poll(3.0), Some(handle));
        assert_eq!(timer.poll(4.0), None);
        assert!(!timer.is_pending());
    }

    #[test]
    fn rescheduling_replaces_the_deadline() {
        let mut timer = OneShotTimer::default();
        let first = timer.schedule(0.0, 1.0);
        let second = timer.schedule(0.5, 5.0);
        assert_ne!(first, second);

        assert_eq!(timer.poll(2.0), None);
        assert_eq!(timer.poll(5.5), Some(second));
    }

    #[test]
    fn cancel_drops_the_deadline() {
        let mut timer = OneShotTimer::default();
        timer.schedule(0.0, 1.0);
        timer.cancel();
        assert_eq!(timer.poll(10.0), None);
    }
}
