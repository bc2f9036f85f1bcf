use super::settings::CountdownSettings;

/// Pre-race countdown notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownEvent {
    /// Whole seconds left changed (3, 2, 1).
    Changed(u32),
    /// Countdown finished; the ball is released.
    Go,
}

/// What the HUD should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownDisplay {
    Count(u32),
    Go,
    Hidden,
}

#[derive(Clone, Debug)]
pub struct Countdown {
    active: bool,
    remaining: f32,
    last_count: Option<u32>,
    go_remaining: f32,
}

impl Countdown {
    /// Armed countdown, or an already finished one when disabled.
    pub fn new(settings: &CountdownSettings) -> Self {
        Self {
            active: settings.enabled && settings.duration > 0.0,
            remaining: settings.duration,
            last_count: None,
            go_remaining: 0.0,
        }
    }

    pub fn tick(&mut self, settings: &CountdownSettings, dt: f32) -> Option<CountdownEvent> {
        if !self.active {
            self.go_remaining = (self.go_remaining - dt).max(0.0);
            return None;
        }

        self.remaining -= dt;

        if self.remaining <= 0.0 {
            self.active = false;
            self.remaining = 0.0;
            self.go_remaining = settings.go_display_time;
            log::info!("Countdown finished, go!");
            return Some(CountdownEvent::Go);
        }

        let count = self.remaining.ceil() as u32;
        if self.last_count != Some(count) {
            self.last_count = Some(count);
            return Some(CountdownEvent::Changed(count));
        }

        None
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn display(&self) -> CountdownDisplay {
        if self.active {
            CountdownDisplay::Count(self.remaining.ceil().max(1.0) as u32)
        } else if self.go_remaining > 0.0 {
            CountdownDisplay::Go
        } else {
            CountdownDisplay::Hidden
        }
    }
}
