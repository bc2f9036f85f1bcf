//! Lap timing and checkpoint sequencing for a continuous-lap time trial.
//!
//! The start/finish gate is a single trigger: crossing it while idle starts a lap,
//! crossing it during a lap finishes that lap and immediately starts the next one.
//! Checkpoints must be cleared strictly in index order before a finish is accepted.
//!
//! Every declined transition (duplicate start, finish without checkpoints, gate
//! crossing during the cooldown, out-of-order checkpoint) is logged and leaves the
//! state untouched. Nothing here panics or returns errors.

pub mod checkpoint;
pub mod events;

use std::sync::Arc;

pub use checkpoint::{Checkpoint, TrackCheckpoint, validate_checkpoint_indices};
pub use events::{ListenerId, RaceEvent, RaceListeners};

use crate::constants::{GATE_COOLDOWN_S, LAP_TIME_BROADCAST_INTERVAL_S};
use crate::types::Iso;

/// Race rules, loaded from game config.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RaceSettings {
    /// Minimum seconds between two accepted gate crossings.
    pub gate_cooldown: f32,
    /// If false, the gate finishes a lap regardless of checkpoint progress.
    pub require_checkpoints_to_finish: bool,
    /// Seconds between running lap time broadcasts.
    pub lap_time_broadcast_interval: f32,
    /// Replaces the enumerated checkpoint count when set.
    pub total_checkpoints_override: Option<u32>,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            gate_cooldown: GATE_COOLDOWN_S,
            require_checkpoints_to_finish: true,
            lap_time_broadcast_interval: LAP_TIME_BROADCAST_INTERVAL_S,
            total_checkpoints_override: None,
        }
    }
}

/// What a gate crossing did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GateOutcome {
    /// No lap was running; a new lap started.
    Started { lap: u32 },
    /// The running lap finished and the next one started.
    Finished {
        lap_time: f32,
        new_best: bool,
        next_lap: u32,
    },
    /// Inside the cooldown window of the previous accepted crossing.
    Cooldown,
    /// Checkpoints are required and not all of them were cleared.
    MissingCheckpoints { cleared: u32, total: u32 },
}

/// What a checkpoint hit did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CheckpointOutcome {
    Accepted { index: u32, split: f32 },
    NoActiveLap,
    /// No checkpoints are configured for this track.
    Unconfigured,
    OutOfOrder { index: u32, expected: u32 },
}

/// Per-match race state. Created at match start, never torn down mid-match.
#[derive(Debug)]
pub struct RaceState {
    settings: RaceSettings,

    current_lap: u32,
    lap_active: bool,
    lap_start_time: f32,
    current_lap_time: f32,
    best_lap_time: Option<f32>,

    current_checkpoint_index: u32,
    total_checkpoints: u32,
    split_times: Vec<f32>,
    best_split_times: Vec<f32>,
    last_checkpoint_pose: Option<Iso>,

    last_gate_cross_time: Option<f32>,
    lap_time_accumulator: f32,

    checkpoints: Vec<Arc<dyn Checkpoint>>,
    listeners: RaceListeners,
}

impl RaceState {
    pub fn new(settings: RaceSettings) -> Self {
        let total_checkpoints = settings.total_checkpoints_override.unwrap_or(0);
        Self {
            settings,
            current_lap: 0,
            lap_active: false,
            lap_start_time: 0.0,
            current_lap_time: 0.0,
            best_lap_time: None,
            current_checkpoint_index: 0,
            total_checkpoints,
            split_times: Vec::new(),
            best_split_times: Vec::new(),
            last_checkpoint_pose: None,
            last_gate_cross_time: None,
            lap_time_accumulator: 0.0,
            checkpoints: Vec::new(),
            listeners: RaceListeners::default(),
        }
    }

    pub fn listeners_mut(&mut self) -> &mut RaceListeners {
        &mut self.listeners
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&RaceEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Replace the cached checkpoints with everything the track exposes.
    ///
    /// The enumerated count becomes `total_checkpoints` unless the settings carry an override.
    pub fn cache_checkpoints<I>(&mut self, checkpoints: I)
    where
        I: IntoIterator<Item = Arc<dyn Checkpoint>>,
    {
        self.checkpoints = checkpoints.into_iter().collect();

        let enumerated = self.checkpoints.len() as u32;
        self.total_checkpoints = match self.settings.total_checkpoints_override {
            Some(total) => {
                if total != enumerated {
                    log::warn!(
                        "Checkpoint override {total} differs from the {enumerated} found on the track"
                    );
                }
                total
            }
            None => enumerated,
        };

        let indices: Vec<u32> = self.checkpoints.iter().map(|cp| cp.index()).collect();
        for problem in validate_checkpoint_indices(&indices) {
            log::warn!("Checkpoint layout: {problem}");
        }

        log::info!("Cached {enumerated} checkpoints.");
    }

    /// Start a lap. Does nothing while a lap is already running.
    pub fn start_lap(&mut self, now: f32) {
        if self.lap_active {
            return;
        }

        self.lap_active = true;
        self.current_lap += 1;
        self.lap_start_time = now;
        self.lap_time_accumulator = 0.0;

        self.listeners
            .emit(RaceEvent::LapNumberChanged(self.current_lap));

        log::info!("Lap {} started", self.current_lap);
    }

    /// Finish the running lap. Returns `Some((lap_time, new_best))`, or `None` when idle.
    pub fn complete_lap(&mut self, now: f32) -> Option<(f32, bool)> {
        if !self.lap_active {
            return None;
        }

        self.current_lap_time = now - self.lap_start_time;
        self.listeners
            .emit(RaceEvent::LapTimeUpdated(self.current_lap_time));

        let new_best = self
            .best_lap_time
            .is_none_or(|best| self.current_lap_time < best);
        if new_best {
            self.best_lap_time = Some(self.current_lap_time);
        }

        self.lap_active = false;

        log::info!(
            "Lap {} complete - time: {:.2} | best: {:.2}",
            self.current_lap,
            self.current_lap_time,
            self.best_lap_time.unwrap_or(self.current_lap_time)
        );

        if new_best {
            self.best_split_times = self.split_times.clone();
            log::info!("New best lap!");
            self.listeners
                .emit(RaceEvent::BestTimeUpdated(self.current_lap_time));
        }

        Some((self.current_lap_time, new_best))
    }

    /// Start/finish gate overlap.
    pub fn handle_gate_cross(&mut self, now: f32) -> GateOutcome {
        if let Some(last) = self.last_gate_cross_time {
            if now - last < self.settings.gate_cooldown {
                log::debug!("Gate crossing ignored, {:.2}s since the last one", now - last);
                return GateOutcome::Cooldown;
            }
        }

        self.last_gate_cross_time = Some(now);

        if !self.lap_active {
            self.reset_checkpoints();
            self.start_lap(now);
            return GateOutcome::Started {
                lap: self.current_lap,
            };
        }

        let has_checkpoints = self.total_checkpoints > 0;
        let all_cleared = self.current_checkpoint_index >= self.total_checkpoints;
        let can_finish =
            !self.settings.require_checkpoints_to_finish || !has_checkpoints || all_cleared;

        if !can_finish {
            log::warn!(
                "Cannot finish lap. Missing checkpoints ({}/{})",
                self.current_checkpoint_index,
                self.total_checkpoints
            );
            return GateOutcome::MissingCheckpoints {
                cleared: self.current_checkpoint_index,
                total: self.total_checkpoints,
            };
        }

        let (lap_time, new_best) = self.complete_lap(now).unwrap_or((0.0, false));
        self.reset_checkpoints();
        self.start_lap(now);

        GateOutcome::Finished {
            lap_time,
            new_best,
            next_lap: self.current_lap,
        }
    }

    /// A checkpoint trigger was entered. Hits must arrive strictly in index order.
    pub fn register_checkpoint_hit(&mut self, index: u32, pose: Iso, now: f32) -> CheckpointOutcome {
        if !self.lap_active {
            return CheckpointOutcome::NoActiveLap;
        }

        if self.total_checkpoints == 0 {
            log::warn!("Checkpoint hit but no checkpoints are configured for this track.");
            return CheckpointOutcome::Unconfigured;
        }

        if index != self.current_checkpoint_index {
            log::warn!(
                "Checkpoint {index} ignored (expected {})",
                self.current_checkpoint_index
            );
            return CheckpointOutcome::OutOfOrder {
                index,
                expected: self.current_checkpoint_index,
            };
        }

        let split = now - self.lap_start_time;
        self.split_times.push(split);

        if let Some(&reference) = self.best_split_times.get(index as usize) {
            let delta = split - reference;
            self.listeners.emit(RaceEvent::SplitUpdated {
                split,
                delta,
                is_ahead: delta < 0.0,
            });
        }

        self.last_checkpoint_pose = Some(pose);

        log::info!("Checkpoint {index} hit | split: {split:.2}");

        self.current_checkpoint_index += 1;

        CheckpointOutcome::Accepted { index, split }
    }

    /// Rewind checkpoint progress and re-arm every cached checkpoint.
    pub fn reset_checkpoints(&mut self) {
        self.current_checkpoint_index = 0;
        self.split_times.clear();

        for checkpoint in &self.checkpoints {
            checkpoint.reset_arm();
        }
    }

    /// Per-frame throttled lap time broadcast.
    pub fn update_lap_timer(&mut self, now: f32, dt: f32) {
        if !self.lap_active {
            return;
        }

        let interval = self.settings.lap_time_broadcast_interval;
        self.lap_time_accumulator += dt;

        if self.lap_time_accumulator >= interval {
            self.lap_time_accumulator -= interval;
            self.listeners
                .emit(RaceEvent::LapTimeUpdated(now - self.lap_start_time));
        }
    }

    /// Time to show on the HUD: running time while a lap is active, else the last lap time.
    pub fn displayed_lap_time(&self, now: f32) -> f32 {
        if self.lap_active {
            now - self.lap_start_time
        } else {
            self.current_lap_time
        }
    }

    pub fn settings(&self) -> &RaceSettings {
        &self.settings
    }

    pub fn current_lap(&self) -> u32 {
        self.current_lap
    }

    pub fn is_lap_active(&self) -> bool {
        self.lap_active
    }

    pub fn lap_start_time(&self) -> f32 {
        self.lap_start_time
    }

    pub fn current_lap_time(&self) -> f32 {
        self.current_lap_time
    }

    pub fn best_lap_time(&self) -> Option<f32> {
        self.best_lap_time
    }

    pub fn current_checkpoint_index(&self) -> u32 {
        self.current_checkpoint_index
    }

    pub fn total_checkpoints(&self) -> u32 {
        self.total_checkpoints
    }

    pub fn split_times(&self) -> &[f32] {
        &self.split_times
    }

    pub fn best_split_times(&self) -> &[f32] {
        &self.best_split_times
    }

    /// Pose of the most recently cleared checkpoint, used for respawning.
    pub fn last_checkpoint_pose(&self) -> Option<&Iso> {
        self.last_checkpoint_pose.as_ref()
    }

    pub fn checkpoints(&self) -> &[Arc<dyn Checkpoint>] {
        &self.checkpoints
    }
}

impl Default for RaceState {
    fn default() -> Self {
        Self::new(RaceSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Mutex;

    fn race_with_checkpoints(count: u32) -> (RaceState, Vec<Arc<TrackCheckpoint>>) {
        let checkpoints: Vec<Arc<TrackCheckpoint>> =
            (0..count).map(|i| Arc::new(TrackCheckpoint::new(i))).collect();
        let mut race = RaceState::default();
        race.cache_checkpoints(
            checkpoints
                .iter()
                .map(|cp| cp.clone() as Arc<dyn Checkpoint>),
        );
        (race, checkpoints)
    }

    fn recorded(race: &mut RaceState) -> Arc<Mutex<Vec<RaceEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        race.subscribe(move |e| sink.lock().unwrap().push(*e));
        events
    }

    fn pose() -> Iso {
        Iso::translation(1.0, 2.0, 3.0)
    }

    proptest! {
        #[test]
        fn repeated_start_increments_lap_once(n in 1usize..50) {
            let mut race = RaceState::default();
            for i in 0..n {
                race.start_lap(i as f32);
            }
            prop_assert_eq!(race.current_lap(), 1);
            prop_assert_eq!(race.lap_start_time(), 0.0);
        }

        #[test]
        fn out_of_order_hit_changes_nothing(index in 1u32..20) {
            let (mut race, _) = race_with_checkpoints(20);
            race.handle_gate_cross(0.0);

            let outcome = race.register_checkpoint_hit(index, pose(), 5.0);

            prop_assert_eq!(outcome, CheckpointOutcome::OutOfOrder { index, expected: 0 });
            prop_assert_eq!(race.current_checkpoint_index(), 0);
            prop_assert!(race.split_times().is_empty());
        }
    }

    #[test]
    fn full_lap_scenario_with_three_checkpoints() {
        let (mut race, checkpoints) = race_with_checkpoints(3);
        let events = recorded(&mut race);

        assert_eq!(race.handle_gate_cross(0.0), GateOutcome::Started { lap: 1 });

        for (i, t) in [(0, 10.0), (1, 25.0), (2, 40.0)] {
            checkpoints[i as usize].try_trigger();
            assert_eq!(
                race.register_checkpoint_hit(i, pose(), t),
                CheckpointOutcome::Accepted { index: i, split: t }
            );
            assert_eq!(race.split_times().len() as u32, race.current_checkpoint_index());
        }
        assert_eq!(race.split_times(), &[10.0, 25.0, 40.0]);

        let outcome = race.handle_gate_cross(45.0);
        assert_eq!(
            outcome,
            GateOutcome::Finished {
                lap_time: 45.0,
                new_best: true,
                next_lap: 2
            }
        );
        assert_eq!(race.best_lap_time(), Some(45.0));
        assert_eq!(race.best_split_times(), &[10.0, 25.0, 40.0]);
        assert!(race.is_lap_active());
        assert_eq!(race.current_checkpoint_index(), 0);
        assert!(race.split_times().is_empty());
        assert!(checkpoints.iter().all(|cp| cp.is_armed()));

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                RaceEvent::LapNumberChanged(1),
                RaceEvent::LapTimeUpdated(45.0),
                RaceEvent::BestTimeUpdated(45.0),
                RaceEvent::LapNumberChanged(2),
            ]
        );
    }

    #[test]
    fn finish_is_rejected_until_all_checkpoints_clear() {
        let (mut race, _) = race_with_checkpoints(3);
        race.handle_gate_cross(0.0);
        race.register_checkpoint_hit(0, pose(), 5.0);

        assert_eq!(
            race.handle_gate_cross(30.0),
            GateOutcome::MissingCheckpoints {
                cleared: 1,
                total: 3
            }
        );
        assert!(race.is_lap_active());
        assert_eq!(race.current_lap(), 1);
        assert_eq!(race.current_checkpoint_index(), 1);
        assert_eq!(race.split_times(), &[5.0]);
    }

    #[test]
    fn finish_allowed_when_checkpoints_not_required() {
        let mut race = RaceState::new(RaceSettings {
            require_checkpoints_to_finish: false,
            ..RaceSettings::default()
        });
        race.cache_checkpoints(
            (0..2).map(|i| Arc::new(TrackCheckpoint::new(i)) as Arc<dyn Checkpoint>),
        );
        race.handle_gate_cross(0.0);

        assert!(matches!(
            race.handle_gate_cross(12.0),
            GateOutcome::Finished { lap_time, .. } if lap_time == 12.0
        ));
    }

    #[test]
    fn finish_allowed_when_no_checkpoints_configured() {
        let mut race = RaceState::default();
        race.handle_gate_cross(0.0);
        assert!(matches!(race.handle_gate_cross(8.0), GateOutcome::Finished { .. }));
    }

    #[test]
    fn gate_crossings_inside_cooldown_produce_one_transition() {
        let mut race = RaceState::default();
        let events = recorded(&mut race);

        assert_eq!(race.handle_gate_cross(0.5), GateOutcome::Started { lap: 1 });
        assert_eq!(race.handle_gate_cross(1.0), GateOutcome::Cooldown);

        assert_eq!(race.current_lap(), 1);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn first_gate_crossing_is_never_in_cooldown() {
        let mut race = RaceState::default();
        assert_eq!(race.handle_gate_cross(0.0), GateOutcome::Started { lap: 1 });
    }

    #[test]
    fn hit_ahead_of_sequence_is_rejected() {
        let (mut race, _) = race_with_checkpoints(3);
        race.handle_gate_cross(0.0);

        assert_eq!(
            race.register_checkpoint_hit(1, pose(), 3.0),
            CheckpointOutcome::OutOfOrder {
                index: 1,
                expected: 0
            }
        );
        assert_eq!(race.current_checkpoint_index(), 0);
    }

    #[test]
    fn duplicate_hit_is_rejected() {
        let (mut race, _) = race_with_checkpoints(3);
        race.handle_gate_cross(0.0);
        race.register_checkpoint_hit(0, pose(), 3.0);

        assert!(matches!(
            race.register_checkpoint_hit(0, pose(), 3.5),
            CheckpointOutcome::OutOfOrder { .. }
        ));
        assert_eq!(race.split_times(), &[3.0]);
    }

    #[test]
    fn hits_are_ignored_while_idle_or_unconfigured() {
        let (mut idle, _) = race_with_checkpoints(3);
        assert_eq!(
            idle.register_checkpoint_hit(0, pose(), 1.0),
            CheckpointOutcome::NoActiveLap
        );

        let mut unconfigured = RaceState::default();
        unconfigured.start_lap(0.0);
        assert_eq!(
            unconfigured.register_checkpoint_hit(0, pose(), 1.0),
            CheckpointOutcome::Unconfigured
        );
        assert!(unconfigured.last_checkpoint_pose().is_none());
    }

    #[test]
    fn accepted_hit_records_respawn_pose() {
        let (mut race, _) = race_with_checkpoints(1);
        race.start_lap(0.0);
        race.register_checkpoint_hit(0, pose(), 2.0);
        assert_eq!(race.last_checkpoint_pose(), Some(&pose()));
    }

    #[test]
    fn split_delta_compares_against_best_lap() {
        let (mut race, _) = race_with_checkpoints(2);
        let events = recorded(&mut race);

        // Lap 1: no reference yet, so no split notifications.
        race.handle_gate_cross(0.0);
        race.register_checkpoint_hit(0, pose(), 10.0);
        race.register_checkpoint_hit(1, pose(), 20.0);
        race.handle_gate_cross(30.0);
        assert!(
            !events
                .lock()
                .unwrap()
                .iter()
                .any(|e| matches!(e, RaceEvent::SplitUpdated { .. }))
        );

        // Lap 2 starts at 30.0: first split 8s (ahead), second 22s (behind).
        race.register_checkpoint_hit(0, pose(), 38.0);
        race.register_checkpoint_hit(1, pose(), 52.0);

        let splits: Vec<RaceEvent> = events
            .lock()
            .unwrap()
            .iter()
            .copied()
            .filter(|e| matches!(e, RaceEvent::SplitUpdated { .. }))
            .collect();
        assert_eq!(
            splits,
            vec![
                RaceEvent::SplitUpdated {
                    split: 8.0,
                    delta: -2.0,
                    is_ahead: true
                },
                RaceEvent::SplitUpdated {
                    split: 22.0,
                    delta: 2.0,
                    is_ahead: false
                },
            ]
        );
    }

    #[test]
    fn slower_lap_keeps_previous_best_and_splits() {
        let (mut race, _) = race_with_checkpoints(1);
        race.handle_gate_cross(0.0);
        race.register_checkpoint_hit(0, pose(), 4.0);
        race.handle_gate_cross(10.0);

        race.register_checkpoint_hit(0, pose(), 16.0);
        let outcome = race.handle_gate_cross(25.0);

        assert_eq!(
            outcome,
            GateOutcome::Finished {
                lap_time: 15.0,
                new_best: false,
                next_lap: 3
            }
        );
        assert_eq!(race.best_lap_time(), Some(10.0));
        assert_eq!(race.best_split_times(), &[4.0]);
    }

    #[test]
    fn complete_lap_without_active_lap_is_a_no_op() {
        let mut race = RaceState::default();
        let events = recorded(&mut race);
        assert_eq!(race.complete_lap(5.0), None);
        assert_eq!(race.best_lap_time(), None);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn displayed_time_runs_while_active_and_freezes_after() {
        let mut race = RaceState::default();
        assert_eq!(race.displayed_lap_time(3.0), 0.0);

        race.start_lap(2.0);
        assert_eq!(race.displayed_lap_time(5.5), 3.5);
        assert_eq!(race.displayed_lap_time(5.5), 3.5);

        race.complete_lap(7.0);
        assert_eq!(race.displayed_lap_time(100.0), 5.0);
    }

    #[test]
    fn lap_timer_broadcast_is_throttled() {
        let mut race = RaceState::default();
        let events = recorded(&mut race);

        // Idle: nothing.
        race.update_lap_timer(0.0, 1.0);
        assert!(events.lock().unwrap().is_empty());

        race.start_lap(0.0);
        events.lock().unwrap().clear();

        let dt = 1.0 / 120.0;
        let mut now = 0.0;
        for _ in 0..120 {
            now += dt;
            race.update_lap_timer(now, dt);
        }

        let broadcasts = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, RaceEvent::LapTimeUpdated(_)))
            .count();
        // One second at 20 Hz.
        assert!((19..=20).contains(&broadcasts), "{broadcasts}");
    }

    #[test]
    fn checkpoint_override_wins_over_enumeration() {
        let mut race = RaceState::new(RaceSettings {
            total_checkpoints_override: Some(5),
            ..RaceSettings::default()
        });
        race.cache_checkpoints(
            (0..3).map(|i| Arc::new(TrackCheckpoint::new(i)) as Arc<dyn Checkpoint>),
        );
        assert_eq!(race.total_checkpoints(), 5);
        assert_eq!(race.checkpoints().len(), 3);
    }

    #[test]
    fn reset_rearms_cached_checkpoints() {
        let (mut race, checkpoints) = race_with_checkpoints(3);
        for cp in &checkpoints {
            cp.try_trigger();
        }
        race.reset_checkpoints();
        assert!(checkpoints.iter().all(|cp| cp.is_armed()));
    }
}
